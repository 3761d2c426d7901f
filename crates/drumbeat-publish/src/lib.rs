//! Publishing endpoint client for Drumbeat.
//!
//! The dispatcher treats the publish call as a black box returning
//! success or error; this crate provides the HTTP client for a
//! Buffer-style queue API and the function-type seam (`Publisher`)
//! the dispatcher consumes, so tests can inject closures instead.

mod client;
mod error;
mod types;

pub use client::PublishClient;
pub use error::PublishError;
pub use types::{Profile, PublishReceipt, PublishRequest, Publisher};
