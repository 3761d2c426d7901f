//! JSON control API for the Drumbeat scheduler.
//!
//! Exposes the scheduler's control surface over HTTP:
//! - Health and status probes
//! - Enqueueing and inspecting scheduled posts
//! - The publish history

mod error;
mod routes;

pub use error::WebError;
pub use routes::create_router;
