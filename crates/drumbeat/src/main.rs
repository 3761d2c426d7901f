//! Drumbeat: scheduled content publisher
//!
//! Main binary with subcommands:
//! - `daemon`: Run the scheduler loop and the control API
//! - `enqueue`: Schedule a post via a running daemon
//! - `status`: Show a running daemon's status
//! - `profiles`: List connected destination profiles, for `--target-ref`

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod daemon;

#[derive(Parser)]
#[command(name = "drumbeat")]
#[command(about = "Scheduled content publisher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler daemon and its control API
    Daemon {
        /// Publishing API base URL
        #[arg(long, env = "DRUMBEAT_API_URL")]
        api_url: String,

        /// Publishing API access token
        #[arg(long, env = "DRUMBEAT_ACCESS_TOKEN")]
        access_token: String,

        /// Path of the state snapshot file
        #[arg(long, env = "DRUMBEAT_STATE_PATH", default_value = "drumbeat_state.json")]
        state_path: String,

        /// Path of the engagement metrics CSV
        #[arg(long, env = "DRUMBEAT_METRICS_PATH", default_value = "metrics.csv")]
        metrics_path: String,

        /// Scheduler tick interval in seconds
        #[arg(long, default_value = "60")]
        tick_interval: u64,

        /// Delay before retrying a failed publish, in minutes
        #[arg(long, default_value = "60")]
        retry_delay: u64,

        /// Reminder lead time before a post's scheduled time, in minutes
        #[arg(long, default_value = "15")]
        reminder_window: u64,

        /// Control API port
        #[arg(long, env = "DRUMBEAT_PORT", default_value = "8080")]
        port: u16,
    },

    /// Schedule a post via a running daemon
    Enqueue {
        /// Control API base URL of the daemon
        #[arg(long, env = "DRUMBEAT_DAEMON_URL", default_value = "http://127.0.0.1:8080")]
        daemon_url: String,

        /// Destination platform ("linkedin", "twitter", ...)
        #[arg(long)]
        platform: String,

        /// Post content
        #[arg(long)]
        content: String,

        /// Destination profile identifier
        #[arg(long)]
        target_ref: String,

        /// When to publish (RFC 3339, e.g. 2026-09-01T14:00:00Z)
        #[arg(long)]
        at: DateTime<Utc>,

        /// Topic recorded with the post's metrics
        #[arg(long)]
        topic: Option<String>,

        /// Publish attempts before the post is marked failed
        #[arg(long)]
        max_retries: Option<u32>,
    },

    /// Show a running daemon's status
    Status {
        /// Control API base URL of the daemon
        #[arg(long, env = "DRUMBEAT_DAEMON_URL", default_value = "http://127.0.0.1:8080")]
        daemon_url: String,
    },

    /// List the publishing API's connected destination profiles
    Profiles {
        /// Publishing API base URL
        #[arg(long, env = "DRUMBEAT_API_URL")]
        api_url: String,

        /// Publishing API access token
        #[arg(long, env = "DRUMBEAT_ACCESS_TOKEN")]
        access_token: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "drumbeat=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon {
            api_url,
            access_token,
            state_path,
            metrics_path,
            tick_interval,
            retry_delay,
            reminder_window,
            port,
        } => {
            daemon::run(daemon::DaemonConfig {
                api_url,
                access_token,
                state_path: state_path.into(),
                metrics_path: metrics_path.into(),
                tick_interval,
                retry_delay,
                reminder_window,
                port,
            })
            .await
        }

        Commands::Enqueue {
            daemon_url,
            platform,
            content,
            target_ref,
            at,
            topic,
            max_retries,
        } => {
            enqueue(
                &daemon_url,
                platform,
                content,
                target_ref,
                at,
                topic,
                max_retries,
            )
            .await
        }

        Commands::Status { daemon_url } => status(&daemon_url).await,

        Commands::Profiles {
            api_url,
            access_token,
        } => profiles(&api_url, &access_token).await,
    }
}

/// List connected profiles so operators can pick a `--target-ref`.
async fn profiles(api_url: &str, access_token: &str) -> Result<()> {
    let client = drumbeat_publish::PublishClient::new(api_url, access_token);
    let profiles = client
        .profiles()
        .await
        .map_err(|e| miette::miette!("{}", e))?;

    for profile in profiles {
        match profile.service_display_name {
            Some(name) => println!("{}  {} ({})", profile.id, profile.service, name),
            None => println!("{}  {}", profile.id, profile.service),
        }
    }
    Ok(())
}

async fn enqueue(
    daemon_url: &str,
    platform: String,
    content: String,
    target_ref: String,
    at: DateTime<Utc>,
    topic: Option<String>,
    max_retries: Option<u32>,
) -> Result<()> {
    let metadata = match topic {
        Some(topic) => serde_json::json!({ "topic": topic }),
        None => serde_json::Value::Null,
    };
    let body = serde_json::json!({
        "platform": platform,
        "content": content,
        "target_ref": target_ref,
        "scheduled_time": at,
        "max_retries": max_retries,
        "metadata": metadata,
    });

    let response = reqwest::Client::new()
        .post(format!("{}/api/posts", daemon_url.trim_end_matches('/')))
        .json(&body)
        .send()
        .await
        .map_err(|e| miette::miette!("{}", e))?;

    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| miette::miette!("{}", e))?;

    if !status.is_success() {
        return Err(miette::miette!(
            "daemon rejected post: {}",
            body["error"].as_str().unwrap_or("unknown error")
        ));
    }

    println!("scheduled post {} for {}", body["id"], at);
    Ok(())
}

async fn status(daemon_url: &str) -> Result<()> {
    let body: serde_json::Value = reqwest::Client::new()
        .get(format!("{}/api/status", daemon_url.trim_end_matches('/')))
        .send()
        .await
        .map_err(|e| miette::miette!("{}", e))?
        .json()
        .await
        .map_err(|e| miette::miette!("{}", e))?;

    let pretty = serde_json::to_string_pretty(&body).map_err(|e| miette::miette!("{}", e))?;
    println!("{}", pretty);
    Ok(())
}
