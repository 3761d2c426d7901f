//! HTTP client for the publishing endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::{Profile, PublishError, PublishReceipt, PublishRequest, Publisher};

/// Client for a Buffer-style publishing queue API.
pub struct PublishClient {
    http: Client,
    base_url: String,
    access_token: String,
}

impl PublishClient {
    /// Create a new client for the given API base URL.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// List the connected destination profiles.
    pub async fn profiles(&self) -> Result<Vec<Profile>, PublishError> {
        let url = format!("{}/profiles.json", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await?;

        let response = check_status(response).await?;
        let profiles: Vec<Profile> = response.json().await?;
        debug!(count = profiles.len(), "fetched publish profiles");
        Ok(profiles)
    }

    /// Queue one update for immediate publication.
    pub async fn publish(
        &self,
        platform: &str,
        target_ref: &str,
        content: &str,
    ) -> Result<PublishReceipt, PublishError> {
        let url = format!("{}/updates/create.json", self.base_url);

        let form = [
            ("access_token", self.access_token.as_str()),
            ("profile_ids[]", target_ref),
            ("text", content),
            ("now", "true"),
        ];

        let response = self.http.post(&url).form(&form).send().await?;
        let response = check_status(response).await?;

        let receipt: PublishReceipt = response.json().await?;
        if receipt.success == Some(false) {
            return Err(PublishError::InvalidResponse(
                "endpoint reported success=false".to_string(),
            ));
        }

        debug!(platform, target_ref, remote_id = ?receipt.id, "queued update");
        Ok(receipt)
    }

    /// Adapt this client to the dispatcher's [`Publisher`] seam.
    pub fn into_publisher(self: Arc<Self>) -> Publisher {
        Arc::new(move |req: PublishRequest| {
            let client = Arc::clone(&self);
            Box::pin(async move {
                match client
                    .publish(&req.platform, &req.target_ref, &req.content)
                    .await
                {
                    Ok(_receipt) => Ok(()),
                    Err(e) => {
                        warn!(
                            id = %req.post_id,
                            platform = %req.platform,
                            error = %e,
                            "publish call failed"
                        );
                        Err(e.to_string())
                    }
                }
            })
        })
    }
}

/// Map non-success statuses to typed errors, passing successes through.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, PublishError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        return Err(PublishError::RateLimited { retry_after_secs });
    }

    let message = response
        .text()
        .await
        .unwrap_or_else(|e| format!("failed to read error body: {}", e));
    Err(PublishError::Api {
        status: status.as_u16(),
        message,
    })
}
