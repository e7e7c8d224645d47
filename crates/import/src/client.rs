//! Collaborator services and their HTTP implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::token::ImportToken;
use crate::withings::{MeasureEnvelope, MeasureGroup};

/// Intermediary that holds the provider's client credentials.
#[async_trait]
pub trait AuthorizationService: Send + Sync {
    /// URL of the provider's consent page.
    async fn authorization_url(&self) -> Result<String>;

    /// Exchange an authorization code for an access token.
    async fn exchange_token(&self, code: &str) -> Result<ImportToken>;
}

/// Source of raw measure groups.
#[async_trait]
pub trait MeasurementSource: Send + Sync {
    /// Measure groups of the given type codes updated since `since`.
    async fn fetch_groups(
        &self,
        token: &ImportToken,
        codes: &[i32],
        since: DateTime<Utc>,
    ) -> Result<Vec<MeasureGroup>>;
}

/// Endpoints and limits for [`HttpIntermediary`].
#[derive(Debug, Clone)]
pub struct IntermediaryConfig {
    /// Base URL of the serverless functions
    pub auth_base_url: String,

    /// Provider measure endpoint
    pub measure_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for IntermediaryConfig {
    fn default() -> Self {
        Self {
            auth_base_url: "https://stchvygpxhwqzlnlppka.supabase.co/functions/v1".to_string(),
            measure_url: "https://wbsapi.withings.net/measure".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the authorization intermediary and the provider API.
#[derive(Clone)]
pub struct HttpIntermediary {
    client: Client,
    config: IntermediaryConfig,
}

impl HttpIntermediary {
    /// Create a client.
    pub fn new(config: IntermediaryConfig) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(config.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.config.auth_base_url.trim_end_matches('/'), name)
    }
}

async fn error_text(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("status {}: {}", status, body)
}

#[async_trait]
impl AuthorizationService for HttpIntermediary {
    async fn authorization_url(&self) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint("withings-auth"))
            .send()
            .await
            .context("Failed to reach authorization service")?;

        if !response.status().is_success() {
            anyhow::bail!("Authorization service error ({})", error_text(response).await);
        }

        #[derive(serde::Deserialize)]
        struct Response {
            url: String,
        }

        let body: Response = response
            .json()
            .await
            .context("Failed to parse authorization response")?;
        debug!("Received authorization URL");
        Ok(body.url)
    }

    async fn exchange_token(&self, code: &str) -> Result<ImportToken> {
        let response = self
            .client
            .post(self.endpoint("withings-exchange"))
            .json(&json!({ "code": code }))
            .send()
            .await
            .context("Failed to reach token exchange")?;

        if !response.status().is_success() {
            anyhow::bail!("Token exchange error ({})", error_text(response).await);
        }

        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            access_token: Option<String>,
            error: Option<String>,
        }

        let body: Response = response
            .json()
            .await
            .context("Failed to parse token exchange response")?;

        match (body.access_token, body.error) {
            (Some(token), _) if !token.is_empty() => Ok(ImportToken::new(token)),
            (_, Some(error)) => anyhow::bail!("{}", error),
            _ => anyhow::bail!("Token exchange returned no access token"),
        }
    }
}

#[async_trait]
impl MeasurementSource for HttpIntermediary {
    async fn fetch_groups(
        &self,
        token: &ImportToken,
        codes: &[i32],
        since: DateTime<Utc>,
    ) -> Result<Vec<MeasureGroup>> {
        let meastypes = codes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let lastupdate = since.timestamp().to_string();

        let response = self
            .client
            .post(&self.config.measure_url)
            .bearer_auth(token.secret())
            .form(&[
                ("action", "getmeas"),
                ("meastypes", meastypes.as_str()),
                ("lastupdate", lastupdate.as_str()),
            ])
            .send()
            .await
            .context("Failed to reach measurement API")?;

        if !response.status().is_success() {
            anyhow::bail!("Measurement API error ({})", error_text(response).await);
        }

        let envelope: MeasureEnvelope = response
            .json()
            .await
            .context("Failed to parse measurement response")?;

        if envelope.status != 0 {
            anyhow::bail!(
                "{}",
                envelope
                    .error
                    .unwrap_or_else(|| format!("provider status {}", envelope.status))
            );
        }

        let groups = envelope.body.unwrap_or_default().measuregrps;
        debug!("Fetched {} measure groups", groups.len());
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let client = HttpIntermediary::new(IntermediaryConfig {
            auth_base_url: "https://fn.example.com/v1/".to_string(),
            ..Default::default()
        });
        assert_eq!(client.endpoint("withings-auth"), "https://fn.example.com/v1/withings-auth");
    }
}
