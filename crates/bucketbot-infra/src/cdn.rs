//! CDN edge cache purge client
//!
//! Talks to the DigitalOcean CDN API: edge endpoints are listed once per
//! purge, the one serving the bucket is selected, and the object path is
//! purged from its cache.

use bucketbot_core::{CdnConfig, ErrorMetadata, LogLevel, StorageConfig};
use bucketbot_storage::urls::endpoint_host;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const ENDPOINTS_PER_PAGE: usize = 200;

/// CDN operation errors
#[derive(Debug, Error)]
pub enum CdnError {
    #[error("CDN purge is not configured: {0}")]
    NotConfigured(String),

    #[error("No CDN endpoint serves {0}")]
    EndpointNotFound(String),

    #[error("CDN API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("CDN API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ErrorMetadata for CdnError {
    fn error_code(&self) -> &'static str {
        match self {
            CdnError::NotConfigured(_) => "CDN_NOT_CONFIGURED",
            CdnError::EndpointNotFound(_) => "CDN_ENDPOINT_NOT_FOUND",
            CdnError::Api { .. } => "CDN_API_ERROR",
            CdnError::Http(_) => "CDN_HTTP_ERROR",
        }
    }

    fn user_message(&self) -> String {
        self.to_string()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            CdnError::NotConfigured(_) | CdnError::EndpointNotFound(_) => LogLevel::Warn,
            CdnError::Api { .. } | CdnError::Http(_) => LogLevel::Error,
        }
    }
}

/// One CDN edge endpoint as reported by the API
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CdnEndpoint {
    pub id: String,
    pub origin: String,
    pub endpoint: String,
    #[serde(default)]
    pub custom_domain: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EndpointsPage {
    #[serde(default)]
    endpoints: Vec<CdnEndpoint>,
    #[serde(default)]
    meta: Option<PageMeta>,
}

#[derive(Debug, Deserialize)]
struct PageMeta {
    total: usize,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// How the endpoint to purge is recognized among the account's endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
enum EndpointSelector {
    /// Edge hostname or custom domain
    Edge(String),
    /// Bucket origin hostname
    Origin(String),
}

impl EndpointSelector {
    fn matches(&self, endpoint: &CdnEndpoint) -> bool {
        match self {
            EndpointSelector::Edge(host) => {
                endpoint.endpoint.eq_ignore_ascii_case(host)
                    || endpoint
                        .custom_domain
                        .as_deref()
                        .map(|domain| domain.eq_ignore_ascii_case(host))
                        .unwrap_or(false)
            }
            EndpointSelector::Origin(host) => endpoint.origin.eq_ignore_ascii_case(host),
        }
    }

    fn describe(&self) -> &str {
        match self {
            EndpointSelector::Edge(host) | EndpointSelector::Origin(host) => host,
        }
    }
}

/// DigitalOcean CDN client
#[derive(Clone, Debug)]
pub struct CdnClient {
    client: Client,
    api_url: String,
    api_token: String,
    selector: EndpointSelector,
}

impl CdnClient {
    /// Build a client when purge is enabled.
    ///
    /// Returns `Ok(None)` when no API token is configured.
    pub fn from_config(cdn: &CdnConfig, storage: &StorageConfig) -> Result<Option<Self>, CdnError> {
        let api_token = match &cdn.api_token {
            Some(token) => token.clone(),
            None => return Ok(None),
        };

        let selector = match (&cdn.edge_endpoint_url, &storage.bucket) {
            (Some(edge), _) => EndpointSelector::Edge(endpoint_host(edge).to_string()),
            (None, Some(bucket)) => {
                let host = storage
                    .endpoint_url
                    .as_deref()
                    .map(endpoint_host)
                    .unwrap_or("s3.amazonaws.com");
                EndpointSelector::Origin(format!("{}.{}", bucket, host))
            }
            (None, None) => {
                return Err(CdnError::NotConfigured(
                    "EDGE_ENDPOINT_URL or BUCKET_NAME is required to find the CDN endpoint"
                        .to_string(),
                ))
            }
        };

        Ok(Some(Self {
            client: Client::new(),
            api_url: cdn.api_url.trim_end_matches('/').to_string(),
            api_token,
            selector,
        }))
    }

    /// List every CDN endpoint on the account
    pub async fn list_endpoints(&self) -> Result<Vec<CdnEndpoint>, CdnError> {
        let mut endpoints = Vec::new();
        let mut page = 1;

        loop {
            let response = self
                .client
                .get(format!("{}/v2/cdn/endpoints", self.api_url))
                .bearer_auth(&self.api_token)
                .query(&[
                    ("page", page.to_string()),
                    ("per_page", ENDPOINTS_PER_PAGE.to_string()),
                ])
                .send()
                .await?;

            let body: EndpointsPage = check_status(response).await?.json().await?;
            let fetched = body.endpoints.len();
            endpoints.extend(body.endpoints);

            let total = body.meta.map(|m| m.total).unwrap_or(endpoints.len());
            if fetched == 0 || endpoints.len() >= total {
                break;
            }
            page += 1;
        }

        Ok(endpoints)
    }

    /// The endpoint serving this bot's bucket
    pub async fn find_endpoint(&self) -> Result<CdnEndpoint, CdnError> {
        self.list_endpoints()
            .await?
            .into_iter()
            .find(|endpoint| self.selector.matches(endpoint))
            .ok_or_else(|| CdnError::EndpointNotFound(self.selector.describe().to_string()))
    }

    /// Purge one object path from the edge cache
    pub async fn purge(&self, key: &str) -> Result<(), CdnError> {
        let start = std::time::Instant::now();
        let endpoint = self.find_endpoint().await?;

        let response = self
            .client
            .delete(format!("{}/v2/cdn/endpoints/{}/cache", self.api_url, endpoint.id))
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({ "files": [key] }))
            .send()
            .await?;

        check_status(response).await.map_err(|e| {
            tracing::error!(
                error = %e,
                endpoint_id = %endpoint.id,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "CDN purge failed"
            );
            e
        })?;

        tracing::info!(
            endpoint_id = %endpoint.id,
            endpoint = %endpoint.endpoint,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "CDN cache purged"
        );

        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CdnError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.message)
        .unwrap_or(text);

    Err(CdnError::Api {
        status: status.as_u16(),
        message,
    })
}
