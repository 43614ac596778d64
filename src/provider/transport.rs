use crate::config::HttpConfig;
use crate::error::TransportError;
use crate::request::ProviderRequest;
use crate::Result;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Raw provider response: body bytes plus the declared content type.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

/// Shared HTTP client. Holds no per-request state: every call is independent.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(cfg: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent(concat!("geoweather-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| crate::Error::Transport(TransportError::Other(e.to_string())))?;
        Ok(Self { client })
    }

    /// Issue exactly one request. Non-2xx responses are transport failures.
    pub async fn fetch(&self, req: &ProviderRequest) -> std::result::Result<FetchedBody, TransportError> {
        let url = req.url()?;
        tracing::debug!(method = %req.method, url = %req.redacted_url(), "provider request");

        let response = self
            .client
            .request(req.method.clone(), url)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: req.redacted_url(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        tracing::debug!(status = status.as_u16(), len = bytes.len(), "provider response");

        Ok(FetchedBody {
            bytes,
            content_type,
        })
    }

    /// Fetch and decode a JSON body into the provider's declared shape.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        req: &ProviderRequest,
    ) -> std::result::Result<T, TransportError> {
        let body = self.fetch(req).await?;
        serde_json::from_slice(&body.bytes).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
