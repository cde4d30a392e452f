use std::time::Duration;

use items_list_core::ListRequest;
use panel_logging::panel_debug;

use crate::{FailureKind, FetchError, RawPage, Resource};

#[derive(Debug, Clone)]
pub struct ResourceSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ResourceSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for ResourceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Paged JSON resource answering `GET base_url?page=..&page_size=..` with
/// `{ "count": n, "results": [..] }`.
#[derive(Debug, Clone)]
pub struct ReqwestResource {
    settings: ResourceSettings,
    client: reqwest::Client,
}

impl ReqwestResource {
    pub fn new(settings: ResourceSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ResourceSettings {
        &self.settings
    }

    fn request_url(&self, request: &ListRequest) -> Result<url::Url, FetchError> {
        let mut url = url::Url::parse(&self.settings.base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        url.query_pairs_mut().extend_pairs(request.query_pairs());
        Ok(url)
    }
}

#[async_trait::async_trait]
impl Resource for ReqwestResource {
    async fn query(&self, request: &ListRequest) -> Result<RawPage, FetchError> {
        let url = self.request_url(request)?;
        panel_debug!("GET {}", url);

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
