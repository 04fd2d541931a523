use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};

use crate::error::{Result, TravlogError};

pub const API_BASE: &str = "https://api.travis-ci.org";

/// Media type selecting the v2 API representation. The service keys the
/// versioned representation off Content-Type, even on GET.
const MEDIA_TYPE: &str = "application/vnd.travis-ci.2+json";

const USER_AGENT_STR: &str = concat!("travlog/", env!("CARGO_PKG_VERSION"));

/// Travis CI API client. Single attempt per request, no retries.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(API_BASE.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STR));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| TravlogError::Api(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Fetch a versioned-API JSON document as a generic structured value.
    /// Transport failures and non-2xx statuses surface as request failures;
    /// an unparsable body surfaces as a decode failure.
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url}");
        let response = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Fetch a raw resource (a job log) as bytes.
    pub async fn get_raw(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {url}");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
