use url::Url;

use crate::error::{MondoError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.monzo.com";

/// Where requests are sent. Every API path is appended to `base_url`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|err| {
            MondoError::InvalidInput(format!("invalid base url '{}': {}", base_url, err))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MondoError::InvalidInput(format!(
                "base url must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// URL of a single resource, with `id` percent-encoded as one path segment.
    pub fn resource_url(&self, collection: &str, id: &str) -> Result<String> {
        if matches!(id, "." | "..") {
            return Err(MondoError::InvalidInput(format!(
                "'{}' is not a valid resource id",
                id
            )));
        }

        let mut url = Url::parse(&self.base_url).map_err(|err| {
            MondoError::InvalidInput(format!("invalid base url '{}': {}", self.base_url, err))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                MondoError::InvalidInput(format!("base url '{}' cannot have a path", self.base_url))
            })?
            .pop_if_empty()
            .push(collection)
            .push(id);

        Ok(url.into())
    }

    pub(crate) fn http_client(&self) -> reqwest::Client {
        reqwest::Client::new()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}
