//! Settings for reaching the remote expense API.

use std::time::Duration;

use reqwest::Url;

/// The API URL used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8800/api/v1";

/// How long to wait for the API before giving up on a request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the remote expense API lives and how to talk to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    /// The URL that endpoint paths such as `/expense/view` are appended to.
    pub base_url: String,
    /// The timeout for a whole request, from connecting to reading the body.
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Create a config for `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Check that the base URL is an absolute HTTP(S) URL.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the URL is not usable.
    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.base_url)
            .map_err(|error| format!("invalid API URL \"{}\": {error}", self.base_url))?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(format!(
                "invalid API URL \"{}\": unsupported scheme \"{scheme}\"",
                self.base_url
            )),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
