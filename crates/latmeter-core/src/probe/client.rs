use std::time::Duration;

use crate::error::LatmeterError;

/// Wrapper around a reqwest Client with builder-pattern configuration.
/// One client is shared across all sessions of a run.
pub struct HttpClient {
    inner: reqwest::Client,
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            user_agent: format!("latmeter/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-request timeout. A timed-out attempt counts as a failure for the
    /// session; it never aborts the remaining attempts.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    pub fn build(self) -> Result<HttpClient, LatmeterError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent)
            .gzip(true)
            .build()?;

        Ok(HttpClient { inner: client })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        HttpClientBuilder::default()
            .build()
            .expect("Default HttpClient should always build successfully")
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Issue one GET and drain the body, so the measured time covers the
    /// full download. Returns the final status code after redirects.
    pub async fn get(&self, url: &str) -> Result<u16, reqwest::Error> {
        let response = self.inner.get(url).send().await?;
        let status = response.status().as_u16();
        response.bytes().await?;
        Ok(status)
    }
}
