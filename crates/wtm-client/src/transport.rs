//! Async HTTP transport wrapping reqwest.
//!
//! Not a browser, just HTTP requests with a cookie jar. Redirects are
//! followed, non-2xx answers become errors, nothing is retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use url::Url;
use wtm_core::{WtmError, WtmResult};

use crate::config::ClientConfig;

/// Response from a GET or POST request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub final_url: String,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The two request shapes the session needs.
///
/// Headers are passed explicitly on every call; implementations keep no
/// per-session header state besides cookies.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> WtmResult<HttpResponse>;

    /// POST an url-encoded form.
    async fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
        headers: &HeaderMap,
    ) -> WtmResult<HttpResponse>;
}

/// reqwest-backed transport with a cookie store.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with the configured user-agent and per-request timeout.
    pub fn new(config: &ClientConfig) -> WtmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()
            .map_err(|e| WtmError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    async fn send(&self, url: &Url, builder: reqwest::RequestBuilder) -> WtmResult<HttpResponse> {
        let r = builder.send().await.map_err(|e| network_error(url, e))?;
        let status = r.status();
        let final_url = r.url().to_string();

        if !status.is_success() {
            return Err(WtmError::HttpStatus {
                url: final_url,
                status: status.as_u16(),
            });
        }

        let body = r.bytes().await.map_err(|e| network_error(url, e))?;

        Ok(HttpResponse {
            final_url,
            body: body.to_vec(),
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get(&self, url: &Url, headers: &HeaderMap) -> WtmResult<HttpResponse> {
        let builder = self.client.get(url.clone()).headers(headers.clone());
        self.send(url, builder).await
    }

    async fn post_form(
        &self,
        url: &Url,
        form: &[(&str, &str)],
        headers: &HeaderMap,
    ) -> WtmResult<HttpResponse> {
        let builder = self
            .client
            .post(url.clone())
            .headers(headers.clone())
            .form(form);
        self.send(url, builder).await
    }
}

/// Map a reqwest failure onto the network error class.
pub fn network_error(url: &Url, e: reqwest::Error) -> WtmError {
    if e.is_timeout() {
        WtmError::Timeout(url.to_string())
    } else {
        WtmError::Network(format!("{url}: {e}"))
    }
}
