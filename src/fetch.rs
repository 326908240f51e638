//! Direct HTTP fetching for the static layers.
//!
//! Not a browser, just HTTP: one shared `reqwest` client with a browser-like
//! identity, bounded redirects, a timeout and a response size cap.

use crate::config::STATIC_USER_AGENT;
use crate::error::FetchError;
use reqwest::header::{self, HeaderMap, HeaderValue};
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP client shared by the static layers.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    /// Build a client with a desktop Chrome user agent.
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(STATIC_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            max_body_bytes,
        })
    }

    /// GET `url` and return its body as text.
    ///
    /// Fails on non-2xx statuses, non-HTML content types and bodies larger
    /// than the configured cap. The body is streamed, so an oversized or
    /// endless response is abandoned as soon as it passes the cap.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(ct) = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            let ct = ct.to_ascii_lowercase();
            if !(ct.contains("html") || ct.contains("xml") || ct.starts_with("text/")) {
                return Err(FetchError::NotHtml(ct));
            }
        }

        let too_large = FetchError::TooLarge {
            limit: self.max_body_bytes,
        };
        if let Some(len) = response.content_length() {
            if len as usize > self.max_body_bytes {
                return Err(too_large);
            }
        }

        // Chunked bodies carry no length; stop reading once the cap is passed.
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if bytes.len() + chunk.len() > self.max_body_bytes {
                debug!(read = bytes.len() + chunk.len(), "Body over cap; aborting download");
                return Err(too_large);
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(bytes = bytes.len(), status = status.as_u16(), "Fetched page");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
