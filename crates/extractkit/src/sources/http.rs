//! Static HTTP content source
//!
//! Fetches a page over HTTP GET with a scoped client: the client is built
//! for the call and dropped with it, so no connection state leaks between
//! extraction attempts. The body is streamed against a deadline derived
//! from the caller's timeout; running past the deadline is a fetch
//! failure, not partial content.

use crate::error::FetchError;
use crate::sources::ContentSource;
use crate::types::RawContent;
use crate::DEFAULT_USER_AGENT;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use std::time::Duration;
use tracing::debug;

/// HTTP GET content source
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    user_agent: Option<String>,
}

impl HttpSource {
    /// Create a source with the default User-Agent
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let user_agent = self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT)),
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html, text/plain, */*;q=0.8"),
        );
        headers
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, url: &str, timeout: Duration) -> Result<RawContent, FetchError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(FetchError::InvalidUrl);
        }

        // Scoped client: built for this call, dropped with it.
        let client = reqwest::Client::builder()
            .default_headers(self.headers())
            .connect_timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;

        let deadline = tokio::time::Instant::now() + timeout;

        let response = tokio::select! {
            response = client.get(url).send() => response.map_err(FetchError::from_reqwest)?,
            _ = tokio::time::sleep_until(deadline) => return Err(FetchError::Timeout),
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = read_body_until(response, deadline).await?;
        debug!(%url, length = body.len(), "fetched");

        let mut content = RawContent::new(url, body);
        if let Some(content_type) = content_type {
            content = content.with_content_type(content_type);
        }
        Ok(content)
    }
}

/// Stream the response body, failing if the deadline passes first
async fn read_body_until(
    response: reqwest::Response,
    deadline: tokio::time::Instant,
) -> Result<String, FetchError> {
    let mut body: Vec<u8> = Vec::new();
    let mut stream = response.bytes_stream();

    loop {
        tokio::select! {
            chunk = stream.next() => {
                match chunk {
                    Some(Ok(bytes)) => body.extend_from_slice(&bytes),
                    Some(Err(err)) => return Err(FetchError::from_reqwest(err)),
                    None => return Ok(String::from_utf8_lossy(&body).into_owned()),
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                return Err(FetchError::Timeout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_success_carries_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>hi</body></html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let source = HttpSource::new();
        let content = source
            .fetch(&format!("{}/page", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert!(content.body.contains("hi"));
        assert_eq!(content.content_type.as_deref(), Some("text/html"));
        assert_eq!(content.url, format!("{}/page", server.uri()));
        assert!(content.len() > 0);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = HttpSource::new();
        let result = source
            .fetch(&format!("{}/missing", server.uri()), Duration::from_secs(5))
            .await;

        assert!(matches!(result, Err(FetchError::HttpStatus(404))));
    }

    #[tokio::test]
    async fn test_fetch_times_out_on_slow_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let source = HttpSource::new();
        let result = source
            .fetch(
                &format!("{}/slow", server.uri()),
                Duration::from_millis(100),
            )
            .await;

        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_fetch_sends_custom_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "CustomBot/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let source = HttpSource::new().user_agent("CustomBot/1.0");
        let content = source
            .fetch(&format!("{}/", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(content.body, "ok");
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_http_scheme() {
        let source = HttpSource::new();
        let result = source
            .fetch("ftp://example.com/file", Duration::from_secs(5))
            .await;
        assert!(matches!(result, Err(FetchError::InvalidUrl)));
    }
}
