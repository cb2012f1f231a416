//! HTTP retrieval with optional gzip and JSON decoding.
//!
//! The fetcher never panics and never retries. Every failure is logged with the
//! URL that produced it and handed back as a [`FetchError`], so the caller can
//! decide whether a missing document stops the current source.

use std::io::Read;
use std::str::FromStr;

use flate2::read::MultiGzDecoder;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::FetcherConfig;
use crate::error::FetchError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Create a reqwest Client with the provided configuration
pub fn create_client(config: &FetcherConfig) -> Result<Client, FetchError> {
    let mut client_builder = Client::builder()
        .use_rustls_tls()
        .user_agent(&config.user_agent)
        .default_headers(config.headers.clone());

    if !config.timeout.is_zero() {
        client_builder = client_builder.timeout(config.timeout);
    }

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    client_builder.build().map_err(FetchError::from)
}

/// How a response body should be interpreted.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Parse the decoded text as JSON
    pub expect_json: bool,
    /// Body is gzip compressed; falls back to plain text when it is not
    pub gzipped: bool,
    /// Extra request headers, merged over the client defaults
    pub headers: HeaderMap,
    /// Hand back the live response without reading the body
    pub stream: bool,
}

impl FetchOptions {
    pub fn json() -> Self {
        Self {
            expect_json: true,
            ..Self::default()
        }
    }

    pub fn text() -> Self {
        Self::default()
    }

    pub fn streaming() -> Self {
        Self {
            stream: true,
            ..Self::default()
        }
    }

    pub fn gzipped(mut self) -> Self {
        self.gzipped = true;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self, FetchError> {
        let name = HeaderName::from_str(name)
            .map_err(|e| FetchError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| FetchError::InvalidHeader(format!("{name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// A successfully retrieved resource.
#[derive(Debug)]
pub enum Fetched {
    Json(Value),
    Text(String),
    Stream(Response),
}

impl Fetched {
    pub fn into_json(self) -> Option<Value> {
        match self {
            Fetched::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Fetched::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &FetcherConfig) -> Result<Self, FetchError> {
        Ok(Self::new(create_client(config)?))
    }

    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Fetched, FetchError> {
        info!(url, "Fetching URL");

        let result = self.fetch_inner(url, options).await;
        if let Err(e) = &result {
            match e {
                FetchError::Json(_) => error!(url, error = %e, "Error decoding JSON"),
                e if e.is_network() => error!(url, error = %e, "Error fetching"),
                _ => error!(url, error = %e, "An unexpected error occurred"),
            }
        }
        result
    }

    async fn fetch_inner(&self, url: &str, options: &FetchOptions) -> Result<Fetched, FetchError> {
        let response = self
            .client
            .get(url)
            .headers(options.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        if options.stream {
            info!("Returning streaming response");
            return Ok(Fetched::Stream(response));
        }

        let body = response.bytes().await?;
        debug!(url, bytes = body.len(), "Response body received");

        let text = decode_body(&body, options.gzipped)?;

        if options.expect_json {
            debug!("Parsing JSON data");
            Ok(Fetched::Json(serde_json::from_str(&text)?))
        } else {
            debug!("Returning raw text content");
            Ok(Fetched::Text(text))
        }
    }
}

/// Turn a response body into text.
///
/// With `gzipped` set, a body lacking the gzip magic bytes is taken to be
/// plain text already. A body that has them but fails to inflate is an error.
pub fn decode_body(body: &[u8], gzipped: bool) -> Result<String, FetchError> {
    if gzipped {
        if body.starts_with(&GZIP_MAGIC) {
            debug!("Decompressing gzipped content");
            let mut decoded = Vec::new();
            MultiGzDecoder::new(body)
                .read_to_end(&mut decoded)
                .map_err(FetchError::Gzip)?;
            return Ok(String::from_utf8(decoded)?);
        }
        warn!("Content was not gzipped, trying as plain text");
    }

    Ok(String::from_utf8(body.to_vec())?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{Compression, write::GzEncoder};
    use reqwest::StatusCode;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn fetcher() -> Fetcher {
        Fetcher::from_config(&FetcherConfig::default()).unwrap()
    }

    async fn serve(route: &str, template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn decode_gzip_body() {
        let body = gzip("{\"a\":1}".as_bytes());
        assert_eq!(decode_body(&body, true).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn decode_plain_body_when_gzip_expected() {
        let text = decode_body(b"plain text", true).unwrap();
        assert_eq!(text, "plain text");
    }

    #[test]
    fn decode_corrupt_gzip_fails() {
        // magic bytes followed by an unknown compression method
        let body = [0x1f, 0x8b, 0x00, 0, 0, 0, 0, 0, 0, 0xff, 1, 2, 3];
        let err = decode_body(&body, true).unwrap_err();
        assert!(matches!(err, FetchError::Gzip(_)));
        assert!(err.is_decode());
    }

    #[test]
    fn decode_invalid_utf8_fails() {
        let err = decode_body(&[0xff, 0xfe, 0xfd], false).unwrap_err();
        assert!(matches!(err, FetchError::Utf8(_)));
    }

    #[test]
    fn decode_leaves_gzip_bytes_alone_without_flag() {
        let body = gzip(b"hello");
        assert!(decode_body(&body, false).is_err());
    }

    #[test]
    fn invalid_header_is_rejected() {
        let err = FetchOptions::text().header("bad header", "x").unwrap_err();
        assert!(matches!(err, FetchError::InvalidHeader(_)));
    }

    #[tokio::test]
    async fn fetch_gzipped_json() {
        let body = gzip(br#"{"channels":{"a":{"name":"A"}}}"#);
        let server = serve(
            "/catalog.json.gz",
            ResponseTemplate::new(200).set_body_bytes(body),
        )
        .await;

        let fetched = fetcher()
            .fetch(
                &format!("{}/catalog.json.gz", server.uri()),
                &FetchOptions::json().gzipped(),
            )
            .await
            .unwrap();

        let value = fetched.into_json().unwrap();
        assert_eq!(value["channels"]["a"]["name"], "A");
    }

    #[tokio::test]
    async fn fetch_plain_json_flagged_as_gzip() {
        let server = serve(
            "/catalog.json",
            ResponseTemplate::new(200).set_body_string(r#"{"channels":{}}"#),
        )
        .await;

        let fetched = fetcher()
            .fetch(
                &format!("{}/catalog.json", server.uri()),
                &FetchOptions::json().gzipped(),
            )
            .await
            .unwrap();

        assert!(fetched.into_json().unwrap()["channels"].is_object());
    }

    #[tokio::test]
    async fn fetch_text_falls_back_on_non_gzip_bytes() {
        let server = serve(
            "/list.txt",
            ResponseTemplate::new(200).set_body_string("line one\nline two"),
        )
        .await;

        let fetched = fetcher()
            .fetch(
                &format!("{}/list.txt", server.uri()),
                &FetchOptions::text().gzipped(),
            )
            .await
            .unwrap();

        assert_eq!(fetched.into_text().unwrap(), "line one\nline two");
    }

    #[tokio::test]
    async fn fetch_error_status() {
        let server = serve("/missing", ResponseTemplate::new(404)).await;

        let err = fetcher()
            .fetch(
                &format!("{}/missing", server.uri()),
                &FetchOptions::json(),
            )
            .await
            .unwrap_err();

        match err {
            FetchError::Status { status, .. } => assert_eq!(status, StatusCode::NOT_FOUND),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fetch_invalid_json() {
        let server = serve(
            "/broken.json",
            ResponseTemplate::new(200).set_body_string("{\"channels\": "),
        )
        .await;

        let err = fetcher()
            .fetch(
                &format!("{}/broken.json", server.uri()),
                &FetchOptions::json(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Json(_)));
        assert!(err.is_decode());
        assert!(!err.is_network());
    }

    #[tokio::test]
    async fn fetch_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher()
            .fetch(&format!("http://{addr}/catalog"), &FetchOptions::json())
            .await
            .unwrap_err();

        assert!(err.is_network());
    }

    #[tokio::test]
    async fn fetch_sends_user_agent_and_extra_headers() {
        let server = serve("/headers", ResponseTemplate::new(200).set_body_string("ok")).await;

        let options = FetchOptions::text().header("x-source", "test").unwrap();
        let fetched = fetcher()
            .fetch(&format!("{}/headers", server.uri()), &options)
            .await
            .unwrap();
        assert_eq!(fetched.into_text().unwrap(), "ok");

        // the user agent contains commas, so compare the raw header values
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let headers = &requests[0].headers;
        assert_eq!(
            headers.get("user-agent").unwrap().to_str().unwrap(),
            crate::config::DEFAULT_USER_AGENT
        );
        assert_eq!(headers.get("x-source").unwrap().to_str().unwrap(), "test");
    }

    #[tokio::test]
    async fn fetch_streaming_returns_live_response() {
        let server = serve(
            "/big.m3u",
            ResponseTemplate::new(200).set_body_string("#EXTM3U\n"),
        )
        .await;

        let fetched = fetcher()
            .fetch(
                &format!("{}/big.m3u", server.uri()),
                &FetchOptions::streaming(),
            )
            .await
            .unwrap();

        let Fetched::Stream(response) = fetched else {
            panic!("expected a streaming response");
        };
        assert_eq!(response.text().await.unwrap(), "#EXTM3U\n");
    }
}
