pub mod url;

use std::collections::HashMap;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use log::{debug, warn};
use reqwest::header::{HeaderMap, ACCEPT_ENCODING, CONTENT_ENCODING, TRANSFER_ENCODING};

use crate::error::{Error, Result};
pub use url::{ParsedUrl, Scheme};

/// Provider of raw markup for an address. Implementations return decoded
/// text only; anything still framed or compressed is an error.
pub trait PageSource {
    fn fetch(&self, address: &str) -> Result<String>;
}

/// Configuration for the NetworkManager
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum number of redirects to follow
    pub max_redirects: u32,
    /// Attempts made for a request that fails in transport
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds, doubled after each failure
    pub initial_backoff_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_redirects: 5,
            max_retries: 3,
            initial_backoff_ms: 100,
        }
    }
}

/// Fetches documents over http(s) or from the local filesystem.
pub struct NetworkManager {
    config: NetworkConfig,
    client: reqwest::blocking::Client,
}

impl NetworkManager {
    pub fn new() -> Result<Self> {
        Self::with_config(NetworkConfig::default())
    }

    pub fn with_config(config: NetworkConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    fn fetch_with_retries(&self, url: &ParsedUrl) -> Result<String> {
        let mut attempt = 0;
        let mut backoff = self.config.initial_backoff_ms;
        loop {
            attempt += 1;
            match self.do_fetch(url) {
                Err(e) if is_transient(&e) && attempt < self.config.max_retries => {
                    warn!("fetch attempt {} failed for {}: {}", attempt, url, e);
                    thread::sleep(Duration::from_millis(backoff));
                    backoff *= 2;
                }
                result => return result,
            }
        }
    }

    fn do_fetch(&self, url: &ParsedUrl) -> Result<String> {
        let response = self
            .client
            .get(url.to_string())
            .header(ACCEPT_ENCODING, "identity")
            .send()?;

        check_transfer_headers(response.headers())?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus(status.as_u16()));
        }

        let body = response.text()?;
        debug!("fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn read_file(&self, url: &ParsedUrl) -> Result<String> {
        let path = PathBuf::from(&url.path);
        let body = std::fs::read_to_string(&path).map_err(|source| Error::Io { path, source })?;
        debug!("read {} bytes from {}", body.len(), url.path);
        Ok(body)
    }
}

impl PageSource for NetworkManager {
    fn fetch(&self, address: &str) -> Result<String> {
        let url = ParsedUrl::parse(address)?;
        match url.scheme {
            Scheme::Http | Scheme::Https => self.fetch_with_retries(&url),
            Scheme::File => self.read_file(&url),
        }
    }
}

/// Connection failures and timeouts are worth another attempt. Bad
/// statuses, encodings and body decoding errors are not.
fn is_transient(err: &Error) -> bool {
    matches!(err, Error::Request(e) if e.is_connect() || e.is_timeout())
}

/// Reject responses that still carry a transfer or content encoding.
pub fn check_transfer_headers(headers: &HeaderMap) -> Result<()> {
    for name in [TRANSFER_ENCODING, CONTENT_ENCODING] {
        if let Some(value) = headers.get(&name) {
            return Err(Error::UnsupportedEncoding {
                header: name.as_str().to_string(),
                value: value.to_str().unwrap_or("<binary>").to_string(),
            });
        }
    }
    Ok(())
}

/// In-memory documents keyed by address.
#[derive(Debug, Default, Clone)]
pub struct StaticSource {
    pages: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, address: &str, markup: &str) -> Self {
        self.pages.insert(address.to_string(), markup.to_string());
        self
    }
}

impl PageSource for StaticSource {
    fn fetch(&self, address: &str) -> Result<String> {
        self.pages
            .get(address)
            .cloned()
            .ok_or_else(|| Error::NotFound(address.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    #[test]
    fn test_plain_headers_accepted() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        assert!(check_transfer_headers(&headers).is_ok());
    }

    #[test]
    fn test_chunked_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        match check_transfer_headers(&headers) {
            Err(Error::UnsupportedEncoding { header, value }) => {
                assert_eq!(header, "transfer-encoding");
                assert_eq!(value, "chunked");
            }
            other => panic!("expected encoding error, got {:?}", other),
        }
    }

    #[test]
    fn test_compressed_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        assert!(matches!(
            check_transfer_headers(&headers),
            Err(Error::UnsupportedEncoding { header, .. }) if header == "content-encoding"
        ));
    }

    #[test]
    fn test_static_source() {
        let source = StaticSource::new().with_page("test://a", "<p>a</p>");
        assert_eq!(source.fetch("test://a").unwrap(), "<p>a</p>");
        assert!(matches!(source.fetch("test://b"), Err(Error::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_source() {
        let path = std::env::temp_dir().join(format!("quire_net_test_{}.html", std::process::id()));
        std::fs::write(&path, "<p>from disk</p>").unwrap();
        let address = format!("file://{}", path.display());
        let body = NetworkManager::new().unwrap().fetch(&address).unwrap();
        assert_eq!(body, "<p>from disk</p>");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let err = NetworkManager::new().unwrap().fetch("file:///nonexistent/quire/page.html").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_refused_connection_is_retried_then_reported() {
        let manager = NetworkManager::with_config(NetworkConfig {
            max_retries: 2,
            initial_backoff_ms: 1,
            ..NetworkConfig::default()
        })
        .unwrap();
        let err = manager.fetch("http://127.0.0.1:1/").unwrap_err();
        assert!(is_transient(&err), "expected a connect error, got {:?}", err);
    }

    #[test]
    fn test_non_transport_errors_not_retried() {
        assert!(!is_transient(&Error::HttpStatus(503)));
        assert!(!is_transient(&Error::NotFound("x".to_string())));
        assert!(!is_transient(&Error::UnsupportedEncoding {
            header: "content-encoding".to_string(),
            value: "gzip".to_string(),
        }));

        let client = reqwest::blocking::Client::new();
        let builder_err = client.get("http://").send().unwrap_err();
        assert!(!is_transient(&Error::Request(builder_err)));
    }

    #[test]
    fn test_unsupported_scheme_not_fetched() {
        let err = NetworkManager::new().unwrap().fetch("gopher://example.org/").unwrap_err();
        assert!(matches!(err, Error::UnsupportedScheme(_)));
    }
}
