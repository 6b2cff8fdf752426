//! HTTP client abstraction for testability

use std::time::Duration;

use super::provider::RouteError;

/// Default request timeout for directions lookups.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for HTTP client operations.
///
/// Lets the directions provider run against a mock in tests instead of the
/// network.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The fully encoded URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get(&self, url: &str) -> Result<Vec<u8>, RouteError>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, RouteError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, RouteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("campus-nav/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RouteError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, RouteError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| RouteError::Http(format!("Request failed: {}", e.without_url())))?;

        // The URL carries the API key, so it never appears in errors
        if !response.status().is_success() {
            return Err(RouteError::Http(format!("HTTP {}", response.status())));
        }

        response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| RouteError::Http(format!("Failed to read response: {}", e.without_url())))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Mock HTTP client that returns a canned response and records URLs.
    pub struct MockHttpClient {
        pub response: Result<Vec<u8>, RouteError>,
        pub requests: Mutex<Vec<String>>,
    }

    impl MockHttpClient {
        pub fn ok(body: impl Into<Vec<u8>>) -> Self {
            Self {
                response: Ok(body.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn err(error: RouteError) -> Self {
            Self {
                response: Err(error),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn last_url(&self) -> Option<String> {
            self.requests.lock().last().cloned()
        }
    }

    impl HttpClient for MockHttpClient {
        fn get(&self, url: &str) -> Result<Vec<u8>, RouteError> {
            self.requests.lock().push(url.to_string());
            self.response.clone()
        }
    }

    #[test]
    fn test_mock_client_success() {
        let mock = MockHttpClient::ok(vec![1, 2, 3, 4]);

        let result = mock.get("http://example.com");
        assert_eq!(result.unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(mock.last_url().as_deref(), Some("http://example.com"));
    }

    #[test]
    fn test_mock_client_error() {
        let mock = MockHttpClient::err(RouteError::Http("Test error".to_string()));

        let result = mock.get("http://example.com");
        assert!(result.is_err());
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(ReqwestClient::with_timeout(5).is_ok());
    }

    #[test]
    fn test_transport_error_omits_api_key() {
        let client = ReqwestClient::with_timeout(2).unwrap();

        // Nothing listens on port 1
        let err = client
            .get("http://127.0.0.1:1/json?origin=1,2&key=SECRETKEY")
            .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, RouteError::Http(_)));
        assert!(message.starts_with("HTTP error: Request failed"), "{}", message);
        assert!(!message.contains("SECRETKEY"), "{}", message);
        assert!(!message.contains("127.0.0.1"), "{}", message);
    }
}
