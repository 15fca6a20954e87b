//! Signals Notebook API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Higher-level operations are implemented via traits on entity types.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::error::{Result, SignalsError};

const USER_AGENT: &str = concat!("signals-notebook/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-api-key";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "SIGNALS_NOTEBOOK_API_KEY";
/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "SIGNALS_NOTEBOOK_API_URL";

/// Where a request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Path segments appended to the base URL; each one is percent-encoded.
    Segments(Vec<String>),
    /// An absolute URL used as-is (pagination links).
    Url(String),
}

/// A single call to the API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub target: Target,
    pub query: Vec<(String, String)>,
    pub json: Option<serde_json::Value>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Request against path segments relative to the base URL.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            method,
            target: Target::Segments(segments.into_iter().map(|s| s.to_string()).collect()),
            query: Vec::new(),
            json: None,
            headers: Vec::new(),
            body: None,
        }
    }

    /// GET against path segments.
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self::new(Method::GET, segments)
    }

    /// GET an absolute URL verbatim.
    pub fn follow(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            target: Target::Url(url.into()),
            query: Vec::new(),
            json: None,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is present.
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Add every field of a serializable query struct as a parameter.
    ///
    /// Null fields are skipped; non-string scalars use their JSON form.
    pub fn query_params<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self> {
        let value = serde_json::to_value(params)?;
        if let serde_json::Value::Object(fields) = value {
            for (key, value) in fields {
                match value {
                    serde_json::Value::Null => {}
                    serde_json::Value::String(s) => self.query.push((key, s)),
                    other => self.query.push((key, other.to_string())),
                }
            }
        }
        Ok(self)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.json = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Add a request header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Attach a raw body.
    #[must_use]
    pub fn body(mut self, content: Vec<u8>) -> Self {
        self.body = Some(content);
        self
    }
}

/// A successful API response, fully read.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub content: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.content)?)
    }

    /// Value of a header, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Content-Type` header.
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// The `Content-Disposition` header.
    pub fn content_disposition(&self) -> Option<&str> {
        self.header(CONTENT_DISPOSITION.as_str())
    }
}

/// Low-level Signals Notebook API client.
///
/// Handles authentication and HTTP requests. Entity-specific operations
/// are implemented via the `Get`, `List`, `Save` and `Delete` traits on
/// model types, each taking the client explicitly.
///
/// This struct is cheaply cloneable; clones reference the same underlying
/// connection pool.
///
/// # Example
///
/// ```no_run
/// use signals_notebook::SignalsClient;
///
/// # fn example() -> signals_notebook::Result<()> {
/// // Create from environment variables
/// let client = SignalsClient::from_env()?;
///
/// // Or configure manually
/// let client = SignalsClient::new(
///     "your-api-key",
///     "https://tenant.signalsnotebook.com/api/rest/v1.0",
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SignalsClient {
    http: Client,
    base_url: Arc<Url>,
    api_key: String,
}

impl std::fmt::Debug for SignalsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalsClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl SignalsClient {
    /// Create a client from environment variables.
    ///
    /// Uses `SIGNALS_NOTEBOOK_API_KEY` for authentication and
    /// `SIGNALS_NOTEBOOK_API_URL` for the tenant's API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is not set.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var(API_KEY_ENV).map_err(|_| {
            SignalsError::ConfigMissing(format!("{API_KEY_ENV} environment variable not set"))
        })?;
        let base_url = env::var(API_URL_ENV).map_err(|_| {
            SignalsError::ConfigMissing(format!("{API_URL_ENV} environment variable not set"))
        })?;

        Self::new(&api_key, &base_url)
    }

    /// Create a new client with the provided API key and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self> {
        // Ensure base URL ends with /
        let base_url_str = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };

        let base_url = Url::parse(&base_url_str)?;
        if base_url.cannot_be_a_base() {
            return Err(SignalsError::ConfigMissing(format!(
                "base URL '{base_url}' cannot have path segments"
            )));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(SignalsError::Http)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            api_key: api_key.to_string(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a request target to an absolute URL.
    pub fn url_for(&self, target: &Target) -> Result<Url> {
        match target {
            Target::Url(raw) => Ok(Url::parse(raw)?),
            Target::Segments(segments) => {
                let mut url = (*self.base_url).clone();
                url.path_segments_mut()
                    .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
                    .pop_if_empty()
                    .extend(segments);
                Ok(url)
            }
        }
    }

    /// Send a request and read the whole response.
    ///
    /// Non-success statuses become [`SignalsError::Api`]; nothing is retried.
    #[tracing::instrument(skip(self, request), fields(method = %request.method))]
    pub async fn call(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request.target)?;
        tracing::debug!(%url, "sending request");

        let mut builder = self
            .http
            .request(request.method, url)
            .header(API_KEY_HEADER, &self.api_key);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(json) = &request.json {
            builder = builder.json(json);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(SignalsError::Http)?;
        let status = response.status();
        let headers = response.headers().clone();
        let content = response.bytes().await.map_err(SignalsError::Http)?.to_vec();

        if !status.is_success() {
            return Err(SignalsError::Api {
                message: Self::extract_error_message(&content, status),
                status_code: Some(status.as_u16()),
            });
        }

        Ok(ApiResponse {
            status,
            headers,
            content,
        })
    }

    /// Make a GET request against path segments.
    pub async fn get<I, S>(&self, segments: I) -> Result<ApiResponse>
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.call(ApiRequest::get(segments)).await
    }

    /// Extract error message from a failed response body.
    ///
    /// Understands JSON:API `errors[]` as well as plain `message`/`error`.
    fn extract_error_message(body: &[u8], status: StatusCode) -> String {
        let text = String::from_utf8_lossy(body);
        if text.trim().is_empty() {
            return format!("HTTP {status}");
        }

        if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
            if let Some(first) = json.get("errors").and_then(|e| e.get(0)) {
                let detail = first
                    .get("detail")
                    .or_else(|| first.get("title"))
                    .and_then(|d| d.as_str());
                if let Some(detail) = detail {
                    return detail.to_string();
                }
            }
            if let Some(msg) = json.get("message").and_then(|m| m.as_str()) {
                return msg.to_string();
            }
            if let Some(err) = json.get("error").and_then(|m| m.as_str()) {
                return err.to_string();
            }
        }

        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = SignalsClient::new("test-key", "https://example.com/api/rest/v1.0").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("SignalsClient"));
        assert!(debug.contains("base_url"));
        // API key should not be in debug output
        assert!(!debug.contains("test-key"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = SignalsClient::new("key", "https://example.com/api/rest/v1.0").unwrap();
        let client2 = SignalsClient::new("key", "https://example.com/api/rest/v1.0/").unwrap();
        assert_eq!(client1.base_url().as_str(), client2.base_url().as_str());
    }

    #[test]
    fn test_url_for_segments() {
        let client = SignalsClient::new("key", "https://example.com/api/rest/v1.0").unwrap();
        let url = client
            .url_for(&Target::Segments(vec![
                "entities".to_string(),
                "text:79b12479-2b5d-490f-be52-d60c53f16719".to_string(),
            ]))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/rest/v1.0/entities/text:79b12479-2b5d-490f-be52-d60c53f16719"
        );
    }

    #[test]
    fn test_url_for_segments_encodes_slashes_and_spaces() {
        let client = SignalsClient::new("key", "https://example.com/api").unwrap();
        let url = client
            .url_for(&Target::Segments(vec![
                "materials".to_string(),
                "My Library".to_string(),
                "a/b".to_string(),
            ]))
            .unwrap();
        assert_eq!(url.path(), "/api/materials/My%20Library/a%2Fb");
    }

    #[test]
    fn test_url_for_absolute_url_is_verbatim() {
        let client = SignalsClient::new("key", "https://example.com/api").unwrap();
        let next = "https://example.com/api/entities?page[offset]=20&page[limit]=20";
        let url = client.url_for(&Target::Url(next.to_string())).unwrap();
        assert_eq!(url.as_str(), next);
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get(["entities"])
            .query("force", true)
            .query_opt("digest", None::<String>)
            .header("Content-Type", "text/plain");
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.query, vec![("force".to_string(), "true".to_string())]);
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn test_query_params_skip_nulls() {
        #[derive(Serialize)]
        struct Params {
            force: bool,
            digest: Option<String>,
            fields: &'static str,
        }

        let request = ApiRequest::get(["entities"])
            .query_params(&Params {
                force: false,
                digest: None,
                fields: "a, b",
            })
            .unwrap();
        let mut query = request.query;
        query.sort();
        assert_eq!(
            query,
            vec![
                ("fields".to_string(), "a, b".to_string()),
                ("force".to_string(), "false".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_error_message() {
        let body = br#"{"errors":[{"status":"404","title":"Not Found","detail":"Entity not found"}]}"#;
        assert_eq!(
            SignalsClient::extract_error_message(body, StatusCode::NOT_FOUND),
            "Entity not found"
        );
        assert_eq!(
            SignalsClient::extract_error_message(b"", StatusCode::BAD_GATEWAY),
            "HTTP 502 Bad Gateway"
        );
        assert_eq!(
            SignalsClient::extract_error_message(b"boom", StatusCode::INTERNAL_SERVER_ERROR),
            "boom"
        );
    }
}
