use crate::domain::ApiError;
use crate::interface_adapters::problem::normalize_message;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use url::Url;

// Every call is bounded by this unless the client is built with another timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

const JSON_CONTENT_TYPE: &str = "application/json";

// Per-call options: method, optional JSON body, extra headers, and query pairs.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Vec<u8>>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let encoded = serde_json::to_vec(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = Some(encoded);
        Ok(self)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }
}

// Thin wrapper around reqwest for all backend calls. Cloning shares the
// connection pool and the cookie store that carries the session credentials.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    pub fn with_default_timeout(base_url: &str) -> Result<Self, ApiError> {
        Self::new(base_url, DEFAULT_TIMEOUT)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // Paths are appended to the base URL as-is so a base with a path prefix keeps it.
    fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        let mut url = Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn headers_for(extra: &[(String, String)]) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        // Caller headers win over the defaults.
        for (name, value) in extra {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Encode(format!("header {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Encode(format!("header {name}: {e}")))?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    #[tracing::instrument(
        name = "api_request",
        skip_all,
        fields(method = %options.method, path = %path)
    )]
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.url_for(path, &options.query)?;
        let headers = Self::headers_for(&options.headers)?;

        // The timer covers sending and reading the body; it is dropped on every exit path.
        let result = match tokio::time::timeout(self.timeout, self.execute(url, headers, options))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ApiError::TimedOut(self.timeout)),
        };

        if let Err(err) = &result {
            tracing::warn!(error = %err, status = ?err.status(), "api request failed.");
        }
        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        url: Url,
        headers: HeaderMap,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let mut builder = self.http.request(options.method, url).headers(headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let res = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = res.status();
        tracing::debug!(status = status.as_u16(), "api response received.");

        let bytes = res.bytes().await.map_err(|e| self.transport_error(e))?;

        // Keep the upstream status and a readable message for the UI layer.
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                message: normalize_message(status.as_u16(), &bytes),
            });
        }

        serde_json::from_slice::<T>(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::TimedOut(self.timeout)
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
