//! HTTP client builder
//!
//! `HttpClientBuilder` collects the per-group client settings (base URL,
//! default headers and cookies, credentials, timeouts, interceptors) and
//! produces an [`HttpClient`]. Registries clone one builder per group, so
//! every setter works by value.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::client::interceptor::{
    BasicAuthInterceptor, HttpInterceptor, HttpRequestContext, LoggingInterceptor,
};
use crate::client::transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};
use crate::client::uri_template::UriBuilderFactory;
use crate::error::HttpServiceError;
use crate::types::HttpConfig;

/// Builder for [`HttpClient`].
#[derive(Clone, Default)]
pub struct HttpClientBuilder {
    base_url: Option<String>,
    default_headers: Vec<(String, String)>,
    default_cookies: Vec<(String, String)>,
    http_config: HttpConfig,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
    http_debug: bool,
    http_client: Option<reqwest::Client>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL relative request targets resolve against.
    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn get_base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    // === Request Defaults ===

    /// Add a header sent with every request unless the request sets the same
    /// header itself.
    pub fn default_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Add a cookie sent with every request unless the request sets a cookie
    /// with the same name.
    pub fn default_cookie<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.default_cookies.push((name.into(), value.into()));
        self
    }

    /// Authenticate every request with HTTP Basic credentials.
    pub fn basic_auth<U: Into<String>, P: Into<String>>(self, username: U, password: P) -> Self {
        self.with_http_interceptor(Arc::new(BasicAuthInterceptor::new(username, password)))
    }

    // === HTTP Basic Configuration ===

    /// Replace the whole HTTP configuration.
    pub fn http_config(mut self, config: HttpConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Set request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http_config.timeout = Some(timeout);
        self
    }

    /// Set connection timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http_config.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.http_config.user_agent = Some(user_agent.into());
        self
    }

    /// Set custom HTTP client; timeouts and proxy settings are then ignored.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Replace the transport entirely.
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    // === HTTP Advanced Configuration ===

    /// Add a custom HTTP interceptor; interceptors run in the order added.
    pub fn with_http_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Enable a built-in logging interceptor for HTTP debugging (no sensitive data).
    pub fn http_debug(mut self, enabled: bool) -> Self {
        self.http_debug = enabled;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpClient, HttpServiceError> {
        let uri_factory = UriBuilderFactory::new(self.base_url.as_deref())?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                HttpServiceError::config(format!("Invalid default header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                HttpServiceError::config(format!("Invalid value for default header '{name}': {e}"))
            })?;
            default_headers.append(header, value);
        }

        let transport: Arc<dyn HttpTransport> = match (self.transport, self.http_client) {
            (Some(transport), _) => transport,
            (None, Some(client)) => Arc::new(ReqwestTransport::new(client)),
            (None, None) => Arc::new(ReqwestTransport::from_config(&self.http_config)?),
        };

        let mut interceptors = self.interceptors;
        if self.http_debug {
            interceptors.push(Arc::new(LoggingInterceptor));
        }

        Ok(HttpClient {
            transport,
            uri_factory,
            default_headers,
            default_cookies: self.default_cookies,
            interceptors,
        })
    }
}

impl std::fmt::Debug for HttpClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientBuilder")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers.len())
            .field("default_cookies", &self.default_cookies.len())
            .field("http_config", &self.http_config)
            .field("interceptors", &self.interceptors.len())
            .field("http_debug", &self.http_debug)
            .finish()
    }
}

/// A configured client: transport, base URL, defaults, and interceptors.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    uri_factory: UriBuilderFactory,
    default_headers: HeaderMap,
    default_cookies: Vec<(String, String)>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
}

impl HttpClient {
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    pub fn base_url(&self) -> Option<&str> {
        self.uri_factory.base_url()
    }

    pub fn uri_factory(&self) -> &UriBuilderFactory {
        &self.uri_factory
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn default_cookies(&self) -> &[(String, String)] {
        &self.default_cookies
    }

    /// Send a request through the interceptors and the transport.
    ///
    /// 4xx and 5xx responses become [`HttpServiceError::ApiError`] carrying
    /// the status and the response text.
    pub async fn execute(
        &self,
        mut request: TransportRequest,
    ) -> Result<TransportResponse, HttpServiceError> {
        let ctx = HttpRequestContext {
            method: request.method.clone(),
            url: request.url.to_string(),
        };
        for interceptor in &self.interceptors {
            interceptor.on_before_send(&ctx, &mut request)?;
        }

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(error) => {
                self.notify_error(&ctx, &error);
                return Err(error);
            }
        };
        for interceptor in &self.interceptors {
            interceptor.on_response(&ctx, &response)?;
        }

        let status = response.status;
        if status.is_client_error() || status.is_server_error() {
            let message = String::from_utf8_lossy(&response.body).into_owned();
            let error = HttpServiceError::api_error(status.as_u16(), message);
            self.notify_error(&ctx, &error);
            return Err(error);
        }
        Ok(response)
    }

    fn notify_error(&self, ctx: &HttpRequestContext, error: &HttpServiceError) {
        for interceptor in &self.interceptors {
            interceptor.on_error(ctx, error);
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url())
            .field("default_headers", &self.default_headers.len())
            .field("default_cookies", &self.default_cookies.len())
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::{Method, StatusCode, Url};
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubTransport {
        status: Option<StatusCode>,
        seen: Mutex<Vec<TransportRequest>>,
    }

    #[async_trait]
    impl HttpTransport for StubTransport {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, HttpServiceError> {
            self.seen.lock().unwrap().push(request);
            Ok(TransportResponse {
                status: self.status.unwrap_or(StatusCode::OK),
                headers: HeaderMap::new(),
                body: Bytes::from_static(b"boom"),
            })
        }
    }

    fn request() -> TransportRequest {
        TransportRequest {
            method: Method::GET,
            url: Url::parse("http://localhost/x").unwrap(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[test]
    fn invalid_default_header_is_configuration_error() {
        let err = HttpClientBuilder::new()
            .default_header("bad header", "x")
            .build()
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn default_headers_keep_every_value() {
        let client = HttpClientBuilder::new()
            .base_url("http://localhost")
            .default_header("X-A", "1")
            .default_header("X-A", "2")
            .build()
            .unwrap();
        assert_eq!(client.default_headers().get_all("x-a").iter().count(), 2);
        assert_eq!(client.base_url(), Some("http://localhost"));
    }

    #[tokio::test]
    async fn basic_auth_is_applied_by_interceptor() {
        let transport = Arc::new(StubTransport::default());
        let client = HttpClientBuilder::new()
            .basic_auth("john", "123")
            .with_transport(transport.clone())
            .build()
            .unwrap();
        client.execute(request()).await.unwrap();
        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].headers["authorization"], "Basic am9objoxMjM=");
    }

    #[tokio::test]
    async fn error_status_becomes_api_error() {
        let transport = Arc::new(StubTransport {
            status: Some(StatusCode::NOT_FOUND),
            ..Default::default()
        });
        let client = HttpClientBuilder::new()
            .with_transport(transport)
            .build()
            .unwrap();
        let err = client.execute(request()).await.unwrap_err();
        assert_eq!(err.status_code(), Some(404));
        assert!(err.to_string().contains("boom"));
    }
}
