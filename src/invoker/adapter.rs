//! Contract between the invocation pipeline and an HTTP client.

use async_trait::async_trait;
use reqwest::header::HeaderMap;

use crate::error::HttpServiceError;
use crate::invoker::request_values::HttpRequestValues;
use crate::types::{BodyType, ResponseBody, ResponseEntity};

/// Executes a finished request against some underlying client.
///
/// Proxies pick the operation from the method's declared return type, so an
/// adapter never inspects return types itself.
#[async_trait]
pub trait HttpExchangeAdapter: Send + Sync {
    /// Whether request attributes reach the underlying client. When false,
    /// attribute parameters have no resolver and fail at proxy creation.
    fn supports_request_attributes(&self) -> bool {
        false
    }

    /// Perform the exchange and release the response content.
    async fn exchange(&self, values: HttpRequestValues) -> Result<(), HttpServiceError>;

    /// Perform the exchange and return the response headers.
    async fn exchange_for_headers(
        &self,
        values: HttpRequestValues,
    ) -> Result<HeaderMap, HttpServiceError>;

    /// Perform the exchange and decode the body; `None` for an empty body.
    async fn exchange_for_body(
        &self,
        values: HttpRequestValues,
        body_type: BodyType,
    ) -> Result<Option<ResponseBody>, HttpServiceError>;

    /// Perform the exchange and return status and headers.
    async fn exchange_for_bodiless_entity(
        &self,
        values: HttpRequestValues,
    ) -> Result<ResponseEntity<()>, HttpServiceError>;

    /// Perform the exchange and return status, headers, and decoded body.
    async fn exchange_for_entity(
        &self,
        values: HttpRequestValues,
        body_type: BodyType,
    ) -> Result<ResponseEntity<ResponseBody>, HttpServiceError>;
}
