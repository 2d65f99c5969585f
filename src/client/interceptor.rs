//! HTTP Interceptor interfaces
//!
//! Interceptors observe and tweak encoded requests before send, observe
//! responses, and are notified of errors. Hooks run in registration order and
//! should avoid expensive work.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::client::transport::{TransportBody, TransportRequest, TransportResponse};
use crate::error::HttpServiceError;

/// Context passed to interceptors describing the request.
#[derive(Clone, Debug)]
pub struct HttpRequestContext {
    pub method: Method,
    pub url: String,
}

/// HTTP interceptor trait
pub trait HttpInterceptor: Send + Sync {
    /// Called before sending a request. Interceptors may add headers to the
    /// request or return an error to short-circuit it.
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        _request: &mut TransportRequest,
    ) -> Result<(), HttpServiceError> {
        Ok(())
    }

    /// Called after a response is received, before status handling.
    fn on_response(
        &self,
        _ctx: &HttpRequestContext,
        _response: &TransportResponse,
    ) -> Result<(), HttpServiceError> {
        Ok(())
    }

    /// Called when sending fails or the response status is an error.
    fn on_error(&self, _ctx: &HttpRequestContext, _error: &HttpServiceError) {}
}

/// A simple logging interceptor backed by `tracing` (no sensitive data).
#[derive(Clone, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(
        &self,
        ctx: &HttpRequestContext,
        request: &mut TransportRequest,
    ) -> Result<(), HttpServiceError> {
        let body = request.body.as_ref().map_or("none", TransportBody::kind);
        tracing::debug!(target: "siumai_exchange::http", method=%ctx.method, url=%ctx.url, body, "sending request");
        Ok(())
    }

    fn on_response(
        &self,
        ctx: &HttpRequestContext,
        response: &TransportResponse,
    ) -> Result<(), HttpServiceError> {
        tracing::debug!(target: "siumai_exchange::http", method=%ctx.method, url=%ctx.url, status=%response.status.as_u16(), "response received");
        Ok(())
    }

    fn on_error(&self, ctx: &HttpRequestContext, error: &HttpServiceError) {
        tracing::debug!(target: "siumai_exchange::http", method=%ctx.method, url=%ctx.url, err=%error, "request error");
    }
}

/// Adds an HTTP Basic `Authorization` header unless the request has one.
pub struct BasicAuthInterceptor {
    username: String,
    password: SecretString,
}

impl BasicAuthInterceptor {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    fn header_value(&self) -> Result<HeaderValue, HttpServiceError> {
        let credentials = format!("{}:{}", self.username, self.password.expose_secret());
        let mut value = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(credentials)))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for BasicAuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthInterceptor")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl HttpInterceptor for BasicAuthInterceptor {
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        request: &mut TransportRequest,
    ) -> Result<(), HttpServiceError> {
        if !request.headers.contains_key(AUTHORIZATION) {
            request.headers.insert(AUTHORIZATION, self.header_value()?);
        }
        Ok(())
    }
}
