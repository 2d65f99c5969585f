//! Transport abstraction and the reqwest-backed default.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode, Url};

use crate::error::HttpServiceError;
use crate::types::HttpConfig;

/// A fully encoded request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<TransportBody>,
}

/// Request body in the form the transport writes it.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportBody {
    /// Encoded bytes described by the request's `Content-Type`.
    Bytes(Bytes),
    /// Fields written as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Parts written as `multipart/form-data`, in order.
    Multipart(Vec<FormPart>),
}

impl TransportBody {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bytes(_) => "bytes",
            Self::Form(_) => "form",
            Self::Multipart(_) => "multipart",
        }
    }
}

/// One encoded multipart part.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: String,
    /// Extra part headers, written after `Content-Type`.
    pub headers: HeaderMap,
    pub bytes: Bytes,
}

impl FormPart {
    /// Convert into a reqwest part carrying its own `Content-Length`.
    pub fn into_part(self) -> Result<Part, HttpServiceError> {
        let mut headers = self.headers;
        headers.insert(CONTENT_LENGTH, HeaderValue::from(self.bytes.len()));
        let part = Part::bytes(self.bytes.to_vec())
            .mime_str(&self.content_type)
            .map_err(|e| {
                HttpServiceError::InvalidArgument(format!(
                    "Invalid media type '{}' for part '{}': {e}",
                    self.content_type, self.name
                ))
            })?
            .headers(headers);
        Ok(match self.file_name {
            Some(file_name) => part.file_name(file_name),
            None => part,
        })
    }
}

/// Build a multipart form with the parts in the given order.
pub fn multipart_form(parts: Vec<FormPart>) -> Result<Form, HttpServiceError> {
    parts.into_iter().try_fold(Form::new(), |form, part| {
        let name = part.name.clone();
        Ok(form.part(name, part.into_part()?))
    })
}

/// A response with the body read into memory.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Sends encoded requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, HttpServiceError>;
}

/// [`HttpTransport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client from timeouts, proxy, and user agent settings.
    pub fn from_config(config: &HttpConfig) -> Result<Self, HttpServiceError> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| HttpServiceError::config(format!("Invalid proxy URL: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| HttpServiceError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, HttpServiceError> {
        let mut headers = request.headers;
        let builder = self.client.request(request.method, request.url);
        let builder = match request.body {
            None => builder.headers(headers),
            Some(TransportBody::Bytes(bytes)) => builder.headers(headers).body(bytes),
            Some(TransportBody::Form(fields)) => builder.headers(headers).form(&fields),
            Some(TransportBody::Multipart(parts)) => {
                // reqwest writes the boundary into Content-Type
                headers.remove(CONTENT_TYPE);
                builder.headers(headers).multipart(multipart_form(parts)?)
            }
        };
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn builds_from_config() {
        let config = HttpConfig::builder()
            .timeout(Some(Duration::from_secs(5)))
            .user_agent(Some("test-agent"))
            .build();
        assert!(ReqwestTransport::from_config(&config).is_ok());
    }

    fn part(name: &str, content_type: &str) -> FormPart {
        FormPart {
            name: name.into(),
            file_name: None,
            content_type: content_type.into(),
            headers: HeaderMap::new(),
            bytes: Bytes::from_static(b"x"),
        }
    }

    #[test]
    fn invalid_part_media_type_is_rejected() {
        let err = part("doc", "not a type").into_part().unwrap_err();
        assert!(matches!(err, HttpServiceError::InvalidArgument(ref m) if m.contains("doc")));
    }

    #[test]
    fn multipart_form_accepts_valid_parts() {
        let form = multipart_form(vec![part("a", "text/plain"), part("b", "application/json")]);
        assert!(form.is_ok());
    }

    #[test]
    fn invalid_proxy_is_configuration_error() {
        let config = HttpConfig::builder().proxy(Some("http://[::1")).build();
        let err = ReqwestTransport::from_config(&config).unwrap_err();
        assert!(err.is_configuration_error());
    }
}
