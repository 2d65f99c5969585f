//! Response-side types: body decoding targets and response entities.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::HttpServiceError;

/// Target representation for a decoded response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// UTF-8 text.
    Text,
    /// JSON, decoded into a `serde_json::Value` and then into the caller's type.
    Json,
    /// Raw bytes.
    Bytes,
}

/// A response body decoded according to a [`BodyType`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Text(String),
    Json(serde_json::Value),
    Bytes(Bytes),
}

impl ResponseBody {
    /// Decode raw bytes into the requested representation.
    pub fn decode(body_type: BodyType, bytes: Bytes) -> Result<Self, HttpServiceError> {
        match body_type {
            BodyType::Text => String::from_utf8(bytes.to_vec())
                .map(Self::Text)
                .map_err(|e| HttpServiceError::ParseError(format!("Body is not UTF-8: {e}"))),
            BodyType::Json => serde_json::from_slice(&bytes)
                .map(Self::Json)
                .map_err(|e| HttpServiceError::ParseError(format!("Invalid JSON body: {e}"))),
            BodyType::Bytes => Ok(Self::Bytes(bytes)),
        }
    }

    pub fn body_type(&self) -> BodyType {
        match self {
            Self::Text(_) => BodyType::Text,
            Self::Json(_) => BodyType::Json,
            Self::Bytes(_) => BodyType::Bytes,
        }
    }

    /// Convert into a caller type via serde.
    ///
    /// Text bodies deserialize as a JSON string, so `String` targets work for
    /// every text response.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, HttpServiceError> {
        let value = match self {
            Self::Text(text) => serde_json::Value::String(text),
            Self::Json(value) => value,
            Self::Bytes(bytes) => serde_json::Value::Array(
                bytes.iter().map(|b| serde_json::Value::from(*b)).collect(),
            ),
        };
        serde_json::from_value(value).map_err(|e| HttpServiceError::ParseError(e.to_string()))
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Text(text) => Bytes::from(text),
            Self::Json(value) => Bytes::from(value.to_string()),
            Self::Bytes(bytes) => bytes,
        }
    }
}

/// Status, headers, and an optional body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEntity<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Option<T>,
}

impl<T> ResponseEntity<T> {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Option<T>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&T> {
        self.body.as_ref()
    }

    pub fn into_body(self) -> Option<T> {
        self.body
    }

    /// Map the body while keeping status and headers; errors short-circuit.
    pub fn try_map<U, F>(self, f: F) -> Result<ResponseEntity<U>, HttpServiceError>
    where
        F: FnOnce(T) -> Result<U, HttpServiceError>,
    {
        let body = self.body.map(f).transpose()?;
        Ok(ResponseEntity {
            status: self.status,
            headers: self.headers,
            body,
        })
    }
}
