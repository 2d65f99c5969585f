//! Type Conversions for HttpServiceError

use super::types::HttpServiceError;

impl From<reqwest::Error> for HttpServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for HttpServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<reqwest::header::InvalidHeaderName> for HttpServiceError {
    fn from(err: reqwest::header::InvalidHeaderName) -> Self {
        Self::InvalidArgument(format!("Invalid header name: {err}"))
    }
}

impl From<reqwest::header::InvalidHeaderValue> for HttpServiceError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidArgument(format!("Invalid header value: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: HttpServiceError = json_err.into();
        assert!(matches!(err, HttpServiceError::JsonError(_)));
    }

    #[test]
    fn test_from_invalid_header_name() {
        let err: HttpServiceError = reqwest::header::HeaderName::from_bytes(b"bad header")
            .unwrap_err()
            .into();
        assert!(matches!(err, HttpServiceError::InvalidArgument(_)));
    }
}
