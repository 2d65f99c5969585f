//! Core error types.

use thiserror::Error;

/// Coarse error category, used for presentation and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Broken service definition or registry setup, detected before any call.
    Configuration,
    /// A single call could not bind its arguments to the request.
    Binding,
    /// The transport failed to send the request or read the response.
    Transport,
    /// The remote side answered with a 4xx status.
    Client,
    /// The remote side answered with a 5xx status.
    Server,
    /// The response body could not be decoded.
    Parsing,
}

/// Error raised while configuring, building, or invoking HTTP service proxies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HttpServiceError {
    /// Invalid registry, group, factory, or method metadata configuration.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A service type was registered in more than one group.
    #[error("More than one proxy for service type {service_type} in groups {groups:?}")]
    AmbiguousClient {
        service_type: String,
        groups: Vec<String>,
    },

    /// A required named value was absent for this call.
    #[error("Missing {label} value '{name}'")]
    MissingValue { label: String, name: String },

    /// An argument could not be applied to the declared binding.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Both a body value and multipart parts were supplied.
    #[error("Conflicting request body: {0}")]
    BodyConflict(String),

    /// The URI template could not be expanded into a valid URI.
    #[error("URI template error: {0}")]
    UriTemplateError(String),

    /// Transport-level failure.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Non-success response returned by the remote service.
    #[error("API error {code}: {message}")]
    ApiError { code: u16, message: String },

    /// Response body decoding failure.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl HttpServiceError {
    /// Create an API error from a status code and message.
    pub fn api_error(code: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            code,
            message: message.into(),
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigurationError(message.into())
    }

    /// Shorthand for a missing required value.
    pub fn missing_value(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingValue {
            label: label.into(),
            name: name.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationError(_) | Self::AmbiguousClient { .. } => {
                ErrorCategory::Configuration
            }
            Self::MissingValue { .. }
            | Self::InvalidArgument(_)
            | Self::BodyConflict(_)
            | Self::UriTemplateError(_) => ErrorCategory::Binding,
            Self::HttpError(_) => ErrorCategory::Transport,
            Self::ApiError { code, .. } if *code >= 500 => ErrorCategory::Server,
            Self::ApiError { .. } => ErrorCategory::Client,
            Self::ParseError(_) | Self::JsonError(_) => ErrorCategory::Parsing,
        }
    }

    /// HTTP status of the response, when the error came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_configuration_error(&self) -> bool {
        self.category() == ErrorCategory::Configuration
    }

    /// Only transport and server failures are worth another attempt; the
    /// proxy itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpError(_) => true,
            Self::ApiError { code, .. } => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}
