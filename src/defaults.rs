//! Default Configuration Values
//!
//! Centralizes the defaults used by HTTP clients built for service groups.

use std::time::Duration;

/// HTTP client default configurations
pub mod http {
    use super::*;

    /// Default request timeout for HTTP requests
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Default connection timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("siumai-exchange/", env!("CARGO_PKG_VERSION"));

    /// Environment variable overriding the default User-Agent.
    pub const USER_AGENT_ENV: &str = "SIUMAI_EXCHANGE_USER_AGENT";
}

/// Media types the codecs know about.
pub mod media_types {
    pub const TEXT_PLAIN_UTF8: &str = "text/plain;charset=UTF-8";
    pub const APPLICATION_JSON: &str = "application/json";
    pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
    pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
    pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
}
