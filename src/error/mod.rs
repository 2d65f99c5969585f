//! Error Handling Module
//!
//! Errors fall into three groups:
//! - configuration errors, raised while groups and proxies are built
//! - per-call binding errors, raised before anything is sent
//! - transport errors, passed through from the underlying client unchanged
//!
//! # Example
//!
//! ```rust,ignore
//! use siumai_exchange::error::{ErrorCategory, HttpServiceError};
//!
//! let error = HttpServiceError::missing_value("request header", "X-Id");
//! assert_eq!(error.category(), ErrorCategory::Binding);
//! assert!(!error.is_retryable());
//! ```

mod conversions;
pub mod types;

pub use types::*;
