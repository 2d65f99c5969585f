//! Argument resolvers.
//!
//! A resolver inspects a parameter once, at proxy creation, and either
//! declines it or returns an [`ArgumentBinder`]. The binder runs on every call
//! and contributes the actual argument to the request builder. Resolvers are
//! tried in order and the first one that binds a parameter wins.

use std::sync::Arc;

use crate::error::HttpServiceError;
use crate::invoker::metadata::MethodParameter;
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

mod cookie_value;
mod http_method;
mod multipart_file;
mod named_value;
mod path_variable;
mod request_attribute;
mod request_body;
mod request_header;
mod request_param;
mod request_part;
mod url;

pub use cookie_value::CookieValueArgumentResolver;
pub use http_method::HttpMethodArgumentResolver;
pub use multipart_file::MultipartFileArgumentResolver;
pub use named_value::{NamedValueArgumentResolver, NamedValueInfo, NamedValueResolver};
pub use path_variable::PathVariableArgumentResolver;
pub use request_attribute::RequestAttributeArgumentResolver;
pub use request_body::RequestBodyArgumentResolver;
pub use request_header::RequestHeaderArgumentResolver;
pub use request_param::RequestParamArgumentResolver;
pub use request_part::RequestPartArgumentResolver;
pub use url::UrlArgumentResolver;

/// Decides whether a parameter is handled, once per parameter.
pub trait HttpServiceArgumentResolver: Send + Sync {
    /// `Ok(None)` when not applicable; errors are configuration errors.
    fn bind(
        &self,
        parameter: &MethodParameter,
    ) -> Result<Option<Arc<dyn ArgumentBinder>>, HttpServiceError>;
}

/// Applies one actual argument to the request, once per call.
pub trait ArgumentBinder: Send + Sync {
    fn contribute(
        &self,
        argument: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError>;
}

impl<F> ArgumentBinder for F
where
    F: Fn(Argument, &mut HttpRequestValuesBuilder) -> Result<(), HttpServiceError> + Send + Sync,
{
    fn contribute(
        &self,
        argument: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        self(argument, values)
    }
}

/// The built-in chain, preceded by `custom` resolvers.
///
/// The attribute resolver is only included when the adapter passes
/// attributes through to its client.
pub fn default_resolvers(
    custom: &[Arc<dyn HttpServiceArgumentResolver>],
    supports_request_attributes: bool,
) -> Vec<Arc<dyn HttpServiceArgumentResolver>> {
    let mut resolvers: Vec<Arc<dyn HttpServiceArgumentResolver>> = custom.to_vec();
    resolvers.push(Arc::new(NamedValueResolver::new(RequestHeaderArgumentResolver)));
    resolvers.push(Arc::new(RequestBodyArgumentResolver));
    resolvers.push(Arc::new(NamedValueResolver::new(PathVariableArgumentResolver)));
    resolvers.push(Arc::new(NamedValueResolver::new(RequestParamArgumentResolver)));
    resolvers.push(Arc::new(NamedValueResolver::new(RequestPartArgumentResolver)));
    resolvers.push(Arc::new(NamedValueResolver::new(CookieValueArgumentResolver)));
    if supports_request_attributes {
        resolvers.push(Arc::new(NamedValueResolver::new(
            RequestAttributeArgumentResolver,
        )));
    }
    resolvers.push(Arc::new(UrlArgumentResolver));
    resolvers.push(Arc::new(HttpMethodArgumentResolver));
    resolvers.push(Arc::new(NamedValueResolver::new(MultipartFileArgumentResolver)));
    resolvers
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::invoker::request_values::HttpRequestValues;
    use reqwest::Method;

    /// Bind `parameter` with `resolver` and contribute `argument` to a GET
    /// request builder.
    pub fn contribute(
        resolver: &dyn HttpServiceArgumentResolver,
        parameter: &MethodParameter,
        argument: impl Into<Argument>,
    ) -> Result<HttpRequestValuesBuilder, HttpServiceError> {
        let binder = resolver
            .bind(parameter)?
            .expect("resolver should bind the parameter");
        let mut builder = HttpRequestValues::builder();
        builder.set_http_method(Method::GET);
        builder.set_uri_template("/");
        binder.contribute(argument.into(), &mut builder)?;
        Ok(builder)
    }
}
