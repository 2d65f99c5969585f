use std::sync::Arc;

use reqwest::Method;

use crate::error::HttpServiceError;
use crate::invoker::metadata::{MethodParameter, ParamType};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{ArgumentBinder, HttpServiceArgumentResolver};

/// Binds an HTTP method chosen at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpMethodArgumentResolver;

fn contribute_method(
    argument: Argument,
    values: &mut HttpRequestValuesBuilder,
) -> Result<(), HttpServiceError> {
    match argument {
        Argument::Null => {}
        Argument::Method(method) => {
            values.set_http_method(method);
        }
        Argument::Text(text) => {
            let method = Method::from_bytes(text.to_ascii_uppercase().as_bytes()).map_err(|e| {
                HttpServiceError::InvalidArgument(format!("Invalid HTTP method '{text}': {e}"))
            })?;
            values.set_http_method(method);
        }
        other => {
            return Err(HttpServiceError::InvalidArgument(format!(
                "Expected an HTTP method argument, got {}",
                other.kind()
            )));
        }
    }
    Ok(())
}

impl HttpServiceArgumentResolver for HttpMethodArgumentResolver {
    fn bind(
        &self,
        parameter: &MethodParameter,
    ) -> Result<Option<Arc<dyn ArgumentBinder>>, HttpServiceError> {
        if parameter.param_type() != &ParamType::HttpMethod {
            return Ok(None);
        }
        Ok(Some(Arc::new(contribute_method)))
    }
}
