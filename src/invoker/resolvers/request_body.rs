use std::sync::Arc;

use crate::error::HttpServiceError;
use crate::invoker::metadata::{Binding, MethodParameter};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{ArgumentBinder, HttpServiceArgumentResolver};

/// Binds the request body. Publishers are kept as the body value and awaited
/// by the adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestBodyArgumentResolver;

impl HttpServiceArgumentResolver for RequestBodyArgumentResolver {
    fn bind(
        &self,
        parameter: &MethodParameter,
    ) -> Result<Option<Arc<dyn ArgumentBinder>>, HttpServiceError> {
        let Some(Binding::RequestBody { required }) = parameter.binding() else {
            return Ok(None);
        };
        let required = *required;
        let name = parameter.name().unwrap_or("body").to_string();
        Ok(Some(Arc::new(
            move |argument: Argument, values: &mut HttpRequestValuesBuilder| {
                if argument.is_null() {
                    if required {
                        return Err(HttpServiceError::missing_value("request body", name.as_str()));
                    }
                    return Ok(());
                }
                values.set_body_value(argument)?;
                Ok(())
            },
        )))
    }
}
