use crate::error::HttpServiceError;
use crate::invoker::metadata::{Binding, MethodParameter};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{NamedValueArgumentResolver, NamedValueInfo};

/// Binds request parameters.
///
/// Parameters become query parameters, or form fields when the request
/// content type is `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestParamArgumentResolver;

impl NamedValueArgumentResolver for RequestParamArgumentResolver {
    fn create_named_value_info(&self, parameter: &MethodParameter) -> Option<NamedValueInfo> {
        match parameter.binding()? {
            Binding::RequestParam(spec) => Some(NamedValueInfo::from_spec(spec, "request param", true)),
            _ => None,
        }
    }

    fn add_request_value(
        &self,
        name: &str,
        value: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        values.add_request_parameter(name, [value.to_value_string()?]);
        Ok(())
    }
}
