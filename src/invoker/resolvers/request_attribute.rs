use crate::error::HttpServiceError;
use crate::invoker::metadata::{Binding, MethodParameter};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{NamedValueArgumentResolver, NamedValueInfo};

/// Binds request attributes. Values are passed through as JSON without
/// string conversion; several values become one JSON array.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestAttributeArgumentResolver;

fn attribute_value(value: Argument) -> Result<serde_json::Value, HttpServiceError> {
    match value {
        Argument::Json(value) => Ok(value),
        Argument::Text(text) => Ok(serde_json::Value::String(text)),
        Argument::Uri(url) => Ok(serde_json::Value::String(url.to_string())),
        Argument::List(items) => items
            .into_iter()
            .map(attribute_value)
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),
        Argument::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| attribute_value(v).map(|v| (k, v)))
            .collect::<Result<serde_json::Map<_, _>, _>>()
            .map(serde_json::Value::Object),
        other => Err(HttpServiceError::InvalidArgument(format!(
            "Unsupported request attribute value: {}",
            other.kind()
        ))),
    }
}

impl NamedValueArgumentResolver for RequestAttributeArgumentResolver {
    fn create_named_value_info(&self, parameter: &MethodParameter) -> Option<NamedValueInfo> {
        match parameter.binding()? {
            Binding::RequestAttribute(spec) => {
                Some(NamedValueInfo::from_spec(spec, "request attribute", false))
            }
            _ => None,
        }
    }

    fn add_request_value(
        &self,
        name: &str,
        value: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        values.add_attribute(name, attribute_value(value)?);
        Ok(())
    }

    fn collapse(&self, items: Vec<Argument>) -> Result<Argument, HttpServiceError> {
        attribute_value(Argument::List(items)).map(Argument::Json)
    }
}
