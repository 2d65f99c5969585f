use crate::error::HttpServiceError;
use crate::invoker::metadata::{Binding, MethodParameter};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{NamedValueArgumentResolver, NamedValueInfo};

/// Binds multipart request parts.
///
/// A part value may be text, JSON, bytes, a resource, a file, an entity with
/// part headers, or a publisher of any of these. Several values become
/// several parts under the same name.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestPartArgumentResolver;

impl NamedValueArgumentResolver for RequestPartArgumentResolver {
    fn create_named_value_info(&self, parameter: &MethodParameter) -> Option<NamedValueInfo> {
        match parameter.binding()? {
            Binding::RequestPart(spec) => Some(NamedValueInfo::from_spec(spec, "request part", true)),
            _ => None,
        }
    }

    fn add_request_value(
        &self,
        name: &str,
        value: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        values.add_request_part(name, value)?;
        Ok(())
    }
}
