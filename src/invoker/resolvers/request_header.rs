use crate::error::HttpServiceError;
use crate::invoker::metadata::{Binding, MethodParameter};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{NamedValueArgumentResolver, NamedValueInfo};

/// Binds request header parameters; several values become repeated headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestHeaderArgumentResolver;

impl NamedValueArgumentResolver for RequestHeaderArgumentResolver {
    fn create_named_value_info(&self, parameter: &MethodParameter) -> Option<NamedValueInfo> {
        match parameter.binding()? {
            Binding::RequestHeader(spec) => {
                Some(NamedValueInfo::from_spec(spec, "request header", true))
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
        values.add_header(name, [value.to_value_string()?])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::resolvers::NamedValueResolver;
    use crate::invoker::resolvers::testing::contribute;

    #[test]
    fn list_becomes_repeated_headers() {
        let resolver = NamedValueResolver::new(RequestHeaderArgumentResolver);
        let parameter = MethodParameter::request_header("id");
        let builder = contribute(&resolver, &parameter, vec!["1", "2"]).unwrap();
        let ids: Vec<_> = builder.headers().get_all("id").iter().collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn numbers_are_converted() {
        let resolver = NamedValueResolver::new(RequestHeaderArgumentResolver);
        let parameter = MethodParameter::request_header("X-Count");
        let builder = contribute(&resolver, &parameter, 3i64).unwrap();
        assert_eq!(builder.headers().get("x-count").unwrap(), "3");
    }
}
