use crate::error::HttpServiceError;
use crate::invoker::metadata::{Binding, MethodParameter};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{NamedValueArgumentResolver, NamedValueInfo};

/// Binds URI template variables; a list collapses to one comma-joined value.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathVariableArgumentResolver;

impl NamedValueArgumentResolver for PathVariableArgumentResolver {
    fn create_named_value_info(&self, parameter: &MethodParameter) -> Option<NamedValueInfo> {
        match parameter.binding()? {
            Binding::PathVariable(spec) => Some(NamedValueInfo::from_spec(spec, "path variable", false)),
            _ => None,
        }
    }

    fn add_request_value(
        &self,
        name: &str,
        value: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        values.set_uri_variable(name, value.to_value_string()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::resolvers::NamedValueResolver;
    use crate::invoker::resolvers::testing::contribute;

    #[test]
    fn list_is_comma_joined() {
        let resolver = NamedValueResolver::new(PathVariableArgumentResolver);
        let parameter = MethodParameter::path_variable("ids");
        let values = contribute(&resolver, &parameter, vec![1i64, 2, 3])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(values.uri_variables()["ids"], "1,2,3");
    }

    #[test]
    fn explicit_name_wins() {
        let resolver = NamedValueResolver::new(PathVariableArgumentResolver);
        let parameter = MethodParameter::path_variable("arg0")
            .configure_named_value(|spec| spec.name = "id".into());
        let values = contribute(&resolver, &parameter, "42").unwrap().build().unwrap();
        assert_eq!(values.uri_variables()["id"], "42");
    }
}
