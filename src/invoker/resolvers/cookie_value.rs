use crate::error::HttpServiceError;
use crate::invoker::metadata::{Binding, MethodParameter};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{NamedValueArgumentResolver, NamedValueInfo};

/// Binds cookies.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieValueArgumentResolver;

impl NamedValueArgumentResolver for CookieValueArgumentResolver {
    fn create_named_value_info(&self, parameter: &MethodParameter) -> Option<NamedValueInfo> {
        match parameter.binding()? {
            Binding::CookieValue(spec) => Some(NamedValueInfo::from_spec(spec, "cookie value", true)),
            _ => None,
        }
    }

    fn add_request_value(
        &self,
        name: &str,
        value: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        values.add_cookie(name, [value.to_value_string()?]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::resolvers::NamedValueResolver;
    use crate::invoker::resolvers::testing::contribute;

    #[test]
    fn repeated_cookie_values() {
        let resolver = NamedValueResolver::new(CookieValueArgumentResolver);
        let parameter = MethodParameter::cookie_value("session");
        let values = contribute(&resolver, &parameter, vec!["a", "b"])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            values.cookies(),
            &[
                ("session".to_string(), "a".to_string()),
                ("session".to_string(), "b".to_string())
            ]
        );
    }
}
