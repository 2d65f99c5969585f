use std::sync::Arc;

use reqwest::Url;

use crate::error::HttpServiceError;
use crate::invoker::metadata::{MethodParameter, ParamType};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{ArgumentBinder, HttpServiceArgumentResolver};

/// Binds a URI argument that replaces the method's URL template. A null
/// argument keeps the template.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlArgumentResolver;

fn contribute_uri(
    argument: Argument,
    values: &mut HttpRequestValuesBuilder,
) -> Result<(), HttpServiceError> {
    match argument {
        Argument::Null => {}
        Argument::Uri(url) => {
            values.set_uri(url);
        }
        Argument::Text(text) => {
            let url = Url::parse(&text).map_err(|e| {
                HttpServiceError::InvalidArgument(format!("Invalid URI argument '{text}': {e}"))
            })?;
            values.set_uri(url);
        }
        other => {
            return Err(HttpServiceError::InvalidArgument(format!(
                "Expected a URI argument, got {}",
                other.kind()
            )));
        }
    }
    Ok(())
}

impl HttpServiceArgumentResolver for UrlArgumentResolver {
    fn bind(
        &self,
        parameter: &MethodParameter,
    ) -> Result<Option<Arc<dyn ArgumentBinder>>, HttpServiceError> {
        if parameter.param_type() != &ParamType::Uri {
            return Ok(None);
        }
        Ok(Some(Arc::new(contribute_uri)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::resolvers::testing::contribute;

    #[test]
    fn uri_argument_overrides_template() {
        let parameter = MethodParameter::uri("uri");
        let url = Url::parse("https://example.org/other").unwrap();
        let values = contribute(&UrlArgumentResolver, &parameter, url.clone())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(values.uri(), Some(&url));
        assert!(values.uri_template().is_none());
    }

    #[test]
    fn null_uri_keeps_template() {
        let parameter = MethodParameter::uri("uri");
        let values = contribute(&UrlArgumentResolver, &parameter, Argument::Null)
            .unwrap()
            .build()
            .unwrap();
        assert!(values.uri().is_none());
        assert_eq!(values.uri_template(), Some("/"));
    }

    #[test]
    fn relative_text_is_rejected() {
        let parameter = MethodParameter::uri("uri");
        assert!(contribute(&UrlArgumentResolver, &parameter, "/relative").is_err());
    }
}
