use crate::error::HttpServiceError;
use crate::invoker::metadata::{MethodParameter, ParamType};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{NamedValueArgumentResolver, NamedValueInfo};

/// Binds file parameters that carry no explicit part binding, using the
/// parameter name as the part name.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipartFileArgumentResolver;

impl NamedValueArgumentResolver for MultipartFileArgumentResolver {
    fn create_named_value_info(&self, parameter: &MethodParameter) -> Option<NamedValueInfo> {
        if parameter.param_type() != &ParamType::MultipartFile {
            return None;
        }
        Some(NamedValueInfo::new("", true, None, "multipart file", true))
    }

    fn add_request_value(
        &self,
        name: &str,
        value: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        match value {
            Argument::File(file) => {
                values.add_request_part(name, file)?;
                Ok(())
            }
            other => Err(HttpServiceError::InvalidArgument(format!(
                "Expected a multipart file for '{name}', got {}",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::request_values::RequestBody;
    use crate::invoker::resolvers::NamedValueResolver;
    use crate::invoker::resolvers::testing::contribute;
    use crate::types::MultipartFile;
    use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};

    #[test]
    fn file_part_named_after_parameter() {
        let resolver = NamedValueResolver::new(MultipartFileArgumentResolver);
        let parameter = MethodParameter::multipart_file("file");
        let file = MultipartFile::new(
            "form-field",
            Some("test.txt".into()),
            Some("text/plain".into()),
            "test",
        );
        let values = contribute(&resolver, &parameter, file).unwrap().build().unwrap();
        let RequestBody::Multipart(parts) = values.body() else {
            panic!("expected multipart body");
        };
        assert_eq!(parts[0].name(), "file");
        assert_eq!(
            parts[0].headers().get(CONTENT_DISPOSITION).unwrap(),
            "form-data; name=\"file\"; filename=\"test.txt\""
        );
        assert_eq!(parts[0].headers().get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn missing_file_is_missing_value() {
        let resolver = NamedValueResolver::new(MultipartFileArgumentResolver);
        let parameter = MethodParameter::multipart_file("file");
        let err = contribute(&resolver, &parameter, Argument::Null).err().unwrap();
        assert_eq!(err, HttpServiceError::missing_value("multipart file", "file"));
    }

    #[test]
    fn non_file_argument_is_rejected() {
        let resolver = NamedValueResolver::new(MultipartFileArgumentResolver);
        let parameter = MethodParameter::multipart_file("file");
        assert!(contribute(&resolver, &parameter, "text").is_err());
    }
}
