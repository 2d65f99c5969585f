//! Per-method binding table, built once at proxy creation.

use std::sync::Arc;

use reqwest::Method;

use crate::error::HttpServiceError;
use crate::invoker::metadata::{MethodDescriptor, MethodParameter, ReturnType, ServiceDescriptor};
use crate::invoker::request_values::{HttpRequestValues, HttpRequestValuesBuilder};
use crate::invoker::resolvers::{ArgumentBinder, HttpServiceArgumentResolver};
use crate::types::Argument;

/// Resolves `${name}` placeholders in URL templates.
pub type EmbeddedValueResolver = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Everything needed to turn one call into request values.
pub(crate) struct HttpServiceMethod {
    service_name: String,
    name: String,
    http_method: Option<Method>,
    url: String,
    content_type: Option<String>,
    accept: Vec<String>,
    parameters: Vec<MethodParameter>,
    binders: Vec<Arc<dyn ArgumentBinder>>,
    return_type: ReturnType,
}

impl HttpServiceMethod {
    pub(crate) fn new(
        service_name: &str,
        service: &ServiceDescriptor,
        method: &MethodDescriptor,
        resolvers: &[Arc<dyn HttpServiceArgumentResolver>],
        embedded_value_resolver: Option<&EmbeddedValueResolver>,
    ) -> Result<Self, HttpServiceError> {
        if !method.declares_exchange() {
            return Err(HttpServiceError::config(format!(
                "No HTTP method declared for {service_name}.{}",
                method.name
            )));
        }

        let mut binders = Vec::with_capacity(method.parameters.len());
        for parameter in &method.parameters {
            binders.push(find_binder(service_name, &method.name, parameter, resolvers)?);
        }

        let type_url = resolve_embedded(service.url.as_deref(), embedded_value_resolver)?;
        let method_url = resolve_embedded(method.url.as_deref(), embedded_value_resolver)?;

        Ok(Self {
            service_name: service_name.to_string(),
            name: method.name.clone(),
            http_method: method.http_method.clone(),
            url: join_url(&type_url, &method_url),
            content_type: method
                .content_type
                .clone()
                .or_else(|| service.content_type.clone()),
            accept: if method.accept.is_empty() {
                service.accept.clone()
            } else {
                method.accept.clone()
            },
            parameters: method.parameters.clone(),
            binders,
            return_type: method.return_type,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn return_type(&self) -> ReturnType {
        self.return_type
    }

    /// Populate a builder from the method metadata and the actual arguments,
    /// in parameter order.
    pub(crate) fn request_values(
        &self,
        arguments: Vec<Argument>,
    ) -> Result<HttpRequestValuesBuilder, HttpServiceError> {
        if arguments.len() != self.parameters.len() {
            return Err(HttpServiceError::InvalidArgument(format!(
                "Method {}.{} expects {} argument(s), got {}",
                self.service_name,
                self.name,
                self.parameters.len(),
                arguments.len()
            )));
        }

        let mut builder = HttpRequestValues::builder();
        if let Some(method) = &self.http_method {
            builder.set_http_method(method.clone());
        }
        builder.set_uri_template(self.url.clone());
        if let Some(content_type) = &self.content_type {
            builder.set_content_type(content_type)?;
        }
        if !self.accept.is_empty() {
            builder.set_accept(&self.accept)?;
        }

        for (binder, argument) in self.binders.iter().zip(arguments) {
            binder.contribute(argument, &mut builder)?;
        }
        Ok(builder)
    }
}

fn find_binder(
    service_name: &str,
    method_name: &str,
    parameter: &MethodParameter,
    resolvers: &[Arc<dyn HttpServiceArgumentResolver>],
) -> Result<Arc<dyn ArgumentBinder>, HttpServiceError> {
    for resolver in resolvers {
        if let Some(binder) = resolver.bind(parameter)? {
            return Ok(binder);
        }
    }
    Err(HttpServiceError::config(format!(
        "Could not resolve parameter {} in {service_name}.{method_name}: no suitable resolver",
        parameter.describe()
    )))
}

fn resolve_embedded(
    value: Option<&str>,
    resolver: Option<&EmbeddedValueResolver>,
) -> Result<String, HttpServiceError> {
    let Some(value) = value else {
        return Ok(String::new());
    };
    let Some(resolver) = resolver else {
        return Ok(value.to_string());
    };
    let mut resolved = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        resolved.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find('}').ok_or_else(|| {
            HttpServiceError::config(format!("Unterminated placeholder in '{value}'"))
        })?;
        let name = &after[..end];
        let replacement = resolver(name).ok_or_else(|| {
            HttpServiceError::config(format!("Could not resolve placeholder '{name}' in '{value}'"))
        })?;
        resolved.push_str(&replacement);
        rest = &after[end + 1..];
    }
    resolved.push_str(rest);
    Ok(resolved)
}

/// Join type-level and method-level URLs with exactly one slash between them.
fn join_url(type_url: &str, method_url: &str) -> String {
    match (type_url.is_empty(), method_url.is_empty()) {
        (true, _) => method_url.to_string(),
        (false, true) => type_url.to_string(),
        (false, false) => {
            if method_url.starts_with('?') {
                format!("{type_url}{method_url}")
            } else {
                format!(
                    "{}/{}",
                    type_url.trim_end_matches('/'),
                    method_url.trim_start_matches('/')
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::metadata::{Binding, ParamType};
    use crate::invoker::resolvers::default_resolvers;

    fn method(service: &ServiceDescriptor, index: usize) -> Result<HttpServiceMethod, HttpServiceError> {
        HttpServiceMethod::new(
            "TestService",
            service,
            &service.methods[index],
            &default_resolvers(&[], false),
            None,
        )
    }

    #[test]
    fn unresolvable_parameter_fails_at_creation() {
        let service = ServiceDescriptor::new().method(
            MethodDescriptor::get("find", "/items").param(MethodParameter::new("raw", ParamType::Value)),
        );
        let err = method(&service, 0).err().unwrap();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("TestService.find"));
    }

    #[test]
    fn method_without_http_method_fails_at_creation() {
        let service = ServiceDescriptor::new().method(MethodDescriptor::new("nomethod"));
        let err = method(&service, 0).err().unwrap();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("TestService.nomethod"));
    }

    #[test]
    fn http_method_parameter_satisfies_method_requirement() {
        let service = ServiceDescriptor::new().method(
            MethodDescriptor::new("dynamic").param(MethodParameter::http_method("method")),
        );
        assert!(method(&service, 0).is_ok());
    }

    #[test]
    fn type_and_method_urls_are_joined() {
        assert_eq!(join_url("/api/", "/users"), "/api/users");
        assert_eq!(join_url("/api", "users"), "/api/users");
        assert_eq!(join_url("", "/users"), "/users");
        assert_eq!(join_url("/api", ""), "/api");
    }

    #[test]
    fn method_content_type_overrides_type_level() {
        let service = ServiceDescriptor::new()
            .url("/api")
            .content_type("application/json")
            .accept("application/json")
            .method(
                MethodDescriptor::post("submit", "/form")
                    .content_type("application/x-www-form-urlencoded"),
            );
        let values = method(&service, 0)
            .unwrap()
            .request_values(Vec::new())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(values.uri_template(), Some("/api/form"));
        assert_eq!(
            values.headers()["content-type"],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(values.headers()["accept"], "application/json");
    }

    #[test]
    fn argument_count_is_checked() {
        let service = ServiceDescriptor::new()
            .method(MethodDescriptor::get("get", "/{id}").param(MethodParameter::path_variable("id")));
        let err = method(&service, 0).unwrap().request_values(Vec::new()).err().unwrap();
        assert!(matches!(err, HttpServiceError::InvalidArgument(_)));
    }

    #[test]
    fn embedded_values_resolve_in_urls() {
        let service = ServiceDescriptor::new()
            .url("${api.prefix}")
            .method(MethodDescriptor::get("get", "/items"));
        let resolver: EmbeddedValueResolver =
            Arc::new(|name: &str| (name == "api.prefix").then(|| "/v2".to_string()));
        let method = HttpServiceMethod::new(
            "TestService",
            &service,
            &service.methods[0],
            &default_resolvers(&[], false),
            Some(&resolver),
        )
        .unwrap();
        let values = method.request_values(Vec::new()).unwrap().build().unwrap();
        assert_eq!(values.uri_template(), Some("/v2/items"));
    }

    #[test]
    fn unresolved_embedded_value_is_configuration_error() {
        let resolver: EmbeddedValueResolver = Arc::new(|_: &str| None);
        let err = resolve_embedded(Some("${missing}/x"), Some(&resolver)).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn arguments_contribute_in_parameter_order() {
        let service = ServiceDescriptor::new().method(
            MethodDescriptor::get("get", "/")
                .param(MethodParameter::request_header("x").configure_named_value(|s| s.name = "X-Id".into()))
                .param(
                    MethodParameter::new("y", ParamType::Value)
                        .with_binding(Binding::RequestHeader(
                            crate::invoker::metadata::NamedValueSpec::new("X-Id"),
                        )),
                ),
        );
        let values = method(&service, 0)
            .unwrap()
            .request_values(vec!["first".into(), "second".into()])
            .unwrap()
            .build()
            .unwrap();
        let ids: Vec<_> = values.headers().get_all("x-id").iter().collect();
        assert_eq!(ids, vec!["first", "second"]);
    }
}
