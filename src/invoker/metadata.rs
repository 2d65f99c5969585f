//! Static service metadata.
//!
//! A service type describes its HTTP methods once through a
//! [`ServiceDescriptor`]. The proxy factory reads it at creation time to build
//! the per-method binding tables; nothing here is inspected per call.

use reqwest::Method;

use crate::types::BodyType;

/// Type-level defaults plus the HTTP exchange methods of one service.
#[derive(Debug, Clone, Default)]
pub struct ServiceDescriptor {
    /// URL prefix applied to every method URL.
    pub url: Option<String>,
    /// Default request content type.
    pub content_type: Option<String>,
    /// Default accepted media types.
    pub accept: Vec<String>,
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept.push(media_type.into());
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Whether any method declares an HTTP exchange.
    pub fn has_exchange_methods(&self) -> bool {
        self.methods.iter().any(MethodDescriptor::declares_exchange)
    }
}

/// One HTTP exchange method.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub http_method: Option<Method>,
    pub url: Option<String>,
    pub content_type: Option<String>,
    pub accept: Vec<String>,
    pub parameters: Vec<MethodParameter>,
    pub return_type: ReturnType,
}

impl MethodDescriptor {
    /// A method without HTTP method or URL; both may come from arguments.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            http_method: None,
            url: None,
            content_type: None,
            accept: Vec::new(),
            parameters: Vec::new(),
            return_type: ReturnType::Unit,
        }
    }

    pub fn exchange(name: impl Into<String>, method: Method, url: impl Into<String>) -> Self {
        let mut descriptor = Self::new(name);
        descriptor.http_method = Some(method);
        let url = url.into();
        if !url.is_empty() {
            descriptor.url = Some(url);
        }
        descriptor
    }

    pub fn get(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::exchange(name, Method::GET, url)
    }

    pub fn post(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::exchange(name, Method::POST, url)
    }

    pub fn put(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::exchange(name, Method::PUT, url)
    }

    pub fn patch(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::exchange(name, Method::PATCH, url)
    }

    pub fn delete(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self::exchange(name, Method::DELETE, url)
    }

    pub fn http_method(mut self, method: Method) -> Self {
        self.http_method = Some(method);
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn accept(mut self, media_type: impl Into<String>) -> Self {
        self.accept.push(media_type.into());
        self
    }

    /// Append a parameter; its index is its position in the declaration.
    pub fn param(mut self, mut parameter: MethodParameter) -> Self {
        parameter.index = self.parameters.len();
        self.parameters.push(parameter);
        self
    }

    /// Whether the method has an HTTP method, declared or passed per call.
    pub fn declares_exchange(&self) -> bool {
        self.http_method.is_some()
            || self
                .parameters
                .iter()
                .any(|p| *p.param_type() == ParamType::HttpMethod)
    }

    pub fn returns(mut self, return_type: ReturnType) -> Self {
        self.return_type = return_type;
        self
    }
}

/// Declared return shape of a service method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    /// Nothing; the response content is released.
    Unit,
    /// Response headers only.
    Headers,
    /// The decoded body.
    Body(BodyType),
    /// Status, headers, and the decoded body.
    Entity(BodyType),
    /// Status and headers without a body.
    BodilessEntity,
}

/// Declared type of a parameter, as far as binding is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Any plain value (text, numbers, serializable objects, lists).
    Value,
    /// Name/value pairs, expanded one entry per key.
    Map,
    /// Absolute URI overriding the method URL.
    Uri,
    /// HTTP method chosen at call time.
    HttpMethod,
    MultipartFile,
    Resource,
    /// Asynchronous producer of `element` values.
    Publisher {
        multi_value: bool,
        element: Box<ParamType>,
    },
}

impl ParamType {
    pub fn single_publisher(element: ParamType) -> Self {
        Self::Publisher {
            multi_value: false,
            element: Box::new(element),
        }
    }

    pub fn multi_publisher(element: ParamType) -> Self {
        Self::Publisher {
            multi_value: true,
            element: Box::new(element),
        }
    }

    pub fn is_publisher(&self) -> bool {
        matches!(self, Self::Publisher { .. })
    }

    /// Element type for publishers, the type itself otherwise.
    pub fn nested(&self) -> &ParamType {
        match self {
            Self::Publisher { element, .. } => element.nested(),
            other => other,
        }
    }
}

/// Attributes of a named-value binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedValueSpec {
    /// Explicit name; empty means "use the parameter name".
    pub name: String,
    pub required: bool,
    pub default_value: Option<String>,
}

impl NamedValueSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
            default_value: None,
        }
    }

    /// Binding named after the parameter.
    pub fn unnamed() -> Self {
        Self::new("")
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// A default makes the binding optional.
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self.required = false;
        self
    }
}

/// The binding annotation on a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    PathVariable(NamedValueSpec),
    RequestParam(NamedValueSpec),
    RequestHeader(NamedValueSpec),
    CookieValue(NamedValueSpec),
    RequestAttribute(NamedValueSpec),
    RequestPart(NamedValueSpec),
    RequestBody { required: bool },
}

/// Static description of one method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodParameter {
    index: usize,
    name: Option<String>,
    param_type: ParamType,
    binding: Option<Binding>,
}

impl MethodParameter {
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            index: 0,
            name: Some(name.into()),
            param_type,
            binding: None,
        }
    }

    /// Parameter whose declared name is not available.
    pub fn unnamed(param_type: ParamType) -> Self {
        Self {
            index: 0,
            name: None,
            param_type,
            binding: None,
        }
    }

    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn path_variable(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Value).with_binding(Binding::PathVariable(NamedValueSpec::unnamed()))
    }

    pub fn request_param(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Value).with_binding(Binding::RequestParam(NamedValueSpec::unnamed()))
    }

    pub fn request_header(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Value)
            .with_binding(Binding::RequestHeader(NamedValueSpec::unnamed()))
    }

    pub fn cookie_value(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Value).with_binding(Binding::CookieValue(NamedValueSpec::unnamed()))
    }

    pub fn request_attribute(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Value)
            .with_binding(Binding::RequestAttribute(NamedValueSpec::unnamed()))
    }

    pub fn request_part(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Value).with_binding(Binding::RequestPart(NamedValueSpec::unnamed()))
    }

    pub fn request_body(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Value).with_binding(Binding::RequestBody { required: true })
    }

    pub fn multipart_file(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::MultipartFile)
    }

    pub fn uri(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Uri)
    }

    pub fn http_method(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::HttpMethod)
    }

    /// Replace the declared type, keeping name and binding.
    pub fn of_type(mut self, param_type: ParamType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn param_type(&self) -> &ParamType {
        &self.param_type
    }

    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// Attributes of the named-value binding, if this is one.
    pub fn named_value_spec(&self) -> Option<&NamedValueSpec> {
        match self.binding.as_ref()? {
            Binding::PathVariable(spec)
            | Binding::RequestParam(spec)
            | Binding::RequestHeader(spec)
            | Binding::CookieValue(spec)
            | Binding::RequestAttribute(spec)
            | Binding::RequestPart(spec) => Some(spec),
            Binding::RequestBody { .. } => None,
        }
    }

    /// Mutable access to the named-value attributes, e.g. to rename or add a
    /// default after using one of the shorthand constructors.
    pub fn configure_named_value(mut self, f: impl FnOnce(&mut NamedValueSpec)) -> Self {
        if let Some(
            Binding::PathVariable(spec)
            | Binding::RequestParam(spec)
            | Binding::RequestHeader(spec)
            | Binding::CookieValue(spec)
            | Binding::RequestAttribute(spec)
            | Binding::RequestPart(spec),
        ) = self.binding.as_mut()
        {
            f(spec);
        }
        self
    }

    /// Display form used in configuration errors.
    pub fn describe(&self) -> String {
        match &self.name {
            Some(name) => format!("[{}] '{}'", self.index, name),
            None => format!("[{}]", self.index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_are_indexed_in_declaration_order() {
        let method = MethodDescriptor::post("post_multipart", "/upload")
            .param(MethodParameter::multipart_file("file"))
            .param(MethodParameter::request_part("another_part"));
        assert_eq!(method.parameters[0].index(), 0);
        assert_eq!(method.parameters[1].index(), 1);
        assert_eq!(method.http_method, Some(Method::POST));
    }

    #[test]
    fn default_value_makes_binding_optional() {
        let param = MethodParameter::request_header("trace")
            .configure_named_value(|spec| *spec = NamedValueSpec::new("X-Trace").default_value("none"));
        let spec = param.named_value_spec().unwrap();
        assert_eq!(spec.name, "X-Trace");
        assert!(!spec.required);
        assert_eq!(spec.default_value.as_deref(), Some("none"));
    }

    #[test]
    fn publisher_nested_type_unwraps_element() {
        let ty = ParamType::multi_publisher(ParamType::MultipartFile);
        assert!(ty.is_publisher());
        assert_eq!(ty.nested(), &ParamType::MultipartFile);
    }

    #[test]
    fn descriptor_without_http_methods_has_no_exchanges() {
        let descriptor = ServiceDescriptor::new().method(MethodDescriptor::new("helper"));
        assert!(!descriptor.has_exchange_methods());
    }
}
