//! Declarative HTTP service invocation
//!
//! Service metadata is turned into per-method binding tables once, when a
//! proxy is created. Each call then runs the bound resolvers over the actual
//! arguments, builds an [`HttpRequestValues`], and hands it to the
//! [`HttpExchangeAdapter`] selected by the method's declared return type.

pub mod adapter;
pub mod metadata;
pub mod multipart;
pub mod proxy;
pub mod proxy_factory;
pub mod request_values;
pub mod resolvers;
pub mod service_method;

pub use adapter::HttpExchangeAdapter;
pub use metadata::{
    Binding, MethodDescriptor, MethodParameter, NamedValueSpec, ParamType, ReturnType,
    ServiceDescriptor,
};
pub use multipart::{MultipartBodyBuilder, Part};
pub use proxy::{HttpService, InvocationResult, RequestValuesProcessor, ServiceProxy};
pub use proxy_factory::{HttpServiceProxyFactory, HttpServiceProxyFactoryBuilder};
pub use request_values::{HttpRequestValues, HttpRequestValuesBuilder, RequestBody};
pub use resolvers::{ArgumentBinder, HttpServiceArgumentResolver};
pub use service_method::EmbeddedValueResolver;
