//! siumai-exchange
//!
//! Declarative HTTP service proxies. A service type describes its methods
//! (HTTP method, URL template, parameter bindings, return shape) through
//! [`HttpService`]; a [`HttpServiceProxyFactory`] binds those descriptions to
//! an [`HttpExchangeAdapter`] once, and every call then turns its arguments
//! into an [`HttpRequestValues`] and dispatches it.
//!
//! [`HttpServiceProxyRegistry`] groups services by base URL and client
//! configuration:
//!
//! ```rust,ignore
//! let registry = HttpServiceProxyRegistry::builder()
//!     .group("http://localhost:8080")?
//!     .configure_client(|client| client.default_header("Base-Header", "h0"))?
//!     .http_service::<GreetingService>()?
//!     .build()?;
//!
//! let greeting = registry.get_client::<GreetingService>()?.expect("registered");
//! ```
#![deny(unsafe_code)]

pub mod client;
pub mod defaults;
pub mod error;
pub mod invoker;
pub mod registry;
pub mod types;
pub mod utils;

pub use client::{HttpClient, HttpClientBuilder, RestClientAdapter};
pub use error::{ErrorCategory, HttpServiceError};
pub use invoker::{
    Binding, HttpExchangeAdapter, HttpRequestValues, HttpService, HttpServiceProxyFactory,
    MethodDescriptor, MethodParameter, NamedValueSpec, ParamType, ReturnType, ServiceDescriptor,
    ServiceProxy,
};
pub use registry::{
    HttpServiceGroup, HttpServiceProxyGroup, HttpServiceProxyRegistry,
    HttpServiceProxyRegistryBuilder, ServiceType,
};
pub use types::{
    Argument, BodyType, HttpConfig, HttpEntity, MultipartFile, Publisher, Resource, ResponseBody,
    ResponseEntity,
};

static_assertions::assert_impl_all!(ServiceProxy: Send, Sync, Clone);
static_assertions::assert_impl_all!(HttpServiceProxyFactory: Send, Sync);
static_assertions::assert_impl_all!(HttpServiceProxyRegistry: Send, Sync);
static_assertions::assert_impl_all!(HttpRequestValues: Send);
static_assertions::assert_impl_all!(HttpClientBuilder: Send, Sync, Clone);
