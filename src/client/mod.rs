//! Built-in HTTP client and its exchange adapter.
//!
//! [`HttpClientBuilder`] is the per-group client configuration the registry
//! clones and customizes; [`RestClientAdapter`] turns the built client into an
//! [`HttpExchangeAdapter`](crate::invoker::adapter::HttpExchangeAdapter).

pub mod adapter;
pub mod builder;
pub mod codec;
pub mod interceptor;
pub mod transport;
pub mod uri_template;

pub use adapter::RestClientAdapter;
pub use builder::{HttpClient, HttpClientBuilder};
pub use interceptor::{BasicAuthInterceptor, HttpInterceptor, HttpRequestContext, LoggingInterceptor};
pub use transport::{
    FormPart, HttpTransport, ReqwestTransport, TransportBody, TransportRequest, TransportResponse,
};
pub use uri_template::UriBuilderFactory;
