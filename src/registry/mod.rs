//! Service groups and the proxy registry
//!
//! A group binds one client configuration and a set of service types to one
//! exchange adapter. The registry builder collects groups; `build()` creates
//! every group's proxies once and returns an immutable
//! [`HttpServiceProxyRegistry`] that is safe to share across tasks.

pub mod builder;
pub mod declaration;
pub mod discovery;
pub mod group;
pub mod proxy_group;
pub mod proxy_registry;
pub mod service_type;

pub use builder::HttpServiceProxyRegistryBuilder;
pub use declaration::InterfaceClientDeclaration;
pub use discovery::{ServiceCatalog, ServiceTypeDiscovery, ServiceTypeFilter};
pub use group::{ExchangeClientBuilder, HttpServiceGroup};
pub use proxy_group::{HttpServiceProxyGroup, ProxyEntry, ServiceProxies};
pub use proxy_registry::HttpServiceProxyRegistry;
pub use service_type::{ErasedProxy, ServiceType};
