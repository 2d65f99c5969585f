//! Immutable result of building one service group.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::invoker::proxy::HttpService;
use crate::registry::service_type::{ErasedProxy, ServiceType};

/// One proxy together with the service type it was created for.
#[derive(Clone)]
pub struct ProxyEntry {
    service_type: ServiceType,
    proxy: ErasedProxy,
}

impl ProxyEntry {
    pub(crate) fn new(service_type: ServiceType, proxy: ErasedProxy) -> Self {
        Self {
            service_type,
            proxy,
        }
    }

    pub fn service_type(&self) -> &ServiceType {
        &self.service_type
    }

    pub fn proxy(&self) -> &ErasedProxy {
        &self.proxy
    }

    /// The proxy as `S`, or `None` if it was created for another type.
    pub fn downcast<S: HttpService>(&self) -> Option<Arc<S>> {
        Arc::clone(&self.proxy).downcast::<S>().ok()
    }
}

impl fmt::Debug for ProxyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyEntry")
            .field("service_type", &self.service_type)
            .finish()
    }
}

/// Proxies keyed by service type.
pub type ServiceProxies = HashMap<TypeId, ProxyEntry>;

/// Name, base URL, and proxies of one built group.
#[derive(Debug, Clone)]
pub struct HttpServiceProxyGroup {
    name: String,
    base_url: String,
    proxies: ServiceProxies,
}

impl HttpServiceProxyGroup {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, proxies: ServiceProxies) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            proxies,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn proxies(&self) -> &ServiceProxies {
        &self.proxies
    }

    pub fn contains<S: HttpService>(&self) -> bool {
        self.proxies.contains_key(&TypeId::of::<S>())
    }

    pub fn get<S: HttpService>(&self) -> Option<Arc<S>> {
        self.proxies
            .get(&TypeId::of::<S>())
            .and_then(ProxyEntry::downcast::<S>)
    }

    /// Registered service types, sorted by name.
    pub fn service_types(&self) -> Vec<ServiceType> {
        let mut types: Vec<ServiceType> =
            self.proxies.values().map(|e| *e.service_type()).collect();
        types.sort_by_key(|t| t.name());
        types
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}
