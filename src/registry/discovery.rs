//! Service type discovery.
//!
//! Rust has no classpath to scan, so discovery works over a catalog of
//! service types registered up front. Groups only consume the candidates.

use std::fmt;
use std::sync::Arc;

use crate::invoker::proxy::HttpService;
use crate::registry::service_type::ServiceType;

/// Source of candidate service types for a base package.
pub trait ServiceTypeDiscovery: Send + Sync {
    /// Candidate types in `base_package` or its submodules.
    fn candidates(&self, base_package: &str) -> Vec<ServiceType>;

    /// Look a type up by its full or simple name.
    fn find(&self, name: &str) -> Option<ServiceType> {
        self.candidates("")
            .into_iter()
            .find(|t| t.name() == name || t.simple_name() == name)
    }
}

/// A fixed list of known service types.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    types: Vec<ServiceType>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: HttpService>(self) -> Self {
        self.with(ServiceType::of::<S>())
    }

    pub fn with(mut self, service_type: ServiceType) -> Self {
        if !self.types.contains(&service_type) {
            self.types.push(service_type);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl ServiceTypeDiscovery for ServiceCatalog {
    fn candidates(&self, base_package: &str) -> Vec<ServiceType> {
        self.types
            .iter()
            .filter(|t| t.is_in_package(base_package))
            .copied()
            .collect()
    }
}

type Predicate = Arc<dyn Fn(&ServiceType) -> bool + Send + Sync>;

/// Include and exclude predicates applied to discovered candidates.
///
/// A candidate is accepted when it matches any include (or there are none),
/// matches no exclude, and declares at least one HTTP exchange method.
#[derive(Clone, Default)]
pub struct ServiceTypeFilter {
    includes: Vec<Predicate>,
    excludes: Vec<Predicate>,
}

impl ServiceTypeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ServiceType) -> bool + Send + Sync + 'static,
    {
        self.includes.push(Arc::new(predicate));
        self
    }

    pub fn exclude<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ServiceType) -> bool + Send + Sync + 'static,
    {
        self.excludes.push(Arc::new(predicate));
        self
    }

    pub fn matches(&self, service_type: &ServiceType) -> bool {
        (self.includes.is_empty() || self.includes.iter().any(|p| p(service_type)))
            && !self.excludes.iter().any(|p| p(service_type))
            && service_type.has_exchange_methods()
    }
}

impl fmt::Debug for ServiceTypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceTypeFilter")
            .field("includes", &self.includes.len())
            .field("excludes", &self.excludes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::metadata::{MethodDescriptor, ServiceDescriptor};
    use crate::invoker::proxy::ServiceProxy;

    mod clients {
        use super::*;

        pub struct Orders;
        pub struct Users;
        pub struct Helper;

        impl HttpService for Orders {
            fn descriptor() -> ServiceDescriptor {
                ServiceDescriptor::new().method(MethodDescriptor::get("list", "/orders"))
            }
            fn from_proxy(_proxy: ServiceProxy) -> Self {
                Self
            }
        }

        impl HttpService for Users {
            fn descriptor() -> ServiceDescriptor {
                ServiceDescriptor::new().method(MethodDescriptor::get("list", "/users"))
            }
            fn from_proxy(_proxy: ServiceProxy) -> Self {
                Self
            }
        }

        impl HttpService for Helper {
            fn descriptor() -> ServiceDescriptor {
                ServiceDescriptor::new()
            }
            fn from_proxy(_proxy: ServiceProxy) -> Self {
                Self
            }
        }
    }

    struct Outside;

    impl HttpService for Outside {
        fn descriptor() -> ServiceDescriptor {
            ServiceDescriptor::new().method(MethodDescriptor::get("ping", "/ping"))
        }
        fn from_proxy(_proxy: ServiceProxy) -> Self {
            Self
        }
    }

    fn catalog() -> ServiceCatalog {
        ServiceCatalog::new()
            .register::<clients::Orders>()
            .register::<clients::Users>()
            .register::<clients::Helper>()
            .register::<Outside>()
            .register::<Outside>()
    }

    #[test]
    fn candidates_are_limited_to_package() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 4);
        let package = format!("{}::clients", module_path!());
        let names: Vec<_> = catalog
            .candidates(&package)
            .iter()
            .map(|t| t.simple_name())
            .collect();
        assert_eq!(names, vec!["Orders", "Users", "Helper"]);
    }

    #[test]
    fn filter_requires_exchange_methods() {
        let filter = ServiceTypeFilter::new();
        assert!(filter.matches(&ServiceType::of::<clients::Orders>()));
        assert!(!filter.matches(&ServiceType::of::<clients::Helper>()));
    }

    #[test]
    fn include_and_exclude_predicates() {
        let filter = ServiceTypeFilter::new()
            .include(|t| t.simple_name().ends_with('s'))
            .exclude(|t| t.simple_name() == "Users");
        assert!(filter.matches(&ServiceType::of::<clients::Orders>()));
        assert!(!filter.matches(&ServiceType::of::<clients::Users>()));
        assert!(!filter.matches(&ServiceType::of::<Outside>()));
    }

    #[test]
    fn find_by_simple_or_full_name() {
        let catalog = catalog();
        assert_eq!(catalog.find("Outside"), Some(ServiceType::of::<Outside>()));
        let full = ServiceType::of::<clients::Orders>().name();
        assert_eq!(catalog.find(full), Some(ServiceType::of::<clients::Orders>()));
        assert!(catalog.find("Missing").is_none());
    }
}
