//! Registry builder
//!
//! Groups are added with [`group`](HttpServiceProxyRegistryBuilder::group)
//! or [`add_client`](HttpServiceProxyRegistryBuilder::add_client). The
//! chained `http_service`, `configure_client`, and `configure_proxy_factory`
//! calls act on the group added last. Group names must be unique; a group
//! without an explicit name is named after its base URL.

use std::fmt;

use crate::client::builder::HttpClientBuilder;
use crate::error::HttpServiceError;
use crate::invoker::proxy::HttpService;
use crate::invoker::proxy_factory::HttpServiceProxyFactoryBuilder;
use crate::registry::declaration::InterfaceClientDeclaration;
use crate::registry::discovery::{ServiceTypeDiscovery, ServiceTypeFilter};
use crate::registry::group::{ExchangeClientBuilder, HttpServiceGroup};
use crate::registry::proxy_group::HttpServiceProxyGroup;
use crate::registry::proxy_registry::HttpServiceProxyRegistry;

/// Builder for [`HttpServiceProxyRegistry`].
pub struct HttpServiceProxyRegistryBuilder<C: ExchangeClientBuilder = HttpClientBuilder> {
    client_template: C,
    groups: Vec<HttpServiceGroup<C>>,
}

impl HttpServiceProxyRegistryBuilder<HttpClientBuilder> {
    pub fn new() -> Self {
        Self::with_client_template(HttpClientBuilder::new())
    }
}

impl Default for HttpServiceProxyRegistryBuilder<HttpClientBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ExchangeClientBuilder> HttpServiceProxyRegistryBuilder<C> {
    /// Every group starts from a clone of `template`.
    pub fn with_client_template(template: C) -> Self {
        Self {
            client_template: template,
            groups: Vec::new(),
        }
    }

    /// Add a group named after its base URL.
    pub fn group(mut self, base_url: &str) -> Result<Self, HttpServiceError> {
        self.push_group(None, base_url)?;
        Ok(self)
    }

    pub fn named_group(mut self, name: &str, base_url: &str) -> Result<Self, HttpServiceError> {
        self.push_group(Some(name), base_url)?;
        Ok(self)
    }

    /// Add a fully configured group in one call.
    pub fn add_client<F, G, H>(
        mut self,
        base_url: &str,
        name: Option<&str>,
        service_configurer: F,
        client_configurer: G,
        proxy_factory_configurer: H,
    ) -> Result<Self, HttpServiceError>
    where
        F: FnOnce(&mut HttpServiceGroup<C>),
        G: FnOnce(C) -> C,
        H: Fn(HttpServiceProxyFactoryBuilder) -> HttpServiceProxyFactoryBuilder
            + Send
            + Sync
            + 'static,
    {
        let group = self.push_group(name, base_url)?;
        service_configurer(&mut *group);
        group
            .configure_client(client_configurer)
            .configure_proxy_factory(proxy_factory_configurer);
        Ok(self)
    }

    /// Add a group described by a declaration.
    pub fn declare(
        mut self,
        declaration: &InterfaceClientDeclaration,
        discovery: &dyn ServiceTypeDiscovery,
        filter: &ServiceTypeFilter,
    ) -> Result<Self, HttpServiceError> {
        declaration.check()?;
        let service_types = declaration.resolve_service_types(discovery, filter)?;
        let group = self.push_group(declaration.name.as_deref(), &declaration.base_url)?;
        group.add_service_types(service_types);
        Ok(self)
    }

    /// Register `S` in the current group.
    pub fn http_service<S: HttpService>(mut self) -> Result<Self, HttpServiceError> {
        self.current_group()?.add_service::<S>();
        Ok(self)
    }

    /// Discover service types into the current group.
    pub fn discover(
        mut self,
        discovery: &dyn ServiceTypeDiscovery,
        base_package: &str,
        filter: &ServiceTypeFilter,
    ) -> Result<Self, HttpServiceError> {
        self.current_group()?
            .discover_service_types(discovery, base_package, filter);
        Ok(self)
    }

    pub fn configure_client<F>(mut self, configurer: F) -> Result<Self, HttpServiceError>
    where
        F: FnOnce(C) -> C,
    {
        self.current_group()?.configure_client(configurer);
        Ok(self)
    }

    pub fn configure_proxy_factory<F>(mut self, configurer: F) -> Result<Self, HttpServiceError>
    where
        F: Fn(HttpServiceProxyFactoryBuilder) -> HttpServiceProxyFactoryBuilder
            + Send
            + Sync
            + 'static,
    {
        self.current_group()?.configure_proxy_factory(configurer);
        Ok(self)
    }

    /// Run `configurer` on every group added so far. Groups added later are
    /// not affected.
    pub fn apply<F>(mut self, configurer: F) -> Self
    where
        F: Fn(&mut HttpServiceGroup<C>),
    {
        for group in &mut self.groups {
            configurer(group);
        }
        self
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(HttpServiceGroup::name).collect()
    }

    /// Create every group's proxies and assemble the registry.
    pub fn build(self) -> Result<HttpServiceProxyRegistry, HttpServiceError> {
        let mut proxy_groups = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let proxies = group.create_proxies()?;
            proxy_groups.push(HttpServiceProxyGroup::new(
                group.name(),
                group.base_url(),
                proxies,
            ));
        }
        tracing::debug!(
            target: "siumai_exchange::registry",
            groups = proxy_groups.len(),
            "built http service proxy registry"
        );
        Ok(HttpServiceProxyRegistry::new(proxy_groups))
    }

    fn push_group(
        &mut self,
        name: Option<&str>,
        base_url: &str,
    ) -> Result<&mut HttpServiceGroup<C>, HttpServiceError> {
        let name = name.unwrap_or(base_url);
        if self.groups.iter().any(|g| g.name() == name) {
            return Err(HttpServiceError::config(format!(
                "A group named '{name}' is already registered"
            )));
        }
        self.groups.push(HttpServiceGroup::new(
            name,
            base_url,
            self.client_template.clone(),
        ));
        self.current_group()
    }

    fn current_group(&mut self) -> Result<&mut HttpServiceGroup<C>, HttpServiceError> {
        self.groups
            .last_mut()
            .ok_or_else(|| HttpServiceError::config("No group has been added yet"))
    }
}

impl<C: ExchangeClientBuilder> fmt::Debug for HttpServiceProxyRegistryBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpServiceProxyRegistryBuilder")
            .field("groups", &self.group_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::metadata::{MethodDescriptor, ReturnType, ServiceDescriptor};
    use crate::invoker::proxy::ServiceProxy;
    use crate::registry::discovery::ServiceCatalog;
    use crate::types::BodyType;

    struct Greeting(ServiceProxy);

    impl HttpService for Greeting {
        fn descriptor() -> ServiceDescriptor {
            ServiceDescriptor::new().method(
                MethodDescriptor::get("greeting", "/greeting")
                    .returns(ReturnType::Body(BodyType::Text)),
            )
        }

        fn from_proxy(proxy: ServiceProxy) -> Self {
            Self(proxy)
        }
    }

    struct Echo;

    impl HttpService for Echo {
        fn descriptor() -> ServiceDescriptor {
            ServiceDescriptor::new().method(MethodDescriptor::post("echo", "/echo"))
        }

        fn from_proxy(_proxy: ServiceProxy) -> Self {
            Self
        }
    }

    #[test]
    fn duplicate_group_name_fails_when_added() {
        let err = HttpServiceProxyRegistry::builder()
            .group("http://localhost:8080")
            .unwrap()
            .group("http://localhost:8080")
            .unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("http://localhost:8080"));
    }

    #[test]
    fn explicit_names_allow_same_base_url() {
        let builder = HttpServiceProxyRegistry::builder()
            .named_group("a", "http://localhost")
            .unwrap()
            .named_group("b", "http://localhost")
            .unwrap();
        assert_eq!(builder.group_names(), vec!["a", "b"]);
    }

    #[test]
    fn chained_calls_need_a_group() {
        let err = HttpServiceProxyRegistry::builder()
            .http_service::<Greeting>()
            .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn apply_only_reaches_existing_groups() {
        let builder = HttpServiceProxyRegistry::builder()
            .group("http://one")
            .unwrap()
            .apply(|group| {
                group.add_service::<Greeting>();
            })
            .group("http://two")
            .unwrap();
        let registry = builder.build().unwrap();
        assert!(registry.get_client_in_group::<Greeting>("http://one").is_some());
        assert!(registry.get_client_in_group::<Greeting>("http://two").is_none());
    }

    #[test]
    fn ambiguous_lookup_lists_groups() {
        let registry = HttpServiceProxyRegistry::builder()
            .named_group("first", "http://one")
            .unwrap()
            .http_service::<Greeting>()
            .unwrap()
            .named_group("second", "http://two")
            .unwrap()
            .http_service::<Greeting>()
            .unwrap()
            .build()
            .unwrap();
        match registry.get_client::<Greeting>() {
            Err(HttpServiceError::AmbiguousClient { groups, .. }) => {
                assert_eq!(groups, vec!["first".to_string(), "second".to_string()]);
            }
            other => panic!("expected ambiguity, got {:?}", other.map(|c| c.is_some())),
        }
        assert!(registry.get_client::<Echo>().unwrap().is_none());
    }

    #[test]
    fn add_client_configures_everything() {
        let registry = HttpServiceProxyRegistry::builder()
            .add_client(
                "http://localhost",
                Some("all"),
                |group| {
                    group.add_service::<Greeting>().add_service::<Echo>();
                },
                |client| client.default_header("X-Test", "1"),
                |factory| factory.default_header("Some-Header", "h1"),
            )
            .unwrap()
            .build()
            .unwrap();
        let group = registry.proxy_group("all").unwrap();
        assert_eq!(group.base_url(), "http://localhost");
        assert_eq!(group.len(), 2);
        assert!(registry.get_client::<Echo>().unwrap().is_some());
    }

    #[test]
    fn declaration_adds_group() {
        let catalog = ServiceCatalog::new().register::<Greeting>().register::<Echo>();
        let declaration = InterfaceClientDeclaration::new("http://localhost:9000")
            .name("declared")
            .service_type("Echo");
        let registry = HttpServiceProxyRegistry::builder()
            .declare(&declaration, &catalog, &ServiceTypeFilter::new())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(registry.group_names(), vec!["declared"]);
        assert!(registry.get_client_in_group::<Echo>("declared").is_some());
        assert!(registry.get_client::<Greeting>().unwrap().is_none());
    }
}
