//! Service groups: one client configuration, one adapter, many services.

use std::fmt;
use std::sync::Arc;

use crate::client::adapter::RestClientAdapter;
use crate::client::builder::HttpClientBuilder;
use crate::error::HttpServiceError;
use crate::invoker::adapter::HttpExchangeAdapter;
use crate::invoker::proxy::HttpService;
use crate::invoker::proxy_factory::{HttpServiceProxyFactory, HttpServiceProxyFactoryBuilder};
use crate::registry::discovery::{ServiceTypeDiscovery, ServiceTypeFilter};
use crate::registry::proxy_group::{ProxyEntry, ServiceProxies};
use crate::registry::service_type::ServiceType;

/// Client configuration owned by a group.
///
/// Groups clone a template per group, point it at the group's base URL, let
/// callers customize it, and finally turn it into the group's adapter.
pub trait ExchangeClientBuilder: Clone + Send + Sync + 'static {
    /// Point the client at the group's base URL.
    fn with_base_url(self, base_url: &str) -> Self;

    /// Finalize the configuration into an exchange adapter.
    fn build_exchange_adapter(&self) -> Result<Arc<dyn HttpExchangeAdapter>, HttpServiceError>;
}

impl ExchangeClientBuilder for HttpClientBuilder {
    fn with_base_url(self, base_url: &str) -> Self {
        self.base_url(base_url)
    }

    fn build_exchange_adapter(&self) -> Result<Arc<dyn HttpExchangeAdapter>, HttpServiceError> {
        let client = self.clone().build()?;
        Ok(Arc::new(RestClientAdapter::create(client)))
    }
}

type ProxyFactoryConfigurer =
    Arc<dyn Fn(HttpServiceProxyFactoryBuilder) -> HttpServiceProxyFactoryBuilder + Send + Sync>;

/// A named, base-URL scoped set of service types sharing one client.
pub struct HttpServiceGroup<C: ExchangeClientBuilder> {
    name: String,
    base_url: String,
    client: C,
    proxy_factory_configurers: Vec<ProxyFactoryConfigurer>,
    service_types: Vec<ServiceType>,
}

impl<C: ExchangeClientBuilder> HttpServiceGroup<C> {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, client: C) -> Self {
        let base_url = base_url.into();
        Self {
            name: name.into(),
            client: client.with_base_url(&base_url),
            base_url,
            proxy_factory_configurers: Vec::new(),
            service_types: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Registered service types in insertion order.
    pub fn service_types(&self) -> &[ServiceType] {
        &self.service_types
    }

    /// Customize the client configuration. Calls accumulate.
    pub fn configure_client<F>(&mut self, configurer: F) -> &mut Self
    where
        F: FnOnce(C) -> C,
    {
        self.client = configurer(self.client.clone());
        self
    }

    /// Add a proxy factory customization; customizations run in the order
    /// they were added.
    pub fn configure_proxy_factory<F>(&mut self, configurer: F) -> &mut Self
    where
        F: Fn(HttpServiceProxyFactoryBuilder) -> HttpServiceProxyFactoryBuilder
            + Send
            + Sync
            + 'static,
    {
        self.proxy_factory_configurers.push(Arc::new(configurer));
        self
    }

    pub fn add_service<S: HttpService>(&mut self) -> &mut Self {
        self.add_service_types([ServiceType::of::<S>()])
    }

    /// Add service types; types already in the group are skipped.
    pub fn add_service_types<I>(&mut self, service_types: I) -> &mut Self
    where
        I: IntoIterator<Item = ServiceType>,
    {
        for service_type in service_types {
            if !self.service_types.contains(&service_type) {
                self.service_types.push(service_type);
            }
        }
        self
    }

    /// Add the candidates in `base_package` accepted by `filter`.
    pub fn discover_service_types(
        &mut self,
        discovery: &dyn ServiceTypeDiscovery,
        base_package: &str,
        filter: &ServiceTypeFilter,
    ) -> &mut Self {
        let found: Vec<ServiceType> = discovery
            .candidates(base_package)
            .into_iter()
            .filter(|t| filter.matches(t))
            .collect();
        tracing::debug!(
            target: "siumai_exchange::registry",
            group = %self.name,
            base_package,
            found = found.len(),
            "discovered service types"
        );
        self.add_service_types(found)
    }

    /// Build the adapter and the proxy factory, then one proxy per service type.
    pub fn create_proxies(&self) -> Result<ServiceProxies, HttpServiceError> {
        let adapter = self.client.build_exchange_adapter()?;
        let factory: HttpServiceProxyFactory = self
            .proxy_factory_configurers
            .iter()
            .fold(HttpServiceProxyFactory::builder_for(adapter), |builder, configure| {
                configure(builder)
            })
            .build()?;

        let mut proxies = ServiceProxies::with_capacity(self.service_types.len());
        for service_type in &self.service_types {
            let proxy = service_type.create(&factory)?;
            proxies.insert(service_type.type_id(), ProxyEntry::new(*service_type, proxy));
        }
        tracing::debug!(
            target: "siumai_exchange::registry",
            group = %self.name,
            base_url = %self.base_url,
            proxies = proxies.len(),
            "created group proxies"
        );
        Ok(proxies)
    }
}

impl<C: ExchangeClientBuilder + fmt::Debug> fmt::Debug for HttpServiceGroup<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpServiceGroup")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("client", &self.client)
            .field("proxy_factory_configurers", &self.proxy_factory_configurers.len())
            .field("service_types", &self.service_types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::{HttpTransport, TransportRequest, TransportResponse};
    use crate::invoker::metadata::{MethodDescriptor, ReturnType, ServiceDescriptor};
    use crate::invoker::proxy::ServiceProxy;
    use crate::types::BodyType;
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::StatusCode;
    use reqwest::header::HeaderMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<TransportRequest>>,
    }

    #[async_trait]
    impl HttpTransport for Recorder {
        async fn execute(
            &self,
            request: TransportRequest,
        ) -> Result<TransportResponse, HttpServiceError> {
            self.seen.lock().unwrap().push(request);
            Ok(TransportResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                body: Bytes::new(),
            })
        }
    }

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

    fn group() -> HttpServiceGroup<HttpClientBuilder> {
        HttpServiceGroup::new("greetings", "http://localhost:8080", HttpClientBuilder::new())
    }

    #[test]
    fn base_url_is_applied_to_client() {
        assert_eq!(group().client().get_base_url(), Some("http://localhost:8080"));
    }

    #[test]
    fn empty_group_creates_no_proxies() {
        assert!(group().create_proxies().unwrap().is_empty());
    }

    #[test]
    fn duplicate_service_types_are_ignored() {
        let mut group = group();
        group.add_service::<Greeting>().add_service::<Greeting>();
        assert_eq!(group.service_types().len(), 1);
        let proxies = group.create_proxies().unwrap();
        assert_eq!(proxies.len(), 1);
        let entry = proxies.values().next().unwrap();
        let greeting = entry.downcast::<Greeting>().unwrap();
        assert!(greeting.0.service_name().ends_with("Greeting"));
    }

    #[test]
    fn proxy_factory_configurers_run_in_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut group = group();
        for step in 1..=3 {
            let order = Arc::clone(&order);
            group.configure_proxy_factory(move |builder| {
                order.lock().unwrap().push(step);
                builder
            });
        }
        group.create_proxies().unwrap();
        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn configure_client_accumulates() {
        let mut group = group();
        group
            .configure_client(|c| c.default_header("A", "1"))
            .configure_client(|c| c.base_url("http://other"));
        assert_eq!(group.client().get_base_url(), Some("http://other"));
    }

    #[tokio::test]
    async fn client_changes_after_creation_do_not_reach_proxies() {
        let recorder = Arc::new(Recorder::default());
        let mut group = HttpServiceGroup::new(
            "greetings",
            "http://localhost:8080",
            HttpClientBuilder::new().with_transport(recorder.clone()),
        );
        group.add_service::<Greeting>();
        let proxies = group.create_proxies().unwrap();

        group.configure_client(|c| c.default_header("X", "late"));
        let greeting = proxies.values().next().unwrap().downcast::<Greeting>().unwrap();
        let body: Option<String> = greeting.0.exchange_for_body("greeting", vec![]).await.unwrap();
        assert!(body.is_none());

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].url.as_str(), "http://localhost:8080/greeting");
        assert!(seen[0].headers.get("x").is_none());
    }

    #[test]
    fn invalid_client_fails_proxy_creation() {
        let mut group = group();
        group
            .configure_client(|c| c.default_header("bad header", "x"))
            .add_service::<Greeting>();
        assert!(group.create_proxies().unwrap_err().is_configuration_error());
    }
}
