//! Proxy factory.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::HttpServiceError;
use crate::invoker::adapter::HttpExchangeAdapter;
use crate::invoker::metadata::ServiceDescriptor;
use crate::invoker::proxy::{HttpService, ProxyInner, RequestValuesProcessor, ServiceProxy};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::invoker::resolvers::{HttpServiceArgumentResolver, default_resolvers};
use crate::invoker::service_method::{EmbeddedValueResolver, HttpServiceMethod};

/// Creates service proxies backed by one exchange adapter.
#[derive(Clone)]
pub struct HttpServiceProxyFactory {
    adapter: Arc<dyn HttpExchangeAdapter>,
    resolvers: Vec<Arc<dyn HttpServiceArgumentResolver>>,
    processors: Vec<RequestValuesProcessor>,
    default_headers: HeaderMap,
    embedded_value_resolver: Option<EmbeddedValueResolver>,
}

impl HttpServiceProxyFactory {
    pub fn builder() -> HttpServiceProxyFactoryBuilder {
        HttpServiceProxyFactoryBuilder::default()
    }

    /// Builder preset with an adapter.
    pub fn builder_for(adapter: Arc<dyn HttpExchangeAdapter>) -> HttpServiceProxyFactoryBuilder {
        HttpServiceProxyFactoryBuilder::default().exchange_adapter(adapter)
    }

    /// Create a client for `S`; every method is bound up front, so broken
    /// declarations fail here rather than on first call.
    pub fn create_client<S: HttpService>(&self) -> Result<S, HttpServiceError> {
        let proxy = self.create_proxy(std::any::type_name::<S>(), &S::descriptor())?;
        Ok(S::from_proxy(proxy))
    }

    /// Create a proxy handle from a descriptor.
    pub fn create_proxy(
        &self,
        service_name: &str,
        descriptor: &ServiceDescriptor,
    ) -> Result<ServiceProxy, HttpServiceError> {
        let mut methods = HashMap::with_capacity(descriptor.methods.len());
        for method in &descriptor.methods {
            let service_method = HttpServiceMethod::new(
                service_name,
                descriptor,
                method,
                &self.resolvers,
                self.embedded_value_resolver.as_ref(),
            )?;
            if methods.insert(method.name.clone(), service_method).is_some() {
                return Err(HttpServiceError::config(format!(
                    "Duplicate method '{}' on {service_name}",
                    method.name
                )));
            }
        }
        tracing::debug!(
            target: "siumai_exchange::invoker",
            service = service_name,
            methods = methods.len(),
            "created http service proxy"
        );
        Ok(ServiceProxy::new(ProxyInner {
            service_name: service_name.to_string(),
            methods,
            adapter: Arc::clone(&self.adapter),
            processors: self.processors.clone(),
            default_headers: self.default_headers.clone(),
        }))
    }

    pub fn exchange_adapter(&self) -> &Arc<dyn HttpExchangeAdapter> {
        &self.adapter
    }
}

impl fmt::Debug for HttpServiceProxyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpServiceProxyFactory")
            .field("resolvers", &self.resolvers.len())
            .field("processors", &self.processors.len())
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

/// Builder for [`HttpServiceProxyFactory`].
#[derive(Default)]
pub struct HttpServiceProxyFactoryBuilder {
    adapter: Option<Arc<dyn HttpExchangeAdapter>>,
    custom_resolvers: Vec<Arc<dyn HttpServiceArgumentResolver>>,
    processors: Vec<RequestValuesProcessor>,
    default_headers: Vec<(String, String)>,
    embedded_value_resolver: Option<EmbeddedValueResolver>,
}

impl HttpServiceProxyFactoryBuilder {
    pub fn exchange_adapter(mut self, adapter: Arc<dyn HttpExchangeAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn has_exchange_adapter(&self) -> bool {
        self.adapter.is_some()
    }

    /// Add a resolver tried before the built-in ones.
    pub fn custom_argument_resolver(
        mut self,
        resolver: Arc<dyn HttpServiceArgumentResolver>,
    ) -> Self {
        self.custom_resolvers.push(resolver);
        self
    }

    /// Add a header sent with every request unless the request sets it.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Add a hook run on every request builder after argument resolution.
    pub fn request_values_processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(&str, &mut HttpRequestValuesBuilder) -> Result<(), HttpServiceError>
            + Send
            + Sync
            + 'static,
    {
        self.processors.push(Arc::new(processor));
        self
    }

    /// Resolver for `${name}` placeholders in URL templates.
    pub fn embedded_value_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.embedded_value_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> Result<HttpServiceProxyFactory, HttpServiceError> {
        let adapter = self
            .adapter
            .ok_or_else(|| HttpServiceError::config("An exchange adapter is required"))?;
        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                HttpServiceError::config(format!("Invalid default header name '{name}': {e}"))
            })?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                HttpServiceError::config(format!("Invalid default header value: {e}"))
            })?;
            default_headers.append(name, value);
        }
        let resolvers =
            default_resolvers(&self.custom_resolvers, adapter.supports_request_attributes());
        Ok(HttpServiceProxyFactory {
            adapter,
            resolvers,
            processors: self.processors,
            default_headers,
            embedded_value_resolver: self.embedded_value_resolver,
        })
    }
}
