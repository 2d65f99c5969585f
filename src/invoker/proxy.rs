//! Service trait and the intercepting proxy handle.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::HttpServiceError;
use crate::invoker::adapter::HttpExchangeAdapter;
use crate::invoker::metadata::{ReturnType, ServiceDescriptor};
use crate::invoker::request_values::{HttpRequestValues, HttpRequestValuesBuilder};
use crate::invoker::service_method::HttpServiceMethod;
use crate::types::{Argument, ResponseBody, ResponseEntity};

/// A declarative HTTP service.
///
/// Implementations describe their methods through [`HttpService::descriptor`]
/// and forward each call to the [`ServiceProxy`] they were created with:
///
/// ```ignore
/// struct GreetingService(ServiceProxy);
///
/// impl HttpService for GreetingService {
///     fn descriptor() -> ServiceDescriptor {
///         ServiceDescriptor::new().method(
///             MethodDescriptor::get("get_greeting", "/greeting")
///                 .returns(ReturnType::Body(BodyType::Text)),
///         )
///     }
///
///     fn from_proxy(proxy: ServiceProxy) -> Self {
///         Self(proxy)
///     }
/// }
///
/// impl GreetingService {
///     async fn get_greeting(&self) -> Result<Option<String>, HttpServiceError> {
///         self.0.exchange_for_body("get_greeting", vec![]).await
///     }
/// }
/// ```
pub trait HttpService: Sized + Send + Sync + 'static {
    fn descriptor() -> ServiceDescriptor;

    fn from_proxy(proxy: ServiceProxy) -> Self;
}

/// Hook run on every request builder after argument resolution.
pub type RequestValuesProcessor =
    Arc<dyn Fn(&str, &mut HttpRequestValuesBuilder) -> Result<(), HttpServiceError> + Send + Sync>;

/// Result of [`ServiceProxy::invoke`], shaped by the declared return type.
#[derive(Debug)]
pub enum InvocationResult {
    Unit,
    Headers(HeaderMap),
    Body(Option<ResponseBody>),
    Entity(ResponseEntity<ResponseBody>),
    BodilessEntity(ResponseEntity<()>),
}

/// Cloneable handle that turns method calls into exchanges.
#[derive(Clone)]
pub struct ServiceProxy {
    inner: Arc<ProxyInner>,
}

pub(crate) struct ProxyInner {
    pub(crate) service_name: String,
    pub(crate) methods: HashMap<String, HttpServiceMethod>,
    pub(crate) adapter: Arc<dyn HttpExchangeAdapter>,
    pub(crate) processors: Vec<RequestValuesProcessor>,
    pub(crate) default_headers: HeaderMap,
}

impl ServiceProxy {
    pub(crate) fn new(inner: ProxyInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    /// Names of the proxied methods, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.inner.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn method(&self, name: &str) -> Result<&HttpServiceMethod, HttpServiceError> {
        self.inner.methods.get(name).ok_or_else(|| {
            HttpServiceError::InvalidArgument(format!(
                "No HTTP exchange method '{name}' on {}",
                self.inner.service_name
            ))
        })
    }

    fn request_values(
        &self,
        method: &HttpServiceMethod,
        arguments: Vec<Argument>,
    ) -> Result<HttpRequestValues, HttpServiceError> {
        let mut builder = method.request_values(arguments)?;
        for name in self.inner.default_headers.keys() {
            if !builder.headers().contains_key(name) {
                let values: Vec<&str> = self
                    .inner
                    .default_headers
                    .get_all(name)
                    .iter()
                    .filter_map(|v| v.to_str().ok())
                    .collect();
                builder.add_header(name.as_str(), values)?;
            }
        }
        for processor in &self.inner.processors {
            processor(method.name(), &mut builder)?;
        }
        builder.build()
    }

    /// Perform the exchange selected by the method's declared return type.
    pub async fn invoke(
        &self,
        method_name: &str,
        arguments: Vec<Argument>,
    ) -> Result<InvocationResult, HttpServiceError> {
        let method = self.method(method_name)?;
        let values = self.request_values(method, arguments)?;
        tracing::debug!(
            target: "siumai_exchange::invoker",
            service = %self.inner.service_name,
            method = method_name,
            http_method = %values.http_method(),
            "invoking http exchange"
        );
        let adapter = &self.inner.adapter;
        Ok(match method.return_type() {
            ReturnType::Unit => {
                adapter.exchange(values).await?;
                InvocationResult::Unit
            }
            ReturnType::Headers => InvocationResult::Headers(adapter.exchange_for_headers(values).await?),
            ReturnType::Body(body_type) => {
                InvocationResult::Body(adapter.exchange_for_body(values, body_type).await?)
            }
            ReturnType::Entity(body_type) => {
                InvocationResult::Entity(adapter.exchange_for_entity(values, body_type).await?)
            }
            ReturnType::BodilessEntity => {
                InvocationResult::BodilessEntity(adapter.exchange_for_bodiless_entity(values).await?)
            }
        })
    }

    /// Fail before any exchange when the declared return type does not fit.
    fn check_return(
        &self,
        method_name: &str,
        fits: fn(ReturnType) -> bool,
        expected: &str,
    ) -> Result<(), HttpServiceError> {
        if fits(self.method(method_name)?.return_type()) {
            Ok(())
        } else {
            Err(self.mismatch(method_name, expected))
        }
    }

    fn mismatch(&self, method_name: &str, expected: &str) -> HttpServiceError {
        HttpServiceError::config(format!(
            "Method {}.{method_name} is not declared to return {expected}",
            self.inner.service_name
        ))
    }

    /// Call a method declared with [`ReturnType::Unit`].
    pub async fn exchange(
        &self,
        method_name: &str,
        arguments: Vec<Argument>,
    ) -> Result<(), HttpServiceError> {
        self.check_return(method_name, |rt| rt == ReturnType::Unit, "nothing")?;
        match self.invoke(method_name, arguments).await? {
            InvocationResult::Unit => Ok(()),
            _ => Err(self.mismatch(method_name, "nothing")),
        }
    }

    /// Call a method declared with [`ReturnType::Headers`].
    pub async fn exchange_for_headers(
        &self,
        method_name: &str,
        arguments: Vec<Argument>,
    ) -> Result<HeaderMap, HttpServiceError> {
        self.check_return(method_name, |rt| rt == ReturnType::Headers, "headers")?;
        match self.invoke(method_name, arguments).await? {
            InvocationResult::Headers(headers) => Ok(headers),
            _ => Err(self.mismatch(method_name, "headers")),
        }
    }

    /// Call a method declared with [`ReturnType::Body`]; `None` for an empty
    /// body.
    pub async fn exchange_for_body<T: DeserializeOwned>(
        &self,
        method_name: &str,
        arguments: Vec<Argument>,
    ) -> Result<Option<T>, HttpServiceError> {
        self.check_return(method_name, |rt| matches!(rt, ReturnType::Body(_)), "a body")?;
        match self.invoke(method_name, arguments).await? {
            InvocationResult::Body(body) => body.map(ResponseBody::into_typed).transpose(),
            _ => Err(self.mismatch(method_name, "a body")),
        }
    }

    /// Call a method declared with [`ReturnType::Entity`].
    pub async fn exchange_for_entity<T: DeserializeOwned>(
        &self,
        method_name: &str,
        arguments: Vec<Argument>,
    ) -> Result<ResponseEntity<T>, HttpServiceError> {
        self.check_return(method_name, |rt| matches!(rt, ReturnType::Entity(_)), "an entity")?;
        match self.invoke(method_name, arguments).await? {
            InvocationResult::Entity(entity) => entity.try_map(ResponseBody::into_typed),
            _ => Err(self.mismatch(method_name, "an entity")),
        }
    }

    /// Call a method declared with [`ReturnType::BodilessEntity`].
    pub async fn exchange_for_bodiless_entity(
        &self,
        method_name: &str,
        arguments: Vec<Argument>,
    ) -> Result<ResponseEntity<()>, HttpServiceError> {
        self.check_return(method_name, |rt| rt == ReturnType::BodilessEntity, "a bodiless entity")?;
        match self.invoke(method_name, arguments).await? {
            InvocationResult::BodilessEntity(entity) => Ok(entity),
            _ => Err(self.mismatch(method_name, "a bodiless entity")),
        }
    }
}

impl fmt::Debug for ServiceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceProxy")
            .field("service", &self.inner.service_name)
            .field("methods", &self.method_names())
            .finish()
    }
}
