//! Type-erased handle for an [`HttpService`] implementation.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::HttpServiceError;
use crate::invoker::metadata::ServiceDescriptor;
use crate::invoker::proxy::HttpService;
use crate::invoker::proxy_factory::HttpServiceProxyFactory;

/// A proxy created for some service type, ready to be downcast.
pub type ErasedProxy = Arc<dyn Any + Send + Sync>;

type CreateFn = fn(&HttpServiceProxyFactory) -> Result<ErasedProxy, HttpServiceError>;

/// Identity, metadata, and constructor of one service type.
///
/// Equality and hashing use the `TypeId` only.
#[derive(Clone, Copy)]
pub struct ServiceType {
    type_id: TypeId,
    name: &'static str,
    descriptor: fn() -> ServiceDescriptor,
    create: CreateFn,
}

impl ServiceType {
    pub fn of<S: HttpService>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
            descriptor: S::descriptor,
            create: create_erased::<S>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified type name, e.g. `app::clients::GreetingService`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn simple_name(&self) -> &'static str {
        let path = self.path();
        path.rsplit_once("::").map_or(path, |(_, name)| name)
    }

    /// Module path of the type, e.g. `app::clients`.
    pub fn module_path(&self) -> &'static str {
        self.path().rsplit_once("::").map_or("", |(module, _)| module)
    }

    /// Whether the type lives in `package` or one of its submodules. An empty
    /// package matches every type.
    pub fn is_in_package(&self, package: &str) -> bool {
        let module = self.module_path();
        package.is_empty()
            || module == package
            || module
                .strip_prefix(package)
                .is_some_and(|rest| rest.starts_with("::"))
    }

    pub fn descriptor(&self) -> ServiceDescriptor {
        (self.descriptor)()
    }

    /// Whether at least one method declares an HTTP exchange.
    pub fn has_exchange_methods(&self) -> bool {
        self.descriptor().has_exchange_methods()
    }

    pub(crate) fn create(
        &self,
        factory: &HttpServiceProxyFactory,
    ) -> Result<ErasedProxy, HttpServiceError> {
        (self.create)(factory)
    }

    // Generic arguments are dropped so `a::Svc<b::T>` yields `a` and `Svc`.
    fn path(&self) -> &'static str {
        self.name.split('<').next().unwrap_or(self.name)
    }
}

fn create_erased<S: HttpService>(
    factory: &HttpServiceProxyFactory,
) -> Result<ErasedProxy, HttpServiceError> {
    Ok(Arc::new(factory.create_client::<S>()?))
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceType").field(&self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoker::metadata::{MethodDescriptor, ReturnType};
    use crate::invoker::proxy::ServiceProxy;
    use crate::types::BodyType;

    struct Greeting(#[allow(dead_code)] ServiceProxy);

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

    struct Plain;

    impl HttpService for Plain {
        fn descriptor() -> ServiceDescriptor {
            ServiceDescriptor::new().method(MethodDescriptor::new("helper"))
        }

        fn from_proxy(_proxy: ServiceProxy) -> Self {
            Self
        }
    }

    #[test]
    fn names_and_packages() {
        let service_type = ServiceType::of::<Greeting>();
        assert_eq!(service_type.simple_name(), "Greeting");
        assert!(service_type.module_path().ends_with("registry::service_type::tests"));
        assert!(service_type.is_in_package("siumai_exchange::registry"));
        assert!(!service_type.is_in_package("siumai_exchange::reg"));
        assert!(service_type.is_in_package(""));
    }

    #[test]
    fn equality_by_type() {
        assert_eq!(ServiceType::of::<Greeting>(), ServiceType::of::<Greeting>());
        assert_ne!(ServiceType::of::<Greeting>(), ServiceType::of::<Plain>());
    }

    #[test]
    fn exchange_methods_detected() {
        assert!(ServiceType::of::<Greeting>().has_exchange_methods());
        assert!(!ServiceType::of::<Plain>().has_exchange_methods());
    }
}
