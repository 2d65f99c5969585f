//! The built registry: every group's proxies, queryable by type and group.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::HttpServiceError;
use crate::invoker::proxy::HttpService;
use crate::registry::builder::HttpServiceProxyRegistryBuilder;
use crate::registry::proxy_group::HttpServiceProxyGroup;

/// Immutable registry of service proxies, grouped by client configuration.
#[derive(Debug, Clone, Default)]
pub struct HttpServiceProxyRegistry {
    groups: Vec<HttpServiceProxyGroup>,
    /// Service type to the indexes of the groups registering it.
    by_type: HashMap<TypeId, Vec<usize>>,
}

impl HttpServiceProxyRegistry {
    pub fn builder() -> HttpServiceProxyRegistryBuilder {
        HttpServiceProxyRegistryBuilder::new()
    }

    pub(crate) fn new(groups: Vec<HttpServiceProxyGroup>) -> Self {
        let mut by_type: HashMap<TypeId, Vec<usize>> = HashMap::new();
        for (index, group) in groups.iter().enumerate() {
            for type_id in group.proxies().keys() {
                by_type.entry(*type_id).or_default().push(index);
            }
        }
        Self { groups, by_type }
    }

    /// The proxy for `S` across all groups.
    ///
    /// Returns `Ok(None)` when no group registers `S`, and
    /// [`HttpServiceError::AmbiguousClient`] when more than one does.
    pub fn get_client<S: HttpService>(&self) -> Result<Option<Arc<S>>, HttpServiceError> {
        let indexes = self
            .by_type
            .get(&TypeId::of::<S>())
            .map(Vec::as_slice)
            .unwrap_or_default();
        match indexes {
            [] => Ok(None),
            [index] => Ok(self.groups[*index].get::<S>()),
            indexes => Err(HttpServiceError::AmbiguousClient {
                service_type: std::any::type_name::<S>().to_string(),
                groups: indexes
                    .iter()
                    .map(|i| self.groups[*i].name().to_string())
                    .collect(),
            }),
        }
    }

    /// The proxy for `S` in the named group only.
    pub fn get_client_in_group<S: HttpService>(&self, group_name: &str) -> Option<Arc<S>> {
        self.proxy_group(group_name).and_then(HttpServiceProxyGroup::get::<S>)
    }

    /// Groups in registration order.
    pub fn proxy_groups(&self) -> &[HttpServiceProxyGroup] {
        &self.groups
    }

    pub fn proxy_group(&self, name: &str) -> Option<&HttpServiceProxyGroup> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(HttpServiceProxyGroup::name).collect()
    }
}
