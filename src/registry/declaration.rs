//! Declarative group definitions.
//!
//! A declaration names a group, its base URL, and either explicit service
//! types or base packages to discover them in. Explicit service types disable
//! discovery.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::HttpServiceError;
use crate::registry::discovery::{ServiceTypeDiscovery, ServiceTypeFilter};
use crate::registry::service_type::ServiceType;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceClientDeclaration {
    #[validate(url)]
    pub base_url: String,
    /// Group name; the base URL when absent.
    #[serde(default)]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[serde(default)]
    pub base_packages: Vec<String>,
    /// Full or simple type names.
    #[serde(default)]
    pub service_types: Vec<String>,
}

impl InterfaceClientDeclaration {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn base_package(mut self, package: impl Into<String>) -> Self {
        self.base_packages.push(package.into());
        self
    }

    pub fn service_type(mut self, name: impl Into<String>) -> Self {
        self.service_types.push(name.into());
        self
    }

    /// Parse and validate a JSON declaration.
    pub fn from_json(json: &str) -> Result<Self, HttpServiceError> {
        let declaration: Self = serde_json::from_str(json)?;
        declaration.check()?;
        Ok(declaration)
    }

    pub fn check(&self) -> Result<(), HttpServiceError> {
        self.validate().map_err(|e| {
            HttpServiceError::config(format!(
                "Invalid client declaration for '{}': {e}",
                self.base_url
            ))
        })
    }

    pub fn group_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.base_url)
    }

    /// Service types for the group: the explicit list if any, otherwise every
    /// filtered candidate of every base package.
    pub fn resolve_service_types(
        &self,
        discovery: &dyn ServiceTypeDiscovery,
        filter: &ServiceTypeFilter,
    ) -> Result<Vec<ServiceType>, HttpServiceError> {
        if !self.service_types.is_empty() {
            return self
                .service_types
                .iter()
                .map(|name| {
                    discovery.find(name).ok_or_else(|| {
                        HttpServiceError::config(format!("Unknown service type '{name}'"))
                    })
                })
                .collect();
        }
        let mut found = Vec::new();
        for package in &self.base_packages {
            for service_type in discovery.candidates(package) {
                if filter.matches(&service_type) && !found.contains(&service_type) {
                    found.push(service_type);
                }
            }
        }
        Ok(found)
    }
}
