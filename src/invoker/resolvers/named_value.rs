//! Shared algorithm for header, param, path, cookie, attribute, and part
//! bindings.

use std::sync::Arc;

use crate::error::HttpServiceError;
use crate::invoker::metadata::{MethodParameter, NamedValueSpec, ParamType};
use crate::invoker::request_values::HttpRequestValuesBuilder;
use crate::types::Argument;

use super::{ArgumentBinder, HttpServiceArgumentResolver};

/// How one parameter binds to a named request value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedValueInfo {
    /// Empty until resolved from the parameter name.
    pub name: String,
    pub required: bool,
    pub default_value: Option<String>,
    /// Label for error messages, e.g. "request header".
    pub label: &'static str,
    /// Whether several values become repeated entries under the same name;
    /// otherwise they are collapsed into one value.
    pub multiple_values: bool,
}

impl NamedValueInfo {
    pub fn new(
        name: impl Into<String>,
        required: bool,
        default_value: Option<String>,
        label: &'static str,
        multiple_values: bool,
    ) -> Self {
        Self {
            name: name.into(),
            required,
            default_value,
            label,
            multiple_values,
        }
    }

    /// Info from a binding's attributes.
    pub fn from_spec(spec: &NamedValueSpec, label: &'static str, multiple_values: bool) -> Self {
        Self::new(
            spec.name.clone(),
            spec.required,
            spec.default_value.clone(),
            label,
            multiple_values,
        )
    }

    fn resolve_name(mut self, parameter: &MethodParameter) -> Result<Self, HttpServiceError> {
        if self.name.is_empty() {
            self.name = parameter.name().map(str::to_string).ok_or_else(|| {
                HttpServiceError::config(format!(
                    "Name for {} parameter {} not specified, and parameter name information \
                     is not available",
                    self.label,
                    parameter.describe()
                ))
            })?;
        }
        Ok(self)
    }
}

/// A resolver for one kind of named value.
///
/// Implementations only describe the binding and add single values; the
/// default handling, required check, and multi-value expansion live in
/// [`NamedValueResolver`].
pub trait NamedValueArgumentResolver: Send + Sync + 'static {
    /// Binding info for the parameter, or `None` when not applicable.
    fn create_named_value_info(&self, parameter: &MethodParameter) -> Option<NamedValueInfo>;

    /// Add one non-null value under `name`.
    fn add_request_value(
        &self,
        name: &str,
        value: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError>;

    /// Collapse several values for bindings that take a single value.
    fn collapse(&self, items: Vec<Argument>) -> Result<Argument, HttpServiceError> {
        let joined = items
            .iter()
            .map(Argument::to_value_string)
            .collect::<Result<Vec<_>, _>>()?
            .join(",");
        Ok(Argument::Text(joined))
    }
}

/// Adapts a [`NamedValueArgumentResolver`] into the resolver chain.
pub struct NamedValueResolver<R> {
    inner: Arc<R>,
}

impl<R: NamedValueArgumentResolver> NamedValueResolver<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            inner: Arc::new(resolver),
        }
    }
}

impl<R: NamedValueArgumentResolver> HttpServiceArgumentResolver for NamedValueResolver<R> {
    fn bind(
        &self,
        parameter: &MethodParameter,
    ) -> Result<Option<Arc<dyn ArgumentBinder>>, HttpServiceError> {
        let Some(info) = self.inner.create_named_value_info(parameter) else {
            return Ok(None);
        };
        // Map arguments carry their own names.
        let map_argument = parameter.param_type() == &ParamType::Map;
        let info = if map_argument {
            info
        } else {
            info.resolve_name(parameter)?
        };
        Ok(Some(Arc::new(NamedValueBinder {
            resolver: Arc::clone(&self.inner),
            info,
            map_argument,
        })))
    }
}

struct NamedValueBinder<R> {
    resolver: Arc<R>,
    info: NamedValueInfo,
    map_argument: bool,
}

impl<R: NamedValueArgumentResolver> NamedValueBinder<R> {
    fn add_single_or_multiple(
        &self,
        name: &str,
        value: Argument,
        required: bool,
        default_value: Option<&str>,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        let items = match value {
            Argument::List(items) => items,
            Argument::Json(serde_json::Value::Array(items)) => {
                items.into_iter().map(Argument::Json).collect()
            }
            single => return self.add_single(name, single, required, default_value, values),
        };
        let items: Vec<Argument> = items.into_iter().filter(|item| !item.is_null()).collect();
        if items.is_empty() {
            return self.add_single(name, Argument::Null, required, default_value, values);
        }
        if self.info.multiple_values {
            for item in items {
                self.add_single(name, item, false, None, values)?;
            }
            Ok(())
        } else {
            let collapsed = self.resolver.collapse(items)?;
            self.add_single(name, collapsed, required, default_value, values)
        }
    }

    fn add_single(
        &self,
        name: &str,
        value: Argument,
        required: bool,
        default_value: Option<&str>,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        let value = match default_value {
            Some(default) if value.is_null() => Argument::Text(default.to_string()),
            _ => value,
        };
        if value.is_null() {
            if required {
                return Err(HttpServiceError::missing_value(self.info.label, name));
            }
            return Ok(());
        }
        tracing::trace!(
            target: "siumai_exchange::invoker",
            label = self.info.label,
            name,
            kind = value.kind(),
            "adding request value"
        );
        self.resolver.add_request_value(name, value, values)
    }
}

impl<R: NamedValueArgumentResolver> ArgumentBinder for NamedValueBinder<R> {
    fn contribute(
        &self,
        argument: Argument,
        values: &mut HttpRequestValuesBuilder,
    ) -> Result<(), HttpServiceError> {
        if !self.map_argument {
            return self.add_single_or_multiple(
                &self.info.name,
                argument,
                self.info.required,
                self.info.default_value.as_deref(),
                values,
            );
        }
        match argument {
            Argument::Null => Ok(()),
            Argument::Map(entries) => {
                for (name, value) in entries {
                    self.add_single_or_multiple(&name, value, false, None, values)?;
                }
                Ok(())
            }
            Argument::Json(serde_json::Value::Object(entries)) => {
                for (name, value) in entries {
                    self.add_single_or_multiple(&name, Argument::Json(value), false, None, values)?;
                }
                Ok(())
            }
            other => Err(HttpServiceError::InvalidArgument(format!(
                "Expected a map for {} parameter, got {}",
                self.info.label,
                other.kind()
            ))),
        }
    }
}
