//! URI template expansion against a base URL.

use std::collections::HashMap;

use regex::{Captures, Regex};
use reqwest::Url;

use crate::error::HttpServiceError;

/// Expands `{name}` templates and resolves relative results against a base
/// URL. Variable values are percent-encoded.
#[derive(Debug, Clone)]
pub struct UriBuilderFactory {
    base_url: Option<String>,
    placeholder: Regex,
}

impl UriBuilderFactory {
    pub fn new(base_url: Option<&str>) -> Result<Self, HttpServiceError> {
        if let Some(base_url) = base_url {
            Url::parse(base_url).map_err(|e| {
                HttpServiceError::config(format!("Invalid base URL '{base_url}': {e}"))
            })?;
        }
        let placeholder = Regex::new(r"\{([^{}]+)\}")
            .map_err(|e| HttpServiceError::config(format!("Invalid placeholder pattern: {e}")))?;
        Ok(Self {
            base_url: base_url.map(str::to_string),
            placeholder,
        })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Expand a template; every placeholder must have a value.
    pub fn expand(
        &self,
        template: &str,
        variables: &HashMap<String, String>,
    ) -> Result<Url, HttpServiceError> {
        let mut missing = None;
        let expanded = self.placeholder.replace_all(template, |caps: &Captures<'_>| {
            let name = caps[1].trim();
            match variables.get(name) {
                Some(value) => urlencoding::encode(value).into_owned(),
                None => {
                    missing.get_or_insert_with(|| name.to_string());
                    String::new()
                }
            }
        });
        if let Some(name) = missing {
            return Err(HttpServiceError::UriTemplateError(format!(
                "Not enough variable values available to expand '{name}' in '{template}'"
            )));
        }

        // `item:search` parses as a URL with scheme `item`; only a host makes
        // a template absolute.
        if let Ok(url) = Url::parse(&expanded)
            && url.has_host()
        {
            return Ok(url);
        }
        let Some(base_url) = &self.base_url else {
            return Err(HttpServiceError::UriTemplateError(format!(
                "URI '{expanded}' is not absolute and no base URL is configured"
            )));
        };
        let joined = if expanded.is_empty() {
            base_url.clone()
        } else if expanded.starts_with('?') {
            format!("{base_url}{expanded}")
        } else {
            format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                expanded.trim_start_matches('/')
            )
        };
        Url::parse(&joined).map_err(|e| {
            HttpServiceError::UriTemplateError(format!("Invalid URI '{joined}': {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn expands_against_base_url() {
        let factory = UriBuilderFactory::new(Some("http://localhost:8080/")).unwrap();
        let url = factory.expand("/greeting", &HashMap::new()).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/greeting");
    }

    #[test]
    fn keeps_base_path() {
        let factory = UriBuilderFactory::new(Some("http://localhost/api")).unwrap();
        let url = factory
            .expand("/users/{id}/posts/{post}", &vars(&[("id", "1"), ("post", "2")]))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/users/1/posts/2");
    }

    #[test]
    fn encodes_variable_values() {
        let factory = UriBuilderFactory::new(Some("http://localhost")).unwrap();
        let url = factory
            .expand("/search?q={q}", &vars(&[("q", "a b&c")]))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost/search?q=a%20b%26c");
    }

    #[test]
    fn unbound_variable_fails() {
        let factory = UriBuilderFactory::new(Some("http://localhost")).unwrap();
        let err = factory
            .expand("/a/{first}/{second}", &vars(&[("first", "1")]))
            .unwrap_err();
        assert!(matches!(err, HttpServiceError::UriTemplateError(ref m) if m.contains("second")));
    }

    #[test]
    fn absolute_template_ignores_base() {
        let factory = UriBuilderFactory::new(Some("http://localhost")).unwrap();
        let url = factory.expand("https://example.org/x", &HashMap::new()).unwrap();
        assert_eq!(url.as_str(), "https://example.org/x");
    }

    #[test]
    fn colon_in_relative_template_keeps_base() {
        let factory = UriBuilderFactory::new(Some("http://localhost/api")).unwrap();
        let url = factory.expand("item:search", &HashMap::new()).unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/item:search");

        let url = factory
            .expand("/models/{model}:generate", &vars(&[("model", "m1")]))
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/models/m1:generate");
    }

    #[test]
    fn relative_without_base_fails() {
        let factory = UriBuilderFactory::new(None).unwrap();
        assert!(factory.expand("/x", &HashMap::new()).is_err());
    }

    #[test]
    fn invalid_base_url_is_configuration_error() {
        assert!(UriBuilderFactory::new(Some("not a url")).unwrap_err().is_configuration_error());
    }
}
