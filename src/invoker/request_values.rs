//! Request model: the complete description of one outgoing call.

use std::collections::HashMap;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};

use crate::defaults::media_types;
use crate::error::HttpServiceError;
use crate::invoker::multipart::{MultipartBodyBuilder, Part};
use crate::types::Argument;
use crate::utils::mime;

/// Prefix of the template variables generated for query parameters.
const QUERY_PARAM_VARIABLE: &str = "__qp";

/// Body of a request.
#[derive(Debug, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// A value to encode; publishers are awaited by the adapter.
    Value(Argument),
    /// `application/x-www-form-urlencoded` fields.
    Form(Vec<(String, String)>),
    /// Ordered multipart parts.
    Multipart(Vec<Part>),
}

impl RequestBody {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Method, target, headers, cookies, attributes, and body of one call.
#[derive(Debug)]
pub struct HttpRequestValues {
    http_method: Method,
    uri: Option<Url>,
    uri_template: Option<String>,
    uri_variables: HashMap<String, String>,
    headers: HeaderMap,
    cookies: Vec<(String, String)>,
    attributes: HashMap<String, serde_json::Value>,
    body: RequestBody,
}

impl HttpRequestValues {
    pub fn builder() -> HttpRequestValuesBuilder {
        HttpRequestValuesBuilder::default()
    }

    pub fn http_method(&self) -> &Method {
        &self.http_method
    }

    /// Absolute target; when set the template is ignored.
    pub fn uri(&self) -> Option<&Url> {
        self.uri.as_ref()
    }

    pub fn uri_template(&self) -> Option<&str> {
        self.uri_template.as_deref()
    }

    pub fn uri_variables(&self) -> &HashMap<String, String> {
        &self.uri_variables
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Cookies in insertion order; a name may repeat.
    pub fn cookies(&self) -> &[(String, String)] {
        &self.cookies
    }

    pub fn attributes(&self) -> &HashMap<String, serde_json::Value> {
        &self.attributes
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn into_body(self) -> RequestBody {
        self.body
    }

    /// Split into the body and everything else, so the body can be encoded
    /// while the rest is still readable.
    pub fn take_body(&mut self) -> RequestBody {
        std::mem::take(&mut self.body)
    }
}

/// Mutable builder populated by argument resolvers.
#[derive(Debug, Default)]
pub struct HttpRequestValuesBuilder {
    http_method: Option<Method>,
    uri: Option<Url>,
    uri_template: Option<String>,
    uri_variables: HashMap<String, String>,
    headers: HeaderMap,
    cookies: Vec<(String, String)>,
    attributes: HashMap<String, serde_json::Value>,
    request_params: Vec<(String, String)>,
    parts: Option<MultipartBodyBuilder>,
    body_value: Option<Argument>,
}

impl HttpRequestValuesBuilder {
    pub fn set_http_method(&mut self, method: Method) -> &mut Self {
        self.http_method = Some(method);
        self
    }

    pub fn http_method(&self) -> Option<&Method> {
        self.http_method.as_ref()
    }

    /// Use an absolute URI, replacing any template and its variables.
    pub fn set_uri(&mut self, uri: Url) -> &mut Self {
        self.uri = Some(uri);
        self.uri_template = None;
        self.uri_variables.clear();
        self
    }

    /// Use a template, replacing any absolute URI.
    pub fn set_uri_template(&mut self, template: impl Into<String>) -> &mut Self {
        self.uri_template = Some(template.into());
        self.uri = None;
        self
    }

    pub fn set_uri_variable(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.uri_variables.insert(name.into(), value.into());
        self
    }

    pub fn set_accept(&mut self, media_types: &[String]) -> Result<&mut Self, HttpServiceError> {
        if media_types.is_empty() {
            self.headers.remove(ACCEPT);
        } else {
            self.headers
                .insert(ACCEPT, HeaderValue::from_str(&media_types.join(", "))?);
        }
        Ok(self)
    }

    pub fn set_content_type(&mut self, media_type: &str) -> Result<&mut Self, HttpServiceError> {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_str(media_type)?);
        Ok(self)
    }

    /// Append values under a header name, after any existing ones.
    pub fn add_header<I, V>(&mut self, name: &str, values: I) -> Result<&mut Self, HttpServiceError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<str>,
    {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        for value in values {
            self.headers
                .append(name.clone(), HeaderValue::from_str(value.as_ref())?);
        }
        Ok(self)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn add_cookie<I, V>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.cookies.push((name.to_string(), value.into()));
        }
        self
    }

    pub fn add_attribute(&mut self, name: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Query parameters, or form fields when the content type is form data.
    pub fn add_request_parameter<I, V>(&mut self, name: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.request_params.push((name.to_string(), value.into()));
        }
        self
    }

    /// Add a multipart part; fails when a body value is already set.
    pub fn add_request_part(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Argument>,
    ) -> Result<&mut Part, HttpServiceError> {
        if self.body_value.is_some() {
            return Err(HttpServiceError::BodyConflict(
                "Expected body or request parts, not both".to_string(),
            ));
        }
        self.parts
            .get_or_insert_with(MultipartBodyBuilder::new)
            .part(name, value)
    }

    /// Set the body; fails when parts were already added.
    pub fn set_body_value(&mut self, value: impl Into<Argument>) -> Result<&mut Self, HttpServiceError> {
        if self.parts.as_ref().is_some_and(|p| !p.is_empty()) {
            return Err(HttpServiceError::BodyConflict(
                "Expected body or request parts, not both".to_string(),
            ));
        }
        self.body_value = Some(value.into());
        Ok(self)
    }

    pub fn has_body(&self) -> bool {
        self.body_value.is_some()
    }

    fn has_form_content_type(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| mime::same_essence(ct, media_types::APPLICATION_FORM_URLENCODED))
    }

    pub fn build(self) -> Result<HttpRequestValues, HttpServiceError> {
        let form_data = self.has_form_content_type();
        let Self {
            http_method,
            mut uri,
            mut uri_template,
            mut uri_variables,
            headers,
            cookies,
            attributes,
            request_params,
            parts,
            body_value,
        } = self;

        let http_method =
            http_method.ok_or_else(|| HttpServiceError::config("HTTP method is required"))?;

        let mut body = match (body_value, parts) {
            (Some(_), Some(parts)) if !parts.is_empty() => {
                return Err(HttpServiceError::BodyConflict(
                    "Expected body or request parts, not both".to_string(),
                ));
            }
            (_, Some(parts)) if !parts.is_empty() => RequestBody::Multipart(parts.build()),
            (Some(value), _) => RequestBody::Value(value),
            _ => RequestBody::Empty,
        };

        if !request_params.is_empty() {
            if form_data {
                if !body.is_empty() {
                    return Err(HttpServiceError::BodyConflict(
                        "Form data parameters conflict with the request body".to_string(),
                    ));
                }
                body = RequestBody::Form(request_params);
            } else if let Some(uri) = uri.as_mut() {
                let mut pairs = uri.query_pairs_mut();
                for (name, value) in &request_params {
                    pairs.append_pair(name, value);
                }
            } else {
                let template = uri_template.get_or_insert_with(String::new);
                append_query_params(template, &mut uri_variables, &request_params);
            }
        }

        Ok(HttpRequestValues {
            http_method,
            uri,
            uri_template,
            uri_variables,
            headers,
            cookies,
            attributes,
            body,
        })
    }
}

/// Extend a template with `name={__qpN}` pairs; values are encoded at
/// expansion time like any other variable. Names already used by the
/// template or its variables are skipped.
fn append_query_params(
    template: &mut String,
    variables: &mut HashMap<String, String>,
    params: &[(String, String)],
) {
    let taken = |name: &str, template: &str, variables: &HashMap<String, String>| {
        variables.contains_key(name) || template.contains(name)
    };
    let mut separator = if template.contains('?') { '&' } else { '?' };
    let mut next = 0usize;
    for (name, value) in params {
        let variable = loop {
            let candidate = format!("{QUERY_PARAM_VARIABLE}{next}");
            next += 1;
            if !taken(&candidate, template, variables) {
                break candidate;
            }
        };
        template.push(separator);
        template.push_str(&urlencoding::encode(name));
        template.push_str("={");
        template.push_str(&variable);
        template.push('}');
        variables.insert(variable, value.clone());
        separator = '&';
    }
}
