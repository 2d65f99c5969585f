//! [`HttpExchangeAdapter`] over [`HttpClient`].

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue};
use reqwest::Url;

use crate::client::builder::HttpClient;
use crate::client::codec;
use crate::client::transport::{TransportRequest, TransportResponse};
use crate::error::HttpServiceError;
use crate::invoker::adapter::HttpExchangeAdapter;
use crate::invoker::request_values::HttpRequestValues;
use crate::types::{BodyType, ResponseBody, ResponseEntity};

/// Runs proxy requests through an [`HttpClient`].
///
/// Request headers replace client defaults with the same name; request
/// cookies replace default cookies with the same name. Request attributes are
/// accepted and traced but never sent.
#[derive(Debug, Clone)]
pub struct RestClientAdapter {
    client: HttpClient,
}

impl RestClientAdapter {
    pub fn create(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    fn resolve_url(&self, values: &HttpRequestValues) -> Result<Url, HttpServiceError> {
        if let Some(uri) = values.uri() {
            return Ok(uri.clone());
        }
        match values.uri_template() {
            Some(template) => self
                .client
                .uri_factory()
                .expand(template, values.uri_variables()),
            None => Err(HttpServiceError::config(
                "Neither full URL nor URI template",
            )),
        }
    }

    fn merge_headers(&self, values: &HttpRequestValues) -> HeaderMap {
        let mut headers = self.client.default_headers().clone();
        for name in values.headers().keys() {
            headers.remove(name);
        }
        for (name, value) in values.headers() {
            headers.append(name.clone(), value.clone());
        }
        headers
    }

    fn cookie_header(&self, values: &HttpRequestValues) -> Option<String> {
        let requested = values.cookies();
        let cookies: Vec<String> = self
            .client
            .default_cookies()
            .iter()
            .filter(|(name, _)| !requested.iter().any(|(n, _)| n == name))
            .chain(requested.iter())
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        (!cookies.is_empty()).then(|| cookies.join("; "))
    }

    async fn send(&self, mut values: HttpRequestValues) -> Result<TransportResponse, HttpServiceError> {
        let url = self.resolve_url(&values)?;
        let mut headers = self.merge_headers(&values);
        if let Some(cookies) = self.cookie_header(&values) {
            headers.append(COOKIE, HeaderValue::from_str(&cookies)?);
        }
        if !values.attributes().is_empty() {
            tracing::trace!(
                target: "siumai_exchange::http",
                attributes = ?values.attributes(),
                "request attributes"
            );
        }

        let declared = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = match codec::encode_body(values.take_body(), declared.as_deref()).await? {
            Some(encoded) => {
                match &encoded.content_type {
                    Some(content_type) => {
                        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type)?);
                    }
                    None => {
                        headers.remove(CONTENT_TYPE);
                    }
                }
                Some(encoded.body)
            }
            None => None,
        };

        self.client
            .execute(TransportRequest {
                method: values.http_method().clone(),
                url,
                headers,
                body,
            })
            .await
    }
}

fn decode(body_type: BodyType, response: TransportResponse) -> Result<Option<ResponseBody>, HttpServiceError> {
    if response.body.is_empty() {
        return Ok(None);
    }
    ResponseBody::decode(body_type, response.body).map(Some)
}

#[async_trait]
impl HttpExchangeAdapter for RestClientAdapter {
    fn supports_request_attributes(&self) -> bool {
        true
    }

    async fn exchange(&self, values: HttpRequestValues) -> Result<(), HttpServiceError> {
        self.send(values).await.map(|_| ())
    }

    async fn exchange_for_headers(
        &self,
        values: HttpRequestValues,
    ) -> Result<HeaderMap, HttpServiceError> {
        Ok(self.send(values).await?.headers)
    }

    async fn exchange_for_body(
        &self,
        values: HttpRequestValues,
        body_type: BodyType,
    ) -> Result<Option<ResponseBody>, HttpServiceError> {
        decode(body_type, self.send(values).await?)
    }

    async fn exchange_for_bodiless_entity(
        &self,
        values: HttpRequestValues,
    ) -> Result<ResponseEntity<()>, HttpServiceError> {
        let response = self.send(values).await?;
        Ok(ResponseEntity::new(response.status, response.headers, None))
    }

    async fn exchange_for_entity(
        &self,
        values: HttpRequestValues,
        body_type: BodyType,
    ) -> Result<ResponseEntity<ResponseBody>, HttpServiceError> {
        let response = self.send(values).await?;
        let status = response.status;
        let headers = response.headers.clone();
        Ok(ResponseEntity::new(status, headers, decode(body_type, response)?))
    }
}
