//! Request body encoding.
//!
//! Bodies are awaited (publishers) and encoded into memory before dispatch.
//! Plain values pick a default media type from their shape unless the request
//! declares one. Form fields and multipart parts are handed to the transport,
//! which writes their wire format.

use bytes::Bytes;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::Value;

use crate::client::transport::{FormPart, TransportBody};
use crate::defaults::media_types;
use crate::error::HttpServiceError;
use crate::invoker::multipart::Part;
use crate::invoker::request_values::RequestBody;
use crate::types::{Argument, Publisher};
use crate::utils::mime;

/// An encoded body and the `Content-Type` to send it with.
///
/// `content_type` is `None` for multipart bodies; the transport sets it
/// together with the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBody {
    pub content_type: Option<String>,
    pub body: TransportBody,
}

/// Encode a request body; `declared` is the request's `Content-Type`.
pub async fn encode_body(
    body: RequestBody,
    declared: Option<&str>,
) -> Result<Option<EncodedBody>, HttpServiceError> {
    match body {
        RequestBody::Empty => Ok(None),
        RequestBody::Value(argument) => encode_value(resolve(argument).await?, declared),
        RequestBody::Form(fields) => Ok(Some(form_body(fields, declared))),
        RequestBody::Multipart(parts) => Ok(Some(EncodedBody {
            content_type: None,
            body: TransportBody::Multipart(encode_parts(parts).await?),
        })),
    }
}

/// Await a publisher argument; several values become a list.
async fn resolve(argument: Argument) -> Result<Argument, HttpServiceError> {
    match argument {
        Argument::Publisher(Publisher::Single(future)) => future.await,
        Argument::Publisher(publisher) => Ok(Argument::List(publisher.collect().await?)),
        other => Ok(other),
    }
}

/// Encode one value, or `None` for a null value.
///
/// Maps and JSON objects declared as form content become form fields.
pub fn encode_value(
    argument: Argument,
    declared: Option<&str>,
) -> Result<Option<EncodedBody>, HttpServiceError> {
    let form = declared.is_some_and(|ct| {
        mime::same_essence(ct, media_types::APPLICATION_FORM_URLENCODED)
    });
    if form && matches!(argument, Argument::Map(_) | Argument::Json(Value::Object(_))) {
        let Value::Object(entries) = to_json(argument)? else {
            return Err(HttpServiceError::InvalidArgument(
                "Form body must be a map of fields".to_string(),
            ));
        };
        return Ok(Some(form_body(form_fields(&entries)?, declared)));
    }
    Ok(encode_bytes(argument, declared)?.map(|(content_type, bytes)| EncodedBody {
        content_type: Some(content_type),
        body: TransportBody::Bytes(bytes),
    }))
}

fn form_body(fields: Vec<(String, String)>, declared: Option<&str>) -> EncodedBody {
    EncodedBody {
        content_type: Some(
            declared
                .unwrap_or(media_types::APPLICATION_FORM_URLENCODED)
                .to_string(),
        ),
        body: TransportBody::Form(fields),
    }
}

/// Bytes of one value with the media type they were written as.
fn encode_bytes(
    argument: Argument,
    declared: Option<&str>,
) -> Result<Option<(String, Bytes)>, HttpServiceError> {
    let (bytes, default_type) = match argument {
        Argument::Null => return Ok(None),
        Argument::Text(text) => (Bytes::from(text), media_types::TEXT_PLAIN_UTF8.to_string()),
        Argument::Uri(url) => (Bytes::from(url.to_string()), media_types::TEXT_PLAIN_UTF8.to_string()),
        Argument::Method(method) => (
            Bytes::from(method.as_str().to_string()),
            media_types::TEXT_PLAIN_UTF8.to_string(),
        ),
        Argument::Bytes(bytes) => (bytes, media_types::APPLICATION_OCTET_STREAM.to_string()),
        Argument::Resource(resource) => {
            let content_type = resource.guess_content_type();
            (resource.content().clone(), content_type)
        }
        Argument::File(file) => {
            let content_type = file
                .content_type()
                .map(str::to_string)
                .unwrap_or_else(|| file.resource().guess_content_type());
            (file.content().clone(), content_type)
        }
        Argument::Entity(_) | Argument::Publisher(_) => {
            return Err(HttpServiceError::InvalidArgument(format!(
                "Cannot encode {} as a request body",
                argument.kind()
            )));
        }
        structured => (
            Bytes::from(serde_json::to_vec(&to_json(structured)?)?),
            media_types::APPLICATION_JSON.to_string(),
        ),
    };
    Ok(Some((declared.map(str::to_string).unwrap_or(default_type), bytes)))
}

/// JSON form of text, JSON, list, and map arguments.
fn to_json(argument: Argument) -> Result<Value, HttpServiceError> {
    match argument {
        Argument::Null => Ok(Value::Null),
        Argument::Text(text) => Ok(Value::String(text)),
        Argument::Json(value) => Ok(value),
        Argument::Uri(url) => Ok(Value::String(url.to_string())),
        Argument::Method(method) => Ok(Value::String(method.as_str().to_string())),
        Argument::List(items) => items
            .into_iter()
            .map(to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Argument::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| to_json(v).map(|v| (k, v)))
            .collect::<Result<serde_json::Map<_, _>, _>>()
            .map(Value::Object),
        other => Err(HttpServiceError::InvalidArgument(format!(
            "Cannot encode {} as JSON",
            other.kind()
        ))),
    }
}

fn form_fields(
    entries: &serde_json::Map<String, Value>,
) -> Result<Vec<(String, String)>, HttpServiceError> {
    let mut fields = Vec::new();
    for (name, value) in entries {
        let values = match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            single => vec![single],
        };
        for value in values {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    return Err(HttpServiceError::InvalidArgument(format!(
                        "Form field '{name}' must be a scalar, got {other}"
                    )));
                }
            };
            fields.push((name.clone(), text));
        }
    }
    Ok(fields)
}

/// Encode parts in order; multi-value publishers yield one part per element.
async fn encode_parts(parts: Vec<Part>) -> Result<Vec<FormPart>, HttpServiceError> {
    let mut resolved = Vec::with_capacity(parts.len());
    for part in parts {
        let (name, headers, content) = part.into_parts();
        match content {
            Argument::Publisher(publisher) => {
                for element in publisher.collect().await? {
                    resolved.push((name.clone(), headers.clone(), element));
                }
            }
            other => resolved.push((name, headers, other)),
        }
    }

    let mut encoded = Vec::with_capacity(resolved.len());
    for (name, mut headers, content) in resolved {
        let file_name = match &content {
            Argument::Resource(resource) => resource.filename().map(str::to_string),
            Argument::File(file) => file.original_filename().map(str::to_string),
            _ => None,
        }
        .or_else(|| {
            headers
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .and_then(disposition_filename)
        });
        let part_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let Some((content_type, bytes)) = encode_bytes(content, part_type.as_deref())? else {
            continue;
        };
        for written_by_transport in [CONTENT_DISPOSITION, CONTENT_TYPE, CONTENT_LENGTH] {
            headers.remove(written_by_transport);
        }
        encoded.push(FormPart {
            name,
            file_name,
            content_type,
            headers,
            bytes,
        });
    }
    Ok(encoded)
}

/// The unescaped `filename="..."` value of a `Content-Disposition`.
fn disposition_filename(disposition: &str) -> Option<String> {
    const KEY: &str = "filename=\"";
    let start = disposition.find(KEY)? + KEY.len();
    let mut name = String::new();
    let mut chars = disposition[start..].chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => name.extend(chars.next()),
            '"' => return Some(name),
            other => name.push(other),
        }
    }
    None
}
