//! Ordered multipart part set.

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::HttpServiceError;
use crate::types::{Argument, MultipartFile};

/// One named part: a value plus headers specific to the part.
#[derive(Debug)]
pub struct Part {
    name: String,
    headers: HeaderMap,
    content: Argument,
}

impl Part {
    fn new(name: String, content: Argument) -> Self {
        Self {
            name,
            headers: HeaderMap::new(),
            content,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn content(&self) -> &Argument {
        &self.content
    }

    pub fn into_parts(self) -> (String, HeaderMap, Argument) {
        (self.name, self.headers, self.content)
    }

    /// Add a part header; an existing value with the same name is replaced.
    pub fn header(&mut self, name: &str, value: &str) -> Result<&mut Self, HttpServiceError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        self.headers.insert(name, HeaderValue::from_str(value)?);
        Ok(self)
    }

    pub fn content_type(&mut self, media_type: &str) -> Result<&mut Self, HttpServiceError> {
        self.header(CONTENT_TYPE.as_str(), media_type)
    }

    /// Set `Content-Disposition` with both the part name and a file name.
    pub fn filename(&mut self, filename: &str) -> Result<&mut Self, HttpServiceError> {
        let disposition = content_disposition(&self.name, Some(filename));
        self.header(CONTENT_DISPOSITION.as_str(), &disposition)
    }
}

/// `form-data; name="..."[; filename="..."]`
pub fn content_disposition(name: &str, filename: Option<&str>) -> String {
    match filename {
        Some(filename) => format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            escape_quoted(name),
            escape_quoted(filename)
        ),
        None => format!("form-data; name=\"{}\"", escape_quoted(name)),
    }
}

fn escape_quoted(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Accumulates parts in insertion order.
#[derive(Debug, Default)]
pub struct MultipartBodyBuilder {
    parts: Vec<Part>,
}

impl MultipartBodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a part and return it for further header configuration.
    ///
    /// Entities contribute their headers to the part. Files become resources
    /// carrying the file's media type and original file name. Publishers stay
    /// deferred, with file elements mapped to resources as they are produced.
    pub fn part(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Argument>,
    ) -> Result<&mut Part, HttpServiceError> {
        let name = name.into();
        let mut part = match value.into() {
            Argument::Entity(entity) => {
                let (body, headers) = entity.into_parts();
                let mut part = Part::new(name, normalize(body)?);
                part.headers = headers;
                part
            }
            Argument::File(file) => file_part(name, file)?,
            Argument::Publisher(publisher) => {
                Part::new(name, Argument::Publisher(publisher.map(file_to_resource)))
            }
            other => Part::new(name, other),
        };
        let filename = match &part.content {
            Argument::Resource(resource) if !part.headers.contains_key(CONTENT_DISPOSITION) => {
                resource.filename().map(str::to_string)
            }
            _ => None,
        };
        if let Some(filename) = filename {
            part.filename(&filename)?;
        }
        self.parts.push(part);
        let index = self.parts.len() - 1;
        Ok(&mut self.parts[index])
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn build(self) -> Vec<Part> {
        self.parts
    }
}

fn normalize(value: Argument) -> Result<Argument, HttpServiceError> {
    Ok(match value {
        Argument::File(file) => Argument::Resource(file.into_resource()),
        Argument::Publisher(publisher) => Argument::Publisher(publisher.map(file_to_resource)),
        Argument::Entity(_) => {
            return Err(HttpServiceError::InvalidArgument(
                "Nested entity is not a valid part value".to_string(),
            ));
        }
        other => other,
    })
}

fn file_part(name: String, file: MultipartFile) -> Result<Part, HttpServiceError> {
    let content_type = file.content_type().map(str::to_string);
    let filename = file.original_filename().map(str::to_string);
    let mut part = Part::new(name, Argument::Resource(file.into_resource()));
    if let Some(content_type) = content_type {
        part.content_type(&content_type)?;
    }
    if let Some(filename) = filename {
        part.filename(&filename)?;
    }
    Ok(part)
}

fn file_to_resource(argument: Argument) -> Argument {
    match argument {
        Argument::File(file) => Argument::Resource(file.into_resource()),
        other => other,
    }
}
