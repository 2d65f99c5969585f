//! File-like values accepted as multipart parts.

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::error::HttpServiceError;
use crate::types::Argument;

/// Raw content with an optional file name, e.g. a file read from disk.
///
/// This is what file-like wrappers are normalised to before encoding: the
/// encoder only needs bytes plus a name to derive `Content-Disposition` and a
/// media type from.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    content: Bytes,
    filename: Option<String>,
}

impl Resource {
    pub fn new(content: impl Into<Bytes>, filename: Option<String>) -> Self {
        Self {
            content: content.into(),
            filename,
        }
    }

    pub fn from_bytes(content: impl Into<Bytes>) -> Self {
        Self::new(content, None)
    }

    /// Read a file into memory, using its file name as the resource name.
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, HttpServiceError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await.map_err(|e| {
            HttpServiceError::InvalidArgument(format!(
                "Failed to read resource '{}': {e}",
                path.display()
            ))
        })?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.to_string());
        Ok(Self::new(content, filename))
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Media type guessed from content, then from the file name.
    pub fn guess_content_type(&self) -> String {
        crate::utils::mime::guess_mime(Some(&self.content), self.filename.as_deref())
    }
}

/// An uploaded file as received from a form, with the client-side name and
/// declared media type.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartFile {
    name: String,
    original_filename: Option<String>,
    content_type: Option<String>,
    content: Bytes,
}

impl MultipartFile {
    pub fn new(
        name: impl Into<String>,
        original_filename: Option<String>,
        content_type: Option<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            original_filename,
            content_type,
            content: content.into(),
        }
    }

    /// Form field name the file was received under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original_filename(&self) -> Option<&str> {
        self.original_filename.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Underlying resource, named after the original file name.
    pub fn resource(&self) -> Resource {
        Resource::new(self.content.clone(), self.original_filename.clone())
    }

    pub fn into_resource(self) -> Resource {
        Resource::new(self.content, self.original_filename)
    }
}

/// A value plus explicit headers, used for multipart parts that need their
/// own `Content-Type` or `Content-Disposition`.
#[derive(Debug)]
pub struct HttpEntity {
    body: Box<Argument>,
    headers: HeaderMap,
}

impl HttpEntity {
    pub fn new(body: impl Into<Argument>) -> Self {
        Self {
            body: Box::new(body.into()),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_headers(body: impl Into<Argument>, headers: HeaderMap) -> Self {
        Self {
            body: Box::new(body.into()),
            headers,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Result<Self, HttpServiceError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        self.headers.append(name, HeaderValue::from_str(value)?);
        Ok(self)
    }

    pub fn content_type(self, media_type: &str) -> Result<Self, HttpServiceError> {
        self.header(CONTENT_TYPE.as_str(), media_type)
    }

    pub fn body(&self) -> &Argument {
        &self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn into_parts(self) -> (Argument, HeaderMap) {
        (*self.body, self.headers)
    }
}
