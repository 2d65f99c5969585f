//! Runtime argument values passed to service proxy methods.

use std::fmt;
use std::future::Future;

use bytes::Bytes;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use reqwest::{Method, Url};
use serde::Serialize;

use crate::error::HttpServiceError;
use crate::types::{HttpEntity, MultipartFile, Resource};

/// Actual value of one method argument.
#[derive(Debug)]
pub enum Argument {
    /// Absent value (`None` in the calling code).
    Null,
    Text(String),
    /// A value to be encoded, or a scalar JSON value used as a named value.
    Json(serde_json::Value),
    Bytes(Bytes),
    /// Multiple values, expanded into repeated entries where supported.
    List(Vec<Argument>),
    /// Ordered name/value pairs; a name may repeat.
    Map(Vec<(String, Argument)>),
    Uri(Url),
    Method(Method),
    File(MultipartFile),
    Resource(Resource),
    Entity(HttpEntity),
    Publisher(Publisher),
}

impl Argument {
    /// Serialize any value into a JSON argument.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, HttpServiceError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Build a map argument from string pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Argument>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Json(serde_json::Value::Null))
    }

    /// Short name of the variant, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Json(_) => "json",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Uri(_) => "uri",
            Self::Method(_) => "http method",
            Self::File(_) => "multipart file",
            Self::Resource(_) => "resource",
            Self::Entity(_) => "entity",
            Self::Publisher(_) => "publisher",
        }
    }

    /// Convert a scalar argument into its string form for headers, query
    /// parameters, path variables, and cookies.
    pub fn to_value_string(&self) -> Result<String, HttpServiceError> {
        match self {
            Self::Text(s) => Ok(s.clone()),
            Self::Json(serde_json::Value::String(s)) => Ok(s.clone()),
            Self::Json(serde_json::Value::Number(n)) => Ok(n.to_string()),
            Self::Json(serde_json::Value::Bool(b)) => Ok(b.to_string()),
            Self::Uri(url) => Ok(url.to_string()),
            Self::Method(method) => Ok(method.as_str().to_string()),
            Self::Bytes(bytes) => String::from_utf8(bytes.to_vec()).map_err(|e| {
                HttpServiceError::InvalidArgument(format!("Bytes are not valid UTF-8: {e}"))
            }),
            other => Err(HttpServiceError::InvalidArgument(format!(
                "Cannot convert {} argument to a string value",
                other.kind()
            ))),
        }
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for Argument {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

macro_rules! json_scalar_argument {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Argument {
                fn from(value: $ty) -> Self {
                    Self::Json(serde_json::Value::from(value))
                }
            }
        )*
    };
}

json_scalar_argument!(bool, i32, i64, u16, u32, u64, f64);

impl From<serde_json::Value> for Argument {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Bytes> for Argument {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

impl From<Url> for Argument {
    fn from(value: Url) -> Self {
        Self::Uri(value)
    }
}

impl From<Method> for Argument {
    fn from(value: Method) -> Self {
        Self::Method(value)
    }
}

impl From<MultipartFile> for Argument {
    fn from(value: MultipartFile) -> Self {
        Self::File(value)
    }
}

impl From<Resource> for Argument {
    fn from(value: Resource) -> Self {
        Self::Resource(value)
    }
}

impl From<HttpEntity> for Argument {
    fn from(value: HttpEntity) -> Self {
        Self::Entity(value)
    }
}

impl From<Publisher> for Argument {
    fn from(value: Publisher) -> Self {
        Self::Publisher(value)
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Null)
    }
}

impl<T: Into<Argument>> From<Vec<T>> for Argument {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Asynchronous producer of argument values.
pub enum Publisher {
    /// Produces exactly one value.
    Single(BoxFuture<'static, Result<Argument, HttpServiceError>>),
    /// Produces any number of values.
    Multi(BoxStream<'static, Result<Argument, HttpServiceError>>),
}

impl Publisher {
    pub fn single<F, T>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: Into<Argument>,
    {
        Self::Single(
            future
                .map(|value| Ok::<Argument, HttpServiceError>(value.into()))
                .boxed(),
        )
    }

    pub fn try_single<F>(future: F) -> Self
    where
        F: Future<Output = Result<Argument, HttpServiceError>> + Send + 'static,
    {
        Self::Single(future.boxed())
    }

    pub fn multi<S, T>(stream: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
        T: Into<Argument>,
    {
        Self::Multi(
            stream
                .map(|value| Ok::<Argument, HttpServiceError>(value.into()))
                .boxed(),
        )
    }

    pub fn try_multi<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Argument, HttpServiceError>> + Send + 'static,
    {
        Self::Multi(stream.boxed())
    }

    pub fn is_multi_value(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    /// Transform every produced element.
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Argument) -> Argument + Send + Sync + 'static,
    {
        match self {
            Self::Single(future) => Self::Single(future.map(move |r| r.map(&f)).boxed()),
            Self::Multi(stream) => Self::Multi(stream.map_ok(f).boxed()),
        }
    }

    /// Await every produced element in order.
    pub async fn collect(self) -> Result<Vec<Argument>, HttpServiceError> {
        match self {
            Self::Single(future) => Ok(vec![future.await?]),
            Self::Multi(stream) => stream.try_collect().await,
        }
    }
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(_) => f.write_str("Publisher::Single(..)"),
            Self::Multi(_) => f.write_str("Publisher::Multi(..)"),
        }
    }
}
