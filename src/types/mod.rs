//! Shared data types.

pub mod argument;
pub mod entity;
pub mod http;
pub mod multipart;

pub use argument::{Argument, Publisher};
pub use entity::{BodyType, ResponseBody, ResponseEntity};
pub use http::{HttpConfig, HttpConfigBuilder};
pub use multipart::{HttpEntity, MultipartFile, Resource};
