//! Typed values ⇄ generic tree ⇄ JSON text.
//!
//! ```text
//! value --project--> Node --json::encode--> text
//! text  --json::decode--> Node --populate--> value
//! ```
pub mod bridge;
pub mod error;
pub mod json;
pub mod mapping;
pub mod model;
pub mod node;
pub mod route;

pub use error::{to_exit_code, Error, ErrorKind, Result};
pub use mapping::{from_node, to_node, Members, Populate, Project};
pub use node::{Category, Node, Scalar};

/// Projects `value` and encodes it.
pub fn to_json<T: Project + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    json::encode(&value.project(), pretty)
}

/// Decodes one document and populates a `T` from it.
pub fn from_json<T: Populate>(text: &str) -> Result<T> {
    T::populate(&json::decode(text)?)
}

pub fn from_slice<T: Populate>(bytes: &[u8]) -> Result<T> {
    T::populate(&json::decode_slice(bytes)?)
}
