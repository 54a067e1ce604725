//! JSON text codec for [`Node`](crate::node::Node) trees.
//!
//! - `encode` writes compact or pretty text; the whole document is built in
//!   memory so a failure never leaves a partial fragment behind.
//! - `decode` reads exactly one document and rejects trailing input;
//!   `Decoder` reads successive values from a multi-document stream.
pub mod decode;
pub mod encode;

pub use decode::{decode, decode_slice, Decoder, DEFAULT_MAX_DEPTH};
pub use encode::{encode, Encoder};
