//! Entry encoding
//!
//! Validates typed entry values and serializes them into the payload
//! written by `vlcfg_protocol::ItemWriter`.

pub mod encoder;
pub mod value;

pub use encoder::{encode_entries, EncodeError, EncodeErrorKind};
pub use value::{parse_integer, parse_ipv4, IntegerValue};
