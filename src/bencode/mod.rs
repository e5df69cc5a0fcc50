pub mod bvalue;
pub mod decode;
pub mod encode;
pub mod error;
pub mod integer;
pub mod ser;

pub use bvalue::BValue;   // re-export
pub use decode::{decode, decode_at, decode_bencode, decode_with, DecodeOptions, DEFAULT_MAX_DEPTH, MAX_DEPTH_LIMIT};   // re-export
pub use encode::{bvalue_to_json, encode_bvalue, encode_bvalue as encode, encode_into};   // re-export
pub use error::BencodeError;
pub use integer::BInteger;
pub use ser::{to_bytes, to_value};
