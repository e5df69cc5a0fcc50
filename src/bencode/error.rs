use std::fmt::Display;
use thiserror::Error;

/// Everything that can go wrong while decoding or encoding bencode.
///
/// Decoder variants carry the byte offset at which the problem was detected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BencodeError {
	#[error("Malformed value at offset {pos}: no value starts here")]
	MalformedValue { pos: usize },

	#[error("Malformed string at offset {pos}: {reason}")]
	MalformedString { pos: usize, reason: String },

	#[error("Malformed integer at offset {pos}: {reason}")]
	MalformedInteger { pos: usize, reason: String },

	#[error("Invalid dictionary key: {0}")]
	InvalidKeyType(String),

	#[error("Malformed dictionary at offset {pos}: key has no value")]
	MalformedDictionary { pos: usize },

	#[error("Truncated input at offset {pos}")]
	TruncatedInput { pos: usize },

	#[error("Nesting deeper than {max_depth} levels at offset {pos}")]
	NestingTooDeep { pos: usize, max_depth: usize },

	#[error("Trailing data at offset {pos}")]
	TrailingData { pos: usize },

	#[error("Not a torrent: outermost value must be a dictionary")]
	NotATorrentDictionary,

	#[error("Unsupported type: {0}")]
	UnsupportedType(&'static str),

	#[error("{0}")]
	Custom(String),
}

impl serde::ser::Error for BencodeError {
	fn custom<T: Display>(msg: T) -> Self {
		BencodeError::Custom(msg.to_string())
	}
}
