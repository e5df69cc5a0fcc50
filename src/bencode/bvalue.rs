use std::collections::BTreeMap;

use super::integer::BInteger;

/// A decoded bencode value.
///
/// Dictionary keys are raw byte strings held in a `BTreeMap`, so iteration is
/// always in byte-lexicographic key order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BValue {
	ByteString(Vec<u8>), // raw bytes for any string
	Integer(BInteger),
	List(Vec<BValue>),
	Dict(BTreeMap<Vec<u8>, BValue>),
}

impl BValue {
	/// Byte string from UTF-8 text.
	pub fn string(s: &str) -> Self {
		BValue::ByteString(s.as_bytes().to_vec())
	}

	/// Short name of the variant, for diagnostics.
	pub fn kind(&self) -> &'static str {
		match self {
			BValue::ByteString(_) => "string",
			BValue::Integer(_) => "integer",
			BValue::List(_) => "list",
			BValue::Dict(_) => "dictionary",
		}
	}

	pub fn as_bytes(&self) -> Option<&[u8]> {
		match self {
			BValue::ByteString(b) => Some(b),
			_ => None,
		}
	}

	/// Returns the byte string as `&str` if it holds valid UTF-8.
	pub fn as_str(&self) -> Option<&str> {
		self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
	}

	pub fn as_integer(&self) -> Option<&BInteger> {
		match self {
			BValue::Integer(i) => Some(i),
			_ => None,
		}
	}

	/// Returns the integer if it is one and fits in an `i64`.
	pub fn as_i64(&self) -> Option<i64> {
		self.as_integer().and_then(BInteger::to_i64)
	}

	pub fn as_list(&self) -> Option<&[BValue]> {
		match self {
			BValue::List(l) => Some(l),
			_ => None,
		}
	}

	pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, BValue>> {
		match self {
			BValue::Dict(d) => Some(d),
			_ => None,
		}
	}

	pub fn into_dict(self) -> Option<BTreeMap<Vec<u8>, BValue>> {
		match self {
			BValue::Dict(d) => Some(d),
			_ => None,
		}
	}

	/// Looks up `key` when this value is a dictionary.
	pub fn get(&self, key: &[u8]) -> Option<&BValue> {
		self.as_dict()?.get(key)
	}
}

impl From<BInteger> for BValue {
	fn from(i: BInteger) -> Self {
		BValue::Integer(i)
	}
}

impl From<i64> for BValue {
	fn from(i: i64) -> Self {
		BValue::Integer(i.into())
	}
}

impl From<u64> for BValue {
	fn from(i: u64) -> Self {
		BValue::Integer(i.into())
	}
}

impl From<&str> for BValue {
	fn from(s: &str) -> Self {
		BValue::string(s)
	}
}

impl From<String> for BValue {
	fn from(s: String) -> Self {
		BValue::ByteString(s.into_bytes())
	}
}

impl From<&[u8]> for BValue {
	fn from(b: &[u8]) -> Self {
		BValue::ByteString(b.to_vec())
	}
}

impl From<Vec<u8>> for BValue {
	fn from(b: Vec<u8>) -> Self {
		BValue::ByteString(b)
	}
}

impl From<Vec<BValue>> for BValue {
	fn from(l: Vec<BValue>) -> Self {
		BValue::List(l)
	}
}

impl From<BTreeMap<Vec<u8>, BValue>> for BValue {
	fn from(d: BTreeMap<Vec<u8>, BValue>) -> Self {
		BValue::Dict(d)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_accessors() {
		let mut map = BTreeMap::new();
		map.insert(b"name".to_vec(), BValue::from("spam"));
		map.insert(b"size".to_vec(), BValue::from(7i64));
		let value = BValue::Dict(map);

		assert_eq!(value.kind(), "dictionary");
		assert_eq!(value.get(b"name").and_then(BValue::as_str), Some("spam"));
		assert_eq!(value.get(b"size").and_then(BValue::as_i64), Some(7));
		assert_eq!(value.get(b"missing"), None);
		assert_eq!(BValue::from(1i64).get(b"name"), None);
	}

	#[test]
	fn test_as_str_rejects_invalid_utf8() {
		let value = BValue::ByteString(vec![0xff, 0xfe]);
		assert_eq!(value.as_bytes(), Some(&[0xff, 0xfe][..]));
		assert_eq!(value.as_str(), None);
	}

	#[test]
	fn test_dict_iterates_in_byte_order() {
		let mut map = BTreeMap::new();
		map.insert(b"spam".to_vec(), BValue::from("eggs"));
		map.insert(b"cow".to_vec(), BValue::from("moo"));
		map.insert(b"Zebra".to_vec(), BValue::from("stripes"));
		let keys: Vec<&[u8]> = map.keys().map(Vec::as_slice).collect();
		assert_eq!(keys, vec![&b"Zebra"[..], &b"cow"[..], &b"spam"[..]]);
	}
}
