//! Building `BValue` trees from any `serde::Serialize` type.
//!
//! The whole tree is built before a single byte is encoded, so a value that
//! cannot be represented (a float, a map keyed by integers) fails without
//! leaving partial output behind.
//!
//! Mapping:
//! - integers and `bool` become `Integer` (`true` is `i1e`)
//! - `str`, `char` and byte slices become `ByteString`
//! - sequences and tuples become `List`
//! - maps and structs become `Dict`; map keys must serialize as strings
//! - `None` and unit fields inside a struct or map are left out
//! - enums use the externally tagged form `{variant: payload}`

use std::collections::BTreeMap;

use serde::ser::{self, Impossible, Serialize};

use super::encode::encode_bvalue;
use super::error::BencodeError;
use super::BValue;

/// Converts `value` into a `BValue` tree.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<BValue, BencodeError> {
	value
		.serialize(ValueSerializer)?
		.ok_or(BencodeError::UnsupportedType("none or unit at top level"))
}

/// Converts `value` straight to canonical bencode bytes.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BencodeError> {
	let tree = to_value(value)?;
	Ok(encode_bvalue(&tree))
}

// `None` in the output means "nothing to store": dropped when it is a struct
// field or map value, rejected anywhere else.
struct ValueSerializer;

fn element<T: Serialize + ?Sized>(value: &T) -> Result<BValue, BencodeError> {
	value
		.serialize(ValueSerializer)?
		.ok_or(BencodeError::UnsupportedType("none or unit inside a list"))
}

fn int<N: Into<super::BInteger>>(n: N) -> Result<Option<BValue>, BencodeError> {
	Ok(Some(BValue::Integer(n.into())))
}

fn tagged(variant: &'static str, payload: BValue) -> BValue {
	let mut map = BTreeMap::new();
	map.insert(variant.as_bytes().to_vec(), payload);
	BValue::Dict(map)
}

impl ser::Serializer for ValueSerializer {
	type Ok = Option<BValue>;
	type Error = BencodeError;

	type SerializeSeq = SeqBuilder;
	type SerializeTuple = SeqBuilder;
	type SerializeTupleStruct = SeqBuilder;
	type SerializeTupleVariant = SeqBuilder;
	type SerializeMap = MapBuilder;
	type SerializeStruct = MapBuilder;
	type SerializeStructVariant = MapBuilder;

	fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
		int(u8::from(v))
	}

	fn serialize_i8(self, v: i8) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_i16(self, v: i16) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_i32(self, v: i32) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_i64(self, v: i64) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_i128(self, v: i128) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_u8(self, v: u8) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_u16(self, v: u16) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_u32(self, v: u32) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_u64(self, v: u64) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_u128(self, v: u128) -> Result<Self::Ok, Self::Error> {
		int(v)
	}

	fn serialize_f32(self, _v: f32) -> Result<Self::Ok, Self::Error> {
		Err(BencodeError::UnsupportedType("f32"))
	}

	fn serialize_f64(self, _v: f64) -> Result<Self::Ok, Self::Error> {
		Err(BencodeError::UnsupportedType("f64"))
	}

	fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
		let mut buf = [0u8; 4];
		Ok(Some(BValue::string(v.encode_utf8(&mut buf))))
	}

	fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
		Ok(Some(BValue::string(v)))
	}

	fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
		Ok(Some(BValue::ByteString(v.to_vec())))
	}

	fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
		Ok(None)
	}

	fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Self::Ok, Self::Error> {
		value.serialize(self)
	}

	fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
		Ok(None)
	}

	fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
		Ok(None)
	}

	fn serialize_unit_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
	) -> Result<Self::Ok, Self::Error> {
		Ok(Some(BValue::string(variant)))
	}

	fn serialize_newtype_struct<T: Serialize + ?Sized>(
		self,
		_name: &'static str,
		value: &T,
	) -> Result<Self::Ok, Self::Error> {
		value.serialize(self)
	}

	fn serialize_newtype_variant<T: Serialize + ?Sized>(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		value: &T,
	) -> Result<Self::Ok, Self::Error> {
		Ok(Some(tagged(variant, element(value)?)))
	}

	fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
		Ok(SeqBuilder::new(None, len))
	}

	fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
		Ok(SeqBuilder::new(None, Some(len)))
	}

	fn serialize_tuple_struct(
		self,
		_name: &'static str,
		len: usize,
	) -> Result<Self::SerializeTupleStruct, Self::Error> {
		Ok(SeqBuilder::new(None, Some(len)))
	}

	fn serialize_tuple_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		len: usize,
	) -> Result<Self::SerializeTupleVariant, Self::Error> {
		Ok(SeqBuilder::new(Some(variant), Some(len)))
	}

	fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
		Ok(MapBuilder::new(None))
	}

	fn serialize_struct(
		self,
		_name: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStruct, Self::Error> {
		Ok(MapBuilder::new(None))
	}

	fn serialize_struct_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant, Self::Error> {
		Ok(MapBuilder::new(Some(variant)))
	}
}

struct SeqBuilder {
	variant: Option<&'static str>,
	items: Vec<BValue>,
}

impl SeqBuilder {
	fn new(variant: Option<&'static str>, len: Option<usize>) -> Self {
		SeqBuilder {
			variant,
			items: Vec::with_capacity(len.unwrap_or(0)),
		}
	}

	fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), BencodeError> {
		self.items.push(element(value)?);
		Ok(())
	}

	fn finish(self) -> Result<Option<BValue>, BencodeError> {
		let list = BValue::List(self.items);
		Ok(Some(match self.variant {
			Some(variant) => tagged(variant, list),
			None => list,
		}))
	}
}

impl ser::SerializeSeq for SeqBuilder {
	type Ok = Option<BValue>;
	type Error = BencodeError;

	fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
		self.push(value)
	}

	fn end(self) -> Result<Self::Ok, Self::Error> {
		self.finish()
	}
}

impl ser::SerializeTuple for SeqBuilder {
	type Ok = Option<BValue>;
	type Error = BencodeError;

	fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
		self.push(value)
	}

	fn end(self) -> Result<Self::Ok, Self::Error> {
		self.finish()
	}
}

impl ser::SerializeTupleStruct for SeqBuilder {
	type Ok = Option<BValue>;
	type Error = BencodeError;

	fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
		self.push(value)
	}

	fn end(self) -> Result<Self::Ok, Self::Error> {
		self.finish()
	}
}

impl ser::SerializeTupleVariant for SeqBuilder {
	type Ok = Option<BValue>;
	type Error = BencodeError;

	fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
		self.push(value)
	}

	fn end(self) -> Result<Self::Ok, Self::Error> {
		self.finish()
	}
}

struct MapBuilder {
	variant: Option<&'static str>,
	map: BTreeMap<Vec<u8>, BValue>,
	pending_key: Option<Vec<u8>>,
}

impl MapBuilder {
	fn new(variant: Option<&'static str>) -> Self {
		MapBuilder {
			variant,
			map: BTreeMap::new(),
			pending_key: None,
		}
	}

	fn insert<T: Serialize + ?Sized>(&mut self, key: Vec<u8>, value: &T) -> Result<(), BencodeError> {
		if let Some(value) = value.serialize(ValueSerializer)? {
			self.map.insert(key, value);
		}
		Ok(())
	}

	fn finish(self) -> Result<Option<BValue>, BencodeError> {
		let dict = BValue::Dict(self.map);
		Ok(Some(match self.variant {
			Some(variant) => tagged(variant, dict),
			None => dict,
		}))
	}
}

impl ser::SerializeMap for MapBuilder {
	type Ok = Option<BValue>;
	type Error = BencodeError;

	fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
		self.pending_key = Some(key.serialize(KeySerializer)?);
		Ok(())
	}

	fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
		let key = self
			.pending_key
			.take()
			.ok_or_else(|| BencodeError::Custom("map value without a key".to_string()))?;
		self.insert(key, value)
	}

	fn end(self) -> Result<Self::Ok, Self::Error> {
		self.finish()
	}
}

impl ser::SerializeStruct for MapBuilder {
	type Ok = Option<BValue>;
	type Error = BencodeError;

	fn serialize_field<T: Serialize + ?Sized>(
		&mut self,
		key: &'static str,
		value: &T,
	) -> Result<(), Self::Error> {
		self.insert(key.as_bytes().to_vec(), value)
	}

	fn end(self) -> Result<Self::Ok, Self::Error> {
		self.finish()
	}
}

impl ser::SerializeStructVariant for MapBuilder {
	type Ok = Option<BValue>;
	type Error = BencodeError;

	fn serialize_field<T: Serialize + ?Sized>(
		&mut self,
		key: &'static str,
		value: &T,
	) -> Result<(), Self::Error> {
		self.insert(key.as_bytes().to_vec(), value)
	}

	fn end(self) -> Result<Self::Ok, Self::Error> {
		self.finish()
	}
}

/// Accepts only the shapes that can be a dictionary key: strings, chars and
/// byte slices.
struct KeySerializer;

fn bad_key(kind: &str) -> BencodeError {
	BencodeError::InvalidKeyType(format!("{} used as a map key", kind))
}

impl ser::Serializer for KeySerializer {
	type Ok = Vec<u8>;
	type Error = BencodeError;

	type SerializeSeq = Impossible<Vec<u8>, BencodeError>;
	type SerializeTuple = Impossible<Vec<u8>, BencodeError>;
	type SerializeTupleStruct = Impossible<Vec<u8>, BencodeError>;
	type SerializeTupleVariant = Impossible<Vec<u8>, BencodeError>;
	type SerializeMap = Impossible<Vec<u8>, BencodeError>;
	type SerializeStruct = Impossible<Vec<u8>, BencodeError>;
	type SerializeStructVariant = Impossible<Vec<u8>, BencodeError>;

	fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
		Ok(v.as_bytes().to_vec())
	}

	fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
		Ok(v.to_vec())
	}

	fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
		let mut buf = [0u8; 4];
		Ok(v.encode_utf8(&mut buf).as_bytes().to_vec())
	}

	fn serialize_unit_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		variant: &'static str,
	) -> Result<Self::Ok, Self::Error> {
		Ok(variant.as_bytes().to_vec())
	}

	fn serialize_newtype_struct<T: Serialize + ?Sized>(
		self,
		_name: &'static str,
		value: &T,
	) -> Result<Self::Ok, Self::Error> {
		value.serialize(self)
	}

	fn serialize_bool(self, _v: bool) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("bool"))
	}

	fn serialize_i8(self, _v: i8) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_i16(self, _v: i16) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_i32(self, _v: i32) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_i64(self, _v: i64) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_u8(self, _v: u8) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_u16(self, _v: u16) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_u32(self, _v: u32) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_u64(self, _v: u64) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_i128(self, _v: i128) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_u128(self, _v: u128) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("integer"))
	}

	fn serialize_f32(self, _v: f32) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("float"))
	}

	fn serialize_f64(self, _v: f64) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("float"))
	}

	fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("none"))
	}

	fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("option"))
	}

	fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("unit"))
	}

	fn serialize_unit_struct(self, _name: &'static str) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("unit struct"))
	}

	fn serialize_newtype_variant<T: Serialize + ?Sized>(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_value: &T,
	) -> Result<Self::Ok, Self::Error> {
		Err(bad_key("enum"))
	}

	fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
		Err(bad_key("list"))
	}

	fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Self::Error> {
		Err(bad_key("tuple"))
	}

	fn serialize_tuple_struct(
		self,
		_name: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleStruct, Self::Error> {
		Err(bad_key("tuple struct"))
	}

	fn serialize_tuple_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeTupleVariant, Self::Error> {
		Err(bad_key("enum"))
	}

	fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
		Err(bad_key("dictionary"))
	}

	fn serialize_struct(
		self,
		_name: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStruct, Self::Error> {
		Err(bad_key("struct"))
	}

	fn serialize_struct_variant(
		self,
		_name: &'static str,
		_variant_index: u32,
		_variant: &'static str,
		_len: usize,
	) -> Result<Self::SerializeStructVariant, Self::Error> {
		Err(bad_key("enum"))
	}
}

#[cfg(test)]
mod tests {
	use std::collections::{BTreeMap, HashMap};

	use serde::Serialize;

	use super::*;
	use crate::bencode::decode;

	#[derive(Serialize)]
	struct Info {
		name: String,
		length: u64,
		#[serde(rename = "piece length")]
		piece_length: u32,
		#[serde(with = "serde_bytes")]
		pieces: Vec<u8>,
		#[serde(skip_serializing_if = "Option::is_none")]
		md5sum: Option<String>,
	}

	#[derive(Serialize)]
	struct Metainfo {
		info: Info,
		announce: String,
		#[serde(rename = "announce-list")]
		announce_list: Vec<Vec<String>>,
	}

	fn sample() -> Metainfo {
		Metainfo {
			info: Info {
				name: "example.txt".to_string(),
				length: 1024,
				piece_length: 16384,
				pieces: vec![0xab; 20],
				md5sum: None,
			},
			announce: "http://tracker.example/announce".to_string(),
			announce_list: vec![vec!["udp://a.example:80".to_string()]],
		}
	}

	#[test]
	fn test_struct_matches_serde_bencode() {
		let ours = to_bytes(&sample()).unwrap();
		let theirs = serde_bencode::to_bytes(&sample()).unwrap();
		assert_eq!(ours, theirs);
	}

	#[test]
	fn test_struct_fields_are_sorted() {
		let bytes = to_bytes(&sample()).unwrap();
		let value = decode(&bytes).unwrap();
		let keys: Vec<&[u8]> = value.as_dict().unwrap().keys().map(Vec::as_slice).collect();
		assert_eq!(keys, vec![&b"announce"[..], &b"announce-list"[..], &b"info"[..]]);
		assert!(bytes.starts_with(b"d8:announce"));
	}

	#[test]
	fn test_hashmap_keys_sorted() {
		let mut map = HashMap::new();
		map.insert("spam", "eggs");
		map.insert("cow", "moo");
		assert_eq!(to_bytes(&map).unwrap(), b"d3:cow3:moo4:spam4:eggse");
	}

	#[test]
	fn test_integer_keys_rejected() {
		let mut map = BTreeMap::new();
		map.insert(1, "one");
		assert!(matches!(to_bytes(&map), Err(BencodeError::InvalidKeyType(_))));
	}

	#[test]
	fn test_wide_integer_keys_rejected() {
		let mut wide = BTreeMap::new();
		wide.insert(u128::MAX, "big");
		assert!(matches!(to_bytes(&wide), Err(BencodeError::InvalidKeyType(_))));

		let mut signed = BTreeMap::new();
		signed.insert(-1i128, "neg");
		assert!(matches!(to_bytes(&signed), Err(BencodeError::InvalidKeyType(_))));
	}

	#[test]
	fn test_nested_bad_key_fails_whole_value() {
		let mut inner = BTreeMap::new();
		inner.insert(vec![1u8, 2], 3);
		let outer = vec![Some(inner)];
		assert!(matches!(to_value(&outer), Err(BencodeError::InvalidKeyType(_))));
	}

	#[test]
	fn test_floats_rejected() {
		assert_eq!(to_bytes(&1.5f64), Err(BencodeError::UnsupportedType("f64")));
	}

	#[test]
	fn test_none_handling() {
		assert!(matches!(to_value(&None::<u8>), Err(BencodeError::UnsupportedType(_))));
		assert!(matches!(to_value(&vec![Some(1), None]), Err(BencodeError::UnsupportedType(_))));

		let mut map = BTreeMap::new();
		map.insert("kept", Some(1));
		map.insert("dropped", None);
		assert_eq!(to_bytes(&map).unwrap(), b"d4:kepti1ee");
	}

	#[test]
	fn test_scalars() {
		assert_eq!(to_bytes(&true).unwrap(), b"i1e");
		assert_eq!(to_bytes(&-7i8).unwrap(), b"i-7e");
		assert_eq!(to_bytes(&u128::MAX).unwrap(), b"i340282366920938463463374607431768211455e");
		assert_eq!(to_bytes(&'x').unwrap(), b"1:x");
		assert_eq!(to_bytes(&serde_bytes::Bytes::new(b"\x00\x01")).unwrap(), b"2:\x00\x01");
		assert_eq!(to_bytes(&(1, "a")).unwrap(), b"li1e1:ae");
	}

	#[derive(Serialize)]
	enum Event {
		Started,
		Progress(u32),
		Moved { from: String, to: String },
		Pair(u8, u8),
	}

	#[test]
	fn test_enums_externally_tagged() {
		assert_eq!(to_bytes(&Event::Started).unwrap(), b"7:Started");
		assert_eq!(to_bytes(&Event::Progress(5)).unwrap(), b"d8:Progressi5ee");
		assert_eq!(
			to_bytes(&Event::Moved { from: "a".into(), to: "b".into() }).unwrap(),
			b"d5:Movedd4:from1:a2:to1:bee"
		);
		assert_eq!(to_bytes(&Event::Pair(1, 2)).unwrap(), b"d4:Pairli1ei2eee");
	}
}
