use serde_json::{json, Value};

use super::BValue;

/// Encode a `BValue` back into a bencoded `Vec<u8>`.
///
/// Output is canonical: dictionary keys come out in ascending byte order and
/// integers carry no padding or redundant sign.
pub fn encode_bvalue(value: &BValue) -> Vec<u8> {
	let mut out: Vec<u8> = Vec::new();
	encode_into(value, &mut out);
	out
}

/// Appends the encoding of `value` to `out`.
pub fn encode_into(value: &BValue, out: &mut Vec<u8>) {
	match value {
		BValue::Integer(i) => {
			out.push(b'i');
			i.write_decimal(out);
			out.push(b'e');
		}
		BValue::ByteString(bytes) => encode_bytes(bytes, out),
		BValue::List(items) => {
			out.push(b'l');
			for item in items {
				encode_into(item, out);
			}
			out.push(b'e');
		}
		BValue::Dict(dict) => {
			out.push(b'd');
			// BTreeMap iterates in byte-lexicographic key order
			for (key, val) in dict {
				encode_bytes(key, out);
				encode_into(val, out);
			}
			out.push(b'e');
		}
	}
}

fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
	out.extend_from_slice(bytes.len().to_string().as_bytes());
	out.push(b':');
	out.extend_from_slice(bytes);
}

/// Convert a `BValue` into JSON (using Serde JSON `Value`).
///
/// - `Integer(i)` => JSON number, or a decimal string when it fits neither `i64` nor `u64`
/// - `ByteString(bytes)` => Attempt UTF-8; if invalid, store hex in `"_bytes_hex"`.
/// - `List(...)` => JSON array
/// - `Dict(...)` => JSON object; a key that is not UTF-8 becomes `"_bytes_hex:<hex>"`
pub fn bvalue_to_json(bv: &BValue) -> Value {
	match bv {
		BValue::Integer(i) => match (i.to_i64(), i.to_u64()) {
			(Some(n), _) => json!(n),
			(None, Some(n)) => json!(n),
			(None, None) => Value::String(i.to_string()),
		},

		BValue::ByteString(bytes) => match std::str::from_utf8(bytes) {
			Ok(utf8_str) => Value::String(utf8_str.to_string()),
			Err(_) => json!({ "_bytes_hex": hex::encode(bytes) }),
		},

		BValue::List(list_items) => Value::Array(list_items.iter().map(bvalue_to_json).collect()),

		BValue::Dict(map) => {
			let mut json_map = serde_json::Map::new();
			for (k, v) in map {
				json_map.insert(json_key(k), bvalue_to_json(v));
			}
			Value::Object(json_map)
		}
	}
}

fn json_key(key: &[u8]) -> String {
	match std::str::from_utf8(key) {
		Ok(utf8_str) => utf8_str.to_string(),
		Err(_) => format!("_bytes_hex:{}", hex::encode(key)),
	}
}
