use std::collections::BTreeMap;

use super::bvalue::BValue;
use super::error::BencodeError;
use super::integer::BInteger;

/// Default bound on list/dictionary nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Hard ceiling on nesting; a larger `max_depth` is clamped to this.
pub const MAX_DEPTH_LIMIT: usize = 512;

/// Knobs for the decoder.
///
/// The lenient default accepts leading zeros in integers and string lengths
/// (normalizing integers, so `i-0e` comes back as zero) and ignores whatever
/// follows the top-level value. `strict` rejects all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
	pub max_depth: usize,
	pub strict: bool,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
			strict: false,
		}
	}
}

impl DecodeOptions {
	pub fn strict() -> Self {
		Self {
			strict: true,
			..Self::default()
		}
	}
}

/// Decodes the value at the start of `input` with the default options.
pub fn decode(input: &[u8]) -> Result<BValue, BencodeError> {
	decode_with(input, &DecodeOptions::default())
}

pub fn decode_with(input: &[u8], options: &DecodeOptions) -> Result<BValue, BencodeError> {
	let (next, value) = decode_at(input, 0, options)?;

	if options.strict && next != input.len() {
		return Err(BencodeError::TrailingData { pos: next });
	}

	Ok(value)
}

/// Decodes the value at the start of `input`, returning how many bytes it
/// occupied along with it. Anything after those bytes is left untouched.
pub fn decode_bencode(input: &[u8]) -> Result<(usize, BValue), BencodeError> {
	decode_at(input, 0, &DecodeOptions::default())
}

/// Decodes the value starting at `offset` and returns the offset just past it.
pub fn decode_at(
	input: &[u8],
	offset: usize,
	options: &DecodeOptions,
) -> Result<(usize, BValue), BencodeError> {
	decode_value(input, offset, options, 0)
}

fn decode_value(
	input: &[u8],
	pos: usize,
	options: &DecodeOptions,
	depth: usize,
) -> Result<(usize, BValue), BencodeError> {
	match input.get(pos) {
		Some(b'i') => decode_integer(input, pos, options),
		Some(b'l') => decode_list(input, pos, options, depth + 1),
		Some(b'd') => decode_dict(input, pos, options, depth + 1),
		Some(c) if c.is_ascii_digit() => {
			let (next, bytes) = decode_string(input, pos, options)?;
			Ok((next, BValue::ByteString(bytes)))
		}
		_ => Err(BencodeError::MalformedValue { pos }),
	}
}

/// Decodes `i<digits>e`, with an optional `-` before the digits.
fn decode_integer(
	input: &[u8],
	pos: usize,
	options: &DecodeOptions,
) -> Result<(usize, BValue), BencodeError> {
	let mut idx = pos + 1; // skip 'i'
	let negative = input.get(idx) == Some(&b'-');
	if negative {
		idx += 1;
	}

	let start = idx;
	loop {
		match input.get(idx) {
			None => return Err(BencodeError::TruncatedInput { pos: idx }),
			Some(b'e') => break,
			Some(c) if c.is_ascii_digit() => idx += 1,
			Some(c) => {
				return Err(BencodeError::MalformedInteger {
					pos: idx,
					reason: format!("unexpected byte {:#04x}", c),
				})
			}
		}
	}

	let digits = &input[start..idx];
	if digits.is_empty() {
		return Err(BencodeError::MalformedInteger {
			pos: idx,
			reason: "no digits".to_string(),
		});
	}

	if options.strict {
		if digits.len() > 1 && digits[0] == b'0' {
			return Err(BencodeError::MalformedInteger {
				pos: start,
				reason: "leading zeros are not allowed".to_string(),
			});
		}
		if negative && digits == b"0" {
			return Err(BencodeError::MalformedInteger {
				pos: start,
				reason: "negative zero is not allowed".to_string(),
			});
		}
	}

	// add 1 to account for 'e'
	Ok((idx + 1, BValue::Integer(BInteger::from_digits(negative, digits))))
}

/// Decodes `<length>:<bytes>`. The caller has already checked that `pos`
/// holds a digit.
fn decode_string(
	input: &[u8],
	pos: usize,
	options: &DecodeOptions,
) -> Result<(usize, Vec<u8>), BencodeError> {
	let mut idx = pos;
	while matches!(input.get(idx), Some(c) if c.is_ascii_digit()) {
		idx += 1;
	}

	match input.get(idx) {
		Some(b':') => {}
		None => return Err(BencodeError::TruncatedInput { pos: idx }),
		Some(c) => {
			return Err(BencodeError::MalformedString {
				pos: idx,
				reason: format!("expected ':' after length, found {:#04x}", c),
			})
		}
	}

	let len_digits = &input[pos..idx];
	if options.strict && len_digits.len() > 1 && len_digits[0] == b'0' {
		return Err(BencodeError::MalformedString {
			pos,
			reason: "leading zeros in length".to_string(),
		});
	}

	let length = len_digits
		.iter()
		.try_fold(0usize, |acc, &d| acc.checked_mul(10)?.checked_add(usize::from(d - b'0')))
		.ok_or_else(|| BencodeError::MalformedString {
			pos,
			reason: "length does not fit in memory".to_string(),
		})?;

	let start_data = idx + 1;
	let end_data = start_data
		.checked_add(length)
		.filter(|&end| end <= input.len())
		.ok_or(BencodeError::TruncatedInput { pos: input.len() })?;

	Ok((end_data, input[start_data..end_data].to_vec()))
}

/// Decodes `l<value>*e`.
fn decode_list(
	input: &[u8],
	pos: usize,
	options: &DecodeOptions,
	depth: usize,
) -> Result<(usize, BValue), BencodeError> {
	check_depth(pos, options, depth)?;

	let mut idx = pos + 1; // skip 'l'
	let mut items = Vec::new();

	loop {
		match input.get(idx) {
			None => return Err(BencodeError::TruncatedInput { pos: idx }),
			Some(b'e') => break,
			Some(_) => {
				let (next, item) = decode_value(input, idx, options, depth)?;
				items.push(item);
				idx = next;
			}
		}
	}

	Ok((idx + 1, BValue::List(items)))
}

/// Decodes `d(<string><value>)*e`.
///
/// Keys may arrive in any order. A key that appears more than once keeps the
/// value of its last occurrence.
fn decode_dict(
	input: &[u8],
	pos: usize,
	options: &DecodeOptions,
	depth: usize,
) -> Result<(usize, BValue), BencodeError> {
	check_depth(pos, options, depth)?;

	let mut idx = pos + 1; // skip 'd'
	let mut map = BTreeMap::new();

	loop {
		match input.get(idx) {
			None => return Err(BencodeError::TruncatedInput { pos: idx }),
			Some(b'e') => break,
			Some(c) if c.is_ascii_digit() => {}
			Some(&c) => return Err(non_string_key(c, idx)),
		}

		let key_pos = idx;
		let (after_key, key) = decode_string(input, idx, options)?;

		if matches!(input.get(after_key), None | Some(b'e')) {
			return Err(BencodeError::MalformedDictionary { pos: key_pos });
		}

		let (next, value) = decode_value(input, after_key, options, depth)?;
		map.insert(key, value);
		idx = next;
	}

	Ok((idx + 1, BValue::Dict(map)))
}

fn check_depth(pos: usize, options: &DecodeOptions, depth: usize) -> Result<(), BencodeError> {
	let max_depth = options.max_depth.min(MAX_DEPTH_LIMIT);
	if depth > max_depth {
		return Err(BencodeError::NestingTooDeep { pos, max_depth });
	}
	Ok(())
}

fn non_string_key(c: u8, pos: usize) -> BencodeError {
	let kind = match c {
		b'i' => "integer",
		b'l' => "list",
		b'd' => "dictionary",
		_ => return BencodeError::MalformedValue { pos },
	};
	BencodeError::InvalidKeyType(format!("{} key at offset {}", kind, pos))
}
