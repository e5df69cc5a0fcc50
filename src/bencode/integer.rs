use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

use super::error::BencodeError;

/// An arbitrary-range signed integer as carried by bencode `i...e` values.
///
/// Stored as a sign plus the canonical decimal magnitude, so values larger than
/// any native integer survive a decode/encode cycle untouched. Zero is never
/// negative, which makes `-0` unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BInteger {
	negative: bool,
	digits: Vec<u8>, // ASCII digits, no leading zeros
}

impl BInteger {
	pub fn zero() -> Self {
		BInteger { negative: false, digits: vec![b'0'] }
	}

	/// Builds an integer from a non-empty run of ASCII digits, dropping any
	/// leading zeros.
	pub(crate) fn from_digits(negative: bool, digits: &[u8]) -> Self {
		debug_assert!(!digits.is_empty() && digits.iter().all(u8::is_ascii_digit));

		let first = digits.iter().position(|&d| d != b'0');
		match first {
			None => Self::zero(),
			Some(start) => BInteger {
				negative,
				digits: digits[start..].to_vec(),
			},
		}
	}

	pub fn is_negative(&self) -> bool {
		self.negative
	}

	pub fn is_zero(&self) -> bool {
		self.digits == b"0"
	}

	pub fn to_i64(&self) -> Option<i64> {
		self.to_string().parse().ok()
	}

	pub fn to_u64(&self) -> Option<u64> {
		self.to_string().parse().ok()
	}

	pub fn to_i128(&self) -> Option<i128> {
		self.to_string().parse().ok()
	}

	/// Appends the canonical decimal form (`-` only for negatives, no padding).
	pub(crate) fn write_decimal(&self, out: &mut Vec<u8>) {
		if self.negative {
			out.push(b'-');
		}
		out.extend_from_slice(&self.digits);
	}

	fn cmp_magnitude(&self, other: &Self) -> Ordering {
		self.digits
			.len()
			.cmp(&other.digits.len())
			.then_with(|| self.digits.cmp(&other.digits))
	}
}

impl Default for BInteger {
	fn default() -> Self {
		Self::zero()
	}
}

impl fmt::Display for BInteger {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.negative {
			f.write_str("-")?;
		}
		// digits are always ASCII
		f.write_str(std::str::from_utf8(&self.digits).map_err(|_| fmt::Error)?)
	}
}

impl Ord for BInteger {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self.negative, other.negative) {
			(false, true) => Ordering::Greater,
			(true, false) => Ordering::Less,
			(false, false) => self.cmp_magnitude(other),
			(true, true) => other.cmp_magnitude(self),
		}
	}
}

impl PartialOrd for BInteger {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// Accepts an optional leading `-` followed by decimal digits. Leading zeros
/// are normalized away.
impl FromStr for BInteger {
	type Err = BencodeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (negative, digits) = match s.strip_prefix('-') {
			Some(rest) => (true, rest),
			None => (false, s),
		};

		if digits.is_empty() {
			return Err(BencodeError::MalformedInteger {
				pos: s.len(),
				reason: "no digits".to_string(),
			});
		}
		if let Some(bad) = digits.bytes().position(|b| !b.is_ascii_digit()) {
			return Err(BencodeError::MalformedInteger {
				pos: bad + usize::from(negative),
				reason: format!("non-digit in {:?}", s),
			});
		}

		Ok(Self::from_digits(negative, digits.as_bytes()))
	}
}

fn digit(d: u8) -> u8 {
	d - b'0'
}

fn add_magnitudes(a: &[u8], b: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(a.len().max(b.len()) + 1);
	let (mut ai, mut bi) = (a.iter().rev(), b.iter().rev());
	let mut carry = 0u8;

	loop {
		let (x, y) = (ai.next(), bi.next());
		if x.is_none() && y.is_none() {
			break;
		}
		let sum = x.map_or(0, |&d| digit(d)) + y.map_or(0, |&d| digit(d)) + carry;
		out.push(b'0' + sum % 10);
		carry = sum / 10;
	}
	if carry > 0 {
		out.push(b'0' + carry);
	}

	out.reverse();
	out
}

// `a` must be at least as large as `b`; the result may carry leading zeros.
fn sub_magnitudes(a: &[u8], b: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(a.len());
	let mut bi = b.iter().rev();
	let mut borrow = 0i8;

	for &d in a.iter().rev() {
		let mut diff = digit(d) as i8 - bi.next().map_or(0, |&d| digit(d) as i8) - borrow;
		borrow = 0;
		if diff < 0 {
			diff += 10;
			borrow = 1;
		}
		out.push(b'0' + diff as u8);
	}

	out.reverse();
	out
}

impl Add for &BInteger {
	type Output = BInteger;

	fn add(self, rhs: &BInteger) -> BInteger {
		if self.negative == rhs.negative {
			return BInteger::from_digits(self.negative, &add_magnitudes(&self.digits, &rhs.digits));
		}

		match self.cmp_magnitude(rhs) {
			Ordering::Less => {
				BInteger::from_digits(rhs.negative, &sub_magnitudes(&rhs.digits, &self.digits))
			}
			_ => BInteger::from_digits(self.negative, &sub_magnitudes(&self.digits, &rhs.digits)),
		}
	}
}

impl Add for BInteger {
	type Output = BInteger;

	fn add(self, rhs: BInteger) -> BInteger {
		&self + &rhs
	}
}

macro_rules! from_native {
	($($t:ty),*) => {
		$(
			impl From<$t> for BInteger {
				fn from(n: $t) -> Self {
					let text = n.to_string();
					match text.strip_prefix('-') {
						Some(digits) => Self::from_digits(true, digits.as_bytes()),
						None => Self::from_digits(false, text.as_bytes()),
					}
				}
			}
		)*
	};
}

from_native!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
