use bytes::Bytes;
use log::debug;
use num_bigint::BigInt;

use super::bvalue::{BValue, Dict};
use super::error::{DecodeError, DecodeErrorKind};

/// Nesting limit used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 256;

// Up to 18 decimal digits always fit in an i64.
const I64_SAFE_DIGITS: usize = 18;

/// Policy knobs for the decoder. The defaults accept any well-formed input
/// short of absurd nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
	/// Maximum number of nested lists/dictionaries.
	pub max_depth: usize,
	/// Reject dictionary keys that are not valid UTF-8.
	pub utf8_keys: bool,
	/// Reject dictionaries whose keys are not in strictly ascending byte order.
	pub require_sorted_keys: bool,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: DEFAULT_MAX_DEPTH,
			utf8_keys: false,
			require_sorted_keys: false,
		}
	}
}

/// Decodes bencode under a fixed set of [`DecodeOptions`].
#[derive(Debug, Clone, Default)]
pub struct Decoder {
	options: DecodeOptions,
}

impl Decoder {
	pub fn new(options: DecodeOptions) -> Self {
		Decoder { options }
	}

	/// Decodes `input` as exactly one value. Bytes left over after it are an error.
	pub fn decode(&self, input: &[u8]) -> Result<BValue, DecodeError> {
		let (consumed, value) = self.decode_prefix(input)?;
		if consumed != input.len() {
			let err = DecodeError::new(DecodeErrorKind::TrailingData, consumed);
			debug!("rejecting input: {}", err);
			return Err(err);
		}
		Ok(value)
	}

	/// Decodes one value from the front of `input` and reports how many bytes it used.
	pub fn decode_prefix(&self, input: &[u8]) -> Result<(usize, BValue), DecodeError> {
		let mut parser = Parser {
			data: input,
			pos: 0,
			options: &self.options,
		};
		match parser.parse_value(0) {
			Ok(value) => Ok((parser.pos, value)),
			Err(err) => {
				debug!("rejecting input: {}", err);
				Err(err)
			}
		}
	}
}

/// Decodes a complete bencoded buffer with the default options.
///
/// ```
/// use rusbencode::{decode, BValue};
///
/// assert_eq!(decode(b"i42e").unwrap(), BValue::from(42));
/// assert_eq!(decode(b"4:spam").unwrap().as_str(), Some("spam"));
/// assert!(decode(b"i01e").is_err());
/// assert!(decode(b"i42eextra").is_err());
/// ```
pub fn decode(input: &[u8]) -> Result<BValue, DecodeError> {
	Decoder::default().decode(input)
}

/// Decodes the first value in `input`, returning `(bytes consumed, value)`.
/// Whatever follows the value is left alone.
pub fn decode_prefix(input: &[u8]) -> Result<(usize, BValue), DecodeError> {
	Decoder::default().decode_prefix(input)
}

struct Parser<'a> {
	data: &'a [u8],
	pos: usize,
	options: &'a DecodeOptions,
}

impl Parser<'_> {
	fn peek(&self) -> Option<u8> {
		self.data.get(self.pos).copied()
	}

	fn fail<T>(&self, kind: DecodeErrorKind, offset: usize) -> Result<T, DecodeError> {
		Err(DecodeError::new(kind, offset))
	}

	fn parse_value(&mut self, depth: usize) -> Result<BValue, DecodeError> {
		match self.peek() {
			Some(b'i') => self.parse_integer(),
			Some(b'l') => self.parse_list(depth),
			Some(b'd') => self.parse_dict(depth),
			Some(b'0'..=b'9') => self.parse_bytes().map(BValue::ByteString),
			Some(c) => self.fail(DecodeErrorKind::UnexpectedByte(c), self.pos),
			None => self.fail(DecodeErrorKind::UnexpectedEof, self.pos),
		}
	}

	/// `i<digits>e`, with an optional single `-`.
	fn parse_integer(&mut self) -> Result<BValue, DecodeError> {
		let start = self.pos;
		self.pos += 1; // skip 'i'

		let negative = self.peek() == Some(b'-');
		if negative {
			self.pos += 1;
		}

		let digits_start = self.pos;
		loop {
			match self.peek() {
				Some(b'0'..=b'9') => self.pos += 1,
				Some(b'e') => break,
				Some(_) => {
					return self.fail(DecodeErrorKind::InvalidInteger("non-digit character"), self.pos)
				}
				None => return self.fail(DecodeErrorKind::UnexpectedEof, self.pos),
			}
		}
		let digits = &self.data[digits_start..self.pos];

		if digits.is_empty() {
			return self.fail(DecodeErrorKind::InvalidInteger("no digits"), start);
		}
		// Leading zeros not allowed
		if digits[0] == b'0' && digits.len() > 1 {
			return self.fail(DecodeErrorKind::InvalidInteger("leading zero"), start);
		}
		if negative && digits == b"0" {
			return self.fail(DecodeErrorKind::InvalidInteger("negative zero"), start);
		}

		let magnitude = if digits.len() <= I64_SAFE_DIGITS {
			BigInt::from(digits.iter().fold(0i64, |acc, d| acc * 10 + i64::from(d - b'0')))
		} else {
			match BigInt::parse_bytes(digits, 10) {
				Some(n) => n,
				None => return self.fail(DecodeErrorKind::InvalidInteger("not a number"), start),
			}
		};

		// skip 'e'
		self.pos += 1;
		Ok(BValue::Integer(if negative { -magnitude } else { magnitude }))
	}

	/// `<length>:<bytes>`.
	fn parse_bytes(&mut self) -> Result<Bytes, DecodeError> {
		let start = self.pos;
		while let Some(b'0'..=b'9') = self.peek() {
			self.pos += 1;
		}
		let digits = &self.data[start..self.pos];

		match self.peek() {
			Some(b':') => {}
			Some(_) if digits.is_empty() => {
				return self.fail(DecodeErrorKind::InvalidStringLength("no digits"), start)
			}
			Some(_) => {
				return self.fail(DecodeErrorKind::InvalidStringLength("missing ':'"), self.pos)
			}
			None => return self.fail(DecodeErrorKind::UnexpectedEof, self.pos),
		}
		if digits.is_empty() {
			return self.fail(DecodeErrorKind::InvalidStringLength("no digits"), start);
		}
		if digits[0] == b'0' && digits.len() > 1 {
			return self.fail(DecodeErrorKind::InvalidStringLength("leading zero"), start);
		}

		let mut length: usize = 0;
		for d in digits {
			length = match length
				.checked_mul(10)
				.and_then(|l| l.checked_add(usize::from(d - b'0')))
			{
				Some(l) => l,
				None => return self.fail(DecodeErrorKind::InvalidStringLength("too large"), start),
			};
		}

		// skip ':'
		self.pos += 1;
		if length > self.data.len() - self.pos {
			return self.fail(DecodeErrorKind::UnexpectedEof, start);
		}

		let data = Bytes::copy_from_slice(&self.data[self.pos..self.pos + length]);
		self.pos += length;
		Ok(data)
	}

	fn enter(&self, depth: usize) -> Result<(), DecodeError> {
		if depth >= self.options.max_depth {
			return self.fail(DecodeErrorKind::NestingTooDeep, self.pos);
		}
		Ok(())
	}

	/// `l<items>e`.
	fn parse_list(&mut self, depth: usize) -> Result<BValue, DecodeError> {
		self.enter(depth)?;
		self.pos += 1; // skip 'l'
		let mut items = Vec::new();

		loop {
			match self.peek() {
				Some(b'e') => break,
				Some(_) => items.push(self.parse_value(depth + 1)?),
				// out of input, the list is unclosed
				None => return self.fail(DecodeErrorKind::MissingTerminator("list"), self.pos),
			}
		}

		self.pos += 1;
		Ok(BValue::List(items))
	}

	/// `d<key><value>...e`. Keys are byte strings and may not repeat.
	fn parse_dict(&mut self, depth: usize) -> Result<BValue, DecodeError> {
		self.enter(depth)?;
		self.pos += 1; // skip 'd'
		let mut map = Dict::new();

		loop {
			let key_start = self.pos;
			match self.peek() {
				Some(b'e') => break,
				Some(b'0'..=b'9') => {}
				// Dictionary keys must be strings
				Some(c) => return self.fail(DecodeErrorKind::UnexpectedByte(c), key_start),
				None => {
					return self.fail(DecodeErrorKind::MissingTerminator("dictionary"), self.pos)
				}
			}

			let key = self.parse_bytes()?;
			if map.contains_key(&key) {
				return self.fail(DecodeErrorKind::DuplicateKey(key.to_vec()), key_start);
			}
			if self.options.utf8_keys && std::str::from_utf8(&key).is_err() {
				return self.fail(DecodeErrorKind::InvalidKey, key_start);
			}
			if self.options.require_sorted_keys {
				if let Some((last, _)) = map.last() {
					if key < *last {
						return self.fail(DecodeErrorKind::UnsortedKeys(key.to_vec()), key_start);
					}
				}
			}

			let value = self.parse_value(depth + 1)?;
			map.insert(key, value);
		}

		self.pos += 1;
		Ok(BValue::Dict(map))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn kind_of(input: &[u8]) -> DecodeErrorKind {
		decode(input).unwrap_err().kind
	}

	fn dict(pairs: Vec<(&str, BValue)>) -> BValue {
		let mut map = Dict::new();
		for (k, v) in pairs {
			map.insert(Bytes::copy_from_slice(k.as_bytes()), v);
		}
		BValue::Dict(map)
	}

	#[test]
	fn test_decode_integer() {
		assert_eq!(decode(b"i42e").unwrap(), BValue::from(42));
		assert_eq!(decode(b"i-13e").unwrap(), BValue::from(-13));
		assert_eq!(decode(b"i0e").unwrap(), BValue::from(0));
	}

	#[test]
	fn test_decode_integer_beyond_i64() {
		let value = decode(b"i-170141183460469231731687303715884105728000e").unwrap();
		let expected: BigInt = "-170141183460469231731687303715884105728000".parse().unwrap();
		assert_eq!(value.as_integer(), Some(&expected));

		let value = decode(b"i9223372036854775808e").unwrap();
		assert_eq!(value.as_i64(), None);
		assert_eq!(value, BValue::from(9223372036854775808u64));
	}

	#[test]
	fn test_decode_integer_boundaries() {
		assert_eq!(decode(b"i999999999999999999e").unwrap().as_i64(), Some(999_999_999_999_999_999));
		assert_eq!(decode(b"i-9223372036854775808e").unwrap().as_i64(), Some(i64::MIN));
	}

	#[test]
	fn test_decode_integer_invalid() {
		assert_eq!(kind_of(b"i01e"), DecodeErrorKind::InvalidInteger("leading zero"));
		assert_eq!(kind_of(b"i-0e"), DecodeErrorKind::InvalidInteger("negative zero"));
		assert_eq!(kind_of(b"i-01e"), DecodeErrorKind::InvalidInteger("leading zero"));
		assert_eq!(kind_of(b"ie"), DecodeErrorKind::InvalidInteger("no digits"));
		assert_eq!(kind_of(b"i-e"), DecodeErrorKind::InvalidInteger("no digits"));
		assert_eq!(kind_of(b"i+5e"), DecodeErrorKind::InvalidInteger("non-digit character"));
		assert_eq!(kind_of(b"i--5e"), DecodeErrorKind::InvalidInteger("non-digit character"));
		assert_eq!(kind_of(b"i4.2e"), DecodeErrorKind::InvalidInteger("non-digit character"));
		assert_eq!(kind_of(b"i 4e"), DecodeErrorKind::InvalidInteger("non-digit character"));
	}

	#[test]
	fn test_decode_integer_missing_e() {
		let err = decode(b"i42").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::UnexpectedEof);
		assert_eq!(err.offset, 3);
	}

	#[test]
	fn test_decode_string() {
		assert_eq!(decode(b"5:hello").unwrap(), BValue::string("hello"));
		assert_eq!(decode(b"0:").unwrap(), BValue::string(""));
		assert_eq!(decode(b"2:\xff\x00").unwrap(), BValue::bytes(vec![0xff, 0x00]));
	}

	#[test]
	fn test_decode_string_payload_may_contain_grammar_bytes() {
		assert_eq!(decode(b"4:i1e:").unwrap(), BValue::string("i1e:"));
	}

	#[test]
	fn test_decode_string_invalid() {
		let err = decode(b"3:ab").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::UnexpectedEof);
		assert_eq!(err.offset, 0);

		assert_eq!(kind_of(b"5hello"), DecodeErrorKind::InvalidStringLength("missing ':'"));
		assert_eq!(kind_of(b"05:hello"), DecodeErrorKind::InvalidStringLength("leading zero"));
		assert_eq!(kind_of(b"00:"), DecodeErrorKind::InvalidStringLength("leading zero"));
		assert_eq!(kind_of(b"12"), DecodeErrorKind::UnexpectedEof);
		assert_eq!(
			kind_of(b"99999999999999999999999999:x"),
			DecodeErrorKind::InvalidStringLength("too large")
		);
	}

	#[test]
	fn test_decode_list() {
		assert_eq!(
			decode(b"li1ei2ee").unwrap(),
			BValue::List(vec![BValue::from(1), BValue::from(2)])
		);
		assert_eq!(
			decode(b"l4:spami42ee").unwrap(),
			BValue::List(vec![BValue::string("spam"), BValue::from(42)])
		);
		assert_eq!(decode(b"le").unwrap(), BValue::list());
	}

	#[test]
	fn test_decode_nested_list() {
		assert_eq!(
			decode(b"l4:spaml3:eggi3eee").unwrap(),
			BValue::List(vec![
				BValue::string("spam"),
				BValue::List(vec![BValue::string("egg"), BValue::from(3)]),
			])
		);
	}

	#[test]
	fn test_decode_dict_keeps_stream_order() {
		let value = decode(b"d3:fool4:spami1ee3:bar4:eggse").unwrap();
		let expected = dict(vec![
			("foo", BValue::List(vec![BValue::string("spam"), BValue::from(1)])),
			("bar", BValue::string("eggs")),
		]);
		assert_eq!(value, expected);

		let keys: Vec<&[u8]> = value.as_dict().unwrap().keys().map(|k| k.as_ref()).collect();
		assert_eq!(keys, vec![b"foo".as_slice(), b"bar".as_slice()]);
	}

	#[test]
	fn test_decode_empty_dict() {
		assert_eq!(decode(b"de").unwrap(), BValue::dict());
	}

	#[test]
	fn test_decode_unclosed_containers() {
		assert_eq!(kind_of(b"l4:spam"), DecodeErrorKind::MissingTerminator("list"));
		assert_eq!(kind_of(b"d3:foo4:spam"), DecodeErrorKind::MissingTerminator("dictionary"));
		assert_eq!(kind_of(b"d"), DecodeErrorKind::MissingTerminator("dictionary"));
		// key with no value
		assert_eq!(kind_of(b"d3:fooe"), DecodeErrorKind::UnexpectedByte(b'e'));
		assert_eq!(kind_of(b"d3:foo"), DecodeErrorKind::UnexpectedEof);
	}

	#[test]
	fn test_decode_dict_key_not_string() {
		let err = decode(b"di42e4:spame").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::UnexpectedByte(b'i'));
		assert_eq!(err.offset, 1);
	}

	#[test]
	fn test_decode_duplicate_key() {
		let err = decode(b"d1:ai1e1:bi2e1:ai3ee").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::DuplicateKey(b"a".to_vec()));
		assert_eq!(err.offset, 13);
	}

	#[test]
	fn test_same_key_in_different_dicts_is_fine() {
		assert!(decode(b"ld1:ai1eed1:ai2eee").is_ok());
	}

	#[test]
	fn test_decode_unexpected_leading_byte() {
		assert_eq!(kind_of(b"x"), DecodeErrorKind::UnexpectedByte(b'x'));
		assert_eq!(kind_of(b"-1"), DecodeErrorKind::UnexpectedByte(b'-'));
		assert_eq!(kind_of(b"e"), DecodeErrorKind::UnexpectedByte(b'e'));
		assert_eq!(kind_of(b""), DecodeErrorKind::UnexpectedEof);
	}

	#[test]
	fn test_trailing_data() {
		let err = decode(b"i42eextra").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::TrailingData);
		assert_eq!(err.offset, 4);
		assert_eq!(kind_of(b"lee"), DecodeErrorKind::TrailingData);
	}

	#[test]
	fn test_decode_prefix_reports_consumed() {
		let (consumed, value) = decode_prefix(b"i42e4:spam").unwrap();
		assert_eq!(consumed, 4);
		assert_eq!(value, BValue::from(42));
	}

	#[test]
	fn test_nesting_limit() {
		let decoder = Decoder::new(DecodeOptions {
			max_depth: 2,
			..DecodeOptions::default()
		});
		assert!(decoder.decode(b"llee").is_ok());
		let err = decoder.decode(b"llleee").unwrap_err();
		assert_eq!(err.kind, DecodeErrorKind::NestingTooDeep);
		assert_eq!(err.offset, 2);
	}

	#[test]
	fn test_deep_input_does_not_overflow() {
		let mut input = vec![b'l'; 100_000];
		input.extend(std::iter::repeat(b'e').take(100_000));
		assert_eq!(kind_of(&input), DecodeErrorKind::NestingTooDeep);
	}

	#[test]
	fn test_utf8_keys_option() {
		let strict = Decoder::new(DecodeOptions {
			utf8_keys: true,
			..DecodeOptions::default()
		});
		assert!(strict.decode(b"d1:ai1ee").is_ok());
		assert_eq!(
			strict.decode(b"d1:\xffi1ee").unwrap_err().kind,
			DecodeErrorKind::InvalidKey
		);
		assert!(decode(b"d1:\xffi1ee").is_ok());
	}

	#[test]
	fn test_require_sorted_keys_option() {
		let strict = Decoder::new(DecodeOptions {
			require_sorted_keys: true,
			..DecodeOptions::default()
		});
		assert!(strict.decode(b"d1:ai1e1:bi2ee").is_ok());
		assert_eq!(
			strict.decode(b"d1:bi1e1:ai2ee").unwrap_err().kind,
			DecodeErrorKind::UnsortedKeys(b"a".to_vec())
		);
		assert!(decode(b"d1:bi1e1:ai2ee").is_ok());
	}
}
