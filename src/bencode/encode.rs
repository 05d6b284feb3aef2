use std::collections::HashSet;
use std::fmt::Display;
use std::io::Write;

use log::trace;

use super::error::EncodeError;
use super::native::{DictKey, ToBencode};
use super::BValue;

/// Encode any supported value into a bencoded `Vec<u8>`.
///
/// Dictionaries are written in their iteration order; nothing is sorted.
///
/// ```
/// use rusbencode::encode;
///
/// assert_eq!(encode("ThisIsAString").unwrap(), b"13:ThisIsAString");
/// assert_eq!(encode(&42).unwrap(), b"i42e");
/// assert!(encode(&None::<i64>).is_err());
/// ```
pub fn encode<T: ToBencode + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
	let mut encoder = Encoder::new();
	encoder.emit(value)?;
	let out = encoder.into_bytes();
	trace!("encoded {} bytes", out.len());
	Ok(out)
}

/// Encode `value` and write the result to `writer`.
///
/// Nothing is written unless the whole value encodes.
pub fn encode_to<W, T>(value: &T, writer: &mut W) -> Result<(), EncodeError>
where
	W: Write,
	T: ToBencode + ?Sized,
{
	let out = encode(value)?;
	writer.write_all(&out)?;
	Ok(())
}

/// Encode an already-built `BValue`. Cannot fail: its dictionary keys are unique.
pub fn encode_bvalue(value: &BValue) -> Vec<u8> {
	let mut out: Vec<u8> = Vec::new();
	write_bvalue(value, &mut out);
	out
}

pub(crate) fn write_bvalue(value: &BValue, out: &mut Vec<u8>) {
	match value {
		BValue::Integer(i) => {
			out.push(b'i');
			out.extend_from_slice(i.to_string().as_bytes());
			out.push(b'e');
		}
		BValue::ByteString(bytes) => write_bytes(bytes, out),
		BValue::List(items) => {
			out.push(b'l');
			for item in items {
				write_bvalue(item, out);
			}
			out.push(b'e');
		}
		BValue::Dict(dict) => {
			out.push(b'd');
			for (key, val) in dict {
				write_bytes(key, out);
				write_bvalue(val, out);
			}
			out.push(b'e');
		}
	}
}

fn write_bytes(bytes: &[u8], out: &mut Vec<u8>) {
	out.extend_from_slice(bytes.len().to_string().as_bytes());
	out.push(b':');
	out.extend_from_slice(bytes);
}

/// Output buffer that native types write their productions into.
///
/// Implementations of [`ToBencode`] emit exactly one item per call.
#[derive(Debug, Default)]
pub struct Encoder {
	buf: Vec<u8>,
}

impl Encoder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn into_bytes(self) -> Vec<u8> {
		self.buf
	}

	/// Emit a nested value.
	pub fn emit<T: ToBencode + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
		value.encode_bencode(self)
	}

	/// Emit an integer from anything whose `Display` is a plain decimal.
	pub(crate) fn emit_int(&mut self, i: impl Display) {
		self.buf.push(b'i');
		self.buf.extend_from_slice(i.to_string().as_bytes());
		self.buf.push(b'e');
	}

	pub fn emit_bytes(&mut self, bytes: &[u8]) {
		write_bytes(bytes, &mut self.buf);
	}

	pub fn emit_str(&mut self, s: &str) {
		self.emit_bytes(s.as_bytes());
	}

	pub fn emit_bvalue(&mut self, value: &BValue) {
		write_bvalue(value, &mut self.buf);
	}

	pub fn emit_list<F>(&mut self, f: F) -> Result<(), EncodeError>
	where
		F: FnOnce(&mut Encoder) -> Result<(), EncodeError>,
	{
		self.buf.push(b'l');
		f(self)?;
		self.buf.push(b'e');
		Ok(())
	}

	/// Emit a dictionary. Pairs go out in the order `emit_pair` is called.
	pub fn emit_dict<F>(&mut self, f: F) -> Result<(), EncodeError>
	where
		F: FnOnce(&mut DictEncoder<'_>) -> Result<(), EncodeError>,
	{
		self.buf.push(b'd');
		{
			let mut dict = DictEncoder {
				encoder: self,
				seen: HashSet::new(),
			};
			f(&mut dict)?;
		}
		self.buf.push(b'e');
		Ok(())
	}
}

/// Writes the pairs of one dictionary, rejecting keys already written.
pub struct DictEncoder<'a> {
	encoder: &'a mut Encoder,
	seen: HashSet<Vec<u8>>,
}

impl DictEncoder<'_> {
	pub fn emit_pair<K, V>(&mut self, key: &K, value: &V) -> Result<(), EncodeError>
	where
		K: DictKey + ?Sized,
		V: ToBencode + ?Sized,
	{
		let key = key.key_bytes()?;
		if !self.seen.insert(key.to_vec()) {
			return Err(EncodeError::DuplicateKey(key.into_owned()));
		}
		self.encoder.emit_bytes(&key);
		self.encoder.emit(value)
	}
}
