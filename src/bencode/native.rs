//! Mapping of Rust types onto the four bencode kinds.
//!
//! | Rust | Bencode |
//! |------|---------|
//! | integers, `BigInt`, `bool` | integer (`bool` as 0/1) |
//! | `str`, `String`, `OsStr`, `Path` | byte string (UTF-8) |
//! | `Bytes`, `BytesMut`, `serde_bytes::{Bytes, ByteBuf}` | byte string (raw) |
//! | slices, `Vec<T>`, arrays, tuples | list |
//! | `IndexMap`, `BTreeMap`, `HashMap` | dictionary |
//!
//! `Vec<u8>` is a sequence like any other and encodes as a list of integers;
//! wrap raw bytes in `Bytes` or `serde_bytes::ByteBuf` to get a byte string.
//! Floats, `()` and `None` have no bencode form and fail with
//! [`EncodeError::Unsupported`].

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::ffi::{OsStr, OsString};
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use indexmap::IndexMap;
use num_bigint::BigInt;

use super::encode::Encoder;
use super::error::EncodeError;
use super::BValue;

/// A value that can be written as exactly one bencode item.
pub trait ToBencode {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError>;
}

/// A value usable as a dictionary key. Keys are compared by these bytes.
pub trait DictKey {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError>;
}

/// Dictionary key given either as text or as raw bytes.
///
/// `Key::Text("k")` and `Key::Bytes(b"k")` are distinct map entries but the
/// same bencode key, so a map holding both fails to encode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
	Text(String),
	Bytes(Vec<u8>),
}

impl From<&str> for Key {
	fn from(s: &str) -> Self {
		Key::Text(s.to_string())
	}
}

impl From<String> for Key {
	fn from(s: String) -> Self {
		Key::Text(s)
	}
}

impl From<&[u8]> for Key {
	fn from(b: &[u8]) -> Self {
		Key::Bytes(b.to_vec())
	}
}

impl From<Vec<u8>> for Key {
	fn from(b: Vec<u8>) -> Self {
		Key::Bytes(b)
	}
}

fn os_str_utf8(s: &OsStr) -> Result<&str, EncodeError> {
	s.to_str()
		.ok_or_else(|| EncodeError::InvalidText(s.to_string_lossy().into_owned()))
}

// ---- keys ----

impl DictKey for str {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		Ok(Cow::Borrowed(self.as_bytes()))
	}
}

impl DictKey for String {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		Ok(Cow::Borrowed(self.as_bytes()))
	}
}

impl DictKey for [u8] {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		Ok(Cow::Borrowed(self))
	}
}

impl DictKey for Vec<u8> {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		Ok(Cow::Borrowed(self))
	}
}

impl DictKey for Bytes {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		Ok(Cow::Borrowed(self))
	}
}

impl DictKey for serde_bytes::ByteBuf {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		Ok(Cow::Borrowed(self))
	}
}

impl DictKey for OsStr {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		Ok(Cow::Borrowed(os_str_utf8(self)?.as_bytes()))
	}
}

impl DictKey for OsString {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		self.as_os_str().key_bytes()
	}
}

impl DictKey for Path {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		self.as_os_str().key_bytes()
	}
}

impl DictKey for PathBuf {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		self.as_os_str().key_bytes()
	}
}

impl DictKey for Key {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		match self {
			Key::Text(s) => Ok(Cow::Borrowed(s.as_bytes())),
			Key::Bytes(b) => Ok(Cow::Borrowed(b)),
		}
	}
}

impl<K: DictKey + ?Sized> DictKey for &K {
	fn key_bytes(&self) -> Result<Cow<'_, [u8]>, EncodeError> {
		(**self).key_bytes()
	}
}

// ---- scalars ----

impl ToBencode for BValue {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_bvalue(self);
		Ok(())
	}
}

macro_rules! impl_int {
	($($t:ty),*) => {
		$(
			impl ToBencode for $t {
				fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
					encoder.emit_int(self);
					Ok(())
				}
			}
		)*
	};
}

impl_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, BigInt);

impl ToBencode for bool {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_int(*self as u8);
		Ok(())
	}
}

macro_rules! impl_unsupported {
	($($t:ty => $name:expr),*) => {
		$(
			impl ToBencode for $t {
				fn encode_bencode(&self, _encoder: &mut Encoder) -> Result<(), EncodeError> {
					Err(EncodeError::Unsupported($name))
				}
			}
		)*
	};
}

impl_unsupported!(f32 => "float", f64 => "float", () => "unit");

impl<T: ToBencode> ToBencode for Option<T> {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		match self {
			Some(v) => v.encode_bencode(encoder),
			None => Err(EncodeError::Unsupported("none")),
		}
	}
}

impl ToBencode for str {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_str(self);
		Ok(())
	}
}

impl ToBencode for String {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_str(self);
		Ok(())
	}
}

impl ToBencode for OsStr {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_str(os_str_utf8(self)?);
		Ok(())
	}
}

impl ToBencode for OsString {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		self.as_os_str().encode_bencode(encoder)
	}
}

impl ToBencode for Path {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		self.as_os_str().encode_bencode(encoder)
	}
}

impl ToBencode for PathBuf {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		self.as_os_str().encode_bencode(encoder)
	}
}

impl ToBencode for Bytes {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_bytes(self);
		Ok(())
	}
}

impl ToBencode for BytesMut {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_bytes(self);
		Ok(())
	}
}

impl ToBencode for serde_bytes::Bytes {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_bytes(self);
		Ok(())
	}
}

impl ToBencode for serde_bytes::ByteBuf {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_bytes(self);
		Ok(())
	}
}

// ---- wrappers ----

impl<T: ToBencode + ?Sized> ToBencode for &T {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		(**self).encode_bencode(encoder)
	}
}

impl<T: ToBencode + ?Sized> ToBencode for Box<T> {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		(**self).encode_bencode(encoder)
	}
}

// ---- sequences ----

/// Every slice is a list, `[u8]` included. Byte literals need a byte-string
/// wrapper:
///
/// ```
/// use rusbencode::{encode, BValue};
///
/// assert_eq!(encode(b"abc").unwrap(), b"li97ei98ei99ee");
/// assert_eq!(encode(&BValue::from(&b"abc"[..])).unwrap(), b"3:abc");
/// assert_eq!(encode(&bytes::Bytes::from_static(b"abc")).unwrap(), b"3:abc");
/// ```
impl<T: ToBencode> ToBencode for [T] {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_list(|e| {
			for item in self {
				e.emit(item)?;
			}
			Ok(())
		})
	}
}

impl<T: ToBencode> ToBencode for Vec<T> {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		self.as_slice().encode_bencode(encoder)
	}
}

impl<T: ToBencode, const N: usize> ToBencode for [T; N] {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		self.as_slice().encode_bencode(encoder)
	}
}

macro_rules! impl_tuple {
	($($name:ident),+) => {
		impl<$($name: ToBencode),+> ToBencode for ($($name,)+) {
			#[allow(non_snake_case)]
			fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
				let ($($name,)+) = self;
				encoder.emit_list(|e| {
					$(e.emit($name)?;)+
					Ok(())
				})
			}
		}
	};
}

impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
impl_tuple!(A, B, C, D, E);

// ---- maps ----

impl<K: DictKey, V: ToBencode, S> ToBencode for IndexMap<K, V, S> {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_dict(|d| {
			for (k, v) in self {
				d.emit_pair(k, v)?;
			}
			Ok(())
		})
	}
}

impl<K: DictKey, V: ToBencode> ToBencode for BTreeMap<K, V> {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		encoder.emit_dict(|d| {
			for (k, v) in self {
				d.emit_pair(k, v)?;
			}
			Ok(())
		})
	}
}

/// A `HashMap` has no order to preserve; pairs are written sorted by key bytes
/// so the output does not depend on the hasher.
impl<K: DictKey, V: ToBencode, S: BuildHasher> ToBencode for HashMap<K, V, S> {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		let mut pairs = Vec::with_capacity(self.len());
		for (k, v) in self {
			pairs.push((k.key_bytes()?, v));
		}
		pairs.sort_by(|a, b| a.0.cmp(&b.0));

		encoder.emit_dict(|d| {
			for (k, v) in &pairs {
				d.emit_pair(&**k, *v)?;
			}
			Ok(())
		})
	}
}
