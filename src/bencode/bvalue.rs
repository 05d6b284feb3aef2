use bytes::Bytes;
use indexmap::IndexMap;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// Dictionary body. Iteration follows insertion order, not key order.
pub type Dict = IndexMap<Bytes, BValue>;

/// A bencode value.
///
/// Exactly four kinds exist on the wire. Dictionaries keep the order their
/// keys were inserted (or decoded) in, and equality takes that order into
/// account.
///
/// ```
/// use rusbencode::BValue;
///
/// let int: BValue = 42i64.into();
/// let text: BValue = "hello".into();
///
/// assert_eq!(int.as_i64(), Some(42));
/// assert_eq!(text.as_str(), Some("hello"));
/// ```
#[derive(Debug, Clone)]
pub enum BValue {
	Integer(BigInt),
	ByteString(Bytes), // raw bytes for any string
	List(Vec<BValue>),
	Dict(Dict),
}

/// Discriminant of a [`BValue`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
	Integer,
	ByteString,
	List,
	Dict,
}

impl Kind {
	pub fn name(self) -> &'static str {
		match self {
			Kind::Integer => "integer",
			Kind::ByteString => "byte string",
			Kind::List => "list",
			Kind::Dict => "dictionary",
		}
	}
}

impl BValue {
	/// Byte string holding the UTF-8 bytes of `s`.
	pub fn string(s: &str) -> Self {
		BValue::ByteString(Bytes::copy_from_slice(s.as_bytes()))
	}

	pub fn bytes(b: impl Into<Bytes>) -> Self {
		BValue::ByteString(b.into())
	}

	pub fn int(i: impl Into<BigInt>) -> Self {
		BValue::Integer(i.into())
	}

	/// Empty list.
	pub fn list() -> Self {
		BValue::List(Vec::new())
	}

	/// Empty dictionary.
	pub fn dict() -> Self {
		BValue::Dict(Dict::new())
	}

	pub fn kind(&self) -> Kind {
		match self {
			BValue::Integer(_) => Kind::Integer,
			BValue::ByteString(_) => Kind::ByteString,
			BValue::List(_) => Kind::List,
			BValue::Dict(_) => Kind::Dict,
		}
	}

	pub fn as_integer(&self) -> Option<&BigInt> {
		match self {
			BValue::Integer(i) => Some(i),
			_ => None,
		}
	}

	/// Returns the integer if it is one and fits in an `i64`.
	pub fn as_i64(&self) -> Option<i64> {
		self.as_integer()?.to_i64()
	}

	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			BValue::ByteString(b) => Some(b),
			_ => None,
		}
	}

	/// Returns the byte string as text, if it is one and holds valid UTF-8.
	pub fn as_str(&self) -> Option<&str> {
		std::str::from_utf8(self.as_bytes()?).ok()
	}

	pub fn as_list(&self) -> Option<&Vec<BValue>> {
		match self {
			BValue::List(l) => Some(l),
			_ => None,
		}
	}

	pub fn as_dict(&self) -> Option<&Dict> {
		match self {
			BValue::Dict(d) => Some(d),
			_ => None,
		}
	}

	pub fn into_list(self) -> Option<Vec<BValue>> {
		match self {
			BValue::List(l) => Some(l),
			_ => None,
		}
	}

	pub fn into_dict(self) -> Option<Dict> {
		match self {
			BValue::Dict(d) => Some(d),
			_ => None,
		}
	}

	/// Looks up `key` if this value is a dictionary.
	///
	/// ```
	/// use rusbencode::decode;
	///
	/// let value = decode(b"d3:foo3:bare").unwrap();
	/// assert_eq!(value.get(b"foo").and_then(|v| v.as_str()), Some("bar"));
	/// assert!(value.get(b"missing").is_none());
	/// ```
	pub fn get(&self, key: &[u8]) -> Option<&BValue> {
		self.as_dict()?.get(key)
	}

	/// Sorts every dictionary in the tree by raw key bytes, in place.
	pub fn sort_keys(&mut self) {
		match self {
			BValue::List(items) => items.iter_mut().for_each(BValue::sort_keys),
			BValue::Dict(map) => {
				map.values_mut().for_each(BValue::sort_keys);
				map.sort_keys();
			}
			BValue::Integer(_) | BValue::ByteString(_) => {}
		}
	}

	/// Copy of this tree in canonical (sorted-key) form.
	pub fn to_canonical(&self) -> BValue {
		let mut copy = self.clone();
		copy.sort_keys();
		copy
	}

	/// True when every nested dictionary already has strictly ascending keys.
	pub fn is_canonical(&self) -> bool {
		match self {
			BValue::List(items) => items.iter().all(BValue::is_canonical),
			BValue::Dict(map) => {
				let ordered = map
					.keys()
					.zip(map.keys().skip(1))
					.all(|(a, b)| a < b);
				ordered && map.values().all(BValue::is_canonical)
			}
			BValue::Integer(_) | BValue::ByteString(_) => true,
		}
	}
}

// IndexMap equality ignores order; dictionaries here are ordered, so compare pairwise.
impl PartialEq for BValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(BValue::Integer(a), BValue::Integer(b)) => a == b,
			(BValue::ByteString(a), BValue::ByteString(b)) => a == b,
			(BValue::List(a), BValue::List(b)) => a == b,
			(BValue::Dict(a), BValue::Dict(b)) => a.len() == b.len() && a.iter().eq(b.iter()),
			_ => false,
		}
	}
}

impl Eq for BValue {}

macro_rules! from_int {
	($($t:ty),*) => {
		$(
			impl From<$t> for BValue {
				fn from(i: $t) -> Self {
					BValue::Integer(BigInt::from(i))
				}
			}
		)*
	};
}

from_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl From<bool> for BValue {
	fn from(b: bool) -> Self {
		BValue::Integer(BigInt::from(b as u8))
	}
}

impl From<BigInt> for BValue {
	fn from(i: BigInt) -> Self {
		BValue::Integer(i)
	}
}

impl From<&str> for BValue {
	fn from(s: &str) -> Self {
		BValue::string(s)
	}
}

impl From<String> for BValue {
	fn from(s: String) -> Self {
		BValue::ByteString(Bytes::from(s.into_bytes()))
	}
}

impl From<&[u8]> for BValue {
	fn from(b: &[u8]) -> Self {
		BValue::ByteString(Bytes::copy_from_slice(b))
	}
}

impl From<Vec<u8>> for BValue {
	fn from(b: Vec<u8>) -> Self {
		BValue::ByteString(Bytes::from(b))
	}
}

impl From<Bytes> for BValue {
	fn from(b: Bytes) -> Self {
		BValue::ByteString(b)
	}
}

impl From<Vec<BValue>> for BValue {
	fn from(l: Vec<BValue>) -> Self {
		BValue::List(l)
	}
}

impl From<Dict> for BValue {
	fn from(d: Dict) -> Self {
		BValue::Dict(d)
	}
}
