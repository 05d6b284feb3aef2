use num_bigint::BigInt;
use serde_json::{json, Number, Value};

use super::encode::Encoder;
use super::error::EncodeError;
use super::native::ToBencode;
use super::BValue;

/// Prefix marking a JSON object key that holds hex-encoded key bytes.
pub const HEX_KEY_PREFIX: &str = "_bytes_hex:";

/// Convert a `BValue` into JSON (using Serde JSON `Value`).
///
/// - `Integer(i)` => JSON number of any size
/// - `ByteString(bytes)` => Attempt UTF-8; if invalid, store hex in `"_bytes_hex"`.
/// - `List(...)` => JSON array
/// - `Dict(...)` => JSON object, keys in dictionary order (see [`json_key`])
pub fn bvalue_to_json(bv: &BValue) -> Value {
	match bv {
		BValue::Integer(i) => {
			if let Some(n) = bv.as_i64() {
				json!(n)
			} else if let Ok(n) = u64::try_from(i) {
				json!(n)
			} else {
				match i.to_string().parse::<Number>() {
					Ok(n) => Value::Number(n),
					Err(_) => Value::String(i.to_string()),
				}
			}
		}

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

/// Object key for dictionary key `key`.
///
/// UTF-8 keys are used as they are. Keys that are not UTF-8, or that already
/// start with [`HEX_KEY_PREFIX`], become the prefix followed by their hex, so
/// distinct keys stay distinct.
pub fn json_key(key: &[u8]) -> String {
	match std::str::from_utf8(key) {
		Ok(s) if !s.starts_with(HEX_KEY_PREFIX) => s.to_string(),
		_ => format!("{}{}", HEX_KEY_PREFIX, hex::encode(key)),
	}
}

/// JSON documents encode with object keys in document order.
/// `null` and non-integral numbers have no bencode form.
impl ToBencode for Value {
	fn encode_bencode(&self, encoder: &mut Encoder) -> Result<(), EncodeError> {
		match self {
			Value::Null => Err(EncodeError::Unsupported("null")),
			Value::Bool(b) => b.encode_bencode(encoder),
			Value::Number(n) => {
				if let Some(i) = n.as_i64() {
					i.encode_bencode(encoder)
				} else if let Some(u) = n.as_u64() {
					u.encode_bencode(encoder)
				} else {
					// integers past 64 bits keep their digits
					match n.to_string().parse::<BigInt>() {
						Ok(big) => big.encode_bencode(encoder),
						Err(_) => Err(EncodeError::Unsupported("float")),
					}
				}
			}
			Value::String(s) => s.encode_bencode(encoder),
			Value::Array(items) => items.encode_bencode(encoder),
			Value::Object(map) => encoder.emit_dict(|d| {
				for (k, v) in map {
					d.emit_pair(k, v)?;
				}
				Ok(())
			}),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::bencode::{decode, encode};

	#[test]
	fn test_bvalue_to_json() {
		let value = decode(b"d3:fool4:spami1ee3:bar4:eggse").unwrap();
		let json = bvalue_to_json(&value);
		assert_eq!(json, json!({"foo": ["spam", 1], "bar": "eggs"}));
		assert_eq!(serde_json::to_string(&json).unwrap(), r#"{"foo":["spam",1],"bar":"eggs"}"#);
	}

	#[test]
	fn test_binary_bytes_become_hex() {
		let json = bvalue_to_json(&BValue::bytes(vec![0xde, 0xad, 0xbe, 0xef]));
		assert_eq!(json, json!({"_bytes_hex": "deadbeef"}));
	}

	#[test]
	fn test_big_integer_stays_a_number() {
		let value = decode(b"d1:ai100000000000000000000ee").unwrap();
		let json = bvalue_to_json(&value);
		assert!(json["a"].is_number());
		assert_eq!(serde_json::to_string(&json).unwrap(), r#"{"a":100000000000000000000}"#);
		assert_eq!(bvalue_to_json(&BValue::from(u64::MAX)), json!(u64::MAX));

		// and encodes back as the same integer
		assert_eq!(encode(&json).unwrap(), b"d1:ai100000000000000000000ee".to_vec());

		let negative = decode(b"i-100000000000000000000e").unwrap();
		assert_eq!(encode(&bvalue_to_json(&negative)).unwrap(), b"i-100000000000000000000e".to_vec());
	}

	#[test]
	fn test_binary_keys_are_kept_apart() {
		let value = decode(b"d1:\xffi1e1:\xfei2ee").unwrap();
		let json = bvalue_to_json(&value);
		let object = json.as_object().unwrap();
		assert_eq!(object.len(), 2);
		assert_eq!(object["_bytes_hex:ff"], json!(1));
		assert_eq!(object["_bytes_hex:fe"], json!(2));
	}

	#[test]
	fn test_prefixed_text_key_does_not_collide() {
		let value = decode(b"d13:_bytes_hex:ffi1e1:\xffi2ee").unwrap();
		let object = bvalue_to_json(&value).as_object().unwrap().clone();
		assert_eq!(object.len(), 2);
		assert_eq!(json_key(b"plain"), "plain");
		assert_eq!(json_key(b"_bytes_hex:ff"), "_bytes_hex:5f62797465735f6865783a6666");
	}

	#[test]
	fn test_encode_json_document() {
		let doc = json!({
			"_id": "5973782bdb9a930533b05cb2",
			"isActive": true,
			"age": 32,
			"friends": [
				{"id": 0, "name": "Colon Salazar"},
				{"id": 1, "name": "French Mcneil"}
			]
		});
		let encoded = encode(&doc).unwrap();
		assert_eq!(
			encoded,
			b"d3:_id24:5973782bdb9a930533b05cb28:isActivei1e3:agei32e7:friendsld2:idi0e4:name13:Colon Salazared2:idi1e4:name13:French Mcneilee"
				.to_vec()
		);
	}

	#[test]
	fn test_encode_json_unsupported() {
		assert!(matches!(encode(&json!(null)), Err(EncodeError::Unsupported("null"))));
		assert!(matches!(encode(&json!([1, 2.5])), Err(EncodeError::Unsupported("float"))));
		assert!(matches!(encode(&json!({"a": null})), Err(EncodeError::Unsupported("null"))));
	}
}
