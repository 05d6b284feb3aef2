//! Bencode encoding and decoding ([BEP-3]).
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! Integers are unbounded. Dictionaries keep the order they were built or
//! decoded in; nothing is sorted unless asked for with [`BValue::sort_keys`]
//! or [`DecodeOptions::require_sorted_keys`].
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

pub mod bvalue;
pub mod decode;
pub mod encode;
pub mod error;
pub mod json;
pub mod native;

pub use bvalue::{BValue, Dict, Kind};   // re-export
pub use decode::{decode, decode_prefix, DecodeOptions, Decoder, DEFAULT_MAX_DEPTH};   // re-export
pub use encode::{encode, encode_bvalue, encode_to, DictEncoder, Encoder};   // re-export
pub use error::{BencodeError, DecodeError, DecodeErrorKind, EncodeError};
pub use json::{bvalue_to_json, json_key};
pub use native::{DictKey, Key, ToBencode};
