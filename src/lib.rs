// lib.rs - Library interface for the bencode codec

pub mod bencode;
pub mod config;
pub mod engine;

// Re-export commonly used types for easier use
pub use bencode::{
    bvalue_to_json, decode, decode_prefix, encode, encode_bvalue, encode_to, BValue,
    BencodeError, DecodeError, DecodeErrorKind, DecodeOptions, Decoder, Dict, DictKey,
    EncodeError, Key, ToBencode,
};
