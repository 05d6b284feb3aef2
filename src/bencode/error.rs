use std::fmt;
use thiserror::Error;

/// Failure while turning a native value into bencode.
#[derive(Debug, Error)]
pub enum EncodeError {
	#[error("Unsupported value kind: {0}")]
	Unsupported(&'static str),

	#[error("Duplicate dictionary key {}", show_key(.0))]
	DuplicateKey(Vec<u8>),

	#[error("Text is not valid UTF-8: {0}")]
	InvalidText(String),

	#[error("Write error {0}")]
	Io(#[from] std::io::Error),
}

/// What went wrong while parsing, without the position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
	#[error("unexpected end of input")]
	UnexpectedEof,

	#[error("invalid integer: {0}")]
	InvalidInteger(&'static str),

	#[error("invalid string length: {0}")]
	InvalidStringLength(&'static str),

	#[error("unexpected byte {}", show_byte(.0))]
	UnexpectedByte(u8),

	#[error("missing 'e' terminating {0}")]
	MissingTerminator(&'static str),

	#[error("duplicate dictionary key {}", show_key(.0))]
	DuplicateKey(Vec<u8>),

	#[error("dictionary key {} out of order", show_key(.0))]
	UnsortedKeys(Vec<u8>),

	#[error("dictionary key is not valid UTF-8")]
	InvalidKey,

	#[error("trailing data after value")]
	TrailingData,

	#[error("nesting too deep")]
	NestingTooDeep,
}

/// A parse failure and the byte offset it was detected at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Decode error at offset {offset}: {kind}")]
pub struct DecodeError {
	pub kind: DecodeErrorKind,
	pub offset: usize,
}

impl DecodeError {
	pub fn new(kind: DecodeErrorKind, offset: usize) -> Self {
		DecodeError { kind, offset }
	}
}

#[derive(Debug, Error)]
pub enum BencodeError {
	#[error(transparent)]
	Encode(#[from] EncodeError),

	#[error(transparent)]
	Decode(#[from] DecodeError),
}

// Keys are raw bytes; show them as text when they are, hex otherwise.
fn show_key(key: &[u8]) -> DisplayKey<'_> {
	DisplayKey(key)
}

fn show_byte(byte: &u8) -> DisplayByte {
	DisplayByte(*byte)
}

struct DisplayKey<'a>(&'a [u8]);

impl fmt::Display for DisplayKey<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match std::str::from_utf8(self.0) {
			Ok(s) => write!(f, "{:?}", s),
			Err(_) => write!(f, "0x{}", hex::encode(self.0)),
		}
	}
}

struct DisplayByte(u8);

impl fmt::Display for DisplayByte {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.0.is_ascii_graphic() {
			write!(f, "'{}'", self.0 as char)
		} else {
			write!(f, "0x{:02x}", self.0)
		}
	}
}
