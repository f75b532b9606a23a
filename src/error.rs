use std::fmt;

use serde::{de, ser};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// Occurs when the first byte of a decoded buffer is not the format magic.
    BadMagic(u8),
    /// Occurs when the version byte is not one this library understands.
    BadVersion(u8),
    /// Occurs when a byte in tag-id position does not map to any known tag.
    UnknownTagId(u8),
    /// Occurs when decoded content violates the format in some other way:
    /// malformed UTF-8, duplicate compound keys, or a value that cannot be
    /// represented on the wire at all.
    BadEncode(String),
    /// Occurs when the nesting depth limit is reached while further descent
    /// into a list or compound is still required.
    DepthExceeded,
    /// Data ended too early, or a declared count cannot fit in what remains.
    LengthTooShort {
        step: &'static str,
        actual: usize,
        expected: usize,
    },
    /// A length-prefixed item was larger than its prefix can express.
    LengthTooLong { max: usize, actual: usize },
    /// An element of a structure-cached list did not match the field schema
    /// derived from the list's first element.
    SchemaMismatch(String),
    /// Occurs when zstd compression of an encoded payload fails.
    FailCompress(String),
    /// Occurs when zstd decompression of a wrapped payload fails.
    FailDecompress(String),
    /// Occurs when serde serialization or deserialization fails.
    SerdeFail(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::BadMagic(byte) => {
                write!(f, "Bad magic byte: expected 0x42, got 0x{:02x}", byte)
            }
            Error::BadVersion(version) => write!(f, "Unsupported format version: {}", version),
            Error::UnknownTagId(id) => write!(f, "Unknown tag id: {}", id),
            Error::BadEncode(ref err) => write!(f, "Basic data encoding failure: {}", err),
            Error::DepthExceeded => f.write_str("Nesting depth limit exceeded"),
            Error::LengthTooShort {
                step,
                actual,
                expected,
            } => write!(
                f,
                "Expected data length {}, but got {} on step [{}]",
                expected, actual, step
            ),
            Error::LengthTooLong { max, actual } => write!(
                f,
                "Data too long: was {} bytes, maximum allowed is {}",
                actual, max
            ),
            Error::SchemaMismatch(ref err) => {
                write!(f, "List element does not match cached schema: {}", err)
            }
            Error::FailCompress(ref err) => write!(f, "Failed compression step: {}", err),
            Error::FailDecompress(ref err) => write!(f, "Failed decompression step: {}", err),
            Error::SerdeFail(ref msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {}

impl ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::SerdeFail(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::SerdeFail(msg.to_string())
    }
}
