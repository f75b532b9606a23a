//! Byte stream primitives.
//!
//! Sequential, forward-only reads and writes over an in-memory buffer. All
//! multi-byte values are big-endian regardless of host order. Nothing here
//! interprets tag semantics; the codec is written in terms of these calls.

use byteorder::{BigEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// Write side of the stream, backed by a growable vector.
#[derive(Clone, Debug, Default)]
pub(crate) struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn put_i8(&mut self, v: i8) {
        self.buf.push(v as u8);
    }

    pub fn put_i16(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn put_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Length-prefixed UTF-8 string. The length byte is always written, so
    /// an empty string is a single zero byte.
    pub fn put_str(&mut self, v: &str) -> Result<()> {
        let len = v.len();
        if len > u8::MAX as usize {
            return Err(Error::LengthTooLong {
                max: u8::MAX as usize,
                actual: len,
            });
        }
        self.buf.push(len as u8);
        self.buf.extend_from_slice(v.as_bytes());
        Ok(())
    }

    /// Name-position string. An empty name writes nothing at all, not even
    /// the length byte; only the root tag's name may be empty.
    pub fn put_name(&mut self, v: &str) -> Result<()> {
        if v.is_empty() {
            return Ok(());
        }
        self.put_str(v)
    }
}

/// Read side of the stream, consuming a borrowed byte slice.
#[derive(Clone, Debug)]
pub(crate) struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Reader<'a> {
        Self { data }
    }

    pub fn remaining(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn read_u8(&mut self, step: &'static str) -> Result<u8> {
        self.data.read_u8().map_err(|_| Error::LengthTooShort {
            step,
            actual: 0,
            expected: 1,
        })
    }

    pub fn read_i8(&mut self, step: &'static str) -> Result<i8> {
        self.data.read_i8().map_err(|_| Error::LengthTooShort {
            step,
            actual: 0,
            expected: 1,
        })
    }

    pub fn read_i16(&mut self, step: &'static str) -> Result<i16> {
        let actual = self.data.len();
        self.data
            .read_i16::<BigEndian>()
            .map_err(|_| Error::LengthTooShort {
                step,
                actual,
                expected: 2,
            })
    }

    pub fn read_i32(&mut self, step: &'static str) -> Result<i32> {
        let actual = self.data.len();
        self.data
            .read_i32::<BigEndian>()
            .map_err(|_| Error::LengthTooShort {
                step,
                actual,
                expected: 4,
            })
    }

    pub fn read_i64(&mut self, step: &'static str) -> Result<i64> {
        let actual = self.data.len();
        self.data
            .read_i64::<BigEndian>()
            .map_err(|_| Error::LengthTooShort {
                step,
                actual,
                expected: 8,
            })
    }

    pub fn read_u16(&mut self, step: &'static str) -> Result<u16> {
        let actual = self.data.len();
        self.data
            .read_u16::<BigEndian>()
            .map_err(|_| Error::LengthTooShort {
                step,
                actual,
                expected: 2,
            })
    }

    pub fn read_u32(&mut self, step: &'static str) -> Result<u32> {
        let actual = self.data.len();
        self.data
            .read_u32::<BigEndian>()
            .map_err(|_| Error::LengthTooShort {
                step,
                actual,
                expected: 4,
            })
    }

    pub fn read_f32(&mut self, step: &'static str) -> Result<f32> {
        let actual = self.data.len();
        self.data
            .read_f32::<BigEndian>()
            .map_err(|_| Error::LengthTooShort {
                step,
                actual,
                expected: 4,
            })
    }

    pub fn read_f64(&mut self, step: &'static str) -> Result<f64> {
        let actual = self.data.len();
        self.data
            .read_f64::<BigEndian>()
            .map_err(|_| Error::LengthTooShort {
                step,
                actual,
                expected: 8,
            })
    }

    pub fn read_bytes(&mut self, len: usize, step: &'static str) -> Result<&'a [u8]> {
        if len > self.data.len() {
            return Err(Error::LengthTooShort {
                step,
                actual: self.data.len(),
                expected: len,
            });
        }
        let (bytes, data) = self.data.split_at(len);
        self.data = data;
        Ok(bytes)
    }

    pub fn read_str(&mut self, step: &'static str) -> Result<&'a str> {
        let len = self.read_u8(step)? as usize;
        let bytes = self.read_bytes(len, step)?;
        std::str::from_utf8(bytes).map_err(|e| Error::BadEncode(format!("{}", e)))
    }
}
