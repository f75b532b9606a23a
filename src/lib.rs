//! boxdata is a compact binary encoding for trees of named, typed tags. It
//! aims to hold structured data - game saves, record batches, config blobs -
//! in as few bytes as a schemaless format reasonably can, while staying
//! strict enough that every buffer has exactly one meaning.
//!
//! The format provides:
//!
//! - A canonical form for all data. Compound members are sorted by key, so a
//!   given tree always encodes to the same bytes
//! - Thirteen tag types: signed integers of four widths, two float widths,
//!   strings, raw byte/int/long arrays, homogeneous lists, and compounds
//! - A structure cache for lists of same-shaped compounds, writing the field
//!   layout once instead of once per element
//! - Optional zstd compression as an outer stage, recognized on decode by
//!   the zstd frame magic
//! - A serde serializer and deserializer, so plain Rust types can travel
//!   through the format without hand-building trees
//!
//! Trees can be built and inspected directly:
//!
//! ```
//! use boxdata::{decode, encode, Tag};
//! use std::collections::BTreeMap;
//!
//! let mut map = BTreeMap::new();
//! map.insert("name".to_string(), Tag::String("Alice".to_string()));
//! map.insert("age".to_string(), Tag::Byte(16));
//! let tag = Tag::Compound(map);
//!
//! let bytes = encode(&tag)?;
//! assert_eq!(decode(&bytes)?, tag);
//! assert_eq!(tag["name"].as_str(), Some("Alice"));
//! # Ok::<(), boxdata::Error>(())
//! ```
//!
//! Or handled through serde:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u8,
//! }
//!
//! let alice = Person { name: "Alice".to_string(), age: 16 };
//! let bytes = boxdata::to_vec(&alice)?;
//! let back: Person = boxdata::from_slice(&bytes)?;
//! assert_eq!(back, alice);
//! # Ok::<(), boxdata::Error>(())
//! ```

mod compress;
mod de;
mod decode;
mod depth;
mod encode;
mod error;
mod schema;
mod ser;
mod stream;
mod tag;
mod tag_id;

pub use self::compress::{compress, decompress, is_compressed};
pub use self::de::{from_slice, from_slice_with, from_tag};
pub use self::decode::{decode, decode_with, DecodeOptions};
pub use self::encode::{encode, encode_with, EncodeOptions};
pub use self::error::{Error, Result};
pub use self::ser::{to_tag, to_vec, to_vec_with};
pub use self::tag::Tag;
pub use self::tag_id::TagId;

/// First byte of every uncompressed buffer.
pub const MAGIC: u8 = b'B';

/// Format version carried in the second byte.
pub const VERSION: u8 = 1;

/// Default nesting depth limit for both encoding and decoding.
pub const MAX_DEPTH: u32 = 512;
