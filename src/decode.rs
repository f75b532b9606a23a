//! Tag tree decoding.

use std::collections::BTreeMap;

use crate::compress;
use crate::depth::descend;
use crate::error::{Error, Result};
use crate::schema::{FixCompoundSchema, SchemaField};
use crate::stream::Reader;
use crate::tag::Tag;
use crate::tag_id::TagId;
use crate::{MAGIC, MAX_DEPTH, VERSION};

/// Knobs for one decode call.
///
/// `structure_cache` must match the setting the buffer was encoded with;
/// the wire carries no flag for it.
#[derive(Clone, Debug)]
pub struct DecodeOptions {
    pub max_depth: u32,
    pub structure_cache: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            structure_cache: true,
        }
    }
}

/// Decode a buffer with the default options: depth limit 512, structure
/// cache on.
pub fn decode(buf: &[u8]) -> Result<Tag> {
    decode_with(buf, &DecodeOptions::default())
}

/// Decode a buffer into a tag tree. A zstd-compressed buffer is recognized
/// by its frame magic and decompressed first.
///
/// # Errors
///
/// Fails on a bad magic or version byte, unrecognized tag ids, malformed
/// UTF-8, duplicate compound keys, element counts that outrun the buffer,
/// nesting deeper than `max_depth`, and trailing bytes after the root tag.
pub fn decode_with(buf: &[u8], opts: &DecodeOptions) -> Result<Tag> {
    if compress::is_compressed(buf) {
        let plain = compress::decompress(buf)?;
        return decode_envelope(&plain, opts);
    }
    decode_envelope(buf, opts)
}

fn decode_envelope(buf: &[u8], opts: &DecodeOptions) -> Result<Tag> {
    let mut r = Reader::new(buf);
    let magic = r.read_u8("magic byte")?;
    if magic != MAGIC {
        return Err(Error::BadMagic(magic));
    }
    let version = r.read_u8("version byte")?;
    if version != VERSION {
        return Err(Error::BadVersion(version));
    }
    let id_byte = r.read_u8("root tag id")?;
    let id = TagId::from_u8(id_byte).ok_or(Error::UnknownTagId(id_byte))?;
    // The root tag's name is always empty and occupies no bytes.
    let tag = read_value(&mut r, id, opts.max_depth, opts.structure_cache)?;
    if !r.is_empty() {
        return Err(Error::BadEncode(format!(
            "{} trailing bytes after the root tag",
            r.remaining()
        )));
    }
    Ok(tag)
}

fn read_value(r: &mut Reader, id: TagId, depth: u32, cache: bool) -> Result<Tag> {
    Ok(match id {
        TagId::End => Tag::End,
        TagId::Byte => Tag::Byte(r.read_i8("Byte value")?),
        TagId::Short => Tag::Short(r.read_i16("Short value")?),
        TagId::Int => Tag::Int(r.read_i32("Int value")?),
        TagId::Long => Tag::Long(r.read_i64("Long value")?),
        TagId::Float => Tag::Float(r.read_f32("Float value")?),
        TagId::Double => Tag::Double(r.read_f64("Double value")?),
        TagId::ByteArray => {
            let count = read_count(r, 1, "ByteArray count")?;
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(r.read_i8("ByteArray element")?);
            }
            Tag::ByteArray(v)
        }
        TagId::String => Tag::String(r.read_str("String value")?.to_string()),
        TagId::List => read_list(r, depth, cache)?,
        TagId::Compound => read_compound(r, depth, cache)?,
        TagId::IntArray => {
            let count = read_count(r, 4, "IntArray count")?;
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(r.read_i32("IntArray element")?);
            }
            Tag::IntArray(v)
        }
        TagId::LongArray => {
            let count = read_count(r, 8, "LongArray count")?;
            let mut v = Vec::with_capacity(count);
            for _ in 0..count {
                v.push(r.read_i64("LongArray element")?);
            }
            Tag::LongArray(v)
        }
    })
}

/// Read a 4-byte element count and refuse it unless the buffer still holds
/// at least `count * elem_size` bytes. Keeps a forged count from driving a
/// huge allocation.
fn read_count(r: &mut Reader, elem_size: usize, step: &'static str) -> Result<usize> {
    let count = r.read_u32(step)? as usize;
    if elem_size > 0 && count > r.remaining() / elem_size {
        return Err(Error::LengthTooShort {
            step,
            actual: r.remaining(),
            expected: count.saturating_mul(elem_size),
        });
    }
    Ok(count)
}

fn read_list(r: &mut Reader, depth: u32, cache: bool) -> Result<Tag> {
    let depth = descend(depth)?;
    let count = r.read_u32("List count")? as usize;
    if count == 0 {
        return Ok(Tag::List(Vec::new()));
    }
    let id_byte = r.read_u8("List element id")?;
    let id = TagId::from_u8(id_byte).ok_or(Error::UnknownTagId(id_byte))?;
    if id == TagId::End {
        return Err(Error::BadEncode(
            "a list of End tags cannot be decoded".to_string(),
        ));
    }
    if cache && id == TagId::Compound {
        let schema = FixCompoundSchema::read(r, depth)?;
        let elem_size = schema.min_wire_size();
        if elem_size == 0 {
            return Err(Error::BadEncode(
                "structure-cached elements with no wire footprint".to_string(),
            ));
        }
        if count > r.remaining() / elem_size {
            return Err(Error::LengthTooShort {
                step: "cached list elements",
                actual: r.remaining(),
                expected: count.saturating_mul(elem_size),
            });
        }
        let mut elems = Vec::with_capacity(count);
        for _ in 0..count {
            elems.push(Tag::Compound(read_cached_values(r, &schema, depth, cache)?));
        }
        return Ok(Tag::List(elems));
    }
    // Every non-End element occupies at least one byte.
    if count > r.remaining() {
        return Err(Error::LengthTooShort {
            step: "List elements",
            actual: r.remaining(),
            expected: count,
        });
    }
    let mut elems = Vec::with_capacity(count);
    for _ in 0..count {
        elems.push(read_value(r, id, depth, cache)?);
    }
    Ok(Tag::List(elems))
}

/// Value-only body of one structure-cached element, walked in schema order.
/// Schema keys are unique, so the rebuilt map cannot collide.
fn read_cached_values(
    r: &mut Reader,
    schema: &FixCompoundSchema,
    depth: u32,
    cache: bool,
) -> Result<BTreeMap<String, Tag>> {
    let depth = descend(depth)?;
    let mut map = BTreeMap::new();
    for (key, field) in &schema.fields {
        let value = match field {
            SchemaField::Plain(id) => read_value(r, *id, depth, cache)?,
            SchemaField::Compound(nested) => {
                Tag::Compound(read_cached_values(r, nested, depth, cache)?)
            }
        };
        map.insert(key.clone(), value);
    }
    Ok(map)
}

fn read_compound(r: &mut Reader, depth: u32, cache: bool) -> Result<Tag> {
    let depth = descend(depth)?;
    let mut map = BTreeMap::new();
    loop {
        let id_byte = r.read_u8("compound member id")?;
        let id = TagId::from_u8(id_byte).ok_or(Error::UnknownTagId(id_byte))?;
        if id == TagId::End {
            break;
        }
        let name = r.read_str("compound member name")?;
        if name.is_empty() {
            return Err(Error::BadEncode(
                "empty compound key cannot be decoded".to_string(),
            ));
        }
        let value = read_value(r, id, depth, cache)?;
        if map.insert(name.to_string(), value).is_some() {
            return Err(Error::BadEncode(format!("duplicate compound key: {}", name)));
        }
    }
    Ok(Tag::Compound(map))
}
