//! Tag tree encoding.

use std::collections::BTreeMap;

use crate::compress;
use crate::depth::descend;
use crate::error::{Error, Result};
use crate::schema::FixCompoundSchema;
use crate::stream::Writer;
use crate::tag::Tag;
use crate::tag_id::TagId;
use crate::{MAGIC, MAX_DEPTH, VERSION};

/// Knobs for one encode call.
///
/// `structure_cache` must match the setting the eventual decoder will use;
/// the wire carries no flag for it. `compress` passes the finished envelope
/// through zstd at the given level, where any level at or below zero means
/// no compression at all.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    pub max_depth: u32,
    pub structure_cache: bool,
    pub compress: Option<i32>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            structure_cache: true,
            compress: None,
        }
    }
}

/// Encode a tag tree with the default options: depth limit 512, structure
/// cache on, no compression.
pub fn encode(tag: &Tag) -> Result<Vec<u8>> {
    encode_with(tag, &EncodeOptions::default())
}

/// Encode a tag tree into the versioned envelope format.
///
/// # Errors
///
/// Fails on values the format cannot represent: strings over 255 bytes,
/// heterogeneous lists, `End` used as a compound member, empty member keys,
/// nesting deeper than `max_depth`, and structure-cached list elements that
/// do not match the schema of the list's first element.
pub fn encode_with(tag: &Tag, opts: &EncodeOptions) -> Result<Vec<u8>> {
    let mut w = Writer::new();
    w.put_u8(MAGIC);
    w.put_u8(VERSION);
    w.put_u8(tag.id().into());
    // The root tag's name is empty and an empty name writes no bytes.
    write_value(&mut w, tag, opts.max_depth, opts.structure_cache)?;
    let buf = w.into_vec();
    match opts.compress {
        Some(level) => compress::compress(&buf, level),
        None => Ok(buf),
    }
}

fn write_value(w: &mut Writer, tag: &Tag, depth: u32, cache: bool) -> Result<()> {
    match tag {
        Tag::End => Ok(()),
        Tag::Byte(v) => {
            w.put_i8(*v);
            Ok(())
        }
        Tag::Short(v) => {
            w.put_i16(*v);
            Ok(())
        }
        Tag::Int(v) => {
            w.put_i32(*v);
            Ok(())
        }
        Tag::Long(v) => {
            w.put_i64(*v);
            Ok(())
        }
        Tag::Float(v) => {
            w.put_f32(*v);
            Ok(())
        }
        Tag::Double(v) => {
            w.put_f64(*v);
            Ok(())
        }
        Tag::ByteArray(v) => {
            write_count(w, v.len())?;
            for b in v {
                w.put_i8(*b);
            }
            Ok(())
        }
        Tag::String(v) => w.put_str(v),
        Tag::List(v) => write_list(w, v, depth, cache),
        Tag::Compound(v) => write_compound(w, v, depth, cache),
        Tag::IntArray(v) => {
            write_count(w, v.len())?;
            for n in v {
                w.put_i32(*n);
            }
            Ok(())
        }
        Tag::LongArray(v) => {
            write_count(w, v.len())?;
            for n in v {
                w.put_i64(*n);
            }
            Ok(())
        }
    }
}

fn write_count(w: &mut Writer, len: usize) -> Result<()> {
    if len > u32::MAX as usize {
        return Err(Error::LengthTooLong {
            max: u32::MAX as usize,
            actual: len,
        });
    }
    w.put_u32(len as u32);
    Ok(())
}

fn write_compound(
    w: &mut Writer,
    map: &BTreeMap<String, Tag>,
    depth: u32,
    cache: bool,
) -> Result<()> {
    let depth = descend(depth)?;
    for (key, value) in map {
        if key.is_empty() {
            return Err(Error::BadEncode(
                "empty compound key cannot be encoded".to_string(),
            ));
        }
        if value.is_end() {
            return Err(Error::BadEncode(
                "compound member cannot be the End tag".to_string(),
            ));
        }
        w.put_u8(value.id().into());
        w.put_name(key)?;
        write_value(w, value, depth, cache)?;
    }
    w.put_u8(TagId::End.into());
    Ok(())
}

fn write_list(w: &mut Writer, list: &[Tag], depth: u32, cache: bool) -> Result<()> {
    let depth = descend(depth)?;
    write_count(w, list.len())?;
    let first = match list.first() {
        Some(first) => first,
        None => return Ok(()),
    };
    let elem_id = first.id();
    if elem_id == TagId::End {
        return Err(Error::BadEncode(
            "a list of End tags cannot be encoded".to_string(),
        ));
    }
    for elem in list {
        if elem.id() != elem_id {
            return Err(Error::BadEncode(format!(
                "heterogeneous list: {:?} element in a list of {:?}",
                elem.id(),
                elem_id
            )));
        }
    }
    w.put_u8(elem_id.into());
    match first {
        Tag::Compound(first_map) if cache => {
            let schema = FixCompoundSchema::derive(first_map, depth)?;
            if schema.min_wire_size() == 0 {
                return Err(Error::BadEncode(
                    "cannot structure-cache elements with no wire footprint; \
                     disable the cache for this value"
                        .to_string(),
                ));
            }
            schema.write(w)?;
            for elem in list {
                let map = match elem {
                    Tag::Compound(map) => map,
                    _ => {
                        return Err(Error::BadEncode(
                            "heterogeneous list slipped past the id check".to_string(),
                        ))
                    }
                };
                schema.check(map)?;
                write_cached_values(w, map, &schema, depth, cache)?;
            }
            Ok(())
        }
        _ => {
            for elem in list {
                write_value(w, elem, depth, cache)?;
            }
            Ok(())
        }
    }
}

/// Value-only body of one structure-cached element. The caller has already
/// verified the element against the schema, so the zipped walk lines up.
fn write_cached_values(
    w: &mut Writer,
    map: &BTreeMap<String, Tag>,
    schema: &FixCompoundSchema,
    depth: u32,
    cache: bool,
) -> Result<()> {
    use crate::schema::SchemaField;

    let depth = descend(depth)?;
    for ((_, field), (_, value)) in schema.fields.iter().zip(map.iter()) {
        match (field, value) {
            (SchemaField::Compound(nested), Tag::Compound(inner)) => {
                write_cached_values(w, inner, nested, depth, cache)?
            }
            (_, value) => write_value(w, value, depth, cache)?,
        }
    }
    Ok(())
}
