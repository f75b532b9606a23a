//! Structure-cache field schemas.
//!
//! A list whose elements are all compounds with the same field layout can be
//! encoded with that layout written once instead of once per element. The
//! schema block sits between the list's element tag id and the value-only
//! element bodies:
//!
//! ```text
//! FieldCount(2) ( Key:String FieldTagID(1) [nested schema if Compound] )*
//! ```
//!
//! Fields appear sorted ascending by key, matching the order the value-only
//! element bodies are written in. The count is explicit, so there is no
//! terminator.

use std::collections::BTreeMap;

use crate::depth::descend;
use crate::error::{Error, Result};
use crate::stream::{Reader, Writer};
use crate::tag::Tag;
use crate::tag_id::TagId;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SchemaField {
    Plain(TagId),
    Compound(FixCompoundSchema),
}

/// Shared field layout of a homogeneous compound list, derived from the
/// list's first element. Call-local; never persisted outside one
/// encode/decode pass.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FixCompoundSchema {
    pub fields: Vec<(String, SchemaField)>,
}

impl FixCompoundSchema {
    /// Derive the schema from one compound, recursing into nested compounds.
    /// Fields are recorded sorted by key.
    pub fn derive(compound: &BTreeMap<String, Tag>, depth: u32) -> Result<FixCompoundSchema> {
        let depth = descend(depth)?;
        let mut fields = Vec::with_capacity(compound.len());
        for (key, value) in compound {
            if key.is_empty() {
                return Err(Error::BadEncode(
                    "empty compound key cannot be encoded".to_string(),
                ));
            }
            let field = match value {
                Tag::End => {
                    return Err(Error::BadEncode(
                        "compound member cannot be the End tag".to_string(),
                    ))
                }
                Tag::Compound(nested) => SchemaField::Compound(Self::derive(nested, depth)?),
                other => SchemaField::Plain(other.id()),
            };
            fields.push((key.clone(), field));
        }
        Ok(FixCompoundSchema { fields })
    }

    /// Verify that an element carries exactly this schema's field set: same
    /// keys, same per-field tag ids, same nesting.
    pub fn check(&self, compound: &BTreeMap<String, Tag>) -> Result<()> {
        if compound.len() != self.fields.len() {
            return Err(Error::SchemaMismatch(format!(
                "expected {} fields, element has {}",
                self.fields.len(),
                compound.len()
            )));
        }
        for ((key, field), (elem_key, elem_value)) in self.fields.iter().zip(compound.iter()) {
            if key != elem_key {
                return Err(Error::SchemaMismatch(format!(
                    "expected field '{}', element has '{}'",
                    key, elem_key
                )));
            }
            match (field, elem_value) {
                (SchemaField::Compound(nested), Tag::Compound(inner)) => nested.check(inner)?,
                (SchemaField::Compound(_), other) => {
                    return Err(Error::SchemaMismatch(format!(
                        "field '{}' should be a compound, element has {:?}",
                        key,
                        other.id()
                    )))
                }
                (SchemaField::Plain(id), other) => {
                    if other.id() != *id {
                        return Err(Error::SchemaMismatch(format!(
                            "field '{}' should be {:?}, element has {:?}",
                            key,
                            id,
                            other.id()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn write(&self, w: &mut Writer) -> Result<()> {
        let count = self.fields.len();
        if count > u16::MAX as usize {
            return Err(Error::LengthTooLong {
                max: u16::MAX as usize,
                actual: count,
            });
        }
        w.put_u16(count as u16);
        for (key, field) in &self.fields {
            w.put_str(key)?;
            match field {
                SchemaField::Plain(id) => w.put_u8((*id).into()),
                SchemaField::Compound(nested) => {
                    w.put_u8(TagId::Compound.into());
                    nested.write(w)?;
                }
            }
        }
        Ok(())
    }

    pub fn read(r: &mut Reader, depth: u32) -> Result<FixCompoundSchema> {
        let depth = descend(depth)?;
        let count = r.read_u16("schema field count")? as usize;
        // Every field is at least a key length byte, one key byte, and an id.
        if count > r.remaining() {
            return Err(Error::LengthTooShort {
                step: "schema fields",
                actual: r.remaining(),
                expected: count,
            });
        }
        let mut fields: Vec<(String, SchemaField)> = Vec::with_capacity(count);
        for _ in 0..count {
            let key = r.read_str("schema field key")?;
            if key.is_empty() {
                return Err(Error::BadEncode("empty schema field key".to_string()));
            }
            if fields.iter().any(|(k, _)| k == key) {
                return Err(Error::BadEncode(format!(
                    "duplicate schema field key: {}",
                    key
                )));
            }
            let id_byte = r.read_u8("schema field id")?;
            let id = TagId::from_u8(id_byte).ok_or(Error::UnknownTagId(id_byte))?;
            let field = match id {
                TagId::End => {
                    return Err(Error::BadEncode(
                        "schema field cannot be the End tag".to_string(),
                    ))
                }
                TagId::Compound => SchemaField::Compound(Self::read(r, depth)?),
                other => SchemaField::Plain(other),
            };
            fields.push((key.to_string(), field));
        }
        Ok(FixCompoundSchema { fields })
    }

    /// Fewest wire bytes one element body can occupy under this schema. Zero
    /// means elements leave no trace in the stream, so an element count could
    /// not be bounded by the bytes backing it.
    pub fn min_wire_size(&self) -> usize {
        self.fields
            .iter()
            .map(|(_, field)| match field {
                SchemaField::Plain(id) => min_value_size(*id),
                SchemaField::Compound(nested) => nested.min_wire_size(),
            })
            .sum()
    }
}

/// Smallest encoding of a value of the given type: the fixed width for
/// scalars, the length prefix alone for strings and the counted types.
fn min_value_size(id: TagId) -> usize {
    match id {
        TagId::End => 0,
        TagId::Byte => 1,
        TagId::Short => 2,
        TagId::Int | TagId::Float => 4,
        TagId::Long | TagId::Double => 8,
        TagId::ByteArray | TagId::List | TagId::IntArray | TagId::LongArray => 4,
        TagId::String => 1,
        TagId::Compound => 1,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MAX_DEPTH;

    fn record() -> BTreeMap<String, Tag> {
        let mut pos = BTreeMap::new();
        pos.insert("x".to_string(), Tag::Int(1));
        pos.insert("y".to_string(), Tag::Int(2));
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Tag::String("a".to_string()));
        map.insert("pos".to_string(), Tag::Compound(pos));
        map.insert("hp".to_string(), Tag::Byte(20));
        map
    }

    #[test]
    fn derive_sorts_and_nests() {
        let schema = FixCompoundSchema::derive(&record(), MAX_DEPTH).unwrap();
        let keys: Vec<&str> = schema.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["hp", "name", "pos"]);
        assert_eq!(schema.fields[0].1, SchemaField::Plain(TagId::Byte));
        assert_eq!(schema.fields[1].1, SchemaField::Plain(TagId::String));
        match &schema.fields[2].1 {
            SchemaField::Compound(nested) => {
                let keys: Vec<&str> = nested.fields.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, ["x", "y"]);
            }
            other => panic!("pos should be a nested schema, got {:?}", other),
        }
    }

    #[test]
    fn wire_roundtrip() {
        let schema = FixCompoundSchema::derive(&record(), MAX_DEPTH).unwrap();
        let mut w = Writer::new();
        schema.write(&mut w).unwrap();
        let buf = w.into_vec();
        // field count
        assert_eq!(&buf[..2], &[0, 3]);

        let mut r = Reader::new(&buf);
        let read_back = FixCompoundSchema::read(&mut r, MAX_DEPTH).unwrap();
        assert!(r.is_empty());
        assert_eq!(read_back, schema);
    }

    #[test]
    fn check_accepts_matching_element() {
        let schema = FixCompoundSchema::derive(&record(), MAX_DEPTH).unwrap();
        let mut elem = record();
        elem.insert("name".to_string(), Tag::String("b".to_string()));
        schema.check(&elem).unwrap();
    }

    #[test]
    fn check_rejects_field_count() {
        let schema = FixCompoundSchema::derive(&record(), MAX_DEPTH).unwrap();
        let mut elem = record();
        elem.insert("extra".to_string(), Tag::Byte(0));
        assert!(matches!(
            schema.check(&elem),
            Err(Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn check_rejects_renamed_field() {
        let schema = FixCompoundSchema::derive(&record(), MAX_DEPTH).unwrap();
        let mut elem = record();
        elem.remove("hp");
        elem.insert("mp".to_string(), Tag::Byte(20));
        assert!(matches!(
            schema.check(&elem),
            Err(Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn check_rejects_retyped_field() {
        let schema = FixCompoundSchema::derive(&record(), MAX_DEPTH).unwrap();
        let mut elem = record();
        elem.insert("hp".to_string(), Tag::Int(20));
        assert!(matches!(
            schema.check(&elem),
            Err(Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn check_rejects_nested_mismatch() {
        let schema = FixCompoundSchema::derive(&record(), MAX_DEPTH).unwrap();
        let mut pos = BTreeMap::new();
        pos.insert("x".to_string(), Tag::Int(1));
        pos.insert("z".to_string(), Tag::Int(2));
        let mut elem = record();
        elem.insert("pos".to_string(), Tag::Compound(pos));
        assert!(matches!(
            schema.check(&elem),
            Err(Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn end_member_rejected() {
        let mut map = BTreeMap::new();
        map.insert("v".to_string(), Tag::End);
        assert!(matches!(
            FixCompoundSchema::derive(&map, MAX_DEPTH),
            Err(Error::BadEncode(_))
        ));
    }

    #[test]
    fn read_rejects_duplicate_keys() {
        // two fields both named "a"
        let buf = [0u8, 2, 1, b'a', 1, 1, b'a', 1];
        let mut r = Reader::new(&buf);
        assert!(matches!(
            FixCompoundSchema::read(&mut r, MAX_DEPTH),
            Err(Error::BadEncode(_))
        ));
    }

    #[test]
    fn read_rejects_unknown_id() {
        let buf = [0u8, 1, 1, b'a', 200];
        let mut r = Reader::new(&buf);
        assert!(matches!(
            FixCompoundSchema::read(&mut r, MAX_DEPTH),
            Err(Error::UnknownTagId(200))
        ));
    }

    #[test]
    fn min_wire_size_sums_leaves() {
        // hp(1) + name(1) + pos(x: 4 + y: 4)
        let schema = FixCompoundSchema::derive(&record(), MAX_DEPTH).unwrap();
        assert_eq!(schema.min_wire_size(), 10);
        assert_eq!(
            FixCompoundSchema::derive(&BTreeMap::new(), MAX_DEPTH)
                .unwrap()
                .min_wire_size(),
            0
        );
    }

    #[test]
    fn derive_respects_depth() {
        // nest one compound per level
        let mut tag = record();
        for _ in 0..4 {
            let mut outer = BTreeMap::new();
            outer.insert("inner".to_string(), Tag::Compound(tag));
            tag = outer;
        }
        assert!(FixCompoundSchema::derive(&tag, MAX_DEPTH).is_ok());
        assert!(matches!(
            FixCompoundSchema::derive(&tag, 3),
            Err(Error::DepthExceeded)
        ));
    }
}
