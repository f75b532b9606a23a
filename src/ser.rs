//! Serialization from Rust values to tag trees.
//!
//! Enum variants, when mapped, are:
//! - Unit - Just the variant name as a string
//! - Newtype - Compound with one pair. Key is variant name, content is the value
//! - Tuple - Compound with one pair. Key is variant name, content is the tuple as a list
//! - Struct - Compound with one pair. Key is variant name, content is the struct
//!
//! `None` and unit map to [`Tag::End`], and compound members that come out as
//! `End` are omitted entirely. Unsigned integers keep their width and cross
//! into the signed wire types by bit pattern, so `255u8` travels as the byte
//! `0xff` and comes back as `255u8`.

use serde::ser::*;
use std::collections::BTreeMap;

use crate::encode::{encode_with, EncodeOptions};
use crate::error::{Error, Result};
use crate::tag::Tag;

/// Build the tag tree for any serializable value.
pub fn to_tag<T: Serialize + ?Sized>(value: &T) -> Result<Tag> {
    value.serialize(TagSerializer)
}

/// Serialize a value and encode it with the default options.
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    to_vec_with(value, &EncodeOptions::default())
}

/// Serialize a value and encode it with the given options.
pub fn to_vec_with<T: Serialize + ?Sized>(value: &T, opts: &EncodeOptions) -> Result<Vec<u8>> {
    let tag = to_tag(value)?;
    encode_with(&tag, opts)
}

struct TagSerializer;

impl Serializer for TagSerializer {
    type Ok = Tag;
    type Error = Error;
    type SerializeSeq = SeqSerializer;
    type SerializeTuple = SeqSerializer;
    type SerializeTupleStruct = SeqSerializer;
    type SerializeTupleVariant = TupleVariantSerializer;
    type SerializeMap = MapSerializer;
    type SerializeStruct = StructSerializer;
    type SerializeStructVariant = StructVariantSerializer;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_bool(self, v: bool) -> Result<Tag> {
        Ok(Tag::Byte(v as i8))
    }

    fn serialize_i8(self, v: i8) -> Result<Tag> {
        Ok(Tag::Byte(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Tag> {
        Ok(Tag::Short(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Tag> {
        Ok(Tag::Int(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Tag> {
        Ok(Tag::Long(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Tag> {
        Ok(Tag::Byte(v as i8))
    }

    fn serialize_u16(self, v: u16) -> Result<Tag> {
        Ok(Tag::Short(v as i16))
    }

    fn serialize_u32(self, v: u32) -> Result<Tag> {
        Ok(Tag::Int(v as i32))
    }

    fn serialize_u64(self, v: u64) -> Result<Tag> {
        Ok(Tag::Long(v as i64))
    }

    fn serialize_f32(self, v: f32) -> Result<Tag> {
        Ok(Tag::Float(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Tag> {
        Ok(Tag::Double(v))
    }

    fn serialize_char(self, v: char) -> Result<Tag> {
        Ok(Tag::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Tag> {
        Ok(Tag::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Tag> {
        Ok(Tag::ByteArray(v.iter().map(|b| *b as i8).collect()))
    }

    fn serialize_none(self) -> Result<Tag> {
        self.serialize_unit()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, v: &T) -> Result<Tag> {
        v.serialize(self)
    }

    fn serialize_unit(self) -> Result<Tag> {
        Ok(Tag::End)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Tag> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Tag> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        v: &T,
    ) -> Result<Tag> {
        v.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Tag> {
        Ok(variant_compound(variant, value.serialize(TagSerializer)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqSerializer> {
        Ok(SeqSerializer {
            elems: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqSerializer> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqSerializer> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantSerializer> {
        Ok(TupleVariantSerializer {
            variant,
            elems: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapSerializer> {
        Ok(MapSerializer {
            map: BTreeMap::new(),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<StructSerializer> {
        Ok(StructSerializer {
            map: BTreeMap::new(),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<StructVariantSerializer> {
        Ok(StructVariantSerializer {
            variant,
            map: BTreeMap::new(),
        })
    }
}

fn variant_compound(variant: &'static str, content: Tag) -> Tag {
    let mut map = BTreeMap::new();
    map.insert(variant.to_string(), content);
    Tag::Compound(map)
}

/// Insert a member, dropping `End` so an absent optional takes no space.
fn insert_member(map: &mut BTreeMap<String, Tag>, key: String, value: Tag) {
    if !value.is_end() {
        map.insert(key, value);
    }
}

struct SeqSerializer {
    elems: Vec<Tag>,
}

impl SerializeSeq for SeqSerializer {
    type Ok = Tag;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.elems.push(value.serialize(TagSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tag> {
        Ok(Tag::List(self.elems))
    }
}

impl SerializeTuple for SeqSerializer {
    type Ok = Tag;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Tag> {
        SerializeSeq::end(self)
    }
}

impl SerializeTupleStruct for SeqSerializer {
    type Ok = Tag;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Tag> {
        SerializeSeq::end(self)
    }
}

struct TupleVariantSerializer {
    variant: &'static str,
    elems: Vec<Tag>,
}

impl SerializeTupleVariant for TupleVariantSerializer {
    type Ok = Tag;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.elems.push(value.serialize(TagSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tag> {
        Ok(variant_compound(self.variant, Tag::List(self.elems)))
    }
}

struct MapSerializer {
    map: BTreeMap<String, Tag>,
    pending_key: Option<String>,
}

impl SerializeMap for MapSerializer {
    type Ok = Tag;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::SerdeFail("map value arrived without a key".to_string()))?;
        insert_member(&mut self.map, key, value.serialize(TagSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Tag> {
        Ok(Tag::Compound(self.map))
    }
}

struct StructSerializer {
    map: BTreeMap<String, Tag>,
}

impl SerializeStruct for StructSerializer {
    type Ok = Tag;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        field: &'static str,
        value: &T,
    ) -> Result<()> {
        insert_member(
            &mut self.map,
            field.to_string(),
            value.serialize(TagSerializer)?,
        );
        Ok(())
    }

    fn end(self) -> Result<Tag> {
        Ok(Tag::Compound(self.map))
    }
}

struct StructVariantSerializer {
    variant: &'static str,
    map: BTreeMap<String, Tag>,
}

impl SerializeStructVariant for StructVariantSerializer {
    type Ok = Tag;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        field: &'static str,
        value: &T,
    ) -> Result<()> {
        insert_member(
            &mut self.map,
            field.to_string(),
            value.serialize(TagSerializer)?,
        );
        Ok(())
    }

    fn end(self) -> Result<Tag> {
        Ok(variant_compound(self.variant, Tag::Compound(self.map)))
    }
}

/// Compound keys must be strings. Anything else fails loudly instead of
/// stringifying on the quiet.
struct KeySerializer;

impl KeySerializer {
    fn ser_fail(&self, received: &'static str) -> Error {
        Error::SerdeFail(format!("expected a string key, received {}", received))
    }
}

impl Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn is_human_readable(&self) -> bool {
        false
    }

    fn serialize_char(self, v: char) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant.to_string())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        v: &T,
    ) -> Result<String> {
        v.serialize(self)
    }

    fn serialize_bool(self, _: bool) -> Result<String> {
        Err(self.ser_fail("bool"))
    }

    fn serialize_i8(self, _: i8) -> Result<String> {
        Err(self.ser_fail("i8"))
    }

    fn serialize_i16(self, _: i16) -> Result<String> {
        Err(self.ser_fail("i16"))
    }

    fn serialize_i32(self, _: i32) -> Result<String> {
        Err(self.ser_fail("i32"))
    }

    fn serialize_i64(self, _: i64) -> Result<String> {
        Err(self.ser_fail("i64"))
    }

    fn serialize_u8(self, _: u8) -> Result<String> {
        Err(self.ser_fail("u8"))
    }

    fn serialize_u16(self, _: u16) -> Result<String> {
        Err(self.ser_fail("u16"))
    }

    fn serialize_u32(self, _: u32) -> Result<String> {
        Err(self.ser_fail("u32"))
    }

    fn serialize_u64(self, _: u64) -> Result<String> {
        Err(self.ser_fail("u64"))
    }

    fn serialize_f32(self, _: f32) -> Result<String> {
        Err(self.ser_fail("f32"))
    }

    fn serialize_f64(self, _: f64) -> Result<String> {
        Err(self.ser_fail("f64"))
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<String> {
        Err(self.ser_fail("bytes"))
    }

    fn serialize_none(self) -> Result<String> {
        Err(self.ser_fail("None"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _: &T) -> Result<String> {
        Err(self.ser_fail("Some"))
    }

    fn serialize_unit(self) -> Result<String> {
        Err(self.ser_fail("unit"))
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<String> {
        Err(self.ser_fail("unit_struct"))
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        Err(self.ser_fail("newtype_variant"))
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(self.ser_fail("seq"))
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple> {
        Err(self.ser_fail("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(self.ser_fail("tuple_struct"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(self.ser_fail("tuple_variant"))
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap> {
        Err(self.ser_fail("map"))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(self.ser_fail("struct"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(self.ser_fail("struct_variant"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Serialize;

    fn compound(entries: Vec<(&str, Tag)>) -> Tag {
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            map.insert(key.to_string(), value);
        }
        Tag::Compound(map)
    }

    #[derive(Serialize)]
    struct Person {
        name: String,
        age: u8,
    }

    #[test]
    fn struct_to_compound() {
        let person = Person {
            name: "Alice".to_string(),
            age: 16,
        };
        assert_eq!(
            to_tag(&person).unwrap(),
            compound(vec![
                ("name", Tag::String("Alice".to_string())),
                ("age", Tag::Byte(16)),
            ])
        );
    }

    #[test]
    fn unsigned_maps_by_bit_pattern() {
        assert_eq!(to_tag(&200u8).unwrap(), Tag::Byte(-56));
        assert_eq!(to_tag(&0xffffu16).unwrap(), Tag::Short(-1));
        assert_eq!(to_tag(&u32::MAX).unwrap(), Tag::Int(-1));
        assert_eq!(to_tag(&u64::MAX).unwrap(), Tag::Long(-1));
    }

    #[test]
    fn scalars() {
        assert_eq!(to_tag(&true).unwrap(), Tag::Byte(1));
        assert_eq!(to_tag(&false).unwrap(), Tag::Byte(0));
        assert_eq!(to_tag(&-7i8).unwrap(), Tag::Byte(-7));
        assert_eq!(to_tag(&1000i16).unwrap(), Tag::Short(1000));
        assert_eq!(to_tag(&1.5f32).unwrap(), Tag::Float(1.5));
        assert_eq!(to_tag(&1.5f64).unwrap(), Tag::Double(1.5));
        assert_eq!(to_tag(&'x').unwrap(), Tag::String("x".to_string()));
        assert_eq!(to_tag("hi").unwrap(), Tag::String("hi".to_string()));
        assert_eq!(to_tag(&()).unwrap(), Tag::End);
    }

    #[test]
    fn sequences_to_lists() {
        assert_eq!(
            to_tag(&vec![1i32, 2, 3]).unwrap(),
            Tag::List(vec![Tag::Int(1), Tag::Int(2), Tag::Int(3)])
        );
        assert_eq!(to_tag::<[i32]>(&[]).unwrap(), Tag::List(Vec::new()));
    }

    #[test]
    fn absent_options_are_omitted() {
        #[derive(Serialize)]
        struct Sparse {
            always: i32,
            sometimes: Option<String>,
        }
        let none = to_tag(&Sparse {
            always: 1,
            sometimes: None,
        })
        .unwrap();
        assert_eq!(none, compound(vec![("always", Tag::Int(1))]));

        let some = to_tag(&Sparse {
            always: 1,
            sometimes: Some("here".to_string()),
        })
        .unwrap();
        assert_eq!(
            some,
            compound(vec![
                ("always", Tag::Int(1)),
                ("sometimes", Tag::String("here".to_string())),
            ])
        );
    }

    #[test]
    fn enums() {
        #[derive(Serialize)]
        enum Shape {
            Point,
            Circle(f64),
            Segment(f64, f64),
            Rect { w: f64, h: f64 },
        }
        assert_eq!(
            to_tag(&Shape::Point).unwrap(),
            Tag::String("Point".to_string())
        );
        assert_eq!(
            to_tag(&Shape::Circle(2.0)).unwrap(),
            compound(vec![("Circle", Tag::Double(2.0))])
        );
        assert_eq!(
            to_tag(&Shape::Segment(1.0, 2.0)).unwrap(),
            compound(vec![(
                "Segment",
                Tag::List(vec![Tag::Double(1.0), Tag::Double(2.0)])
            )])
        );
        assert_eq!(
            to_tag(&Shape::Rect { w: 3.0, h: 4.0 }).unwrap(),
            compound(vec![(
                "Rect",
                compound(vec![("w", Tag::Double(3.0)), ("h", Tag::Double(4.0))])
            )])
        );
    }

    #[test]
    fn bytes_to_byte_array() {
        let buf = serde_bytes::ByteBuf::from(vec![0u8, 1, 255]);
        assert_eq!(to_tag(&buf).unwrap(), Tag::ByteArray(vec![0, 1, -1]));
    }

    #[test]
    fn string_keyed_maps_only() {
        use std::collections::HashMap;
        let mut good: HashMap<String, i32> = HashMap::new();
        good.insert("a".to_string(), 1);
        good.insert("b".to_string(), 2);
        assert_eq!(
            to_tag(&good).unwrap(),
            compound(vec![("a", Tag::Int(1)), ("b", Tag::Int(2))])
        );

        let mut bad: HashMap<i32, i32> = HashMap::new();
        bad.insert(1, 1);
        assert!(matches!(to_tag(&bad), Err(Error::SerdeFail(_))));
    }

    #[test]
    fn to_vec_produces_an_envelope() {
        let person = Person {
            name: "Alice".to_string(),
            age: 16,
        };
        let enc = to_vec(&person).unwrap();
        assert_eq!(&enc[..3], &[0x42, 0x01, 0x0a]);
    }
}
