//! Deserialization from tag trees into Rust values.
//!
//! The mapping mirrors serialization: compounds feed struct and map
//! visitors, lists and the packed arrays feed sequence visitors, and an
//! absent compound member deserializes as `None`. Unsigned integers are
//! recovered from the signed wire types by bit pattern, width for width.

use std::collections::btree_map;
use std::slice;

use serde::de::Error as DeError;
use serde::de::*;

use crate::decode::{decode_with, DecodeOptions};
use crate::error::{Error, Result};
use crate::tag::Tag;

/// Deserialize a value out of an already-decoded tag tree.
pub fn from_tag<'de, T: Deserialize<'de>>(tag: &'de Tag) -> Result<T> {
    T::deserialize(TagDeserializer { tag })
}

/// Decode a buffer with the default options and deserialize a value from it.
pub fn from_slice<T: DeserializeOwned>(buf: &[u8]) -> Result<T> {
    from_slice_with(buf, &DecodeOptions::default())
}

/// Decode a buffer with the given options and deserialize a value from it.
pub fn from_slice_with<T: DeserializeOwned>(buf: &[u8], opts: &DecodeOptions) -> Result<T> {
    let tag = decode_with(buf, opts)?;
    from_tag(&tag)
}

#[derive(Clone, Copy)]
struct TagDeserializer<'de> {
    tag: &'de Tag,
}

impl<'de> Deserializer<'de> for TagDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::End => visitor.visit_unit(),
            Tag::Byte(v) => visitor.visit_i8(*v),
            Tag::Short(v) => visitor.visit_i16(*v),
            Tag::Int(v) => visitor.visit_i32(*v),
            Tag::Long(v) => visitor.visit_i64(*v),
            Tag::Float(v) => visitor.visit_f32(*v),
            Tag::Double(v) => visitor.visit_f64(*v),
            Tag::ByteArray(v) => visitor.visit_byte_buf(v.iter().map(|b| *b as u8).collect()),
            Tag::String(v) => visitor.visit_borrowed_str(v),
            Tag::List(v) => visitor.visit_seq(ListAccess { iter: v.iter() }),
            Tag::Compound(v) => visitor.visit_map(CompoundAccess {
                iter: v.iter(),
                pending: None,
            }),
            Tag::IntArray(v) => visitor.visit_seq(IntArrayAccess { iter: v.iter() }),
            Tag::LongArray(v) => visitor.visit_seq(LongArrayAccess { iter: v.iter() }),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::Byte(v) => visitor.visit_bool(*v != 0),
            _ => Err(Error::invalid_type(self.tag.unexpected(), &visitor)),
        }
    }

    fn deserialize_u8<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::Byte(v) => visitor.visit_u8(*v as u8),
            _ => Err(Error::invalid_type(self.tag.unexpected(), &visitor)),
        }
    }

    fn deserialize_u16<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::Short(v) => visitor.visit_u16(*v as u16),
            _ => Err(Error::invalid_type(self.tag.unexpected(), &visitor)),
        }
    }

    fn deserialize_u32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::Int(v) => visitor.visit_u32(*v as u32),
            _ => Err(Error::invalid_type(self.tag.unexpected(), &visitor)),
        }
    }

    fn deserialize_u64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::Long(v) => visitor.visit_u64(*v as u64),
            _ => Err(Error::invalid_type(self.tag.unexpected(), &visitor)),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.tag {
            Tag::End => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value> {
        match self.tag {
            Tag::String(variant) => visitor.visit_enum(EnumAccess {
                variant,
                value: None,
            }),
            Tag::Compound(map) if map.len() == 1 => {
                // one pair: variant name to content
                match map.iter().next() {
                    Some((variant, value)) => visitor.visit_enum(EnumAccess {
                        variant,
                        value: Some(value),
                    }),
                    None => Err(Error::SerdeFail("one-pair compound was empty".to_string())),
                }
            }
            _ => Err(Error::invalid_type(
                self.tag.unexpected(),
                &"a variant string or a one-pair compound",
            )),
        }
    }

    serde::forward_to_deserialize_any! {
        i8 i16 i32 i64 f32 f64 char str
        string bytes byte_buf unit unit_struct
        seq tuple tuple_struct map struct identifier ignored_any
    }
}

struct ListAccess<'de> {
    iter: slice::Iter<'de, Tag>,
}

impl<'de> serde::de::SeqAccess<'de> for ListAccess<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(tag) => seed.deserialize(TagDeserializer { tag }).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct IntArrayAccess<'de> {
    iter: slice::Iter<'de, i32>,
}

impl<'de> serde::de::SeqAccess<'de> for IntArrayAccess<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(v) => seed.deserialize(v.into_deserializer()).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct LongArrayAccess<'de> {
    iter: slice::Iter<'de, i64>,
}

impl<'de> serde::de::SeqAccess<'de> for LongArrayAccess<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(v) => seed.deserialize(v.into_deserializer()).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Borrowed string key, usable both as a map key and an enum variant name.
#[derive(Clone, Copy)]
struct KeyStr<'de>(&'de str);

impl<'de> Deserializer<'de> for KeyStr<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_borrowed_str(self.0)
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 u8 u16 u32 u64 f32 f64 char str
        string bytes byte_buf option unit unit_struct newtype_struct
        seq tuple tuple_struct map struct enum identifier ignored_any
    }
}

struct CompoundAccess<'de> {
    iter: btree_map::Iter<'de, String, Tag>,
    pending: Option<&'de Tag>,
}

impl<'de> serde::de::MapAccess<'de> for CompoundAccess<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                seed.deserialize(KeyStr(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: DeserializeSeed<'de>,
    {
        let tag = self
            .pending
            .take()
            .ok_or_else(|| Error::SerdeFail("map value requested before its key".to_string()))?;
        seed.deserialize(TagDeserializer { tag })
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct EnumAccess<'de> {
    variant: &'de str,
    value: Option<&'de Tag>,
}

impl<'de> serde::de::EnumAccess<'de> for EnumAccess<'de> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: DeserializeSeed<'de>,
    {
        let val = seed.deserialize(KeyStr(self.variant))?;
        Ok((val, self))
    }
}

impl<'de> serde::de::VariantAccess<'de> for EnumAccess<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None => Ok(()),
            Some(_) => Err(Error::SerdeFail(
                "invalid type: non-unit variant, expected unit variant".to_string(),
            )),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: DeserializeSeed<'de>,
    {
        match self.value {
            Some(tag) => seed.deserialize(TagDeserializer { tag }),
            None => Err(Error::SerdeFail(
                "invalid type: unit variant, expected newtype variant".to_string(),
            )),
        }
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(tag) => TagDeserializer { tag }.deserialize_tuple(len, visitor),
            None => Err(Error::SerdeFail(
                "invalid type: unit variant, expected tuple variant".to_string(),
            )),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(tag) => TagDeserializer { tag }.deserialize_map(visitor),
            None => Err(Error::SerdeFail(
                "invalid type: unit variant, expected struct variant".to_string(),
            )),
        }
    }
}
