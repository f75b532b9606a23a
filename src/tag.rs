use std::collections::BTreeMap;
use std::ops::Index;

use serde::de::Unexpected;

use crate::tag_id::TagId;

/// One node of a serializable tag tree.
///
/// Scalar variants hold their value directly; `List` and `Compound` own their
/// children outright, so a tree is always a strict hierarchy with no sharing.
/// `End` is the "no value" sentinel and doubles as the compound terminator on
/// the wire.
#[derive(Clone, Debug, PartialEq)]
pub enum Tag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List(Vec<Tag>),
    Compound(BTreeMap<String, Tag>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl Tag {
    /// The wire type code for this tag's variant.
    pub fn id(&self) -> TagId {
        match *self {
            Tag::End => TagId::End,
            Tag::Byte(_) => TagId::Byte,
            Tag::Short(_) => TagId::Short,
            Tag::Int(_) => TagId::Int,
            Tag::Long(_) => TagId::Long,
            Tag::Float(_) => TagId::Float,
            Tag::Double(_) => TagId::Double,
            Tag::ByteArray(_) => TagId::ByteArray,
            Tag::String(_) => TagId::String,
            Tag::List(_) => TagId::List,
            Tag::Compound(_) => TagId::Compound,
            Tag::IntArray(_) => TagId::IntArray,
            Tag::LongArray(_) => TagId::LongArray,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Tag::End)
    }

    pub fn is_byte(&self) -> bool {
        matches!(self, Tag::Byte(_))
    }

    pub fn is_short(&self) -> bool {
        matches!(self, Tag::Short(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Tag::Int(_))
    }

    pub fn is_long(&self) -> bool {
        matches!(self, Tag::Long(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Tag::Float(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Tag::Double(_))
    }

    pub fn is_byte_array(&self) -> bool {
        matches!(self, Tag::ByteArray(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Tag::String(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Tag::List(_))
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, Tag::Compound(_))
    }

    pub fn is_int_array(&self) -> bool {
        matches!(self, Tag::IntArray(_))
    }

    pub fn is_long_array(&self) -> bool {
        matches!(self, Tag::LongArray(_))
    }

    pub fn as_byte(&self) -> Option<i8> {
        if let Tag::Byte(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    /// Boolean view of a `Byte` tag: 0 is false, anything else is true.
    pub fn as_bool(&self) -> Option<bool> {
        if let Tag::Byte(val) = *self {
            Some(val != 0)
        } else {
            None
        }
    }

    pub fn as_short(&self) -> Option<i16> {
        if let Tag::Short(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        if let Tag::Int(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        if let Tag::Long(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        if let Tag::Float(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        if let Tag::Double(val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_byte_array(&self) -> Option<&[i8]> {
        if let Tag::ByteArray(ref val) = *self {
            Some(val.as_slice())
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Tag::String(ref val) = *self {
            Some(val.as_str())
        } else {
            None
        }
    }

    pub fn as_list(&self) -> Option<&[Tag]> {
        if let Tag::List(ref val) = *self {
            Some(val.as_slice())
        } else {
            None
        }
    }

    pub fn as_compound(&self) -> Option<&BTreeMap<String, Tag>> {
        if let Tag::Compound(ref val) = *self {
            Some(val)
        } else {
            None
        }
    }

    pub fn as_int_array(&self) -> Option<&[i32]> {
        if let Tag::IntArray(ref val) = *self {
            Some(val.as_slice())
        } else {
            None
        }
    }

    pub fn as_long_array(&self) -> Option<&[i64]> {
        if let Tag::LongArray(ref val) = *self {
            Some(val.as_slice())
        } else {
            None
        }
    }

    pub(crate) fn unexpected(&self) -> Unexpected {
        match *self {
            Tag::End => Unexpected::Unit,
            Tag::Byte(v) => Unexpected::Signed(v as i64),
            Tag::Short(v) => Unexpected::Signed(v as i64),
            Tag::Int(v) => Unexpected::Signed(v as i64),
            Tag::Long(v) => Unexpected::Signed(v),
            Tag::Float(v) => Unexpected::Float(v as f64),
            Tag::Double(v) => Unexpected::Float(v),
            Tag::ByteArray(_) => Unexpected::Other("byte array"),
            Tag::String(ref v) => Unexpected::Str(v),
            Tag::List(_) => Unexpected::Seq,
            Tag::Compound(_) => Unexpected::Map,
            Tag::IntArray(_) => Unexpected::Other("int array"),
            Tag::LongArray(_) => Unexpected::Other("long array"),
        }
    }
}

impl std::default::Default for Tag {
    fn default() -> Self {
        Tag::End
    }
}

static END: Tag = Tag::End;

impl Index<usize> for Tag {
    type Output = Tag;

    fn index(&self, index: usize) -> &Self::Output {
        self.as_list().and_then(|v| v.get(index)).unwrap_or(&END)
    }
}

impl Index<&str> for Tag {
    type Output = Tag;

    fn index(&self, index: &str) -> &Self::Output {
        self.as_compound()
            .and_then(|v| v.get(index))
            .unwrap_or(&END)
    }
}

macro_rules! impl_tag_from {
    ($t: ty, $p: ident) => {
        impl From<$t> for Tag {
            fn from(v: $t) -> Self {
                Tag::$p(v)
            }
        }
    };
}

impl_tag_from!(i8, Byte);
impl_tag_from!(i16, Short);
impl_tag_from!(i32, Int);
impl_tag_from!(i64, Long);
impl_tag_from!(f32, Float);
impl_tag_from!(f64, Double);
impl_tag_from!(Vec<i8>, ByteArray);
impl_tag_from!(String, String);
impl_tag_from!(Vec<Tag>, List);
impl_tag_from!(BTreeMap<String, Tag>, Compound);
impl_tag_from!(Vec<i32>, IntArray);
impl_tag_from!(Vec<i64>, LongArray);

impl From<bool> for Tag {
    fn from(v: bool) -> Self {
        Tag::Byte(v as i8)
    }
}

impl From<()> for Tag {
    fn from((): ()) -> Self {
        Tag::End
    }
}

impl<'a> From<&'a str> for Tag {
    fn from(v: &str) -> Self {
        Tag::String(v.to_string())
    }
}
