/// Wire type codes, one per tag variant.
///
/// The discriminant doubles as the exact on-wire byte. Renumbering any of
/// these is a format break and requires a version bump.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagId {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
    LongArray,
}

impl TagId {
    /// Convert from the wire byte. Returns `None` if the byte isn't assigned.
    pub fn from_u8(v: u8) -> Option<TagId> {
        match v {
            0 => Some(TagId::End),
            1 => Some(TagId::Byte),
            2 => Some(TagId::Short),
            3 => Some(TagId::Int),
            4 => Some(TagId::Long),
            5 => Some(TagId::Float),
            6 => Some(TagId::Double),
            7 => Some(TagId::ByteArray),
            8 => Some(TagId::String),
            9 => Some(TagId::List),
            10 => Some(TagId::Compound),
            11 => Some(TagId::IntArray),
            12 => Some(TagId::LongArray),
            _ => None,
        }
    }

    /// Return the assigned wire byte.
    pub fn into_u8(self) -> u8 {
        match self {
            TagId::End => 0,
            TagId::Byte => 1,
            TagId::Short => 2,
            TagId::Int => 3,
            TagId::Long => 4,
            TagId::Float => 5,
            TagId::Double => 6,
            TagId::ByteArray => 7,
            TagId::String => 8,
            TagId::List => 9,
            TagId::Compound => 10,
            TagId::IntArray => 11,
            TagId::LongArray => 12,
        }
    }
}

impl From<TagId> for u8 {
    fn from(val: TagId) -> u8 {
        val.into_u8()
    }
}
