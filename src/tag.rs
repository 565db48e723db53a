use crate::TreeError;

/// The type byte that precedes every named tag and every list.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum TagID {
    End = 0,
    Byte = 1,
    Short = 2,
    Int = 3,
    Long = 4,
    Float = 5,
    Double = 6,
    ByteArray = 7,
    String = 8,
    List = 9,
    Compound = 10,
    IntArray = 11,
    LongArray = 12,
}

impl TagID {
    /// Returns `true` if this is a primitive tag type.
    ///
    /// Primitive tags are: End, Byte, Short, Int, Long, Float, Double.
    /// Their payloads have a fixed width and no further structure.
    ///
    /// # Example
    ///
    /// ```
    /// use na_bookscan::TagID;
    ///
    /// assert!(TagID::Int.is_primitive());
    /// assert!(!TagID::List.is_primitive());
    /// assert!(!TagID::ByteArray.is_primitive());
    /// ```
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::End
                | Self::Byte
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
        )
    }

    /// Returns `true` for ByteArray, IntArray and LongArray.
    pub const fn is_array(self) -> bool {
        matches!(self, Self::ByteArray | Self::IntArray | Self::LongArray)
    }

    /// Returns `true` for the tags that own child values: List and Compound.
    ///
    /// These are the only nodes the record extractor descends into.
    pub const fn is_composite(self) -> bool {
        matches!(self, Self::List | Self::Compound)
    }

    /// Payload width in bytes of a primitive tag, or of one element of an
    /// array tag. Variable-size tags report 0.
    pub const fn element_size(self) -> usize {
        match self {
            Self::Byte | Self::ByteArray => 1,
            Self::Short => 2,
            Self::Int | Self::Float | Self::IntArray => 4,
            Self::Long | Self::Double | Self::LongArray => 8,
            Self::End | Self::String | Self::List | Self::Compound => 0,
        }
    }
}

impl TryFrom<u8> for TagID {
    type Error = TreeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::End,
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::ByteArray,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            11 => Self::IntArray,
            12 => Self::LongArray,
            _ => return Err(TreeError::InvalidTagType(value)),
        })
    }
}
