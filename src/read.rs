//! Recursive-descent decoder for NBT byte buffers.
//!
//! The decoder copies everything it reads into an owned [`Value`] tree.
//! Every read is checked against the remaining input, so a corrupt length
//! prefix becomes [`TreeError::EndOfFile`] instead of an out-of-bounds read
//! or an allocation sized by attacker-controlled counts.

use std::marker::PhantomData;

use zerocopy::{BigEndian, ByteOrder, FromBytes, byteorder};

use crate::{Compound, List, Result, TagID, TreeError, Value};

/// Maximum nesting of lists and compounds accepted by the decoder.
pub const MAX_DEPTH: usize = 512;

/// The root of a decoded buffer: one named tag.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedTag {
    pub name: String,
    pub value: Value,
}

/// Decodes one named root tag from `data` in byte order `O`.
///
/// Bytes after the root tag are ignored. A root type byte of `End` yields
/// [`Value::End`] with an empty name.
///
/// # Example
///
/// ```
/// use na_bookscan::{Value, read_be};
///
/// // Int named "a" with value 7
/// let data = [0x03, 0x00, 0x01, b'a', 0x00, 0x00, 0x00, 0x07];
/// let root = read_be(&data).unwrap();
/// assert_eq!(root.name, "a");
/// assert_eq!(root.value, Value::Int(7));
/// ```
pub fn read<O: ByteOrder>(data: &[u8]) -> Result<NamedTag> {
    let mut reader = Reader::<O>::new(data);
    let tag = reader.tag_id()?;
    if tag == TagID::End {
        return Ok(NamedTag {
            name: String::new(),
            value: Value::End,
        });
    }
    let name = reader.string()?;
    let value = reader.payload(tag)?;
    Ok(NamedTag { name, value })
}

/// [`read`] for Java edition data, which is always big-endian.
#[inline]
pub fn read_be(data: &[u8]) -> Result<NamedTag> {
    read::<BigEndian>(data)
}

struct Reader<'a, O: ByteOrder> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
    _marker: PhantomData<O>,
}

type Step<T> = std::result::Result<T, TreeError>;

impl<'a, O: ByteOrder> Reader<'a, O> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            depth: 0,
            _marker: PhantomData,
        }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    fn take(&mut self, len: usize) -> Step<&'a [u8]> {
        if len > self.remaining() {
            return Err(TreeError::EndOfFile);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> Step<[u8; N]> {
        <[u8; N]>::try_from(self.take(N)?).map_err(|_| TreeError::EndOfFile)
    }

    #[inline]
    fn tag_id(&mut self) -> Step<TagID> {
        let [byte] = self.array::<1>()?;
        TagID::try_from(byte)
    }

    #[inline]
    fn count(&mut self) -> Step<usize> {
        Ok(byteorder::U32::<O>::from_bytes(self.array()?).get() as usize)
    }

    /// Takes `count` elements of `size` bytes each.
    fn elements(&mut self, count: usize, size: usize) -> Step<&'a [u8]> {
        let len = count.checked_mul(size).ok_or(TreeError::EndOfFile)?;
        self.take(len)
    }

    fn string(&mut self) -> Step<String> {
        let len = byteorder::U16::<O>::from_bytes(self.array()?).get() as usize;
        let bytes = self.take(len)?;
        Ok(simd_cesu8::mutf8::decode_lossy(bytes).into_owned())
    }

    fn enter(&mut self) -> Step<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(TreeError::DepthLimitExceeded(MAX_DEPTH));
        }
        Ok(())
    }

    fn payload(&mut self, tag: TagID) -> Step<Value> {
        Ok(match tag {
            TagID::End => Value::End,
            TagID::Byte => Value::Byte(self.array::<1>()?[0] as i8),
            TagID::Short => Value::Short(byteorder::I16::<O>::from_bytes(self.array()?).get()),
            TagID::Int => Value::Int(byteorder::I32::<O>::from_bytes(self.array()?).get()),
            TagID::Long => Value::Long(byteorder::I64::<O>::from_bytes(self.array()?).get()),
            TagID::Float => Value::Float(byteorder::F32::<O>::from_bytes(self.array()?).get()),
            TagID::Double => Value::Double(byteorder::F64::<O>::from_bytes(self.array()?).get()),
            TagID::ByteArray => {
                let count = self.count()?;
                let bytes = self.elements(count, 1)?;
                Value::ByteArray(bytes.iter().map(|&b| b as i8).collect())
            }
            TagID::String => Value::String(self.string()?),
            TagID::List => {
                self.enter()?;
                let list = self.list()?;
                self.depth -= 1;
                Value::List(list)
            }
            TagID::Compound => {
                self.enter()?;
                let compound = self.compound()?;
                self.depth -= 1;
                Value::Compound(compound)
            }
            TagID::IntArray => {
                let count = self.count()?;
                let bytes = self.elements(count, 4)?;
                let values = <[byteorder::I32<O>]>::ref_from_bytes(bytes)
                    .map_err(|_| TreeError::EndOfFile)?;
                Value::IntArray(values.iter().map(|v| v.get()).collect())
            }
            TagID::LongArray => {
                let count = self.count()?;
                let bytes = self.elements(count, 8)?;
                let values = <[byteorder::I64<O>]>::ref_from_bytes(bytes)
                    .map_err(|_| TreeError::EndOfFile)?;
                Value::LongArray(values.iter().map(|v| v.get()).collect())
            }
        })
    }

    fn list(&mut self) -> Step<List> {
        let element = self.tag_id()?;
        let count = self.count()?;

        // End payloads are empty; such a list carries no values whatever its count.
        if element == TagID::End {
            return Ok(List::empty());
        }

        // Every payload occupies at least one byte, so a count beyond the
        // remaining input can be rejected before allocating for it.
        let min_size = match element.element_size() {
            0 => 1,
            size => size,
        };
        if count.checked_mul(min_size).is_none_or(|len| len > self.remaining()) {
            return Err(TreeError::EndOfFile);
        }

        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(self.payload(element)?);
        }
        Ok(List::from_decoded(element, items))
    }

    fn compound(&mut self) -> Step<Compound> {
        let mut compound = Compound::new();
        loop {
            let tag = self.tag_id()?;
            if tag == TagID::End {
                return Ok(compound);
            }
            let name = self.string()?;
            let value = self.payload(tag)?;
            compound.insert(name, value);
        }
    }
}
