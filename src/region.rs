//! Region container (`.mca`) access.
//!
//! A region file starts with a 4096-byte location table: 1024 big-endian
//! `u32` entries, one per chunk slot, each packing a 3-byte sector offset
//! and a 1-byte sector count. Chunk data lives at `offset * 4096` as a
//! 4-byte length, a compression scheme byte and `length - 1` compressed
//! bytes.

use std::io::{Read, Seek, SeekFrom};

use log::trace;
use zerocopy::{BigEndian, FromBytes, byteorder};

use crate::{Error, NamedTag, Result, compression, read_be};

/// Size of one allocation unit within a region file.
pub const SECTOR_SIZE: usize = 4096;
/// Chunks per region edge.
pub const REGION_WIDTH: usize = 32;
/// Slots in the location table.
pub const SLOT_COUNT: usize = REGION_WIDTH * REGION_WIDTH;

/// One location table entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct SlotDescriptor {
    /// Offset from the file start, in sectors.
    pub sector_offset: u32,
    pub sector_count: u8,
}

impl SlotDescriptor {
    /// Splits a raw table entry: top three bytes offset, low byte count.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            sector_offset: raw >> 8,
            sector_count: (raw & 0xFF) as u8,
        }
    }

    /// A slot with no chunk. Either field being zero marks it absent.
    #[inline]
    pub const fn is_absent(&self) -> bool {
        self.sector_offset == 0 || self.sector_count == 0
    }

    #[inline]
    pub const fn byte_offset(&self) -> u64 {
        self.sector_offset as u64 * SECTOR_SIZE as u64
    }
}

/// The parsed location table of one region file.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RegionIndex {
    slots: Box<[SlotDescriptor; SLOT_COUNT]>,
}

impl RegionIndex {
    /// Parses the first 4096 bytes of `header`.
    ///
    /// Fails with [`Error::TruncatedHeader`] when fewer bytes are given.
    pub fn parse(header: &[u8]) -> Result<Self> {
        let table = header
            .get(..SECTOR_SIZE)
            .ok_or(Error::TruncatedHeader {
                found: header.len(),
            })?;
        let entries = <[byteorder::U32<BigEndian>]>::ref_from_bytes(table).map_err(|_| {
            Error::TruncatedHeader {
                found: header.len(),
            }
        })?;
        let mut slots = Box::new([SlotDescriptor::default(); SLOT_COUNT]);
        for (slot, entry) in slots.iter_mut().zip(entries) {
            *slot = SlotDescriptor::from_raw(entry.get());
        }
        Ok(Self { slots })
    }

    /// Reads the table from the start of `reader`.
    pub fn read_from<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let mut header = Vec::with_capacity(SECTOR_SIZE);
        reader.take(SECTOR_SIZE as u64).read_to_end(&mut header)?;
        Self::parse(&header)
    }

    #[inline]
    pub fn get(&self, slot: usize) -> Option<SlotDescriptor> {
        self.slots.get(slot).copied()
    }

    /// All 1024 descriptors in slot order.
    pub fn slots(&self) -> &[SlotDescriptor; SLOT_COUNT] {
        &self.slots
    }

    /// Slots holding a chunk, in ascending slot order.
    pub fn populated(&self) -> impl Iterator<Item = (usize, SlotDescriptor)> + '_ {
        self.slots
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, slot)| !slot.is_absent())
    }
}

/// Raw chunk bytes as stored in a sector run.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ChunkPayload {
    pub compression: u8,
    pub data: Vec<u8>,
}

impl ChunkPayload {
    #[inline]
    pub fn decompress(&self) -> Result<Vec<u8>> {
        compression::decompress(self.compression, &self.data)
    }
}

/// Seeks to `descriptor` and reads its length-prefixed payload.
///
/// Seeks on every call; slots are not laid out sequentially.
pub fn read_payload<R: Read + Seek>(
    reader: &mut R,
    slot: usize,
    descriptor: SlotDescriptor,
) -> Result<ChunkPayload> {
    reader.seek(SeekFrom::Start(descriptor.byte_offset()))?;

    let mut head = Vec::with_capacity(5);
    reader.by_ref().take(5).read_to_end(&mut head)?;
    let Ok(head) = <[u8; 5]>::try_from(head.as_slice()) else {
        return Err(Error::TruncatedChunkHeader { slot });
    };
    let [l0, l1, l2, l3, compression] = head;
    let length = byteorder::U32::<BigEndian>::from_bytes([l0, l1, l2, l3]).get() as usize;
    let Some(expected) = length.checked_sub(1) else {
        return Err(Error::TruncatedChunkHeader { slot });
    };

    // `take` bounds the allocation by what the file actually holds.
    let mut data = Vec::new();
    reader.by_ref().take(expected as u64).read_to_end(&mut data)?;
    if data.len() < expected {
        return Err(Error::TruncatedChunkPayload {
            slot,
            expected,
            found: data.len(),
        });
    }
    trace!("Slot {slot}: {expected} bytes, scheme {compression}");
    Ok(ChunkPayload { compression, data })
}

/// An open region container and its location table.
pub struct RegionFile<R> {
    reader: R,
    index: RegionIndex,
}

impl<R: Read + Seek> RegionFile<R> {
    /// Reads the location table. Fails only on [`Error::TruncatedHeader`]
    /// or an I/O error.
    pub fn new(mut reader: R) -> Result<Self> {
        let index = RegionIndex::read_from(&mut reader)?;
        Ok(Self { reader, index })
    }

    #[inline]
    pub fn index(&self) -> &RegionIndex {
        &self.index
    }

    /// Reads the raw payload of `slot`, or `None` for an absent slot.
    pub fn read_payload(&mut self, slot: usize) -> Result<Option<ChunkPayload>> {
        match self.index.get(slot) {
            Some(descriptor) if !descriptor.is_absent() => {
                read_payload(&mut self.reader, slot, descriptor).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Reads, decompresses and decodes `slot`.
    pub fn read_chunk(&mut self, slot: usize) -> Result<Option<NamedTag>> {
        let Some(payload) = self.read_payload(slot)? else {
            return Ok(None);
        };
        let raw = payload.decompress()?;
        read_be(&raw).map(Some)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Region coordinates, in units of 32 chunks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    /// Parses `r.<x>.<z>.mca`: the second and third dot-separated fields.
    ///
    /// ```
    /// use na_bookscan::RegionPos;
    ///
    /// assert_eq!(RegionPos::from_file_name("r.-1.2.mca").unwrap(), RegionPos { x: -1, z: 2 });
    /// assert!(RegionPos::from_file_name("level.dat").is_err());
    /// ```
    pub fn from_file_name(name: &str) -> Result<Self> {
        let invalid = || Error::InvalidRegionName(name.to_owned());
        let mut fields = name.split('.').skip(1);
        let x = fields.next().and_then(|f| f.parse().ok()).ok_or_else(invalid)?;
        let z = fields.next().and_then(|f| f.parse().ok()).ok_or_else(invalid)?;
        let region = Self { x, z };
        if !region.is_addressable() {
            return Err(invalid());
        }
        Ok(region)
    }

    /// Whether every chunk of this region has coordinates that fit in `i32`.
    #[inline]
    pub const fn is_addressable(&self) -> bool {
        let min = i32::MIN / REGION_WIDTH as i32;
        let max = i32::MAX / REGION_WIDTH as i32;
        self.x >= min && self.x <= max && self.z >= min && self.z <= max
    }
}

/// Absolute chunk coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    /// World position of `slot` inside `region`.
    ///
    /// `None` when the position does not fit in `i32`, as for any region
    /// that is not [addressable](RegionPos::is_addressable).
    pub fn from_slot(region: RegionPos, slot: usize) -> Option<Self> {
        let width = REGION_WIDTH as i32;
        let local_x = i32::try_from(slot % REGION_WIDTH).ok()?;
        let local_z = i32::try_from(slot / REGION_WIDTH).ok()?;
        Some(Self {
            x: region.x.checked_mul(width)?.checked_add(local_x)?,
            z: region.z.checked_mul(width)?.checked_add(local_z)?,
        })
    }

    /// Inverse of [`from_slot`](Self::from_slot).
    #[inline]
    pub const fn slot(&self) -> usize {
        let width = REGION_WIDTH as i32;
        (self.x.rem_euclid(width) + width * self.z.rem_euclid(width)) as usize
    }

    /// The region containing this chunk.
    #[inline]
    pub const fn region(&self) -> RegionPos {
        let width = REGION_WIDTH as i32;
        RegionPos {
            x: self.x.div_euclid(width),
            z: self.z.div_euclid(width),
        }
    }
}
