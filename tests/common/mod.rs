//! Shared fixtures: a reference NBT encoder and region file builder.
#![allow(dead_code)]

use std::io::Write;

use flate2::{
    Compression,
    write::{GzEncoder, ZlibEncoder},
};
use na_bookscan::{Compound, List, TagID, Value};

// ==================== Reference Encoder ====================

pub fn write_named(name: &str, value: &Value) -> Vec<u8> {
    let mut out = vec![value.tag_id() as u8];
    write_string(&mut out, name);
    write_payload(&mut out, value);
    out
}

fn write_string(out: &mut Vec<u8>, text: &str) {
    out.extend_from_slice(&(text.len() as u16).to_be_bytes());
    out.extend_from_slice(text.as_bytes());
}

fn write_payload(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::End => {}
        Value::Byte(v) => out.push(*v as u8),
        Value::Short(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Double(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::ByteArray(v) => {
            out.extend_from_slice(&(v.len() as u32).to_be_bytes());
            out.extend(v.iter().map(|b| *b as u8));
        }
        Value::String(v) => write_string(out, v),
        Value::List(list) => {
            out.push(list.element() as u8);
            out.extend_from_slice(&(list.len() as u32).to_be_bytes());
            for item in list {
                write_payload(out, item);
            }
        }
        Value::Compound(compound) => {
            for (name, item) in compound.iter() {
                out.push(item.tag_id() as u8);
                write_string(out, name);
                write_payload(out, item);
            }
            out.push(TagID::End as u8);
        }
        Value::IntArray(v) => {
            out.extend_from_slice(&(v.len() as u32).to_be_bytes());
            for item in v {
                out.extend_from_slice(&item.to_be_bytes());
            }
        }
        Value::LongArray(v) => {
            out.extend_from_slice(&(v.len() as u32).to_be_bytes());
            for item in v {
                out.extend_from_slice(&item.to_be_bytes());
            }
        }
    }
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

// ==================== Tree Builders ====================

pub fn compound<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Compound(entries.into_iter().collect::<Compound>())
}

pub fn list(element: TagID, items: Vec<Value>) -> Value {
    Value::List(List::new(element, items).unwrap())
}

pub fn strings(items: &[&str]) -> Value {
    list(TagID::String, items.iter().map(|s| Value::from(*s)).collect())
}

/// A written book item stack with every field present.
pub fn book(id: Value, title: &str, author: &str, pages: &[&str]) -> Value {
    compound([
        ("id", id),
        ("Count", Value::Byte(1)),
        (
            "tag",
            compound([
                ("title", title.into()),
                ("author", author.into()),
                ("pages", strings(pages)),
            ]),
        ),
    ])
}

pub fn written_book(title: &str, pages: &[&str]) -> Value {
    book("minecraft:written_book".into(), title, "A", pages)
}

/// A chest tile entity holding `items` in its `Items` list.
pub fn chest(x: i32, y: i32, z: i32, items: Vec<Value>) -> Value {
    compound([
        ("id", "Chest".into()),
        ("x", Value::Int(x)),
        ("y", Value::Int(y)),
        ("z", Value::Int(z)),
        ("Items", list(TagID::Compound, items)),
    ])
}

/// A legacy chunk root: `{Level: {TileEntities, Entities}}`.
pub fn chunk(tile_entities: Vec<Value>, entities: Vec<Value>) -> Value {
    compound([(
        "Level",
        compound([
            ("xPos", Value::Int(0)),
            ("zPos", Value::Int(0)),
            ("TileEntities", list(TagID::Compound, tile_entities)),
            ("Entities", list(TagID::Compound, entities)),
        ]),
    )])
}

// ==================== Region Builder ====================

pub const SECTOR: usize = 4096;

/// Builds a region file image. Each chunk is `(slot, scheme, compressed bytes)`.
/// Chunks are stored from sector 2 on, after the location and timestamp tables.
pub fn region_file(chunks: &[(usize, u8, Vec<u8>)]) -> Vec<u8> {
    let mut file = vec![0u8; 2 * SECTOR];
    let mut sector = 2u32;
    for (slot, scheme, payload) in chunks {
        let mut body = Vec::with_capacity(payload.len() + 5);
        body.extend_from_slice(&(payload.len() as u32 + 1).to_be_bytes());
        body.push(*scheme);
        body.extend_from_slice(payload);
        let sectors = body.len().div_ceil(SECTOR);
        body.resize(sectors * SECTOR, 0);

        let entry = (sector << 8) | sectors as u32;
        file[slot * 4..slot * 4 + 4].copy_from_slice(&entry.to_be_bytes());
        file.extend_from_slice(&body);
        sector += sectors as u32;
    }
    file
}

/// A zlib chunk entry for [`region_file`].
pub fn zlib_chunk(slot: usize, root: &Value) -> (usize, u8, Vec<u8>) {
    (slot, 2, zlib(&write_named("", root)))
}
