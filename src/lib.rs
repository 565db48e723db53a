//! Finds written books in Minecraft world saves.
//!
//! The pipeline reads region containers ([`RegionFile`]), inflates chunk
//! payloads ([`compression`]), decodes NBT into a [`Value`] tree
//! ([`read_be`]) and walks that tree for written-book item stacks
//! ([`extract_books`]). [`Scanner`] ties the steps together for whole
//! worlds, and [`JsonExporter`] stores what it finds.

pub use zerocopy::BigEndian;
pub use zerocopy::LittleEndian;

pub mod compression;
mod error;
mod export;
mod extract;
mod read;
mod region;
pub mod repair;
mod scan;
mod tag;
mod value;
mod world;

pub use error::*;
pub use export::*;
pub use extract::*;
pub use read::*;
pub use region::*;
pub use repair::{RepairReport, repair_directory, repair_text};
pub use scan::*;
pub use tag::*;
pub use value::*;
pub use world::*;
