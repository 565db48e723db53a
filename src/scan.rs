//! Driving extraction over a whole world save.
//!
//! A [`Scanner`] visits `level.dat`, `playerdata/*.dat` and `region/*.mca`
//! of each world it is given, hands every book found to a [`BookSink`] and
//! keeps the run's [`ScanStats`]. Failures are logged and skipped at the
//! smallest unit that produced them: one slot, one file, or one region
//! whose location table cannot be read.

use std::{
    borrow::Cow,
    fs::{self, File},
    io::{BufReader, Read, Seek},
    ops::AddAssign,
    path::{Path, PathBuf},
};

use log::{debug, error, info, warn};

use crate::{
    BookDefaults, BookRecord, Books, ChunkPos, Error, ItemStacks, NamedTag, RegionFile,
    RegionPos, Result, Value, book_from_item, compression, read_be,
};

/// Receives books as they are found.
///
/// `index` is the 1-based running total of books found by the scanner.
pub trait BookSink {
    fn accept(&mut self, index: usize, book: &BookRecord) -> Result<()>;
}

impl BookSink for Vec<BookRecord> {
    fn accept(&mut self, _index: usize, book: &BookRecord) -> Result<()> {
        self.push(book.clone());
        Ok(())
    }
}

impl<S: BookSink + ?Sized> BookSink for &mut S {
    #[inline]
    fn accept(&mut self, index: usize, book: &BookRecord) -> Result<()> {
        (**self).accept(index, book)
    }
}

/// Counters reported at the end of a run.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct ScanStats {
    /// Region files whose location table was read.
    pub regions: usize,
    /// Chunks where at least one tile entity held an item stack.
    pub chunks_with_containers: usize,
    /// Books handed to the sink.
    pub books: usize,
}

impl AddAssign for ScanStats {
    fn add_assign(&mut self, other: Self) {
        self.regions += other.regions;
        self.chunks_with_containers += other.chunks_with_containers;
        self.books += other.books;
    }
}

/// Reads a standalone `.dat` file: gzip if it inflates, raw otherwise.
pub fn load_standalone(path: &Path) -> Result<NamedTag> {
    let data = fs::read(path).map_err(|source| Error::UnreadableSourceFile {
        path: path.to_owned(),
        source,
    })?;
    read_be(&compression::decompress_lenient(data))
}

fn world_name(world_dir: &Path) -> String {
    world_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| world_dir.display().to_string())
}

/// The `id` of a tile entity or entity as text. Old saves store numeric ids.
fn entity_id(entity: &Value) -> Cow<'_, str> {
    match entity.get("id") {
        Some(Value::String(id)) => Cow::Borrowed(id.as_str()),
        Some(other) => other
            .as_i64()
            .map_or(Cow::Borrowed("unknown"), |id| Cow::Owned(id.to_string())),
        None => Cow::Borrowed("unknown"),
    }
}

/// Files in `dir` with `extension`, sorted by name.
fn files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn emit<S: BookSink>(sink: &mut S, stats: &mut ScanStats, book: BookRecord) {
    stats.books += 1;
    info!(
        "BOOK #{}  \"{}\" ({})  -  {}",
        stats.books, book.title, book.author, book.location
    );
    if let Err(e) = sink.accept(stats.books, &book) {
        error!("Failed to store book #{}: {e}", stats.books);
    }
}

pub struct Scanner<S> {
    sink: S,
    stats: ScanStats,
    defaults: BookDefaults,
}

impl<S: BookSink> Scanner<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            stats: ScanStats::default(),
            defaults: BookDefaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: BookDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    #[inline]
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_parts(self) -> (S, ScanStats) {
        (self.sink, self.stats)
    }

    /// Emits every book under `root`. Returns how many were found.
    pub fn extract(&mut self, root: &Value, location: &str) -> usize {
        let Self {
            sink,
            stats,
            defaults,
        } = self;
        let mut found = 0;
        for book in Books::new(root, location, defaults) {
            emit(sink, stats, book);
            found += 1;
        }
        found
    }

    /// Scans `level.dat`, player data and region files of one world.
    pub fn scan_world(&mut self, world_dir: &Path) {
        info!("Scanning world: {}", world_dir.display());
        self.scan_level_dat(world_dir);
        self.scan_players(world_dir);
        self.scan_regions(world_dir);
    }

    pub fn scan_level_dat(&mut self, world_dir: &Path) {
        let path = world_dir.join("level.dat");
        if !path.is_file() {
            return;
        }
        let location = format!("{}: level.dat", world_name(world_dir));
        if let Err(e) = self.scan_standalone(&path, &location) {
            warn!("Skipping {}: {e}", path.display());
        }
    }

    pub fn scan_players(&mut self, world_dir: &Path) {
        let dir = world_dir.join("playerdata");
        if !dir.is_dir() {
            return;
        }
        let files = match files_with_extension(&dir, "dat") {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot list {}: {e}", dir.display());
                return;
            }
        };
        let world = world_name(world_dir);
        for path in files {
            let uuid = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let location = format!("{world}: player:{uuid}");
            if let Err(e) = self.scan_standalone(&path, &location) {
                warn!("Skipping player file {}: {e}", path.display());
            }
        }
    }

    /// Decodes one standalone file and emits its books.
    pub fn scan_standalone(&mut self, path: &Path, location: &str) -> Result<usize> {
        let root = load_standalone(path)?;
        Ok(self.extract(&root.value, location))
    }

    pub fn scan_regions(&mut self, world_dir: &Path) {
        let dir = world_dir.join("region");
        if !dir.is_dir() {
            return;
        }
        let files = match files_with_extension(&dir, "mca") {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot list {}: {e}", dir.display());
                return;
            }
        };
        let world = world_name(world_dir);
        for path in files {
            if let Err(e) = self.scan_region_file(&path, &world) {
                warn!("Skipping region {}: {e}", path.display());
            }
        }
    }

    /// Scans one `.mca` file. Errors mean the whole container was skipped.
    pub fn scan_region_file(&mut self, path: &Path, world: &str) -> Result<()> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let region = RegionPos::from_file_name(&name)?;
        let file = File::open(path).map_err(|source| Error::UnreadableSourceFile {
            path: path.to_owned(),
            source,
        })?;
        info!("Scanning region {name} in world {world}");
        self.scan_region(BufReader::new(file), region, world, &name)
    }

    /// Scans every populated slot of a region container, in slot order.
    ///
    /// Only an unreadable location table or a region whose chunk
    /// coordinates overflow `i32` is returned as an error; every per-slot
    /// failure is logged with `label` and the slot, then skipped.
    pub fn scan_region<R: Read + Seek>(
        &mut self,
        reader: R,
        region: RegionPos,
        world: &str,
        label: &str,
    ) -> Result<()> {
        if !region.is_addressable() {
            return Err(Error::InvalidRegionName(label.to_owned()));
        }
        let mut file = RegionFile::new(reader)?;
        let slots: Vec<usize> = file.index().populated().map(|(slot, _)| slot).collect();
        debug!("{label}: {} populated slots", slots.len());

        for slot in slots {
            match file.read_chunk(slot) {
                Ok(Some(root)) => {
                    if self.scan_chunk(&root.value, world) {
                        self.stats.chunks_with_containers += 1;
                    }
                }
                Ok(None) => {}
                Err(e) => match ChunkPos::from_slot(region, slot) {
                    Some(pos) => warn!(
                        "Skipping chunk ({},{}) slot {slot} in {label}: {e}",
                        pos.x, pos.z
                    ),
                    None => warn!("Skipping slot {slot} in {label}: {e}"),
                },
            }
        }
        self.stats.regions += 1;
        Ok(())
    }

    /// Extracts books from the tile entities and entities of one chunk.
    ///
    /// Returns `true` if any tile entity held an item stack.
    pub fn scan_chunk(&mut self, root: &Value, world: &str) -> bool {
        let Some(level) = root.get("Level") else {
            return false;
        };
        let Self {
            sink,
            stats,
            defaults,
        } = self;

        let mut has_containers = false;
        for tile in level
            .get("TileEntities")
            .and_then(Value::as_list)
            .into_iter()
            .flatten()
        {
            let id = entity_id(tile);
            let coord = |key| tile.get(key).and_then(Value::as_i64).unwrap_or(0);
            let location = format!(
                "{world}: {id} at ({},{},{})",
                coord("x"),
                coord("y"),
                coord("z")
            );
            for item in ItemStacks::new(tile) {
                has_containers = true;
                if let Some(book) = book_from_item(item, &location, defaults) {
                    emit(sink, stats, book);
                }
            }
        }

        for entity in level
            .get("Entities")
            .and_then(Value::as_list)
            .into_iter()
            .flatten()
        {
            let id = entity_id(entity);
            let pos = entity.get("Pos").and_then(Value::as_list);
            let axis = |i| {
                pos.and_then(|pos| pos.get(i))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0)
            };
            let location = format!(
                "{world}: {id} at ({:.1},{:.1},{:.1})",
                axis(0),
                axis(1),
                axis(2)
            );
            for book in Books::new(entity, &location, defaults) {
                emit(sink, stats, book);
            }
        }
        has_containers
    }
}
