//! Writing found books to disk as JSON.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::{BookRecord, BookSink, Result};

const MAX_NAME_CHARS: usize = 100;

/// Makes `name` usable as part of a file name: path separators, reserved
/// punctuation and control characters become `_`, and the result is cut to
/// 100 characters.
///
/// ```
/// use na_bookscan::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("a<b>:c?"), "a_b__c_");
/// assert_eq!(sanitize_file_name(&"x".repeat(150)).chars().count(), 100);
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '?' | '"' | '/' | '\\' | '|' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_NAME_CHARS)
        .collect()
}

/// Serializes `value` with `indent` spaces per level, keeping non-ASCII text.
pub fn write_json<T: Serialize>(writer: impl Write, value: &T, indent: usize) -> Result<()> {
    let indent = vec![b' '; indent];
    let mut serializer =
        serde_json::Serializer::with_formatter(writer, PrettyFormatter::with_indent(&indent));
    value.serialize(&mut serializer)?;
    Ok(())
}

/// A [`BookSink`] writing `book_<index>_<title>.json` files into one directory.
pub struct JsonExporter {
    dir: PathBuf,
    written: usize,
}

impl JsonExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: 0,
        }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far.
    #[inline]
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path_for(&self, index: usize, book: &BookRecord) -> PathBuf {
        self.dir.join(format!(
            "book_{index:05}_{}.json",
            sanitize_file_name(&book.title)
        ))
    }
}

impl BookSink for JsonExporter {
    fn accept(&mut self, index: usize, book: &BookRecord) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut writer = BufWriter::new(File::create(self.path_for(index, book))?);
        write_json(&mut writer, book, 1)?;
        writer.flush()?;
        self.written += 1;
        Ok(())
    }
}
