//! Post-export cleanup of book JSON files.
//!
//! Old servers stored Cyrillic text as Windows-1251 bytes that the game
//! later read as Latin-1, so exported books contain mojibake such as
//! `Ïðèâåò` instead of `Привет`, sometimes mixed with correct Cyrillic in
//! one string. This pass repairs every string of every exported file,
//! renames files after their repaired titles, and drops duplicate books.

use std::{
    borrow::Cow,
    collections::HashSet,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use encoding_rs::WINDOWS_1251;
use log::{info, warn};
use serde_json::Value as Json;

use crate::{Error, Result, write_json};

/// Latin-1 letters that Windows-1251 Cyrillic turns into when misread.
const MOJIBAKE_MARKERS: &[char] = &[
    'Ñ', 'Ð', 'Î', 'Â', 'à', 'á', 'â', 'ã', 'ä', 'å', 'æ', 'ç', 'è', 'é', 'ê', 'ë',
];

const MAX_TITLE_CHARS: usize = 50;

#[inline]
fn is_cyrillic(c: char) -> bool {
    ('А'..='я').contains(&c) || c == 'Ё' || c == 'ё'
}

/// Correct Cyrillic and mojibake markers in the same string.
pub fn is_mixed_encoding(text: &str) -> bool {
    text.chars().any(|c| ('А'..='я').contains(&c)) && text.contains(MOJIBAKE_MARKERS)
}

/// Re-reads `text` as Latin-1 bytes decoded with Windows-1251.
///
/// `None` if a character is outside Latin-1 or the bytes do not decode.
fn reinterpret_cp1251(text: &str) -> Option<String> {
    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect::<Option<Vec<u8>>>()?;
    WINDOWS_1251
        .decode_without_bom_handling_and_without_replacement(&bytes)
        .map(Cow::into_owned)
}

/// Repairs mixed strings run by run: Cyrillic runs are kept, everything
/// between them is reinterpreted.
fn repair_mixed(text: &str) -> String {
    let mut repaired = String::with_capacity(text.len());
    let mut run = String::new();
    let mut run_is_cyrillic = None;

    let mut flush = |run: &mut String, cyrillic: bool| {
        if cyrillic {
            repaired.push_str(run);
        } else {
            match reinterpret_cp1251(run) {
                Some(fixed) => repaired.push_str(&fixed),
                None => repaired.push_str(run),
            }
        }
        run.clear();
    };

    for c in text.chars() {
        let cyrillic = is_cyrillic(c);
        if run_is_cyrillic.is_some_and(|current| current != cyrillic) {
            flush(&mut run, !cyrillic);
        }
        run_is_cyrillic = Some(cyrillic);
        run.push(c);
    }
    if let Some(cyrillic) = run_is_cyrillic {
        flush(&mut run, cyrillic);
    }
    repaired
}

/// Repairs one string. Text that cannot be reinterpreted is returned as is.
///
/// ```
/// use na_bookscan::repair_text;
///
/// assert_eq!(repair_text("Ïðèâåò"), "Привет");
/// assert_eq!(repair_text("Привет"), "Привет");
/// assert_eq!(repair_text("plain"), "plain");
/// ```
pub fn repair_text(text: &str) -> Cow<'_, str> {
    if is_mixed_encoding(text) {
        return Cow::Owned(repair_mixed(text));
    }
    match reinterpret_cp1251(text) {
        Some(fixed) if fixed != text => Cow::Owned(fixed),
        _ => Cow::Borrowed(text),
    }
}

/// Repairs every string inside `value`. Object keys are left alone.
pub fn repair_value(value: Json) -> Json {
    match value {
        Json::String(text) => Json::String(repair_text(&text).into_owned()),
        Json::Array(items) => Json::Array(items.into_iter().map(repair_value).collect()),
        Json::Object(map) => Json::Object(
            map.into_iter()
                .map(|(key, value)| (key, repair_value(value)))
                .collect(),
        ),
        other => other,
    }
}

/// `book_<title>.json` with only alphanumerics, `-` and `_`, or the
/// repaired `original` name when the book has no title.
pub fn repaired_file_name(book: &Json, original: &str) -> String {
    match book.get("title").and_then(Json::as_str) {
        Some(title) if !title.is_empty() => {
            let safe: String = title
                .chars()
                .map(|c| {
                    if c.is_alphanumeric() || matches!(c, ' ' | '-' | '_') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            let safe: String = safe
                .trim()
                .replace(' ', "_")
                .chars()
                .take(MAX_TITLE_CHARS)
                .collect();
            format!("book_{safe}.json")
        }
        _ => {
            let path = Path::new(original);
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy())
                .unwrap_or_default();
            let extension = path
                .extension()
                .map(|ext| format!(".{}", ext.to_string_lossy()))
                .unwrap_or_default();
            format!("{}{extension}", repair_text(&stem))
        }
    }
}

/// Identity of a book's content: title, author and pages.
pub fn book_fingerprint(book: &Json) -> String {
    let mut parts: Vec<&str> = Vec::new();
    parts.extend(book.get("title").and_then(Json::as_str));
    parts.extend(book.get("author").and_then(Json::as_str));
    if let Some(pages) = book.get("pages").and_then(Json::as_array) {
        parts.extend(pages.iter().filter_map(Json::as_str));
    }
    parts.join("|")
}

/// `name` in `dir`, suffixed `_01`, `_02`, ... until it is unused.
fn unused_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    (1..)
        .map(|counter| dir.join(format!("{stem}_{counter:02}{extension}")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Outcome of [`repair_directory`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// JSON files found in the input directory.
    pub total: usize,
    /// Files written to the output directory.
    pub repaired: usize,
    /// Input files whose book was already written under another name.
    pub duplicates: Vec<PathBuf>,
    /// Input files that could not be read or parsed.
    pub failed: usize,
}

impl RepairReport {
    #[inline]
    pub fn unique(&self) -> usize {
        self.repaired
    }
}

/// Repairs every `*.json` file of `input` into `output`, keeping one copy
/// of each distinct book.
pub fn repair_directory(input: &Path, output: &Path) -> Result<RepairReport> {
    fs::create_dir_all(output)?;

    let mut files: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();

    let mut report = RepairReport {
        total: files.len(),
        ..RepairReport::default()
    };
    let mut seen = HashSet::new();

    for path in files {
        let book = match fs::read_to_string(&path)
            .map_err(Error::from)
            .and_then(|text| serde_json::from_str::<Json>(&text).map_err(Error::from))
        {
            Ok(book) => repair_value(book),
            Err(e) => {
                warn!("Cannot repair {}: {e}", path.display());
                report.failed += 1;
                continue;
            }
        };

        if !seen.insert(book_fingerprint(&book)) {
            info!("Duplicate dropped: {}", path.display());
            report.duplicates.push(path);
            continue;
        }

        let original = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = unused_path(output, &repaired_file_name(&book, &original));
        let mut writer = BufWriter::new(File::create(&target)?);
        write_json(&mut writer, &book, 2)?;
        writer.flush()?;
        info!("Repaired: {original} -> {}", target.display());
        report.repaired += 1;
    }
    Ok(report)
}
