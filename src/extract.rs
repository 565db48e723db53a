//! Finding written books anywhere in a decoded tree.
//!
//! [`ItemStacks`] walks every compound and list depth-first and yields
//! each compound shaped like an item stack (`id` and `Count` present).
//! [`Books`] narrows that to written books and turns them into
//! [`BookRecord`]s. Both are lazy: records are produced as the walk
//! reaches them.

use std::borrow::Cow;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::{Compound, List, TagID, Value};

/// Canonical identifier of the written book item.
pub const WRITTEN_BOOK: &str = "minecraft:written_book";

const NAMESPACE: &str = "minecraft:";

/// Numeric item ids from saves written before string ids existed.
const LEGACY_ITEM_IDS: &[(i64, &str)] = &[
    (386, "minecraft:writable_book"),
    (387, "minecraft:written_book"),
];

/// One written book found in a save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub pages: Vec<String>,
    /// Where the book was found, e.g. `world: minecraft:chest at (10,64,-3)`.
    pub location: String,
    pub count: i64,
    /// Local discovery time, ISO-8601 to the second.
    pub found_at: String,
}

/// Values used when a book lacks a title or author.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookDefaults {
    pub title: Cow<'static, str>,
    pub author: Cow<'static, str>,
}

impl BookDefaults {
    pub const fn new() -> Self {
        Self {
            title: Cow::Borrowed("Untitled"),
            author: Cow::Borrowed("Unknown"),
        }
    }
}

impl Default for BookDefaults {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_BOOK: BookDefaults = BookDefaults::new();

/// Normalizes an item id to its namespaced string form.
///
/// Integral ids (and strings holding one) go through the legacy table;
/// unknown numbers become their decimal text. Un-namespaced strings gain
/// `minecraft:`.
///
/// ```
/// use na_bookscan::{Value, normalize_item_id};
///
/// assert_eq!(normalize_item_id(&Value::Short(387)).as_deref(), Some("minecraft:written_book"));
/// assert_eq!(normalize_item_id(&"written_book".into()).as_deref(), Some("minecraft:written_book"));
/// assert_eq!(normalize_item_id(&Value::Int(1)).as_deref(), Some("1"));
/// assert_eq!(normalize_item_id(&Value::Double(387.0)), None);
/// ```
pub fn normalize_item_id(id: &Value) -> Option<Cow<'_, str>> {
    let numeric = match id {
        Value::String(text) => match text.trim().parse::<i64>() {
            Ok(number) => number,
            Err(_) if text.contains(':') => return Some(Cow::Borrowed(text.as_str())),
            Err(_) => return Some(Cow::Owned(format!("{NAMESPACE}{text}"))),
        },
        other => other.as_i64()?,
    };
    Some(
        LEGACY_ITEM_IDS
            .iter()
            .find(|(legacy, _)| *legacy == numeric)
            .map_or_else(|| Cow::Owned(numeric.to_string()), |(_, name)| Cow::Borrowed(*name)),
    )
}

/// `id` and `Count` both present.
#[inline]
pub fn is_item_stack(compound: &Compound) -> bool {
    compound.contains_key("id") && compound.contains_key("Count")
}

/// An item stack whose id is the written book and whose `tag` compound
/// holds a `pages` list.
pub fn is_written_book(item: &Compound) -> bool {
    written_book_pages(item).is_some()
}

fn written_book_pages(item: &Compound) -> Option<(&Compound, &List)> {
    if !is_item_stack(item) {
        return None;
    }
    let id = normalize_item_id(item.get("id")?)?;
    if id != WRITTEN_BOOK {
        return None;
    }
    let tag = item.get("tag")?.as_compound()?;
    let pages = tag.get("pages")?.as_list()?;
    Some((tag, pages))
}

/// Builds the record for `item` if it is a written book.
///
/// Title, author, pages and count are defaulted independently when absent
/// or of the wrong type. Pages come only from a list of strings.
pub fn book_from_item(
    item: &Compound,
    location: &str,
    defaults: &BookDefaults,
) -> Option<BookRecord> {
    let (tag, pages) = written_book_pages(item)?;
    let text = |key: &str, fallback: &str| {
        tag.get(key)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_owned()
    };
    let pages = if pages.element() == TagID::String {
        pages
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect()
    } else {
        Vec::new()
    };
    Some(BookRecord {
        title: text("title", defaults.title.as_ref()),
        author: text("author", defaults.author.as_ref()),
        pages,
        location: location.to_owned(),
        count: item.get("Count").and_then(Value::as_i64).unwrap_or(1),
        found_at: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
    })
}

/// Depth-first, pre-order walk yielding every item-stack compound.
///
/// Matched compounds are still descended into.
pub struct ItemStacks<'a> {
    stack: Vec<&'a Value>,
}

impl<'a> ItemStacks<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for ItemStacks<'a> {
    type Item = &'a Compound;

    fn next(&mut self) -> Option<Self::Item> {
        let is_composite = |value: &&Value| value.tag_id().is_composite();
        while let Some(value) = self.stack.pop() {
            match value {
                Value::Compound(compound) => {
                    self.stack
                        .extend(compound.values().rev().filter(is_composite));
                    if is_item_stack(compound) {
                        return Some(compound);
                    }
                }
                Value::List(list) => self.stack.extend(list.iter().rev().filter(is_composite)),
                _ => {}
            }
        }
        None
    }
}

/// Written books under one root, tagged with a fixed location.
pub struct Books<'a> {
    items: ItemStacks<'a>,
    location: &'a str,
    defaults: &'a BookDefaults,
}

impl<'a> Books<'a> {
    pub fn new(root: &'a Value, location: &'a str, defaults: &'a BookDefaults) -> Self {
        Self {
            items: ItemStacks::new(root),
            location,
            defaults,
        }
    }
}

impl Iterator for Books<'_> {
    type Item = BookRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.items
            .by_ref()
            .find_map(|item| book_from_item(item, self.location, self.defaults))
    }
}

/// Every written book under `root`, with the built-in defaults.
///
/// ```
/// use na_bookscan::{Compound, List, TagID, Value, extract_books};
///
/// let tag: Compound = [
///     ("title", Value::from("T")),
///     ("pages", List::new(TagID::String, vec!["p1".into()]).unwrap().into()),
/// ]
/// .into_iter()
/// .collect();
/// let item: Compound = [
///     ("id", Value::from("minecraft:written_book")),
///     ("Count", Value::Byte(1)),
///     ("tag", tag.into()),
/// ]
/// .into_iter()
/// .collect();
///
/// let root = Value::Compound(item);
/// let books: Vec<_> = extract_books(&root, "here").collect();
/// assert_eq!(books.len(), 1);
/// assert_eq!(books[0].author, "Unknown");
/// ```
pub fn extract_books<'a>(root: &'a Value, location: &'a str) -> Books<'a> {
    Books::new(root, location, &DEFAULT_BOOK)
}
