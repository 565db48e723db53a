use std::slice;

use crate::{TagID, TreeError};

/// A decoded NBT value.
///
/// The tree is built once by [`read`](crate::read()) and only inspected
/// afterwards; nothing in this crate writes it back out.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// End tag (0).
    End,
    /// Byte tag (1).
    Byte(i8),
    /// Short tag (2).
    Short(i16),
    /// Int tag (3).
    Int(i32),
    /// Long tag (4).
    Long(i64),
    /// Float tag (5).
    Float(f32),
    /// Double tag (6).
    Double(f64),
    /// Byte array tag (7).
    ByteArray(Vec<i8>),
    /// String tag (8).
    String(String),
    /// List tag (9).
    List(List),
    /// Compound tag (10).
    Compound(Compound),
    /// Int array tag (11).
    IntArray(Vec<i32>),
    /// Long array tag (12).
    LongArray(Vec<i64>),
}

impl Value {
    pub fn tag_id(&self) -> TagID {
        match self {
            Value::End => TagID::End,
            Value::Byte(_) => TagID::Byte,
            Value::Short(_) => TagID::Short,
            Value::Int(_) => TagID::Int,
            Value::Long(_) => TagID::Long,
            Value::Float(_) => TagID::Float,
            Value::Double(_) => TagID::Double,
            Value::ByteArray(_) => TagID::ByteArray,
            Value::String(_) => TagID::String,
            Value::List(_) => TagID::List,
            Value::Compound(_) => TagID::Compound,
            Value::IntArray(_) => TagID::IntArray,
            Value::LongArray(_) => TagID::LongArray,
        }
    }

    #[inline]
    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Value::Compound(compound) => Some(compound),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Widens any integral tag to `i64`. Floating point tags are not integers.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Byte(v) => Some(v.into()),
            Value::Short(v) => Some(v.into()),
            Value::Int(v) => Some(v.into()),
            Value::Long(v) => Some(v),
            _ => None,
        }
    }

    /// Widens any numeric tag to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(v) => Some(v.into()),
            Value::Double(v) => Some(v),
            _ => self.as_i64().map(|v| v as f64),
        }
    }

    /// Looks up `key` if this value is a compound.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_compound().and_then(|compound| compound.get(key))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Value::List(value)
    }
}

impl From<Compound> for Value {
    fn from(value: Compound) -> Self {
        Value::Compound(value)
    }
}

/// A homogeneous list. The element type is stored once, as on the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct List {
    element: TagID,
    items: Vec<Value>,
}

impl List {
    /// The empty list, typed `End`.
    pub const fn empty() -> Self {
        Self {
            element: TagID::End,
            items: Vec::new(),
        }
    }

    /// Builds a list, checking that every item is an `element`.
    ///
    /// An empty `items` always produces an `End`-typed list.
    pub fn new(element: TagID, items: Vec<Value>) -> Result<Self, TreeError> {
        if items.is_empty() {
            return Ok(Self::empty());
        }
        if let Some(bad) = items.iter().find(|item| item.tag_id() != element) {
            return Err(TreeError::TagMismatch {
                expected: element,
                actual: bad.tag_id(),
            });
        }
        Ok(Self { element, items })
    }

    /// Used by the decoder, which produces items of `element` by construction.
    pub(crate) fn from_decoded(element: TagID, items: Vec<Value>) -> Self {
        if items.is_empty() {
            Self::empty()
        } else {
            Self { element, items }
        }
    }

    #[inline]
    pub fn element(&self) -> TagID {
        self.element
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }
}

impl Default for List {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Named entries in insertion order. Names are unique.
///
/// Lookups are linear: compounds in save data rarely hold more than a few
/// dozen entries, and keeping them in a `Vec` preserves the on-disk order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Compound {
    entries: Vec<(String, Value)>,
}

impl Compound {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts `value` under `key`. An existing entry keeps its position
    /// and has its value replaced; the old value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> + DoubleEndedIterator {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = &Value> + DoubleEndedIterator {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Compound {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut compound = Compound::new();
        for (key, value) in iter {
            compound.insert(key, value);
        }
        compound
    }
}
