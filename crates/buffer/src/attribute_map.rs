// Chunk: docs/chunks/attribute_map - Immutable persistent attribute maps

//! Immutable attribute maps and key sets.
//!
//! An [`AttributeMap`] is the value type of one style. It is never mutated
//! after construction: every "modifying" operation returns a new map, and an
//! operation that would not change anything returns a handle to the same
//! storage. Entries live in a sorted slice behind an `Arc`, so cloning a map is
//! O(1) and unchanged maps are shared between runs.
//!
//! All set-like operations are linear merges over the two sorted inputs.
//!
//! # Example
//!
//! ```
//! use styled_text_buffer::{AttributeKey, AttributeMap, AttributeSet};
//!
//! let bold = AttributeMap::new(AttributeKey::Weight, 700i64);
//! let style = bold.add_attribute(AttributeKey::Family, "Serif");
//! assert_eq!(style.len(), 2);
//! assert_eq!(bold.len(), 1); // unchanged
//!
//! let plain = style.remove_attributes(&AttributeSet::single(AttributeKey::Weight));
//! assert_eq!(plain, AttributeMap::new(AttributeKey::Family, "Serif"));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::attribute::{AttributeKey, AttributeValue};

type Entry = (AttributeKey, AttributeValue);

// =============================================================================
// AttributeMap
// =============================================================================

/// An immutable map from [`AttributeKey`] to [`AttributeValue`].
///
/// Equality is structural: two maps are equal when they hold the same
/// key/value pairs, regardless of how they were built.
#[derive(Clone)]
pub struct AttributeMap {
    /// Sorted by key, keys unique.
    entries: Arc<[Entry]>,
}

impl AttributeMap {
    /// Returns the shared empty map.
    pub fn empty() -> Self {
        static EMPTY: OnceLock<AttributeMap> = OnceLock::new();
        EMPTY
            .get_or_init(|| AttributeMap {
                entries: Arc::from(Vec::<Entry>::new()),
            })
            .clone()
    }

    /// Creates a map with a single entry.
    pub fn new(key: AttributeKey, value: impl Into<AttributeValue>) -> Self {
        Self::from_sorted(vec![(key, value.into())])
    }

    fn from_sorted(entries: Vec<Entry>) -> Self {
        if entries.is_empty() {
            return Self::empty();
        }
        Self {
            entries: Arc::from(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, key: &AttributeKey) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.cmp(key))
    }

    /// Returns the value stored for `key`.
    pub fn get(&self, key: &AttributeKey) -> Option<&AttributeValue> {
        self.find(key).ok().map(|i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &AttributeKey) -> bool {
        self.find(key).is_ok()
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &AttributeValue)> + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &AttributeKey> + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Returns the keys of this map as an [`AttributeSet`].
    pub fn key_set(&self) -> AttributeSet {
        AttributeSet::from_sorted(self.keys().cloned().collect())
    }

    /// Returns true if both handles share the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    // ==================== Operations ====================

    /// Returns a map with `key` set to `value`.
    ///
    /// If the key is already present its value is replaced.
    pub fn add_attribute(&self, key: AttributeKey, value: impl Into<AttributeValue>) -> Self {
        let value = value.into();
        match self.find(&key) {
            Ok(i) if self.entries[i].1 == value => self.clone(),
            Ok(i) => {
                let mut entries = self.entries.to_vec();
                entries[i].1 = value;
                Self::from_sorted(entries)
            }
            Err(i) => {
                let mut entries = Vec::with_capacity(self.len() + 1);
                entries.extend_from_slice(&self.entries[..i]);
                entries.push((key, value));
                entries.extend_from_slice(&self.entries[i..]);
                Self::from_sorted(entries)
            }
        }
    }

    /// Returns the union of this map and `other`. Values from `other` win.
    ///
    /// When either side is empty the other operand is returned as is.
    pub fn add_attributes(&self, other: &AttributeMap) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }

        let mut entries = Vec::with_capacity(self.len() + other.len());
        let mut lhs = self.entries.iter().peekable();
        let mut rhs = other.entries.iter().peekable();
        loop {
            let next = match (lhs.peek(), rhs.peek()) {
                (Some(a), Some(b)) => match a.0.cmp(&b.0) {
                    Ordering::Less => lhs.next(),
                    Ordering::Greater => rhs.next(),
                    Ordering::Equal => {
                        lhs.next();
                        rhs.next()
                    }
                },
                (Some(_), None) => lhs.next(),
                (None, Some(_)) => rhs.next(),
                (None, None) => break,
            };
            if let Some(entry) = next {
                entries.push(entry.clone());
            }
        }

        if entries.as_slice() == &*self.entries {
            return self.clone();
        }
        Self::from_sorted(entries)
    }

    /// Returns a map without `key`.
    pub fn remove_attribute(&self, key: &AttributeKey) -> Self {
        match self.find(key) {
            Ok(i) => {
                let mut entries = self.entries.to_vec();
                entries.remove(i);
                Self::from_sorted(entries)
            }
            Err(_) => self.clone(),
        }
    }

    /// Returns a map without any of the keys in `keys`.
    pub fn remove_attributes(&self, keys: &AttributeSet) -> Self {
        if self.is_empty() || keys.is_empty() {
            return self.clone();
        }
        let kept = self.filter_by_set(keys, false);
        if kept.len() == self.len() {
            return self.clone();
        }
        Self::from_sorted(kept)
    }

    /// Returns a map holding only the keys that are also in `keys`.
    pub fn intersect_with(&self, keys: &AttributeSet) -> Self {
        let kept = self.filter_by_set(keys, true);
        if kept.len() == self.len() {
            return self.clone();
        }
        Self::from_sorted(kept)
    }

    /// Merge-walks the sorted entries against the sorted key set, keeping an
    /// entry when its membership in `keys` equals `keep_members`.
    fn filter_by_set(&self, keys: &AttributeSet, keep_members: bool) -> Vec<Entry> {
        let mut kept = Vec::with_capacity(self.len());
        let mut set = keys.iter().peekable();
        for entry in self.entries.iter() {
            while set.peek().is_some_and(|k| *k < &entry.0) {
                set.next();
            }
            let is_member = set.peek().is_some_and(|k| *k == &entry.0);
            if is_member == keep_members {
                kept.push(entry.clone());
            }
        }
        kept
    }
}

impl Default for AttributeMap {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for AttributeMap {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.entries == other.entries
    }
}

impl Eq for AttributeMap {}

impl Hash for AttributeMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.hash(state);
    }
}

impl fmt::Debug for AttributeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(AttributeKey, AttributeValue)> for AttributeMap {
    /// Builds a map from arbitrary pairs; for duplicate keys the last pair wins.
    fn from_iter<I: IntoIterator<Item = (AttributeKey, AttributeValue)>>(iter: I) -> Self {
        let mut pairs: Vec<Entry> = iter.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut entries: Vec<Entry> = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            match entries.last_mut() {
                Some(last) if last.0 == key => last.1 = value,
                _ => entries.push((key, value)),
            }
        }
        Self::from_sorted(entries)
    }
}

// =============================================================================
// AttributeSet
// =============================================================================

/// An immutable set of attribute keys.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AttributeSet {
    /// Sorted, unique.
    keys: Arc<[AttributeKey]>,
}

impl AttributeSet {
    /// Returns the shared empty set.
    pub fn empty() -> Self {
        static EMPTY: OnceLock<AttributeSet> = OnceLock::new();
        EMPTY
            .get_or_init(|| AttributeSet {
                keys: Arc::from(Vec::<AttributeKey>::new()),
            })
            .clone()
    }

    /// Creates a set holding one key.
    pub fn single(key: AttributeKey) -> Self {
        Self::from_sorted(vec![key])
    }

    fn from_sorted(keys: Vec<AttributeKey>) -> Self {
        if keys.is_empty() {
            return Self::empty();
        }
        Self {
            keys: Arc::from(keys),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &AttributeKey) -> bool {
        self.keys.binary_search(key).is_ok()
    }

    /// Iterates keys in sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, AttributeKey> {
        self.keys.iter()
    }

    /// Returns a set with `key` added.
    pub fn add_element(&self, key: AttributeKey) -> Self {
        match self.keys.binary_search(&key) {
            Ok(_) => self.clone(),
            Err(i) => {
                let mut keys = self.keys.to_vec();
                keys.insert(i, key);
                Self::from_sorted(keys)
            }
        }
    }

    /// Returns the keys in either set.
    pub fn union_with(&self, other: &AttributeSet) -> Self {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut keys = Vec::with_capacity(self.len() + other.len());
        let mut lhs = self.iter().peekable();
        let mut rhs = other.iter().peekable();
        loop {
            let next = match (lhs.peek(), rhs.peek()) {
                (Some(a), Some(b)) => match a.cmp(b) {
                    Ordering::Less => lhs.next(),
                    Ordering::Greater => rhs.next(),
                    Ordering::Equal => {
                        rhs.next();
                        lhs.next()
                    }
                },
                (Some(_), None) => lhs.next(),
                (None, Some(_)) => rhs.next(),
                (None, None) => break,
            };
            if let Some(key) = next {
                keys.push(key.clone());
            }
        }
        Self::from_sorted(keys)
    }

    /// Returns the keys present in both sets.
    pub fn intersect_with(&self, other: &AttributeSet) -> Self {
        self.filter_by(other, true)
    }

    /// Returns the keys of this set that are not in `other`.
    pub fn subtract(&self, other: &AttributeSet) -> Self {
        self.filter_by(other, false)
    }

    fn filter_by(&self, other: &AttributeSet, keep_members: bool) -> Self {
        let mut keys = Vec::with_capacity(self.len());
        let mut rhs = other.iter().peekable();
        for key in self.iter() {
            while rhs.peek().is_some_and(|k| *k < key) {
                rhs.next();
            }
            let is_member = rhs.peek().is_some_and(|k| *k == key);
            if is_member == keep_members {
                keys.push(key.clone());
            }
        }
        if keys.len() == self.len() {
            return self.clone();
        }
        Self::from_sorted(keys)
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<AttributeKey> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = AttributeKey>>(iter: I) -> Self {
        let mut keys: Vec<AttributeKey> = iter.into_iter().collect();
        keys.sort();
        keys.dedup();
        Self::from_sorted(keys)
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = &'a AttributeKey;
    type IntoIter = std::slice::Iter<'a, AttributeKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
