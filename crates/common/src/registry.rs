//! # Signature Registry: first-seen-wins index keyed by function name
//!
//! Both extractors fill one of these. Insertion never overwrites: a second
//! entry for a known name is handed back to the caller as an [`Insertion::Duplicate`]
//! so it can decide whether the disagreement is worth reporting.
//!
//! Backed by a `BTreeMap`, so iteration is always in lexicographic name order
//! regardless of the order files were visited in.

use crate::signature::Signature;
use std::collections::btree_map::{self, Entry};
use std::collections::BTreeMap;

/// Outcome of [`Registry::insert`].
#[derive(Debug, PartialEq, Eq)]
pub enum Insertion<'a, T> {
    /// The name was new; the entry is now registered.
    Inserted,
    /// The name was already registered; the offered entry was dropped.
    Duplicate { existing: &'a T },
}

/// Name-keyed registry with insert-if-absent semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry<T> {
    entries: BTreeMap<String, T>,
}

impl<T: Signature> Registry<T> {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registers `entry` unless its name is already present.
    ///
    /// # Examples
    /// ```
    /// # use common::{CanonicalSignature, Insertion, Registry};
    /// let sig = |n| CanonicalSignature {
    ///     name: "lean_io_prim_put_str".into(),
    ///     return_type: "lean_object *".into(),
    ///     param_count: n,
    ///     param_list: String::new(),
    /// };
    /// let mut registry = Registry::new();
    /// assert_eq!(registry.insert(sig(1)), Insertion::Inserted);
    /// assert!(matches!(registry.insert(sig(2)), Insertion::Duplicate { .. }));
    /// assert_eq!(registry.get("lean_io_prim_put_str").unwrap().param_count, 1);
    /// ```
    pub fn insert(&mut self, entry: T) -> Insertion<'_, T> {
        match self.entries.entry(entry.name().to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
                Insertion::Inserted
            }
            Entry::Occupied(slot) => Insertion::Duplicate {
                existing: slot.into_mut(),
            },
        }
    }

    /// Looks up an entry by function name.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Iterates entries in lexicographic name order.
    pub fn iter(&self) -> btree_map::Values<'_, String, T> {
        self.entries.values()
    }

    /// Returns the number of registered names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Signature> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}
