//! IndexedSet - dense array plus reverse position map
//!
//! The one collection primitive behind profile lists, role lists and
//! transaction voter lists. Insertion appends, removal swaps the last
//! element into the freed slot, so both are O(1) and relative order is
//! NOT preserved across removals.

use std::collections::HashMap;
use std::hash::Hash;

/// Ordered set with O(1) insert, lookup, positional access and swap-remove.
///
/// # Example
/// ```
/// use hub_core::IndexedSet;
///
/// let mut set = IndexedSet::new();
/// set.insert('a');
/// set.insert('b');
/// set.insert('c');
///
/// // Removing a middle element moves the last one into its slot
/// assert!(set.remove(&'a'));
/// assert_eq!(set.as_slice(), &['c', 'b']);
/// assert_eq!(set.position(&'c'), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct IndexedSet<T> {
    items: Vec<T>,
    positions: HashMap<T, usize>,
}

impl<T> Default for IndexedSet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<T: Copy + Eq + Hash> IndexedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.positions.contains_key(item)
    }

    /// Element at `idx`, if any
    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    /// Current position of `item`, if present
    pub fn position(&self, item: &T) -> Option<usize> {
        self.positions.get(item).copied()
    }

    /// Append `item`. Returns false (and changes nothing) if already present.
    pub fn insert(&mut self, item: T) -> bool {
        if self.positions.contains_key(&item) {
            return false;
        }
        self.positions.insert(item, self.items.len());
        self.items.push(item);
        true
    }

    /// Swap-remove `item`. Returns false if it was not present.
    pub fn remove(&mut self, item: &T) -> bool {
        let Some(idx) = self.positions.remove(item) else {
            return false;
        };

        let last = self.items.len() - 1;
        if idx != last {
            let moved = self.items[last];
            self.items[idx] = moved;
            self.positions.insert(moved, idx);
        }
        self.items.truncate(last);
        true
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.items.clear();
        self.positions.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Copy the elements out, in current order
    pub fn to_vec(&self) -> Vec<T> {
        self.items.clone()
    }
}

impl<'a, T> IntoIterator for &'a IndexedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
