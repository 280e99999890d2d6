//! Compact transition tables.
//!
//! Tables typically hold one to five entries. A sorted `Vec` keyed by atom
//! name gives O(log n) lookup with two words of overhead per node, where a
//! hash map would spend more on its control bytes than on the payload.

use crate::Atom;

use super::DfmId;

/// Binary search a sorted table by atom name.
#[inline]
pub(crate) fn lookup(entries: &[(Atom, DfmId)], name: &str) -> Option<DfmId> {
    entries
        .binary_search_by(|(atom, _)| atom.name().cmp(name))
        .ok()
        .map(|i| entries[i].1)
}

/// Transition table sorted by atom name. At most one target per atom.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transitions {
    entries: Vec<(Atom, DfmId)>,
}

impl Transitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successor for `name`, if any.
    #[inline]
    pub fn get(&self, name: &str) -> Option<DfmId> {
        lookup(&self.entries, name)
    }

    /// Insert or replace the target for `atom`. Returns the replaced target.
    pub fn insert(&mut self, atom: Atom, target: DfmId) -> Option<DfmId> {
        match self
            .entries
            .binary_search_by(|(a, _)| a.name().cmp(atom.name()))
        {
            Ok(i) => Some(std::mem::replace(&mut self.entries[i].1, target)),
            Err(i) => {
                self.entries.insert(i, (atom, target));
                None
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries, keeping the allocation for reuse.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&Atom, DfmId)> {
        self.entries.iter().map(|(atom, id)| (atom, *id))
    }

    pub(crate) fn as_slice(&self) -> &[(Atom, DfmId)] {
        &self.entries
    }

    pub(crate) fn into_boxed_slice(self) -> Box<[(Atom, DfmId)]> {
        self.entries.into_boxed_slice()
    }
}
