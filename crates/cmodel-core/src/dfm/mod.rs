//! Deterministic content-model automata.
//!
//! Each declaration compiles to a small deterministic automaton. A realistic
//! grammar yields hundreds of them, so nodes live in one arena indexed by
//! `DfmId` and transition tables are sorted vectors instead of hash maps.
//!
//! # Phases
//!
//! ```text
//! DfmBuilder (alloc/free/determinize/merge) ─freeze→ DfmGraph (shared, read-only)
//! ```
//!
//! The builder is single-threaded. Its free list recycles nodes released by
//! failed or superseded constructions. `freeze` drops the pool and shrinks
//! every table, producing a `DfmGraph` that is `Send + Sync` and can be
//! queried from any number of threads through `Dfm` handles.

pub(crate) mod builder;
mod dump;
mod error;
pub(crate) mod graph;
pub(crate) mod transitions;

#[cfg(test)]
mod merge_tests;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::Atom;

pub use builder::{DfmBuilder, SubsetStep};
pub use error::CompileError;
pub use graph::{Dfm, DfmGraph};
pub use transitions::Transitions;

pub(crate) use dump::{dump, same_language};

/// Default cap on deterministic states created by one subset construction.
pub const DEFAULT_STATE_LIMIT: u32 = 4096;

/// Index of a node in a `DfmBuilder` or the `DfmGraph` frozen from it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct DfmId(u32);

impl DfmId {
    /// Raw index for diagnostics.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DfmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Process-unique sequence number, assigned on every allocation.
pub(crate) fn next_serial() -> u64 {
    NEXT_SERIAL.fetch_add(1, Ordering::Relaxed)
}

/// A deterministic automaton node as held by the builder.
#[derive(Debug, Clone, Default)]
pub struct DfmNode {
    pub(crate) serial: u64,
    pub(crate) accepting: bool,
    pub(crate) any: bool,
    pub(crate) empty: bool,
    pub(crate) transitions: Transitions,
}

impl DfmNode {
    /// Diagnostic sequence number. Not used for transitions.
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// Every atom loops back to this node.
    pub fn is_any(&self) -> bool {
        self.any
    }

    /// No further atom is ever accepted.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn transitions(&self) -> &Transitions {
        &self.transitions
    }

    /// Reset to a blank node, keeping the table's allocation.
    pub(crate) fn reset(&mut self, serial: u64) {
        self.serial = serial;
        self.accepting = false;
        self.any = false;
        self.empty = false;
        self.transitions.clear();
    }
}

/// Borrowed view of one node, shared by the builder and the frozen graph.
#[derive(Clone, Copy)]
pub(crate) struct NodeView<'a> {
    pub accepting: bool,
    pub any: bool,
    pub empty: bool,
    pub transitions: &'a [(Atom, DfmId)],
}

impl NodeView<'_> {
    /// One step of the automaton from node `id`.
    pub fn advance(&self, id: DfmId, name: &str) -> Option<DfmId> {
        if self.any {
            return Some(id);
        }
        if self.empty {
            return None;
        }
        transitions::lookup(self.transitions, name)
    }
}

/// Read access to nodes by id.
pub(crate) trait NodeSource {
    fn view(&self, id: DfmId) -> NodeView<'_>;
}
