#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for content-model automata.
//!
//! Two layers:
//! - **Atoms**: interned element and attribute names used as transition labels
//! - **Deterministic automata**: a pooled build-time store (`DfmBuilder`) and
//!   the frozen, shareable query graph it turns into (`DfmGraph`)
//!
//! Nothing here knows about content expressions. The compiler crate lowers
//! declarations into fragments and drives `DfmBuilder::determinize`.

pub mod atom;
pub mod dfm;
mod invariants;


pub use atom::{Atom, AtomKind, AtomTable};
pub use dfm::{
    CompileError, DEFAULT_STATE_LIMIT, Dfm, DfmBuilder, DfmGraph, DfmId, DfmNode, SubsetStep,
    Transitions,
};
