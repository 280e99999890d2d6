#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Content-model compiler for DTD-style grammars.
//!
//! Element declarations such as `<!ELEMENT book (title, author+, chapter*)>`
//! compile into deterministic automata that validate child sequences one
//! element name at a time.
//!
//! # Pipeline
//!
//! ```text
//! Model ─to_fragment→ NfmGraph ─compile→ DfmBuilder ─freeze→ DfmGraph
//! ```
//!
//! - `model` - content expression trees built by a grammar parser
//! - `nfm` - Thompson fragment combinators
//! - `compile` - subset construction into the shared automaton store
//! - `schema` - element registry with deferred build errors

pub mod compile;
mod error;
mod invariants;
pub mod model;
pub mod nfm;
pub mod schema;

#[cfg(test)]
mod test_utils;

pub use cmodel_core::{
    Atom, AtomKind, AtomTable, CompileError, DEFAULT_STATE_LIMIT, Dfm, DfmBuilder, DfmGraph, DfmId,
};

pub use compile::{compile, compile_model};
pub use error::{BuildError, Result, SchemaError};
pub use model::{Cardinality, Model, ModelKind, UNBOUNDED};
pub use nfm::{Fragment, NfmGraph, NodeId};
pub use schema::{
    AttributeDecl, AttributeDefault, AttributeType, ContentKind, ContentSpec, Element, Schema,
    SchemaBuilder,
};
