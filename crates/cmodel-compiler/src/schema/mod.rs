//! Element registry.
//!
//! `SchemaBuilder` compiles declarations into one shared automaton store;
//! `build` freezes the store and returns a read-only `Schema`.

mod builder;
mod element;
mod registry;

#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod registry_tests;

pub use builder::SchemaBuilder;
pub use element::{
    AttributeDecl, AttributeDefault, AttributeType, ContentKind, ContentSpec, Element,
};
pub use registry::Schema;
