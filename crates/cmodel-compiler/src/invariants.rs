//! Model-building invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::model::{Model, ModelKind};

impl Model {
    pub(crate) fn ensure_open(&self) {
        assert!(
            self.kind() != ModelKind::Leaf,
            "Model: leaf `{self}` cannot have children"
        );
        assert!(
            !self.is_frozen(),
            "Model: add_child after the child list was read"
        );
    }

    pub(crate) fn ensure_childless(&self) {
        assert!(
            self.child_count() == 0,
            "Model: a node with children cannot become a leaf"
        );
    }

    pub(crate) fn ensure_occurs(min: u32, max: u32) {
        assert!(min <= max, "Model: occurrence bounds {min}..{max} are inverted");
    }
}
