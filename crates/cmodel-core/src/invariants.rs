//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::DfmGraph;
use crate::dfm::builder::Slot;
use crate::dfm::graph::GraphNode;
use crate::{DfmBuilder, DfmId, DfmNode};

impl DfmBuilder {
    pub(crate) fn ensure_live(&self, id: DfmId) -> &DfmNode {
        match self.slots.get(id.index()) {
            Some(slot) if slot.live => &slot.node,
            Some(_) => panic!("DfmBuilder: node {id} is not live (freed twice or used after free)"),
            None => panic!("DfmBuilder: node {id} was never allocated by this store"),
        }
    }

    pub(crate) fn ensure_live_mut(&mut self, id: DfmId) -> &mut Slot {
        match self.slots.get_mut(id.index()) {
            Some(slot) if slot.live => slot,
            Some(_) => panic!("DfmBuilder: node {id} is not live (freed twice or used after free)"),
            None => panic!("DfmBuilder: node {id} was never allocated by this store"),
        }
    }
}

impl DfmGraph {
    pub(crate) fn ensure_node(&self, id: DfmId) -> &GraphNode {
        match self.nodes.get(id.index()) {
            Some(node) if node.live => node,
            _ => panic!(
                "DfmGraph: node {id} is not part of this graph \
                 (ids are only valid for the graph they were compiled into)"
            ),
        }
    }
}
