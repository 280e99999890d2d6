//! Frozen automata and the query handle editors drive.

use std::fmt;
use std::ptr;

use crate::Atom;

use super::builder::Slot;
use super::{DfmId, NodeSource, NodeView};

#[derive(Debug)]
pub(crate) struct GraphNode {
    pub serial: u64,
    pub accepting: bool,
    pub any: bool,
    pub empty: bool,
    pub live: bool,
    pub transitions: Box<[(Atom, DfmId)]>,
}

/// Immutable store of compiled automata.
///
/// Safe to share across threads (`Arc<DfmGraph>`); there is no interior
/// mutability.
#[derive(Debug)]
pub struct DfmGraph {
    pub(crate) nodes: Box<[GraphNode]>,
}

impl DfmGraph {
    pub(crate) fn from_slots(slots: Vec<Slot>) -> Self {
        let nodes = slots
            .into_iter()
            .map(|slot| GraphNode {
                serial: slot.node.serial,
                accepting: slot.node.accepting,
                any: slot.node.any,
                empty: slot.node.empty,
                live: slot.live,
                transitions: slot.node.transitions.into_boxed_slice(),
            })
            .collect();
        Self { nodes }
    }

    /// Handle for a node.
    ///
    /// # Panics
    /// Panics if `id` does not name a live node of this graph.
    pub fn get(&self, id: DfmId) -> Dfm<'_> {
        self.ensure_node(id);
        Dfm { graph: self, id }
    }

    pub fn advance(&self, id: DfmId, name: &str) -> Option<DfmId> {
        self.view(id).advance(id, name)
    }

    pub fn is_accepting(&self, id: DfmId) -> bool {
        self.ensure_node(id).accepting
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.live).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.nodes.iter().any(|n| n.live)
    }

    /// Whether the automata rooted at `a` and `b` accept the same sequences.
    pub fn same_language(&self, a: DfmId, b: DfmId) -> bool {
        super::same_language(self, a, b)
    }

    /// Render the automaton reachable from `start`.
    pub fn dump(&self, start: DfmId) -> String {
        super::dump(self, start)
    }
}

impl NodeSource for DfmGraph {
    fn view(&self, id: DfmId) -> NodeView<'_> {
        let node = self.ensure_node(id);
        NodeView {
            accepting: node.accepting,
            any: node.any,
            empty: node.empty,
            transitions: &node.transitions,
        }
    }
}

/// A position in a compiled automaton.
///
/// Cheap to copy. Drive validation with `advance` and `is_accepting`;
/// enumerate `accepts` for "what may come next".
#[derive(Clone, Copy)]
pub struct Dfm<'g> {
    graph: &'g DfmGraph,
    id: DfmId,
}

impl<'g> Dfm<'g> {
    fn node(self) -> &'g GraphNode {
        &self.graph.nodes[self.id.index()]
    }

    pub fn id(self) -> DfmId {
        self.id
    }

    pub fn graph(self) -> &'g DfmGraph {
        self.graph
    }

    /// Diagnostic sequence number assigned when the node was allocated.
    pub fn serial(self) -> u64 {
        self.node().serial
    }

    pub fn is_accepting(self) -> bool {
        self.node().accepting
    }

    pub fn is_any(self) -> bool {
        self.node().any
    }

    pub fn is_empty(self) -> bool {
        self.node().empty
    }

    /// Consume one child name.
    ///
    /// `any` nodes return themselves for every name; `empty` nodes and names
    /// missing from the table return `None`.
    pub fn advance(self, name: &str) -> Option<Dfm<'g>> {
        let node = self.node();
        if node.any {
            return Some(self);
        }
        if node.empty {
            return None;
        }
        super::transitions::lookup(&node.transitions, name).map(|id| Dfm {
            graph: self.graph,
            id,
        })
    }

    /// Atoms with an outgoing transition, in name order.
    ///
    /// Empty for `any` nodes even though they accept every name; check
    /// `is_any` first.
    pub fn accepts(self) -> impl Iterator<Item = &'g Atom> {
        self.node().transitions.iter().map(|(atom, _)| atom)
    }

    /// Outgoing transitions with their successor handles.
    pub fn follows(self) -> impl Iterator<Item = (&'g Atom, Dfm<'g>)> {
        let graph = self.graph;
        self.node()
            .transitions
            .iter()
            .map(move |(atom, id)| (atom, Dfm { graph, id: *id }))
    }

    /// Render the automaton reachable from this node.
    pub fn dump(self) -> String {
        self.graph.dump(self.id)
    }
}

impl PartialEq for Dfm<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.graph, other.graph) && self.id == other.id
    }
}

impl Eq for Dfm<'_> {}

impl fmt::Debug for Dfm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node();
        f.debug_struct("Dfm")
            .field("id", &self.id)
            .field("accepting", &node.accepting)
            .field("any", &node.any)
            .field("empty", &node.empty)
            .field("transitions", &node.transitions.len())
            .finish()
    }
}
