//! Build-phase automaton store.
//!
//! Nodes are drawn from a `Vec`-backed slab with a free list. Subset
//! construction (`determinize`) is generic over the state-set key so the same
//! driver serves both fragment compilation and `merge`.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::hash::Hash;

use tracing::{debug, trace};

use crate::Atom;

use super::{
    CompileError, DEFAULT_STATE_LIMIT, DfmGraph, DfmId, DfmNode, NodeSource, NodeView, next_serial,
};

/// Arena slot. Dead slots sit on the free list.
#[derive(Debug)]
pub(crate) struct Slot {
    pub node: DfmNode,
    pub live: bool,
}

/// What a subset-construction state set turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubsetStep<K> {
    /// The set accepts every further atom; maps to the shared `any` node.
    Any,
    /// The set accepts the empty sequence and nothing else; maps to the
    /// shared `empty` node.
    Empty,
    /// An ordinary state. `edges` must hold at most one entry per atom.
    Expand {
        accepting: bool,
        edges: Vec<(Atom, K)>,
    },
}

/// Bookkeeping for one `determinize` call.
struct SubsetRun<K> {
    memo: HashMap<K, DfmId>,
    pending: VecDeque<(DfmId, Vec<(Atom, K)>)>,
    created: Vec<DfmId>,
}

impl<K> SubsetRun<K> {
    fn new() -> Self {
        Self {
            memo: HashMap::new(),
            pending: VecDeque::new(),
            created: Vec::new(),
        }
    }
}

/// Mutable, pooled store of deterministic nodes.
///
/// Single-threaded by contract: nothing here is synchronized. Call `freeze`
/// to publish the result for concurrent reads.
#[derive(Debug)]
pub struct DfmBuilder {
    pub(crate) slots: Vec<Slot>,
    free: Vec<DfmId>,
    any: Option<DfmId>,
    empty: Option<DfmId>,
    state_limit: u32,
    reused: usize,
}

impl Default for DfmBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DfmBuilder {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            any: None,
            empty: None,
            state_limit: DEFAULT_STATE_LIMIT,
            reused: 0,
        }
    }

    /// Cap the number of states a single `determinize` may create.
    pub fn with_state_limit(mut self, limit: u32) -> Self {
        self.state_limit = limit;
        self
    }

    pub fn state_limit(&self) -> u32 {
        self.state_limit
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pool
    // ─────────────────────────────────────────────────────────────────────

    /// Allocate a blank node, reusing a pooled one when available.
    ///
    /// The returned node is non-accepting, neither `any` nor `empty`, and has
    /// an empty transition table.
    pub fn alloc(&mut self) -> DfmId {
        let serial = next_serial();

        if let Some(id) = self.free.pop() {
            let slot = &mut self.slots[id.index()];
            slot.node.reset(serial);
            slot.live = true;
            self.reused += 1;
            trace!(node = %id, serial, "dfm node reused");
            return id;
        }

        let id = DfmId::from_index(self.slots.len());
        let node = DfmNode {
            serial,
            ..DfmNode::default()
        };
        self.slots.push(Slot { node, live: true });
        trace!(node = %id, serial, "dfm node allocated");
        id
    }

    /// Return a node to the pool.
    ///
    /// # Panics
    /// Panics if the node is not live (double free, or never allocated).
    pub fn free(&mut self, id: DfmId) {
        let slot = self.ensure_live_mut(id);
        slot.node.transitions.clear();
        slot.live = false;

        if self.any == Some(id) {
            self.any = None;
        }
        if self.empty == Some(id) {
            self.empty = None;
        }

        self.free.push(id);
        trace!(node = %id, "dfm node freed");
    }

    /// Free every node reachable from `start` except the shared `any` and
    /// `empty` nodes. Returns how many nodes went back to the pool.
    ///
    /// Only valid for automata that share no other node with a live one,
    /// which holds for anything produced by a single `determinize`.
    pub fn release(&mut self, start: DfmId) -> usize {
        let mut seen = BTreeSet::new();
        let mut stack = vec![start];

        while let Some(id) = stack.pop() {
            if self.any == Some(id) || self.empty == Some(id) || !seen.insert(id) {
                continue;
            }
            stack.extend(self.ensure_live(id).transitions.iter().map(|(_, target)| target));
        }

        let released = seen.len();
        for id in seen {
            self.free(id);
        }
        debug!(root = %start, released, "dfm released");
        released
    }

    /// Number of nodes currently allocated.
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of nodes waiting on the free list.
    pub fn pooled_count(&self) -> usize {
        self.free.len()
    }

    /// How many allocations were served from the free list.
    pub fn reused_count(&self) -> usize {
        self.reused
    }

    // ─────────────────────────────────────────────────────────────────────
    // Node access
    // ─────────────────────────────────────────────────────────────────────

    /// Get a live node.
    ///
    /// # Panics
    /// Panics if the node is not live.
    pub fn node(&self, id: DfmId) -> &DfmNode {
        self.ensure_live(id)
    }

    pub fn set_accepting(&mut self, id: DfmId, accepting: bool) {
        self.ensure_live_mut(id).node.accepting = accepting;
    }

    /// Add or replace the transition on `atom`. Returns the replaced target.
    pub fn set_transition(&mut self, id: DfmId, atom: Atom, target: DfmId) -> Option<DfmId> {
        self.ensure_live(target);
        self.ensure_live_mut(id).node.transitions.insert(atom, target)
    }

    /// The shared node that loops on every atom (ANY content).
    pub fn any_node(&mut self) -> DfmId {
        if let Some(id) = self.any {
            return id;
        }
        let id = self.alloc();
        let node = &mut self.slots[id.index()].node;
        node.any = true;
        node.accepting = true;
        self.any = Some(id);
        id
    }

    /// The shared node that accepts nothing beyond the empty sequence
    /// (EMPTY content).
    pub fn empty_node(&mut self) -> DfmId {
        if let Some(id) = self.empty {
            return id;
        }
        let id = self.alloc();
        let node = &mut self.slots[id.index()].node;
        node.empty = true;
        node.accepting = true;
        self.empty = Some(id);
        id
    }

    /// One automaton step from `id` on `name`.
    pub fn advance(&self, id: DfmId, name: &str) -> Option<DfmId> {
        self.view(id).advance(id, name)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Subset construction
    // ─────────────────────────────────────────────────────────────────────

    /// Subset construction from `start`.
    ///
    /// `expand` describes one state set: whether it accepts and, per atom,
    /// the successor set. Equal keys collapse into one node, so the result
    /// has at most one successor per atom per node. Nodes are numbered in
    /// breadth-first order from `start`.
    ///
    /// On exceeding the state limit every node created by this call is
    /// returned to the pool.
    pub fn determinize<K, F>(&mut self, start: K, mut expand: F) -> Result<DfmId, CompileError>
    where
        K: Eq + Hash,
        F: FnMut(&DfmBuilder, &K) -> SubsetStep<K>,
    {
        let mut run = SubsetRun::new();
        let root = self.subset_state(&mut run, start, &mut expand);

        while let Some((id, edges)) = run.pending.pop_front() {
            for (atom, key) in edges {
                let target = self.subset_state(&mut run, key, &mut expand);
                self.slots[id.index()].node.transitions.insert(atom, target);
            }

            if run.created.len() > self.state_limit as usize {
                let limit = self.state_limit;
                debug!(limit, created = run.created.len(), "subset construction abandoned");
                for id in run.created {
                    self.free(id);
                }
                return Err(CompileError::StateLimitExceeded { limit });
            }
        }

        trace!(states = run.created.len(), root = %root, "subset construction finished");
        Ok(root)
    }

    fn subset_state<K, F>(&mut self, run: &mut SubsetRun<K>, key: K, expand: &mut F) -> DfmId
    where
        K: Eq + Hash,
        F: FnMut(&DfmBuilder, &K) -> SubsetStep<K>,
    {
        if let Some(&id) = run.memo.get(&key) {
            return id;
        }

        let id = match expand(&*self, &key) {
            SubsetStep::Any => self.any_node(),
            SubsetStep::Empty => self.empty_node(),
            SubsetStep::Expand { accepting, edges } => {
                let id = self.alloc();
                self.slots[id.index()].node.accepting = accepting;
                trace!(node = %id, edges = edges.len(), accepting, "subset state");
                run.created.push(id);
                run.pending.push_back((id, edges));
                id
            }
        };

        run.memo.insert(key, id);
        id
    }

    /// Merge two automata into one accepting the union of their languages.
    ///
    /// The merged node accepts if either input does; atoms present in both
    /// tables lead to the merge of both successors, recursively. Built by
    /// subset construction over sets of existing nodes, so the result is
    /// commutative and associative up to language.
    pub fn merge(&mut self, a: DfmId, b: DfmId) -> Result<DfmId, CompileError> {
        if a == b {
            return Ok(a);
        }

        let start = if a < b { vec![a, b] } else { vec![b, a] };
        let merged = self.determinize(start, |dfms, set| dfms.merge_step(set))?;
        debug!(left = %a, right = %b, merged = %merged, "dfm merged");
        Ok(merged)
    }

    fn merge_step(&self, set: &[DfmId]) -> SubsetStep<Vec<DfmId>> {
        let mut accepting = false;
        let mut all_empty = true;
        let mut edges: BTreeMap<Atom, BTreeSet<DfmId>> = BTreeMap::new();

        for &id in set {
            let view = self.view(id);
            if view.any {
                return SubsetStep::Any;
            }
            accepting |= view.accepting;
            all_empty &= view.empty;
            for (atom, target) in view.transitions {
                edges.entry(atom.clone()).or_default().insert(*target);
            }
        }

        if all_empty {
            return SubsetStep::Empty;
        }

        SubsetStep::Expand {
            accepting,
            edges: edges
                .into_iter()
                .map(|(atom, targets)| (atom, targets.into_iter().collect()))
                .collect(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────

    /// Whether the automata rooted at `a` and `b` accept the same sequences.
    pub fn same_language(&self, a: DfmId, b: DfmId) -> bool {
        super::same_language(self, a, b)
    }

    /// Render the automaton reachable from `start`.
    pub fn dump(&self, start: DfmId) -> String {
        super::dump(self, start)
    }

    /// Publish the store for concurrent reads. Pooled nodes become dead
    /// entries; ids of live nodes stay valid.
    pub fn freeze(self) -> DfmGraph {
        debug!(
            live = self.live_count(),
            pooled = self.pooled_count(),
            reused = self.reused,
            "dfm store frozen"
        );
        DfmGraph::from_slots(self.slots)
    }
}

impl NodeSource for DfmBuilder {
    fn view(&self, id: DfmId) -> NodeView<'_> {
        let node = self.ensure_live(id);
        NodeView {
            accepting: node.accepting,
            any: node.any,
            empty: node.empty,
            transitions: node.transitions.as_slice(),
        }
    }
}
