//! Subset construction from Thompson fragments.
//!
//! A deterministic state is the set of atom-matching nodes reachable
//! without consuming input, plus a marker for "past the fragment's exit".
//! Epsilon nodes never appear in a set; they are resolved by the closure.
//! A set is accepting exactly when it holds the marker.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use cmodel_core::{Atom, CompileError, DfmBuilder, DfmId, SubsetStep};
use tracing::debug;

use crate::model::Model;
use crate::nfm::{Fragment, NfmGraph, NodeId};

/// Set member standing for "the whole fragment has been matched".
const PAST_EXIT: NodeId = NodeId::MAX;

type StateSet = Vec<NodeId>;

struct Closure<'g> {
    graph: &'g NfmGraph,
    exit: NodeId,
}

impl Closure<'_> {
    /// Matchers reachable from `seeds` through epsilon nodes. Reaching the
    /// exit adds `PAST_EXIT` and stops there.
    fn of(&self, seeds: impl IntoIterator<Item = NodeId>) -> StateSet {
        let mut seen = HashSet::new();
        let mut out = BTreeSet::new();
        let mut stack: Vec<NodeId> = seeds.into_iter().collect();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if id == PAST_EXIT {
                out.insert(PAST_EXIT);
                continue;
            }
            let node = self.graph.node(id);
            if !node.is_epsilon() {
                out.insert(id);
            } else if id == self.exit {
                out.insert(PAST_EXIT);
            } else {
                stack.extend(node.successors());
            }
        }

        out.into_iter().collect()
    }

    fn step(&self, set: &[NodeId]) -> SubsetStep<StateSet> {
        let accepting = set.last() == Some(&PAST_EXIT);
        let mut seeds: BTreeMap<Atom, Vec<NodeId>> = BTreeMap::new();

        for &id in set {
            if id == PAST_EXIT {
                continue;
            }
            let node = self.graph.node(id);
            let Some(atom) = node.atom() else { continue };
            let targets = seeds.entry(atom.clone()).or_default();
            if id == self.exit {
                targets.push(PAST_EXIT);
            } else {
                targets.extend(node.successors());
            }
        }

        SubsetStep::Expand {
            accepting,
            edges: seeds
                .into_iter()
                .map(|(atom, targets)| (atom, self.of(targets)))
                .collect(),
        }
    }
}

/// Compile one fragment of `graph` into `dfms`, returning its start node.
///
/// On `StateLimitExceeded` no node created by this call stays allocated.
pub fn compile(
    dfms: &mut DfmBuilder,
    graph: &NfmGraph,
    fragment: Fragment,
) -> Result<DfmId, CompileError> {
    let closure = Closure {
        graph,
        exit: fragment.exit,
    };
    let start = closure.of([fragment.entry]);
    let before = dfms.live_count();
    let id = dfms.determinize(start, |_, set| closure.step(set))?;
    debug!(
        nfm_nodes = graph.len(),
        dfm_nodes = dfms.live_count() - before,
        start = %id,
        "fragment compiled"
    );
    Ok(id)
}

/// Lower `model` and compile it. An unfilled model or empty group compiles
/// to an automaton accepting only the empty sequence.
pub fn compile_model(dfms: &mut DfmBuilder, model: &Model) -> Result<DfmId, CompileError> {
    let mut graph = NfmGraph::new();
    let fragment = match model.to_fragment(&mut graph) {
        Some(fragment) => fragment,
        None => graph.none(),
    };
    compile(dfms, &graph, fragment)
}
