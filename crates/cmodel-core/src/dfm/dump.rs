//! Dump and comparison helpers shared by the builder and the frozen graph.
//!
//! Dump format, one line per node reachable from the start, numbered in
//! breadth-first order (`✓` marks accepting nodes):
//!
//! ```text
//! D0: a → D1
//! D1: b → D2
//! D2 ✓: ∅
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write;

use super::{DfmId, NodeSource, NodeView};

pub(crate) fn dump(src: &impl NodeSource, start: DfmId) -> String {
    let mut order = vec![start];
    let mut index: HashMap<DfmId, usize> = HashMap::from([(start, 0)]);

    let mut i = 0;
    while i < order.len() {
        for (_, target) in src.view(order[i]).transitions {
            if !index.contains_key(target) {
                index.insert(*target, order.len());
                order.push(*target);
            }
        }
        i += 1;
    }

    let mut out = String::new();
    for (n, &id) in order.iter().enumerate() {
        format_node(&mut out, n, src.view(id), &index).expect("String write never fails");
    }
    out
}

fn format_node(
    w: &mut String,
    n: usize,
    view: NodeView<'_>,
    index: &HashMap<DfmId, usize>,
) -> std::fmt::Result {
    write!(w, "D{n}")?;
    if view.accepting {
        write!(w, " ✓")?;
    }
    write!(w, ": ")?;

    if view.any {
        return writeln!(w, "* → D{n}");
    }
    if view.empty {
        return writeln!(w, "EMPTY");
    }
    if view.transitions.is_empty() {
        return writeln!(w, "∅");
    }

    for (i, (atom, target)) in view.transitions.iter().enumerate() {
        if i > 0 {
            write!(w, ", ")?;
        }
        write!(w, "{} → D{}", atom, index[target])?;
    }
    writeln!(w)
}

/// Language equivalence by walking both automata in lockstep.
///
/// `None` stands for the implicit dead state.
pub(crate) fn same_language(src: &impl NodeSource, a: DfmId, b: DfmId) -> bool {
    let mut seen: HashSet<(Option<DfmId>, Option<DfmId>)> = HashSet::new();
    let mut stack = vec![(Some(a), Some(b))];

    while let Some(pair) = stack.pop() {
        if !seen.insert(pair) {
            continue;
        }

        let (x, y) = pair;
        let vx = x.map(|id| src.view(id));
        let vy = y.map(|id| src.view(id));

        let accepting = |v: Option<NodeView<'_>>| v.is_some_and(|v| v.accepting);
        let any = |v: Option<NodeView<'_>>| v.is_some_and(|v| v.any);

        if accepting(vx) != accepting(vy) || any(vx) != any(vy) {
            return false;
        }
        if any(vx) {
            continue;
        }

        let mut names: BTreeSet<&str> = BTreeSet::new();
        for view in [vx, vy].into_iter().flatten() {
            for (atom, _) in view.transitions {
                names.insert(atom.name());
            }
        }

        for name in names {
            let nx = x.zip(vx).and_then(|(id, v)| v.advance(id, name));
            let ny = y.zip(vy).and_then(|(id, v)| v.advance(id, name));
            stack.push((nx, ny));
        }
    }

    true
}
