//! Thompson fragments for content-model compilation.
//!
//! The graph uses index-based node references (`NodeId`) with nodes stored
//! in a `Vec`. A node either matches one atom or is an epsilon (pure control
//! flow). Matching a node moves to its successors.
//!
//! ```text
//! Model ─to_fragment→ NfmGraph + Fragment ─compile→ DfmBuilder
//! ```

use std::collections::HashMap;
use std::fmt::Write;

use cmodel_core::Atom;

use crate::model::UNBOUNDED;

/// Index into `NfmGraph::nodes`.
pub type NodeId = u32;

/// The nodes one content particle lowered to, seen from outside.
///
/// Matching the particle means walking from `entry` to `exit`. Content-model
/// operators only ever add edges at these two ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub entry: NodeId,
    pub exit: NodeId,
}

impl Fragment {
    pub fn new(entry: NodeId, exit: NodeId) -> Self {
        Self { entry, exit }
    }

    /// A particle that is one node: a name test or an empty step.
    pub fn single(node: NodeId) -> Self {
        Self::new(node, node)
    }
}

/// A node in the fragment graph.
#[derive(Debug, Clone)]
pub struct NfmNode {
    atom: Option<Atom>,
    successors: Vec<NodeId>,
}

impl NfmNode {
    /// Pass-through node.
    pub fn epsilon() -> Self {
        Self {
            atom: None,
            successors: Vec::new(),
        }
    }

    /// Node consuming exactly `atom`.
    pub fn matcher(atom: Atom) -> Self {
        Self {
            atom: Some(atom),
            successors: Vec::new(),
        }
    }

    pub fn atom(&self) -> Option<&Atom> {
        self.atom.as_ref()
    }

    pub fn successors(&self) -> &[NodeId] {
        &self.successors
    }

    pub fn is_epsilon(&self) -> bool {
        self.atom.is_none()
    }
}

/// Build-time graph holding the fragments of one declaration.
#[derive(Debug, Default)]
pub struct NfmGraph {
    nodes: Vec<NfmNode>,
}

impl NfmGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids are dense and follow insertion order.
    pub fn add_node(&mut self, node: NfmNode) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        id
    }

    pub fn add_epsilon(&mut self) -> NodeId {
        self.add_node(NfmNode::epsilon())
    }

    pub fn add_matcher(&mut self, atom: Atom) -> NodeId {
        self.add_node(NfmNode::matcher(atom))
    }

    pub fn node(&self, id: NodeId) -> &NfmNode {
        &self.nodes[id as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NfmNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (i as NodeId, n))
    }

    /// Let a walk at `from` continue at `to`. Successor order is edge order.
    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from as usize].successors.push(to);
    }

    fn connect_all(&mut self, from: NodeId, targets: impl IntoIterator<Item = NodeId>) {
        self.nodes[from as usize].successors.extend(targets);
    }

    /// Fresh decision node and the join node its branches meet at.
    fn fork(&mut self) -> (NodeId, NodeId) {
        (self.add_epsilon(), self.add_epsilon())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Content-model operators
    // ─────────────────────────────────────────────────────────────────────

    /// A bare element name: exactly one occurrence of `atom`.
    pub fn leaf(&mut self, atom: Atom) -> Fragment {
        Fragment::single(self.add_matcher(atom))
    }

    /// Matches no child at all.
    pub fn none(&mut self) -> Fragment {
        Fragment::single(self.add_epsilon())
    }

    /// `a` followed by `b`.
    pub fn concat(&mut self, a: Fragment, b: Fragment) -> Fragment {
        self.connect(a.exit, b.entry);
        Fragment::new(a.entry, b.exit)
    }

    /// `a` or `b`.
    pub fn alt(&mut self, a: Fragment, b: Fragment) -> Fragment {
        self.alternation(&[a, b])
    }

    /// Sequence group `(a, b, c)`. An empty group matches nothing.
    pub fn sequence(&mut self, fragments: &[Fragment]) -> Fragment {
        let group = fragments
            .iter()
            .copied()
            .reduce(|acc, next| self.concat(acc, next));
        group.unwrap_or_else(|| self.none())
    }

    /// Choice group `(a | b | c)`. A lone member is returned as is; several
    /// members get a decision node in front and a join node behind.
    pub fn alternation(&mut self, fragments: &[Fragment]) -> Fragment {
        if let [member] = fragments {
            return *member;
        }
        if fragments.is_empty() {
            return self.none();
        }

        let (choice, join) = self.fork();
        self.connect_all(choice, fragments.iter().map(|member| member.entry));
        for member in fragments {
            self.connect(member.exit, join);
        }
        Fragment::new(choice, join)
    }

    /// `x?`: the decision node either enters `x` or skips to the join.
    ///
    /// ```text
    /// choice ─→ x ─→ join
    ///   └────────────→┘
    /// ```
    pub fn optional(&mut self, inner: Fragment) -> Fragment {
        let (choice, join) = self.fork();
        self.connect_all(choice, [inner.entry, join]);
        self.connect(inner.exit, join);
        Fragment::new(choice, join)
    }

    /// `x*`: after each `x` the walk returns to the decision node.
    ///
    /// ```text
    /// choice ─→ x
    ///   ↑ │     │
    ///   │ └→ join
    ///   └───────┘
    /// ```
    pub fn zero_or_more(&mut self, inner: Fragment) -> Fragment {
        let (choice, join) = self.fork();
        self.connect_all(choice, [inner.entry, join]);
        self.connect(inner.exit, choice);
        Fragment::new(choice, join)
    }

    /// `x+`: one mandatory `x`, then the decision node repeats or leaves.
    ///
    /// ```text
    /// x ─→ choice ─→ join
    /// ↑      │
    /// └──────┘
    /// ```
    pub fn one_or_more(&mut self, inner: Fragment) -> Fragment {
        let (choice, join) = self.fork();
        self.connect(inner.exit, choice);
        self.connect_all(choice, [inner.entry, join]);
        Fragment::new(inner.entry, join)
    }

    /// Between `min` and `max` occurrences (`max` may be `UNBOUNDED`).
    ///
    /// Lowered as `min` mandatory copies followed by either a starred copy or
    /// `max - min` nested optional copies: `x{2,4}` becomes `x x (x x?)?`.
    pub fn bounded(&mut self, inner: Fragment, min: u32, max: u32) -> Fragment {
        if max == 0 {
            return self.none();
        }

        let mut unused = Some(inner);
        let mut take = |graph: &mut Self| match unused.take() {
            Some(first) => first,
            None => graph.duplicate(inner),
        };

        let mut parts = Vec::new();
        for _ in 0..min {
            parts.push(take(self));
        }

        if max == UNBOUNDED {
            let copy = take(self);
            parts.push(self.zero_or_more(copy));
        } else {
            // Built innermost first.
            let mut tail: Option<Fragment> = None;
            for _ in min..max {
                let copy = take(self);
                let body = match tail {
                    Some(rest) => self.concat(copy, rest),
                    None => copy,
                };
                tail = Some(self.optional(body));
            }
            parts.extend(tail);
        }

        self.sequence(&parts)
    }

    /// Copy a fragment's nodes, returning the fresh fragment.
    ///
    /// The copy covers every node reachable from `entry` without leaving
    /// through `exit`, so it is safe to call after the original has been
    /// wired into a larger graph.
    pub fn duplicate(&mut self, fragment: Fragment) -> Fragment {
        let mut remap: HashMap<NodeId, NodeId> = HashMap::new();
        let mut order = Vec::new();
        let mut stack = vec![fragment.entry];

        while let Some(id) = stack.pop() {
            if remap.contains_key(&id) {
                continue;
            }
            let copy = match self.node(id).atom.clone() {
                Some(atom) => self.add_matcher(atom),
                None => self.add_epsilon(),
            };
            remap.insert(id, copy);
            order.push(id);
            if id != fragment.exit {
                stack.extend(self.node(id).successors.iter().rev());
            }
        }

        for id in order {
            if id == fragment.exit {
                continue;
            }
            let successors = self.node(id).successors.iter().map(|s| remap[s]).collect();
            self.nodes[remap[&id] as usize].successors = successors;
        }

        Fragment::new(remap[&fragment.entry], remap[&fragment.exit])
    }

    /// Render the graph, one node per line.
    ///
    /// ```text
    /// N0: a → N1
    /// N1: ε → N0, N2
    /// N2: ε → ∅
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    fn format(&self, w: &mut String) -> std::fmt::Result {
        for (id, node) in self.iter() {
            write!(w, "N{id}: ")?;
            match &node.atom {
                Some(atom) => write!(w, "{atom}")?,
                None => write!(w, "ε")?,
            }
            write!(w, " → ")?;
            if node.successors.is_empty() {
                write!(w, "∅")?;
            } else {
                for (i, succ) in node.successors.iter().enumerate() {
                    if i > 0 {
                        write!(w, ", ")?;
                    }
                    write!(w, "N{succ}")?;
                }
            }
            writeln!(w)?;
        }
        Ok(())
    }
}
