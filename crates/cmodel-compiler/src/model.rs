//! Content expression trees.
//!
//! A `Model` is one node of a parsed content-model declaration such as
//! `(head, (p | list)*)`. The grammar parser grows the tree with
//! `add_child`; the compiler reads it once through `to_fragment`.
//!
//! Children are buffered while the tree is being built. The first read of
//! `children` freezes the buffer into a shared slice, after which the node
//! is read-only and `shallow_copy` can hand out copies that share it.

use std::cell::{OnceCell, RefCell};
use std::fmt::{self, Write};
use std::rc::Rc;

use cmodel_core::Atom;

use crate::nfm::{Fragment, NfmGraph};

/// Maximum occurrence meaning "no upper bound".
pub const UNBOUNDED: u32 = u32::MAX;

/// What a model node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelKind {
    /// Not yet filled in by the parser.
    #[default]
    Unknown,
    /// `(a | b | ...)`
    Choice,
    /// `(a , b , ...)`
    Sequence,
    /// A single element name.
    Leaf,
}

/// Occurrence bounds of a model node, in the shape they are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly once, no suffix.
    One,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
    /// `{0}`: matches only the empty sequence.
    Never,
    /// Any other `{min,max}` pair.
    Bounded { min: u32, max: u32 },
}

impl Cardinality {
    pub fn of(min: u32, max: u32) -> Self {
        match (min, max) {
            (1, 1) => Self::One,
            (0, 1) => Self::Optional,
            (0, UNBOUNDED) => Self::ZeroOrMore,
            (1, UNBOUNDED) => Self::OneOrMore,
            (0, 0) => Self::Never,
            (min, max) => Self::Bounded { min, max },
        }
    }

    pub fn min(self) -> u32 {
        match self {
            Self::One | Self::OneOrMore => 1,
            Self::Optional | Self::ZeroOrMore | Self::Never => 0,
            Self::Bounded { min, .. } => min,
        }
    }

    pub fn max(self) -> u32 {
        match self {
            Self::One | Self::Optional => 1,
            Self::ZeroOrMore | Self::OneOrMore => UNBOUNDED,
            Self::Never => 0,
            Self::Bounded { max, .. } => max,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::One => Ok(()),
            Self::Optional => f.write_char('?'),
            Self::ZeroOrMore => f.write_char('*'),
            Self::OneOrMore => f.write_char('+'),
            Self::Never => f.write_str("{0}"),
            Self::Bounded { min, max } if max == UNBOUNDED => write!(f, "{{{min},}}"),
            Self::Bounded { min, max } if min == max => write!(f, "{{{min}}}"),
            Self::Bounded { min, max } => write!(f, "{{{min},{max}}}"),
        }
    }
}

/// One node of a content expression tree.
#[derive(Debug)]
pub struct Model {
    kind: ModelKind,
    min_occurs: u32,
    max_occurs: u32,
    leaf: Option<Atom>,
    pending: RefCell<Vec<Model>>,
    children: OnceCell<Rc<[Model]>>,
}

impl Default for Model {
    fn default() -> Self {
        Self::unknown()
    }
}

impl Model {
    /// A node the parser has not filled in yet. Occurs exactly once.
    pub fn unknown() -> Self {
        Self {
            kind: ModelKind::Unknown,
            min_occurs: 1,
            max_occurs: 1,
            leaf: None,
            pending: RefCell::default(),
            children: OnceCell::new(),
        }
    }

    pub fn leaf(atom: Atom) -> Self {
        let mut model = Self::unknown();
        model.set_leaf(atom);
        model
    }

    pub fn sequence() -> Self {
        Self::unknown().with_kind(ModelKind::Sequence)
    }

    pub fn choice() -> Self {
        Self::unknown().with_kind(ModelKind::Choice)
    }

    pub fn with_kind(mut self, kind: ModelKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_occurs(mut self, min: u32, max: u32) -> Self {
        self.set_occurs(min, max);
        self
    }

    pub fn optional(self) -> Self {
        self.with_occurs(0, 1)
    }

    pub fn zero_or_more(self) -> Self {
        self.with_occurs(0, UNBOUNDED)
    }

    pub fn one_or_more(self) -> Self {
        self.with_occurs(1, UNBOUNDED)
    }

    pub fn with_child(mut self, child: Model) -> Self {
        self.add_child(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Model>) -> Self {
        for child in children {
            self.add_child(child);
        }
        self
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: ModelKind) {
        self.kind = kind;
    }

    pub fn min_occurs(&self) -> u32 {
        self.min_occurs
    }

    pub fn max_occurs(&self) -> u32 {
        self.max_occurs
    }

    /// # Panics
    /// Panics if `min > max`.
    pub fn set_occurs(&mut self, min: u32, max: u32) {
        Self::ensure_occurs(min, max);
        self.min_occurs = min;
        self.max_occurs = max;
    }

    pub fn cardinality(&self) -> Cardinality {
        Cardinality::of(self.min_occurs, self.max_occurs)
    }

    /// The element name of a leaf.
    pub fn leaf_atom(&self) -> Option<&Atom> {
        self.leaf.as_ref()
    }

    /// Turn this node into a leaf for `atom`.
    ///
    /// # Panics
    /// Panics if the node already has children.
    pub fn set_leaf(&mut self, atom: Atom) {
        self.ensure_childless();
        self.kind = ModelKind::Leaf;
        self.leaf = Some(atom);
    }

    /// Append a child.
    ///
    /// # Panics
    /// Panics on a leaf, or once `children` has been read.
    pub fn add_child(&mut self, child: Model) {
        self.ensure_open();
        self.pending.get_mut().push(child);
    }

    /// Children in declaration order. Freezes the node on first call.
    pub fn children(&self) -> &[Model] {
        self.frozen()
    }

    /// Whether `children` has been read and the child list is fixed.
    pub fn is_frozen(&self) -> bool {
        self.children.get().is_some()
    }

    /// Number of children, without freezing.
    pub fn child_count(&self) -> usize {
        match self.children.get() {
            Some(children) => children.len(),
            None => self.pending.borrow().len(),
        }
    }

    fn frozen(&self) -> &Rc<[Model]> {
        self.children.get_or_init(|| self.pending.take().into())
    }

    /// Copy this node, sharing the (frozen) child list with the original.
    pub fn shallow_copy(&self) -> Model {
        Model {
            kind: self.kind,
            min_occurs: self.min_occurs,
            max_occurs: self.max_occurs,
            leaf: self.leaf.clone(),
            pending: RefCell::default(),
            children: OnceCell::from(Rc::clone(self.frozen())),
        }
    }

    /// Whether every node in the tree has been filled in.
    pub fn is_complete(&self) -> bool {
        match self.kind {
            ModelKind::Unknown => false,
            ModelKind::Leaf => self.leaf.is_some(),
            ModelKind::Choice | ModelKind::Sequence => {
                self.children().iter().all(Model::is_complete)
            }
        }
    }

    /// Distinct element names in the tree, in first-appearance order.
    pub fn atoms(&self) -> Vec<Atom> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms(&self, out: &mut Vec<Atom>) {
        if let Some(atom) = &self.leaf {
            if !out.contains(atom) {
                out.push(atom.clone());
            }
            return;
        }
        for child in self.children() {
            child.collect_atoms(out);
        }
    }

    /// Lower the tree into `graph`.
    ///
    /// Returns `None` for an unfilled node or an empty group. An empty group
    /// nested in a sequence contributes nothing; inside a choice it is an
    /// empty alternative.
    pub fn to_fragment(&self, graph: &mut NfmGraph) -> Option<Fragment> {
        let body = match self.kind {
            ModelKind::Unknown => return None,
            ModelKind::Leaf => graph.leaf(self.leaf.clone()?),
            ModelKind::Sequence => {
                let mut parts = Vec::new();
                for child in self.children() {
                    parts.extend(child.to_fragment(graph));
                }
                if parts.is_empty() {
                    return None;
                }
                graph.sequence(&parts)
            }
            ModelKind::Choice => {
                let mut branches = Vec::new();
                for child in self.children() {
                    let branch = match child.to_fragment(graph) {
                        Some(fragment) => fragment,
                        None => graph.none(),
                    };
                    branches.push(branch);
                }
                if branches.is_empty() {
                    return None;
                }
                graph.alternation(&branches)
            }
        };

        Some(match self.cardinality() {
            Cardinality::One => body,
            Cardinality::Optional => graph.optional(body),
            Cardinality::ZeroOrMore => graph.zero_or_more(body),
            Cardinality::OneOrMore => graph.one_or_more(body),
            Cardinality::Never => graph.none(),
            Cardinality::Bounded { min, max } => graph.bounded(body, min, max),
        })
    }
}

/// DTD-style notation: `(a,(b|c)*,d?)`, `x{2,4}`, `#UNKNOWN` for unfilled
/// nodes and `()` for empty groups.
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, &self.leaf) {
            (ModelKind::Leaf, Some(atom)) => write!(f, "{atom}")?,
            (ModelKind::Leaf, None) | (ModelKind::Unknown, _) => f.write_str("#UNKNOWN")?,
            (ModelKind::Sequence | ModelKind::Choice, _) => {
                let sep = if self.kind == ModelKind::Sequence { ',' } else { '|' };
                f.write_char('(')?;
                for (i, child) in self.children().iter().enumerate() {
                    if i > 0 {
                        f.write_char(sep)?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_char(')')?;
            }
        }
        write!(f, "{}", self.cardinality())
    }
}
