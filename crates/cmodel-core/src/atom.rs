//! Atom interning for automaton transition labels.
//!
//! Every distinct element or attribute name becomes one shared `Atom`.
//! Atoms clone cheaply (the name is reference counted) and compare, hash and
//! sort by name, which is what the sorted transition tables key on.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;

/// Which grammar namespace an atom was declared in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum AtomKind {
    Element,
    Attribute,
}

/// An interned grammar symbol.
///
/// Equality is by name only. The kind is carried for diagnostics; a single
/// transition table never mixes element and attribute atoms.
#[derive(Clone)]
pub struct Atom {
    kind: AtomKind,
    name: Arc<str>,
}

impl Atom {
    /// Create a free-standing atom. Prefer `AtomTable::intern` so equal
    /// names share storage.
    pub fn new(kind: AtomKind, name: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn element(name: impl Into<Arc<str>>) -> Self {
        Self::new(AtomKind::Element, name)
    }

    pub fn attribute(name: impl Into<Arc<str>>) -> Self {
        Self::new(AtomKind::Attribute, name)
    }

    #[inline]
    pub fn kind(&self) -> AtomKind {
        self.kind
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.name, &other.name) || self.name == other.name
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Atom").field(&&*self.name).finish()
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Atom table. Deduplicates names per kind and hands out shared atoms.
///
/// Built by the grammar parser; read-only once declarations are compiled.
#[derive(Debug, Clone, Default)]
pub struct AtomTable {
    elements: IndexMap<Arc<str>, Atom>,
    attributes: IndexMap<Arc<str>, Atom>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: AtomKind) -> &IndexMap<Arc<str>, Atom> {
        match kind {
            AtomKind::Element => &self.elements,
            AtomKind::Attribute => &self.attributes,
        }
    }

    fn map_mut(&mut self, kind: AtomKind) -> &mut IndexMap<Arc<str>, Atom> {
        match kind {
            AtomKind::Element => &mut self.elements,
            AtomKind::Attribute => &mut self.attributes,
        }
    }

    /// Intern a name, returning its Atom.
    /// If the name was already interned for this kind, returns the existing Atom.
    pub fn intern(&mut self, kind: AtomKind, name: &str) -> Atom {
        if let Some(atom) = self.map(kind).get(name) {
            return atom.clone();
        }

        let atom = Atom::new(kind, name);
        self.map_mut(kind).insert(atom.name.clone(), atom.clone());
        atom
    }

    /// Intern an owned name, avoiding a copy if not already present.
    pub fn intern_owned(&mut self, kind: AtomKind, name: String) -> Atom {
        if let Some(atom) = self.map(kind).get(name.as_str()) {
            return atom.clone();
        }

        let atom = Atom::new(kind, name);
        self.map_mut(kind).insert(atom.name.clone(), atom.clone());
        atom
    }

    /// Look up an already interned name.
    #[inline]
    pub fn get(&self, kind: AtomKind, name: &str) -> Option<&Atom> {
        self.map(kind).get(name)
    }

    /// Number of interned atoms across both kinds.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len() + self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.attributes.is_empty()
    }

    /// Iterate over all atoms: elements first, then attributes, each in
    /// insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.elements.values().chain(self.attributes.values())
    }
}
