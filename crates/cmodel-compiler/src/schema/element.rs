//! Element and attribute declarations.

use std::fmt;

use cmodel_core::{Atom, DfmId};
use indexmap::IndexMap;

use crate::model::Model;

/// Declared content of an element.
#[derive(Debug)]
pub enum ContentSpec {
    /// `EMPTY`
    Empty,
    /// `ANY`
    Any,
    /// `(#PCDATA | a | b)*`. Text may appear anywhere between the listed
    /// elements.
    Mixed(Vec<Atom>),
    /// A content expression over child elements.
    Children(Model),
}

impl ContentSpec {
    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Empty => ContentKind::Empty,
            Self::Any => ContentKind::Any,
            Self::Mixed(_) => ContentKind::Mixed,
            Self::Children(_) => ContentKind::Children,
        }
    }

    /// The model checked against child elements. Mixed content becomes a
    /// repeated choice; `EMPTY` and `ANY` have none.
    pub fn element_model(&self) -> Option<Model> {
        match self {
            Self::Empty | Self::Any => None,
            Self::Mixed(atoms) => Some(
                Model::choice()
                    .with_children(atoms.iter().cloned().map(Model::leaf))
                    .zero_or_more(),
            ),
            Self::Children(model) => Some(model.shallow_copy()),
        }
    }
}

impl fmt::Display for ContentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("EMPTY"),
            Self::Any => f.write_str("ANY"),
            Self::Mixed(atoms) if atoms.is_empty() => f.write_str("(#PCDATA)"),
            Self::Mixed(atoms) => {
                f.write_str("(#PCDATA")?;
                for atom in atoms {
                    write!(f, "|{atom}")?;
                }
                f.write_str(")*")
            }
            Self::Children(model) => write!(f, "{model}"),
        }
    }
}

/// Shape of an element's content, without the model itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Empty,
    Any,
    Mixed,
    Children,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeType {
    CData,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
    NmToken,
    NmTokens,
    Notation(Vec<String>),
    Enumeration(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeDefault {
    /// `#REQUIRED`
    Required,
    /// `#IMPLIED`
    Implied,
    /// `#FIXED "value"`
    Fixed(String),
    /// `"value"`
    Value(String),
}

/// One attribute from an `ATTLIST` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDecl {
    name: Atom,
    ty: AttributeType,
    default: AttributeDefault,
}

impl AttributeDecl {
    pub fn new(name: Atom, ty: AttributeType, default: AttributeDefault) -> Self {
        Self { name, ty, default }
    }

    pub fn name(&self) -> &str {
        self.name.name()
    }

    pub fn atom(&self) -> &Atom {
        &self.name
    }

    pub fn ty(&self) -> &AttributeType {
        &self.ty
    }

    pub fn default(&self) -> &AttributeDefault {
        &self.default
    }

    pub fn is_required(&self) -> bool {
        self.default == AttributeDefault::Required
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.default, AttributeDefault::Fixed(_))
    }

    /// Value supplied when the attribute is absent.
    pub fn default_value(&self) -> Option<&str> {
        match &self.default {
            AttributeDefault::Fixed(v) | AttributeDefault::Value(v) => Some(v),
            AttributeDefault::Required | AttributeDefault::Implied => None,
        }
    }

    /// Allowed values of an enumerated or notation attribute.
    pub fn allowed_values(&self) -> Option<&[String]> {
        match &self.ty {
            AttributeType::Enumeration(values) | AttributeType::Notation(values) => Some(values),
            _ => None,
        }
    }
}

/// A compiled element declaration.
#[derive(Debug, Clone)]
pub struct Element {
    name: Atom,
    content: ContentKind,
    start: DfmId,
    model: String,
    undefined: bool,
    attributes: IndexMap<String, AttributeDecl>,
}

impl Element {
    pub fn new(name: Atom, content: ContentKind, start: DfmId) -> Self {
        Self {
            name,
            content,
            start,
            model: String::new(),
            undefined: false,
            attributes: IndexMap::new(),
        }
    }

    /// Placeholder for an element that is referenced but never declared.
    /// Its content is treated as `ANY`.
    pub fn undefined(name: Atom, any: DfmId) -> Self {
        let mut element = Self::new(name, ContentKind::Any, any);
        element.undefined = true;
        element
    }

    /// Attach the declaration's source text, for diagnostics.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn name(&self) -> &str {
        self.name.name()
    }

    pub fn atom(&self) -> &Atom {
        &self.name
    }

    pub fn content(&self) -> ContentKind {
        self.content
    }

    /// Start node of the content automaton.
    pub fn start(&self) -> DfmId {
        self.start
    }

    /// The content model as declared, e.g. `(head,body)`.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Character data may appear in the content.
    pub fn is_text(&self) -> bool {
        matches!(self.content, ContentKind::Mixed | ContentKind::Any)
    }

    pub fn is_any(&self) -> bool {
        self.content == ContentKind::Any
    }

    pub fn is_empty(&self) -> bool {
        self.content == ContentKind::Empty
    }

    pub fn is_undefined(&self) -> bool {
        self.undefined
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDecl> {
        self.attributes.get(name)
    }

    /// Attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeDecl> {
        self.attributes.values()
    }

    pub fn required_attributes(&self) -> impl Iterator<Item = &AttributeDecl> {
        self.attributes().filter(|a| a.is_required())
    }

    /// Add an attribute unless one with the same name exists. Returns
    /// whether it was added.
    pub(crate) fn add_attribute(&mut self, attribute: AttributeDecl) -> bool {
        match self.attributes.entry(attribute.name().to_owned()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(attribute);
                true
            }
        }
    }
}
