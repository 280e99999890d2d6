//! Schema construction from declarations.

use std::sync::Arc;

use cmodel_core::{Atom, CompileError, DfmBuilder, DfmId};
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::compile::compile_model;
use crate::error::BuildError;

use super::{AttributeDecl, ContentSpec, Element, Schema};

/// Collects element and attribute declarations, compiling each content
/// model as it arrives. `build` publishes the result.
///
/// Errors never abort the build; the first one is carried into the
/// `Schema`, which then refuses queries.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    dfms: DfmBuilder,
    elements: IndexMap<String, Element>,
    attributes: IndexMap<String, Vec<AttributeDecl>>,
    referenced: IndexMap<String, Atom>,
    error: Option<BuildError>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the states of any single compiled content model.
    pub fn with_state_limit(mut self, limit: u32) -> Self {
        self.dfms = std::mem::take(&mut self.dfms).with_state_limit(limit);
        self
    }

    /// Compile and register an element. A later declaration of the same
    /// name replaces the earlier one.
    pub fn declare_element(&mut self, name: Atom, content: ContentSpec) {
        if let ContentSpec::Children(model) = &content
            && !model.is_complete()
        {
            self.record_error(BuildError::UninitializedModel {
                element: name.name().to_owned(),
            });
            return;
        }

        let start = match self.compile_content(&content) {
            Ok(start) => start,
            Err(source) => {
                self.record_error(BuildError::Compile {
                    element: name.name().to_owned(),
                    source,
                });
                return;
            }
        };

        let element = Element::new(name, content.kind(), start).with_model(content.to_string());
        debug!(element = element.name(), model = element.model(), start = %start, "element declared");

        if let Some(previous) = self.elements.insert(element.name().to_owned(), element) {
            let released = self.dfms.release(previous.start());
            trace!(element = previous.name(), released, "earlier declaration replaced");
        }
    }

    fn compile_content(&mut self, content: &ContentSpec) -> Result<DfmId, CompileError> {
        let model = match content {
            ContentSpec::Empty => return Ok(self.dfms.empty_node()),
            ContentSpec::Any => return Ok(self.dfms.any_node()),
            ContentSpec::Mixed(_) | ContentSpec::Children(_) => content.element_model(),
        };
        let Some(model) = model else {
            return Ok(self.dfms.empty_node());
        };

        for atom in model.atoms() {
            self.referenced.entry(atom.name().to_owned()).or_insert(atom);
        }
        compile_model(&mut self.dfms, &model)
    }

    /// Attach attribute declarations to `element`. When an attribute is
    /// declared more than once, the first declaration is binding.
    pub fn declare_attributes(
        &mut self,
        element: &str,
        attributes: impl IntoIterator<Item = AttributeDecl>,
    ) {
        self.attributes
            .entry(element.to_owned())
            .or_default()
            .extend(attributes);
    }

    /// Record a failure from outside the compiler, such as a parse error.
    /// Only the first error is kept.
    pub fn record_error(&mut self, error: BuildError) {
        if self.error.is_none() {
            warn!(%error, "schema build error recorded");
            self.error = Some(error);
        }
    }

    pub fn error(&self) -> Option<&BuildError> {
        self.error.as_ref()
    }

    /// Finish the build.
    ///
    /// Elements referenced from a content model but never declared get an
    /// undefined placeholder with `ANY` content, as do elements that only
    /// appear in attribute declarations.
    pub fn build(mut self) -> Schema {
        let missing: Vec<Atom> = self
            .referenced
            .values()
            .filter(|atom| !self.elements.contains_key(atom.name()))
            .cloned()
            .collect();
        for atom in missing {
            self.add_undefined(atom);
        }

        for (name, attributes) in std::mem::take(&mut self.attributes) {
            if !self.elements.contains_key(&name) {
                self.add_undefined(Atom::element(name.as_str()));
            }
            let Some(element) = self.elements.get_mut(&name) else {
                continue;
            };
            for attribute in attributes {
                if element.attribute(attribute.name()).is_some() {
                    trace!(element = %name, attribute = attribute.name(), "duplicate attribute ignored");
                    continue;
                }
                element.add_attribute(attribute);
            }
        }

        let elements = self.elements.len();
        let dfms = Arc::new(self.dfms.freeze());
        let nodes = dfms.len();
        let mut schema = Schema::new(dfms);
        for (_, element) in self.elements {
            schema.add_element(element);
        }
        if let Some(error) = self.error {
            schema.record_error(error);
        }

        debug!(
            elements,
            nodes,
            poisoned = schema.error().is_some(),
            "schema built"
        );
        schema
    }

    fn add_undefined(&mut self, atom: Atom) {
        trace!(element = %atom, "undefined element");
        let any = self.dfms.any_node();
        self.elements
            .insert(atom.name().to_owned(), Element::undefined(atom, any));
    }
}
