//! Published name → element registry.

use std::sync::Arc;

use cmodel_core::{Dfm, DfmGraph};
use indexmap::IndexMap;
use tracing::warn;

use crate::error::{BuildError, Result, SchemaError};

use super::Element;

/// Compiled schema: elements by name plus the automata they point into.
///
/// If the build recorded an error, every query fails with that error.
#[derive(Debug, Clone)]
pub struct Schema {
    elements: IndexMap<String, Element>,
    dfms: Arc<DfmGraph>,
    error: Option<Arc<BuildError>>,
}

impl Schema {
    pub fn new(dfms: Arc<DfmGraph>) -> Self {
        Self {
            elements: IndexMap::new(),
            dfms,
            error: None,
        }
    }

    /// Look up an element by qualified name.
    pub fn get_element(&self, name: &str) -> Result<Option<&Element>> {
        self.check()?;
        Ok(self.elements.get(name))
    }

    /// All elements, sorted by name.
    pub fn elements(&self) -> Result<Vec<&Element>> {
        self.check()?;
        let mut elements: Vec<_> = self.elements.values().collect();
        elements.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(elements)
    }

    /// Register `element` under its name. Replaces and returns any earlier
    /// element of the same name.
    pub fn add_element(&mut self, element: Element) -> Option<Element> {
        self.elements.insert(element.name().to_owned(), element)
    }

    /// Record a build failure. Only the first one is kept; queries start
    /// failing from here on.
    pub fn record_error(&mut self, error: BuildError) {
        if let Some(first) = &self.error {
            warn!(%error, first = %first, "additional schema error ignored");
            return;
        }
        warn!(%error, "schema poisoned");
        self.error = Some(Arc::new(error));
    }

    /// The recorded build error, if any.
    pub fn error(&self) -> Option<&BuildError> {
        self.error.as_deref()
    }

    /// Fails with the recorded build error, if any.
    pub fn check(&self) -> Result<()> {
        match &self.error {
            Some(error) => Err(SchemaError::Poisoned(Arc::clone(error))),
            None => Ok(()),
        }
    }

    /// Content automaton of `element`, positioned at its start.
    ///
    /// # Panics
    /// Panics if `element` was compiled into a different schema.
    pub fn dfm(&self, element: &Element) -> Dfm<'_> {
        self.dfms.get(element.start())
    }

    /// The frozen automaton store shared by every element.
    pub fn dfms(&self) -> Result<&Arc<DfmGraph>> {
        self.check()?;
        Ok(&self.dfms)
    }

    pub fn len(&self) -> Result<usize> {
        self.check()?;
        Ok(self.elements.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.check()?;
        Ok(self.elements.is_empty())
    }
}
