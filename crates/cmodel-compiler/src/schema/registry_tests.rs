use std::sync::Arc;

use cmodel_core::{Atom, DfmBuilder};

use crate::error::{BuildError, SchemaError};
use crate::schema::{ContentKind, Element, Schema};

fn schema_with(names: &[&str]) -> Schema {
    let mut dfms = DfmBuilder::new();
    let empty = dfms.empty_node();
    let mut schema = Schema::new(Arc::new(dfms.freeze()));
    for name in names {
        schema.add_element(Element::new(Atom::element(*name), ContentKind::Empty, empty));
    }
    schema
}

#[test]
fn lookup_by_name() {
    let schema = schema_with(&["title", "body"]);

    let title = schema.get_element("title").unwrap().unwrap();

    assert_eq!(title.name(), "title");
    assert!(schema.get_element("missing").unwrap().is_none());
    assert_eq!(schema.len().unwrap(), 2);
    assert!(!schema.is_empty().unwrap());
}

#[test]
fn elements_are_sorted_by_name() {
    let schema = schema_with(&["para", "doc", "list"]);

    let names: Vec<_> = schema.elements().unwrap().iter().map(|e| e.name()).collect();

    assert_eq!(names, ["doc", "list", "para"]);
}

#[test]
fn last_added_element_wins() {
    let mut schema = schema_with(&["a"]);
    let start = schema.get_element("a").unwrap().unwrap().start();

    let replaced = schema.add_element(
        Element::new(Atom::element("a"), ContentKind::Any, start).with_model("ANY"),
    );

    assert_eq!(replaced.map(|e| e.content()), Some(ContentKind::Empty));
    assert_eq!(schema.get_element("a").unwrap().unwrap().model(), "ANY");
    assert_eq!(schema.len().unwrap(), 1);
}

#[test]
fn recorded_error_poisons_every_query() {
    let mut schema = schema_with(&["a"]);
    schema.record_error(BuildError::Parse {
        message: "bad declaration".into(),
    });
    schema.record_error(BuildError::Parse {
        message: "ignored".into(),
    });

    let first = schema.get_element("a").unwrap_err();
    let second = schema.elements().unwrap_err();
    let SchemaError::Poisoned(first) = first;
    let SchemaError::Poisoned(second) = second;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.to_string(), "parse error: bad declaration");
    assert!(schema.check().is_err());
}

#[test]
fn poisoned_error_exposes_source() {
    let mut schema = schema_with(&[]);
    schema.record_error(BuildError::UninitializedModel {
        element: "x".into(),
    });

    let err = schema.check().unwrap_err();

    assert_eq!(
        err.build_error(),
        &BuildError::UninitializedModel {
            element: "x".into()
        }
    );
    let source = std::error::Error::source(&err).map(ToString::to_string);
    assert_eq!(source.as_deref(), Some("content model of `x` is incomplete"));
}

#[test]
fn dfm_handle_points_at_element_start() {
    let schema = schema_with(&["br"]);
    let br = schema.get_element("br").unwrap().unwrap();

    let dfm = schema.dfm(br);

    assert_eq!(dfm.id(), br.start());
    assert!(dfm.is_empty());
    assert!(dfm.is_accepting());
}

#[test]
fn poisoned_schema_hides_counts_and_automata() {
    let mut schema = schema_with(&["a", "b"]);
    schema.record_error(BuildError::Parse {
        message: "bad declaration".into(),
    });

    assert!(schema.len().is_err());
    assert!(schema.is_empty().is_err());
    assert!(schema.dfms().is_err());
    assert!(schema.error().is_some());
}
