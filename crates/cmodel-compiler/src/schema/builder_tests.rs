use cmodel_core::{Atom, CompileError};

use crate::error::BuildError;
use crate::model::Model;
use crate::schema::{
    AttributeDecl, AttributeDefault, AttributeType, ContentKind, ContentSpec, SchemaBuilder,
};
use crate::test_utils::{choice, el, seq};

fn name(s: &str) -> Atom {
    Atom::element(s)
}

fn attr(s: &str, default: AttributeDefault) -> AttributeDecl {
    AttributeDecl::new(Atom::attribute(s), AttributeType::CData, default)
}

#[test]
fn children_content_is_compiled() {
    let mut builder = SchemaBuilder::new();
    builder.declare_element(name("doc"), ContentSpec::Children(seq([el("head"), el("body")])));
    builder.declare_element(name("head"), ContentSpec::Empty);
    builder.declare_element(name("body"), ContentSpec::Empty);

    let schema = builder.build();
    let doc = schema.get_element("doc").unwrap().unwrap();

    assert_eq!(doc.content(), ContentKind::Children);
    assert_eq!(doc.model(), "(head,body)");
    assert!(!doc.is_text());
    insta::assert_snapshot!(schema.dfm(doc).dump(), @r"
    D0: head → D1
    D1: body → D2
    D2 ✓: ∅
    ");
}

#[test]
fn mixed_content_is_repeated_choice() {
    let mut builder = SchemaBuilder::new();
    builder.declare_element(name("p"), ContentSpec::Mixed(vec![name("em"), name("b")]));

    let schema = builder.build();
    let p = schema.get_element("p").unwrap().unwrap();

    assert!(p.is_text());
    assert_eq!(p.content(), ContentKind::Mixed);
    assert_eq!(p.model(), "(#PCDATA|em|b)*");
    insta::assert_snapshot!(schema.dfm(p).dump(), @"D0 ✓: b → D0, em → D0");
}

#[test]
fn text_only_mixed_content_accepts_no_children() {
    let mut builder = SchemaBuilder::new();
    builder.declare_element(name("title"), ContentSpec::Mixed(Vec::new()));

    let schema = builder.build();
    let title = schema.get_element("title").unwrap().unwrap();
    let dfm = schema.dfm(title);

    assert_eq!(title.model(), "(#PCDATA)");
    assert!(title.is_text());
    assert!(dfm.is_accepting());
    assert!(dfm.advance("b").is_none());
}

#[test]
fn empty_and_any_share_special_nodes() {
    let mut builder = SchemaBuilder::new();
    builder.declare_element(name("br"), ContentSpec::Empty);
    builder.declare_element(name("hr"), ContentSpec::Empty);
    builder.declare_element(name("div"), ContentSpec::Any);

    let schema = builder.build();
    let br = schema.get_element("br").unwrap().unwrap();
    let hr = schema.get_element("hr").unwrap().unwrap();
    let div = schema.get_element("div").unwrap().unwrap();

    assert_eq!(br.start(), hr.start());
    assert!(br.is_empty());
    assert!(schema.dfm(br).is_empty());
    assert!(div.is_any());
    assert!(div.is_text());
    assert_eq!(schema.dfm(div).advance("anything"), Some(schema.dfm(div)));
    assert_eq!(schema.dfms().unwrap().len(), 2);
}

#[test]
fn referenced_but_undeclared_elements_are_any() {
    let mut builder = SchemaBuilder::new();
    builder.declare_element(name("list"), ContentSpec::Children(el("item").one_or_more()));

    let schema = builder.build();
    let item = schema.get_element("item").unwrap().unwrap();

    assert!(item.is_undefined());
    assert!(item.is_any());
    assert!(!schema.get_element("list").unwrap().unwrap().is_undefined());
    assert!(schema.get_element("other").unwrap().is_none());
}

#[test]
fn redeclaration_replaces_and_recycles_nodes() {
    let mut builder = SchemaBuilder::new();
    builder.declare_element(name("a"), ContentSpec::Children(seq([el("x"), el("y")])));
    builder.declare_element(name("a"), ContentSpec::Children(el("z")));
    builder.declare_element(name("x"), ContentSpec::Empty);
    builder.declare_element(name("y"), ContentSpec::Empty);
    builder.declare_element(name("z"), ContentSpec::Empty);

    let schema = builder.build();
    let a = schema.get_element("a").unwrap().unwrap();

    assert_eq!(a.model(), "z");
    assert!(schema.dfm(a).advance("z").is_some());
    assert!(schema.dfm(a).advance("x").is_none());
    // `z` automaton (2 nodes) plus the shared EMPTY node.
    assert_eq!(schema.dfms().unwrap().len(), 3);
}

#[test]
fn first_attribute_declaration_wins() {
    let mut builder = SchemaBuilder::new();
    builder.declare_element(name("img"), ContentSpec::Empty);
    builder.declare_attributes(
        "img",
        [
            attr("src", AttributeDefault::Required),
            attr("alt", AttributeDefault::Implied),
        ],
    );
    builder.declare_attributes(
        "img",
        [
            attr("src", AttributeDefault::Value("x.png".into())),
            attr("width", AttributeDefault::Fixed("10".into())),
        ],
    );

    let schema = builder.build();
    let img = schema.get_element("img").unwrap().unwrap();
    let names: Vec<_> = img.attributes().map(AttributeDecl::name).collect();

    assert_eq!(names, ["src", "alt", "width"]);
    assert!(img.attribute("src").unwrap().is_required());
    assert_eq!(img.attribute("width").unwrap().default_value(), Some("10"));
    assert!(img.attribute("width").unwrap().is_fixed());
    assert_eq!(img.required_attributes().count(), 1);
}

#[test]
fn attributes_for_undeclared_element_create_placeholder() {
    let mut builder = SchemaBuilder::new();
    builder.declare_attributes("ghost", [attr("id", AttributeDefault::Implied)]);

    let schema = builder.build();
    let ghost = schema.get_element("ghost").unwrap().unwrap();

    assert!(ghost.is_undefined());
    assert!(ghost.attribute("id").is_some());
}

#[test]
fn enumerated_attribute_values() {
    let decl = AttributeDecl::new(
        Atom::attribute("align"),
        AttributeType::Enumeration(vec!["left".into(), "right".into()]),
        AttributeDefault::Value("left".into()),
    );

    assert_eq!(decl.allowed_values(), Some(&["left".to_owned(), "right".to_owned()][..]));
    assert_eq!(decl.default_value(), Some("left"));
    assert!(!decl.is_required());
    assert_eq!(attr("x", AttributeDefault::Implied).allowed_values(), None);
}

#[test]
fn incomplete_model_poisons_schema() {
    let mut builder = SchemaBuilder::new();
    builder.declare_element(name("a"), ContentSpec::Children(seq([el("b"), Model::unknown()])));

    assert_eq!(
        builder.error(),
        Some(&BuildError::UninitializedModel {
            element: "a".into()
        })
    );

    let schema = builder.build();
    let err = schema.get_element("a").unwrap_err();
    assert_eq!(err.to_string(), "schema build failed: content model of `a` is incomplete");
}

#[test]
fn state_limit_failure_is_recorded() {
    let blowup = seq([
        choice([el("a"), el("b")]).zero_or_more(),
        el("a"),
        choice([el("a"), el("b")]).with_occurs(5, 5),
    ]);
    let mut builder = SchemaBuilder::new().with_state_limit(16);
    builder.declare_element(name("big"), ContentSpec::Children(blowup));
    builder.declare_element(name("small"), ContentSpec::Children(el("a")));

    assert_eq!(
        builder.error(),
        Some(&BuildError::Compile {
            element: "big".into(),
            source: CompileError::StateLimitExceeded { limit: 16 },
        })
    );

    let schema = builder.build();
    assert!(schema.elements().is_err());
    assert!(matches!(schema.error(), Some(BuildError::Compile { element, .. }) if element == "big"));
}

#[test]
fn only_first_error_is_kept() {
    let mut builder = SchemaBuilder::new();
    builder.record_error(BuildError::ParseAt {
        line: 3,
        message: "expected `>`".into(),
    });
    builder.record_error(BuildError::Parse {
        message: "unexpected end of input".into(),
    });

    let schema = builder.build();

    assert_eq!(
        schema.error().map(ToString::to_string).as_deref(),
        Some("parse error at line 3: expected `>`")
    );
}
