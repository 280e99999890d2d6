//! Tests for `DfmBuilder::merge`.

use crate::Atom;

use super::{DfmBuilder, DfmId};

/// Automaton accepting exactly `names` in order.
fn chain(dfms: &mut DfmBuilder, names: &[&str]) -> DfmId {
    let start = dfms.alloc();
    let mut current = start;
    for name in names {
        let next = dfms.alloc();
        dfms.set_transition(current, Atom::element(*name), next);
        current = next;
    }
    dfms.set_accepting(current, true);
    start
}

/// Automaton accepting `name*`.
fn repeat(dfms: &mut DfmBuilder, name: &str) -> DfmId {
    let node = dfms.alloc();
    dfms.set_accepting(node, true);
    dfms.set_transition(node, Atom::element(name), node);
    node
}

fn accepts(dfms: &DfmBuilder, start: DfmId, input: &[&str]) -> bool {
    let mut current = start;
    for name in input {
        match dfms.advance(current, name) {
            Some(next) => current = next,
            None => return false,
        }
    }
    dfms.node(current).is_accepting()
}

#[test]
fn merge_shares_common_prefix() {
    let mut dfms = DfmBuilder::new();
    let ab = chain(&mut dfms, &["a", "b"]);
    let ac = chain(&mut dfms, &["a", "c"]);

    let merged = dfms.merge(ab, ac).unwrap();

    insta::assert_snapshot!(dfms.dump(merged), @r"
    D0: a → D1
    D1: b → D2, c → D3
    D2 ✓: ∅
    D3 ✓: ∅
    ");
}

#[test]
fn merge_ors_accepting() {
    let mut dfms = DfmBuilder::new();
    let nothing = chain(&mut dfms, &[]);
    let a = chain(&mut dfms, &["a"]);

    let merged = dfms.merge(nothing, a).unwrap();

    assert!(accepts(&dfms, merged, &[]));
    assert!(accepts(&dfms, merged, &["a"]));
    assert!(!accepts(&dfms, merged, &["a", "a"]));
}

#[test]
fn merge_with_itself_is_identity() {
    let mut dfms = DfmBuilder::new();
    let a = chain(&mut dfms, &["a"]);
    let before = dfms.live_count();

    assert_eq!(dfms.merge(a, a).unwrap(), a);
    assert_eq!(dfms.live_count(), before);
}

#[test]
fn merge_with_any_is_any() {
    let mut dfms = DfmBuilder::new();
    let any = dfms.any_node();
    let a = chain(&mut dfms, &["a", "b"]);

    assert_eq!(dfms.merge(a, any).unwrap(), any);
    assert_eq!(dfms.merge(any, a).unwrap(), any);
}

#[test]
fn merge_of_empty_nodes() {
    let mut dfms = DfmBuilder::new();
    let empty = dfms.empty_node();
    let also_empty = dfms.alloc();
    dfms.set_accepting(also_empty, true);
    let a = chain(&mut dfms, &["a"]);

    let only_empty = dfms.merge(empty, empty).unwrap();
    assert_eq!(only_empty, empty);

    let with_a = dfms.merge(empty, a).unwrap();
    assert!(!dfms.node(with_a).is_empty());
    assert!(accepts(&dfms, with_a, &[]));
    assert!(accepts(&dfms, with_a, &["a"]));

    let plain = dfms.merge(empty, also_empty).unwrap();
    assert!(dfms.same_language(plain, empty));
}

#[test]
fn merge_follows_loops() {
    let mut dfms = DfmBuilder::new();
    let a_star = repeat(&mut dfms, "a");
    let ab = chain(&mut dfms, &["a", "b"]);

    let merged = dfms.merge(a_star, ab).unwrap();

    assert!(accepts(&dfms, merged, &[]));
    assert!(accepts(&dfms, merged, &["a", "a", "a"]));
    assert!(accepts(&dfms, merged, &["a", "b"]));
    assert!(!accepts(&dfms, merged, &["a", "a", "b"]));
    assert!(!accepts(&dfms, merged, &["b"]));
}

#[test]
fn merge_is_commutative_and_associative() {
    let mut dfms = DfmBuilder::new();
    let x = chain(&mut dfms, &["a", "b"]);
    let y = repeat(&mut dfms, "a");
    let z = chain(&mut dfms, &["b"]);

    let xy = dfms.merge(x, y).unwrap();
    let yx = dfms.merge(y, x).unwrap();
    assert!(dfms.same_language(xy, yx));

    let left = dfms.merge(xy, z).unwrap();
    let yz = dfms.merge(y, z).unwrap();
    let right = dfms.merge(x, yz).unwrap();
    assert!(dfms.same_language(left, right));

    let inputs: [&[&str]; 5] = [&[], &["a"], &["a", "b"], &["b"], &["a", "a"]];
    for input in inputs {
        let expected = [x, y, z].iter().any(|&s| accepts(&dfms, s, input));
        assert_eq!(accepts(&dfms, left, input), expected, "{input:?}");
    }
    assert!(!accepts(&dfms, left, &["b", "b"]));
}

#[test]
fn same_language_detects_difference() {
    let mut dfms = DfmBuilder::new();
    let ab = chain(&mut dfms, &["a", "b"]);
    let ac = chain(&mut dfms, &["a", "c"]);
    let a_star = repeat(&mut dfms, "a");
    let any = dfms.any_node();

    assert!(!dfms.same_language(ab, ac));
    assert!(!dfms.same_language(a_star, any));
    assert!(dfms.same_language(any, any));
}
