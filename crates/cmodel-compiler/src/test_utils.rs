use cmodel_core::{Atom, DfmBuilder, DfmId};

use crate::compile::compile_model;
use crate::model::Model;

pub fn el(name: &str) -> Model {
    Model::leaf(Atom::element(name))
}

pub fn seq<const N: usize>(children: [Model; N]) -> Model {
    Model::sequence().with_children(children)
}

pub fn choice<const N: usize>(children: [Model; N]) -> Model {
    Model::choice().with_children(children)
}

/// Compile `model` into a fresh store.
pub fn compiled(model: &Model) -> (DfmBuilder, DfmId) {
    let mut dfms = DfmBuilder::new();
    let start = compile_model(&mut dfms, model).expect("model compiles");
    (dfms, start)
}

/// Run `input` through the automaton at `start`.
pub fn accepts(dfms: &DfmBuilder, start: DfmId, input: &[&str]) -> bool {
    let mut current = start;
    for name in input {
        match dfms.advance(current, name) {
            Some(next) => current = next,
            None => return false,
        }
    }
    dfms.node(current).is_accepting()
}

/// Compiled automaton rendering of `model`.
pub fn dump(model: &Model) -> String {
    let (dfms, start) = compiled(model);
    dfms.dump(start)
}
