//! Skeletons: fixed program structures with one unresolved constant
//!
//! A skeleton wraps a base tree `T` from the enumerator around a constant
//! slot `C`. The slot's shape is inferred from the concrete shapes `T` takes on
//! the examples and the expected outputs; a form whose inferred shape differs
//! between examples cannot be satisfied by a single constant and is skipped.

use crate::ir::{Expr, Operation};
use crate::matrix::{ConcreteMatrix, Matrix, Shape, SymbolicMatrix};
use crate::search::config::Grammar;
use crate::search::enumerate::enumerate_with;
use crate::search::examples::ExampleSet;

/// Id of the single slot every skeleton carries
pub const SLOT_ID: usize = 0;

/// How the base tree and the slot are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkeletonForm {
    /// `C`
    Constant,
    /// `T.add(C)`
    Offset,
    /// `T.multiply(C)`
    RightProduct,
    /// `C.multiply(T)`
    LeftProduct,
}

impl SkeletonForm {
    const AROUND_TREE: [SkeletonForm; 3] = [
        SkeletonForm::Offset,
        SkeletonForm::RightProduct,
        SkeletonForm::LeftProduct,
    ];

    /// Slot shape for one example, given the base tree's shape there
    pub fn slot_shape(&self, tree: Option<Shape>, output: Shape) -> Option<Shape> {
        match (self, tree) {
            (SkeletonForm::Constant, _) => Some(output),
            (SkeletonForm::Offset, Some(t)) => (t == output).then_some(t),
            (SkeletonForm::RightProduct, Some(t)) => {
                (t.rows == output.rows).then_some(Shape::new(t.columns, output.columns))
            }
            (SkeletonForm::LeftProduct, Some(t)) => {
                (t.columns == output.columns).then_some(Shape::new(output.rows, t.rows))
            }
            _ => None,
        }
    }

    fn build(&self, tree: Option<&Expr>, slot: Expr) -> Option<Expr> {
        match (self, tree) {
            (SkeletonForm::Constant, _) => Some(slot),
            (SkeletonForm::Offset, Some(t)) => Some(Expr::binary(Operation::Add, t.clone(), slot)),
            (SkeletonForm::RightProduct, Some(t)) => {
                Some(Expr::binary(Operation::Multiply, t.clone(), slot))
            }
            (SkeletonForm::LeftProduct, Some(t)) => {
                Some(Expr::binary(Operation::Multiply, slot, t.clone()))
            }
            _ => None,
        }
    }
}

/// Slot shape shared by every example, if there is one
fn consistent_shape(
    form: SkeletonForm,
    tree_shapes: &[Option<Shape>],
    output_shapes: &[Shape],
) -> Option<Shape> {
    let mut shapes = tree_shapes
        .iter()
        .zip(output_shapes)
        .map(|(tree, output)| form.slot_shape(*tree, *output));
    let first = shapes.next()??;
    shapes.all(|s| s == Some(first)).then_some(first)
}

/// Concrete shape of `tree` on every example, or `None` if it is ill-typed on any
fn tree_shapes(tree: &Expr, examples: &ExampleSet) -> Option<Vec<Option<Shape>>> {
    examples
        .iter()
        .map(|example| {
            tree.evaluate::<ConcreteMatrix>(&example.inputs)
                .ok()
                .map(|value| Some(value.shape()))
        })
        .collect()
}

/// Skeletons in the order they are tried: the bare constant first, then the
/// three forms around every tree of height at most `depth`.
pub fn build_skeletons(examples: &ExampleSet, grammar: &Grammar, depth: usize) -> Vec<Expr> {
    let output_shapes: Vec<Shape> = examples.iter().map(|e| e.output.shape()).collect();
    let mut skeletons = Vec::new();

    let no_tree = vec![None; output_shapes.len()];
    if let Some(shape) = consistent_shape(SkeletonForm::Constant, &no_tree, &output_shapes) {
        skeletons.push(Expr::slot(SLOT_ID, shape));
    }

    for tree in enumerate_with(grammar, depth, examples.num_variables()) {
        let Some(shapes) = tree_shapes(&tree, examples) else {
            continue;
        };
        for form in SkeletonForm::AROUND_TREE {
            let Some(shape) = consistent_shape(form, &shapes, &output_shapes) else {
                continue;
            };
            let Some(skeleton) = form.build(Some(&tree), Expr::slot(SLOT_ID, shape)) else {
                continue;
            };
            if skeleton.is_supported_by::<SymbolicMatrix>() {
                skeletons.push(skeleton);
            }
        }
    }

    skeletons
}
