//! Expression trees over matrix operations

use crate::ir::Operation;
use crate::matrix::{ConcreteMatrix, Matrix, Shape};
use crate::semantics::{self, EvalError};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// How a constant node obtains its value.
///
/// Selectors are resolved by the representation a tree is evaluated over
/// (see [`Matrix::from_selector`]), so the same tree yields a concrete identity
/// on numeric bindings and a symbolic one on term bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantSelector {
    Identity(usize),
    Zeros(Shape),
    Literal(ConcreteMatrix),
    /// Unresolved constant position of a skeleton
    Slot { id: usize, shape: Shape },
}

impl fmt::Display for ConstantSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantSelector::Identity(size) => write!(f, "identity({})", size),
            ConstantSelector::Zeros(shape) => write!(f, "zeros({}, {})", shape.rows, shape.columns),
            ConstantSelector::Literal(matrix) => {
                write!(f, "const[")?;
                for (i, row) in matrix.to_rows().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    let entries: Vec<String> = row.iter().map(|x| format!("{}", x)).collect();
                    write!(f, "[{}]", entries.join(", "))?;
                }
                write!(f, "]")
            }
            ConstantSelector::Slot { id, shape } => write!(f, "?c{}[{}]", id, shape),
        }
    }
}

/// A matrix-valued program.
///
/// Subtrees are reference counted so the enumerator can share them between
/// candidates. Two trees are duplicates iff they are structurally equal, which
/// coincides with equality of their canonical textual forms.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Index into the binding list shared by the whole program
    Variable(usize),
    Constant(ConstantSelector),
    Call {
        op: Operation,
        receiver: Arc<Expr>,
        args: Vec<Arc<Expr>>,
    },
}

impl Expr {
    pub fn var(index: usize) -> Self {
        Expr::Variable(index)
    }

    pub fn constant(selector: ConstantSelector) -> Self {
        Expr::Constant(selector)
    }

    pub fn literal(matrix: ConcreteMatrix) -> Self {
        Expr::Constant(ConstantSelector::Literal(matrix))
    }

    pub fn slot(id: usize, shape: Shape) -> Self {
        Expr::Constant(ConstantSelector::Slot { id, shape })
    }

    pub fn unary(op: Operation, receiver: impl Into<Arc<Expr>>) -> Self {
        debug_assert_eq!(op.arity(), 1);
        Expr::Call {
            op,
            receiver: receiver.into(),
            args: Vec::new(),
        }
    }

    pub fn binary(op: Operation, receiver: impl Into<Arc<Expr>>, arg: impl Into<Arc<Expr>>) -> Self {
        debug_assert_eq!(op.arity(), 2);
        Expr::Call {
            op,
            receiver: receiver.into(),
            args: vec![arg.into()],
        }
    }

    /// Receiver followed by arguments; empty for leaves
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Call { receiver, args, .. } => std::iter::once(receiver.as_ref())
                .chain(args.iter().map(Arc::as_ref))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Levels of operation nesting; leaves have depth 0
    pub fn depth(&self) -> usize {
        match self {
            Expr::Call { .. } => 1 + self.children().iter().map(|c| c.depth()).max().unwrap_or(0),
            _ => 0,
        }
    }

    pub fn max_variable(&self) -> Option<usize> {
        match self {
            Expr::Variable(i) => Some(*i),
            Expr::Constant(_) => None,
            Expr::Call { .. } => self.children().iter().filter_map(|c| c.max_variable()).max(),
        }
    }

    /// Minimum binding-list length this tree needs
    pub fn variable_count(&self) -> usize {
        self.max_variable().map_or(0, |i| i + 1)
    }

    /// Constant slots in first-occurrence order, without repeats
    pub fn slots(&self) -> Vec<(usize, Shape)> {
        let mut found = Vec::new();
        self.collect_slots(&mut found);
        found
    }

    fn collect_slots(&self, found: &mut Vec<(usize, Shape)>) {
        match self {
            Expr::Constant(ConstantSelector::Slot { id, shape }) => {
                if !found.iter().any(|(seen, _)| seen == id) {
                    found.push((*id, *shape));
                }
            }
            Expr::Call { .. } => {
                for child in self.children() {
                    child.collect_slots(found);
                }
            }
            _ => {}
        }
    }

    pub fn has_slots(&self) -> bool {
        match self {
            Expr::Constant(ConstantSelector::Slot { .. }) => true,
            Expr::Call { .. } => self.children().iter().any(|c| c.has_slots()),
            _ => false,
        }
    }

    /// Replace every slot with a value in `values` by a literal constant
    pub fn substitute_slots(&self, values: &HashMap<usize, ConcreteMatrix>) -> Expr {
        match self {
            Expr::Constant(ConstantSelector::Slot { id, .. }) => match values.get(id) {
                Some(matrix) => Expr::literal(matrix.clone()),
                None => self.clone(),
            },
            Expr::Call { op, receiver, args } => Expr::Call {
                op: *op,
                receiver: Arc::new(receiver.substitute_slots(values)),
                args: args
                    .iter()
                    .map(|a| Arc::new(a.substitute_slots(values)))
                    .collect(),
            },
            _ => self.clone(),
        }
    }

    /// Whether every operation in the tree can be evaluated over `M`
    pub fn is_supported_by<M: Matrix>(&self) -> bool {
        match self {
            Expr::Call { op, .. } => {
                M::supports(op) && self.children().iter().all(|c| c.is_supported_by::<M>())
            }
            _ => true,
        }
    }

    /// Evaluate against an ordered binding list
    pub fn evaluate<M: Matrix>(&self, bindings: &[M]) -> Result<M, EvalError> {
        semantics::evaluate(self, bindings)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Variable(i) => write!(f, "var{}", i),
            Expr::Constant(selector) => write!(f, "{}", selector),
            Expr::Call { op, receiver, args } => {
                write!(f, "{}.{}(", receiver, op.name())?;
                let mut first = true;
                for immediate in op.immediates() {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", immediate)?;
                    first = false;
                }
                for arg in args {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                    first = false;
                }
                write!(f, ")")
            }
        }
    }
}
