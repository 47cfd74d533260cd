//! Tree evaluation over any matrix representation

use crate::ir::{Expr, Operation};
use crate::matrix::{Matrix, MatrixError};
use thiserror::Error;

/// Why a tree could not be evaluated.
///
/// Inside the search loop every variant just means "candidate rejected".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("evaluation requires at least one binding")]
    EmptyBindings,

    #[error("variable index {index} out of range for {len} bindings")]
    IndexError { index: usize, len: usize },

    #[error("constant {selector} cannot be resolved for the {representation} representation: {reason}")]
    ConstantResolution {
        selector: String,
        representation: &'static str,
        #[source]
        reason: MatrixError,
    },

    #[error("operation {operation} is not available on the {representation} representation")]
    OperationNotFound {
        operation: &'static str,
        representation: &'static str,
    },

    #[error("{operation} takes {expected} matrix operands, got {found}")]
    Arity {
        operation: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{operation} failed: {source}")]
    OperationFailed {
        operation: &'static str,
        source: MatrixError,
    },
}

/// Evaluate `expr` against `bindings`
pub fn evaluate<M: Matrix>(expr: &Expr, bindings: &[M]) -> Result<M, EvalError> {
    if bindings.is_empty() {
        return Err(EvalError::EmptyBindings);
    }
    eval_node(expr, bindings)
}

fn eval_node<M: Matrix>(expr: &Expr, bindings: &[M]) -> Result<M, EvalError> {
    match expr {
        Expr::Variable(index) => bindings.get(*index).cloned().ok_or(EvalError::IndexError {
            index: *index,
            len: bindings.len(),
        }),
        Expr::Constant(selector) => {
            M::from_selector(selector).map_err(|reason| EvalError::ConstantResolution {
                selector: selector.to_string(),
                representation: M::representation(),
                reason,
            })
        }
        Expr::Call { op, receiver, args } => {
            check_supported::<M>(op)?;
            let receiver = eval_node(receiver, bindings)?;
            let args = args
                .iter()
                .map(|a| eval_node(a, bindings))
                .collect::<Result<Vec<_>, _>>()?;
            let refs: Vec<&M> = args.iter().collect();
            apply(op, &receiver, &refs)
        }
    }
}

fn check_supported<M: Matrix>(op: &Operation) -> Result<(), EvalError> {
    if M::supports(op) {
        Ok(())
    } else {
        Err(EvalError::OperationNotFound {
            operation: op.name(),
            representation: M::representation(),
        })
    }
}

/// Apply one operation to already-evaluated operands.
///
/// This is the whole dispatch table; the search loop calls it directly on
/// cached child values.
pub fn apply<M: Matrix>(op: &Operation, receiver: &M, args: &[&M]) -> Result<M, EvalError> {
    check_supported::<M>(op)?;
    let expected = op.arity() - 1;
    if args.len() != expected {
        return Err(EvalError::Arity {
            operation: op.name(),
            expected: op.arity(),
            found: args.len() + 1,
        });
    }

    let failed = |source: MatrixError| EvalError::OperationFailed {
        operation: op.name(),
        source,
    };

    match op {
        Operation::Add => receiver.add(args[0]).map_err(failed),
        Operation::Subtract => receiver.subtract(args[0]).map_err(failed),
        Operation::Multiply => receiver.multiply(args[0]).map_err(failed),
        Operation::Scale(s) => {
            let scalar = M::lift(*s).map_err(failed)?;
            Ok(receiver.scale(&scalar))
        }
        Operation::Negate => Ok(receiver.negate()),
        Operation::Transpose => Ok(receiver.transpose()),
        Operation::Power(e) => receiver.pow(*e).map_err(failed),
        Operation::Resize { rows, columns } => receiver.resize(*rows, *columns).map_err(failed),
        Operation::DropRow(i) => receiver.drop_row(*i).map_err(failed),
        Operation::DropColumn(i) => receiver.drop_column(*i).map_err(failed),
        Operation::IdentityLike => receiver.identity_like().map_err(failed),
        Operation::ZerosLike => Ok(receiver.zeros_like()),
        Operation::Invert => receiver.invert().map_err(failed),
    }
}
