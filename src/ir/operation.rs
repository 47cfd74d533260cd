//! The closed set of matrix operations a program can call

use std::fmt;

/// Matrix operations available to programs.
///
/// Parameterized variants carry their immediate operands; the matrix operands
/// of a call are the receiver plus `arity() - 1` argument subtrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    // Binary
    Add,
    Subtract,
    Multiply,

    // Unary
    Scale(f64),
    Negate,
    Transpose,
    Power(u32),
    Resize { rows: usize, columns: usize },
    DropRow(usize),
    DropColumn(usize),
    IdentityLike,
    ZerosLike,
    Invert,
}

impl Operation {
    /// Number of matrix operands, receiver included
    pub fn arity(&self) -> usize {
        match self {
            Operation::Add | Operation::Subtract | Operation::Multiply => 2,
            _ => 1,
        }
    }

    pub fn is_binary(&self) -> bool {
        self.arity() == 2
    }

    /// Method name used in the canonical textual form
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Scale(_) => "scale",
            Operation::Negate => "negate",
            Operation::Transpose => "transpose",
            Operation::Power(_) => "pow",
            Operation::Resize { .. } => "resize",
            Operation::DropRow(_) => "drop_row",
            Operation::DropColumn(_) => "drop_column",
            Operation::IdentityLike => "identity_like",
            Operation::ZerosLike => "zeros_like",
            Operation::Invert => "invert",
        }
    }

    /// Immediate operands rendered inside the call parentheses
    pub(crate) fn immediates(&self) -> Vec<String> {
        match self {
            Operation::Scale(s) => vec![format!("{}", s)],
            Operation::Power(e) => vec![e.to_string()],
            Operation::Resize { rows, columns } => vec![rows.to_string(), columns.to_string()],
            Operation::DropRow(i) | Operation::DropColumn(i) => vec![i.to_string()],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let immediates = self.immediates();
        if immediates.is_empty() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}({})", self.name(), immediates.join(", "))
        }
    }
}
