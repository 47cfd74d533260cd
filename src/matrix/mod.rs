//! Matrix value representations
//!
//! Every representation a program can be evaluated over implements [`Matrix`].
//! The operation set is closed: the evaluator dispatches on
//! [`Operation`](crate::ir::Operation) and calls the matching trait method, so
//! there is no runtime method lookup. Representation-specific gaps (the
//! symbolic matrix cannot invert) are reported through [`Matrix::supports`],
//! which callers check before building or evaluating a tree.

pub mod concrete;
pub mod symbolic;

pub use concrete::ConcreteMatrix;
pub use symbolic::SymbolicMatrix;

use crate::ir::{ConstantSelector, Operation};
use std::fmt;
use thiserror::Error;

/// Dimensions of a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

impl Shape {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.columns
    }

    pub fn entries(&self) -> usize {
        self.rows * self.columns
    }

    pub fn transposed(&self) -> Self {
        Self::new(self.columns, self.rows)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

/// Precondition violations raised by matrix operations.
///
/// During synthesis these are expected and frequent: an ill-shaped candidate
/// simply gets rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("matrix dimensions must be positive, got {0}")]
    EmptyDimension(Shape),

    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{axis} index {index} out of bounds for {shape} matrix")]
    IndexOutOfBounds {
        axis: &'static str,
        index: usize,
        shape: Shape,
    },

    #[error("dimension mismatch in {operation}: {left} and {right}")]
    DimensionMismatch {
        operation: &'static str,
        left: Shape,
        right: Shape,
    },

    #[error("{operation} requires a square matrix, got {shape}")]
    NotSquare {
        operation: &'static str,
        shape: Shape,
    },

    #[error("cannot resize {from} to {to}: the number of entries must remain the same")]
    EntryCountChanged { from: Shape, to: Shape },

    #[error("matrix is singular")]
    Singular,

    #[error("value {0} cannot be represented exactly")]
    Unrepresentable(f64),

    #[error("{operation} is not supported by the {representation} representation")]
    Unsupported {
        operation: &'static str,
        representation: &'static str,
    },

    #[error("constant slot c{0} has no value in this representation")]
    UnresolvedSlot(usize),
}

/// The capability set a value representation must provide.
///
/// All operations are pure: they return new matrices and never mutate the
/// receiver.
pub trait Matrix: Clone + fmt::Debug + fmt::Display + Sized {
    /// Entry type (`f64` for concrete matrices, a solver term for symbolic ones)
    type Entry: Clone + fmt::Debug;

    /// Short name used in diagnostics
    fn representation() -> &'static str;

    fn rows(&self) -> usize;

    fn columns(&self) -> usize;

    fn shape(&self) -> Shape {
        Shape::new(self.rows(), self.columns())
    }

    fn get(&self, row: usize, column: usize) -> Result<Self::Entry, MatrixError>;

    /// Copy of this matrix with one entry replaced
    fn except_at(&self, row: usize, column: usize, value: Self::Entry)
        -> Result<Self, MatrixError>;

    fn drop_row(&self, row: usize) -> Result<Self, MatrixError>;

    fn drop_column(&self, column: usize) -> Result<Self, MatrixError>;

    fn transpose(&self) -> Self;

    /// Matrix product `self * other`
    fn multiply(&self, other: &Self) -> Result<Self, MatrixError>;

    /// Product with a scalar entry
    fn scale(&self, scalar: &Self::Entry) -> Self;

    fn add(&self, other: &Self) -> Result<Self, MatrixError>;

    fn negate(&self) -> Self;

    fn subtract(&self, other: &Self) -> Result<Self, MatrixError> {
        self.add(&other.negate())
    }

    /// Identity matrix of the same size; fails if the matrix is not square
    fn identity_like(&self) -> Result<Self, MatrixError>;

    fn zeros_like(&self) -> Self;

    /// Row-major reshape; the entry count must not change
    fn resize(&self, rows: usize, columns: usize) -> Result<Self, MatrixError>;

    /// Repeated multiplication; the zeroth power is the identity
    fn pow(&self, exponent: u32) -> Result<Self, MatrixError> {
        if !self.shape().is_square() {
            return Err(MatrixError::NotSquare {
                operation: "pow",
                shape: self.shape(),
            });
        }
        if exponent == 0 {
            return self.identity_like();
        }
        let mut result = self.clone();
        for _ in 1..exponent {
            result = result.multiply(self)?;
        }
        Ok(result)
    }

    fn invert(&self) -> Result<Self, MatrixError> {
        Err(MatrixError::Unsupported {
            operation: "invert",
            representation: Self::representation(),
        })
    }

    /// Whether `op` can be evaluated over this representation at all
    fn supports(_op: &Operation) -> bool {
        true
    }

    /// Convert a literal scalar into an entry
    fn lift(value: f64) -> Result<Self::Entry, MatrixError>;

    fn identity(size: usize) -> Result<Self, MatrixError>;

    fn zeros(rows: usize, columns: usize) -> Result<Self, MatrixError>;

    /// Convert a concrete literal into this representation
    fn from_concrete(matrix: &ConcreteMatrix) -> Result<Self, MatrixError>;

    /// Materialize an unresolved constant position
    fn slot(id: usize, _shape: Shape) -> Result<Self, MatrixError> {
        Err(MatrixError::UnresolvedSlot(id))
    }

    /// Resolve a class-derived constant for this representation
    fn from_selector(selector: &ConstantSelector) -> Result<Self, MatrixError> {
        match selector {
            ConstantSelector::Identity(size) => Self::identity(*size),
            ConstantSelector::Zeros(shape) => Self::zeros(shape.rows, shape.columns),
            ConstantSelector::Literal(matrix) => Self::from_concrete(matrix),
            ConstantSelector::Slot { id, shape } => Self::slot(*id, *shape),
        }
    }
}
