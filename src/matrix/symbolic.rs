//! Term-valued matrices for SMT-based constant recovery
//!
//! Entries are z3 real-arithmetic terms. Operations build terms instead of
//! computing numbers, so evaluating a program over symbolic matrices yields,
//! per output entry, a term over the free constant symbols of the program.

use crate::ir::Operation;
use crate::matrix::{ConcreteMatrix, Matrix, MatrixError, Shape};
use std::fmt;
use z3::ast::{Ast, Bool, Real};

/// Name of the free symbol for one entry of a constant slot
pub fn slot_symbol(id: usize, row: usize, column: usize) -> String {
    format!("c{}_{}_{}", id, row, column)
}

/// Exact rational term for a finite `f64`.
///
/// `Display` for `f64` prints the shortest decimal that round-trips and never
/// uses exponent notation, so it splits cleanly into numerator/denominator.
pub fn real_from_f64(value: f64) -> Result<Real, MatrixError> {
    if !value.is_finite() {
        return Err(MatrixError::Unrepresentable(value));
    }
    let text = format!("{}", value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let digits = format!("{}{}", int_part, frac_part);
    let numerator = digits.trim_start_matches('0');
    let numerator = if numerator.is_empty() { "0" } else { numerator };
    let denominator = format!("1{}", "0".repeat(frac_part.len()));

    let magnitude =
        Real::from_real_str(numerator, &denominator).ok_or(MatrixError::Unrepresentable(value))?;
    if value.is_sign_negative() && value != 0.0 {
        Ok(magnitude.unary_minus())
    } else {
        Ok(magnitude)
    }
}

/// Matrix whose entries are solver terms
#[derive(Clone, Debug)]
pub struct SymbolicMatrix {
    rows: usize,
    columns: usize,
    data: Vec<Real>,
}

impl SymbolicMatrix {
    fn from_data(rows: usize, columns: usize, data: Vec<Real>) -> Self {
        debug_assert_eq!(data.len(), rows * columns);
        Self {
            rows,
            columns,
            data,
        }
    }

    fn filled(shape: Shape, value: impl Fn(usize, usize) -> Real) -> Result<Self, MatrixError> {
        if shape.rows == 0 || shape.columns == 0 {
            return Err(MatrixError::EmptyDimension(shape));
        }
        let mut data = Vec::with_capacity(shape.entries());
        for i in 0..shape.rows {
            for j in 0..shape.columns {
                data.push(value(i, j));
            }
        }
        Ok(Self::from_data(shape.rows, shape.columns, data))
    }

    /// Matrix of fresh free symbols named `x{row}_{col}_{tag}`
    pub fn fresh(shape: Shape, tag: &str) -> Result<Self, MatrixError> {
        Self::filled(shape, |i, j| Real::new_const(format!("x{}_{}_{}", i, j, tag)))
    }

    /// Entries in row-major order
    pub fn entries(&self) -> &[Real] {
        &self.data
    }

    #[inline]
    fn at(&self, row: usize, column: usize) -> &Real {
        &self.data[row * self.columns + column]
    }

    fn check_index(&self, row: usize, column: usize) -> Result<(), MatrixError> {
        if row >= self.rows {
            return Err(MatrixError::IndexOutOfBounds {
                axis: "row",
                index: row,
                shape: self.shape(),
            });
        }
        if column >= self.columns {
            return Err(MatrixError::IndexOutOfBounds {
                axis: "column",
                index: column,
                shape: self.shape(),
            });
        }
        Ok(())
    }

    /// Per-entry equality obligations between two equally-shaped matrices
    pub fn equate(&self, other: &Self) -> Result<Vec<Bool>, MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::DimensionMismatch {
                operation: "equate",
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.eq(b))
            .collect())
    }
}

impl Matrix for SymbolicMatrix {
    type Entry = Real;

    fn representation() -> &'static str {
        "symbolic"
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn get(&self, row: usize, column: usize) -> Result<Real, MatrixError> {
        self.check_index(row, column)?;
        Ok(self.at(row, column).clone())
    }

    fn except_at(&self, row: usize, column: usize, value: Real) -> Result<Self, MatrixError> {
        self.check_index(row, column)?;
        let mut data = self.data.clone();
        data[row * self.columns + column] = value;
        Ok(Self::from_data(self.rows, self.columns, data))
    }

    fn drop_row(&self, row: usize) -> Result<Self, MatrixError> {
        if row >= self.rows {
            return Err(MatrixError::IndexOutOfBounds {
                axis: "row",
                index: row,
                shape: self.shape(),
            });
        }
        if self.rows == 1 {
            return Err(MatrixError::EmptyDimension(Shape::new(0, self.columns)));
        }
        let data = self
            .data
            .chunks(self.columns)
            .enumerate()
            .filter(|(i, _)| *i != row)
            .flat_map(|(_, r)| r.iter().cloned())
            .collect();
        Ok(Self::from_data(self.rows - 1, self.columns, data))
    }

    fn drop_column(&self, column: usize) -> Result<Self, MatrixError> {
        if column >= self.columns {
            return Err(MatrixError::IndexOutOfBounds {
                axis: "column",
                index: column,
                shape: self.shape(),
            });
        }
        if self.columns == 1 {
            return Err(MatrixError::EmptyDimension(Shape::new(self.rows, 0)));
        }
        let data = self
            .data
            .iter()
            .enumerate()
            .filter(|(k, _)| k % self.columns != column)
            .map(|(_, x)| x.clone())
            .collect();
        Ok(Self::from_data(self.rows, self.columns - 1, data))
    }

    fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.columns {
            for i in 0..self.rows {
                data.push(self.at(i, j).clone());
            }
        }
        Self::from_data(self.columns, self.rows, data)
    }

    fn multiply(&self, other: &Self) -> Result<Self, MatrixError> {
        if self.columns != other.rows {
            return Err(MatrixError::DimensionMismatch {
                operation: "multiply",
                left: self.shape(),
                right: other.shape(),
            });
        }
        let mut data = Vec::with_capacity(self.rows * other.columns);
        for i in 0..self.rows {
            for j in 0..other.columns {
                let mut sum = self.at(i, 0).clone() * other.at(0, j).clone();
                for k in 1..self.columns {
                    sum = sum + self.at(i, k).clone() * other.at(k, j).clone();
                }
                data.push(sum);
            }
        }
        Ok(Self::from_data(self.rows, other.columns, data))
    }

    fn scale(&self, scalar: &Real) -> Self {
        let data = self
            .data
            .iter()
            .map(|x| x.clone() * scalar.clone())
            .collect();
        Self::from_data(self.rows, self.columns, data)
    }

    fn add(&self, other: &Self) -> Result<Self, MatrixError> {
        if self.shape() != other.shape() {
            return Err(MatrixError::DimensionMismatch {
                operation: "add",
                left: self.shape(),
                right: other.shape(),
            });
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a.clone() + b.clone())
            .collect();
        Ok(Self::from_data(self.rows, self.columns, data))
    }

    fn negate(&self) -> Self {
        let data = self.data.iter().map(|x| x.unary_minus()).collect();
        Self::from_data(self.rows, self.columns, data)
    }

    fn identity_like(&self) -> Result<Self, MatrixError> {
        if !self.shape().is_square() {
            return Err(MatrixError::NotSquare {
                operation: "identity_like",
                shape: self.shape(),
            });
        }
        Self::identity(self.rows)
    }

    fn zeros_like(&self) -> Self {
        let data = (0..self.data.len()).map(|_| Real::from_real(0, 1)).collect();
        Self::from_data(self.rows, self.columns, data)
    }

    fn resize(&self, rows: usize, columns: usize) -> Result<Self, MatrixError> {
        let to = Shape::new(rows, columns);
        if to.entries() != self.data.len() || rows == 0 || columns == 0 {
            return Err(MatrixError::EntryCountChanged {
                from: self.shape(),
                to,
            });
        }
        Ok(Self::from_data(rows, columns, self.data.clone()))
    }

    fn supports(op: &Operation) -> bool {
        !matches!(op, Operation::Invert)
    }

    fn lift(value: f64) -> Result<Real, MatrixError> {
        real_from_f64(value)
    }

    fn identity(size: usize) -> Result<Self, MatrixError> {
        Self::filled(Shape::new(size, size), |i, j| {
            Real::from_real(if i == j { 1 } else { 0 }, 1)
        })
    }

    fn zeros(rows: usize, columns: usize) -> Result<Self, MatrixError> {
        Self::filled(Shape::new(rows, columns), |_, _| Real::from_real(0, 1))
    }

    fn from_concrete(matrix: &ConcreteMatrix) -> Result<Self, MatrixError> {
        let data = matrix
            .entries()
            .iter()
            .map(|&x| real_from_f64(x))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_data(matrix.rows(), matrix.columns(), data))
    }

    fn slot(id: usize, shape: Shape) -> Result<Self, MatrixError> {
        Self::filled(shape, |i, j| Real::new_const(slot_symbol(id, i, j)))
    }
}

/// Term equality: hash-consed terms print identically iff they are equal
impl PartialEq for SymbolicMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.columns == other.columns
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| a.to_string() == b.to_string())
    }
}

impl fmt::Display for SymbolicMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for i in 0..self.rows {
            if i > 0 {
                write!(f, ", \n")?;
            }
            for j in 0..self.columns {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.at(i, j))?;
            }
        }
        write!(f, "]")
    }
}
