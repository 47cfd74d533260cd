//! Real-valued matrices backed by `f64`

use crate::matrix::{Matrix, MatrixError, Shape};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Immutable row-major matrix of `f64` entries.
///
/// Equality is exact and entry-wise, so `0.0` and `-0.0` compare equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct ConcreteMatrix {
    rows: usize,
    columns: usize,
    data: Vec<f64>,
}

impl ConcreteMatrix {
    /// Zero matrix of the given dimensions
    pub fn new(rows: usize, columns: usize) -> Result<Self, MatrixError> {
        if rows == 0 || columns == 0 {
            return Err(MatrixError::EmptyDimension(Shape::new(rows, columns)));
        }
        Ok(Self {
            rows,
            columns,
            data: vec![0.0; rows * columns],
        })
    }

    /// Build a matrix from its rows, copying the entries
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, MatrixError> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || columns == 0 {
            return Err(MatrixError::EmptyDimension(Shape::new(rows.len(), columns)));
        }
        let mut data = Vec::with_capacity(rows.len() * columns);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns {
                return Err(MatrixError::Ragged {
                    row: i,
                    expected: columns,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            columns,
            data,
        })
    }

    fn from_data(rows: usize, columns: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * columns);
        Self {
            rows,
            columns,
            data,
        }
    }

    /// Entries in row-major order
    pub fn entries(&self) -> &[f64] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data
            .chunks(self.columns)
            .map(|row| row.to_vec())
            .collect()
    }

    #[inline]
    fn at(&self, row: usize, column: usize) -> f64 {
        self.data[row * self.columns + column]
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

    fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_data(self.rows, self.columns, self.data.iter().map(|&x| f(x)).collect())
    }
}

impl Matrix for ConcreteMatrix {
    type Entry = f64;

    fn representation() -> &'static str {
        "concrete"
    }

    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn get(&self, row: usize, column: usize) -> Result<f64, MatrixError> {
        self.check_index(row, column)?;
        Ok(self.at(row, column))
    }

    fn except_at(&self, row: usize, column: usize, value: f64) -> Result<Self, MatrixError> {
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
            .flat_map(|(_, r)| r.iter().copied())
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
            .map(|(_, &x)| x)
            .collect();
        Ok(Self::from_data(self.rows, self.columns - 1, data))
    }

    fn transpose(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.columns {
            for i in 0..self.rows {
                data.push(self.at(i, j));
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
                let mut sum = 0.0;
                for k in 0..self.columns {
                    sum += self.at(i, k) * other.at(k, j);
                }
                data.push(sum);
            }
        }
        Ok(Self::from_data(self.rows, other.columns, data))
    }

    fn scale(&self, scalar: &f64) -> Self {
        self.map(|x| x * scalar)
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
            .map(|(a, b)| a + b)
            .collect();
        Ok(Self::from_data(self.rows, self.columns, data))
    }

    fn negate(&self) -> Self {
        self.map(|x| -x)
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
        Self::from_data(self.rows, self.columns, vec![0.0; self.data.len()])
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

    /// Gauss-Jordan elimination. Rows are only swapped when the pivot is zero,
    /// so well-conditioned inputs keep exact results.
    fn invert(&self) -> Result<Self, MatrixError> {
        if !self.shape().is_square() {
            return Err(MatrixError::NotSquare {
                operation: "invert",
                shape: self.shape(),
            });
        }
        let n = self.rows;
        let width = 2 * n;
        let mut aug = vec![0.0; n * width];
        for i in 0..n {
            for j in 0..n {
                aug[i * width + j] = self.at(i, j);
            }
            aug[i * width + n + i] = 1.0;
        }

        for i in 0..n {
            if aug[i * width + i] == 0.0 {
                let swap = (i + 1..n)
                    .find(|&r| aug[r * width + i] != 0.0)
                    .ok_or(MatrixError::Singular)?;
                for k in 0..width {
                    aug.swap(i * width + k, swap * width + k);
                }
            }
            let pivot = aug[i * width + i];
            for k in 0..width {
                aug[i * width + k] /= pivot;
            }
            for r in 0..n {
                if r == i {
                    continue;
                }
                let factor = aug[r * width + i];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..width {
                    aug[r * width + k] -= factor * aug[i * width + k];
                }
            }
        }

        let data = aug
            .chunks(width)
            .flat_map(|row| row[n..].iter().copied())
            .collect();
        Ok(Self::from_data(n, n, data))
    }

    fn lift(value: f64) -> Result<f64, MatrixError> {
        Ok(value)
    }

    fn identity(size: usize) -> Result<Self, MatrixError> {
        let mut m = Self::new(size, size)?;
        for i in 0..size {
            m.data[i * size + i] = 1.0;
        }
        Ok(m)
    }

    fn zeros(rows: usize, columns: usize) -> Result<Self, MatrixError> {
        Self::new(rows, columns)
    }

    fn from_concrete(matrix: &ConcreteMatrix) -> Result<Self, MatrixError> {
        Ok(matrix.clone())
    }
}

impl PartialEq for ConcreteMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.columns == other.columns
            && self.data.iter().zip(&other.data).all(|(a, b)| a == b)
    }
}

impl TryFrom<Vec<Vec<f64>>> for ConcreteMatrix {
    type Error = MatrixError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<ConcreteMatrix> for Vec<Vec<f64>> {
    fn from(matrix: ConcreteMatrix) -> Self {
        matrix.to_rows()
    }
}

impl fmt::Display for ConcreteMatrix {
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
                write!(f, "{:?}", self.at(i, j))?;
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(rows: Vec<Vec<f64>>) -> ConcreteMatrix {
        ConcreteMatrix::from_rows(rows).unwrap()
    }

    fn two_by_three() -> ConcreteMatrix {
        m(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
    }

    #[test]
    fn test_except_at_and_get() {
        let mut matrix = ConcreteMatrix::new(2, 2).unwrap();
        matrix = matrix.except_at(0, 0, 1.0).unwrap();
        matrix = matrix.except_at(0, 1, 2.0).unwrap();
        matrix = matrix.except_at(1, 0, 3.0).unwrap();
        matrix = matrix.except_at(1, 1, 4.0).unwrap();
        assert_eq!(matrix.get(0, 0).unwrap(), 1.0);
        assert_eq!(matrix.get(0, 1).unwrap(), 2.0);
        assert_eq!(matrix.get(1, 0).unwrap(), 3.0);
        assert_eq!(matrix.get(1, 1).unwrap(), 4.0);
    }

    #[test]
    fn test_zero_and_identity_constructors() {
        assert_eq!(
            ConcreteMatrix::new(2, 3).unwrap(),
            ConcreteMatrix::zeros(2, 3).unwrap()
        );
        let manual = ConcreteMatrix::new(2, 2)
            .unwrap()
            .except_at(0, 0, 1.0)
            .unwrap()
            .except_at(1, 1, 1.0)
            .unwrap();
        assert_eq!(manual, ConcreteMatrix::identity(2).unwrap());
    }

    #[test]
    fn test_display() {
        let matrix = m(vec![vec![1.0, 2.0, 0.0], vec![3.0, 4.0, 0.0]]);
        assert_eq!(matrix.to_string(), "[1.0, 2.0, 0.0, \n3.0, 4.0, 0.0]");
    }

    #[test]
    fn test_drop_row_and_column() {
        let matrix = m(vec![vec![1.0, 2.0, 0.0], vec![3.0, 4.0, 0.0]]);
        let top = matrix.drop_row(1).unwrap();
        assert_eq!(top, m(vec![vec![1.0, 2.0, 0.0]]));

        let bottom = matrix.drop_row(0).unwrap();
        assert_eq!(bottom, m(vec![vec![3.0, 4.0, 0.0]]));

        let narrowed = bottom.drop_column(1).unwrap();
        assert_eq!(narrowed, m(vec![vec![3.0, 0.0]]));
    }

    #[test]
    fn test_preconditions() {
        let matrix = ConcreteMatrix::new(2, 3).unwrap();
        assert!(matrix.get(2, 0).is_err());
        assert!(matrix.get(0, 3).is_err());
        assert!(matrix.except_at(2, 0, 0.0).is_err());
        assert!(matrix.except_at(1, 3, 0.0).is_err());
        assert!(matrix.drop_row(2).is_err());
        assert!(matrix.drop_column(3).is_err());
        assert!(ConcreteMatrix::new(0, 3).is_err());
        assert!(ConcreteMatrix::new(3, 0).is_err());
        assert!(ConcreteMatrix::from_rows(vec![]).is_err());
        assert!(ConcreteMatrix::from_rows(vec![vec![]]).is_err());
        assert!(matches!(
            ConcreteMatrix::from_rows(vec![vec![1.0, 2.0], vec![1.0]]),
            Err(MatrixError::Ragged { row: 1, .. })
        ));
        assert!(ConcreteMatrix::identity(0).is_err());
        assert!(matrix.add(&ConcreteMatrix::new(3, 3).unwrap()).is_err());
        assert!(matrix.subtract(&ConcreteMatrix::new(3, 3).unwrap()).is_err());
        assert!(matrix.multiply(&ConcreteMatrix::new(2, 3).unwrap()).is_err());
        assert!(matrix.pow(2).is_err());
        assert!(matrix.resize(3, 4).is_err());
        assert!(ConcreteMatrix::zeros(2, 2).unwrap().invert().is_err());
        assert!(ConcreteMatrix::zeros(2, 3).unwrap().invert().is_err());
        assert!(matches!(
            matrix.identity_like(),
            Err(MatrixError::NotSquare { .. })
        ));
    }

    #[test]
    fn test_transpose() {
        let t = two_by_three().transpose();
        assert_eq!(t, m(vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]));
    }

    #[test]
    fn test_multiply() {
        let other = m(vec![vec![7.0, 8.0], vec![9.0, 10.0], vec![11.0, 12.0]]);
        let product = two_by_three().multiply(&other).unwrap();
        assert_eq!(product, m(vec![vec![58.0, 64.0], vec![139.0, 154.0]]));
    }

    #[test]
    fn test_add() {
        let other = m(vec![vec![7.0, 8.0, 9.0], vec![10.0, 11.0, 12.0]]);
        let sum = two_by_three().add(&other).unwrap();
        assert_eq!(sum, m(vec![vec![8.0, 10.0, 12.0], vec![14.0, 16.0, 18.0]]));
    }

    #[test]
    fn test_arithmetic_identities() {
        let matrix = m(vec![
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 9.0],
        ]);
        let zero = ConcreteMatrix::zeros(3, 3).unwrap();
        let identity = ConcreteMatrix::identity(3).unwrap();
        assert_eq!(matrix.add(&zero).unwrap(), matrix);
        assert_eq!(matrix.multiply(&identity).unwrap(), matrix);
        assert_eq!(matrix.multiply(&zero).unwrap(), zero);
    }

    #[test]
    fn test_negate_subtract() {
        let matrix = two_by_three();
        let negated = matrix.negate();
        assert_eq!(
            negated,
            m(vec![vec![-1.0, -2.0, -3.0], vec![-4.0, -5.0, -6.0]])
        );
        let zeros = ConcreteMatrix::zeros(2, 3).unwrap();
        assert_eq!(matrix.add(&negated).unwrap(), zeros);
        // -0.0 compares equal to 0.0
        assert_eq!(zeros.negate(), zeros);
        assert_eq!(zeros.subtract(&matrix).unwrap(), matrix.negate());
    }

    #[test]
    fn test_invert() {
        let matrix = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let inverted = matrix.invert().unwrap();
        assert_eq!(inverted, m(vec![vec![-2.0, 1.0], vec![1.5, -0.5]]));
        assert_eq!(
            matrix.multiply(&inverted).unwrap(),
            ConcreteMatrix::identity(2).unwrap()
        );

        let permutation = m(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(permutation.invert().unwrap(), permutation);
    }

    #[test]
    fn test_resize() {
        let matrix = m(vec![
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
            vec![7.0, 8.0],
        ]);
        let resized = matrix.resize(1, 8).unwrap();
        assert_eq!(resized.shape(), Shape::new(1, 8));
        assert_eq!(resized.entries(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_scale() {
        let matrix = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(matrix.scale(&2.0), m(vec![vec![2.0, 4.0], vec![6.0, 8.0]]));
    }

    #[test]
    fn test_equality() {
        let matrix = ConcreteMatrix::new(2, 2).unwrap();
        assert_eq!(matrix, matrix.clone());
        assert_ne!(matrix, ConcreteMatrix::new(2, 3).unwrap());
        assert_ne!(matrix, ConcreteMatrix::new(3, 2).unwrap());
        assert_ne!(matrix, matrix.except_at(0, 0, 1.0).unwrap());
    }

    #[test]
    fn test_identity_like_zeros_like() {
        let matrix = m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(
            matrix.identity_like().unwrap(),
            ConcreteMatrix::identity(2).unwrap()
        );
        assert_eq!(matrix.zeros_like(), ConcreteMatrix::zeros(2, 2).unwrap());
    }

    #[test]
    fn test_serde_rows() {
        let matrix: ConcreteMatrix = serde_json::from_str("[[1, 2], [3, 4]]").unwrap();
        assert_eq!(matrix, m(vec![vec![1.0, 2.0], vec![3.0, 4.0]]));
        assert_eq!(serde_json::to_string(&matrix).unwrap(), "[[1.0,2.0],[3.0,4.0]]");
        assert!(serde_json::from_str::<ConcreteMatrix>("[[1, 2], [3]]").is_err());
    }
}
