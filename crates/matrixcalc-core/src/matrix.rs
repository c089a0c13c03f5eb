use crate::error::{MatrixError, MatrixResult};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense two-dimensional matrix of `f64` values — the single concrete type
/// every operation in MatrixCalc consumes and produces.
///
/// Stores data in a flat contiguous `Vec<f64>` with row-major (C-order)
/// layout. Values are immutable once constructed; every operation returns a
/// new matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl Matrix {
    /// Create a matrix from raw row-major data and dimensions.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> MatrixResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(MatrixError::input(format!(
                "matrix dimensions must be positive, got {}x{}",
                rows, cols
            )));
        }
        if data.len() != rows * cols {
            return Err(MatrixError::input(format!(
                "expected {} values for a {}x{} matrix, got {}",
                rows * cols,
                rows,
                cols,
                data.len()
            )));
        }
        Ok(Matrix { data, rows, cols })
    }

    /// Build a matrix from nested rows, coercing every element to `f64`.
    ///
    /// This is the single conversion step at the core's boundary: whatever a
    /// collaborator holds (integer rows, stored records) is normalized to
    /// double precision here, never inside an operation. Ragged rows are
    /// rejected.
    pub fn from_rows<T: Into<f64> + Copy>(rows: &[Vec<T>]) -> MatrixResult<Self> {
        if rows.is_empty() {
            return Err(MatrixError::input("matrix must have at least one row"));
        }
        let cols = rows[0].len();
        for row in rows {
            if row.len() != cols {
                return Err(MatrixError::input(
                    "all rows must have the same number of columns",
                ));
            }
        }
        let data: Vec<f64> = rows
            .iter()
            .flat_map(|r| r.iter().map(|&v| v.into()))
            .collect();
        Matrix::new(data, rows.len(), cols)
    }

    /// Matrix filled with zeros.
    pub fn zeros(rows: usize, cols: usize) -> MatrixResult<Self> {
        Matrix::new(vec![0.0; rows * cols], rows, cols)
    }

    /// Identity matrix of size n×n.
    pub fn identity(n: usize) -> MatrixResult<Self> {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Matrix::new(data, n, n)
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Dimensions as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Flat row-major data.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Single element at `(i, j)`.
    pub fn get(&self, i: usize, j: usize) -> MatrixResult<f64> {
        if i >= self.rows || j >= self.cols {
            return Err(MatrixError::input(format!(
                "index ({}, {}) out of bounds for {}x{} matrix",
                i, j, self.rows, self.cols
            )));
        }
        Ok(self.data[i * self.cols + j])
    }

    /// Row `i` as a vector of values.
    pub fn row(&self, i: usize) -> MatrixResult<Vec<f64>> {
        if i >= self.rows {
            return Err(MatrixError::input(format!(
                "row {} out of bounds for {}x{} matrix",
                i, self.rows, self.cols
            )));
        }
        Ok(self.data[i * self.cols..(i + 1) * self.cols].to_vec())
    }

    /// Column `j` as a vector of values.
    pub fn col(&self, j: usize) -> MatrixResult<Vec<f64>> {
        if j >= self.cols {
            return Err(MatrixError::input(format!(
                "column {} out of bounds for {}x{} matrix",
                j, self.rows, self.cols
            )));
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

    /// Rows as nested vectors, the record shape collaborators persist.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows).map(|i| self.data[i * self.cols..(i + 1) * self.cols].to_vec()).collect()
    }
}

// ─── Display ────────────────────────────────────────────────────────────────

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "matrix([")?;
        for i in 0..self.rows.min(8) {
            write!(f, "  [")?;
            for j in 0..self.cols.min(8) {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:.4}", self.data[i * self.cols + j])?;
            }
            if self.cols > 8 {
                write!(f, ", ...")?;
            }
            writeln!(f, "],")?;
        }
        if self.rows > 8 {
            writeln!(f, "  ...")?;
        }
        write!(f, "], shape=({}, {}))", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation() {
        let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 2).unwrap(), 6.0);
        assert!(!m.is_square());

        let z = Matrix::zeros(3, 3).unwrap();
        assert!(z.is_square());
        assert!(z.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_length_mismatch_is_input_error() {
        let err = Matrix::new(vec![1.0, 2.0, 3.0], 2, 2).unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn test_zero_dims_rejected() {
        assert!(Matrix::new(vec![], 0, 3).is_err());
        assert!(Matrix::zeros(2, 0).is_err());
    }

    #[test]
    fn test_from_rows_coerces_integers() {
        let m = Matrix::from_rows(&[vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(m.data(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(err.is_input());
    }

    #[test]
    fn test_identity() {
        let i = Matrix::identity(3).unwrap();
        assert_eq!(i.get(0, 0).unwrap(), 1.0);
        assert_eq!(i.get(0, 1).unwrap(), 0.0);
        assert_eq!(i.data().iter().sum::<f64>(), 3.0);
    }

    #[test]
    fn test_row_col_access() {
        let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(m.row(1).unwrap(), vec![4.0, 5.0, 6.0]);
        assert_eq!(m.col(2).unwrap(), vec![3.0, 6.0]);
        assert!(m.row(2).is_err());
    }

    #[test]
    fn test_serde_record_shape() {
        let m = Matrix::new(vec![1.0, 2.5, 3.0, 4.0], 2, 2).unwrap();
        let json = serde_json::to_string(&m).unwrap();
        let back: Matrix = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }
}
