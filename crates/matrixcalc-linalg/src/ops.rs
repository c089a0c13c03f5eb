use matrixcalc_core::{Matrix, MatrixError, MatrixResult};

/// Element-wise sum A + B.
///
/// Shapes must match exactly; there is no broadcasting.
pub fn add(a: &Matrix, b: &Matrix) -> MatrixResult<Matrix> {
    if a.shape() != b.shape() {
        return Err(MatrixError::input(format!(
            "incompatible shapes for addition: A{:?} vs B{:?}",
            a.shape(),
            b.shape()
        )));
    }
    let data: Vec<f64> = a
        .data()
        .iter()
        .zip(b.data().iter())
        .map(|(&x, &y)| x + y)
        .collect();
    Matrix::new(data, a.rows(), a.cols())
}

/// Element-wise difference A - B.
pub fn subtract(a: &Matrix, b: &Matrix) -> MatrixResult<Matrix> {
    if a.shape() != b.shape() {
        return Err(MatrixError::input(format!(
            "incompatible shapes for subtraction: A{:?} vs B{:?}",
            a.shape(),
            b.shape()
        )));
    }
    let data: Vec<f64> = a
        .data()
        .iter()
        .zip(b.data().iter())
        .map(|(&x, &y)| x - y)
        .collect();
    Matrix::new(data, a.rows(), a.cols())
}

/// Matrix product A @ B.
pub fn dot(a: &Matrix, b: &Matrix) -> MatrixResult<Matrix> {
    if a.cols() != b.rows() {
        return Err(MatrixError::input(format!(
            "incompatible shapes for multiplication: A{:?} x B{:?}; requires A.cols == B.rows",
            a.shape(),
            b.shape()
        )));
    }
    let (m, k) = a.shape();
    let n = b.cols();
    let a_data = a.data();
    let b_data = b.data();

    let mut data = vec![0.0; m * n];
    for i in 0..m {
        for j in 0..n {
            let mut sum = 0.0;
            for p in 0..k {
                sum += a_data[i * k + p] * b_data[p * n + j];
            }
            data[i * n + j] = sum;
        }
    }
    Matrix::new(data, m, n)
}

/// Row/column swap Aᵀ.
///
/// The `Matrix` type already guarantees a rectangular 2-D operand, so this
/// cannot fail in practice; it keeps the uniform `Result` signature of the
/// operation family.
pub fn transpose(a: &Matrix) -> MatrixResult<Matrix> {
    let (rows, cols) = a.shape();
    let src = a.data();
    let mut data = vec![0.0; rows * cols];
    for i in 0..rows {
        for j in 0..cols {
            data[j * rows + i] = src[i * cols + j];
        }
    }
    Matrix::new(data, cols, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mat(data: &[f64], rows: usize, cols: usize) -> Matrix {
        Matrix::new(data.to_vec(), rows, cols).unwrap()
    }

    #[test]
    fn test_add() {
        let a = mat(&[1.0, 1.0, 1.0, 1.0], 2, 2);
        let c = add(&a, &a).unwrap();
        assert_eq!(c.data(), &[2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_add_shape_mismatch() {
        let a = mat(&[1.0; 4], 2, 2);
        let b = mat(&[1.0; 9], 3, 3);
        let err = add(&a, &b).unwrap_err();
        assert!(err.is_input());
        assert!(err.message().contains("(2, 2)"));
        assert!(err.message().contains("(3, 3)"));
    }

    #[test]
    fn test_subtract() {
        let a = mat(&[5.0, 6.0, 7.0, 8.0], 2, 2);
        let b = mat(&[1.0, 2.0, 3.0, 4.0], 2, 2);
        let c = subtract(&a, &b).unwrap();
        assert_eq!(c.data(), &[4.0, 4.0, 4.0, 4.0]);
        assert!(subtract(&a, &mat(&[1.0, 2.0], 1, 2)).unwrap_err().is_input());
    }

    #[test]
    fn test_dot() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let b = mat(&[7.0, 8.0, 9.0, 10.0, 11.0, 12.0], 3, 2);
        let c = dot(&a, &b).unwrap();
        assert_eq!(c.shape(), (2, 2));
        assert_eq!(c.data(), &[58.0, 64.0, 139.0, 154.0]);
    }

    #[test]
    fn test_dot_dimension_mismatch() {
        let a = mat(&[1.0; 6], 2, 3);
        let b = mat(&[1.0; 4], 2, 2);
        let err = dot(&a, &b).unwrap_err();
        assert!(err.is_input());
        assert!(err.message().contains("A.cols == B.rows"));
    }

    #[test]
    fn test_dot_identity_is_neutral() {
        let x = mat(&[1.5, -2.0, 0.25, 4.0, 7.0, -0.5], 3, 2);
        let i = Matrix::identity(3).unwrap();
        assert_eq!(dot(&i, &x).unwrap(), x);
    }

    #[test]
    fn test_transpose() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let t = transpose(&a).unwrap();
        assert_eq!(t.shape(), (3, 2));
        assert_eq!(t.data(), &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    }

    #[test]
    fn test_transpose_round_trip() {
        let a = mat(&[0.5, -1.0, 2.0, 3.5, 4.0, -6.0, 7.0, 8.0], 2, 4);
        assert_eq!(transpose(&transpose(&a).unwrap()).unwrap(), a);
    }
}
