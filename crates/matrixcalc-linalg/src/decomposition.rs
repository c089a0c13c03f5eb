use matrixcalc_core::{Matrix, MatrixError, MatrixResult};
use serde::{Deserialize, Serialize};

use crate::svd::condition_number;

/// Practical conditioning cutoff for [`inverse`].
///
/// Deliberately far looser than the machine-epsilon-derived bound (~1e16 for
/// double precision), which flags too few real-world ill-conditioned
/// matrices. Tunable through [`inverse_with_limit`].
pub const DEFAULT_CONDITION_LIMIT: f64 = 1e12;

// Pivots below this are treated as zero during elimination.
const PIVOT_TOL: f64 = f64::EPSILON;

/// LU decomposition result: P·A = L·U.
///
/// `pivot[i]` is the original row index that ended up in position `i`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LuDecomposition {
    pub l: Matrix,
    pub u: Matrix,
    pub pivot: Vec<usize>,
}

/// QR decomposition result: A = Q·R, reduced form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrDecomposition {
    pub q: Matrix,
    pub r: Matrix,
}

/// LU decomposition with partial pivoting.
///
/// A singular input does not fail here: when a pivot column is exhausted the
/// elimination carries on with a zero pivot, leaving a zero on the diagonal
/// of `U`. Consumers decide what that means — [`determinant`] reports 0.0,
/// [`inverse`] refuses to divide by it.
pub fn lu(a: &Matrix) -> MatrixResult<LuDecomposition> {
    if !a.is_square() {
        return Err(MatrixError::input(format!(
            "matrix must be square for LU decomposition (shape={:?})",
            a.shape()
        )));
    }
    let n = a.rows();

    let mut u_data = a.data().to_vec();
    let mut l_data = vec![0.0; n * n];
    let mut pivot: Vec<usize> = (0..n).collect();

    for k in 0..n {
        // Find pivot
        let mut max_val = u_data[k * n + k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let v = u_data[i * n + k].abs();
            if v > max_val {
                max_val = v;
                max_row = i;
            }
        }

        if max_row != k {
            pivot.swap(k, max_row);
            for j in 0..n {
                u_data.swap(k * n + j, max_row * n + j);
            }
            // Swap L rows for already computed columns
            for j in 0..k {
                l_data.swap(k * n + j, max_row * n + j);
            }
        }

        l_data[k * n + k] = 1.0;

        // Exhausted column: leave the zero pivot in place.
        if max_val < PIVOT_TOL {
            continue;
        }

        for i in (k + 1)..n {
            let factor = u_data[i * n + k] / u_data[k * n + k];
            l_data[i * n + k] = factor;
            for j in k..n {
                u_data[i * n + j] -= factor * u_data[k * n + j];
            }
        }
    }

    Ok(LuDecomposition {
        l: Matrix::new(l_data, n, n)?,
        u: Matrix::new(u_data, n, n)?,
        pivot,
    })
}

/// Determinant of a square matrix via LU decomposition.
///
/// Singular matrices yield 0.0, not an error.
pub fn determinant(a: &Matrix) -> MatrixResult<f64> {
    if !a.is_square() {
        return Err(MatrixError::input(format!(
            "matrix must be square to compute the determinant (shape={:?})",
            a.shape()
        )));
    }
    let decomp = lu(a)?;
    let n = a.rows();
    let u_data = decomp.u.data();

    let mut d = 1.0;
    for i in 0..n {
        d *= u_data[i * n + i];
    }

    // Count transpositions in the permutation: a cycle of length k
    // contributes k-1 swaps.
    let mut swaps = 0usize;
    let mut visited = vec![false; n];
    for i in 0..n {
        if !visited[i] {
            visited[i] = true;
            let mut j = decomp.pivot[i];
            let mut cycle_len = 1;
            while j != i {
                visited[j] = true;
                j = decomp.pivot[j];
                cycle_len += 1;
            }
            swaps += cycle_len - 1;
        }
    }

    if swaps % 2 == 1 {
        d = -d;
    }
    Ok(d)
}

/// Matrix inverse with the default conditioning cutoff.
///
/// See [`inverse_with_limit`] for the full contract.
pub fn inverse(a: &Matrix) -> MatrixResult<Matrix> {
    inverse_with_limit(a, DEFAULT_CONDITION_LIMIT)
}

/// Matrix inverse, refusing ill-conditioned input.
///
/// Before inverting, the condition number (σ_max/σ_min) is evaluated; if it
/// cannot be computed, is non-finite, or exceeds `condition_limit`, the
/// matrix is not safe to invert and a numeric error reports the condition
/// number to three significant digits. The inversion itself solves
/// L·U·x = P·e for each identity column.
pub fn inverse_with_limit(a: &Matrix, condition_limit: f64) -> MatrixResult<Matrix> {
    if !a.is_square() {
        return Err(MatrixError::input(format!(
            "matrix must be square to compute the inverse (shape={:?})",
            a.shape()
        )));
    }
    let n = a.rows();

    let cond = condition_number(a).map_err(|_| {
        MatrixError::numeric(
            "could not evaluate the matrix condition number; it may be singular or invalid",
        )
    })?;
    if !cond.is_finite() || cond > condition_limit {
        return Err(MatrixError::numeric(format!(
            "matrix is ill-conditioned or singular (condition={:.3e}); not safe to invert",
            cond
        )));
    }

    let decomp = lu(a)?;
    let l_data = decomp.l.data();
    let u_data = decomp.u.data();
    let mut result = vec![0.0; n * n];

    for col in 0..n {
        // Permuted identity column P·e_col
        let mut pb = vec![0.0; n];
        for i in 0..n {
            if decomp.pivot[i] == col {
                pb[i] = 1.0;
            }
        }

        // Forward substitution: L·y = pb
        let mut y = vec![0.0; n];
        for i in 0..n {
            let mut sum = 0.0;
            for j in 0..i {
                sum += l_data[i * n + j] * y[j];
            }
            y[i] = pb[i] - sum;
        }

        // Back substitution: U·x = y
        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let mut sum = 0.0;
            for j in (i + 1)..n {
                sum += u_data[i * n + j] * x[j];
            }
            let diag = u_data[i * n + i];
            if diag.abs() < PIVOT_TOL {
                return Err(MatrixError::numeric("matrix is singular and has no inverse"));
            }
            x[i] = (y[i] - sum) / diag;
        }

        for i in 0..n {
            result[i * n + col] = x[i];
        }
    }

    Matrix::new(result, n, n)
}

/// QR decomposition via Householder reflections, reduced form:
/// Q is m×k, R is k×n with k = min(m, n).
pub fn qr(a: &Matrix) -> MatrixResult<QrDecomposition> {
    let (m, n) = a.shape();
    let k = m.min(n);

    let mut r_data = a.data().to_vec();
    // Q accumulates the reflections, starting from identity
    let mut q_data = vec![0.0; m * m];
    for i in 0..m {
        q_data[i * m + i] = 1.0;
    }

    for j in 0..k {
        // Column j below the diagonal
        let mut x = vec![0.0; m - j];
        for i in j..m {
            x[i - j] = r_data[i * n + j];
        }

        let norm_x = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm_x < f64::EPSILON {
            continue;
        }

        let sign = if x[0] >= 0.0 { 1.0 } else { -1.0 };
        x[0] += sign * norm_x;

        let norm_v = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm_v < f64::EPSILON {
            continue;
        }
        for v in x.iter_mut() {
            *v /= norm_v;
        }

        // Apply H = I - 2·v·vᵀ to R (columns j..n)
        for col in j..n {
            let mut proj = 0.0;
            for i in j..m {
                proj += x[i - j] * r_data[i * n + col];
            }
            for i in j..m {
                r_data[i * n + col] -= 2.0 * x[i - j] * proj;
            }
        }

        // Apply H to Q from the right: Q = Q·H
        for row in 0..m {
            let mut proj = 0.0;
            for i in j..m {
                proj += q_data[row * m + i] * x[i - j];
            }
            for i in j..m {
                q_data[row * m + i] -= 2.0 * proj * x[i - j];
            }
        }
    }

    // Truncate Q to m×k and R to k×n
    let mut q_trunc = vec![0.0; m * k];
    for i in 0..m {
        for j in 0..k {
            q_trunc[i * k + j] = q_data[i * m + j];
        }
    }
    let mut r_trunc = vec![0.0; k * n];
    for i in 0..k {
        for j in 0..n {
            r_trunc[i * n + j] = r_data[i * n + j];
        }
    }

    Ok(QrDecomposition {
        q: Matrix::new(q_trunc, m, k)?,
        r: Matrix::new(r_trunc, k, n)?,
    })
}

/// Cholesky factorization A = L·Lᵀ for symmetric positive-definite matrices.
///
/// Only the lower triangle of A is read. A non-positive diagonal residual
/// means the matrix is not positive-definite.
pub fn cholesky(a: &Matrix) -> MatrixResult<Matrix> {
    if !a.is_square() {
        return Err(MatrixError::input(format!(
            "matrix must be square for Cholesky decomposition (shape={:?})",
            a.shape()
        )));
    }
    let n = a.rows();
    let a_data = a.data();
    let mut l_data = vec![0.0; n * n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l_data[i * n + k] * l_data[j * n + k];
            }

            if i == j {
                let val = a_data[i * n + i] - sum;
                if val <= 0.0 {
                    return Err(MatrixError::numeric(
                        "matrix is not positive-definite; Cholesky decomposition requires a \
                         symmetric positive-definite matrix",
                    ));
                }
                l_data[i * n + j] = val.sqrt();
            } else {
                l_data[i * n + j] = (a_data[i * n + j] - sum) / l_data[j * n + j];
            }
        }
    }

    Matrix::new(l_data, n, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::{dot, transpose};
    use approx::assert_relative_eq;

    fn mat(data: &[f64], rows: usize, cols: usize) -> Matrix {
        Matrix::new(data.to_vec(), rows, cols).unwrap()
    }

    #[test]
    fn test_lu_reconstruction() {
        let a = mat(&[2.0, 1.0, 1.0, 4.0, 3.0, 3.0, 8.0, 7.0, 9.0], 3, 3);
        let decomp = lu(&a).unwrap();
        let product = dot(&decomp.l, &decomp.u).unwrap();
        // L·U reproduces the pivoted rows of A
        for i in 0..3 {
            for j in 0..3 {
                let orig = a.get(decomp.pivot[i], j).unwrap();
                assert_relative_eq!(product.get(i, j).unwrap(), orig, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_lu_not_square() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        assert!(lu(&a).unwrap_err().is_input());
    }

    #[test]
    fn test_determinant() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0], 2, 2);
        assert_relative_eq!(determinant(&a).unwrap(), -2.0, epsilon = 1e-10);
    }

    #[test]
    fn test_determinant_identity() {
        for n in 1..=6 {
            let i = Matrix::identity(n).unwrap();
            assert_eq!(determinant(&i).unwrap(), 1.0);
        }
    }

    #[test]
    fn test_determinant_zero_row() {
        let a = mat(&[1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 4.0, 5.0, 6.0], 3, 3);
        assert_eq!(determinant(&a).unwrap(), 0.0);
    }

    #[test]
    fn test_determinant_not_square() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let err = determinant(&a).unwrap_err();
        assert!(err.is_input());
        assert!(err.message().contains("square"));
    }

    #[test]
    fn test_inverse_identity() {
        for n in [1, 2, 4, 7] {
            let i = Matrix::identity(n).unwrap();
            assert_eq!(inverse(&i).unwrap(), i);
        }
    }

    #[test]
    fn test_inverse_round_trip() {
        let a = mat(&[4.0, 7.0, 2.0, 6.0], 2, 2);
        let a_inv = inverse(&a).unwrap();
        let product = dot(&a, &a_inv).unwrap();
        let identity = Matrix::identity(2).unwrap();
        for (got, want) in product.data().iter().zip(identity.data()) {
            assert_relative_eq!(got, want, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_inverse_singular() {
        // Rows linearly dependent
        let a = mat(&[1.0, 2.0, 2.0, 4.0], 2, 2);
        let err = inverse(&a).unwrap_err();
        assert!(err.is_numeric());
    }

    #[test]
    fn test_inverse_not_square_is_input_error() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let err = inverse(&a).unwrap_err();
        assert!(err.is_input());
        assert!(err.message().contains("square"));
    }

    #[test]
    fn test_inverse_condition_limit_injectable() {
        // Perfectly well-conditioned, but an absurdly tight limit rejects it.
        let a = mat(&[3.0, 0.0, 0.0, 1.0], 2, 2);
        assert!(inverse(&a).is_ok());
        let err = inverse_with_limit(&a, 2.0).unwrap_err();
        assert!(err.is_numeric());
        assert!(err.message().contains("condition="));
    }

    #[test]
    fn test_qr_reconstruction_and_orthogonality() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 10.0], 3, 3);
        let decomp = qr(&a).unwrap();
        let product = dot(&decomp.q, &decomp.r).unwrap();
        for (got, want) in product.data().iter().zip(a.data()) {
            assert_relative_eq!(got, want, epsilon = 1e-10);
        }

        let qt = transpose(&decomp.q).unwrap();
        let qtq = dot(&qt, &decomp.q).unwrap();
        let identity = Matrix::identity(3).unwrap();
        for (got, want) in qtq.data().iter().zip(identity.data()) {
            assert_relative_eq!(got, want, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_qr_rectangular_reduced_shapes() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2);
        let decomp = qr(&a).unwrap();
        assert_eq!(decomp.q.shape(), (3, 2));
        assert_eq!(decomp.r.shape(), (2, 2));
        let product = dot(&decomp.q, &decomp.r).unwrap();
        for (got, want) in product.data().iter().zip(a.data()) {
            assert_relative_eq!(got, want, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_cholesky_reconstruction() {
        let a = mat(&[4.0, 2.0, 2.0, 3.0], 2, 2);
        let l = cholesky(&a).unwrap();
        let lt = transpose(&l).unwrap();
        let product = dot(&l, &lt).unwrap();
        for (got, want) in product.data().iter().zip(a.data()) {
            assert_relative_eq!(got, want, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        // Symmetric but indefinite: eigenvalues 3 and -1
        let a = mat(&[1.0, 2.0, 2.0, 1.0], 2, 2);
        let err = cholesky(&a).unwrap_err();
        assert!(err.is_numeric());
        assert!(err.message().contains("positive-definite"));
    }

    #[test]
    fn test_cholesky_not_square() {
        let a = mat(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        assert!(cholesky(&a).unwrap_err().is_input());
    }
}
