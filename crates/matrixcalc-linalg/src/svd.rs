use matrixcalc_core::{Matrix, MatrixError, MatrixResult};
use serde::{Deserialize, Serialize};

/// Maximum number of cyclic Jacobi sweeps before the SVD eigen-stage is
/// declared non-convergent.
pub const MAX_SVD_SWEEPS: usize = 100;

/// Full singular value decomposition: A = U·Σ·Vh.
///
/// `u` is m×m, `vh` is n×n, and `s` holds the min(m, n) singular values in
/// descending order, matching the full-matrices convention collaborators
/// persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvdDecomposition {
    pub u: Matrix,
    pub s: Vec<f64>,
    pub vh: Matrix,
}

/// Singular value decomposition via one-sided Jacobi on AᵀA.
///
/// The eigen-stage diagonalizes AᵀA with cyclic Jacobi rotations; singular
/// values are the square roots of its eigenvalues, `U = A·V·Σ⁻¹` completed
/// to a full orthonormal basis for the null directions.
pub fn svd(a: &Matrix) -> MatrixResult<SvdDecomposition> {
    let (m, n) = a.shape();
    let k = m.min(n);
    let a_data = a.data();

    // AᵀA, n×n symmetric
    let mut ata = vec![0.0; n * n];
    for i in 0..n {
        for j in i..n {
            let mut sum = 0.0;
            for r in 0..m {
                sum += a_data[r * n + i] * a_data[r * n + j];
            }
            ata[i * n + j] = sum;
            ata[j * n + i] = sum;
        }
    }

    // Jacobi eigen-stage; eigvecs accumulates V (columns are eigenvectors)
    let mut eigvecs = vec![0.0; n * n];
    for i in 0..n {
        eigvecs[i * n + i] = 1.0;
    }

    let frob = ata.iter().map(|v| v * v).sum::<f64>().sqrt();
    let tol = f64::EPSILON * frob.max(1.0);

    let mut converged = false;
    for _sweep in 0..MAX_SVD_SWEEPS {
        let mut off_norm = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                off_norm += ata[i * n + j] * ata[i * n + j];
            }
        }
        if off_norm.sqrt() <= tol {
            converged = true;
            break;
        }

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = ata[p * n + q];
                if apq.abs() <= tol {
                    continue;
                }
                let app = ata[p * n + p];
                let aqq = ata[q * n + q];

                let theta = (aqq - app) / (2.0 * apq);
                let t = if theta >= 0.0 {
                    1.0 / (theta + (1.0 + theta * theta).sqrt())
                } else {
                    -1.0 / (-theta + (1.0 + theta * theta).sqrt())
                };
                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;

                ata[p * n + p] = app - t * apq;
                ata[q * n + q] = aqq + t * apq;
                ata[p * n + q] = 0.0;
                ata[q * n + p] = 0.0;

                for r in 0..n {
                    if r == p || r == q {
                        continue;
                    }
                    let arp = ata[r * n + p];
                    let arq = ata[r * n + q];
                    ata[r * n + p] = c * arp - s * arq;
                    ata[p * n + r] = ata[r * n + p];
                    ata[r * n + q] = s * arp + c * arq;
                    ata[q * n + r] = ata[r * n + q];
                }

                for i in 0..n {
                    let vip = eigvecs[i * n + p];
                    let viq = eigvecs[i * n + q];
                    eigvecs[i * n + p] = c * vip - s * viq;
                    eigvecs[i * n + q] = s * vip + c * viq;
                }
            }
        }
    }

    if !converged {
        return Err(MatrixError::numeric("SVD computation did not converge"));
    }

    // Eigenvalues of AᵀA, clamped at zero and sorted descending
    let mut eig_pairs: Vec<(f64, usize)> = (0..n).map(|i| (ata[i * n + i].max(0.0), i)).collect();
    eig_pairs.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let s: Vec<f64> = eig_pairs[..k].iter().map(|&(ev, _)| ev.sqrt()).collect();

    // Full V with columns reordered to match the sorted singular values
    let mut v_data = vec![0.0; n * n];
    for i in 0..n {
        for (new_j, &(_, old_j)) in eig_pairs.iter().enumerate() {
            v_data[i * n + new_j] = eigvecs[i * n + old_j];
        }
    }

    // Vh = Vᵀ
    let mut vh_data = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            vh_data[j * n + i] = v_data[i * n + j];
        }
    }

    // U columns: A·v_j / σ_j where σ_j is meaningful, then an orthonormal
    // completion for the null directions up to m columns.
    let sigma_max = s.first().copied().unwrap_or(0.0);
    let sigma_floor = sigma_max * f64::EPSILON * (m.max(n) as f64);
    let mut u_cols: Vec<Vec<f64>> = Vec::with_capacity(m);
    for (j, &sigma) in s.iter().enumerate() {
        if sigma <= sigma_floor {
            break;
        }
        let mut col = vec![0.0; m];
        for (i, item) in col.iter_mut().enumerate() {
            let mut sum = 0.0;
            for p in 0..n {
                sum += a_data[i * n + p] * v_data[p * n + j];
            }
            *item = sum / sigma;
        }
        u_cols.push(col);
    }

    for basis in 0..m {
        if u_cols.len() == m {
            break;
        }
        let mut cand = vec![0.0; m];
        cand[basis] = 1.0;
        for col in &u_cols {
            let proj: f64 = cand.iter().zip(col.iter()).map(|(&x, &y)| x * y).sum();
            for (c, &u) in cand.iter_mut().zip(col.iter()) {
                *c -= proj * u;
            }
        }
        let norm = cand.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 1e-8 {
            for c in cand.iter_mut() {
                *c /= norm;
            }
            u_cols.push(cand);
        }
    }
    if u_cols.len() != m {
        return Err(MatrixError::numeric(
            "SVD basis completion failed; the input may be numerically invalid",
        ));
    }

    let mut u_data = vec![0.0; m * m];
    for (j, col) in u_cols.iter().enumerate() {
        for (i, &v) in col.iter().enumerate() {
            u_data[i * m + j] = v;
        }
    }

    Ok(SvdDecomposition {
        u: Matrix::new(u_data, m, m)?,
        s,
        vh: Matrix::new(vh_data, n, n)?,
    })
}

/// Condition number σ_max/σ_min.
///
/// Singular matrices give infinity; a zero matrix gives NaN. Both are
/// non-finite, which is what the inversion gate checks for.
pub fn condition_number(a: &Matrix) -> MatrixResult<f64> {
    let decomp = svd(a)?;
    let max = decomp.s.first().copied().unwrap_or(0.0);
    let min = decomp.s.last().copied().unwrap_or(0.0);
    Ok(max / min)
}

/// Numerical rank: singular values above `max(m, n)·ε·σ_max`.
pub fn rank(a: &Matrix) -> MatrixResult<usize> {
    let decomp = svd(a)?;
    let sigma_max = decomp.s.first().copied().unwrap_or(0.0);
    let tol = (a.rows().max(a.cols()) as f64) * f64::EPSILON * sigma_max;
    Ok(decomp.s.iter().filter(|&&v| v > tol).count())
}

/// Numerical rank with a caller-supplied tolerance.
pub fn rank_with_tolerance(a: &Matrix, tol: f64) -> MatrixResult<usize> {
    let decomp = svd(a)?;
    Ok(decomp.s.iter().filter(|&&v| v > tol).count())
}
