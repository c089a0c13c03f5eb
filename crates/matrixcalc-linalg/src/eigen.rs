use matrixcalc_core::{Matrix, MatrixError, MatrixResult};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Iteration budget per deflation step of the shifted QR stage.
const MAX_QR_ITERATIONS: usize = 30;

/// Imaginary parts below this (on unit-normalized eigenvectors) are
/// reported as plain real components.
const IMAG_NEGLIGIBLE: f64 = 1e-9;

/// One eigenvalue as a real/imaginary pair.
///
/// `is_complex` is true iff the imaginary part is non-zero, mirroring the
/// record shape collaborators persist and render.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EigenValue {
    pub real: f64,
    pub imag: f64,
    pub is_complex: bool,
}

/// One component of a reported eigenvector.
///
/// Components with a non-negligible imaginary part are preserved losslessly
/// as their textual complex representation, since plain numeric
/// serialization cannot hold complex values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EigenComponent {
    Real(f64),
    Complex(String),
}

/// Eigenvalues and eigenvectors of a square matrix.
///
/// `eigenvectors[j]` is the column of the eigenvector matrix matching
/// `eigenvalues[j]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EigenDecomposition {
    pub eigenvalues: Vec<EigenValue>,
    pub eigenvectors: Vec<Vec<EigenComponent>>,
}

/// Eigen-decomposition of a general real square matrix.
///
/// Hessenberg reduction followed by implicit double-shift QR iteration;
/// trailing 1×1 blocks deflate to real eigenvalues, 2×2 blocks to
/// complex-conjugate pairs. Eigenvectors are recovered per eigenvalue by
/// inverse iteration in complex arithmetic.
pub fn eigen(a: &Matrix) -> MatrixResult<EigenDecomposition> {
    if !a.is_square() {
        return Err(MatrixError::input(format!(
            "matrix must be square to compute eigenvalues (shape={:?})",
            a.shape()
        )));
    }

    let values = eigenvalues_qr(a)?;
    let mut eigenvalues = Vec::with_capacity(values.len());
    let mut eigenvectors = Vec::with_capacity(values.len());
    for &lambda in &values {
        eigenvalues.push(EigenValue {
            real: lambda.re,
            imag: lambda.im,
            is_complex: lambda.im != 0.0,
        });
        let vector = eigenvector_for(a, lambda)?;
        eigenvectors.push(
            vector
                .into_iter()
                .map(|c| {
                    if c.im.abs() > IMAG_NEGLIGIBLE {
                        EigenComponent::Complex(c.to_string())
                    } else {
                        EigenComponent::Real(c.re)
                    }
                })
                .collect(),
        );
    }

    Ok(EigenDecomposition {
        eigenvalues,
        eigenvectors,
    })
}

/// All eigenvalues via Hessenberg reduction + implicit double-shift QR.
fn eigenvalues_qr(a: &Matrix) -> MatrixResult<Vec<Complex64>> {
    let n = a.rows();
    let mut h = a.data().to_vec();
    hessenberg(&mut h, n);

    let anorm: f64 = h.iter().map(|v| v.abs()).sum();
    let mut eigs: Vec<Complex64> = Vec::with_capacity(n);
    let mut hi = n - 1;
    let mut iterations = 0usize;

    loop {
        // Find the start of the active unreduced block [lo..=hi]; a
        // negligible subdiagonal decouples it from the rows above.
        let mut lo = hi;
        while lo > 0 {
            let sub = h[lo * n + lo - 1].abs();
            let scale = h[(lo - 1) * n + lo - 1].abs() + h[lo * n + lo].abs();
            let scale = if scale == 0.0 { anorm } else { scale };
            if sub <= f64::EPSILON * scale {
                h[lo * n + lo - 1] = 0.0;
                break;
            }
            lo -= 1;
        }

        if lo == hi {
            // 1×1 block: real eigenvalue
            eigs.push(Complex64::new(h[hi * n + hi], 0.0));
            if hi == 0 {
                break;
            }
            hi -= 1;
            iterations = 0;
            continue;
        }

        if lo + 1 == hi {
            // 2×2 block: real pair or complex-conjugate pair
            let (l1, l2) = eig_2x2(
                h[lo * n + lo],
                h[lo * n + hi],
                h[hi * n + lo],
                h[hi * n + hi],
            );
            eigs.push(l1);
            eigs.push(l2);
            if lo == 0 {
                break;
            }
            hi = lo - 1;
            iterations = 0;
            continue;
        }

        iterations += 1;
        if iterations > MAX_QR_ITERATIONS {
            return Err(MatrixError::numeric(
                "eigenvalue computation did not converge",
            ));
        }

        // Double shift from the trailing 2×2 of the active block; an
        // exceptional shift every 10 iterations breaks rare cycling.
        let (shift_trace, shift_det) = if iterations % 10 == 0 {
            let x = h[hi * n + hi] + 0.75 * h[hi * n + hi - 1].abs();
            (2.0 * x, x * x)
        } else {
            let h11 = h[(hi - 1) * n + hi - 1];
            let h12 = h[(hi - 1) * n + hi];
            let h21 = h[hi * n + hi - 1];
            let h22 = h[hi * n + hi];
            (h11 + h22, h11 * h22 - h12 * h21)
        };

        // First column of (H - λ₁I)(H - λ₂I) on the active block
        let h00 = h[lo * n + lo];
        let h01 = h[lo * n + lo + 1];
        let h10 = h[(lo + 1) * n + lo];
        let h11 = h[(lo + 1) * n + lo + 1];
        let h21 = h[(lo + 2) * n + lo + 1];
        let mut p = h00 * h00 + h01 * h10 - shift_trace * h00 + shift_det;
        let mut q = h10 * (h00 + h11 - shift_trace);
        let mut r = h10 * h21;

        // Chase the bulge down the block
        for k in lo..hi {
            if k > lo {
                p = h[k * n + k - 1];
                q = h[(k + 1) * n + k - 1];
                r = if k + 2 <= hi { h[(k + 2) * n + k - 1] } else { 0.0 };
            }
            let wide = k + 2 <= hi;
            if !wide {
                r = 0.0;
            }

            let norm = (p * p + q * q + r * r).sqrt();
            if norm < f64::EPSILON * anorm.max(1.0) {
                // Negligible bulge: drop it instead of chasing it
                if k > lo {
                    h[(k + 1) * n + k - 1] = 0.0;
                    if wide {
                        h[(k + 2) * n + k - 1] = 0.0;
                    }
                }
                continue;
            }
            let alpha = if p >= 0.0 { -norm } else { norm };
            let mut v = [p - alpha, q, r];
            let vnorm = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            if vnorm < f64::EPSILON {
                continue;
            }
            for c in v.iter_mut() {
                *c /= vnorm;
            }

            // Left: rows k..k+2 across all columns
            for col in 0..n {
                let x0 = h[k * n + col];
                let x1 = h[(k + 1) * n + col];
                let x2 = if wide { h[(k + 2) * n + col] } else { 0.0 };
                let proj = v[0] * x0 + v[1] * x1 + v[2] * x2;
                h[k * n + col] = x0 - 2.0 * v[0] * proj;
                h[(k + 1) * n + col] = x1 - 2.0 * v[1] * proj;
                if wide {
                    h[(k + 2) * n + col] = x2 - 2.0 * v[2] * proj;
                }
            }
            // Right: columns k..k+2 across all rows
            for row in 0..n {
                let x0 = h[row * n + k];
                let x1 = h[row * n + k + 1];
                let x2 = if wide { h[row * n + k + 2] } else { 0.0 };
                let proj = v[0] * x0 + v[1] * x1 + v[2] * x2;
                h[row * n + k] = x0 - 2.0 * v[0] * proj;
                h[row * n + k + 1] = x1 - 2.0 * v[1] * proj;
                if wide {
                    h[row * n + k + 2] = x2 - 2.0 * v[2] * proj;
                }
            }
            // The chase leaves only rounding noise below the subdiagonal
            if k > lo {
                h[(k + 1) * n + k - 1] = 0.0;
                if wide {
                    h[(k + 2) * n + k - 1] = 0.0;
                }
            }
        }
    }

    eigs.reverse();
    Ok(eigs)
}

/// Reduce to upper Hessenberg form in place via Householder similarity
/// transforms.
fn hessenberg(h: &mut [f64], n: usize) {
    if n < 3 {
        return;
    }
    for k in 0..n - 2 {
        let mut v: Vec<f64> = (k + 1..n).map(|i| h[i * n + k]).collect();
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm < f64::EPSILON {
            continue;
        }
        let sign = if v[0] >= 0.0 { 1.0 } else { -1.0 };
        v[0] += sign * norm;
        let vnorm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if vnorm < f64::EPSILON {
            continue;
        }
        for c in v.iter_mut() {
            *c /= vnorm;
        }

        // Left: rows k+1..n, columns k..n
        for col in k..n {
            let mut proj = 0.0;
            for (i, &vi) in v.iter().enumerate() {
                proj += vi * h[(k + 1 + i) * n + col];
            }
            for (i, &vi) in v.iter().enumerate() {
                h[(k + 1 + i) * n + col] -= 2.0 * vi * proj;
            }
        }
        // Right: all rows, columns k+1..n
        for row in 0..n {
            let mut proj = 0.0;
            for (i, &vi) in v.iter().enumerate() {
                proj += h[row * n + k + 1 + i] * vi;
            }
            for (i, &vi) in v.iter().enumerate() {
                h[row * n + k + 1 + i] -= 2.0 * proj * vi;
            }
        }
        // Only rounding noise remains below the subdiagonal of column k
        for i in (k + 2)..n {
            h[i * n + k] = 0.0;
        }
    }
}

/// Eigenvalues of a real 2×2 block.
fn eig_2x2(a: f64, b: f64, c: f64, d: f64) -> (Complex64, Complex64) {
    let half_trace = (a + d) / 2.0;
    let det = a * d - b * c;
    let disc = half_trace * half_trace - det;
    if disc >= 0.0 {
        let sq = disc.sqrt();
        (
            Complex64::new(half_trace + sq, 0.0),
            Complex64::new(half_trace - sq, 0.0),
        )
    } else {
        let sq = (-disc).sqrt();
        (
            Complex64::new(half_trace, sq),
            Complex64::new(half_trace, -sq),
        )
    }
}

/// One eigenvector by inverse iteration on (A - λI) in complex arithmetic.
///
/// The shifted matrix is factored once with partial pivoting; pivots that
/// collapse (the shift is an eigenvalue, so near-singularity is expected)
/// are replaced with a tiny value to keep the solve defined. The result is
/// unit-normalized with its largest component rotated onto the positive
/// real axis, so output is deterministic.
fn eigenvector_for(a: &Matrix, lambda: Complex64) -> MatrixResult<Vec<Complex64>> {
    let n = a.rows();
    let a_data = a.data();

    let mut m: Vec<Complex64> = (0..n * n)
        .map(|idx| Complex64::new(a_data[idx], 0.0))
        .collect();
    for i in 0..n {
        m[i * n + i] -= lambda;
    }

    let scale: f64 = a_data.iter().map(|v| v.abs()).sum::<f64>().max(1.0);
    let tiny = Complex64::new(f64::EPSILON * scale, 0.0);

    // In-place LU with partial pivoting
    let mut pivot: Vec<usize> = (0..n).collect();
    for k in 0..n {
        let mut max_norm = m[k * n + k].norm();
        let mut max_row = k;
        for i in (k + 1)..n {
            let v = m[i * n + k].norm();
            if v > max_norm {
                max_norm = v;
                max_row = i;
            }
        }
        if max_row != k {
            pivot.swap(k, max_row);
            for j in 0..n {
                m.swap(k * n + j, max_row * n + j);
            }
        }
        if m[k * n + k].norm() < tiny.re {
            m[k * n + k] = tiny;
        }
        for i in (k + 1)..n {
            let factor = m[i * n + k] / m[k * n + k];
            m[i * n + k] = factor;
            for j in (k + 1)..n {
                let delta = factor * m[k * n + j];
                m[i * n + j] -= delta;
            }
        }
    }

    let solve = |b: &[Complex64]| -> Vec<Complex64> {
        let mut y = vec![Complex64::new(0.0, 0.0); n];
        for i in 0..n {
            let mut sum = b[pivot[i]];
            for j in 0..i {
                let delta = m[i * n + j] * y[j];
                sum -= delta;
            }
            y[i] = sum;
        }
        for i in (0..n).rev() {
            let mut sum = y[i];
            for j in (i + 1)..n {
                let delta = m[i * n + j] * y[j];
                sum -= delta;
            }
            y[i] = sum / m[i * n + i];
        }
        y
    };

    let mut v = vec![Complex64::new(1.0 / (n as f64).sqrt(), 0.0); n];
    for _ in 0..2 {
        let w = solve(&v);
        let norm = w.iter().map(|c| c.norm_sqr()).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            break;
        }
        for (vi, wi) in v.iter_mut().zip(w.iter()) {
            *vi = wi / norm;
        }
    }

    // Deterministic phase: rotate the largest component to be real positive
    let mut best = 0usize;
    let mut best_norm = 0.0;
    for (i, c) in v.iter().enumerate() {
        if c.norm() > best_norm {
            best_norm = c.norm();
            best = i;
        }
    }
    if best_norm > 0.0 {
        let phase = v[best] / Complex64::new(best_norm, 0.0);
        for c in v.iter_mut() {
            *c /= phase;
        }
    }

    Ok(v)
}
