//! # MatrixCalc
//!
//! Validated matrix arithmetic and linear-algebra decompositions for
//! interactive calculators: a delimited-text parser, a single concrete
//! matrix type, and a family of safe operations that check their
//! preconditions before computing.
//!
//! ## Modules
//!
//! - **core** — `Matrix` type (dense, row-major, `f64`) and the two-kind
//!   `MatrixError` taxonomy (input vs. numeric)
//! - **parse** — comma-delimited token stream → validated `Matrix`
//! - **linalg** — add, subtract, product, transpose, determinant,
//!   conditioned inverse, rank, LU, QR, Cholesky, SVD, eigen-decomposition
//!
//! Every operation is pure and stateless: callers own both the inputs and
//! the result, and any failure is a [`MatrixError`] whose message can be
//! shown to the user verbatim.

/// Matrix type and domain errors.
pub use matrixcalc_core as core;

/// Delimited-text parsing.
pub use matrixcalc_parse as parse;

/// Safe linear-algebra operations.
pub use matrixcalc_linalg as linalg;

pub use matrixcalc_core::{Matrix, MatrixError, MatrixResult};
pub use matrixcalc_linalg::{
    add, cholesky, condition_number, determinant, dot, eigen, inverse, inverse_with_limit, lu,
    qr, rank, rank_with_tolerance, subtract, svd, transpose, EigenComponent,
    EigenDecomposition, EigenValue, LuDecomposition, QrDecomposition, SvdDecomposition,
    DEFAULT_CONDITION_LIMIT,
};
pub use matrixcalc_parse::parse as parse_matrix;
