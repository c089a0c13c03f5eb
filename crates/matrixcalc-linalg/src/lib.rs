//! Safe linear-algebra operations over [`matrixcalc_core::Matrix`].
//!
//! Every operation validates its shape and numeric preconditions before
//! computing, and reports failures through the two-kind
//! [`MatrixError`](matrixcalc_core::MatrixError) taxonomy: `Input` for
//! caller-supplied data that is structurally wrong for the operation,
//! `Numeric` for data that is valid but numerically unsafe (singular,
//! ill-conditioned, non-convergent). All functions are deterministic,
//! side-effect-free, and safe to call concurrently.

pub mod decomposition;
pub mod eigen;
pub mod ops;
pub mod svd;

pub use decomposition::*;
pub use eigen::*;
pub use ops::*;
pub use svd::*;
