//! Parser for flat, comma-delimited matrix input.
//!
//! Turns a token stream like `"1, 2, 3, 4"` plus declared dimensions into a
//! validated [`Matrix`], or fails with a precise [`MatrixError::Input`]
//! diagnostic. Pure function, no side effects; failures are deterministic
//! for a given input.

use matrixcalc_core::{Matrix, MatrixError, MatrixResult};

/// Parse a comma-separated value stream into a `rows`×`cols` matrix.
///
/// Values are laid out in row-major order and converted to `f64` regardless
/// of how they were written (`"3"` and `"3.0"` are equivalent). Validation
/// order: dimensions, empty input, empty tokens, token count, numeric
/// conversion.
pub fn parse(text: &str, rows: usize, cols: usize) -> MatrixResult<Matrix> {
    if rows == 0 || cols == 0 {
        return Err(MatrixError::input("rows and cols must be positive integers"));
    }

    if text.trim().is_empty() {
        return Err(MatrixError::input("empty input text"));
    }

    let tokens: Vec<&str> = text.split(',').map(str::trim).collect();

    // A run of delimiters with nothing between them is a hard failure, never
    // skipped or treated as zero.
    if tokens.iter().any(|t| t.is_empty()) {
        return Err(MatrixError::input(
            "empty values found in input; ensure values are comma-separated",
        ));
    }

    let expected = rows * cols;
    if tokens.len() != expected {
        return Err(MatrixError::input(format!(
            "expected {} values (rows*cols={}), but received {}",
            expected,
            expected,
            tokens.len()
        )));
    }

    let values = tokens
        .iter()
        .map(|t| t.parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .map_err(|_| {
            MatrixError::input("could not convert values to numbers; use numeric-only values")
        })?;

    // The count check guarantees the reshape fits, but a construction failure
    // is still mapped to an input error rather than leaking.
    Matrix::new(values, rows, cols)
        .map_err(|_| MatrixError::input("values cannot be reshaped to the requested dimensions"))
}
