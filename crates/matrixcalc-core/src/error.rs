use thiserror::Error;

/// Domain error for matrix parsing and safe operations.
///
/// Exactly two kinds: `Input` means the caller-supplied data is structurally
/// or syntactically invalid (reject the request, show the message); `Numeric`
/// means the data is valid but the requested computation is unsafe or failed
/// (singularity, ill-conditioning, non-convergence). Collaborators branch on
/// the kind, not the message text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("{0}")]
    Input(String),

    #[error("{0}")]
    Numeric(String),
}

impl MatrixError {
    pub fn input(msg: impl Into<String>) -> Self {
        MatrixError::Input(msg.into())
    }

    pub fn numeric(msg: impl Into<String>) -> Self {
        MatrixError::Numeric(msg.into())
    }

    pub fn is_input(&self) -> bool {
        matches!(self, MatrixError::Input(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, MatrixError::Numeric(_))
    }

    /// The human-readable diagnostic, shown verbatim to end users.
    pub fn message(&self) -> &str {
        match self {
            MatrixError::Input(m) | MatrixError::Numeric(m) => m,
        }
    }
}

pub type MatrixResult<T> = Result<T, MatrixError>;
