use thiserror::Error;

// Unified error type for sparsetool

/// Which workspace a kernel phase ran short of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workspace {
    /// Integer workspace (`is`).
    Integer,
    /// Real workspace (`s`).
    Real,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KError {
    #[error("value of N is out of range: N = {0}")]
    InvalidDimension(usize),
    #[error("number of entries is out of range: NE = {0}")]
    InvalidEntryCount(usize),
    #[error("job {requested} requested before {missing} was performed")]
    InvalidJobSequence {
        requested: &'static str,
        missing: &'static str,
    },
    #[error("permutation error: {0}")]
    PermutationError(String),
    #[error("not enough real space to preprocess the input matrix, need at least {required}")]
    PreprocessWorkspace { required: usize },
    #[error("matrix is structurally singular, estimated rank = {rank}")]
    StructurallySingular { rank: usize },
    #[error("analysis needs an integer workspace of at least {required}")]
    AnalysisIntWorkspace { required: usize },
    #[error("numerical factorization needs an integer workspace of at least {required}")]
    FactorIntWorkspace { required: usize },
    #[error("numerical factorization needs a real workspace of at least {required}")]
    FactorRealWorkspace { required: usize },
    #[error("matrix is numerically singular, estimated rank = {rank}")]
    NumericallySingular { rank: usize },
    #[error("solution phase needs a real workspace of at least {required}")]
    SolveRealWorkspace { required: usize },
    #[error("projected workspace of {required_bytes} bytes exceeds the limit of {limit_bytes} bytes")]
    WorkspaceLimitExceeded { required_bytes: u64, limit_bytes: u64 },
    #[error("entry ({row}, {col}) is outside a {n}x{n} matrix")]
    IndexOutOfRange { row: usize, col: usize, n: usize },
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("factorization error: {0}")]
    FactorError(String),
}

impl KError {
    /// Numeric status in the native convention (negative on error).
    ///
    /// Errors raised by the adapters rather than the kernel map to codes
    /// below the native range.
    pub fn code(&self) -> i32 {
        match self {
            KError::InvalidDimension(_) => -1,
            KError::InvalidEntryCount(_) => -2,
            KError::InvalidJobSequence { .. } => -3,
            KError::PermutationError(_) => -4,
            KError::PreprocessWorkspace { .. } => -5,
            KError::StructurallySingular { .. } => -6,
            KError::AnalysisIntWorkspace { .. } => -7,
            KError::FactorIntWorkspace { .. } => -8,
            KError::FactorRealWorkspace { .. } => -9,
            KError::NumericallySingular { .. } => -10,
            KError::SolveRealWorkspace { .. } => -11,
            KError::WorkspaceLimitExceeded { .. } => -100,
            KError::IndexOutOfRange { .. } => -101,
            KError::DimensionMismatch { .. } => -102,
            KError::FactorError(_) => -103,
        }
    }

    /// Classify the error so callers can choose between retrying with a
    /// larger workspace and giving up.
    pub fn status(&self) -> Status {
        match *self {
            KError::PreprocessWorkspace { required }
            | KError::FactorRealWorkspace { required }
            | KError::SolveRealWorkspace { required } => Status::NeedsMoreWorkspace {
                workspace: Workspace::Real,
                required,
            },
            KError::AnalysisIntWorkspace { required } | KError::FactorIntWorkspace { required } => {
                Status::NeedsMoreWorkspace {
                    workspace: Workspace::Integer,
                    required,
                }
            }
            KError::StructurallySingular { rank } | KError::NumericallySingular { rank } => {
                Status::SingularMatrix {
                    estimated_rank: rank,
                }
            }
            _ => Status::Fatal,
        }
    }
}

/// Outcome of a kernel phase as a tagged variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NeedsMoreWorkspace { workspace: Workspace, required: usize },
    SingularMatrix { estimated_rank: usize },
    Fatal,
}

impl Status {
    pub fn of<T>(result: &Result<T, KError>) -> Status {
        match result {
            Ok(_) => Status::Ok,
            Err(e) => e.status(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Status::Ok)
    }
}
