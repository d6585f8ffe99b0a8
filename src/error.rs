//! Application error type.
//!
//! Every failure carries a structured [`ErrorKind`] (so callers and tests can
//! branch on it), a message for humans, and the process exit code the binary
//! should terminate with.

/// What went wrong, with the context needed to diagnose it.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Unreadable input: missing file, malformed CSV, bad argument.
    Input,
    /// An aggregated trial row is inconsistent (0-based row index).
    DataIntegrity { row: usize },
    /// No observations to fit.
    EmptyData,
    /// Newton iterations exhausted without meeting the tolerance.
    NonConvergence { iterations: usize, residual: f64 },
    /// The information matrix became singular (perfectly separable data).
    Separation,
    /// Malformed prediction grid.
    InvalidRange,
    /// Terminal setup/draw/event failures.
    Terminal,
}

impl ErrorKind {
    fn exit_code(&self) -> u8 {
        match self {
            ErrorKind::Input | ErrorKind::InvalidRange => 2,
            ErrorKind::DataIntegrity { .. } | ErrorKind::EmptyData => 3,
            ErrorKind::NonConvergence { .. } | ErrorKind::Separation | ErrorKind::Terminal => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            exit_code: kind.exit_code(),
            kind,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Input, message)
    }

    pub fn data_integrity(row: usize, message: impl Into<String>) -> Self {
        let message = format!("row {row}: {}", message.into());
        Self::new(ErrorKind::DataIntegrity { row }, message)
    }

    pub fn non_convergence(iterations: usize, residual: f64) -> Self {
        Self::new(
            ErrorKind::NonConvergence { iterations, residual },
            format!(
                "Logistic fit did not converge after {iterations} iterations (last step {residual:.3e})."
            ),
        )
    }

    pub fn separation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Separation, message)
    }

    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRange, message)
    }

    pub fn terminal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Terminal, message)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
