//! Process-level error type.
//!
//! Every fatal failure is mapped into an [`AppError`] carrying the process
//! exit code and a human-readable message. Recoverable per-term fitting
//! failures are *not* represented here; see `fit::glm::FitFailure`.
//!
//! Exit code conventions:
//!
//! - 2: configuration, CLI, or filesystem problems
//! - 3: input contract violations / missing fitting input
//! - 4: numerical or output contract problems
//! - 5: database connectivity, integrity, or commit failures

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Database-level failure (exit code 5).
    pub fn db(message: impl Into<String>) -> Self {
        Self::new(5, message)
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
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
