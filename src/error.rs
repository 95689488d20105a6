use thiserror::Error;

/// Exit code for invalid input, configuration, or I/O problems.
pub const EXIT_INPUT: u8 = 2;
/// Exit code when the solver ran out of iterations.
pub const EXIT_NOT_CONVERGED: u8 = 3;
/// Exit code for numerical failures.
pub const EXIT_NUMERIC: u8 = 4;

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

/// Failures of a single IHT solve.
///
/// No variant carries a partial weight vector: a failed solve discards its state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IhtError {
    /// Rejected before the first iteration.
    #[error("invalid IHT parameters: {0}")]
    InvalidParameters(String),

    /// The loss became NaN or infinite.
    #[error("the loss is not finite at iteration {iter} (loss={loss})")]
    NonFiniteLoss { iter: usize, loss: f64 },

    /// The iteration budget ran out before the scaled step norm fell below `tol`.
    #[error(
        "IHT did not converge in {max_iter} iterations (last scaled step norm {last_scaled_step_norm:.3e}); \
         increase the number of iterations or the tolerance"
    )]
    MaxIterationsExceeded {
        max_iter: usize,
        last_scaled_step_norm: f64,
    },

    /// The gradient vanished on the active support, so the normalized step
    /// size is undefined. The solver recovers from this by stopping at the
    /// current iterate.
    #[error("degenerate step size at iteration {iter}: zero gradient on the active support")]
    DegenerateStepSize { iter: usize },
}

impl From<IhtError> for AppError {
    fn from(err: IhtError) -> Self {
        let code = match err {
            IhtError::InvalidParameters(_) => EXIT_INPUT,
            IhtError::MaxIterationsExceeded { .. } => EXIT_NOT_CONVERGED,
            IhtError::NonFiniteLoss { .. } | IhtError::DegenerateStepSize { .. } => EXIT_NUMERIC,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solver_errors_map_to_exit_codes() {
        let e: AppError = IhtError::InvalidParameters("k=0".into()).into();
        assert_eq!(e.exit_code(), EXIT_INPUT);

        let e: AppError = IhtError::MaxIterationsExceeded {
            max_iter: 5,
            last_scaled_step_norm: 0.5,
        }
        .into();
        assert_eq!(e.exit_code(), EXIT_NOT_CONVERGED);
        assert!(e.to_string().contains("5 iterations"));

        let e: AppError = IhtError::NonFiniteLoss { iter: 2, loss: f64::NAN }.into();
        assert_eq!(e.exit_code(), EXIT_NUMERIC);
    }
}
