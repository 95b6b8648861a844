//! Result type alias for REFIT operations

use crate::error::RefitError;

/// Standard Result type for REFIT operations
pub type Result<T> = std::result::Result<T, RefitError>;

/// Extension trait for Result to provide additional convenience methods
pub trait ResultExt<T> {
    /// Convert an error to a recoverable error if possible
    fn recoverable(self) -> Result<Option<T>>;

    /// Log the error and continue with None
    fn log_and_continue(self) -> Option<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn recoverable(self) -> Result<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::warn!("Recoverable error: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn log_and_continue(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) if err.is_cancelled() => {
                tracing::debug!("Cancelled");
                None
            }
            Err(err) if err.is_recoverable() => {
                tracing::warn!("Continuing after error: {}", err);
                None
            }
            Err(err) => {
                tracing::error!("Fatal error: {}", err);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_passes_through_fatal_errors() {
        let stale: Result<u8> = Err(RefitError::stale_target("x"));
        assert!(matches!(stale.recoverable(), Ok(None)));

        let cancelled: Result<u8> = Err(RefitError::Cancelled);
        assert!(matches!(cancelled.recoverable(), Err(RefitError::Cancelled)));

        let ok: Result<u8> = Ok(3);
        assert!(matches!(ok.recoverable(), Ok(Some(3))));
    }

    #[test]
    fn test_log_and_continue() {
        let err: Result<u8> = Err(RefitError::internal_error("boom"));
        assert_eq!(err.log_and_continue(), None);
        assert_eq!(Ok::<u8, RefitError>(1).log_and_continue(), Some(1));
    }
}
