//! Logging extensions for Result.
//!
//! Built on [`tap::TapFallible`] so the log call sits in the pipeline
//! without unwrapping.

use tap::TapFallible;

/// Log-on-error combinator for any Result type.
pub trait ResultExt<T, E> {
    /// Log the error at warn level under `operation` and pass the Result through.
    fn warn_on_err(self, operation: &str) -> Self
    where
        E: std::fmt::Display;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E> {
    fn warn_on_err(self, operation: &str) -> Self
    where
        E: std::fmt::Display,
    {
        self.tap_err(|e| tracing::warn!(operation, error = %e, "Operation failed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_on_err_passes_err_through() {
        let result: Result<i32, &str> = Err("boom");
        assert_eq!(result.warn_on_err("test"), Err("boom"));
    }

    #[test]
    fn test_warn_on_err_passes_ok_through() {
        let ok: Result<i32, &str> = Ok(1);
        assert_eq!(ok.warn_on_err("test"), Ok(1));
    }
}
