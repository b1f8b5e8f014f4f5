use thiserror::Error;

pub use color_eyre::eyre::eyre;

use crate::diagnostic::{Diagnostic, code};

#[derive(Debug, Error)]
pub enum Error {
    /// The driver reported a failure; carries every record it returned for the call.
    #[error("Driver error: {0}")]
    DriverError(#[from] Diagnostic),

    /// No statement was executed, or its cursor was closed, cancelled, or the value is NULL.
    #[error("No data available: {0}")]
    NoDataAvailable(String),

    #[error("Incorrect use: {0}")]
    IncorrectUse(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Library bug: {0}")]
    LibraryBug(color_eyre::Report),
}

impl Error {
    /// Library error code, `None` for driver errors.
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::DriverError(_) => None,
            Error::NoDataAvailable(_) => Some(code::NO_DATA),
            Error::IncorrectUse(_) => Some(code::INCORRECT_USE),
            Error::TypeMismatch(_) => Some(code::TYPE_MISMATCH),
            Error::NotFound(_) => Some(code::NOT_FOUND),
            Error::NotImplemented(_) => Some(code::NOT_IMPLEMENTED),
            Error::LibraryBug(_) => Some(code::INTERNAL),
        }
    }

    /// Render any error as a diagnostic aggregate.
    ///
    /// Library errors become a single `HY000` record whose native error is [`Error::code`].
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Error::DriverError(diag) => diag.clone(),
            Error::NoDataAvailable(msg)
            | Error::IncorrectUse(msg)
            | Error::TypeMismatch(msg)
            | Error::NotFound(msg)
            | Error::NotImplemented(msg) => {
                Diagnostic::library(self.code().unwrap_or(code::INTERNAL), msg.clone())
            }
            Error::LibraryBug(report) => Diagnostic::library(code::INTERNAL, report.to_string()),
        }
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(err: std::convert::Infallible) -> Self {
        match err {}
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_render_as_hy000() {
        let err = Error::NotFound("the column \"x\" was not found in this record".to_string());
        let diag = err.diagnostic();
        assert_eq!(diag.len(), 1);
        let record = &diag.records()[0];
        assert_eq!(record.sql_state, "HY000");
        assert_eq!(record.native_error, code::NOT_FOUND);
        assert_eq!(err.code(), Some(code::NOT_FOUND));
    }

    #[test]
    fn driver_errors_keep_their_records() {
        let diag = Diagnostic::library(77, "boom");
        let err = Error::from(diag.clone());
        assert_eq!(err.code(), None);
        assert_eq!(err.diagnostic(), diag);
    }
}
