//! Outcome of a single driver call and the gate every outcome passes through.

use crate::diagnostic::{DiagRecord, DiagSource, Diagnostic, LIBRARY_SQL_STATE, code};
use crate::error::{Error, Result};

/// Raw outcome of a driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlResult<T> {
    Success(T),
    SuccessWithInfo(T),
    NoData,
    NeedData,
    StillExecuting,
    Error,
    InvalidHandle,
}

impl<T> SqlResult<T> {
    /// The payload of a successful call.
    pub fn value(self) -> Option<T> {
        match self {
            SqlResult::Success(v) | SqlResult::SuccessWithInfo(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SqlResult::Success(_) | SqlResult::SuccessWithInfo(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SqlResult<U> {
        match self {
            SqlResult::Success(v) => SqlResult::Success(f(v)),
            SqlResult::SuccessWithInfo(v) => SqlResult::SuccessWithInfo(f(v)),
            SqlResult::NoData => SqlResult::NoData,
            SqlResult::NeedData => SqlResult::NeedData,
            SqlResult::StillExecuting => SqlResult::StillExecuting,
            SqlResult::Error => SqlResult::Error,
            SqlResult::InvalidHandle => SqlResult::InvalidHandle,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SqlResult::Success(_) => "SUCCESS",
            SqlResult::SuccessWithInfo(_) => "SUCCESS_WITH_INFO",
            SqlResult::NoData => "NO_DATA",
            SqlResult::NeedData => "NEED_DATA",
            SqlResult::StillExecuting => "STILL_EXECUTING",
            SqlResult::Error => "ERROR",
            SqlResult::InvalidHandle => "INVALID_HANDLE",
        }
    }
}

/// Outcome that let the caller continue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    SuccessWithInfo,
}

/// Map a driver outcome to continue-or-fail.
///
/// `last` always ends up holding the diagnostic of this call: emptied on `Success`,
/// collected from `handle` otherwise. Anything but a success fails with
/// [`Error::DriverError`]; when the driver recorded nothing, one record naming the
/// return code is synthesized so the error is never empty.
pub fn check<H, T>(handle: &H, ret: SqlResult<T>, last: &mut Diagnostic) -> Result<(Status, T)>
where
    H: DiagSource + ?Sized,
{
    match ret {
        SqlResult::Success(v) => {
            *last = Diagnostic::default();
            Ok((Status::Success, v))
        }
        SqlResult::SuccessWithInfo(v) => {
            *last = Diagnostic::collect(handle);
            tracing::debug!(diagnostic = %last, "driver call succeeded with info");
            Ok((Status::SuccessWithInfo, v))
        }
        other => {
            let mut diag = Diagnostic::collect(handle);
            if diag.is_empty() {
                diag.push(DiagRecord::new(
                    LIBRARY_SQL_STATE,
                    code::INTERNAL,
                    format!("driver call returned {}", other.name()),
                ));
            }
            *last = diag.clone();
            Err(Error::DriverError(diag))
        }
    }
}
