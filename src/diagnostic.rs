//! Driver-reported conditions and their aggregation.

use std::fmt;

use auto_impl::auto_impl;

use crate::constant::{DiagField, HandleType, Len};
use crate::gate::SqlResult;

/// Library error codes, reported as the native error of a library diagnostic.
pub mod code {
    pub const NONE: i32 = 0;
    pub const INTERNAL: i32 = 1;
    pub const NO_DATA: i32 = 2;
    pub const INCORRECT_USE: i32 = 3;
    pub const NOT_IMPLEMENTED: i32 = 4;
    pub const TYPE_MISMATCH: i32 = 5;
    pub const NOT_FOUND: i32 = 6;
}

/// SQL state of every library-generated diagnostic
pub const LIBRARY_SQL_STATE: &str = "HY000";

/// A handle the driver can be asked about its diagnostic records.
///
/// Record numbers start at 1. Record 0 addresses the header fields such as
/// [`DiagField::RowCount`]. A record past the last one answers [`SqlResult::NoData`].
#[auto_impl(&, &mut, Box)]
pub trait DiagSource {
    fn handle_type(&self) -> HandleType;

    fn diag_string(&self, record: i16, field: DiagField) -> SqlResult<String>;

    fn diag_integer(&self, record: i16, field: DiagField) -> SqlResult<i32>;

    fn diag_length(&self, record: i16, field: DiagField) -> SqlResult<Len>;
}

/// One driver-reported condition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagRecord {
    pub server: String,
    pub connection_name: String,
    pub message: String,
    /// 5-character SQL state
    pub sql_state: String,
    pub native_error: i32,
}

impl DiagRecord {
    pub fn new(sql_state: impl Into<String>, native_error: i32, message: impl Into<String>) -> Self {
        Self {
            sql_state: sql_state.into(),
            native_error,
            message: message.into(),
            ..Default::default()
        }
    }

    /// Read record `record` field by field; `None` as soon as any field query fails.
    fn read<H: DiagSource + ?Sized>(handle: &H, record: i16) -> Option<Self> {
        let server = handle.diag_string(record, DiagField::ServerName).value()?;
        let connection_name = handle
            .diag_string(record, DiagField::ConnectionName)
            .value()?;
        let message = handle.diag_string(record, DiagField::MessageText).value()?;
        let native_error = handle.diag_integer(record, DiagField::Native).value()?;
        let sql_state = handle.diag_string(record, DiagField::SqlState).value()?;
        Some(Self {
            server,
            connection_name,
            message,
            sql_state,
            native_error,
        })
    }
}

impl fmt::Display for DiagRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[server:{}][connection:{}][state:{}][native_errno:{}] {}",
            self.server, self.connection_name, self.sql_state, self.native_error, self.message
        )
    }
}

/// Every condition the driver reported for one call, plus the affected-row count.
///
/// Built fresh for each checked call; it is never accumulated across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{}", self.message())]
pub struct Diagnostic {
    affected_rows: Len,
    records: Vec<DiagRecord>,
}

impl Diagnostic {
    /// Query `handle` for record 1, 2, 3, ... until the driver has no more.
    ///
    /// A failing field query ends collection at that record; what was read so far is kept.
    /// A failing row-count query leaves `affected_rows` at 0.
    pub fn collect<H: DiagSource + ?Sized>(handle: &H) -> Self {
        let affected_rows = handle
            .diag_length(0, DiagField::RowCount)
            .value()
            .unwrap_or(0);

        let mut records = Vec::new();
        for record in 1..=i16::MAX {
            match DiagRecord::read(handle, record) {
                Some(diag) => records.push(diag),
                None => break,
            }
        }

        tracing::trace!(
            handle_type = ?handle.handle_type(),
            records = records.len(),
            "collected diagnostics"
        );

        Self {
            affected_rows,
            records,
        }
    }

    /// A single library-generated record.
    pub fn library(native_error: i32, message: impl Into<String>) -> Self {
        Self {
            affected_rows: 0,
            records: vec![DiagRecord::new(LIBRARY_SQL_STATE, native_error, message)],
        }
    }

    pub fn from_records(affected_rows: Len, records: Vec<DiagRecord>) -> Self {
        Self {
            affected_rows,
            records,
        }
    }

    pub fn affected_rows(&self) -> Len {
        self.affected_rows
    }

    pub fn records(&self) -> &[DiagRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record by 1-based number, as the driver numbers them.
    pub fn get(&self, record: usize) -> Option<&DiagRecord> {
        record.checked_sub(1).and_then(|idx| self.records.get(idx))
    }

    pub(crate) fn push(&mut self, record: DiagRecord) {
        self.records.push(record);
    }

    /// All records, newline-joined.
    pub fn message(&self) -> String {
        self.records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
