//! The boundary to the driver-manager layer.
//!
//! One [`Driver`] value stands for one statement handle. Every call reports its raw
//! outcome as a [`SqlResult`]; nothing above [`crate::gate::check`] inspects those
//! outcomes directly.

use std::cell::RefMut;

use auto_impl::auto_impl;

use crate::constant::{CDataType, Len, SqlDataType, StatementAttribute};
use crate::diagnostic::DiagSource;
use crate::error::Result;
use crate::gate::SqlResult;

/// Whether a column accepts NULL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nullability {
    NoNulls,
    Nullable,
    #[default]
    Unknown,
}

/// Column metadata reported by `describe_col`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: SqlDataType,
    /// Declared size or precision; 0 when unbounded or unknown
    pub column_size: usize,
    pub decimal_digits: i16,
    pub nullable: Nullability,
}

/// Which row a scrollable fetch moves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrientation {
    Next,
    Prior,
    First,
    Last,
    /// 1-based row number; negative counts from the end
    Absolute(isize),
    Relative(isize),
    /// Offset from the bookmark set with `FETCH_BOOKMARK_PTR`
    Bookmark(isize),
}

/// Where the driver writes one column of the fetched row.
pub struct Landing<'a> {
    /// Type the bytes are written as
    pub c_type: CDataType,
    pub data: RefMut<'a, [u8]>,
    /// Receives the full length of the value, or `NULL_DATA`
    pub indicator: &'a mut Len,
}

/// Supplier of landing zones for a fetch.
///
/// Implemented by records; the driver asks once per bound column while writing a row.
pub trait RowTarget {
    /// `None` when the target has no storage for `column`. Fails when the storage
    /// exists but cannot be written right now; the driver then fails the fetch.
    fn landing(&mut self, column: u16) -> Result<Option<Landing<'_>>>;
}

/// Statement-level calls of the driver-manager layer.
#[auto_impl(&mut, Box)]
pub trait Driver: DiagSource {
    /// Execute `sql` directly. A successful call leaves a result set (possibly empty) or
    /// a row count behind.
    fn exec_direct(&mut self, sql: &str) -> SqlResult<()>;

    fn num_result_cols(&mut self) -> SqlResult<i16>;

    /// Rows affected by the last DML statement; -1 when unknown.
    fn row_count(&mut self) -> SqlResult<Len>;

    /// Describe the 1-based `column`.
    fn describe_col(&mut self, column: u16) -> SqlResult<ColumnDescription>;

    /// Announce that `column` lands as `c_type` in a buffer of `buffer_len` bytes.
    fn bind_col(&mut self, column: u16, c_type: CDataType, buffer_len: usize) -> SqlResult<()>;

    fn unbind_cols(&mut self) -> SqlResult<()>;

    /// Move to the next row and write every bound column into `target`.
    fn fetch(&mut self, target: &mut dyn RowTarget) -> SqlResult<()>;

    fn fetch_scroll(
        &mut self,
        orientation: FetchOrientation,
        target: &mut dyn RowTarget,
    ) -> SqlResult<()>;

    fn cancel(&mut self) -> SqlResult<()>;

    fn close_cursor(&mut self) -> SqlResult<()>;

    fn set_attr(&mut self, attr: StatementAttribute, value: Len) -> SqlResult<()>;
}
