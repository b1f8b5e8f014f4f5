//! Record binders: the bridge between a result set's columns and host storage.
//!
//! A [`StaticRecord`] fills variables the caller registered ahead of time. A
//! [`DynamicRecord`] discovers the columns when it is bound and keeps every value in a
//! buffer it owns. Either kind is bound lazily by the first
//! [`Statement::fetch`](crate::statement::Statement::fetch) and stays bound to that
//! statement until [`Statement::unbind`](crate::statement::Statement::unbind).

mod binding;
mod dynamic;
mod static_record;

use std::sync::atomic::{AtomicU64, Ordering};

pub use dynamic::DynamicRecord;
pub use static_record::StaticRecord;

use crate::driver::{Driver, RowTarget};
use crate::error::Result;
use crate::statement::{Statement, StatementId};

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(u64);

impl RecordId {
    pub(crate) fn next() -> Self {
        Self(NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A column addressed by name or by 1-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRef<'a> {
    Name(&'a str),
    Index(u16),
}

impl<'a> From<&'a str> for ColumnRef<'a> {
    fn from(name: &'a str) -> Self {
        ColumnRef::Name(name)
    }
}

impl<'a> From<&'a String> for ColumnRef<'a> {
    fn from(name: &'a String) -> Self {
        ColumnRef::Name(name)
    }
}

impl From<u16> for ColumnRef<'_> {
    fn from(index: u16) -> Self {
        ColumnRef::Index(index)
    }
}

/// What a registration did to the record's column map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The key was not registered before
    New,
    /// The key was registered before; the previous binding is gone
    Replaced,
}

/// Operations [`Statement`] drives on a record.
pub trait Record: RowTarget {
    fn id(&self) -> RecordId;

    fn is_dynamic(&self) -> bool;

    /// The statement this record is bound to.
    fn statement(&self) -> Option<StatementId>;

    fn is_bound(&self) -> bool {
        self.statement().is_some()
    }

    /// Attach every column of the current result set of `stmt` to this record's storage.
    fn bind_columns<D: Driver>(&mut self, stmt: &mut Statement<D>) -> Result<()>;

    /// Fails if the caller still holds a borrow of storage a fetch writes to.
    fn ensure_writable(&self) -> Result<()>;

    /// Copy the freshly fetched row out of the landing zones into host storage.
    fn finalize(&mut self) -> Result<()>;

    #[doc(hidden)]
    fn set_statement(&mut self, stmt: Option<StatementId>);

    /// Forget the column bindings made by `bind_columns`.
    #[doc(hidden)]
    fn clear_binding(&mut self);
}
