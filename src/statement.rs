use std::sync::atomic::{AtomicU64, Ordering};

use tracing::instrument;

use crate::constant::{CDataType, Len, StatementAttribute};
use crate::diagnostic::Diagnostic;
use crate::driver::{ColumnDescription, Driver, FetchOrientation};
use crate::error::{Error, Result};
use crate::gate::{SqlResult, Status, check};
use crate::opts::StatementOpts;
use crate::record::{Record, RecordId};

static NEXT_STATEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementId(u64);

impl StatementId {
    pub(crate) fn next() -> Self {
        Self(NEXT_STATEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NoStatementExecuted,
    /// An executed statement left a result set or a row count behind
    HasData,
}

/// A statement handle with the execute/fetch protocol on top of a [`Driver`].
///
/// Every driver call goes through [`check`]; [`Statement::diagnostic`] holds what the
/// last checked call reported. At most one record is bound at a time.
#[derive(Debug)]
pub struct Statement<D> {
    id: StatementId,
    driver: D,
    opts: StatementOpts,
    state: State,
    bound_record: Option<RecordId>,
    diagnostic: Diagnostic,
}

impl<D: Driver> Statement<D> {
    pub fn new(driver: D) -> Self {
        Self::with_opts(driver, StatementOpts::default())
    }

    pub fn with_opts(driver: D, opts: StatementOpts) -> Self {
        Self {
            id: StatementId::next(),
            driver,
            opts,
            state: State::NoStatementExecuted,
            bound_record: None,
            diagnostic: Diagnostic::default(),
        }
    }

    pub fn id(&self) -> StatementId {
        self.id
    }

    pub fn opts(&self) -> &StatementOpts {
        &self.opts
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    /// What the last checked driver call reported; empty after a plain success.
    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }

    /// Whether an executed statement's data is available
    pub fn has_data(&self) -> bool {
        self.state == State::HasData
    }

    /// Always use the scrollable fetch call, even for the next row.
    pub fn set_no_direct_fetch(&mut self, no_direct_fetch: bool) {
        self.opts.no_direct_fetch = no_direct_fetch;
    }

    fn check<T>(&mut self, ret: SqlResult<T>) -> Result<(Status, T)> {
        check(&self.driver, ret, &mut self.diagnostic)
    }

    fn require_data(&self) -> Result<()> {
        if self.has_data() {
            Ok(())
        } else {
            Err(Error::NoDataAvailable(
                "no SQL command was executed, the statement has no data available".to_string(),
            ))
        }
    }

    pub fn set_attr(&mut self, attr: StatementAttribute, value: Len) -> Result<Status> {
        let ret = self.driver.set_attr(attr, value);
        self.check(ret).map(|(status, ())| status)
    }

    /// Execute `sql`. On success the statement has data, whether or not rows came back.
    #[instrument(skip_all)]
    pub fn execute(&mut self, sql: &str) -> Result<Status> {
        self.state = State::NoStatementExecuted;
        let ret = self.driver.exec_direct(sql);
        let (status, ()) = self.check(ret)?;
        self.state = State::HasData;
        Ok(status)
    }

    pub fn begin(&mut self) -> Result<Status> {
        self.execute("BEGIN")
    }

    pub fn commit(&mut self) -> Result<Status> {
        self.execute("COMMIT")
    }

    pub fn rollback(&mut self) -> Result<Status> {
        self.execute("ROLLBACK")
    }

    /// Cancel the running statement. Its data is gone afterwards.
    pub fn cancel(&mut self) -> Result<Status> {
        self.require_data()?;
        self.state = State::NoStatementExecuted;
        let ret = self.driver.cancel();
        self.check(ret).map(|(status, ())| status)
    }

    pub fn close_cursor(&mut self) -> Result<Status> {
        self.require_data()?;
        self.state = State::NoStatementExecuted;
        let ret = self.driver.close_cursor();
        self.check(ret).map(|(status, ())| status)
    }

    /// Number of columns in the result set; 0 after a statement without one.
    pub fn cols(&mut self) -> Result<u16> {
        self.require_data()?;
        let ret = self.driver.num_result_cols();
        let (_, cols) = self.check(ret)?;
        u16::try_from(cols).map_err(|_| {
            Error::LibraryBug(crate::error::eyre!("driver reported {cols} result columns"))
        })
    }

    /// Rows affected by the executed statement; -1 when the driver does not know.
    pub fn rows(&mut self) -> Result<Len> {
        self.require_data()?;
        let ret = self.driver.row_count();
        self.check(ret).map(|(_, rows)| rows)
    }

    pub fn describe_column(&mut self, column: u16) -> Result<ColumnDescription> {
        let ret = self.driver.describe_col(column);
        self.check(ret).map(|(_, desc)| desc)
    }

    pub(crate) fn bind_col(&mut self, column: u16, c_type: CDataType, len: usize) -> Result<()> {
        let ret = self.driver.bind_col(column, c_type, len);
        self.check(ret).map(|_| ())
    }

    /// Fetch the next row into `record`. See [`Statement::fetch_scroll`].
    pub fn fetch<R: Record>(&mut self, record: &mut R) -> Result<bool> {
        self.fetch_scroll(record, FetchOrientation::Next)
    }

    /// Move the cursor and fill `record` with the row it lands on.
    ///
    /// The first fetch binds `record` to this statement. Returns `false` at the end of
    /// the result set, leaving the record's values from the previous row in place.
    /// Fails with [`Error::IncorrectUse`] without moving the cursor while the caller
    /// holds a borrow of a variable or buffer the row would be written to.
    #[instrument(skip_all, fields(statement = ?self.id, ?orientation))]
    pub fn fetch_scroll<R: Record>(
        &mut self,
        record: &mut R,
        orientation: FetchOrientation,
    ) -> Result<bool> {
        self.require_data()?;
        self.ensure_bound(record)?;
        record.ensure_writable()?;

        let ret = if orientation == FetchOrientation::Next && !self.opts.no_direct_fetch {
            self.driver.fetch(record)
        } else {
            self.driver.fetch_scroll(orientation, record)
        };
        if ret == SqlResult::NoData {
            self.diagnostic = Diagnostic::default();
            return Ok(false);
        }
        self.check(ret)?;
        record.finalize()?;
        Ok(true)
    }

    fn ensure_bound<R: Record>(&mut self, record: &mut R) -> Result<()> {
        if record.statement() == Some(self.id) && self.bound_record == Some(record.id()) {
            return Ok(());
        }
        if record.is_bound() {
            return Err(Error::IncorrectUse(
                "records can be used with at most one statement".to_string(),
            ));
        }
        if self.bound_record.is_some() {
            return Err(Error::IncorrectUse(
                "another record is already bound to this statement, unbind it first".to_string(),
            ));
        }

        if let Err(e) = record.bind_columns(self) {
            let ret = self.driver.unbind_cols();
            if let Err(unbind) = self.check(ret) {
                tracing::warn!(error = %unbind, "failed to release column bindings");
            }
            record.clear_binding();
            return Err(e);
        }
        record.set_statement(Some(self.id));
        self.bound_record = Some(record.id());
        tracing::debug!(record = ?record.id(), dynamic = record.is_dynamic(), "record bound");
        Ok(())
    }

    /// Release `record` so it can be bound to another statement.
    ///
    /// Unbinding a record that is not bound here is an error.
    pub fn unbind<R: Record>(&mut self, record: &mut R) -> Result<()> {
        if record.statement() != Some(self.id) || self.bound_record != Some(record.id()) {
            return Err(Error::IncorrectUse(
                "the record is not bound to this statement".to_string(),
            ));
        }
        let ret = self.driver.unbind_cols();
        record.clear_binding();
        self.bound_record = None;
        self.check(ret).map(|_| ())
    }
}
