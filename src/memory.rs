//! A scripted, in-process [`Driver`].
//!
//! Statements are matched by their exact text against result sets, row counts and
//! failures registered up front. Fetches convert the stored values to the bound C types
//! following the usual ODBC conversion rules, including truncation and the SQL states a
//! real driver reports for misuse.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use zerocopy::{Immutable, IntoBytes};

use crate::constant::{
    CDataType, CursorType, DiagField, HandleType, Len, NULL_DATA, SqlDataType, StatementAttribute,
};
use crate::diagnostic::{DiagRecord, DiagSource};
use crate::driver::{ColumnDescription, Driver, FetchOrientation, Nullability, RowTarget};
use crate::gate::SqlResult;
use crate::text::encode_wide;
use crate::value::{DateStruct, Guid, NumericStruct, TimeStruct, TimestampStruct};

const SERVER_NAME: &str = "memory";

/// A stored column value
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Integer(i64),
    Unsigned(u64),
    Double(f64),
    Text(String),
    Binary(Vec<u8>),
    Date(DateStruct),
    Time(TimeStruct),
    Timestamp(TimestampStruct),
    Numeric(NumericStruct),
    Guid(Guid),
}

macro_rules! impl_from_for_datum {
    ($($t:ty => $variant:ident $(as $conv:ty)?),+ $(,)?) => {
        $(
            impl From<$t> for Datum {
                fn from(value: $t) -> Self {
                    Datum::$variant(value $(as $conv)?)
                }
            }
        )+
    };
}

impl_from_for_datum!(
    i8 => Integer as i64,
    i16 => Integer as i64,
    i32 => Integer as i64,
    i64 => Integer,
    u8 => Unsigned as u64,
    u16 => Unsigned as u64,
    u32 => Unsigned as u64,
    u64 => Unsigned,
    f32 => Double as f64,
    f64 => Double,
    String => Text,
    Vec<u8> => Binary,
    DateStruct => Date,
    TimeStruct => Time,
    TimestampStruct => Timestamp,
    NumericStruct => Numeric,
    Guid => Guid,
);

impl From<&str> for Datum {
    fn from(value: &str) -> Self {
        Datum::Text(value.to_owned())
    }
}

impl From<&[u8]> for Datum {
    fn from(value: &[u8]) -> Self {
        Datum::Binary(value.to_vec())
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(value: Option<T>) -> Self {
        value.map_or(Datum::Null, Into::into)
    }
}

impl Datum {
    /// Text rendering used for character conversions
    fn render(&self) -> Option<String> {
        Some(match self {
            Datum::Null => return None,
            Datum::Integer(v) => v.to_string(),
            Datum::Unsigned(v) => v.to_string(),
            Datum::Double(v) => v.to_string(),
            Datum::Text(s) => s.clone(),
            Datum::Binary(bytes) => {
                let mut hex = String::with_capacity(bytes.len() * 2);
                for b in bytes {
                    let _ = write!(hex, "{b:02X}");
                }
                hex
            }
            Datum::Date(v) => v.to_string(),
            Datum::Time(v) => v.to_string(),
            Datum::Timestamp(v) => v.to_string(),
            Datum::Numeric(v) => v.to_string(),
            Datum::Guid(v) => v.to_string(),
        })
    }
}

/// A result set the driver serves for one statement text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryResultSet {
    columns: Vec<ColumnDescription>,
    rows: Vec<Vec<Datum>>,
}

impl MemoryResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column description
    pub fn column(
        mut self,
        name: &str,
        data_type: SqlDataType,
        column_size: usize,
        decimal_digits: i16,
    ) -> Self {
        self.columns.push(ColumnDescription {
            name: name.to_owned(),
            data_type,
            column_size,
            decimal_digits,
            nullable: Nullability::Nullable,
        });
        self
    }

    /// Append a row; missing trailing values are NULL
    pub fn row<I>(mut self, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Datum>,
    {
        self.rows.push(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn columns(&self) -> &[ColumnDescription] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Datum>] {
        &self.rows
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Rows(MemoryResultSet),
    Count(Len),
    Fail(Vec<DiagRecord>),
}

#[derive(Debug, Clone)]
struct Response {
    outcome: Outcome,
    warnings: Vec<DiagRecord>,
}

#[derive(Debug)]
enum Current {
    /// `position` 0 is before the first row, `rows + 1` after the last
    Cursor {
        rs: MemoryResultSet,
        position: usize,
    },
    Count(Len),
}

/// In-memory statement handle
#[derive(Debug, Default)]
pub struct MemoryDriver {
    responses: HashMap<String, Response>,
    rejected: Vec<CDataType>,
    attrs: HashMap<StatementAttribute, Len>,
    current: Option<Current>,
    bindings: BTreeMap<u16, (CDataType, usize)>,
    pending: Vec<DiagRecord>,
    cancelled: bool,
    executed: Vec<String>,
    fetch_calls: usize,
    fetch_scroll_calls: usize,
}

/// A driver-generated diagnostic record
fn state(sql_state: &str, message: &str) -> DiagRecord {
    DiagRecord {
        server: SERVER_NAME.to_string(),
        connection_name: SERVER_NAME.to_string(),
        message: message.to_string(),
        sql_state: sql_state.to_string(),
        native_error: 0,
    }
}

fn out_of_range() -> DiagRecord {
    state("22003", "Numeric value out of range")
}

fn restricted() -> DiagRecord {
    state("07006", "Restricted data type attribute violation")
}

fn buffer_too_small() -> DiagRecord {
    state("HY090", "Invalid string or buffer length")
}

fn sequence_error() -> DiagRecord {
    state("HY010", "Function sequence error")
}

fn invalid_cursor() -> DiagRecord {
    state("24000", "Invalid cursor state")
}

fn is_transaction_command(sql: &str) -> bool {
    ["BEGIN", "COMMIT", "ROLLBACK"]
        .iter()
        .any(|cmd| sql.eq_ignore_ascii_case(cmd))
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn respond(&mut self, sql: &str, outcome: Outcome) -> &mut Response {
        let response = self
            .responses
            .entry(sql.trim().to_owned())
            .or_insert_with(|| Response {
                outcome: Outcome::Count(0),
                warnings: Vec::new(),
            });
        response.outcome = outcome;
        response
    }

    /// Serve `rs` when `sql` is executed
    pub fn with_result_set(mut self, sql: &str, rs: MemoryResultSet) -> Self {
        self.respond(sql, Outcome::Rows(rs));
        self
    }

    /// Report `rows` affected rows when `sql` is executed
    pub fn with_row_count(mut self, sql: &str, rows: Len) -> Self {
        self.respond(sql, Outcome::Count(rows));
        self
    }

    /// Fail the execution of `sql` with `record`; repeated calls add records
    pub fn with_error(mut self, sql: &str, record: DiagRecord) -> Self {
        let key = sql.trim();
        let mut records = match self.responses.get(key).map(|r| &r.outcome) {
            Some(Outcome::Fail(records)) => records.clone(),
            _ => Vec::new(),
        };
        records.push(record);
        self.respond(sql, Outcome::Fail(records));
        self
    }

    /// Execute `sql` with success-with-info carrying `record`
    pub fn with_warning(mut self, sql: &str, record: DiagRecord) -> Self {
        let key = sql.trim().to_owned();
        self.responses
            .entry(key)
            .or_insert_with(|| Response {
                outcome: Outcome::Count(0),
                warnings: Vec::new(),
            })
            .warnings
            .push(record);
        self
    }

    /// Refuse to bind columns as `c_type`
    pub fn reject_c_type(mut self, c_type: CDataType) -> Self {
        self.rejected.push(c_type);
        self
    }

    /// Column bindings currently registered: column -> (C type, buffer length)
    pub fn bindings(&self) -> &BTreeMap<u16, (CDataType, usize)> {
        &self.bindings
    }

    /// Statement texts passed to `exec_direct`, in order
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls
    }

    pub fn fetch_scroll_calls(&self) -> usize {
        self.fetch_scroll_calls
    }

    pub fn attr(&self, attr: StatementAttribute) -> Option<Len> {
        self.attrs.get(&attr).copied()
    }

    /// Current cursor position, `None` without an open cursor
    pub fn position(&self) -> Option<usize> {
        match &self.current {
            Some(Current::Cursor { position, .. }) => Some(*position),
            _ => None,
        }
    }

    fn fail<T>(&mut self, record: DiagRecord) -> SqlResult<T> {
        self.pending.push(record);
        SqlResult::Error
    }

    fn is_scrollable(&self) -> bool {
        self.attr(StatementAttribute::CURSOR_TYPE)
            .is_some_and(|t| t != CursorType::FORWARD_ONLY)
    }

    fn cursor(&self) -> Result<&MemoryResultSet, DiagRecord> {
        match &self.current {
            Some(Current::Cursor { rs, .. }) => Ok(rs),
            Some(Current::Count(_)) => Err(state(
                "07005",
                "Prepared statement not a cursor-specification",
            )),
            None => Err(sequence_error()),
        }
    }

    fn visible_rows(&self, rs: &MemoryResultSet) -> usize {
        match self.attr(StatementAttribute::MAX_ROWS) {
            Some(max) if max > 0 => rs.rows.len().min(max as usize),
            _ => rs.rows.len(),
        }
    }

    fn move_and_write(
        &mut self,
        orientation: FetchOrientation,
        target: &mut dyn RowTarget,
    ) -> SqlResult<()> {
        if self.cancelled {
            return self.fail(state("HY008", "Operation canceled"));
        }
        let (rows, position) = match &self.current {
            Some(Current::Cursor { rs, position }) => (self.visible_rows(rs), *position),
            _ => return self.fail(invalid_cursor()),
        };
        let bookmark = self.attr(StatementAttribute::FETCH_BOOKMARK_PTR).unwrap_or(0);

        let rows_i = rows as isize;
        let current = position as isize;
        let wanted = match orientation {
            FetchOrientation::Next => current.checked_add(1),
            FetchOrientation::Prior => current.checked_sub(1),
            FetchOrientation::First => Some(1),
            FetchOrientation::Last => Some(rows_i),
            FetchOrientation::Absolute(n) if n < 0 => {
                rows_i.checked_add(1).and_then(|r| r.checked_add(n))
            }
            FetchOrientation::Absolute(n) => Some(n),
            FetchOrientation::Relative(d) => current.checked_add(d),
            FetchOrientation::Bookmark(offset) => bookmark.checked_add(offset),
        };
        // An overflowing move lands before the first row or after the last one.
        let wanted = wanted.unwrap_or(match orientation {
            FetchOrientation::Relative(d) | FetchOrientation::Bookmark(d) if d < 0 => 0,
            _ => isize::MAX,
        });

        let Some(Current::Cursor { rs, position }) = &mut self.current else {
            return self.fail(invalid_cursor());
        };
        if wanted < 1 || rows == 0 {
            *position = 0;
            return SqlResult::NoData;
        }
        if wanted > rows_i {
            *position = rows + 1;
            return SqlResult::NoData;
        }
        *position = wanted as usize;
        let row = &rs.rows[*position - 1];

        let mut warnings = Vec::new();
        for (&column, &(c_type, _)) in &self.bindings {
            let landing = match target.landing(column) {
                Ok(Some(landing)) => landing,
                Ok(None) => continue,
                Err(err) => {
                    self.pending.extend(err.diagnostic().records().iter().cloned());
                    return SqlResult::Error;
                }
            };
            let datum = row.get(usize::from(column) - 1).unwrap_or(&Datum::Null);
            let mut data = landing.data;
            match convert(datum, c_type, &mut data) {
                Ok((len, warning)) => {
                    *landing.indicator = len;
                    warnings.extend(warning);
                }
                Err(record) => {
                    self.pending.push(record);
                    return SqlResult::Error;
                }
            }
        }
        if warnings.is_empty() {
            SqlResult::Success(())
        } else {
            self.pending.extend(warnings);
            SqlResult::SuccessWithInfo(())
        }
    }
}

/// Write `datum` into `out` as `c_type`.
///
/// Returns the indicator value and an optional warning.
fn convert(
    datum: &Datum,
    c_type: CDataType,
    out: &mut [u8],
) -> Result<(Len, Option<DiagRecord>), DiagRecord> {
    if *datum == Datum::Null {
        return Ok((NULL_DATA, None));
    }
    match c_type {
        CDataType::CHAR => {
            let text = datum.render().unwrap_or_default();
            put_text(out, text.as_bytes(), 1)
        }
        CDataType::WCHAR => {
            let text = datum.render().unwrap_or_default();
            put_text(out, &encode_wide(&text), 2)
        }
        CDataType::BINARY => {
            let bytes: &[u8] = match datum {
                Datum::Binary(b) => b,
                Datum::Text(s) => s.as_bytes(),
                Datum::Guid(g) => g.as_bytes(),
                _ => return Err(restricted()),
            };
            let n = bytes.len().min(out.len());
            out[..n].copy_from_slice(&bytes[..n]);
            let warning = (bytes.len() > out.len()).then(truncated);
            Ok((bytes.len() as Len, warning))
        }
        CDataType::TINYINT
        | CDataType::STINYINT
        | CDataType::UTINYINT
        | CDataType::BIT
        | CDataType::SHORT
        | CDataType::SSHORT
        | CDataType::USHORT
        | CDataType::LONG
        | CDataType::SLONG
        | CDataType::ULONG
        | CDataType::SBIGINT
        | CDataType::UBIGINT => {
            let (value, warning) = integer_of(datum)?;
            put_integer(out, value, c_type).map(|len| (len, warning))
        }
        CDataType::FLOAT => put(out, &(float_of(datum)? as f32)).map(|len| (len, None)),
        CDataType::DOUBLE => put(out, &float_of(datum)?).map(|len| (len, None)),
        CDataType::DATE | CDataType::TYPE_DATE => {
            let date = match datum {
                Datum::Date(d) => *d,
                Datum::Timestamp(ts) => ts.date(),
                _ => return Err(restricted()),
            };
            put(out, &date).map(|len| (len, None))
        }
        CDataType::TIME | CDataType::TYPE_TIME => {
            let time = match datum {
                Datum::Time(t) => *t,
                Datum::Timestamp(ts) => ts.time(),
                _ => return Err(restricted()),
            };
            put(out, &time).map(|len| (len, None))
        }
        CDataType::TIMESTAMP | CDataType::TYPE_TIMESTAMP => {
            let ts = match datum {
                Datum::Timestamp(ts) => *ts,
                Datum::Date(d) => TimestampStruct::from(*d),
                _ => return Err(restricted()),
            };
            put(out, &ts).map(|len| (len, None))
        }
        CDataType::NUMERIC => {
            let numeric = match datum {
                Datum::Numeric(n) => *n,
                Datum::Integer(v) => NumericStruct::new(i128::from(*v), 19, 0),
                Datum::Unsigned(v) => NumericStruct::new(i128::from(*v), 20, 0),
                _ => return Err(restricted()),
            };
            put(out, &numeric).map(|len| (len, None))
        }
        CDataType::GUID => match datum {
            Datum::Guid(g) => put(out, g).map(|len| (len, None)),
            _ => Err(restricted()),
        },
        _ => Err(restricted()),
    }
}

fn truncated() -> DiagRecord {
    state("01004", "String data, right truncated")
}

/// Copy a fixed-width value
fn put<T: IntoBytes + Immutable>(out: &mut [u8], value: &T) -> Result<Len, DiagRecord> {
    let bytes = value.as_bytes();
    let dst = out.get_mut(..bytes.len()).ok_or_else(buffer_too_small)?;
    dst.copy_from_slice(bytes);
    Ok(bytes.len() as Len)
}

/// Copy character data of `unit`-sized characters and terminate it.
fn put_text(
    out: &mut [u8],
    encoded: &[u8],
    unit: usize,
) -> Result<(Len, Option<DiagRecord>), DiagRecord> {
    let room = out.len().checked_sub(unit).ok_or_else(buffer_too_small)?;
    let n = encoded.len().min(room);
    let n = n - n % unit;
    out[..n].copy_from_slice(&encoded[..n]);
    out[n..n + unit].fill(0);
    let warning = (encoded.len() > room).then(truncated);
    Ok((encoded.len() as Len, warning))
}

fn integer_of(datum: &Datum) -> Result<(i128, Option<DiagRecord>), DiagRecord> {
    match datum {
        Datum::Integer(v) => Ok((i128::from(*v), None)),
        Datum::Unsigned(v) => Ok((i128::from(*v), None)),
        Datum::Double(v) if v.is_finite() => {
            let whole = v.trunc();
            let warning = (whole != *v).then(|| state("01S07", "Fractional truncation"));
            Ok((whole as i128, warning))
        }
        Datum::Text(s) => s
            .trim()
            .parse()
            .map(|v| (v, None))
            .map_err(|_| state("22018", "Invalid character value for cast specification")),
        Datum::Numeric(n) if n.scale == 0 => {
            n.unscaled().map(|v| (v, None)).ok_or_else(out_of_range)
        }
        Datum::Double(_) => Err(out_of_range()),
        _ => Err(restricted()),
    }
}

fn put_integer(out: &mut [u8], value: i128, c_type: CDataType) -> Result<Len, DiagRecord> {
    macro_rules! narrow {
        ($t:ty) => {
            put(out, &<$t>::try_from(value).map_err(|_| out_of_range())?)
        };
    }
    match c_type {
        CDataType::TINYINT | CDataType::STINYINT => narrow!(i8),
        CDataType::UTINYINT => narrow!(u8),
        CDataType::BIT if value == 0 || value == 1 => narrow!(u8),
        CDataType::BIT => Err(out_of_range()),
        CDataType::SHORT | CDataType::SSHORT => narrow!(i16),
        CDataType::USHORT => narrow!(u16),
        CDataType::LONG | CDataType::SLONG => narrow!(i32),
        CDataType::ULONG => narrow!(u32),
        CDataType::SBIGINT => narrow!(i64),
        CDataType::UBIGINT => narrow!(u64),
        _ => Err(restricted()),
    }
}

fn float_of(datum: &Datum) -> Result<f64, DiagRecord> {
    match datum {
        Datum::Double(v) => Ok(*v),
        Datum::Integer(v) => Ok(*v as f64),
        Datum::Unsigned(v) => Ok(*v as f64),
        Datum::Numeric(n) => n
            .unscaled()
            .map(|v| v as f64 / 10f64.powi(i32::from(n.scale)))
            .ok_or_else(out_of_range),
        Datum::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| state("22018", "Invalid character value for cast specification")),
        _ => Err(restricted()),
    }
}

impl DiagSource for MemoryDriver {
    fn handle_type(&self) -> HandleType {
        HandleType::Stmt
    }

    fn diag_string(&self, record: i16, field: DiagField) -> SqlResult<String> {
        let Some(diag) = usize::try_from(record)
            .ok()
            .and_then(|r| r.checked_sub(1))
            .and_then(|idx| self.pending.get(idx))
        else {
            return SqlResult::NoData;
        };
        let value = match field {
            DiagField::ServerName => diag.server.clone(),
            DiagField::ConnectionName => diag.connection_name.clone(),
            DiagField::MessageText => diag.message.clone(),
            DiagField::SqlState => diag.sql_state.clone(),
            DiagField::ClassOrigin => "ISO 9075".to_string(),
            _ => return SqlResult::Error,
        };
        SqlResult::Success(value)
    }

    fn diag_integer(&self, record: i16, field: DiagField) -> SqlResult<i32> {
        match (record, field) {
            (0, DiagField::Number) => SqlResult::Success(self.pending.len() as i32),
            (_, DiagField::Native) => usize::try_from(record)
                .ok()
                .and_then(|r| r.checked_sub(1))
                .and_then(|idx| self.pending.get(idx))
                .map_or(SqlResult::NoData, |diag| SqlResult::Success(diag.native_error)),
            _ => SqlResult::Error,
        }
    }

    fn diag_length(&self, record: i16, field: DiagField) -> SqlResult<Len> {
        match (record, field, &self.current) {
            (0, DiagField::RowCount, Some(Current::Count(rows))) => SqlResult::Success(*rows),
            _ => SqlResult::Error,
        }
    }
}

impl Driver for MemoryDriver {
    fn exec_direct(&mut self, sql: &str) -> SqlResult<()> {
        self.pending.clear();
        tracing::trace!(sql, "exec_direct");
        if matches!(self.current, Some(Current::Cursor { .. })) {
            return self.fail(invalid_cursor());
        }
        let sql = sql.trim();
        self.executed.push(sql.to_owned());
        self.cancelled = false;

        let response = match self.responses.get(sql) {
            Some(response) => response.clone(),
            None if is_transaction_command(sql) => Response {
                outcome: Outcome::Count(0),
                warnings: Vec::new(),
            },
            None => {
                self.current = None;
                return self.fail(state(
                    "42000",
                    &format!("Syntax error or access violation: unknown statement '{sql}'"),
                ));
            }
        };

        self.current = match response.outcome {
            Outcome::Rows(rs) => Some(Current::Cursor { rs, position: 0 }),
            Outcome::Count(rows) => Some(Current::Count(rows)),
            Outcome::Fail(records) => {
                self.current = None;
                self.pending = records;
                return SqlResult::Error;
            }
        };
        if response.warnings.is_empty() {
            SqlResult::Success(())
        } else {
            self.pending = response.warnings;
            SqlResult::SuccessWithInfo(())
        }
    }

    fn num_result_cols(&mut self) -> SqlResult<i16> {
        self.pending.clear();
        match &self.current {
            Some(Current::Cursor { rs, .. }) => {
                SqlResult::Success(i16::try_from(rs.columns.len()).unwrap_or(i16::MAX))
            }
            Some(Current::Count(_)) => SqlResult::Success(0),
            None => self.fail(sequence_error()),
        }
    }

    fn row_count(&mut self) -> SqlResult<Len> {
        self.pending.clear();
        match &self.current {
            Some(Current::Cursor { .. }) => SqlResult::Success(-1),
            Some(Current::Count(rows)) => SqlResult::Success(*rows),
            None => self.fail(sequence_error()),
        }
    }

    fn describe_col(&mut self, column: u16) -> SqlResult<ColumnDescription> {
        self.pending.clear();
        let desc = match self.cursor() {
            Ok(rs) => usize::from(column)
                .checked_sub(1)
                .and_then(|idx| rs.columns.get(idx))
                .cloned()
                .ok_or_else(|| state("07009", "Invalid descriptor index")),
            Err(record) => Err(record),
        };
        match desc {
            Ok(desc) => SqlResult::Success(desc),
            Err(record) => self.fail(record),
        }
    }

    fn bind_col(&mut self, column: u16, c_type: CDataType, buffer_len: usize) -> SqlResult<()> {
        self.pending.clear();
        if column == 0 {
            return self.fail(state("07009", "Invalid descriptor index"));
        }
        if let Some(Current::Cursor { rs, .. }) = &self.current {
            if usize::from(column) > rs.columns.len() {
                return self.fail(state("07009", "Invalid descriptor index"));
            }
        }
        if self.rejected.contains(&c_type) {
            return self.fail(state("HY003", "Program type out of range"));
        }
        self.bindings.insert(column, (c_type, buffer_len));
        SqlResult::Success(())
    }

    fn unbind_cols(&mut self) -> SqlResult<()> {
        self.pending.clear();
        self.bindings.clear();
        SqlResult::Success(())
    }

    fn fetch(&mut self, target: &mut dyn RowTarget) -> SqlResult<()> {
        self.pending.clear();
        self.fetch_calls += 1;
        self.move_and_write(FetchOrientation::Next, target)
    }

    fn fetch_scroll(
        &mut self,
        orientation: FetchOrientation,
        target: &mut dyn RowTarget,
    ) -> SqlResult<()> {
        self.pending.clear();
        self.fetch_scroll_calls += 1;
        if orientation != FetchOrientation::Next && !self.is_scrollable() {
            return self.fail(state("HY106", "Fetch type out of range"));
        }
        self.move_and_write(orientation, target)
    }

    fn cancel(&mut self) -> SqlResult<()> {
        self.pending.clear();
        if matches!(self.current, Some(Current::Cursor { .. })) {
            self.current = None;
            self.cancelled = true;
        }
        SqlResult::Success(())
    }

    fn close_cursor(&mut self) -> SqlResult<()> {
        self.pending.clear();
        if !matches!(self.current, Some(Current::Cursor { .. })) {
            return self.fail(invalid_cursor());
        }
        self.current = None;
        SqlResult::Success(())
    }

    fn set_attr(&mut self, attr: StatementAttribute, value: Len) -> SqlResult<()> {
        self.pending.clear();
        match attr {
            StatementAttribute::CURSOR_TYPE
                if !(CursorType::FORWARD_ONLY..=CursorType::STATIC).contains(&value) =>
            {
                self.fail(state("HY024", "Invalid attribute value"))
            }
            StatementAttribute::QUERY_TIMEOUT
            | StatementAttribute::MAX_ROWS
            | StatementAttribute::CURSOR_TYPE
            | StatementAttribute::CONCURRENCY
            | StatementAttribute::USE_BOOKMARKS
            | StatementAttribute::FETCH_BOOKMARK_PTR => {
                self.attrs.insert(attr, value);
                SqlResult::Success(())
            }
            _ => self.fail(state("HY092", "Invalid attribute/option identifier")),
        }
    }
}
