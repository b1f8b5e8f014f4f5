use std::collections::HashMap;

use super::binding::{ColumnBinding, ColumnKey, binary_len};
use super::{ColumnRef, Record, RecordId};
use crate::buffer::OwnedBuffer;
use crate::constant::{CDataType, Len, SqlDataType};
use crate::driver::{ColumnDescription, Driver, Landing, RowTarget};
use crate::error::{Error, Result, eyre};
use crate::opts::StatementOpts;
use crate::statement::{Statement, StatementId};
use crate::text::{data_len, decode_narrow, decode_wide};
use crate::value::CValue;

#[derive(Debug)]
struct DynamicColumn {
    binding: ColumnBinding,
    name: String,
    sql_type: SqlDataType,
    column_size: usize,
    decimal_digits: i16,
}

/// A record that discovers its columns when it is bound and owns a buffer for each.
///
/// Values are read back through typed accessors after every fetch. Every bind
/// describes the result set again and allocates fresh buffers, so the same record can
/// follow result sets of different shapes.
#[derive(Debug)]
pub struct DynamicRecord {
    id: RecordId,
    statement: Option<StatementId>,
    columns: Vec<DynamicColumn>,
    by_name: HashMap<String, usize>,
}

impl Default for DynamicRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicRecord {
    pub fn new() -> Self {
        Self {
            id: RecordId::next(),
            statement: None,
            columns: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Number of columns found at the last bind
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn column<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<&DynamicColumn> {
        match key.into() {
            ColumnRef::Name(name) => self
                .by_name
                .get(name)
                .and_then(|&slot| self.columns.get(slot))
                .ok_or_else(|| {
                    Error::NotFound(format!("the column \"{name}\" was not found in this record"))
                }),
            ColumnRef::Index(index) => usize::from(index)
                .checked_sub(1)
                .and_then(|slot| self.columns.get(slot))
                .ok_or_else(|| {
                    Error::NotFound("there is not that many columns in this record".to_string())
                }),
        }
    }

    /// Whether a column is reachable under `name`
    pub fn exists(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn column_name(&self, index: u16) -> Result<&str> {
        self.column(index).map(|c| c.name.as_str())
    }

    /// 1-based number of the first column called `name`
    pub fn column_number(&self, name: &str) -> Result<u16> {
        self.by_name
            .get(name)
            .map(|&slot| slot as u16 + 1)
            .ok_or_else(|| {
                Error::NotFound(format!("the column \"{name}\" was not found in this record"))
            })
    }

    pub fn get_type<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<SqlDataType> {
        self.column(key).map(|c| c.sql_type)
    }

    pub fn get_decimal_digits<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<i16> {
        self.column(key).map(|c| c.decimal_digits)
    }

    /// Whether the column was NULL in the last fetched row
    pub fn get_is_null<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<bool> {
        self.column(key).map(|c| c.binding.is_null())
    }

    /// Declared size or precision of the column
    pub fn get_size<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<usize> {
        self.column(key).map(|c| c.column_size)
    }

    /// Length the driver reported for the column in the last fetched row
    pub fn get_fetched_size<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<Len> {
        self.column(key).map(|c| c.binding.fetched_size)
    }

    /// Type the column was bound as
    pub fn get_bind_type<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<CDataType> {
        self.column(key).map(|c| c.binding.c_type)
    }

    /// A shared handle to the column's landing buffer.
    pub fn buffer<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<OwnedBuffer> {
        landing_buffer(self.column(key)?)
    }

    /// Read a fixed-width value.
    pub fn get<'a, T: CValue>(&self, key: impl Into<ColumnRef<'a>>) -> Result<T> {
        let column = self.readable(key, T::C_TYPE)?;
        let buffer = landing_buffer(column)?;
        let bytes = buffer.bytes();
        T::read_from_prefix(&bytes[..])
            .map(|(value, _)| value)
            .map_err(|_| {
                Error::LibraryBug(eyre!(
                    "buffer of column \"{}\" holds {} bytes, less than a {}",
                    column.name,
                    bytes.len(),
                    std::any::type_name::<T>()
                ))
            })
    }

    /// Read a column bound as narrow character data.
    pub fn get_string<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<String> {
        self.get_text(key, CDataType::CHAR)
    }

    /// Read a column bound as wide character data.
    pub fn get_wide_string<'a>(&self, key: impl Into<ColumnRef<'a>>) -> Result<String> {
        self.get_text(key, CDataType::WCHAR)
    }

    fn get_text<'a>(&self, key: impl Into<ColumnRef<'a>>, c_type: CDataType) -> Result<String> {
        let column = self.readable(key, c_type)?;
        let buffer = landing_buffer(column)?;
        let bytes = buffer.bytes();
        let len = data_len(column.binding.fetched_size, bytes.len(), c_type.unit_size());
        Ok(if c_type == CDataType::WCHAR {
            decode_wide(&bytes[..len])
        } else {
            decode_narrow(&bytes[..len])
        })
    }

    /// Copy the raw landing bytes of a column into `out`, whatever its type.
    ///
    /// Copies `min(out.len(), fetched size)` bytes and returns how many were copied.
    pub fn get_binary<'a>(&self, key: impl Into<ColumnRef<'a>>, out: &mut [u8]) -> Result<usize> {
        let column = self.column(key)?;
        if column.binding.is_null() {
            return Err(null_column());
        }
        let buffer = landing_buffer(column)?;
        let bytes = buffer.bytes();
        let len = binary_len(column.binding.fetched_size, bytes.len()).min(out.len());
        out[..len].copy_from_slice(&bytes[..len]);
        Ok(len)
    }

    /// Resolve `key`, then check the requested type and NULL.
    fn readable<'a>(
        &self,
        key: impl Into<ColumnRef<'a>>,
        requested: CDataType,
    ) -> Result<&DynamicColumn> {
        let column = self.column(key)?;
        if !compatible(requested, column.binding.c_type) {
            return Err(Error::TypeMismatch(format!(
                "column \"{}\" is bound as {:?} and cannot be read as {:?}",
                column.name, column.binding.c_type, requested
            )));
        }
        if column.binding.is_null() {
            return Err(null_column());
        }
        Ok(column)
    }
}

fn landing_buffer(column: &DynamicColumn) -> Result<OwnedBuffer> {
    column.binding.buffer().cloned().ok_or_else(|| {
        Error::LibraryBug(eyre!("column \"{}\" has no landing buffer", column.name))
    })
}

fn null_column() -> Error {
    Error::NoDataAvailable("this column is NULL and cannot be retrieved".to_string())
}

/// Whether a value bound as `bound` may be read as `requested`.
fn compatible(requested: CDataType, bound: CDataType) -> bool {
    if requested == bound {
        return true;
    }
    match requested {
        CDataType::CHAR => bound == CDataType::from(SqlDataType::VARCHAR),
        CDataType::DATE | CDataType::TYPE_DATE => {
            matches!(bound, CDataType::DATE | CDataType::TYPE_DATE)
        }
        CDataType::TIME | CDataType::TYPE_TIME => {
            matches!(bound, CDataType::TIME | CDataType::TYPE_TIME)
        }
        CDataType::TIMESTAMP | CDataType::TYPE_TIMESTAMP => {
            matches!(bound, CDataType::TIMESTAMP | CDataType::TYPE_TIMESTAMP)
        }
        _ => false,
    }
}

/// C type and landing size for a described column.
fn binding_for(desc: &ColumnDescription, opts: &StatementOpts) -> (CDataType, usize) {
    let chars = if desc.column_size == 0 {
        opts.string_capacity
    } else {
        desc.column_size
    };
    match desc.data_type {
        SqlDataType::VARCHAR
        | SqlDataType::LONGVARCHAR
        | SqlDataType::BINARY
        | SqlDataType::VARBINARY
        | SqlDataType::LONGVARBINARY
        | SqlDataType::GUID
        | SqlDataType::DECIMAL
        | SqlDataType::CHAR => (CDataType::CHAR, chars + 1),
        SqlDataType::WCHAR | SqlDataType::WVARCHAR | SqlDataType::WLONGVARCHAR => {
            (CDataType::WCHAR, (chars + 1) * 2)
        }
        SqlDataType::BIGINT => (CDataType::SBIGINT, size_of::<i64>()),
        SqlDataType::FLOAT => (CDataType::DOUBLE, size_of::<f64>()),
        other => {
            let c_type = CDataType::from(other);
            let size = c_type
                .fixed_size()
                .map_or(chars, |fixed| fixed.max(desc.column_size));
            (c_type, size)
        }
    }
}

fn truncate_name(mut name: String, max: usize) -> String {
    if name.len() > max {
        let mut end = max;
        while !name.is_char_boundary(end) {
            end -= 1;
        }
        name.truncate(end);
    }
    name
}

impl RowTarget for DynamicRecord {
    fn landing(&mut self, column: u16) -> Result<Option<Landing<'_>>> {
        let slot = usize::from(column).checked_sub(1);
        match slot.and_then(|slot| self.columns.get_mut(slot)) {
            Some(column) => column.binding.landing(),
            None => Ok(None),
        }
    }
}

impl Record for DynamicRecord {
    fn id(&self) -> RecordId {
        self.id
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn statement(&self) -> Option<StatementId> {
        self.statement
    }

    #[tracing::instrument(skip_all, fields(record = ?self.id))]
    fn bind_columns<D: Driver>(&mut self, stmt: &mut Statement<D>) -> Result<()> {
        self.columns.clear();
        self.by_name.clear();

        let cols = stmt.cols()?;
        for column in 1..=cols {
            let desc = stmt.describe_column(column)?;
            let (c_type, size) = binding_for(&desc, stmt.opts());
            stmt.bind_col(column, c_type, size)?;

            let name = truncate_name(desc.name, stmt.opts().max_column_name_len);
            let slot = self.columns.len();
            if !name.is_empty() {
                self.by_name.entry(name.clone()).or_insert(slot);
            }
            tracing::trace!(column, %name, ?c_type, size, "bound column");
            self.columns.push(DynamicColumn {
                binding: ColumnBinding::buffered(ColumnKey::Index(column), c_type, size),
                name,
                sql_type: desc.data_type,
                column_size: desc.column_size,
                decimal_digits: desc.decimal_digits,
            });
        }
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        self.columns
            .iter()
            .try_for_each(|column| column.binding.ensure_writable())
    }

    /// Values stay in the owned buffers until an accessor reads them.
    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_statement(&mut self, stmt: Option<StatementId>) {
        self.statement = stmt;
    }

    fn clear_binding(&mut self) {
        self.statement = None;
        self.columns.clear();
        self.by_name.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Nullability;
    use pretty_assertions::assert_eq;

    fn desc(data_type: SqlDataType, column_size: usize) -> ColumnDescription {
        ColumnDescription {
            name: "c".to_string(),
            data_type,
            column_size,
            decimal_digits: 0,
            nullable: Nullability::Unknown,
        }
    }

    #[test]
    fn binding_table() {
        let opts = StatementOpts::default();
        let cases = [
            (SqlDataType::VARCHAR, 10, CDataType::CHAR, 11),
            (SqlDataType::CHAR, 5, CDataType::CHAR, 6),
            (SqlDataType::DECIMAL, 12, CDataType::CHAR, 13),
            (SqlDataType::GUID, 36, CDataType::CHAR, 37),
            (SqlDataType::WVARCHAR, 4, CDataType::WCHAR, 10),
            (SqlDataType::BIGINT, 19, CDataType::SBIGINT, 8),
            (SqlDataType::FLOAT, 15, CDataType::DOUBLE, 8),
            (SqlDataType::INTEGER, 10, CDataType::LONG, 10),
            (SqlDataType::SMALLINT, 0, CDataType::SHORT, 2),
            (SqlDataType::NUMERIC, 10, CDataType::NUMERIC, 19),
            (SqlDataType::TYPE_TIMESTAMP, 0, CDataType::TYPE_TIMESTAMP, 16),
            (SqlDataType::LONGVARCHAR, 0, CDataType::CHAR, 8193),
        ];
        for (sql, size, c_type, len) in cases {
            assert_eq!(binding_for(&desc(sql, size), &opts), (c_type, len), "{sql:?}");
        }
    }

    #[test]
    fn compatibility() {
        assert!(compatible(CDataType::LONG, CDataType::LONG));
        assert!(compatible(CDataType::DATE, CDataType::TYPE_DATE));
        assert!(compatible(CDataType::TYPE_TIMESTAMP, CDataType::TIMESTAMP));
        assert!(!compatible(CDataType::LONG, CDataType::SBIGINT));
        assert!(!compatible(CDataType::CHAR, CDataType::WCHAR));
        assert!(!compatible(CDataType::DATE, CDataType::TIMESTAMP));
    }

    #[test]
    fn names_truncate_on_char_boundary() {
        assert_eq!(truncate_name("abcdef".into(), 3), "abc");
        assert_eq!(truncate_name("\u{e9}\u{e9}".into(), 3), "\u{e9}");
        assert_eq!(truncate_name("ab".into(), 3), "ab");
    }

    #[test]
    fn empty_record_lookups_fail() {
        let rec = DynamicRecord::new();
        assert!(!rec.exists("x"));
        assert!(matches!(rec.get_type("x"), Err(Error::NotFound(_))));
        assert!(matches!(rec.get_size(1u16), Err(Error::NotFound(_))));
        assert!(matches!(rec.column_name(0), Err(Error::NotFound(_))));
    }
}
