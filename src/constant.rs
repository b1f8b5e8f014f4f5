/// Length/indicator cell written by the driver next to every bound column.
pub type Len = isize;

/// Indicator value meaning the column is SQL NULL.
pub const NULL_DATA: Len = -1;

/// Indicator value meaning the driver could not determine the full length.
pub const NO_TOTAL: Len = -4;

/// Handle kinds diagnostics can be read from
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleType {
    Env = 1,
    Dbc = 2,
    Stmt = 3,
    Desc = 4,
}

/// Diagnostic fields queried per record
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagField {
    ReturnCode = 1,
    Number = 2,
    RowCount = 3,
    SqlState = 4,
    Native = 5,
    MessageText = 6,
    ClassOrigin = 8,
    ConnectionName = 10,
    ServerName = 11,
}

/// SQL data type reported by the driver when describing a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SqlDataType(pub i16);

impl SqlDataType {
    pub const UNKNOWN: Self = Self(0);
    pub const CHAR: Self = Self(1);
    pub const NUMERIC: Self = Self(2);
    pub const DECIMAL: Self = Self(3);
    pub const INTEGER: Self = Self(4);
    pub const SMALLINT: Self = Self(5);
    pub const FLOAT: Self = Self(6);
    pub const REAL: Self = Self(7);
    pub const DOUBLE: Self = Self(8);
    /// ODBC 2.x DATE
    pub const DATE: Self = Self(9);
    /// ODBC 2.x TIME
    pub const TIME: Self = Self(10);
    /// ODBC 2.x TIMESTAMP
    pub const TIMESTAMP: Self = Self(11);
    pub const VARCHAR: Self = Self(12);
    pub const TYPE_DATE: Self = Self(91);
    pub const TYPE_TIME: Self = Self(92);
    pub const TYPE_TIMESTAMP: Self = Self(93);
    pub const LONGVARCHAR: Self = Self(-1);
    pub const BINARY: Self = Self(-2);
    pub const VARBINARY: Self = Self(-3);
    pub const LONGVARBINARY: Self = Self(-4);
    pub const BIGINT: Self = Self(-5);
    pub const TINYINT: Self = Self(-6);
    pub const BIT: Self = Self(-7);
    pub const WCHAR: Self = Self(-8);
    pub const WVARCHAR: Self = Self(-9);
    pub const WLONGVARCHAR: Self = Self(-10);
    pub const GUID: Self = Self(-11);

    pub fn is_wide(&self) -> bool {
        matches!(*self, Self::WCHAR | Self::WVARCHAR | Self::WLONGVARCHAR)
    }
}

/// C data type a column buffer is bound as.
///
/// Shares its code space with [`SqlDataType`]: a dynamic record that binds a
/// column "as is" uses the SQL type code directly as the C type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CDataType(pub i16);

impl CDataType {
    pub const CHAR: Self = Self(1);
    pub const NUMERIC: Self = Self(2);
    pub const LONG: Self = Self(4);
    pub const SHORT: Self = Self(5);
    pub const FLOAT: Self = Self(7);
    pub const DOUBLE: Self = Self(8);
    /// ODBC 2.x DATE
    pub const DATE: Self = Self(9);
    /// ODBC 2.x TIME
    pub const TIME: Self = Self(10);
    /// ODBC 2.x TIMESTAMP
    pub const TIMESTAMP: Self = Self(11);
    pub const TYPE_DATE: Self = Self(91);
    pub const TYPE_TIME: Self = Self(92);
    pub const TYPE_TIMESTAMP: Self = Self(93);
    pub const BINARY: Self = Self(-2);
    pub const TINYINT: Self = Self(-6);
    pub const BIT: Self = Self(-7);
    pub const WCHAR: Self = Self(-8);
    pub const GUID: Self = Self(-11);
    pub const SSHORT: Self = Self(-15);
    pub const SLONG: Self = Self(-16);
    pub const USHORT: Self = Self(-17);
    pub const ULONG: Self = Self(-18);
    pub const SBIGINT: Self = Self(-25);
    pub const STINYINT: Self = Self(-26);
    pub const UBIGINT: Self = Self(-27);
    pub const UTINYINT: Self = Self(-28);

    /// Size in bytes of the host representation, `None` for variable-width types.
    pub fn fixed_size(&self) -> Option<usize> {
        let size = match *self {
            Self::TINYINT | Self::STINYINT | Self::UTINYINT | Self::BIT => 1,
            Self::SHORT | Self::SSHORT | Self::USHORT => 2,
            Self::LONG | Self::SLONG | Self::ULONG | Self::FLOAT => 4,
            Self::DOUBLE | Self::SBIGINT | Self::UBIGINT => 8,
            Self::DATE | Self::TYPE_DATE | Self::TIME | Self::TYPE_TIME => 6,
            Self::TIMESTAMP | Self::TYPE_TIMESTAMP | Self::GUID => 16,
            Self::NUMERIC => 19,
            _ => return None,
        };
        Some(size)
    }

    /// Whether the type is character data that the driver NUL-terminates.
    pub fn is_text(&self) -> bool {
        matches!(*self, Self::CHAR | Self::WCHAR)
    }

    /// Size of one character unit for text types.
    pub fn unit_size(&self) -> usize {
        if *self == Self::WCHAR { 2 } else { 1 }
    }
}

impl From<SqlDataType> for CDataType {
    fn from(value: SqlDataType) -> Self {
        Self(value.0)
    }
}

/// Statement attributes understood by [`crate::statement::Statement::set_attr`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatementAttribute(pub i32);

impl StatementAttribute {
    pub const QUERY_TIMEOUT: Self = Self(0);
    pub const MAX_ROWS: Self = Self(1);
    pub const CURSOR_TYPE: Self = Self(6);
    pub const CONCURRENCY: Self = Self(7);
    pub const USE_BOOKMARKS: Self = Self(12);
    pub const FETCH_BOOKMARK_PTR: Self = Self(16);
}

/// Values of the `CURSOR_TYPE` attribute
pub struct CursorType;

impl CursorType {
    pub const FORWARD_ONLY: Len = 0;
    pub const KEYSET_DRIVEN: Len = 1;
    pub const DYNAMIC: Len = 2;
    pub const STATIC: Len = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_sizes_match_host_layouts() {
        assert_eq!(CDataType::LONG.fixed_size(), Some(size_of::<i32>()));
        assert_eq!(CDataType::SBIGINT.fixed_size(), Some(size_of::<i64>()));
        assert_eq!(
            CDataType::TYPE_TIMESTAMP.fixed_size(),
            Some(size_of::<crate::value::TimestampStruct>())
        );
        assert_eq!(
            CDataType::NUMERIC.fixed_size(),
            Some(size_of::<crate::value::NumericStruct>())
        );
        assert_eq!(CDataType::CHAR.fixed_size(), None);
    }

    #[test]
    fn identity_mapping_shares_codes() {
        assert_eq!(CDataType::from(SqlDataType::INTEGER), CDataType::LONG);
        assert_eq!(CDataType::from(SqlDataType::CHAR), CDataType::CHAR);
        assert_eq!(CDataType::from(SqlDataType::WCHAR), CDataType::WCHAR);
        assert_eq!(
            CDataType::from(SqlDataType::TYPE_TIMESTAMP),
            CDataType::TYPE_TIMESTAMP
        );
    }

    #[test]
    fn wide_sql_types() {
        assert!(SqlDataType::WVARCHAR.is_wide());
        assert!(!SqlDataType::VARCHAR.is_wide());
        assert_eq!(CDataType::WCHAR.unit_size(), 2);
        assert_eq!(CDataType::CHAR.unit_size(), 1);
    }
}
