use smart_default::SmartDefault;

use crate::error::Error;

/// Per-statement configuration
///
/// ```rs
/// let mut opts1 = StatementOpts::default();
/// opts1.no_direct_fetch = true;
///
/// let opts2 = StatementOpts::try_from("NoDirectFetch=1;StringCapacity=4096")?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, SmartDefault)]
pub struct StatementOpts {
    /// Route `fetch()` through the scrollable fetch call even for the next row.
    /// Required whenever the cursor is not forward-only.
    pub no_direct_fetch: bool,

    /// Characters reserved for a text column whose declared width is 0 (unbounded)
    #[default(8 * 1024)]
    pub string_capacity: usize,

    /// Column names longer than this many bytes are truncated
    #[default(256)]
    pub max_column_name_len: usize,
}

impl TryFrom<&str> for StatementOpts {
    type Error = Error;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        let mut opts = Self::default();
        for pair in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| Error::IncorrectUse(format!("expected KEY=VALUE, got '{pair}'")))?;
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "nodirectfetch" => opts.no_direct_fetch = parse_bool(key, value)?,
                "stringcapacity" => opts.string_capacity = parse_usize(key, value)?,
                "maxcolumnnamelen" => opts.max_column_name_len = parse_usize(key, value)?,
                _ => {
                    return Err(Error::IncorrectUse(format!(
                        "unknown statement option '{}'",
                        key.trim()
                    )));
                }
            }
        }
        Ok(opts)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, Error> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(Error::IncorrectUse(format!(
            "invalid boolean '{value}' for {}",
            key.trim()
        ))),
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize, Error> {
    value.parse().map_err(|e| {
        Error::IncorrectUse(format!("invalid number '{value}' for {}: {e}", key.trim()))
    })
}
