use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::{debug, warn};

use super::binding::{ColumnBinding, ColumnKey, TextTarget};
use super::{ColumnRef, Record, RecordId, Registration};
use crate::driver::{Driver, Landing, RowTarget};
use crate::error::{Error, Result};
use crate::host::{FixedCell, HostVar};
use crate::statement::{Statement, StatementId};
use crate::value::CValue;

/// A record whose columns land in variables the caller owns.
///
/// Register every variable under a column name or a 1-based column number, then pass
/// the record to [`Statement::fetch`]. Result columns without a registration are
/// skipped; see [`StaticRecord::skipped_columns`].
///
/// ```rs
/// let id = HostVar::new(0i32);
/// let name = HostVar::new(String::new());
/// let mut rec = StaticRecord::new();
/// rec.bind("id", &id, None)?;
/// rec.bind_string("name", &name, None)?;
/// while stmt.fetch(&mut rec)? {
///     println!("{} {}", id.get(), name.borrow());
/// }
/// ```
#[derive(Debug)]
pub struct StaticRecord {
    id: RecordId,
    statement: Option<StatementId>,
    descriptors: Vec<ColumnBinding>,
    by_name: HashMap<String, usize>,
    by_index: BTreeMap<u16, usize>,
    /// (column, descriptor) pairs in column order
    bound: Vec<(u16, usize)>,
    skipped: Vec<u16>,
}

impl Default for StaticRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticRecord {
    pub fn new() -> Self {
        Self {
            id: RecordId::next(),
            statement: None,
            descriptors: Vec::new(),
            by_name: HashMap::new(),
            by_index: BTreeMap::new(),
            bound: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Register a fixed-width variable. The column lands directly in `var`.
    ///
    /// Registering a key twice replaces the earlier registration.
    pub fn bind<'a, T: CValue>(
        &mut self,
        key: impl Into<ColumnRef<'a>>,
        var: &HostVar<T>,
        is_null: Option<&HostVar<bool>>,
    ) -> Result<Registration> {
        let key = column_key(key.into())?;
        let cell: Rc<dyn FixedCell> = Rc::clone(&var.0) as Rc<dyn FixedCell>;
        self.register(ColumnBinding::fixed(key, T::C_TYPE, cell, is_null))
    }

    /// Register a string filled from narrow character data sized from the column description.
    pub fn bind_string<'a>(
        &mut self,
        key: impl Into<ColumnRef<'a>>,
        var: &HostVar<String>,
        is_null: Option<&HostVar<bool>>,
    ) -> Result<Registration> {
        self.bind_string_with_capacity(key, var, 0, is_null)
    }

    /// Like [`StaticRecord::bind_string`], with room for exactly `chars` characters.
    /// Longer values are truncated. 0 sizes the buffer from the column description.
    pub fn bind_string_with_capacity<'a>(
        &mut self,
        key: impl Into<ColumnRef<'a>>,
        var: &HostVar<String>,
        chars: usize,
        is_null: Option<&HostVar<bool>>,
    ) -> Result<Registration> {
        let key = column_key(key.into())?;
        let target = TextTarget::Narrow(var.clone());
        self.register(ColumnBinding::text(key, target, chars, is_null))
    }

    /// Register a string filled from UTF-16 character data.
    pub fn bind_wide_string<'a>(
        &mut self,
        key: impl Into<ColumnRef<'a>>,
        var: &HostVar<String>,
        is_null: Option<&HostVar<bool>>,
    ) -> Result<Registration> {
        self.bind_wide_string_with_capacity(key, var, 0, is_null)
    }

    pub fn bind_wide_string_with_capacity<'a>(
        &mut self,
        key: impl Into<ColumnRef<'a>>,
        var: &HostVar<String>,
        chars: usize,
        is_null: Option<&HostVar<bool>>,
    ) -> Result<Registration> {
        let key = column_key(key.into())?;
        let target = TextTarget::Wide(var.clone());
        self.register(ColumnBinding::text(key, target, chars, is_null))
    }

    /// Register a byte vector receiving at most `size` bytes.
    ///
    /// After each fetch `var` holds the bytes that fit; longer values are truncated.
    pub fn bind_binary<'a>(
        &mut self,
        key: impl Into<ColumnRef<'a>>,
        var: &HostVar<Vec<u8>>,
        size: usize,
        is_null: Option<&HostVar<bool>>,
    ) -> Result<Registration> {
        let key = column_key(key.into())?;
        self.register(ColumnBinding::binary(key, var, size, is_null))
    }

    fn register(&mut self, binding: ColumnBinding) -> Result<Registration> {
        if self.statement.is_some() {
            return Err(Error::IncorrectUse(format!(
                "cannot register column {} while the record is bound to a statement",
                binding.key
            )));
        }
        let existing = match &binding.key {
            ColumnKey::Name(name) => self.by_name.get(name).copied(),
            ColumnKey::Index(index) => self.by_index.get(index).copied(),
        };
        if let Some(slot) = existing {
            self.descriptors[slot] = binding;
            return Ok(Registration::Replaced);
        }
        let slot = self.descriptors.len();
        match &binding.key {
            ColumnKey::Name(name) => {
                self.by_name.insert(name.clone(), slot);
            }
            ColumnKey::Index(index) => {
                self.by_index.insert(*index, slot);
            }
        }
        self.descriptors.push(binding);
        Ok(Registration::New)
    }

    /// Number of registered columns
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn is_registered<'a>(&self, key: impl Into<ColumnRef<'a>>) -> bool {
        match key.into() {
            ColumnRef::Name(name) => self.by_name.contains_key(name),
            ColumnRef::Index(index) => self.by_index.contains_key(&index),
        }
    }

    /// Result columns that matched no registration at the last bind
    pub fn skipped_columns(&self) -> &[u16] {
        &self.skipped
    }

    /// Result columns that landed in a registered variable at the last bind
    pub fn bound_columns(&self) -> impl Iterator<Item = u16> + '_ {
        self.bound.iter().map(|(column, _)| *column)
    }
}

fn column_key(key: ColumnRef<'_>) -> Result<ColumnKey> {
    match key {
        ColumnRef::Name(name) => Ok(ColumnKey::Name(name.to_owned())),
        ColumnRef::Index(0) => Err(Error::IncorrectUse(
            "column numbers start at 1".to_string(),
        )),
        ColumnRef::Index(index) => Ok(ColumnKey::Index(index)),
    }
}

impl RowTarget for StaticRecord {
    fn landing(&mut self, column: u16) -> Result<Option<Landing<'_>>> {
        let Ok(pos) = self.bound.binary_search_by_key(&column, |(c, _)| *c) else {
            return Ok(None);
        };
        let slot = self.bound[pos].1;
        match self.descriptors.get_mut(slot) {
            Some(binding) => binding.landing(),
            None => Ok(None),
        }
    }
}

impl Record for StaticRecord {
    fn id(&self) -> RecordId {
        self.id
    }

    fn is_dynamic(&self) -> bool {
        false
    }

    fn statement(&self) -> Option<StatementId> {
        self.statement
    }

    /// Index registrations win over name registrations; the driver is asked for a
    /// column's name only when no index registration exists for it.
    #[tracing::instrument(skip_all, fields(record = ?self.id))]
    fn bind_columns<D: Driver>(&mut self, stmt: &mut Statement<D>) -> Result<()> {
        self.bound.clear();
        self.skipped.clear();

        let cols = stmt.cols()?;
        for column in 1..=cols {
            let mut described = None;
            let slot = match self.by_index.get(&column) {
                Some(&slot) => Some(slot),
                None if self.by_name.is_empty() => None,
                None => {
                    let desc = stmt.describe_column(column)?;
                    let slot = self.by_name.get(&desc.name).copied();
                    described = Some(desc);
                    slot
                }
            };
            let Some(slot) = slot else {
                debug!(column, "no variable registered for column, skipping");
                self.skipped.push(column);
                continue;
            };

            let binding = &mut self.descriptors[slot];
            if binding.is_text() {
                let chars = if binding.reserved > 0 {
                    binding.reserved
                } else {
                    let size = match described {
                        Some(desc) => desc.column_size,
                        None => stmt.describe_column(column)?.column_size,
                    };
                    if size == 0 {
                        stmt.opts().string_capacity
                    } else {
                        size
                    }
                };
                binding.allocate_text(chars);
            }
            stmt.bind_col(column, binding.c_type, binding.declared_size)?;
            binding.fetched_size = 0;
            self.bound.push((column, slot));
        }

        if cols > 0 && !self.descriptors.is_empty() && self.bound.is_empty() {
            warn!(
                columns = cols,
                registered = self.descriptors.len(),
                "none of the registered variables matched a result column"
            );
        }
        Ok(())
    }

    fn ensure_writable(&self) -> Result<()> {
        self.bound
            .iter()
            .filter_map(|&(_, slot)| self.descriptors.get(slot))
            .try_for_each(ColumnBinding::ensure_writable)
    }

    fn finalize(&mut self) -> Result<()> {
        for &(_, slot) in &self.bound {
            if let Some(binding) = self.descriptors.get_mut(slot) {
                binding.finalize()?;
            }
        }
        Ok(())
    }

    fn set_statement(&mut self, stmt: Option<StatementId>) {
        self.statement = stmt;
    }

    fn clear_binding(&mut self) {
        self.statement = None;
        for binding in &mut self.descriptors {
            binding.release_text();
        }
        self.bound.clear();
        self.skipped.clear();
    }
}
