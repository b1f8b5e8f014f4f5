use std::fmt;
use std::rc::Rc;

use crate::buffer::OwnedBuffer;
use crate::constant::{CDataType, Len, NULL_DATA};
use crate::driver::Landing;
use crate::error::{Error, Result};
use crate::host::{FixedCell, HostVar};
use crate::text::{data_len, decode_narrow, decode_wide};

/// Key a descriptor was registered under
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ColumnKey {
    Name(String),
    Index(u16),
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKey::Name(name) => write!(f, "\"{name}\""),
            ColumnKey::Index(index) => write!(f, "#{index}"),
        }
    }
}

/// Host string a text column is copied into after each fetch
#[derive(Debug, Clone)]
pub(crate) enum TextTarget {
    Narrow(HostVar<String>),
    Wide(HostVar<String>),
}

impl TextTarget {
    fn var(&self) -> &HostVar<String> {
        match self {
            TextTarget::Narrow(var) | TextTarget::Wide(var) => var,
        }
    }

    fn c_type(&self) -> CDataType {
        match self {
            TextTarget::Narrow(_) => CDataType::CHAR,
            TextTarget::Wide(_) => CDataType::WCHAR,
        }
    }
}

pub(crate) enum Storage {
    /// The driver writes straight into the caller's variable.
    Fixed(Rc<dyn FixedCell>),
    /// Lands in `buffer`, then copied into the caller's byte vector.
    Binary {
        target: HostVar<Vec<u8>>,
        buffer: OwnedBuffer,
    },
    /// Lands in `buffer`, which is sized at bind time, then decoded into the caller's string.
    Text {
        target: TextTarget,
        buffer: Option<OwnedBuffer>,
    },
    /// Library-owned; read back through accessors.
    Buffered(OwnedBuffer),
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Storage::Fixed(cell) => write!(f, "Fixed({} bytes)", cell.size()),
            Storage::Binary { buffer, .. } => write!(f, "Binary({} bytes)", buffer.len()),
            Storage::Text { target, buffer } => write!(
                f,
                "Text({:?}, {:?} bytes)",
                target.c_type(),
                buffer.as_ref().map(OwnedBuffer::len)
            ),
            Storage::Buffered(buffer) => write!(f, "Buffered({} bytes)", buffer.len()),
        }
    }
}

/// One column's landing location plus what the last fetch reported about it.
#[derive(Debug)]
pub(crate) struct ColumnBinding {
    pub key: ColumnKey,
    pub c_type: CDataType,
    pub storage: Storage,
    /// Bytes the driver may write
    pub declared_size: usize,
    /// Length reported by the last fetch, `NULL_DATA` for NULL
    pub fetched_size: Len,
    pub is_null: Option<HostVar<bool>>,
    /// Characters reserved for a text column; 0 sizes it from the column description
    pub reserved: usize,
}

impl ColumnBinding {
    pub fn fixed(
        key: ColumnKey,
        c_type: CDataType,
        cell: Rc<dyn FixedCell>,
        is_null: Option<&HostVar<bool>>,
    ) -> Self {
        let declared_size = cell.size();
        Self::new(key, c_type, Storage::Fixed(cell), declared_size, is_null)
    }

    pub fn binary(
        key: ColumnKey,
        target: &HostVar<Vec<u8>>,
        size: usize,
        is_null: Option<&HostVar<bool>>,
    ) -> Self {
        let storage = Storage::Binary {
            target: target.clone(),
            buffer: OwnedBuffer::new(size),
        };
        Self::new(key, CDataType::BINARY, storage, size, is_null)
    }

    pub fn text(
        key: ColumnKey,
        target: TextTarget,
        reserved: usize,
        is_null: Option<&HostVar<bool>>,
    ) -> Self {
        let c_type = target.c_type();
        let mut binding = Self::new(
            key,
            c_type,
            Storage::Text {
                target,
                buffer: None,
            },
            0,
            is_null,
        );
        binding.reserved = reserved;
        binding
    }

    pub fn buffered(key: ColumnKey, c_type: CDataType, size: usize) -> Self {
        Self::new(key, c_type, Storage::Buffered(OwnedBuffer::new(size)), size, None)
    }

    fn new(
        key: ColumnKey,
        c_type: CDataType,
        storage: Storage,
        declared_size: usize,
        is_null: Option<&HostVar<bool>>,
    ) -> Self {
        Self {
            key,
            c_type,
            storage,
            declared_size,
            fetched_size: 0,
            is_null: is_null.cloned(),
            reserved: 0,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.storage, Storage::Text { .. })
    }

    /// Allocate the landing buffer of a text binding for `chars` characters plus a terminator.
    pub fn allocate_text(&mut self, chars: usize) {
        let size = (chars + 1) * self.c_type.unit_size();
        if let Storage::Text { buffer, .. } = &mut self.storage {
            *buffer = Some(OwnedBuffer::new(size));
            self.declared_size = size;
        }
    }

    /// Drop what `allocate_text` allocated.
    pub fn release_text(&mut self) {
        if let Storage::Text { buffer, .. } = &mut self.storage {
            *buffer = None;
            self.declared_size = 0;
        }
        self.fetched_size = 0;
    }

    /// The library-owned buffer, if the column lands in one.
    pub fn buffer(&self) -> Option<&OwnedBuffer> {
        match &self.storage {
            Storage::Fixed(_) => None,
            Storage::Binary { buffer, .. } | Storage::Buffered(buffer) => Some(buffer),
            Storage::Text { buffer, .. } => buffer.as_ref(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.fetched_size == NULL_DATA
    }

    /// Fails if the caller holds a borrow of storage the next row is written to.
    pub fn ensure_writable(&self) -> Result<()> {
        let storage_free = match &self.storage {
            Storage::Fixed(cell) => cell.is_free(),
            Storage::Binary { target, buffer } => target.is_free() && buffer.is_free(),
            Storage::Text { target, buffer } => {
                target.var().is_free() && buffer.as_ref().is_none_or(OwnedBuffer::is_free)
            }
            Storage::Buffered(buffer) => buffer.is_free(),
        };
        if storage_free && self.is_null.as_ref().is_none_or(HostVar::is_free) {
            Ok(())
        } else {
            Err(held(&self.key))
        }
    }

    pub fn landing(&mut self) -> Result<Option<Landing<'_>>> {
        let Self {
            key,
            c_type,
            storage,
            fetched_size,
            ..
        } = self;
        let data = match storage {
            Storage::Fixed(cell) => cell.try_bytes_mut(),
            Storage::Binary { buffer, .. } | Storage::Buffered(buffer) => buffer.try_bytes_mut(),
            Storage::Text {
                buffer: Some(buffer),
                ..
            } => buffer.try_bytes_mut(),
            Storage::Text { buffer: None, .. } => return Ok(None),
        };
        let data = data.map_err(|_| held(key))?;
        Ok(Some(Landing {
            c_type: *c_type,
            data,
            indicator: fetched_size,
        }))
    }

    /// Publish the fetched row to the caller's variables.
    ///
    /// The NULL flag is set iff the driver reported `NULL_DATA`. Text and binary
    /// targets are cleared on NULL, otherwise filled with the data that fit.
    pub fn finalize(&mut self) -> Result<()> {
        let is_null = self.is_null();
        if let Some(flag) = &self.is_null {
            flag.try_set(is_null).map_err(|_| held(&self.key))?;
        }

        match &self.storage {
            Storage::Text { target, buffer } => {
                let value = match buffer {
                    Some(buffer) if !is_null => {
                        let bytes = buffer.bytes();
                        let unit = self.c_type.unit_size();
                        let bytes = &bytes[..data_len(self.fetched_size, bytes.len(), unit)];
                        match target {
                            TextTarget::Narrow(_) => decode_narrow(bytes),
                            TextTarget::Wide(_) => decode_wide(bytes),
                        }
                    }
                    _ => String::new(),
                };
                target.var().try_set(value).map_err(|_| held(&self.key))?;
            }
            Storage::Binary { target, buffer } => {
                let mut out = target.try_borrow_mut().map_err(|_| held(&self.key))?;
                out.clear();
                if !is_null {
                    let bytes = buffer.bytes();
                    out.extend_from_slice(&bytes[..binary_len(self.fetched_size, bytes.len())]);
                }
            }
            Storage::Fixed(_) | Storage::Buffered(_) => {}
        }
        Ok(())
    }
}

fn held(key: &ColumnKey) -> Error {
    Error::IncorrectUse(format!(
        "the storage of column {key} is borrowed, release it before fetching"
    ))
}

/// Bytes of binary data in a landing buffer of `buf_len` bytes; no terminator.
pub(crate) fn binary_len(fetched: Len, buf_len: usize) -> usize {
    usize::try_from(fetched).map_or(buf_len, |len| len.min(buf_len))
}
