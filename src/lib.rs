//! Client-side row binding for ODBC-style statement handles.
//!
//! A [`Statement`] executes SQL through a [`Driver`] and fetches rows one at a time into
//! a record: a [`StaticRecord`] fills variables registered up front, a
//! [`DynamicRecord`] discovers the columns and owns their buffers. Every driver call
//! passes through one gate that turns its outcome into either a continue (keeping any
//! warnings in a [`Diagnostic`]) or an [`Error`].

mod buffer;
pub mod constant;
pub mod diagnostic;
pub mod driver;
pub mod error;
pub mod gate;
mod host;
pub mod memory;
mod opts;
pub mod record;
pub mod statement;
mod text;
pub mod value;

pub use buffer::OwnedBuffer;
pub use diagnostic::{DiagRecord, Diagnostic};
pub use driver::{Driver, FetchOrientation};
pub use error::{Error, Result};
pub use host::HostVar;
pub use opts::StatementOpts;
pub use record::{ColumnRef, DynamicRecord, Record, Registration, StaticRecord};
pub use statement::Statement;
