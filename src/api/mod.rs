//! Purpose: Define the stable public Rust API boundary for litescope.
//! Exports: Core types and operations needed by the CLI and embedders.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: This module is the only public path to store primitives.

pub type ApiResult<T> = Result<T, Error>;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::gather::run_all;
pub use crate::core::query::{run, run_scoped};
pub use crate::core::scope::{with_connection, ConnectionScope};
pub use crate::core::statement::{ResultSet, Row, Statement, Value};
pub use crate::core::store::{
    ConnectionProvider, SqliteConnection, SqliteProvider, StoreConnection,
};
pub use crate::core::tx::run_transaction;
