//! Purpose: Execute a single parameterized statement against a live connection.
//! Exports: `run`, `run_scoped`.
//! Role: Shared execution path for one-shot reads and transactional writes.
//! Invariants: Parameter count mismatch fails before execution is attempted.
//! Invariants: Never commits; composition with `run_transaction` owns that.
use std::path::Path;

use crate::core::error::{Error, ErrorKind};
use crate::core::scope::with_connection;
use crate::core::statement::{ResultSet, Statement};
use crate::core::store::{ConnectionProvider, StoreConnection};

/// Execute `statement` on `conn`, materializing all rows. Write statements
/// yield an empty result set; their effect is visible to later statements on
/// the same connection.
pub fn run<C>(conn: &mut C, statement: &Statement) -> Result<ResultSet, Error>
where
    C: StoreConnection,
{
    let expected = conn.parameter_count(statement.sql())?;
    let supplied = statement.params().len();
    if expected != supplied {
        return Err(Error::new(ErrorKind::Binding)
            .with_message(format!(
                "statement expects {expected} parameters, got {supplied}"
            ))
            .with_statement(statement.sql()));
    }
    conn.execute(statement.sql(), statement.params())
}

/// One-shot form: acquire a connection, run the statement, release.
pub fn run_scoped<P>(
    provider: &P,
    location: impl AsRef<Path>,
    statement: &Statement,
) -> Result<ResultSet, Error>
where
    P: ConnectionProvider,
{
    with_connection(provider, location, |conn| run(conn, statement))
}
