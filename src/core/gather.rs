//! Purpose: Run independent read queries concurrently and gather all results.
//! Exports: `run_all`.
//! Role: Barrier-style coordinator; one dedicated connection per statement.
//! Invariants: Results are index-aligned with the input statements.
//! Invariants: Every task is awaited before returning, even after a failure.
use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind};
use crate::core::query;
use crate::core::scope::with_connection;
use crate::core::statement::{ResultSet, Statement};
use crate::core::store::ConnectionProvider;

/// Execute every statement against the store at `location`, each on its own
/// connection and its own blocking task, and return the result sets in input
/// order.
///
/// If any statement fails, the coordinator still waits for the rest (so no
/// task leaks its connection), then returns an `Aggregate` error wrapping the
/// first failure in input order. Partial results are discarded; each
/// statement runs at most once.
pub async fn run_all<P>(
    provider: P,
    location: impl AsRef<Path>,
    statements: Vec<Statement>,
) -> Result<Vec<ResultSet>, Error>
where
    P: ConnectionProvider + Clone + Send + 'static,
    P::Conn: 'static,
{
    let location: PathBuf = location.as_ref().to_path_buf();
    let total = statements.len();

    let mut handles = Vec::with_capacity(total);
    for statement in statements {
        let provider = provider.clone();
        let location = location.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            with_connection(&provider, &location, |conn| query::run(conn, &statement))
        }));
    }

    let mut results = Vec::with_capacity(total);
    let mut failures = 0usize;
    let mut first_failure: Option<(usize, Error)> = None;
    for (index, handle) in handles.into_iter().enumerate() {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(join_err) => Err(Error::new(ErrorKind::Internal)
                .with_message("query task did not complete")
                .with_source(join_err)),
        };
        match outcome {
            Ok(set) => results.push(set),
            Err(err) => {
                failures += 1;
                if first_failure.is_none() {
                    first_failure = Some((index, err));
                }
            }
        }
    }

    match first_failure {
        None => Ok(results),
        Some((index, err)) => Err(Error::new(ErrorKind::Aggregate)
            .with_message(format!("{failures} of {total} queries failed"))
            .with_index(index)
            .with_source(err)),
    }
}
