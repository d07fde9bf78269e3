//! Purpose: Commit/rollback boundary around a unit of work.
//! Exports: `run_transaction`.
//! Role: Stateless executor; never opens or closes the connection it is given.
//! Invariants: Exactly one of commit or rollback happens per invocation.
//! Invariants: A rollback-time secondary failure is logged, never surfaced.
use crate::core::error::Error;
use crate::core::store::StoreConnection;

/// Run `work` inside a transaction on `conn`: commit on success, roll back on
/// any error (including commit failure) and propagate the original error.
///
/// The connection's lifetime belongs to the caller; this only manages the
/// transaction boundary, so it composes with connections borrowed from any
/// source.
pub fn run_transaction<C, T>(
    conn: &mut C,
    work: impl FnOnce(&mut C) -> Result<T, Error>,
) -> Result<T, Error>
where
    C: StoreConnection,
{
    conn.begin()?;
    match work(conn) {
        Ok(value) => match conn.commit() {
            Ok(()) => {
                tracing::debug!("transaction committed");
                Ok(value)
            }
            Err(commit_err) => {
                roll_back(conn);
                Err(commit_err)
            }
        },
        Err(err) => {
            roll_back(conn);
            Err(err)
        }
    }
}

fn roll_back<C: StoreConnection>(conn: &mut C) {
    tracing::debug!("transaction rolled back");
    if let Err(rollback_err) = conn.rollback() {
        tracing::warn!(error = %rollback_err, "rollback failed after transaction error");
    }
}

#[cfg(test)]
mod tests {
    use super::run_transaction;
    use crate::core::error::{Error, ErrorKind};
    use crate::core::store::mock::{Event, MockProvider};
    use crate::core::store::{ConnectionProvider, StoreConnection};

    #[test]
    fn successful_work_commits_exactly_once() {
        let provider = MockProvider::new();
        let mut conn = provider.open("mock.db".as_ref()).expect("open");

        let result = run_transaction(&mut conn, |conn| {
            conn.execute("UPDATE users SET age = 31 WHERE id = 1", &[])
        });
        assert!(result.is_ok());
        assert_eq!(provider.count(&Event::Begin), 1);
        assert_eq!(provider.count(&Event::Commit), 1);
        assert_eq!(provider.count(&Event::Rollback), 0);
    }

    #[test]
    fn failing_work_rolls_back_and_surfaces_the_original_error() {
        let provider = MockProvider::new();
        let mut conn = provider.open("mock.db".as_ref()).expect("open");

        let result: Result<(), Error> = run_transaction(&mut conn, |_conn| {
            Err(Error::new(ErrorKind::Execution).with_message("constraint violated"))
        });
        match result {
            Ok(()) => panic!("expected work error"),
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Execution);
                assert_eq!(err.message(), Some("constraint violated"));
            }
        }
        assert_eq!(provider.count(&Event::Commit), 0);
        assert_eq!(provider.count(&Event::Rollback), 1);
    }

    #[test]
    fn commit_failure_rolls_back_and_surfaces_the_commit_error() {
        let provider = MockProvider {
            fail_commit: true,
            ..MockProvider::new()
        };
        let mut conn = provider.open("mock.db".as_ref()).expect("open");

        let result = run_transaction(&mut conn, |_conn| Ok(()));
        match result {
            Ok(()) => panic!("expected commit error"),
            Err(err) => assert_eq!(err.message(), Some("commit refused")),
        }
        assert_eq!(provider.count(&Event::Rollback), 1);
    }

    #[test]
    fn rollback_failure_never_masks_the_original_error() {
        let provider = MockProvider {
            fail_rollback: true,
            ..MockProvider::new()
        };
        let mut conn = provider.open("mock.db".as_ref()).expect("open");

        let result: Result<(), Error> = run_transaction(&mut conn, |_conn| {
            Err(Error::new(ErrorKind::Execution).with_message("primary failure"))
        });
        match result {
            Ok(()) => panic!("expected work error"),
            Err(err) => assert_eq!(err.message(), Some("primary failure")),
        }
    }

    #[test]
    fn executor_carries_no_state_across_calls() {
        let provider = MockProvider::new();
        let mut conn = provider.open("mock.db".as_ref()).expect("open");

        for _ in 0..2 {
            run_transaction(&mut conn, |conn| conn.execute("SELECT 1", &[])).expect("tx");
        }
        assert_eq!(provider.count(&Event::Begin), 2);
        assert_eq!(provider.count(&Event::Commit), 2);
    }
}
