//! Purpose: Scoped connection acquisition with guaranteed release.
//! Exports: `ConnectionScope`, `with_connection`.
//! Role: The only path through which core operations obtain live connections.
//! Invariants: At most one open connection per scope; closed exactly once.
//! Invariants: Release is idempotent; a second release is a no-op.
use std::path::{Path, PathBuf};

use crate::core::error::{Error, ErrorKind};
use crate::core::store::ConnectionProvider;

pub struct ConnectionScope<'a, P: ConnectionProvider> {
    provider: &'a P,
    location: PathBuf,
    conn: Option<P::Conn>,
}

impl<'a, P: ConnectionProvider> ConnectionScope<'a, P> {
    /// Open a connection to the store at `location`. On failure nothing is
    /// held and no release will be attempted.
    pub fn acquire(provider: &'a P, location: impl AsRef<Path>) -> Result<Self, Error> {
        let location = location.as_ref().to_path_buf();
        let conn = provider.open(&location)?;
        tracing::debug!(location = %location.display(), "connection acquired");
        Ok(Self {
            provider,
            location,
            conn: Some(conn),
        })
    }

    /// The live connection, or `None` once the scope has been released.
    pub fn conn(&mut self) -> Option<&mut P::Conn> {
        self.conn.as_mut()
    }

    /// Close the connection through the provider. Releasing an
    /// already-released scope is a no-op.
    pub fn release(&mut self) -> Result<(), Error> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        self.provider.close(conn)?;
        tracing::debug!(location = %self.location.display(), "connection released");
        Ok(())
    }
}

impl<P: ConnectionProvider> Drop for ConnectionScope<'_, P> {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            tracing::warn!(
                location = %self.location.display(),
                error = %err,
                "failed to release connection during drop"
            );
        }
    }
}

/// Run `body` with a connection to the store at `location`, releasing the
/// connection on every exit path. A close failure after a successful body
/// surfaces; after a failed body it is logged so it never masks the original
/// error.
pub fn with_connection<P, T>(
    provider: &P,
    location: impl AsRef<Path>,
    body: impl FnOnce(&mut P::Conn) -> Result<T, Error>,
) -> Result<T, Error>
where
    P: ConnectionProvider,
{
    let mut scope = ConnectionScope::acquire(provider, location)?;
    let result = match scope.conn() {
        Some(conn) => body(conn),
        None => Err(Error::new(ErrorKind::Internal).with_message("scope released before use")),
    };
    match result {
        Ok(value) => {
            scope.release()?;
            Ok(value)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::{with_connection, ConnectionScope};
    use crate::core::error::{Error, ErrorKind};
    use crate::core::store::mock::{Event, MockProvider};
    use crate::core::store::StoreConnection;

    #[test]
    fn release_happens_exactly_once_on_success() {
        let provider = MockProvider::new();
        let result = with_connection(&provider, "mock.db", |conn| conn.execute("SELECT 1", &[]));
        assert!(result.is_ok());
        assert_eq!(provider.count(&Event::Open), 1);
        assert_eq!(provider.count(&Event::Close), 1);
    }

    #[test]
    fn release_happens_exactly_once_when_body_fails() {
        let provider = MockProvider::new();
        let result: Result<(), Error> = with_connection(&provider, "mock.db", |_conn| {
            Err(Error::new(ErrorKind::Execution).with_message("boom"))
        });
        match result {
            Ok(()) => panic!("expected body error"),
            Err(err) => assert_eq!(err.kind(), ErrorKind::Execution),
        }
        assert_eq!(provider.count(&Event::Close), 1);
    }

    #[test]
    fn release_happens_on_early_return() {
        let provider = MockProvider::new();
        let result = with_connection(&provider, "mock.db", |_conn| {
            if true {
                return Ok(17);
            }
            Ok(0)
        });
        assert_eq!(result.unwrap(), 17);
        assert_eq!(provider.count(&Event::Close), 1);
    }

    #[test]
    fn double_release_is_a_no_op() {
        let provider = MockProvider::new();
        let mut scope = ConnectionScope::acquire(&provider, "mock.db").expect("acquire");
        scope.release().expect("first release");
        scope.release().expect("second release");
        drop(scope);
        assert_eq!(provider.count(&Event::Close), 1);
    }

    #[test]
    fn acquisition_failure_attempts_no_release() {
        let provider = MockProvider {
            fail_open: true,
            ..MockProvider::new()
        };
        let result = ConnectionScope::acquire(&provider, "mock.db");
        match result {
            Ok(_) => panic!("expected acquisition error"),
            Err(err) => assert_eq!(err.kind(), ErrorKind::Acquisition),
        }
        assert!(provider.events().is_empty());
    }

    #[test]
    fn drop_releases_a_live_scope() {
        let provider = MockProvider::new();
        {
            let _scope = ConnectionScope::acquire(&provider, "mock.db").expect("acquire");
        }
        assert_eq!(provider.count(&Event::Close), 1);
    }
}
