//! Time-bounded external calls
//!
//! Collaborators expose no timeout of their own, so every remote call made by
//! the services goes through [`bounded`].

use crate::error::OfficesError;
use std::future::Future;
use std::time::Duration;

/// Run an external call under a time limit
///
/// # Errors
/// - `OfficesError::Timeout` when `limit` elapses first
/// - the call's own error, converted into [`OfficesError`]
pub async fn bounded<T, E, F>(operation: &'static str, limit: Duration, call: F) -> Result<T, OfficesError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<OfficesError>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(OfficesError::Timeout {
            operation,
            duration_secs: limit.as_secs(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[tokio::test]
    async fn passes_through_success() {
        let out = bounded("query", Duration::from_secs(1), async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test]
    async fn converts_call_error() {
        let out = bounded("query", Duration::from_secs(1), async {
            Err::<(), _>(StoreError::Unavailable("down".into()))
        })
        .await;
        assert!(matches!(out, Err(OfficesError::Store(StoreError::Unavailable(_)))));
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_slow_call() {
        let out = bounded("deploy_groups", Duration::from_secs(5), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, StoreError>(())
        })
        .await;

        match out {
            Err(OfficesError::Timeout {
                operation,
                duration_secs,
            }) => {
                assert_eq!(operation, "deploy_groups");
                assert_eq!(duration_secs, 5);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
