//! Per-call deadlines.
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future cancels the call
//! - A timed-out call becomes `ProviderError::Timeout`, indistinguishable to
//!   the executor from a provider that reported a timeout itself

use std::future::Future;
use std::time::Duration;

use crate::providers::ProviderError;

/// Run a provider call under `deadline`.
pub async fn with_deadline<T, F>(
    provider: &str,
    deadline: Duration,
    call: F,
) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                provider = %provider,
                deadline_secs = deadline.as_secs_f64(),
                "Provider call exceeded deadline, abandoning"
            );
            Err(ProviderError::Timeout {
                provider: provider.to_string(),
                after: deadline,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok::<_, ProviderError>("late")
        };
        let err = with_deadline("openai", Duration::from_secs(120), slow)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let fast = async { Ok::<_, ProviderError>(7) };
        let value = with_deadline("openai", Duration::from_secs(1), fast).await.unwrap();
        assert_eq!(value, 7);
    }
}
