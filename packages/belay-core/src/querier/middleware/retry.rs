use crate::prelude::*;
use std::time::Duration;

/// Retries a single remote call with exponential backoff.
///
/// Errors the pager raises on its own (limits, timeouts, abort) never pass
/// through here, and malformed pages are not retried.
#[derive(Clone)]
pub struct QueryRetryMiddleware {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for QueryRetryMiddleware {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(100),
        }
    }
}

impl QueryRetryMiddleware {
    pub async fn run<REQ: QueryRequest>(
        &self,
        req: REQ,
        client: QueryClient,
    ) -> Result<REQ::QueryResponse> {
        let mut attempts = 0;
        let mut backoff = self.backoff;

        loop {
            attempts += 1;
            match req.request(client.clone()).await {
                Ok(resp) => return Ok(resp),
                Err(err) => {
                    if attempts < self.max_attempts && is_retryable(&err) {
                        tracing::debug!(attempts, "query failed, retrying: {err:?}");
                        futures_timer::Delay::new(backoff).await;
                        backoff *= 2;
                    } else {
                        return Err(err);
                    }
                }
            }
        }
    }
}

fn is_retryable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<PaginationError>().is_none()
        && !matches!(
            err.downcast_ref::<NetworkError>(),
            Some(NetworkError::MissingEndpoint(_))
        )
}

#[cfg(test)]
mod test {
    use super::is_retryable;
    use crate::error::{NetworkError, PaginationError};

    #[test]
    fn only_transport_failures_are_retried() {
        assert!(is_retryable(&NetworkError::rpc("connection reset").into()));
        assert!(!is_retryable(
            &PaginationError::malformed("missing records").into()
        ));
        assert!(!is_retryable(&NetworkError::MissingEndpoint("grpc").into()));
    }
}
