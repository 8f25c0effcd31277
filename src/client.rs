//! GraphQL execution over a [`Transport`].
//!
//! [`GraphqlClient`] applies the per-class deadline to every attempt and
//! retries transient transport failures for queries only. Mutations get
//! exactly one attempt: a reset connection says nothing about whether the
//! server applied the change.
//!
//! Any HTTP status, including 5xx and 4xx, is a response and is handed to
//! the normalizer unretried.

use std::sync::Arc;
use std::time::Duration;

use crate::error::EngineError;
use crate::registry::{OperationKind, TimeoutClass};
use crate::transport::{GraphqlRequest, RawResponse, Transport, TransportFailure};
use crate::validate::VariableSet;

/// Deadline per [`TimeoutClass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub default: Duration,
    pub extended: Duration,
    pub fast: Duration,
}

impl TimeoutPolicy {
    pub fn for_class(&self, class: TimeoutClass) -> Duration {
        match class {
            TimeoutClass::Default => self.default,
            TimeoutClass::Extended => self.extended,
            TimeoutClass::Fast => self.fast,
        }
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            default: Duration::from_secs(30),
            extended: Duration::from_secs(120),
            fast: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first, queries only.
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

pub struct GraphqlClient {
    transport: Arc<dyn Transport>,
    timeouts: TimeoutPolicy,
    retry: RetryPolicy,
}

impl GraphqlClient {
    pub fn new(transport: Arc<dyn Transport>, timeouts: TimeoutPolicy, retry: RetryPolicy) -> Self {
        Self {
            transport,
            timeouts,
            retry,
        }
    }

    /// Post `document` with `variables` and return the raw response.
    pub async fn execute(
        &self,
        document: &str,
        variables: &VariableSet,
        kind: OperationKind,
        class: TimeoutClass,
    ) -> Result<RawResponse, EngineError> {
        let request = GraphqlRequest {
            query: document,
            variables,
        };
        let deadline = self.timeouts.for_class(class);
        let budget = match kind {
            OperationKind::Query => self.retry.max_retries,
            OperationKind::Mutation => 0,
        };

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let failure = match tokio::time::timeout(deadline, self.transport.post(&request)).await
            {
                Ok(Ok(raw)) => return Ok(raw),
                Ok(Err(failure)) => failure,
                Err(_) => TransportFailure::Timeout(Some(deadline)),
            };

            if failure.is_transient() && attempt <= budget {
                tracing::warn!(
                    attempt,
                    budget,
                    error = %failure,
                    "Transient transport failure, retrying"
                );
                tokio::time::sleep(self.retry.backoff).await;
                continue;
            }

            return Err(EngineError::Unreachable {
                attempts: attempt,
                message: failure.to_string(),
                kind,
            });
        }
    }
}
