//! The single entry point: `(tool, action, params, confirm)` to a result.
//!
//! [`Dispatcher::invoke`] runs registry lookup, parameter validation, the
//! destructive gate, execution and normalization in that order, stopping at
//! the first failure. It keeps no per-call state, so concurrent invocations
//! only share the client and the capability store.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::capabilities::CapabilityStore;
use crate::client::GraphqlClient;
use crate::error::EngineError;
use crate::gate;
use crate::normalize::{self, Outcome};
use crate::registry::{self, Tool};
use crate::validate;

/// One request from the host layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub tool: String,
    pub action: String,
    pub params: Map<String, Value>,
    pub confirm: bool,
}

impl Invocation {
    pub fn new(tool: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params = params;
        self
    }

    pub fn confirmed(mut self, confirm: bool) -> Self {
        self.confirm = confirm;
        self
    }
}

pub struct Dispatcher {
    client: GraphqlClient,
    capabilities: Arc<CapabilityStore>,
}

impl Dispatcher {
    pub fn new(client: GraphqlClient, capabilities: Arc<CapabilityStore>) -> Self {
        Self {
            client,
            capabilities,
        }
    }

    pub async fn invoke(&self, request: Invocation) -> Result<Outcome, EngineError> {
        let descriptor = registry::lookup(&request.tool, &request.action).ok_or_else(|| {
            EngineError::UnknownOperation {
                tool: request.tool.clone(),
                action: request.action.clone(),
                available: Tool::parse(&request.tool)
                    .map(|t| t.operations().iter().map(|op| op.descriptor().action).collect())
                    .unwrap_or_default(),
            }
        })?;

        let variables = validate::validate(descriptor, &request.params)?;

        // Flags are read per call so a config edit applies to the next request.
        let capabilities = self.capabilities.snapshot().await;
        if let Err(closed) = gate::check(descriptor, &capabilities, request.confirm) {
            tracing::warn!(
                tool = descriptor.tool.as_str(),
                action = descriptor.action,
                reason = closed.reason.as_str(),
                "Destructive action refused"
            );
            return Err(closed.into());
        }

        tracing::debug!(
            tool = descriptor.tool.as_str(),
            action = descriptor.action,
            kind = descriptor.kind.as_str(),
            variables = ?variables.names().collect::<Vec<_>>(),
            "Executing"
        );
        if descriptor.destructive {
            tracing::info!(
                tool = descriptor.tool.as_str(),
                action = descriptor.action,
                "Executing destructive action"
            );
        }

        let raw = self
            .client
            .execute(
                descriptor.document,
                &variables,
                descriptor.kind,
                descriptor.timeout,
            )
            .await?;
        let outcome = normalize::normalize(raw)?;

        if outcome.is_partial() {
            tracing::warn!(
                tool = descriptor.tool.as_str(),
                action = descriptor.action,
                errors = outcome.warnings.len(),
                "Partial success"
            );
        }
        Ok(outcome)
    }
}
