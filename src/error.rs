//! Failure taxonomy for one invocation.
//!
//! Every stage of the dispatch pipeline returns a typed failure; the MCP
//! layer renders [`EngineError::kind`], the `Display` message and
//! [`EngineError::detail`] into the tool result.

use serde_json::{json, Value};
use thiserror::Error;

use crate::gate::{capability_env_var, GateClosed};
use crate::normalize::{RemoteClass, RemoteIssue};
use crate::registry::OperationKind;
use crate::validate::ValidationError;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("Unknown operation {tool}/{action}")]
    UnknownOperation {
        tool: String,
        action: String,
        /// Actions the tool does support; empty when the tool itself is unknown.
        available: Vec<&'static str>,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    GateClosed(#[from] GateClosed),

    #[error("Unraid API unreachable after {attempts} attempt(s): {message}")]
    Unreachable {
        attempts: u32,
        message: String,
        kind: OperationKind,
    },

    #[error("Unraid API returned HTTP {status}")]
    HttpError { status: u16, body: String },

    #[error("Response is not a GraphQL envelope")]
    MalformedResponse(String),

    #[error("Unraid API error ({class}): {message}")]
    Remote {
        class: RemoteClass,
        message: String,
        errors: Vec<RemoteIssue>,
    },
}

impl EngineError {
    /// Build a remote error headed by the most specific class present.
    pub fn remote(errors: Vec<RemoteIssue>) -> Self {
        let class = errors
            .iter()
            .map(|e| e.class)
            .max()
            .unwrap_or(RemoteClass::RemoteInternal);
        let message = errors
            .iter()
            .filter(|e| e.class == class)
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Self::Remote {
            class,
            message,
            errors,
        }
    }

    /// Stable kind string, `Family` or `Family/Subkind`.
    pub fn kind(&self) -> String {
        match self {
            Self::UnknownOperation { .. } => "UnknownOperation".to_string(),
            Self::Validation(e) => format!("ValidationError/{}", e.kind()),
            Self::GateClosed(_) => "GateClosed".to_string(),
            Self::Unreachable { .. } => "Unreachable".to_string(),
            Self::HttpError { .. } => "HttpError".to_string(),
            Self::MalformedResponse(_) => "MalformedResponse".to_string(),
            Self::Remote { class, .. } => format!("RemoteError/{}", class.as_str()),
        }
    }

    /// Structured context for the caller.
    pub fn detail(&self) -> Option<Value> {
        match self {
            Self::UnknownOperation { available, .. } if available.is_empty() => None,
            Self::UnknownOperation { available, .. } => {
                Some(json!({ "available_actions": available }))
            }
            Self::Validation(e) => match e {
                ValidationError::UnknownParameter { accepted, .. } => Some(json!({
                    "parameter": e.parameter(),
                    "accepted": accepted,
                })),
                _ => Some(json!({ "parameter": e.parameter() })),
            },
            Self::GateClosed(g) => Some(json!({
                "reason": g.reason.as_str(),
                "capability_env": capability_env_var(g.tool),
                "confirm_required": true,
            })),
            Self::Unreachable { attempts, kind, .. } => {
                let mut detail = json!({ "attempts": attempts });
                if *kind == OperationKind::Mutation {
                    detail["outcome"] = json!(
                        "unknown: the mutation may or may not have been applied; query current state before retrying"
                    );
                }
                Some(detail)
            }
            Self::HttpError { status, body } => Some(json!({ "status": status, "body": body })),
            Self::MalformedResponse(body) => Some(json!({ "body": body })),
            Self::Remote { errors, .. } => Some(json!({ "errors": errors })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateReason;
    use crate::registry::Tool;

    #[test]
    fn kinds() {
        let e = EngineError::from(ValidationError::MissingParameter("container_id"));
        assert_eq!(e.kind(), "ValidationError/MissingParameter");
        assert_eq!(e.detail().unwrap()["parameter"], "container_id");

        let e = EngineError::HttpError {
            status: 503,
            body: String::new(),
        };
        assert_eq!(e.kind(), "HttpError");
        assert_eq!(e.to_string(), "Unraid API returned HTTP 503");
    }

    #[test]
    fn remote_headline_is_most_specific() {
        let e = EngineError::remote(vec![
            RemoteIssue {
                class: RemoteClass::RemoteInternal,
                message: "boom".into(),
                path: None,
            },
            RemoteIssue {
                class: RemoteClass::NotFound,
                message: "no vm".into(),
                path: None,
            },
        ]);
        assert_eq!(e.kind(), "RemoteError/NotFound");
        assert_eq!(e.to_string(), "Unraid API error (NotFound): no vm");
        assert_eq!(e.detail().unwrap()["errors"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn unreachable_mutation_flags_unknown_outcome() {
        let q = EngineError::Unreachable {
            attempts: 2,
            message: "reset".into(),
            kind: OperationKind::Query,
        };
        assert!(q.detail().unwrap().get("outcome").is_none());

        let m = EngineError::Unreachable {
            attempts: 1,
            message: "reset".into(),
            kind: OperationKind::Mutation,
        };
        assert!(m.detail().unwrap()["outcome"]
            .as_str()
            .unwrap()
            .starts_with("unknown"));
    }

    #[test]
    fn gate_detail_names_env_var() {
        let e = EngineError::from(GateClosed {
            tool: Tool::Vm,
            action: "reset",
            reason: GateReason::Both,
        });
        let d = e.detail().unwrap();
        assert_eq!(d["capability_env"], "UNRAID_ALLOW_DESTRUCTIVE_VM");
        assert_eq!(d["reason"], "capability_disabled_and_not_confirmed");
    }

    #[test]
    fn unknown_operation_lists_actions() {
        let e = EngineError::UnknownOperation {
            tool: "docker".into(),
            action: "restart".into(),
            available: vec!["list", "start"],
        };
        assert_eq!(e.to_string(), "Unknown operation docker/restart");
        assert_eq!(e.detail().unwrap()["available_actions"][1], "start");
    }
}
