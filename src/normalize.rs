//! GraphQL envelope interpretation.
//!
//! Turns a [`RawResponse`] into either the `data` payload or a classified
//! [`EngineError`]. Remote errors are classified from `extensions.code` when
//! the server provides one and from the message text otherwise.
//!
//! A response carrying both `data` and `errors` is a partial success: the
//! sections that resolved are returned, and the errors travel alongside them
//! as warnings.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::EngineError;
use crate::transport::RawResponse;

/// Classification of one GraphQL `errors` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RemoteClass {
    // Declared least to most specific; `Ord` picks the headline class.
    RemoteInternal,
    RemoteValidation,
    NotFound,
    Unauthorized,
}

impl RemoteClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "Unauthorized",
            Self::RemoteValidation => "RemoteValidation",
            Self::NotFound => "NotFound",
            Self::RemoteInternal => "RemoteInternal",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "UNAUTHENTICATED" | "UNAUTHORIZED" | "FORBIDDEN" => Some(Self::Unauthorized),
            "GRAPHQL_VALIDATION_FAILED" | "GRAPHQL_PARSE_FAILED" | "BAD_USER_INPUT"
            | "BAD_REQUEST" => Some(Self::RemoteValidation),
            "NOT_FOUND" => Some(Self::NotFound),
            "INTERNAL_SERVER_ERROR" => Some(Self::RemoteInternal),
            _ => None,
        }
    }

    fn from_message(message: &str) -> Self {
        let m = message.to_ascii_lowercase();
        if ["unauthorized", "forbidden", "not authenticated", "permission", "api key"]
            .iter()
            .any(|p| m.contains(p))
        {
            Self::Unauthorized
        } else if ["not found", "does not exist", "no such"]
            .iter()
            .any(|p| m.contains(p))
        {
            Self::NotFound
        } else if [
            "cannot query field",
            "unknown argument",
            "unknown type",
            "expected type",
            "variable \"$",
            "syntax error",
        ]
        .iter()
        .any(|p| m.contains(p))
        {
            Self::RemoteValidation
        } else {
            Self::RemoteInternal
        }
    }
}

impl std::fmt::Display for RemoteClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remote error, message preserved verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteIssue {
    pub class: RemoteClass,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Value>,
}

impl RemoteIssue {
    fn from_entry(entry: &Value) -> Self {
        let message = entry
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| entry.to_string());
        let class = entry
            .pointer("/extensions/code")
            .and_then(Value::as_str)
            .and_then(RemoteClass::from_code)
            .unwrap_or_else(|| RemoteClass::from_message(&message));
        let path = entry.get("path").cloned();
        Self {
            class,
            message,
            path,
        }
    }
}

/// Successful result of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub data: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<RemoteIssue>,
}

impl Outcome {
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

pub fn normalize(raw: RawResponse) -> Result<Outcome, EngineError> {
    let envelope = match parse_envelope(&raw.body) {
        Some(envelope) => envelope,
        None if raw.is_success() => {
            return Err(EngineError::MalformedResponse(snippet(&raw.body)));
        }
        None => {
            return Err(EngineError::HttpError {
                status: raw.status,
                body: snippet(&raw.body),
            });
        }
    };

    let issues: Vec<RemoteIssue> = match envelope.get("errors") {
        Some(Value::Array(entries)) => entries.iter().map(RemoteIssue::from_entry).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![RemoteIssue::from_entry(other)],
    };
    // A failing status without a GraphQL error to explain it is an HTTP
    // failure, even if the body happens to carry `data`.
    if !raw.is_success() && issues.is_empty() {
        return Err(EngineError::HttpError {
            status: raw.status,
            body: snippet(&raw.body),
        });
    }
    let data = envelope.get("data").filter(|d| !d.is_null()).cloned();

    match (data, issues.is_empty()) {
        (Some(data), true) => Ok(Outcome {
            data,
            warnings: Vec::new(),
        }),
        (Some(data), false) => Ok(Outcome {
            data,
            warnings: issues,
        }),
        (None, false) => Err(EngineError::remote(issues)),
        (None, true) => Ok(Outcome {
            data: Value::Null,
            warnings: Vec::new(),
        }),
    }
}

/// A JSON object with at least one of `data` / `errors`.
fn parse_envelope(body: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) if map.contains_key("data") || map.contains_key("errors") => {
            Some(map)
        }
        _ => None,
    }
}

const SNIPPET_LEN: usize = 512;

fn snippet(body: &str) -> String {
    let body = body.trim();
    if body.len() <= SNIPPET_LEN {
        return body.to_string();
    }
    let mut end = SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: u16, body: Value) -> RawResponse {
        RawResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn data_only_is_ok() {
        let out = normalize(raw(200, json!({"data": {"online": true}}))).unwrap();
        assert_eq!(out.data, json!({"online": true}));
        assert!(!out.is_partial());
    }

    #[test]
    fn data_and_errors_is_partial_success() {
        let out = normalize(raw(
            200,
            json!({"data": {"a": 1}, "errors": [{"message": "b failed"}]}),
        ))
        .unwrap();
        assert_eq!(out.data, json!({"a": 1}));
        assert!(out.is_partial());
        assert_eq!(out.warnings[0].message, "b failed");
        assert_eq!(out.warnings[0].class, RemoteClass::RemoteInternal);
    }

    #[test]
    fn null_data_with_errors_is_remote_error() {
        let err = normalize(raw(
            200,
            json!({"data": null, "errors": [{"message": "Container not found"}]}),
        ))
        .unwrap_err();
        match err {
            EngineError::Remote { class, ref errors, .. } => {
                assert_eq!(class, RemoteClass::NotFound);
                assert_eq!(errors.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn most_specific_class_wins() {
        let err = normalize(raw(
            200,
            json!({"errors": [
                {"message": "boom"},
                {"message": "nope", "extensions": {"code": "FORBIDDEN"}},
                {"message": "Cannot query field \"x\" on type \"Query\"."}
            ]}),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), "RemoteError/Unauthorized");
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn extension_code_beats_message_heuristic() {
        let issue = RemoteIssue::from_entry(&json!({
            "message": "thing not found",
            "extensions": {"code": "BAD_USER_INPUT"}
        }));
        assert_eq!(issue.class, RemoteClass::RemoteValidation);
    }

    #[test]
    fn message_heuristics() {
        for (msg, class) in [
            ("Invalid API key", RemoteClass::Unauthorized),
            ("VM does not exist", RemoteClass::NotFound),
            ("Unknown argument \"foo\" on field", RemoteClass::RemoteValidation),
            ("Variable \"$id\" got invalid value", RemoteClass::RemoteValidation),
            ("ECONNREFUSED /var/run/docker.sock", RemoteClass::RemoteInternal),
        ] {
            assert_eq!(RemoteClass::from_message(msg), class, "{msg}");
        }
    }

    #[test]
    fn non_json_2xx_is_malformed() {
        let err = normalize(RawResponse {
            status: 200,
            body: "<html>login</html>".into(),
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::MalformedResponse(_)));
    }

    #[test]
    fn json_without_envelope_keys_is_malformed() {
        let err = normalize(raw(200, json!({"result": 1}))).unwrap_err();
        assert!(matches!(err, EngineError::MalformedResponse(_)));
    }

    #[test]
    fn non_2xx_without_envelope_is_http_error() {
        let err = normalize(RawResponse {
            status: 502,
            body: "Bad Gateway".into(),
        })
        .unwrap_err();
        match err {
            EngineError::HttpError { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_2xx_with_data_only_is_http_error() {
        let err = normalize(raw(500, json!({"data": {"a": 1}}))).unwrap_err();
        match err {
            EngineError::HttpError { status, ref body } => {
                assert_eq!(status, 500);
                assert!(body.contains("\"a\":1"));
            }
            other => panic!("unexpected {other:?}"),
        }

        let err = normalize(raw(503, json!({"data": null, "errors": []}))).unwrap_err();
        assert_eq!(err.kind(), "HttpError");
    }

    #[test]
    fn non_2xx_with_error_envelope_is_remote() {
        let err = normalize(raw(
            400,
            json!({"errors": [{"message": "Syntax Error: Unexpected Name"}]}),
        ))
        .unwrap_err();
        assert_eq!(err.kind(), "RemoteError/RemoteValidation");
    }

    #[test]
    fn empty_errors_list_is_ignored() {
        let out = normalize(raw(200, json!({"data": {"x": 1}, "errors": []}))).unwrap();
        assert!(!out.is_partial());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "é".repeat(600);
        let s = snippet(&body);
        assert!(s.ends_with("..."));
        assert!(s.len() <= SNIPPET_LEN + 3);
    }
}
