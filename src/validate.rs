//! Parameter validation and variable marshalling.
//!
//! [`validate`] checks caller parameters against a descriptor's variable
//! schema and produces a [`VariableSet`] ready to serialize as GraphQL
//! `variables`. It never touches the document.
//!
//! Rules, applied per schema entry in order:
//!
//! - absent (or `null`) and required → [`ValidationError::MissingParameter`]
//! - absent and optional → the entry's fallback, if any, else omitted
//! - present → coerced to the declared [`VarType`], then checked against the
//!   entry's [`Constraint`]
//!
//! Parameters that match no schema entry are rejected with
//! [`ValidationError::UnknownParameter`] before anything else, so a typo'd
//! name is reported as such instead of as a missing required parameter.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::registry::{Constraint, Descriptor, Fallback, VarSpec, VarType};

/// Longest accepted opaque identifier.
const MAX_ID_LEN: usize = 128;

/// Ordered GraphQL variables for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableSet(IndexMap<&'static str, Value>);

impl VariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Variable names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    fn insert(&mut self, spec: &VarSpec, value: Value) {
        match spec.input {
            None => {
                self.0.insert(spec.variable, value);
            }
            Some(input) => {
                let slot = self
                    .0
                    .entry(input)
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(fields) = slot {
                    fields.insert(spec.variable.to_string(), value);
                }
            }
        }
    }
}

/// Why caller parameters were rejected. Never reaches the network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid type for parameter '{name}': expected {expected}")]
    InvalidType {
        name: &'static str,
        expected: String,
    },
    #[error("Invalid value for parameter '{name}': {reason}")]
    ConstraintViolation { name: &'static str, reason: String },
    #[error("Unknown parameter '{name}' (accepted: {})", format_accepted(.accepted))]
    UnknownParameter {
        name: String,
        accepted: Vec<&'static str>,
    },
}

impl ValidationError {
    /// Sub-kind name used in error reports.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingParameter(_) => "MissingParameter",
            ValidationError::InvalidType { .. } => "InvalidType",
            ValidationError::ConstraintViolation { .. } => "ConstraintViolation",
            ValidationError::UnknownParameter { .. } => "UnknownParameter",
        }
    }

    /// The offending parameter name.
    pub fn parameter(&self) -> &str {
        match self {
            ValidationError::MissingParameter(name)
            | ValidationError::InvalidType { name, .. }
            | ValidationError::ConstraintViolation { name, .. } => *name,
            ValidationError::UnknownParameter { name, .. } => name.as_str(),
        }
    }
}

fn format_accepted(accepted: &[&str]) -> String {
    if accepted.is_empty() {
        "none".to_string()
    } else {
        accepted.join(", ")
    }
}

/// Validate `params` against `descriptor` and build its variables.
pub fn validate(
    descriptor: &Descriptor,
    params: &Map<String, Value>,
) -> Result<VariableSet, ValidationError> {
    if let Some(unknown) = params.keys().find(|k| descriptor.var(k).is_none()) {
        return Err(ValidationError::UnknownParameter {
            name: unknown.clone(),
            accepted: descriptor.variables.iter().map(|v| v.name).collect(),
        });
    }

    let mut variables = VariableSet::new();
    for spec in descriptor.variables {
        let supplied = params.get(spec.name).filter(|v| !v.is_null());
        let value = match (supplied, spec.fallback) {
            (Some(raw), _) => {
                let value = coerce(spec, raw)?;
                if let Some(constraint) = spec.constraint {
                    check(spec.name, constraint, &value)?;
                }
                value
            }
            (None, _) if spec.required => {
                return Err(ValidationError::MissingParameter(spec.name))
            }
            (None, Some(fallback)) => fallback_value(fallback),
            (None, None) => continue,
        };
        variables.insert(spec, value);
    }
    Ok(variables)
}

fn fallback_value(fallback: Fallback) -> Value {
    match fallback {
        Fallback::Int(n) => Value::from(n),
        Fallback::Str(s) => Value::from(s),
        Fallback::Bool(b) => Value::from(b),
    }
}

fn invalid(spec: &VarSpec, expected: impl Into<String>) -> ValidationError {
    ValidationError::InvalidType {
        name: spec.name,
        expected: expected.into(),
    }
}

/// Coerce a raw JSON value to the spec's type.
///
/// Agents routinely send numbers and booleans as strings, so `"42"` is an
/// acceptable integer and `"true"` an acceptable boolean. Floats with a
/// fractional part are never truncated.
fn coerce(spec: &VarSpec, raw: &Value) -> Result<Value, ValidationError> {
    match spec.ty {
        VarType::String => match raw {
            Value::String(s) => Ok(Value::String(s.clone())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(invalid(spec, "a string")),
        },
        VarType::Int => match raw {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .map(Value::from)
                .ok_or_else(|| invalid(spec, "an integer")),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| invalid(spec, "an integer")),
            _ => Err(invalid(spec, "an integer")),
        },
        VarType::Bool => match raw {
            Value::Bool(b) => Ok(Value::Bool(*b)),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(invalid(spec, "a boolean")),
            },
            _ => Err(invalid(spec, "a boolean")),
        },
        VarType::Enum(allowed) => {
            let expected = || format!("one of {}", allowed.join(", "));
            let s = raw.as_str().ok_or_else(|| invalid(spec, expected()))?;
            allowed
                .iter()
                .find(|candidate| candidate.eq_ignore_ascii_case(s.trim()))
                .map(|canonical| Value::from(*canonical))
                .ok_or_else(|| invalid(spec, expected()))
        }
        VarType::StringList => match raw {
            Value::String(s) => Ok(Value::Array(vec![Value::String(s.clone())])),
            Value::Array(items) if items.iter().all(Value::is_string) => {
                Ok(Value::Array(items.clone()))
            }
            _ => Err(invalid(spec, "a list of strings")),
        },
        VarType::Object => match raw {
            Value::Object(_) => Ok(raw.clone()),
            _ => Err(invalid(spec, "a JSON object")),
        },
    }
}

fn check(name: &'static str, constraint: Constraint, value: &Value) -> Result<(), ValidationError> {
    let violation = |reason: String| ValidationError::ConstraintViolation { name, reason };
    match constraint {
        Constraint::OpaqueId => {
            let id = value.as_str().unwrap_or_default();
            if id.is_empty() || id.len() > MAX_ID_LEN {
                return Err(violation(format!(
                    "identifier must be 1-{MAX_ID_LEN} characters"
                )));
            }
            if !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '.' | '-'))
            {
                return Err(violation(format!(
                    "'{id}' is not a valid identifier (allowed: letters, digits, ':', '_', '.', '-')"
                )));
            }
        }
        Constraint::PathPrefix(prefixes) => {
            let path = value.as_str().unwrap_or_default();
            if !prefixes.iter().any(|p| path.starts_with(p)) {
                return Err(violation(format!(
                    "path must start with one of: {}",
                    prefixes.join(", ")
                )));
            }
            if path.split('/').any(|segment| segment == "..") {
                return Err(violation("path must not contain '..'".to_string()));
            }
        }
        Constraint::Range { min, max } => {
            let n = value.as_i64().unwrap_or(i64::MIN);
            if n < min || n > max {
                return Err(violation(format!("must be between {min} and {max}")));
            }
        }
        Constraint::NonEmpty => {
            let empty = match value {
                Value::String(s) => s.trim().is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(fields) => fields.is_empty(),
                _ => false,
            };
            if empty {
                return Err(violation("must not be empty".to_string()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{lookup, Tool};
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("params must be an object"),
        }
    }

    fn run(tool: &str, action: &str, p: Value) -> Result<VariableSet, ValidationError> {
        validate(lookup(tool, action).unwrap(), &params(p))
    }

    #[test]
    fn maps_caller_names_to_graphql_variables() {
        let vars = run("docker", "details", json!({ "container_id": "abc123:local" })).unwrap();
        assert_eq!(vars.get("id"), Some(&json!("abc123:local")));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn omitting_any_required_parameter_is_reported() {
        for tool in Tool::ALL {
            for descriptor in crate::registry::descriptors(*tool) {
                for spec in descriptor.variables.iter().filter(|s| s.required) {
                    // Supply every other required parameter with a valid value
                    let mut p = Map::new();
                    for other in descriptor.variables.iter().filter(|s| s.required) {
                        if other.name != spec.name {
                            p.insert(other.name.to_string(), sample(other));
                        }
                    }
                    assert_eq!(
                        validate(descriptor, &p),
                        Err(ValidationError::MissingParameter(spec.name)),
                        "{}/{}",
                        descriptor.tool,
                        descriptor.action
                    );
                }
            }
        }
    }

    fn sample(spec: &VarSpec) -> Value {
        match spec.ty {
            VarType::String => match spec.constraint {
                Some(Constraint::PathPrefix(prefixes)) => json!(format!("{}syslog", prefixes[0])),
                _ => json!("abc123"),
            },
            VarType::Int => json!(1),
            VarType::Bool => json!(true),
            VarType::Enum(values) => json!(values[0]),
            VarType::StringList => json!(["ADMIN"]),
            VarType::Object => json!({ "k": "v" }),
        }
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let err = run(
            "docker",
            "details",
            json!({ "container_id": "abc", "containerid": "abc" }),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "UnknownParameter");
        assert_eq!(err.parameter(), "containerid");
        assert!(err.to_string().contains("container_id"));
    }

    #[test]
    fn unknown_parameter_on_action_without_variables() {
        let err = run("docker", "update_all", json!({ "force": true })).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownParameter { .. }));
        assert!(err.to_string().contains("accepted: none"));
    }

    #[test]
    fn null_counts_as_absent() {
        let err = run("docker", "details", json!({ "container_id": null })).unwrap_err();
        assert_eq!(err, ValidationError::MissingParameter("container_id"));
    }

    #[test]
    fn fallbacks_fill_optional_parameters() {
        let vars = run("docker", "logs", json!({ "container_id": "abc" })).unwrap();
        assert_eq!(vars.get("tail"), Some(&json!(100)));

        let vars = run("docker", "list", json!({})).unwrap();
        assert_eq!(vars.get("skipCache"), Some(&json!(false)));
    }

    #[test]
    fn optional_without_fallback_is_omitted() {
        let vars = run("notifications", "archive_all", json!({})).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn integers_accept_numeric_strings() {
        let vars = run(
            "storage",
            "logs",
            json!({ "log_path": "/var/log/syslog", "tail_lines": "250" }),
        )
        .unwrap();
        assert_eq!(vars.get("lines"), Some(&json!(250)));
    }

    #[test]
    fn integers_reject_fractions_and_garbage() {
        for bad in [json!(1.5), json!("ten"), json!(true), json!([1])] {
            let err = run(
                "storage",
                "logs",
                json!({ "log_path": "/var/log/syslog", "tail_lines": bad }),
            )
            .unwrap_err();
            assert_eq!(err.kind(), "InvalidType", "{err}");
        }
    }

    #[test]
    fn booleans_accept_string_forms() {
        let vars = run("array", "parity_start", json!({ "correct": "TRUE" })).unwrap();
        assert_eq!(vars.get("correct"), Some(&json!(true)));
        let err = run("array", "parity_start", json!({ "correct": "yes please" })).unwrap_err();
        assert_eq!(err.kind(), "InvalidType");
    }

    #[test]
    fn enums_are_case_insensitive_and_canonicalised() {
        let vars = run("notifications", "list", json!({ "importance": "warning" })).unwrap();
        assert_eq!(
            vars.get("filter"),
            Some(&json!({ "type": "UNREAD", "importance": "WARNING", "offset": 0, "limit": 20 }))
        );
    }

    #[test]
    fn enum_membership_is_enforced() {
        let err = run("notifications", "list", json!({ "importance": "urgent" })).unwrap_err();
        assert_eq!(err.kind(), "InvalidType");
        assert!(err.to_string().contains("INFO, WARNING, ALERT"));
    }

    #[test]
    fn input_fields_are_nested_under_their_variable() {
        let vars = run(
            "notifications",
            "create",
            json!({
                "title": "Backup",
                "subject": "Nightly",
                "description": "done",
                "importance": "info"
            }),
        )
        .unwrap();
        assert_eq!(vars.names().collect::<Vec<_>>(), vec!["input"]);
        assert_eq!(
            vars.get("input"),
            Some(&json!({
                "title": "Backup",
                "subject": "Nightly",
                "description": "done",
                "importance": "INFO"
            }))
        );
    }

    #[test]
    fn variables_keep_schema_order() {
        let vars = run(
            "notifications",
            "delete",
            json!({ "notification_type": "archive", "notification_id": "n1" }),
        )
        .unwrap();
        assert_eq!(vars.names().collect::<Vec<_>>(), vec!["id", "type"]);
        let wire = serde_json::to_string(&vars).unwrap();
        assert_eq!(wire, r#"{"id":"n1","type":"ARCHIVE"}"#);
    }

    #[test]
    fn malformed_identifiers_are_rejected() {
        for bad in ["", "abc def", "abc;rm -rf", "a}{b", "$(id)"] {
            let err = run("docker", "details", json!({ "container_id": bad })).unwrap_err();
            assert_eq!(err.kind(), "ConstraintViolation", "{bad:?}");
        }
        let long = "a".repeat(129);
        let err = run("docker", "details", json!({ "container_id": long })).unwrap_err();
        assert_eq!(err.kind(), "ConstraintViolation");
    }

    #[test]
    fn log_paths_must_stay_under_allowed_prefixes() {
        for bad in ["/etc/shadow", "var/log/syslog", "/var/log/../../etc/passwd"] {
            let err = run("storage", "logs", json!({ "log_path": bad })).unwrap_err();
            assert_eq!(err.kind(), "ConstraintViolation", "{bad}");
        }
        assert!(run("storage", "logs", json!({ "log_path": "/boot/logs/syslog.txt" })).is_ok());
    }

    #[test]
    fn ranges_are_inclusive() {
        let ok = |n: i64| {
            run(
                "storage",
                "logs",
                json!({ "log_path": "/var/log/syslog", "tail_lines": n }),
            )
        };
        assert!(ok(1).is_ok());
        assert!(ok(10_000).is_ok());
        assert_eq!(ok(0).unwrap_err().kind(), "ConstraintViolation");
        assert_eq!(ok(10_001).unwrap_err().kind(), "ConstraintViolation");
    }

    #[test]
    fn string_lists_accept_single_string() {
        let vars = run("keys", "create", json!({ "name": "ci", "roles": "VIEWER" })).unwrap();
        assert_eq!(vars.get("input"), Some(&json!({ "name": "ci", "roles": ["VIEWER"] })));
        let err = run("keys", "create", json!({ "name": "ci", "roles": [1, 2] })).unwrap_err();
        assert_eq!(err.kind(), "InvalidType");
    }

    #[test]
    fn objects_must_be_objects() {
        let err = run(
            "rclone",
            "create_remote",
            json!({ "name": "s3", "provider_type": "s3", "config_data": "region=eu" }),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "InvalidType");
    }

    #[test]
    fn non_empty_strings_are_trimmed() {
        let err = run(
            "notifications",
            "create",
            json!({ "title": "   ", "subject": "s", "description": "", "importance": "INFO" }),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::ConstraintViolation {
                name: "title",
                reason: "must not be empty".into()
            }
        );
    }
}
