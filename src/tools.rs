//! MCP tool definitions and handlers.
//!
//! Every engine tool is exposed as one MCP tool named `unraid_<tool>`. Its
//! input schema is generated from the registry: an `action` enum listing the
//! tool's actions, the union of all action parameters, and a `confirm` flag
//! when the tool has destructive actions.
//!
//! [`handle_tool_call`] strips `action` and `confirm` from the arguments and
//! hands the rest to [`Dispatcher::invoke`](crate::dispatch::Dispatcher::invoke).

use serde_json::{json, Map, Value};

use crate::dispatch::{Dispatcher, Invocation};
use crate::error::EngineError;
use crate::normalize::Outcome;
use crate::registry::{self, Constraint, Descriptor, Tool, VarSpec, VarType};
use crate::validate::ValidationError;

/// Returns the tool definitions for `tools/list`.
pub fn all_tool_definitions() -> Vec<Value> {
    Tool::ALL.iter().map(|t| tool_definition(*t)).collect()
}

fn tool_definition(tool: Tool) -> Value {
    let descriptors = registry::descriptors(tool);
    let destructive: Vec<&str> = descriptors
        .iter()
        .filter(|d| d.destructive)
        .map(|d| d.action)
        .collect();

    let mut description = format!("{}\n\nActions:", tool.summary());
    for d in &descriptors {
        description.push_str(&format!("\n- {}: {}", d.action, d.description));
        if d.destructive {
            description.push_str(" [destructive]");
        }
    }
    if !destructive.is_empty() {
        description.push_str(&format!(
            "\n\nDestructive actions ({}) require confirm=true and must be enabled by the operator.",
            destructive.join(", ")
        ));
    }

    let mut properties = Map::new();
    properties.insert(
        "action".to_string(),
        json!({
            "type": "string",
            "enum": descriptors.iter().map(|d| d.action).collect::<Vec<_>>(),
            "description": "Operation to perform."
        }),
    );

    // One property per distinct parameter name, in first-seen order.
    let mut seen: Vec<&'static str> = Vec::new();
    for d in &descriptors {
        for spec in d.variables {
            if seen.contains(&spec.name) {
                continue;
            }
            seen.push(spec.name);
            properties.insert(spec.name.to_string(), property_schema(spec, &descriptors));
        }
    }

    if !destructive.is_empty() {
        properties.insert(
            "confirm".to_string(),
            json!({
                "type": "boolean",
                "description": "Must be true to run a destructive action. Ignored otherwise."
            }),
        );
    }

    json!({
        "name": tool.mcp_name(),
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": ["action"],
            "additionalProperties": false
        }
    })
}

fn property_schema(spec: &VarSpec, descriptors: &[&'static Descriptor]) -> Value {
    let mut schema = match spec.ty {
        VarType::String => json!({ "type": "string" }),
        VarType::Int => json!({ "type": "integer" }),
        VarType::Bool => json!({ "type": "boolean" }),
        VarType::Enum(values) => json!({ "type": "string", "enum": values }),
        VarType::StringList => json!({ "type": "array", "items": { "type": "string" } }),
        VarType::Object => json!({ "type": "object" }),
    };
    if let Some(Constraint::Range { min, max }) = spec.constraint {
        schema["minimum"] = json!(min);
        schema["maximum"] = json!(max);
    }

    let used_by: Vec<String> = descriptors
        .iter()
        .filter_map(|d| {
            d.var(spec.name).map(|v| {
                if v.required {
                    format!("{} (required)", d.action)
                } else {
                    d.action.to_string()
                }
            })
        })
        .collect();
    let mut text = spec.description.to_string();
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(&format!("Used by: {}.", used_by.join(", ")));
    schema["description"] = json!(text);
    schema
}

/// Dispatch a tool call by name to the engine.
pub async fn handle_tool_call(name: &str, args: &Value, dispatcher: &Dispatcher) -> ToolResult {
    let Some(tool) = Tool::from_mcp_name(name) else {
        return ToolResult::error(format!("Unknown tool: {}", name));
    };

    let mut params = match args {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        _ => return ToolResult::error("Tool arguments must be a JSON object".to_string()),
    };

    let action = match params.remove("action") {
        Some(Value::String(a)) => a,
        None | Some(Value::Null) => {
            return ToolResult::engine_error(&EngineError::from(
                ValidationError::MissingParameter("action"),
            ));
        }
        Some(_) => {
            return ToolResult::engine_error(&EngineError::from(ValidationError::InvalidType {
                name: "action",
                expected: "string".to_string(),
            }));
        }
    };

    let confirm = match params.remove("confirm") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => b,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        Some(_) => {
            return ToolResult::engine_error(&EngineError::from(ValidationError::InvalidType {
                name: "confirm",
                expected: "boolean".to_string(),
            }));
        }
    };

    let request = Invocation::new(tool.as_str(), action)
        .params(params)
        .confirmed(confirm);
    match dispatcher.invoke(request).await {
        Ok(outcome) => ToolResult::outcome(outcome),
        Err(e) => ToolResult::engine_error(&e),
    }
}

/// Result of a tool call, ready to be serialized into an MCP response.
pub struct ToolResult {
    /// MCP content blocks (typically a single `{"type":"text","text":"..."}` entry).
    pub content: Vec<Value>,
    /// Whether the tool call failed (maps to `isError` in the MCP response).
    pub is_error: bool,
}

impl ToolResult {
    fn success(value: Value) -> Self {
        let text = serde_json::to_string_pretty(&value).unwrap_or_default();
        Self {
            content: vec![json!({ "type": "text", "text": text })],
            is_error: false,
        }
    }

    fn error(message: String) -> Self {
        Self {
            content: vec![json!({ "type": "text", "text": message })],
            is_error: true,
        }
    }

    fn outcome(outcome: Outcome) -> Self {
        if outcome.is_partial() {
            Self::success(json!({
                "data": outcome.data,
                "warnings": outcome.warnings,
            }))
        } else {
            Self::success(outcome.data)
        }
    }

    fn engine_error(err: &EngineError) -> Self {
        let mut body = json!({
            "error": {
                "kind": err.kind(),
                "message": err.to_string(),
            }
        });
        if let Some(detail) = err.detail() {
            body["error"]["detail"] = detail;
        }
        let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| err.to_string());
        Self::error(text)
    }

    /// Text of the first content block.
    #[cfg(test)]
    pub fn text(&self) -> &str {
        self.content
            .first()
            .and_then(|c| c.get("text"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}
