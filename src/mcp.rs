//! MCP (Model Context Protocol) JSON-RPC handler.
//!
//! Implements the [MCP specification](https://spec.modelcontextprotocol.io/)
//! over stdio: reads JSON-RPC 2.0 requests from stdin (one per line) and
//! writes responses to stdout.
//!
//! ## Supported methods
//!
//! | Method              | Description                      |
//! |---------------------|----------------------------------|
//! | `initialize`        | Handshake, returns capabilities  |
//! | `tools/list`        | List available tool definitions  |
//! | `tools/call`        | Execute a tool and return result |
//! | `ping`              | Liveness check                   |
//!
//! Each `tools/call` runs in its own task so a slow disk query does not hold
//! up a status check. Responses go through a single writer task and may be
//! written out of request order. `notifications/cancelled` aborts the
//! matching call, which drops its in-flight HTTP request; no response is
//! written for a cancelled call.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::dispatch::Dispatcher;
use crate::tools;

const SERVER_NAME: &str = "unraid-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
const PROTOCOL_VERSION: &str = "2024-11-05";

/// Run the MCP server on stdio, processing JSON-RPC requests until EOF.
pub async fn run_stdio(dispatcher: Arc<Dispatcher>) {
    let reader = BufReader::new(tokio::io::stdin());
    if let Err(e) = serve(reader, tokio::io::stdout(), dispatcher).await {
        tracing::error!(error = %e, "stdout writer task failed");
    }
}

/// Serve requests from `reader` until EOF, then wait for in-flight calls.
/// Returns the writer once everything has been flushed.
pub async fn serve<R, W>(
    mut reader: R,
    writer: W,
    dispatcher: Arc<Dispatcher>,
) -> Result<W, tokio::task::JoinError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel::<Value>();
    let writer_task = tokio::spawn(write_loop(rx, writer));
    let mut in_flight: HashMap<String, JoinHandle<()>> = HashMap::new();
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "stdin read error");
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(e) => {
                let _ = tx.send(json!({
                    "jsonrpc": "2.0",
                    "id": null,
                    "error": {
                        "code": -32700,
                        "message": format!("Parse error: {}", e)
                    }
                }));
                continue;
            }
        };

        in_flight.retain(|_, handle| !handle.is_finished());

        let id = request.get("id").cloned();
        let method = request
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        // Notifications (no id) get no response
        let Some(id) = id else {
            match method.as_str() {
                "notifications/initialized" => {}
                "notifications/cancelled" => cancel(&request, &mut in_flight),
                _ => tracing::debug!(method = %method, "Unknown notification"),
            }
            continue;
        };

        let response = match method.as_str() {
            "initialize" => handle_initialize(&request),
            "tools/list" => handle_tools_list(),
            "tools/call" => {
                let dispatcher = Arc::clone(&dispatcher);
                let tx = tx.clone();
                let key = id.to_string();
                let handle = tokio::spawn(async move {
                    let response = handle_tools_call(&request, &dispatcher).await;
                    let _ = tx.send(inject_id(response, id));
                });
                in_flight.insert(key, handle);
                continue;
            }
            "ping" => json!({ "jsonrpc": "2.0", "result": {} }),
            _ => json!({
                "jsonrpc": "2.0",
                "error": {
                    "code": -32601,
                    "message": format!("Method not found: {}", method)
                }
            }),
        };

        let _ = tx.send(inject_id(response, id));
    }

    for (_, handle) in in_flight.drain() {
        let _ = handle.await;
    }
    drop(tx);
    writer_task.await
}

/// Abort the call named by `params.requestId`, if it is still running.
fn cancel(request: &Value, in_flight: &mut HashMap<String, JoinHandle<()>>) {
    let Some(request_id) = request.pointer("/params/requestId") else {
        return;
    };
    if let Some(handle) = in_flight.remove(&request_id.to_string()) {
        handle.abort();
        let reason = request
            .pointer("/params/reason")
            .and_then(Value::as_str)
            .unwrap_or("");
        tracing::info!(request_id = %request_id, reason, "Cancelled tool call");
    }
}

/// Handle `initialize`: return protocol version, capabilities, and server info.
fn handle_initialize(request: &Value) -> Value {
    if let Some(client) = request.pointer("/params/clientInfo/name").and_then(Value::as_str) {
        tracing::info!(client, "MCP client connected");
    }
    json!({
        "jsonrpc": "2.0",
        "result": {
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            }
        }
    })
}

/// Handle `tools/list`: return all tool definitions.
fn handle_tools_list() -> Value {
    json!({
        "jsonrpc": "2.0",
        "result": {
            "tools": tools::all_tool_definitions()
        }
    })
}

/// Handle `tools/call`: dispatch to the engine.
async fn handle_tools_call(request: &Value, dispatcher: &Dispatcher) -> Value {
    let params = request.get("params").cloned().unwrap_or(json!({}));
    let name = params.get("name").and_then(Value::as_str).unwrap_or("");
    let args = params.get("arguments").cloned().unwrap_or(json!({}));

    let result = tools::handle_tool_call(name, &args, dispatcher).await;

    let mut response_result = json!({
        "content": result.content
    });
    if result.is_error {
        response_result["isError"] = json!(true);
    }

    json!({
        "jsonrpc": "2.0",
        "result": response_result
    })
}

/// Inject the request `id` into a response object.
fn inject_id(mut response: Value, id: Value) -> Value {
    response["id"] = id;
    response
}

async fn write_loop<W>(mut rx: mpsc::UnboundedReceiver<Value>, mut writer: W) -> W
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        write_response(&mut writer, &message).await;
    }
    writer
}

/// Write one JSON-RPC message (one line, flushed immediately).
async fn write_response<W: AsyncWrite + Unpin>(writer: &mut W, response: &Value) {
    let mut output = serde_json::to_string(response).unwrap_or_default();
    output.push('\n');
    if let Err(e) = writer.write_all(output.as_bytes()).await {
        tracing::error!(error = %e, "stdout write error");
    }
    if let Err(e) = writer.flush().await {
        tracing::error!(error = %e, "stdout flush error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CapabilitySet, CapabilityStore};
    use crate::client::tests::{ScriptedTransport, Step};
    use crate::client::{GraphqlClient, RetryPolicy, TimeoutPolicy};
    use std::time::Duration;

    fn dispatcher(t: Arc<ScriptedTransport>) -> Arc<Dispatcher> {
        let client = GraphqlClient::new(t, TimeoutPolicy::default(), RetryPolicy::default());
        Arc::new(Dispatcher::new(
            client,
            Arc::new(CapabilityStore::fixed(CapabilitySet::none())),
        ))
    }

    async fn run(input: &str, t: Arc<ScriptedTransport>) -> Vec<Value> {
        let out = serve(input.as_bytes(), Vec::new(), dispatcher(t))
            .await
            .unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn initialize_list_and_ping() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"clientInfo":{"name":"test"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#,
            "\n",
        );
        let out = run(input, ScriptedTransport::new(vec![])).await;
        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["id"], 1);
        assert_eq!(out[0]["result"]["serverInfo"]["name"], "unraid-mcp");
        assert_eq!(out[1]["id"], 2);
        assert!(out[1]["result"]["tools"].as_array().unwrap().len() >= 10);
        assert_eq!(out[2]["id"], "p");
    }

    #[tokio::test]
    async fn parse_error_and_unknown_method() {
        let input = "not json\n{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"resources/list\"}\n";
        let out = run(input, ScriptedTransport::new(vec![])).await;
        assert_eq!(out[0]["error"]["code"], -32700);
        assert_eq!(out[1]["error"]["code"], -32601);
        assert_eq!(out[1]["id"], 7);
    }

    #[tokio::test]
    async fn tool_call_round_trip() {
        let t = ScriptedTransport::new(vec![Step::ok(json!({"data": {"online": true}}))]);
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"unraid_health","arguments":{"action":"test_connection"}}}"#,
            "\n"
        );
        let out = run(input, t).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], 3);
        assert!(out[0]["result"].get("isError").is_none());
        let text = out[0]["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("\"online\": true"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_call_writes_no_response() {
        let t = ScriptedTransport::new(vec![
            Step::ok(json!({"data": {"array": {}}})).after(Duration::from_secs(20))
        ]);
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":9,"method":"tools/call","params":{"name":"unraid_info","arguments":{"action":"array"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":9,"reason":"user"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":10,"method":"ping"}"#,
            "\n",
        );
        let out = run(input, t).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], 10);
    }
}
