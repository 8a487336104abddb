// Project Gate - MCP Server (JSON-RPC 2.0 over stdio)
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// One JSON message per line on stdin, one response per line on stdout.
// Diagnostics go to stderr through the log facade, never to stdout.
// Exposes: read_file, write_file, list_files, execute_command,
//          get_app_config, schedule_notification

use crate::dispatch::Dispatcher;
use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// Summarize tool params for logging (truncate large values)
fn param_summary(name: &str, args: &Value) -> String {
    let field = |key: &str| args.get(key).and_then(|v| v.as_str());
    let summary = match name {
        "write_file" => {
            let size = field("content").map(|s| s.len()).unwrap_or(0);
            format!("path={} content_len={}", field("filePath").unwrap_or("?"), size)
        }
        "read_file" => format!("path={}", field("filePath").unwrap_or("?")),
        "list_files" => format!("path={}", field("dirPath").unwrap_or(".")),
        "execute_command" => format!("cmd={} cwd={}", field("command").unwrap_or("?"), field("cwd").unwrap_or(".")),
        _ => args.to_string(),
    };
    if summary.chars().count() > 300 {
        format!("{}…", summary.chars().take(300).collect::<String>())
    } else {
        summary
    }
}

fn response(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

fn error_response(id: &Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

/// Handle one decoded message. `None` means no reply is owed
/// (notifications, and anything else sent without an id).
pub fn handle_message(dispatcher: &Dispatcher, msg: &Value) -> Option<Value> {
    let method = msg["method"].as_str().unwrap_or("");
    let id = msg.get("id").filter(|v| !v.is_null()).cloned();
    let params = &msg["params"];

    log::debug!("Received: {}", method);

    let Some(id) = id else {
        if method != "notifications/initialized" {
            log::debug!("Ignoring notification {}", method);
        }
        return None;
    };

    let reply = match method {
        "initialize" => response(&id, json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": dispatcher.config().server_name,
                "version": SERVER_VERSION,
            }
        })),

        "tools/list" => response(&id, json!({ "tools": dispatcher.definitions() })),

        "tools/call" => {
            let Some(name) = params["name"].as_str() else {
                return Some(error_response(&id, INVALID_PARAMS, "Missing tool name"));
            };
            let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

            log::info!("CALL {} | {}", name, param_summary(name, &args));

            match dispatcher.call(name, &args) {
                Some(result) => response(&id, result.to_protocol()),
                None => error_response(&id, INVALID_PARAMS, &format!("Unknown tool: {}", name)),
            }
        }

        "ping" => response(&id, json!({})),

        _ => error_response(&id, METHOD_NOT_FOUND, &format!("Unknown method: {}", method)),
    };
    Some(reply)
}

fn send<W: Write>(out: &mut W, msg: &Value) -> Result<()> {
    let line = serde_json::to_string(msg)?;
    out.write_all(line.as_bytes()).context("Failed to write response")?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Serve until the reader hits EOF
pub fn serve<R: BufRead, W: Write>(dispatcher: &Dispatcher, reader: R, mut writer: W) -> Result<()> {
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("stdin read error: {}", e);
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("JSON parse error: {}", e);
                send(&mut writer, &error_response(&Value::Null, PARSE_ERROR, &format!("Parse error: {}", e)))?;
                continue;
            }
        };

        if let Some(reply) = handle_message(dispatcher, &msg) {
            send(&mut writer, &reply)?;
        }
    }
    log::info!("stdin closed, shutting down");
    Ok(())
}

/// Main MCP server loop on stdio
pub fn run(dispatcher: Dispatcher) -> Result<()> {
    log::info!("Starting {} v{}", dispatcher.config().server_name, SERVER_VERSION);
    log::info!("Root boundary: {}", dispatcher.root().display());

    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(&dispatcher, stdin.lock(), stdout.lock())
}

// ============================================================================
// TESTS
// ============================================================================
