// Project Gate - Tool Dispatcher
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every tool call passes through here:
//   Received -> ShapeValidated -> (PathGuarded) -> Executed -> Responded
// Any step may short-circuit to a failure envelope. Nothing in here
// panics or exits on a tool-level error.

use crate::config::{read_app_config, GateConfig};
use crate::envelope::ToolResponse;
use crate::error::ToolError;
use crate::exec::run_command;
use crate::files::{list_dir, read_text, write_text};
use crate::guard::PathGuard;
use crate::notify::{self, NotificationIds, NotificationRequest, REPEAT_INTERVALS};
use crate::schema::{parse_args, Field, FieldType, ToolSpec};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::path::Path;

const TRIGGER_TIME_HELP: &str = "When to fire. Accepted: RFC 3339 ('2024-01-20T10:00:00Z', \
'2024-01-20T12:00:00+02:00'), offset without colon ('2024-01-20T12:00:00+0200'), \
RFC 2822 ('Sat, 20 Jan 2024 10:00:00 +0000'), local date-time ('2024-01-20T10:00' or \
'2024-01-20 10:00:00'), or a bare date ('2024-01-20', UTC midnight)";

pub const READ_FILE: &str = "read_file";
pub const WRITE_FILE: &str = "write_file";
pub const LIST_FILES: &str = "list_files";
pub const EXECUTE_COMMAND: &str = "execute_command";
pub const GET_APP_CONFIG: &str = "get_app_config";
pub const SCHEDULE_NOTIFICATION: &str = "schedule_notification";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadFileArgs {
    file_path: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteFileArgs {
    file_path: String,
    content: String,
    create_directories: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListFilesArgs {
    dir_path: String,
    recursive: bool,
}

#[derive(Debug, Deserialize)]
struct ExecuteCommandArgs {
    command: String,
    cwd: Option<String>,
}

/// Return all tool specs
fn tool_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            READ_FILE,
            "Read the contents of a file inside the project.",
            vec![Field::required("filePath", FieldType::String, "File path, relative to the project root")],
        ),
        ToolSpec::new(
            WRITE_FILE,
            "Write or replace a file inside the project. Creates the file if it does not exist.",
            vec![
                Field::required("filePath", FieldType::String, "File path, relative to the project root"),
                Field::required("content", FieldType::String, "Content to write"),
                Field::optional("createDirectories", FieldType::Boolean, "Create missing parent directories")
                    .with_default(json!(true)),
            ],
        ),
        ToolSpec::new(
            LIST_FILES,
            "List files in a project directory. Hidden entries are skipped.",
            vec![
                Field::optional("dirPath", FieldType::String, "Directory, relative to the project root")
                    .with_default(json!(".")),
                Field::optional("recursive", FieldType::Boolean, "List subdirectories recursively")
                    .with_default(json!(false)),
            ],
        ),
        ToolSpec::new(
            EXECUTE_COMMAND,
            "Run a shell command inside the project (install packages, run scripts, etc.).",
            vec![
                Field::required("command", FieldType::String, "Command line to run"),
                Field::optional("cwd", FieldType::String, "Working directory, relative to the project root"),
            ],
        ),
        ToolSpec::new(
            GET_APP_CONFIG,
            "Get the project's app configuration (app.json).",
            vec![],
        ),
        ToolSpec::new(
            SCHEDULE_NOTIFICATION,
            "Schedule a local notification for the app. Returns the notification record; nothing is delivered by this server.",
            vec![
                Field::required("title", FieldType::String, "Notification title"),
                Field::required("body", FieldType::String, "Notification body"),
                Field::required(
                    "triggerTime",
                    FieldType::String,
                    TRIGGER_TIME_HELP,
                ),
                Field::optional("repeatInterval", FieldType::OneOf(REPEAT_INTERVALS), "Repeat interval")
                    .with_default(json!("none")),
                Field::optional("data", FieldType::Object, "Extra data delivered with the notification")
                    .with_default(json!({})),
            ],
        ),
    ]
}

/// Routes tool calls to handlers. Owns the only process-wide state:
/// the guard (root boundary), server settings and the id generator.
pub struct Dispatcher {
    guard: PathGuard,
    config: GateConfig,
    ids: NotificationIds,
    specs: Vec<ToolSpec>,
}

impl Dispatcher {
    pub fn new(guard: PathGuard, config: GateConfig) -> Self {
        Self { guard, config, ids: NotificationIds::new(), specs: tool_specs() }
    }

    pub fn root(&self) -> &Path {
        self.guard.root()
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn spec(&self, name: &str) -> Option<&ToolSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// MCP tool definitions for tools/list
    pub fn definitions(&self) -> Vec<Value> {
        self.specs.iter().map(ToolSpec::definition).collect()
    }

    /// Run one tool call. `None` when no tool has that name.
    pub fn call(&self, name: &str, args: &Value) -> Option<ToolResponse> {
        let spec = self.spec(name)?;
        let result = spec.validate(args).and_then(|validated| self.execute(name, validated));
        let response = ToolResponse::from_result(result);
        match response.error() {
            Some(err) => log::warn!("{} failed: {}", name, err),
            None => log::debug!("{} ok", name),
        }
        Some(response)
    }

    fn execute(&self, name: &str, args: Map<String, Value>) -> Result<Value, ToolError> {
        match name {
            READ_FILE => self.read_file(parse_args(args)?),
            WRITE_FILE => self.write_file(parse_args(args)?),
            LIST_FILES => self.list_files(parse_args(args)?),
            EXECUTE_COMMAND => self.execute_command(parse_args(args)?),
            GET_APP_CONFIG => self.get_app_config(),
            SCHEDULE_NOTIFICATION => self.schedule_notification(parse_args(args)?),
            other => Err(ToolError::Shape(format!("Unknown tool: {}", other))),
        }
    }

    // ========================================================================
    // HANDLERS
    // ========================================================================

    fn read_file(&self, args: ReadFileArgs) -> Result<Value, ToolError> {
        let path = self.guard.resolve(&args.file_path)?;
        let content = read_text(&path, &args.file_path)?;
        Ok(json!({
            "filePath": args.file_path,
            "content": content,
        }))
    }

    fn write_file(&self, args: WriteFileArgs) -> Result<Value, ToolError> {
        let path = self.guard.resolve(&args.file_path)?;
        let size = write_text(&path, &args.content, args.create_directories, &args.file_path)?;
        Ok(json!({
            "filePath": args.file_path,
            "message": "File created/updated successfully",
            "size": size,
        }))
    }

    fn list_files(&self, args: ListFilesArgs) -> Result<Value, ToolError> {
        let dir = self.guard.resolve(&args.dir_path)?;
        let files = list_dir(self.root(), &dir, args.recursive, &self.config.hidden_prefix)?;
        Ok(json!({
            "dirPath": args.dir_path,
            "count": files.len(),
            "files": files,
        }))
    }

    fn execute_command(&self, args: ExecuteCommandArgs) -> Result<Value, ToolError> {
        let cwd = match args.cwd.as_deref() {
            Some(rel) => self.guard.resolve(rel)?,
            None => self.root().to_path_buf(),
        };
        let output = run_command(&args.command, &cwd, self.config.max_output_bytes)?;
        let stderr = if output.stderr.is_empty() { Value::Null } else { json!(output.stderr) };
        Ok(json!({
            "command": args.command,
            "cwd": cwd.to_string_lossy(),
            "stdout": output.stdout,
            "stderr": stderr,
        }))
    }

    fn get_app_config(&self) -> Result<Value, ToolError> {
        let config = read_app_config(self.root(), &self.config.app_config_file)?;
        Ok(json!({ "config": config }))
    }

    fn schedule_notification(&self, request: NotificationRequest) -> Result<Value, ToolError> {
        let (notification, message) = notify::schedule(request, &self.ids, Utc::now())?;
        Ok(json!({
            "notification": notification,
            "message": message,
        }))
    }
}

// ============================================================================
// TESTS
// ============================================================================
