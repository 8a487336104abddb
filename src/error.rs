// Project Gate - Tool Errors
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every failure a tool call can produce. Caught at the handler boundary
// and turned into a failure envelope, never propagated out of the server.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// Tool-level failure taxonomy
#[derive(Debug, Error)]
pub enum ToolError {
    /// Argument object failed type / requiredness / enum validation
    #[error("{0}")]
    Shape(String),

    /// Resolved path escapes the root boundary (or could not be resolved)
    #[error("{0}")]
    Containment(String),

    /// Underlying read / write / stat / readdir failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed date or malformed JSON configuration
    #[error("{0}")]
    Parse(String),

    /// Spawn failure, non-zero exit, or output cap exceeded
    #[error("{message}")]
    Process {
        message: String,
        stdout: Option<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },
}

impl ToolError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::Process { message: message.into(), stdout: None, stderr: None, exit_code: None }
    }

    /// Stable machine-readable kind, surfaced in the failure envelope
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Shape(_) => "shape",
            Self::Containment(_) => "containment",
            Self::Io { .. } => "io",
            Self::Parse(_) => "parse",
            Self::Process { .. } => "process",
        }
    }

    /// Extra structured fields carried alongside the message.
    /// Only process failures have any: partial output is kept, not collapsed.
    pub fn details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        if let Self::Process { stdout, stderr, exit_code, .. } = self {
            if let Some(out) = stdout {
                details.insert("stdout".to_string(), json!(out));
            }
            if let Some(err) = stderr {
                details.insert("stderr".to_string(), json!(err));
            }
            if let Some(code) = exit_code {
                details.insert("exitCode".to_string(), json!(code));
            }
        }
        details
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_message_includes_context_and_source() {
        let err = ToolError::io(
            "Failed to read missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.kind(), "io");
        assert_eq!(err.to_string(), "Failed to read missing.txt: no such file");
        assert!(err.details().is_empty());
    }

    #[test]
    fn process_details_keep_output() {
        let err = ToolError::Process {
            message: "Command failed".to_string(),
            stdout: Some("partial".to_string()),
            stderr: None,
            exit_code: Some(2),
        };
        let details = err.details();
        assert_eq!(details["stdout"], "partial");
        assert_eq!(details["exitCode"], 2);
        assert!(!details.contains_key("stderr"));
    }
}
