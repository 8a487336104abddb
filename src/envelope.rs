// Project Gate - Response Envelope
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// The single success/failure wrapper every tool result goes through.
//   success: { "success": true,  ...payload }
//   failure: { "success": false, "error": msg, "kind": kind, ...details }

use crate::error::ToolError;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    success: bool,
    body: Map<String, Value>,
}

impl ToolResponse {
    /// Success envelope. Object payloads are flattened into the envelope;
    /// anything else is carried under "result".
    pub fn success(payload: Value) -> Self {
        let mut body = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        body.insert("success".to_string(), Value::Bool(true));
        Self { success: true, body }
    }

    pub fn failure(err: &ToolError) -> Self {
        let mut body = err.details();
        body.insert("success".to_string(), Value::Bool(false));
        body.insert("error".to_string(), json!(err.to_string()));
        body.insert("kind".to_string(), json!(err.kind()));
        Self { success: false, body }
    }

    pub fn from_result(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(payload) => Self::success(payload),
            Err(e) => Self::failure(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Field lookup on the envelope body
    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Failure message, if this is a failure envelope
    pub fn error(&self) -> Option<&str> {
        if self.success {
            return None;
        }
        self.body.get("error").and_then(|v| v.as_str())
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.body.clone())
    }

    /// Pretty-printed envelope, as carried in the protocol text item
    pub fn to_text(&self) -> String {
        let value = self.to_json();
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }

    /// MCP tools/call result: one text content item plus the mirrored error flag
    pub fn to_protocol(&self) -> Value {
        json!({
            "content": [{ "type": "text", "text": self.to_text() }],
            "isError": !self.success,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_flattens_payload() {
        let resp = ToolResponse::success(json!({"filePath": "a.txt", "content": "hi"}));
        assert!(resp.is_success());
        assert_eq!(resp.get("success"), Some(&json!(true)));
        assert_eq!(resp.get("content"), Some(&json!("hi")));
        assert_eq!(resp.error(), None);
    }

    #[test]
    fn failure_carries_message_and_kind() {
        let resp = ToolResponse::failure(&ToolError::Containment("Access denied".to_string()));
        assert!(!resp.is_success());
        assert_eq!(resp.error(), Some("Access denied"));
        assert_eq!(resp.get("kind"), Some(&json!("containment")));
    }

    #[test]
    fn protocol_item_mirrors_error_flag() {
        let resp = ToolResponse::failure(&ToolError::Parse("bad date".to_string()));
        let proto = resp.to_protocol();
        assert_eq!(proto["isError"], json!(true));
        let text = proto["content"][0]["text"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed["success"], json!(false));
        assert_eq!(parsed["error"], json!("bad date"));
        // Pretty-printed
        assert!(text.contains('\n'));
    }

    #[test]
    fn non_object_payload_wrapped() {
        let resp = ToolResponse::success(json!(42));
        assert_eq!(resp.get("result"), Some(&json!(42)));
    }
}
