// Project Gate - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Server settings (JSON, every field optional) and the project's own
// app config file served by get_app_config.

use crate::error::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// Combined stdout + stderr cap for executed commands
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Server settings. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub server_name: String,
    pub max_output_bytes: usize,
    /// Root-relative file returned by get_app_config
    pub app_config_file: String,
    /// Entries whose name starts with this are hidden from list_files
    pub hidden_prefix: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            server_name: "project-gate".to_string(),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            app_config_file: "app.json".to_string(),
            hidden_prefix: ".".to_string(),
        }
    }
}

impl GateConfig {
    /// Load config from JSON file, falling back to defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            log::info!("Config not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save config to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Read and parse the project's app config. The file name is operator
/// config, never caller input, so it is joined without the guard.
pub fn read_app_config(root: &Path, file_name: &str) -> Result<Value, ToolError> {
    let path = root.join(file_name);
    let content = std::fs::read_to_string(&path)
        .map_err(|e| ToolError::io(format!("Failed to read {}", file_name), e))?;
    serde_json::from_str(&content)
        .map_err(|e| ToolError::Parse(format!("Invalid JSON in {}: {}", file_name, e)))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn defaults() {
        let config = GateConfig::default();
        assert_eq!(config.max_output_bytes, 10_485_760);
        assert_eq!(config.app_config_file, "app.json");
        assert_eq!(config.hidden_prefix, ".");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let config = GateConfig::load(&dir.path().join("absent.json"))?;
        assert_eq!(config, GateConfig::default());
        Ok(())
    }

    #[test]
    fn partial_file_keeps_other_defaults() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("gate.json");
        std::fs::write(&path, r#"{"max_output_bytes": 1024}"#)?;
        let config = GateConfig::load(&path)?;
        assert_eq!(config.max_output_bytes, 1024);
        assert_eq!(config.app_config_file, "app.json");
        Ok(())
    }

    #[test]
    fn save_then_load() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("gate.json");
        let config = GateConfig { hidden_prefix: "_".to_string(), ..GateConfig::default() };
        config.save(&path)?;
        assert_eq!(GateConfig::load(&path)?, config);
        Ok(())
    }

    #[test]
    fn app_config_parsed() -> anyhow::Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("app.json"), r#"{"expo": {"name": "demo"}}"#)?;
        let value = read_app_config(dir.path(), "app.json")?;
        assert_eq!(value, json!({"expo": {"name": "demo"}}));
        Ok(())
    }

    #[test]
    fn app_config_missing_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_app_config(dir.path(), "app.json").unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn app_config_malformed_is_parse_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("app.json"), "{ not json").unwrap();
        let err = read_app_config(dir.path(), "app.json").unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert!(err.to_string().starts_with("Invalid JSON in app.json"));
    }
}
