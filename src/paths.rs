// Project Gate - Path Resolution
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Root boundary discovery and lexical path helpers.
// The root is resolved once at startup and handed to everything that
// needs it. Nothing here is cached globally.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Environment override for the root boundary
pub const ROOT_ENV: &str = "PROJECT_GATE_ROOT";

/// Server settings file, looked up under the root when --config is absent
pub const CONFIG_FILE_NAME: &str = "project-gate.json";

/// Collapse `.` and `..` segments without touching the filesystem.
///
/// `..` never climbs above a root or prefix component: `/..` is `/`.
/// Relative inputs keep leading `..` segments they cannot cancel.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Pick the root boundary.
///
/// Resolution order:
///   1. Explicit override (CLI --root)
///   2. PROJECT_GATE_ROOT environment variable
///   3. Current working directory
///
/// Relative choices are anchored at `cwd`. The result is always absolute
/// and normalized.
pub fn select_root(explicit: Option<&Path>, env_value: Option<OsString>, cwd: &Path) -> PathBuf {
    let chosen = match explicit {
        Some(p) => p.to_path_buf(),
        None => match env_value {
            Some(v) if !v.is_empty() => PathBuf::from(v),
            _ => cwd.to_path_buf(),
        },
    };
    normalize(&cwd.join(chosen))
}

/// Resolve the root boundary for this process.
/// Symlinks are resolved once here when the directory exists; the guard
/// itself never touches the filesystem afterwards.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read current working directory")?;
    let root = select_root(explicit, std::env::var_os(ROOT_ENV), &cwd);

    match std::fs::canonicalize(&root) {
        Ok(canonical) => {
            if !canonical.is_dir() {
                anyhow::bail!("Root boundary is not a directory: {:?}", canonical);
            }
            Ok(canonical)
        }
        Err(e) => {
            log::warn!("Root boundary {:?} could not be canonicalized ({}), using lexical form", root, e);
            Ok(root)
        }
    }
}

/// Display form of `path` relative to `root`.
/// Paths outside the root (should not happen for guarded paths) are shown in full.
pub fn relative_display(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel.to_string_lossy().to_string(),
        Err(_) => path.to_string_lossy().to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
