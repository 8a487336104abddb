// Project Gate - File Operations
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Read, write and enumerate real files. Callers pass paths that have
// already been through the guard; nothing here resolves caller input.

use crate::error::ToolError;
use crate::paths::relative_display;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One listed entry. `path` is relative to the root boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FileEntry {
    Directory { path: String, name: String },
    File { path: String, name: String, size: u64 },
}

#[cfg(test)]
impl FileEntry {
    pub fn path(&self) -> &str {
        match self {
            Self::Directory { path, .. } | Self::File { path, .. } => path,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name, .. } | Self::File { name, .. } => name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}

/// Read a whole file as text. Invalid UTF-8 is replaced, not rejected.
pub fn read_text(path: &Path, shown_as: &str) -> Result<String, ToolError> {
    let bytes = std::fs::read(path)
        .map_err(|e| ToolError::io(format!("Failed to read {}", shown_as), e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Replace a file's content, optionally creating missing parent directories.
/// Returns the number of bytes written.
pub fn write_text(path: &Path, content: &str, create_dirs: bool, shown_as: &str) -> Result<usize, ToolError> {
    if create_dirs {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ToolError::io(format!("Failed to create directories for {}", shown_as), e))?;
        }
    }
    std::fs::write(path, content)
        .map_err(|e| ToolError::io(format!("Failed to write {}", shown_as), e))?;
    Ok(content.len())
}

/// Directory children sorted by name, so listings are deterministic
fn sorted_children(dir: &Path, root: &Path) -> Result<Vec<PathBuf>, ToolError> {
    let shown = relative_display(root, dir);
    let reader = std::fs::read_dir(dir)
        .map_err(|e| ToolError::io(format!("Failed to list {}", display_or_dot(&shown)), e))?;
    let mut children = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|e| ToolError::io(format!("Failed to list {}", display_or_dot(&shown)), e))?;
        children.push(entry.path());
    }
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(children)
}

fn display_or_dot(shown: &str) -> &str {
    if shown.is_empty() { "." } else { shown }
}

/// Enumerate `dir`, skipping hidden entries.
///
/// Recursive listings are pre-order depth-first: a directory's own entry is
/// emitted, then its children, then the next sibling. Driven by an explicit
/// stack of pending sibling lists. Symlinked directories are listed but not
/// descended into.
pub fn list_dir(root: &Path, dir: &Path, recursive: bool, hidden_prefix: &str) -> Result<Vec<FileEntry>, ToolError> {
    let mut results = Vec::new();
    let mut stack: Vec<std::vec::IntoIter<PathBuf>> = vec![sorted_children(dir, root)?.into_iter()];

    loop {
        let next = match stack.last_mut() {
            Some(siblings) => siblings.next(),
            None => break,
        };
        let Some(path) = next else {
            stack.pop();
            continue;
        };

        let name = match path.file_name() {
            Some(n) => n.to_string_lossy().to_string(),
            None => continue,
        };
        if !hidden_prefix.is_empty() && name.starts_with(hidden_prefix) {
            continue;
        }

        let rel = relative_display(root, &path);
        let meta = std::fs::metadata(&path)
            .map_err(|e| ToolError::io(format!("Failed to stat {}", rel), e))?;

        if meta.is_dir() {
            results.push(FileEntry::Directory { path: rel, name });
            let real_dir = std::fs::symlink_metadata(&path)
                .map(|m| m.is_dir())
                .unwrap_or(false);
            if recursive && real_dir {
                stack.push(sorted_children(&path, root)?.into_iter());
            }
        } else {
            results.push(FileEntry::File { path: rel, name, size: meta.len() });
        }
    }

    Ok(results)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trip() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("deep/nested/file.txt");
        let content = "line one\nlínea dos ✓\n";

        let written = write_text(&path, content, true, "deep/nested/file.txt")?;
        assert_eq!(written, content.len());
        assert_eq!(read_text(&path, "deep/nested/file.txt")?, content);
        Ok(())
    }

    #[test]
    fn write_replaces_existing_content() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("f.txt");
        write_text(&path, "a much longer original body", true, "f.txt")?;
        write_text(&path, "short", true, "f.txt")?;
        assert_eq!(read_text(&path, "f.txt")?, "short");
        Ok(())
    }

    #[test]
    fn write_without_create_dirs_fails_on_missing_parent() {
        let dir = tempdir().unwrap();
        let err = write_text(&dir.path().join("missing/f.txt"), "x", false, "missing/f.txt").unwrap_err();
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().starts_with("Failed to write missing/f.txt"));
    }

    #[test]
    fn read_missing_and_directory_fail() {
        let dir = tempdir().unwrap();
        assert_eq!(read_text(&dir.path().join("nope.txt"), "nope.txt").unwrap_err().kind(), "io");
        assert_eq!(read_text(dir.path(), ".").unwrap_err().kind(), "io");
    }

    #[test]
    fn list_skips_hidden_and_reports_sizes() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        std::fs::write(root.join("b.txt"), "12345")?;
        std::fs::create_dir(root.join("a"))?;
        std::fs::write(root.join(".hidden"), "secret")?;

        let entries = list_dir(root, root, false, ".")?;
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| !e.name().starts_with('.')));

        let file = entries.iter().find(|e| e.name() == "b.txt").unwrap();
        assert_eq!(file, &FileEntry::File { path: "b.txt".into(), name: "b.txt".into(), size: 5 });
        let sub = entries.iter().find(|e| e.name() == "a").unwrap();
        assert!(sub.is_dir());
        Ok(())
    }

    #[test]
    fn recursive_listing_is_pre_order() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        std::fs::create_dir_all(root.join("a/inner"))?;
        std::fs::write(root.join("a/c.txt"), "c")?;
        std::fs::write(root.join("a/inner/d.txt"), "dd")?;
        std::fs::write(root.join("b.txt"), "b")?;
        std::fs::write(root.join("a/.git"), "x")?;

        let entries = list_dir(root, root, true, ".")?;
        let paths: Vec<&str> = entries.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["a", "a/c.txt", "a/inner", "a/inner/d.txt", "b.txt"]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directory_listed_but_not_followed() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        std::fs::create_dir(root.join("a"))?;
        std::fs::write(root.join("b.txt"), "b")?;
        std::os::unix::fs::symlink(root, root.join("a/loop"))?;

        let entries = list_dir(root, root, true, ".")?;
        let paths: Vec<&str> = entries.iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["a", "a/loop", "b.txt"]);
        assert_eq!(entries[1], FileEntry::Directory { path: "a/loop".into(), name: "loop".into() });
        assert!(entries.iter().all(|e| !e.path().starts_with("a/loop/")));
        Ok(())
    }

    #[test]
    fn non_recursive_does_not_descend() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        std::fs::create_dir(root.join("a"))?;
        std::fs::write(root.join("a/c.txt"), "c")?;

        let entries = list_dir(root, root, false, ".")?;
        assert_eq!(entries, vec![FileEntry::Directory { path: "a".into(), name: "a".into() }]);
        Ok(())
    }

    #[test]
    fn listing_subdir_keeps_root_relative_paths() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        std::fs::create_dir(root.join("src"))?;
        std::fs::write(root.join("src/main.rs"), "fn main() {}")?;

        let entries = list_dir(root, &root.join("src"), false, ".")?;
        assert_eq!(entries[0].path(), "src/main.rs");
        Ok(())
    }

    #[test]
    fn listing_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let err = list_dir(dir.path(), &dir.path().join("ghost"), false, ".").unwrap_err();
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn entry_serializes_with_type_tag() {
        let entry = FileEntry::File { path: "x".into(), name: "x".into(), size: 1 };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "file");
        assert_eq!(value["size"], 1);
        let dir = serde_json::to_value(FileEntry::Directory { path: "d".into(), name: "d".into() }).unwrap();
        assert_eq!(dir["type"], "directory");
        assert!(dir.get("size").is_none());
    }
}
