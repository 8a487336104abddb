// Project Gate - Path Guard
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Decides, for every filesystem or working-directory argument, whether a
// caller-supplied path may be acted upon. Pure lexical decision over the
// root boundary and the candidate. No filesystem access.
//
// Containment is checked segment-wise: root /a/b never contains /a/bc.

use crate::error::ToolError;
use crate::paths::normalize;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Outcome of a containment check. Exactly one branch holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum Validation {
    Allowed { resolved: PathBuf },
    Denied { reason: String },
}

impl Validation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// Handlers consume the outcome through this: Denied never reaches I/O.
    pub fn into_result(self) -> Result<PathBuf, ToolError> {
        match self {
            Self::Allowed { resolved } => Ok(resolved),
            Self::Denied { reason } => Err(ToolError::Containment(reason)),
        }
    }
}

/// Root-boundary guard. Cheap to clone, immutable after construction.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Build a guard over an absolute root. Relative or empty roots are refused.
    pub fn new(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref();
        if root.as_os_str().is_empty() || !root.is_absolute() {
            anyhow::bail!("Root boundary must be an absolute path, got {:?}", root);
        }
        Ok(Self { root: normalize(root) })
    }

    /// The resolved root boundary
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `candidate` beneath the root and check containment.
    ///
    /// Pipeline:
    /// 1. Join root + candidate (absolute-looking candidates still land under the root)
    /// 2. Collapse `.` / `..` lexically
    /// 3. Allowed iff every root segment prefixes the resolved path
    pub fn validate(&self, candidate: &str) -> Validation {
        if candidate.contains('\0') {
            log::warn!("Rejected path with embedded NUL byte");
            return Validation::Denied {
                reason: "Invalid path: contains a NUL byte".to_string(),
            };
        }

        let mut joined = self.root.clone();
        for component in Path::new(candidate).components() {
            match component {
                // Join concatenates: a leading `/` or drive prefix does not reset to it
                Component::Prefix(_) | Component::RootDir => {}
                other => joined.push(other.as_os_str()),
            }
        }
        let resolved = normalize(&joined);

        log::debug!(
            "guard: candidate={:?} resolved={:?} root={:?}",
            candidate, resolved, self.root
        );

        if resolved.starts_with(&self.root) {
            Validation::Allowed { resolved }
        } else {
            log::warn!("guard: denied {:?} (outside root)", candidate);
            Validation::Denied {
                reason: format!(
                    "Access denied. Only paths inside {} may be accessed",
                    self.root.display()
                ),
            }
        }
    }

    /// `validate` folded into the tool error taxonomy
    pub fn resolve(&self, candidate: &str) -> Result<PathBuf, ToolError> {
        self.validate(candidate).into_result()
    }
}

// ============================================================================
// TESTS
// ============================================================================
