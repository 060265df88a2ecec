// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Role-based artifact visibility

use crate::model::Artifact;

/// Artifacts the caller may see, in store order.
///
/// Privileged callers get everything. Everyone else loses only the artifacts
/// explicitly marked `publicAccess: false`.
pub fn visible_artifacts(artifacts: &[Artifact], can_view_private: bool) -> Vec<&Artifact> {
    if can_view_private {
        return artifacts.iter().collect();
    }
    artifacts.iter().filter(|a| a.is_publicly_accessible()).collect()
}
