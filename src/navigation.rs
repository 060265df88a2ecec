// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Which collection is open and which artifact is in the detail panel

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::model::ArtifactId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Collections,
    Artifacts,
}

/// Navigation state for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub view_mode: ViewMode,
    pub active_collection: Option<String>,
    pub selected_artifact: Option<ArtifactId>,
    pub detail_open: bool,
    /// A closed panel keeps its artifact until this instant so the exit
    /// transition still has something to draw.
    #[serde(skip)]
    clear_selection_at: Option<DateTime<Utc>>,
}

impl Navigation {
    pub fn open_collection(&mut self, id: impl Into<String>) {
        self.active_collection = Some(id.into());
        self.view_mode = ViewMode::Artifacts;
    }

    /// Back to the folder grid; also drops any detail selection
    pub fn back_to_collections(&mut self) {
        *self = Self::default();
    }

    pub fn select(&mut self, id: ArtifactId) {
        self.selected_artifact = Some(id);
        self.detail_open = true;
        self.clear_selection_at = None;
    }

    /// Close the detail panel. With a zero delay the selection goes at once.
    pub fn close_detail(&mut self, now: DateTime<Utc>, delay: Duration) {
        self.detail_open = false;
        if delay <= Duration::zero() {
            self.selected_artifact = None;
            self.clear_selection_at = None;
        } else {
            self.clear_selection_at = Some(now + delay);
        }
    }

    /// Apply any pending selection clear whose deadline has passed
    pub fn settle(&mut self, now: DateTime<Utc>) {
        if let Some(deadline) = self.clear_selection_at {
            if now >= deadline {
                self.selected_artifact = None;
                self.clear_selection_at = None;
            }
        }
    }

    pub fn is_closing(&self) -> bool {
        self.clear_selection_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_open_collection_switches_view() {
        let mut nav = Navigation::default();
        assert_eq!(nav.view_mode, ViewMode::Collections);

        nav.open_collection("animals");
        assert_eq!(nav.view_mode, ViewMode::Artifacts);
        assert_eq!(nav.active_collection.as_deref(), Some("animals"));
    }

    #[test]
    fn test_close_keeps_selection_until_delay() {
        let mut nav = Navigation::default();
        nav.select(ArtifactId(7));
        assert!(nav.detail_open);

        nav.close_detail(at(1_000), Duration::milliseconds(400));
        assert!(!nav.detail_open);
        assert!(nav.is_closing());
        assert_eq!(nav.selected_artifact, Some(ArtifactId(7)));

        nav.settle(at(1_399));
        assert_eq!(nav.selected_artifact, Some(ArtifactId(7)));

        nav.settle(at(1_400));
        assert_eq!(nav.selected_artifact, None);
        assert!(!nav.is_closing());
    }

    #[test]
    fn test_zero_delay_clears_immediately() {
        let mut nav = Navigation::default();
        nav.select(ArtifactId(7));
        nav.close_detail(at(0), Duration::zero());
        assert_eq!(nav.selected_artifact, None);
    }

    #[test]
    fn test_reselect_cancels_pending_clear() {
        let mut nav = Navigation::default();
        nav.select(ArtifactId(1));
        nav.close_detail(at(0), Duration::milliseconds(400));
        nav.select(ArtifactId(2));
        nav.settle(at(10_000));
        assert_eq!(nav.selected_artifact, Some(ArtifactId(2)));
        assert!(nav.detail_open);
    }

    #[test]
    fn test_back_resets_everything() {
        let mut nav = Navigation::default();
        nav.open_collection("manual-1");
        nav.select(ArtifactId(3));
        nav.back_to_collections();
        assert_eq!(nav, Navigation::default());
    }
}
