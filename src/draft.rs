// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Multi-step artifact creation form
//!
//! The draft collects an artifact over seven steps. Steps can be visited in
//! any order; the only gate is on submission, which needs a title and an
//! image reference.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{
    file_type_for_image, Analysis, Artifact, ArtifactId, Consent, Location, MediaItem,
    PhysicalDescription, Privacy, Subject, TimePeriod,
};
use crate::{Result, VitrineError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DraftStep {
    #[default]
    BasicInfo = 1,
    Context = 2,
    Location = 3,
    TimeAndSubject = 4,
    PhysicalDetails = 5,
    Meaning = 6,
    PrivacyAndConsent = 7,
}

impl DraftStep {
    pub const ALL: [DraftStep; 7] = [
        DraftStep::BasicInfo,
        DraftStep::Context,
        DraftStep::Location,
        DraftStep::TimeAndSubject,
        DraftStep::PhysicalDetails,
        DraftStep::Meaning,
        DraftStep::PrivacyAndConsent,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn title(self) -> &'static str {
        match self {
            DraftStep::BasicInfo => "Basic Info",
            DraftStep::Context => "Context",
            DraftStep::Location => "Location",
            DraftStep::TimeAndSubject => "Time & Subject",
            DraftStep::PhysicalDetails => "Physical Details",
            DraftStep::Meaning => "Meaning",
            DraftStep::PrivacyAndConsent => "Privacy & Consent",
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn is_last(self) -> bool {
        self == DraftStep::PrivacyAndConsent
    }
}

impl TryFrom<u8> for DraftStep {
    type Error = String;

    fn try_from(n: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_number(n).ok_or_else(|| format!("step must be 1-7, got {}", n))
    }
}

impl From<DraftStep> for u8 {
    fn from(step: DraftStep) -> u8 {
        step.number()
    }
}

impl fmt::Display for DraftStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {}: {}", self.number(), self.title())
    }
}

/// Form state for a new artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactDraft {
    pub current_step: DraftStep,

    // Basic info
    pub title: String,
    pub image: String,
    pub tags: Vec<String>,
    pub tag_input: String,
    pub uploader: String,
    pub file_type: String,
    pub file_size: String,
    pub dimensions: String,
    pub collection_id: Option<String>,

    // Context & description
    pub context: String,
    pub description: String,
    pub transcript: String,

    pub location: Location,
    pub time_period: TimePeriod,
    pub subject: Subject,
    pub physical_description: PhysicalDescription,

    pub function: String,
    pub meaning: String,
    pub additional_media: Vec<MediaItem>,
    pub analysis: Analysis,

    pub privacy: Privacy,
    pub consent: Consent,
}

impl Default for ArtifactDraft {
    fn default() -> Self {
        Self {
            current_step: DraftStep::default(),
            title: String::new(),
            image: String::new(),
            tags: Vec::new(),
            tag_input: String::new(),
            uploader: String::new(),
            file_type: String::new(),
            file_size: String::new(),
            dimensions: String::new(),
            collection_id: None,
            context: String::new(),
            description: String::new(),
            transcript: String::new(),
            location: Location::default(),
            time_period: TimePeriod::default(),
            subject: Subject::default(),
            physical_description: PhysicalDescription::default(),
            function: String::new(),
            meaning: String::new(),
            additional_media: Vec::new(),
            analysis: Analysis::default(),
            privacy: Privacy {
                public_access: Some(true),
                ..Default::default()
            },
            consent: Consent::default(),
        }
    }
}

impl ArtifactDraft {
    /// Fresh draft, optionally pre-assigned to a manual collection
    pub fn for_collection(target: Option<String>) -> Self {
        Self {
            collection_id: target.filter(|id| !id.is_empty()),
            ..Default::default()
        }
    }

    pub fn next(&mut self) {
        if let Some(step) = DraftStep::from_number(self.current_step.number() + 1) {
            self.current_step = step;
        }
    }

    pub fn previous(&mut self) {
        if let Some(step) = DraftStep::from_number(self.current_step.number().saturating_sub(1)) {
            self.current_step = step;
        }
    }

    pub fn go_to(&mut self, step: DraftStep) {
        self.current_step = step;
    }

    /// Move the pending tag input into the tag list
    pub fn add_tag(&mut self) -> bool {
        let tag = self.tag_input.trim();
        if tag.is_empty() {
            return false;
        }
        self.tags.push(tag.to_string());
        self.tag_input.clear();
        true
    }

    pub fn remove_tag(&mut self, index: usize) -> Option<String> {
        (index < self.tags.len()).then(|| self.tags.remove(index))
    }

    /// Title and image are the only required fields
    pub fn can_submit(&self) -> bool {
        !self.title.trim().is_empty() && !self.image.trim().is_empty()
    }

    /// Turn the draft into an artifact stamped with `id` and `today`
    pub fn into_artifact(
        self,
        id: ArtifactId,
        today: NaiveDate,
        default_uploader: &str,
    ) -> Result<Artifact> {
        if !self.can_submit() {
            return Err(VitrineError::Validation(
                "A title and an image are required".to_string(),
            ));
        }

        let uploader = match self.uploader.trim() {
            "" => default_uploader.to_string(),
            name => name.to_string(),
        };
        let file_type = if self.file_type.trim().is_empty() {
            file_type_for_image(&self.image).unwrap_or_default()
        } else {
            self.file_type.trim().to_string()
        };

        let mut artifact = Artifact::new(id, self.title.trim(), self.image.trim(), uploader, today);
        artifact.collection_id = self.collection_id.filter(|c| !c.is_empty());
        artifact.tags = self.tags;
        artifact.file_type = file_type;
        artifact.file_size = self.file_size;
        artifact.dimensions = self.dimensions;
        artifact.context = self.context;
        artifact.description = self.description;
        artifact.transcript = self.transcript;
        artifact.function = self.function;
        artifact.meaning = self.meaning;
        artifact.additional_media = self.additional_media;
        artifact.location = (self.location != Location::default()).then_some(self.location);
        artifact.time_period = (self.time_period != TimePeriod::default()).then_some(self.time_period);
        artifact.subject = (!self.subject.name.trim().is_empty()).then_some(self.subject);
        artifact.physical_description = (self.physical_description != PhysicalDescription::default())
            .then_some(self.physical_description);
        artifact.analysis = (self.analysis != Analysis::default()).then_some(self.analysis);
        artifact.privacy = Some(self.privacy);
        artifact.consent = Some(self.consent);
        Ok(artifact)
    }

    /// Back to a blank first step, keeping the target collection
    pub fn reset(&mut self) {
        let target = self.collection_id.take();
        *self = Self::for_collection(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PrivacyLevel;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_defaults_match_intake_form() {
        let draft = ArtifactDraft::default();
        assert_eq!(draft.current_step, DraftStep::BasicInfo);
        assert_eq!(draft.privacy.level, PrivacyLevel::PublicDomain);
        assert_eq!(draft.privacy.public_access, Some(true));
        assert!(draft.consent.permissions.archive_use);
        assert!(draft.consent.permissions.public_display);
        assert!(!draft.consent.permissions.commercial_use);
    }

    #[test]
    fn test_step_navigation_is_bounded() {
        let mut draft = ArtifactDraft::default();
        draft.previous();
        assert_eq!(draft.current_step, DraftStep::BasicInfo);

        for _ in 0..10 {
            draft.next();
        }
        assert_eq!(draft.current_step, DraftStep::PrivacyAndConsent);
        assert!(draft.current_step.is_last());

        draft.go_to(DraftStep::Location);
        draft.previous();
        assert_eq!(draft.current_step, DraftStep::Context);
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(DraftStep::from_number(4), Some(DraftStep::TimeAndSubject));
        assert_eq!(DraftStep::from_number(0), None);
        assert_eq!(DraftStep::from_number(8), None);
        assert_eq!(DraftStep::Meaning.to_string(), "Step 6: Meaning");
        assert!(serde_json::from_str::<DraftStep>("9").is_err());
    }

    #[test]
    fn test_tags() {
        let mut draft = ArtifactDraft::default();
        draft.tag_input = "  ".to_string();
        assert!(!draft.add_tag());

        draft.tag_input = " weaving ".to_string();
        assert!(draft.add_tag());
        draft.tag_input = "textiles".to_string();
        draft.add_tag();
        assert_eq!(draft.tags, vec!["weaving", "textiles"]);
        assert!(draft.tag_input.is_empty());

        assert_eq!(draft.remove_tag(0).as_deref(), Some("weaving"));
        assert_eq!(draft.remove_tag(5), None);
        assert_eq!(draft.tags, vec!["textiles"]);
    }

    #[test]
    fn test_title_without_image_cannot_submit() {
        let mut draft = ArtifactDraft::default();
        draft.title = "Harbor Map".to_string();
        assert!(!draft.can_submit());
        assert!(matches!(
            draft.into_artifact(ArtifactId(1), today(), "Current User"),
            Err(VitrineError::Validation(_))
        ));
    }

    #[test]
    fn test_submit_builds_artifact() {
        let mut draft = ArtifactDraft::for_collection(Some("manual-5".to_string()));
        draft.title = "  Harbor Map ".to_string();
        draft.image = "maps/harbor.png".to_string();
        draft.tags = vec!["maps".to_string()];
        draft.location.city = "Boston".to_string();
        assert!(draft.can_submit());

        let artifact = draft.into_artifact(ArtifactId(77), today(), "Current User").unwrap();
        assert_eq!(artifact.id, ArtifactId(77));
        assert_eq!(artifact.title, "Harbor Map");
        assert_eq!(artifact.uploader, "Current User");
        assert_eq!(artifact.upload_date, today());
        assert_eq!(artifact.file_type, "image/png");
        assert_eq!(artifact.collection_id.as_deref(), Some("manual-5"));
        assert_eq!(artifact.location.as_ref().unwrap().city, "Boston");
        assert!(artifact.subject.is_none());
        assert!(artifact.time_period.is_none());
        assert!(artifact.is_publicly_accessible());
    }

    #[test]
    fn test_empty_target_means_general_archive() {
        let draft = ArtifactDraft::for_collection(Some(String::new()));
        assert!(draft.collection_id.is_none());
    }

    #[test]
    fn test_reset_keeps_target() {
        let mut draft = ArtifactDraft::for_collection(Some("manual-5".to_string()));
        draft.title = "Something".to_string();
        draft.next();
        draft.reset();
        assert_eq!(draft, ArtifactDraft::for_collection(Some("manual-5".to_string())));
    }

    #[test]
    fn test_partial_json_update() {
        let draft: ArtifactDraft =
            serde_json::from_str(r#"{ "title": "Ledger", "currentStep": 3 }"#).unwrap();
        assert_eq!(draft.title, "Ledger");
        assert_eq!(draft.current_step, DraftStep::Location);
        assert_eq!(draft.privacy.public_access, Some(true));
    }
}
