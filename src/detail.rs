// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Permission-gated views of an artifact for the detail panel and list cards
//!
//! Everything privacy related (privacy level, pseudonym markers, consent and
//! IRB metadata, privacy notes) is only copied into a view when the caller's
//! [`Permissions`] allow it, so renderers can print whatever they receive.

use serde::Serialize;

use crate::download::download_filename;
use crate::model::{
    Analysis, Artifact, ArtifactId, ConsentPermissions, Location, MediaItem, PhysicalDescription,
    PrivacyLevel, TimePeriod,
};
use crate::session::Permissions;

/// Tags shown on a card before the "+N more" chip
pub const CARD_TAG_LIMIT: usize = 3;

fn non_empty(s: &str) -> Option<&str> {
    (!s.trim().is_empty()).then_some(s)
}

/// "January 15, 2024"
fn long_date(artifact: &Artifact) -> String {
    artifact.upload_date.format("%B %-d, %Y").to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyBanner {
    pub level: PrivacyLevel,
    pub identity_protected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentStatus {
    /// IRB number, present only when approved
    pub irb_approval: Option<String>,
    /// Signing date, present only when the form was signed
    pub form_signed_on: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView<'a> {
    pub name: &'a str,
    pub pseudonym_note: bool,
    pub role: Option<&'a str>,
    pub community: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalMetadata<'a> {
    pub uploader: Option<&'a str>,
    pub upload_date: String,
    pub file_type: Option<&'a str>,
    pub file_size: Option<&'a str>,
    pub dimensions: Option<&'a str>,
}

/// Everything the detail panel may show to this caller
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView<'a> {
    pub id: ArtifactId,
    pub title: &'a str,
    pub image: &'a str,
    pub download_filename: String,
    pub privacy_banner: Option<PrivacyBanner>,
    pub consent_status: Option<ConsentStatus>,
    pub subject: Option<SubjectView<'a>>,
    pub context: Option<&'a str>,
    pub description: Option<&'a str>,
    pub location: Option<&'a Location>,
    pub time_period: Option<&'a TimePeriod>,
    pub physical_description: Option<&'a PhysicalDescription>,
    pub function: Option<&'a str>,
    pub meaning: Option<&'a str>,
    pub transcript: Option<&'a str>,
    pub additional_media: &'a [MediaItem],
    pub student_analysis: Option<&'a Analysis>,
    pub tags: &'a [String],
    pub technical: TechnicalMetadata<'a>,
    pub privacy_notes: Option<&'a str>,
    pub usage_permissions: Option<&'a ConsentPermissions>,
}

impl<'a> DetailView<'a> {
    pub fn build(artifact: &'a Artifact, permissions: &Permissions) -> Self {
        let private = permissions.can_view_private_details;
        let is_pseudonym = artifact.subject.as_ref().is_some_and(|s| s.is_pseudonym);

        let privacy_banner = artifact
            .privacy
            .as_ref()
            .filter(|_| private)
            .map(|p| PrivacyBanner {
                level: p.level,
                identity_protected: is_pseudonym,
            });

        let consent_status = artifact
            .consent
            .as_ref()
            .filter(|_| private)
            .map(|c| ConsentStatus {
                irb_approval: c.irb_approved.then(|| c.irb_number.clone()),
                form_signed_on: c.form_signed.then(|| c.date_signed.clone()),
            });

        let subject = artifact.subject.as_ref().map(|s| SubjectView {
            name: &s.name,
            pseudonym_note: permissions.can_view_pseudonym_context && s.is_pseudonym,
            role: non_empty(&s.role),
            community: non_empty(&s.community),
        });

        Self {
            id: artifact.id,
            title: &artifact.title,
            image: &artifact.image,
            download_filename: download_filename(&artifact.title, &artifact.file_type),
            privacy_banner,
            consent_status,
            subject,
            context: non_empty(&artifact.context),
            description: non_empty(&artifact.description),
            location: artifact.location.as_ref(),
            time_period: artifact.time_period.as_ref(),
            physical_description: artifact.physical_description.as_ref(),
            function: non_empty(&artifact.function),
            meaning: non_empty(&artifact.meaning),
            transcript: non_empty(&artifact.transcript),
            additional_media: &artifact.additional_media,
            student_analysis: artifact.analysis.as_ref().filter(|a| a.has_student_work),
            tags: &artifact.tags,
            technical: TechnicalMetadata {
                uploader: non_empty(&artifact.uploader),
                upload_date: long_date(artifact),
                file_type: non_empty(&artifact.file_type),
                file_size: non_empty(&artifact.file_size),
                dimensions: non_empty(&artifact.dimensions),
            },
            privacy_notes: artifact
                .privacy
                .as_ref()
                .filter(|_| private)
                .and_then(|p| non_empty(&p.notes)),
            usage_permissions: artifact
                .consent
                .as_ref()
                .filter(|_| private)
                .map(|c| &c.permissions),
        }
    }
}

/// Compact artifact summary for list views
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView<'a> {
    pub id: ArtifactId,
    pub title: &'a str,
    pub image: &'a str,
    pub subject: Option<&'a str>,
    pub pseudonym_marker: bool,
    pub location: Option<String>,
    pub tags: &'a [String],
    pub more_tags: usize,
    pub uploader: Option<&'a str>,
    pub upload_date: String,
    pub privacy_lock: bool,
    pub irb_approved: bool,
}

impl<'a> CardView<'a> {
    pub fn build(artifact: &'a Artifact, permissions: &Permissions) -> Self {
        let shown = artifact.tags.len().min(CARD_TAG_LIMIT);
        let subject = artifact.subject.as_ref();

        Self {
            id: artifact.id,
            title: &artifact.title,
            image: &artifact.image,
            subject: subject.and_then(|s| non_empty(&s.name)),
            pseudonym_marker: permissions.can_view_pseudonym_context
                && subject.is_some_and(|s| s.is_pseudonym),
            location: artifact
                .location
                .as_ref()
                .filter(|l| !l.city.is_empty())
                .map(Location::city_region),
            tags: &artifact.tags[..shown],
            more_tags: artifact.tags.len() - shown,
            uploader: non_empty(&artifact.uploader),
            upload_date: artifact.upload_date.format("%Y-%m-%d").to_string(),
            privacy_lock: permissions.can_view_private_details
                && artifact.privacy.as_ref().is_some_and(|p| p.identity_protected),
            irb_approved: permissions.can_view_private_details
                && artifact.consent.as_ref().is_some_and(|c| c.irb_approved),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use crate::store::sample_artifacts;

    fn oral_history() -> Artifact {
        sample_artifacts()
            .into_iter()
            .find(|a| a.title == "Dockworker Oral History")
            .unwrap()
    }

    #[test]
    fn test_viewer_sees_no_private_metadata() {
        let artifact = oral_history();
        let view = DetailView::build(&artifact, &Permissions::for_role(Role::Viewer));

        assert!(view.privacy_banner.is_none());
        assert!(view.consent_status.is_none());
        assert!(view.privacy_notes.is_none());
        assert!(view.usage_permissions.is_none());

        let subject = view.subject.unwrap();
        assert_eq!(subject.name, "R. Alvarez");
        assert!(!subject.pseudonym_note);
        assert!(view.transcript.is_some());
        assert_eq!(view.additional_media.len(), 2);
    }

    #[test]
    fn test_admin_sees_private_metadata() {
        let artifact = oral_history();
        let view = DetailView::build(&artifact, &Permissions::for_role(Role::Admin));

        let banner = view.privacy_banner.unwrap();
        assert_eq!(banner.level, PrivacyLevel::RestrictedIdentityProtected);
        assert!(banner.identity_protected);

        let consent = view.consent_status.unwrap();
        assert_eq!(consent.irb_approval.as_deref(), Some("IRB-2024-0117"));
        assert_eq!(consent.form_signed_on.as_deref(), Some("2024-03-01"));

        assert!(view.subject.unwrap().pseudonym_note);
        assert!(view.privacy_notes.is_some());
        assert!(!view.usage_permissions.unwrap().public_display);
    }

    #[test]
    fn test_technical_metadata_and_filename() {
        let artifact = sample_artifacts().into_iter().next().unwrap();
        let view = DetailView::build(&artifact, &Permissions::anonymous());
        assert_eq!(view.technical.upload_date, "January 15, 2024");
        assert_eq!(view.technical.dimensions, Some("1920x1080"));
        assert_eq!(view.download_filename, "sample-artifact.jpeg");
        assert!(view.student_analysis.is_none());
        assert!(view.location.is_none());
    }

    #[test]
    fn test_card_tag_overflow() {
        let mut artifact = sample_artifacts().into_iter().next().unwrap();
        artifact.tags = vec!["a", "b", "c", "d", "e"].into_iter().map(String::from).collect();
        let card = CardView::build(&artifact, &Permissions::anonymous());
        assert_eq!(card.tags.len(), 3);
        assert_eq!(card.more_tags, 2);
        assert_eq!(card.upload_date, "2024-01-15");
    }

    #[test]
    fn test_card_admin_markers() {
        let artifact = oral_history();
        let viewer = CardView::build(&artifact, &Permissions::for_role(Role::Viewer));
        let admin = CardView::build(&artifact, &Permissions::for_role(Role::Admin));

        assert!(!viewer.pseudonym_marker && !viewer.privacy_lock && !viewer.irb_approved);
        assert!(admin.pseudonym_marker && admin.privacy_lock && admin.irb_approved);
        assert_eq!(viewer.subject, Some("R. Alvarez"));
    }
}
