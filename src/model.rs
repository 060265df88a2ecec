// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Artifact records and their cultural-heritage metadata
//!
//! Field names serialize in camelCase so seed files exported from the
//! browser archive load without translation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique artifact identifier (integer or millisecond timestamp)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub i64);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single archived item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: ArtifactId,
    pub title: String,
    pub image: String,
    /// Manual collection this artifact was filed into. `None` means the
    /// general archive, where the first tag decides the derived collection.
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub uploader: String,
    pub upload_date: NaiveDate,
    #[serde(default)]
    pub file_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_size: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dimensions: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_description: Option<PhysicalDescription>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub function: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub meaning: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub transcript: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_media: Vec<MediaItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Privacy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<Consent>,
}

impl Artifact {
    /// Minimal artifact with every descriptive field left blank
    pub fn new(
        id: ArtifactId,
        title: impl Into<String>,
        image: impl Into<String>,
        uploader: impl Into<String>,
        upload_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            image: image.into(),
            collection_id: None,
            tags: Vec::new(),
            uploader: uploader.into(),
            upload_date,
            file_type: String::new(),
            file_size: String::new(),
            dimensions: String::new(),
            description: String::new(),
            context: String::new(),
            location: None,
            time_period: None,
            subject: None,
            physical_description: None,
            function: String::new(),
            meaning: String::new(),
            transcript: String::new(),
            additional_media: Vec::new(),
            analysis: None,
            privacy: None,
            consent: None,
        }
    }

    /// The tag that decides derived-collection membership
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags
            .first()
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    /// Missing privacy block or missing flag both count as public
    pub fn is_publicly_accessible(&self) -> bool {
        self.privacy
            .as_ref()
            .and_then(|p| p.public_access)
            .unwrap_or(true)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// `None` when the artifact sits in the general archive
    pub fn assigned_collection(&self) -> Option<&str> {
        self.collection_id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub place: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub coordinates: String,
}

impl Location {
    /// "City, State" as shown on cards
    pub fn city_region(&self) -> String {
        match (self.city.is_empty(), self.state.is_empty()) {
            (false, false) => format!("{}, {}", self.city, self.state),
            (false, true) => self.city.clone(),
            (true, false) => self.state.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimePeriod {
    pub created: String,
    pub documented: String,
    pub era: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subject {
    pub name: String,
    pub is_pseudonym: bool,
    pub role: String,
    pub community: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhysicalDescription {
    pub materials: String,
    pub dimensions: String,
    pub condition: String,
    pub weight: String,
}

/// Supplementary recording, photo set or document attached to an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub media_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analysis {
    pub has_student_work: bool,
    pub course: String,
    pub student: String,
    pub summary: String,
}

/// Access tier chosen at intake
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrivacyLevel {
    #[default]
    #[serde(rename = "Public Domain")]
    PublicDomain,
    #[serde(rename = "Restricted - Identity Protected")]
    RestrictedIdentityProtected,
    #[serde(rename = "Classroom Use Only")]
    ClassroomUseOnly,
    #[serde(rename = "Research Only")]
    ResearchOnly,
}

impl PrivacyLevel {
    pub const ALL: [PrivacyLevel; 4] = [
        PrivacyLevel::PublicDomain,
        PrivacyLevel::RestrictedIdentityProtected,
        PrivacyLevel::ClassroomUseOnly,
        PrivacyLevel::ResearchOnly,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PrivacyLevel::PublicDomain => "Public Domain",
            PrivacyLevel::RestrictedIdentityProtected => "Restricted - Identity Protected",
            PrivacyLevel::ClassroomUseOnly => "Classroom Use Only",
            PrivacyLevel::ResearchOnly => "Research Only",
        }
    }

    /// Parse the form label; unknown labels are rejected
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.label() == label.trim())
    }
}

impl fmt::Display for PrivacyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Privacy {
    pub level: PrivacyLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_access: Option<bool>,
    pub identity_protected: bool,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsentPermissions {
    pub archive_use: bool,
    pub classroom_use: bool,
    pub public_display: bool,
    pub commercial_use: bool,
}

impl Default for ConsentPermissions {
    fn default() -> Self {
        Self {
            archive_use: true,
            classroom_use: true,
            public_display: true,
            commercial_use: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Consent {
    pub form_signed: bool,
    pub date_signed: String,
    pub permissions: ConsentPermissions,
    pub irb_approved: bool,
    pub irb_number: String,
    pub irb_date: String,
}

/// Extension used for downloads: the MIME subtype ("image/png" -> "png")
///
/// Only the second `/` segment is used, and only when it is a plain token,
/// so the result never carries a path separator.
pub fn extension_for_file_type(file_type: &str) -> &str {
    match file_type.split('/').nth(1) {
        Some(subtype) if is_extension_token(subtype) => subtype,
        _ => "bin",
    }
}

fn is_extension_token(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_alphanumeric())
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '.' | '-'))
}

/// Guess a MIME type from an image reference (data URL or file extension)
pub fn file_type_for_image(image: &str) -> Option<String> {
    if let Some(rest) = image.strip_prefix("data:") {
        let mime = rest.split([';', ',']).next().unwrap_or("");
        return (!mime.is_empty()).then(|| mime.to_string());
    }

    let path = image.split(['?', '#']).next().unwrap_or(image);
    let ext = path.rsplit_once('.')?.1.to_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => return None,
    };
    Some(mime.to_string())
}
