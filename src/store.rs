// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! In-memory artifact store with the built-in sample archive

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::collections::ManualCollection;
use crate::model::{
    Analysis, Artifact, ArtifactId, Consent, ConsentPermissions, Location, MediaItem,
    PhysicalDescription, Privacy, PrivacyLevel, Subject, TimePeriod,
};
use crate::{Result, VitrineError};

/// Ordered artifacts (newest first) plus manual collection records.
///
/// Artifacts are only ever prepended; nothing is edited or removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Archive {
    artifacts: Vec<Artifact>,
    manual_collections: Vec<ManualCollection>,
}

impl Archive {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self {
            artifacts,
            manual_collections: Vec::new(),
        }
    }

    /// The sample archive every session starts from
    pub fn seeded() -> Self {
        Self::new(sample_artifacts())
    }

    /// Load a JSON array of artifacts
    pub fn from_seed_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let artifacts: Vec<Artifact> = serde_json::from_str(&content)?;
        tracing::info!("Loaded {} seed artifacts from {:?}", artifacts.len(), path);
        Ok(Self::new(artifacts))
    }

    /// Seed file when configured, built-in samples otherwise
    pub fn load(seed_path: Option<&str>) -> Result<Self> {
        match seed_path {
            Some(path) => Self::from_seed_file(Path::new(path)),
            None => Ok(Self::seeded()),
        }
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn manual_collections(&self) -> &[ManualCollection] {
        &self.manual_collections
    }

    pub fn find(&self, id: ArtifactId) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    pub fn manual_collection(&self, id: &str) -> Option<&ManualCollection> {
        self.manual_collections.iter().find(|m| m.id == id)
    }

    /// Millisecond timestamp, bumped past any id already in use
    pub fn next_artifact_id(&self, now: DateTime<Utc>) -> ArtifactId {
        let candidate = now.timestamp_millis();
        let highest = self.artifacts.iter().map(|a| a.id.0).max().unwrap_or(i64::MIN);
        ArtifactId(candidate.max(highest.saturating_add(1)))
    }

    /// Insert at the front. The id must not already exist and any manual
    /// assignment must point at a known collection.
    pub fn prepend(&mut self, artifact: Artifact) -> Result<()> {
        if self.find(artifact.id).is_some() {
            return Err(VitrineError::Validation(format!(
                "Artifact id {} already exists",
                artifact.id
            )));
        }
        if let Some(target) = artifact.assigned_collection() {
            if self.manual_collection(target).is_none() {
                return Err(VitrineError::NotFound(format!("Collection {}", target)));
            }
        }
        self.artifacts.insert(0, artifact);
        Ok(())
    }

    /// Create a manual collection with a `manual-<millis>` id
    pub fn add_collection(&mut self, name: &str, now: DateTime<Utc>) -> Result<&ManualCollection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VitrineError::Validation("Collection name is required".to_string()));
        }

        let mut stamp = now.timestamp_millis();
        while self.manual_collection(&format!("manual-{}", stamp)).is_some() {
            stamp += 1;
        }

        self.manual_collections.push(ManualCollection {
            id: format!("manual-{}", stamp),
            name: name.to_string(),
        });
        Ok(&self.manual_collections[self.manual_collections.len() - 1])
    }
}

fn day(year: i32, month: u32, date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, date).unwrap_or(NaiveDate::MIN)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Built-in sample artifacts
pub fn sample_artifacts() -> Vec<Artifact> {
    let mut sample = Artifact::new(
        ArtifactId(1),
        "Sample Artifact",
        "/assets/artifacts/artifact.jpg",
        "John Doe",
        day(2024, 1, 15),
    );
    sample.tags = strings(&["animals", "citywork"]);
    sample.file_type = "image/jpeg".to_string();
    sample.description = "A sample artifact for testing the archive system".to_string();
    sample.dimensions = "1920x1080".to_string();
    sample.file_size = "2.4 MB".to_string();

    let mut quilt = Artifact::new(
        ArtifactId(2),
        "Harvest Festival Quilt",
        "/assets/artifacts/quilt.png",
        "Jane Smith",
        day(2024, 2, 3),
    );
    quilt.tags = strings(&["historical", "textiles"]);
    quilt.file_type = "image/png".to_string();
    quilt.file_size = "3.1 MB".to_string();
    quilt.dimensions = "2400x1800".to_string();
    quilt.context = "Stitched collectively for the first harvest festival after the mill closed.".to_string();
    quilt.location = Some(Location {
        place: "Community Hall".to_string(),
        city: "Lowell".to_string(),
        state: "Massachusetts".to_string(),
        country: "United States".to_string(),
        coordinates: String::new(),
    });
    quilt.time_period = Some(TimePeriod {
        created: "1952".to_string(),
        documented: "2023".to_string(),
        era: "Post-war".to_string(),
    });
    quilt.physical_description = Some(PhysicalDescription {
        materials: "Cotton, wool batting".to_string(),
        dimensions: "210 x 180 cm".to_string(),
        condition: "Faded along the top edge".to_string(),
        weight: "2.3 kg".to_string(),
    });
    quilt.function = "Raffled to fund the festival".to_string();
    quilt.meaning = "Each square names a family that worked at the mill.".to_string();
    quilt.privacy = Some(Privacy {
        level: PrivacyLevel::PublicDomain,
        public_access: Some(true),
        ..Default::default()
    });

    let mut interview = Artifact::new(
        ArtifactId(3),
        "Dockworker Oral History",
        "/assets/artifacts/dockworker.jpg",
        "Archive Admin",
        day(2024, 3, 12),
    );
    interview.tags = strings(&["citywork", "historical"]);
    interview.file_type = "image/jpeg".to_string();
    interview.file_size = "1.2 MB".to_string();
    interview.subject = Some(Subject {
        name: "R. Alvarez".to_string(),
        is_pseudonym: true,
        role: "Longshoreman".to_string(),
        community: "Harbor District".to_string(),
    });
    interview.transcript = "We started before sunrise and the foreman called names off a card.".to_string();
    interview.additional_media = vec![
        MediaItem {
            media_type: "audio".to_string(),
            title: "Full interview".to_string(),
            duration: Some("47:12".to_string()),
            count: None,
        },
        MediaItem {
            media_type: "photos".to_string(),
            title: "Pier snapshots".to_string(),
            duration: None,
            count: Some(12),
        },
    ];
    interview.analysis = Some(Analysis {
        has_student_work: true,
        course: "HIST 214".to_string(),
        student: "M. Chen".to_string(),
        summary: "Traces shift-labour hiring practices through first-hand testimony.".to_string(),
    });
    interview.privacy = Some(Privacy {
        level: PrivacyLevel::RestrictedIdentityProtected,
        public_access: Some(false),
        identity_protected: true,
        notes: "Interviewee requested a pseudonym; do not publish the family surname.".to_string(),
    });
    interview.consent = Some(Consent {
        form_signed: true,
        date_signed: "2024-03-01".to_string(),
        permissions: ConsentPermissions {
            archive_use: true,
            classroom_use: true,
            public_display: false,
            commercial_use: false,
        },
        irb_approved: true,
        irb_number: "IRB-2024-0117".to_string(),
        irb_date: "2024-02-20".to_string(),
    });

    let mut cathedral = Artifact::new(
        ArtifactId(4),
        "Notre Dame Cathedral!",
        "/assets/artifacts/notre-dame.png",
        "Jane Smith",
        day(2024, 4, 2),
    );
    cathedral.tags = strings(&["architecture"]);
    cathedral.file_type = "image/png".to_string();
    cathedral.file_size = "4.8 MB".to_string();
    cathedral.dimensions = "3000x2000".to_string();
    cathedral.location = Some(Location {
        place: "Île de la Cité".to_string(),
        city: "Paris".to_string(),
        state: "Île-de-France".to_string(),
        country: "France".to_string(),
        coordinates: "48.8530, 2.3499".to_string(),
    });

    vec![sample, quilt, interview, cathedral]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_seeded_archive() {
        let archive = Archive::seeded();
        assert_eq!(archive.artifacts().len(), 4);
        assert!(archive.manual_collections().is_empty());
        assert_eq!(archive.find(ArtifactId(1)).unwrap().title, "Sample Artifact");
        assert!(archive.artifacts().iter().any(|a| !a.is_publicly_accessible()));
    }

    #[test]
    fn test_prepend_puts_newest_first() {
        let mut archive = Archive::seeded();
        let id = archive.next_artifact_id(at(1_700_000_000_000));
        let artifact = Artifact::new(id, "New", "new.png", "Jane", day(2024, 6, 1));
        archive.prepend(artifact).unwrap();

        assert_eq!(archive.artifacts()[0].id, id);
        assert_eq!(archive.artifacts().len(), 5);
    }

    #[test]
    fn test_prepend_rejects_duplicate_and_unknown_collection() {
        let mut archive = Archive::seeded();
        let dup = Artifact::new(ArtifactId(1), "Dup", "d.png", "Jane", day(2024, 6, 1));
        assert!(matches!(archive.prepend(dup), Err(VitrineError::Validation(_))));

        let mut orphan = Artifact::new(ArtifactId(99), "Orphan", "o.png", "Jane", day(2024, 6, 1));
        orphan.collection_id = Some("manual-404".to_string());
        assert!(matches!(archive.prepend(orphan), Err(VitrineError::NotFound(_))));
    }

    #[test]
    fn test_next_id_is_unique_even_with_clock_standing_still() {
        let mut archive = Archive::new(Vec::new());
        let now = at(1_000);
        let first = archive.next_artifact_id(now);
        archive
            .prepend(Artifact::new(first, "A", "a.png", "J", day(2024, 1, 1)))
            .unwrap();
        let second = archive.next_artifact_id(now);
        assert_eq!(first, ArtifactId(1_000));
        assert_eq!(second, ArtifactId(1_001));
    }

    #[test]
    fn test_add_collection() {
        let mut archive = Archive::seeded();
        let id = archive.add_collection("  Oral Histories ", at(42)).unwrap().id.clone();
        assert_eq!(id, "manual-42");
        assert_eq!(archive.manual_collection(&id).unwrap().name, "Oral Histories");

        let second = archive.add_collection("Maps", at(42)).unwrap().id.clone();
        assert_eq!(second, "manual-43");

        assert!(matches!(
            archive.add_collection("   ", at(50)),
            Err(VitrineError::Validation(_))
        ));
    }

    #[test]
    fn test_seed_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, serde_json::to_string(&sample_artifacts()).unwrap()).unwrap();

        let archive = Archive::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(archive.artifacts(), Archive::seeded().artifacts());
    }
}
