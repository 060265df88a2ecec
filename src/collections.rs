// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Collection derivation
//!
//! Two kinds of collection exist side by side:
//!
//! * **derived** collections are materialised on the fly from the first tag
//!   of every artifact that has no explicit assignment;
//! * **manual** collections are named containers created by an admin and
//!   kept even while empty.
//!
//! An artifact is a member of at most one collection. Member lists are
//! recomputed from the artifact list every time and never stored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::model::Artifact;

/// Number of artifact thumbnails shown on a collection folder
pub const PREVIEW_LIMIT: usize = 4;

/// Stored record of an admin-created collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualCollection {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Derived,
    Manual,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionKind::Derived => f.write_str("derived"),
            CollectionKind::Manual => f.write_str("manual"),
        }
    }
}

/// A collection identity, without its members
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Collection {
    Derived { tag: String },
    Manual { id: String, name: String },
}

impl Collection {
    /// Derived collections are identified by their tag
    pub fn id(&self) -> &str {
        match self {
            Collection::Derived { tag } => tag,
            Collection::Manual { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Collection::Derived { tag } => tag,
            Collection::Manual { name, .. } => name,
        }
    }

    pub fn kind(&self) -> CollectionKind {
        match self {
            Collection::Derived { .. } => CollectionKind::Derived,
            Collection::Manual { .. } => CollectionKind::Manual,
        }
    }

    /// Whether `artifact` belongs to this collection
    pub fn contains(&self, artifact: &Artifact) -> bool {
        match self {
            Collection::Derived { tag } => {
                artifact.assigned_collection().is_none() && artifact.primary_tag() == Some(tag.as_str())
            }
            Collection::Manual { id, .. } => artifact.assigned_collection() == Some(id.as_str()),
        }
    }

    /// Members of this collection in source order
    pub fn members<'a>(&self, artifacts: &[&'a Artifact]) -> Vec<&'a Artifact> {
        artifacts.iter().copied().filter(|a| self.contains(a)).collect()
    }
}

impl From<&ManualCollection> for Collection {
    fn from(record: &ManualCollection) -> Self {
        Collection::Manual {
            id: record.id.clone(),
            name: record.name.clone(),
        }
    }
}

/// A collection together with its materialised members
#[derive(Debug, Clone, Serialize)]
pub struct CollectionView<'a> {
    #[serde(flatten)]
    pub collection: Collection,
    pub artifacts: Vec<&'a Artifact>,
}

impl<'a> CollectionView<'a> {
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// "1 item" / "N items"
    pub fn item_count_label(&self) -> String {
        match self.len() {
            1 => "1 item".to_string(),
            n => format!("{} items", n),
        }
    }

    /// Thumbnails for the folder face
    pub fn preview(&self) -> &[&'a Artifact] {
        &self.artifacts[..self.len().min(PREVIEW_LIMIT)]
    }
}

/// Build the ordered collection list: derived collections in order of first
/// appearance of their tag, then manual collections in creation order.
///
/// Unassigned artifacts without tags land in no collection.
pub fn derive_collections<'a>(
    artifacts: &[&'a Artifact],
    manual: &[ManualCollection],
) -> Vec<CollectionView<'a>> {
    let mut derived: Vec<CollectionView<'a>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for &artifact in artifacts {
        if artifact.assigned_collection().is_some() {
            continue;
        }
        let Some(tag) = artifact.primary_tag() else {
            continue;
        };
        let slot = *index.entry(tag).or_insert_with(|| {
            derived.push(CollectionView {
                collection: Collection::Derived { tag: tag.to_string() },
                artifacts: Vec::new(),
            });
            derived.len() - 1
        });
        derived[slot].artifacts.push(artifact);
    }

    let manual_views = manual.iter().map(|record| {
        let collection = Collection::from(record);
        let artifacts = collection.members(artifacts);
        CollectionView { collection, artifacts }
    });

    derived.into_iter().chain(manual_views).collect()
}

/// Look up a collection by id among the manual records and the tags that
/// currently form derived collections. Manual ids win on collision.
pub fn resolve_collection(
    id: &str,
    manual: &[ManualCollection],
    artifacts: &[&Artifact],
) -> Option<Collection> {
    if let Some(record) = manual.iter().find(|m| m.id == id) {
        return Some(Collection::from(record));
    }
    artifacts
        .iter()
        .any(|a| a.assigned_collection().is_none() && a.primary_tag() == Some(id))
        .then(|| Collection::Derived { tag: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArtifactId;
    use chrono::NaiveDate;

    fn artifact(id: i64, tags: &[&str], collection: Option<&str>) -> Artifact {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut a = Artifact::new(ArtifactId(id), format!("A{}", id), "a.jpg", "John Doe", date);
        a.tags = tags.iter().map(|t| t.to_string()).collect();
        a.collection_id = collection.map(String::from);
        a
    }

    fn manual(id: &str, name: &str) -> ManualCollection {
        ManualCollection { id: id.to_string(), name: name.to_string() }
    }

    fn ids(view: &CollectionView<'_>) -> Vec<i64> {
        view.artifacts.iter().map(|a| a.id.0).collect()
    }

    #[test]
    fn test_worked_example() {
        let a1 = artifact(1, &["a"], None);
        let a2 = artifact(2, &["b"], Some("m1"));
        let refs = vec![&a1, &a2];

        let views = derive_collections(&refs, &[manual("m1", "Mine")]);
        assert_eq!(views.len(), 2);

        assert_eq!(views[0].collection, Collection::Derived { tag: "a".to_string() });
        assert_eq!(ids(&views[0]), vec![1]);

        assert_eq!(views[1].collection.id(), "m1");
        assert_eq!(views[1].collection.kind(), CollectionKind::Manual);
        assert_eq!(ids(&views[1]), vec![2]);
    }

    #[test]
    fn test_first_occurrence_order() {
        let a1 = artifact(1, &["zebra", "x"], None);
        let a2 = artifact(2, &["apple"], None);
        let a3 = artifact(3, &["zebra"], None);
        let a4 = artifact(4, &["mango", "zebra"], None);
        let refs = vec![&a1, &a2, &a3, &a4];

        let views = derive_collections(&refs, &[]);
        let names: Vec<&str> = views.iter().map(|v| v.collection.name()).collect();
        assert_eq!(names, vec!["zebra", "apple", "mango"]);
        assert_eq!(ids(&views[0]), vec![1, 3]);
    }

    #[test]
    fn test_untagged_unassigned_artifact_in_no_collection() {
        let a1 = artifact(1, &[], None);
        let a2 = artifact(2, &["a"], None);
        let refs = vec![&a1, &a2];

        let views = derive_collections(&refs, &[]);
        assert_eq!(views.len(), 1);
        assert!(views.iter().all(|v| !v.artifacts.iter().any(|a| a.id.0 == 1)));
    }

    #[test]
    fn test_empty_first_tag_forms_no_collection() {
        let a1 = artifact(1, &["", "maps"], None);
        let a2 = artifact(2, &["maps"], None);
        let refs = vec![&a1, &a2];

        let views = derive_collections(&refs, &[]);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].collection.id(), "maps");
        assert_eq!(ids(&views[0]), vec![2]);
        assert_eq!(resolve_collection("", &[], &refs), None);
    }

    #[test]
    fn test_every_artifact_in_at_most_one_collection() {
        let artifacts = vec![
            artifact(1, &["a", "b"], None),
            artifact(2, &["b"], None),
            artifact(3, &["a"], Some("m1")),
            artifact(4, &[], Some("m2")),
            artifact(5, &[], None),
            artifact(6, &["a"], Some("gone")),
        ];
        let refs: Vec<&Artifact> = artifacts.iter().collect();
        let views = derive_collections(&refs, &[manual("m1", "One"), manual("m2", "Two")]);

        for a in &artifacts {
            let count = views.iter().filter(|v| v.artifacts.iter().any(|m| m.id == a.id)).count();
            let expected = match a.id.0 {
                5 | 6 => 0,
                _ => 1,
            };
            assert_eq!(count, expected, "artifact {}", a.id);
        }
    }

    #[test]
    fn test_empty_manual_collection_survives() {
        let a1 = artifact(1, &["a"], None);
        let refs = vec![&a1];
        let views = derive_collections(&refs, &[manual("m1", "Empty"), manual("m2", "Also empty")]);

        assert_eq!(views.len(), 3);
        assert!(views[1].is_empty());
        assert_eq!(views[1].item_count_label(), "0 items");
        assert_eq!(views[2].collection.name(), "Also empty");
    }

    #[test]
    fn test_manual_members_keep_source_order() {
        let a1 = artifact(1, &[], Some("m1"));
        let a2 = artifact(2, &["a"], None);
        let a3 = artifact(3, &["z"], Some("m1"));
        let refs = vec![&a1, &a2, &a3];

        let views = derive_collections(&refs, &[manual("m1", "Mine")]);
        assert_eq!(ids(&views[1]), vec![1, 3]);
        assert_eq!(views[1].item_count_label(), "2 items");
    }

    #[test]
    fn test_preview_limited() {
        let artifacts: Vec<Artifact> = (1..=6).map(|i| artifact(i, &["a"], None)).collect();
        let refs: Vec<&Artifact> = artifacts.iter().collect();
        let views = derive_collections(&refs, &[]);
        assert_eq!(views[0].preview().len(), PREVIEW_LIMIT);
        assert_eq!(views[0].len(), 6);
    }

    #[test]
    fn test_resolve_collection() {
        let a1 = artifact(1, &["a"], None);
        let a2 = artifact(2, &["b"], Some("m1"));
        let refs = vec![&a1, &a2];
        let records = [manual("m1", "Mine")];

        assert_eq!(
            resolve_collection("a", &records, &refs),
            Some(Collection::Derived { tag: "a".to_string() })
        );
        assert_eq!(resolve_collection("m1", &records, &refs).map(|c| c.kind()), Some(CollectionKind::Manual));
        // "b" only exists on an assigned artifact, so it forms no derived collection
        assert_eq!(resolve_collection("b", &records, &refs), None);
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(Collection::Derived { tag: "a".to_string() }).unwrap();
        assert_eq!(json["type"], "derived");
        assert_eq!(json["tag"], "a");
    }
}
