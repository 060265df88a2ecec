// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Session context: who is logged in, what they may do, and their private
//! copy of the archive
//!
//! A session is created at login and thrown away at logout. Everything the
//! user changes (new artifacts, new collections, filters, navigation) lives
//! here and nowhere else.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::collections::{derive_collections, resolve_collection, Collection, CollectionView, ManualCollection};
use crate::draft::ArtifactDraft;
use crate::filter::{apply_filters, FilterOptions, FilterSpec};
use crate::model::{Artifact, ArtifactId};
use crate::navigation::Navigation;
use crate::store::Archive;
use crate::visibility::visible_artifacts;
use crate::{Result, VitrineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Viewer => f.write_str("viewer"),
        }
    }
}

impl FromStr for Role {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            other => Err(VitrineError::Validation(format!(
                "Unknown role '{}', expected admin or viewer",
                other
            ))),
        }
    }
}

/// Capability table derived from a role.
///
/// Every permission check in the crate goes through this struct instead of
/// comparing roles directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub is_admin: bool,
    pub is_viewer: bool,
    pub can_add_artifacts: bool,
    pub can_edit_artifacts: bool,
    pub can_delete_artifacts: bool,
    pub can_create_collections: bool,
    /// Artifacts flagged `publicAccess: false`
    pub can_view_private_artifacts: bool,
    /// IRB numbers, consent form metadata, privacy notes
    pub can_view_private_details: bool,
    /// Knowing that a subject name is a pseudonym
    pub can_view_pseudonym_context: bool,
}

impl Permissions {
    pub fn for_role(role: Role) -> Self {
        let admin = role == Role::Admin;
        Self {
            is_admin: admin,
            is_viewer: !admin,
            can_add_artifacts: admin,
            can_edit_artifacts: admin,
            can_delete_artifacts: admin,
            can_create_collections: admin,
            can_view_private_artifacts: admin,
            can_view_private_details: admin,
            can_view_pseudonym_context: admin,
        }
    }

    /// Nobody logged in: same as a viewer
    pub fn anonymous() -> Self {
        Self::for_role(Role::Viewer)
    }
}

/// Login form input
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Both fields must be filled in. No password check happens beyond that.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(VitrineError::Validation("Username is required".to_string()));
        }
        if self.password.is_empty() {
            return Err(VitrineError::Validation("Password is required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub role: Role,
}

/// Per-login state
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
    archive: Archive,
    pub navigation: Navigation,
    pub filters: FilterSpec,
    draft: Option<ArtifactDraft>,
    close_delay: Duration,
}

impl Session {
    /// Start a session over a private copy of `seed`
    pub fn login(credentials: &Credentials, role: Role, seed: &Archive) -> Result<Self> {
        credentials.validate()?;
        let user = User {
            username: credentials.username.trim().to_string(),
            role,
        };
        info!("Session opened for {} ({})", user.username, user.role);
        Ok(Self::for_user(user, seed))
    }

    /// Session for an already trusted user, such as the local CLI operator
    pub fn for_user(user: User, seed: &Archive) -> Self {
        Self {
            user,
            archive: seed.clone(),
            navigation: Navigation::default(),
            filters: FilterSpec::default(),
            draft: None,
            close_delay: Duration::milliseconds(400),
        }
    }

    /// End the session; all of its state is dropped
    pub fn logout(self) {
        info!("Session closed for {}", self.user.username);
    }

    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::for_role(self.user.role)
    }

    fn require(&self, allowed: bool, what: &'static str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(VitrineError::PermissionDenied(what))
        }
    }

    pub fn visible_artifacts(&self) -> Vec<&Artifact> {
        visible_artifacts(self.archive.artifacts(), self.permissions().can_view_private_artifacts)
    }

    /// Visible artifact by id; hidden artifacts are reported as missing
    pub fn artifact(&self, id: ArtifactId) -> Result<&Artifact> {
        self.visible_artifacts()
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| VitrineError::NotFound(format!("Artifact {}", id)))
    }

    pub fn collections(&self) -> Vec<CollectionView<'_>> {
        derive_collections(&self.visible_artifacts(), self.archive.manual_collections())
    }

    pub fn find_collection(&self, id: &str) -> Option<Collection> {
        resolve_collection(id, self.archive.manual_collections(), &self.visible_artifacts())
    }

    pub fn active_collection(&self) -> Option<Collection> {
        self.navigation
            .active_collection
            .as_deref()
            .and_then(|id| self.find_collection(id))
    }

    /// Visible artifacts, narrowed to the open collection, then filtered
    pub fn filtered_artifacts(&self) -> Vec<&Artifact> {
        self.artifacts_matching(&self.filters)
    }

    /// Like [`Session::filtered_artifacts`] with a one-off filter
    pub fn artifacts_matching(&self, spec: &FilterSpec) -> Vec<&Artifact> {
        let visible = self.visible_artifacts();
        let base = match self.active_collection() {
            Some(collection) => collection.members(&visible),
            None => visible,
        };
        apply_filters(&base, spec)
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::for_artifacts(&self.visible_artifacts())
    }

    pub fn set_filters(&mut self, filters: FilterSpec) {
        self.filters = filters;
    }

    pub fn create_collection(&mut self, name: &str, now: DateTime<Utc>) -> Result<ManualCollection> {
        self.require(self.permissions().can_create_collections, "creating collections")?;
        let record = self.archive.add_collection(name, now)?.clone();
        info!("{} created collection '{}' ({})", self.user.username, record.name, record.id);
        Ok(record)
    }

    pub fn open_collection(&mut self, id: &str) -> Result<Collection> {
        let collection = self
            .find_collection(id)
            .ok_or_else(|| VitrineError::NotFound(format!("Collection {}", id)))?;
        self.navigation.open_collection(collection.id());
        Ok(collection)
    }

    pub fn back_to_collections(&mut self) {
        self.navigation.back_to_collections();
    }

    pub fn select_artifact(&mut self, id: ArtifactId) -> Result<()> {
        self.artifact(id)?;
        self.navigation.select(id);
        Ok(())
    }

    pub fn close_detail(&mut self, now: DateTime<Utc>) {
        self.navigation.close_detail(now, self.close_delay);
    }

    /// Artifact currently shown (or fading out) in the detail panel
    pub fn selected_artifact(&mut self, now: DateTime<Utc>) -> Option<&Artifact> {
        self.navigation.settle(now);
        let id = self.navigation.selected_artifact?;
        self.archive.find(id)
    }

    /// Start a new draft. A draft opened from inside a manual collection
    /// targets that collection.
    pub fn open_draft(&mut self, target: Option<String>) -> Result<&mut ArtifactDraft> {
        self.require(self.permissions().can_add_artifacts, "adding artifacts")?;
        if let Some(id) = target.as_deref().filter(|id| !id.is_empty()) {
            if self.archive.manual_collection(id).is_none() {
                return Err(VitrineError::NotFound(format!("Collection {}", id)));
            }
        }
        Ok(self.draft.insert(ArtifactDraft::for_collection(target)))
    }

    pub fn draft(&self) -> Option<&ArtifactDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Result<&mut ArtifactDraft> {
        self.draft
            .as_mut()
            .ok_or_else(|| VitrineError::Session("No artifact draft is open".to_string()))
    }

    pub fn cancel_draft(&mut self) {
        self.draft = None;
    }

    /// Validate the open draft and prepend it to the archive. A failed
    /// submission leaves the draft open for correction.
    pub fn submit_draft(&mut self, now: DateTime<Utc>, default_uploader: &str) -> Result<ArtifactId> {
        self.require(self.permissions().can_add_artifacts, "adding artifacts")?;
        let draft = self.draft_mut()?;
        if !draft.can_submit() {
            return Err(VitrineError::Validation("A title and an image are required".to_string()));
        }
        let draft = draft.clone();

        let id = self.archive.next_artifact_id(now);
        let artifact = draft.into_artifact(id, now.date_naive(), default_uploader)?;
        let title = artifact.title.clone();
        self.archive.prepend(artifact)?;
        self.draft = None;

        info!("{} added artifact {} '{}'", self.user.username, id, title);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn login(role: Role) -> Session {
        Session::login(&creds("ada", "pw"), role, &Archive::seeded()).unwrap()
    }

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn test_viewer_permissions_all_false() {
        let p = Permissions::for_role(Role::Viewer);
        assert!(p.is_viewer);
        assert!(!p.is_admin);
        assert!(!p.can_add_artifacts);
        assert!(!p.can_edit_artifacts);
        assert!(!p.can_delete_artifacts);
        assert!(!p.can_create_collections);
        assert!(!p.can_view_private_artifacts);
        assert!(!p.can_view_private_details);
        assert!(!p.can_view_pseudonym_context);
        assert_eq!(Permissions::anonymous(), p);
    }

    #[test]
    fn test_admin_permissions_all_true() {
        let p = Permissions::for_role(Role::Admin);
        assert!(p.is_admin);
        assert!(!p.is_viewer);
        assert!(p.can_add_artifacts);
        assert!(p.can_edit_artifacts);
        assert!(p.can_delete_artifacts);
        assert!(p.can_create_collections);
        assert!(p.can_view_private_artifacts);
        assert!(p.can_view_private_details);
        assert!(p.can_view_pseudonym_context);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" viewer ".parse::<Role>().unwrap(), Role::Viewer);
        assert!("curator".parse::<Role>().is_err());
    }

    #[test]
    fn test_login_requires_both_fields() {
        let seed = Archive::seeded();
        assert!(Session::login(&creds("", "pw"), Role::Viewer, &seed).is_err());
        assert!(Session::login(&creds("   ", "pw"), Role::Viewer, &seed).is_err());
        assert!(Session::login(&creds("ada", ""), Role::Viewer, &seed).is_err());

        let session = Session::login(&creds(" ada ", "anything"), Role::Admin, &seed).unwrap();
        assert_eq!(session.user().username, "ada");
        assert_eq!(session.user().role, Role::Admin);
    }

    #[test]
    fn test_private_artifact_visibility_by_role() {
        let viewer = login(Role::Viewer);
        let admin = login(Role::Admin);

        let private: Vec<ArtifactId> = admin
            .archive()
            .artifacts()
            .iter()
            .filter(|a| !a.is_publicly_accessible())
            .map(|a| a.id)
            .collect();
        assert!(!private.is_empty());

        for id in private {
            assert!(viewer.visible_artifacts().iter().all(|a| a.id != id));
            assert!(admin.visible_artifacts().iter().any(|a| a.id == id));
            assert!(matches!(viewer.artifact(id), Err(VitrineError::NotFound(_))));
        }
    }

    #[test]
    fn test_viewer_cannot_create() {
        let mut viewer = login(Role::Viewer);
        assert!(matches!(
            viewer.create_collection("Mine", at(1)),
            Err(VitrineError::PermissionDenied(_))
        ));
        assert!(matches!(viewer.open_draft(None), Err(VitrineError::PermissionDenied(_))));
    }

    #[test]
    fn test_sessions_do_not_share_state() {
        let seed = Archive::seeded();
        let mut first = Session::login(&creds("a", "p"), Role::Admin, &seed).unwrap();
        let second = Session::login(&creds("b", "p"), Role::Admin, &seed).unwrap();

        first.create_collection("Only mine", at(5)).unwrap();
        assert_eq!(first.archive().manual_collections().len(), 1);
        assert!(second.archive().manual_collections().is_empty());
        assert!(seed.manual_collections().is_empty());
    }

    #[test]
    fn test_create_and_fill_manual_collection() {
        let mut admin = login(Role::Admin);
        let record = admin.create_collection("Oral Histories", at(1_000)).unwrap();

        let draft = admin.open_draft(Some(record.id.clone())).unwrap();
        draft.title = "Interview".to_string();
        draft.image = "interview.jpg".to_string();
        draft.tags = vec!["animals".to_string()];
        let id = admin.submit_draft(at(2_000_000_000_000), "Current User").unwrap();

        assert!(admin.draft().is_none());
        assert_eq!(admin.archive().artifacts()[0].id, id);

        let views = admin.collections();
        let manual = views.iter().find(|v| v.collection.id() == record.id).unwrap();
        assert_eq!(manual.artifacts.len(), 1);
        // Assigned artifacts never show up in the derived collection of their tag
        let animals = views.iter().find(|v| v.collection.id() == "animals").unwrap();
        assert!(animals.artifacts.iter().all(|a| a.id != id));
    }

    #[test]
    fn test_submit_without_image_keeps_draft() {
        let mut admin = login(Role::Admin);
        let before = admin.archive().artifacts().len();
        admin.open_draft(None).unwrap().title = "No image".to_string();

        assert!(matches!(
            admin.submit_draft(at(1), "Current User"),
            Err(VitrineError::Validation(_))
        ));
        assert_eq!(admin.archive().artifacts().len(), before);
        assert!(admin.draft().is_some());
    }

    #[test]
    fn test_open_draft_rejects_unknown_target() {
        let mut admin = login(Role::Admin);
        assert!(matches!(
            admin.open_draft(Some("manual-missing".to_string())),
            Err(VitrineError::NotFound(_))
        ));
    }

    #[test]
    fn test_filtered_artifacts_scoped_to_open_collection() {
        let mut viewer = login(Role::Viewer);
        viewer.open_collection("animals").unwrap();
        let ids: Vec<i64> = viewer.filtered_artifacts().iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![1]);

        viewer.back_to_collections();
        viewer.set_filters(FilterSpec::default().with_tags(["citywork"]));
        let ids: Vec<i64> = viewer.filtered_artifacts().iter().map(|a| a.id.0).collect();
        // The private oral history also carries "citywork" but stays hidden
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_open_unknown_collection() {
        let mut viewer = login(Role::Viewer);
        assert!(viewer.open_collection("nope").is_err());
        assert!(viewer.navigation.active_collection.is_none());
    }

    #[test]
    fn test_detail_selection_lifecycle() {
        let mut viewer = login(Role::Viewer);
        viewer.select_artifact(ArtifactId(2)).unwrap();
        assert!(viewer.navigation.detail_open);

        viewer.close_detail(at(0));
        assert_eq!(viewer.selected_artifact(at(100)).map(|a| a.id), Some(ArtifactId(2)));
        assert!(viewer.selected_artifact(at(400)).is_none());

        assert!(viewer.select_artifact(ArtifactId(3)).is_err());
    }
}
