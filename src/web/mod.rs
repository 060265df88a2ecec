// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Web UI and JSON API for the archive
//!
//! Every login gets its own [`Session`] keyed by a random cookie token. The
//! seeded archive is never mutated, so logging out (or restarting the
//! server) discards everything a user added.

mod templates;

use axum::{
    extract::{Form, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::collections::{CollectionKind, CollectionView};
use crate::config::AppConfig;
use crate::detail::{CardView, DetailView};
use crate::download::Downloader;
use crate::draft::{ArtifactDraft, DraftStep};
use crate::filter::{FilterQuery, FilterSpec};
use crate::model::{ArtifactId, PrivacyLevel};
use crate::session::{Credentials, Permissions, Role, Session, User};
use crate::store::Archive;
use crate::{Result, VitrineError};

const SESSION_COOKIE: &str = "vitrine_session";

/// A logged-in session and when its owner last used it
struct SessionEntry {
    session: Session,
    last_seen: DateTime<Utc>,
}

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    pub seed: Archive,
    sessions: Mutex<HashMap<String, SessionEntry>>,
    downloader: Downloader,
    templates: Environment<'static>,
}

impl AppState {
    pub fn new(config: AppConfig, seed: Archive) -> Result<Self> {
        let downloader = Downloader::from_config(&config.download)?;
        Self::with_downloader(config, seed, downloader)
    }

    pub fn with_downloader(config: AppConfig, seed: Archive, downloader: Downloader) -> Result<Self> {
        Ok(Self {
            config,
            seed,
            sessions: Mutex::new(HashMap::new()),
            downloader,
            templates: templates::environment()?,
        })
    }

    fn close_delay(&self) -> Duration {
        // Bounded by config validation
        Duration::milliseconds(self.config.ui.detail_close_delay_ms as i64)
    }

    fn idle_timeout(&self) -> Duration {
        // Bounded by config validation
        Duration::seconds(self.config.session.idle_timeout_secs as i64)
    }

    /// Drop sessions idle for longer than the configured timeout
    fn expire_idle(&self, sessions: &mut HashMap<String, SessionEntry>, now: DateTime<Utc>) {
        let cutoff = now - self.idle_timeout();
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_seen > cutoff);
        let expired = before - sessions.len();
        if expired > 0 {
            info!("Expired {} idle session(s)", expired);
        }
    }

    async fn open_session(&self, credentials: &Credentials, role: Role) -> Result<String> {
        let session = Session::login(credentials, role, &self.seed)?.with_close_delay(self.close_delay());
        let token = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        self.expire_idle(&mut sessions, now);
        sessions.insert(token.clone(), SessionEntry { session, last_seen: now });
        Ok(token)
    }

    async fn close_session(&self, headers: &HeaderMap) {
        let Some(token) = session_token(headers) else {
            return;
        };
        if let Some(entry) = self.sessions.lock().await.remove(&token) {
            entry.session.logout();
        }
    }

    async fn has_session(&self, headers: &HeaderMap) -> bool {
        let Some(token) = session_token(headers) else {
            return false;
        };
        let mut sessions = self.sessions.lock().await;
        self.expire_idle(&mut sessions, Utc::now());
        sessions.contains_key(&token)
    }

    /// Run `f` against the caller's session while holding the registry lock
    async fn with_session<T>(
        &self,
        headers: &HeaderMap,
        f: impl FnOnce(&mut Session) -> Result<T>,
    ) -> Result<T> {
        let token = session_token(headers)
            .ok_or_else(|| VitrineError::Session("Not logged in".to_string()))?;
        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        self.expire_idle(&mut sessions, now);
        let entry = sessions
            .get_mut(&token)
            .ok_or_else(|| VitrineError::Session("Session expired".to_string()))?;
        entry.last_seen = now;
        f(&mut entry.session)
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<Html<String>> {
        Ok(Html(self.templates.get_template(name)?.render(ctx)?))
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

impl IntoResponse for VitrineError {
    fn into_response(self) -> Response {
        let status = match &self {
            VitrineError::NotFound(_) => StatusCode::NOT_FOUND,
            VitrineError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            VitrineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            VitrineError::Session(_) => StatusCode::UNAUTHORIZED,
            VitrineError::Fetch(_) | VitrineError::Download(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Page responses send logged-out visitors back to the login form
fn page(result: Result<Response>) -> Response {
    match result {
        Ok(response) => response,
        Err(VitrineError::Session(_)) => Redirect::to("/").into_response(),
        Err(e) => e.into_response(),
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.download.asset_root);

    Router::new()
        // Pages
        .route("/", get(index_page))
        .route("/login", post(login_form))
        .route("/logout", post(logout_form))
        .route("/archive", get(archive_page))
        .route("/archive/collections", post(create_collection_form))
        .route("/archive/open", post(open_collection_form))
        .route("/archive/back", post(back_form))
        .route("/archive/filters", post(filters_form))
        .route("/archive/artifacts/:id", get(artifact_page))
        .route("/archive/detail/close", post(close_detail_form))
        .route("/archive/new", get(new_artifact_page).post(draft_form))
        // API endpoints
        .route("/api/login", post(api_login))
        .route("/api/logout", post(api_logout))
        .route("/api/session", get(api_session))
        .route("/api/collections", get(api_collections).post(api_create_collection))
        .route("/api/collections/:id/open", post(api_open_collection))
        .route("/api/navigation", get(api_navigation))
        .route("/api/navigation/back", post(api_back))
        .route("/api/artifacts", get(api_artifacts))
        .route("/api/artifacts/:id", get(api_artifact))
        .route("/api/artifacts/:id/select", post(api_select_artifact))
        .route("/api/artifacts/:id/download", get(api_download))
        .route("/api/detail/close", post(api_close_detail))
        .route("/api/filters", get(api_filters).put(api_set_filters))
        .route("/api/filter-options", get(api_filter_options))
        .route(
            "/api/draft",
            get(api_draft)
                .post(api_open_draft)
                .patch(api_update_draft)
                .delete(api_cancel_draft),
        )
        .route("/api/draft/submit", post(api_submit_draft))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === Views ===

/// Folder face of a collection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
    pub kind: CollectionKind,
    pub item_count: usize,
    pub item_count_label: String,
    pub preview: Vec<String>,
    pub artifact_ids: Vec<ArtifactId>,
}

impl From<&CollectionView<'_>> for CollectionSummary {
    fn from(view: &CollectionView<'_>) -> Self {
        Self {
            id: view.collection.id().to_string(),
            name: view.collection.name().to_string(),
            kind: view.collection.kind(),
            item_count: view.len(),
            item_count_label: view.item_count_label(),
            preview: view.preview().iter().map(|a| a.image.clone()).collect(),
            artifact_ids: view.artifacts.iter().map(|a| a.id).collect(),
        }
    }
}

fn collection_summaries(session: &Session) -> Vec<CollectionSummary> {
    session.collections().iter().map(CollectionSummary::from).collect()
}

#[derive(Serialize)]
struct SessionInfo<'a> {
    user: &'a User,
    permissions: Permissions,
}

fn navigation_json(session: &mut Session) -> Result<Value> {
    let selected = session.selected_artifact(Utc::now()).map(|a| a.id);
    let permissions = session.permissions();
    let detail = selected
        .and_then(|id| session.archive().find(id))
        .map(|a| DetailView::build(a, &permissions));
    to_json(json!({
        "navigation": &session.navigation,
        "closing": session.navigation.is_closing(),
        "detail": detail,
    }))
}

fn render_archive(state: &AppState, session: &mut Session, error: Option<String>) -> Result<Html<String>> {
    let selected = session.selected_artifact(Utc::now()).map(|a| a.id);
    let permissions = session.permissions();
    let detail = selected
        .and_then(|id| session.archive().find(id))
        .map(|a| DetailView::build(a, &permissions));

    let collections = collection_summaries(session);
    let active = session
        .navigation
        .active_collection
        .as_deref()
        .and_then(|id| collections.iter().find(|c| c.id == id))
        .cloned();
    let cards: Vec<CardView> = session
        .filtered_artifacts()
        .into_iter()
        .map(|a| CardView::build(a, &permissions))
        .collect();

    state.render(
        "archive.html",
        context! {
            user => session.user(),
            permissions => permissions,
            mode => session.navigation.view_mode,
            detail_open => session.navigation.detail_open,
            collections => collections,
            active => active,
            cards => cards,
            detail => detail,
            filters => &session.filters,
            options => session.filter_options(),
            error => error,
        },
    )
}

fn render_draft(state: &AppState, session: &Session, error: Option<String>) -> Result<Html<String>> {
    let draft = session
        .draft()
        .ok_or_else(|| VitrineError::Session("No artifact draft is open".to_string()))?;
    let target = draft
        .collection_id
        .as_deref()
        .and_then(|id| session.archive().manual_collection(id))
        .map(|c| c.name.clone());
    let steps: Vec<Value> = DraftStep::ALL
        .iter()
        .map(|s| json!({ "number": s.number(), "title": s.title() }))
        .collect();
    let privacy_levels: Vec<&str> = PrivacyLevel::ALL.iter().map(|l| l.label()).collect();

    state.render(
        "draft.html",
        context! {
            user => session.user(),
            draft => draft,
            step => draft.current_step.number(),
            step_label => draft.current_step.to_string(),
            steps => steps,
            privacy_levels => privacy_levels,
            can_submit => draft.can_submit(),
            is_last => draft.current_step.is_last(),
            target => target,
            collections => session.archive().manual_collections(),
            error => error,
        },
    )
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if state.has_session(&headers).await {
        return Redirect::to("/archive").into_response();
    }
    page(state.render("login.html", context! {}).map(IntoResponse::into_response))
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    username: String,
    password: String,
    role: Role,
}

impl LoginForm {
    fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

async fn login_form(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    match state.open_session(&form.credentials(), form.role).await {
        Ok(token) => (
            [(header::SET_COOKIE, session_cookie(&token))],
            Redirect::to("/archive"),
        )
            .into_response(),
        Err(e) => {
            warn!("Login rejected: {}", e);
            let html = state.render("login.html", context! { error => e.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, html).into_response()
        }
    }
}

async fn logout_form(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    state.close_session(&headers).await;
    ([(header::SET_COOKIE, expired_cookie())], Redirect::to("/")).into_response()
}

async fn archive_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    page(
        state
            .with_session(&headers, |session| {
                Ok(render_archive(&state, session, None)?.into_response())
            })
            .await,
    )
}

/// Run a page action; on a user error re-render the archive with the message
async fn archive_action(
    state: &AppState,
    headers: &HeaderMap,
    action: impl FnOnce(&mut Session) -> Result<()>,
) -> Response {
    page(
        state
            .with_session(headers, |session| match action(session) {
                Ok(()) => Ok(Redirect::to("/archive").into_response()),
                Err(e @ (VitrineError::Validation(_)
                | VitrineError::NotFound(_)
                | VitrineError::PermissionDenied(_))) => {
                    let status = e.status_hint();
                    let html = render_archive(state, session, Some(e.to_string()))?;
                    Ok((status, html).into_response())
                }
                Err(e) => Err(e),
            })
            .await,
    )
}

impl VitrineError {
    fn status_hint(&self) -> StatusCode {
        match self {
            VitrineError::NotFound(_) => StatusCode::NOT_FOUND,
            VitrineError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NameForm {
    name: String,
}

async fn create_collection_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<NameForm>,
) -> Response {
    archive_action(&state, &headers, |session| {
        session.create_collection(&form.name, Utc::now()).map(|_| ())
    })
    .await
}

#[derive(Debug, Deserialize)]
struct OpenForm {
    id: String,
}

async fn open_collection_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<OpenForm>,
) -> Response {
    archive_action(&state, &headers, |session| session.open_collection(&form.id).map(|_| ())).await
}

async fn back_form(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    archive_action(&state, &headers, |session| {
        session.back_to_collections();
        Ok(())
    })
    .await
}

/// Checkbox groups arrive as repeated keys; fold them into comma lists
fn filter_query(pairs: Vec<(String, String)>) -> FilterQuery {
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }
    let mut take = |key: &str| grouped.remove(key).map(|values| values.join(","));
    FilterQuery {
        tags: take("tags"),
        file_types: take("file_types"),
        uploaders: take("uploaders"),
        start: take("start"),
        end: take("end"),
    }
}

async fn filters_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    archive_action(&state, &headers, |session| {
        session.set_filters(filter_query(pairs).into_spec()?);
        Ok(())
    })
    .await
}

async fn artifact_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    page(
        state
            .with_session(&headers, |session| {
                session.select_artifact(ArtifactId(id))?;
                Ok(render_archive(&state, session, None)?.into_response())
            })
            .await,
    )
}

async fn close_detail_form(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    archive_action(&state, &headers, |session| {
        session.close_detail(Utc::now());
        Ok(())
    })
    .await
}

#[derive(Debug, Default, Deserialize)]
struct DraftQuery {
    collection: Option<String>,
}

async fn new_artifact_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<DraftQuery>,
) -> Response {
    archive_action_or_page(&state, &headers, |session| {
        session.open_draft(query.collection)?;
        Ok(render_draft(&state, session, None)?.into_response())
    })
    .await
}

/// Like [`archive_action`] but the success path renders its own page
async fn archive_action_or_page(
    state: &AppState,
    headers: &HeaderMap,
    action: impl FnOnce(&mut Session) -> Result<Response>,
) -> Response {
    page(
        state
            .with_session(headers, |session| match action(session) {
                Err(e @ (VitrineError::NotFound(_) | VitrineError::PermissionDenied(_))) => {
                    let status = e.status_hint();
                    let html = render_archive(state, session, Some(e.to_string()))?;
                    Ok((status, html).into_response())
                }
                other => other,
            })
            .await,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DraftAction {
    Next,
    Previous,
    Step(DraftStep),
    AddTag,
    RemoveTag(usize),
    Submit,
    Cancel,
}

impl DraftAction {
    fn parse(raw: &str) -> Result<Self> {
        let invalid = || VitrineError::Validation(format!("Unknown form action '{}'", raw));
        Ok(match raw {
            "next" => DraftAction::Next,
            "previous" => DraftAction::Previous,
            "add_tag" => DraftAction::AddTag,
            "submit" => DraftAction::Submit,
            "cancel" => DraftAction::Cancel,
            other => match other.split_once(':') {
                Some(("step", n)) => {
                    let step = n.parse::<u8>().ok().and_then(DraftStep::from_number);
                    DraftAction::Step(step.ok_or_else(invalid)?)
                }
                Some(("remove_tag", n)) => DraftAction::RemoveTag(n.parse().map_err(|_| invalid())?),
                _ => return Err(invalid()),
            },
        })
    }
}

/// Overlay flat `a.b.c` form fields onto a draft. Values take the JSON type
/// of the field they replace, so `"true"` lands as a boolean where the draft
/// holds one.
fn apply_form_fields(draft: &ArtifactDraft, fields: &[(String, String)]) -> Result<ArtifactDraft> {
    let mut value = serde_json::to_value(draft)?;

    for (key, raw) in fields.iter().filter(|(key, _)| key != "action") {
        let unknown = || VitrineError::Validation(format!("Unknown form field '{}'", key));
        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key.as_str()),
        };

        let mut parent = &mut value;
        for part in parents.into_iter().flat_map(|p| p.split('.')) {
            parent = parent.get_mut(part).ok_or_else(unknown)?;
        }
        let slot = parent
            .as_object_mut()
            .ok_or_else(unknown)?
            .entry(leaf)
            .or_insert(Value::Null);
        let next = coerce_field(slot, raw);
        *slot = next;
    }

    draft_from_json(value)
}

/// Client-supplied draft JSON that does not fit the draft shape is a
/// validation failure, not a server fault
fn draft_from_json(value: Value) -> Result<ArtifactDraft> {
    serde_json::from_value(value).map_err(|e| VitrineError::Validation(format!("Invalid draft: {}", e)))
}

fn coerce_field(current: &Value, raw: &str) -> Value {
    match (current, raw) {
        (Value::Bool(_) | Value::Null, "true") => Value::Bool(true),
        (Value::Bool(_) | Value::Null, "false") => Value::Bool(false),
        (Value::Null, "") => Value::Null,
        (Value::Number(_), n) => n.trim().parse::<u64>().map(Value::from).unwrap_or(Value::Null),
        _ => Value::String(raw.to_string()),
    }
}

async fn draft_form(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let action = fields
        .iter()
        .find(|(key, _)| key == "action")
        .map(|(_, value)| value.as_str())
        .unwrap_or("next");

    page(
        state
            .with_session(&headers, |session| {
                let action = DraftAction::parse(action)?;
                let updated = apply_form_fields(session.draft_mut()?, &fields)?;
                let draft = session.draft_mut()?;
                *draft = updated;

                match action {
                    DraftAction::Next => draft.next(),
                    DraftAction::Previous => draft.previous(),
                    DraftAction::Step(step) => draft.go_to(step),
                    DraftAction::AddTag => {
                        draft.add_tag();
                    }
                    DraftAction::RemoveTag(index) => {
                        draft.remove_tag(index);
                    }
                    DraftAction::Cancel => {
                        session.cancel_draft();
                        return Ok(Redirect::to("/archive").into_response());
                    }
                    DraftAction::Submit => {
                        let uploader = &state.config.archive.default_uploader;
                        return match session.submit_draft(Utc::now(), uploader) {
                            Ok(_) => Ok(Redirect::to("/archive").into_response()),
                            Err(e @ VitrineError::Validation(_)) => {
                                let html = render_draft(&state, session, Some(e.to_string()))?;
                                Ok((StatusCode::UNPROCESSABLE_ENTITY, html).into_response())
                            }
                            Err(e) => Err(e),
                        };
                    }
                }
                Ok(render_draft(&state, session, None)?.into_response())
            })
            .await,
    )
}

// === API Handlers ===

async fn api_login(State(state): State<Arc<AppState>>, Json(form): Json<LoginForm>) -> Result<Response> {
    let token = state.open_session(&form.credentials(), form.role).await?;
    let info = json!({
        "user": { "username": form.username.trim(), "role": form.role },
        "permissions": Permissions::for_role(form.role),
    });
    Ok(([(header::SET_COOKIE, session_cookie(&token))], Json(info)).into_response())
}

async fn api_logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    state.close_session(&headers).await;
    ([(header::SET_COOKIE, expired_cookie())], StatusCode::NO_CONTENT).into_response()
}

async fn api_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Value>> {
    state
        .with_session(&headers, |session| {
            to_json(SessionInfo {
                user: session.user(),
                permissions: session.permissions(),
            })
        })
        .await
        .map(Json)
}

async fn api_collections(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Vec<CollectionSummary>>> {
    state
        .with_session(&headers, |session| Ok(collection_summaries(session)))
        .await
        .map(Json)
}

async fn api_create_collection(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(form): Json<NameForm>,
) -> Result<Response> {
    let record = state
        .with_session(&headers, |session| session.create_collection(&form.name, Utc::now()))
        .await?;
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

async fn api_open_collection(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state
        .with_session(&headers, |session| {
            session.open_collection(&id)?;
            navigation_json(session)
        })
        .await
        .map(Json)
}

async fn api_navigation(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Value>> {
    state.with_session(&headers, navigation_json).await.map(Json)
}

async fn api_back(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Value>> {
    state
        .with_session(&headers, |session| {
            session.back_to_collections();
            navigation_json(session)
        })
        .await
        .map(Json)
}

/// Cards for the current view. An empty query falls back to the stored filters.
async fn api_artifacts(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Value>> {
    let spec = query.into_spec()?;
    state
        .with_session(&headers, |session| {
            let permissions = session.permissions();
            let spec = if spec.is_empty() { &session.filters } else { &spec };
            let cards: Vec<CardView> = session
                .artifacts_matching(spec)
                .into_iter()
                .map(|a| CardView::build(a, &permissions))
                .collect();
            to_json(cards)
        })
        .await
        .map(Json)
}

async fn api_artifact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state
        .with_session(&headers, |session| {
            let permissions = session.permissions();
            to_json(DetailView::build(session.artifact(ArtifactId(id))?, &permissions))
        })
        .await
        .map(Json)
}

async fn api_select_artifact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state
        .with_session(&headers, |session| {
            session.select_artifact(ArtifactId(id))?;
            navigation_json(session)
        })
        .await
        .map(Json)
}

async fn api_close_detail(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Value>> {
    state
        .with_session(&headers, |session| {
            session.close_detail(Utc::now());
            navigation_json(session)
        })
        .await
        .map(Json)
}

async fn api_download(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Response> {
    let artifact = state
        .with_session(&headers, |session| Ok(session.artifact(ArtifactId(id))?.clone()))
        .await?;

    let download = state.downloader.fetch(&artifact).await?;
    info!("Serving download {} ({} bytes)", download.filename, download.bytes.len());

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.filename),
            ),
        ],
        download.bytes,
    )
        .into_response())
}

async fn api_filters(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<FilterSpec>> {
    state
        .with_session(&headers, |session| Ok(session.filters.clone()))
        .await
        .map(Json)
}

async fn api_set_filters(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(spec): Json<FilterSpec>,
) -> Result<Json<FilterSpec>> {
    state
        .with_session(&headers, |session| {
            session.set_filters(spec);
            Ok(session.filters.clone())
        })
        .await
        .map(Json)
}

async fn api_filter_options(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Value>> {
    state
        .with_session(&headers, |session| to_json(session.filter_options()))
        .await
        .map(Json)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct OpenDraftRequest {
    collection_id: Option<String>,
}

async fn api_open_draft(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<OpenDraftRequest>,
) -> Result<Json<ArtifactDraft>> {
    state
        .with_session(&headers, |session| Ok(session.open_draft(request.collection_id)?.clone()))
        .await
        .map(Json)
}

async fn api_draft(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<ArtifactDraft>> {
    state
        .with_session(&headers, |session| Ok(session.draft_mut()?.clone()))
        .await
        .map(Json)
}

/// Deep-merge `patch` into `target`; non-object values replace wholesale
fn merge_json(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_json(target.entry(key).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch,
    }
}

async fn api_update_draft(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Result<Json<ArtifactDraft>> {
    state
        .with_session(&headers, |session| {
            let draft = session.draft_mut()?;
            let mut merged = serde_json::to_value(&*draft)?;
            merge_json(&mut merged, patch);
            *draft = draft_from_json(merged)?;
            Ok(draft.clone())
        })
        .await
        .map(Json)
}

async fn api_cancel_draft(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<StatusCode> {
    state
        .with_session(&headers, |session| {
            session.cancel_draft();
            Ok(StatusCode::NO_CONTENT)
        })
        .await
}

async fn api_submit_draft(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response> {
    let uploader = state.config.archive.default_uploader.clone();
    let id = state
        .with_session(&headers, |session| session.submit_draft(Utc::now(), &uploader))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

/// Start the web server with config and seed archive
pub async fn start_server(config: AppConfig, seed: Archive) -> crate::Result<()> {
    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config, seed)?);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Web UI available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| VitrineError::Config(format!("Server error: {}", e)))?;

    Ok(())
}
