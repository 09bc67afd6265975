//! JSON handlers for `/api/*`.
//!
//! Request bodies are parsed by hand from raw bytes so that malformed JSON and missing
//! fields come back as `400 {"error": ...}` instead of axum's plain-text rejections. An
//! empty body counts as `{}`.

use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::events::DashboardEvent;
use super::{ApiError, AppState};
use crate::storage::types::{
    ArchivedItems, Contexts, Milestone, MilestonePatch, NewNote, NewPeriod, NewTicket, Note,
    NotePatch, NoteStatus, PlanningPeriod, SearchParams, Team, TeamPatch, Ticket, TicketPatch,
    TicketStatus,
};
use crate::storage::{archive, contexts, milestones, notes, parse_timestamp, planning, Store};

type ApiResult<T> = Result<Json<T>, ApiError>;
type Created<T> = Result<(StatusCode, Json<T>), ApiError>;

/// Run synchronous store work on the blocking pool.
async fn blocking<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> Result<T, ApiError> + Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || work(&store))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("storage task failed: {e}")))?
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| ApiError::BadRequest(format!("body is not UTF-8: {e}")))?;
    let text = if text.trim().is_empty() { "{}" } else { text };
    serde_json::from_str(text).map_err(|e| ApiError::BadRequest(e.to_string()))
}

fn query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(q)| q)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

fn not_found(what: &str) -> ApiError {
    ApiError::NotFound(format!("{what} not found"))
}

// -- notes --

pub async fn list_notes(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Vec<Note>> {
    let params = query(params)?;
    for bound in [&params.from, &params.to].into_iter().flatten() {
        if parse_timestamp(bound).is_none() {
            return Err(ApiError::BadRequest(format!("invalid date: {bound}")));
        }
    }
    let found = blocking(&state, move |store| Ok(notes::search_notes(store, &params)?)).await?;
    Ok(Json(found))
}

pub async fn create_note(State(state): State<AppState>, body: Bytes) -> Created<Note> {
    let new: NewNote = parse_body(&body)?;
    let note = blocking(&state, move |store| {
        store.ensure_initialized()?;
        Ok(notes::add_note(store, new)?)
    })
    .await?;
    state.events.publish(DashboardEvent::Update {
        kind: "note",
        id: note.id.clone(),
    });
    Ok((StatusCode::CREATED, Json(note)))
}

async fn patch_note(state: &AppState, id: String, patch: NotePatch) -> ApiResult<Note> {
    let note = blocking(state, move |store| {
        notes::update_note(store, &id, patch)?.ok_or_else(|| not_found("Note"))
    })
    .await?;
    state.events.publish(DashboardEvent::Update {
        kind: "note",
        id: note.id.clone(),
    });
    Ok(Json(note))
}

pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Note> {
    let patch: NotePatch = parse_body(&body)?;
    patch_note(&state, id, patch).await
}

#[derive(Deserialize)]
struct StatusBody {
    status: Option<NoteStatus>,
}

pub async fn update_note_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Note> {
    let StatusBody { status } = parse_body(&body)?;
    let patch = NotePatch {
        status: Some(status),
        ..Default::default()
    };
    patch_note(&state, id, patch).await
}

// -- contexts --

pub async fn get_contexts(State(state): State<AppState>) -> ApiResult<Contexts> {
    let found = blocking(&state, |store| Ok(contexts::list_contexts(store))).await?;
    Ok(Json(found))
}

/// A team with its map key inlined, as the team page expects.
#[derive(Serialize)]
pub struct TeamView {
    id: String,
    #[serde(flatten)]
    team: Team,
}

pub async fn get_team(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<TeamView> {
    let view = blocking(&state, move |store| {
        let team = contexts::team(store, &id).ok_or_else(|| not_found("Team"))?;
        Ok(TeamView { id, team })
    })
    .await?;
    Ok(Json(view))
}

pub async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<TeamView> {
    let patch: TeamPatch = parse_body(&body)?;
    let view = blocking(&state, move |store| {
        let team = contexts::update_team(store, &id, patch)?.ok_or_else(|| not_found("Team"))?;
        Ok(TeamView { id, team })
    })
    .await?;
    state.events.publish(DashboardEvent::Update {
        kind: "team",
        id: view.id.clone(),
    });
    Ok(Json(view))
}

// -- planning --

pub async fn list_periods(State(state): State<AppState>) -> ApiResult<Vec<PlanningPeriod>> {
    let found = blocking(&state, |store| Ok(planning::periods(store))).await?;
    Ok(Json(found))
}

pub async fn create_period(State(state): State<AppState>, body: Bytes) -> Created<PlanningPeriod> {
    let new: NewPeriod = parse_body(&body)?;
    let period = blocking(&state, move |store| Ok(planning::add_period(store, new)?)).await?;
    state.events.publish(DashboardEvent::Update {
        kind: "period",
        id: period.id.clone(),
    });
    Ok((StatusCode::CREATED, Json(period)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketQuery {
    period_id: Option<String>,
    team_id: Option<String>,
    status: Option<TicketStatus>,
}

pub async fn list_tickets(
    State(state): State<AppState>,
    params: Result<Query<TicketQuery>, QueryRejection>,
) -> ApiResult<Vec<Ticket>> {
    let q = query(params)?;
    let found = blocking(&state, move |store| {
        Ok(planning::tickets_filtered(
            store,
            q.period_id.as_deref(),
            q.team_id.as_deref(),
            q.status,
        ))
    })
    .await?;
    Ok(Json(found))
}

pub async fn create_ticket(State(state): State<AppState>, body: Bytes) -> Created<Ticket> {
    let new: NewTicket = parse_body(&body)?;
    let ticket = blocking(&state, move |store| {
        if planning::period(store, &new.period_id).is_none() {
            return Err(ApiError::NotFound(format!(
                "Planning period not found: {}",
                new.period_id
            )));
        }
        if contexts::team(store, &new.team_id).is_none() {
            return Err(ApiError::NotFound(format!("Team not found: {}", new.team_id)));
        }
        Ok(planning::add_ticket(store, new)?)
    })
    .await?;
    publish_ticket(&state, &ticket);
    Ok((StatusCode::CREATED, Json(ticket)))
}

fn publish_ticket(state: &AppState, ticket: &Ticket) {
    state.events.publish(DashboardEvent::Update {
        kind: "ticket",
        id: ticket.id.clone(),
    });
}

pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Ticket> {
    let patch: TicketPatch = parse_body(&body)?;
    let ticket = blocking(&state, move |store| {
        planning::update_ticket(store, &id, patch)?.ok_or_else(|| not_found("Ticket"))
    })
    .await?;
    publish_ticket(&state, &ticket);
    Ok(Json(ticket))
}

pub async fn restore_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Ticket> {
    let ticket = blocking(&state, move |store| {
        planning::restore_ticket(store, &id)?.ok_or_else(|| not_found("Ticket"))
    })
    .await?;
    publish_ticket(&state, &ticket);
    Ok(Json(ticket))
}

#[derive(Deserialize)]
struct DoneBody {
    done: bool,
}

pub async fn set_sub_deliverable(
    State(state): State<AppState>,
    path: Result<Path<(String, usize)>, PathRejection>,
    body: Bytes,
) -> ApiResult<Ticket> {
    // A non-numeric index addresses nothing.
    let Ok(Path((id, index))) = path else {
        return Err(ApiError::NotFound("Not found".into()));
    };
    let DoneBody { done } = parse_body(&body)?;
    let ticket = blocking(&state, move |store| {
        planning::set_sub_deliverable(store, &id, index, done)?
            .ok_or_else(|| ApiError::NotFound("Not found".into()))
    })
    .await?;
    publish_ticket(&state, &ticket);
    Ok(Json(ticket))
}

// -- milestones and archive --

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneQuery {
    project_id: Option<String>,
}

pub async fn list_milestones(
    State(state): State<AppState>,
    params: Result<Query<MilestoneQuery>, QueryRejection>,
) -> ApiResult<Vec<Milestone>> {
    let q = query(params)?;
    let found = blocking(&state, move |store| {
        Ok(match q.project_id {
            Some(project_id) => milestones::milestones_by_project(store, &project_id),
            None => milestones::milestones(store),
        })
    })
    .await?;
    Ok(Json(found))
}

pub async fn update_milestone(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Milestone> {
    let patch: MilestonePatch = parse_body(&body)?;
    let milestone = blocking(&state, move |store| {
        milestones::update_milestone(store, &id, patch)?.ok_or_else(|| not_found("Milestone"))
    })
    .await?;
    state.events.publish(DashboardEvent::Update {
        kind: "milestone",
        id: milestone.id.clone(),
    });
    Ok(Json(milestone))
}

pub async fn archived(State(state): State<AppState>) -> ApiResult<ArchivedItems> {
    let found = blocking(&state, |store| Ok(archive::archived_items(store))).await?;
    Ok(Json(found))
}
