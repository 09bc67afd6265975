pub mod contexts;
pub mod notes;
pub mod planning;

use anyhow::{bail, Context};
use contexts::{AddContextParams, ContextKind, SetConfigParams, UpdateTeamParams};
use notes::{AddNoteParams, DeleteNoteParams, GetRecentParams, SearchNotesParams, SuggestContextParams};
use planning::{AddMilestoneParams, AddPeriodParams, AddTicketParams, UpdateTicketParams};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use serde::Serialize;

use crate::classify::suggest::suggest_context;
use crate::storage::types::{NewNote, SearchParams};
use crate::storage::{contexts as ctx, milestones, notes as note_store, planning as plan, Store};

const DEFAULT_RECENT_DAYS: u32 = 7;

/// The ContextBuddy MCP tool handler. Holds the store handle and exposes every `cb_*`
/// tool via the `#[tool_router]` macro.
#[derive(Clone)]
pub struct ContextTools {
    tool_router: ToolRouter<Self>,
    store: Store,
}

fn pretty<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("serialization failed")
}

impl ContextTools {
    /// Run synchronous store work off the async runtime, initializing the data folder on
    /// first use. Errors become the tool's error text.
    async fn with_store<F>(&self, work: F) -> Result<String, String>
    where
        F: FnOnce(&Store) -> anyhow::Result<String> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || {
            store.ensure_initialized()?;
            work(&store)
        })
        .await
        .map_err(|e| format!("storage task failed: {e}"))?
        .map_err(|e| format!("{e:#}"))
    }
}

#[tool_router]
impl ContextTools {
    pub fn new(store: Store) -> Self {
        Self {
            tool_router: Self::tool_router(),
            store,
        }
    }

    #[tool(description = "List all teams and projects configured in ContextBuddy")]
    async fn cb_list_contexts(&self) -> Result<String, String> {
        tracing::debug!("cb_list_contexts called");
        self.with_store(|store| pretty(&ctx::list_contexts(store))).await
    }

    #[tool(description = "Add a new team or project to ContextBuddy")]
    async fn cb_add_context(
        &self,
        Parameters(params): Parameters<AddContextParams>,
    ) -> Result<String, String> {
        tracing::info!(kind = %params.kind, id = %params.id, "cb_add_context called");
        self.with_store(move |store| {
            let kind = params.kind;
            let created = match kind {
                ContextKind::Team => pretty(&ctx::add_team(
                    store,
                    &params.id,
                    &params.name,
                    params.description,
                )?)?,
                ContextKind::Project => pretty(&ctx::add_project(
                    store,
                    &params.id,
                    &params.name,
                    params.parent_team,
                    params.description,
                )?)?,
            };
            Ok(format!("Created {kind}: {created}"))
        })
        .await
    }

    #[tool(description = "Add a note, decision, action item, idea, or question to ContextBuddy")]
    async fn cb_add_note(
        &self,
        Parameters(params): Parameters<AddNoteParams>,
    ) -> Result<String, String> {
        tracing::info!(
            content_len = params.content.len(),
            note_type = %params.note_type,
            "cb_add_note called"
        );
        self.with_store(move |store| {
            let new = NewNote {
                team: params.team,
                project: params.project,
                ticket_id: params.ticket_id,
                tags: params.tags,
                assignee: params.assignee,
                due: params.due,
                ..NewNote::new(params.content, params.note_type)
            };
            let note = note_store::add_note(store, new)?;
            Ok(format!("Note added: {}", pretty(&note)?))
        })
        .await
    }

    #[tool(description = "Get recent notes from ContextBuddy (last 7 days by default)")]
    async fn cb_get_recent(
        &self,
        Parameters(params): Parameters<GetRecentParams>,
    ) -> Result<String, String> {
        let days = params.days.filter(|d| *d > 0).unwrap_or(DEFAULT_RECENT_DAYS);
        tracing::debug!(days, "cb_get_recent called");
        self.with_store(move |store| {
            let notes = note_store::recent_notes(store, days)?;
            if notes.is_empty() {
                return Ok("No notes found in the specified time period.".into());
            }
            pretty(&notes)
        })
        .await
    }

    #[tool(description = "Search notes in ContextBuddy by query, team, project, type, ticket, or date range")]
    async fn cb_search(
        &self,
        Parameters(params): Parameters<SearchNotesParams>,
    ) -> Result<String, String> {
        tracing::debug!(query = ?params.query, "cb_search called");
        self.with_store(move |store| {
            let notes = note_store::search_notes(store, &SearchParams::from(params))?;
            if notes.is_empty() {
                return Ok("No notes found matching your criteria.".into());
            }
            pretty(&notes)
        })
        .await
    }

    #[tool(description = "Analyze text and suggest team, project, type, and tags for a note")]
    async fn cb_suggest_context(
        &self,
        Parameters(params): Parameters<SuggestContextParams>,
    ) -> Result<String, String> {
        self.with_store(move |store| {
            let suggestion =
                suggest_context(&params.text, &ctx::teams(store), &ctx::projects(store));
            pretty(&suggestion)
        })
        .await
    }

    #[tool(description = "Delete a note by ID, or delete the most recent note (for undo)")]
    async fn cb_delete_note(
        &self,
        Parameters(params): Parameters<DeleteNoteParams>,
    ) -> Result<String, String> {
        tracing::info!(id = ?params.id, "cb_delete_note called");
        self.with_store(move |store| {
            let id = match params.id.filter(|id| !id.is_empty()) {
                Some(id) => id,
                None => match note_store::last_note(store) {
                    Some(last) => last.id,
                    None => return Ok("No notes to delete.".into()),
                },
            };
            match note_store::delete_note(store, &id)? {
                Some(note) => Ok(format!("Deleted: \"{}\" ({})", note.content, note.note_type)),
                None => bail!("Note not found with ID: {id}"),
            }
        })
        .await
    }

    #[tool(description = "Get ContextBuddy configuration including capture mode")]
    async fn cb_get_config(&self) -> Result<String, String> {
        self.with_store(|store| pretty(&ctx::get_config(store))).await
    }

    #[tool(description = "Update ContextBuddy configuration")]
    async fn cb_set_config(
        &self,
        Parameters(params): Parameters<SetConfigParams>,
    ) -> Result<String, String> {
        tracing::info!(auto_capture = ?params.auto_capture, "cb_set_config called");
        self.with_store(move |store| {
            let mut config = ctx::get_config(store);
            if let Some(mode) = params.auto_capture {
                config.auto_capture = mode;
            }
            if let Some(team) = params.default_team {
                config.default_team = team.filter(|t| !t.trim().is_empty());
            }
            ctx::save_config(store, &config)?;
            Ok(format!("Configuration updated: {}", pretty(&config)?))
        })
        .await
    }

    #[tool(description = "Update team details including responsibilities")]
    async fn cb_update_team(
        &self,
        Parameters(params): Parameters<UpdateTeamParams>,
    ) -> Result<String, String> {
        tracing::info!(id = %params.id, "cb_update_team called");
        self.with_store(move |store| {
            let (id, patch) = params.into_patch();
            match ctx::update_team(store, &id, patch)? {
                Some(team) => Ok(format!("Updated team: {}", pretty(&team)?)),
                None => bail!("Team not found: {id}"),
            }
        })
        .await
    }

    #[tool(description = "Create a new planning period (e.g., P1 2026)")]
    async fn cb_add_period(
        &self,
        Parameters(params): Parameters<AddPeriodParams>,
    ) -> Result<String, String> {
        tracing::info!(name = %params.name, "cb_add_period called");
        self.with_store(move |store| {
            let period = plan::add_period(store, params.into())?;
            Ok(format!("Created planning period: {}", pretty(&period)?))
        })
        .await
    }

    #[tool(description = "Create a new planning ticket with dependencies")]
    async fn cb_add_ticket(
        &self,
        Parameters(params): Parameters<AddTicketParams>,
    ) -> Result<String, String> {
        tracing::info!(period = %params.period_id, team = %params.team_id, "cb_add_ticket called");
        self.with_store(move |store| {
            if plan::period(store, &params.period_id).is_none() {
                bail!("Planning period not found: {}", params.period_id);
            }
            if ctx::team(store, &params.team_id).is_none() {
                bail!("Team not found: {}", params.team_id);
            }
            let ticket = plan::add_ticket(store, params.into())?;
            Ok(format!("Created ticket: {}", pretty(&ticket)?))
        })
        .await
    }

    #[tool(description = "Update a planning ticket (status, details, dependencies)")]
    async fn cb_update_ticket(
        &self,
        Parameters(params): Parameters<UpdateTicketParams>,
    ) -> Result<String, String> {
        tracing::info!(id = %params.id, status = ?params.status, "cb_update_ticket called");
        self.with_store(move |store| {
            let (id, patch) = params.into_patch();
            match plan::update_ticket(store, &id, patch)? {
                Some(ticket) => Ok(format!("Updated ticket: {}", pretty(&ticket)?)),
                None => bail!("Ticket not found: {id}"),
            }
        })
        .await
    }

    #[tool(description = "Add a milestone to a project")]
    async fn cb_add_milestone(
        &self,
        Parameters(params): Parameters<AddMilestoneParams>,
    ) -> Result<String, String> {
        tracing::info!(project = %params.project_id, "cb_add_milestone called");
        self.with_store(move |store| {
            if !ctx::projects(store).contains_key(&params.project_id) {
                bail!("Project not found: {}", params.project_id);
            }
            let milestone = milestones::add_milestone(
                store,
                &params.project_id,
                &params.name,
                &params.target_date,
            )?;
            Ok(format!("Created milestone: {}", pretty(&milestone)?))
        })
        .await
    }
}

#[tool_handler]
impl ServerHandler for ContextTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "ContextBuddy keeps notes, decisions, action items, and planning tickets for \
                 your teams and projects. Use cb_suggest_context before cb_add_note to pick a \
                 team, project, and type, and cb_search or cb_get_recent to look things up."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::{NoteType, TicketStatus};
    use tempfile::TempDir;

    fn tools() -> (TempDir, ContextTools) {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path().join(".data"));
        (tmp, ContextTools::new(store))
    }

    fn note_params(content: &str, note_type: NoteType) -> AddNoteParams {
        AddNoteParams {
            content: content.into(),
            note_type,
            team: None,
            project: None,
            tags: None,
            assignee: None,
            due: None,
            ticket_id: None,
        }
    }

    #[test]
    fn registry_lists_every_tool() {
        let (_tmp, tools) = tools();
        let mut names: Vec<String> = tools
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "cb_add_context",
                "cb_add_milestone",
                "cb_add_note",
                "cb_add_period",
                "cb_add_ticket",
                "cb_delete_note",
                "cb_get_config",
                "cb_get_recent",
                "cb_list_contexts",
                "cb_search",
                "cb_set_config",
                "cb_suggest_context",
                "cb_update_team",
                "cb_update_ticket",
            ]
        );
    }

    #[tokio::test]
    async fn first_call_initializes_storage() {
        let (_tmp, tools) = tools();
        assert!(!tools.store.exists());
        let text = tools.cb_list_contexts().await.unwrap();
        assert!(tools.store.exists());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["teams"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_note_reports_created_note() {
        let (_tmp, tools) = tools();
        let text = tools
            .cb_add_note(Parameters(note_params("Ship the beta", NoteType::Action)))
            .await
            .unwrap();
        assert!(text.starts_with("Note added: "));
        let note: serde_json::Value =
            serde_json::from_str(text.trim_start_matches("Note added: ")).unwrap();
        assert_eq!(note["status"], "open");
    }

    #[tokio::test]
    async fn delete_without_id_removes_most_recent() {
        let (_tmp, tools) = tools();
        let empty = tools
            .cb_delete_note(Parameters(DeleteNoteParams::default()))
            .await
            .unwrap();
        assert_eq!(empty, "No notes to delete.");

        tools
            .cb_add_note(Parameters(note_params("First thought", NoteType::Note)))
            .await
            .unwrap();
        tools
            .cb_add_note(Parameters(note_params("Second thought", NoteType::Idea)))
            .await
            .unwrap();

        let text = tools
            .cb_delete_note(Parameters(DeleteNoteParams::default()))
            .await
            .unwrap();
        assert_eq!(text, "Deleted: \"Second thought\" (idea)");
    }

    #[tokio::test]
    async fn delete_without_id_picks_newest_partition() {
        let (_tmp, tools) = tools();
        tools.store.initialize().unwrap();
        let note = |id: &str, created_at: &str, content: &str| {
            serde_json::json!({"id": id, "createdAt": created_at, "type": "idea", "content": content})
        };
        crate::storage::write_document(
            &tools.store.notes_dir().join("2022-03.json"),
            &serde_json::json!([note("new", "2022-03-09T10:00:00.000Z", "Newer idea")]),
        )
        .unwrap();
        crate::storage::write_document(
            &tools.store.notes_dir().join("2019-11.json"),
            &serde_json::json!([note("old", "2019-11-01T10:00:00.000Z", "Older idea")]),
        )
        .unwrap();

        let text = tools
            .cb_delete_note(Parameters(DeleteNoteParams::default()))
            .await
            .unwrap();
        assert_eq!(text, "Deleted: \"Newer idea\" (idea)");
        assert_eq!(note_store::all_notes(&tools.store)[0].id, "old");
    }

    #[tokio::test]
    async fn delete_unknown_id_is_an_error() {
        let (_tmp, tools) = tools();
        let err = tools
            .cb_delete_note(Parameters(DeleteNoteParams {
                id: Some("nope".into()),
            }))
            .await
            .unwrap_err();
        assert_eq!(err, "Note not found with ID: nope");
    }

    #[tokio::test]
    async fn add_ticket_validates_references() {
        let (_tmp, tools) = tools();
        let params = |period_id: &str| AddTicketParams {
            period_id: period_id.into(),
            initiative: "Growth".into(),
            deliverable: "Onboarding flow".into(),
            sub_deliverables: Some(vec!["Copy".into()]),
            team_id: "eng".into(),
            supports: None,
            depends_on: None,
        };

        let err = tools.cb_add_ticket(Parameters(params("period-1"))).await.unwrap_err();
        assert_eq!(err, "Planning period not found: period-1");

        let period = tools
            .cb_add_period(Parameters(AddPeriodParams {
                name: "P1 2026".into(),
                start_date: "2026-01-01".into(),
                end_date: "2026-03-31".into(),
                year: 2026,
            }))
            .await
            .unwrap();
        assert!(period.starts_with("Created planning period: "));
        let period_id = plan::periods(&tools.store)[0].id.clone();

        let err = tools.cb_add_ticket(Parameters(params(&period_id))).await.unwrap_err();
        assert_eq!(err, "Team not found: eng");

        tools
            .cb_add_context(Parameters(AddContextParams {
                kind: ContextKind::Team,
                id: "eng".into(),
                name: "Engineering".into(),
                description: None,
                parent_team: None,
            }))
            .await
            .unwrap();
        let text = tools.cb_add_ticket(Parameters(params(&period_id))).await.unwrap();
        assert!(text.starts_with("Created ticket: "));
        assert_eq!(plan::tickets(&tools.store)[0].status, TicketStatus::Active);
    }

    #[tokio::test]
    async fn update_unknown_team_is_an_error() {
        let (_tmp, tools) = tools();
        let err = tools
            .cb_update_team(Parameters(UpdateTeamParams {
                id: "ghost".into(),
                name: None,
                description: None,
                responsibilities: None,
                is_my_team: Some(true),
            }))
            .await
            .unwrap_err();
        assert_eq!(err, "Team not found: ghost");
    }

    #[tokio::test]
    async fn set_config_merges_fields() {
        let (_tmp, tools) = tools();
        let text = tools
            .cb_set_config(Parameters(SetConfigParams {
                auto_capture: Some(crate::storage::types::CaptureMode::Off),
                default_team: None,
            }))
            .await
            .unwrap();
        assert!(text.starts_with("Configuration updated: "));
        let config = ctx::get_config(&tools.store);
        assert_eq!(config.auto_capture, crate::storage::types::CaptureMode::Off);
        assert_eq!(config.default_team, None);
    }

    #[tokio::test]
    async fn default_team_clears_with_null_or_empty_string() {
        let (_tmp, tools) = tools();
        let set = |value: serde_json::Value| -> SetConfigParams {
            serde_json::from_value(value).unwrap()
        };

        tools
            .cb_set_config(Parameters(set(serde_json::json!({"defaultTeam": "eng"}))))
            .await
            .unwrap();
        assert_eq!(ctx::get_config(&tools.store).default_team.as_deref(), Some("eng"));

        // Absent leaves it alone.
        tools
            .cb_set_config(Parameters(set(serde_json::json!({"autoCapture": "off"}))))
            .await
            .unwrap();
        assert_eq!(ctx::get_config(&tools.store).default_team.as_deref(), Some("eng"));

        tools
            .cb_set_config(Parameters(set(serde_json::json!({"defaultTeam": null}))))
            .await
            .unwrap();
        assert_eq!(ctx::get_config(&tools.store).default_team, None);

        tools
            .cb_set_config(Parameters(set(serde_json::json!({"defaultTeam": "eng"}))))
            .await
            .unwrap();
        tools
            .cb_set_config(Parameters(set(serde_json::json!({"defaultTeam": ""}))))
            .await
            .unwrap();
        assert_eq!(ctx::get_config(&tools.store).default_team, None);
    }

    #[tokio::test]
    async fn milestone_requires_known_project() {
        let (_tmp, tools) = tools();
        let err = tools
            .cb_add_milestone(Parameters(AddMilestoneParams {
                project_id: "api".into(),
                name: "Beta".into(),
                target_date: "2026-06-01".into(),
            }))
            .await
            .unwrap_err();
        assert_eq!(err, "Project not found: api");
    }

    #[tokio::test]
    async fn search_with_no_hits_says_so() {
        let (_tmp, tools) = tools();
        let text = tools
            .cb_search(Parameters(SearchNotesParams {
                query: Some("nothing".into()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(text, "No notes found matching your criteria.");
    }
}
