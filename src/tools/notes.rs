//! Parameter definitions for the note tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::types::{NoteType, SearchParams};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddNoteParams {
    #[schemars(description = "The content of the note")]
    pub content: String,

    #[serde(rename = "type")]
    #[schemars(description = "Type of note: decision, note, action, idea, or question")]
    pub note_type: NoteType,

    #[schemars(description = "Team this note belongs to")]
    pub team: Option<String>,

    #[schemars(description = "Project this note belongs to")]
    pub project: Option<String>,

    #[schemars(description = "Tags for categorization")]
    pub tags: Option<Vec<String>>,

    #[schemars(description = "For actions: who is responsible")]
    pub assignee: Option<String>,

    #[schemars(description = "For actions: due date (ISO format)")]
    pub due: Option<String>,

    #[schemars(description = "Link this note to a planning ticket")]
    pub ticket_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetRecentParams {
    #[schemars(description = "Number of days to look back (default: 7)")]
    pub days: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchNotesParams {
    #[schemars(description = "Text to search for in note content and tags")]
    pub query: Option<String>,

    #[schemars(description = "Filter by team")]
    pub team: Option<String>,

    #[schemars(description = "Filter by project")]
    pub project: Option<String>,

    #[serde(rename = "type")]
    #[schemars(description = "Filter by note type")]
    pub note_type: Option<NoteType>,

    #[schemars(description = "Start date (ISO format)")]
    pub from: Option<String>,

    #[schemars(description = "End date (ISO format)")]
    pub to: Option<String>,

    #[schemars(description = "Filter by linked planning ticket")]
    pub ticket_id: Option<String>,
}

impl From<SearchNotesParams> for SearchParams {
    fn from(p: SearchNotesParams) -> Self {
        Self {
            query: p.query,
            team: p.team,
            project: p.project,
            note_type: p.note_type,
            from: p.from,
            to: p.to,
            ticket_id: p.ticket_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SuggestContextParams {
    #[schemars(description = "Text to analyze for context suggestions")]
    pub text: String,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeleteNoteParams {
    #[schemars(
        description = "The ID of the note to delete. If not provided, deletes the most recent note."
    )]
    pub id: Option<String>,
}
