//! Entity type definitions for every persisted document.
//!
//! All types serialize with camelCase keys so the JSON files stay readable by the
//! dashboard scripts. Optional fields are omitted when unset; note `status` is always
//! written (as `null` for non-action notes).

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// How eagerly the capture hook annotates incoming messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Aggressive,
    Conservative,
    Off,
}

/// Singleton per data folder, stored in `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,
    pub default_team: Option<String>,
    pub auto_capture: CaptureMode,
    pub created_at: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            version: "1.0".into(),
            default_team: None,
            auto_capture: CaptureMode::Aggressive,
            created_at: super::now_timestamp(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_my_team: Option<bool>,
    pub created_at: String,
}

/// Partial team update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Option<Vec<String>>,
    pub is_my_team: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    /// Owning team id. Not validated against `teams.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: String,
}

pub type Teams = BTreeMap<String, Team>;
pub type Projects = BTreeMap<String, Project>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contexts {
    pub teams: Teams,
    pub projects: Projects,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    Decision,
    Note,
    Action,
    Idea,
    Question,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decision => "decision",
            Self::Note => "note",
            Self::Action => "action",
            Self::Idea => "idea",
            Self::Question => "question",
        }
    }
}

impl std::fmt::Display for NoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for NoteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decision" => Ok(Self::Decision),
            "note" => Ok(Self::Note),
            "action" => Ok(Self::Action),
            "idea" => Ok(Self::Idea),
            "question" => Ok(Self::Question),
            _ => Err(format!("unknown note type: {s}")),
        }
    }
}

/// Only meaningful for `action` notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    Open,
    Done,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub created_at: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<NoteStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

/// Input for creating a note. `status` is ignored unless the type is `action`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub content: String,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub ticket_id: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub status: Option<NoteStatus>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
}

impl NewNote {
    pub fn new(content: impl Into<String>, note_type: NoteType) -> Self {
        Self {
            content: content.into(),
            note_type,
            team: None,
            project: None,
            ticket_id: None,
            tags: None,
            status: None,
            assignee: None,
            due: None,
        }
    }
}

/// Partial note update. Nullable fields use `Option<Option<_>>`: absent leaves the field
/// alone, `null` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    pub content: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<NoteType>,
    #[serde(default, deserialize_with = "double_option")]
    pub team: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub project: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub ticket_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<NoteStatus>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due: Option<Option<String>>,
    /// Editing this does not move the note to another monthly partition.
    pub created_at: Option<String>,
}

/// Distinguishes an explicit `null` from an absent field.
pub(crate) fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Note search filters. All present filters are AND-combined.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub team: Option<String>,
    pub project: Option<String>,
    #[serde(rename = "type")]
    pub note_type: Option<NoteType>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub ticket_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSuggestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(rename = "type")]
    pub note_type: NoteType,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningPeriod {
    pub id: String,
    /// e.g. `"P1 2026"`
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub year: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPeriod {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Done,
    Cancelled,
}

impl std::str::FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "done" => Ok(Self::Done),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("unknown ticket status: {s}")),
        }
    }
}

/// Accepts both the current `{text, done}` shape and the legacy bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSubDeliverable {
    Text(String),
    Full {
        text: String,
        #[serde(default)]
        done: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSubDeliverable")]
pub struct SubDeliverable {
    pub text: String,
    pub done: bool,
}

impl From<RawSubDeliverable> for SubDeliverable {
    fn from(raw: RawSubDeliverable) -> Self {
        match raw {
            RawSubDeliverable::Text(text) => Self { text, done: false },
            RawSubDeliverable::Full { text, done } => Self { text, done },
        }
    }
}

impl SubDeliverable {
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub period_id: String,
    pub initiative: String,
    pub deliverable: String,
    #[serde(default)]
    pub sub_deliverables: Vec<SubDeliverable>,
    pub team_id: String,
    #[serde(default)]
    pub supports: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub status: TicketStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub period_id: String,
    pub initiative: String,
    pub deliverable: String,
    #[serde(default)]
    pub sub_deliverables: Vec<SubDeliverable>,
    pub team_id: String,
    #[serde(default)]
    pub supports: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub status: Option<TicketStatus>,
}

/// Partial ticket update. Period and team references are not re-validated.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    pub period_id: Option<String>,
    pub initiative: Option<String>,
    pub deliverable: Option<String>,
    pub sub_deliverables: Option<Vec<SubDeliverable>>,
    pub team_id: Option<String>,
    pub supports: Option<Vec<String>>,
    pub depends_on: Option<Vec<String>>,
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStatus {
    Planned,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub target_date: String,
    pub status: MilestoneStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestonePatch {
    pub name: Option<String>,
    pub target_date: Option<String>,
    pub status: Option<MilestoneStatus>,
}

/// The dashboard's archive view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchivedItems {
    pub notes: Vec<Note>,
    pub tickets: Vec<Ticket>,
    pub milestones: Vec<Milestone>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_string_sub_deliverables_are_upgraded() {
        let json = r#"["Ship it", {"text": "Write docs", "done": true}]"#;
        let subs: Vec<SubDeliverable> = serde_json::from_str(json).unwrap();
        assert_eq!(subs[0], SubDeliverable::pending("Ship it"));
        assert!(subs[1].done);
        assert_eq!(subs[1].text, "Write docs");
    }

    #[test]
    fn note_status_serializes_as_null_when_unset() {
        let note = Note {
            id: "n1".into(),
            created_at: "2026-01-05T10:00:00.000Z".into(),
            note_type: NoteType::Idea,
            content: "Try a cache".into(),
            team: None,
            project: None,
            ticket_id: None,
            tags: vec![],
            status: None,
            assignee: None,
            due: None,
        };
        let value = serde_json::to_value(&note).unwrap();
        assert!(value["status"].is_null());
        assert_eq!(value["type"], "idea");
        assert!(value.get("team").is_none());
        assert_eq!(value["createdAt"], "2026-01-05T10:00:00.000Z");
    }

    #[test]
    fn note_patch_distinguishes_null_from_absent() {
        let patch: NotePatch = serde_json::from_str(r#"{"team": null}"#).unwrap();
        assert_eq!(patch.team, Some(None));
        assert_eq!(patch.project, None);

        let patch: NotePatch = serde_json::from_str(r#"{"status": "done"}"#).unwrap();
        assert_eq!(patch.status, Some(Some(NoteStatus::Done)));
    }

    #[test]
    fn config_uses_camel_case_keys() {
        let value = serde_json::to_value(Config::new()).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["autoCapture"], "aggressive");
        assert!(value["defaultTeam"].is_null());
    }
}
