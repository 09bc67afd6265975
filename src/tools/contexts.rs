//! Parameter definitions for the team/project and config tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::types::{double_option, CaptureMode, TeamPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContextKind {
    Team,
    Project,
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Team => "team",
            Self::Project => "project",
        })
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddContextParams {
    #[serde(rename = "type")]
    #[schemars(description = "Type of context to add: team or project")]
    pub kind: ContextKind,

    #[schemars(description = "Unique identifier for the context (lowercase, no spaces)")]
    pub id: String,

    #[schemars(description = "Display name for the context")]
    pub name: String,

    #[schemars(description = "Optional description")]
    pub description: Option<String>,

    #[schemars(description = "For projects: the team this project belongs to")]
    pub parent_team: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamParams {
    #[schemars(description = "Team ID to update")]
    pub id: String,

    #[schemars(description = "New display name for the team")]
    pub name: Option<String>,

    #[schemars(description = "New description for the team")]
    pub description: Option<String>,

    #[schemars(description = "List of team responsibilities")]
    pub responsibilities: Option<Vec<String>>,

    #[schemars(
        description = "Whether this is one of your teams (vs external teams you collaborate with)"
    )]
    pub is_my_team: Option<bool>,
}

impl UpdateTeamParams {
    pub fn into_patch(self) -> (String, TeamPatch) {
        let patch = TeamPatch {
            name: self.name,
            description: self.description,
            responsibilities: self.responsibilities,
            is_my_team: self.is_my_team,
        };
        (self.id, patch)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetConfigParams {
    #[schemars(
        description = "Capture mode: aggressive (capture everything), conservative (only explicit signals), off (manual only)"
    )]
    pub auto_capture: Option<CaptureMode>,

    #[schemars(description = "Default team for new notes (team ID); null or \"\" clears it")]
    #[serde(default, deserialize_with = "double_option")]
    pub default_team: Option<Option<String>>,
}
