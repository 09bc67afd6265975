//! Parameter definitions for the planning and milestone tools.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::storage::planning::pending_sub_deliverables;
use crate::storage::types::{NewPeriod, NewTicket, TicketPatch, TicketStatus};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPeriodParams {
    #[schemars(description = "Period name (e.g., \"P1 2026\")")]
    pub name: String,

    #[schemars(description = "Start date in ISO format (YYYY-MM-DD)")]
    pub start_date: String,

    #[schemars(description = "End date in ISO format (YYYY-MM-DD)")]
    pub end_date: String,

    #[schemars(description = "Year of the planning period")]
    pub year: i32,
}

impl From<AddPeriodParams> for NewPeriod {
    fn from(p: AddPeriodParams) -> Self {
        Self {
            name: p.name,
            start_date: p.start_date,
            end_date: p.end_date,
            year: p.year,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddTicketParams {
    #[schemars(description = "ID of the planning period")]
    pub period_id: String,

    #[schemars(description = "High-level initiative name")]
    pub initiative: String,

    #[schemars(description = "Main deliverable for this ticket")]
    pub deliverable: String,

    #[schemars(description = "List of sub-deliverables")]
    pub sub_deliverables: Option<Vec<String>>,

    #[schemars(description = "ID of the team owning this ticket")]
    pub team_id: String,

    #[schemars(description = "Team IDs that this ticket supports")]
    pub supports: Option<Vec<String>>,

    #[schemars(description = "Team IDs that this ticket depends on")]
    pub depends_on: Option<Vec<String>>,
}

impl From<AddTicketParams> for NewTicket {
    fn from(p: AddTicketParams) -> Self {
        Self {
            period_id: p.period_id,
            initiative: p.initiative,
            deliverable: p.deliverable,
            sub_deliverables: pending_sub_deliverables(p.sub_deliverables.unwrap_or_default()),
            team_id: p.team_id,
            supports: p.supports.unwrap_or_default(),
            depends_on: p.depends_on.unwrap_or_default(),
            status: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketParams {
    #[schemars(description = "Ticket ID to update")]
    pub id: String,

    #[schemars(description = "Updated initiative name")]
    pub initiative: Option<String>,

    #[schemars(description = "Updated deliverable")]
    pub deliverable: Option<String>,

    #[schemars(description = "Updated list of sub-deliverables (resets their done state)")]
    pub sub_deliverables: Option<Vec<String>>,

    #[schemars(description = "Updated team IDs that this ticket supports")]
    pub supports: Option<Vec<String>>,

    #[schemars(description = "Updated team IDs that this ticket depends on")]
    pub depends_on: Option<Vec<String>>,

    #[schemars(description = "New status for the ticket: active, done, or cancelled")]
    pub status: Option<TicketStatus>,
}

impl UpdateTicketParams {
    pub fn into_patch(self) -> (String, TicketPatch) {
        let patch = TicketPatch {
            initiative: self.initiative,
            deliverable: self.deliverable,
            sub_deliverables: self.sub_deliverables.map(pending_sub_deliverables),
            supports: self.supports,
            depends_on: self.depends_on,
            status: self.status,
            ..Default::default()
        };
        (self.id, patch)
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMilestoneParams {
    #[schemars(description = "ID of the project")]
    pub project_id: String,

    #[schemars(description = "Milestone name")]
    pub name: String,

    #[schemars(description = "Target date in ISO format (YYYY-MM-DD)")]
    pub target_date: String,
}
