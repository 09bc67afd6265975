//! The archive view shown on the dashboard.

use super::types::{ArchivedItems, MilestoneStatus, NoteStatus, TicketStatus};
use super::{milestones, notes, planning, Store};

/// Finished or cancelled notes, cancelled tickets, and done milestones. Done tickets
/// stay on the planning view.
pub fn archived_items(store: &Store) -> ArchivedItems {
    let notes = notes::all_notes(store)
        .into_iter()
        .filter(|n| matches!(n.status, Some(NoteStatus::Done | NoteStatus::Cancelled)))
        .collect();
    let tickets = planning::tickets(store)
        .into_iter()
        .filter(|t| t.status == TicketStatus::Cancelled)
        .collect();
    let milestones = milestones::milestones(store)
        .into_iter()
        .filter(|m| m.status == MilestoneStatus::Done)
        .collect();

    ArchivedItems {
        notes,
        tickets,
        milestones,
    }
}
