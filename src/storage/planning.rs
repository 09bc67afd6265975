//! Planning periods and tickets.
//!
//! Ticket archival follows the status: becoming `cancelled` stamps `archivedAt` (once),
//! going back to `active` clears it, and `done` leaves it alone so finished work stays on
//! the planning view.

use anyhow::Result;

use super::types::{
    NewPeriod, NewTicket, PlanningPeriod, SubDeliverable, Ticket, TicketPatch, TicketStatus,
};
use super::{now_timestamp, read_document, timestamp_id, write_document, Store};

pub fn periods(store: &Store) -> Vec<PlanningPeriod> {
    read_document(&store.periods_path(), Vec::new())
}

pub fn period(store: &Store, id: &str) -> Option<PlanningPeriod> {
    periods(store).into_iter().find(|p| p.id == id)
}

pub fn add_period(store: &Store, new: NewPeriod) -> Result<PlanningPeriod> {
    let mut periods = periods(store);
    let id = timestamp_id("period", |id| periods.iter().any(|p| p.id == id));
    let period = PlanningPeriod {
        id,
        name: new.name,
        start_date: new.start_date,
        end_date: new.end_date,
        year: new.year,
    };
    periods.push(period.clone());
    write_document(&store.periods_path(), &periods)?;
    tracing::info!(id = %period.id, name = %period.name, "planning period added");
    Ok(period)
}

pub fn tickets(store: &Store) -> Vec<Ticket> {
    read_document(&store.tickets_path(), Vec::new())
}

pub fn ticket(store: &Store, id: &str) -> Option<Ticket> {
    tickets(store).into_iter().find(|t| t.id == id)
}

/// Tickets matching every given filter.
pub fn tickets_filtered(
    store: &Store,
    period_id: Option<&str>,
    team_id: Option<&str>,
    status: Option<TicketStatus>,
) -> Vec<Ticket> {
    tickets(store)
        .into_iter()
        .filter(|t| period_id.map_or(true, |p| t.period_id == p))
        .filter(|t| team_id.map_or(true, |team| t.team_id == team))
        .filter(|t| status.map_or(true, |s| t.status == s))
        .collect()
}

/// Create a ticket. Callers are responsible for checking that the period and team
/// exist; this layer stores whatever references it is given.
pub fn add_ticket(store: &Store, new: NewTicket) -> Result<Ticket> {
    let mut tickets = tickets(store);
    let id = timestamp_id("ticket", |id| tickets.iter().any(|t| t.id == id));
    let status = new.status.unwrap_or(TicketStatus::Active);
    let created_at = now_timestamp();
    let ticket = Ticket {
        id,
        period_id: new.period_id,
        initiative: new.initiative,
        deliverable: new.deliverable,
        sub_deliverables: new.sub_deliverables,
        team_id: new.team_id,
        supports: new.supports,
        depends_on: new.depends_on,
        status,
        archived_at: (status == TicketStatus::Cancelled).then(|| created_at.clone()),
        created_at,
    };
    tickets.push(ticket.clone());
    write_document(&store.tickets_path(), &tickets)?;
    tracing::info!(id = %ticket.id, team = %ticket.team_id, "ticket added");
    Ok(ticket)
}

/// Merge `patch` into a ticket and apply the archive rule. Returns `None` if the id is
/// unknown.
pub fn update_ticket(store: &Store, id: &str, patch: TicketPatch) -> Result<Option<Ticket>> {
    let mut tickets = tickets(store);
    let Some(ticket) = tickets.iter_mut().find(|t| t.id == id) else {
        return Ok(None);
    };

    if let Some(period_id) = patch.period_id {
        ticket.period_id = period_id;
    }
    if let Some(initiative) = patch.initiative {
        ticket.initiative = initiative;
    }
    if let Some(deliverable) = patch.deliverable {
        ticket.deliverable = deliverable;
    }
    if let Some(sub_deliverables) = patch.sub_deliverables {
        ticket.sub_deliverables = sub_deliverables;
    }
    if let Some(team_id) = patch.team_id {
        ticket.team_id = team_id;
    }
    if let Some(supports) = patch.supports {
        ticket.supports = supports;
    }
    if let Some(depends_on) = patch.depends_on {
        ticket.depends_on = depends_on;
    }
    if let Some(status) = patch.status {
        apply_status(ticket, status);
    }

    let updated = ticket.clone();
    write_document(&store.tickets_path(), &tickets)?;
    Ok(Some(updated))
}

fn apply_status(ticket: &mut Ticket, status: TicketStatus) {
    match status {
        TicketStatus::Cancelled if ticket.archived_at.is_none() => {
            ticket.archived_at = Some(now_timestamp());
        }
        TicketStatus::Active => ticket.archived_at = None,
        _ => {}
    }
    ticket.status = status;
}

/// Bring a ticket back to `active` and clear its archive stamp.
pub fn restore_ticket(store: &Store, id: &str) -> Result<Option<Ticket>> {
    update_ticket(
        store,
        id,
        TicketPatch {
            status: Some(TicketStatus::Active),
            ..Default::default()
        },
    )
}

/// Toggle one sub-deliverable. Returns `None` if the ticket or index does not exist.
pub fn set_sub_deliverable(
    store: &Store,
    id: &str,
    index: usize,
    done: bool,
) -> Result<Option<Ticket>> {
    let mut tickets = tickets(store);
    let Some(ticket) = tickets.iter_mut().find(|t| t.id == id) else {
        return Ok(None);
    };
    let Some(sub) = ticket.sub_deliverables.get_mut(index) else {
        return Ok(None);
    };
    sub.done = done;

    let updated = ticket.clone();
    write_document(&store.tickets_path(), &tickets)?;
    Ok(Some(updated))
}

/// Convert plain strings into not-yet-done sub-deliverables.
pub fn pending_sub_deliverables(items: Vec<String>) -> Vec<SubDeliverable> {
    items.into_iter().map(SubDeliverable::pending).collect()
}
