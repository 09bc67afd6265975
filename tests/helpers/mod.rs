#![allow(dead_code)]

use contextbuddy::storage::types::{NewNote, NewTicket, Note, NoteType};
use contextbuddy::storage::{notes, Store};
use tempfile::TempDir;

/// A fresh, initialized store in a temporary data folder. Keep the `TempDir` alive for
/// the duration of the test.
pub fn test_store() -> (TempDir, Store) {
    let tmp = TempDir::new().unwrap();
    let store = Store::new(tmp.path().join(".data"));
    store.initialize().unwrap();
    (tmp, store)
}

/// Add a note with an optional team/project.
pub fn add_note(
    store: &Store,
    content: &str,
    note_type: NoteType,
    team: Option<&str>,
    project: Option<&str>,
) -> Note {
    let mut new = NewNote::new(content, note_type);
    new.team = team.map(str::to_string);
    new.project = project.map(str::to_string);
    notes::add_note(store, new).unwrap()
}

pub fn new_ticket(period_id: &str, team_id: &str, deliverable: &str) -> NewTicket {
    NewTicket {
        period_id: period_id.to_string(),
        initiative: "Reliability".to_string(),
        deliverable: deliverable.to_string(),
        sub_deliverables: Vec::new(),
        team_id: team_id.to_string(),
        supports: Vec::new(),
        depends_on: Vec::new(),
        status: None,
    }
}
