//! Notes, sharded into one document per calendar month of creation.
//!
//! A note's partition is chosen from its creation time and never changes, even if
//! `createdAt` is edited later. Lookups by id scan the partitions newest file first.

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use std::cmp::Reverse;
use std::path::PathBuf;

use super::types::{NewNote, Note, NotePatch, NoteStatus, NoteType, SearchParams};
use super::{format_timestamp, parse_timestamp, read_document, write_document, Store};

/// Create a note in the current month's partition. Action notes default to `open`; every
/// other type has no status.
pub fn add_note(store: &Store, new: NewNote) -> Result<Note> {
    let now = Utc::now();
    let status = match new.note_type {
        NoteType::Action => Some(new.status.unwrap_or(NoteStatus::Open)),
        _ => None,
    };
    let note = Note {
        id: uuid::Uuid::now_v7().to_string(),
        created_at: format_timestamp(now),
        note_type: new.note_type,
        content: new.content,
        team: new.team,
        project: new.project,
        ticket_id: new.ticket_id,
        tags: new.tags.unwrap_or_default(),
        status,
        assignee: new.assignee,
        due: new.due,
    };

    let path = store.notes_partition(now);
    let mut notes: Vec<Note> = read_document(&path, Vec::new());
    notes.push(note.clone());
    write_document(&path, &notes)?;

    tracing::info!(id = %note.id, note_type = %note.note_type, "note added");
    Ok(note)
}

/// Monthly partition files (`notes/YYYY-MM.json`), newest month first.
pub fn partition_files(store: &Store) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(store.notes_dir()) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files.reverse();
    files
}

fn sort_newest_first(notes: &mut [Note]) {
    notes.sort_by_key(|note| Reverse(parse_timestamp(&note.created_at)));
}

/// Every note across all partitions, newest first. Notes sharing a timestamp keep
/// reverse insertion order.
pub fn all_notes(store: &Store) -> Vec<Note> {
    let mut notes: Vec<Note> = partition_files(store)
        .iter()
        .flat_map(|path| read_document::<Vec<Note>>(path, Vec::new()).into_iter().rev())
        .collect();
    sort_newest_first(&mut notes);
    notes
}

fn parse_bound(value: &str) -> Result<chrono::DateTime<Utc>> {
    parse_timestamp(value).ok_or_else(|| anyhow!("invalid date: {value}"))
}

/// Filter notes; every present filter must match. `query` is a case-insensitive
/// substring match over content and tags.
pub fn search_notes(store: &Store, params: &SearchParams) -> Result<Vec<Note>> {
    let from = params.from.as_deref().map(parse_bound).transpose()?;
    let to = params.to.as_deref().map(parse_bound).transpose()?;
    let query = params.query.as_deref().map(str::to_lowercase);

    let notes = all_notes(store)
        .into_iter()
        .filter(|n| params.team.as_ref().map_or(true, |t| n.team.as_ref() == Some(t)))
        .filter(|n| params.project.as_ref().map_or(true, |p| n.project.as_ref() == Some(p)))
        .filter(|n| params.ticket_id.as_ref().map_or(true, |t| n.ticket_id.as_ref() == Some(t)))
        .filter(|n| params.note_type.map_or(true, |t| n.note_type == t))
        .filter(|n| {
            if from.is_none() && to.is_none() {
                return true;
            }
            let Some(created) = parse_timestamp(&n.created_at) else {
                return false;
            };
            from.map_or(true, |from| created >= from) && to.map_or(true, |to| created <= to)
        })
        .filter(|n| {
            query.as_ref().map_or(true, |q| {
                n.content.to_lowercase().contains(q)
                    || n.tags.iter().any(|tag| tag.to_lowercase().contains(q))
            })
        })
        .collect();

    Ok(notes)
}

/// Notes created within the last `days` days.
pub fn recent_notes(store: &Store, days: u32) -> Result<Vec<Note>> {
    let from = Utc::now() - Duration::days(i64::from(days));
    search_notes(
        store,
        &SearchParams {
            from: Some(format_timestamp(from)),
            ..Default::default()
        },
    )
}

/// Most recently created note across every partition.
pub fn last_note(store: &Store) -> Option<Note> {
    all_notes(store).into_iter().next()
}

/// Remove the first note with `id`, scanning partitions newest first.
pub fn delete_note(store: &Store, id: &str) -> Result<Option<Note>> {
    for path in partition_files(store) {
        let mut notes: Vec<Note> = read_document(&path, Vec::new());
        if let Some(index) = notes.iter().position(|n| n.id == id) {
            let deleted = notes.remove(index);
            write_document(&path, &notes)?;
            tracing::info!(id, "note deleted");
            return Ok(Some(deleted));
        }
    }
    Ok(None)
}

/// Merge `patch` into the note with `id`, rewriting only its own partition.
pub fn update_note(store: &Store, id: &str, patch: NotePatch) -> Result<Option<Note>> {
    for path in partition_files(store) {
        let mut notes: Vec<Note> = read_document(&path, Vec::new());
        let Some(note) = notes.iter_mut().find(|n| n.id == id) else {
            continue;
        };

        apply_patch(note, patch);
        let updated = note.clone();
        write_document(&path, &notes)?;
        return Ok(Some(updated));
    }
    Ok(None)
}

fn apply_patch(note: &mut Note, patch: NotePatch) {
    if let Some(content) = patch.content {
        note.content = content;
    }
    if let Some(note_type) = patch.note_type {
        note.note_type = note_type;
    }
    if let Some(team) = patch.team {
        note.team = team;
    }
    if let Some(project) = patch.project {
        note.project = project;
    }
    if let Some(ticket_id) = patch.ticket_id {
        note.ticket_id = ticket_id;
    }
    if let Some(tags) = patch.tags {
        note.tags = tags;
    }
    if let Some(status) = patch.status {
        note.status = status;
    }
    if let Some(assignee) = patch.assignee {
        note.assignee = assignee;
    }
    if let Some(due) = patch.due {
        note.due = due;
    }
    if let Some(created_at) = patch.created_at {
        note.created_at = created_at;
    }
}
