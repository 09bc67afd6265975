use anyhow::Result;

use contextbuddy::config::AppConfig;
use contextbuddy::storage::notes::search_notes;
use contextbuddy::storage::types::{NoteType, SearchParams};
use contextbuddy::storage::Store;

use super::preview;

pub struct Filters {
    pub query: String,
    pub team: Option<String>,
    pub project: Option<String>,
    pub note_type: Option<NoteType>,
}

/// Search notes from the terminal and print one entry per match.
pub fn search(config: &AppConfig, filters: Filters) -> Result<()> {
    let store = Store::new(config.resolved_data_dir());
    if !store.exists() {
        println!("No data folder at {}.", store.root().display());
        return Ok(());
    }

    let params = SearchParams {
        query: Some(filters.query),
        team: filters.team,
        project: filters.project,
        note_type: filters.note_type,
        ..Default::default()
    };
    let notes = search_notes(&store, &params)?;

    if notes.is_empty() {
        println!("No notes found.");
        return Ok(());
    }

    println!("Found {} note(s)\n", notes.len());
    for (i, note) in notes.iter().enumerate() {
        let context = match (&note.team, &note.project) {
            (Some(team), Some(project)) => format!(" {team}/{project}"),
            (Some(team), None) => format!(" {team}"),
            (None, Some(project)) => format!(" /{project}"),
            (None, None) => String::new(),
        };
        println!(
            "  {}. [{}]{} {} ({})",
            i + 1,
            note.note_type,
            context,
            note.id,
            note.created_at,
        );
        println!("     {}", preview(&note.content, 120));
        if !note.tags.is_empty() {
            println!("     tags: {}", note.tags.join(", "));
        }
        println!();
    }

    Ok(())
}
