use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use contextbuddy::config::AppConfig;
use contextbuddy::storage::types::{
    Config, Milestone, Note, PlanningPeriod, Projects, Teams, Ticket,
};
use contextbuddy::storage::{contexts, milestones, notes, planning, Store};

/// Export format: every collection in one document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportData {
    config: Config,
    teams: Teams,
    projects: Projects,
    notes: Vec<Note>,
    periods: Vec<PlanningPeriod>,
    tickets: Vec<Ticket>,
    milestones: Vec<Milestone>,
}

/// Export all collections as JSON to `output`, or stdout when absent.
pub fn export(config: &AppConfig, output: Option<&Path>) -> Result<()> {
    let store = Store::new(config.resolved_data_dir());

    let data = ExportData {
        config: contexts::get_config(&store),
        teams: contexts::teams(&store),
        projects: contexts::projects(&store),
        notes: notes::all_notes(&store),
        periods: planning::periods(&store),
        tickets: planning::tickets(&store),
        milestones: milestones::milestones(&store),
    };

    let json = serde_json::to_string_pretty(&data)?;
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    eprintln!(
        "Exported {} notes, {} teams, {} projects, {} tickets, {} milestones.",
        data.notes.len(),
        data.teams.len(),
        data.projects.len(),
        data.tickets.len(),
        data.milestones.len()
    );

    Ok(())
}
