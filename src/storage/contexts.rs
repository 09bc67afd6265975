//! Config, teams, and projects.
//!
//! Teams and projects are maps keyed by caller-chosen id. Adding an existing id replaces
//! the entry.

use anyhow::Result;

use super::types::{Config, Contexts, Project, Projects, Team, TeamPatch, Teams};
use super::{now_timestamp, read_document, write_document, Store};

/// The data folder's config, or a fresh default if none is stored.
pub fn get_config(store: &Store) -> Config {
    read_document(&store.config_path(), Config::new())
}

pub fn save_config(store: &Store, config: &Config) -> Result<()> {
    write_document(&store.config_path(), config)
}

pub fn teams(store: &Store) -> Teams {
    read_document(&store.teams_path(), Teams::new())
}

pub fn projects(store: &Store) -> Projects {
    read_document(&store.projects_path(), Projects::new())
}

pub fn team(store: &Store, id: &str) -> Option<Team> {
    teams(store).remove(id)
}

pub fn add_team(
    store: &Store,
    id: &str,
    name: &str,
    description: Option<String>,
) -> Result<Team> {
    let mut teams = teams(store);
    let team = Team {
        name: name.to_string(),
        description,
        responsibilities: None,
        is_my_team: None,
        created_at: now_timestamp(),
    };
    teams.insert(id.to_string(), team.clone());
    write_document(&store.teams_path(), &teams)?;
    tracing::info!(id, "team added");
    Ok(team)
}

pub fn add_project(
    store: &Store,
    id: &str,
    name: &str,
    team: Option<String>,
    description: Option<String>,
) -> Result<Project> {
    let mut projects = projects(store);
    let project = Project {
        name: name.to_string(),
        team,
        description,
        created_at: now_timestamp(),
    };
    projects.insert(id.to_string(), project.clone());
    write_document(&store.projects_path(), &projects)?;
    tracing::info!(id, "project added");
    Ok(project)
}

/// Merge `patch` into an existing team. Returns `None` if the id is unknown.
pub fn update_team(store: &Store, id: &str, patch: TeamPatch) -> Result<Option<Team>> {
    let mut teams = teams(store);
    let Some(team) = teams.get_mut(id) else {
        return Ok(None);
    };

    if let Some(name) = patch.name {
        team.name = name;
    }
    if let Some(description) = patch.description {
        team.description = Some(description);
    }
    if let Some(responsibilities) = patch.responsibilities {
        team.responsibilities = Some(responsibilities);
    }
    if let Some(is_my_team) = patch.is_my_team {
        team.is_my_team = Some(is_my_team);
    }

    let updated = team.clone();
    write_document(&store.teams_path(), &teams)?;
    Ok(Some(updated))
}

pub fn list_contexts(store: &Store) -> Contexts {
    Contexts {
        teams: teams(store),
        projects: projects(store),
    }
}
