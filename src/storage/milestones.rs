//! Project milestones.

use anyhow::Result;

use super::types::{Milestone, MilestonePatch, MilestoneStatus};
use super::{now_timestamp, read_document, timestamp_id, write_document, Store};

pub fn milestones(store: &Store) -> Vec<Milestone> {
    read_document(&store.milestones_path(), Vec::new())
}

pub fn milestones_by_project(store: &Store, project_id: &str) -> Vec<Milestone> {
    milestones(store)
        .into_iter()
        .filter(|m| m.project_id == project_id)
        .collect()
}

pub fn milestone(store: &Store, id: &str) -> Option<Milestone> {
    milestones(store).into_iter().find(|m| m.id == id)
}

/// New milestones always start `planned`.
pub fn add_milestone(
    store: &Store,
    project_id: &str,
    name: &str,
    target_date: &str,
) -> Result<Milestone> {
    let mut milestones = milestones(store);
    let id = timestamp_id("milestone", |id| milestones.iter().any(|m| m.id == id));
    let milestone = Milestone {
        id,
        project_id: project_id.to_string(),
        name: name.to_string(),
        target_date: target_date.to_string(),
        status: MilestoneStatus::Planned,
        created_at: now_timestamp(),
    };
    milestones.push(milestone.clone());
    write_document(&store.milestones_path(), &milestones)?;
    tracing::info!(id = %milestone.id, project = project_id, "milestone added");
    Ok(milestone)
}

pub fn update_milestone(
    store: &Store,
    id: &str,
    patch: MilestonePatch,
) -> Result<Option<Milestone>> {
    let mut milestones = milestones(store);
    let Some(milestone) = milestones.iter_mut().find(|m| m.id == id) else {
        return Ok(None);
    };

    if let Some(name) = patch.name {
        milestone.name = name;
    }
    if let Some(target_date) = patch.target_date {
        milestone.target_date = target_date;
    }
    if let Some(status) = patch.status {
        milestone.status = status;
    }

    let updated = milestone.clone();
    write_document(&store.milestones_path(), &milestones)?;
    Ok(Some(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn add_and_complete_milestone() {
        let tmp = TempDir::new().unwrap();
        let store = Store::new(tmp.path().join(".data"));

        let m = add_milestone(&store, "api", "Beta", "2026-06-01").unwrap();
        add_milestone(&store, "web", "Launch", "2026-09-01").unwrap();
        assert_eq!(m.status, MilestoneStatus::Planned);
        assert_eq!(milestones_by_project(&store, "api").len(), 1);

        let patch = MilestonePatch {
            status: Some(MilestoneStatus::Done),
            ..Default::default()
        };
        let done = update_milestone(&store, &m.id, patch).unwrap().unwrap();
        assert_eq!(done.status, MilestoneStatus::Done);
        assert_eq!(milestone(&store, &m.id).unwrap().status, MilestoneStatus::Done);
        assert!(update_milestone(&store, "nope", MilestonePatch::default()).unwrap().is_none());
    }
}
