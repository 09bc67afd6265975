//! CLI `doctor` command: check every document in the data folder and print a report.

use std::path::Path;

use anyhow::Result;

use contextbuddy::config::AppConfig;
use contextbuddy::storage::{notes, Store};

enum DocStatus {
    Missing,
    Ok(u64),
    Unreadable(String),
    Invalid(String),
}

fn check(path: &Path) -> DocStatus {
    if !path.exists() {
        return DocStatus::Missing;
    }
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => return DocStatus::Unreadable(e.to_string()),
    };
    match serde_json::from_str::<serde_json::Value>(&contents) {
        Ok(_) => DocStatus::Ok(contents.len() as u64),
        Err(e) => DocStatus::Invalid(e.to_string()),
    }
}

/// Check every document and print a health report.
pub fn doctor(config: &AppConfig) -> Result<()> {
    let store = Store::new(config.resolved_data_dir());

    if !store.root().is_dir() {
        println!("Data folder: not found at {}", store.root().display());
        println!("Run `contextbuddy serve` or `contextbuddy web` to initialize.");
        return Ok(());
    }

    println!("ContextBuddy Health Report");
    println!("==========================");
    println!();
    println!("Data folder:       {}", store.root().display());
    println!();

    let mut documents = vec![
        store.config_path(),
        store.teams_path(),
        store.projects_path(),
        store.periods_path(),
        store.tickets_path(),
        store.milestones_path(),
    ];
    documents.extend(notes::partition_files(&store).into_iter().rev());

    let mut problems = 0;
    for path in &documents {
        let name = path
            .strip_prefix(store.root())
            .unwrap_or(path)
            .display()
            .to_string();
        match check(path) {
            DocStatus::Missing => println!("  {name:<28} (not created yet)"),
            DocStatus::Ok(size) => println!("  {name:<28} OK ({})", format_bytes(size)),
            DocStatus::Unreadable(e) => {
                problems += 1;
                println!("  {name:<28} UNREADABLE ({e})");
            }
            DocStatus::Invalid(e) => {
                problems += 1;
                println!("  {name:<28} INVALID JSON ({e})");
            }
        }
    }

    println!();
    if problems == 0 {
        println!("All documents parse.");
    } else {
        println!("{problems} document(s) could not be read. They are treated as empty,");
        println!("and the next write to that collection will replace them.");
        println!("Fix or restore them from backup before saving new data.");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
