//! Everything written through the repositories reads back unchanged from a fresh handle
//! on the same folder, and whole-document writes mean the last writer wins.

mod helpers;

use contextbuddy::storage::contexts::{
    add_project, add_team, get_config, projects, save_config, team, teams,
};
use contextbuddy::storage::milestones::{add_milestone, milestone};
use contextbuddy::storage::notes::all_notes;
use contextbuddy::storage::planning::{add_period, add_ticket, period, ticket};
use contextbuddy::storage::types::{
    CaptureMode, NewNote, NewPeriod, Note, NoteType, SubDeliverable, Team,
};
use contextbuddy::storage::{notes, now_timestamp, read_document, write_document, Store};
use helpers::{new_ticket, test_store};

fn reopen(store: &Store) -> Store {
    Store::new(store.root().to_path_buf())
}

#[test]
fn every_entity_reads_back_equal() {
    let (_tmp, store) = test_store();

    let mut config = get_config(&store);
    config.auto_capture = CaptureMode::Conservative;
    config.default_team = Some("platform".into());
    save_config(&store, &config).unwrap();

    let t = add_team(&store, "platform", "Platform", Some("Infra and tooling".into())).unwrap();
    let p = add_project(&store, "auth", "Auth", Some("platform".into()), None).unwrap();

    let mut new = NewNote::new("Rotate signing keys quarterly", NoteType::Action);
    new.team = Some("platform".into());
    new.tags = Some(vec!["security".into()]);
    new.due = Some("2026-03-01".into());
    let n = notes::add_note(&store, new).unwrap();

    let per = add_period(
        &store,
        NewPeriod {
            name: "P2 2026".into(),
            start_date: "2026-04-01".into(),
            end_date: "2026-06-30".into(),
            year: 2026,
        },
    )
    .unwrap();
    let mut nt = new_ticket(&per.id, "platform", "Key rotation");
    nt.sub_deliverables = vec![SubDeliverable::pending("runbook")];
    nt.supports = vec!["auth".into()];
    let tk = add_ticket(&store, nt).unwrap();
    let m = add_milestone(&store, "auth", "SSO beta", "2026-05-15").unwrap();

    let fresh = reopen(&store);
    assert_eq!(get_config(&fresh), config);
    assert_eq!(team(&fresh, "platform"), Some(t));
    assert_eq!(projects(&fresh).get("auth"), Some(&p));
    assert_eq!(all_notes(&fresh), vec![n]);
    assert_eq!(period(&fresh, &per.id), Some(per));
    assert_eq!(ticket(&fresh, &tk.id), Some(tk));
    assert_eq!(milestone(&fresh, &m.id), Some(m));
}

#[test]
fn documents_are_pretty_printed_camel_case() {
    let (_tmp, store) = test_store();
    add_team(&store, "platform", "Platform", None).unwrap();
    let raw = std::fs::read_to_string(store.teams_path()).unwrap();
    assert!(raw.contains("\n  \"platform\": {"));
    assert!(raw.contains("\"createdAt\""));
}

fn plain_team(name: &str) -> Team {
    Team {
        name: name.into(),
        description: None,
        responsibilities: None,
        is_my_team: None,
        created_at: now_timestamp(),
    }
}

#[test]
fn last_writer_wins() {
    let (_tmp, store) = test_store();
    let other = reopen(&store);

    // Both handles read the same snapshot, then each writes back its own version.
    let mut mine = teams(&store);
    let mut theirs = teams(&other);
    mine.insert("alpha".into(), plain_team("Alpha"));
    theirs.insert("beta".into(), plain_team("Beta"));

    write_document(&store.teams_path(), &mine).unwrap();
    write_document(&other.teams_path(), &theirs).unwrap();

    let result = teams(&store);
    assert!(result.contains_key("beta"));
    assert!(!result.contains_key("alpha"));
}

#[test]
fn malformed_document_reads_as_empty() {
    let (_tmp, store) = test_store();
    std::fs::write(store.teams_path(), "{ broken").unwrap();
    assert!(teams(&store).is_empty());
    // the next write replaces it
    add_team(&store, "platform", "Platform", None).unwrap();
    assert_eq!(teams(&store).len(), 1);
}

#[test]
fn overlapping_note_updates_keep_only_the_second_snapshot() {
    let (_tmp, store) = test_store();
    let note = helpers::add_note(&store, "original text", NoteType::Note, None, None);
    let partition = store.notes_partition(chrono::Utc::now());

    // Two writers load the same partition and each edit the note.
    let mut first: Vec<Note> = read_document(&partition, Vec::new());
    let mut second: Vec<Note> = read_document(&partition, Vec::new());
    first[0].content = "first edit".into();
    second[0].tags = vec!["second".into()];

    write_document(&partition, &first).unwrap();
    write_document(&partition, &second).unwrap();

    let stored = all_notes(&store);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, note.id);
    assert_eq!(stored[0].content, "original text");
    assert_eq!(stored[0].tags, vec!["second".to_string()]);
}
