mod helpers;

use contextbuddy::storage::notes::{
    all_notes, delete_note, last_note, recent_notes, search_notes, update_note,
};
use contextbuddy::storage::types::{
    NewNote, Note, NotePatch, NoteStatus, NoteType, SearchParams,
};
use contextbuddy::storage::{format_timestamp, notes, read_document, write_document};
use helpers::{add_note, test_store};

#[test]
fn add_then_search_by_text() {
    let (_tmp, store) = test_store();
    let added = add_note(
        &store,
        "Chose Postgres for billing",
        NoteType::Decision,
        Some("platform"),
        None,
    );

    let found = search_notes(
        &store,
        &SearchParams {
            query: Some("postgres".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, added.id);
    assert_eq!(found[0].team.as_deref(), Some("platform"));
    assert_eq!(found[0].status, None);
}

#[test]
fn action_notes_default_to_open() {
    let (_tmp, store) = test_store();
    let action = add_note(&store, "Write the migration plan", NoteType::Action, None, None);
    assert_eq!(action.status, Some(NoteStatus::Open));

    let mut new = NewNote::new("Ship it", NoteType::Action);
    new.status = Some(NoteStatus::Done);
    assert_eq!(notes::add_note(&store, new).unwrap().status, Some(NoteStatus::Done));

    // status is ignored for anything but actions
    let mut new = NewNote::new("An idea", NoteType::Idea);
    new.status = Some(NoteStatus::Done);
    assert_eq!(notes::add_note(&store, new).unwrap().status, None);
}

#[test]
fn filters_are_and_combined() {
    let (_tmp, store) = test_store();
    add_note(&store, "cache the sessions", NoteType::Idea, Some("platform"), Some("auth"));
    add_note(&store, "cache the tokens", NoteType::Decision, Some("platform"), Some("auth"));
    add_note(&store, "cache the images", NoteType::Idea, Some("web"), None);

    let found = search_notes(
        &store,
        &SearchParams {
            query: Some("CACHE".into()),
            team: Some("platform".into()),
            note_type: Some(NoteType::Idea),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].content, "cache the sessions");

    let by_project = search_notes(
        &store,
        &SearchParams {
            project: Some("auth".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(by_project.len(), 2);
}

#[test]
fn query_matches_tags() {
    let (_tmp, store) = test_store();
    let mut new = NewNote::new("Move the cron job", NoteType::Action);
    new.tags = Some(vec!["infra".into()]);
    notes::add_note(&store, new).unwrap();

    let found = search_notes(
        &store,
        &SearchParams {
            query: Some("INFRA".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn results_are_newest_first_across_partitions() {
    let (_tmp, store) = test_store();
    let fresh = add_note(&store, "this month", NoteType::Note, None, None);

    // Hand-write an older partition.
    let mut old = fresh.clone();
    old.id = "old-note".into();
    old.content = "last year".into();
    old.created_at = "2020-01-15T09:00:00.000Z".into();
    write_document(&store.notes_dir().join("2020-01.json"), &vec![old]).unwrap();

    let all = all_notes(&store);
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, fresh.id);
    assert_eq!(all[1].id, "old-note");

    let recent = recent_notes(&store, 7).unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, fresh.id);

    let ranged = search_notes(
        &store,
        &SearchParams {
            from: Some("2020-01-01".into()),
            to: Some("2020-02-01".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].id, "old-note");
}

#[test]
fn invalid_date_is_an_error() {
    let (_tmp, store) = test_store();
    let result = search_notes(
        &store,
        &SearchParams {
            from: Some("yesterday-ish".into()),
            ..Default::default()
        },
    );
    assert!(result.is_err());
}

#[test]
fn delete_by_id_and_most_recent() {
    let (_tmp, store) = test_store();
    let first = add_note(&store, "first", NoteType::Note, None, None);
    let second = add_note(&store, "second", NoteType::Note, None, None);

    assert_eq!(last_note(&store).unwrap().id, second.id);

    let deleted = delete_note(&store, &first.id).unwrap().unwrap();
    assert_eq!(deleted.content, "first");
    assert!(delete_note(&store, &first.id).unwrap().is_none());

    let remaining = all_notes(&store);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, second.id);
}

fn stored_note(id: &str, created_at: &str) -> Note {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "createdAt": created_at,
        "type": "note",
        "content": format!("note {id}"),
    }))
    .unwrap()
}

#[test]
fn most_recent_is_found_across_hand_written_partitions() {
    let (_tmp, store) = test_store();
    let older = store.notes_dir().join("2020-01.json");
    let newer = store.notes_dir().join("2021-06.json");
    // The newest note is not last in its file.
    write_document(
        &newer,
        &vec![
            stored_note("june-20", "2021-06-20T08:00:00.000Z"),
            stored_note("june-02", "2021-06-02T08:00:00.000Z"),
        ],
    )
    .unwrap();
    write_document(&older, &vec![stored_note("jan-15", "2020-01-15T08:00:00.000Z")]).unwrap();

    let last = last_note(&store).unwrap();
    assert_eq!(last.id, "june-20");
    delete_note(&store, &last.id).unwrap().unwrap();

    let newer_left: Vec<Note> = read_document(&newer, Vec::new());
    let older_left: Vec<Note> = read_document(&older, Vec::new());
    assert_eq!(newer_left.len(), 1);
    assert_eq!(newer_left[0].id, "june-02");
    assert_eq!(older_left.len(), 1);

    assert_eq!(last_note(&store).unwrap().id, "june-02");
    delete_note(&store, "june-02").unwrap().unwrap();
    assert_eq!(last_note(&store).unwrap().id, "jan-15");
}

#[test]
fn update_can_clear_nullable_fields() {
    let (_tmp, store) = test_store();
    let note = add_note(&store, "Ping legal", NoteType::Action, Some("ops"), None);

    let patch: NotePatch = serde_json::from_str(r#"{"team": null, "status": "done"}"#).unwrap();
    let updated = update_note(&store, &note.id, patch).unwrap().unwrap();
    assert_eq!(updated.team, None);
    assert_eq!(updated.status, Some(NoteStatus::Done));
    assert_eq!(updated.content, "Ping legal");

    assert!(update_note(&store, "missing", NotePatch::default()).unwrap().is_none());
}

#[test]
fn editing_created_at_keeps_the_partition() {
    let (_tmp, store) = test_store();
    let note = add_note(&store, "backdated", NoteType::Note, None, None);
    let partition = store.notes_partition(chrono::Utc::now());

    let patch = NotePatch {
        created_at: Some(format_timestamp(
            contextbuddy::storage::parse_timestamp("2019-06-01").unwrap(),
        )),
        ..Default::default()
    };
    update_note(&store, &note.id, patch).unwrap();

    let raw = std::fs::read_to_string(&partition).unwrap();
    assert!(raw.contains(&note.id));
    assert!(!store.notes_dir().join("2019-06.json").exists());
}
