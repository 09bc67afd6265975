use once_cell::sync::Lazy;
use regex::Regex;

use crate::storage::types::{ContextSuggestion, NoteType, Projects, Teams};

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(frontend|backend|api|database|ui|ux|testing|deployment|security|performance)\b",
    )
    .expect("valid tag regex")
});

const TYPE_KEYWORDS: [(NoteType, &[&str]); 4] = [
    (NoteType::Decision, &["decide", "decision", "chose", "agreed"]),
    (NoteType::Action, &["todo", "action", "need to", "should"]),
    (NoteType::Idea, &["idea", "what if", "could we"]),
    (NoteType::Question, &["?", "question", "wondering"]),
];

/// Suggest a team, project, note type, and tags for `text`.
///
/// Teams are matched first, then projects, each by case-insensitive substring on id or
/// name in id order. A matched project fills in its owning team when no team matched
/// directly. Falls back to [`NoteType::Note`].
pub fn suggest_context(text: &str, teams: &Teams, projects: &Projects) -> ContextSuggestion {
    let lower = text.to_lowercase();
    let mentions = |id: &str, name: &str| {
        lower.contains(&id.to_lowercase()) || lower.contains(&name.to_lowercase())
    };

    let mut team = teams
        .iter()
        .find(|(id, t)| mentions(id, &t.name))
        .map(|(id, _)| id.clone());

    let project = projects.iter().find(|(id, p)| mentions(id, &p.name));
    if team.is_none() {
        team = project.and_then(|(_, p)| p.team.clone());
    }

    let note_type = TYPE_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map_or(NoteType::Note, |(t, _)| *t);

    let mut tags: Vec<String> = Vec::new();
    for m in TAG_PATTERN.find_iter(text) {
        let tag = m.as_str().to_lowercase();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    ContextSuggestion {
        team,
        project: project.map(|(id, _)| id.clone()),
        note_type,
        tags,
    }
}
