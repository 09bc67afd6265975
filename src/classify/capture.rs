use once_cell::sync::Lazy;
use regex::Regex;

use crate::storage::types::NoteType;

/// Messages shorter than this (in characters) are never captured.
pub const MIN_CAPTURE_LEN: usize = 15;

static SKIP_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    // Plain prefixes: "However" and "Nobody" are skipped along with "how" and "no".
    [
        r"(?i)^(hi|hello|hey|thanks|thank you|ok|okay|yes|no|sure|got it)",
        r"(?i)^(what|how|can you|please|could you|help me)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid skip regex"))
    .collect()
});

/// Ordered: the first type with a matching pattern wins.
///
/// Colon markers inside a `\b(...)\b` group only match when a word character follows the
/// colon directly ("fyi:deploys"), not before a space.
static CAPTURE_TABLE: Lazy<Vec<(NoteType, Vec<Regex>)>> = Lazy::new(|| {
    let table: [(NoteType, &[&str]); 5] = [
        (
            NoteType::Decision,
            &[
                r"(?i)\b(we decided|decided to|let's go with|agreed to|agreement|choosing|picked|selected)\b",
                r"(?i)\bdecision:",
            ],
        ),
        (
            NoteType::Action,
            &[
                r"(?i)\b(todo|to-do|action item|need to|should|must|have to|task:)\b",
                r"(?i)\baction:",
            ],
        ),
        (
            NoteType::Note,
            &[r"(?i)\b(note:|fyi:|remember that|keep in mind|important:)\b"],
        ),
        (
            NoteType::Idea,
            &[r"(?i)\b(what if|idea:|could we|maybe we|how about)\b"],
        ),
        (
            NoteType::Question,
            &[r"\?$", r"(?i)\b(wondering|question:|unsure|not sure)\b"],
        ),
    ];

    table
        .into_iter()
        .map(|(note_type, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(p).expect("valid capture regex"))
                .collect();
            (note_type, compiled)
        })
        .collect()
});

/// A message the capture filter considers noteworthy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    pub note_type: NoteType,
    pub text: String,
}

impl Capture {
    /// The annotation line printed by the prompt hook.
    pub fn to_tag(&self) -> String {
        format!(
            "<contextbuddy-capture type=\"{}\">{}</contextbuddy-capture>",
            self.note_type, self.text
        )
    }
}

/// Classify a user message. Returns `None` for short messages, greetings, requests, and
/// anything no rule matches.
pub fn analyze(text: &str) -> Option<Capture> {
    if text.chars().count() < MIN_CAPTURE_LEN {
        return None;
    }

    let trimmed = text.trim();
    if SKIP_PATTERNS.iter().any(|re| re.is_match(trimmed)) {
        return None;
    }

    detect_type(text).map(|note_type| Capture {
        note_type,
        text: text.to_string(),
    })
}

fn detect_type(text: &str) -> Option<NoteType> {
    CAPTURE_TABLE
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|re| re.is_match(text)))
        .map(|(note_type, _)| *note_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_is_captured() {
        let capture = analyze("We decided to use Postgres for the new service").unwrap();
        assert_eq!(capture.note_type, NoteType::Decision);
        assert_eq!(
            capture.to_tag(),
            "<contextbuddy-capture type=\"decision\">We decided to use Postgres for the new service</contextbuddy-capture>"
        );
    }

    #[test]
    fn short_messages_are_rejected() {
        assert!(analyze("todo: fix it").is_none());
    }

    #[test]
    fn greetings_and_requests_are_rejected() {
        assert!(analyze("hey thanks, we decided to ship it").is_none());
        assert!(analyze("   Please should we refactor the parser").is_none());
        assert!(analyze("How do I configure the watcher?").is_none());
    }

    #[test]
    fn skip_prefixes_match_inside_longer_words() {
        assert!(analyze("However, we decided to ship on Friday").is_none());
        assert!(analyze("Nobody should touch prod until Monday").is_none());
        assert!(analyze("Whatever happens we agreed to freeze the API").is_none());
        assert!(analyze("Note: the staging cluster is read-only today").is_none());
    }

    #[test]
    fn colon_markers_need_a_word_after_the_colon() {
        assert!(analyze("FYI: the staging cluster is frozen").is_none());
        assert!(analyze("The release has an idea: ship smaller").is_none());
        assert_eq!(
            analyze("Heads up, fyi:deploys pause at noon").unwrap().note_type,
            NoteType::Note
        );
        assert_eq!(
            analyze("Quick question:retries or backoff here").unwrap().note_type,
            NoteType::Question
        );
        // `decision:` and `action:` have no trailing boundary.
        assert_eq!(
            analyze("Final decision: Postgres for billing").unwrap().note_type,
            NoteType::Decision
        );
        assert_eq!(
            analyze("Follow-up action: rotate the keys").unwrap().note_type,
            NoteType::Action
        );
    }

    #[test]
    fn table_order_prefers_earlier_types() {
        // Matches both action ("need to") and question ("?"); action comes first.
        let capture = analyze("The team need to review the rollout plan?").unwrap();
        assert_eq!(capture.note_type, NoteType::Action);
    }

    #[test]
    fn idea_and_question_detection() {
        assert_eq!(
            analyze("Maybe we cache the embeddings per tenant").unwrap().note_type,
            NoteType::Idea
        );
        assert_eq!(
            analyze("I'm not sure the migration handles nulls").unwrap().note_type,
            NoteType::Question
        );
        assert_eq!(
            analyze("The migration handles nulls correctly?").unwrap().note_type,
            NoteType::Question
        );
    }

    #[test]
    fn plain_statements_are_not_captured() {
        assert!(analyze("The build finished in four minutes today").is_none());
    }
}
