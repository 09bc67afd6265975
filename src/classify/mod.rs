//! Keyword heuristics over free text.
//!
//! Two independent rule tables live here and are intentionally not merged:
//!
//! - [`capture`] decides whether a user message is worth surfacing to the agent at all,
//!   using word-boundary regexes and greeting/question-opener rejection.
//! - [`suggest`] proposes team, project, type, and tags for a note using plain substring
//!   checks against the stored contexts.
//!
//! They disagree on some inputs (the suggester never looks at `note:` prefixes, the capture
//! filter never looks at team names), which is expected.

pub mod capture;
pub mod suggest;
