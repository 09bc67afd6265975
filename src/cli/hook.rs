//! CLI `hook` command: the agent's prompt-submit filter.
//!
//! Reads `{"prompt": "..."}` from stdin and prints a single capture tag when the prompt
//! looks worth remembering. Any problem (bad JSON, unreadable config) results in no
//! output; the process always exits successfully.

use std::io::Read;

use contextbuddy::classify::capture;
use contextbuddy::config::AppConfig;
use contextbuddy::storage::contexts::get_config;
use contextbuddy::storage::types::CaptureMode;
use contextbuddy::storage::Store;
use serde::Deserialize;

#[derive(Deserialize)]
struct HookInput {
    #[serde(default)]
    prompt: String,
}

/// The line to print for `input`, if any.
pub fn respond(input: &str, mode: CaptureMode) -> Option<String> {
    if mode == CaptureMode::Off {
        return None;
    }
    let parsed: HookInput = serde_json::from_str(input).ok()?;
    capture::analyze(&parsed.prompt).map(|c| c.to_tag())
}

fn capture_mode() -> CaptureMode {
    let config = AppConfig::load().unwrap_or_default();
    let store = Store::new(config.resolved_data_dir());
    if store.exists() {
        get_config(&store).auto_capture
    } else {
        CaptureMode::default()
    }
}

pub fn run() {
    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        return;
    }
    if let Some(line) = respond(&input, capture_mode()) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_worthy_prompt_is_tagged() {
        let out = respond(
            r#"{"prompt": "We decided to use Postgres for the billing service"}"#,
            CaptureMode::Aggressive,
        )
        .unwrap();
        assert!(out.starts_with(r#"<contextbuddy-capture type="decision">"#));
        assert!(out.ends_with("</contextbuddy-capture>"));
    }

    #[test]
    fn chatter_and_garbage_print_nothing() {
        assert_eq!(respond(r#"{"prompt": "thanks!"}"#, CaptureMode::Aggressive), None);
        assert_eq!(respond("not json", CaptureMode::Aggressive), None);
        assert_eq!(respond("{}", CaptureMode::Aggressive), None);
    }

    #[test]
    fn off_mode_is_silent() {
        let input = r#"{"prompt": "We decided to use Postgres for the billing service"}"#;
        assert_eq!(respond(input, CaptureMode::Off), None);
        assert!(respond(input, CaptureMode::Conservative).is_some());
    }
}
