//! Semantic classification of raw server log lines
//!
//! Pure string-in, events-out. Rules are evaluated in a fixed order and
//! fire independently of each other, with one exception: a line can be a
//! chat message or a death message but never both. Both share the `"]: "`
//! framing token; what disambiguates them is whether the text after the
//! marker starts with `<`. A real chat message whose own text begins with
//! `<` is therefore never reported as chat — a known, accepted
//! false-negative.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    Joined { player: String },
    Chat { player: String, message: String },
    Death { text: String },
    WhitelistBlocked { player: String },
}

const DEATH_KEYWORDS: [&str; 12] = [
    "slain by",
    "shot by",
    "blew up",
    "burned to death",
    "fell from",
    "drowned",
    "starved",
    "suffocated",
    "withered",
    "died",
    "killed by",
    "hit the ground",
];

const SOURCE_MARKER: &str = "]: ";

fn join_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r": (.*?) joined the game").unwrap())
}

fn chat_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r": <(.*?)> (.*)").unwrap())
}

fn blocked_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Disconnecting (.*?) \(").unwrap())
}

/// Classify one log line into zero or more events.
pub fn classify(line: &str) -> Vec<LogEvent> {
    let mut events = Vec::new();

    // Joins
    if line.contains("joined the game") {
        if let Some(caps) = join_re().captures(line) {
            events.push(LogEvent::Joined {
                player: caps[1].to_string(),
            });
        }
    }

    // Chat: the bracketed-source framing `]: <name> text`
    if line.contains("]: <") && line.contains("> ") {
        if let Some(caps) = chat_re().captures(line) {
            events.push(LogEvent::Chat {
                player: caps[1].to_string(),
                message: caps[2].to_string(),
            });
        }
    }

    // Deaths: keyword match, but only for free text after the source
    // marker that does NOT start with `<` — that prefix means the line is
    // a player chat message quoting a death, not the server reporting one.
    if DEATH_KEYWORDS.iter().any(|k| line.contains(k)) {
        if let Some((_, text)) = line.split_once(SOURCE_MARKER) {
            let text = text.trim();
            if !text.starts_with('<') {
                events.push(LogEvent::Death {
                    text: text.to_string(),
                });
            }
        }
    }

    // Whitelist rejections
    if line.contains("You are not white-listed") && line.contains("Disconnecting") {
        if let Some(caps) = blocked_re().captures(line) {
            events.push(LogEvent::WhitelistBlocked {
                player: caps[1].to_string(),
            });
        }
    }

    events
}

/// The two console commands shown on-screen when a death is detected.
/// Embedded double quotes are rewritten so they cannot break the JSON
/// payload of the title command.
pub fn death_title_commands(text: &str) -> [String; 2] {
    let safe = text.replace('"', "'");
    [
        format!(
            r#"title @a title {{"text":"{}", "color":"yellow", "bold":true}}"#,
            safe
        ),
        r#"title @a subtitle {"text":"RIP ☠️", "color":"red"}"#.to_string(),
    ]
}
