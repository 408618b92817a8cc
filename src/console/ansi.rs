//! ANSI escape stripping for console output
//!
//! The RCON CLI colors its output with terminal escapes; everything we
//! forward to chat has to be plain text.

use regex::Regex;
use std::sync::OnceLock;

static ANSI_RE: OnceLock<Regex> = OnceLock::new();

/// Remove ANSI escape sequences (colors, cursor movement) from a string.
/// Idempotent: stripping an already-clean string is a no-op.
pub fn strip_ansi(text: &str) -> String {
    let re = ANSI_RE.get_or_init(|| {
        Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").unwrap()
    });
    re.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_color_codes() {
        let colored = "\x1b[32mThere are 2 of a max of 20 players online\x1b[0m";
        assert_eq!(
            strip_ansi(colored),
            "There are 2 of a max of 20 players online"
        );
    }

    #[test]
    fn plain_text_unchanged() {
        assert_eq!(strip_ansi("whitelist reloaded"), "whitelist reloaded");
        assert_eq!(strip_ansi(""), "");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "\x1b[1;31mred bold\x1b[0m",
            "no escapes here",
            "\x1b[2Jcleared",
        ];
        for input in inputs {
            let once = strip_ansi(input);
            assert_eq!(strip_ansi(&once), once);
        }
    }
}
