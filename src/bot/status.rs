//! Server status snapshot and console-output view helpers
//!
//! The snapshot is rebuilt on every render and never cached; it is only
//! as stale as one round-trip to Docker and the console.

use regex::Regex;
use std::sync::OnceLock;

use crate::console::rcon::GameConsole;
use crate::container::control::ServerControl;
use crate::properties::store::PropertiesStore;

fn player_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"There are (\d+) of a max of (\d+) players online").unwrap()
    })
}

/// Full status view: run-state, whitelist, player count, resource usage.
pub async fn server_status(
    control: &dyn ServerControl,
    console: &dyn GameConsole,
    props: &PropertiesStore,
) -> String {
    let Some(state) = control.state().await else {
        return "🔴 *Server is DOWN* (Container not found)".to_string();
    };

    if state != "running" {
        return format!(
            "🔴 *Server is {}*\n📦 Status: Offline",
            state.to_uppercase()
        );
    }

    let whitelisted = props.read_bool("white-list");
    let wl_icon = if whitelisted { "🔒" } else { "🔓" };
    let wl_text = if whitelisted {
        "*ON (Locked)*"
    } else {
        "*OFF (Open)*"
    };

    let usage = control.mem_usage().await;

    let list_out = console.execute("list").await;
    let player_text = parse_player_count(&list_out)
        .map(|(count, max)| format!("`{}/{}`", count, max))
        .unwrap_or_else(|| "Checking...".to_string());

    format!(
        "🌍 *Server Status:*\n\
         ------------------\n\
         📦 State: `{}`\n\
         🛡️ Whitelist: {} {}\n\
         👥 Players: {}\n\
         📊 Usage: `{}`\n",
        state.to_uppercase(),
        wl_icon,
        wl_text,
        player_text,
        usage
    )
}

/// `(online, max)` out of the console `list` response.
pub fn parse_player_count(list_output: &str) -> Option<(u32, u32)> {
    let caps = player_count_re().captures(list_output)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Player names out of the console `list` response: everything after the
/// first colon, comma-separated.
pub fn parse_player_list(list_output: &str) -> Vec<String> {
    let Some((_, names)) = list_output.split_once(':') else {
        return Vec::new();
    };
    names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whitelist view out of the console `whitelist list` response.
pub fn format_whitelist(raw: &str) -> String {
    let Some((_, names)) = raw.split_once(':') else {
        return raw.to_string();
    };
    let names: Vec<String> = names
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| format!("`{}`", n))
        .collect();

    if names.is_empty() {
        return "📭 *Whitelist is empty.*\nUse `/add <name>` to add players.".to_string();
    }
    format!("📜 *Whitelisted Players:*\n{}", names.join(", "))
}
