//! Playtime leaderboard built from the server's per-player stat files
//!
//! Reads world/stats/<uuid>.json plus usercache.json under the server's
//! data directory and ranks players by hours played. Everything is
//! recomputed per request; at a handful of files a cache would cost more
//! than it saves.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// 20 ticks per second, 3600 seconds per hour.
const TICKS_PER_HOUR: f64 = 20.0 * 3600.0;

const PLAY_TIME_POINTER: &str = "/stats/minecraft:custom/minecraft:play_time";

pub const NO_STATS_MSG: &str = "No stats available.";

/// Top-N playtime as a rendered chat message. Never fails: a broken stats
/// directory becomes a readable error string.
pub fn top_playtime(data_dir: &Path, limit: usize) -> String {
    match compute_top(data_dir, limit) {
        Ok(players) if players.is_empty() => NO_STATS_MSG.to_string(),
        Ok(players) => render(&players),
        Err(e) => format!("Error calculating stats: {}", e),
    }
}

/// Ranked (name, hours) pairs, highest first.
pub fn compute_top(
    data_dir: &Path,
    limit: usize,
) -> Result<Vec<(String, f64)>, Box<dyn std::error::Error + Send + Sync>> {
    let uuid_map = load_usercache(&data_dir.join("usercache.json"));
    let stats_dir = data_dir.join("world").join("stats");

    let mut players: Vec<(String, f64)> = Vec::new();

    if stats_dir.exists() {
        for entry in fs::read_dir(&stats_dir)? {
            // A single unreadable or malformed file is skipped; partial
            // results are still worth returning.
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(uuid) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(ticks) = read_play_ticks(&path) else {
                continue;
            };
            if ticks <= 0.0 {
                continue;
            }

            let name = uuid_map
                .get(uuid)
                .cloned()
                .unwrap_or_else(|| uuid.chars().take(8).collect());
            players.push((name, ticks / TICKS_PER_HOUR));
        }
    }

    // Stable sort: ties keep directory-listing order, which is
    // platform-dependent.
    players.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    players.truncate(limit);
    Ok(players)
}

fn read_play_ticks(path: &Path) -> Option<f64> {
    let content = fs::read_to_string(path).ok()?;
    let doc: Value = serde_json::from_str(&content).ok()?;
    doc.pointer(PLAY_TIME_POINTER).and_then(Value::as_f64)
}

/// uuid -> display name. A missing or malformed cache file is an empty
/// mapping, not an error.
fn load_usercache(path: &Path) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(content) = fs::read_to_string(path) else {
        return map;
    };
    let Ok(entries) = serde_json::from_str::<Vec<Value>>(&content) else {
        return map;
    };
    for entry in entries {
        if let (Some(uuid), Some(name)) = (
            entry.get("uuid").and_then(Value::as_str),
            entry.get("name").and_then(Value::as_str),
        ) {
            map.insert(uuid.to_string(), name.to_string());
        }
    }
    map
}

fn render(players: &[(String, f64)]) -> String {
    let mut msg = String::from("🏆 *Top Playtime:*\n");
    for (i, (name, hours)) in players.iter().enumerate() {
        msg.push_str(&format!("{}. 👤 *{}:* `{:.1} hours`\n", i + 1, name, hours));
    }
    msg
}
