//! Inline keyboard builders
//!
//! Every callback_data string produced here must be one the dispatcher's
//! match table recognizes — an unknown identifier is acknowledged as a
//! no-op on the other end.

use super::api::{InlineKeyboardButton, InlineKeyboardMarkup};

fn btn(text: &str, data: impl Into<String>) -> InlineKeyboardButton {
    InlineKeyboardButton::new(text, data)
}

/// Main control panel.
pub fn main_keyboard(chat_relay_enabled: bool) -> InlineKeyboardMarkup {
    let chat_icon = if chat_relay_enabled { "🟢" } else { "🔴" };
    let chat_text = if chat_relay_enabled {
        "Chat ON"
    } else {
        "Chat OFF"
    };

    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![
                btn("⚡ Start", "start_server"),
                btn("🔄 Restart", "restart_server"),
                btn("🛑 Stop", "stop_server"),
            ],
            vec![btn("🔄 Refresh", "refresh"), btn("👥 Online", "online")],
            vec![
                btn("⚙️ Settings", "menu_settings"),
                btn("📜 Whitelist", "wl_list"),
            ],
            vec![
                btn("🔒 Lock Server", "wl_on"),
                btn("🔓 Unlock Server", "wl_off"),
            ],
            vec![
                btn("📢 Broadcast", "broadcast_mode"),
                btn("📦 Backup", "trigger_backup"),
            ],
            vec![
                btn(&format!("{} {}", chat_icon, chat_text), "toggle_chat"),
                btn("🏆 Top Playtime", "show_top"),
            ],
            vec![btn("ℹ️ Help / Guide", "show_help"), btn("📋 Copy IP", "get_ip")],
        ],
    }
}

/// Time, weather, difficulty and gamerule shortcuts.
pub fn settings_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![
                btn("☀️ Day", "set_day"),
                btn("🌙 Night", "set_night"),
                btn("🌧️ Rain", "set_rain"),
                btn("☀️ Clear", "set_clear"),
            ],
            vec![
                btn("👶 Easy", "set_diff:easy"),
                btn("😐 Normal", "set_diff:normal"),
                btn("💀 Hard", "set_diff:hard"),
            ],
            vec![
                btn("🟢 KeepInv", "keepinv_on"),
                btn("🔘 KeepInv", "keepinv_off"),
            ],
            vec![btn("🔧 Properties (PvP/Flight...)", "menu_properties")],
            vec![btn("BACK TO MAIN", "menu_main")],
        ],
    }
}

/// Current values for the properties editor, read before rendering.
pub struct PropertiesView {
    pub pvp: bool,
    pub allow_flight: bool,
    pub allow_nether: bool,
    pub max_players: String,
    pub view_distance: String,
}

/// server.properties editor. Toggles show the live value; numeric keys
/// offer fixed presets. Changes only apply after a restart.
pub fn properties_keyboard(view: &PropertiesView) -> InlineKeyboardMarkup {
    let icon = |on: bool| if on { "🟢" } else { "🔴" };

    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![
                btn(&format!("⚔️ PvP: {}", icon(view.pvp)), "prop_toggle:pvp"),
                btn(
                    &format!("🕊️ Flight: {}", icon(view.allow_flight)),
                    "prop_toggle:allow-flight",
                ),
            ],
            vec![btn(
                &format!(" Nether: {}", icon(view.allow_nether)),
                "prop_toggle:allow-nether",
            )],
            vec![
                btn(&format!("👥 Max: {}", view.max_players), "ignore"),
                btn("10", "prop_set:max-players:10"),
                btn("20", "prop_set:max-players:20"),
                btn("50", "prop_set:max-players:50"),
            ],
            vec![
                btn(&format!("👀 View: {}", view.view_distance), "ignore"),
                btn("6", "prop_set:view-distance:6"),
                btn("10", "prop_set:view-distance:10"),
                btn("16", "prop_set:view-distance:16"),
            ],
            vec![btn("⚠️ Apply Changes (Restart)", "restart_server")],
            vec![btn("🔙 Back", "menu_settings")],
        ],
    }
}

/// Online players as manage buttons, two per row, plus a refresh row.
pub fn online_players_keyboard(players: &[String]) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Vec::new();
    let mut row: Vec<InlineKeyboardButton> = Vec::new();

    for player in players {
        row.push(btn(&format!("👤 {}", player), format!("manage:{}", player)));
        if row.len() == 2 {
            rows.push(std::mem::take(&mut row));
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }

    rows.push(vec![btn("🔄 Refresh", "online")]);
    InlineKeyboardMarkup {
        inline_keyboard: rows,
    }
}

/// Per-player management actions. The op/deop row is visible to everyone
/// but the dispatcher enforces owner-only on press.
pub fn player_action_keyboard(player: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![
                btn("🎮 Survival", format!("gm:survival:{}", player)),
                btn("🎮 Creative", format!("gm:creative:{}", player)),
                btn("👻 Spectator", format!("gm:spectator:{}", player)),
            ],
            vec![
                btn("⚡ Give OP", format!("op:{}", player)),
                btn("🔻 Remove OP", format!("deop:{}", player)),
            ],
            vec![
                btn("🔨 Ban", format!("ban:{}", player)),
                btn("🔓 Unban", format!("unban:{}", player)),
            ],
            vec![btn("🥾 Kick", format!("kick:{}", player))],
            vec![btn("🔙 Back to Players", "online")],
        ],
    }
}

/// Yes/no prompt shown before the destructive stop actually runs.
pub fn confirm_stop_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![
            btn("✅ Yes, Stop", "confirm_stop"),
            btn("❌ Cancel", "cancel_stop"),
        ]],
    }
}

/// One-click whitelist add attached to a blocked-connection alert.
pub fn quick_add_keyboard(player: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![btn(
            &format!("✅ Add {}", player),
            format!("quick_add:{}", player),
        )]],
    }
}
