//! Command and callback dispatch
//!
//! The single state machine behind the bot: every incoming free-text
//! message and button press is checked against the authorized set, mapped
//! to one effect, and acknowledged exactly once. Collaborators sit behind
//! traits so the transitions are testable with recording fakes.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::config::Config;
use crate::console::rcon::GameConsole;
use crate::container::control::ServerControl;
use crate::daemon::backup;
use crate::playtime::top::top_playtime;
use crate::properties::store::PropertiesStore;
use crate::telegram::api::{CallbackQuery, Message, Update};
use crate::telegram::client::{ChatApi, TelegramClient};
use crate::telegram::keyboards::{self, PropertiesView};

use super::state::BotState;
use super::status::{self, server_status};
use super::texts;

pub struct Dispatcher {
    state: BotState,
    chat: Arc<dyn ChatApi>,
    console: Arc<dyn GameConsole>,
    control: Arc<dyn ServerControl>,
    props: PropertiesStore,
    allowed_chat_ids: Vec<i64>,
    owner_id: i64,
    data_dir: PathBuf,
    backup_script: String,
    server_ip: Option<String>,
}

impl Dispatcher {
    pub fn new(
        chat: Arc<dyn ChatApi>,
        console: Arc<dyn GameConsole>,
        control: Arc<dyn ServerControl>,
        config: &Config,
    ) -> Self {
        Self {
            state: BotState::new(),
            chat,
            console,
            control,
            props: PropertiesStore::new(&config.server.properties_file),
            allowed_chat_ids: config.telegram.allowed_chat_ids.clone(),
            owner_id: config.telegram.owner_id,
            data_dir: config.data_dir(),
            backup_script: config.server.backup_script.clone(),
            server_ip: config.server.ip.clone(),
        }
    }

    pub async fn handle_update(&self, update: Update) {
        if let Some(msg) = update.message {
            self.handle_message(msg).await;
        } else if let Some(cb) = update.callback_query {
            self.handle_callback(cb).await;
        }
    }

    fn is_allowed(&self, chat_id: i64) -> bool {
        self.allowed_chat_ids.contains(&chat_id)
    }

    // ---- free-text messages ------------------------------------------

    pub async fn handle_message(&self, msg: Message) {
        let chat_id = msg.chat.id;
        let Some(text) = msg.text.as_deref().map(str::trim) else {
            return;
        };

        if !self.is_allowed(chat_id) {
            // Messages from strangers are dropped without a reply.
            tracing::debug!("Ignoring message from unauthorized chat {}", chat_id);
            return;
        }

        let sender = msg
            .from
            .as_ref()
            .map(|u| u.first_name.as_str())
            .unwrap_or("Admin");

        // An armed broadcast consumes the next message, whatever it says.
        if self.state.take_broadcast(chat_id) {
            self.send_screen_broadcast(chat_id, text, sender).await;
            return;
        }

        if text.starts_with('/') {
            self.handle_command(chat_id, text).await;
        } else if self.state.chat_relay_enabled() {
            self.console.execute(&relay_command(sender, text)).await;
        }
    }

    async fn send_screen_broadcast(&self, chat_id: i64, text: &str, sender: &str) {
        let safe = text.replace('"', "'");
        for cmd in broadcast_title_commands(&safe, sender) {
            self.console.execute(&cmd).await;
        }
        self.chat
            .send_message(chat_id, &format!("✅ *Broadcast Sent:*\n{}", safe), None)
            .await;
    }

    async fn handle_command(&self, chat_id: i64, text: &str) {
        if text.starts_with("/start") || text.starts_with("/help") || text.starts_with("/panel") {
            let status = self.render_status().await;
            self.chat
                .send_message(
                    chat_id,
                    &format!("👋 *Server Control Bot*\n\n{}\n\n{}", status, texts::COMMANDS_HELP),
                    Some(keyboards::main_keyboard(self.state.chat_relay_enabled())),
                )
                .await;
            return;
        }

        if text == "/cmd" || text.starts_with("/cmd ") {
            if chat_id != self.owner_id {
                self.chat
                    .send_message(chat_id, "⛔ Only Owner can use console commands!", None)
                    .await;
                return;
            }

            let raw = text[4..].trim();
            if raw.is_empty() {
                self.chat
                    .send_message(chat_id, "⚠️ Usage: `/cmd <command>`", None)
                    .await;
                return;
            }

            let output = self.console.execute(raw).await;
            let output = if output.trim().is_empty() {
                "✅ Command executed (No output)".to_string()
            } else {
                output
            };
            self.chat
                .send_message(chat_id, &format!("💻 *Console Output:*\n`{}`", output), None)
                .await;
            return;
        }

        let mut parts = text.split_whitespace();
        let cmd = parts.next().unwrap_or("").to_lowercase();
        let arg = parts.next();

        match (cmd.as_str(), arg) {
            ("/add", Some(player)) => {
                let out = self
                    .console
                    .execute(&format!("whitelist add {}", player))
                    .await;
                self.console.execute("whitelist reload").await;
                self.chat
                    .send_message(chat_id, &format!("✅ *Added:* {}\n`{}`", player, out), None)
                    .await;
            }
            ("/remove", Some(player)) => {
                let out = self
                    .console
                    .execute(&format!("whitelist remove {}", player))
                    .await;
                self.console.execute("whitelist reload").await;
                self.chat
                    .send_message(chat_id, &format!("❌ *Removed:* {}\n`{}`", player, out), None)
                    .await;
            }
            ("/kick", Some(player)) => {
                let out = self.console.execute(&format!("kick {}", player)).await;
                self.chat
                    .send_message(chat_id, &format!("🥾 *Kicked:* {}\n`{}`", player, out), None)
                    .await;
            }
            ("/top", _) => {
                let msg = top_playtime(&self.data_dir, 5);
                self.chat.send_message(chat_id, &msg, None).await;
            }
            _ => {
                // Unknown slash commands are ignored, same as commands
                // missing their argument.
            }
        }
    }

    // ---- button presses ----------------------------------------------

    pub async fn handle_callback(&self, cb: CallbackQuery) {
        let cb_id = cb.id;
        let Some(message) = cb.message else {
            self.chat.answer_callback(&cb_id, "Done!").await;
            return;
        };
        let chat_id = message.chat.id;
        let msg_id = message.message_id;
        let data = cb.data.unwrap_or_default();

        if !self.is_allowed(chat_id) {
            self.chat.answer_callback(&cb_id, "Unauthorized").await;
            return;
        }

        match data.as_str() {
            "toggle_chat" => {
                let enabled = self.state.toggle_chat_relay();
                self.render_main(chat_id, msg_id).await;
                let state_text = if enabled { "Enabled" } else { "Disabled" };
                self.chat
                    .answer_callback(&cb_id, &format!("Chat {}", state_text))
                    .await;
            }

            "show_top" => {
                let msg = top_playtime(&self.data_dir, 5);
                self.chat.send_message(chat_id, &msg, None).await;
                self.chat.answer_callback(&cb_id, "🏆 Top Players").await;
            }

            "show_help" => {
                self.chat.answer_callback(&cb_id, "Help Guide").await;
                self.chat.send_message(chat_id, texts::HELP_TEXT, None).await;
            }

            "show_guide" => {
                self.chat.answer_callback(&cb_id, "Commands Guide").await;
                self.chat.send_message(chat_id, texts::GUIDE_TEXT, None).await;
            }

            "get_ip" => {
                let ip = TelegramClient::fetch_public_ip(self.server_ip.as_deref()).await;
                self.chat
                    .send_message(chat_id, &format!("🌐 *Server IP:*\n`{}`", ip), None)
                    .await;
                self.chat.answer_callback(&cb_id, "Sent IP").await;
            }

            "menu_settings" => {
                self.chat
                    .edit_message(
                        chat_id,
                        msg_id,
                        "⚙️ *Server Settings:*",
                        Some(keyboards::settings_keyboard()),
                    )
                    .await;
                self.chat.answer_callback(&cb_id, "Done!").await;
            }

            "menu_main" => {
                self.render_main(chat_id, msg_id).await;
                self.chat.answer_callback(&cb_id, "Done!").await;
            }

            "menu_properties" => {
                self.render_properties(chat_id, msg_id).await;
                self.chat.answer_callback(&cb_id, "Done!").await;
            }

            "set_day" => {
                self.console.execute("time set day").await;
                self.chat.answer_callback(&cb_id, "Time set to Day ☀️").await;
            }
            "set_night" => {
                self.console.execute("time set night").await;
                self.chat
                    .answer_callback(&cb_id, "Time set to Night 🌙")
                    .await;
            }
            "set_rain" => {
                self.console.execute("weather rain").await;
                self.chat
                    .answer_callback(&cb_id, "Weather set to Rain 🌧️")
                    .await;
            }
            "set_clear" => {
                self.console.execute("weather clear").await;
                self.chat
                    .answer_callback(&cb_id, "Weather set to Clear ☀️")
                    .await;
            }

            "keepinv_on" => {
                self.console.execute("gamerule keepInventory true").await;
                self.chat.answer_callback(&cb_id, "KeepInventory ON 🎒").await;
            }
            "keepinv_off" => {
                self.console.execute("gamerule keepInventory false").await;
                self.chat
                    .answer_callback(&cb_id, "KeepInventory OFF 🔻")
                    .await;
            }

            "refresh" => {
                self.render_main(chat_id, msg_id).await;
                self.chat.answer_callback(&cb_id, "Refreshed").await;
            }

            "start_server" => {
                let msg = self.control.start().await;
                self.chat.answer_callback(&cb_id, &msg).await;
                sleep(Duration::from_secs(2)).await;
                self.render_main(chat_id, msg_id).await;
            }

            "restart_server" => {
                self.chat
                    .edit_message(
                        chat_id,
                        msg_id,
                        "⏳ *Restarting Server...*\nPlease wait (~60s).",
                        Some(keyboards::main_keyboard(self.state.chat_relay_enabled())),
                    )
                    .await;
                self.chat.answer_callback(&cb_id, "Restarting...").await;

                let msg = self.control.restart().await;
                sleep(Duration::from_secs(5)).await;

                let status = self.render_status().await;
                self.chat
                    .edit_message(
                        chat_id,
                        msg_id,
                        &format!("✅ *{}*\n\n{}\n\n{}", msg, status, texts::COMMANDS_HELP),
                        Some(keyboards::main_keyboard(self.state.chat_relay_enabled())),
                    )
                    .await;
            }

            // Stop is destructive: first click only asks.
            "stop_server" => {
                self.chat
                    .edit_message(
                        chat_id,
                        msg_id,
                        "⚠️ *Are you sure you want to STOP the server?*\nThis will kick all players.",
                        Some(keyboards::confirm_stop_keyboard()),
                    )
                    .await;
                self.chat.answer_callback(&cb_id, "Confirmation needed").await;
            }

            "confirm_stop" => {
                let msg = self.control.stop().await;
                self.chat.answer_callback(&cb_id, &msg).await;
                sleep(Duration::from_secs(2)).await;
                self.render_main(chat_id, msg_id).await;
            }

            "cancel_stop" => {
                self.render_main(chat_id, msg_id).await;
                self.chat.answer_callback(&cb_id, "Cancelled").await;
            }

            "trigger_backup" => {
                self.chat
                    .edit_message(
                        chat_id,
                        msg_id,
                        "⏳ *Starting Backup...*",
                        Some(keyboards::main_keyboard(self.state.chat_relay_enabled())),
                    )
                    .await;
                self.chat.answer_callback(&cb_id, "Backup started!").await;

                let msg = backup::run_backup(&self.backup_script);
                let status = self.render_status().await;
                self.chat
                    .edit_message(
                        chat_id,
                        msg_id,
                        &format!("{}\n\n{}\n\n{}", msg, status, texts::COMMANDS_HELP),
                        Some(keyboards::main_keyboard(self.state.chat_relay_enabled())),
                    )
                    .await;
            }

            "online" => {
                let list_out = self.console.execute("list").await;
                let players = status::parse_player_list(&list_out);
                if players.is_empty() {
                    self.chat
                        .send_message(
                            chat_id,
                            "👥 *Online Players:*\n_No players online._",
                            None,
                        )
                        .await;
                } else {
                    let msg = format!(
                        "👥 *Online Players ({}):*\nSelect a player to manage:",
                        players.len()
                    );
                    self.chat
                        .edit_message(
                            chat_id,
                            msg_id,
                            &msg,
                            Some(keyboards::online_players_keyboard(&players)),
                        )
                        .await;
                }
                self.chat.answer_callback(&cb_id, "Done!").await;
            }

            "wl_list" => {
                let raw = self.console.execute("whitelist list").await;
                self.chat
                    .send_message(chat_id, &status::format_whitelist(&raw), None)
                    .await;
                self.chat.answer_callback(&cb_id, "Done!").await;
            }

            "wl_on" => {
                self.console.execute("whitelist on").await;
                self.console.execute("whitelist reload").await;
                // Give the server a beat to rewrite the properties file.
                sleep(Duration::from_secs(1)).await;
                self.render_main(chat_id, msg_id).await;
                self.chat.answer_callback(&cb_id, "Locked").await;
            }

            "wl_off" => {
                self.console.execute("whitelist off").await;
                sleep(Duration::from_secs(1)).await;
                self.render_main(chat_id, msg_id).await;
                self.chat.answer_callback(&cb_id, "Unlocked").await;
            }

            "broadcast_mode" => {
                self.state.arm_broadcast(chat_id);
                self.chat
                    .send_message(
                        chat_id,
                        "📢 *Broadcast Mode ON*\nType your message now to send it as a screen title to all players.",
                        None,
                    )
                    .await;
                self.chat
                    .answer_callback(&cb_id, "Waiting for input...")
                    .await;
            }

            "ignore" => {
                self.chat.answer_callback(&cb_id, "Done!").await;
            }

            _ => {
                self.handle_parameterized(chat_id, msg_id, &cb_id, &data).await;
            }
        }
    }

    /// `:`-parameterized identifiers, plus the unknown-identifier fallback.
    async fn handle_parameterized(&self, chat_id: i64, msg_id: i64, cb_id: &str, data: &str) {
        if let Some(key) = data.strip_prefix("prop_toggle:") {
            let current = self.props.read(key);
            let new_val = if current.as_deref() == Some("true") {
                "false"
            } else {
                "true"
            };
            if let Err(e) = self.props.write(key, new_val) {
                tracing::error!("Failed to update property {}: {}", key, e);
            }
            self.chat
                .answer_callback(cb_id, &format!("Set {} to {} 📝", key, new_val))
                .await;
            self.render_properties(chat_id, msg_id).await;
            return;
        }

        if let Some(rest) = data.strip_prefix("prop_set:") {
            if let Some((key, value)) = rest.split_once(':') {
                if let Err(e) = self.props.write(key, value) {
                    tracing::error!("Failed to update property {}: {}", key, e);
                }
                self.chat
                    .answer_callback(cb_id, &format!("Set {} to {} 📝", key, value))
                    .await;
                self.render_properties(chat_id, msg_id).await;
                return;
            }
        }

        if let Some(diff) = data.strip_prefix("set_diff:") {
            self.console.execute(&format!("difficulty {}", diff)).await;
            self.chat
                .answer_callback(cb_id, &format!("Difficulty set to {} 💀", diff.to_uppercase()))
                .await;
            return;
        }

        if let Some(player) = data.strip_prefix("quick_add:") {
            self.console
                .execute(&format!("whitelist add {}", player))
                .await;
            self.console.execute("whitelist reload").await;
            self.chat
                .edit_message(
                    chat_id,
                    msg_id,
                    &format!("✅ *Added {} to whitelist!*\nThey can join now.", player),
                    None,
                )
                .await;
            self.chat
                .answer_callback(cb_id, &format!("Added {}", player))
                .await;
            return;
        }

        if let Some(player) = data.strip_prefix("manage:") {
            self.chat
                .edit_message(
                    chat_id,
                    msg_id,
                    &format!("👤 Managing *{}*:", player),
                    Some(keyboards::player_action_keyboard(player)),
                )
                .await;
            self.chat.answer_callback(cb_id, "Done!").await;
            return;
        }

        if let Some(rest) = data.strip_prefix("gm:") {
            if let Some((mode, player)) = rest.split_once(':') {
                self.console
                    .execute(&format!("gamemode {} {}", mode, player))
                    .await;
                self.chat
                    .answer_callback(cb_id, &format!("Set {} to {} 🎮", player, mode))
                    .await;
                return;
            }
        }

        if let Some(player) = data.strip_prefix("op:") {
            if chat_id != self.owner_id {
                self.chat
                    .answer_callback(cb_id, "⛔ Only Owner can give OP!")
                    .await;
                return;
            }
            self.console.execute(&format!("op {}", player)).await;
            self.chat
                .answer_callback(cb_id, &format!("{} is now OP ⚡", player))
                .await;
            return;
        }

        if let Some(player) = data.strip_prefix("deop:") {
            if chat_id != self.owner_id {
                self.chat
                    .answer_callback(cb_id, "⛔ Only Owner can remove OP!")
                    .await;
                return;
            }
            self.console.execute(&format!("deop {}", player)).await;
            self.chat
                .answer_callback(cb_id, &format!("{} is no longer OP 🔻", player))
                .await;
            return;
        }

        if let Some(player) = data.strip_prefix("ban:") {
            self.console.execute(&format!("ban {}", player)).await;
            self.chat
                .answer_callback(cb_id, &format!("{} BANNED 🔨", player))
                .await;
            self.chat
                .edit_message(
                    chat_id,
                    msg_id,
                    &format!("🔨 *{}* has been BANNED.", player),
                    Some(keyboards::player_action_keyboard(player)),
                )
                .await;
            return;
        }

        if let Some(player) = data.strip_prefix("unban:") {
            self.console.execute(&format!("pardon {}", player)).await;
            self.chat
                .answer_callback(cb_id, &format!("{} UNBANNED 🔓", player))
                .await;
            self.chat
                .edit_message(
                    chat_id,
                    msg_id,
                    &format!("🔓 *{}* has been UNBANNED.", player),
                    Some(keyboards::player_action_keyboard(player)),
                )
                .await;
            return;
        }

        if let Some(player) = data.strip_prefix("kick:") {
            self.console.execute(&format!("kick {}", player)).await;
            self.chat
                .answer_callback(cb_id, &format!("{} Kicked 🥾", player))
                .await;
            return;
        }

        // Closed vocabulary: anything else is acknowledged and dropped.
        // Logged loudly so a typo in a keyboard builder shows up in logs
        // instead of silently doing nothing forever.
        tracing::warn!("Unknown callback identifier: {:?}", data);
        self.chat.answer_callback(cb_id, "Done!").await;
    }

    // ---- rendering ----------------------------------------------------

    async fn render_status(&self) -> String {
        server_status(self.control.as_ref(), self.console.as_ref(), &self.props).await
    }

    async fn render_main(&self, chat_id: i64, msg_id: i64) {
        let status = self.render_status().await;
        self.chat
            .edit_message(
                chat_id,
                msg_id,
                &format!("{}\n{}", status, texts::COMMANDS_HELP),
                Some(keyboards::main_keyboard(self.state.chat_relay_enabled())),
            )
            .await;
    }

    async fn render_properties(&self, chat_id: i64, msg_id: i64) {
        let view = PropertiesView {
            pvp: self.props.read_bool("pvp"),
            allow_flight: self.props.read_bool("allow-flight"),
            allow_nether: self.props.read_bool("allow-nether"),
            max_players: self.props.read("max-players").unwrap_or_else(|| "N/A".into()),
            view_distance: self
                .props
                .read("view-distance")
                .unwrap_or_else(|| "N/A".into()),
        };
        self.chat
            .edit_message(
                chat_id,
                msg_id,
                "🔧 *Server Properties (Req. Restart):*",
                Some(keyboards::properties_keyboard(&view)),
            )
            .await;
    }
}

/// Forward a chat message into the game, attributed to its sender.
fn relay_command(sender: &str, text: &str) -> String {
    let safe = text.replace('"', "'");
    format!(
        "tellraw @a [\"\",{{\"text\":\"[{}@Telegram]: \",\"color\":\"aqua\"}},{{\"text\":\"{}\",\"color\":\"white\"}}]",
        sender, safe
    )
}

/// Title, subtitle and sound cue for a screen broadcast. The payload is
/// pre-sanitized by the caller.
fn broadcast_title_commands(safe_text: &str, sender: &str) -> [String; 3] {
    [
        format!(
            r#"title @a title {{"text":"{}", "color":"gold", "bold":true}}"#,
            safe_text
        ),
        format!(
            r#"title @a subtitle {{"text":"From {}", "color":"gray"}}"#,
            sender
        ),
        "execute at @a run playsound minecraft:entity.experience_orb.pickup master @p ~ ~ ~ 1 1"
            .to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::config::config::{
        DockerConfig, MonitoringConfig, ServerConfig, TelegramConfig,
    };
    use crate::telegram::api::{Chat, InlineKeyboardMarkup, User};

    const ADMIN: i64 = 100;
    const OWNER: i64 = 200;
    const STRANGER: i64 = 999;

    #[derive(Default)]
    struct RecordingChat {
        sent: Mutex<Vec<(i64, String)>>,
        edits: Mutex<Vec<(i64, i64, String)>>,
        answers: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChatApi for RecordingChat {
        async fn send_message(
            &self,
            chat_id: i64,
            text: &str,
            _keyboard: Option<InlineKeyboardMarkup>,
        ) {
            self.sent.lock().unwrap().push((chat_id, text.to_string()));
        }

        async fn edit_message(
            &self,
            chat_id: i64,
            message_id: i64,
            text: &str,
            _keyboard: Option<InlineKeyboardMarkup>,
        ) {
            self.edits
                .lock()
                .unwrap()
                .push((chat_id, message_id, text.to_string()));
        }

        async fn answer_callback(&self, _callback_id: &str, text: &str) {
            self.answers.lock().unwrap().push(text.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingConsole {
        commands: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl GameConsole for RecordingConsole {
        async fn execute(&self, command: &str) -> String {
            self.commands.lock().unwrap().push(command.to_string());
            String::new()
        }
    }

    #[derive(Default)]
    struct FakeControl {
        starts: AtomicUsize,
        stops: AtomicUsize,
        restarts: AtomicUsize,
    }

    #[async_trait]
    impl ServerControl for FakeControl {
        async fn start(&self) -> String {
            self.starts.fetch_add(1, Ordering::SeqCst);
            "✅ Server starting...".to_string()
        }

        async fn stop(&self) -> String {
            self.stops.fetch_add(1, Ordering::SeqCst);
            "🛑 Server stopped.".to_string()
        }

        async fn restart(&self) -> String {
            self.restarts.fetch_add(1, Ordering::SeqCst);
            "🔄 Server restarting...".to_string()
        }

        async fn state(&self) -> Option<String> {
            Some("running".to_string())
        }

        async fn mem_usage(&self) -> String {
            "512MiB / 2048MiB / 10.0%".to_string()
        }
    }

    struct Harness {
        chat: Arc<RecordingChat>,
        console: Arc<RecordingConsole>,
        control: Arc<FakeControl>,
        dispatcher: Dispatcher,
    }

    fn harness() -> Harness {
        let chat = Arc::new(RecordingChat::default());
        let console = Arc::new(RecordingConsole::default());
        let control = Arc::new(FakeControl::default());

        let config = Config {
            telegram: TelegramConfig {
                token: "test-token".to_string(),
                allowed_chat_ids: vec![ADMIN, OWNER],
                owner_id: OWNER,
            },
            docker: DockerConfig {
                container_name: "minecraft".to_string(),
            },
            server: ServerConfig {
                properties_file: std::env::temp_dir()
                    .join("craftctl-dispatch-missing.properties")
                    .to_string_lossy()
                    .into_owned(),
                backup_script: "/nonexistent/backup.sh".to_string(),
                ip: Some("198.51.100.7".to_string()),
            },
            monitoring: MonitoringConfig::default(),
        };

        let dispatcher = Dispatcher::new(
            chat.clone(),
            console.clone(),
            control.clone(),
            &config,
        );

        Harness {
            chat,
            console,
            control,
            dispatcher,
        }
    }

    fn text_msg(chat_id: i64, text: &str) -> Message {
        Message {
            message_id: 1,
            chat: Chat { id: chat_id },
            text: Some(text.to_string()),
            from: Some(User {
                first_name: "Tester".to_string(),
            }),
        }
    }

    fn callback(chat_id: i64, data: &str) -> CallbackQuery {
        CallbackQuery {
            id: "cb".to_string(),
            data: Some(data.to_string()),
            message: Some(Message {
                message_id: 42,
                chat: Chat { id: chat_id },
                text: None,
                from: None,
            }),
        }
    }

    fn console_commands(h: &Harness) -> Vec<String> {
        h.console.commands.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn unauthorized_message_has_no_effect() {
        let h = harness();
        h.dispatcher
            .handle_message(text_msg(STRANGER, "/add Griefer"))
            .await;

        assert!(console_commands(&h).is_empty());
        assert!(h.chat.sent.lock().unwrap().is_empty());
        assert!(!h.dispatcher.state.awaiting_broadcast(STRANGER));
    }

    #[tokio::test]
    async fn unauthorized_callback_is_rejected() {
        let h = harness();
        h.dispatcher
            .handle_callback(callback(STRANGER, "start_server"))
            .await;

        assert_eq!(h.control.starts.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.chat.answers.lock().unwrap().as_slice(),
            ["Unauthorized".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_requires_explicit_confirmation() {
        let h = harness();

        h.dispatcher
            .handle_callback(callback(ADMIN, "stop_server"))
            .await;
        assert_eq!(h.control.stops.load(Ordering::SeqCst), 0);
        let edits = h.chat.edits.lock().unwrap().clone();
        assert!(edits.last().unwrap().2.contains("Are you sure"));

        h.dispatcher
            .handle_callback(callback(ADMIN, "cancel_stop"))
            .await;
        assert_eq!(h.control.stops.load(Ordering::SeqCst), 0);

        h.dispatcher
            .handle_callback(callback(ADMIN, "stop_server"))
            .await;
        h.dispatcher
            .handle_callback(callback(ADMIN, "confirm_stop"))
            .await;
        assert_eq!(h.control.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn broadcast_consumes_exactly_one_message() {
        let h = harness();

        h.dispatcher
            .handle_callback(callback(ADMIN, "broadcast_mode"))
            .await;
        assert!(h.dispatcher.state.awaiting_broadcast(ADMIN));

        h.dispatcher
            .handle_message(text_msg(ADMIN, "Server restarts in 5 minutes"))
            .await;

        let commands = console_commands(&h);
        assert_eq!(commands.len(), 3);
        assert!(commands[0].contains("title @a title"));
        assert!(commands[0].contains("Server restarts in 5 minutes"));
        assert!(commands[1].contains("From Tester"));
        assert!(commands[2].contains("playsound"));
        assert!(!h.dispatcher.state.awaiting_broadcast(ADMIN));

        // The next message is ordinary chat relay, not another broadcast.
        h.dispatcher
            .handle_message(text_msg(ADMIN, "hello again"))
            .await;
        let commands = console_commands(&h);
        assert_eq!(commands.len(), 4);
        assert!(commands[3].starts_with("tellraw @a"));
    }

    #[tokio::test]
    async fn broadcast_payload_quotes_are_sanitized() {
        let h = harness();
        h.dispatcher
            .handle_callback(callback(ADMIN, "broadcast_mode"))
            .await;
        h.dispatcher
            .handle_message(text_msg(ADMIN, r#"say "hi""#))
            .await;

        let commands = console_commands(&h);
        assert!(commands[0].contains("say 'hi'"));
        assert!(!commands[0].contains(r#"say "hi""#));
    }

    #[tokio::test]
    async fn cmd_is_owner_only() {
        let h = harness();

        h.dispatcher
            .handle_message(text_msg(ADMIN, "/cmd op Steve"))
            .await;
        assert!(console_commands(&h).is_empty());
        let sent = h.chat.sent.lock().unwrap().clone();
        assert!(sent.last().unwrap().1.contains("Only Owner"));

        h.dispatcher
            .handle_message(text_msg(OWNER, "/cmd op Steve"))
            .await;
        assert_eq!(console_commands(&h), ["op Steve".to_string()]);
        let sent = h.chat.sent.lock().unwrap().clone();
        // Empty console output is reported as executed.
        assert!(sent.last().unwrap().1.contains("Command executed"));
    }

    #[tokio::test]
    async fn op_callback_is_owner_only_with_distinct_denial() {
        let h = harness();

        h.dispatcher.handle_callback(callback(ADMIN, "op:Steve")).await;
        assert!(console_commands(&h).is_empty());
        assert_eq!(
            h.chat.answers.lock().unwrap().as_slice(),
            ["⛔ Only Owner can give OP!".to_string()]
        );

        h.dispatcher.handle_callback(callback(OWNER, "op:Steve")).await;
        assert_eq!(console_commands(&h), ["op Steve".to_string()]);
    }

    #[tokio::test]
    async fn unknown_callback_is_acknowledged_noop() {
        let h = harness();
        h.dispatcher
            .handle_callback(callback(ADMIN, "definitely_not_a_button"))
            .await;

        assert!(console_commands(&h).is_empty());
        assert_eq!(h.control.starts.load(Ordering::SeqCst), 0);
        assert_eq!(h.control.stops.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.chat.answers.lock().unwrap().as_slice(),
            ["Done!".to_string()]
        );
    }

    #[tokio::test]
    async fn add_command_whitelists_and_reloads() {
        let h = harness();
        h.dispatcher
            .handle_message(text_msg(ADMIN, "/add Steve"))
            .await;

        assert_eq!(
            console_commands(&h),
            ["whitelist add Steve".to_string(), "whitelist reload".to_string()]
        );
        let sent = h.chat.sent.lock().unwrap().clone();
        assert!(sent.last().unwrap().1.contains("*Added:* Steve"));
    }

    #[tokio::test]
    async fn quick_add_callback_whitelists() {
        let h = harness();
        h.dispatcher
            .handle_callback(callback(ADMIN, "quick_add:NewPlayer"))
            .await;

        assert_eq!(
            console_commands(&h),
            [
                "whitelist add NewPlayer".to_string(),
                "whitelist reload".to_string()
            ]
        );
        let edits = h.chat.edits.lock().unwrap().clone();
        assert!(edits.last().unwrap().2.contains("Added NewPlayer"));
    }

    #[tokio::test]
    async fn chat_relay_respects_toggle() {
        let h = harness();

        h.dispatcher.handle_message(text_msg(ADMIN, "hi all")).await;
        assert_eq!(console_commands(&h).len(), 1);
        assert!(console_commands(&h)[0].starts_with("tellraw"));

        h.dispatcher
            .handle_callback(callback(ADMIN, "toggle_chat"))
            .await;
        h.dispatcher
            .handle_message(text_msg(ADMIN, "into the void"))
            .await;
        // list (from the status re-render) may have been issued, but no
        // second tellraw.
        let tellraws = console_commands(&h)
            .iter()
            .filter(|c| c.starts_with("tellraw"))
            .count();
        assert_eq!(tellraws, 1);
    }
}
