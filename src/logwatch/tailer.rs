//! Live log tailing for the server container
//!
//! Follows the container's stdout/stderr through the Docker logs API,
//! classifies every line, and feeds the resulting notifications to chat.
//! Delivery is at-most-once and best-effort: no replay, no persistence,
//! and no failure in here may take the process down.

use bollard::container::{LogOutput, LogsOptions};
use bollard::Docker;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

use crate::bot::fanout::Broadcaster;
use crate::console::rcon::GameConsole;
use crate::container::control::DockerControl;
use crate::telegram::keyboards;

use super::classifier::{classify, death_title_commands, LogEvent};

/// Wait this long before re-checking a stopped container.
const STOPPED_POLL_DELAY: Duration = Duration::from_secs(10);
/// Fixed backoff after a stream error or end-of-stream.
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct LogWatcher {
    docker: Docker,
    container_name: String,
    control: Arc<DockerControl>,
    console: Arc<dyn GameConsole>,
    notifier: Arc<Broadcaster>,
}

impl LogWatcher {
    pub fn new(
        container_name: String,
        control: Arc<DockerControl>,
        console: Arc<dyn GameConsole>,
        notifier: Arc<Broadcaster>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self {
            docker,
            container_name,
            control,
            console,
            notifier,
        })
    }

    pub async fn run(self) {
        tracing::info!("Log monitor started");

        loop {
            if !self.control.is_running().await {
                tokio::time::sleep(STOPPED_POLL_DELAY).await;
                continue;
            }

            // Stream new lines only: start from the container's own start
            // timestamp with no tail replay.
            let since = self.control.started_at().await.unwrap_or(0);
            let log_opts = LogsOptions::<String> {
                follow: true,
                stdout: true,
                stderr: true,
                since,
                timestamps: false,
                tail: "0".to_string(),
                ..Default::default()
            };

            let mut log_stream = self.docker.logs(&self.container_name, Some(log_opts));
            tracing::info!("Following logs for container {}", self.container_name);

            while let Some(result) = log_stream.next().await {
                match result {
                    Ok(log_output) => {
                        let message_bytes = match log_output {
                            LogOutput::StdOut { message }
                            | LogOutput::StdErr { message }
                            | LogOutput::Console { message }
                            | LogOutput::StdIn { message } => message,
                        };

                        let message = String::from_utf8_lossy(&message_bytes);
                        for line in message.lines() {
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }
                            for event in classify(line) {
                                apply_event(&event, self.console.as_ref(), &self.notifier).await;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Log stream error: {}", e);
                        break;
                    }
                }
            }

            tracing::info!("Log stream ended, retrying");
            tokio::time::sleep(RETRY_DELAY).await;
        }
    }
}

/// Turn one classified event into its notification (and, for deaths, its
/// on-screen console side effects).
pub async fn apply_event(event: &LogEvent, console: &dyn GameConsole, notifier: &Broadcaster) {
    match event {
        LogEvent::Joined { player } => {
            notifier
                .broadcast(&format!("🟢 *Player Joined!*\n👤 `{}`", player), None)
                .await;
        }

        LogEvent::Chat { player, message } => {
            notifier
                .broadcast(&format!("💬 *{}:* {}", player, message), None)
                .await;
        }

        LogEvent::Death { text } => {
            for cmd in death_title_commands(text) {
                console.execute(&cmd).await;
            }
            notifier
                .broadcast(&format!("💀 *Death:* {}", text), None)
                .await;
        }

        LogEvent::WhitelistBlocked { player } => {
            notifier
                .broadcast(
                    &format!("🚨 *Blocked Connection!*\n👤 `{}` tried to join.", player),
                    Some(keyboards::quick_add_keyboard(player)),
                )
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::telegram::api::InlineKeyboardMarkup;
    use crate::telegram::client::ChatApi;

    #[derive(Default)]
    struct RecordingChat {
        sent: Mutex<Vec<(i64, String, bool)>>,
    }

    #[async_trait]
    impl ChatApi for RecordingChat {
        async fn send_message(
            &self,
            chat_id: i64,
            text: &str,
            keyboard: Option<InlineKeyboardMarkup>,
        ) {
            self.sent
                .lock()
                .unwrap()
                .push((chat_id, text.to_string(), keyboard.is_some()));
        }

        async fn edit_message(
            &self,
            _chat_id: i64,
            _message_id: i64,
            _text: &str,
            _keyboard: Option<InlineKeyboardMarkup>,
        ) {
        }

        async fn answer_callback(&self, _callback_id: &str, _text: &str) {}
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

    #[tokio::test]
    async fn death_issues_two_console_commands_and_one_broadcast() {
        let chat = Arc::new(RecordingChat::default());
        let console = RecordingConsole::default();
        let notifier = Broadcaster::new(chat.clone(), vec![100]);

        let event = LogEvent::Death {
            text: "Steve was slain by Zombie".to_string(),
        };
        apply_event(&event, &console, &notifier).await;

        let commands = console.commands.lock().unwrap();
        assert_eq!(commands.len(), 2);
        assert!(commands[0].contains("title @a title"));
        assert!(commands[1].contains("subtitle"));

        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].1.contains("Steve was slain by Zombie"));
    }

    #[tokio::test]
    async fn join_fans_out_to_every_recipient() {
        let chat = Arc::new(RecordingChat::default());
        let console = RecordingConsole::default();
        let notifier = Broadcaster::new(chat.clone(), vec![100, 200, 300]);

        let event = LogEvent::Joined {
            player: "Alex".to_string(),
        };
        apply_event(&event, &console, &notifier).await;

        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|(_, text, _)| text.contains("Alex")));
        assert!(console.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn whitelist_block_carries_quick_add_keyboard() {
        let chat = Arc::new(RecordingChat::default());
        let console = RecordingConsole::default();
        let notifier = Broadcaster::new(chat.clone(), vec![100]);

        let event = LogEvent::WhitelistBlocked {
            player: "NewPlayer".to_string(),
        };
        apply_event(&event, &console, &notifier).await;

        let sent = chat.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].2, "expected an attached keyboard");
    }
}
