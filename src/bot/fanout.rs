//! Notification fan-out to every authorized recipient

use std::sync::Arc;

use crate::telegram::api::InlineKeyboardMarkup;
use crate::telegram::client::ChatApi;

pub struct Broadcaster {
    chat: Arc<dyn ChatApi>,
    recipients: Vec<i64>,
}

impl Broadcaster {
    pub fn new(chat: Arc<dyn ChatApi>, recipients: Vec<i64>) -> Self {
        Self { chat, recipients }
    }

    /// Send to every recipient. Individual send failures are handled (and
    /// logged) by the transport; one bad recipient never blocks the rest.
    pub async fn broadcast(&self, text: &str, keyboard: Option<InlineKeyboardMarkup>) {
        for &chat_id in &self.recipients {
            self.chat
                .send_message(chat_id, text, keyboard.clone())
                .await;
        }
    }
}
