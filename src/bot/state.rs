//! Mutable bot state shared across handler invocations
//!
//! The only two pieces of state that outlive a single update: the
//! per-recipient session map and the global chat-relay toggle. Owned by
//! the dispatcher and passed by reference so the state machine's
//! transitions stay auditable.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
struct Session {
    awaiting_broadcast: bool,
}

#[derive(Debug)]
pub struct BotState {
    sessions: DashMap<i64, Session>,
    chat_relay: AtomicBool,
}

impl BotState {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            // Relay defaults ON
            chat_relay: AtomicBool::new(true),
        }
    }

    pub fn chat_relay_enabled(&self) -> bool {
        self.chat_relay.load(Ordering::Relaxed)
    }

    /// Flip the relay flag, returning the new value.
    pub fn toggle_chat_relay(&self) -> bool {
        !self.chat_relay.fetch_xor(true, Ordering::Relaxed)
    }

    /// Arm broadcast mode: the recipient's next free-text message is
    /// consumed as the broadcast payload.
    pub fn arm_broadcast(&self, chat_id: i64) {
        self.sessions.entry(chat_id).or_default().awaiting_broadcast = true;
    }

    /// Consume the armed flag. Returns true exactly once per arm.
    pub fn take_broadcast(&self, chat_id: i64) -> bool {
        match self.sessions.get_mut(&chat_id) {
            Some(mut session) if session.awaiting_broadcast => {
                session.awaiting_broadcast = false;
                true
            }
            _ => false,
        }
    }

    pub fn awaiting_broadcast(&self, chat_id: i64) -> bool {
        self.sessions
            .get(&chat_id)
            .map(|s| s.awaiting_broadcast)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_flag_is_consumed_once() {
        let state = BotState::new();
        assert!(!state.take_broadcast(1));

        state.arm_broadcast(1);
        assert!(state.awaiting_broadcast(1));
        assert!(state.take_broadcast(1));
        assert!(!state.take_broadcast(1));
        assert!(!state.awaiting_broadcast(1));
    }

    #[test]
    fn sessions_are_per_recipient() {
        let state = BotState::new();
        state.arm_broadcast(1);
        assert!(!state.take_broadcast(2));
        assert!(state.take_broadcast(1));
    }

    #[test]
    fn chat_relay_toggles() {
        let state = BotState::new();
        assert!(state.chat_relay_enabled());
        assert!(!state.toggle_chat_relay());
        assert!(!state.chat_relay_enabled());
        assert!(state.toggle_chat_relay());
    }
}
