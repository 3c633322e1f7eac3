use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::{
    models::{ChatMessage, Sender},
    service::DocumentService,
};

pub const GREETING: &str = "Hi! How can I help you?";

/// Key that submits the input buffer, same as clicking send
pub const COMMIT_KEY: &str = "Enter";

#[derive(Debug, Default)]
struct ChatState {
    transcript: Vec<ChatMessage>,
    input: String,
    last_error: Option<String>,
}

/// Chat box talking to the document service's message endpoint
pub struct ChatWidget {
    service: Arc<dyn DocumentService>,
    state: RwLock<ChatState>,
}

impl ChatWidget {
    /// A widget whose transcript starts with the bot greeting
    pub fn new(service: Arc<dyn DocumentService>) -> Self {
        Self {
            service,
            state: RwLock::new(ChatState {
                transcript: vec![ChatMessage::bot(GREETING)],
                ..Default::default()
            }),
        }
    }

    pub async fn set_input(&self, text: impl Into<String>) {
        self.state.write().await.input = text.into();
    }

    pub async fn input(&self) -> String {
        self.state.read().await.input.clone()
    }

    /// Submit the input buffer when `key` is the commit key
    pub async fn on_key(&self, key: &str) -> bool {
        if key != COMMIT_KEY {
            return false;
        }
        self.submit().await;
        true
    }

    /// Send whatever is in the input buffer
    pub async fn submit(&self) {
        let text = self.input().await;
        self.send_message(&text).await;
    }

    /// Append the user's message, then the bot's reply once it arrives.
    ///
    /// Blank text is ignored. A failed request is logged and leaves the
    /// transcript without a reply; the error is kept in [`ChatWidget::last_error`]
    /// until the next call.
    pub async fn send_message(&self, text: &str) {
        let mut state = self.state.write().await;
        state.last_error = None;
        if text.trim().is_empty() {
            return;
        }
        state.transcript.push(ChatMessage::user(text));
        state.input.clear();
        drop(state);

        match self.service.send_message(text).await {
            Ok(reply) => {
                info!("Bot replied ({} characters)", reply.len());
                self.state
                    .write()
                    .await
                    .transcript
                    .push(ChatMessage::bot(reply));
            }
            Err(e) => {
                error!("Chat message failed: {}", e);
                self.state.write().await.last_error = Some(e.to_string());
            }
        }
    }

    /// Oldest first
    pub async fn transcript(&self) -> Vec<ChatMessage> {
        self.state.read().await.transcript.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    pub async fn count_from(&self, sender: Sender) -> usize {
        self.state
            .read()
            .await
            .transcript
            .iter()
            .filter(|message| message.sender == sender)
            .count()
    }
}
