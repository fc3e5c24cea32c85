use std::sync::Arc;

use serenity::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use tokio::sync::Mutex;

use crate::error::DeliveryError;

/// Discord rejects messages longer than this many characters.
pub const MESSAGE_LIMIT: usize = 2000;

/// Outbound side of the chat platform, bound to a single channel.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn connect(&self) -> Result<(), DeliveryError>;
    async fn send_message(&self, content: &str) -> Result<(), DeliveryError>;
    async fn disconnect(&self);
}

pub struct DiscordClient {
    token: String,
    channel: ChannelId,
    http: Mutex<Option<Arc<Http>>>,
}

impl DiscordClient {
    /// `channel_id` must be non-zero.
    pub fn new(token: String, channel_id: u64) -> Self {
        Self {
            token,
            channel: ChannelId::new(channel_id),
            http: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ChatClient for DiscordClient {
    async fn connect(&self) -> Result<(), DeliveryError> {
        let http = Arc::new(Http::new(&self.token));
        let user = http
            .get_current_user()
            .await
            .map_err(|e| DeliveryError::Discord(format!("login failed: {e}")))?;
        http.get_channel(self.channel)
            .await
            .map_err(|e| DeliveryError::InvalidChannel(format!("{}: {e}", self.channel)))?;
        tracing::info!("Logged in as {}", user.name);
        *self.http.lock().await = Some(http);
        Ok(())
    }

    async fn send_message(&self, content: &str) -> Result<(), DeliveryError> {
        let http = self
            .http
            .lock()
            .await
            .clone()
            .ok_or(DeliveryError::NotConnected)?;
        for chunk in split_message(content, MESSAGE_LIMIT) {
            self.channel
                .say(http.as_ref(), chunk)
                .await
                .map_err(|e| DeliveryError::Discord(format!("Error sending message: {e}")))?;
        }
        Ok(())
    }

    async fn disconnect(&self) {
        if self.http.lock().await.take().is_some() {
            tracing::info!("Disconnected from Discord");
        }
    }
}

/// Splits `content` into pieces of at most `limit` characters, preferring
/// line boundaries.
pub fn split_message(content: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in content.split('\n') {
        let mut pieces: Vec<String> = Vec::new();
        let chars: Vec<char> = line.chars().collect();
        if chars.len() > limit {
            pieces.extend(chars.chunks(limit).map(|c| c.iter().collect()));
        } else {
            pieces.push(line.to_string());
        }

        for piece in pieces {
            let piece_len = piece.chars().count();
            let needed = if current_len == 0 { piece_len } else { current_len + 1 + piece_len };
            if needed > limit && current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push('\n');
                current_len += 1;
            }
            current.push_str(&piece);
            current_len += piece_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
