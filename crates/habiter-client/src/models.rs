//! Wire types for the small slice of the REST API the client talks to.

use chrono::{DateTime, Utc};
use habiter_common::Snowflake;
use serde::{Deserialize, Serialize};

// ── Users ─────────────────────────────────────────────────────────────────────

/// A user as embedded in channel and message payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartialUser {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

// ── Channels ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelType(pub u8);

impl ChannelType {
    pub const DM: Self = Self(1);
    pub const GROUP_DM: Self = Self(3);
}

/// A DM or group DM channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivateChannel {
    pub id: Snowflake,
    #[serde(rename = "type")]
    pub kind: ChannelType,
    #[serde(default)]
    pub recipients: Vec<PartialUser>,
    #[serde(default)]
    pub last_message_id: Option<Snowflake>,
}

impl PrivateChannel {
    /// The other participant of a 1:1 DM. `None` for group DMs.
    pub fn recipient(&self) -> Option<&PartialUser> {
        if self.kind == ChannelType::DM {
            self.recipients.first()
        } else {
            None
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub content: String,
    pub author: PartialUser,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub tts: bool,
}

/// Body of `POST /channels/{id}/messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl CreateMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tts(mut self) -> Self {
        self.tts = true;
        self
    }

    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }
}
