//! Connection state: the session-wide transport handle and private channel cache.

use std::collections::HashMap;
use std::sync::Arc;

use habiter_common::Snowflake;
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::Result;
use crate::http::Transport;
use crate::models::PrivateChannel;

/// Shared by every object bound to the same session.
///
/// Objects hold it weakly; whoever owns the session owns the `Arc`.
pub struct ConnectionState {
    http: Arc<dyn Transport>,
    max_private_channels: usize,
    private_channels: RwLock<PrivateChannels>,
}

#[derive(Default)]
struct PrivateChannels {
    /// Channel id → channel, oldest first.
    by_id: IndexMap<Snowflake, PrivateChannel>,
    /// Recipient user id → DM channel id.
    by_user: HashMap<Snowflake, Snowflake>,
}

impl ConnectionState {
    pub fn new(http: Arc<dyn Transport>, max_private_channels: usize) -> Self {
        Self {
            http,
            max_private_channels: max_private_channels.max(1),
            private_channels: RwLock::new(PrivateChannels::default()),
        }
    }

    pub fn http(&self) -> &Arc<dyn Transport> {
        &self.http
    }

    /// Cached DM channel with `user_id`, if one has been seen.
    pub fn private_channel_by_user(&self, user_id: Snowflake) -> Option<PrivateChannel> {
        let cache = self.private_channels.read();
        cache
            .by_user
            .get(&user_id)
            .and_then(|channel_id| cache.by_id.get(channel_id))
            .cloned()
    }

    pub fn private_channel(&self, channel_id: Snowflake) -> Option<PrivateChannel> {
        self.private_channels.read().by_id.get(&channel_id).cloned()
    }

    /// Snapshot of every cached private channel, oldest first.
    pub fn private_channels(&self) -> Vec<PrivateChannel> {
        self.private_channels.read().by_id.values().cloned().collect()
    }

    /// Register a channel. Re-adding a cached channel replaces it in place.
    /// Past capacity the oldest channel is evicted along with its user index.
    pub fn add_private_channel(&self, channel: PrivateChannel) -> PrivateChannel {
        let mut cache = self.private_channels.write();

        if let Some(user) = channel.recipient() {
            cache.by_user.insert(user.id, channel.id);
        }
        trace!(channel_id = %channel.id, "caching private channel");
        cache.by_id.insert(channel.id, channel.clone());

        while cache.by_id.len() > self.max_private_channels {
            let Some((evicted_id, evicted)) = cache.by_id.shift_remove_index(0) else {
                break;
            };
            if let Some(user) = evicted.recipient() {
                if cache.by_user.get(&user.id) == Some(&evicted_id) {
                    cache.by_user.remove(&user.id);
                }
            }
            debug!(channel_id = %evicted_id, "evicted private channel");
        }

        channel
    }

    /// Register a channel from a raw API payload.
    pub fn add_dm_channel(&self, data: Value) -> Result<PrivateChannel> {
        let channel: PrivateChannel = serde_json::from_value(data)?;
        Ok(self.add_private_channel(channel))
    }

    /// Drop a channel, e.g. after the platform reports it deleted.
    pub fn remove_private_channel(&self, channel_id: Snowflake) -> Option<PrivateChannel> {
        let mut cache = self.private_channels.write();
        let removed = cache.by_id.shift_remove(&channel_id)?;
        if let Some(user) = removed.recipient() {
            if cache.by_user.get(&user.id) == Some(&channel_id) {
                cache.by_user.remove(&user.id);
            }
        }
        Some(removed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::HabiterError;
    use crate::models::{ChannelType, CreateMessage, Message, PartialUser};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Offset between a test user's id and its DM channel's id.
    pub(crate) const CHANNEL_OFFSET: u64 = 1_000_000;

    pub(crate) fn dm(user_id: u64) -> PrivateChannel {
        PrivateChannel {
            id: Snowflake::new(user_id + CHANNEL_OFFSET),
            kind: ChannelType::DM,
            recipients: vec![PartialUser {
                id: Snowflake::new(user_id),
                username: format!("user{user_id}"),
                discriminator: None,
                avatar: None,
                bot: false,
            }],
            last_message_id: None,
        }
    }

    /// Transport that answers from memory and counts calls.
    #[derive(Default)]
    pub(crate) struct MockTransport {
        pub(crate) dm_calls: AtomicUsize,
        pub(crate) sent: parking_lot::Mutex<Vec<(Snowflake, CreateMessage)>>,
        pub(crate) fail_with_status: Option<u16>,
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn start_private_message(&self, user_id: Snowflake) -> Result<PrivateChannel> {
            self.dm_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(status) = self.fail_with_status {
                return Err(HabiterError::Api { status, message: "Cannot send messages to this user".into() });
            }
            Ok(dm(user_id.get()))
        }

        async fn create_message(&self, channel_id: Snowflake, message: &CreateMessage) -> Result<Message> {
            self.sent.lock().push((channel_id, message.clone()));
            Ok(Message {
                id: Snowflake::new(42),
                channel_id,
                content: message.content.clone().unwrap_or_default(),
                author: dm(1).recipients[0].clone(),
                timestamp: Snowflake::new(42).created_at(),
                tts: message.tts,
            })
        }
    }

    fn state(capacity: usize) -> ConnectionState {
        ConnectionState::new(Arc::new(MockTransport::default()), capacity)
    }

    #[test]
    fn test_lookup_by_user() {
        let state = state(8);
        assert!(state.private_channel_by_user(Snowflake::new(5)).is_none());

        state.add_private_channel(dm(5));
        let found = state.private_channel_by_user(Snowflake::new(5)).unwrap();
        assert_eq!(found.id.get(), 5 + CHANNEL_OFFSET);
        assert_eq!(state.private_channel(found.id), Some(found));
    }

    #[test]
    fn test_re_adding_is_idempotent() {
        let state = state(8);
        state.add_private_channel(dm(5));
        state.add_private_channel(dm(5));
        assert_eq!(state.private_channels().len(), 1);
    }

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let state = state(2);
        state.add_private_channel(dm(1));
        state.add_private_channel(dm(2));
        state.add_private_channel(dm(3));

        assert!(state.private_channel_by_user(Snowflake::new(1)).is_none());
        assert!(state.private_channel_by_user(Snowflake::new(2)).is_some());
        assert!(state.private_channel_by_user(Snowflake::new(3)).is_some());
        let ids: Vec<u64> = state.private_channels().iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![2 + CHANNEL_OFFSET, 3 + CHANNEL_OFFSET]);
    }

    #[test]
    fn test_group_dm_not_indexed_by_user() {
        let state = state(8);
        let mut group = dm(7);
        group.kind = ChannelType::GROUP_DM;
        state.add_private_channel(group.clone());
        assert!(state.private_channel_by_user(Snowflake::new(7)).is_none());
        assert_eq!(state.private_channel(group.id), Some(group));
    }

    #[test]
    fn test_add_dm_channel_from_payload() {
        let state = state(8);
        let channel = state
            .add_dm_channel(json!({
                "id": "900",
                "type": 1,
                "recipients": [{ "id": "9", "username": "nine" }]
            }))
            .unwrap();
        assert_eq!(state.private_channel_by_user(Snowflake::new(9)), Some(channel));
    }

    #[test]
    fn test_add_dm_channel_rejects_bad_payload() {
        let state = state(8);
        let err = state.add_dm_channel(json!({ "id": "not a number", "type": 1 })).unwrap_err();
        assert!(matches!(err, HabiterError::Json(_)));
    }

    #[test]
    fn test_remove_clears_user_index() {
        let state = state(8);
        let channel = state.add_private_channel(dm(5));
        assert_eq!(state.remove_private_channel(channel.id), Some(channel));
        assert!(state.private_channel_by_user(Snowflake::new(5)).is_none());
        assert!(state.remove_private_channel(Snowflake::new(5)).is_none());
    }
}
