//! The capability to receive messages.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{HabiterError, Result};
use crate::http::Transport;
use crate::models::{CreateMessage, Message, PrivateChannel};
use crate::object::{Object, ObjectKind};

/// Anything messages can be sent to.
///
/// Generic send logic only needs two things from a destination: the channel
/// to post into and a transport to post with.
#[async_trait]
pub trait Messageable: Send + Sync {
    /// The channel messages to `self` go to.
    async fn resolve_destination(&self) -> Result<PrivateChannel>;

    fn transport(&self) -> Result<Arc<dyn Transport>>;

    async fn send(&self, message: &CreateMessage) -> Result<Message> {
        let channel = self.resolve_destination().await?;
        self.transport()?.create_message(channel.id, message).await
    }
}

#[async_trait]
impl Messageable for Object {
    /// Only bound user objects resolve; they resolve to their DM channel.
    async fn resolve_destination(&self) -> Result<PrivateChannel> {
        match self.kind() {
            Some(ObjectKind::USER) => self.create_dm().await,
            kind => Err(HabiterError::UnsupportedDestination { kind }),
        }
    }

    fn transport(&self) -> Result<Arc<dyn Transport>> {
        Ok(Arc::clone(self.state()?.http()))
    }
}
