//! Bare object references.
//!
//! An [`Object`] stands in for a full entity when only its id is known: an
//! event arrived before the entity it refers to, or the application stored
//! nothing but the id. Most calls that take an entity only need the id, so a
//! bare object is enough.
//!
//! Bound to a [`ConnectionState`] with [`ObjectKind::USER`], an object becomes
//! [`Messageable`](crate::Messageable): sending to it opens (or reuses) the DM
//! channel with that user.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use habiter_common::{InvalidIdentifier, Snowflake};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HabiterError, Result};
use crate::models::PrivateChannel;
use crate::state::ConnectionState;

/// What a bound object refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectKind(pub u8);

impl ObjectKind {
    pub const USER: Self = Self(1);
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::USER => f.write_str("User"),
            Self(other) => write!(f, "Unknown({other})"),
        }
    }
}

/// A reference to a platform entity by id alone.
///
/// Equality and hashing look only at the id, so a bound and an unbound
/// object for the same entity compare equal.
#[derive(Clone)]
pub struct Object {
    id: Snowflake,
    binding: Option<Binding>,
}

#[derive(Clone)]
struct Binding {
    /// Never upgraded for longer than a single call.
    state: Weak<ConnectionState>,
    kind: ObjectKind,
}

impl Object {
    /// Unbound object. Fails only if `id` is not an integer.
    pub fn new<I>(id: I) -> std::result::Result<Self, InvalidIdentifier>
    where
        I: TryInto<Snowflake>,
        InvalidIdentifier: From<I::Error>,
    {
        Ok(Self { id: id.try_into()?, binding: None })
    }

    /// Object bound to `state`. The state is not inspected here; a dead
    /// state only surfaces when a messaging operation runs.
    pub fn bound<I>(
        id: I,
        state: &Arc<ConnectionState>,
        kind: ObjectKind,
    ) -> std::result::Result<Self, InvalidIdentifier>
    where
        I: TryInto<Snowflake>,
        InvalidIdentifier: From<I::Error>,
    {
        Ok(Self {
            id: id.try_into()?,
            binding: Some(Binding { state: Arc::downgrade(state), kind }),
        })
    }

    pub fn id(&self) -> Snowflake {
        self.id
    }

    /// `None` for unbound objects.
    pub fn kind(&self) -> Option<ObjectKind> {
        self.binding.as_ref().map(|b| b.kind)
    }

    /// When the entity was created, decoded from the id.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.id.created_at()
    }

    /// The connection state, if the object is bound and the state still lives.
    pub(crate) fn state(&self) -> Result<Arc<ConnectionState>> {
        self.binding
            .as_ref()
            .and_then(|b| b.state.upgrade())
            .ok_or(HabiterError::NotConnected)
    }

    /// Cached DM channel with this user. Reads the session cache on every
    /// call; `None` when nothing is cached or the object has no live state.
    pub fn private_channel(&self) -> Option<PrivateChannel> {
        self.state().ok()?.private_channel_by_user(self.id)
    }

    /// The DM channel with this user, opened over REST if not cached.
    ///
    /// Transport errors are returned as-is. Concurrent callers may both reach
    /// the transport; registering the same channel twice is harmless.
    pub async fn create_dm(&self) -> Result<PrivateChannel> {
        let state = self.state()?;
        if let Some(found) = state.private_channel_by_user(self.id) {
            return Ok(found);
        }

        debug!(user_id = %self.id, "opening DM channel");
        let channel = state.http().start_private_message(self.id).await?;
        Ok(state.add_private_channel(channel))
    }
}

impl From<Snowflake> for Object {
    fn from(id: Snowflake) -> Self {
        Self { id, binding: None }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Object {}

impl Hash for Object {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "<Object id={} type={kind}>", self.id),
            None => write!(f, "<Object id={}>", self.id),
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}
