use serde::{Deserialize, Serialize};

use crate::{GuildId, MemberId};

/// The member who triggered a command, as reported by the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionActor {
    guild_id: GuildId,
    member_id: MemberId,
    channel_id: String,
}

impl InteractionActor {
    /// Creates an actor from interaction context.
    #[must_use]
    pub fn new(guild_id: GuildId, member_id: MemberId, channel_id: impl Into<String>) -> Self {
        Self {
            guild_id,
            member_id,
            channel_id: channel_id.into(),
        }
    }

    /// Returns the guild the command ran in.
    #[must_use]
    pub fn guild_id(&self) -> &GuildId {
        &self.guild_id
    }

    /// Returns the invoking member.
    #[must_use]
    pub fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    /// Returns the channel the command was invoked from.
    #[must_use]
    pub fn channel_id(&self) -> &str {
        self.channel_id.as_str()
    }
}
