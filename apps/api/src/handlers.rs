use rankbind_core::{AppResult, GuildId, InteractionActor, MemberId};

pub mod binding;
pub mod health;
pub mod setup;
pub mod sync;


/// Rebuilds the chat-interaction caller context forwarded by the gateway.
fn interaction_actor(
    guild_id: String,
    requester_id: String,
    channel_id: String,
) -> AppResult<InteractionActor> {
    Ok(InteractionActor::new(
        GuildId::new(guild_id)?,
        MemberId::new(requester_id)?,
        channel_id,
    ))
}
