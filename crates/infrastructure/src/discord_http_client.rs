//! Discord REST client for member role management and operator review posts.

use std::collections::BTreeSet;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use rankbind_application::{
    ChatPlatformClient, GuildMemberSnapshot, OperatorNotifier, SetupNotification,
};
use rankbind_core::{AppError, AppResult, GuildId, MemberId};
use rankbind_domain::{PendingKind, RoleId};

const AUDIT_LOG_REASON_HEADER: &str = "X-Audit-Log-Reason";
const CONFIRM_BUTTON_STYLE_SUCCESS: u8 = 3;

/// Bot-token authenticated Discord client.
#[derive(Clone)]
pub struct DiscordHttpClient {
    http_client: reqwest::Client,
    api_base_url: String,
    bot_token: String,
    review_channel_id: Option<String>,
}

impl DiscordHttpClient {
    /// Creates a client for the given API base URL and bot token.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        api_base_url: impl Into<String>,
        bot_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_owned(),
            bot_token: bot_token.into(),
            review_channel_id: None,
        }
    }

    /// Sets the channel that receives setup review requests.
    #[must_use]
    pub fn with_review_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.review_channel_id = Some(channel_id.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http_client
            .request(method, format!("{}{path}", self.api_base_url))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bot {}", self.bot_token),
            )
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> AppResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|error| AppError::Unavailable(format!("failed to {what}: {error}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        Err(status_error(status, what, body.as_str()))
    }

    async fn change_role(
        &self,
        method: reqwest::Method,
        guild_id: &GuildId,
        member_id: &MemberId,
        role_id: &RoleId,
        reason: &str,
        what: &str,
    ) -> AppResult<()> {
        let path = format!("/guilds/{guild_id}/members/{member_id}/roles/{role_id}");
        self.send(
            self.request(method, path.as_str())
                .header(AUDIT_LOG_REASON_HEADER, reason),
            what,
        )
        .await?;

        Ok(())
    }
}

fn status_error(status: StatusCode, what: &str, body: &str) -> AppError {
    match status {
        StatusCode::FORBIDDEN => AppError::Forbidden(format!(
            "discord denied permission to {what}: {body}"
        )),
        StatusCode::NOT_FOUND => AppError::NotFound(format!("discord could not {what}: {body}")),
        _ => AppError::Unavailable(format!(
            "discord returned status {status} while trying to {what}: {body}"
        )),
    }
}

#[derive(Debug, Deserialize)]
struct MemberResponse {
    user: MemberUser,
    #[serde(default)]
    nick: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MemberUser {
    id: String,
}

fn member_snapshot(response: MemberResponse) -> AppResult<GuildMemberSnapshot> {
    let role_ids = response
        .roles
        .into_iter()
        .map(RoleId::new)
        .collect::<AppResult<BTreeSet<_>>>()?;

    Ok(GuildMemberSnapshot {
        member_id: MemberId::new(response.user.id)?,
        role_ids,
        nickname: response.nick,
    })
}

fn review_message(notification: &SetupNotification) -> Value {
    let request = &notification.request;
    let title = match notification.kind {
        PendingKind::Setup => "New group setup request",
        PendingKind::Transfer => "Group transfer request",
    };

    json!({
        "embeds": [{
            "title": title,
            "fields": [
                { "name": "Guild", "value": notification.guild_id.as_str(), "inline": true },
                { "name": "Group", "value": request.group_id().as_str(), "inline": true },
                { "name": "Requested by", "value": format!("<@{}>", request.owner_id()), "inline": true },
                { "name": "Premium key", "value": request.premium_key().unwrap_or("none") },
                { "name": "Channel", "value": format!("<#{}>", request.invoking_channel_id()) },
            ],
            "timestamp": request.requested_at().to_rfc3339(),
        }],
        "components": [{
            "type": 1,
            "components": [{
                "type": 2,
                "style": CONFIRM_BUTTON_STYLE_SUCCESS,
                "label": "Confirm",
                "custom_id": notification.confirmation_id,
            }],
        }],
    })
}

#[async_trait]
impl ChatPlatformClient for DiscordHttpClient {
    async fn fetch_member(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
    ) -> AppResult<Option<GuildMemberSnapshot>> {
        let path = format!("/guilds/{guild_id}/members/{member_id}");
        let response = self
            .request(reqwest::Method::GET, path.as_str())
            .send()
            .await
            .map_err(|error| AppError::Unavailable(format!("failed to fetch member: {error}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(status_error(status, "fetch member", body.as_str()));
        }

        let member = response
            .json::<MemberResponse>()
            .await
            .map_err(|error| AppError::Internal(format!("failed to decode member: {error}")))?;

        member_snapshot(member).map(Some)
    }

    async fn add_roles(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
        role_ids: &[RoleId],
        reason: &str,
    ) -> AppResult<()> {
        for role_id in role_ids {
            self.change_role(
                reqwest::Method::PUT,
                guild_id,
                member_id,
                role_id,
                reason,
                "add member role",
            )
            .await?;
        }

        Ok(())
    }

    async fn remove_roles(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
        role_ids: &[RoleId],
        reason: &str,
    ) -> AppResult<()> {
        for role_id in role_ids {
            self.change_role(
                reqwest::Method::DELETE,
                guild_id,
                member_id,
                role_id,
                reason,
                "remove member role",
            )
            .await?;
        }

        Ok(())
    }

    async fn set_nickname(
        &self,
        guild_id: &GuildId,
        member_id: &MemberId,
        nickname: &str,
        reason: &str,
    ) -> AppResult<()> {
        let path = format!("/guilds/{guild_id}/members/{member_id}");
        self.send(
            self.request(reqwest::Method::PATCH, path.as_str())
                .header(AUDIT_LOG_REASON_HEADER, reason)
                .json(&json!({ "nick": nickname })),
            "set member nickname",
        )
        .await?;

        Ok(())
    }
}

#[async_trait]
impl OperatorNotifier for DiscordHttpClient {
    async fn notify_request_filed(&self, notification: SetupNotification) -> AppResult<()> {
        let Some(channel_id) = self.review_channel_id.as_deref() else {
            return Err(AppError::Unavailable(
                "no operator review channel is configured".to_owned(),
            ));
        };

        let path = format!("/channels/{channel_id}/messages");
        self.send(
            self.request(reqwest::Method::POST, path.as_str())
                .json(&review_message(&notification)),
            "post review request",
        )
        .await?;

        Ok(())
    }
}
