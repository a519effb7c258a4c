//! Roblox web API client for group and user lookups.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use rankbind_application::GroupPlatformClient;
use rankbind_core::{AppError, AppResult};
use rankbind_domain::{ExternalUserId, GroupId, GroupRank, GroupRole, GroupRoleId, GroupSummary};

/// HTTP implementation of the group platform port.
///
/// Requests are never retried; callers surface failures for manual retry.
#[derive(Clone)]
pub struct RobloxHttpClient {
    http_client: reqwest::Client,
    groups_base_url: String,
    users_base_url: String,
    cookie: Option<String>,
}

impl RobloxHttpClient {
    /// Creates a client for the given API hosts.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        groups_base_url: impl Into<String>,
        users_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            groups_base_url: groups_base_url.into().trim_end_matches('/').to_owned(),
            users_base_url: users_base_url.into().trim_end_matches('/').to_owned(),
            cookie: None,
        }
    }

    /// Authenticates requests with a `.ROBLOSECURITY` cookie.
    #[must_use]
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.cookie = Some(cookie.into());
        self
    }

    fn authenticate(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.cookie {
            Some(cookie) => {
                builder.header(reqwest::header::COOKIE, format!(".ROBLOSECURITY={cookie}"))
            }
            None => builder,
        }
    }

    /// Sends a request and decodes a JSON body. `None` for 400 and 404.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> AppResult<Option<T>> {
        let response = self
            .authenticate(builder)
            .send()
            .await
            .map_err(|error| AppError::Unavailable(format!("failed to fetch {what}: {error}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Unavailable(format!(
                "roblox api returned status {status} for {what}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|error| AppError::Internal(format!("failed to decode {what}: {error}")))
    }
}

#[derive(Debug, Deserialize)]
struct GroupResponse {
    name: String,
    owner: Option<GroupOwner>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupOwner {
    user_id: u64,
}

#[derive(Debug, Deserialize)]
struct UsernamesResponse {
    data: Vec<UsernameMatch>,
}

#[derive(Debug, Deserialize)]
struct UsernameMatch {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct UserGroupRolesResponse {
    data: Vec<UserGroupRole>,
}

#[derive(Debug, Deserialize)]
struct UserGroupRole {
    group: UserGroupRef,
    role: CatalogRole,
}

#[derive(Debug, Deserialize)]
struct UserGroupRef {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct GroupRolesResponse {
    roles: Vec<CatalogRole>,
}

#[derive(Debug, Deserialize)]
struct CatalogRole {
    id: u64,
    name: String,
    rank: u16,
}

fn to_rank(rank: u16) -> AppResult<GroupRank> {
    u8::try_from(rank)
        .map(GroupRank::new)
        .map_err(|_| AppError::Internal(format!("group rank {rank} is out of range")))
}

fn group_summary(group_id: &GroupId, response: GroupResponse) -> GroupSummary {
    GroupSummary {
        group_id: group_id.clone(),
        name: response.name,
        owner_id: response.owner.map(|owner| ExternalUserId::new(owner.user_id)),
    }
}

fn rank_for_group(group_id: &GroupId, response: UserGroupRolesResponse) -> AppResult<GroupRank> {
    match response
        .data
        .into_iter()
        .find(|membership| membership.group.id == group_id.get())
    {
        Some(membership) => to_rank(membership.role.rank),
        None => Ok(GroupRank::GUEST),
    }
}

fn catalog(response: GroupRolesResponse) -> AppResult<Vec<GroupRole>> {
    response
        .roles
        .into_iter()
        .map(|role| {
            Ok(GroupRole {
                id: GroupRoleId::new(role.id),
                rank: to_rank(role.rank)?,
                name: role.name,
            })
        })
        .collect()
}

#[async_trait]
impl GroupPlatformClient for RobloxHttpClient {
    async fn find_group(&self, group_id: &GroupId) -> AppResult<Option<GroupSummary>> {
        let url = format!("{}/v1/groups/{group_id}", self.groups_base_url);
        let response: Option<GroupResponse> = self
            .fetch_json(self.http_client.get(url), "group metadata")
            .await?;

        Ok(response.map(|response| group_summary(group_id, response)))
    }

    async fn find_user_id(&self, username: &str) -> AppResult<Option<ExternalUserId>> {
        let url = format!("{}/v1/usernames/users", self.users_base_url);
        let request = self.http_client.post(url).json(&serde_json::json!({
            "usernames": [username],
            "excludeBannedUsers": false,
        }));
        let response: Option<UsernamesResponse> =
            self.fetch_json(request, "user id lookup").await?;

        Ok(response
            .and_then(|response| response.data.into_iter().next())
            .map(|user| ExternalUserId::new(user.id)))
    }

    async fn rank_in_group(
        &self,
        group_id: &GroupId,
        user_id: ExternalUserId,
    ) -> AppResult<GroupRank> {
        let url = format!(
            "{}/v2/users/{}/groups/roles",
            self.groups_base_url,
            user_id.get()
        );
        let response: Option<UserGroupRolesResponse> = self
            .fetch_json(self.http_client.get(url), "group memberships")
            .await?;

        match response {
            Some(response) => rank_for_group(group_id, response),
            None => Err(AppError::NotFound(format!(
                "user '{}' was not found",
                user_id.get()
            ))),
        }
    }

    async fn list_group_roles(&self, group_id: &GroupId) -> AppResult<Vec<GroupRole>> {
        let url = format!("{}/v1/groups/{group_id}/roles", self.groups_base_url);
        let response: Option<GroupRolesResponse> = self
            .fetch_json(self.http_client.get(url), "group roles")
            .await?;

        match response {
            Some(response) => catalog(response),
            None => Err(AppError::NotFound(format!(
                "group '{group_id}' was not found"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use rankbind_domain::{ExternalUserId, GroupId, GroupRank, GroupRoleId};

    use super::{
        GroupResponse, GroupRolesResponse, UserGroupRolesResponse, catalog, group_summary,
        rank_for_group,
    };

    fn group() -> GroupId {
        GroupId::new("4242").unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn group_owner_is_optional() {
        let owned: Result<GroupResponse, _> = serde_json::from_str(
            r#"{"id":4242,"name":"Builders","owner":{"userId":1001,"username":"OwnerName"},"memberCount":12}"#,
        );
        let ownerless: Result<GroupResponse, _> =
            serde_json::from_str(r#"{"id":4242,"name":"Abandoned","owner":null}"#);
        assert!(owned.is_ok());
        assert!(ownerless.is_ok());

        let owned = group_summary(&group(), owned.unwrap_or_else(|_| unreachable!()));
        let ownerless = group_summary(&group(), ownerless.unwrap_or_else(|_| unreachable!()));

        assert_eq!(owned.owner_id, Some(ExternalUserId::new(1001)));
        assert_eq!(owned.name, "Builders");
        assert_eq!(ownerless.owner_id, None);
    }

    #[test]
    fn rank_is_zero_outside_the_group() {
        let response: Result<UserGroupRolesResponse, _> = serde_json::from_str(
            r#"{"data":[
                {"group":{"id":1},"role":{"id":11,"name":"Member","rank":1}},
                {"group":{"id":4242},"role":{"id":20,"name":"Officer","rank":200}}
            ]}"#,
        );
        assert!(response.is_ok());
        let rank = rank_for_group(&group(), response.unwrap_or_else(|_| unreachable!()));
        assert_eq!(rank, Ok(GroupRank::new(200)));

        let empty: Result<UserGroupRolesResponse, _> = serde_json::from_str(r#"{"data":[]}"#);
        let rank = rank_for_group(&group(), empty.unwrap_or_else(|_| unreachable!()));
        assert_eq!(rank, Ok(GroupRank::GUEST));
    }

    #[test]
    fn padded_group_id_matches_membership() {
        let response: Result<UserGroupRolesResponse, _> = serde_json::from_str(
            r#"{"data":[{"group":{"id":4242},"role":{"id":20,"name":"Officer","rank":200}}]}"#,
        );
        assert!(response.is_ok());

        let padded = GroupId::new("04242").unwrap_or_else(|_| unreachable!());
        let rank = rank_for_group(&padded, response.unwrap_or_else(|_| unreachable!()));
        assert_eq!(rank, Ok(GroupRank::new(200)));
    }

    #[test]
    fn catalog_rejects_out_of_range_ranks() {
        let response: Result<GroupRolesResponse, _> = serde_json::from_str(
            r#"{"groupId":4242,"roles":[
                {"id":10,"name":"Guest","rank":0,"memberCount":0},
                {"id":20,"name":"Owner","rank":255,"memberCount":1}
            ]}"#,
        );
        assert!(response.is_ok());
        let roles = catalog(response.unwrap_or_else(|_| unreachable!()));
        assert!(roles.is_ok());
        let roles = roles.unwrap_or_default();
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[1].id, GroupRoleId::new(20));
        assert_eq!(roles[1].rank, GroupRank::new(255));

        let broken: Result<GroupRolesResponse, _> =
            serde_json::from_str(r#"{"roles":[{"id":30,"name":"Bogus","rank":300}]}"#);
        assert!(catalog(broken.unwrap_or_else(|_| unreachable!())).is_err());
    }
}
