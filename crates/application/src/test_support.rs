//! In-process fakes of every port, shared by the service tests.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use rankbind_core::{AppError, AppResult, GuildId, MemberId};
use rankbind_domain::{
    BindingEntry, BindingKey, BindingRecord, BindingRecordKind, ExternalUserId, GroupId,
    GroupRank, GroupRole, GroupSummary, GuildConfiguration, PendingKind, PendingRequest, RoleId,
};

use crate::ports::{
    BindingStore, ChatPlatformClient, GroupPlatformClient, GuildMemberSnapshot, IdentityLink,
    IdentityLinkRepository, OperatorNotifier, PremiumEntitlementSource, SetupLease,
    SetupLockCoordinator, SetupNotification,
};

fn unavailable(what: &str) -> AppError {
    AppError::Unavailable(format!("{what} is unavailable"))
}

#[derive(Default)]
pub(crate) struct FakeBindingStore {
    records: Mutex<BTreeMap<BindingKey, BindingRecord>>,
    failing: Mutex<bool>,
    failing_configuration_writes: Mutex<bool>,
}

impl FakeBindingStore {
    pub(crate) async fn fail_all(&self) {
        *self.failing.lock().await = true;
    }

    pub(crate) async fn fail_configuration_writes(&self) {
        *self.failing_configuration_writes.lock().await = true;
    }

    async fn ensure_available(&self) -> AppResult<()> {
        if *self.failing.lock().await {
            return Err(unavailable("binding store"));
        }

        Ok(())
    }
}

#[async_trait]
impl BindingStore for FakeBindingStore {
    async fn find_configuration(
        &self,
        guild_id: &GuildId,
    ) -> AppResult<Option<GuildConfiguration>> {
        self.ensure_available().await?;
        let records = self.records.lock().await;
        Ok(match records.get(&BindingKey::configuration(guild_id)) {
            Some(BindingRecord::Configuration(configuration)) => Some(configuration.clone()),
            _ => None,
        })
    }

    async fn save_configuration(
        &self,
        guild_id: &GuildId,
        configuration: GuildConfiguration,
    ) -> AppResult<()> {
        self.ensure_available().await?;
        if *self.failing_configuration_writes.lock().await {
            return Err(unavailable("binding store"));
        }
        let mut records = self.records.lock().await;
        records.remove(&BindingKey::pending(PendingKind::Setup, guild_id));
        records.remove(&BindingKey::pending(PendingKind::Transfer, guild_id));
        records.insert(
            BindingKey::configuration(guild_id),
            BindingRecord::Configuration(configuration),
        );
        Ok(())
    }

    async fn delete_configuration(&self, guild_id: &GuildId) -> AppResult<()> {
        self.ensure_available().await?;
        self.records
            .lock()
            .await
            .remove(&BindingKey::configuration(guild_id));
        Ok(())
    }

    async fn find_pending(
        &self,
        guild_id: &GuildId,
        kind: PendingKind,
    ) -> AppResult<Option<PendingRequest>> {
        self.ensure_available().await?;
        let records = self.records.lock().await;
        Ok(match records.get(&BindingKey::pending(kind, guild_id)) {
            Some(BindingRecord::PendingSetup(request) | BindingRecord::PendingTransfer(request)) => {
                Some(request.clone())
            }
            _ => None,
        })
    }

    async fn save_pending(
        &self,
        guild_id: &GuildId,
        kind: PendingKind,
        request: PendingRequest,
    ) -> AppResult<()> {
        self.ensure_available().await?;
        self.records.lock().await.insert(
            BindingKey::pending(kind, guild_id),
            BindingRecord::pending(kind, request),
        );
        Ok(())
    }

    async fn clear_pending(&self, guild_id: &GuildId, kind: PendingKind) -> AppResult<()> {
        self.ensure_available().await?;
        self.records
            .lock()
            .await
            .remove(&BindingKey::pending(kind, guild_id));
        Ok(())
    }

    async fn list_entries(&self) -> AppResult<Vec<BindingEntry>> {
        self.ensure_available().await?;
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .map(|(key, record)| BindingEntry {
                guild_id: key.guild_id().clone(),
                record: record.clone(),
            })
            .collect())
    }
}

impl FakeBindingStore {
    pub(crate) async fn record_count(&self, kind: BindingRecordKind) -> usize {
        self.records
            .lock()
            .await
            .keys()
            .filter(|key| key.kind() == kind)
            .count()
    }
}

#[derive(Default)]
pub(crate) struct FakeGroupPlatform {
    groups: Mutex<HashMap<GroupId, GroupSummary>>,
    users: Mutex<HashMap<String, ExternalUserId>>,
    ranks: Mutex<HashMap<(GroupId, ExternalUserId), GroupRank>>,
    catalogs: Mutex<HashMap<GroupId, Vec<GroupRole>>>,
    failing_rank_lookups: Mutex<bool>,
    failing_group_lookups: Mutex<bool>,
}

impl FakeGroupPlatform {
    pub(crate) async fn add_group(&self, group_id: &GroupId, owner_id: Option<u64>) {
        self.groups.lock().await.insert(
            group_id.clone(),
            GroupSummary {
                group_id: group_id.clone(),
                name: format!("Group {group_id}"),
                owner_id: owner_id.map(ExternalUserId::new),
            },
        );
    }

    pub(crate) async fn add_user(&self, username: &str, user_id: u64) {
        self.users
            .lock()
            .await
            .insert(username.to_lowercase(), ExternalUserId::new(user_id));
    }

    pub(crate) async fn set_rank(&self, group_id: &GroupId, user_id: u64, rank: u8) {
        self.ranks.lock().await.insert(
            (group_id.clone(), ExternalUserId::new(user_id)),
            GroupRank::new(rank),
        );
    }

    pub(crate) async fn set_catalog(&self, group_id: &GroupId, catalog: Vec<GroupRole>) {
        self.catalogs.lock().await.insert(group_id.clone(), catalog);
    }

    pub(crate) async fn fail_rank_lookups(&self) {
        *self.failing_rank_lookups.lock().await = true;
    }

    pub(crate) async fn fail_group_lookups(&self) {
        *self.failing_group_lookups.lock().await = true;
    }
}

#[async_trait]
impl GroupPlatformClient for FakeGroupPlatform {
    async fn find_group(&self, group_id: &GroupId) -> AppResult<Option<GroupSummary>> {
        if *self.failing_group_lookups.lock().await {
            return Err(unavailable("groups api"));
        }

        Ok(self.groups.lock().await.get(group_id).cloned())
    }

    async fn find_user_id(&self, username: &str) -> AppResult<Option<ExternalUserId>> {
        Ok(self
            .users
            .lock()
            .await
            .get(&username.to_lowercase())
            .copied())
    }

    async fn rank_in_group(
        &self,
        group_id: &GroupId,
        user_id: ExternalUserId,
    ) -> AppResult<GroupRank> {
        if *self.failing_rank_lookups.lock().await {
            return Err(unavailable("groups api"));
        }

        Ok(self
            .ranks
            .lock()
            .await
            .get(&(group_id.clone(), user_id))
            .copied()
            .unwrap_or(GroupRank::GUEST))
    }

    async fn list_group_roles(&self, group_id: &GroupId) -> AppResult<Vec<GroupRole>> {
        Ok(self
            .catalogs
            .lock()
            .await
            .get(group_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct FakeIdentityLinks {
    links: Mutex<Vec<IdentityLink>>,
}

impl FakeIdentityLinks {
    pub(crate) async fn link(&self, member_id: &MemberId, username: &str) {
        self.links.lock().await.push(IdentityLink {
            member_id: member_id.clone(),
            username: username.to_owned(),
        });
    }
}

#[async_trait]
impl IdentityLinkRepository for FakeIdentityLinks {
    async fn find_linked_username(&self, member_id: &MemberId) -> AppResult<Option<String>> {
        Ok(self
            .links
            .lock()
            .await
            .iter()
            .find(|link| &link.member_id == member_id)
            .map(|link| link.username.clone()))
    }

    async fn find_member_by_username(&self, username: &str) -> AppResult<Option<MemberId>> {
        Ok(self
            .links
            .lock()
            .await
            .iter()
            .find(|link| link.username == username)
            .map(|link| link.member_id.clone()))
    }

    async fn list_links(&self) -> AppResult<Vec<IdentityLink>> {
        Ok(self.links.lock().await.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChatCall {
    AddRoles(Vec<RoleId>, String),
    RemoveRoles(Vec<RoleId>, String),
    SetNickname(String),
}

#[derive(Default)]
pub(crate) struct FakeChatPlatform {
    members: Mutex<HashMap<MemberId, GuildMemberSnapshot>>,
    calls: Mutex<Vec<ChatCall>>,
    rejecting_role_changes: Mutex<bool>,
    rejecting_nicknames: Mutex<bool>,
}

impl FakeChatPlatform {
    pub(crate) async fn add_member(&self, member_id: &MemberId, role_ids: &[&str]) {
        self.members.lock().await.insert(
            member_id.clone(),
            GuildMemberSnapshot {
                member_id: member_id.clone(),
                role_ids: role_ids
                    .iter()
                    .map(|value| RoleId::new(*value).unwrap_or_else(|_| unreachable!()))
                    .collect(),
                nickname: None,
            },
        );
    }

    pub(crate) async fn roles_of(&self, member_id: &MemberId) -> BTreeSet<RoleId> {
        self.members
            .lock()
            .await
            .get(member_id)
            .map(|member| member.role_ids.clone())
            .unwrap_or_default()
    }

    pub(crate) async fn calls(&self) -> Vec<ChatCall> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn reject_role_changes(&self) {
        *self.rejecting_role_changes.lock().await = true;
    }

    pub(crate) async fn reject_nicknames(&self) {
        *self.rejecting_nicknames.lock().await = true;
    }
}

#[async_trait]
impl ChatPlatformClient for FakeChatPlatform {
    async fn fetch_member(
        &self,
        _guild_id: &GuildId,
        member_id: &MemberId,
    ) -> AppResult<Option<GuildMemberSnapshot>> {
        Ok(self.members.lock().await.get(member_id).cloned())
    }

    async fn add_roles(
        &self,
        _guild_id: &GuildId,
        member_id: &MemberId,
        role_ids: &[RoleId],
        reason: &str,
    ) -> AppResult<()> {
        if *self.rejecting_role_changes.lock().await {
            return Err(AppError::Forbidden("missing permissions".to_owned()));
        }

        self.calls
            .lock()
            .await
            .push(ChatCall::AddRoles(role_ids.to_vec(), reason.to_owned()));
        if let Some(member) = self.members.lock().await.get_mut(member_id) {
            member.role_ids.extend(role_ids.iter().cloned());
        }
        Ok(())
    }

    async fn remove_roles(
        &self,
        _guild_id: &GuildId,
        member_id: &MemberId,
        role_ids: &[RoleId],
        reason: &str,
    ) -> AppResult<()> {
        if *self.rejecting_role_changes.lock().await {
            return Err(AppError::Forbidden("missing permissions".to_owned()));
        }

        self.calls
            .lock()
            .await
            .push(ChatCall::RemoveRoles(role_ids.to_vec(), reason.to_owned()));
        if let Some(member) = self.members.lock().await.get_mut(member_id) {
            member.role_ids.retain(|role_id| !role_ids.contains(role_id));
        }
        Ok(())
    }

    async fn set_nickname(
        &self,
        _guild_id: &GuildId,
        member_id: &MemberId,
        nickname: &str,
        _reason: &str,
    ) -> AppResult<()> {
        if *self.rejecting_nicknames.lock().await {
            return Err(AppError::Forbidden("cannot rename the guild owner".to_owned()));
        }

        self.calls
            .lock()
            .await
            .push(ChatCall::SetNickname(nickname.to_owned()));
        if let Some(member) = self.members.lock().await.get_mut(member_id) {
            member.nickname = Some(nickname.to_owned());
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakePremiumSource {
    members: Mutex<HashSet<MemberId>>,
    failing: Mutex<bool>,
}

impl FakePremiumSource {
    pub(crate) async fn grant(&self, member_id: &MemberId) {
        self.members.lock().await.insert(member_id.clone());
    }

    pub(crate) async fn fail_reads(&self) {
        *self.failing.lock().await = true;
    }
}

#[async_trait]
impl PremiumEntitlementSource for FakePremiumSource {
    async fn is_premium_member(&self, member_id: &MemberId) -> AppResult<bool> {
        if *self.failing.lock().await {
            return Err(AppError::Internal("premium file is malformed".to_owned()));
        }

        Ok(self.members.lock().await.contains(member_id))
    }
}

#[derive(Default)]
pub(crate) struct FakeOperatorNotifier {
    notifications: Mutex<Vec<SetupNotification>>,
    failing: Mutex<bool>,
}

impl FakeOperatorNotifier {
    pub(crate) async fn notifications(&self) -> Vec<SetupNotification> {
        self.notifications.lock().await.clone()
    }

    pub(crate) async fn fail_deliveries(&self) {
        *self.failing.lock().await = true;
    }
}

#[async_trait]
impl OperatorNotifier for FakeOperatorNotifier {
    async fn notify_request_filed(&self, notification: SetupNotification) -> AppResult<()> {
        if *self.failing.lock().await {
            return Err(unavailable("review channel"));
        }

        self.notifications.lock().await.push(notification);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeLockCoordinator {
    held: Mutex<HashMap<String, String>>,
    next_token: Mutex<u64>,
}

impl FakeLockCoordinator {
    /// Simulates a concurrent request holding `scope_key`.
    pub(crate) async fn hold(&self, scope_key: &str) {
        self.held
            .lock()
            .await
            .insert(scope_key.to_owned(), "foreign".to_owned());
    }

    pub(crate) async fn held_scopes(&self) -> Vec<String> {
        let mut scopes: Vec<String> = self.held.lock().await.keys().cloned().collect();
        scopes.sort();
        scopes
    }
}

#[async_trait]
impl SetupLockCoordinator for FakeLockCoordinator {
    async fn try_acquire(
        &self,
        scope_key: &str,
        holder_id: &str,
        _lease_seconds: u32,
    ) -> AppResult<Option<SetupLease>> {
        let mut held = self.held.lock().await;
        if held.contains_key(scope_key) {
            return Ok(None);
        }

        let mut next_token = self.next_token.lock().await;
        *next_token += 1;
        let token = format!("token-{next_token}");
        held.insert(scope_key.to_owned(), token.clone());

        Ok(Some(SetupLease {
            scope_key: scope_key.to_owned(),
            token,
            holder_id: holder_id.to_owned(),
        }))
    }

    async fn release(&self, lease: &SetupLease) -> AppResult<()> {
        let mut held = self.held.lock().await;
        if held.get(&lease.scope_key) == Some(&lease.token) {
            held.remove(&lease.scope_key);
        }
        Ok(())
    }
}
