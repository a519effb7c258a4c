use std::sync::Arc;

use rankbind_core::{AppError, GuildId, MemberId};
use rankbind_domain::{BindingState, GroupId, GuildConfiguration, PendingKind, PendingRequest};

use crate::binding_index::BindingIndex;
use crate::errors::SetupError;
use crate::ports::{
    BindingStore, GroupPlatformClient, IdentityLinkRepository, OperatorNotifier,
    SetupLockCoordinator,
};

mod admin;
mod confirm;
mod leases;
mod request;

const DEFAULT_LOCK_SECONDS: u32 = 30;

/// Whether a filed setup activates the configuration right away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationMode {
    /// Write the configuration together with the request, so synchronization
    /// works before an operator confirms.
    Immediate,
    /// Write only the pending request; synchronization stays blocked until
    /// the request is confirmed.
    AwaitConfirmation,
}

impl ActivationMode {
    /// Maps the boolean `activate_immediately` flag.
    #[must_use]
    pub fn from_flag(activate_immediately: bool) -> Self {
        if activate_immediately {
            Self::Immediate
        } else {
            Self::AwaitConfirmation
        }
    }
}

/// Input of a setup or transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSetupInput {
    /// External group to bind.
    pub group_id: GroupId,
    /// Optional premium key.
    pub premium_key: Option<String>,
    /// Activation override; the service default applies when absent.
    /// Transfers always wait for confirmation.
    pub activation: Option<ActivationMode>,
}

/// Result of a filed setup or transfer request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupReceipt {
    /// Requesting guild.
    pub guild_id: GuildId,
    /// Slot the request was filed into.
    pub kind: PendingKind,
    /// Requested group.
    pub group_id: GroupId,
    /// Display name of the requested group.
    pub group_name: String,
    /// Member who filed the request.
    pub requester_id: MemberId,
    /// Whether a configuration was written immediately.
    pub activated: bool,
    /// Whether the operator review notification was delivered.
    pub notification_delivered: bool,
}

/// Every record a guild holds together with its derived lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOverview {
    /// Inspected guild.
    pub guild_id: GuildId,
    /// Derived lifecycle state.
    pub state: BindingState,
    /// Confirmed configuration.
    pub configuration: Option<GuildConfiguration>,
    /// Pending setup request.
    pub pending_setup: Option<PendingRequest>,
    /// Pending transfer request.
    pub pending_transfer: Option<PendingRequest>,
}

/// Setup, transfer and administration of guild bindings.
#[derive(Clone)]
pub struct SetupService {
    store: Arc<dyn BindingStore>,
    index: BindingIndex,
    group_platform: Arc<dyn GroupPlatformClient>,
    identity_links: Arc<dyn IdentityLinkRepository>,
    lock_coordinator: Arc<dyn SetupLockCoordinator>,
    operator_notifier: Option<Arc<dyn OperatorNotifier>>,
    default_activation: ActivationMode,
    lock_seconds: u32,
}

impl SetupService {
    /// Creates a setup service with immediate activation.
    #[must_use]
    pub fn new(
        store: Arc<dyn BindingStore>,
        group_platform: Arc<dyn GroupPlatformClient>,
        identity_links: Arc<dyn IdentityLinkRepository>,
        lock_coordinator: Arc<dyn SetupLockCoordinator>,
    ) -> Self {
        Self {
            index: BindingIndex::new(store.clone()),
            store,
            group_platform,
            identity_links,
            lock_coordinator,
            operator_notifier: None,
            default_activation: ActivationMode::Immediate,
            lock_seconds: DEFAULT_LOCK_SECONDS,
        }
    }

    /// Adds the operator review notifier.
    #[must_use]
    pub fn with_operator_notifier(mut self, operator_notifier: Arc<dyn OperatorNotifier>) -> Self {
        self.operator_notifier = Some(operator_notifier);
        self
    }

    /// Sets the activation mode used when a request does not choose one.
    #[must_use]
    pub fn with_default_activation(mut self, activation: ActivationMode) -> Self {
        self.default_activation = activation;
        self
    }

    /// Sets the lease duration of the setup locks.
    #[must_use]
    pub fn with_lock_seconds(mut self, lock_seconds: u32) -> Self {
        self.lock_seconds = lock_seconds.max(1);
        self
    }

    /// Returns the uniqueness index this service checks against.
    #[must_use]
    pub fn index(&self) -> &BindingIndex {
        &self.index
    }
}

fn store_unavailable(error: AppError) -> SetupError {
    SetupError::StoreUnavailable(error)
}
