use rankbind_core::{AppError, MemberId};
use rankbind_domain::{GroupId, PendingKind};
use thiserror::Error;

/// Failure taxonomy shared by the binding workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Group or guild already bound or pending. The user must act.
    ValidationConflict,
    /// External lookup failed; the user may retry.
    Transient,
    /// Identity linking must be completed first.
    Precondition,
    /// Caller may not perform the request.
    Authorization,
    /// Chat platform rejected or could not serve the request.
    Platform,
    /// Persistence or coordination backend unavailable.
    Infrastructure,
}

impl ErrorCategory {
    /// Returns a stable label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationConflict => "validation_conflict",
            Self::Transient => "transient",
            Self::Precondition => "precondition",
            Self::Authorization => "authorization",
            Self::Platform => "platform",
            Self::Infrastructure => "infrastructure",
        }
    }
}

/// Errors of the setup and transfer workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Another guild holds a configuration for the group.
    #[error("group '{group_id}' is already configured on another server")]
    GroupAlreadyBound {
        /// Requested group.
        group_id: GroupId,
    },

    /// Another guild has a pending request for the group.
    #[error("a request for group '{group_id}' is already pending in another server")]
    GroupAlreadyPending {
        /// Requested group.
        group_id: GroupId,
    },

    /// This guild is already configured.
    #[error("{}", already_configured_message(current_group_id, *same_group))]
    AlreadyConfigured {
        /// Group the guild is bound to.
        current_group_id: GroupId,
        /// Whether the request targeted that same group.
        same_group: bool,
    },

    /// This guild already has a pending setup request.
    #[error("{}", setup_pending_message(pending_group_id, *same_group))]
    SetupAlreadyPending {
        /// Group of the pending request.
        pending_group_id: GroupId,
        /// Whether the request targeted that same group.
        same_group: bool,
    },

    /// This guild already has a pending transfer request.
    #[error("{}", transfer_pending_message(pending_group_id, *same_group))]
    TransferAlreadyPending {
        /// Group of the pending request.
        pending_group_id: GroupId,
        /// Whether the request targeted that same group.
        same_group: bool,
    },

    /// A concurrent request holds the guild or group lease.
    #[error("another request for this server or group '{group_id}' is being processed")]
    SetupInProgress {
        /// Requested group.
        group_id: GroupId,
    },

    /// The guild has no configuration.
    #[error("this server is not configured; request a setup first")]
    NotConfigured,

    /// There is no pending request to confirm.
    #[error("there is no pending {} request for this server", kind.as_str())]
    NoPendingRequest {
        /// Slot that was empty.
        kind: PendingKind,
    },

    /// Group metadata could not be fetched or is incomplete.
    #[error("failed to fetch group '{group_id}': {reason}")]
    ExternalLookupFailed {
        /// Requested group.
        group_id: GroupId,
        /// Failure detail.
        reason: String,
    },

    /// The requester has no linked external identity.
    #[error("link your external account before requesting a setup")]
    IdentityNotLinked,

    /// The identity-linking store could not be read.
    #[error("failed to read identity links: {0}")]
    IdentityLookupFailed(#[source] AppError),

    /// The linked username could not be resolved to an external id.
    #[error("could not verify linked username '{username}': {reason}")]
    IdentityResolutionFailed {
        /// Linked username.
        username: String,
        /// Failure detail.
        reason: String,
    },

    /// The requester does not own the group.
    #[error("you are not the owner of group '{group_id}'")]
    NotGroupOwner {
        /// Requested group.
        group_id: GroupId,
    },

    /// An administrative update violated a configuration invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[source] AppError),

    /// Persistence or lock backend failure.
    #[error("binding store unavailable: {0}")]
    StoreUnavailable(#[source] AppError),
}

impl SetupError {
    /// Returns the failure category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::GroupAlreadyBound { .. }
            | Self::GroupAlreadyPending { .. }
            | Self::AlreadyConfigured { .. }
            | Self::SetupAlreadyPending { .. }
            | Self::TransferAlreadyPending { .. }
            | Self::SetupInProgress { .. }
            | Self::NoPendingRequest { .. }
            | Self::InvalidConfiguration(_) => ErrorCategory::ValidationConflict,
            Self::ExternalLookupFailed { .. } | Self::IdentityResolutionFailed { .. } => {
                ErrorCategory::Transient
            }
            Self::NotConfigured | Self::IdentityNotLinked => ErrorCategory::Precondition,
            Self::NotGroupOwner { .. } => ErrorCategory::Authorization,
            Self::IdentityLookupFailed(_) | Self::StoreUnavailable(_) => {
                ErrorCategory::Infrastructure
            }
        }
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::GroupAlreadyBound { .. } => "group_already_bound",
            Self::GroupAlreadyPending { .. } => "group_already_pending",
            Self::AlreadyConfigured {
                same_group: true, ..
            } => "already_configured_same_group",
            Self::AlreadyConfigured { .. } => "already_configured_use_transfer",
            Self::SetupAlreadyPending {
                same_group: true, ..
            } => "setup_already_pending_same_group",
            Self::SetupAlreadyPending { .. } => "setup_already_pending_other_group",
            Self::TransferAlreadyPending {
                same_group: true, ..
            } => "transfer_already_pending_same_group",
            Self::TransferAlreadyPending { .. } => "transfer_already_pending_other_group",
            Self::SetupInProgress { .. } => "setup_in_progress",
            Self::NotConfigured => "not_configured",
            Self::NoPendingRequest { .. } => "no_pending_request",
            Self::ExternalLookupFailed { .. } => "external_lookup_failed",
            Self::IdentityNotLinked => "identity_not_linked",
            Self::IdentityLookupFailed(_) => "identity_lookup_failed",
            Self::IdentityResolutionFailed { .. } => "identity_resolution_failed",
            Self::NotGroupOwner { .. } => "not_group_owner",
            Self::InvalidConfiguration(_) => "invalid_configuration",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Returns whether re-invoking the command may succeed without user action.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }
}

fn already_configured_message(current_group_id: &GroupId, same_group: bool) -> String {
    if same_group {
        format!("this server is already configured with group '{current_group_id}'")
    } else {
        format!(
            "this server is already configured with group '{current_group_id}'; use the transfer command to switch groups"
        )
    }
}

fn setup_pending_message(pending_group_id: &GroupId, same_group: bool) -> String {
    if same_group {
        format!("a setup request for group '{pending_group_id}' is already pending")
    } else {
        format!(
            "a setup request for group '{pending_group_id}' is already pending; wait for it or use the transfer command"
        )
    }
}

fn transfer_pending_message(pending_group_id: &GroupId, same_group: bool) -> String {
    if same_group {
        format!("a transfer to group '{pending_group_id}' is already pending")
    } else {
        format!("a transfer to group '{pending_group_id}' is already pending; wait for it first")
    }
}

/// Errors of role synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The guild has no configuration.
    #[error("this server is not configured; request a setup first")]
    NotConfigured,

    /// No member is linked to the requested username.
    #[error("no member is linked to username '{username}'; they must link their account first")]
    NoLinkedMember {
        /// Requested username.
        username: String,
    },

    /// The caller has no linked identity and named no target.
    #[error("you have not linked your external account")]
    CallerNotLinked,

    /// The identity-linking store could not be read.
    #[error("failed to read identity links: {0}")]
    IdentityLookupFailed(#[source] AppError),

    /// The username could not be resolved to an external id.
    #[error("could not find external user '{username}': {reason}")]
    ExternalUserNotFound {
        /// Target username.
        username: String,
        /// Failure detail.
        reason: String,
    },

    /// Rank lookup failed.
    #[error("failed to fetch group rank: {0}")]
    RankFetchFailed(#[source] AppError),

    /// Role catalog lookup failed.
    #[error("failed to fetch group roles: {0}")]
    RoleCatalogFetchFailed(#[source] AppError),

    /// The target is not a member of the guild.
    #[error("member '{member_id}' was not found in this server")]
    MemberNotFound {
        /// Target member.
        member_id: MemberId,
    },

    /// The member could not be fetched.
    #[error("failed to fetch member: {0}")]
    MemberFetchFailed(#[source] AppError),

    /// The platform rejected the role change.
    #[error("failed to update roles: {0}")]
    RoleApplyFailed(#[source] AppError),

    /// Persistence failure.
    #[error("binding store unavailable: {0}")]
    StoreUnavailable(#[source] AppError),
}

impl SyncError {
    /// Returns the failure category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotConfigured | Self::NoLinkedMember { .. } | Self::CallerNotLinked => {
                ErrorCategory::Precondition
            }
            Self::ExternalUserNotFound { .. }
            | Self::RankFetchFailed(_)
            | Self::RoleCatalogFetchFailed(_) => ErrorCategory::Transient,
            Self::MemberNotFound { .. } | Self::MemberFetchFailed(_) | Self::RoleApplyFailed(_) => {
                ErrorCategory::Platform
            }
            Self::IdentityLookupFailed(_) | Self::StoreUnavailable(_) => {
                ErrorCategory::Infrastructure
            }
        }
    }

    /// Returns a stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::NoLinkedMember { .. } => "no_linked_member",
            Self::CallerNotLinked => "caller_not_linked",
            Self::IdentityLookupFailed(_) => "identity_lookup_failed",
            Self::ExternalUserNotFound { .. } => "external_user_not_found",
            Self::RankFetchFailed(_) => "rank_fetch_failed",
            Self::RoleCatalogFetchFailed(_) => "role_catalog_fetch_failed",
            Self::MemberNotFound { .. } => "member_not_found",
            Self::MemberFetchFailed(_) => "member_fetch_failed",
            Self::RoleApplyFailed(_) => "role_apply_failed",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Returns whether re-invoking the command may succeed without user action.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }
}
