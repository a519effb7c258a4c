//! Application services and ports.

#![forbid(unsafe_code)]

mod binding_index;
mod errors;
pub mod ports;
mod role_sync_service;
mod setup_service;

#[cfg(test)]
mod test_support;

pub use binding_index::BindingIndex;
pub use errors::{ErrorCategory, SetupError, SyncError};
pub use ports::{
    BindingStore, ChatPlatformClient, GroupPlatformClient, GuildMemberSnapshot, IdentityLink,
    IdentityLinkRepository, OperatorNotifier, PremiumEntitlementSource, SetupLease,
    SetupLockCoordinator, SetupNotification,
};
pub use role_sync_service::{NO_GROUP_ROLE, RoleSyncService, SyncOutcome, SyncTarget};
pub use setup_service::{
    ActivationMode, BindingOverview, RequestSetupInput, SetupReceipt, SetupService,
};
