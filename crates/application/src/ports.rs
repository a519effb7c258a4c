//! Ports implemented by infrastructure adapters.

mod binding_store;
mod chat_platform;
mod group_platform;
mod identity_links;
mod operator;
mod premium;
mod setup_lock;

pub use binding_store::BindingStore;
pub use chat_platform::{ChatPlatformClient, GuildMemberSnapshot};
pub use group_platform::GroupPlatformClient;
pub use identity_links::{IdentityLink, IdentityLinkRepository};
pub use operator::{OperatorNotifier, SetupNotification};
pub use premium::PremiumEntitlementSource;
pub use setup_lock::{SetupLease, SetupLockCoordinator};
