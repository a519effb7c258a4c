//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod configuration;
mod group;
mod ids;
mod pending;
mod record;
mod role_diff;

pub use configuration::{ConfigurationPatch, GuildConfiguration, RoleBinding};
pub use group::{GroupRole, GroupSummary, match_rank};
pub use ids::{ExternalUserId, GroupId, GroupRank, GroupRoleId, RoleId};
pub use pending::{PendingKind, PendingRequest};
pub use record::{BindingEntry, BindingKey, BindingRecord, BindingRecordKind, BindingState};
pub use role_diff::{RoleDiff, RoleDiffInput};
