use serde::{Deserialize, Serialize};

use crate::{ExternalUserId, GroupId, GroupRank, GroupRoleId};

/// Group metadata needed to verify ownership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group identifier.
    pub group_id: GroupId,
    /// Display name.
    pub name: String,
    /// Current owner, absent for ownerless groups.
    pub owner_id: Option<ExternalUserId>,
}

/// One entry of a group's role catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRole {
    /// Catalog role identifier.
    pub id: GroupRoleId,
    /// Rank value the role corresponds to.
    pub rank: GroupRank,
    /// Display name.
    pub name: String,
}

/// Finds the catalog role whose rank equals `rank` exactly.
#[must_use]
pub fn match_rank(catalog: &[GroupRole], rank: GroupRank) -> Option<&GroupRole> {
    catalog.iter().find(|role| role.rank == rank)
}
