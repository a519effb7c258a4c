//! Role delta computation for one synchronization run.
//!
//! The diff is derived from scratch on every run: the desired role set comes
//! from the matched catalog role, the member's linked identity and premium
//! entitlement, and is compared against what the member already holds.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{GroupRole, GuildConfiguration, RoleId};

/// Inputs of one diff computation.
#[derive(Debug, Clone, Copy)]
pub struct RoleDiffInput<'a> {
    /// Configuration of the guild being synchronized.
    pub configuration: &'a GuildConfiguration,
    /// Catalog role matching the member's rank, if any.
    pub matched_role: Option<&'a GroupRole>,
    /// Whether the member has a linked external identity.
    pub has_linked_identity: bool,
    /// Premium role to grant; `None` when the member is not premium.
    pub premium_role_id: Option<&'a RoleId>,
    /// Roles the member currently holds.
    pub held_role_ids: &'a BTreeSet<RoleId>,
}

/// Roles to add and remove. The two sets never overlap.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDiff {
    to_add: BTreeSet<RoleId>,
    to_remove: BTreeSet<RoleId>,
}

impl RoleDiff {
    /// Computes the delta between the desired and the held role sets.
    #[must_use]
    pub fn compute(input: RoleDiffInput<'_>) -> Self {
        let desired = desired_roles(&input);

        let to_add = desired
            .iter()
            .filter(|role_id| !input.held_role_ids.contains(*role_id))
            .cloned()
            .collect();

        let mut to_remove: BTreeSet<RoleId> = input
            .configuration
            .role_bindings()
            .iter()
            .map(|binding| binding.role_id())
            .filter(|role_id| !desired.contains(*role_id) && input.held_role_ids.contains(*role_id))
            .cloned()
            .collect();

        if let Some(unverified_role_id) = input.configuration.unverified_role_id()
            && !desired.contains(unverified_role_id)
            && input.held_role_ids.contains(unverified_role_id)
        {
            to_remove.insert(unverified_role_id.clone());
        }

        Self { to_add, to_remove }
    }

    /// Returns roles to add.
    #[must_use]
    pub fn to_add(&self) -> &BTreeSet<RoleId> {
        &self.to_add
    }

    /// Returns roles to remove.
    #[must_use]
    pub fn to_remove(&self) -> &BTreeSet<RoleId> {
        &self.to_remove
    }

    /// Returns true when the member already holds the desired state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    /// Returns the role set a member holds after the diff is applied.
    #[must_use]
    pub fn apply_to(&self, held_role_ids: &BTreeSet<RoleId>) -> BTreeSet<RoleId> {
        held_role_ids
            .iter()
            .filter(|role_id| !self.to_remove.contains(*role_id))
            .chain(self.to_add.iter())
            .cloned()
            .collect()
    }
}

fn desired_roles(input: &RoleDiffInput<'_>) -> BTreeSet<RoleId> {
    let mut desired = BTreeSet::new();

    if let Some(binding) = input
        .matched_role
        .and_then(|role| input.configuration.binding_for(role.id))
    {
        desired.insert(binding.role_id().clone());
    }

    if input.has_linked_identity
        && let Some(verification_role_id) = input.configuration.verification_role_id()
    {
        desired.insert(verification_role_id.clone());
    }

    if let Some(premium_role_id) = input.premium_role_id {
        desired.insert(premium_role_id.clone());
    }

    desired
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::{RoleDiff, RoleDiffInput};
    use crate::{GroupId, GroupRank, GroupRole, GroupRoleId, GuildConfiguration, RoleBinding, RoleId};

    fn role(value: &str) -> RoleId {
        RoleId::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn catalog_role(id: u64, rank: u8) -> GroupRole {
        GroupRole {
            id: GroupRoleId::new(id),
            rank: GroupRank::new(rank),
            name: format!("Rank {rank}"),
        }
    }

    fn configuration() -> GuildConfiguration {
        GuildConfiguration::new(GroupId::new("77").unwrap_or_else(|_| unreachable!()))
            .with_role_bindings(vec![
                RoleBinding::new(GroupRoleId::new(10), role("A")),
                RoleBinding::new(GroupRoleId::new(20), role("B")),
            ])
            .unwrap_or_else(|_| unreachable!())
    }

    fn held(values: &[&str]) -> BTreeSet<RoleId> {
        values.iter().map(|value| role(value)).collect()
    }

    #[test]
    fn rank_change_swaps_bound_roles() {
        let configuration = configuration();
        let matched = catalog_role(20, 200);
        let held_roles = held(&["A"]);

        let diff = RoleDiff::compute(RoleDiffInput {
            configuration: &configuration,
            matched_role: Some(&matched),
            has_linked_identity: true,
            premium_role_id: None,
            held_role_ids: &held_roles,
        });

        assert_eq!(diff.to_add(), &held(&["B"]));
        assert_eq!(diff.to_remove(), &held(&["A"]));
    }

    #[test]
    fn linked_member_without_rank_gets_verification_role_and_loses_unverified() {
        let configuration = configuration()
            .with_verification_role(Some(role("V")))
            .with_unverified_role(Some(role("U")));
        let held_roles = held(&["U", "A"]);

        let diff = RoleDiff::compute(RoleDiffInput {
            configuration: &configuration,
            matched_role: None,
            has_linked_identity: true,
            premium_role_id: None,
            held_role_ids: &held_roles,
        });

        assert_eq!(diff.to_add(), &held(&["V"]));
        assert_eq!(diff.to_remove(), &held(&["A", "U"]));
    }

    #[test]
    fn held_desired_roles_are_not_added_again() {
        let configuration = configuration().with_verification_role(Some(role("V")));
        let matched = catalog_role(10, 1);
        let premium = role("P");
        let held_roles = held(&["A", "V", "P"]);

        let diff = RoleDiff::compute(RoleDiffInput {
            configuration: &configuration,
            matched_role: Some(&matched),
            has_linked_identity: true,
            premium_role_id: Some(&premium),
            held_role_ids: &held_roles,
        });

        assert!(diff.is_empty());
    }

    #[test]
    fn unbound_catalog_role_grants_nothing_but_strips_bound_roles() {
        let configuration = configuration();
        let matched = catalog_role(30, 250);
        let held_roles = held(&["B", "X"]);

        let diff = RoleDiff::compute(RoleDiffInput {
            configuration: &configuration,
            matched_role: Some(&matched),
            has_linked_identity: true,
            premium_role_id: None,
            held_role_ids: &held_roles,
        });

        assert!(diff.to_add().is_empty());
        assert_eq!(diff.to_remove(), &held(&["B"]));
    }

    #[test]
    fn unverified_role_doubling_as_verification_role_is_kept() {
        let configuration = configuration()
            .with_verification_role(Some(role("V")))
            .with_unverified_role(Some(role("V")));
        let held_roles = held(&["V"]);

        let diff = RoleDiff::compute(RoleDiffInput {
            configuration: &configuration,
            matched_role: None,
            has_linked_identity: true,
            premium_role_id: None,
            held_role_ids: &held_roles,
        });

        assert!(diff.is_empty());
    }

    fn arbitrary_held() -> impl Strategy<Value = BTreeSet<RoleId>> {
        proptest::collection::btree_set(
            prop_oneof![
                Just("A"),
                Just("B"),
                Just("C"),
                Just("U"),
                Just("V"),
                Just("P"),
                Just("X")
            ],
            0..7,
        )
        .prop_map(|values| values.into_iter().map(role).collect())
    }

    proptest! {
        #[test]
        fn diff_sets_are_disjoint_and_converge(
            held_roles in arbitrary_held(),
            matched_rank in prop_oneof![Just(None), Just(Some(1_u8)), Just(Some(2_u8)), Just(Some(3_u8))],
            linked in any::<bool>(),
            premium in any::<bool>(),
        ) {
            let configuration = GuildConfiguration::new(GroupId::new("77").unwrap_or_else(|_| unreachable!()))
                .with_role_bindings(vec![
                    RoleBinding::new(GroupRoleId::new(1), role("A")),
                    RoleBinding::new(GroupRoleId::new(2), role("B")),
                    RoleBinding::new(GroupRoleId::new(3), role("C")),
                ])
                .unwrap_or_else(|_| unreachable!())
                .with_verification_role(Some(role("V")))
                .with_unverified_role(Some(role("U")));
            let matched = matched_rank.map(|rank| catalog_role(u64::from(rank), rank));
            let premium_role = role("P");

            let first = RoleDiff::compute(RoleDiffInput {
                configuration: &configuration,
                matched_role: matched.as_ref(),
                has_linked_identity: linked,
                premium_role_id: premium.then_some(&premium_role),
                held_role_ids: &held_roles,
            });

            prop_assert!(first.to_add().is_disjoint(first.to_remove()));

            let converged = first.apply_to(&held_roles);
            let second = RoleDiff::compute(RoleDiffInput {
                configuration: &configuration,
                matched_role: matched.as_ref(),
                has_linked_identity: linked,
                premium_role_id: premium.then_some(&premium_role),
                held_role_ids: &converged,
            });

            prop_assert!(second.is_empty());
            prop_assert!(converged.contains(&role("X")) == held_roles.contains(&role("X")));
        }
    }
}
