//! Drift between last-known and current remote membership.

use crate::resource_set::{MemberSet, ResourceSetState};

/// Membership changes made outside the reconciler.
///
/// A drift report is neutral: it says what differs, not which side is
/// correct. The host engine decides whether to absorb the change into its
/// state or plan a change that reverts it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Drift {
    /// Present remotely, absent from the last-known state
    pub added_remotely: MemberSet,
    /// Present in the last-known state, absent remotely
    pub removed_remotely: MemberSet,
}

impl Drift {
    pub fn between(last_known: &MemberSet, current: &MemberSet) -> Self {
        Self {
            added_remotely: current.difference(last_known),
            removed_remotely: last_known.difference(current),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added_remotely.is_empty() && self.removed_remotely.is_empty()
    }

    /// Symmetric difference of last-known and current membership.
    pub fn members(&self) -> MemberSet {
        self.added_remotely.union(&self.removed_remotely)
    }

    /// Fold the remote changes into a state record.
    ///
    /// A record without members is treated as having none. Listed members
    /// keep their position; remote additions are listed last.
    pub fn absorb(&self, state: &mut ResourceSetState) {
        let last_known = state.members.take().unwrap_or_default();
        state.members = Some(
            last_known
                .union(&self.added_remotely)
                .difference(&self.removed_remotely),
        );

        state.listing.retain(|url| !self.removed_remotely.contains(url));
        for url in &self.added_remotely {
            if !state.listing.contains(url) {
                state.listing.push(url.clone());
            }
        }
    }
}
