//! Membership diffing.

use crate::resource_set::{MemberSet, PatchRequest};

/// Additions and removals that turn an actual membership into a declared one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipDiff {
    pub additions: MemberSet,
    pub removals: MemberSet,
}

/// Compute the minimal membership change from `actual` to `declared`.
///
/// `additions = declared − actual` and `removals = actual − declared`.
/// Both are compared as sets, so the order either side was read or declared
/// in never produces a diff. Pure: no I/O, same output for the same input.
///
/// ```rust
/// use resource_set_reconciler::reconciler::compute_diff;
/// use resource_set_reconciler::resource_set::MemberSet;
///
/// let declared = MemberSet::parse([
///     "https://org.example.com/api/v1/users",
///     "https://org.example.com/api/v1/apps",
/// ]).unwrap();
/// let actual = MemberSet::parse([
///     "https://org.example.com/api/v1/users",
///     "https://org.example.com/api/v1/groups",
/// ]).unwrap();
///
/// let diff = compute_diff(&declared, &actual);
/// assert_eq!(diff.additions.to_strings(), vec!["https://org.example.com/api/v1/apps"]);
/// assert_eq!(diff.removals.to_strings(), vec!["https://org.example.com/api/v1/groups"]);
/// ```
pub fn compute_diff(declared: &MemberSet, actual: &MemberSet) -> MembershipDiff {
    MembershipDiff {
        additions: declared.difference(actual),
        removals: actual.difference(declared),
    }
}

impl MembershipDiff {
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    /// Total number of URLs to add or remove.
    pub fn len(&self) -> usize {
        self.additions.len() + self.removals.len()
    }

    /// Membership that results from applying this diff to `actual`.
    pub fn apply_to(&self, actual: &MemberSet) -> MemberSet {
        actual.union(&self.additions).difference(&self.removals)
    }

    /// Split the diff into patches of at most `max_items` URLs each.
    ///
    /// Additions are packed first, then removals, so a patch may carry both
    /// near the boundary. Every patch is a self-contained set operation and
    /// can be resent safely. An empty diff yields no patches; a `max_items`
    /// of zero is treated as one.
    pub fn into_patches(self, max_items: usize) -> Vec<PatchRequest> {
        let max_items = max_items.max(1);
        let mut patches = Vec::new();
        let mut current = PatchRequest::default();

        let additions = self.additions.into_iter().map(|url| (true, url));
        let removals = self.removals.into_iter().map(|url| (false, url));

        for (is_addition, url) in additions.chain(removals) {
            if current.len() == max_items {
                patches.push(std::mem::take(&mut current));
            }
            if is_addition {
                current.additions.insert(url);
            } else {
                current.removals.insert(url);
            }
        }

        if !current.is_empty() {
            patches.push(current);
        }
        patches
    }
}
