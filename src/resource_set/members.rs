//! Set-valued membership of a resource set.

use crate::error::ValidationResult;
use crate::resource_set::ResourceUrl;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::collections::btree_set;

/// Deduplicated collection of member URLs.
///
/// Membership is a set: equality ignores the order in which URLs were
/// inserted or returned by the remote system. Iteration order is the
/// lexical order of the URLs, which keeps diffs and the exposed member
/// list deterministic without relying on any remote ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberSet(BTreeSet<ResourceUrl>);

impl MemberSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse and collect raw URL strings, failing on the first invalid one.
    ///
    /// Duplicates are collapsed.
    pub fn parse<I, S>(urls: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .map(ResourceUrl::new)
            .collect::<ValidationResult<BTreeSet<_>>>()
            .map(Self)
    }

    /// Insert a member, returning `false` if it was already present.
    pub fn insert(&mut self, url: ResourceUrl) -> bool {
        self.0.insert(url)
    }

    pub fn remove(&mut self, url: &ResourceUrl) -> bool {
        self.0.remove(url)
    }

    pub fn contains(&self, url: &ResourceUrl) -> bool {
        self.0.contains(url)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, ResourceUrl> {
        self.0.iter()
    }

    /// Members of `self` that are not in `other`.
    pub fn difference(&self, other: &MemberSet) -> MemberSet {
        Self(self.0.difference(&other.0).cloned().collect())
    }

    pub fn union(&self, other: &MemberSet) -> MemberSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &MemberSet) -> MemberSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    /// Members in exactly one of the two sets.
    pub fn symmetric_difference(&self, other: &MemberSet) -> MemberSet {
        Self(self.0.symmetric_difference(&other.0).cloned().collect())
    }

    pub fn is_subset(&self, other: &MemberSet) -> bool {
        self.0.is_subset(&other.0)
    }

    pub fn is_disjoint(&self, other: &MemberSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    /// Members as plain strings, in iteration order.
    pub fn to_strings(&self) -> Vec<String> {
        self.0.iter().map(|url| url.as_str().to_string()).collect()
    }
}

impl FromIterator<ResourceUrl> for MemberSet {
    fn from_iter<T: IntoIterator<Item = ResourceUrl>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ResourceUrl> for MemberSet {
    fn extend<T: IntoIterator<Item = ResourceUrl>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for MemberSet {
    type Item = ResourceUrl;
    type IntoIter = btree_set::IntoIter<ResourceUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a MemberSet {
    type Item = &'a ResourceUrl;
    type IntoIter = btree_set::Iter<'a, ResourceUrl>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
