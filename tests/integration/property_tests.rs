//! Property-based tests for membership diffs.
//!
//! Generated declared and actual memberships are drawn from a small pool of
//! paths so that overlaps, subsets and disjoint sets all occur often.

use crate::common::TestContext;
use proptest::prelude::*;
use resource_set_reconciler::api::{InMemoryResourceSetApi, MemberOrder};
use resource_set_reconciler::{ApiOperation, MemberSet, ResourceUrl, compute_diff};

/// Strategy producing memberships of up to 12 URLs from a pool of 20.
fn member_set() -> impl Strategy<Value = MemberSet> {
    prop::collection::btree_set(0u8..20, 0..12).prop_map(|indices| {
        indices
            .into_iter()
            .map(|i| {
                ResourceUrl::new(format!("https://org.example.com/api/v1/groups/00g{:02}", i))
                    .unwrap()
            })
            .collect()
    })
}

proptest! {
    /// Applying a diff to the actual set yields the declared set, and the
    /// diff never adds what is present or removes what is absent.
    #[test]
    fn test_diff_algebra(declared in member_set(), actual in member_set()) {
        let diff = compute_diff(&declared, &actual);

        prop_assert_eq!(actual.union(&diff.additions).difference(&diff.removals), declared);
        prop_assert!(diff.additions.is_disjoint(&actual));
        prop_assert!(diff.removals.is_subset(&actual));
    }

    /// A diff against itself is always empty.
    #[test]
    fn test_self_diff_is_empty(members in member_set()) {
        prop_assert!(compute_diff(&members, &members).is_empty());
    }

    /// Chunking a diff loses nothing and respects the chunk size.
    #[test]
    fn test_chunks_cover_diff(
        declared in member_set(),
        actual in member_set(),
        max_items in 1usize..6,
    ) {
        let diff = compute_diff(&declared, &actual);
        let patches = diff.clone().into_patches(max_items);

        let mut additions = MemberSet::new();
        let mut removals = MemberSet::new();
        for patch in &patches {
            prop_assert!(!patch.is_empty());
            prop_assert!(patch.len() <= max_items);
            additions.extend(patch.additions.iter().cloned());
            removals.extend(patch.removals.iter().cloned());
        }
        prop_assert_eq!(additions, diff.additions);
        prop_assert_eq!(removals, diff.removals);
    }

    /// Reconciling converges, and reconciling again sends nothing.
    #[test]
    fn test_reconcile_idempotent(declared in member_set(), actual in member_set()) {
        tokio_test::block_on(async {
            let api = InMemoryResourceSetApi::new().with_max_page_size(3);
            let ctx = TestContext::with_api(5001, api);
            let start = ctx.declared("testing", actual.clone());
            let id = ctx.reconciler.create(&start).await.unwrap().id.unwrap();

            let diff = compute_diff(&declared, &actual);
            ctx.reconciler.apply_diff(&id, diff).await.unwrap();
            let current = ctx.reconciler.fetch_all_members(&id).await.unwrap();
            assert_eq!(current, declared);

            ctx.api.reset_call_counts().await;
            let again = ctx.reconciler.compute_diff(&declared, &current);
            assert!(again.is_empty());
            ctx.reconciler.apply_diff(&id, again).await.unwrap();
            assert_eq!(ctx.api.call_count(ApiOperation::PatchResourceSet).await, 0);
        });
    }

    /// Remote member order never changes what is fetched.
    #[test]
    fn test_fetch_order_independent(members in member_set(), page_size in 1usize..5) {
        tokio_test::block_on(async {
            let ascending = TestContext::with_api(
                5002,
                InMemoryResourceSetApi::new().with_max_page_size(page_size),
            );
            let descending = TestContext::with_api(
                5003,
                InMemoryResourceSetApi::new()
                    .with_max_page_size(page_size)
                    .with_member_order(MemberOrder::Descending),
            );

            let mut fetched = Vec::new();
            for ctx in [&ascending, &descending] {
                let declared = ctx.declared("testing", members.clone());
                let id = ctx.reconciler.create(&declared).await.unwrap().id.unwrap();
                fetched.push(ctx.reconciler.fetch_all_members(&id).await.unwrap());
            }

            assert_eq!(fetched[0], members);
            assert_eq!(fetched[1], members);
            assert!(compute_diff(&fetched[0], &fetched[1]).is_empty());
        });
    }
}
