//! Pagination tests for sets larger than a single member page.

use crate::assert_same_members;
use crate::common::TestContext;
use crate::common::fixtures::group_members;
use resource_set_reconciler::ApiOperation;
use resource_set_reconciler::api::InMemoryResourceSetApi;

/// A 201-member set spans three pages of 100 and reads back complete.
#[tokio::test]
async fn test_201_members_across_three_pages() {
    let ctx = TestContext::new(2001);
    let declared = ctx.declared("testing, testing", group_members(&ctx, 201));

    let created = ctx.reconciler.create(&declared).await.unwrap();
    let id = created.id.clone().unwrap();
    assert_eq!(created.member_count(), 201);

    ctx.api.reset_call_counts().await;
    let members = ctx.reconciler.fetch_all_members(&id).await.unwrap();

    assert_eq!(members.len(), 201);
    assert_same_members!(members, declared.members);
    assert_eq!(
        ctx.api.call_count(ApiOperation::ListResourceSetMembers).await,
        3
    );
}

/// Creating a set larger than the payload limit patches in the remainder.
#[tokio::test]
async fn test_create_beyond_payload_limit() {
    let ctx = TestContext::new(2002);
    let declared = ctx.declared("testing", group_members(&ctx, 201));

    ctx.reconciler.create(&declared).await.unwrap();

    assert_eq!(ctx.api.call_count(ApiOperation::CreateResourceSet).await, 1);
    assert_eq!(ctx.api.call_count(ApiOperation::PatchResourceSet).await, 2);
    assert_eq!(ctx.api.stats().await.total_members, 201);
}

/// The remote's page cap wins over a larger requested page size.
#[tokio::test]
async fn test_small_remote_pages() {
    let api = InMemoryResourceSetApi::new().with_max_page_size(25);
    let ctx = TestContext::with_api(2003, api);
    let declared = ctx.declared("testing", group_members(&ctx, 60));
    let id = ctx.reconciler.create(&declared).await.unwrap().id.unwrap();

    ctx.api.reset_call_counts().await;
    let members = ctx.reconciler.fetch_all_members(&id).await.unwrap();

    assert_same_members!(members, declared.members);
    assert_eq!(
        ctx.api.call_count(ApiOperation::ListResourceSetMembers).await,
        3
    );
}

/// Shrinking a large set to a handful of members removes across pages.
#[tokio::test]
async fn test_shrink_large_set() {
    let ctx = TestContext::new(2004);
    let large = ctx.declared("testing", group_members(&ctx, 201));
    let id = ctx.reconciler.create(&large).await.unwrap().id.unwrap();

    let small = ctx.declared("testing", group_members(&ctx, 5));
    let state = ctx.reconciler.update(&id, &small).await.unwrap();

    assert_eq!(state.member_count(), 5);
    assert_same_members!(ctx.api.members_of(&id).await.unwrap(), small.members);
}
