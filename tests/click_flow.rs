//! Integration tests for the ad-click earning flow.
//!
//! Exercises the transactional click operation end to end: balance credits,
//! counters, audit-trail rows, and the rejection paths for inactive ads and
//! locked accounts.

use admill::{
    account,
    db::{get_user, list_entries_for_user, update_ad, AdChanges},
    error::ApiError,
    ledger::{LedgerError, Milestone, MilestoneKind},
    money::Money,
};
use test_util::{memory_conn, seed_ad, seed_user};

#[tokio::test]
async fn click_credits_balance_and_writes_ledger() {
    let mut conn = memory_conn().await;
    let user_id = seed_user(&mut conn, "alice").await;
    let ad_id = seed_ad(&mut conn, "Watch this", 25).await;

    let outcome = account::click_ad(&mut conn, user_id, ad_id)
        .await
        .expect("click");
    assert_eq!(outcome.state.milestone_amount, Money::from_minor(25));
    assert_eq!(outcome.state.milestone_reward, Money::from_minor(25));
    assert_eq!(outcome.state.points, 1);
    assert_eq!(outcome.state.total_ads_completed, 1);

    let user = get_user(&mut conn, user_id)
        .await
        .expect("lookup")
        .expect("user");
    assert_eq!(user.milestone_amount, 25, "credit persisted");
    assert_eq!(user.total_ads_completed, 1);

    let entries = list_entries_for_user(&mut conn, user_id, 10)
        .await
        .expect("entries");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, "ad_click");
    assert_eq!(entries[0].amount, 25);
    assert_eq!(entries[0].balance_after, 25);
    assert_eq!(entries[0].ad_id, Some(ad_id));
}

#[tokio::test]
async fn every_primary_balance_change_has_a_matching_entry() {
    let mut conn = memory_conn().await;
    let user_id = seed_user(&mut conn, "alice").await;
    let ad_id = seed_ad(&mut conn, "Watch this", 40).await;

    for _ in 0..5 {
        account::click_ad(&mut conn, user_id, ad_id)
            .await
            .expect("click");
    }

    let user = get_user(&mut conn, user_id)
        .await
        .expect("lookup")
        .expect("user");
    let entries = list_entries_for_user(&mut conn, user_id, 50)
        .await
        .expect("entries");
    let total: i64 = entries.iter().map(|e| e.amount).sum();
    assert_eq!(total, user.milestone_amount);
    // Entries are newest first; the most recent one carries the final balance.
    assert_eq!(entries[0].balance_after, user.milestone_amount);
}

#[tokio::test]
async fn unknown_and_inactive_ads_are_rejected() {
    let mut conn = memory_conn().await;
    let user_id = seed_user(&mut conn, "alice").await;
    let ad_id = seed_ad(&mut conn, "Gone soon", 25).await;

    let err = account::click_ad(&mut conn, user_id, ad_id + 1)
        .await
        .expect_err("unknown ad");
    assert!(matches!(err, ApiError::NotFound("ad")));

    update_ad(
        &mut conn,
        ad_id,
        &AdChanges {
            active: Some(false),
            ..AdChanges::default()
        },
    )
    .await
    .expect("deactivate");

    let err = account::click_ad(&mut conn, user_id, ad_id)
        .await
        .expect_err("inactive ad");
    assert!(matches!(err, ApiError::NotFound("ad")));

    let user = get_user(&mut conn, user_id)
        .await
        .expect("lookup")
        .expect("user");
    assert_eq!(user.milestone_amount, 0, "no state change on rejection");
    assert_eq!(user.total_ads_completed, 0);
}

#[tokio::test]
async fn locked_account_is_rejected_and_unchanged() {
    let mut conn = memory_conn().await;
    let user_id = seed_user(&mut conn, "alice").await;
    let ad_id = seed_ad(&mut conn, "Watch this", 25).await;

    account::set_milestone(
        &mut conn,
        user_id,
        Milestone {
            target: 1,
            kind: MilestoneKind::Voucher,
            prize: Money::from_minor(10_000),
        },
    )
    .await
    .expect("milestone");
    account::click_ad(&mut conn, user_id, ad_id)
        .await
        .expect("click reaches the voucher target");

    let err = account::click_ad(&mut conn, user_id, ad_id)
        .await
        .expect_err("locked");
    assert!(matches!(
        err,
        ApiError::Ledger(LedgerError::AccountLocked)
    ));

    let user = get_user(&mut conn, user_id)
        .await
        .expect("lookup")
        .expect("user");
    assert!(user.locked);
    assert_eq!(user.total_ads_completed, 1, "rejected click not counted");
}
