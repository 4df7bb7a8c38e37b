//! Integration tests for milestone payouts.

use admill::{
    account,
    db::{get_user, list_entries_for_user},
    ledger::{Milestone, MilestoneKind},
    money::Money,
};
use test_util::{memory_conn, seed_ad, seed_user};

#[tokio::test]
async fn bonus_milestone_pays_instantly_and_clears() {
    let mut conn = memory_conn().await;
    let user_id = seed_user(&mut conn, "alice").await;
    let ad_id = seed_ad(&mut conn, "Watch this", 100).await;

    account::set_milestone(
        &mut conn,
        user_id,
        Milestone {
            target: 3,
            kind: MilestoneKind::Bonus,
            prize: Money::from_minor(5_000),
        },
    )
    .await
    .expect("milestone");

    for _ in 0..3 {
        account::click_ad(&mut conn, user_id, ad_id)
            .await
            .expect("click");
    }

    let user = get_user(&mut conn, user_id)
        .await
        .expect("lookup")
        .expect("user");
    // Three clicks at 1.00 plus the 50.00 bonus; balance adds, never clears.
    assert_eq!(user.milestone_amount, 5_300);
    assert!(!user.locked);
    assert_eq!(user.ongoing_milestone, None, "milestone consumed");
    assert_eq!(user.milestone_kind, None);

    let entries = list_entries_for_user(&mut conn, user_id, 10)
        .await
        .expect("entries");
    assert_eq!(entries[0].kind, "milestone_bonus");
    assert_eq!(entries[0].amount, 5_000);
    assert_eq!(entries[0].balance_after, 5_300);
}

#[tokio::test]
async fn voucher_milestone_locks_then_deposit_releases() {
    let mut conn = memory_conn().await;
    let user_id = seed_user(&mut conn, "alice").await;
    let ad_id = seed_ad(&mut conn, "Watch this", 100).await;

    account::set_milestone(
        &mut conn,
        user_id,
        Milestone {
            target: 2,
            kind: MilestoneKind::Voucher,
            prize: Money::from_minor(2_000),
        },
    )
    .await
    .expect("milestone");

    account::click_ad(&mut conn, user_id, ad_id).await.expect("click");
    account::click_ad(&mut conn, user_id, ad_id).await.expect("click");

    let user = get_user(&mut conn, user_id)
        .await
        .expect("lookup")
        .expect("user");
    assert!(user.locked, "voucher locks at the target");
    assert_eq!(user.milestone_amount, 200, "prize not yet credited");
    assert_eq!(user.ongoing_milestone, Some(2), "prize still pending");

    let outcome = account::record_deposit(&mut conn, user_id, Money::from_minor(500))
        .await
        .expect("deposit");
    assert!(!outcome.state.locked);

    let user = get_user(&mut conn, user_id)
        .await
        .expect("lookup")
        .expect("user");
    assert_eq!(user.milestone_amount, 2_200, "prize released by deposit");
    assert!(!user.locked);
    assert_eq!(user.ongoing_milestone, None);

    let entries = list_entries_for_user(&mut conn, user_id, 10)
        .await
        .expect("entries");
    assert_eq!(entries[0].kind, "voucher_release");
    assert_eq!(entries[1].kind, "deposit");
}

#[tokio::test]
async fn replacing_an_uncompleted_milestone_is_allowed() {
    let mut conn = memory_conn().await;
    let user_id = seed_user(&mut conn, "alice").await;

    for target in [5, 8] {
        account::set_milestone(
            &mut conn,
            user_id,
            Milestone {
                target,
                kind: MilestoneKind::Bonus,
                prize: Money::from_minor(1_000),
            },
        )
        .await
        .expect("milestone");
    }

    let user = get_user(&mut conn, user_id)
        .await
        .expect("lookup")
        .expect("user");
    assert_eq!(user.ongoing_milestone, Some(8));
}
