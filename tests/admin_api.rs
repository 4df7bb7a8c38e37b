//! Handler-level integration tests for the admin surface.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;

use admill::handlers::admin;
use admill::money::Money;
use test_util::{TestApp, bearer, issue_token, seed_admin, seed_user, test_app};

async fn admin_token(app: &TestApp) -> String {
    let admin_id = {
        let mut conn = app.state.conn().await.expect("conn");
        seed_admin(&mut conn, "root").await
    };
    issue_token(&app.state, admin_id).await
}

#[tokio::test]
async fn admin_surface_requires_admin_rights() {
    let app = test_app().await;
    let user_id = {
        let mut conn = app.state.conn().await.expect("conn");
        seed_user(&mut conn, "alice").await
    };
    let token = issue_token(&app.state, user_id).await;

    let err = admin::list_users(State(app.state.clone()), bearer(&token))
        .await
        .expect_err("non-admin");
    assert_eq!(err.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_user_rejects_duplicates() {
    let app = test_app().await;
    let token = admin_token(&app).await;

    let created = admin::create_user(
        State(app.state.clone()),
        bearer(&token),
        Json(admin::CreateUserRequest {
            username: "alice".to_owned(),
            password: "hunter2".to_owned(),
            is_admin: false,
        }),
    )
    .await
    .expect("create")
    .0;
    assert_eq!(created.username, "alice");
    assert!(!created.is_admin);

    let err = admin::create_user(
        State(app.state.clone()),
        bearer(&token),
        Json(admin::CreateUserRequest {
            username: "alice".to_owned(),
            password: "other".to_owned(),
            is_admin: false,
        }),
    )
    .await
    .expect_err("duplicate");
    assert_eq!(err.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn balance_adjustments_apply_and_validate() {
    let app = test_app().await;
    let token = admin_token(&app).await;
    let user_id = {
        let mut conn = app.state.conn().await.expect("conn");
        seed_user(&mut conn, "alice").await
    };

    let view = admin::adjust_balance(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
        Json(admin::AdjustRequest {
            field: "milestone_amount".to_owned(),
            op: "set".to_owned(),
            amount: Some("12.50".to_owned()),
        }),
    )
    .await
    .expect("set")
    .0;
    assert_eq!(view.milestone_amount, Money::from_minor(1_250));

    let view = admin::adjust_balance(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
        Json(admin::AdjustRequest {
            field: "points".to_owned(),
            op: "add".to_owned(),
            amount: Some("15".to_owned()),
        }),
    )
    .await
    .expect("points add")
    .0;
    assert_eq!(view.points, 15);

    let view = admin::adjust_balance(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
        Json(admin::AdjustRequest {
            field: "milestone_amount".to_owned(),
            op: "reset".to_owned(),
            amount: None,
        }),
    )
    .await
    .expect("reset")
    .0;
    assert_eq!(view.milestone_amount, Money::ZERO);

    let err = admin::adjust_balance(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
        Json(admin::AdjustRequest {
            field: "username".to_owned(),
            op: "set".to_owned(),
            amount: Some("1.00".to_owned()),
        }),
    )
    .await
    .expect_err("unknown field");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let err = admin::adjust_balance(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
        Json(admin::AdjustRequest {
            field: "milestone_amount".to_owned(),
            op: "add".to_owned(),
            amount: Some("-5.00".to_owned()),
        }),
    )
    .await
    .expect_err("would go negative");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn restriction_and_milestone_round_trip() {
    let app = test_app().await;
    let token = admin_token(&app).await;
    let user_id = {
        let mut conn = app.state.conn().await.expect("conn");
        seed_user(&mut conn, "alice").await
    };

    let view = admin::put_restriction(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
        Json(admin::RestrictionRequest {
            ads_limit: 10,
            deposit: Money::from_minor(50_000),
            commission: Money::from_minor(20),
        }),
    )
    .await
    .expect("impose")
    .0;
    let restriction = view.restriction.expect("restriction set");
    assert_eq!(restriction.ads_limit, 10);
    assert!(!restriction.awaiting_deposit);

    let view = admin::delete_restriction(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
    )
    .await
    .expect("lift")
    .0;
    assert!(view.restriction.is_none());

    let view = admin::put_milestone(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
        Json(admin::MilestoneRequest {
            target: 50,
            kind: "bonus".to_owned(),
            prize: Money::from_minor(10_000),
        }),
    )
    .await
    .expect("milestone")
    .0;
    let milestone = view.milestone.expect("milestone set");
    assert_eq!(milestone.target, 50);
    assert_eq!(milestone.kind, "bonus");

    let err = admin::put_milestone(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
        Json(admin::MilestoneRequest {
            target: 50,
            kind: "jackpot".to_owned(),
            prize: Money::from_minor(10_000),
        }),
    )
    .await
    .expect_err("unknown kind");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ads_crud_and_withdrawal_resolution() {
    let app = test_app().await;
    let token = admin_token(&app).await;

    let ad = admin::create_ad(
        State(app.state.clone()),
        bearer(&token),
        Json(admin::CreateAdRequest {
            title: "Watch this".to_owned(),
            price: Money::from_minor(500),
            active: None,
        }),
    )
    .await
    .expect("create ad")
    .0;
    assert!(ad.active, "ads default to active");

    let ad = admin::update_ad(
        State(app.state.clone()),
        bearer(&token),
        Path(ad.id),
        Json(admin::UpdateAdRequest {
            title: None,
            price: Some(Money::from_minor(750)),
            active: Some(false),
        }),
    )
    .await
    .expect("update ad")
    .0;
    assert_eq!(ad.price, Money::from_minor(750));
    assert!(!ad.active);

    let err = admin::update_ad(
        State(app.state.clone()),
        bearer(&token),
        Path(ad.id),
        Json(admin::UpdateAdRequest {
            title: None,
            price: None,
            active: None,
        }),
    )
    .await
    .expect_err("empty changeset");
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    // Fund a user, open a request, approve it through the admin surface.
    let user_id = {
        let mut conn = app.state.conn().await.expect("conn");
        seed_user(&mut conn, "alice").await
    };
    admin::adjust_balance(
        State(app.state.clone()),
        bearer(&token),
        Path(user_id),
        Json(admin::AdjustRequest {
            field: "milestone_amount".to_owned(),
            op: "set".to_owned(),
            amount: Some("10.00".to_owned()),
        }),
    )
    .await
    .expect("fund");
    let request = {
        let mut conn = app.state.conn().await.expect("conn");
        admill::account::request_withdrawal(&mut conn, user_id, Money::from_minor(400))
            .await
            .expect("request")
    };

    let pending = admin::list_withdrawals(
        State(app.state.clone()),
        bearer(&token),
        Query(admin::WithdrawalFilter {
            status: Some("pending".to_owned()),
        }),
    )
    .await
    .expect("list")
    .0;
    assert_eq!(pending.len(), 1);

    let resolved = admin::approve_withdrawal(
        State(app.state.clone()),
        bearer(&token),
        Path(request.id),
    )
    .await
    .expect("approve")
    .0;
    assert_eq!(resolved.status, "approved");

    let err = admin::reject_withdrawal(
        State(app.state.clone()),
        bearer(&token),
        Path(request.id),
    )
    .await
    .expect_err("already resolved");
    assert_eq!(err.status(), StatusCode::CONFLICT);

    let remaining = admin::list_withdrawals(
        State(app.state.clone()),
        bearer(&token),
        Query(admin::WithdrawalFilter { status: None }),
    )
    .await
    .expect("list all")
    .0;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].status, "approved");
}
