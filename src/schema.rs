diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        password -> Text,
        is_admin -> Bool,
        milestone_amount -> BigInt,
        milestone_reward -> BigInt,
        destination_amount -> BigInt,
        points -> Integer,
        total_ads_completed -> Integer,
        ongoing_milestone -> Nullable<Integer>,
        milestone_kind -> Nullable<Text>,
        milestone_prize -> BigInt,
        locked -> Bool,
        restriction_ads_limit -> Nullable<Integer>,
        restriction_deposit -> BigInt,
        restriction_commission -> BigInt,
        restricted_ads_completed -> Integer,
        created_at -> Timestamp,
    }
}

diesel::table! {
    ads (id) {
        id -> Integer,
        title -> Text,
        price -> BigInt,
        active -> Bool,
        created_at -> Timestamp,
    }
}

diesel::table! {
    ledger_entries (id) {
        id -> Integer,
        user_id -> Integer,
        ad_id -> Nullable<Integer>,
        kind -> Text,
        amount -> BigInt,
        balance_after -> BigInt,
        note -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    withdrawals (id) {
        id -> Integer,
        user_id -> Integer,
        amount -> BigInt,
        status -> Text,
        requested_at -> Timestamp,
        resolved_at -> Nullable<Timestamp>,
    }
}

diesel::table! {
    deposits (id) {
        id -> Integer,
        user_id -> Integer,
        amount -> BigInt,
        created_at -> Timestamp,
    }
}

diesel::joinable!(ledger_entries -> users (user_id));
diesel::joinable!(withdrawals -> users (user_id));
diesel::joinable!(deposits -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, ads, ledger_entries, withdrawals, deposits);
