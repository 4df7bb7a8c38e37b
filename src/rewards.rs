//! Nightly reward reset task.
//!
//! Zeroes every user's daily reward counter at a configured UTC hour. The
//! task lives for the whole server run; the HTTP entry point aborts it on
//! shutdown. Operators can also trigger the same reset once via the
//! `reset-rewards` subcommand.

use std::time::Duration;

use chrono::{NaiveDateTime, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::db::{self, DbPool};

/// Fallback wait when the next reset instant cannot be computed.
const RETRY_WAIT: Duration = Duration::from_secs(3600);

/// Spawn the daily reset loop.
///
/// `utc_hour` must already be validated to the 0-23 range.
pub fn spawn_daily_reset(pool: DbPool, utc_hour: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = wait_until_next(utc_hour, Utc::now().naive_utc());
            tokio::time::sleep(wait).await;
            run_reset(&pool).await;
        }
    })
}

/// Execute one reset pass against the pool.
async fn run_reset(pool: &DbPool) {
    match pool.get().await {
        Ok(mut conn) => match db::reset_daily_rewards(&mut conn).await {
            Ok(touched) => info!(users = touched, "daily reward reset complete"),
            Err(e) => error!(%e, "daily reward reset failed"),
        },
        Err(e) => error!(%e, "daily reward reset could not obtain a connection"),
    }
}

/// Time to sleep from `now` until the next occurrence of `utc_hour:00:00`.
fn wait_until_next(utc_hour: u32, now: NaiveDateTime) -> Duration {
    let Some(today) = now.date().and_hms_opt(utc_hour, 0, 0) else {
        return RETRY_WAIT;
    };
    let target = if today > now {
        today
    } else {
        let Some(tomorrow) = TimeDelta::try_days(1).and_then(|d| today.checked_add_signed(d))
        else {
            return RETRY_WAIT;
        };
        tomorrow
    };
    (target - now).to_std().unwrap_or(RETRY_WAIT)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .expect("date")
            .and_hms_opt(h, m, s)
            .expect("time")
    }

    #[rstest]
    #[case(5, at(3, 0, 0), 2 * 3600)]
    #[case(5, at(5, 0, 0), 24 * 3600)]
    #[case(5, at(6, 30, 0), 22 * 3600 + 30 * 60)]
    #[case(0, at(23, 59, 30), 30)]
    fn computes_wait_until_next_reset(
        #[case] utc_hour: u32,
        #[case] now: NaiveDateTime,
        #[case] expected_secs: u64,
    ) {
        assert_eq!(
            wait_until_next(utc_hour, now),
            Duration::from_secs(expected_secs)
        );
    }

    #[test]
    fn invalid_hour_falls_back_to_retry_wait() {
        assert_eq!(wait_until_next(24, at(1, 0, 0)), RETRY_WAIT);
    }
}
