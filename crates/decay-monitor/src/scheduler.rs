use chrono::{DateTime, Duration, NaiveTime, Utc};
use tokio::task::JoinHandle;

use crate::cycle::run_daily_cycle;
use crate::AppState;

/// Next occurrence of `hour_utc:00:00` strictly after `now`.
pub fn next_run_after(now: DateTime<Utc>, hour_utc: u32) -> DateTime<Utc> {
    let run_time = NaiveTime::from_hms_opt(hour_utc.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    let today = now.date_naive().and_time(run_time).and_utc();
    if today > now {
        today
    } else {
        today + Duration::days(1)
    }
}

/// Run the daily cycle once a day at the configured UTC hour.
pub fn spawn_daily(state: AppState) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let next = next_run_after(now, state.config.daily_run_hour_utc);
            tracing::info!("Next daily decay cycle at {}", next.to_rfc3339());

            let wait = (next - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            run_daily_cycle(
                &state.analyzer,
                &state.coordinator,
                &state.notifier,
                &state.config.watchlist,
                state.config.cron_delay,
            )
            .await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_run_later_today() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 8, 30, 0).unwrap();
        assert_eq!(
            next_run_after(now, 13),
            Utc.with_ymd_and_hms(2024, 5, 10, 13, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_run_tomorrow_when_passed() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 13, 0, 0).unwrap();
        assert_eq!(
            next_run_after(now, 13),
            Utc.with_ymd_and_hms(2024, 5, 11, 13, 0, 0).unwrap()
        );

        let late = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 0).unwrap();
        assert_eq!(
            next_run_after(late, 0),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }
}
