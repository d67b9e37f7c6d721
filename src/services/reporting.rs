//! Aggregate figures for the admin dashboard.

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::db::Store;

const LOGIN_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DayCount {
    pub date: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub total_registrations: u64,
    pub total_logins: u64,
    pub unique_logins: u64,
    pub blocked_users: u64,
    pub logins_by_day: Vec<DayCount>,
    pub by_ticket_type: BTreeMap<String, i64>,
}

/// Buckets RFC 3339 login timestamps into the seven calendar days ending at
/// `today`, zero-filling days with no logins so charts always get a full
/// week.
fn bucket_logins_by_day(times: &[String], today: NaiveDate) -> Vec<DayCount> {
    let mut buckets: BTreeMap<String, i64> = (0..LOGIN_WINDOW_DAYS)
        .map(|offset| {
            let day = today - Duration::days(LOGIN_WINDOW_DAYS - 1 - offset);
            (day.format("%Y-%m-%d").to_string(), 0)
        })
        .collect();

    for time in times {
        // RFC 3339 timestamps start with the YYYY-MM-DD date.
        let day = &time[..time.len().min(10)];
        if let Some(count) = buckets.get_mut(day) {
            *count += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(date, count)| DayCount { date, count })
        .collect()
}

pub async fn build_stats(store: &Store) -> Result<StatsReport> {
    let today = Utc::now().date_naive();
    let cutoff = (today - Duration::days(LOGIN_WINDOW_DAYS - 1))
        .format("%Y-%m-%d")
        .to_string();

    let login_times = store.login_times_since(&cutoff).await?;

    Ok(StatsReport {
        total_registrations: store.registration_count().await?,
        total_logins: store.login_count().await?,
        unique_logins: store.unique_login_count().await?,
        blocked_users: store.blocked_registration_count().await?,
        logins_by_day: bucket_logins_by_day(&login_times, today),
        by_ticket_type: store
            .registrations_by_ticket_type()
            .await?
            .into_iter()
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_cover_a_full_zero_filled_week() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let buckets = bucket_logins_by_day(&[], today);

        assert_eq!(buckets.len(), 7);
        assert_eq!(buckets[0].date, "2026-08-23");
        assert_eq!(buckets[6].date, "2026-08-29");
        assert!(buckets.iter().all(|b| b.count == 0));
    }

    #[test]
    fn timestamps_land_in_their_calendar_day() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let times = vec![
            "2026-08-29T00:00:01+00:00".to_string(),
            "2026-08-29T23:59:59+00:00".to_string(),
            "2026-08-27T12:00:00+00:00".to_string(),
            // Older than the window; ignored.
            "2026-08-01T12:00:00+00:00".to_string(),
        ];

        let buckets = bucket_logins_by_day(&times, today);
        assert_eq!(buckets[6].count, 2);
        assert_eq!(buckets[4].count, 1);
        assert_eq!(buckets[5].count, 0);
    }
}
