use crate::value_objects::bar::Bar;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Start and end of the trailing window of `days` calendar days ending at `now`.
pub fn trailing_window(now: DateTime<Utc>, days: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    (now - Duration::days(i64::from(days)), now)
}

/// Keeps bars inside `[start, end]`, ordered by timestamp, one bar per
/// timestamp (the last one seen wins).
pub fn clamp_to_window(bars: Vec<Bar>, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Bar> {
    let (start_ts, end_ts) = (start.timestamp(), end.timestamp());
    let by_ts: BTreeMap<i64, Bar> = bars
        .into_iter()
        .filter(|bar| bar.timestamp >= start_ts && bar.timestamp <= end_ts)
        .map(|bar| (bar.timestamp, bar))
        .collect();
    by_ts.into_values().collect()
}
