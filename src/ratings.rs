use crate::models::SkinRating;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// Daily averages at or above this count as a good skin day.
pub const GOOD_DAY_THRESHOLD: f64 = 7.0;

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Collapses `(date, rating)` samples into one mean rating per date, most
/// recent first.
pub fn daily_average<I>(samples: I) -> Vec<SkinRating>
where
    I: IntoIterator<Item = (NaiveDate, f64)>,
{
    let mut days: BTreeMap<NaiveDate, (f64, u32)> = BTreeMap::new();
    for (date, rating) in samples {
        let entry = days.entry(date).or_insert((0.0, 0));
        entry.0 += rating;
        entry.1 += 1;
    }

    days.into_iter()
        .rev()
        .map(|(date, (sum, count))| SkinRating {
            date,
            rating: round1(sum / f64::from(count)),
            notes: None,
        })
        .collect()
}

fn most_recent_first(daily: &[SkinRating]) -> Vec<&SkinRating> {
    let mut sorted: Vec<&SkinRating> = daily.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// Mean of the `n` most recent entries that exist. Missing calendar days are
/// skipped, not counted as zero, so fewer than `n` entries average over what
/// is there.
pub fn rolling_average(daily: &[SkinRating], n: usize) -> f64 {
    if daily.is_empty() || n == 0 {
        return 0.0;
    }
    let recent = most_recent_first(daily);
    let window = &recent[..n.min(recent.len())];
    let sum: f64 = window.iter().map(|entry| entry.rating).sum();
    round1(sum / window.len() as f64)
}

/// Rolling average over the `n` entries preceding the most recent `n`.
pub fn previous_average(daily: &[SkinRating], n: usize) -> f64 {
    let older: Vec<SkinRating> = most_recent_first(daily)
        .into_iter()
        .skip(n)
        .cloned()
        .collect();
    rolling_average(&older, n)
}

/// Current window minus the previous one; 0 when there is no prior baseline.
pub fn improvement(daily: &[SkinRating], n: usize) -> f64 {
    let current = rolling_average(daily, n);
    let previous = previous_average(daily, n);
    if !previous.is_finite() || previous <= 0.0 {
        return 0.0;
    }
    round1(current - previous)
}

pub fn good_days(daily: &[SkinRating], n: usize) -> usize {
    most_recent_first(daily)
        .into_iter()
        .take(n)
        .filter(|entry| entry.rating >= GOOD_DAY_THRESHOLD)
        .count()
}

/// Fixed demo series for the rating chart, one entry per day going back from
/// `today`, most recent first.
pub fn mock_ratings(today: NaiveDate) -> Vec<SkinRating> {
    const BASE: [f64; 7] = [8.0, 7.0, 7.0, 6.0, 8.0, 7.0, 6.0];
    BASE.iter()
        .enumerate()
        .map(|(offset, rating)| SkinRating {
            date: today - Duration::days(offset as i64),
            rating: *rating,
            notes: Some(String::new()),
        })
        .collect()
}
