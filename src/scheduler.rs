use crate::models::{RoutineStore, RuleRequest, ScheduledProduct, Slot};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum RecurrenceRule {
    Daily,
    #[serde(rename = "alternate")]
    EveryOtherDay,
    /// Weekday indices, 0 = Sunday.
    Weekly { weekdays: BTreeSet<u8> },
    #[serde(rename = "custom")]
    CustomInterval { days: u32 },
}

impl RecurrenceRule {
    pub fn weekly(weekdays: impl IntoIterator<Item = i64>) -> Self {
        let weekdays = weekdays
            .into_iter()
            .filter(|day| (0..7).contains(day))
            .map(|day| day as u8)
            .collect();
        RecurrenceRule::Weekly { weekdays }
    }

    pub fn custom(days: i64) -> Self {
        let days = if days >= 1 { u32::try_from(days).unwrap_or(u32::MAX) } else { 1 };
        RecurrenceRule::CustomInterval { days }
    }

    /// `None` for an unrecognised frequency name.
    pub fn from_request(request: RuleRequest) -> Option<Self> {
        match request.frequency.trim() {
            "daily" => Some(RecurrenceRule::Daily),
            "alternate" => Some(RecurrenceRule::EveryOtherDay),
            "weekly" => Some(RecurrenceRule::weekly(request.weekdays)),
            "custom" => Some(RecurrenceRule::custom(coerce_interval(request.custom_days.as_ref()))),
            _ => None,
        }
    }

    fn includes(&self, date: NaiveDate, offset: u32) -> bool {
        match self {
            RecurrenceRule::Daily => true,
            RecurrenceRule::EveryOtherDay => offset % 2 == 0,
            RecurrenceRule::Weekly { weekdays } => {
                weekdays.contains(&(date.weekday().num_days_from_sunday() as u8))
            }
            RecurrenceRule::CustomInterval { days } => offset % (*days).max(1) == 0,
        }
    }
}

/// Numbers and numeric strings pass through, fractions truncated; anything
/// else becomes 1.
fn coerce_interval(value: Option<&serde_json::Value>) -> i64 {
    let parsed = match value {
        Some(serde_json::Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.trunc() as i64)),
        Some(serde_json::Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    };
    match parsed {
        Some(days) if days >= 1 => days,
        _ => 1,
    }
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first - Duration::days(1))
        .unwrap_or(date)
}

/// Every date from `start` through the end of its month, inclusive.
pub fn rest_of_month(start: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let end = last_day_of_month(start);
    start.iter_days().take_while(move |date| *date <= end)
}

/// Schedules `product` into `slot` on each date selected by `rule`, from
/// `start` to the last day of `start`'s month. Recurrence never crosses into
/// the next month. Returns the dates that received a new entry.
pub fn expand(
    store: &mut RoutineStore,
    product: &ScheduledProduct,
    start: NaiveDate,
    slot: Slot,
    rule: &RecurrenceRule,
) -> Vec<NaiveDate> {
    let mut inserted = Vec::new();
    for date in rest_of_month(start) {
        let offset = date.day() - start.day();
        if rule.includes(date, offset) && store.insert(date, slot, product) {
            inserted.push(date);
        }
    }
    inserted
}

/// Removes `product_id` from `slot` on `date`, or with `cascade` on every
/// date from `date` through month end. Returns the dates it was removed from.
pub fn remove_scoped(
    store: &mut RoutineStore,
    date: NaiveDate,
    slot: Slot,
    product_id: u64,
    cascade: bool,
) -> Vec<NaiveDate> {
    if !cascade {
        return if store.remove(date, slot, product_id) {
            vec![date]
        } else {
            Vec::new()
        };
    }

    rest_of_month(date)
        .filter(|day| store.remove(*day, slot, product_id))
        .collect()
}
