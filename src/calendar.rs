use crate::models::{CalendarDay, MonthResponse, RoutineStore, WeekDay, WeekResponse};
use crate::scheduler::rest_of_month;
use chrono::{Datelike, Duration, NaiveDate};

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", value.trim()), "%Y-%m-%d").ok()
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

pub fn build_month(store: &RoutineStore, any_day: NaiveDate) -> MonthResponse {
    let first = first_of_month(any_day);
    let days = rest_of_month(first)
        .map(|date| {
            let routine = store.day(date);
            CalendarDay {
                date,
                has_am: !routine.am.is_empty(),
                has_pm: !routine.pm.is_empty(),
            }
        })
        .collect();

    MonthResponse {
        year: first.year(),
        month: first.month(),
        leading_blanks: first.weekday().num_days_from_sunday(),
        days,
    }
}

pub fn build_week(store: &RoutineStore, date: NaiveDate) -> WeekResponse {
    let start = week_start(date);
    let days = (0..7)
        .map(|offset| {
            let day = start + Duration::days(offset);
            let routine = store.day(day);
            WeekDay {
                date: day,
                am: routine.am.iter().map(|p| p.name.clone()).collect(),
                pm: routine.pm.iter().map(|p| p.name.clone()).collect(),
            }
        })
        .collect();

    WeekResponse { start, days }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScheduledProduct, Slot};
    use crate::scheduler::{RecurrenceRule, expand};

    fn spf() -> ScheduledProduct {
        ScheduledProduct {
            id: 4,
            name: "Daily Mineral SPF 30".to_string(),
            brand: "SunSafe".to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn month_grid_marks_scheduled_slots() {
        let mut store = RoutineStore::default();
        let start = NaiveDate::from_ymd_opt(2024, 9, 28).unwrap();
        expand(&mut store, &spf(), start, Slot::AM, &RecurrenceRule::Daily);

        let month = build_month(&store, start);
        assert_eq!((month.year, month.month), (2024, 9));
        assert_eq!(month.days.len(), 30);
        // 2024-09-01 is a Sunday.
        assert_eq!(month.leading_blanks, 0);
        let marked: Vec<u32> = month
            .days
            .iter()
            .filter(|d| d.has_am)
            .map(|d| d.date.day())
            .collect();
        assert_eq!(marked, vec![28, 29, 30]);
        assert!(month.days.iter().all(|d| !d.has_pm));
    }

    #[test]
    fn week_starts_on_sunday() {
        let mut store = RoutineStore::default();
        let wednesday = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
        expand(&mut store, &spf(), wednesday, Slot::PM, &RecurrenceRule::Daily);

        let week = build_week(&store, wednesday);
        assert_eq!(week.start, NaiveDate::from_ymd_opt(2024, 1, 14).unwrap());
        assert!(week.days[2].pm.is_empty());
        assert_eq!(week.days[3].pm, vec!["Daily Mineral SPF 30".to_string()]);
        assert_eq!(week.days[6].pm.len(), 1);
    }

    #[test]
    fn parse_month_accepts_year_month() {
        assert_eq!(parse_month("2024-02"), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("soon"), None);
    }
}
