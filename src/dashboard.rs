use crate::models::{AppData, DashboardResponse, RoutineItem, Slot, UpcomingItem};
use crate::progress::skin_rating;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};

pub fn build_dashboard(data: &AppData, window: usize) -> DashboardResponse {
    build_dashboard_at(Local::now().naive_local(), data, window)
}

pub fn build_dashboard_at(now: NaiveDateTime, data: &AppData, window: usize) -> DashboardResponse {
    let today = now.date();
    let today_items = routine_items(data, today);

    let done = today_items.iter().filter(|item| item.completed).count();
    let completion_rate = if today_items.is_empty() {
        0
    } else {
        (done * 100 / today_items.len()) as u8
    };

    DashboardResponse {
        date: today,
        greeting: greeting(now.hour()).to_string(),
        upcoming: upcoming(data, today, &today_items),
        today: today_items,
        completion_rate,
        skin_rating: skin_rating(data, window),
    }
}

fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=17 => "Good afternoon",
        _ => "Good evening",
    }
}

fn routine_items(data: &AppData, date: NaiveDate) -> Vec<RoutineItem> {
    let routine = data.routines.day(date);
    let completions = data.completions.get(&date).cloned().unwrap_or_default();

    [Slot::AM, Slot::PM]
        .into_iter()
        .flat_map(|slot| {
            let done = completions.slot(slot).clone();
            routine.slot(slot).iter().map(move |product| RoutineItem {
                id: product.id,
                name: product.name.clone(),
                slot,
                completed: done.contains(&product.id),
            }).collect::<Vec<_>>()
        })
        .collect()
}

/// Unfinished morning products first, then unfinished evening ones, then
/// tomorrow's routine once today is done.
fn upcoming(data: &AppData, today: NaiveDate, items: &[RoutineItem]) -> Vec<UpcomingItem> {
    for (slot, time) in [(Slot::AM, "This Morning"), (Slot::PM, "Tonight")] {
        let pending: Vec<UpcomingItem> = items
            .iter()
            .filter(|item| item.slot == slot && !item.completed)
            .map(|item| UpcomingItem {
                name: item.name.clone(),
                time: time.to_string(),
            })
            .collect();
        if !pending.is_empty() {
            return pending;
        }
    }

    let tomorrow = data.routines.day(today + Duration::days(1));
    [(Slot::AM, "Tomorrow AM"), (Slot::PM, "Tomorrow PM")]
        .into_iter()
        .flat_map(|(slot, time)| {
            tomorrow.slot(slot).iter().map(move |product| UpcomingItem {
                name: product.name.clone(),
                time: time.to_string(),
            }).collect::<Vec<_>>()
        })
        .collect()
}

/// Flips the completion mark for a product in today's routine. Returns the
/// new state, or `None` when the product is not scheduled in that slot.
pub fn toggle_completion(data: &mut AppData, date: NaiveDate, slot: Slot, product_id: u64) -> Option<bool> {
    if !data.routines.day(date).contains(slot, product_id) {
        return None;
    }
    let done = data.completions.entry(date).or_default().slot_mut(slot);
    if done.remove(&product_id) {
        Some(false)
    } else {
        done.insert(product_id);
        Some(true)
    }
}

/// Drops completion marks for a product taken out of a slot on `dates`.
pub fn clear_completions(data: &mut AppData, dates: &[NaiveDate], slot: Slot, product_id: u64) {
    for date in dates {
        if let Some(day) = data.completions.get_mut(date) {
            day.slot_mut(slot).remove(&product_id);
            if day.am.is_empty() && day.pm.is_empty() {
                data.completions.remove(date);
            }
        }
    }
}
