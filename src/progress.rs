use crate::models::{AppData, ProgressPhoto, ProgressResponse};
use crate::ratings::{daily_average, good_days, improvement, mock_ratings, previous_average, rolling_average};
use chrono::{Local, NaiveDate};

pub fn build_progress(data: &AppData, window: usize) -> ProgressResponse {
    build_progress_at(Local::now().date_naive(), data, window)
}

pub fn build_progress_at(today: NaiveDate, data: &AppData, window: usize) -> ProgressResponse {
    let mut photos: Vec<ProgressPhoto> = data.photos.clone();
    photos.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let daily_averages =
        daily_average(photos.iter().map(|photo| (photo.date, f64::from(photo.skin_rating))));

    ProgressResponse {
        rolling_average: rolling_average(&daily_averages, window),
        previous_average: previous_average(&daily_averages, window),
        improvement: improvement(&daily_averages, window),
        good_days: good_days(&daily_averages, window),
        chart: mock_ratings(today),
        window,
        daily_averages,
        photos,
    }
}

/// Average rating over the most recent window, for summary cards.
pub fn skin_rating(data: &AppData, window: usize) -> f64 {
    let daily = daily_average(data.photos.iter().map(|photo| (photo.date, f64::from(photo.skin_rating))));
    rolling_average(&daily, window)
}
