use crate::catalog::Catalog;
use crate::models::{AppData, ProgressPhoto, Profile, ScheduledProduct, ShelfItem, Slot, Usage};
use chrono::{Duration, NaiveDate};

const SHELF_SIZE: usize = 4;

/// Demo data for a fresh session: the first catalog products on the shelf,
/// the first two of them in today's morning routine, and three weekly
/// progress photos ending today.
pub fn seed_data(today: NaiveDate, catalog: &Catalog) -> AppData {
    let mut data = AppData::default();

    for (index, product) in catalog.products().iter().take(SHELF_SIZE).enumerate() {
        let month = index as u32 + 1;
        data.shelf.push(ShelfItem {
            product: product.clone(),
            date_added: NaiveDate::from_ymd_opt(2023, month, 15).unwrap_or(today),
            usage: Usage {
                total_uses: 50 + index as u32 * 20,
                frequency: if index % 2 == 0 { "Daily" } else { "3x a week" }.to_string(),
            },
        });
    }

    for item in data.shelf.iter().take(2) {
        data.routines
            .insert(today, Slot::AM, &ScheduledProduct::from(&item.product));
    }

    let photos = [
        (0, 8, "Skin looking clearer, less redness"),
        (7, 6, "Some breakouts on forehead"),
        (14, 5, "Starting new routine"),
    ];
    for (days_ago, rating, notes) in photos {
        data.next_photo_id += 1;
        data.photos.push(ProgressPhoto {
            id: data.next_photo_id,
            date: today - Duration::days(days_ago),
            image_url: "/static/placeholder.jpg".to_string(),
            skin_rating: rating,
            notes: notes.to_string(),
        });
    }

    data.profile = Profile {
        name: "Sarah Johnson".to_string(),
        email: "sarah.johnson@example.com".to_string(),
        skin_type: "combination".to_string(),
        skin_concerns: vec!["acne".to_string(), "dryness".to_string()],
        ..Profile::default()
    };

    data
}
