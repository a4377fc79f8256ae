use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    AM,
    PM,
}

impl Slot {
    pub fn label(self) -> &'static str {
        match self {
            Slot::AM => "AM",
            Slot::PM => "PM",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub brand: String,
    pub price: f64,
    pub rating: f64,
    pub review_count: u32,
    pub category: String,
    pub image_url: String,
    pub description: String,
    pub ingredients: Vec<String>,
}

/// The display fields a routine entry carries alongside the product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledProduct {
    pub id: u64,
    pub name: String,
    pub brand: String,
    pub image_url: String,
}

impl From<&Product> for ScheduledProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            image_url: product.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRoutine {
    #[serde(rename = "AM")]
    pub am: Vec<ScheduledProduct>,
    #[serde(rename = "PM")]
    pub pm: Vec<ScheduledProduct>,
}

impl DayRoutine {
    pub fn slot(&self, slot: Slot) -> &[ScheduledProduct] {
        match slot {
            Slot::AM => &self.am,
            Slot::PM => &self.pm,
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: Slot) -> &mut Vec<ScheduledProduct> {
        match slot {
            Slot::AM => &mut self.am,
            Slot::PM => &mut self.pm,
        }
    }

    pub fn contains(&self, slot: Slot, product_id: u64) -> bool {
        self.slot(slot).iter().any(|p| p.id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.am.is_empty() && self.pm.is_empty()
    }
}

/// Date-keyed routine assignments. Dates without an entry have an empty
/// routine. Mutation goes through the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RoutineStore {
    days: BTreeMap<NaiveDate, DayRoutine>,
}

impl RoutineStore {
    pub fn day(&self, date: NaiveDate) -> DayRoutine {
        self.days.get(&date).cloned().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayRoutine)> {
        self.days.iter()
    }

    /// Appends `product` to the slot unless the same id is already there.
    pub(crate) fn insert(&mut self, date: NaiveDate, slot: Slot, product: &ScheduledProduct) -> bool {
        let entry = self.days.entry(date).or_default();
        if entry.contains(slot, product.id) {
            return false;
        }
        entry.slot_mut(slot).push(product.clone());
        true
    }

    pub(crate) fn remove(&mut self, date: NaiveDate, slot: Slot, product_id: u64) -> bool {
        let Some(entry) = self.days.get_mut(&date) else {
            return false;
        };
        let products = entry.slot_mut(slot);
        let before = products.len();
        products.retain(|p| p.id != product_id);
        products.len() != before
    }
}

/// Loaded days go back through `insert`, so a slot never holds the same id
/// twice even if the file does.
impl<'de> Deserialize<'de> for RoutineStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let days = BTreeMap::<NaiveDate, DayRoutine>::deserialize(deserializer)?;
        let mut store = RoutineStore::default();
        for (date, routine) in days {
            for slot in [Slot::AM, Slot::PM] {
                for product in routine.slot(slot) {
                    store.insert(date, slot, product);
                }
            }
        }
        Ok(store)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub total_uses: u32,
    pub frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfItem {
    pub product: Product,
    pub date_added: NaiveDate,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPhoto {
    pub id: u64,
    pub date: NaiveDate,
    pub image_url: String,
    pub skin_rating: u8,
    pub notes: String,
}

/// One rating per date, as produced by the daily aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinRating {
    pub date: NaiveDate,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPrefs {
    pub routine_reminders: bool,
    pub progress_updates: bool,
    pub product_recommendations: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrivacyPrefs {
    pub profile_is_public: bool,
    pub share_usage_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub skin_type: String,
    pub skin_concerns: Vec<String>,
    pub notifications: NotificationPrefs,
    pub privacy: PrivacyPrefs,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            skin_type: "normal".to_string(),
            skin_concerns: Vec::new(),
            notifications: NotificationPrefs {
                routine_reminders: true,
                progress_updates: true,
                product_recommendations: false,
            },
            privacy: PrivacyPrefs {
                profile_is_public: false,
                share_usage_data: true,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayCompletions {
    #[serde(rename = "AM", default)]
    pub am: BTreeSet<u64>,
    #[serde(rename = "PM", default)]
    pub pm: BTreeSet<u64>,
}

impl DayCompletions {
    pub fn slot(&self, slot: Slot) -> &BTreeSet<u64> {
        match slot {
            Slot::AM => &self.am,
            Slot::PM => &self.pm,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut BTreeSet<u64> {
        match slot {
            Slot::AM => &mut self.am,
            Slot::PM => &mut self.pm,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default)]
    pub routines: RoutineStore,
    #[serde(default)]
    pub shelf: Vec<ShelfItem>,
    #[serde(default)]
    pub photos: Vec<ProgressPhoto>,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub completions: BTreeMap<NaiveDate, DayCompletions>,
    #[serde(default)]
    pub next_photo_id: u64,
}

impl AppData {
    pub fn shelf_item(&self, product_id: u64) -> Option<&ShelfItem> {
        self.shelf.iter().find(|item| item.product.id == product_id)
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectProductRequest {
    pub date: NaiveDate,
    pub slot: Slot,
    pub product_id: u64,
}

/// Loose form input for a recurrence rule; coerced by
/// [`crate::scheduler::RecurrenceRule::from_request`].
#[derive(Debug, Deserialize)]
pub struct RuleRequest {
    pub frequency: String,
    #[serde(default)]
    pub weekdays: Vec<i64>,
    #[serde(default)]
    pub custom_days: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct DeletionRequest {
    pub date: NaiveDate,
    pub slot: Slot,
    pub product_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmDeletionRequest {
    pub cascade: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MutationResponse {
    pub affected_dates: Vec<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ShelfAddRequest {
    pub product_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct PhotoRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub skin_rating: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationUpdate {
    pub routine_reminders: Option<bool>,
    pub progress_updates: Option<bool>,
    pub product_recommendations: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PrivacyUpdate {
    pub profile_is_public: Option<bool>,
    pub share_usage_data: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub skin_type: Option<String>,
    pub skin_concerns: Option<Vec<String>>,
    #[serde(default)]
    pub notifications: NotificationUpdate,
    #[serde(default)]
    pub privacy: PrivacyUpdate,
}

impl Profile {
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(skin_type) = update.skin_type {
            self.skin_type = skin_type;
        }
        if let Some(concerns) = update.skin_concerns {
            self.skin_concerns = concerns;
        }

        let n = update.notifications;
        if let Some(value) = n.routine_reminders {
            self.notifications.routine_reminders = value;
        }
        if let Some(value) = n.progress_updates {
            self.notifications.progress_updates = value;
        }
        if let Some(value) = n.product_recommendations {
            self.notifications.product_recommendations = value;
        }

        let p = update.privacy;
        if let Some(value) = p.profile_is_public {
            self.privacy.profile_is_public = value;
        }
        if let Some(value) = p.share_usage_data {
            self.privacy.share_usage_data = value;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub slot: Slot,
    pub product_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub has_am: bool,
    pub has_pm: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MonthResponse {
    pub year: i32,
    pub month: u32,
    pub leading_blanks: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub am: Vec<String>,
    pub pm: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WeekResponse {
    pub start: NaiveDate,
    pub days: Vec<WeekDay>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub photos: Vec<ProgressPhoto>,
    pub daily_averages: Vec<SkinRating>,
    pub window: usize,
    pub rolling_average: f64,
    pub previous_average: f64,
    pub improvement: f64,
    pub good_days: usize,
    pub chart: Vec<SkinRating>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoutineItem {
    pub id: u64,
    pub name: String,
    pub slot: Slot,
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpcomingItem {
    pub name: String,
    pub time: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub date: NaiveDate,
    pub greeting: String,
    pub today: Vec<RoutineItem>,
    pub upcoming: Vec<UpcomingItem>,
    pub completion_rate: u8,
    pub skin_rating: f64,
}
