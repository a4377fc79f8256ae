use crate::calendar::{build_month, build_week, first_of_month, parse_month};
use crate::dashboard::{build_dashboard, clear_completions, toggle_completion};
use crate::errors::AppError;
use crate::flow::{DeletionFlow, ScheduleFlow};
use crate::models::{
    AppData, ConfirmDeletionRequest, DashboardResponse, DayRoutine, DeletionRequest, MonthQuery,
    MonthResponse, MutationResponse, PhotoRequest, Product, ProductQuery, Profile, ProfileUpdate,
    ProgressPhoto, ProgressResponse, RuleRequest, ScheduledProduct, SelectProductRequest,
    ShelfAddRequest, ShelfItem, ToggleRequest, Usage, WeekQuery, WeekResponse,
};
use crate::progress::build_progress;
use crate::scheduler::{RecurrenceRule, expand, remove_scoped};
use crate::state::{AppState, Session};
use crate::storage::persist_data;
use crate::ui::{IndexQuery, render_index};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use chrono::{Local, NaiveDate};
use tracing::info;

pub async fn index(State(state): State<AppState>, Query(query): Query<IndexQuery>) -> Html<String> {
    let today = today();
    let session = state.session.lock().await;
    Html(render_index(today, &query, &session.data, state.rolling_window))
}

pub async fn get_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthResponse>, AppError> {
    let first = match query.month.as_deref() {
        Some(month) => parse_month(month).ok_or_else(|| AppError::bad_request("month must be YYYY-MM"))?,
        None => first_of_month(today()),
    };
    let session = state.session.lock().await;
    Ok(Json(build_month(&session.data.routines, first)))
}

pub async fn get_week(State(state): State<AppState>, Query(query): Query<WeekQuery>) -> Json<WeekResponse> {
    let date = query.date.unwrap_or_else(today);
    let session = state.session.lock().await;
    Json(build_week(&session.data.routines, date))
}

pub async fn get_routine(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayRoutine>, AppError> {
    let date = parse_date(&date)?;
    let session = state.session.lock().await;
    Ok(Json(session.data.routines.day(date)))
}

pub async fn get_schedule(State(state): State<AppState>) -> Json<ScheduleFlow> {
    Json(state.session.lock().await.schedule.clone())
}

pub async fn schedule_select(
    State(state): State<AppState>,
    Json(payload): Json<SelectProductRequest>,
) -> Result<Json<ScheduleFlow>, AppError> {
    let mut session = state.session.lock().await;
    let product = session
        .data
        .shelf_item(payload.product_id)
        .map(|item| ScheduledProduct::from(&item.product))
        .ok_or_else(|| AppError::not_found(format!("product {} is not on the shelf", payload.product_id)))?;

    session.schedule.select_product(product, payload.date, payload.slot)?;
    Ok(Json(session.schedule.clone()))
}

pub async fn schedule_rule(
    State(state): State<AppState>,
    Json(payload): Json<RuleRequest>,
) -> Result<Json<ScheduleFlow>, AppError> {
    let rule = RecurrenceRule::from_request(payload)
        .ok_or_else(|| AppError::bad_request("frequency must be daily, alternate, weekly or custom"))?;
    let mut session = state.session.lock().await;
    session.schedule.configure_rule(rule)?;
    Ok(Json(session.schedule.clone()))
}

pub async fn schedule_back(State(state): State<AppState>) -> Result<Json<ScheduleFlow>, AppError> {
    let mut session = state.session.lock().await;
    session.schedule.back()?;
    Ok(Json(session.schedule.clone()))
}

pub async fn schedule_cancel(State(state): State<AppState>) -> Json<ScheduleFlow> {
    let mut session = state.session.lock().await;
    session.schedule.cancel();
    Json(session.schedule.clone())
}

pub async fn schedule_commit(State(state): State<AppState>) -> Result<Json<MutationResponse>, AppError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    let pending = session.schedule.commit()?;

    let mut draft = session.data.clone();
    let inserted = expand(
        &mut draft.routines,
        &pending.product,
        pending.date,
        pending.slot,
        &pending.rule,
    );
    if let Err(err) = save(&state, session, draft).await {
        session.schedule = pending.into();
        return Err(err);
    }
    info!(
        product_id = pending.product.id,
        start = %pending.date,
        slot = pending.slot.label(),
        inserted = inserted.len(),
        "routine scheduled"
    );

    Ok(Json(MutationResponse {
        affected_dates: inserted,
    }))
}

pub async fn get_deletion(State(state): State<AppState>) -> Json<DeletionFlow> {
    Json(state.session.lock().await.deletion.clone())
}

pub async fn deletion_request(
    State(state): State<AppState>,
    Json(payload): Json<DeletionRequest>,
) -> Result<Json<DeletionFlow>, AppError> {
    let mut session = state.session.lock().await;
    let product = session
        .data
        .routines
        .day(payload.date)
        .slot(payload.slot)
        .iter()
        .find(|product| product.id == payload.product_id)
        .cloned()
        .ok_or_else(|| {
            AppError::not_found(format!(
                "product {} is not in the {} routine on {}",
                payload.product_id,
                payload.slot.label(),
                payload.date
            ))
        })?;

    session.deletion.request(product, payload.date, payload.slot);
    Ok(Json(session.deletion.clone()))
}

pub async fn deletion_confirm(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmDeletionRequest>,
) -> Result<Json<MutationResponse>, AppError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    let pending = session.deletion.confirm()?;

    let mut draft = session.data.clone();
    let removed = remove_scoped(
        &mut draft.routines,
        pending.date,
        pending.slot,
        pending.product.id,
        payload.cascade,
    );
    clear_completions(&mut draft, &removed, pending.slot, pending.product.id);
    if let Err(err) = save(&state, session, draft).await {
        session.deletion = DeletionFlow::PendingDeletion(pending);
        return Err(err);
    }
    info!(
        product_id = pending.product.id,
        date = %pending.date,
        slot = pending.slot.label(),
        cascade = payload.cascade,
        removed = removed.len(),
        "routine entry removed"
    );

    Ok(Json(MutationResponse {
        affected_dates: removed,
    }))
}

pub async fn deletion_cancel(State(state): State<AppState>) -> Json<DeletionFlow> {
    let mut session = state.session.lock().await;
    session.deletion.cancel();
    Json(session.deletion.clone())
}

pub async fn list_products(State(state): State<AppState>, Query(query): Query<ProductQuery>) -> Json<Vec<Product>> {
    let products = state
        .catalog
        .search(query.q.as_deref(), query.category.as_deref())
        .into_iter()
        .cloned()
        .collect();
    Json(products)
}

pub async fn get_shelf(State(state): State<AppState>) -> Json<Vec<ShelfItem>> {
    Json(state.session.lock().await.data.shelf.clone())
}

pub async fn shelf_add(
    State(state): State<AppState>,
    Json(payload): Json<ShelfAddRequest>,
) -> Result<Json<Vec<ShelfItem>>, AppError> {
    let product = state
        .catalog
        .find(payload.product_id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("unknown product {}", payload.product_id)))?;

    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    if session.data.shelf_item(product.id).is_none() {
        let product_id = product.id;
        let mut draft = session.data.clone();
        draft.shelf.push(ShelfItem {
            product,
            date_added: today(),
            usage: Usage {
                total_uses: 0,
                frequency: "As needed".to_string(),
            },
        });
        save(&state, session, draft).await?;
        info!(product_id, "product added to shelf");
    }
    Ok(Json(session.data.shelf.clone()))
}

pub async fn shelf_remove(
    State(state): State<AppState>,
    Path(product_id): Path<u64>,
) -> Result<Json<Vec<ShelfItem>>, AppError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    if session.data.shelf_item(product_id).is_none() {
        return Err(AppError::not_found(format!("product {product_id} is not on the shelf")));
    }
    let mut draft = session.data.clone();
    draft.shelf.retain(|item| item.product.id != product_id);
    save(&state, session, draft).await?;
    info!(product_id, "product removed from shelf");
    Ok(Json(session.data.shelf.clone()))
}

pub async fn get_progress(State(state): State<AppState>) -> Json<ProgressResponse> {
    let session = state.session.lock().await;
    Json(build_progress(&session.data, state.rolling_window))
}

pub async fn add_photo(
    State(state): State<AppState>,
    Json(payload): Json<PhotoRequest>,
) -> Result<Json<ProgressPhoto>, AppError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    let mut draft = session.data.clone();
    draft.next_photo_id += 1;
    let photo = ProgressPhoto {
        id: draft.next_photo_id,
        date: payload.date.unwrap_or_else(today),
        image_url: payload
            .image_url
            .unwrap_or_else(|| "/static/placeholder.jpg".to_string()),
        skin_rating: payload.skin_rating.clamp(1, 10) as u8,
        notes: payload.notes.trim().to_string(),
    };
    draft.photos.push(photo.clone());
    save(&state, session, draft).await?;
    info!(photo_id = photo.id, date = %photo.date, rating = photo.skin_rating, "progress photo logged");
    Ok(Json(photo))
}

pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardResponse> {
    let session = state.session.lock().await;
    Json(build_dashboard(&session.data, state.rolling_window))
}

pub async fn dashboard_toggle(
    State(state): State<AppState>,
    Json(payload): Json<ToggleRequest>,
) -> Result<Json<DashboardResponse>, AppError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    let mut draft = session.data.clone();
    let completed = toggle_completion(&mut draft, today(), payload.slot, payload.product_id)
        .ok_or_else(|| AppError::not_found(format!("product {} is not in today's routine", payload.product_id)))?;
    save(&state, session, draft).await?;
    info!(product_id = payload.product_id, slot = payload.slot.label(), completed, "completion toggled");

    Ok(Json(build_dashboard(&session.data, state.rolling_window)))
}

pub async fn get_profile(State(state): State<AppState>) -> Json<Profile> {
    Json(state.session.lock().await.data.profile.clone())
}

pub async fn update_profile(
    State(state): State<AppState>,
    Json(payload): Json<ProfileUpdate>,
) -> Result<Json<Profile>, AppError> {
    let mut guard = state.session.lock().await;
    let session = &mut *guard;
    let mut draft = session.data.clone();
    draft.profile.apply(payload);
    save(&state, session, draft).await?;
    info!("profile updated");
    Ok(Json(session.data.profile.clone()))
}

/// Writes `draft` to disk and only then makes it the session's data, so a
/// failed save leaves the session as it was.
async fn save(state: &AppState, session: &mut Session, draft: AppData) -> Result<(), AppError> {
    persist_data(&state.data_path, &draft).await?;
    session.data = draft;
    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    value
        .parse()
        .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
