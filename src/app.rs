use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/calendar", get(handlers::get_month))
        .route("/api/week", get(handlers::get_week))
        .route("/api/routines/:date", get(handlers::get_routine))
        .route("/api/schedule", get(handlers::get_schedule))
        .route("/api/schedule/select", post(handlers::schedule_select))
        .route("/api/schedule/rule", post(handlers::schedule_rule))
        .route("/api/schedule/back", post(handlers::schedule_back))
        .route("/api/schedule/commit", post(handlers::schedule_commit))
        .route("/api/schedule/cancel", post(handlers::schedule_cancel))
        .route("/api/deletion", get(handlers::get_deletion))
        .route("/api/deletion/request", post(handlers::deletion_request))
        .route("/api/deletion/confirm", post(handlers::deletion_confirm))
        .route("/api/deletion/cancel", post(handlers::deletion_cancel))
        .route("/api/products", get(handlers::list_products))
        .route("/api/shelf", get(handlers::get_shelf).post(handlers::shelf_add))
        .route("/api/shelf/:id", delete(handlers::shelf_remove))
        .route("/api/progress", get(handlers::get_progress))
        .route("/api/photos", post(handlers::add_photo))
        .route("/api/dashboard", get(handlers::get_dashboard))
        .route("/api/dashboard/toggle", post(handlers::dashboard_toggle))
        .route("/api/profile", get(handlers::get_profile).put(handlers::update_profile))
        .with_state(state)
}
