pub mod app;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod flow;
pub mod handlers;
pub mod models;
pub mod progress;
pub mod ratings;
pub mod scheduler;
pub mod seed;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
