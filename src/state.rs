use crate::catalog::Catalog;
use crate::config::Config;
use crate::flow::{DeletionFlow, ScheduleFlow};
use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Everything one user session mutates, guarded together so each request
/// applies as a single transition.
#[derive(Debug, Default)]
pub struct Session {
    pub data: AppData,
    pub schedule: ScheduleFlow,
    pub deletion: DeletionFlow,
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub rolling_window: usize,
    pub catalog: Arc<Catalog>,
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(config: &Config, catalog: Catalog, data: AppData) -> Self {
        Self {
            data_path: config.data_path.clone(),
            rolling_window: config.rolling_window,
            catalog: Arc::new(catalog),
            session: Arc::new(Mutex::new(Session {
                data,
                ..Session::default()
            })),
        }
    }
}
