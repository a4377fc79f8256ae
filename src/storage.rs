use crate::errors::AppError;
use crate::models::AppData;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info};

/// Reads persisted state, or builds it with `seed` when there is none.
pub async fn load_data(path: &Path, seed: impl FnOnce() -> AppData) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                seed()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no data file, seeding demo data");
            seed()
        }
        Err(err) => {
            error!("failed to read data file: {err}");
            seed()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, payload).await.map_err(|err| {
        error!(path = %path.display(), "failed to save data: {err}");
        AppError::internal(err)
    })?;
    debug!(path = %path.display(), "state saved");
    Ok(())
}
