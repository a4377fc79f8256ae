use chrono::Local;
use skinprove::{AppState, Config, catalog::Catalog, load_data, router, seed::seed_data};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let catalog = Catalog::default();
    let today = Local::now().date_naive();
    let data = load_data(&config.data_path, || seed_data(today, &catalog)).await;
    info!(
        path = %config.data_path.display(),
        shelf = data.shelf.len(),
        photos = data.photos.len(),
        window = config.rolling_window,
        "session loaded"
    );

    let state = AppState::new(&config, catalog, data);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
