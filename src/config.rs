use std::{env, path::PathBuf};
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/state.json";
pub const DEFAULT_ROLLING_WINDOW: usize = 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    /// Number of daily ratings in the rolling average.
    pub rolling_window: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Unparseable or out-of-range values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let data_path = lookup("APP_DATA_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        let rolling_window = match lookup("ROLLING_WINDOW_DAYS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(days) if days > 0 => days,
                _ => {
                    warn!(value = %raw, "invalid ROLLING_WINDOW_DAYS, using {DEFAULT_ROLLING_WINDOW}");
                    DEFAULT_ROLLING_WINDOW
                }
            },
            None => DEFAULT_ROLLING_WINDOW,
        };

        Self {
            port,
            data_path,
            rolling_window,
        }
    }
}
