use std::path::PathBuf;

use crate::location::Coordinates;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub nominatim_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub log_level: String,
    pub map_center: Coordinates,
    pub device_position: Option<Coordinates>,
}
