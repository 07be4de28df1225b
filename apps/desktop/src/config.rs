use std::{collections::HashMap, fs};

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server_url: String,
    pub radius_meters: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            radius_meters: 5000,
        }
    }
}

/// `discovery.toml` in the working directory, then `APP__*` environment
/// variables on top.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("discovery.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("radius_meters") {
                if let Ok(parsed) = v.parse::<i32>() {
                    settings.radius_meters = parsed;
                }
            }
        }
    }

    if let Ok(v) = std::env::var("APP__SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__RADIUS_METERS") {
        if let Ok(parsed) = v.parse::<i32>() {
            settings.radius_meters = parsed;
        }
    }

    settings
}
