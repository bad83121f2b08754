use std::{collections::HashMap, fs};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub csrf_token: Option<String>,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            csrf_token: None,
            language: "en".into(),
        }
    }
}

/// Defaults, overridden by `desktop.toml`, overridden by environment
/// variables (plain and `APP__`-prefixed aliases).
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("desktop.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_file_overrides(&mut settings, &file_cfg);
        }
    }

    if let Ok(v) = std::env::var("DASHBOARD_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Ok(v) = std::env::var("DASHBOARD_CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }
    if let Ok(v) = std::env::var("APP__CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }

    if let Ok(v) = std::env::var("APP__LANGUAGE") {
        settings.language = v;
    }

    settings.server_url = normalize_server_url(&settings.server_url);
    settings
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("server_url") {
        settings.server_url = v.clone();
    }
    if let Some(v) = file_cfg.get("csrf_token") {
        settings.csrf_token = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("language") {
        settings.language = v.clone();
    }
}

fn normalize_server_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().server_url;
    }
    if trimmed.contains("://") {
        return trimmed.to_string();
    }
    format!("http://{trimmed}")
}
