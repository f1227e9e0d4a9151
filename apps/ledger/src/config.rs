use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

pub const CONFIG_FILE: &str = "ledger.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            data_dir: dirs::data_dir()
                .map(|dir| dir.join("ledger"))
                .unwrap_or_else(|| PathBuf::from("./data")),
            log_filter: "info".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

/// Defaults, then `config_path`, then environment; later sources win.
pub fn load_settings_from(
    config_path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("server_url") {
                    settings.server_url = v.clone();
                }
                if let Some(v) = file_cfg.get("data_dir") {
                    settings.data_dir = PathBuf::from(v);
                }
                if let Some(v) = file_cfg.get("log_filter") {
                    settings.log_filter = v.clone();
                }
            }
            Err(err) => tracing::warn!(
                path = %config_path.display(),
                error = %err,
                "ignoring unreadable config file"
            ),
        }
    }

    if let Some(v) = env("LEDGER_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("LEDGER_DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }
    if let Some(v) = env("APP__DATA_DIR") {
        settings.data_dir = PathBuf::from(v);
    }

    if let Some(v) = env("RUST_LOG") {
        settings.log_filter = v;
    }

    settings.server_url = normalize_server_url(&settings.server_url);
    settings
}

fn normalize_server_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().server_url;
    }
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
