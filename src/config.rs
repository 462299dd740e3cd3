use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    pub history_dir: Option<PathBuf>,
}

pub fn load_config() -> Config {
    let Some(dirs) = ProjectDirs::from("", "", "iku") else {
        return Config::default();
    };

    let path = dirs.config_dir().join("config.toml");
    let Ok(data) = fs::read_to_string(&path) else {
        return Config::default();
    };

    match toml::from_str(&data) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: invalid config at {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Where to look for history files when neither `--dir` nor the config says:
/// the platform data dir (e.g. `~/.local/share/iku/history`).
pub fn default_history_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "iku").map(|d| d.data_dir().join("history"))
}
