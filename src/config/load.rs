use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `ATELIER__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("ATELIER")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.progress_interval_ms == 0 {
            return Err("audio.progress_interval_ms must be >= 1".to_string());
        }
        if self.audio.fade_steps == 0 {
            return Err("audio.fade_steps must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.ambient.volume) {
            return Err("ambient.volume must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.showcase.default_volume) {
            return Err("showcase.default_volume must be within [0, 1]".to_string());
        }
        if self.ui.columns == 0 {
            return Err("ui.columns must be >= 1".to_string());
        }
        Ok(())
    }

    /// Catalog file to read: the explicit `catalog.path`, or `catalog.toml`
    /// inside the media directory.
    pub fn catalog_file(&self) -> PathBuf {
        self.catalog
            .path
            .clone()
            .unwrap_or_else(|| self.catalog.media_dir.join("catalog.toml"))
    }
}

/// Resolve the config path from `ATELIER_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("ATELIER_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/atelier/config.toml`
/// or `~/.config/atelier/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("atelier").join("config.toml"))
}

/// Compute the default log path under `$XDG_STATE_HOME/atelier/atelier.log`
/// or `~/.local/state/atelier/atelier.log`.
pub fn default_log_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };

    state_home.map(|d| d.join("atelier").join("atelier.log"))
}
