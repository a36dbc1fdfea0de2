use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/atelier/config.toml` or `~/.config/atelier/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `ATELIER__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ambient: AmbientSettings,
    pub showcase: ShowcaseSettings,
    pub catalog: CatalogSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Minimum interval between progress updates of a playing element (milliseconds).
    pub progress_interval_ms: u64,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// Number of volume steps used by the quit fade.
    pub fade_steps: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: 250,
            quit_fade_out_ms: 500,
            fade_steps: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AmbientSettings {
    /// Looping background track. Overrides the catalog's `ambient` entry.
    pub track: Option<PathBuf>,
    /// Playback volume of the background track, in `[0, 1]`.
    pub volume: f32,
    /// Try to start the background track on the first key press.
    pub autoplay: bool,
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            track: None,
            volume: 0.5,
            autoplay: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShowcaseSettings {
    /// Volume the overlay starts with, in `[0, 1]`.
    pub default_volume: f32,
    /// Length of the overlay's open/close transition (milliseconds).
    pub transition_ms: u64,
    /// Volume change per `+` / `-` press, in percent.
    pub volume_step: u8,
}

impl Default for ShowcaseSettings {
    fn default() -> Self {
        Self {
            default_volume: 1.0,
            transition_ms: 300,
            volume_step: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Directory holding the studio's media.
    pub media_dir: PathBuf,
    /// Explicit catalog file. Defaults to `<media_dir>/catalog.toml`.
    pub path: Option<PathBuf>,
    /// Audio extensions picked up when scanning (case-insensitive, without dot).
    pub audio_extensions: Vec<String>,
    /// Video extensions picked up when scanning (case-insensitive, without dot).
    pub video_extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Resolve every preview's duration at startup instead of on first play.
    pub prefetch_durations: bool,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            media_dir: PathBuf::from("media"),
            path: None,
            audio_extensions: vec!["wav".into(), "mp3".into(), "flac".into(), "ogg".into()],
            video_extensions: vec!["mp4".into(), "m4v".into(), "mov".into()],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
            prefetch_durations: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Number of preview cards per grid row.
    pub columns: usize,
    /// Which card fields to show under each title, and in what order.
    ///
    /// Example: ["category", "client", "duration"]
    pub card_fields: Vec<CardField>,
    /// Separator used to join `card_fields`.
    pub card_separator: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Les Artisans Sonores ~ ".to_string(),
            columns: 3,
            card_fields: vec![CardField::Category, CardField::Client, CardField::Duration],
            card_separator: " · ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardField {
    Category,
    Client,
    #[serde(alias = "type")]
    Kind,
    Duration,
    #[serde(alias = "file", alias = "filename")]
    Path,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log file. Defaults to `$XDG_STATE_HOME/atelier/atelier.log`.
    pub file: Option<PathBuf>,
    /// Default filter directive; `RUST_LOG` wins when set.
    pub level: String,
    /// Disable logging entirely.
    pub enabled: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
            enabled: true,
        }
    }
}
