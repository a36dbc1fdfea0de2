use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Settings;

use super::model::{Catalog, PreviewItem, ShowcaseEntry};
use super::scan::scan;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("catalog {path:?}: preview {title:?} has no audio file")]
    MissingAudio { path: PathBuf, title: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCatalog {
    ambient: Option<PathBuf>,
    previews: Vec<RawPreview>,
    showcase: Vec<RawShowcase>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPreview {
    id: Option<u32>,
    title: String,
    client: Option<String>,
    category: String,
    #[serde(alias = "type")]
    kind: Option<String>,
    #[serde(alias = "sound", alias = "audio_file")]
    audio: Option<PathBuf>,
    cover: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawShowcase {
    title: String,
    client: Option<String>,
    #[serde(alias = "type")]
    kind: Option<String>,
    #[serde(alias = "video_file")]
    video: PathBuf,
    #[serde(alias = "sound", alias = "sound_file")]
    audio: Option<PathBuf>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn resolve(base: &Path, p: PathBuf) -> PathBuf {
    if p.is_absolute() { p } else { base.join(p) }
}

/// Parse catalog TOML. Relative media paths are resolved against `base`.
pub fn parse_catalog(text: &str, base: &Path, origin: &Path) -> Result<Catalog, CatalogError> {
    let raw: RawCatalog = toml::from_str(text).map_err(|source| CatalogError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    let mut previews = Vec::with_capacity(raw.previews.len());
    for (i, p) in raw.previews.into_iter().enumerate() {
        let Some(audio) = p.audio else {
            return Err(CatalogError::MissingAudio {
                path: origin.to_path_buf(),
                title: p.title,
            });
        };
        previews.push(PreviewItem {
            id: p.id.unwrap_or(i as u32 + 1),
            title: p.title,
            client: non_empty(p.client),
            category: p.category,
            kind: non_empty(p.kind),
            audio: resolve(base, audio),
            cover: p.cover.map(|c| resolve(base, c)),
        });
    }

    let showcase = raw
        .showcase
        .into_iter()
        .map(|s| ShowcaseEntry {
            title: s.title,
            client: non_empty(s.client),
            kind: non_empty(s.kind),
            video: resolve(base, s.video),
            audio: s.audio.map(|a| resolve(base, a)),
        })
        .collect();

    Ok(Catalog {
        ambient: raw.ambient.map(|a| resolve(base, a)),
        previews,
        showcase,
    })
}

impl Catalog {
    /// Read a catalog file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        parse_catalog(&text, base, path)
    }

    /// Load the catalog named by `settings`, falling back to scanning the media
    /// directory when no catalog file exists. `ambient.track` overrides the
    /// catalog's background track.
    pub fn load(settings: &Settings) -> Result<Self, CatalogError> {
        let file = settings.catalog_file();
        let mut catalog = if file.is_file() {
            let c = Self::from_file(&file)?;
            info!(
                path = %file.display(),
                previews = c.previews.len(),
                reels = c.showcase.len(),
                "catalog loaded"
            );
            c
        } else {
            let c = scan(&settings.catalog.media_dir, &settings.catalog);
            info!(
                dir = %settings.catalog.media_dir.display(),
                previews = c.previews.len(),
                reels = c.showcase.len(),
                "no catalog file, scanned media directory"
            );
            c
        };

        if let Some(track) = &settings.ambient.track {
            catalog.ambient = Some(track.clone());
        }
        if catalog.is_empty() {
            warn!("catalog is empty; nothing to play");
        }
        Ok(catalog)
    }
}
