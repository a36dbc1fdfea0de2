use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lofty::prelude::{Accessor, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::CatalogSettings;

use super::model::{Catalog, PreviewItem, ShowcaseEntry};

/// File stem that marks the looping background track when scanning.
const AMBIENT_STEM: &str = "ambient";

fn normalized(exts: &[String]) -> Vec<String> {
    exts.iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn has_extension(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}

fn clean(v: Option<Cow<'_, str>>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Title, client (artist tag) and category (album tag) read from the file's tags.
fn tagged_fields(path: &Path) -> (Option<String>, Option<String>, Option<String>) {
    let Ok(tagged) = lofty::read_from_path(path) else {
        return (None, None, None);
    };
    let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
        return (None, None, None);
    };
    (clean(tag.title()), clean(tag.artist()), clean(tag.album()))
}

/// Build a catalog by walking `dir`.
///
/// Audio files become preview cards, video files become showcase reels. An
/// audio file sharing a video's stem in the same directory becomes that reel's
/// separate soundtrack instead of a card, and `ambient.<ext>` becomes the
/// background track.
pub fn scan(dir: &Path, settings: &CatalogSettings) -> Catalog {
    let audio_exts = normalized(&settings.audio_extensions);
    let video_exts = normalized(&settings.video_extensions);

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let mut audio: Vec<PathBuf> = Vec::new();
    let mut video: Vec<PathBuf> = Vec::new();

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || (!settings.include_hidden && is_hidden(path)) {
            continue;
        }
        if has_extension(path, &audio_exts) {
            audio.push(path.to_path_buf());
        } else if has_extension(path, &video_exts) {
            video.push(path.to_path_buf());
        }
    }

    // Soundtracks shipped next to their reel: same directory, same stem.
    let mut by_dir_stem: HashMap<(PathBuf, String), PathBuf> = HashMap::new();
    for a in &audio {
        let parent = a.parent().map(Path::to_path_buf).unwrap_or_default();
        by_dir_stem.insert((parent, stem_of(a)), a.clone());
    }

    let mut showcase: Vec<ShowcaseEntry> = video
        .iter()
        .map(|v| {
            let parent = v.parent().map(Path::to_path_buf).unwrap_or_default();
            let soundtrack = by_dir_stem.remove(&(parent, stem_of(v)));
            ShowcaseEntry {
                title: stem_of(v),
                client: None,
                kind: None,
                video: v.clone(),
                audio: soundtrack,
            }
        })
        .collect();
    showcase.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));

    let mut ambient: Option<PathBuf> = None;
    let mut previews: Vec<PreviewItem> = Vec::new();
    for a in audio {
        let paired = showcase.iter().any(|s| s.audio.as_deref() == Some(a.as_path()));
        if paired {
            continue;
        }
        let stem = stem_of(&a);
        if ambient.is_none() && stem.eq_ignore_ascii_case(AMBIENT_STEM) {
            ambient = Some(a);
            continue;
        }

        let (title, client, album) = tagged_fields(&a);
        let category = album.unwrap_or_else(|| {
            a.parent()
                .filter(|p| *p != dir)
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
                .unwrap_or("Portfolio")
                .to_string()
        });

        previews.push(PreviewItem {
            id: 0,
            title: title.unwrap_or(stem),
            client,
            category,
            kind: None,
            audio: a,
            cover: None,
        });
    }

    previews.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    for (i, p) in previews.iter_mut().enumerate() {
        p.id = i as u32 + 1;
    }

    Catalog {
        ambient,
        previews,
        showcase,
    }
}
