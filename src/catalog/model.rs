use std::path::PathBuf;

/// Client shown when an item does not name one.
pub const DEFAULT_CLIENT: &str = "Studio";
/// Work type shown when an item does not name one.
pub const DEFAULT_KIND: &str = "Sound Design";

/// One card of the preview grid. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewItem {
    pub id: u32,
    pub title: String,
    pub client: Option<String>,
    pub category: String,
    pub kind: Option<String>,
    pub audio: PathBuf,
    pub cover: Option<PathBuf>,
}

impl PreviewItem {
    pub fn client_label(&self) -> &str {
        self.client.as_deref().unwrap_or(DEFAULT_CLIENT)
    }

    pub fn kind_label(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_KIND)
    }
}

/// A reel opened in the full-screen overlay: a picture stream and, when the
/// soundtrack ships separately, its audio stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseEntry {
    pub title: String,
    pub client: Option<String>,
    pub kind: Option<String>,
    pub video: PathBuf,
    pub audio: Option<PathBuf>,
}

impl ShowcaseEntry {
    pub fn client_label(&self) -> &str {
        self.client.as_deref().unwrap_or(DEFAULT_CLIENT)
    }

    pub fn kind_label(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_KIND)
    }
}

/// The studio's static content list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub ambient: Option<PathBuf>,
    pub previews: Vec<PreviewItem>,
    pub showcase: Vec<ShowcaseEntry>,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.ambient.is_none() && self.previews.is_empty() && self.showcase.is_empty()
    }
}
