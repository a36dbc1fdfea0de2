use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::app::App;
use crate::catalog::Catalog;
use crate::config;
use crate::media::{ElementFactory, LoftyProbe, RodioFactory, open_output};
use crate::playback::Stage;

/// Load the catalog, open the audio output and wire the stage into an `App`.
/// `media_dir` from the command line wins over `catalog.media_dir`.
pub fn build_app(
    settings: &mut config::Settings,
    media_dir: Option<PathBuf>,
) -> Result<App, Box<dyn std::error::Error>> {
    if let Some(dir) = media_dir {
        settings.catalog.media_dir = dir;
    }

    let catalog = Catalog::load(settings)?;
    let stream = open_output()?;
    let factory: Rc<dyn ElementFactory> = Rc::new(RodioFactory::new(
        stream,
        Duration::from_millis(settings.audio.progress_interval_ms),
    ));

    let stage = Stage::new(catalog, factory, Arc::new(LoftyProbe), settings);
    info!(
        previews = stage.previews().len(),
        reels = stage.reels().len(),
        ambient = stage.ambient().is_configured(),
        "stage ready"
    );
    Ok(App::new(stage, settings.ui.columns))
}
