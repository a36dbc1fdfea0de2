//! The studio's content list: preview cards, showcase reels and the ambient
//! track, read from `catalog.toml` or discovered by scanning a media folder.

mod display;
mod load;
mod model;
mod scan;

pub use display::card_line;
pub use model::*;
