mod app;
mod bus;
mod catalog;
mod config;
mod media;
mod mpris;
mod playback;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
