mod analysis;
mod app;
mod audio;
mod config;
mod controls;
mod library;
mod metadata;
mod mpris;
mod player;
mod playlists;
mod runtime;
mod storage;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
