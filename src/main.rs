mod app;
mod config;
mod favorites;
mod library;
mod metadata;
mod mpris;
mod player;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
