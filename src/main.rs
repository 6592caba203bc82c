//! EMBER-2D: a small fixed-timestep 2D game shell
//!
//! Hierarchical asset managers with parent-delegated lookup, animated
//! sprites packed into runtime atlases, a bitmap font renderer and a
//! queued music player, driven by a screen stack with fade
//! transitions.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod asset;
mod audio;
mod config;
mod engine;
mod font;
mod screens;

use macroquad::prelude::*;

use app::App;
use config::GameConfig;
use engine::timer::TickTimer;

const CONFIG_PATH: &str = "config.ron";

fn window_conf() -> Conf {
    let config = GameConfig::load_or_default(CONFIG_PATH);
    Conf {
        window_title: format!("{} v{}", config.window_title, VERSION),
        window_width: config.window_width,
        window_height: config.window_height,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    let config = GameConfig::load_or_default(CONFIG_PATH);
    let mut app = App::new(&config);
    app.start_menu_music().await;

    let mut timer = TickTimer::new(config.ticks_per_second);
    loop {
        if timer.should_tick() {
            app.update();
        }
        app.render(timer.partial_tick());
        next_frame().await;
    }
}
