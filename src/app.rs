//! Application driver: shared context plus the active screen.
//!
//! All screen code receives an [`AppContext`] by reference rather than
//! reaching into process-wide state. The driver owns the current
//! screen and applies whatever [`ScreenAction`] it returns from an
//! update.

use std::rc::Rc;

use log::warn;

use crate::asset::AssetManager;
use crate::audio::SoundQueue;
use crate::config::GameConfig;
use crate::font::FontRenderer;
use crate::screens::{MainMenuScreen, Screen, ScreenAction, TransitionScreen};

const FONT_DIR: &str = "assets/font/";
const MENU_MUSIC: &str = "assets/music/menu.ogg";
const MUSIC_FADE_IN_MILLIS: u64 = 2000;

/// Shared services handed to every screen.
pub struct AppContext {
    pub assets: Rc<AssetManager>,
    pub font: FontRenderer,
    pub sounds: SoundQueue,
}

pub struct App {
    pub ctx: AppContext,
    screen: Option<Box<dyn Screen>>,
}

impl App {
    pub fn new(config: &GameConfig) -> Self {
        let mut core = AssetManager::new();
        for root in &config.asset_roots {
            core.add_search_dir(root);
        }
        let core = Rc::new(core);

        let screen: Box<dyn Screen> = Box::new(MainMenuScreen::new(&core));
        let ctx = AppContext {
            font: FontRenderer::new(&core, FONT_DIR),
            assets: core,
            sounds: SoundQueue::new(),
        };

        Self {
            ctx,
            screen: Some(screen),
        }
    }

    pub async fn start_menu_music(&mut self) {
        match self.ctx.assets.get_sound(MENU_MUSIC).await {
            Some(sound) => self
                .ctx
                .sounds
                .queue_looping_fade_in(sound, MUSIC_FADE_IN_MILLIS),
            None => warn!("Menu music not found, starting silent"),
        }
    }

    /// One fixed tick: advance the active screen, apply its action,
    /// then service the sound queue.
    pub fn update(&mut self) {
        if let Some(mut screen) = self.screen.take() {
            let action = screen.update(&mut self.ctx);
            self.screen = Some(match action {
                ScreenAction::None => screen,
                ScreenAction::Switch(next) => Box::new(TransitionScreen::new(screen, next)),
                ScreenAction::Replace(next) => next,
            });
        }
        self.ctx.sounds.update();
    }

    pub fn render(&mut self, partial_tick: f32) {
        if let Some(screen) = self.screen.as_mut() {
            screen.render(&mut self.ctx, partial_tick);
        }
    }
}
