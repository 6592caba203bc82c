//! The main menu scene.

use std::rc::Rc;

use macroquad::prelude::*;

use super::{Screen, ScreenAction};
use crate::app::AppContext;
use crate::asset::AssetManager;
use crate::engine::arena::ArenaIndex;
use crate::engine::render::{draw_animation, fill_screen_with_texture};

/// Scene-local assets live under this prefix, layered over the core
/// manager's search roots.
const MENU_ASSET_DIR: &str = "assets/menu/";

pub struct MainMenuScreen {
    assets: AssetManager,
    /// Optional animated title, loaded once at construction.
    title_animation: Option<ArenaIndex>,
}

impl MainMenuScreen {
    pub fn new(core: &Rc<AssetManager>) -> Self {
        let mut assets = AssetManager::with_parent(core.clone());
        assets.add_search_dir(MENU_ASSET_DIR);
        let title_animation = assets.get_animation("title.anim");
        Self {
            assets,
            title_animation,
        }
    }
}

impl Screen for MainMenuScreen {
    fn update(&mut self, ctx: &mut AppContext) -> ScreenAction {
        if let Some(index) = self.title_animation {
            if let Some(mut animation) = self.assets.animation_mut(index) {
                animation.update();
            }
        }

        if is_key_pressed(KeyCode::Space) {
            return ScreenAction::Switch(Box::new(MainMenuScreen::new(&ctx.assets)));
        }

        ScreenAction::None
    }

    fn render(&mut self, ctx: &mut AppContext, _partial_tick: f32) {
        clear_background(WHITE);

        if let Some(background) = self.assets.get_texture("background.png") {
            fill_screen_with_texture(&background);
        }

        if let Some(logo) = self.assets.get_texture("logo.png") {
            let x = screen_width() / 2.0 - logo.width() / 2.0;
            let y = screen_height() / 2.0 - logo.height() / 2.0;
            draw_texture(&logo, x, y, WHITE);
        }

        if let Some(index) = self.title_animation {
            draw_animation(
                &self.assets,
                index,
                screen_width() / 2.0,
                screen_height() * 0.75,
            );
        }

        ctx.font
            .draw_string("press space", vec2(24.0, screen_height() - 48.0), 1.0);
    }
}
