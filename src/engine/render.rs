//! Small drawing helpers shared by screens.

use macroquad::prelude::*;

use crate::asset::AssetManager;
use crate::engine::arena::ArenaIndex;

/// Draws a texture stretched over `dest`.
pub fn draw_textured_rect(texture: &Texture2D, dest: Rect) {
    draw_texture_ex(
        texture,
        dest.x,
        dest.y,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(dest.w, dest.h)),
            ..Default::default()
        },
    );
}

pub fn fill_screen_with_texture(texture: &Texture2D) {
    draw_textured_rect(texture, Rect::new(0.0, 0.0, screen_width(), screen_height()));
}

/// Draws the current frame of an animation at native frame size.
pub fn draw_animation(assets: &AssetManager, index: ArenaIndex, x: f32, y: f32) {
    let Some(animation) = assets.animation(index) else {
        return;
    };
    let (atlas, source) = animation.frame();
    draw_texture_ex(
        &atlas,
        x,
        y,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(source.w, source.h)),
            source: Some(source),
            ..Default::default()
        },
    );
}
