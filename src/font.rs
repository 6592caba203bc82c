//! Bitmap font rendering over per-character textures.
//!
//! Each drawable character maps to its own texture file resolved through
//! a dedicated asset manager layered over the core one: the uppercased
//! character plus `.png`, with punctuation that cannot name a file
//! special-cased. The space character has no texture and only advances
//! the pen.

#![allow(dead_code)]

use std::collections::HashMap;
use std::rc::Rc;

use macroquad::prelude::*;

use crate::asset::AssetManager;

/// Horizontal advance for the space character.
const SPACE_WIDTH: f32 = 16.0;

pub struct FontRenderer {
    assets: AssetManager,
    cached: HashMap<char, Texture2D>,
}

impl FontRenderer {
    /// A renderer pulling per-character textures from `font_dir`,
    /// layered over the core manager.
    pub fn new(core: &Rc<AssetManager>, font_dir: impl Into<String>) -> Self {
        let mut assets = AssetManager::with_parent(core.clone());
        assets.add_search_dir(font_dir);
        Self {
            assets,
            cached: HashMap::new(),
        }
    }

    fn char_texture(&mut self, c: char) -> Option<Texture2D> {
        if let Some(texture) = self.cached.get(&c) {
            return Some(texture.clone());
        }
        let identifier = char_identifier(c)?;
        let texture = self.assets.get_texture(&identifier)?;
        self.cached.insert(c, texture.clone());
        Some(texture)
    }

    /// Draws a string at `position`; characters without a texture are
    /// skipped.
    pub fn draw_string(&mut self, text: &str, position: Vec2, scale: f32) {
        let mut x = position.x;
        for c in text.chars() {
            if c == ' ' {
                x += SPACE_WIDTH * scale;
                continue;
            }
            let Some(texture) = self.char_texture(c) else {
                continue;
            };
            let width = texture.width() * scale;
            let height = texture.height() * scale;
            draw_texture_ex(
                &texture,
                x,
                position.y,
                WHITE,
                DrawTextureParams {
                    dest_size: Some(vec2(width, height)),
                    ..Default::default()
                },
            );
            x += width;
        }
    }

    /// Width and height the string occupies at `scale`.
    pub fn measure_string(&mut self, text: &str, scale: f32) -> Vec2 {
        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for c in text.chars() {
            if c == ' ' {
                width += SPACE_WIDTH * scale;
                continue;
            }
            let Some(texture) = self.char_texture(c) else {
                continue;
            };
            width += texture.width() * scale;
            height = height.max(texture.height() * scale);
        }
        vec2(width, height)
    }

    pub fn draw_string_and_measure(&mut self, text: &str, position: Vec2, scale: f32) -> Vec2 {
        self.draw_string(text, position, scale);
        self.measure_string(text, scale)
    }
}

/// Identifier for a character's texture. `None` for characters the font
/// does not cover.
fn char_identifier(c: char) -> Option<String> {
    let name = match c {
        '.' => "dot".to_string(),
        ',' => "comma".to_string(),
        '!' => "exclamation".to_string(),
        '?' => "question".to_string(),
        ':' => "colon".to_string(),
        '-' => "dash".to_string(),
        c if c.is_alphanumeric() => c.to_uppercase().to_string(),
        _ => return None,
    };
    Some(format!("{}.png", name))
}
