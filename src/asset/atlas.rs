//! Sprite atlas composition.

use std::fmt;

use macroquad::prelude::{Image, Rect};

/// The composed atlas would not fit the image type's `u16` dimensions.
#[derive(Debug)]
pub struct AtlasError {
    width: usize,
    height: usize,
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "atlas would be {}x{}, past the u16 texture limit",
            self.width, self.height
        )
    }
}

impl std::error::Error for AtlasError {}

/// Composes source frames into one horizontally tiled image.
///
/// The output is `(sum of widths) x (max height)` with each frame blitted
/// left-to-right at its cumulative x offset; the returned rects address
/// the original frames inside the atlas, in input order. Baking every
/// frame into a single texture keeps animation playback to one bind; the
/// bake happens on CPU pixels and the caller uploads the result once.
/// Summed widths past `u16::MAX` cannot be represented in the image type
/// and fail instead of truncating.
pub fn build_sprite_atlas(frames: &[Image]) -> Result<(Image, Vec<Rect>), AtlasError> {
    let atlas_width: usize = frames.iter().map(|f| f.width as usize).sum();
    let atlas_height: usize = frames.iter().map(|f| f.height as usize).max().unwrap_or(0);

    let (Ok(width), Ok(height)) = (u16::try_from(atlas_width), u16::try_from(atlas_height))
    else {
        return Err(AtlasError {
            width: atlas_width,
            height: atlas_height,
        });
    };

    let mut atlas = Image {
        bytes: vec![0; atlas_width * atlas_height * 4],
        width,
        height,
    };

    let mut rects = Vec::with_capacity(frames.len());
    let mut x_offset = 0usize;
    for frame in frames {
        blit(&mut atlas, frame, x_offset);
        rects.push(Rect::new(
            x_offset as f32,
            0.0,
            f32::from(frame.width),
            f32::from(frame.height),
        ));
        x_offset += frame.width as usize;
    }

    Ok((atlas, rects))
}

/// Copies `src` into `dst` with its top-left corner at `(x, 0)`, one RGBA
/// row at a time.
fn blit(dst: &mut Image, src: &Image, x: usize) {
    let dst_width = dst.width as usize;
    let src_width = src.width as usize;
    for row in 0..src.height as usize {
        let src_start = row * src_width * 4;
        let dst_start = (row * dst_width + x) * 4;
        dst.bytes[dst_start..dst_start + src_width * 4]
            .copy_from_slice(&src.bytes[src_start..src_start + src_width * 4]);
    }
}
