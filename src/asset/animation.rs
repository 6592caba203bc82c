//! Animation playback over a sprite atlas.

#![allow(dead_code)]

use std::fmt;

use macroquad::prelude::{Rect, Texture2D};

use crate::engine::timer::TickTimer;

/// Upper bound on frame slots in a descriptor.
pub const ANIMATION_MAX_FRAMES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationType {
    Looping,
    BackAndForth,
}

/// Traversal direction, meaningful only for back-and-forth playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PingPongDir {
    Inc,
    Dec,
}

#[derive(Debug)]
pub enum AnimationError {
    /// Back-and-forth playback needs at least two layout entries; the
    /// turnaround arithmetic is meaningless below that.
    LayoutTooShort(usize),
    /// A layout with no entries at all.
    EmptyLayout,
    /// A layout entry points past the frame list.
    LayoutIndexOutOfRange(u32),
}

impl fmt::Display for AnimationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationError::LayoutTooShort(len) => {
                write!(f, "back-and-forth layout needs >= 2 entries, got {}", len)
            }
            AnimationError::EmptyLayout => write!(f, "empty frame layout"),
            AnimationError::LayoutIndexOutOfRange(index) => {
                write!(f, "layout entry {} points past the frame list", index)
            }
        }
    }
}

impl std::error::Error for AnimationError {}

/// Pure playback pointer state, kept apart from the atlas texture so the
/// traversal arithmetic can be exercised on its own.
#[derive(Debug)]
pub struct Playback {
    layout: Vec<u32>,
    ptr: usize,
    ty: AnimationType,
    dir: PingPongDir,
}

impl Playback {
    pub fn new(ty: AnimationType, layout: Vec<u32>) -> Result<Self, AnimationError> {
        if layout.is_empty() {
            return Err(AnimationError::EmptyLayout);
        }
        if ty == AnimationType::BackAndForth && layout.len() < 2 {
            return Err(AnimationError::LayoutTooShort(layout.len()));
        }
        Ok(Self {
            layout,
            ptr: 0,
            ty,
            dir: PingPongDir::Inc,
        })
    }

    /// Frame index the current layout position points at.
    pub fn current(&self) -> u32 {
        self.layout[self.ptr]
    }

    /// Position within the layout itself.
    pub fn position(&self) -> usize {
        self.ptr
    }

    /// Advances one tick.
    ///
    /// Looping wraps modularly. Back-and-forth turns around without
    /// repeating either endpoint: a 4-entry layout is visited
    /// `0,1,2,3,2,1,0,1,...`.
    pub fn advance(&mut self) {
        match self.ty {
            AnimationType::Looping => {
                self.ptr = (self.ptr + 1) % self.layout.len();
            }
            AnimationType::BackAndForth => match self.dir {
                PingPongDir::Inc => {
                    self.ptr += 1;
                    if self.ptr == self.layout.len() {
                        self.ptr = self.layout.len() - 2;
                        self.dir = PingPongDir::Dec;
                    }
                }
                PingPongDir::Dec => {
                    if self.ptr == 0 {
                        self.ptr = 1;
                        self.dir = PingPongDir::Inc;
                    } else {
                        self.ptr -= 1;
                    }
                }
            },
        }
    }
}

/// A loaded animation: one atlas texture, per-frame source rects, and
/// tick-gated playback state. Constructed by the asset manager and stored
/// in its arena; callers interact through handles so there is exactly one
/// mutable instance per identifier.
pub struct Animation {
    atlas: Texture2D,
    frames: Vec<Rect>,
    playback: Playback,
    timer: TickTimer,
}

impl Animation {
    pub fn new(
        atlas: Texture2D,
        frames: Vec<Rect>,
        layout: Vec<u32>,
        fps: u32,
        ty: AnimationType,
    ) -> Result<Self, AnimationError> {
        if let Some(&bad) = layout.iter().find(|&&i| i as usize >= frames.len()) {
            return Err(AnimationError::LayoutIndexOutOfRange(bad));
        }
        Ok(Self {
            atlas,
            frames,
            playback: Playback::new(ty, layout)?,
            timer: TickTimer::new(fps.max(1)),
        })
    }

    /// Advances at most one playback step when the fps timer fires.
    /// Render rate may exceed tick rate; extra calls are no-ops.
    pub fn update(&mut self) {
        if self.timer.should_tick() {
            self.playback.advance();
        }
    }

    /// Atlas texture and source rect of the current frame. Idempotent
    /// between ticks.
    pub fn frame(&self) -> (Texture2D, Rect) {
        (
            self.atlas.clone(),
            self.frames[self.playback.current() as usize],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions_after(playback: &mut Playback, steps: usize) -> Vec<usize> {
        let mut visited = vec![playback.position()];
        for _ in 0..steps {
            playback.advance();
            visited.push(playback.position());
        }
        visited
    }

    #[test]
    fn back_and_forth_never_repeats_endpoints() {
        let mut playback =
            Playback::new(AnimationType::BackAndForth, vec![0, 1, 2, 3]).expect("playback");
        assert_eq!(
            positions_after(&mut playback, 8),
            vec![0, 1, 2, 3, 2, 1, 0, 1, 2]
        );
    }

    #[test]
    fn back_and_forth_two_entries_alternates() {
        let mut playback =
            Playback::new(AnimationType::BackAndForth, vec![0, 1]).expect("playback");
        assert_eq!(positions_after(&mut playback, 4), vec![0, 1, 0, 1, 0]);
    }

    #[test]
    fn looping_wraps_modularly() {
        let mut playback = Playback::new(AnimationType::Looping, vec![0, 1, 2]).expect("playback");
        assert_eq!(positions_after(&mut playback, 4), vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn looping_single_frame_stays_put() {
        let mut playback = Playback::new(AnimationType::Looping, vec![0]).expect("playback");
        playback.advance();
        assert_eq!(playback.position(), 0);
        assert_eq!(playback.current(), 0);
    }

    #[test]
    fn back_and_forth_rejects_short_layouts() {
        assert!(matches!(
            Playback::new(AnimationType::BackAndForth, vec![0]),
            Err(AnimationError::LayoutTooShort(1))
        ));
        assert!(matches!(
            Playback::new(AnimationType::BackAndForth, Vec::new()),
            Err(AnimationError::EmptyLayout)
        ));
    }

    #[test]
    fn current_follows_layout_not_position() {
        let mut playback = Playback::new(AnimationType::Looping, vec![3, 1, 3]).expect("playback");
        assert_eq!(playback.current(), 3);
        playback.advance();
        assert_eq!(playback.current(), 1);
        playback.advance();
        assert_eq!(playback.current(), 3);
    }
}
