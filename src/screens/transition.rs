//! Fade transition between two screens.
//!
//! The transition owns the outgoing screen and drops it the moment the
//! fade-out completes; the incoming screen is held until the fade-in
//! finishes and is then handed back to the driver via
//! [`ScreenAction::Replace`]. Neither wrapped screen receives updates
//! while the transition runs.

use macroquad::prelude::*;

use super::{Screen, ScreenAction};
use crate::app::AppContext;

/// Ticks for each half of the fade.
const FADE_TICKS: u32 = 10;

enum Phase {
    FadingOut { remaining: u32 },
    FadingIn { remaining: u32 },
}

pub struct TransitionScreen {
    previous: Option<Box<dyn Screen>>,
    next: Option<Box<dyn Screen>>,
    phase: Phase,
}

impl TransitionScreen {
    pub fn new(previous: Box<dyn Screen>, next: Box<dyn Screen>) -> Self {
        Self {
            previous: Some(previous),
            next: Some(next),
            phase: Phase::FadingOut {
                remaining: FADE_TICKS,
            },
        }
    }

    fn overlay_alpha(&self) -> f32 {
        match self.phase {
            Phase::FadingOut { remaining } => 1.0 - remaining as f32 / FADE_TICKS as f32,
            Phase::FadingIn { remaining } => remaining as f32 / FADE_TICKS as f32,
        }
    }
}

impl Screen for TransitionScreen {
    fn update(&mut self, _ctx: &mut AppContext) -> ScreenAction {
        match &mut self.phase {
            Phase::FadingOut { remaining } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    // the outgoing screen is done for good
                    self.previous = None;
                    self.phase = Phase::FadingIn {
                        remaining: FADE_TICKS,
                    };
                }
                ScreenAction::None
            }
            Phase::FadingIn { remaining } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    if let Some(next) = self.next.take() {
                        return ScreenAction::Replace(next);
                    }
                }
                ScreenAction::None
            }
        }
    }

    fn render(&mut self, ctx: &mut AppContext, partial_tick: f32) {
        match self.phase {
            Phase::FadingOut { .. } => {
                if let Some(previous) = self.previous.as_mut() {
                    previous.render(ctx, partial_tick);
                }
            }
            Phase::FadingIn { .. } => {
                if let Some(next) = self.next.as_mut() {
                    next.render(ctx, partial_tick);
                }
            }
        }

        let alpha = self.overlay_alpha();
        draw_rectangle(
            0.0,
            0.0,
            screen_width(),
            screen_height(),
            Color::new(0.0, 0.0, 0.0, alpha),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppContext;
    use crate::asset::AssetManager;
    use crate::audio::SoundQueue;
    use crate::font::FontRenderer;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Screen that flags its own drop, to observe transition ownership.
    struct TrackedScreen {
        dropped: Rc<Cell<bool>>,
    }

    impl Drop for TrackedScreen {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    impl Screen for TrackedScreen {
        fn update(&mut self, _ctx: &mut AppContext) -> ScreenAction {
            ScreenAction::None
        }
        fn render(&mut self, _ctx: &mut AppContext, _partial_tick: f32) {}
    }

    fn test_ctx() -> AppContext {
        let assets = Rc::new(AssetManager::new());
        let font = FontRenderer::new(&assets, "assets/font/");
        AppContext {
            assets,
            font,
            sounds: SoundQueue::new(),
        }
    }

    #[test]
    fn outgoing_screen_is_dropped_at_fade_out_end() {
        let mut ctx = test_ctx();
        let prev_dropped = Rc::new(Cell::new(false));
        let next_dropped = Rc::new(Cell::new(false));

        let mut transition = TransitionScreen::new(
            Box::new(TrackedScreen {
                dropped: prev_dropped.clone(),
            }),
            Box::new(TrackedScreen {
                dropped: next_dropped.clone(),
            }),
        );

        for _ in 0..FADE_TICKS - 1 {
            transition.update(&mut ctx);
            assert!(!prev_dropped.get());
        }
        transition.update(&mut ctx);
        assert!(prev_dropped.get());
        assert!(!next_dropped.get());
    }

    #[test]
    fn incoming_screen_is_handed_back_after_fade_in() {
        let mut ctx = test_ctx();
        let next_dropped = Rc::new(Cell::new(false));

        let mut transition = TransitionScreen::new(
            Box::new(TrackedScreen {
                dropped: Rc::new(Cell::new(false)),
            }),
            Box::new(TrackedScreen {
                dropped: next_dropped.clone(),
            }),
        );

        let mut handed_back = None;
        for _ in 0..2 * FADE_TICKS {
            if let ScreenAction::Replace(next) = transition.update(&mut ctx) {
                handed_back = Some(next);
            }
        }

        let next = handed_back.expect("transition hands the next screen back");
        assert!(!next_dropped.get());
        drop(next);
        assert!(next_dropped.get());
    }

    #[test]
    fn overlay_peaks_between_the_fades() {
        let mut ctx = test_ctx();
        let mut transition = TransitionScreen::new(
            Box::new(TrackedScreen {
                dropped: Rc::new(Cell::new(false)),
            }),
            Box::new(TrackedScreen {
                dropped: Rc::new(Cell::new(false)),
            }),
        );

        assert_eq!(transition.overlay_alpha(), 0.0);
        for _ in 0..FADE_TICKS {
            transition.update(&mut ctx);
        }
        assert_eq!(transition.overlay_alpha(), 1.0);
    }
}
