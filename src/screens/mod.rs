//! Screen stack: dyn-dispatched scenes plus the fade transition.
//!
//! Screens never install their successor directly; they return a
//! [`ScreenAction`] and the driver applies it, so ownership of every
//! screen moves explicitly through return values rather than through
//! destructor side effects.

mod main_menu;
mod transition;

pub use main_menu::MainMenuScreen;
pub use transition::TransitionScreen;

use crate::app::AppContext;

/// What a screen wants the driver to do after an update.
pub enum ScreenAction {
    None,
    /// Hand control to a new screen through a fade transition.
    Switch(Box<dyn Screen>),
    /// Replace the active screen immediately, no transition.
    Replace(Box<dyn Screen>),
}

pub trait Screen {
    /// One fixed-rate gameplay tick.
    fn update(&mut self, ctx: &mut AppContext) -> ScreenAction;

    /// One render frame; `partial_tick` interpolates between ticks.
    fn render(&mut self, ctx: &mut AppContext, partial_tick: f32);
}
