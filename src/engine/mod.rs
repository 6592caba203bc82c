//! Engine-level building blocks: arena storage, tick timing, draw helpers.

pub mod arena;
pub mod render;
pub mod timer;
