//! The asset subsystem.
//!
//! Identifier strings resolve through a chain of [`AssetManager`]s
//! (ancestors first, then the local cache, then the filesystem search
//! dirs). Animations come from small `key->value` descriptor files whose
//! frames are inline base64 PNG data; decoded frames are baked into a
//! single atlas texture and the playback state lives in arena storage
//! owned by the manager that loaded it.

pub mod animation;
pub mod atlas;
pub mod descriptor;
pub mod manager;
pub mod parse;

pub use manager::AssetManager;
