//! Identifier-keyed asset resolution with parent-delegated lookup.
//!
//! Managers form a chain: a scope-local manager (a screen, the font
//! renderer) defers to the enclosing manager before consulting its own
//! cache or search directories, so globally shared assets load exactly
//! once while scopes can still layer their own on top. Delegation is a
//! read-only walk; a child never mutates an ancestor beyond the
//! ancestor's own lazy caches, and every manager exclusively owns the
//! entries it inserted.
//!
//! Resolution order for every getter: each ancestor root-first (its
//! cache, then its search dirs), then the local cache, then the local
//! search dirs. Within one manager the bare identifier is tried before
//! the search-dir prefixes, in addition order, first existing and
//! successfully decoding path wins. A total miss is an empty result and a
//! warning on the log sink, never an error the caller must unwind.

#![allow(dead_code)]

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::{debug, error, info, warn};
use macroquad::audio::{load_sound_from_bytes, Sound};
use macroquad::prelude::{Image, Texture2D};

use super::animation::{Animation, AnimationError};
use super::atlas::{build_sprite_atlas, AtlasError};
use super::descriptor::{parse_animation_descriptor, DescriptorError};
use crate::engine::arena::{ArenaAllocator, ArenaIndex};

/// Animations per arena block. The backing store never relocates, which
/// is what keeps handles valid for the manager's whole lifetime.
const ANIMATION_ARENA_BLOCK: usize = 64;

/// Why an animation failed to build from its descriptor.
#[derive(Debug)]
enum AssetLoadError {
    Descriptor(DescriptorError),
    FrameDecode(usize, ImageDecodeError),
    Atlas(AtlasError),
    Animation(AnimationError),
}

impl fmt::Display for AssetLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLoadError::Descriptor(e) => write!(f, "descriptor error: {}", e),
            AssetLoadError::FrameDecode(index, e) => {
                write!(f, "frame {} failed to decode: {}", index, e)
            }
            AssetLoadError::Atlas(e) => write!(f, "atlas error: {}", e),
            AssetLoadError::Animation(e) => write!(f, "animation error: {}", e),
        }
    }
}

impl From<DescriptorError> for AssetLoadError {
    fn from(e: DescriptorError) -> Self {
        AssetLoadError::Descriptor(e)
    }
}

impl From<AtlasError> for AssetLoadError {
    fn from(e: AtlasError) -> Self {
        AssetLoadError::Atlas(e)
    }
}

impl From<AnimationError> for AssetLoadError {
    fn from(e: AnimationError) -> Self {
        AssetLoadError::Animation(e)
    }
}

/// Why raw image bytes did not become usable pixels.
#[derive(Debug)]
pub(crate) enum ImageDecodeError {
    Decode(image::ImageError),
    /// Decoded fine, but the dimensions do not fit the image type's
    /// `u16` fields.
    TooLarge(u32, u32),
}

impl fmt::Display for ImageDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageDecodeError::Decode(e) => write!(f, "{}", e),
            ImageDecodeError::TooLarge(width, height) => {
                write!(f, "image is {}x{}, past the u16 texture limit", width, height)
            }
        }
    }
}

impl From<image::ImageError> for ImageDecodeError {
    fn from(e: image::ImageError) -> Self {
        ImageDecodeError::Decode(e)
    }
}

pub struct AssetManager {
    /// Enclosing manager, consulted before anything local. Non-owning
    /// from this manager's point of view; the `Rc` only keeps the
    /// ancestor alive, never grants mutation.
    parent: Option<Rc<AssetManager>>,
    /// Search prefixes in addition order; order defines precedence.
    search_dirs: Vec<String>,
    textures: RefCell<HashMap<String, Texture2D>>,
    sounds: RefCell<HashMap<String, Sound>>,
    animations: RefCell<HashMap<String, ArenaIndex>>,
    animation_store: RefCell<ArenaAllocator<Animation, ANIMATION_ARENA_BLOCK>>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self {
            parent: None,
            search_dirs: Vec::new(),
            textures: RefCell::new(HashMap::new()),
            sounds: RefCell::new(HashMap::new()),
            animations: RefCell::new(HashMap::new()),
            animation_store: RefCell::new(ArenaAllocator::new()),
        }
    }

    /// A manager that defers to `parent` before its own cache and search
    /// dirs.
    pub fn with_parent(parent: Rc<AssetManager>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new()
        }
    }

    /// Appends a search prefix. Lookup is not recursive: subdirectories
    /// must be added explicitly.
    pub fn add_search_dir(&mut self, dir: impl Into<String>) {
        self.search_dirs.push(dir.into());
    }

    /// Ancestors, root first. Resolution tries each of these before
    /// `self`.
    fn ancestors(&self) -> Vec<Rc<AssetManager>> {
        let mut chain = Vec::new();
        let mut current = self.parent.clone();
        while let Some(manager) = current {
            current = manager.parent.clone();
            chain.push(manager);
        }
        chain.reverse();
        chain
    }

    /// Candidate paths for an identifier: the bare identifier, then the
    /// identifier under each search dir in addition order.
    fn candidate_paths(&self, identifier: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(identifier)];
        for dir in &self.search_dirs {
            paths.push(Path::new(dir).join(identifier));
        }
        paths
    }

    /// The shared chain walk: each ancestor root-first, then this
    /// manager. The first manager whose `local` lookup hits wins.
    fn resolve<T>(&self, local: impl Fn(&AssetManager) -> Option<T>) -> Option<T> {
        for ancestor in self.ancestors() {
            if let Some(found) = local(&ancestor) {
                return Some(found);
            }
        }
        local(self)
    }

    /// One manager's lookup: the cache first, then every candidate path
    /// through `load`. A cache hit never touches the filesystem; a
    /// successful load is cached before it is returned.
    fn cached_lookup<T: Clone>(
        &self,
        cache: &RefCell<HashMap<String, T>>,
        identifier: &str,
        load: impl Fn(&Path) -> Option<T>,
    ) -> Option<T> {
        if let Some(hit) = cache.borrow().get(identifier) {
            return Some(hit.clone());
        }
        for path in self.candidate_paths(identifier) {
            if !path.exists() {
                debug!("path does not exist: {}", path.display());
                continue;
            }
            if let Some(value) = load(&path) {
                cache
                    .borrow_mut()
                    .insert(identifier.to_string(), value.clone());
                return Some(value);
            }
        }
        None
    }

    // --- textures ---

    pub fn get_texture(&self, identifier: &str) -> Option<Texture2D> {
        let found = self.resolve(|manager| manager.local_texture(identifier));
        if found.is_none() {
            warn!("no texture found for {:?}", identifier);
        }
        found
    }

    fn local_texture(&self, identifier: &str) -> Option<Texture2D> {
        self.cached_lookup(&self.textures, identifier, |path| {
            decode_image_file(path).map(|image| Texture2D::from_image(&image))
        })
    }

    /// Evicts a locally cached texture. No-op when absent; never touches
    /// other managers. Optional: everything is released when the manager
    /// is dropped.
    pub fn free_texture(&self, identifier: &str) {
        self.textures.borrow_mut().remove(identifier);
    }

    /// Decodes the bare identifier path without caching or search-dir
    /// prefixing; the caller owns the result. Useful for loading pixels,
    /// editing them, and re-registering via
    /// [`AssetManager::upload_custom_texture`].
    pub fn load_raw_image(&self, identifier: &str) -> Option<Image> {
        let path = Path::new(identifier);
        if !path.exists() {
            debug!("path does not exist: {}", identifier);
            return None;
        }
        decode_image_file(path)
    }

    /// Registers caller-supplied pixels as a cached texture under
    /// `identifier`. Replacing an existing entry is a logged override,
    /// not an error.
    pub fn upload_custom_texture(&self, identifier: &str, image: &Image) -> Texture2D {
        let texture = Texture2D::from_image(image);
        let replaced = self
            .textures
            .borrow_mut()
            .insert(identifier.to_string(), texture.clone());
        if replaced.is_some() {
            info!("replaced custom texture {:?}", identifier);
        }
        texture
    }

    // --- sounds ---

    /// Async because the audio backend's decode is async; resolution
    /// order is identical to [`AssetManager::get_texture`], with the
    /// walk spelled out because the await point rules out the closure
    /// form of [`AssetManager::resolve`].
    pub async fn get_sound(&self, identifier: &str) -> Option<Sound> {
        for ancestor in self.ancestors() {
            if let Some(sound) = ancestor.local_sound(identifier).await {
                return Some(sound);
            }
        }
        match self.local_sound(identifier).await {
            Some(sound) => Some(sound),
            None => {
                warn!("no sound found for {:?}", identifier);
                None
            }
        }
    }

    async fn local_sound(&self, identifier: &str) -> Option<Sound> {
        if let Some(sound) = self.sounds.borrow().get(identifier) {
            return Some(sound.clone());
        }
        for path in self.candidate_paths(identifier) {
            if !path.exists() {
                debug!("path does not exist: {}", path.display());
                continue;
            }
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!("failed to read {}: {}", path.display(), e);
                    continue;
                }
            };
            match load_sound_from_bytes(&bytes).await {
                Ok(sound) => {
                    self.sounds
                        .borrow_mut()
                        .insert(identifier.to_string(), sound.clone());
                    return Some(sound);
                }
                Err(e) => debug!("failed to decode {}: {}", path.display(), e),
            }
        }
        None
    }

    /// Evicts a locally cached sound. No-op when absent.
    pub fn free_sound(&self, identifier: &str) {
        self.sounds.borrow_mut().remove(identifier);
    }

    // --- raw resources ---

    /// Reads a text resource with the same parent-then-local-then-search-
    /// dir resolution as textures. Not cached.
    pub fn read_resource_file(&self, identifier: &str) -> Option<String> {
        let found = self.resolve(|manager| manager.local_resource_file(identifier));
        if found.is_none() {
            warn!("no resource file found for {:?}", identifier);
        }
        found
    }

    fn local_resource_file(&self, identifier: &str) -> Option<String> {
        for path in self.candidate_paths(identifier) {
            if !path.exists() {
                debug!("path does not exist: {}", path.display());
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => return Some(text),
                Err(e) => debug!("failed to read {}: {}", path.display(), e),
            }
        }
        None
    }

    // --- animations ---

    /// Resolves an animation, loading and caching it on first miss. The
    /// returned handle stays valid for this manager chain's lifetime;
    /// the animation itself lives in arena storage and is never moved,
    /// so there is exactly one mutable instance per identifier.
    pub fn get_animation(&self, identifier: &str) -> Option<ArenaIndex> {
        let found = self.resolve(|manager| manager.local_animation(identifier));
        if found.is_none() {
            warn!("no animation found for {:?}", identifier);
        }
        found
    }

    fn local_animation(&self, identifier: &str) -> Option<ArenaIndex> {
        if let Some(index) = self.animations.borrow().get(identifier) {
            return Some(*index);
        }
        let text = self.local_resource_file(identifier)?;
        let animation = match build_animation(&text) {
            Ok(animation) => animation,
            Err(e) => {
                error!("failed to load animation {:?}: {}", identifier, e);
                return None;
            }
        };
        let index = self.animation_store.borrow_mut().alloc(animation)?;
        self.animations
            .borrow_mut()
            .insert(identifier.to_string(), index);
        Some(index)
    }

    /// Resolves a handle to its animation, walking up the chain when the
    /// handle belongs to an ancestor's arena.
    pub fn animation(&self, index: ArenaIndex) -> Option<Ref<'_, Animation>> {
        match Ref::filter_map(self.animation_store.borrow(), |store| store.get(index)) {
            Ok(animation) => Some(animation),
            Err(_) => self.parent.as_deref()?.animation(index),
        }
    }

    pub fn animation_mut(&self, index: ArenaIndex) -> Option<RefMut<'_, Animation>> {
        match RefMut::filter_map(self.animation_store.borrow_mut(), |store| {
            store.get_mut(index)
        }) {
            Ok(animation) => Some(animation),
            Err(_) => self.parent.as_deref()?.animation_mut(index),
        }
    }
}

impl Default for AssetManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Descriptor text to ready-to-play animation: parse, decode each frame,
/// compose the atlas, upload it once.
fn build_animation(text: &str) -> Result<Animation, AssetLoadError> {
    let descriptor = parse_animation_descriptor(text)?;

    let mut frames = Vec::with_capacity(descriptor.frames.len());
    for (index, bytes) in descriptor.frames.iter().enumerate() {
        let image =
            decode_image_bytes(bytes).map_err(|e| AssetLoadError::FrameDecode(index, e))?;
        frames.push(image);
    }

    let (atlas_image, rects) = build_sprite_atlas(&frames)?;
    let atlas = Texture2D::from_image(&atlas_image);

    Animation::new(
        atlas,
        rects,
        descriptor.layout,
        descriptor.fps,
        descriptor.animation_type,
    )
    .map_err(AssetLoadError::from)
}

/// Decodes an image file on the CPU.
fn decode_image_file(path: &Path) -> Option<Image> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("failed to read {}: {}", path.display(), e);
            return None;
        }
    };
    match decode_image_bytes(&bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            debug!("failed to decode {}: {}", path.display(), e);
            None
        }
    }
}

/// Decodes encoded image bytes (PNG) into CPU-side RGBA pixels.
/// Dimensions past `u16::MAX` are an error, never a truncation.
pub(crate) fn decode_image_bytes(bytes: &[u8]) -> Result<Image, ImageDecodeError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    let (Ok(narrow_width), Ok(narrow_height)) = (u16::try_from(width), u16::try_from(height))
    else {
        return Err(ImageDecodeError::TooLarge(width, height));
    };
    Ok(Image {
        bytes: decoded.into_raw(),
        width: narrow_width,
        height: narrow_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn dir_with_file(name: &str, contents: &str) -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join(name), contents).expect("write fixture");
        dir
    }

    fn search_dir(dir: &TempDir) -> String {
        format!("{}/", dir.path().display())
    }

    #[test]
    fn candidate_paths_are_bare_then_dirs_in_order() {
        let mut manager = AssetManager::new();
        manager.add_search_dir("a/");
        manager.add_search_dir("b/");

        let paths = manager.candidate_paths("id.png");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("id.png"),
                PathBuf::from("a/id.png"),
                PathBuf::from("b/id.png"),
            ]
        );
    }

    #[test]
    fn ancestor_resource_is_preferred_over_local() {
        let parent_dir = dir_with_file("shared.txt", "from parent");
        let child_dir = dir_with_file("shared.txt", "from child");

        let mut parent = AssetManager::new();
        parent.add_search_dir(search_dir(&parent_dir));
        let parent = Rc::new(parent);

        let mut child = AssetManager::with_parent(parent.clone());
        child.add_search_dir(search_dir(&child_dir));

        assert_eq!(
            child.read_resource_file("shared.txt").as_deref(),
            Some("from parent")
        );
    }

    #[test]
    fn grandparent_wins_over_parent_and_local() {
        let root_dir = dir_with_file("shared.txt", "root");
        let mid_dir = dir_with_file("shared.txt", "mid");
        let leaf_dir = dir_with_file("shared.txt", "leaf");

        let mut root = AssetManager::new();
        root.add_search_dir(search_dir(&root_dir));
        let root = Rc::new(root);

        let mut mid = AssetManager::with_parent(root);
        mid.add_search_dir(search_dir(&mid_dir));
        let mid = Rc::new(mid);

        let mut leaf = AssetManager::with_parent(mid);
        leaf.add_search_dir(search_dir(&leaf_dir));

        assert_eq!(
            leaf.read_resource_file("shared.txt").as_deref(),
            Some("root")
        );
    }

    #[test]
    fn child_falls_back_to_its_own_dirs() {
        let parent_dir = TempDir::new().expect("temp dir");
        let child_dir = dir_with_file("local.txt", "from child");

        let mut parent = AssetManager::new();
        parent.add_search_dir(search_dir(&parent_dir));
        let parent = Rc::new(parent);

        let mut child = AssetManager::with_parent(parent);
        child.add_search_dir(search_dir(&child_dir));

        assert_eq!(
            child.read_resource_file("local.txt").as_deref(),
            Some("from child")
        );
    }

    #[test]
    fn first_search_dir_wins_within_one_manager() {
        let first = dir_with_file("f.txt", "first");
        let second = dir_with_file("f.txt", "second");

        let mut manager = AssetManager::new();
        manager.add_search_dir(search_dir(&first));
        manager.add_search_dir(search_dir(&second));

        assert_eq!(manager.read_resource_file("f.txt").as_deref(), Some("first"));
    }

    #[test]
    fn total_miss_is_none() {
        let parent = Rc::new(AssetManager::new());
        let child = AssetManager::with_parent(parent);
        assert!(child.read_resource_file("nowhere.txt").is_none());
    }

    #[test]
    fn free_is_a_noop_for_absent_entries() {
        let manager = AssetManager::new();
        manager.free_texture("never-loaded.png");
        manager.free_sound("never-loaded.ogg");
    }

    #[test]
    fn load_raw_image_uses_the_bare_path_only() {
        let dir = TempDir::new().expect("temp dir");
        let png_path = dir.path().join("raw.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([5, 6, 7, 255]))
            .save(&png_path)
            .expect("write png");

        // a search dir must not influence raw loading
        let mut manager = AssetManager::new();
        manager.add_search_dir(search_dir(&dir));

        let loaded = manager
            .load_raw_image(&png_path.display().to_string())
            .expect("raw image");
        assert_eq!((loaded.width, loaded.height), (3, 2));
        assert_eq!(&loaded.bytes[0..4], &[5, 6, 7, 255]);

        assert!(manager.load_raw_image("raw.png").is_none());
    }

    #[test]
    fn decode_image_bytes_rejects_non_images() {
        assert!(decode_image_bytes(b"definitely not a png").is_err());
    }

    #[test]
    fn decode_image_bytes_rejects_dimensions_past_u16() {
        let img = image::RgbaImage::from_pixel(65_536, 1, image::Rgba([0, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("png encode");

        assert!(matches!(
            decode_image_bytes(&out.into_inner()),
            Err(ImageDecodeError::TooLarge(65_536, 1))
        ));
    }

    #[test]
    fn cached_entry_never_touches_the_loader_or_the_filesystem() {
        // the identifier also exists on disk, so a cache miss would hit it
        let dir = dir_with_file("v.txt", "from disk");
        let mut manager = AssetManager::new();
        manager.add_search_dir(search_dir(&dir));

        let cache = RefCell::new(HashMap::from([(
            "v.txt".to_string(),
            "from cache".to_string(),
        )]));
        let hit = manager.cached_lookup(&cache, "v.txt", |_| -> Option<String> {
            panic!("loader must not run for a cached identifier")
        });
        assert_eq!(hit.as_deref(), Some("from cache"));
    }

    #[test]
    fn ancestor_cache_wins_over_child_search_dirs() {
        let child_dir = dir_with_file("v.txt", "from child dir");

        let parent = Rc::new(AssetManager::new());
        let mut child = AssetManager::with_parent(parent.clone());
        child.add_search_dir(search_dir(&child_dir));

        let parent_cache = RefCell::new(HashMap::from([(
            "v.txt".to_string(),
            "from ancestor cache".to_string(),
        )]));
        let child_cache: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());

        let hit = child.resolve(|manager| {
            let cache = if std::ptr::eq(manager, parent.as_ref()) {
                &parent_cache
            } else {
                &child_cache
            };
            manager.cached_lookup(cache, "v.txt", |path| fs::read_to_string(path).ok())
        });

        // the ancestor's cache answers before the child's dir is probed
        assert_eq!(hit.as_deref(), Some("from ancestor cache"));
        assert!(child_cache.borrow().is_empty());
    }

    #[test]
    fn loaded_entry_is_cached_for_reuse() {
        let dir = dir_with_file("v.txt", "from disk");
        let mut manager = AssetManager::new();
        manager.add_search_dir(search_dir(&dir));

        let cache: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
        let calls = std::cell::Cell::new(0);
        let load = |path: &Path| {
            calls.set(calls.get() + 1);
            fs::read_to_string(path).ok()
        };

        assert_eq!(
            manager.cached_lookup(&cache, "v.txt", &load).as_deref(),
            Some("from disk")
        );
        assert_eq!(
            manager.cached_lookup(&cache, "v.txt", &load).as_deref(),
            Some("from disk")
        );
        assert_eq!(calls.get(), 1);
    }
}
