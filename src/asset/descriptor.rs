//! The animation descriptor dialect.
//!
//! Descriptors are small text resources with one `key->value` entry per
//! line:
//!
//! ```text
//! typ->looping
//! fps->8
//! frames->0,1,2,1
//! 0->data:image/png;base64,iVBORw0KGgo...
//! 1->iVBORw0KGgo...
//! ```
//!
//! Purely numeric keys name frame-image slots (0-based, contiguous, at
//! most [`ANIMATION_MAX_FRAMES`]); `typ`/`type` selects the playback
//! variant; `fps` the tick rate; `frames` the playback layout.

use std::fmt;

use log::warn;

use super::animation::{AnimationType, ANIMATION_MAX_FRAMES};
use super::parse::{
    decode_base64, is_positive_int, parse_dictionary, parse_positive_int_list, TrailingSegment,
};

const ENTRY_DELIMITER: &str = "\n";
const KEY_VALUE_DELIMITER: &str = "->";

/// Playback rate when the descriptor has no `fps` entry.
const DEFAULT_FPS: u32 = 10;

#[derive(Debug)]
pub enum DescriptorError {
    /// `typ`/`type` entry missing or not a known variant. Hard failure.
    UnknownType(String),
    /// No frame slots at all.
    NoFrames,
    /// A frame slot index at or past [`ANIMATION_MAX_FRAMES`].
    FrameSlotOutOfRange(usize),
    /// Frame slots are not contiguous from zero.
    MissingFrameSlot(usize),
    /// A `frames` layout entry points past the last frame slot.
    LayoutIndexOutOfRange(u32),
    /// A frame value was not decodable base64.
    Base64(usize, base64::DecodeError),
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::UnknownType(ty) => write!(f, "unknown animation type {:?}", ty),
            DescriptorError::NoFrames => write!(f, "descriptor has no frame slots"),
            DescriptorError::FrameSlotOutOfRange(index) => write!(
                f,
                "frame slot {} exceeds the maximum of {}",
                index, ANIMATION_MAX_FRAMES
            ),
            DescriptorError::MissingFrameSlot(index) => {
                write!(f, "frame slots are not contiguous: slot {} is missing", index)
            }
            DescriptorError::LayoutIndexOutOfRange(index) => {
                write!(f, "frames entry {} points past the last frame slot", index)
            }
            DescriptorError::Base64(index, e) => {
                write!(f, "frame slot {} is not valid base64: {}", index, e)
            }
        }
    }
}

impl std::error::Error for DescriptorError {}

/// A parsed descriptor: decoded (still PNG-encoded) frame bytes in slot
/// order, plus playback parameters.
#[derive(Debug)]
pub struct AnimationDescriptor {
    pub frames: Vec<Vec<u8>>,
    pub animation_type: AnimationType,
    pub fps: u32,
    pub layout: Vec<u32>,
}

pub fn parse_animation_descriptor(text: &str) -> Result<AnimationDescriptor, DescriptorError> {
    let dict = parse_dictionary(text, ENTRY_DELIMITER, KEY_VALUE_DELIMITER);

    let animation_type = match dict
        .get("typ")
        .or_else(|| dict.get("type"))
        .map(String::as_str)
    {
        Some("looping") => AnimationType::Looping,
        Some("back/forth") => AnimationType::BackAndForth,
        other => return Err(DescriptorError::UnknownType(other.unwrap_or("").to_string())),
    };

    let fps = match dict.get("fps") {
        None => DEFAULT_FPS,
        Some(v) => match v.parse::<u32>() {
            Ok(fps) if is_positive_int(v) => fps,
            _ => {
                warn!("ignoring non-numeric fps entry {:?}", v);
                DEFAULT_FPS
            }
        },
    };

    // numeric keys are frame slots; everything else was consumed above
    let mut slots: Vec<(usize, &str)> = Vec::new();
    for (key, value) in &dict {
        if key.is_empty() || !is_positive_int(key) {
            continue;
        }
        let Ok(index) = key.parse::<usize>() else {
            warn!("ignoring out-of-range frame slot key {:?}", key);
            continue;
        };
        if index >= ANIMATION_MAX_FRAMES {
            return Err(DescriptorError::FrameSlotOutOfRange(index));
        }
        slots.push((index, value.as_str()));
    }
    if slots.is_empty() {
        return Err(DescriptorError::NoFrames);
    }
    slots.sort_by_key(|&(index, _)| index);

    let mut frames = Vec::with_capacity(slots.len());
    for (expected, (index, value)) in slots.iter().enumerate() {
        if *index != expected {
            return Err(DescriptorError::MissingFrameSlot(expected));
        }
        let bytes = decode_base64(value).map_err(|e| DescriptorError::Base64(*index, e))?;
        frames.push(bytes);
    }

    let layout = match dict.get("frames") {
        Some(list) => {
            let layout = parse_positive_int_list(list, ",", TrailingSegment::Parse);
            if layout.is_empty() {
                warn!("frames entry {:?} parsed empty, using natural order", list);
                natural_order(frames.len())
            } else {
                layout
            }
        }
        None => natural_order(frames.len()),
    };

    if let Some(&bad) = layout.iter().find(|&&i| i as usize >= frames.len()) {
        return Err(DescriptorError::LayoutIndexOutOfRange(bad));
    }

    Ok(AnimationDescriptor {
        frames,
        animation_type,
        fps,
        layout,
    })
}

fn natural_order(frame_count: usize) -> Vec<u32> {
    (0..frame_count as u32).collect()
}
