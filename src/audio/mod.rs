//! Sound sequencing: a queue of tracks and silences with fade support.
//!
//! One queue drives scene music. Entries play in order; silences gate on
//! a wall-clock countdown and fades ramp the active track's volume every
//! update. The audio backend exposes no is-playing query, so a track
//! entry holds the queue until it is skipped (or faded out) explicitly.

#![allow(dead_code)]

use std::collections::VecDeque;

use macroquad::audio::{play_sound, set_sound_volume, stop_sound, PlaySoundParams, Sound};

use crate::engine::timer::Countdown;

enum QueueEntry {
    Silence {
        millis: u64,
    },
    Track {
        sound: Sound,
        looping: bool,
        fade_in_millis: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueueState {
    Empty,
    Silence,
    Playing,
    FadingIn,
    FadingOut,
}

/// A linear volume ramp over a fixed span.
struct Fade {
    countdown: Countdown,
    from: f32,
    to: f32,
}

impl Fade {
    fn new(millis: u64, from: f32, to: f32) -> Self {
        Self {
            countdown: Countdown::from_millis(millis),
            from,
            to,
        }
    }

    fn volume(&self) -> f32 {
        self.from + (self.to - self.from) * self.countdown.progress()
    }

    fn done(&self) -> bool {
        self.countdown.expired()
    }
}

pub struct SoundQueue {
    entries: VecDeque<QueueEntry>,
    state: QueueState,
    current: Option<Sound>,
    volume: f32,
    silence: Option<Countdown>,
    fade: Option<Fade>,
}

impl SoundQueue {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
            state: QueueState::Empty,
            current: None,
            volume: 1.0,
            silence: None,
            fade: None,
        }
    }

    pub fn queue_silence(&mut self, millis: u64) {
        self.entries.push_back(QueueEntry::Silence { millis });
    }

    pub fn queue(&mut self, sound: Sound) {
        self.entries.push_back(QueueEntry::Track {
            sound,
            looping: false,
            fade_in_millis: None,
        });
    }

    pub fn queue_fade_in(&mut self, sound: Sound, fade_in_millis: u64) {
        self.entries.push_back(QueueEntry::Track {
            sound,
            looping: false,
            fade_in_millis: Some(fade_in_millis),
        });
    }

    pub fn queue_looping(&mut self, sound: Sound) {
        self.entries.push_back(QueueEntry::Track {
            sound,
            looping: true,
            fade_in_millis: None,
        });
    }

    pub fn queue_looping_fade_in(&mut self, sound: Sound, fade_in_millis: u64) {
        self.entries.push_back(QueueEntry::Track {
            sound,
            looping: true,
            fade_in_millis: Some(fade_in_millis),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.state == QueueState::Empty && self.entries.is_empty()
    }

    /// Stops the active entry and discards everything queued.
    pub fn clear(&mut self) {
        if let Some(sound) = self.current.take() {
            stop_sound(&sound);
        }
        self.entries.clear();
        self.state = QueueState::Empty;
        self.silence = None;
        self.fade = None;
    }

    /// Drops the active entry immediately and starts the next one.
    pub fn skip_to_next(&mut self) {
        if let Some(sound) = self.current.take() {
            stop_sound(&sound);
        }
        self.silence = None;
        self.fade = None;
        self.begin_next();
    }

    /// Ramps the active track to zero over `fade_out_millis`, then
    /// advances. Entries that are not playing are skipped immediately.
    pub fn fade_out_and_skip_to_next(&mut self, fade_out_millis: u64) {
        match self.state {
            QueueState::Playing | QueueState::FadingIn => {
                self.fade = Some(Fade::new(fade_out_millis, self.volume, 0.0));
                self.state = QueueState::FadingOut;
            }
            _ => self.skip_to_next(),
        }
    }

    /// Drives the queue; call once per tick.
    pub fn update(&mut self) {
        match self.state {
            QueueState::Empty => {
                if !self.entries.is_empty() {
                    self.begin_next();
                }
            }
            QueueState::Silence => {
                if self.silence.as_ref().map_or(true, Countdown::expired) {
                    self.silence = None;
                    self.begin_next();
                }
            }
            // holds until skipped; the backend cannot report completion
            QueueState::Playing => {}
            QueueState::FadingIn => {
                let Some(fade) = &self.fade else {
                    self.state = QueueState::Playing;
                    return;
                };
                self.volume = fade.volume();
                let finished = fade.done();
                if let Some(sound) = &self.current {
                    set_sound_volume(sound, self.volume);
                }
                if finished {
                    self.fade = None;
                    self.state = QueueState::Playing;
                }
            }
            QueueState::FadingOut => {
                let Some(fade) = &self.fade else {
                    self.skip_to_next();
                    return;
                };
                self.volume = fade.volume();
                let finished = fade.done();
                if let Some(sound) = &self.current {
                    set_sound_volume(sound, self.volume);
                }
                if finished {
                    self.fade = None;
                    self.skip_to_next();
                }
            }
        }
    }

    fn begin_next(&mut self) {
        match self.entries.pop_front() {
            None => self.state = QueueState::Empty,
            Some(QueueEntry::Silence { millis }) => {
                self.silence = Some(Countdown::from_millis(millis));
                self.state = QueueState::Silence;
            }
            Some(QueueEntry::Track {
                sound,
                looping,
                fade_in_millis,
            }) => {
                self.volume = if fade_in_millis.is_some() { 0.0 } else { 1.0 };
                play_sound(&sound, track_params(looping, self.volume));
                self.current = Some(sound);
                match fade_in_millis {
                    Some(millis) => {
                        self.fade = Some(Fade::new(millis, 0.0, 1.0));
                        self.state = QueueState::FadingIn;
                    }
                    None => self.state = QueueState::Playing,
                }
            }
        }
    }
}

/// Maps a queue entry's playback settings onto the backend's parameter
/// struct. The backend names the loop flag `looped`.
fn track_params(looped: bool, volume: f32) -> PlaySoundParams {
    PlaySoundParams { looped, volume }
}

impl Default for SoundQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    // only silence entries here: tracks would hit the audio device
    use super::*;

    #[test]
    fn track_settings_reach_the_backend_params() {
        let params = track_params(true, 0.25);
        assert!(params.looped);
        assert_eq!(params.volume, 0.25);

        let params = track_params(false, 1.0);
        assert!(!params.looped);
    }

    #[test]
    fn starts_empty() {
        let queue = SoundQueue::new();
        assert!(queue.is_empty());
        assert_eq!(queue.state, QueueState::Empty);
    }

    #[test]
    fn silence_entry_plays_out_and_empties_the_queue() {
        let mut queue = SoundQueue::new();
        queue.queue_silence(0);
        assert!(!queue.is_empty());

        queue.update();
        assert_eq!(queue.state, QueueState::Silence);

        // zero-length countdown is already expired
        queue.update();
        assert_eq!(queue.state, QueueState::Empty);
        assert!(queue.is_empty());
    }

    #[test]
    fn silences_advance_in_order() {
        let mut queue = SoundQueue::new();
        queue.queue_silence(0);
        queue.queue_silence(0);

        queue.update(); // begins first silence
        queue.update(); // first expires, begins second
        assert_eq!(queue.state, QueueState::Silence);
        queue.update();
        assert!(queue.is_empty());
    }

    #[test]
    fn skip_to_next_drops_the_active_silence() {
        let mut queue = SoundQueue::new();
        queue.queue_silence(60_000);
        queue.update();
        assert_eq!(queue.state, QueueState::Silence);

        queue.skip_to_next();
        assert!(queue.is_empty());
    }

    #[test]
    fn fade_out_of_a_silence_skips_immediately() {
        let mut queue = SoundQueue::new();
        queue.queue_silence(60_000);
        queue.update();

        queue.fade_out_and_skip_to_next(500);
        assert_eq!(queue.state, QueueState::Empty);
    }

    #[test]
    fn clear_discards_everything() {
        let mut queue = SoundQueue::new();
        queue.queue_silence(60_000);
        queue.queue_silence(60_000);
        queue.update();

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.state, QueueState::Empty);
    }
}
