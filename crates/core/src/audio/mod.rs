//! Sound effects and music.
//!
//! Both kinds share [`AudioApi`]. Volumes live in `0..=MAX_VOLUME` and loop
//! counts below [`LOOP_FOREVER`] are clamped to it, so out of range arguments
//! never reach the backend.

use std::{path::Path, sync::Arc, time::Duration};

use crate::{
    native::{AllocationRequest, NativeAllocator},
    resource::{kind, mutate, query, AudioKind, Handle, Kind, Owned, Resource},
    Result,
};

/// Largest accepted volume.
pub const MAX_VOLUME: u8 = 128;

/// Loop count that repeats playback until it is stopped.
pub const LOOP_FOREVER: i32 = -1;

pub type SoundEffect = Owned<kind::SoundEffect>;
pub type SoundEffectHandle<'a> = Handle<'a, kind::SoundEffect>;

pub type Music = Owned<kind::Music>;
pub type MusicHandle<'a> = Handle<'a, kind::Music>;

macro_rules! audio_constructors {
    ($($alias:ident),*) => {
        $(
            impl $alias {
                /// Decodes an audio file.
                pub fn load(native: Arc<dyn NativeAllocator>, path: impl AsRef<Path>) -> Result<Self> {
                    Self::allocate(native, AllocationRequest::File(path.as_ref()))
                }

                /// Decodes an audio file held in memory.
                pub fn from_memory(native: Arc<dyn NativeAllocator>, bytes: &[u8]) -> Result<Self> {
                    Self::allocate(native, AllocationRequest::Memory(bytes))
                }
            }
        )*
    };
}

audio_constructors!(SoundEffect, Music);

pub trait AudioApi: Resource
where
    Self::Kind: AudioKind,
{
    /// Zero when the backend cannot answer.
    fn volume(&self) -> u8 {
        query(self, |native, raw| native.query_volume(raw)).unwrap_or(0)
    }

    /// Sets the volume, clamped to [`MAX_VOLUME`].
    fn set_volume(&self, volume: u8) -> bool {
        let volume = volume.min(MAX_VOLUME);
        mutate(self, |native, raw| native.set_volume(raw, volume))
    }

    /// Starts playback, repeating `loops` more times, or forever for
    /// [`LOOP_FOREVER`].
    fn play(&self, loops: i32) -> bool {
        let loops = loops.max(LOOP_FOREVER);
        let kind = <Self::Kind as Kind>::TYPE;
        tracing::trace!(%kind, raw = %self.raw(), loops, "play");
        mutate(self, |native, raw| native.play(raw, loops))
    }

    fn stop(&self) -> bool {
        mutate(self, |native, raw| native.stop(raw))
    }

    /// Starts playback with a fade in. Has no effect for a zero duration or
    /// while already playing.
    fn fade_in(&self, duration: Duration) -> bool {
        if duration.is_zero() || self.is_playing() {
            return false;
        }
        mutate(self, |native, raw| native.fade_in(raw, duration))
    }

    /// Fades playback out. Has no effect for a zero duration or when nothing
    /// is playing.
    fn fade_out(&self, duration: Duration) -> bool {
        if duration.is_zero() || !self.is_playing() {
            return false;
        }
        mutate(self, |native, raw| native.fade_out(raw, duration))
    }

    fn is_playing(&self) -> bool {
        query(self, |native, raw| Some(native.is_playing(raw))).unwrap_or(false)
    }

    /// A fading resource is also playing.
    fn is_fading(&self) -> bool {
        query(self, |native, raw| Some(native.is_fading(raw))).unwrap_or(false)
    }
}

impl<R> AudioApi for R
where
    R: Resource,
    R::Kind: AudioKind,
{
}
