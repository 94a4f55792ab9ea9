//! Ownership-safe handles and typed hints over a native multimedia library.
//!
//! The library itself is reached only through two collaborator traits in
//! [`native`]: a [`NativeAllocator`] that creates and releases resources and a
//! [`ConfigStore`] holding string-valued hints. On top of them the crate
//! provides owning and observing handles for every resource kind and a
//! compile-time checked hint registry. The [`software`] module implements
//! both collaborators in process.

pub mod audio;
pub mod config;
pub mod error;
pub mod font;
pub mod hints;
pub mod native;
pub mod resource;
pub mod software;
pub mod surface;
pub mod texture;
pub mod video;
pub mod window;

pub use audio::{Music, MusicHandle, SoundEffect, SoundEffectHandle, LOOP_FOREVER, MAX_VOLUME};
pub use config::{AppConfig, BackendConfig, HintSetting};
pub use error::{MediaError, Result};
pub use font::{Font, FontHandle};
pub use hints::{Hint, HintChange, HintValue, Hints, Subscription};
pub use native::{
    AllocationRequest, Capability, ConfigStore, NativeAllocator, Priority, RawHandle, ResourceType,
};
pub use resource::{Handle, Owned};
pub use surface::{Surface, SurfaceHandle};
pub use texture::{Texture, TextureHandle};
pub use video::{Area, BlendMode, Color, PixelFormat, TextureAccess};
pub use window::{Window, WindowHandle};

/// Every capability trait, for glob import.
pub mod prelude {
    pub use crate::{
        audio::AudioApi,
        font::FontApi,
        resource::{Dimensions, Modulate, Pixels, Resource},
        texture::TextureApi,
        window::WindowApi,
    };
}
