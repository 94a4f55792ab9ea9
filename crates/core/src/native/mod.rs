//! Contracts the wrapped multimedia library has to fulfil.
//!
//! Nothing in this crate talks to a concrete library directly. Owning handles
//! hold an `Arc<dyn NativeAllocator>` and the hint registry holds an
//! `Arc<dyn ConfigStore>`, so a real binding and the in-process
//! [`software`](crate::software) collaborators are interchangeable.

use std::{fmt, path::Path, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};

use crate::video::{Area, BlendMode, Color, PixelFormat, TextureAccess};

/// Opaque pointer to a resource living inside the native library. The zero
/// value is the null pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct RawHandle(u64);

impl RawHandle {
    pub const NULL: Self = Self(0);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Kinds of native resources. Each kind has its own release routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    Texture,
    Surface,
    Font,
    SoundEffect,
    Music,
    Window,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Texture => "texture",
            Self::Surface => "surface",
            Self::Font => "font",
            Self::SoundEffect => "sound effect",
            Self::Music => "music",
            Self::Window => "window",
        })
    }
}

/// Arguments identifying a resource that should be allocated.
#[derive(Debug, Clone, Copy)]
pub enum AllocationRequest<'a> {
    /// Decode the file at the given path.
    File(&'a Path),
    /// Decode an in-memory buffer.
    Memory(&'a [u8]),
    /// Create an empty pixel resource.
    Blank {
        size: Area,
        format: PixelFormat,
        access: TextureAccess,
    },
    /// Upload the pixels of an existing surface.
    FromSurface(RawHandle),
    /// Copy an existing pixel resource into another pixel format.
    Convert {
        source: RawHandle,
        format: PixelFormat,
    },
    /// Create an identical copy of an existing resource.
    Duplicate(RawHandle),
    /// Open a font file at a point size.
    Font { path: &'a Path, point_size: u32 },
    /// Open a window.
    Window { title: &'a str, size: Area },
}

impl AllocationRequest<'_> {
    /// Human readable identification of the request, used in error messages.
    pub fn origin(&self) -> String {
        match self {
            Self::File(path) => format!("file `{}`", path.display()),
            Self::Memory(bytes) => format!("{} byte buffer", bytes.len()),
            Self::Blank { size, format, .. } => format!("blank {size} {format} image"),
            Self::FromSurface(raw) => format!("surface {raw}"),
            Self::Convert { source, format } => format!("{source} converted to {format}"),
            Self::Duplicate(raw) => format!("copy of {raw}"),
            Self::Font { path, point_size } => {
                format!("font `{}` at {point_size}pt", path.display())
            }
            Self::Window { title, size } => format!("window `{title}` ({size})"),
        }
    }
}

/// Optional backend features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Textures created with [`TextureAccess::Target`].
    RenderTargets,
}

/// The native allocator: creates, releases, queries and mutates resources.
///
/// Queries return `None` when the library cannot answer; callers translate
/// that into a default. Mutators report whether the library accepted the
/// change. Only `allocate` and `release` are mandatory so that narrow test
/// doubles stay small.
pub trait NativeAllocator: Send + Sync {
    /// Allocates a resource, or returns the library's diagnostic text.
    fn allocate(
        &self,
        kind: ResourceType,
        request: &AllocationRequest<'_>,
    ) -> std::result::Result<RawHandle, String>;

    /// Releases a resource previously returned by [`allocate`](Self::allocate).
    /// Called at most once per successful allocation.
    fn release(&self, kind: ResourceType, raw: RawHandle);

    fn supports(&self, _capability: Capability) -> bool {
        true
    }

    fn query_dimensions(&self, _raw: RawHandle) -> Option<Area> {
        None
    }

    fn query_format(&self, _raw: RawHandle) -> Option<PixelFormat> {
        None
    }

    fn query_access_mode(&self, _raw: RawHandle) -> Option<TextureAccess> {
        None
    }

    fn query_alpha(&self, _raw: RawHandle) -> Option<u8> {
        None
    }

    fn query_blend_mode(&self, _raw: RawHandle) -> Option<BlendMode> {
        None
    }

    fn query_color_modulation(&self, _raw: RawHandle) -> Option<Color> {
        None
    }

    fn set_alpha(&self, _raw: RawHandle, _alpha: u8) -> bool {
        false
    }

    fn set_blend_mode(&self, _raw: RawHandle, _mode: BlendMode) -> bool {
        false
    }

    fn set_color_modulation(&self, _raw: RawHandle, _color: Color) -> bool {
        false
    }

    fn query_point_size(&self, _raw: RawHandle) -> Option<u32> {
        None
    }

    fn query_volume(&self, _raw: RawHandle) -> Option<u8> {
        None
    }

    fn set_volume(&self, _raw: RawHandle, _volume: u8) -> bool {
        false
    }

    /// Starts playback, `loops` is already clamped to `-1` (forever) or more.
    fn play(&self, _raw: RawHandle, _loops: i32) -> bool {
        false
    }

    fn stop(&self, _raw: RawHandle) -> bool {
        false
    }

    /// Starts playback with a fade in. Only called for a positive duration
    /// on a resource that is not playing.
    fn fade_in(&self, _raw: RawHandle, _duration: Duration) -> bool {
        false
    }

    /// Fades playback out. Only called for a positive duration on a resource
    /// that is playing.
    fn fade_out(&self, _raw: RawHandle, _duration: Duration) -> bool {
        false
    }

    fn is_playing(&self, _raw: RawHandle) -> bool {
        false
    }

    fn is_fading(&self, _raw: RawHandle) -> bool {
        false
    }

    fn query_title(&self, _raw: RawHandle) -> Option<String> {
        None
    }

    fn set_title(&self, _raw: RawHandle, _title: &str) -> bool {
        false
    }

    fn set_dimensions(&self, _raw: RawHandle, _size: Area) -> bool {
        false
    }
}

/// Precedence of a hint write. A write loses against an existing value of
/// strictly higher priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Default,
    Normal,
    Override,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Normal => "normal",
            Self::Override => "override",
        })
    }
}

/// Identifies a registered change listener inside a [`ConfigStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerToken(u64);

impl ListenerToken {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Listener invoked with `(name, old, new)` whenever a hint value changes.
pub type ChangeListener = Arc<dyn Fn(&str, Option<&str>, Option<&str>) + Send + Sync>;

/// The native configuration store: an untyped string key/value map.
pub trait ConfigStore: Send + Sync {
    fn get_raw(&self, name: &str) -> Option<String>;

    /// Returns `false` when a value of higher priority prevented the write.
    fn set_raw(&self, name: &str, value: &str, priority: Priority) -> bool;

    fn register_change_listener(&self, name: &str, listener: ChangeListener) -> ListenerToken;

    fn unregister_change_listener(&self, token: ListenerToken);

    /// Resets a hint to unset. Clearing an unset hint is a no-op.
    fn clear(&self, name: &str);
}
