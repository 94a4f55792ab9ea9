use std::fmt;

/// Pixel layouts understood by the native backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    #[default]
    Unknown,
    Rgb24,
    Rgba32,
    Argb8888,
    Rgba8888,
    Bgra8888,
    Index8,
}

impl PixelFormat {
    /// Number of bytes used by a single pixel, zero when unknown.
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            Self::Unknown => 0,
            Self::Index8 => 1,
            Self::Rgb24 => 3,
            Self::Rgba32 | Self::Argb8888 | Self::Rgba8888 | Self::Bgra8888 => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Rgb24 => "rgb24",
            Self::Rgba32 => "rgba32",
            Self::Argb8888 => "argb8888",
            Self::Rgba8888 => "rgba8888",
            Self::Bgra8888 => "bgra8888",
            Self::Index8 => "index8",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a texture's pixels may be accessed after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureAccess {
    /// Changes rarely, not lockable.
    #[default]
    Static,
    /// Changes frequently, lockable.
    Streaming,
    /// Can be used as a render target.
    Target,
}

/// Blend modes applied when a texture or surface is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendMode {
    #[default]
    None,
    Blend,
    Add,
    Mod,
    Mul,
}

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 0xFF,
        }
    }

    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Returns a copy of the colour with a different alpha component.
    pub const fn with_alpha(self, alpha: u8) -> Self {
        Self { alpha, ..self }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Width and height of a resource, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Area {
    pub width: u32,
    pub height: u32,
}

impl Area {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
