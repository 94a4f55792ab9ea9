//! Software pixel buffers.

use std::{path::Path, sync::Arc};

use crate::{
    native::{AllocationRequest, NativeAllocator},
    resource::{kind, Handle, Owned, Resource},
    video::{Area, PixelFormat, TextureAccess},
    Result,
};

pub type Surface = Owned<kind::Surface>;
pub type SurfaceHandle<'a> = Handle<'a, kind::Surface>;

impl Surface {
    /// Decodes an image file.
    pub fn load(native: Arc<dyn NativeAllocator>, path: impl AsRef<Path>) -> Result<Self> {
        Self::allocate(native, AllocationRequest::File(path.as_ref()))
    }

    /// Decodes an encoded image held in memory.
    pub fn from_memory(native: Arc<dyn NativeAllocator>, bytes: &[u8]) -> Result<Self> {
        Self::allocate(native, AllocationRequest::Memory(bytes))
    }

    pub fn blank(native: Arc<dyn NativeAllocator>, size: Area, format: PixelFormat) -> Result<Self> {
        Self::allocate(
            native,
            AllocationRequest::Blank {
                size,
                format,
                access: TextureAccess::Static,
            },
        )
    }

    /// Copies the surface into a new one with another pixel format.
    pub fn convert_to(&self, format: PixelFormat) -> Result<Self> {
        Self::allocate(
            Arc::clone(self.allocator()),
            AllocationRequest::Convert {
                source: self.raw(),
                format,
            },
        )
    }

    /// Creates an independent copy owning its own pixels.
    pub fn duplicate(&self) -> Result<Self> {
        Self::allocate(Arc::clone(self.allocator()), AllocationRequest::Duplicate(self.raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        native::ResourceType,
        resource::{Dimensions, Modulate, Pixels},
        software::SoftwareBackend,
        MediaError,
    };

    #[test]
    fn blank_surfaces_report_their_layout() {
        let backend = Arc::new(SoftwareBackend::new());
        let surface = Surface::blank(backend.clone(), Area::new(16, 9), PixelFormat::Rgb24).unwrap();

        assert_eq!(surface.size(), Area::new(16, 9));
        assert_eq!(surface.format(), PixelFormat::Rgb24);
        assert_eq!(surface.handle().format(), PixelFormat::Rgb24);
    }

    #[test]
    fn blank_rejects_empty_dimensions() {
        let backend = Arc::new(SoftwareBackend::new());
        let err = Surface::blank(backend.clone(), Area::new(0, 4), PixelFormat::Rgb24).unwrap_err();

        assert!(matches!(
            err,
            MediaError::AllocationFailed {
                kind: ResourceType::Surface,
                ..
            }
        ));
        assert_eq!(backend.outstanding(), 0);
    }

    #[test]
    fn conversion_creates_a_second_surface() {
        let backend = Arc::new(SoftwareBackend::new());
        let surface = Surface::blank(backend.clone(), Area::new(4, 4), PixelFormat::Rgba32).unwrap();
        let converted = surface.convert_to(PixelFormat::Bgra8888).unwrap();

        assert_ne!(surface.raw(), converted.raw());
        assert_eq!(converted.format(), PixelFormat::Bgra8888);
        assert_eq!(converted.size(), surface.size());
        assert_eq!(backend.outstanding_of(ResourceType::Surface), 2);

        assert!(surface.convert_to(PixelFormat::Unknown).is_err());
        assert_eq!(backend.outstanding_of(ResourceType::Surface), 2);
    }

    #[test]
    fn duplicates_are_independent() {
        let backend = Arc::new(SoftwareBackend::new());
        let surface = Surface::blank(backend.clone(), Area::new(4, 4), PixelFormat::Rgba32).unwrap();
        surface.set_alpha(10);

        let copy = surface.duplicate().unwrap();
        copy.set_alpha(200);
        assert_eq!(surface.alpha(), 10);
        assert_eq!(copy.alpha(), 200);

        drop(surface);
        assert_eq!(copy.width(), 4);
    }

    #[test]
    fn decodes_png_from_memory() {
        let mut bytes = Vec::new();
        image::RgbaImage::new(5, 3)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let backend = Arc::new(SoftwareBackend::new());
        let surface = Surface::from_memory(backend.clone(), &bytes).unwrap();
        assert_eq!(surface.size(), Area::new(5, 3));

        let err = Surface::from_memory(backend, b"not an image").unwrap_err();
        assert!(err.to_string().contains("12 byte buffer"));
    }
}
