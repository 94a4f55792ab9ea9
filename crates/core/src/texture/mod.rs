//! Renderer-side images.
//!
//! A texture is usually created from a [`Surface`]: [`Texture::load`] decodes
//! the file into a temporary surface, uploads it, and lets the surface go
//! again. The surface is released on every path, including when the upload
//! fails.

use std::{path::Path, sync::Arc};

use crate::{
    native::{AllocationRequest, Capability, NativeAllocator},
    resource::{kind, query, Handle, Owned, Resource},
    surface::Surface,
    video::{Area, PixelFormat, TextureAccess},
    MediaError, Result,
};

pub type Texture = Owned<kind::Texture>;
pub type TextureHandle<'a> = Handle<'a, kind::Texture>;

impl Texture {
    /// Loads an image file into a new texture.
    pub fn load(native: Arc<dyn NativeAllocator>, path: impl AsRef<Path>) -> Result<Self> {
        let surface = Surface::load(native, path)?;
        Self::from_surface(&surface)
    }

    /// Decodes an encoded image held in memory.
    pub fn from_memory(native: Arc<dyn NativeAllocator>, bytes: &[u8]) -> Result<Self> {
        let surface = Surface::from_memory(native, bytes)?;
        Self::from_surface(&surface)
    }

    /// Uploads the pixels of `surface` through the surface's allocator.
    pub fn from_surface(surface: &Surface) -> Result<Self> {
        Self::allocate(
            Arc::clone(surface.allocator()),
            AllocationRequest::FromSurface(surface.raw()),
        )
    }

    /// Creates an uninitialized texture.
    ///
    /// Fails with [`MediaError::UnsupportedOperation`] when a render target is
    /// requested from a backend without render target support.
    pub fn blank(
        native: Arc<dyn NativeAllocator>,
        size: Area,
        format: PixelFormat,
        access: TextureAccess,
    ) -> Result<Self> {
        if access == TextureAccess::Target && !native.supports(Capability::RenderTargets) {
            return Err(MediaError::UnsupportedOperation(
                "the backend does not support render target textures".to_string(),
            ));
        }

        Self::allocate(native, AllocationRequest::Blank { size, format, access })
    }
}

/// Queries specific to textures, shared by [`Texture`] and [`TextureHandle`].
pub trait TextureApi: Resource<Kind = kind::Texture> {
    fn access(&self) -> TextureAccess {
        query(self, |native, raw| native.query_access_mode(raw)).unwrap_or_default()
    }

    fn is_static(&self) -> bool {
        self.access() == TextureAccess::Static
    }

    fn is_streaming(&self) -> bool {
        self.access() == TextureAccess::Streaming
    }

    fn is_target(&self) -> bool {
        self.access() == TextureAccess::Target
    }
}

impl<R> TextureApi for R where R: Resource<Kind = kind::Texture> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        native::{RawHandle, ResourceType},
        resource::{Dimensions, Pixels},
        software::SoftwareBackend,
    };

    fn write_png(dir: &tempfile::TempDir, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.path().join("sprite.png");
        image::RgbaImage::new(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn load_releases_the_intermediate_surface() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, 6, 2);
        let backend = Arc::new(SoftwareBackend::new());

        let texture = Texture::load(backend.clone(), &path).unwrap();
        assert_eq!(texture.size(), Area::new(6, 2));
        assert_eq!(texture.format(), PixelFormat::Rgba32);
        assert!(texture.is_static());
        assert_eq!(backend.outstanding_of(ResourceType::Surface), 0);
        assert_eq!(backend.outstanding_of(ResourceType::Texture), 1);
    }

    #[test]
    fn failed_upload_leaks_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, 2, 2);
        let backend = Arc::new(SoftwareBackend::new());
        backend.fail_allocations(ResourceType::Texture, "no renderer");

        let err = Texture::load(backend.clone(), &path).unwrap_err();
        assert!(err.to_string().contains("no renderer"));
        assert_eq!(backend.outstanding(), 0);
    }

    #[test]
    fn unreadable_path_names_the_file() {
        let backend = Arc::new(SoftwareBackend::new());
        let err = Texture::load(backend.clone(), "missing/sprite.png").unwrap_err();

        match err {
            MediaError::AllocationFailed {
                kind,
                origin,
                diagnostic,
            } => {
                assert_eq!(kind, ResourceType::Surface);
                assert!(origin.contains("missing/sprite.png"));
                assert!(!diagnostic.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(backend.outstanding(), 0);
    }

    #[test]
    fn blank_textures_keep_their_access_mode() {
        let backend = Arc::new(SoftwareBackend::new());
        let texture = Texture::blank(
            backend.clone(),
            Area::new(32, 32),
            PixelFormat::Argb8888,
            TextureAccess::Streaming,
        )
        .unwrap();

        let view: TextureHandle<'_> = texture.handle();
        assert!(view.is_streaming());
        assert!(!view.is_target());
        assert_eq!(view.format(), PixelFormat::Argb8888);
    }

    #[test]
    fn render_targets_need_backend_support() {
        let backend = Arc::new(SoftwareBackend::new().with_render_targets(false));
        let err = Texture::blank(
            backend.clone(),
            Area::new(8, 8),
            PixelFormat::Rgba8888,
            TextureAccess::Target,
        )
        .unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedOperation(_)));
        assert_eq!(backend.outstanding(), 0);

        let backend = Arc::new(SoftwareBackend::new());
        let target = Texture::blank(
            backend,
            Area::new(8, 8),
            PixelFormat::Rgba8888,
            TextureAccess::Target,
        )
        .unwrap();
        assert!(target.is_target());
    }

    #[test]
    fn from_surface_copies_layout() {
        let backend = Arc::new(SoftwareBackend::new());
        let surface = Surface::blank(backend.clone(), Area::new(3, 7), PixelFormat::Bgra8888).unwrap();
        let texture = Texture::from_surface(&surface).unwrap();
        drop(surface);

        assert_eq!(texture.size(), Area::new(3, 7));
        assert_eq!(texture.format(), PixelFormat::Bgra8888);
    }

    #[test]
    fn null_handle_defaults_to_static() {
        let backend = SoftwareBackend::new();
        let handle = TextureHandle::from_raw(&backend, RawHandle::NULL);
        assert_eq!(handle.access(), TextureAccess::Static);
        assert_eq!(handle.width(), 0);
    }
}
