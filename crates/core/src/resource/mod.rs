//! Owning and observing handles over native resources.
//!
//! [`Owned<K>`] releases its resource exactly once when dropped, cannot be
//! cloned, and can only change hands by move. [`Handle<'a, K>`] aliases a
//! resource without ever releasing it and is `Copy`. Both implement
//! [`Resource`], and every query or mutator is written once against that
//! trait, so the two flavours expose the same API.
//!
//! Owning handles cannot be duplicated:
//!
//! ```compile_fail
//! use mediabind_core::Texture;
//!
//! fn duplicate(texture: &Texture) -> Texture {
//!     texture.clone()
//! }
//! ```

use std::{fmt, marker::PhantomData, sync::Arc};

use crate::{
    native::{AllocationRequest, NativeAllocator, RawHandle, ResourceType},
    video::{Area, BlendMode, Color, PixelFormat},
    MediaError, Result,
};

mod sealed {
    pub trait Sealed {}
}

/// Compile-time resource kind. Implemented only by the markers in [`kind`].
pub trait Kind: sealed::Sealed + 'static {
    const TYPE: ResourceType;
}

/// Kinds with pixel dimensions.
pub trait SizedKind: Kind {}

/// Kinds whose pixels can be alpha, colour and blend modulated.
pub trait PixelKind: SizedKind {}

/// Kinds that can be played back.
pub trait AudioKind: Kind {}

/// Uninhabited marker types, one per resource kind.
pub mod kind {
    use super::{sealed::Sealed, AudioKind, Kind, PixelKind, SizedKind};
    use crate::native::ResourceType;

    macro_rules! kinds {
        ($($name:ident),* $(,)?) => {
            $(
                #[derive(Debug)]
                pub enum $name {}

                impl Sealed for $name {}

                impl Kind for $name {
                    const TYPE: ResourceType = ResourceType::$name;
                }
            )*
        };
    }

    kinds!(Texture, Surface, Font, SoundEffect, Music, Window);

    impl SizedKind for Texture {}
    impl SizedKind for Surface {}
    impl SizedKind for Window {}

    impl PixelKind for Texture {}
    impl PixelKind for Surface {}

    impl AudioKind for SoundEffect {}
    impl AudioKind for Music {}
}

/// Owning handle. Releases the native resource when dropped.
pub struct Owned<K: Kind> {
    raw: RawHandle,
    native: Arc<dyn NativeAllocator>,
    _kind: PhantomData<K>,
}

impl<K: Kind> Owned<K> {
    /// Takes ownership of a pointer produced by an allocation routine.
    ///
    /// Fails with [`MediaError::InvalidResource`] for the null pointer, since
    /// that means the allocation already failed.
    ///
    /// The caller must own `raw` exclusively: it must not be held by another
    /// `Owned`, for example one whose pointer was read with
    /// [`Resource::raw`]. Pass pointers obtained from [`into_raw`](Self::into_raw)
    /// or from the allocator directly, otherwise the resource is released twice.
    pub fn from_raw(native: Arc<dyn NativeAllocator>, raw: RawHandle) -> Result<Self> {
        if raw.is_null() {
            return Err(MediaError::InvalidResource {
                kind: K::TYPE,
                reason: "cannot take ownership of a null pointer",
            });
        }

        Ok(Self::adopt(native, raw))
    }

    /// Asks the allocator for a fresh resource and owns the result.
    pub(crate) fn allocate(
        native: Arc<dyn NativeAllocator>,
        request: AllocationRequest<'_>,
    ) -> Result<Self> {
        match native.allocate(K::TYPE, &request) {
            Ok(raw) if !raw.is_null() => {
                tracing::debug!(kind = %K::TYPE, %raw, origin = %request.origin(), "allocated resource");
                Ok(Self::adopt(native, raw))
            }
            Ok(_) => Err(MediaError::AllocationFailed {
                kind: K::TYPE,
                origin: request.origin(),
                diagnostic: "allocator returned a null pointer".to_string(),
            }),
            Err(diagnostic) => {
                tracing::debug!(kind = %K::TYPE, origin = %request.origin(), %diagnostic, "allocation failed");
                Err(MediaError::AllocationFailed {
                    kind: K::TYPE,
                    origin: request.origin(),
                    diagnostic,
                })
            }
        }
    }

    fn adopt(native: Arc<dyn NativeAllocator>, raw: RawHandle) -> Self {
        Self {
            raw,
            native,
            _kind: PhantomData,
        }
    }

    /// Borrows a non-owning view of the resource.
    pub fn handle(&self) -> Handle<'_, K> {
        Handle::from_raw(&*self.native, self.raw)
    }

    /// The allocator the resource came from. Derived resources are created
    /// through the same allocator.
    pub fn allocator(&self) -> &Arc<dyn NativeAllocator> {
        &self.native
    }

    /// Gives up ownership without releasing the resource.
    pub fn into_raw(mut self) -> RawHandle {
        std::mem::replace(&mut self.raw, RawHandle::NULL)
    }
}

impl<K: Kind> Drop for Owned<K> {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            tracing::debug!(kind = %K::TYPE, raw = %self.raw, "releasing resource");
            self.native.release(K::TYPE, self.raw);
        }
    }
}

impl<K: Kind> fmt::Debug for Owned<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owned")
            .field("kind", &K::TYPE)
            .field("raw", &self.raw)
            .finish()
    }
}

/// Non-owning handle. May be null; never releases anything.
pub struct Handle<'a, K: Kind> {
    raw: RawHandle,
    native: &'a dyn NativeAllocator,
    _kind: PhantomData<K>,
}

impl<'a, K: Kind> Handle<'a, K> {
    /// Wraps any pointer, including the null pointer.
    pub fn from_raw(native: &'a dyn NativeAllocator, raw: RawHandle) -> Self {
        Self {
            raw,
            native,
            _kind: PhantomData,
        }
    }
}

impl<K: Kind> Clone for Handle<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Kind> Copy for Handle<'_, K> {}

impl<K: Kind> PartialEq for Handle<'_, K> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<K: Kind> Eq for Handle<'_, K> {}

impl<'a, K: Kind> From<&'a Owned<K>> for Handle<'a, K> {
    fn from(owner: &'a Owned<K>) -> Self {
        owner.handle()
    }
}

impl<K: Kind> fmt::Debug for Handle<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("kind", &K::TYPE)
            .field("raw", &self.raw)
            .finish()
    }
}

/// Shared contract of owning and observing handles.
pub trait Resource {
    type Kind: Kind;

    fn raw(&self) -> RawHandle;

    fn native(&self) -> &dyn NativeAllocator;

    /// `false` for an empty observing handle.
    fn is_valid(&self) -> bool {
        !self.raw().is_null()
    }
}

impl<K: Kind> Resource for Owned<K> {
    type Kind = K;

    fn raw(&self) -> RawHandle {
        self.raw
    }

    fn native(&self) -> &dyn NativeAllocator {
        &*self.native
    }
}

impl<K: Kind> Resource for Handle<'_, K> {
    type Kind = K;

    fn raw(&self) -> RawHandle {
        self.raw
    }

    fn native(&self) -> &dyn NativeAllocator {
        self.native
    }
}

/// Runs a native query, skipping the call for null handles.
pub(crate) fn query<R, T>(
    resource: &R,
    f: impl FnOnce(&dyn NativeAllocator, RawHandle) -> Option<T>,
) -> Option<T>
where
    R: Resource + ?Sized,
{
    let raw = resource.raw();
    if raw.is_null() {
        None
    } else {
        f(resource.native(), raw)
    }
}

/// Runs a native mutator, skipping the call for null handles.
pub(crate) fn mutate<R>(resource: &R, f: impl FnOnce(&dyn NativeAllocator, RawHandle) -> bool) -> bool
where
    R: Resource + ?Sized,
{
    let raw = resource.raw();
    !raw.is_null() && f(resource.native(), raw)
}

/// Pixel dimensions of textures, surfaces and windows.
pub trait Dimensions: Resource {
    /// Zero when the backend cannot answer.
    fn size(&self) -> Area {
        query(self, |native, raw| native.query_dimensions(raw)).unwrap_or_default()
    }

    fn width(&self) -> u32 {
        self.size().width
    }

    fn height(&self) -> u32 {
        self.size().height
    }
}

impl<R> Dimensions for R
where
    R: Resource,
    R::Kind: SizedKind,
{
}

/// Pixel format of textures and surfaces.
pub trait Pixels: Dimensions {
    fn format(&self) -> PixelFormat {
        query(self, |native, raw| native.query_format(raw)).unwrap_or_default()
    }
}

impl<R> Pixels for R
where
    R: Resource,
    R::Kind: PixelKind,
{
}

/// Alpha, colour and blend modulation of textures and surfaces.
pub trait Modulate: Resource {
    fn alpha(&self) -> u8 {
        query(self, |native, raw| native.query_alpha(raw)).unwrap_or(0xFF)
    }

    fn set_alpha(&self, alpha: u8) -> bool {
        mutate(self, |native, raw| native.set_alpha(raw, alpha))
    }

    fn blend_mode(&self) -> BlendMode {
        query(self, |native, raw| native.query_blend_mode(raw)).unwrap_or_default()
    }

    fn set_blend_mode(&self, mode: BlendMode) -> bool {
        mutate(self, |native, raw| native.set_blend_mode(raw, mode))
    }

    fn color_mod(&self) -> Color {
        query(self, |native, raw| native.query_color_modulation(raw)).unwrap_or_default()
    }

    fn set_color_mod(&self, color: Color) -> bool {
        mutate(self, |native, raw| native.set_color_modulation(raw, color))
    }
}

impl<R> Modulate for R
where
    R: Resource,
    R::Kind: PixelKind,
{
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{software::SoftwareBackend, video::TextureAccess};

    type Surface = Owned<kind::Surface>;

    fn blank(backend: &Arc<SoftwareBackend>) -> Surface {
        Surface::allocate(
            backend.clone(),
            AllocationRequest::Blank {
                size: Area::new(8, 4),
                format: PixelFormat::Rgba32,
                access: TextureAccess::Static,
            },
        )
        .unwrap()
    }

    #[test]
    fn rejects_null_pointer() {
        let backend = Arc::new(SoftwareBackend::new());
        let err = Surface::from_raw(backend, RawHandle::NULL).unwrap_err();
        assert!(matches!(
            err,
            MediaError::InvalidResource {
                kind: ResourceType::Surface,
                ..
            }
        ));
    }

    #[test]
    fn drop_releases_exactly_once() {
        let backend = Arc::new(SoftwareBackend::new());
        let surface = blank(&backend);
        let raw = surface.raw();
        assert_eq!(backend.outstanding(), 1);

        drop(surface);
        assert_eq!(backend.release_count(raw), 1);
        assert_eq!(backend.outstanding(), 0);
    }

    #[test]
    fn moved_owner_releases_once() {
        let backend = Arc::new(SoftwareBackend::new());
        let first = blank(&backend);
        let raw = first.raw();

        let second = first;
        assert_eq!(backend.release_count(raw), 0);
        drop(second);
        assert_eq!(backend.release_count(raw), 1);
    }

    #[test]
    fn move_assignment_releases_previous_resource() {
        let backend = Arc::new(SoftwareBackend::new());
        let mut target = blank(&backend);
        let replaced = target.raw();
        let source = blank(&backend);
        let kept = source.raw();

        target = source;
        assert_eq!(backend.release_count(replaced), 1);
        assert_eq!(target.raw(), kept);
        assert_eq!(backend.release_count(kept), 0);
    }

    #[test]
    fn observers_never_release() {
        let backend = Arc::new(SoftwareBackend::new());
        let surface = blank(&backend);
        let raw = surface.raw();

        {
            let first = surface.handle();
            let second = first;
            let third = Handle::<kind::Surface>::from_raw(&*backend, raw);
            assert_eq!(first, third);
            assert_eq!(second.width(), 8);
            assert_eq!(second.format(), PixelFormat::Rgba32);
        }

        assert_eq!(backend.release_count(raw), 0);
        drop(surface);
        assert_eq!(backend.release_count(raw), 1);
    }

    #[test]
    fn into_raw_skips_release() {
        let backend = Arc::new(SoftwareBackend::new());
        let surface = blank(&backend);
        let raw = surface.into_raw();

        assert_eq!(backend.release_count(raw), 0);
        let adopted = Surface::from_raw(backend.clone(), raw).unwrap();
        drop(adopted);
        assert_eq!(backend.release_count(raw), 1);
    }

    #[test]
    fn null_observer_is_inert() {
        let backend = SoftwareBackend::new();
        let handle = Handle::<kind::Texture>::from_raw(&backend, RawHandle::NULL);

        assert!(!handle.is_valid());
        assert_eq!(handle.size(), Area::default());
        assert_eq!(handle.alpha(), 0xFF);
        assert_eq!(handle.format(), PixelFormat::Unknown);
        assert!(!handle.set_alpha(3));
    }

    #[test]
    fn mutations_are_visible_through_every_handle() {
        let backend = Arc::new(SoftwareBackend::new());
        let surface = blank(&backend);
        let view = surface.handle();

        assert!(view.set_alpha(42));
        assert!(view.set_blend_mode(BlendMode::Add));
        assert!(surface.set_color_mod(Color::rgb(1, 2, 3)));

        assert_eq!(surface.alpha(), 42);
        assert_eq!(surface.blend_mode(), BlendMode::Add);
        assert_eq!(view.color_mod(), Color::rgb(1, 2, 3));
    }
}
