use std::{path::Path, sync::Arc};

use crate::{
    native::{AllocationRequest, NativeAllocator},
    resource::{kind, query, Handle, Owned, Resource},
    Result,
};

pub type Font = Owned<kind::Font>;
pub type FontHandle<'a> = Handle<'a, kind::Font>;

impl Font {
    /// Opens a font file at the given point size.
    pub fn open(
        native: Arc<dyn NativeAllocator>,
        path: impl AsRef<Path>,
        point_size: u32,
    ) -> Result<Self> {
        Self::allocate(
            native,
            AllocationRequest::Font {
                path: path.as_ref(),
                point_size,
            },
        )
    }
}

pub trait FontApi: Resource<Kind = kind::Font> {
    /// Zero when the backend cannot answer.
    fn point_size(&self) -> u32 {
        query(self, |native, raw| native.query_point_size(raw)).unwrap_or(0)
    }
}

impl<R> FontApi for R where R: Resource<Kind = kind::Font> {}
