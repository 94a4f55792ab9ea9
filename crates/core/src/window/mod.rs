use std::sync::Arc;

use crate::{
    native::{AllocationRequest, NativeAllocator},
    resource::{kind, mutate, query, Handle, Owned, Resource},
    video::Area,
    Result,
};

pub type Window = Owned<kind::Window>;
pub type WindowHandle<'a> = Handle<'a, kind::Window>;

impl Window {
    pub fn new(native: Arc<dyn NativeAllocator>, title: &str, size: Area) -> Result<Self> {
        Self::allocate(native, AllocationRequest::Window { title, size })
    }
}

pub trait WindowApi: Resource<Kind = kind::Window> {
    /// Empty when the backend cannot answer.
    fn title(&self) -> String {
        query(self, |native, raw| native.query_title(raw)).unwrap_or_default()
    }

    fn set_title(&self, title: &str) -> bool {
        mutate(self, |native, raw| native.set_title(raw, title))
    }

    /// Resizes the window. Empty sizes are refused by the backend.
    fn set_size(&self, size: Area) -> bool {
        mutate(self, |native, raw| native.set_dimensions(raw, size))
    }
}

impl<R> WindowApi for R where R: Resource<Kind = kind::Window> {}
