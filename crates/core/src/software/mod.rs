//! In-process collaborators.
//!
//! [`SoftwareBackend`] is a native allocator that keeps resources as plain
//! records and counts every release, and [`SoftwareStore`] is a hint store
//! with the priority and environment rules of the wrapped library. The
//! command line front end runs on them, and the tests use them as tracking
//! doubles.

mod allocator;
mod store;

pub use allocator::SoftwareBackend;
pub use store::SoftwareStore;
