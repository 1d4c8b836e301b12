//! The `Directory` seam between the codec and durable storage.

use std::sync::Arc;

use crate::{ReadAt, SealingWrite};

/// Hint describing the expected access pattern for a resource being opened.
///
/// The codec passes this through opaquely from its own callers; implementations
/// are free to ignore it or use it to tune buffering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoContext {
    /// No particular expectation.
    #[default]
    Default,
    /// The resource will be consumed front to back (e.g. a merge).
    Sequential,
    /// The resource will be seeked into at arbitrary block boundaries.
    Random,
}

/// A flat namespace of named, write-once byte resources.
///
/// A resource is created through [`create_output`](Directory::create_output),
/// populated sequentially and sealed; from then on it is immutable and any
/// number of readers may be opened against it concurrently. Creating a resource
/// under a name that already exists is an error: the indexing pipeline above
/// this layer never reuses names within a segment.
pub trait Directory: Send + Sync {
    /// Creates a named resource and returns an appendable sink for it.
    fn create_output(&self, name: &str, context: IoContext)
    -> std::io::Result<Box<dyn SealingWrite>>;

    /// Opens a previously sealed resource for positional reads.
    fn open_input(&self, name: &str, context: IoContext) -> std::io::Result<Arc<dyn ReadAt>>;

    /// Returns true if a sealed resource exists under `name`.
    fn exists(&self, name: &str) -> std::io::Result<bool>;
}

impl<T> Directory for Arc<T>
where
    T: Directory + ?Sized,
{
    fn create_output(
        &self,
        name: &str,
        context: IoContext,
    ) -> std::io::Result<Box<dyn SealingWrite>> {
        self.as_ref().create_output(name, context)
    }

    fn open_input(&self, name: &str, context: IoContext) -> std::io::Result<Arc<dyn ReadAt>> {
        self.as_ref().open_input(name, context)
    }

    fn exists(&self, name: &str) -> std::io::Result<bool> {
        self.as_ref().exists(name)
    }
}
