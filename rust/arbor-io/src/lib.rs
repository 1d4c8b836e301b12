//! Storage backend abstractions for the postings codec:
//! - `ReadAt`: positional reader with the ability to fetch a specified byte range
//!   from a named resource.
//! - `SealingWrite`: sequential writer with a `seal()` operation, committing the
//!   write activity.
//! - `Directory`: a flat namespace of named, write-once byte resources.
//!
//! Provides a couple of simple implementations: memory-based and file-based.

use std::{ops::Range, sync::Arc};

use bytes::Bytes;

pub mod directory;
pub mod file;
pub mod memory;
pub mod utils;

pub use directory::{Directory, IoContext};
pub use file::FsDirectory;
pub use memory::MemoryDirectory;

/// A trait representing a conceptual file or buffer that supports reading from
/// arbitrary positions.
///
/// Resources handed out by a [`Directory`] are write-once: a reader is only
/// opened after the producing writer has been sealed, so implementations never
/// observe concurrent mutation. Multiple readers over the same resource may be
/// used concurrently from different threads.
pub trait ReadAt: Send + Sync + 'static {
    /// Returns the size of the underlying object.
    fn size(&self) -> std::io::Result<u64>;

    /// Reads a specified range of bytes from the object.
    ///
    /// `read_at` should not return with a short read, unless end-of-file is
    /// encountered: if the range extends beyond the end of the object, the
    /// result is clamped to the available bytes.
    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes>;
}

/// A trait for sequential writing with explicit sealing semantics.
///
/// This represents a write-only, append-only interface over a named resource.
/// Data becomes visible to readers only after [`seal`](SealingWrite::seal); a
/// sealed resource is immutable from that point on. Writers require exclusive
/// access through `&mut self` and are owned by a single thread at a time.
pub trait SealingWrite: Send {
    /// Writes the entire buffer to the underlying storage, appending it to any
    /// previously written data. Either all bytes are written or an error is
    /// returned with no partial write observed by a subsequent reader.
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()>;

    /// Seals the writer, flushing any buffered data and committing the resource.
    /// Once sealed, the writer does not accept further writes.
    fn seal(&mut self) -> std::io::Result<()>;
}

impl<T> ReadAt for Arc<T>
where
    T: ReadAt + ?Sized,
{
    fn size(&self) -> std::io::Result<u64> {
        self.as_ref().size()
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
        self.as_ref().read_at(range)
    }
}

impl<T> SealingWrite for Box<T>
where
    T: SealingWrite + ?Sized,
{
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.as_mut().write_all(buf)
    }

    fn seal(&mut self) -> std::io::Result<()> {
        self.as_mut().seal()
    }
}
