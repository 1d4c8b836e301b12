//! Stream reader side of the postings format.

pub mod stream;

pub use stream::{BlockCursor, BlockStreamReader};
