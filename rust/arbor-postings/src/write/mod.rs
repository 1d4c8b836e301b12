//! Stream writer side of the postings format.

pub mod stream;

pub use stream::{BlockStreamWriter, StreamStats};
