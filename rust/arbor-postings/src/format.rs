//! Postings format configuration and factory: binds a codec and block size to
//! each of the four sub-streams and opens matched writer/reader sets against a
//! [`Directory`]. The factory performs no compression itself.

use std::sync::Arc;

use arbor_common::{Result, error::Error, verify_arg, verify_data};
use arbor_encodings::block_codec::CompressorId;
use arbor_io::{Directory, IoContext};

use crate::{
    read::{BlockCursor, BlockStreamReader},
    write::{BlockStreamWriter, StreamStats},
};

/// Resource name extensions, one per sub-stream kind.
pub const DOC_EXTENSION: &str = "doc";
pub const FREQ_EXTENSION: &str = "frq";
pub const NODE_EXTENSION: &str = "nod";
pub const POS_EXTENSION: &str = "pos";

/// Recognized configuration options of the postings format.
///
/// The block size is used only on the write path; readers recover it from the
/// persisted stream headers. Codecs are independently pluggable per
/// sub-stream: document gaps and frequencies tend to be small (bit-packing
/// friendly) while node ids and positions can span the full range.
#[derive(Debug, Clone)]
pub struct PostingsFormatConfig {
    pub block_size: usize,
    pub docs: CompressorId,
    pub freqs: CompressorId,
    pub nodes: CompressorId,
    pub positions: CompressorId,
}

impl Default for PostingsFormatConfig {
    fn default() -> PostingsFormatConfig {
        PostingsFormatConfig {
            block_size: 512,
            docs: CompressorId::VInt,
            freqs: CompressorId::VInt,
            nodes: CompressorId::VInt,
            positions: CompressorId::VInt,
        }
    }
}

/// Factory for postings writers and readers over a storage backend.
pub struct PostingsFormat {
    config: PostingsFormatConfig,
}

impl PostingsFormat {
    pub fn new(config: PostingsFormatConfig) -> PostingsFormat {
        PostingsFormat { config }
    }

    pub fn config(&self) -> &PostingsFormatConfig {
        &self.config
    }

    /// Opens a composite writer for the named posting list: one block stream
    /// per sub-stream kind, all sharing the configured nominal block size so
    /// that block ordinals align across sub-streams.
    pub fn create_writer(
        &self,
        dir: &dyn Directory,
        name: &str,
        context: IoContext,
    ) -> Result<PostingsWriter> {
        verify_arg!(name, !name.is_empty());
        let open = |ext: &str, id: CompressorId| -> Result<BlockStreamWriter> {
            let resource = format!("{name}.{ext}");
            let sink = dir
                .create_output(&resource, context)
                .map_err(|e| Error::io(resource, e))?;
            BlockStreamWriter::new(sink, self.config.block_size, id)
        };
        Ok(PostingsWriter {
            docs: open(DOC_EXTENSION, self.config.docs)?,
            freqs: open(FREQ_EXTENSION, self.config.freqs)?,
            nodes: open(NODE_EXTENSION, self.config.nodes)?,
            positions: open(POS_EXTENSION, self.config.positions)?,
            last_doc: None,
        })
    }

    /// Opens a composite reader over a posting list previously written and
    /// closed through [`create_writer`](Self::create_writer).
    pub fn open_reader(
        &self,
        dir: &dyn Directory,
        name: &str,
        context: IoContext,
    ) -> Result<PostingsReader> {
        let open = |ext: &str| -> Result<Arc<BlockStreamReader>> {
            let resource = format!("{name}.{ext}");
            let input = dir
                .open_input(&resource, context)
                .map_err(|e| Error::io(resource, e))?;
            BlockStreamReader::open(input)
        };
        let docs = open(DOC_EXTENSION)?;
        let freqs = open(FREQ_EXTENSION)?;
        let nodes = open(NODE_EXTENSION)?;
        let positions = open(POS_EXTENSION)?;
        // Docs and freqs are written in lockstep, block for block.
        verify_data!("postings", docs.block_count() == freqs.block_count());
        Ok(PostingsReader {
            docs: docs.cursor(),
            freqs: freqs.cursor(),
            nodes: nodes.cursor(),
            positions: positions.cursor(),
            current_doc: 0,
        })
    }
}

/// Composite writer driving the four sub-streams of one posting list.
///
/// Documents and frequencies are kept in strict lockstep (one frequency per
/// document, flushed together), so the k-th doc block and the k-th freq block
/// cover the same span of postings. Node and position streams accumulate at
/// their own rate (several entries per document) and roll over to a new block
/// transparently when full; only their terminal block is partial.
///
/// Document ids are stored as gaps to their predecessor, so the block codecs
/// see small values regardless of the absolute id range. The reader reverses
/// the gapping in [`PostingsReader::next_document`].
///
/// The caller contract mirrors the write loop of the indexing pipeline:
/// `if writer.is_full() { writer.flush()?; } writer.write_document(doc)?;`.
pub struct PostingsWriter {
    docs: BlockStreamWriter,
    freqs: BlockStreamWriter,
    nodes: BlockStreamWriter,
    positions: BlockStreamWriter,
    last_doc: Option<u32>,
}

impl PostingsWriter {
    /// True once the current doc/freq block reached the nominal block size;
    /// the caller must [`flush`](Self::flush) before the next document.
    pub fn is_full(&self) -> bool {
        self.docs.is_full()
    }

    /// Appends the next document id. Ids must be strictly increasing within
    /// one posting list; the stored value is the gap to the previous id.
    pub fn write_document(&mut self, doc: u32) -> Result<()> {
        verify_arg!(doc, self.last_doc.is_none_or(|last| doc > last));
        self.docs.write(doc - self.last_doc.unwrap_or(0))?;
        self.last_doc = Some(doc);
        Ok(())
    }

    /// Appends the node frequency of the current document; exactly one call
    /// per [`write_document`](Self::write_document).
    pub fn write_node_freq(&mut self, freq: u32) -> Result<()> {
        self.freqs.write(freq)
    }

    /// Appends a node id occurrence. The node stream rolls over to a fresh
    /// block on its own when full.
    pub fn write_node(&mut self, node: u32) -> Result<()> {
        if self.nodes.is_full() {
            self.nodes.flush()?;
        }
        self.nodes.write(node)
    }

    /// Appends an intra-node position, rolling over like
    /// [`write_node`](Self::write_node).
    pub fn write_position(&mut self, position: u32) -> Result<()> {
        if self.positions.is_full() {
            self.positions.flush()?;
        }
        self.positions.write(position)
    }

    /// Flushes the current doc and freq blocks together, verifying they are
    /// still aligned. Misaligned sub-streams would silently desynchronize
    /// readers, so this fails loudly instead of trusting the caller.
    pub fn flush(&mut self) -> Result<()> {
        verify_arg!("postings", self.docs.pending() == self.freqs.pending());
        self.docs.flush()?;
        self.freqs.flush()
    }

    /// Flushes all trailing partial blocks and finalizes the four resources
    /// (block indices, trailers, seal).
    pub fn close(mut self) -> Result<PostingsStats> {
        self.flush()?;
        Ok(PostingsStats {
            docs: self.docs.close()?,
            freqs: self.freqs.close()?,
            nodes: self.nodes.close()?,
            positions: self.positions.close()?,
        })
    }
}

/// Per-sub-stream summaries of a closed posting list.
#[derive(Debug, Clone, Copy)]
pub struct PostingsStats {
    pub docs: StreamStats,
    pub freqs: StreamStats,
    pub nodes: StreamStats,
    pub positions: StreamStats,
}

/// Composite reader over the four sub-streams of one posting list.
///
/// A consumer drives the cursors in lockstep, advancing each when it
/// individually reports exhaustion; named accessors mirror the write side.
pub struct PostingsReader {
    docs: BlockCursor,
    freqs: BlockCursor,
    nodes: BlockCursor,
    positions: BlockCursor,
    current_doc: u32,
}

impl PostingsReader {
    /// Raw doc cursor; yields stored gaps, not absolute ids. Seeking it
    /// invalidates the accumulator behind
    /// [`next_document`](Self::next_document).
    pub fn docs(&mut self) -> &mut BlockCursor {
        &mut self.docs
    }

    pub fn freqs(&mut self) -> &mut BlockCursor {
        &mut self.freqs
    }

    pub fn nodes(&mut self) -> &mut BlockCursor {
        &mut self.nodes
    }

    pub fn positions(&mut self) -> &mut BlockCursor {
        &mut self.positions
    }

    /// True when the doc cursor consumed its current block; doc and freq
    /// blocks are aligned, so the caller advances both with
    /// [`next_doc_block`](Self::next_doc_block).
    pub fn is_exhausted(&self) -> bool {
        self.docs.is_exhausted()
    }

    /// Advances the doc and freq cursors to their next (aligned) blocks.
    pub fn next_doc_block(&mut self) -> Result<()> {
        self.docs.next_block()?;
        self.freqs.next_block()
    }

    /// Returns the next absolute document id, summing up the stored gaps.
    pub fn next_document(&mut self) -> Result<u32> {
        let gap = self.docs.next_value()?;
        let doc = u64::from(self.current_doc) + u64::from(gap);
        verify_data!("docs", doc <= u64::from(u32::MAX));
        self.current_doc = doc as u32;
        Ok(self.current_doc)
    }

    pub fn next_node_freq(&mut self) -> Result<u32> {
        self.freqs.next_value()
    }

    pub fn next_node(&mut self) -> Result<u32> {
        if self.nodes.is_exhausted() {
            self.nodes.next_block()?;
        }
        self.nodes.next_value()
    }

    pub fn next_position(&mut self) -> Result<u32> {
        if self.positions.is_exhausted() {
            self.positions.next_block()?;
        }
        self.positions.next_value()
    }
}

#[cfg(test)]
mod tests {
    use arbor_encodings::block_codec::CompressorId;
    use arbor_io::{Directory, IoContext, MemoryDirectory};

    use super::{PostingsFormat, PostingsFormatConfig};

    #[test]
    fn test_factory_resource_naming() {
        let dir = MemoryDirectory::new();
        let format = PostingsFormat::new(PostingsFormatConfig {
            block_size: 8,
            ..Default::default()
        });
        let writer = format
            .create_writer(&dir, "_0_term", IoContext::Default)
            .unwrap();
        writer.close().unwrap();
        for ext in ["doc", "frq", "nod", "pos"] {
            assert!(dir.exists(&format!("_0_term.{ext}")).unwrap());
        }
    }

    #[test]
    fn test_mixed_codecs_per_substream() {
        let dir = MemoryDirectory::new();
        let format = PostingsFormat::new(PostingsFormatConfig {
            block_size: 16,
            docs: CompressorId::Packed,
            freqs: CompressorId::Packed,
            nodes: CompressorId::VInt,
            positions: CompressorId::VInt,
        });

        let mut writer = format.create_writer(&dir, "t", IoContext::Default).unwrap();
        for doc in 0..100u32 {
            if writer.is_full() {
                writer.flush().unwrap();
            }
            writer.write_document(doc).unwrap();
            writer.write_node_freq(1).unwrap();
            writer.write_node(doc * 2).unwrap();
            writer.write_position(doc % 7).unwrap();
        }
        writer.close().unwrap();

        let mut reader = format.open_reader(&dir, "t", IoContext::Default).unwrap();
        for doc in 0..100u32 {
            if reader.is_exhausted() {
                reader.next_doc_block().unwrap();
            }
            assert_eq!(reader.next_document().unwrap(), doc);
            assert_eq!(reader.next_node_freq().unwrap(), 1);
            assert_eq!(reader.next_node().unwrap(), doc * 2);
            assert_eq!(reader.next_position().unwrap(), doc % 7);
        }
        assert!(reader.is_exhausted());
    }

    #[test]
    fn test_non_increasing_docs_rejected() {
        let dir = MemoryDirectory::new();
        let format = PostingsFormat::new(Default::default());
        let mut writer = format.create_writer(&dir, "t", IoContext::Default).unwrap();
        writer.write_document(5).unwrap();
        assert!(writer.write_document(5).is_err());
        assert!(writer.write_document(4).is_err());
        writer.write_document(6).unwrap();
    }

    #[test]
    fn test_misaligned_doc_freq_flush_rejected() {
        let dir = MemoryDirectory::new();
        let format = PostingsFormat::new(Default::default());
        let mut writer = format.create_writer(&dir, "t", IoContext::Default).unwrap();
        writer.write_document(0).unwrap();
        writer.write_document(1).unwrap();
        writer.write_node_freq(3).unwrap();
        // One freq is missing for doc 1.
        assert!(writer.flush().is_err());
    }

    #[test]
    fn test_empty_posting_list() {
        let dir = MemoryDirectory::new();
        let format = PostingsFormat::new(Default::default());
        format
            .create_writer(&dir, "t", IoContext::Default)
            .unwrap()
            .close()
            .unwrap();

        let mut reader = format.open_reader(&dir, "t", IoContext::Default).unwrap();
        assert!(reader.is_exhausted());
        assert!(reader.next_doc_block().is_err());
        assert!(reader.next_document().is_err());
    }
}
