//! Memory-based implementations of the storage abstractions, used by tests and
//! by callers that assemble short-lived segments entirely in RAM.

use std::{
    collections::HashMap,
    ops::Range,
    sync::{Arc, Mutex},
};

use bytes::Bytes;

use crate::{Directory, IoContext, ReadAt, SealingWrite, verify};

impl ReadAt for Bytes {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Bytes> {
        verify!(range.end >= range.start);
        let pos = range.start as usize;
        let len = (range.end - range.start) as usize;
        let content_len = self.len();
        if pos > content_len {
            return Ok(Bytes::new());
        }
        let len = std::cmp::min(len, content_len - pos);
        Ok(self.slice(pos..pos + len))
    }
}

impl SealingWrite for Vec<u8> {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.extend_from_slice(buf);
        Ok(())
    }

    fn seal(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// An in-memory [`Directory`]: resources live in a shared map and become
/// visible under their name only when the producing writer seals.
#[derive(Default)]
pub struct MemoryDirectory {
    resources: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl MemoryDirectory {
    pub fn new() -> MemoryDirectory {
        Default::default()
    }
}

impl Directory for MemoryDirectory {
    fn create_output(
        &self,
        name: &str,
        _context: IoContext,
    ) -> std::io::Result<Box<dyn SealingWrite>> {
        let resources = self.resources.lock().expect("resources lock");
        if resources.contains_key(name) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("resource '{name}' already exists"),
            ));
        }
        Ok(Box::new(MemoryWriter {
            name: name.to_string(),
            buf: Vec::new(),
            resources: self.resources.clone(),
        }))
    }

    fn open_input(&self, name: &str, _context: IoContext) -> std::io::Result<Arc<dyn ReadAt>> {
        let resources = self.resources.lock().expect("resources lock");
        let bytes = resources.get(name).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("resource '{name}' not found"),
            )
        })?;
        Ok(Arc::new(bytes))
    }

    fn exists(&self, name: &str) -> std::io::Result<bool> {
        let resources = self.resources.lock().expect("resources lock");
        Ok(resources.contains_key(name))
    }
}

struct MemoryWriter {
    name: String,
    buf: Vec<u8>,
    resources: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl SealingWrite for MemoryWriter {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.buf.extend_from_slice(buf);
        Ok(())
    }

    fn seal(&mut self) -> std::io::Result<()> {
        let bytes = Bytes::from(std::mem::take(&mut self.buf));
        let mut resources = self.resources.lock().expect("resources lock");
        resources.insert(self.name.clone(), bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Directory, IoContext, MemoryDirectory, ReadAt, SealingWrite};

    #[test]
    fn test_mem_writer() {
        let mut buffer = Vec::<u8>::new();
        buffer.write_all(b"abcd").unwrap();
        buffer.write_all(b"123").unwrap();
        buffer.seal().unwrap();
        assert_eq!(buffer, b"abcd123");
    }

    #[test]
    fn test_mem_reader() {
        let blob = bytes::Bytes::from_static(b"abcd123");
        assert_eq!(blob.size().unwrap(), 7);
        let buf = blob.read_at(1..3).unwrap();
        assert_eq!(buf.as_ref(), b"bc");
        let buf = blob.read_at(4..200).unwrap();
        assert_eq!(buf.as_ref(), b"123");
    }

    #[test]
    fn test_memory_directory_visibility() {
        let dir = MemoryDirectory::new();
        let mut out = dir.create_output("seg.doc", IoContext::Default).unwrap();
        out.write_all(b"abcdefgh").unwrap();

        // Not visible until sealed.
        assert!(!dir.exists("seg.doc").unwrap());
        assert!(dir.open_input("seg.doc", IoContext::Default).is_err());

        out.seal().unwrap();
        assert!(dir.exists("seg.doc").unwrap());
        let input = dir.open_input("seg.doc", IoContext::Default).unwrap();
        assert_eq!(input.size().unwrap(), 8);
        assert_eq!(input.read_at(2..5).unwrap().as_ref(), b"cde");
    }

    #[test]
    fn test_memory_directory_duplicate_name() {
        let dir = MemoryDirectory::new();
        let mut out = dir.create_output("dup", IoContext::Default).unwrap();
        out.seal().unwrap();
        // The sealed resource now occupies the name.
        assert!(dir.create_output("dup", IoContext::Default).is_err());
    }
}
