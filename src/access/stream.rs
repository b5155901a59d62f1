//! Byte sources and sinks handed out by storages.
//!
//! A [`Source`] is a pull-based reader that also knows how many bytes are
//! still obtainable; a [`Sink`] is any writer. Both are plain `std::io`
//! traits underneath so they compose with the rest of the ecosystem, and
//! both release their handle when dropped.

use bytes::Bytes;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};

pub trait Source: Read {
    /// Bytes left before the end of the stream.
    fn available(&self) -> u64;
}

/// Write side of a storage stream.
pub trait Sink: Write {}

impl<W: Write> Sink for W {}

/// Drain a source into a vector.
pub fn read_all(source: &mut dyn Source) -> io::Result<Vec<u8>> {
    let mut data = Vec::with_capacity(source.available().min(64 * 1024 * 1024) as usize);
    source.read_to_end(&mut data)?;
    Ok(data)
}

/// Source over an in-memory buffer.
#[derive(Debug, Clone)]
pub struct SliceSource {
    data: Bytes,
    position: usize,
}

impl SliceSource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            position: 0,
        }
    }
}

impl Read for SliceSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = &self.data[self.position..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}

impl Source for SliceSource {
    fn available(&self) -> u64 {
        (self.data.len() - self.position) as u64
    }
}

/// Source over a file on disk.
#[derive(Debug)]
pub struct FileSource {
    reader: BufReader<File>,
    remaining: u64,
}

impl FileSource {
    pub fn open(path: &std::path::Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let remaining = file.metadata()?.len();
        Ok(Self {
            reader: BufReader::new(file),
            remaining,
        })
    }
}

impl Read for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.reader.read(buf)?;
        self.remaining = self.remaining.saturating_sub(n as u64);
        Ok(n)
    }
}

impl Source for FileSource {
    fn available(&self) -> u64 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_tracks_available() {
        let mut source = SliceSource::new(b"hello world".to_vec());
        assert_eq!(source.available(), 11);

        let mut buf = [0u8; 5];
        assert_eq!(source.read(&mut buf).unwrap(), 5);
        assert_eq!(&buf, b"hello");
        assert_eq!(source.available(), 6);

        assert_eq!(read_all(&mut source).unwrap(), b" world");
        assert_eq!(source.available(), 0);
        assert_eq!(source.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, vec![7u8; 1000]).unwrap();

        let mut source = FileSource::open(&path).unwrap();
        assert_eq!(source.available(), 1000);
        let data = read_all(&mut source).unwrap();
        assert_eq!(data.len(), 1000);
        assert_eq!(source.available(), 0);
    }
}
