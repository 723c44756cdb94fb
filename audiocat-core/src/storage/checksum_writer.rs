use std::io::{self, Write};

use sha2::{Digest, Sha256};

/// Pass-through writer that hashes and counts every byte it forwards.
///
/// Wraps the listen output so the capture summary can report exactly what
/// reached the consumer.
pub struct ChecksumWriter<W: Write> {
    inner: W,
    hasher: Sha256,
    bytes_written: u64,
}

impl<W: Write> ChecksumWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes_written: 0,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// SHA-256 hex digest of everything written so far.
    pub fn checksum(&self) -> String {
        hex_encode(&self.hasher.clone().finalize())
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ChecksumWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        // only what the inner writer accepted
        self.hasher.update(&buf[..n]);
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stream_has_the_empty_digest() {
        let writer = ChecksumWriter::new(Vec::new());
        assert_eq!(writer.bytes_written(), 0);
        assert_eq!(
            writer.checksum(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn forwards_and_hashes_written_bytes() {
        let mut writer = ChecksumWriter::new(Vec::new());
        writer.write_all(b"a").unwrap();
        writer.write_all(b"bc").unwrap();
        assert_eq!(writer.bytes_written(), 3);
        assert_eq!(
            writer.checksum(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(writer.get_ref(), b"abc");
        assert_eq!(writer.into_inner(), b"abc".to_vec());
    }

    #[test]
    fn checksum_can_be_taken_mid_stream() {
        let mut writer = ChecksumWriter::new(Vec::new());
        writer.write_all(b"abc").unwrap();
        let first = writer.checksum();
        writer.write_all(b"d").unwrap();
        assert_ne!(writer.checksum(), first);
    }
}
