mod local;

pub use local::LocalFileReader;

use std::io;

/// Trait for random access reading from a data source
pub trait ReadAt {
    /// Read data at the specified offset into the buffer
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fill `buf` completely, starting at `offset`.
    fn read_exact_at(&self, mut offset: u64, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read_at(offset, buf) {
                Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
                Ok(n) => {
                    offset += n as u64;
                    let rest = buf;
                    buf = &mut rest[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// In-memory archives, mostly useful for tests.
impl ReadAt for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(self.len());
        let n = buf.len().min(self.len() - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.len() as u64
    }
}

/// Sequential [`io::Read`] over the byte range `[start, start + len)` of a [`ReadAt`].
pub struct SectionReader<'a, R: ReadAt + ?Sized> {
    reader: &'a R,
    pos: u64,
    end: u64,
}

impl<'a, R: ReadAt + ?Sized> SectionReader<'a, R> {
    pub fn new(reader: &'a R, start: u64, len: u64) -> Self {
        Self {
            reader,
            pos: start,
            end: start.saturating_add(len),
        }
    }
}

impl<R: ReadAt + ?Sized> io::Read for SectionReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.end - self.pos;
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }

        let max = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let n = self.reader.read_at(self.pos, &mut buf[..max])?;
        if n == 0 {
            // The archive is shorter than its headers claim.
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        self.pos += n as u64;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn section_reader_is_bounded() {
        let data: Vec<u8> = (0u8..32).collect();
        let mut section = SectionReader::new(&data, 4, 8);

        let mut out = Vec::new();
        section.read_to_end(&mut out).unwrap();
        assert_eq!(out, (4u8..12).collect::<Vec<_>>());
    }

    #[test]
    fn section_past_end_of_source_is_an_error() {
        let data = vec![1u8, 2, 3];
        let mut section = SectionReader::new(&data, 1, 10);

        let mut out = Vec::new();
        let err = section.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn read_exact_at_reports_short_source() {
        let data = vec![0u8; 4];
        let mut buf = [0u8; 8];
        let err = data.read_exact_at(0, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
