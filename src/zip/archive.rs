use std::io::{self, Read};

use anyhow::{Result, bail};
use flate2::CrcReader;
use flate2::read::DeflateDecoder;

use crate::io::{ReadAt, SectionReader};

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// An open ZIP archive with its Central Directory already read.
pub struct ZipArchive<R: ReadAt> {
    parser: ZipParser<R>,
    entries: Vec<ZipFileEntry>,
}

impl<R: ReadAt> ZipArchive<R> {
    pub fn new(reader: R) -> Result<Self> {
        let parser = ZipParser::new(reader);
        let entries = parser.list_files()?;
        Ok(Self { parser, entries })
    }

    /// Entries in the order they are stored in the Central Directory
    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    /// Open a streaming reader over the decompressed contents of `entry`.
    pub fn entry_reader(&self, entry: &ZipFileEntry) -> Result<EntryReader<'_, R>> {
        if entry.is_encrypted() {
            bail!("{}: encrypted entries are not supported", entry.file_name);
        }

        let data_offset = self.parser.get_data_offset(entry)?;
        let section = SectionReader::new(self.parser.reader(), data_offset, entry.compressed_size);

        let decoder = match entry.compression_method {
            CompressionMethod::Stored => Decoder::Stored(section),
            CompressionMethod::Deflate => Decoder::Deflate(DeflateDecoder::new(section)),
            CompressionMethod::Unknown(method) => bail!(
                "{}: unsupported compression method {}",
                entry.file_name,
                method
            ),
        };

        Ok(EntryReader {
            inner: CrcReader::new(decoder),
            expected_crc: entry.crc32,
            expected_size: entry.uncompressed_size,
            read: 0,
        })
    }
}

enum Decoder<'a, R: ReadAt> {
    Stored(SectionReader<'a, R>),
    Deflate(DeflateDecoder<SectionReader<'a, R>>),
}

impl<R: ReadAt> Read for Decoder<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Decoder::Stored(r) => r.read(buf),
            Decoder::Deflate(r) => r.read(buf),
        }
    }
}

/// Decompressed contents of a single entry.
///
/// Length and CRC-32 are checked once the underlying stream is exhausted;
/// a mismatch is reported as [`io::ErrorKind::InvalidData`].
pub struct EntryReader<'a, R: ReadAt> {
    inner: CrcReader<Decoder<'a, R>>,
    expected_crc: u32,
    expected_size: u64,
    read: u64,
}

impl<R: ReadAt> EntryReader<'_, R> {
    fn verify(&self) -> io::Result<()> {
        if self.read != self.expected_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "entry size mismatch: expected {} bytes, got {}",
                    self.expected_size, self.read
                ),
            ));
        }

        let crc = self.inner.crc().sum();
        if crc != self.expected_crc {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "CRC-32 mismatch: expected {:08x}, got {:08x}",
                    self.expected_crc, crc
                ),
            ));
        }

        Ok(())
    }
}

impl<R: ReadAt> Read for EntryReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.verify()?;
        }
        self.read += n as u64;
        Ok(n)
    }
}
