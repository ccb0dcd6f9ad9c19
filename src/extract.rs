//! Unpacking an archive onto disk.
//!
//! Entries are processed one at a time in stored order. Every filesystem
//! mutation (creating directories, creating the output file, stamping the
//! modification time) goes through the [`Retry`] executor; reading and
//! decompressing entry data does not.
//!
//! Entry names are joined onto the destination verbatim. A name containing
//! `..` segments or an absolute path lands outside the destination, so
//! callers extracting untrusted archives have to vet the entries themselves.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use anyhow::Result;
use filetime::FileTime;
use tracing::debug;

use crate::io::{LocalFileReader, ReadAt};
use crate::retry::{Retry, RetryPolicy, Sleep, ThreadSleep};
use crate::zip::{ZipArchive, ZipFileEntry};

/// What a successful extraction produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub files: usize,
    pub directories: usize,
    /// Decompressed bytes written across all files
    pub bytes: u64,
}

/// Extracts archives, retrying filesystem mutations per its [`Retry`] executor.
#[derive(Debug, Clone, Default)]
pub struct Extractor<S = ThreadSleep> {
    retry: Retry<S>,
}

impl Extractor {
    pub fn new() -> Self {
        Self::with_retry(Retry::new(RetryPolicy::default()))
    }
}

impl<S: Sleep> Extractor<S> {
    pub fn with_retry(retry: Retry<S>) -> Self {
        Self { retry }
    }

    /// Reproduce the entries of the archive at `archive_path` under `destination`.
    ///
    /// The first error that survives its retries aborts the whole run. Entries
    /// written before it stay on disk; nothing is rolled back.
    ///
    /// A directory entry stored before its children gets its timestamp
    /// overwritten when those children are written into it.
    pub fn extract(&self, archive_path: &Path, destination: &Path) -> Result<ExtractStats> {
        let archive = ZipArchive::new(LocalFileReader::new(archive_path)?)?;
        self.extract_archive(&archive, destination)
    }

    /// Same as [`extract`](Self::extract), for an archive that is already open.
    pub fn extract_archive<R: ReadAt>(
        &self,
        archive: &ZipArchive<R>,
        destination: &Path,
    ) -> Result<ExtractStats> {
        let mut stats = ExtractStats::default();

        for entry in archive.entries() {
            let target = destination.join(&entry.file_name);
            let mtime = file_time(entry);

            if entry.is_directory() {
                debug!(entry = %entry.file_name, "creating directory");
                self.extract_directory(&target, mtime)?;
                stats.directories += 1;
            } else {
                debug!(entry = %entry.file_name, size = entry.uncompressed_size, "extracting file");
                stats.bytes += self.extract_file(archive, entry, &target, mtime)?;
                stats.files += 1;
            }
        }

        Ok(stats)
    }

    fn extract_file<R: ReadAt>(
        &self,
        archive: &ZipArchive<R>,
        entry: &ZipFileEntry,
        target: &Path,
        mtime: FileTime,
    ) -> Result<u64> {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                self.create_dir(parent)?;
            }
        }

        let written = {
            let mut reader = archive.entry_reader(entry)?;
            let mut file = self.retry.run(|| File::create(target))?;
            io::copy(&mut reader, &mut file)?
        };

        self.retry
            .run_effect(|| filetime::set_file_mtime(target, mtime))?;

        Ok(written)
    }

    fn extract_directory(&self, target: &Path, mtime: FileTime) -> Result<()> {
        if !target.is_dir() {
            self.create_dir(target)?;
        }

        self.retry
            .run_effect(|| filetime::set_file_mtime(target, mtime))?;

        Ok(())
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.retry.run_effect(|| fs::create_dir_all(path))
    }
}

/// Extract with the default policy: three attempts, 500ms then 1000ms apart.
pub fn extract(
    archive_path: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<ExtractStats> {
    Extractor::new().extract(archive_path.as_ref(), destination.as_ref())
}

fn file_time(entry: &ZipFileEntry) -> FileTime {
    let modified = entry.last_modified();
    FileTime::from_unix_time(modified.timestamp(), modified.timestamp_subsec_nanos())
}
