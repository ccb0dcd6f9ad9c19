//! # retryzip
//!
//! Zip extraction that keeps each entry's modification time and rides out
//! transient filesystem failures.
//!
//! Archive entries are written to disk one by one in stored order. Creating
//! directories, creating files and setting modification times are each
//! retried with a linear backoff (three attempts, 500ms then 1000ms apart
//! by default), which is enough to get past a virus scanner briefly holding a
//! file or a network share that blinks. Anything that still fails is returned
//! to the caller unchanged.
//!
//! ## Features
//!
//! - STORED and DEFLATE entries, ZIP64 archives
//! - Modification times from the DOS fields or the extended timestamp field
//! - Configurable retry policy with an injectable sleep for tests
//!
//! ## Example
//!
//! ```no_run
//! fn main() -> anyhow::Result<()> {
//!     let stats = retryzip::extract("package.zip", "out")?;
//!     println!("{} files, {} directories", stats.files, stats.directories);
//!     Ok(())
//! }
//! ```
//!
//! Entry names are used verbatim. An archive with `../` in its names can
//! write outside the destination; vet untrusted archives before extracting.

pub mod cli;
pub mod extract;
pub mod io;
pub mod retry;
pub mod zip;

pub use cli::Cli;
pub use extract::{ExtractStats, Extractor, extract};
pub use io::{LocalFileReader, ReadAt, SectionReader};
pub use retry::{Retry, RetryPolicy, Sleep, ThreadSleep, with_retries};
pub use self::zip::{ZipArchive, ZipFileEntry};
