//! ZIP archive parsing and reading.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures from raw bytes
//! - [`archive`]: An opened archive handing out streaming entry readers
//!
//! The EOCD record is read first (from the end of the file), then the
//! Central Directory, whose order is the enumeration order used everywhere
//! else in the crate.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED and DEFLATE compression methods
//! - Extended timestamp extra field (0x5455)
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod archive;
mod parser;
mod structures;

pub use archive::{EntryReader, ZipArchive};
pub use parser::ZipParser;
pub use structures::*;
