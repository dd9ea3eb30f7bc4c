//! ZIP archive parsing and extraction.
//!
//! Amplitude export archives are plain ZIP files read from the end:
//! the End of Central Directory (EOCD) record locates the Central
//! Directory, which holds the metadata for every member; each member's
//! data offset is then resolved through its Local File Header.
//!
//! Supported: standard ZIP and ZIP64 archives, STORED and DEFLATE
//! entries. Not supported (and not produced by the export endpoint):
//! encryption, multi-disk archives, other compression methods.

mod extractor;
mod parser;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use structures::*;

use thiserror::Error;

/// Failures while reading a ZIP archive.
#[derive(Debug, Error)]
pub enum ZipError {
    /// The bytes do not form a readable ZIP structure.
    #[error("not a valid ZIP archive: {0}")]
    Malformed(&'static str),

    /// An entry uses a compression method this reader does not handle.
    #[error("entry '{name}' uses unsupported compression method {method}")]
    UnsupportedCompression { name: String, method: u16 },

    /// Decompressed entry data does not match the recorded checksum.
    #[error("CRC mismatch for entry '{0}'")]
    ChecksumMismatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
