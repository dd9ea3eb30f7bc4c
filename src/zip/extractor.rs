use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::io::ReadAt;

use super::ZipError;
use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipFileEntry};

/// High-level ZIP member extractor
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all entries in the archive
    pub async fn list_entries(&self) -> Result<Vec<ZipFileEntry>, ZipError> {
        self.parser.list_entries().await
    }

    /// Extract one entry's decompressed data into memory.
    ///
    /// Handles STORED and DEFLATE entries and verifies the decompressed
    /// bytes against the Central Directory checksum.
    pub async fn extract_to_memory(&self, entry: &ZipFileEntry) -> Result<Vec<u8>, ZipError> {
        let data_offset = self.parser.data_offset(entry).await?;

        let mut compressed = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_at(data_offset, &mut compressed)
            .await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => compressed,
            CompressionMethod::Deflate => {
                let mut decoder = DeflateDecoder::new(compressed.as_slice());
                let mut out = Vec::with_capacity(entry.uncompressed_size as usize);
                decoder.read_to_end(&mut out)?;
                out
            }
            CompressionMethod::Unknown(method) => {
                return Err(ZipError::UnsupportedCompression {
                    name: entry.file_name.clone(),
                    method,
                });
            }
        };

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            return Err(ZipError::ChecksumMismatch(entry.file_name.clone()));
        }

        Ok(data)
    }

    /// Extract one entry to disk, creating parent directories as needed
    pub async fn extract_to_file(
        &self,
        entry: &ZipFileEntry,
        output_path: &Path,
    ) -> Result<(), ZipError> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let data = self.extract_to_memory(entry).await?;

        let mut file = fs::File::create(output_path).await?;
        file.write_all(&data).await?;

        Ok(())
    }
}
