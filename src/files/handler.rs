//! File handler trait
//!
//! This module defines the trait that all file format handlers implement,
//! giving the image layer one interface for reading and writing embedded
//! metadata across formats.

use crate::core::error::Result;
use crate::core::metadata::Metadata;
use std::io::{Read, Seek, Write};

/// Trait for file format handlers
///
/// A handler knows how one container format stores its metadata: where the
/// EXIF, IPTC and XMP payloads live, where the pixel dimensions are, and
/// where an ICC profile would be embedded.
pub trait FileHandler: Send + Sync {
    /// Check if this handler can handle the given file
    ///
    /// Peeks at the file header to decide whether it matches the expected
    /// format. Must leave the reader at its original position.
    fn can_handle<R: Read + Seek>(&self, reader: &mut R) -> Result<bool>;

    /// Read all metadata from a file
    ///
    /// Returns the three family containers (possibly empty), the pixel
    /// dimensions and the ICC profile when one is embedded. A structurally
    /// broken file or a broken metadata payload is an error; a file that
    /// simply carries no metadata is not.
    fn read_metadata<R: Read + Seek>(&self, reader: &mut R) -> Result<Metadata>;

    /// Write metadata back to a file
    ///
    /// Copies the source stream to `writer`, replacing the embedded
    /// metadata with the containers in `meta`. Handlers that do not support
    /// writing return [`crate::core::error::Error::NotSupported`].
    fn write_metadata<R: Read + Seek, W: Write + Seek>(
        &self,
        reader: &mut R,
        writer: &mut W,
        meta: &Metadata,
    ) -> Result<()>;

    /// Get the name of the file format this handler supports
    fn format_name(&self) -> &'static str;

    /// Get the file extensions this handler supports
    fn extensions(&self) -> &'static [&'static str];
}
