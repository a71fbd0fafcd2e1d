//! File handler registry
//!
//! This module provides a registry for the enabled file format handlers and
//! format detection over a readable stream.

use crate::core::error::Result;
use crate::core::metadata::Metadata;
use crate::files::handler::FileHandler;
use std::io::{Read, Seek, Write};

/// Enum of supported file handlers
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum Handler {
    #[cfg(feature = "jpeg")]
    Jpeg(crate::files::formats::jpeg::JpegHandler),
    #[cfg(feature = "png")]
    Png(crate::files::formats::png::PngHandler),
}

impl FileHandler for Handler {
    fn can_handle<R: Read + Seek>(&self, reader: &mut R) -> Result<bool> {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => h.can_handle(reader),
            #[cfg(feature = "png")]
            Handler::Png(h) => h.can_handle(reader),
        }
    }

    fn read_metadata<R: Read + Seek>(&self, reader: &mut R) -> Result<Metadata> {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => FileHandler::read_metadata(h, reader),
            #[cfg(feature = "png")]
            Handler::Png(h) => FileHandler::read_metadata(h, reader),
        }
    }

    fn write_metadata<R: Read + Seek, W: Write + Seek>(
        &self,
        reader: &mut R,
        writer: &mut W,
        meta: &Metadata,
    ) -> Result<()> {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => FileHandler::write_metadata(h, reader, writer, meta),
            #[cfg(feature = "png")]
            Handler::Png(h) => FileHandler::write_metadata(h, reader, writer, meta),
        }
    }

    fn format_name(&self) -> &'static str {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => h.format_name(),
            #[cfg(feature = "png")]
            Handler::Png(h) => h.format_name(),
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "jpeg")]
            Handler::Jpeg(h) => h.extensions(),
            #[cfg(feature = "png")]
            Handler::Png(h) => h.extensions(),
        }
    }
}

/// Registry for file format handlers
pub struct HandlerRegistry {
    handlers: Vec<Handler>,
}

impl HandlerRegistry {
    /// Create a new handler registry with default handlers registered
    pub fn new() -> Self {
        let mut registry = Self {
            handlers: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    /// Register a file handler
    pub fn register(&mut self, handler: Handler) {
        self.handlers.push(handler);
    }

    fn register_defaults(&mut self) {
        #[cfg(feature = "jpeg")]
        self.register(Handler::Jpeg(crate::files::formats::jpeg::JpegHandler));
        #[cfg(feature = "png")]
        self.register(Handler::Png(crate::files::formats::png::PngHandler));
    }

    /// Find a handler by file extension
    pub fn find_by_extension(&self, extension: &str) -> Option<&Handler> {
        let ext_lower = extension.to_lowercase();
        self.handlers
            .iter()
            .find(|h| h.extensions().iter().any(|e| *e == ext_lower))
    }

    /// Find a handler by format detection
    ///
    /// Tries each registered handler's `can_handle` and restores the reader
    /// position afterwards.
    pub fn find_by_detection<R: Read + Seek>(&self, reader: &mut R) -> Result<Option<&Handler>> {
        let saved_pos = reader.stream_position()?;

        for handler in &self.handlers {
            reader.seek(std::io::SeekFrom::Start(saved_pos))?;
            if handler.can_handle(reader)? {
                reader.seek(std::io::SeekFrom::Start(saved_pos))?;
                return Ok(Some(handler));
            }
        }

        reader.seek(std::io::SeekFrom::Start(saved_pos))?;
        Ok(None)
    }

    /// Get all registered handlers
    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Default registry instance
pub fn default_registry() -> HandlerRegistry {
    HandlerRegistry::new()
}
