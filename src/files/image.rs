//! Image lifecycle
//!
//! An [`Image`] owns one decoded image source (a file on disk or an
//! in-memory buffer), the handler detected for its format, and the metadata
//! parsed out of it. Opening recognizes the format but does not parse
//! metadata; call [`Image::read_metadata`] first, accessors return empty
//! containers and zero dimensions until then.

use crate::core::container::Container;
use crate::core::error::{Error, Result};
use crate::core::metadata::Metadata;
use crate::files::handler::FileHandler;
use crate::files::registry::{default_registry, Handler};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// One open image and its metadata.
#[derive(Debug)]
pub struct Image {
    /// Backing file, when the image was opened from a path.
    path: Option<PathBuf>,
    /// Current encoded image bytes. Metadata writes rewrite this buffer.
    data: Vec<u8>,
    handler: Handler,
    metadata: Metadata,
}

impl Image {
    /// Open an image file from the filesystem.
    ///
    /// Recognizes the format but does not read the metadata; call
    /// [`Image::read_metadata`] to parse it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let handler = Self::detect(&data)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            data,
            handler,
            metadata: Metadata::new(),
        })
    }

    /// Open an image from an in-memory buffer.
    ///
    /// Recognizes the format but does not read the metadata; call
    /// [`Image::read_metadata`] to parse it.
    pub fn open_bytes(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::BadValue("input is empty".to_string()));
        }
        let handler = Self::detect(data)?;
        Ok(Self {
            path: None,
            data: data.to_vec(),
            handler,
            metadata: Metadata::new(),
        })
    }

    fn detect(data: &[u8]) -> Result<Handler> {
        let registry = default_registry();
        let mut reader = Cursor::new(data);
        registry
            .find_by_detection(&mut reader)?
            .copied()
            .ok_or_else(|| {
                Error::UnknownFormat("image format not recognized".to_string())
            })
    }

    /// Parse the embedded metadata.
    ///
    /// On failure the image itself stays valid: the previously parsed
    /// metadata (possibly none) is kept and the call may be retried.
    pub fn read_metadata(&mut self) -> Result<()> {
        let mut reader = Cursor::new(&self.data);
        self.metadata = self.handler.read_metadata(&mut reader)?;
        Ok(())
    }

    /// Serialize the current in-memory containers back into the image and,
    /// for path-backed images, rewrite the file on disk.
    pub fn write_metadata(&mut self) -> Result<()> {
        let mut reader = Cursor::new(&self.data);
        let mut writer = Cursor::new(Vec::new());
        self.handler
            .write_metadata(&mut reader, &mut writer, &self.metadata)?;
        self.data = writer.into_inner();
        if let Some(path) = &self.path {
            std::fs::write(path, &self.data)?;
        }
        Ok(())
    }

    /// Merge one string-typed EXIF entry and persist immediately.
    ///
    /// The container update and the write-back are two steps: when the
    /// write fails after the update succeeded, the in-memory container and
    /// the persisted image diverge. There is no rollback.
    pub fn set_exif_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.metadata.exif.set_string(key, value)?;
        self.write_metadata()
    }

    /// Merge one string-typed IPTC entry and persist immediately.
    ///
    /// Same two-step contract as [`Image::set_exif_string`].
    pub fn set_iptc_string(&mut self, key: &str, value: &str) -> Result<()> {
        self.metadata.iptc.set_string(key, value)?;
        self.write_metadata()
    }

    /// Merge one short-typed EXIF entry (text form, parsed as u16) and
    /// persist immediately. Same two-step contract as
    /// [`Image::set_exif_string`].
    pub fn set_exif_short(&mut self, key: &str, value: &str) -> Result<()> {
        self.metadata.exif.set_short(key, value)?;
        self.write_metadata()
    }

    /// Merge one short-typed IPTC entry (text form, parsed as u16) and
    /// persist immediately. Same two-step contract as
    /// [`Image::set_exif_string`].
    pub fn set_iptc_short(&mut self, key: &str, value: &str) -> Result<()> {
        self.metadata.iptc.set_short(key, value)?;
        self.write_metadata()
    }

    /// Pixel width; 0 until metadata has been read.
    pub fn pixel_width(&self) -> u32 {
        self.metadata.pixel_width
    }

    /// Pixel height; 0 until metadata has been read.
    pub fn pixel_height(&self) -> u32 {
        self.metadata.pixel_height
    }

    /// Embedded ICC profile, `None` when the image carries none.
    pub fn icc_profile(&self) -> Option<&[u8]> {
        self.metadata.icc_profile.as_deref()
    }

    /// Current encoded image bytes; metadata writes are reflected here.
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Detected format name (e.g. "JPEG").
    pub fn format_name(&self) -> &'static str {
        self.handler.format_name()
    }

    pub fn exif_data(&self) -> &Container {
        &self.metadata.exif
    }

    pub fn iptc_data(&self) -> &Container {
        &self.metadata.iptc
    }

    pub fn xmp_data(&self) -> &Container {
        &self.metadata.xmp
    }

    pub fn exif_data_mut(&mut self) -> &mut Container {
        &mut self.metadata.exif
    }

    pub fn iptc_data_mut(&mut self) -> &mut Container {
        &mut self.metadata.iptc
    }

    pub fn xmp_data_mut(&mut self) -> &mut Container {
        &mut self.metadata.xmp
    }
}
