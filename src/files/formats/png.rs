//! PNG file format handler
//!
//! Read-only: PNG metadata lives in CRC-protected chunks, and this handler
//! does not rewrite chunk checksums. Reads cover:
//! - pixel dimensions from `IHDR`
//! - EXIF from the `eXIf` chunk (raw TIFF payload)
//! - XMP from an `iTXt` chunk with the `XML:com.adobe.xmp` keyword
//!
//! IPTC has no standard PNG mapping and `iCCP` profiles are deflate
//! compressed; both stay unmapped, so the IPTC container is empty and the
//! ICC profile reads as absent.

use crate::codec::{exif, xmp};
use crate::core::error::{Error, Result};
use crate::core::metadata::Metadata;
use crate::files::handler::FileHandler;
use std::io::{Read, Seek, SeekFrom, Write};

/// PNG file signature
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// XMP keyword in iTXt chunks
const XMP_KEYWORD: &[u8] = b"XML:com.adobe.xmp";

/// PNG file handler
#[derive(Debug, Clone, Copy)]
pub struct PngHandler;

impl FileHandler for PngHandler {
    fn can_handle<R: Read + Seek>(&self, reader: &mut R) -> Result<bool> {
        let pos = reader.stream_position()?;
        let mut signature = [0u8; 8];
        let bytes_read = reader.read(&mut signature)?;
        reader.seek(SeekFrom::Start(pos))?;
        Ok(bytes_read == 8 && signature == PNG_SIGNATURE)
    }

    fn read_metadata<R: Read + Seek>(&self, reader: &mut R) -> Result<Metadata> {
        Self::read_metadata(reader)
    }

    fn write_metadata<R: Read + Seek, W: Write + Seek>(
        &self,
        _reader: &mut R,
        _writer: &mut W,
        _meta: &Metadata,
    ) -> Result<()> {
        Err(Error::NotSupported(
            "writing PNG metadata is not supported".to_string(),
        ))
    }

    fn format_name(&self) -> &'static str {
        "PNG"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["png"]
    }
}

impl PngHandler {
    /// Read all metadata out of a PNG stream.
    pub fn read_metadata<R: Read + Seek>(mut reader: R) -> Result<Metadata> {
        let mut signature = [0u8; 8];
        reader.read_exact(&mut signature)?;
        if signature != PNG_SIGNATURE {
            return Err(Error::ParseError("not a valid PNG file".to_string()));
        }

        let mut meta = Metadata::new();

        loop {
            let mut header = [0u8; 8];
            if reader.read_exact(&mut header).is_err() {
                // Truncated after the last chunk; take what we have.
                break;
            }
            let length = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
            let chunk_type = [header[4], header[5], header[6], header[7]];

            if &chunk_type == b"IEND" {
                break;
            }

            // Scan data is bulky and carries nothing for us.
            if &chunk_type == b"IDAT" {
                reader.seek(SeekFrom::Current(length as i64 + 4))?;
                continue;
            }

            let mut data = vec![0u8; length];
            reader.read_exact(&mut data)?;
            // CRC, unchecked
            reader.seek(SeekFrom::Current(4))?;

            match &chunk_type {
                b"IHDR" => {
                    if data.len() >= 8 {
                        meta.pixel_width =
                            u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
                        meta.pixel_height =
                            u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
                    }
                }
                b"eXIf" => {
                    meta.exif = exif::decode(&data)?;
                }
                b"iTXt" => {
                    if let Some(packet) = Self::xmp_from_itxt(&data) {
                        meta.xmp = xmp::parse_packet(&packet)?;
                    }
                }
                _ => {}
            }
        }

        Ok(meta)
    }

    /// Extract an uncompressed XMP packet from an iTXt chunk payload.
    ///
    /// iTXt layout: keyword NUL, compression flag, compression method,
    /// language tag NUL, translated keyword NUL, text.
    fn xmp_from_itxt(data: &[u8]) -> Option<String> {
        let keyword_end = data.iter().position(|&b| b == 0)?;
        if &data[..keyword_end] != XMP_KEYWORD {
            return None;
        }
        let rest = &data[keyword_end + 1..];
        let (&compression_flag, rest) = rest.split_first()?;
        let (_, rest) = rest.split_first()?; // compression method
        if compression_flag != 0 {
            return None;
        }
        let lang_end = rest.iter().position(|&b| b == 0)?;
        let rest = &rest[lang_end + 1..];
        let translated_end = rest.iter().position(|&b| b == 0)?;
        let text = &rest[translated_end + 1..];
        Some(String::from_utf8_lossy(text).into_owned())
    }
}
