//! JPEG file format handler
//!
//! Reads and writes embedded metadata in JPEG files:
//! - EXIF in an APP1 segment with the `Exif\0\0` signature (TIFF payload)
//! - XMP in an APP1 segment with the XMP namespace signature
//! - IPTC in an APP13 segment with the `Photoshop 3.0\0` signature (IRB)
//! - ICC profile chunks in APP2 segments with the `ICC_PROFILE\0` signature
//! - pixel dimensions from the SOF frame header
//!
//! Writing rewrites the metadata segments after any leading JFIF APP0 and
//! copies everything else through untouched, including the scan data.

use crate::codec::{exif, iptc, xmp};
use crate::core::error::{Error, Result};
use crate::core::metadata::Metadata;
use crate::files::handler::FileHandler;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};

/// JPEG segment markers
const MARKER_SOI: u8 = 0xD8; // Start of Image
const MARKER_APP0: u8 = 0xE0;
const MARKER_APP1: u8 = 0xE1;
const MARKER_APP2: u8 = 0xE2;
const MARKER_APP13: u8 = 0xED;
const MARKER_SOS: u8 = 0xDA; // Start of Scan
const MARKER_EOI: u8 = 0xD9; // End of Image
const MARKER_DHT: u8 = 0xC4;
const MARKER_JPG: u8 = 0xC8;
const MARKER_DAC: u8 = 0xCC;

/// Segment signatures
const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";
const XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const EXTENDED_XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xap/1.0/ext/\0";
const PHOTOSHOP_SIGNATURE: &[u8] = b"Photoshop 3.0\0";
const ICC_SIGNATURE: &[u8] = b"ICC_PROFILE\0";

/// Maximum segment payload (64KB minus the 2 length bytes)
const MAX_SEGMENT_PAYLOAD: usize = 65533;

/// JPEG file handler
#[derive(Debug, Clone, Copy)]
pub struct JpegHandler;

impl FileHandler for JpegHandler {
    /// Check for the SOI marker and a plausible second marker.
    fn can_handle<R: Read + Seek>(&self, reader: &mut R) -> Result<bool> {
        let pos = reader.stream_position()?;
        let mut buffer = [0u8; 32];
        let bytes_read = reader.read(&mut buffer)?;
        reader.seek(SeekFrom::Start(pos))?;

        if bytes_read < 2 || buffer[0] != 0xFF || buffer[1] != MARKER_SOI {
            return Ok(false);
        }

        // Skip 0xFF padding, then sanity-check the second marker id.
        let mut i = 2;
        while i < bytes_read && buffer[i] == 0xFF {
            i += 1;
        }
        if i >= bytes_read {
            return Ok(true);
        }
        let id = buffer[i];
        if id >= 0xDD {
            return Ok(true);
        }
        // Standalone markers and anything below the frame range cannot
        // follow SOI.
        if id < 0xC0 || (id & 0xF8) == 0xD0 || id == MARKER_SOI || id == MARKER_SOS || id == 0xDC
        {
            return Ok(false);
        }
        Ok(true)
    }

    fn read_metadata<R: Read + Seek>(&self, reader: &mut R) -> Result<Metadata> {
        Self::read_metadata(reader)
    }

    fn write_metadata<R: Read + Seek, W: Write + Seek>(
        &self,
        reader: &mut R,
        writer: &mut W,
        meta: &Metadata,
    ) -> Result<()> {
        Self::write_metadata(reader, writer, meta)
    }

    fn format_name(&self) -> &'static str {
        "JPEG"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["jpg", "jpeg"]
    }
}

impl JpegHandler {
    /// Read all metadata out of a JPEG stream.
    pub fn read_metadata<R: Read + Seek>(mut reader: R) -> Result<Metadata> {
        Self::expect_soi(&mut reader)?;

        let mut meta = Metadata::new();
        let mut icc_chunks: Vec<(u8, Vec<u8>)> = Vec::new();

        loop {
            let marker = match Self::find_marker(&mut reader) {
                Ok(m) => m,
                Err(e) if is_eof(&e) => break,
                Err(e) => return Err(e),
            };
            if marker == MARKER_SOS || marker == MARKER_EOI {
                break;
            }

            let data = Self::read_segment(&mut reader)?;
            match marker {
                MARKER_APP1 if data.starts_with(EXIF_SIGNATURE) => {
                    meta.exif = exif::decode(&data[EXIF_SIGNATURE.len()..])?;
                }
                MARKER_APP1 if data.starts_with(XMP_SIGNATURE) => {
                    let packet = String::from_utf8_lossy(&data[XMP_SIGNATURE.len()..]);
                    meta.xmp = xmp::parse_packet(&packet)?;
                }
                MARKER_APP13 if data.starts_with(PHOTOSHOP_SIGNATURE) => {
                    meta.iptc = iptc::decode_irb(&data[PHOTOSHOP_SIGNATURE.len()..])?;
                }
                MARKER_APP2 if data.starts_with(ICC_SIGNATURE) => {
                    // chunk sequence number and chunk count follow the
                    // signature; profiles larger than one segment span
                    // several chunks
                    if data.len() > ICC_SIGNATURE.len() + 2 {
                        let seq = data[ICC_SIGNATURE.len()];
                        icc_chunks
                            .push((seq, data[ICC_SIGNATURE.len() + 2..].to_vec()));
                    }
                }
                m if is_sof_marker(m) => {
                    if data.len() >= 5 {
                        meta.pixel_height = u16::from_be_bytes([data[1], data[2]]) as u32;
                        meta.pixel_width = u16::from_be_bytes([data[3], data[4]]) as u32;
                    }
                }
                _ => {}
            }
        }

        if !icc_chunks.is_empty() {
            icc_chunks.sort_by_key(|(seq, _)| *seq);
            let mut profile = Vec::new();
            for (_, chunk) in icc_chunks {
                profile.extend_from_slice(&chunk);
            }
            meta.icc_profile = Some(profile);
        }

        Ok(meta)
    }

    /// Write metadata into a copy of a JPEG stream.
    pub fn write_metadata<R: Read + Seek, W: Write + Seek>(
        mut reader: R,
        mut writer: W,
        meta: &Metadata,
    ) -> Result<()> {
        // Existing Photoshop IRB payload, so foreign resource blocks
        // (resolution info, thumbnails) survive the IPTC rewrite.
        let previous_irb = Self::find_irb_payload(&mut reader)?;
        reader.seek(SeekFrom::Start(0))?;

        let exif_segment = if meta.exif.is_empty() {
            None
        } else {
            let mut seg = EXIF_SIGNATURE.to_vec();
            seg.extend_from_slice(&exif::encode(&meta.exif)?);
            Some(seg)
        };
        let xmp_segment = if meta.xmp.is_empty() {
            None
        } else {
            let mut seg = XMP_SIGNATURE.to_vec();
            seg.extend_from_slice(xmp::serialize_packet(&meta.xmp)?.as_bytes());
            Some(seg)
        };
        let iptc_segment = if meta.iptc.is_empty() && previous_irb.is_none() {
            None
        } else {
            let mut seg = PHOTOSHOP_SIGNATURE.to_vec();
            seg.extend_from_slice(&iptc::encode_irb(&meta.iptc, previous_irb.as_deref())?);
            Some(seg)
        };

        for segment in [&exif_segment, &xmp_segment, &iptc_segment]
            .into_iter()
            .flatten()
        {
            if segment.len() > MAX_SEGMENT_PAYLOAD {
                return Err(Error::WriteError(
                    "metadata segment exceeds the 64KB JPEG segment limit".to_string(),
                ));
            }
        }

        Self::expect_soi(&mut reader)?;
        writer.write_all(&[0xFF, MARKER_SOI])?;

        // Keep any leading JFIF APP0 segments first, as writers conventionally do.
        loop {
            let marker = match Self::find_marker(&mut reader) {
                Ok(m) => m,
                Err(e) if is_eof(&e) => break,
                Err(e) => return Err(e),
            };
            if marker != MARKER_APP0 {
                reader.seek(SeekFrom::Current(-2))?;
                break;
            }
            let data = Self::read_segment(&mut reader)?;
            Self::write_segment(&mut writer, MARKER_APP0, &data)?;
        }

        if let Some(segment) = &exif_segment {
            Self::write_segment(&mut writer, MARKER_APP1, segment)?;
        }
        if let Some(segment) = &xmp_segment {
            Self::write_segment(&mut writer, MARKER_APP1, segment)?;
        }
        if let Some(segment) = &iptc_segment {
            Self::write_segment(&mut writer, MARKER_APP13, segment)?;
        }

        // Copy the remaining segments, dropping the stale metadata ones.
        loop {
            let marker = match Self::find_marker(&mut reader) {
                Ok(m) => m,
                Err(e) if is_eof(&e) => break,
                Err(e) => return Err(e),
            };
            if marker == MARKER_SOS || marker == MARKER_EOI {
                reader.seek(SeekFrom::Current(-2))?;
                break;
            }

            let data = Self::read_segment(&mut reader)?;
            let stale = match marker {
                MARKER_APP1 => {
                    data.starts_with(EXIF_SIGNATURE)
                        || data.starts_with(XMP_SIGNATURE)
                        || data.starts_with(EXTENDED_XMP_SIGNATURE)
                }
                MARKER_APP13 => data.starts_with(PHOTOSHOP_SIGNATURE),
                _ => false,
            };
            if !stale {
                Self::write_segment(&mut writer, marker, &data)?;
            }
        }

        // Scan data and everything after it, verbatim.
        let mut buffer = [0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            writer.write_all(&buffer[..n])?;
        }

        Ok(())
    }

    /// Locate an existing APP13 Photoshop payload (bytes after the
    /// signature), if any.
    fn find_irb_payload<R: Read + Seek>(reader: &mut R) -> Result<Option<Vec<u8>>> {
        reader.seek(SeekFrom::Start(0))?;
        Self::expect_soi(reader)?;

        loop {
            let marker = match Self::find_marker(reader) {
                Ok(m) => m,
                Err(e) if is_eof(&e) => return Ok(None),
                Err(e) => return Err(e),
            };
            if marker == MARKER_SOS || marker == MARKER_EOI {
                return Ok(None);
            }
            let data = Self::read_segment(reader)?;
            if marker == MARKER_APP13 && data.starts_with(PHOTOSHOP_SIGNATURE) {
                return Ok(Some(data[PHOTOSHOP_SIGNATURE.len()..].to_vec()));
            }
        }
    }

    fn expect_soi<R: Read>(reader: &mut R) -> Result<()> {
        let mut header = [0u8; 2];
        reader.read_exact(&mut header)?;
        if header[0] != 0xFF || header[1] != MARKER_SOI {
            return Err(Error::ParseError("not a valid JPEG file".to_string()));
        }
        Ok(())
    }

    /// Find the next JPEG marker, skipping fill bytes and stuffing.
    fn find_marker<R: Read>(reader: &mut R) -> Result<u8> {
        let mut buffer = [0u8; 1];
        loop {
            reader.read_exact(&mut buffer)?;
            if buffer[0] == 0xFF {
                reader.read_exact(&mut buffer)?;
                if buffer[0] != 0x00 && buffer[0] != 0xFF {
                    return Ok(buffer[0]);
                }
            }
        }
    }

    /// Read one segment's payload (its length bytes excluded).
    fn read_segment<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
        let mut length_bytes = [0u8; 2];
        reader.read_exact(&mut length_bytes)?;
        let length = u16::from_be_bytes(length_bytes) as usize;
        if length < 2 {
            return Err(Error::ParseError("invalid JPEG segment length".to_string()));
        }
        let mut data = vec![0u8; length - 2];
        reader.read_exact(&mut data)?;
        Ok(data)
    }

    fn write_segment<W: Write>(writer: &mut W, marker: u8, payload: &[u8]) -> Result<()> {
        writer.write_all(&[0xFF, marker])?;
        writer.write_all(&((payload.len() + 2) as u16).to_be_bytes())?;
        writer.write_all(payload)?;
        Ok(())
    }
}

/// Frame headers carrying the image dimensions.
fn is_sof_marker(marker: u8) -> bool {
    (0xC0..=0xCF).contains(&marker)
        && marker != MARKER_DHT
        && marker != MARKER_JPG
        && marker != MARKER_DAC
}

fn is_eof(e: &Error) -> bool {
    matches!(e, Error::Io(io) if io.kind() == ErrorKind::UnexpectedEof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// SOI + SOF0 (32x16) + SOS + minimal scan + EOI
    fn minimal_jpeg() -> Vec<u8> {
        let mut data = vec![0xFF, MARKER_SOI];
        // SOF0: len 11, precision 8, height 16, width 32, 1 component
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x10, 0x00, 0x20, 0x01]);
        data.extend_from_slice(&[0x01, 0x11, 0x00]);
        // SOS: len 8, 1 component
        data.extend_from_slice(&[0xFF, MARKER_SOS, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
        data.extend_from_slice(&[0xFF, MARKER_EOI]);
        data
    }

    #[test]
    fn read_dimensions_from_sof() {
        let meta = JpegHandler::read_metadata(Cursor::new(minimal_jpeg())).unwrap();
        assert_eq!(meta.pixel_width, 32);
        assert_eq!(meta.pixel_height, 16);
        assert!(meta.exif.is_empty());
        assert!(meta.icc_profile.is_none());
    }

    #[test]
    fn reject_non_jpeg() {
        let result = JpegHandler::read_metadata(Cursor::new(vec![0x00, 0x01, 0x02, 0x03]));
        assert!(result.is_err());
    }

    #[test]
    fn write_and_read_back_all_families() {
        let mut meta = Metadata::new();
        meta.exif.set_string("Exif.Image.Make", "Acme").unwrap();
        meta.iptc
            .set_string("Iptc.Application2.Caption", "hello")
            .unwrap();
        meta.xmp.set_string("Xmp.dc.title", "Title").unwrap();

        let mut out = Cursor::new(Vec::new());
        JpegHandler::write_metadata(Cursor::new(minimal_jpeg()), &mut out, &meta).unwrap();

        out.set_position(0);
        let read_back = JpegHandler::read_metadata(&mut out).unwrap();
        assert_eq!(
            read_back.exif.find_key("Exif.Image.Make").unwrap().unwrap().to_text(),
            "Acme"
        );
        assert_eq!(
            read_back
                .iptc
                .find_key("Iptc.Application2.Caption")
                .unwrap()
                .unwrap()
                .to_text(),
            "hello"
        );
        assert_eq!(
            read_back.xmp.find_key("Xmp.dc.title").unwrap().unwrap().to_text(),
            "Title"
        );
        // The frame header survives the rewrite
        assert_eq!(read_back.pixel_width, 32);
    }

    #[test]
    fn rewrite_replaces_stale_metadata() {
        let mut first = Metadata::new();
        first.exif.set_string("Exif.Image.Make", "Old").unwrap();
        let mut once = Cursor::new(Vec::new());
        JpegHandler::write_metadata(Cursor::new(minimal_jpeg()), &mut once, &first).unwrap();

        let mut second = Metadata::new();
        second.exif.set_string("Exif.Image.Make", "New").unwrap();
        once.set_position(0);
        let mut twice = Cursor::new(Vec::new());
        JpegHandler::write_metadata(&mut once, &mut twice, &second).unwrap();

        twice.set_position(0);
        let read_back = JpegHandler::read_metadata(&mut twice).unwrap();
        assert_eq!(read_back.exif.len(), 1);
        assert_eq!(
            read_back.exif.find_key("Exif.Image.Make").unwrap().unwrap().to_text(),
            "New"
        );
    }

    #[test]
    fn icc_profile_chunks_reassemble() {
        // Build a JPEG with two APP2 ICC chunks out of order
        let mut data = vec![0xFF, MARKER_SOI];
        let mut chunk = |seq: u8, payload: &[u8]| {
            let mut seg = ICC_SIGNATURE.to_vec();
            seg.push(seq);
            seg.push(2); // chunk count
            seg.extend_from_slice(payload);
            let mut bytes = vec![0xFF, MARKER_APP2];
            bytes.extend_from_slice(&((seg.len() + 2) as u16).to_be_bytes());
            bytes.extend_from_slice(&seg);
            bytes
        };
        data.extend_from_slice(&chunk(2, b"world"));
        data.extend_from_slice(&chunk(1, b"hello "));
        data.extend_from_slice(&[0xFF, MARKER_EOI]);

        let meta = JpegHandler::read_metadata(Cursor::new(data)).unwrap();
        assert_eq!(meta.icc_profile.as_deref(), Some(&b"hello world"[..]));
    }
}
