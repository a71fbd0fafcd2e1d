//! Shared test fixtures
//!
//! In-memory image builders used across the integration tests. The JPEG is
//! minimal but structurally complete: frame header, scan header, scan data
//! and end marker, so the metadata writer has a real stream to copy.

// Each integration test crate compiles its own copy; not all of them use
// every builder.
#![allow(dead_code)]

use metakit::{Container, Datum, Family, MetaKey, Value};

/// A minimal JPEG: SOI, SOF0 (32x16), SOS, scan bytes, EOI.
pub fn minimal_jpeg() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x10, 0x00, 0x20, 0x01]);
    data.extend_from_slice(&[0x01, 0x11, 0x00]);
    data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x08, 0x01, 0x01, 0x00, 0x00, 0x3F, 0x00]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

/// A JPEG whose XMP holds one bag entry and one plain text entry.
pub fn jpeg_with_xmp_bag() -> Vec<u8> {
    let mut xmp = Container::xmp();
    xmp.set(Datum::new(
        MetaKey::parse("Xmp.dc.subject", Family::Xmp).unwrap(),
        Value::XmpBag(vec!["alpha".into(), "beta".into(), "gamma".into()]),
    ));
    xmp.set(Datum::new(
        MetaKey::parse("Xmp.dc.title", Family::Xmp).unwrap(),
        Value::XmpText("Scalar Title".into()),
    ));
    jpeg_with_metadata(None, None, Some(&xmp))
}

/// Build a JPEG embedding the given containers.
pub fn jpeg_with_metadata(
    exif: Option<&Container>,
    iptc: Option<&Container>,
    xmp: Option<&Container>,
) -> Vec<u8> {
    let mut img = metakit::Image::open_bytes(&minimal_jpeg()).unwrap();
    img.read_metadata().unwrap();
    if let Some(exif) = exif {
        *img.exif_data_mut() = exif.clone();
    }
    if let Some(iptc) = iptc {
        *img.iptc_data_mut() = iptc.clone();
    }
    if let Some(xmp) = xmp {
        *img.xmp_data_mut() = xmp.clone();
    }
    img.write_metadata().unwrap();
    img.bytes().to_vec()
}

/// A minimal PNG (64x48) with optional extra chunks before IEND.
pub fn minimal_png(extra_chunks: &[Vec<u8>]) -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    let mut ihdr = Vec::new();
    ihdr.extend_from_slice(&64u32.to_be_bytes());
    ihdr.extend_from_slice(&48u32.to_be_bytes());
    ihdr.extend_from_slice(&[8, 0, 0, 0, 0]);
    data.extend_from_slice(&png_chunk(b"IHDR", &ihdr));
    for extra in extra_chunks {
        data.extend_from_slice(extra);
    }
    data.extend_from_slice(&png_chunk(b"IEND", &[]));
    data
}

/// A PNG chunk with a placeholder CRC (reads do not verify it).
pub fn png_chunk(chunk_type: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    out.extend_from_slice(&[0, 0, 0, 0]);
    out
}
