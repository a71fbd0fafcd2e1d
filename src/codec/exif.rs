//! EXIF payload codec
//!
//! Decodes and encodes the TIFF structure EXIF lives in: a byte-order
//! header, IFD0, and the Exif and GPS sub-IFDs reached through pointer tags.
//! Entry names come from a small registry of the common tags; entries
//! outside the registry keep their numeric identity as `0xNNNN` names, so
//! decoding never loses data.
//!
//! EXIF payload layout:
//! - 2 bytes byte order (`II` little-endian, `MM` big-endian)
//! - 2 bytes magic (42)
//! - 4 bytes offset of IFD0
//! - IFDs: entry count, 12-byte entries (tag, type, count, value-or-offset),
//!   next-IFD offset; values wider than 4 bytes live out-of-line.

use crate::core::container::Container;
use crate::core::datum::Datum;
use crate::core::error::{Error, Result};
use crate::types::key::{Family, MetaKey};
use crate::types::value::Value;

/// Pointer tag from IFD0 to the Exif sub-IFD
const TAG_EXIF_IFD: u16 = 0x8769;
/// Pointer tag from IFD0 to the GPS sub-IFD
const TAG_GPS_IFD: u16 = 0x8825;

/// TIFF field types
const TYPE_BYTE: u16 = 1;
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;
const TYPE_UNDEFINED: u16 = 7;

/// Group names, matching the key text (`Exif.<group>.<name>`)
const GROUP_IFD0: &str = "Image";
const GROUP_PHOTO: &str = "Photo";
const GROUP_GPS: &str = "GPSInfo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

struct TagDesc {
    tag: u16,
    name: &'static str,
}

macro_rules! tags {
    ($(($tag:expr, $name:expr)),* $(,)?) => {
        &[$(TagDesc { tag: $tag, name: $name }),*]
    };
}

/// Common IFD0 tags
const IFD0_TAGS: &[TagDesc] = tags![
    (0x0100, "ImageWidth"),
    (0x0101, "ImageLength"),
    (0x0102, "BitsPerSample"),
    (0x0103, "Compression"),
    (0x010e, "ImageDescription"),
    (0x010f, "Make"),
    (0x0110, "Model"),
    (0x0112, "Orientation"),
    (0x011a, "XResolution"),
    (0x011b, "YResolution"),
    (0x0128, "ResolutionUnit"),
    (0x0131, "Software"),
    (0x0132, "DateTime"),
    (0x013b, "Artist"),
    (0x8298, "Copyright"),
];

/// Common Exif sub-IFD tags
const PHOTO_TAGS: &[TagDesc] = tags![
    (0x829a, "ExposureTime"),
    (0x829d, "FNumber"),
    (0x8822, "ExposureProgram"),
    (0x8827, "ISOSpeedRatings"),
    (0x9000, "ExifVersion"),
    (0x9003, "DateTimeOriginal"),
    (0x9004, "DateTimeDigitized"),
    (0x9201, "ShutterSpeedValue"),
    (0x9202, "ApertureValue"),
    (0x9209, "Flash"),
    (0x920a, "FocalLength"),
    (0x9286, "UserComment"),
    (0xa001, "ColorSpace"),
    (0xa002, "PixelXDimension"),
    (0xa003, "PixelYDimension"),
    (0xa434, "LensModel"),
];

/// Common GPS sub-IFD tags
const GPS_TAGS: &[TagDesc] = tags![
    (0x0000, "GPSVersionID"),
    (0x0001, "GPSLatitudeRef"),
    (0x0002, "GPSLatitude"),
    (0x0003, "GPSLongitudeRef"),
    (0x0004, "GPSLongitude"),
    (0x0005, "GPSAltitudeRef"),
    (0x0006, "GPSAltitude"),
    (0x0007, "GPSTimeStamp"),
    (0x001d, "GPSDateStamp"),
];

fn registry_for(group: &str) -> Option<&'static [TagDesc]> {
    match group {
        GROUP_IFD0 => Some(IFD0_TAGS),
        GROUP_PHOTO => Some(PHOTO_TAGS),
        GROUP_GPS => Some(GPS_TAGS),
        _ => None,
    }
}

/// Tag id → name, falling back to the `0xNNNN` form.
fn tag_name(group: &str, tag: u16) -> String {
    registry_for(group)
        .and_then(|t| t.iter().find(|d| d.tag == tag))
        .map(|d| d.name.to_string())
        .unwrap_or_else(|| format!("0x{tag:04x}"))
}

/// Name → tag id; accepts the `0xNNNN` form for unregistered tags.
fn resolve_tag(group: &str, name: &str) -> Result<u16> {
    if let Some(hex) = name.strip_prefix("0x") {
        if let Ok(tag) = u16::from_str_radix(hex, 16) {
            return Ok(tag);
        }
    }
    registry_for(group)
        .ok_or_else(|| Error::BadKey(format!("unknown Exif group '{group}'")))?
        .iter()
        .find(|d| d.name == name)
        .map(|d| d.tag)
        .ok_or_else(|| Error::BadKey(format!("unknown Exif tag 'Exif.{group}.{name}'")))
}

fn type_size(typ: u16) -> usize {
    match typ {
        TYPE_BYTE | TYPE_ASCII | TYPE_UNDEFINED => 1,
        TYPE_SHORT => 2,
        TYPE_LONG => 4,
        TYPE_RATIONAL => 8,
        _ => 0,
    }
}

fn rd16(data: &[u8], pos: usize, bo: ByteOrder) -> Result<u16> {
    let bytes: [u8; 2] = data
        .get(pos..pos + 2)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::ParseError("Exif data truncated".to_string()))?;
    Ok(match bo {
        ByteOrder::Little => u16::from_le_bytes(bytes),
        ByteOrder::Big => u16::from_be_bytes(bytes),
    })
}

fn rd32(data: &[u8], pos: usize, bo: ByteOrder) -> Result<u32> {
    let bytes: [u8; 4] = data
        .get(pos..pos + 4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| Error::ParseError("Exif data truncated".to_string()))?;
    Ok(match bo {
        ByteOrder::Little => u32::from_le_bytes(bytes),
        ByteOrder::Big => u32::from_be_bytes(bytes),
    })
}

/// Decode a TIFF-structured EXIF payload into a container.
pub fn decode(data: &[u8]) -> Result<Container> {
    let mut container = Container::exif();
    if data.is_empty() {
        return Ok(container);
    }

    let bo = if data.starts_with(b"II") {
        ByteOrder::Little
    } else if data.starts_with(b"MM") {
        ByteOrder::Big
    } else {
        return Err(Error::ParseError("invalid TIFF byte order mark".to_string()));
    };
    if rd16(data, 2, bo)? != 42 {
        return Err(Error::ParseError("invalid TIFF magic".to_string()));
    }

    let ifd0_offset = rd32(data, 4, bo)? as usize;
    let mut exif_ifd = None;
    let mut gps_ifd = None;
    read_ifd(
        data,
        ifd0_offset,
        bo,
        GROUP_IFD0,
        &mut container,
        &mut exif_ifd,
        &mut gps_ifd,
    )?;

    // Pointer tags are only meaningful in IFD0; sub-IFD reads discard them.
    if let Some(offset) = exif_ifd {
        let (mut a, mut b) = (None, None);
        read_ifd(data, offset, bo, GROUP_PHOTO, &mut container, &mut a, &mut b)?;
    }
    if let Some(offset) = gps_ifd {
        let (mut a, mut b) = (None, None);
        read_ifd(data, offset, bo, GROUP_GPS, &mut container, &mut a, &mut b)?;
    }

    Ok(container)
}

#[allow(clippy::too_many_arguments)]
fn read_ifd(
    data: &[u8],
    offset: usize,
    bo: ByteOrder,
    group: &str,
    container: &mut Container,
    exif_ifd: &mut Option<usize>,
    gps_ifd: &mut Option<usize>,
) -> Result<()> {
    let count = rd16(data, offset, bo)? as usize;

    for i in 0..count {
        let entry = offset + 2 + i * 12;
        let tag = rd16(data, entry, bo)?;
        let typ = rd16(data, entry + 2, bo)?;
        let n = rd32(data, entry + 4, bo)? as usize;

        // Sub-IFD pointers are structure, not entries.
        if group == GROUP_IFD0 && tag == TAG_EXIF_IFD {
            *exif_ifd = Some(rd32(data, entry + 8, bo)? as usize);
            continue;
        }
        if group == GROUP_IFD0 && tag == TAG_GPS_IFD {
            *gps_ifd = Some(rd32(data, entry + 8, bo)? as usize);
            continue;
        }

        let unit = type_size(typ);
        if unit == 0 {
            // Unknown field type; nothing to decode safely.
            continue;
        }
        let size = unit
            .checked_mul(n)
            .ok_or_else(|| Error::ParseError("Exif entry size overflow".to_string()))?;
        let start = if size <= 4 {
            entry + 8
        } else {
            rd32(data, entry + 8, bo)? as usize
        };
        let bytes = data
            .get(start..start + size)
            .ok_or_else(|| Error::ParseError("Exif value out of bounds".to_string()))?;

        let value = decode_value(typ, n, bytes, bo)?;
        let key = MetaKey::from_parts(Family::Exif, group, &tag_name(group, tag));
        container.push(Datum::new(key, value));
    }

    Ok(())
}

fn decode_value(typ: u16, n: usize, bytes: &[u8], bo: ByteOrder) -> Result<Value> {
    Ok(match typ {
        TYPE_ASCII => {
            let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
            Value::Ascii(String::from_utf8_lossy(&bytes[..end]).into_owned())
        }
        TYPE_SHORT => {
            let mut v = Vec::with_capacity(n);
            for i in 0..n {
                v.push(rd16(bytes, i * 2, bo)?);
            }
            Value::UShort(v)
        }
        TYPE_LONG => {
            let mut v = Vec::with_capacity(n);
            for i in 0..n {
                v.push(rd32(bytes, i * 4, bo)?);
            }
            Value::ULong(v)
        }
        TYPE_RATIONAL => {
            let mut v = Vec::with_capacity(n);
            for i in 0..n {
                v.push((rd32(bytes, i * 8, bo)?, rd32(bytes, i * 8 + 4, bo)?));
            }
            Value::URational(v)
        }
        _ => Value::Undefined(bytes.to_vec()),
    })
}

struct RawEntry {
    tag: u16,
    typ: u16,
    count: usize,
    data: Vec<u8>,
}

/// Encode a container into a little-endian TIFF payload: IFD0, then the
/// Exif and GPS sub-IFDs when their groups have entries, then the
/// out-of-line value area. Entries are written in ascending tag order as
/// TIFF requires.
pub fn encode(container: &Container) -> Result<Vec<u8>> {
    let mut ifd0 = Vec::new();
    let mut photo = Vec::new();
    let mut gps = Vec::new();

    for datum in container {
        let group = datum.key().group();
        let tag = resolve_tag(group, datum.key().name())?;
        let (typ, count, data) = encode_value(datum)?;
        let entry = RawEntry {
            tag,
            typ,
            count,
            data,
        };
        match group {
            GROUP_IFD0 => ifd0.push(entry),
            GROUP_PHOTO => photo.push(entry),
            GROUP_GPS => gps.push(entry),
            other => return Err(Error::BadKey(format!("unknown Exif group '{other}'"))),
        }
    }

    let ifd_len = |entries: &[RawEntry]| 2 + entries.len() * 12 + 4;

    // IFD0 also carries a pointer entry per non-empty sub-IFD.
    let ifd0_count = ifd0.len()
        + usize::from(!photo.is_empty())
        + usize::from(!gps.is_empty());
    let ifd0_size = 2 + ifd0_count * 12 + 4;

    let photo_offset = 8 + ifd0_size;
    let photo_size = if photo.is_empty() { 0 } else { ifd_len(&photo) };
    let gps_offset = photo_offset + photo_size;
    let gps_size = if gps.is_empty() { 0 } else { ifd_len(&gps) };

    if !photo.is_empty() {
        ifd0.push(RawEntry {
            tag: TAG_EXIF_IFD,
            typ: TYPE_LONG,
            count: 1,
            data: (photo_offset as u32).to_le_bytes().to_vec(),
        });
    }
    if !gps.is_empty() {
        ifd0.push(RawEntry {
            tag: TAG_GPS_IFD,
            typ: TYPE_LONG,
            count: 1,
            data: (gps_offset as u32).to_le_bytes().to_vec(),
        });
    }

    ifd0.sort_by_key(|e| e.tag);
    photo.sort_by_key(|e| e.tag);
    gps.sort_by_key(|e| e.tag);

    let mut out = Vec::new();
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    let mut values = Vec::new();
    let mut value_cursor = gps_offset + gps_size;
    write_ifd(&mut out, &ifd0, &mut values, &mut value_cursor);
    if !photo.is_empty() {
        write_ifd(&mut out, &photo, &mut values, &mut value_cursor);
    }
    if !gps.is_empty() {
        write_ifd(&mut out, &gps, &mut values, &mut value_cursor);
    }
    out.extend_from_slice(&values);

    Ok(out)
}

fn write_ifd(out: &mut Vec<u8>, entries: &[RawEntry], values: &mut Vec<u8>, cursor: &mut usize) {
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for e in entries {
        out.extend_from_slice(&e.tag.to_le_bytes());
        out.extend_from_slice(&e.typ.to_le_bytes());
        out.extend_from_slice(&(e.count as u32).to_le_bytes());
        if e.data.len() <= 4 {
            let mut cell = [0u8; 4];
            cell[..e.data.len()].copy_from_slice(&e.data);
            out.extend_from_slice(&cell);
        } else {
            out.extend_from_slice(&(*cursor as u32).to_le_bytes());
            values.extend_from_slice(&e.data);
            *cursor += e.data.len();
            if e.data.len() % 2 == 1 {
                values.push(0);
                *cursor += 1;
            }
        }
    }
    // next-IFD offset: none
    out.extend_from_slice(&0u32.to_le_bytes());
}

fn encode_value(datum: &Datum) -> Result<(u16, usize, Vec<u8>)> {
    Ok(match datum.value() {
        Value::Ascii(s) | Value::String(s) | Value::XmpText(s) => {
            let mut data = s.as_bytes().to_vec();
            data.push(0);
            let count = data.len();
            (TYPE_ASCII, count, data)
        }
        Value::UShort(v) => {
            let mut data = Vec::with_capacity(v.len() * 2);
            for x in v {
                data.extend_from_slice(&x.to_le_bytes());
            }
            (TYPE_SHORT, v.len(), data)
        }
        Value::ULong(v) => {
            let mut data = Vec::with_capacity(v.len() * 4);
            for x in v {
                data.extend_from_slice(&x.to_le_bytes());
            }
            (TYPE_LONG, v.len(), data)
        }
        Value::URational(v) => {
            let mut data = Vec::with_capacity(v.len() * 8);
            for (num, den) in v {
                data.extend_from_slice(&num.to_le_bytes());
                data.extend_from_slice(&den.to_le_bytes());
            }
            (TYPE_RATIONAL, v.len(), data)
        }
        Value::Undefined(v) => (TYPE_UNDEFINED, v.len(), v.clone()),
        other => {
            return Err(Error::BadValue(format!(
                "value of key '{}' ({:?}) cannot be encoded as Exif",
                datum.key(),
                other.type_id()
            )))
        }
    })
}
