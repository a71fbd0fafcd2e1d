//! IPTC payload codec
//!
//! IPTC IIM metadata travels inside a Photoshop image-resource-block (IRB)
//! payload: a sequence of `8BIM` resource blocks, one of which (resource
//! 0x0404) carries the IIM dataset stream. Decoding walks the blocks and the
//! stream; encoding rebuilds the 0x0404 resource while preserving every
//! other resource block from the previous payload byte-for-byte.
//!
//! IIM dataset stream: repeated records of
//! `0x1C, record number, dataset number, 2-byte length, value`.

use crate::core::container::Container;
use crate::core::datum::Datum;
use crate::core::error::{Error, Result};
use crate::types::key::{Family, MetaKey};
use crate::types::value::Value;

/// Resource block signature
const IRB_SIGNATURE: &[u8] = b"8BIM";
/// Resource id of the IIM dataset stream
const IPTC_NAA_RESOURCE: u16 = 0x0404;
/// IIM dataset marker
const IIM_MARKER: u8 = 0x1c;

struct DatasetDesc {
    dataset: u8,
    name: &'static str,
}

macro_rules! datasets {
    ($(($dataset:expr, $name:expr)),* $(,)?) => {
        &[$(DatasetDesc { dataset: $dataset, name: $name }),*]
    };
}

/// Record 1 datasets
const ENVELOPE_DATASETS: &[DatasetDesc] = datasets![
    (0, "ModelVersion"),
    (20, "FileFormat"),
    (22, "FileVersion"),
    (90, "CharacterSet"),
];

/// Record 2 datasets
const APPLICATION2_DATASETS: &[DatasetDesc] = datasets![
    (0, "RecordVersion"),
    (5, "ObjectName"),
    (10, "Urgency"),
    (15, "Category"),
    (20, "SuppCategory"),
    (25, "Keywords"),
    (40, "SpecialInstructions"),
    (55, "DateCreated"),
    (60, "TimeCreated"),
    (80, "Byline"),
    (85, "BylineTitle"),
    (90, "City"),
    (92, "SubLocation"),
    (95, "ProvinceState"),
    (100, "CountryCode"),
    (101, "CountryName"),
    (103, "TransmissionReference"),
    (105, "Headline"),
    (110, "Credit"),
    (115, "Source"),
    (116, "Copyright"),
    (118, "Contact"),
    (120, "Caption"),
    (122, "Writer"),
];

fn record_name(record: u8) -> Option<&'static str> {
    match record {
        1 => Some("Envelope"),
        2 => Some("Application2"),
        _ => None,
    }
}

fn record_number(group: &str) -> Option<u8> {
    match group {
        "Envelope" => Some(1),
        "Application2" => Some(2),
        _ => None,
    }
}

fn registry_for(record: u8) -> &'static [DatasetDesc] {
    match record {
        1 => ENVELOPE_DATASETS,
        _ => APPLICATION2_DATASETS,
    }
}

fn dataset_name(record: u8, dataset: u8) -> String {
    registry_for(record)
        .iter()
        .find(|d| d.dataset == dataset)
        .map(|d| d.name.to_string())
        .unwrap_or_else(|| format!("0x{dataset:04x}"))
}

fn resolve_dataset(record: u8, name: &str) -> Result<u8> {
    if let Some(hex) = name.strip_prefix("0x") {
        if let Ok(dataset) = u16::from_str_radix(hex, 16) {
            if dataset <= 0xff {
                return Ok(dataset as u8);
            }
        }
    }
    registry_for(record)
        .iter()
        .find(|d| d.name == name)
        .map(|d| d.dataset)
        .ok_or_else(|| {
            Error::BadKey(format!(
                "unknown Iptc dataset '{}' in record {record}",
                name
            ))
        })
}

/// Decode an IIM dataset stream.
pub fn decode_iim(data: &[u8]) -> Result<Container> {
    let mut container = Container::iptc();
    let mut pos = 0;

    while pos < data.len() {
        if data[pos] != IIM_MARKER {
            return Err(Error::ParseError(format!(
                "invalid IPTC dataset marker at offset {pos}"
            )));
        }
        let header = data
            .get(pos + 1..pos + 5)
            .ok_or_else(|| Error::ParseError("IPTC dataset header truncated".to_string()))?;
        let record = header[0];
        let dataset = header[1];
        let len = u16::from_be_bytes([header[2], header[3]]) as usize;
        if len & 0x8000 != 0 {
            return Err(Error::NotSupported(
                "IPTC extended dataset length".to_string(),
            ));
        }
        let value = data
            .get(pos + 5..pos + 5 + len)
            .ok_or_else(|| Error::ParseError("IPTC dataset value truncated".to_string()))?;
        pos += 5 + len;

        let Some(group) = record_name(record) else {
            // Records other than Envelope/Application2 are skipped whole.
            continue;
        };
        let key = MetaKey::from_parts(Family::Iptc, group, &dataset_name(record, dataset));
        let value = Value::String(String::from_utf8_lossy(value).into_owned());
        container.push(Datum::new(key, value));
    }

    Ok(container)
}

/// Encode a container as an IIM dataset stream, in entry order.
pub fn encode_iim(container: &Container) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    for datum in container {
        let group = datum.key().group();
        let record = record_number(group)
            .ok_or_else(|| Error::BadKey(format!("unknown Iptc record '{group}'")))?;
        let dataset = resolve_dataset(record, datum.key().name())?;
        let bytes = match datum.value() {
            Value::String(s) | Value::Ascii(s) | Value::XmpText(s) => s.as_bytes(),
            other => {
                return Err(Error::BadValue(format!(
                    "value of key '{}' ({:?}) cannot be encoded as IPTC",
                    datum.key(),
                    other.type_id()
                )))
            }
        };
        if bytes.len() > 0x7fff {
            return Err(Error::BadValue(format!(
                "IPTC value of key '{}' exceeds 32KB",
                datum.key()
            )));
        }

        out.push(IIM_MARKER);
        out.push(record);
        out.push(dataset);
        out.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
        out.extend_from_slice(bytes);
    }

    Ok(out)
}

/// Decode the IIM stream out of a Photoshop IRB payload (the bytes after the
/// `Photoshop 3.0\0` segment signature).
pub fn decode_irb(data: &[u8]) -> Result<Container> {
    for block in walk_irb(data)? {
        if block.id == IPTC_NAA_RESOURCE {
            return decode_iim(block.data);
        }
    }
    Ok(Container::iptc())
}

/// Rebuild an IRB payload with the container as its IIM resource. All other
/// resource blocks of `previous` are carried over unchanged; an empty
/// container still produces an (empty) IIM resource so round-trips are
/// stable.
pub fn encode_irb(container: &Container, previous: Option<&[u8]>) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    if let Some(previous) = previous {
        for block in walk_irb(previous)? {
            if block.id != IPTC_NAA_RESOURCE {
                write_block(&mut out, block.id, block.data);
            }
        }
    }

    let iim = encode_iim(container)?;
    write_block(&mut out, IPTC_NAA_RESOURCE, &iim);

    Ok(out)
}

struct ResourceBlock<'a> {
    id: u16,
    data: &'a [u8],
}

fn walk_irb(data: &[u8]) -> Result<Vec<ResourceBlock<'_>>> {
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos + 4 <= data.len() {
        if &data[pos..pos + 4] != IRB_SIGNATURE {
            return Err(Error::ParseError(format!(
                "invalid Photoshop resource signature at offset {pos}"
            )));
        }
        pos += 4;
        let id = u16::from_be_bytes(
            data.get(pos..pos + 2)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| Error::ParseError("resource id truncated".to_string()))?,
        );
        pos += 2;

        // Pascal name, padded to an even total length
        let name_len = *data
            .get(pos)
            .ok_or_else(|| Error::ParseError("resource name truncated".to_string()))?
            as usize;
        pos += 1 + name_len;
        if (1 + name_len) % 2 == 1 {
            pos += 1;
        }

        let size = u32::from_be_bytes(
            data.get(pos..pos + 4)
                .and_then(|s| s.try_into().ok())
                .ok_or_else(|| Error::ParseError("resource size truncated".to_string()))?,
        ) as usize;
        pos += 4;
        let payload = data
            .get(pos..pos + size)
            .ok_or_else(|| Error::ParseError("resource data truncated".to_string()))?;
        pos += size;
        if size % 2 == 1 {
            pos += 1;
        }

        blocks.push(ResourceBlock { id, data: payload });
    }

    Ok(blocks)
}

fn write_block(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    out.extend_from_slice(IRB_SIGNATURE);
    out.extend_from_slice(&id.to_be_bytes());
    // Empty pascal name: length byte plus pad byte
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iim_round_trip() {
        let mut c = Container::iptc();
        c.set_string("Iptc.Application2.Caption", "A caption").unwrap();
        c.set_string("Iptc.Application2.City", "Berlin").unwrap();
        c.set_string("Iptc.Envelope.ModelVersion", "4").unwrap();

        let decoded = decode_iim(&encode_iim(&c).unwrap()).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(
            decoded
                .find_key("Iptc.Application2.Caption")
                .unwrap()
                .unwrap()
                .to_text(),
            "A caption"
        );
        assert_eq!(
            decoded
                .find_key("Iptc.Envelope.ModelVersion")
                .unwrap()
                .unwrap()
                .to_text(),
            "4"
        );
    }

    #[test]
    fn irb_round_trip_preserves_foreign_blocks() {
        // Previous payload with a non-IPTC resource (0x03ed, resolution info)
        let mut previous = Vec::new();
        write_block(&mut previous, 0x03ed, &[1, 2, 3, 4]);
        let mut c = Container::iptc();
        c.set_string("Iptc.Application2.Headline", "News").unwrap();

        let irb = encode_irb(&c, Some(&previous)).unwrap();

        // Foreign block still present
        let blocks = walk_irb(&irb).unwrap();
        assert!(blocks.iter().any(|b| b.id == 0x03ed));

        let decoded = decode_irb(&irb).unwrap();
        assert_eq!(
            decoded
                .find_key("Iptc.Application2.Headline")
                .unwrap()
                .unwrap()
                .to_text(),
            "News"
        );
    }

    #[test]
    fn repeated_keywords_survive() {
        let mut c = Container::iptc();
        let key = MetaKey::parse("Iptc.Application2.Keywords", Family::Iptc).unwrap();
        c.push(Datum::new(key.clone(), Value::String("alpha".into())));
        c.push(Datum::new(key, Value::String("beta".into())));

        let decoded = decode_iim(&encode_iim(&c).unwrap()).unwrap();
        let keywords: Vec<String> = decoded
            .iter()
            .filter(|d| d.key().name() == "Keywords")
            .map(|d| d.to_text())
            .collect();
        assert_eq!(keywords, ["alpha", "beta"]);
    }

    #[test]
    fn unknown_dataset_keeps_numeric_name() {
        let data = [IIM_MARKER, 2, 0xee, 0, 2, b'h', b'i'];
        let decoded = decode_iim(&data).unwrap();
        assert_eq!(
            decoded
                .find_key("Iptc.Application2.0x00ee")
                .unwrap()
                .unwrap()
                .to_text(),
            "hi"
        );
    }

    #[test]
    fn garbage_stream_is_an_error() {
        assert!(decode_iim(&[0x00, 0x01]).is_err());
        assert!(walk_irb(b"NOPE\x00\x01").is_err());
    }
}
