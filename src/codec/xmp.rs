//! XMP payload codec
//!
//! Parses and serializes the XMP packet (RDF/XML) into the flat key model:
//! `Xmp.<prefix>.<name>` keys with simple text or Bag/Seq/Alt array values.
//! Document namespace prefixes are remapped to the canonical prefixes of the
//! schema table by URI, so `Xmp.dc.title` finds the title no matter what the
//! producing application called the Dublin Core prefix.
//!
//! Nested RDF structures (struct-valued properties) are outside the flat
//! model and are skipped on parse.

use crate::core::container::Container;
use crate::core::datum::Datum;
use crate::core::error::{Error, Result};
use crate::types::key::{Family, MetaKey};
use crate::types::value::Value;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::HashMap;
use std::io::Cursor;

const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";

/// Canonical prefix ↔ URI table for the common schemas.
const NAMESPACES: &[(&str, &str)] = &[
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("xmp", "http://ns.adobe.com/xap/1.0/"),
    ("xmpRights", "http://ns.adobe.com/xap/1.0/rights/"),
    ("xmpMM", "http://ns.adobe.com/xap/1.0/mm/"),
    ("photoshop", "http://ns.adobe.com/photoshop/1.0/"),
    ("tiff", "http://ns.adobe.com/tiff/1.0/"),
    ("exif", "http://ns.adobe.com/exif/1.0/"),
    ("aux", "http://ns.adobe.com/exif/1.0/aux/"),
    ("pdf", "http://ns.adobe.com/pdf/1.3/"),
    ("Iptc4xmpCore", "http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/"),
];

fn uri_for_prefix(prefix: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| *uri)
}

fn canonical_prefix(uri: &str) -> Option<&'static str> {
    NAMESPACES
        .iter()
        .find(|(_, u)| *u == uri)
        .map(|(p, _)| *p)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayKind {
    Bag,
    Seq,
    Alt,
}

/// Parse an XMP packet (with or without the `<?xpacket?>` wrapper) into a
/// container.
pub fn parse_packet(xml: &str) -> Result<Container> {
    let content = extract_packet_content(xml)?;
    parse_rdf(&content)
}

/// Strip the `<?xpacket?>` wrapper when present.
fn extract_packet_content(xml: &str) -> Result<String> {
    let Some(start_pos) = xml.find("<?xpacket") else {
        return validate_xml(xml);
    };
    let Some(pi_len) = xml[start_pos..].find("?>") else {
        return validate_xml(xml);
    };
    let pi_end = start_pos + pi_len + 2;
    let Some(close_pos) = xml[pi_end..].find("<?xpacket end") else {
        return validate_xml(xml);
    };
    Ok(xml[pi_end..pi_end + close_pos].trim().to_string())
}

fn validate_xml(xml: &str) -> Result<String> {
    let trimmed = xml.trim();
    if trimmed.is_empty() || !trimmed.starts_with('<') {
        return Err(Error::ParseError("invalid XMP packet content".to_string()));
    }
    Ok(trimmed.to_string())
}

/// One property element being assembled during the parse.
struct PropState {
    prefix: String,
    name: String,
    depth: usize,
    text: String,
    array: Option<(ArrayKind, Vec<String>)>,
    in_li: bool,
}

fn parse_rdf(xml: &str) -> Result<Container> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut container = Container::xmp();
    // Document prefix → namespace URI, accumulated from xmlns declarations.
    let mut doc_ns: HashMap<String, String> = HashMap::new();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut desc_depth: Option<usize> = None;
    let mut prop: Option<PropState> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let attrs = collect_attributes(&e);
                register_namespaces(&attrs, &mut doc_ns);
                let local = local_name(&qname);

                if local == "Description" && prop.is_none() {
                    desc_depth = Some(depth);
                    push_attribute_properties(&attrs, &doc_ns, &mut container);
                } else if let Some(p) = prop.as_mut() {
                    match local {
                        "Bag" => p.array = Some((ArrayKind::Bag, Vec::new())),
                        "Seq" => p.array = Some((ArrayKind::Seq, Vec::new())),
                        "Alt" => p.array = Some((ArrayKind::Alt, Vec::new())),
                        "li" => {
                            if let Some((_, items)) = p.array.as_mut() {
                                items.push(String::new());
                                p.in_li = true;
                            }
                        }
                        // Nested structures are outside the flat model.
                        _ => {}
                    }
                } else if desc_depth.is_some_and(|d| depth == d + 1) {
                    if let Some((prefix, name)) = split_qname(&qname) {
                        prop = Some(PropState {
                            prefix: resolve_prefix(prefix, &doc_ns),
                            name: name.to_string(),
                            depth,
                            text: String::new(),
                            array: None,
                            in_li: false,
                        });
                    }
                }
            }
            Ok(Event::Empty(e)) => {
                let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let attrs = collect_attributes(&e);
                register_namespaces(&attrs, &mut doc_ns);
                let local = local_name(&qname);

                if local == "Description" && prop.is_none() {
                    push_attribute_properties(&attrs, &doc_ns, &mut container);
                } else if local == "li" {
                    if let Some((_, items)) =
                        prop.as_mut().and_then(|p| p.array.as_mut())
                    {
                        items.push(String::new());
                    }
                }
            }
            Ok(Event::Text(e)) => {
                let raw = String::from_utf8_lossy(e.as_ref()).to_string();
                let text = match unescape(&raw) {
                    Ok(unescaped) => unescaped.to_string(),
                    Err(_) => raw,
                };
                if let Some(p) = prop.as_mut() {
                    if p.in_li {
                        if let Some((_, items)) = p.array.as_mut() {
                            if let Some(last) = items.last_mut() {
                                last.push_str(&text);
                            }
                        }
                    } else if p.array.is_none() {
                        p.text.push_str(&text);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let qname = String::from_utf8_lossy(e.name().as_ref()).to_string();
                let local = local_name(&qname);

                if local == "li" {
                    if let Some(p) = prop.as_mut() {
                        p.in_li = false;
                    }
                } else if prop.as_ref().is_some_and(|p| p.depth == depth) {
                    if let Some(p) = prop.take() {
                        container.push(finish_property(p));
                    }
                } else if desc_depth == Some(depth) && local == "Description" {
                    desc_depth = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::ParseError(format!("XML parsing error: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(container)
}

fn finish_property(p: PropState) -> Datum {
    let key = MetaKey::from_parts(Family::Xmp, &p.prefix, &p.name);
    let value = match p.array {
        Some((ArrayKind::Bag, items)) => Value::XmpBag(items),
        Some((ArrayKind::Seq, items)) => Value::XmpSeq(items),
        Some((ArrayKind::Alt, items)) => Value::XmpAlt(items),
        None => Value::XmpText(p.text),
    };
    Datum::new(key, value)
}

fn collect_attributes(e: &BytesStart<'_>) -> Vec<(String, String)> {
    e.attributes()
        .flatten()
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let raw = String::from_utf8_lossy(attr.value.as_ref()).to_string();
            let value = match unescape(&raw) {
                Ok(unescaped) => unescaped.to_string(),
                Err(_) => raw,
            };
            (key, value)
        })
        .collect()
}

fn register_namespaces(attrs: &[(String, String)], doc_ns: &mut HashMap<String, String>) {
    for (name, value) in attrs {
        if let Some(prefix) = name.strip_prefix("xmlns:") {
            doc_ns.insert(prefix.to_string(), value.clone());
        }
    }
}

/// Properties written as attributes of `rdf:Description`.
fn push_attribute_properties(
    attrs: &[(String, String)],
    doc_ns: &HashMap<String, String>,
    container: &mut Container,
) {
    for (name, value) in attrs {
        if name == "xmlns"
            || name.starts_with("xmlns:")
            || name == "about"
            || name.ends_with(":about")
            || name.ends_with(":lang")
        {
            continue;
        }
        let Some((prefix, prop_name)) = split_qname(name) else {
            continue;
        };
        let key = MetaKey::from_parts(
            Family::Xmp,
            &resolve_prefix(prefix, doc_ns),
            prop_name,
        );
        container.push(Datum::new(key, Value::XmpText(value.clone())));
    }
}

fn local_name(qname: &str) -> &str {
    qname.rsplit(':').next().unwrap_or(qname)
}

fn split_qname(qname: &str) -> Option<(&str, &str)> {
    qname.split_once(':')
}

/// Map a document prefix to the canonical prefix of its URI; fall back to
/// the document prefix for schemas outside the table.
fn resolve_prefix(doc_prefix: &str, doc_ns: &HashMap<String, String>) -> String {
    doc_ns
        .get(doc_prefix)
        .and_then(|uri| canonical_prefix(uri))
        .unwrap_or(doc_prefix)
        .to_string()
}

/// Serialize a container as a full XMP packet with the `<?xpacket?>`
/// wrapper.
pub fn serialize_packet(container: &Container) -> Result<String> {
    let rdf = serialize_rdf(container)?;
    Ok(format!(
        "<?xpacket begin=\"\u{feff}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n\
         <x:xmpmeta xmlns:x=\"adobe:ns:meta/\">\n{rdf}\n</x:xmpmeta>\n\
         <?xpacket end=\"w\"?>"
    ))
}

/// Serialize a container as RDF/XML.
pub fn serialize_rdf(container: &Container) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

    let mut rdf_start = BytesStart::new("rdf:RDF");
    rdf_start.push_attribute(("xmlns:rdf", RDF_NS));
    writer.write_event(Event::Start(rdf_start))?;

    let mut desc_start = BytesStart::new("rdf:Description");
    desc_start.push_attribute(("rdf:about", ""));

    // One xmlns declaration per schema in use. Unknown prefixes cannot be
    // given a URI and are a key error, not a silent drop.
    let mut declared: Vec<&str> = Vec::new();
    for datum in container {
        let prefix = datum.key().group();
        if declared.contains(&prefix) {
            continue;
        }
        let uri = uri_for_prefix(prefix).ok_or_else(|| {
            Error::BadKey(format!("unknown XMP schema prefix '{prefix}'"))
        })?;
        desc_start.push_attribute((format!("xmlns:{prefix}").as_str(), uri));
        declared.push(prefix);
    }

    if container.is_empty() {
        writer.write_event(Event::Empty(desc_start))?;
    } else {
        writer.write_event(Event::Start(desc_start))?;
        for datum in container {
            serialize_property(&mut writer, datum)?;
        }
        writer.write_event(Event::End(BytesEnd::new("rdf:Description")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("rdf:RDF")))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes)
        .map_err(|e| Error::SerializationError(format!("UTF-8 encoding error: {e}")))
}

fn serialize_property(writer: &mut Writer<Cursor<Vec<u8>>>, datum: &Datum) -> Result<()> {
    let elem = format!("{}:{}", datum.key().group(), datum.key().name());

    match datum.value() {
        Value::XmpBag(items) => serialize_array(writer, &elem, "rdf:Bag", items)?,
        Value::XmpSeq(items) => serialize_array(writer, &elem, "rdf:Seq", items)?,
        Value::XmpAlt(items) => serialize_array(writer, &elem, "rdf:Alt", items)?,
        value => {
            let text = value.to_string_joined();
            writer.write_event(Event::Start(BytesStart::new(elem.as_str())))?;
            writer.write_event(Event::Text(BytesText::new(&text)))?;
            writer.write_event(Event::End(BytesEnd::new(elem.as_str())))?;
        }
    }
    Ok(())
}

fn serialize_array(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    elem: &str,
    kind: &str,
    items: &[String],
) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(elem)))?;
    writer.write_event(Event::Start(BytesStart::new(kind)))?;
    for item in items {
        writer.write_event(Event::Start(BytesStart::new("rdf:li")))?;
        writer.write_event(Event::Text(BytesText::new(item)))?;
        writer.write_event(Event::End(BytesEnd::new("rdf:li")))?;
    }
    writer.write_event(Event::End(BytesEnd::new(kind)))?;
    writer.write_event(Event::End(BytesEnd::new(elem)))?;
    Ok(())
}
