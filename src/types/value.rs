//! Metadata value types
//!
//! This module defines the value types a metadata entry can hold, spanning
//! the EXIF binary types, IPTC string datasets and the XMP text/array kinds.

use std::fmt;

/// Value type tags.
///
/// The EXIF variants follow the TIFF field types; the XMP variants follow the
/// RDF container kinds. `String` is the plain text type used by IPTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeId {
    /// NUL-terminated ASCII text (EXIF type 2)
    Ascii,
    /// Unsigned 16-bit components (EXIF type 3)
    UShort,
    /// Unsigned 32-bit components (EXIF type 4)
    ULong,
    /// Unsigned rational components (EXIF type 5)
    URational,
    /// Untyped bytes (EXIF types 1 and 7)
    Undefined,
    /// Plain text (IPTC string datasets)
    String,
    /// XMP simple text property
    XmpText,
    /// XMP unordered array
    XmpBag,
    /// XMP ordered array
    XmpSeq,
    /// XMP alternative array
    XmpAlt,
}

/// One metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Ascii(String),
    UShort(Vec<u16>),
    ULong(Vec<u32>),
    URational(Vec<(u32, u32)>),
    Undefined(Vec<u8>),
    String(String),
    XmpText(String),
    XmpBag(Vec<String>),
    XmpSeq(Vec<String>),
    XmpAlt(Vec<String>),
}

impl Value {
    pub fn type_id(&self) -> TypeId {
        match self {
            Value::Ascii(_) => TypeId::Ascii,
            Value::UShort(_) => TypeId::UShort,
            Value::ULong(_) => TypeId::ULong,
            Value::URational(_) => TypeId::URational,
            Value::Undefined(_) => TypeId::Undefined,
            Value::String(_) => TypeId::String,
            Value::XmpText(_) => TypeId::XmpText,
            Value::XmpBag(_) => TypeId::XmpBag,
            Value::XmpSeq(_) => TypeId::XmpSeq,
            Value::XmpAlt(_) => TypeId::XmpAlt,
        }
    }

    /// Number of components in the value. Text values count as one
    /// component; arrays and numeric vectors count their elements.
    pub fn count(&self) -> usize {
        match self {
            Value::Ascii(_) | Value::String(_) | Value::XmpText(_) => 1,
            Value::UShort(v) => v.len(),
            Value::ULong(v) => v.len(),
            Value::URational(v) => v.len(),
            Value::Undefined(v) => v.len(),
            Value::XmpBag(v) | Value::XmpSeq(v) | Value::XmpAlt(v) => v.len(),
        }
    }

    /// Render the first component only; empty string when there is none.
    pub fn to_string_first(&self) -> String {
        match self {
            Value::Ascii(s) | Value::String(s) | Value::XmpText(s) => s.clone(),
            Value::UShort(v) => v.first().map(u16::to_string).unwrap_or_default(),
            Value::ULong(v) => v.first().map(u32::to_string).unwrap_or_default(),
            Value::URational(v) => v
                .first()
                .map(|(n, d)| format!("{n}/{d}"))
                .unwrap_or_default(),
            Value::Undefined(v) => v.first().map(u8::to_string).unwrap_or_default(),
            Value::XmpBag(v) | Value::XmpSeq(v) | Value::XmpAlt(v) => {
                v.first().cloned().unwrap_or_default()
            }
        }
    }

    /// Render all components. XMP arrays join with `", "`, numeric vectors
    /// with a single space; text values render verbatim.
    pub fn to_string_joined(&self) -> String {
        match self {
            Value::Ascii(s) | Value::String(s) | Value::XmpText(s) => s.clone(),
            Value::UShort(v) => join_with(v.iter().map(u16::to_string), " "),
            Value::ULong(v) => join_with(v.iter().map(u32::to_string), " "),
            Value::URational(v) => join_with(v.iter().map(|(n, d)| format!("{n}/{d}")), " "),
            Value::Undefined(v) => join_with(v.iter().map(u8::to_string), " "),
            Value::XmpBag(v) | Value::XmpSeq(v) | Value::XmpAlt(v) => v.join(", "),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_joined())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

fn join_with(parts: impl Iterator<Item = String>, sep: &str) -> String {
    parts.collect::<Vec<_>>().join(sep)
}
