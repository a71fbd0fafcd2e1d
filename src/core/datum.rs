//! Metadata datum
//!
//! A datum is one key/value metadata entry. Datums are plain owned values:
//! looking one up or copying one out of an iterator yields an entry whose
//! lifetime is independent of the container it came from.

use crate::types::key::MetaKey;
use crate::types::value::{TypeId, Value};
use std::fmt;

/// One key/value metadata entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Datum {
    key: MetaKey,
    value: Value,
}

impl Datum {
    pub fn new(key: MetaKey, value: Value) -> Self {
        Self { key, value }
    }

    pub fn key(&self) -> &MetaKey {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// Canonical key text, e.g. `Exif.Image.Make`.
    pub fn key_text(&self) -> String {
        self.key.to_string()
    }

    /// Render the value as text.
    ///
    /// An XMP bag renders all of its values joined; bags are unordered, so
    /// no single element is *the* value. Every other type renders its first
    /// component only.
    pub fn to_text(&self) -> String {
        match self.value.type_id() {
            TypeId::XmpBag => self.value.to_string_joined(),
            _ => self.value.to_string_first(),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
