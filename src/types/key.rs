//! Metadata keys
//!
//! A key names one metadata entry as `Family.Group.Name`, e.g.
//! `Exif.Image.Make`, `Iptc.Application2.Keywords` or `Xmp.dc.title`.
//! Parsing validates the key's *shape* only: a well-formed key whose name is
//! unknown to the tag registries is still a valid key (it just never matches
//! anything until a codec resolves it), while a malformed key is rejected
//! outright. Callers rely on that distinction to tell "bad key" apart from
//! "key not present".

use crate::core::error::{Error, Result};
use std::fmt;

/// The three metadata families an image can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// EXIF (TIFF-IFD) metadata
    Exif,
    /// IPTC IIM metadata
    Iptc,
    /// XMP (RDF/XML) metadata
    Xmp,
}

impl Family {
    /// The key prefix for this family (`Exif`, `Iptc` or `Xmp`).
    pub fn prefix(&self) -> &'static str {
        match self {
            Family::Exif => "Exif",
            Family::Iptc => "Iptc",
            Family::Xmp => "Xmp",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A parsed, syntactically valid metadata key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaKey {
    family: Family,
    group: String,
    name: String,
}

impl MetaKey {
    /// Parse `text` as a key of the given family.
    ///
    /// Returns [`Error::BadKey`] when the text is not shaped like a key of
    /// that family: wrong number of parts, wrong family prefix, or a group or
    /// name containing characters outside `[A-Za-z0-9_]`. A name may also be
    /// a `0xNNNN` hex tag form for entries outside the tag registries.
    pub fn parse(text: &str, family: Family) -> Result<Self> {
        let mut parts = text.split('.');
        let (prefix, group, name) = match (parts.next(), parts.next(), parts.next(), parts.next())
        {
            (Some(p), Some(g), Some(n), None) => (p, g, n),
            _ => {
                return Err(Error::BadKey(format!(
                    "invalid key '{text}', expected {}.Group.Name",
                    family.prefix()
                )))
            }
        };

        if prefix != family.prefix() {
            return Err(Error::BadKey(format!(
                "'{text}' is not an {} key",
                family.prefix()
            )));
        }
        if !is_ident(group) {
            return Err(Error::BadKey(format!("invalid group in key '{text}'")));
        }
        if !is_ident(name) && !is_hex_name(name) {
            return Err(Error::BadKey(format!("invalid name in key '{text}'")));
        }

        Ok(Self {
            family,
            group: group.to_string(),
            name: name.to_string(),
        })
    }

    /// Build a key from already-validated parts. Used by the codecs when
    /// decoding entries whose names come out of a registry.
    pub(crate) fn from_parts(family: Family, group: &str, name: &str) -> Self {
        Self {
            family,
            group: group.to_string(),
            name: name.to_string(),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for MetaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.family.prefix(), self.group, self.name)
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `0xNNNN` form used for tags absent from the registries.
fn is_hex_name(s: &str) -> bool {
    s.len() == 6 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}
