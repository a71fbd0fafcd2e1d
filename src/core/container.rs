//! Metadata containers
//!
//! A container holds the entries of one metadata family in file order.
//! Lookup distinguishes two outcomes that callers must be able to tell
//! apart: a *malformed* key is an error, a well-formed key that simply is
//! not present yields `None`.

use crate::core::datum::Datum;
use crate::core::error::{Error, Result};
use crate::types::key::{Family, MetaKey};
use crate::types::value::Value;

/// Ordered set of metadata entries of one family.
#[derive(Debug, Clone)]
pub struct Container {
    family: Family,
    entries: Vec<Datum>,
}

impl Container {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            entries: Vec::new(),
        }
    }

    pub fn exif() -> Self {
        Self::new(Family::Exif)
    }

    pub fn iptc() -> Self {
        Self::new(Family::Iptc)
    }

    pub fn xmp() -> Self {
        Self::new(Family::Xmp)
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by key text.
    ///
    /// Returns `Err(BadKey)` only when `key` is not syntactically valid for
    /// this container's family. A valid key with no matching entry returns
    /// `Ok(None)`; the two outcomes are distinct on purpose.
    pub fn find_key(&self, key: &str) -> Result<Option<&Datum>> {
        let key = MetaKey::parse(key, self.family)?;
        Ok(self.entries.iter().find(|d| *d.key() == key))
    }

    /// Entry at `index`, in file order.
    pub fn get(&self, index: usize) -> Option<&Datum> {
        self.entries.get(index)
    }

    /// Insert or replace an entry, matching on key. New entries append.
    pub fn set(&mut self, datum: Datum) {
        match self.entries.iter_mut().find(|d| d.key() == datum.key()) {
            Some(existing) => existing.set_value(datum.value().clone()),
            None => self.entries.push(datum),
        }
    }

    /// Upsert a string-typed entry.
    ///
    /// The stored value type follows the family: EXIF entries become ASCII,
    /// IPTC entries become strings, XMP entries become simple text.
    pub fn set_string(&mut self, key: &str, value: &str) -> Result<()> {
        let key = MetaKey::parse(key, self.family)?;
        let value = match self.family {
            Family::Exif => Value::Ascii(value.to_string()),
            Family::Iptc => Value::String(value.to_string()),
            Family::Xmp => Value::XmpText(value.to_string()),
        };
        self.set(Datum::new(key, value));
        Ok(())
    }

    /// Upsert a short-typed entry from its text form.
    ///
    /// The value must parse as an unsigned 16-bit number. EXIF entries store
    /// it as a SHORT component; IPTC and XMP keep the numeric text, which is
    /// how their encodings carry numbers.
    pub fn set_short(&mut self, key: &str, value: &str) -> Result<()> {
        let key = MetaKey::parse(key, self.family)?;
        let number: u16 = value.parse().map_err(|_| {
            Error::BadValue(format!("'{value}' is not a valid short value"))
        })?;
        let value = match self.family {
            Family::Exif => Value::UShort(vec![number]),
            Family::Iptc => Value::String(number.to_string()),
            Family::Xmp => Value::XmpText(number.to_string()),
        };
        self.set(Datum::new(key, value));
        Ok(())
    }

    /// Append an already-built entry without upsert. Used by the codecs,
    /// which decode payloads that may legitimately repeat a key (e.g. IPTC
    /// Keywords).
    pub(crate) fn push(&mut self, datum: Datum) {
        self.entries.push(datum);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Datum> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a Datum;
    type IntoIter = std::slice::Iter<'a, Datum>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_key_distinguishes_absent_from_malformed() {
        let mut c = Container::exif();
        c.set_string("Exif.Image.Make", "Acme").unwrap();

        // Present
        let found = c.find_key("Exif.Image.Make").unwrap();
        assert_eq!(found.unwrap().to_text(), "Acme");

        // Valid but absent: Ok(None), not an error
        assert!(c.find_key("Exif.Image.Model").unwrap().is_none());

        // Malformed: error
        assert!(c.find_key("").is_err());
        assert!(c.find_key("Iptc.Image.Make").is_err());
    }

    #[test]
    fn set_string_upserts() {
        let mut c = Container::iptc();
        c.set_string("Iptc.Application2.Caption", "first").unwrap();
        c.set_string("Iptc.Application2.Caption", "second").unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(
            c.find_key("Iptc.Application2.Caption")
                .unwrap()
                .unwrap()
                .to_text(),
            "second"
        );
    }

    #[test]
    fn set_short_parses_and_types_by_family() {
        let mut exif = Container::exif();
        exif.set_short("Exif.Image.Orientation", "6").unwrap();
        let datum = exif.find_key("Exif.Image.Orientation").unwrap().unwrap();
        assert_eq!(datum.value(), &Value::UShort(vec![6]));

        let mut iptc = Container::iptc();
        iptc.set_short("Iptc.Application2.Urgency", "3").unwrap();
        assert_eq!(
            iptc.find_key("Iptc.Application2.Urgency")
                .unwrap()
                .unwrap()
                .to_text(),
            "3"
        );

        assert!(exif.set_short("Exif.Image.Orientation", "not a number").is_err());
        assert!(exif.set_short("Exif.Image.Orientation", "70000").is_err());
    }

    #[test]
    fn iteration_preserves_order() {
        let mut c = Container::xmp();
        c.set_string("Xmp.dc.title", "t").unwrap();
        c.set_string("Xmp.dc.creator", "c").unwrap();
        c.set_string("Xmp.xmp.Rating", "5").unwrap();
        let keys: Vec<String> = c.iter().map(|d| d.key_text()).collect();
        assert_eq!(keys, ["Xmp.dc.title", "Xmp.dc.creator", "Xmp.xmp.Rating"]);
    }

    #[test]
    fn push_allows_repeated_keys() {
        let mut c = Container::iptc();
        let key = MetaKey::parse("Iptc.Application2.Keywords", Family::Iptc).unwrap();
        c.push(Datum::new(key.clone(), Value::String("a".into())));
        c.push(Datum::new(key, Value::String("b".into())));
        assert_eq!(c.len(), 2);
        // find_key returns the first match
        assert_eq!(
            c.find_key("Iptc.Application2.Keywords")
                .unwrap()
                .unwrap()
                .to_text(),
            "a"
        );
    }
}
