//! Metadata payload codecs
//!
//! Each family has its own on-disk encoding, independent of the file format
//! carrying it: EXIF is a TIFF structure, IPTC is an IIM dataset stream
//! inside a Photoshop IRB payload, XMP is an RDF/XML packet. The file
//! handlers locate the payloads; these codecs translate them to and from
//! containers.

pub mod exif;
pub mod iptc;
pub mod xmp;
