//! # metakit
//!
//! Pure Rust image metadata toolkit: read and write EXIF, IPTC and XMP
//! metadata in image files, with C bindings for foreign callers.
//!
//! Entries are addressed by family-qualified keys (`Exif.Image.Make`,
//! `Iptc.Application2.Caption`, `Xmp.dc.title`); each open image carries one
//! container per family plus pixel dimensions and the embedded ICC profile.
//!
//! # Example
//!
//! ```rust,no_run
//! use metakit::Image;
//!
//! # fn main() -> Result<(), metakit::Error> {
//! let mut img = Image::open("photo.jpg")?;
//! img.read_metadata()?;
//!
//! if let Some(make) = img.exif_data().find_key("Exif.Image.Make")? {
//!     println!("camera: {}", make.to_text());
//! }
//!
//! img.set_exif_string("Exif.Image.Software", "metakit")?;
//! # Ok(())
//! # }
//! ```
//!
//! # C bindings
//!
//! The `capi` feature (on by default) exposes the same engine as flat
//! `extern "C"` functions over opaque handles; see [`capi`] for the
//! boundary contract. The crate builds as both `rlib` and `cdylib`.

pub mod codec;
pub mod core;
pub mod files;
pub mod types;

#[cfg(feature = "capi")]
pub mod capi;

pub use crate::core::container::Container;
pub use crate::core::datum::Datum;
pub use crate::core::error::{Error, Result};
pub use crate::core::metadata::Metadata;
pub use crate::files::image::Image;
pub use crate::types::key::{Family, MetaKey};
pub use crate::types::value::{TypeId, Value};
