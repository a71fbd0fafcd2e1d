//! C ABI bindings for metakit
//!
//! This module exposes the metadata engine as flat `extern "C"` functions
//! over opaque handles, for callers with no Rust toolchain and no concept
//! of results, references or destructors. Enable the `capi` feature to
//! build it; the crate already builds as a `cdylib`.
//!
//! # Usage
//!
//! ```c
//! MetakitError *err = NULL;
//! MetakitImage *img = metakit_image_open("photo.jpg", &err);
//! if (!img) {
//!     fprintf(stderr, "open failed: %s\n", metakit_error_message(err));
//!     metakit_error_free(err);
//!     return 1;
//! }
//! metakit_image_read_metadata(img, NULL);
//!
//! MetakitExifData *exif = metakit_image_get_exif_data(img);
//! MetakitExifDatum *make = metakit_exif_data_find_key(exif, "Exif.Image.Make", &err);
//! if (make) {
//!     char *text = metakit_exif_datum_to_string(make);
//!     printf("Make: %s\n", text);
//!     metakit_string_free(text);
//!     metakit_exif_datum_free(make);
//! }
//! metakit_exif_data_free(exif);
//! metakit_image_free(img);
//! ```
//!
//! # Boundary contract
//!
//! - Every fallible function takes an optional `MetakitError **` receptacle.
//!   Passing null opts out: failures are swallowed and the function returns
//!   its null/zero failure result with no diagnostic.
//! - Non-null returns documented as owned belong to the caller until freed
//!   exactly once with the matching free function; strings have their own
//!   release call, `metakit_string_free`.
//! - Container views borrow from their image, iterators borrow from their
//!   container, and the ICC/byte pointers borrow from the image. Freeing an
//!   image while derived handles are in use, freeing anything twice, or
//!   mutating a container mid-iteration is undefined behavior; destruction
//!   must run leaf-first.
//! - No internal locking: one logical owner thread per image hierarchy.
//!   Concurrent access to the same image must be serialized by the caller.

mod macros;

pub mod error;
pub mod exif;
pub mod image;
pub mod iptc;
pub mod strings;
pub mod xmp;

pub use error::MetakitError;
pub use exif::{MetakitExifData, MetakitExifDatum, MetakitExifDatumIterator};
pub use image::MetakitImage;
pub use iptc::{MetakitIptcData, MetakitIptcDatum, MetakitIptcDatumIterator};
pub use xmp::{MetakitXmpData, MetakitXmpDatum, MetakitXmpDatumIterator};
