//! Core metadata model
//!
//! This module contains the error type and the owned data model shared by
//! the payload codecs, the file handlers and the C bindings: datums,
//! per-family containers and the parsed-metadata aggregate.

pub mod container;
pub mod datum;
pub mod error;
pub mod metadata;

pub use container::Container;
pub use datum::Datum;
pub use error::{Error, Result};
pub use metadata::Metadata;
