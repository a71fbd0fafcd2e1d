//! File layer
//!
//! Image lifecycle, the file-handler trait and the format registry.

pub mod formats;
pub mod handler;
pub mod image;
pub mod registry;

pub use handler::FileHandler;
pub use image::Image;
pub use registry::{default_registry, Handler, HandlerRegistry};
