//! Per-file conversion pipeline components.
//!
//! - **discovery**: Find RAW files in directories
//! - **metadata**: Read camera make/model from EXIF
//! - **decode**: Codec capability (RAW/standard decode, JPEG encode)
//! - **develop**: Turn sensor data into a display-referred image
//! - **processor**: Convert one file end to end

pub mod decode;
mod develop;
pub mod discovery;
pub mod metadata;
pub mod processor;

// Re-exports for convenient access
pub use decode::{ImageCodec, StandardCodec};
pub use discovery::FileDiscovery;
pub use metadata::MetadataExtractor;
pub use processor::FileConverter;
