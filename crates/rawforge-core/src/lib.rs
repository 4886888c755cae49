//! RawForge Core - batch RAW to JPEG conversion with camera color profiles.
//!
//! A run identifies each file's camera, picks the matching ICC/ICM profile
//! from a profile directory, develops the RAW data and writes a JPEG:
//!
//! ```text
//! RAW → Identify camera → Resolve profile → Decode → Color-correct → JPEG
//! ```
//!
//! Files are converted in parallel by [`ConversionEngine`]; every input gets
//! exactly one [`ConversionResult`], in input order.
//!
//! # Usage
//!
//! ```rust,ignore
//! use rawforge_core::{Config, ConversionEngine};
//!
//! #[tokio::main]
//! async fn main() -> rawforge_core::Result<()> {
//!     let config = Config::load()?;
//!     let engine = ConversionEngine::new(config.conversion(), config.profile_dir());
//!
//!     let results = engine
//!         .convert_directory("./raw".as_ref(), "./jpeg".as_ref(), None)
//!         .await?;
//!     println!("{} files, {:?}", results.len(), engine.metrics_summary());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod camera;
pub mod catalog;
pub mod color;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod planner;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenient access
pub use camera::CameraIdentifier;
pub use catalog::{CatalogStats, ProfileCatalog};
pub use color::{ColorManager, LcmsColorManager, ProfileHandle, StandardProfile};
pub use config::{Config, ConversionConfig};
pub use engine::{CancelToken, ConversionEngine, MetricsSummary};
pub use error::{
    CodecError, ColorError, ConfigError, ConversionError, ConversionOutcome, RawForgeError,
    Result,
};
pub use output::{save_report, ReportFormat, ReportWriter};
pub use pipeline::{FileConverter, FileDiscovery, ImageCodec, StandardCodec};
pub use planner::{BatchEstimate, ConversionPlanner, EnvironmentReport, SystemResources};
pub use types::{Brand, CameraInfo, ConversionResult, ConversionStatus, NormalizedCamera};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
