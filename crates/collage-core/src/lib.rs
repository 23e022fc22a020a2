//! Collage Core - grid image collage library.
//!
//! Arranges a list of images into a grid, column by column, on a white
//! canvas and saves the result as a single image file.
//!
//! # Architecture
//!
//! ```text
//! Paths → Validate → Decode → Layout → Render → Persist (atomic write)
//! ```
//!
//! Images fill the grid top to bottom within a column, then move on to the
//! next column. Every cell takes the size of the first image unless
//! per-track sizing is configured.
//!
//! # Usage
//!
//! ```rust,ignore
//! use collage_core::{CollageCreator, Config, OutputFormat};
//! use std::path::{Path, PathBuf};
//!
//! fn main() -> collage_core::Result<()> {
//!     let config = Config::load()?;
//!     let creator = CollageCreator::new(&config)?;
//!
//!     let paths = vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")];
//!     let report = creator.create_and_save(&paths, Path::new("result.tif"), OutputFormat::Tiff)?;
//!     println!("Canvas: {:?}", report.layout.canvas_size());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod collage;
pub mod config;
pub mod error;
pub mod layout;
pub mod persist;
pub mod remote;
pub mod render;
pub mod report;
pub mod source;

// Re-exports for convenient access
pub use collage::CollageCreator;
pub use config::Config;
pub use error::{
    CollageError, ConfigError, LayoutError, PersistError, RemoteError, Result, SourceError,
    SourceResult,
};
pub use layout::{compute_layout, CellSize, CellSizing, LayoutEngine, LayoutSpec, Placement};
pub use persist::{CollagePersister, OutputFormat};
pub use remote::{PublicDiskClient, RemoteItem};
pub use render::{Canvas, CollageRenderer};
pub use report::CollageReport;
pub use source::{FileDiscovery, FileImageSource, ImageSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
