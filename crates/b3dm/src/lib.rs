//! Walk 3D Tiles tilesets and extract the glTF models from their b3dm tiles.
//!
//! This crate is the I/O half of the pipeline; the container format itself
//! is handled by [`b3dm_decode`].
//!
//! # Example
//!
//! ```no_run
//! use b3dm::{GlbExporter, Source, Walker, WalkerConfig};
//!
//! # async fn run() -> b3dm::Result<()> {
//! let config = WalkerConfig::default();
//! let source = Source::from_location("tiles/tileset.json", None)?;
//! let walker = Walker::new(source, GlbExporter::new(&config.output_dir), config);
//! let summary = walker.walk().await?;
//! println!("{} models extracted", summary.decoded);
//! # Ok(())
//! # }
//! ```

mod config;
mod error;

pub mod model;
pub mod sink;
pub mod source;
pub mod tileset;
pub mod walker;

pub use config::{ACCESS_TOKEN_VAR, CONCURRENCY_VAR, WalkerConfig};
pub use error::{Error, Result};
pub use model::ModelSummary;
pub use sink::{
    GlbExporter, NullSink, OutputMode, PayloadArchiver, ProcessedTile, TileSink,
    prepare_output_dir,
};
pub use source::Source;
pub use tileset::{ContentNode, Tile, TileContent, Tileset};
pub use walker::{NodeFailure, WalkSummary, Walker};

pub use b3dm_decode::{DecodedTile, FormatError};
