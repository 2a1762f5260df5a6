//! Consumers of fetched and decoded tiles.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use b3dm_decode::DecodedTile;

use crate::error::{Error, Result};
use crate::tileset::ContentNode;

/// Directory under the output root that receives extracted models.
pub const GLB_DIR: &str = "origin-glb";

/// A tile after fetching and, when enabled, decoding.
#[derive(Debug)]
pub struct ProcessedTile<'a> {
    pub node: &'a ContentNode,
    /// The complete payload as fetched.
    pub payload: &'a [u8],
    /// `None` when decoding is disabled or the content is not a b3dm tile.
    pub decoded: Option<DecodedTile<'a>>,
}

/// Receives every successfully processed tile.
///
/// Calls for different tiles may run concurrently.
pub trait TileSink: Send + Sync + 'static {
    fn accept(&self, tile: &ProcessedTile<'_>) -> impl Future<Output = Result<()>> + Send;
}

/// Discards every tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl TileSink for NullSink {
    async fn accept(&self, _tile: &ProcessedTile<'_>) -> Result<()> {
        Ok(())
    }
}

/// Feed each tile to two sinks in turn.
impl<A: TileSink, B: TileSink> TileSink for (A, B) {
    async fn accept(&self, tile: &ProcessedTile<'_>) -> Result<()> {
        self.0.accept(tile).await?;
        self.1.accept(tile).await
    }
}

/// Writes each model blob to `<root>/origin-glb/<uri>.glb`.
#[derive(Debug, Clone)]
pub struct GlbExporter {
    dir: PathBuf,
}

impl GlbExporter {
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join(GLB_DIR),
        }
    }

    /// Where the model for `node` is written.
    #[must_use]
    pub fn path_for(&self, node: &ContentNode) -> PathBuf {
        let mut path = self.dir.join(relative_path(&node.uri));
        let mut name = path.file_name().unwrap_or_default().to_os_string();
        name.push(".glb");
        path.set_file_name(name);
        path
    }
}

impl TileSink for GlbExporter {
    async fn accept(&self, tile: &ProcessedTile<'_>) -> Result<()> {
        let Some(decoded) = &tile.decoded else {
            return Ok(());
        };
        let path = self.path_for(tile.node);
        write_file(&path, decoded.model_blob.as_bytes()).await?;
        tracing::debug!(
            "{}: wrote {} byte model to {}",
            tile.node.id,
            decoded.model_blob_length(),
            path.display()
        );
        Ok(())
    }
}

/// Writes each raw payload under `<root>/`, keeping its relative path.
#[derive(Debug, Clone)]
pub struct PayloadArchiver {
    root: PathBuf,
}

impl PayloadArchiver {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn path_for(&self, node: &ContentNode) -> PathBuf {
        self.root.join(relative_path(&node.uri))
    }
}

impl TileSink for PayloadArchiver {
    async fn accept(&self, tile: &ProcessedTile<'_>) -> Result<()> {
        let path = self.path_for(tile.node);
        write_file(&path, tile.payload).await?;
        tracing::info!("Saved {}", path.display());
        Ok(())
    }
}

/// What to do with an output directory that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Leave existing files in place.
    #[default]
    Keep,
    /// Delete the directory's contents first.
    Clean,
}

/// Create `dir`, emptying it first under [`OutputMode::Clean`].
pub async fn prepare_output_dir(dir: &Path, mode: OutputMode) -> Result<()> {
    if mode == OutputMode::Clean {
        match tokio::fs::remove_dir_all(dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(dir, e)),
        }
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io(dir, e))
}

/// Write `bytes` to `path`, creating parent directories.
pub(crate) async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| Error::io(path, e))
}

/// Turn a content URI into a path that stays below the output directory.
///
/// Drops the query string, the scheme and host of absolute URLs, and any
/// root, `.` or `..` components.
fn relative_path(uri: &str) -> PathBuf {
    let path = uri.split(['?', '#']).next().unwrap_or_default();
    let path = path
        .split_once("://")
        .map_or(path, |(_, rest)| rest.split_once('/').map_or("", |(_, p)| p));
    Path::new(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}
