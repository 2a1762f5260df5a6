//! Depth-first tileset walk with bounded concurrency.
//!
//! Every content node is fetched, decoded and handed to a [`TileSink`] in
//! its own task. A failing node is logged and recorded in the
//! [`WalkSummary`]; the remaining nodes are still processed.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::config::WalkerConfig;
use crate::error::{Error, Result};
use crate::model::ModelSummary;
use crate::sink::{ProcessedTile, TileSink};
use crate::source::Source;
use crate::tileset::{ContentNode, Tileset};

/// What happened to a node that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Decoded,
    Fetched,
}

/// A node that could not be processed.
#[derive(Debug)]
pub struct NodeFailure {
    pub id: String,
    pub uri: String,
    pub error: Error,
}

/// Totals for one walk.
#[derive(Debug, Default)]
pub struct WalkSummary {
    /// Content nodes found in the tileset.
    pub visited: usize,
    /// Payloads decoded and accepted by the sink.
    pub decoded: usize,
    /// Payloads fetched and accepted without decoding.
    pub fetched: usize,
    /// Non-b3dm content left alone while decoding.
    pub skipped: usize,
    pub failures: Vec<NodeFailure>,
}

impl WalkSummary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Walks a tileset from a [`Source`] into a [`TileSink`].
pub struct Walker<S> {
    source: Arc<Source>,
    sink: Arc<S>,
    config: WalkerConfig,
}

impl<S: TileSink> Walker<S> {
    #[must_use]
    pub fn new(source: Source, sink: S, config: WalkerConfig) -> Self {
        Self {
            source: Arc::new(source),
            sink: Arc::new(sink),
            config,
        }
    }

    /// Fetch the tileset document from the source and walk it.
    pub async fn walk(&self) -> Result<WalkSummary> {
        let tileset = self.source.fetch_tileset().await?;
        tracing::info!(
            "Loaded tileset {} (version {})",
            self.source.location(),
            tileset.asset.version
        );
        Ok(self.run(&tileset).await)
    }

    /// Process every content node of `tileset`.
    pub async fn run(&self, tileset: &Tileset) -> WalkSummary {
        let nodes = tileset.content_nodes();
        let mut summary = WalkSummary {
            visited: nodes.len(),
            ..WalkSummary::default()
        };
        tracing::info!("Walking {} content nodes", nodes.len());

        let permits = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks: Vec<(ContentNode, JoinHandle<Result<Outcome>>)> = Vec::new();
        for node in nodes {
            if self.config.decode && !node.is_b3dm() {
                tracing::debug!("{}: skipping non-b3dm content {}", node.id, node.uri);
                summary.skipped += 1;
                continue;
            }

            // Held by the task, so at most `concurrency` tasks are alive.
            // The semaphore is never closed.
            let permit = Arc::clone(&permits).acquire_owned().await.ok();
            let source = Arc::clone(&self.source);
            let sink = Arc::clone(&self.sink);
            let decode = self.config.decode;
            let task_node = node.clone();
            let handle = tokio::spawn(async move {
                let _permit = permit;
                process_node(&source, sink.as_ref(), &task_node, decode).await
            });
            tasks.push((node, handle));
        }

        for (node, handle) in tasks {
            let result = handle.await.map_err(Error::from).and_then(|r| r);
            match result {
                Ok(Outcome::Decoded) => summary.decoded += 1,
                Ok(Outcome::Fetched) => summary.fetched += 1,
                Err(error) => {
                    tracing::warn!("{} ({}): {}", node.id, node.uri, error);
                    summary.failures.push(NodeFailure {
                        id: node.id,
                        uri: node.uri,
                        error,
                    });
                }
            }
        }

        tracing::info!(
            "Walk complete: {} decoded, {} fetched, {} skipped, {} failed",
            summary.decoded,
            summary.fetched,
            summary.skipped,
            summary.failures.len()
        );
        summary
    }
}

/// Fetch one payload, decode it if asked to, and hand it to the sink.
async fn process_node<S: TileSink>(
    source: &Source,
    sink: &S,
    node: &ContentNode,
    decode: bool,
) -> Result<Outcome> {
    let payload = source.fetch(&node.uri).await?;

    let decoded = if decode && node.is_b3dm() {
        let tile = b3dm_decode::decode(&payload).map_err(|source| Error::Decode {
            uri: node.uri.clone(),
            source,
        })?;
        tracing::debug!(
            "{}: {:?} header, {} byte model at offset {}",
            node.id,
            tile.header.layout,
            tile.model_blob_length(),
            tile.model_blob.offset()
        );
        match ModelSummary::inspect(tile.model_blob.as_bytes()) {
            Ok(model) if model.requires_draco() => {
                tracing::info!("{}: model is Draco-compressed", node.id);
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("{}: cannot inspect model: {}", node.id, e),
        }
        Some(tile)
    } else {
        None
    };

    let outcome = if decoded.is_some() {
        Outcome::Decoded
    } else {
        Outcome::Fetched
    };
    let tile = ProcessedTile {
        node,
        payload: &payload,
        decoded,
    };
    sink.accept(&tile).await?;
    Ok(outcome)
}
