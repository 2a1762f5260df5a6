//! Tileset document model and depth-first traversal.

use serde::Deserialize;

use crate::error::{Error, Result};

/// A parsed `tileset.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tileset {
    #[serde(default)]
    pub asset: Asset,
    #[serde(default)]
    pub geometric_error: f64,
    pub root: Tile,
}

/// The `asset` block.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(default)]
    pub version: String,
    pub tileset_version: Option<String>,
}

/// A node of the tile tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub content: Option<TileContent>,
    #[serde(default)]
    pub children: Vec<Tile>,
    #[serde(default)]
    pub geometric_error: f64,
    pub refine: Option<String>,
    pub bounding_volume: Option<serde_json::Value>,
}

/// A tile's payload reference.
///
/// Tilesets written before 3D Tiles 1.0 spell the field `url`.
#[derive(Debug, Clone, Deserialize)]
pub struct TileContent {
    pub uri: Option<String>,
    pub url: Option<String>,
}

impl TileContent {
    /// The payload reference, preferring `uri` over `url`.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.uri.as_deref().or(self.url.as_deref())
    }
}

/// A tile that references a payload, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
    /// Child-index path from the root, e.g. `root.0.2`.
    pub id: String,
    /// Payload reference relative to the tileset.
    pub uri: String,
}

impl ContentNode {
    /// Whether the payload is a b3dm tile. Query strings are ignored.
    #[must_use]
    pub fn is_b3dm(&self) -> bool {
        let path = self.uri.split(['?', '#']).next().unwrap_or_default();
        path.to_ascii_lowercase().ends_with(".b3dm")
    }
}

impl Tileset {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Error::Tileset)
    }

    /// Every tile with content, depth-first with children in document order.
    #[must_use]
    pub fn content_nodes(&self) -> Vec<ContentNode> {
        let mut nodes = Vec::new();
        let mut stack = vec![(String::from("root"), &self.root)];
        while let Some((id, tile)) = stack.pop() {
            if let Some(uri) = tile.content.as_ref().and_then(TileContent::reference) {
                nodes.push(ContentNode {
                    id: id.clone(),
                    uri: uri.to_owned(),
                });
            }
            // Reversed so the first child is visited next.
            for (index, child) in tile.children.iter().enumerate().rev() {
                stack.push((format!("{id}.{index}"), child));
            }
        }
        nodes
    }
}
