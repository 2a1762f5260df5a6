//! Where tilesets and their payloads are read from.

use std::path::{Path, PathBuf};

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::{Error, Result};
use crate::tileset::Tileset;

/// A tileset location: a `tileset.json` on disk or behind an HTTP URL.
///
/// Content URIs are resolved relative to the tileset document.
#[derive(Debug, Clone)]
pub enum Source {
    Local {
        tileset: PathBuf,
    },
    Remote {
        tileset: Url,
        client: reqwest::Client,
    },
}

impl Source {
    /// A tileset file on disk.
    #[must_use]
    pub fn local(tileset: impl Into<PathBuf>) -> Self {
        Self::Local {
            tileset: tileset.into(),
        }
    }

    /// A tileset served over HTTP, optionally with a bearer token.
    pub fn remote(url: &str, access_token: Option<&str>) -> Result<Self> {
        let tileset = Url::parse(url).map_err(|e| Error::InvalidUrl {
            url: url.to_owned(),
            message: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        if let Some(token) = access_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self::Remote { tileset, client })
    }

    /// Pick [`Source::remote`] for `http(s)://` locations and
    /// [`Source::local`] for anything else.
    pub fn from_location(location: &str, access_token: Option<&str>) -> Result<Self> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::remote(location, access_token)
        } else {
            Ok(Self::local(location))
        }
    }

    /// Human-readable tileset location.
    #[must_use]
    pub fn location(&self) -> String {
        match self {
            Self::Local { tileset } => tileset.display().to_string(),
            Self::Remote { tileset, .. } => tileset.to_string(),
        }
    }

    /// Fetch the raw tileset document.
    pub async fn fetch_tileset_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Local { tileset } => read_file(tileset).await,
            Self::Remote { tileset, client } => fetch_url(client, tileset.clone()).await,
        }
    }

    /// Fetch and parse the tileset document.
    pub async fn fetch_tileset(&self) -> Result<Tileset> {
        Tileset::from_slice(&self.fetch_tileset_bytes().await?)
    }

    /// Fetch the complete payload referenced by a content `uri`.
    pub async fn fetch(&self, uri: &str) -> Result<Vec<u8>> {
        match self {
            Self::Local { tileset } => read_file(&resolve_path(tileset, uri)?).await,
            Self::Remote { tileset, client } => {
                let url = tileset.join(uri).map_err(|_| Error::Resolve {
                    base: tileset.to_string(),
                    uri: uri.to_owned(),
                })?;
                fetch_url(client, url).await
            }
        }
    }
}

/// Resolve a content URI against the directory holding the tileset.
///
/// The URI is joined as a `file:` URL, so percent-escapes are decoded and
/// any query or fragment is dropped.
fn resolve_path(tileset: &Path, uri: &str) -> Result<PathBuf> {
    let unresolved = || Error::Resolve {
        base: tileset.display().to_string(),
        uri: uri.to_owned(),
    };
    let absolute = std::path::absolute(tileset).map_err(|e| Error::io(tileset, e))?;
    let base = Url::from_file_path(&absolute).map_err(|()| unresolved())?;
    base.join(uri)
        .ok()
        .and_then(|url| url.to_file_path().ok())
        .ok_or_else(unresolved)
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| Error::io(path, e))
}

async fn fetch_url(client: &reqwest::Client, url: Url) -> Result<Vec<u8>> {
    tracing::debug!("GET {url}");
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(response.bytes().await?.to_vec())
}
