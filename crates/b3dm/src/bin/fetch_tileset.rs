//! Download every tile payload of a remote tileset.
//!
//! Saves `tileset.json`, a `url.txt` recording where it came from, and each
//! content payload at its relative path, so the output directory can later
//! be read back as a local tileset.
//!
//! Run: `cargo run -p b3dm --features tools --bin fetch_tileset -- <tileset-url> [out-dir]`
//!
//! Set `B3DM_ACCESS_TOKEN` for tilesets that need a bearer token.

use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use b3dm::{OutputMode, PayloadArchiver, Source, Walker, WalkerConfig, prepare_output_dir};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let Some(url) = args.get(1) else {
        eprintln!("usage: fetch_tileset <tileset-url> [out-dir]");
        std::process::exit(2);
    };
    let output_dir = args.get(2).map_or_else(default_output_dir, PathBuf::from);

    let config = WalkerConfig {
        decode: false,
        output_dir: output_dir.clone(),
        output_mode: OutputMode::Clean,
        ..WalkerConfig::from_env()
    };
    prepare_output_dir(&config.output_dir, config.output_mode).await?;
    tokio::fs::write(output_dir.join("url.txt"), url).await?;

    let source = Source::from_location(url, config.access_token.as_deref())?;
    let tileset_bytes = source.fetch_tileset_bytes().await?;
    tokio::fs::write(output_dir.join("tileset.json"), &tileset_bytes).await?;
    let tileset = b3dm::Tileset::from_slice(&tileset_bytes)?;

    println!("Downloading {url} to {}", output_dir.display());
    let walker = Walker::new(source, PayloadArchiver::new(&output_dir), config);
    let summary = walker.run(&tileset).await;

    println!(
        "\nDownloaded {} of {} payloads",
        summary.fetched, summary.visited
    );
    for failure in &summary.failures {
        println!("  FAILED {} ({}): {}", failure.id, failure.uri, failure.error);
    }
    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn default_output_dir() -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    PathBuf::from("download").join(millis.to_string())
}
