//! Extract the glTF model from every b3dm tile of a tileset.
//!
//! Writes `<out-dir>/origin-glb/<content uri>.glb` for each tile. A tile
//! that fails to fetch or decode is reported and skipped.
//!
//! Run: `cargo run -p b3dm --features tools --bin extract_glb -- <tileset.json|url> [out-dir]`

use std::env;
use std::path::PathBuf;

use b3dm::{GlbExporter, OutputMode, Source, Walker, WalkerConfig, prepare_output_dir};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let Some(location) = args.get(1) else {
        eprintln!("usage: extract_glb <tileset.json|url> [out-dir]");
        std::process::exit(2);
    };

    let mut config = WalkerConfig {
        output_mode: OutputMode::Clean,
        ..WalkerConfig::from_env()
    };
    if let Some(dir) = args.get(2) {
        config.output_dir = PathBuf::from(dir);
    }
    prepare_output_dir(&config.output_dir, config.output_mode).await?;

    let source = Source::from_location(location, config.access_token.as_deref())?;
    let exporter = GlbExporter::new(&config.output_dir);
    let walker = Walker::new(source, exporter, config);
    let summary = walker.walk().await?;

    println!(
        "\nExtracted {} models ({} tiles, {} skipped)",
        summary.decoded, summary.visited, summary.skipped
    );
    for failure in &summary.failures {
        println!("  FAILED {} ({}): {}", failure.id, failure.uri, failure.error);
    }
    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
