use anyhow::Context;
use dotenvy::dotenv;
use slide_extract::{Extractor, ExtractorConfig, ResvgRasterizer, SnapshotHost};
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    dotenv().ok();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --example extract_snapshot -- <SNAPSHOT_JSON> [OUTPUT_JSON]");
        eprintln!("Set TEMP_DIRECTORY (environment or .env) to choose where images are written.");
        return Ok(());
    }
    let snapshot_path = &args[1];

    let snapshot = fs::read_to_string(snapshot_path)
        .with_context(|| format!("reading snapshot '{}'", snapshot_path))?;
    let host = SnapshotHost::from_json(&snapshot)?;
    let config = ExtractorConfig::from_env().unwrap_or_else(|e| {
        log::warn!("{}; writing images under the system temp directory", e);
        ExtractorConfig::default()
    });
    println!("Writing images to {}", config.screenshots_dir().display());

    let extractor = Extractor::new(host, ResvgRasterizer::new(), config)?;
    let slides = extractor.extract_loaded().await?;

    let json = serde_json::to_string_pretty(&slides)?;
    match args.get(2) {
        Some(output) => {
            fs::write(output, &json).with_context(|| format!("writing '{}'", output))?;
            println!("Wrote {} slides to {}", slides.len(), output);
        }
        None => println!("{}", json),
    }
    Ok(())
}
