use std::env;
use std::error::Error;

use astra::{AstraConfig, Pipeline};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: astra <image-url> [config.yaml]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let image_url = args.next().ok_or(USAGE)?;
    let config = match args.next() {
        Some(path) => AstraConfig::from_file(path)?,
        None => AstraConfig::default(),
    };

    let mut pipeline_cfg = config.pipeline;
    pipeline_cfg.apply_env_defaults();

    let pipeline = Pipeline::from_config(&pipeline_cfg)?;
    let report = pipeline.run(&image_url).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
