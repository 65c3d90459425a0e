use clap::Parser;
use fontfall::css::{fallback_css, font_face_rules, preload_links};
use fontfall::localize::localize_collection;
use fontfall::{BuildConfig, PipelineBuilder, PipelineError, SelectionPolicy};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Generates fallback font CSS for the collections in a build configuration.
#[derive(Parser, Debug)]
#[command(name = "fontfall", version, about)]
struct Cli {
    /// Path to the JSON build configuration.
    config: PathBuf,

    /// Directory for cached fallback metrics (default: probed temp dir).
    #[arg(long, conflicts_with = "no_cache")]
    cache_dir: Option<PathBuf>,

    /// Do not read or write the shared cache.
    #[arg(long)]
    no_cache: bool,

    /// Print results as JSON instead of CSS.
    #[arg(long)]
    json: bool,

    /// Copy fonts under each collection's base path before processing.
    #[arg(long)]
    localize: bool,

    /// Treat the `normal` and `bold` keywords as weights 400 and 700.
    #[arg(long)]
    keyword_weights: bool,

    /// Print `<link rel="preload">` tags for the configured fonts and exit.
    #[arg(long, conflicts_with = "json")]
    preloads: bool,
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = BuildConfig::from_file(&cli.config)?;
    log::info!("Loaded {} collection(s) from {}", config.collections.len(), cli.config.display());

    let mut builder = PipelineBuilder::new()
        .with_selection_policy(SelectionPolicy::default().with_keywords(cli.keyword_weights));
    if let Some(dir) = cli.cache_dir {
        builder = builder.with_cache_dir(dir);
    }
    if cli.no_cache {
        builder = builder.without_cache();
    }
    let pipeline = builder.build()?;

    if cli.localize {
        let resolver = Arc::clone(&pipeline.context().resolver);
        for collection in config.collections.iter_mut() {
            *collection = localize_collection(Arc::clone(&resolver), collection).await;
        }
    }

    if cli.preloads {
        for collection in &config.collections {
            for link in preload_links(collection)? {
                println!("{}", link);
            }
        }
        return Ok(());
    }

    let outcomes = pipeline.run_all(&config.collections).await;

    if cli.json {
        let report: Vec<_> = outcomes
            .iter()
            .map(|o| json!({ "name": o.name, "fingerprint": o.fingerprint.as_str(), "metrics": o.metrics }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let resolver = &pipeline.context().resolver;
    for (collection, outcome) in config.collections.iter().zip(&outcomes) {
        for rule in font_face_rules(collection, resolver).await? {
            println!("{}", rule);
        }
        println!("{}", fallback_css(collection, &outcome.fingerprint, outcome.metrics.as_ref()));
    }
    Ok(())
}
