//! vlp-cl - Content Loader command line
//!
//! Loads one lesson through the full loader pipeline (resolve, fetch with
//! source fallback and retry, normalize) and prints the canonical document.
//!
//! **Usage:**
//! ```bash
//! vlp-cl <lesson-id> <module-id> [--config <file>] [--content-root <dir>]
//!        [--base-url <url>] [--resolve-only]
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use vlp_cl::{LessonCache, LessonLoader};
use vlp_common::config::{self, CONTENT_ROOT_ENV_VAR};

/// Lesson loader utility
#[derive(Parser, Debug)]
#[command(name = "vlp-cl", version)]
#[command(about = "Load a lesson and print its canonical JSON document")]
struct Args {
    /// Lesson identifier (e.g. lesson-01-respiratory-anatomy)
    lesson_id: String,

    /// Module identifier (e.g. module-01)
    module_id: String,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root directory of bundled lesson assets
    #[arg(long, value_name = "DIR")]
    content_root: Option<PathBuf>,

    /// Base URL of the network content source
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Only print the resolved storage path
    #[arg(long)]
    resolve_only: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config = config::load_or_default(args.config.as_deref())?;
    vlp_common::logging::init_tracing(&config.logging);

    if let Some(base_url) = args.base_url {
        config.content.base_url = Some(base_url);
    }

    let content_root = config::resolve_dir(
        args.content_root.as_deref(),
        CONTENT_ROOT_ENV_VAR,
        config.content.root.as_deref(),
        "./public",
    );
    info!("Content root: {}", content_root.display());

    let cache = LessonCache::new(config.loader.cache_capacity);
    let loader = LessonLoader::from_config(&config, &content_root, cache)?;

    if args.resolve_only {
        println!("{}", loader.resolve_path(&args.lesson_id, &args.module_id));
        return Ok(ExitCode::SUCCESS);
    }

    match loader.load(&args.lesson_id, &args.module_id).await {
        Ok(document) => {
            println!("{}", serde_json::to_string_pretty(document.as_ref())?);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
