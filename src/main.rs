//! # Tag Organizer - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing` (su stderr)
//! - Caricamento della configurazione e override da CLI
//! - Avvio del `LibraryOrganizer` ed emissione del report
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Carica il file di configurazione e applica gli override
//! 4. Valida che la directory sorgente esista
//! 5. Avvia l'organizer ed emette il report (JSON su stdout o riepilogo)
//!
//! ## Esempio di utilizzo:
//! ```bash
//! tag-organizer --source ~/Downloads/rips --library ~/Music --mode mapping \
//!     --mapping-file genres.json --json
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

use tag_organizer::{ClassificationMode, Config, GenrePatternTable, LibraryOrganizer};
use tag_organizer::report::RunError;

#[derive(Parser)]
#[command(name = "tag-organizer")]
#[command(about = "Normalize audio tags, resolve genres and file tracks into an artist library")]
struct Args {
    /// Directory containing the audio files to organize (not recursive)
    #[arg(long)]
    source: PathBuf,

    /// Root of the artist-organized library
    #[arg(long)]
    library: Option<PathBuf>,

    /// Genre fallback mode
    #[arg(long, value_enum)]
    mode: Option<ClassificationMode>,

    /// Inline genre mapping: {"genre_patterns": {"regex": "Genre"}}
    #[arg(long)]
    mapping: Option<String>,

    /// File containing the genre mapping JSON
    #[arg(long, conflicts_with = "mapping")]
    mapping_file: Option<PathBuf>,

    /// API key for the genre classifier
    #[arg(long, env = "GROK_API_KEY", hide_env_values = true)]
    grok_key: Option<String>,

    /// Chat-completions endpoint of the classifier
    #[arg(long)]
    grok_endpoint: Option<String>,

    /// Classifier model
    #[arg(long)]
    grok_model: Option<String>,

    /// System prompt for the classifier
    #[arg(long)]
    grok_prompt: Option<String>,

    /// Classifier timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// File extensions to process (default: mp3)
    #[arg(long = "ext", num_args = 1..)]
    extensions: Vec<String>,

    /// Dry run - don't write tags or move files
    #[arg(long)]
    dry_run: bool,

    /// Rewrite tags in place without moving files into the library
    #[arg(long)]
    tags_only: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (default: <config dir>/tag-organizer/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the effective configuration back to the config file
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for the JSON report
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = args.config.clone().or_else(Config::default_path);
    let mut config = match config_path {
        Some(ref path) => Config::from_file(path).await?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args).await;

    if args.save_config {
        if let Some(ref path) = config_path {
            config.save_to_file(path).await?;
            info!("Saved configuration to {}", path.display());
        }
    }

    if !args.source.is_dir() {
        let message = format!("Source directory {} not found", args.source.display());
        if config.json_output {
            RunError::emit(message);
            return Ok(());
        }
        return Err(anyhow::anyhow!(message));
    }

    let mut organizer = LibraryOrganizer::from_config(config)?;

    let stop_flag = organizer.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing the current file");
            stop_flag.store(true, Ordering::SeqCst);
        }
    });

    let report = organizer.run(&args.source).await?;

    if organizer.config().json_output {
        report.emit();
    } else if report.errors() > 0 {
        for failed in report.results.iter().filter(|r| !r.is_success()) {
            warn!(
                "{}: {}",
                failed.original_file,
                failed.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// CLI flags win over the config file
async fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(ref library) = args.library {
        config.library_path = library.clone();
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let mapping_json = match (&args.mapping, &args.mapping_file) {
        (Some(inline), _) => Some(inline.clone()),
        (None, Some(path)) => match tokio::fs::read_to_string(path).await {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Could not read mapping file {}: {}", path.display(), e);
                Some(String::new())
            }
        },
        (None, None) => None,
    };
    if let Some(json) = mapping_json {
        config.genre_patterns = match GenrePatternTable::from_json(&json) {
            Ok(table) => table,
            Err(e) => {
                warn!("{}, continuing without genre mapping", e);
                GenrePatternTable::default()
            }
        };
    }

    if let Some(ref key) = args.grok_key {
        if !key.trim().is_empty() {
            config.classifier.api_key = Some(key.clone());
        }
    }
    if let Some(ref endpoint) = args.grok_endpoint {
        config.classifier.endpoint = endpoint.clone();
    }
    if let Some(ref model) = args.grok_model {
        config.classifier.model = model.clone();
    }
    if let Some(ref prompt) = args.grok_prompt {
        if !prompt.trim().is_empty() {
            config.classifier.system_prompt = Some(prompt.clone());
        }
    }
    if let Some(timeout) = args.timeout {
        config.classifier.timeout_secs = timeout;
    }
    if !args.extensions.is_empty() {
        config.extensions = args.extensions.clone();
    }

    config.dry_run |= args.dry_run;
    config.tags_only |= args.tags_only;
    config.json_output |= args.json;
}
