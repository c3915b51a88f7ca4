//! # Library Organizer
//!
//! Orchestratore del run: enumera la directory sorgente e delega ogni file
//! al `TrackProcessor`, in sequenza.
//!
//! ## Responsabilità:
//! - Costruzione della catena del genere a partire dalla `Config`
//! - Elaborazione strettamente sequenziale (la cache di sessione scritta da un
//!   file deve essere visibile al successivo)
//! - Progress bar e statistiche (solo in modalità non-JSON)
//! - Stop cooperativo: il file in corso termina, i successivi non partono

use crate::{
    config::{Config, WriteMode},
    file_manager::FileManager,
    genre::{
        ChatCompletionClassifier, GenreMapper, GenreResolver, RemoteClassifier, SessionGenreCache,
    },
    organizer::{path_builder::PathBuilder, track_processor::TrackProcessor},
    progress::{progress_message, OrganizeStats, ProgressManager},
    report::RunReport,
    tag_store::{LoftyTagStore, TagStore},
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Batch driver over one source directory
pub struct LibraryOrganizer {
    config: Config,
    processor: TrackProcessor,
    stop_flag: Arc<AtomicBool>,
}

impl LibraryOrganizer {
    /// Wire the organizer from a validated config with the given collaborators.
    ///
    /// `classifier` is ignored in `mapping` mode.
    pub fn new(
        config: Config,
        tag_store: Arc<dyn TagStore>,
        classifier: Option<Arc<dyn RemoteClassifier>>,
    ) -> Result<Self> {
        config.validate()?;

        let mapper = GenreMapper::new(&config.genre_patterns);
        if config.genre_patterns.len() > mapper.rule_count() {
            warn!(
                "{} of {} genre patterns were skipped",
                config.genre_patterns.len() - mapper.rule_count(),
                config.genre_patterns.len()
            );
        }

        let classifier = if config.uses_classifier() { classifier } else { None };
        let cache = SessionGenreCache::new();
        let resolver = GenreResolver::standard(mapper, tag_store.clone(), classifier, cache);
        let processor = TrackProcessor::new(
            tag_store,
            resolver,
            PathBuilder::new(config.library_path.clone()),
            config.write_mode(),
        );

        Ok(Self {
            config,
            processor,
            stop_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Production wiring: `lofty` tags and the chat-completions classifier
    pub fn from_config(config: Config) -> Result<Self> {
        let classifier: Option<Arc<dyn RemoteClassifier>> = if config.uses_classifier() {
            Some(Arc::new(ChatCompletionClassifier::new(config.classifier.clone())?))
        } else {
            None
        };
        Self::new(config, Arc::new(LoftyTagStore::new()), classifier)
    }

    /// Flag that asks the run to stop after the file in progress
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Processa tutti i file della directory sorgente
    pub async fn run(&mut self, source_dir: &Path) -> Result<RunReport> {
        let start_time = std::time::Instant::now();

        let files = FileManager::find_audio_files(source_dir, &self.config.extensions)?;
        self.log_configuration(source_dir, &files);

        let mut run_report = RunReport::default();
        if files.is_empty() {
            if !self.config.json_output {
                info!("No audio files found to process");
            }
            return Ok(run_report);
        }

        let progress = if self.config.json_output {
            ProgressManager::hidden()
        } else {
            ProgressManager::new(files.len() as u64)
        };
        let mut stats = OrganizeStats::new();

        for (index, file) in files.iter().enumerate() {
            if self.stop_flag.load(Ordering::SeqCst) {
                warn!(
                    "Stop requested, {} files left unprocessed",
                    files.len() - index
                );
                break;
            }

            let report = self.processor.process(file).await;
            stats.record(&report);
            progress.update(&progress_message(&report));
            run_report.push(report);
        }

        progress.finish(&stats.format_summary());
        self.print_final_stats(&stats, start_time.elapsed().as_secs_f64());

        Ok(run_report)
    }

    fn log_configuration(&self, source_dir: &Path, files: &[PathBuf]) {
        if self.config.json_output {
            return;
        }

        info!("Starting tag organization in: {}", source_dir.display());
        info!("Library: {}", self.config.library_path.display());
        info!(
            "Genre stages: {}",
            self.processor.resolver().stage_names().join(" -> ")
        );
        match self.config.write_mode() {
            WriteMode::DryRun => info!("Dry run mode: No tags will be written and no files moved"),
            WriteMode::TagsOnly => info!("Tags only mode: Files will be retagged in place"),
            WriteMode::Organize => {}
        }
        info!("Found {} audio files to process", files.len());
    }

    fn print_final_stats(&self, stats: &OrganizeStats, duration: f64) {
        if self.config.json_output {
            return;
        }

        info!("=== Organization Complete ===");
        info!("Files processed: {}", stats.files_processed);
        info!("Files moved: {}", stats.files_moved);
        info!("Files overwritten: {}", stats.files_overwritten);
        info!("Errors: {}", stats.errors);
        for (source, count) in &stats.genre_sources {
            info!("  • {}: {}", source, count);
        }
        info!(
            "Albums cached this run: {}",
            self.processor.resolver().cache().len()
        );
        info!("Duration: {:.2}s", duration);
    }
}
