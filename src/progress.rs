//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche del run.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` (solo in modalità non-JSON)
//! - Tracking statistiche: file spostati, errori, sovrascritture
//! - Conteggio per sorgente del genere (mapping, cache, AI, ...)
//! - Riepilogo finale
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:12] [========================================] 42/42 (100%) [OK] song.mp3 -> Jazz (AI)
//! ```

use crate::report::{GenreSource, ProcessReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;
use std::time::Duration;

/// Manages progress reporting for a run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_files: u64) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        ) {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// A manager that draws nothing (JSON mode)
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics for one run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OrganizeStats {
    pub files_processed: usize,
    pub files_moved: usize,
    pub files_overwritten: usize,
    pub errors: usize,
    pub genre_sources: BTreeMap<&'static str, usize>,
}

impl OrganizeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: &ProcessReport) {
        self.files_processed += 1;

        if !report.is_success() {
            self.errors += 1;
            return;
        }

        if report.moved {
            self.files_moved += 1;
        }
        if report.overwritten {
            self.files_overwritten += 1;
        }
        if let Some(source) = report.genre_source() {
            *self.genre_sources.entry(source.label()).or_insert(0) += 1;
        }
    }

    pub fn count_for(&self, source: GenreSource) -> usize {
        self.genre_sources.get(source.label()).copied().unwrap_or(0)
    }

    pub fn format_summary(&self) -> String {
        let sources = self
            .genre_sources
            .iter()
            .map(|(label, count)| format!("{}: {}", label, count))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Processed: {} files | Moved: {} | Overwritten: {} | Errors: {} | Genres [{}]",
            self.files_processed, self.files_moved, self.files_overwritten, self.errors, sources
        )
    }
}

/// Short progress line for one finished file
pub fn progress_message(report: &ProcessReport) -> String {
    match (&report.resolved, report.is_success()) {
        (Some(resolved), true) => format!(
            "[OK] {} -> {} ({})",
            report.original_file, resolved.genre, resolved.genre_source
        ),
        _ => format!("[ERROR] {}", report.original_file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ResolvedFields;

    fn success(name: &str, source: GenreSource, overwritten: bool) -> ProcessReport {
        let mut report = ProcessReport::new(name);
        report.resolved = Some(ResolvedFields {
            main_artist: "Alice".into(),
            featured_artists: vec![],
            final_title: "Song".into(),
            album: "Album".into(),
            genre: "Jazz".into(),
            genre_source: source,
        });
        report.moved = true;
        report.overwritten = overwritten;
        report
    }

    #[test]
    fn test_stats_record() {
        let mut stats = OrganizeStats::new();
        stats.record(&success("a.mp3", GenreSource::Ai, false));
        stats.record(&success("b.mp3", GenreSource::SessionCache, true));
        let mut failed = ProcessReport::new("c.mp3");
        failed.fail("boom");
        stats.record(&failed);

        assert_eq!(stats.files_processed, 3);
        assert_eq!(stats.files_moved, 2);
        assert_eq!(stats.files_overwritten, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.count_for(GenreSource::Ai), 1);
        assert_eq!(stats.count_for(GenreSource::Mapping), 0);
        assert!(stats.format_summary().contains("Session Cache: 1"));
    }

    #[test]
    fn test_unmoved_success_is_not_counted_as_moved() {
        let mut stats = OrganizeStats::new();
        let mut dry = success("a.mp3", GenreSource::Mapping, false);
        dry.moved = false;
        stats.record(&dry);

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_moved, 0);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.count_for(GenreSource::Mapping), 1);
    }

    #[test]
    fn test_progress_message() {
        assert_eq!(
            progress_message(&success("a.mp3", GenreSource::Ai, false)),
            "[OK] a.mp3 -> Jazz (AI)"
        );
        let mut failed = ProcessReport::new("c.mp3");
        failed.fail("boom");
        assert_eq!(progress_message(&failed), "[ERROR] c.mp3");
    }
}
