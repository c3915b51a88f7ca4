//! # Report Module
//!
//! Questo modulo definisce il report strutturato per file e per run.
//!
//! ## Responsabilità:
//! - `DecisionLog`: traccia append-only di ogni decisione presa su un file
//! - `GenreSource`: da quale stage del resolver proviene il genere
//! - `ResolvedFields`: campi derivati scritti nei tag
//! - `ProcessReport`: record per file (successo o errore)
//! - `RunReport`: sequenza ordinata dei report, emessa come JSON su stdout
//!
//! ## Esempio output:
//! ```json
//! {
//!   "results": [
//!     {
//!       "original_file": "01 song.mp3",
//!       "status": "success",
//!       "genre_source": "AI",
//!       "final_path": "/music/Alice/Alice - Album - 01 - Song.mp3",
//!       "logs": ["Reading metadata for: 01 song.mp3", "..."]
//!     }
//!   ]
//! }
//! ```

use crate::genre::UNKNOWN_GENRE;
use crate::tag_store::TrackMetadata;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Append-only log of the decisions taken for one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionLog(Vec<String>);

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        debug!("{}", entry);
        self.0.push(entry);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any entry contains `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.0.iter().any(|e| e.contains(needle))
    }
}

/// Stage that produced the final genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenreSource {
    Original,
    Mapping,
    ExistingFile,
    SessionCache,
    #[serde(rename = "AI")]
    Ai,
    Unknown,
}

impl GenreSource {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Mapping => "Mapping",
            Self::ExistingFile => "Existing File",
            Self::SessionCache => "Session Cache",
            Self::Ai => "AI",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for GenreSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields derived for a track. Built completely before any tag is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedFields {
    pub main_artist: String,
    pub featured_artists: Vec<String>,
    pub final_title: String,
    pub album: String,
    pub genre: String,
    pub genre_source: GenreSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessStatus {
    Success,
    Error,
}

/// Per-file outcome of the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessReport {
    pub original_file: String,
    pub status: ProcessStatus,
    pub error: Option<String>,
    pub metadata_before: Option<TrackMetadata>,
    pub resolved: Option<ResolvedFields>,
    pub final_path: Option<PathBuf>,
    pub final_name: Option<String>,
    /// The file was relocated (false in dry-run and tags-only runs)
    #[serde(default)]
    pub moved: bool,
    #[serde(default)]
    pub overwritten: bool,
    pub logs: DecisionLog,
    /// Flat keys for dashboards that read a one-line summary
    #[serde(flatten)]
    pub summary: Option<ReportSummary>,
}

/// Top-level summary keys of a successful report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub artist: String,
    pub title: String,
    pub genre: String,
    /// Human label of the genre source (`Existing File`, `AI`, ...)
    pub genre_source: String,
    pub old_genre: String,
    pub new_path: PathBuf,
}

impl ProcessReport {
    pub fn new(original_file: impl Into<String>) -> Self {
        Self {
            original_file: original_file.into(),
            status: ProcessStatus::Success,
            error: None,
            metadata_before: None,
            resolved: None,
            final_path: None,
            final_name: None,
            moved: false,
            overwritten: false,
            logs: DecisionLog::new(),
            summary: None,
        }
    }

    /// Record where the file ended up (or would end up) and fill the summary keys
    pub fn complete(&mut self, final_path: PathBuf, final_name: String) {
        if let Some(ref resolved) = self.resolved {
            let old_genre = self
                .metadata_before
                .as_ref()
                .and_then(|m| m.genre_raw.clone())
                .unwrap_or_else(|| UNKNOWN_GENRE.to_string());
            self.summary = Some(ReportSummary {
                artist: resolved.main_artist.clone(),
                title: resolved.final_title.clone(),
                genre: resolved.genre.clone(),
                genre_source: resolved.genre_source.label().to_string(),
                old_genre,
                new_path: final_path.clone(),
            });
        }
        self.final_path = Some(final_path);
        self.final_name = Some(final_name);
    }

    /// Mark the report as failed with the error's message
    pub fn fail(&mut self, error: impl fmt::Display) {
        self.status = ProcessStatus::Error;
        self.error = Some(error.to_string());
    }

    pub fn is_success(&self) -> bool {
        self.status == ProcessStatus::Success
    }

    pub fn genre_source(&self) -> Option<GenreSource> {
        self.resolved.as_ref().map(|r| r.genre_source)
    }
}

/// Ordered reports of one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub results: Vec<ProcessReport>,
}

impl RunReport {
    pub fn push(&mut self, report: ProcessReport) {
        self.results.push(report);
    }

    pub fn successes(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn errors(&self) -> usize {
        self.results.len() - self.successes()
    }

    /// Emette il report JSON su stdout
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("Failed to serialize run report: {}", e),
        }
    }
}

/// Run-level failure rendered in JSON mode, e.g. a missing source directory
#[derive(Debug, Serialize)]
pub struct RunError {
    pub error: String,
}

impl RunError {
    pub fn emit(message: impl Into<String>) {
        if let Ok(json) = serde_json::to_string(&RunError { error: message.into() }) {
            println!("{}", json);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_source_wire_names() {
        assert_eq!(serde_json::to_value(GenreSource::Ai).unwrap(), "AI");
        assert_eq!(serde_json::to_value(GenreSource::SessionCache).unwrap(), "SessionCache");
        assert_eq!(GenreSource::ExistingFile.to_string(), "Existing File");
    }

    #[test]
    fn test_failed_report_serialization() {
        let mut report = ProcessReport::new("broken.mp3");
        report.logs.push("Reading metadata for: broken.mp3");
        report.fail("Tag read error: bad header");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "Tag read error: bad header");
        assert_eq!(json["logs"][0], "Reading metadata for: broken.mp3");
        assert!(json["final_path"].is_null());
    }

    #[test]
    fn test_completed_report_has_flat_summary_keys() {
        let mut report = ProcessReport::new("01.mp3");
        report.metadata_before = Some(TrackMetadata {
            genre_raw: Some("alt rock".into()),
            ..Default::default()
        });
        report.resolved = Some(ResolvedFields {
            main_artist: "Alice".into(),
            featured_artists: vec!["Bob".into()],
            final_title: "Song (feat. Bob)".into(),
            album: "Album".into(),
            genre: "Rock".into(),
            genre_source: GenreSource::ExistingFile,
        });
        let path = PathBuf::from("/music/Alice/Alice - Album - 01 - Song (feat. Bob).mp3");
        report.complete(path.clone(), "Alice - Album - 01 - Song (feat. Bob).mp3".into());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["artist"], "Alice");
        assert_eq!(json["title"], "Song (feat. Bob)");
        assert_eq!(json["genre"], "Rock");
        assert_eq!(json["genre_source"], "Existing File");
        assert_eq!(json["old_genre"], "alt rock");
        assert_eq!(json["new_path"], json["final_path"]);
        assert_eq!(json["resolved"]["genre_source"], "ExistingFile");

        let back: ProcessReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.summary, report.summary);
    }

    #[test]
    fn test_failed_report_has_no_summary_keys() {
        let mut report = ProcessReport::new("broken.mp3");
        report.fail("boom");

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("artist").is_none());
        assert!(json.get("new_path").is_none());
    }

    #[test]
    fn test_run_report_counts() {
        let mut run = RunReport::default();
        run.push(ProcessReport::new("a.mp3"));
        let mut failed = ProcessReport::new("b.mp3");
        failed.fail("boom");
        run.push(failed);

        assert_eq!(run.successes(), 1);
        assert_eq!(run.errors(), 1);
        assert_eq!(run.results[1].original_file, "b.mp3");
    }
}
