//! End-to-end runs of the organizer over a temporary source directory,
//! with an in-memory tag store and a counting classifier.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tag_organizer::error::{OrganizeError, Result};
use tag_organizer::{
    ClassificationMode, Config, GenrePatternTable, GenreSource, LibraryOrganizer,
    RemoteClassifier, TagStore, TagUpdate, TrackMetadata,
};
use tempfile::TempDir;

#[derive(Default)]
struct MemoryTagStore {
    tags: Mutex<HashMap<PathBuf, TrackMetadata>>,
    writes: Mutex<Vec<(PathBuf, TagUpdate)>>,
}

impl MemoryTagStore {
    fn insert(&self, path: &Path, meta: TrackMetadata) {
        self.tags.lock().unwrap().insert(path.to_path_buf(), meta);
    }

    fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl TagStore for MemoryTagStore {
    fn read(&self, path: &Path) -> Result<TrackMetadata> {
        self.tags
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| OrganizeError::TagRead(format!("unsupported file {}", path.display())))
    }

    fn write(&self, path: &Path, update: &TagUpdate) -> Result<()> {
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), update.clone()));
        Ok(())
    }
}

struct CountingClassifier {
    answer: String,
    calls: AtomicUsize,
}

impl CountingClassifier {
    fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RemoteClassifier for CountingClassifier {
    fn is_configured(&self) -> bool {
        true
    }

    async fn classify(&self, _artist: &str, _album: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

struct Fixture {
    _dir: TempDir,
    source: PathBuf,
    library: PathBuf,
    tags: Arc<MemoryTagStore>,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("incoming");
        let library = dir.path().join("library");
        std::fs::create_dir(&source).unwrap();
        Self {
            source,
            library,
            tags: Arc::new(MemoryTagStore::default()),
            _dir: dir,
        }
    }

    fn add_track(&self, file_name: &str, meta: TrackMetadata) -> PathBuf {
        let path = self.source.join(file_name);
        std::fs::write(&path, file_name.as_bytes()).unwrap();
        self.tags.insert(&path, meta);
        path
    }

    fn config(&self, mode: ClassificationMode) -> Config {
        Config {
            library_path: self.library.clone(),
            mode,
            genre_patterns: GenrePatternTable::from_pairs([("rock", "Rock")]),
            json_output: true,
            ..Default::default()
        }
    }
}

fn track(title: &str, number: &str, genre: Option<&str>) -> TrackMetadata {
    TrackMetadata {
        title: Some(title.to_string()),
        artist_raw: Some("Alice".to_string()),
        album: Some("Album".to_string()),
        genre_raw: genre.map(str::to_string),
        date: Some("2020".to_string()),
        track_number: Some(number.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_album_classified_once_then_served_from_cache() {
    let fx = Fixture::new();
    fx.add_track("01.mp3", track("Song", "1", None));
    fx.add_track("02.mp3", track("Song", "2/9", Some("Unknown")));

    let classifier = Arc::new(CountingClassifier::answering("Jazz"));
    let mut organizer = LibraryOrganizer::new(
        fx.config(ClassificationMode::Ai),
        fx.tags.clone(),
        Some(classifier.clone()),
    )
    .unwrap();

    let report = organizer.run(&fx.source).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.errors(), 0);
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);

    let first = &report.results[0];
    let second = &report.results[1];
    assert_eq!(first.genre_source(), Some(GenreSource::Ai));
    assert_eq!(second.genre_source(), Some(GenreSource::SessionCache));
    assert_eq!(second.resolved.as_ref().unwrap().genre, "Jazz");

    let artist_dir = fx.library.join("Alice");
    assert_eq!(
        first.final_path.as_deref(),
        Some(artist_dir.join("Alice - Album - 01 - Song.mp3").as_path())
    );
    assert_eq!(
        second.final_path.as_deref(),
        Some(artist_dir.join("Alice - Album - 02 - Song.mp3").as_path())
    );
    assert!(artist_dir.join("Alice - Album - 01 - Song.mp3").exists());
    assert!(artist_dir.join("Alice - Album - 02 - Song.mp3").exists());
    assert!(!fx.source.join("01.mp3").exists());
    assert_eq!(fx.tags.write_count(), 2);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["genre_source"], "AI");
    assert_eq!(json["results"][1]["genre_source"], "Session Cache");
    assert_eq!(json["results"][1]["old_genre"], "Unknown");
    assert_eq!(json["results"][1]["new_path"], json["results"][1]["final_path"]);
}

#[tokio::test]
async fn test_tags_only_run_leaves_files_in_source() {
    let fx = Fixture::new();
    let source_file = fx.add_track("01.mp3", track("Song", "1", Some("rock")));

    let mut config = fx.config(ClassificationMode::Mapping);
    config.tags_only = true;
    let mut organizer = LibraryOrganizer::new(config, fx.tags.clone(), None).unwrap();

    let report = organizer.run(&fx.source).await.unwrap();
    let result = &report.results[0];

    assert!(result.is_success());
    assert!(!result.moved);
    assert!(source_file.exists());
    assert!(!fx.library.exists());
    assert_eq!(fx.tags.write_count(), 1);
    assert_eq!(result.final_path.as_deref(), Some(source_file.as_path()));
}

#[tokio::test]
async fn test_mapping_hit_never_calls_classifier() {
    let fx = Fixture::new();
    fx.add_track("01.mp3", track("Song", "1", Some("Alt Rock")));

    let classifier = Arc::new(CountingClassifier::answering("Jazz"));
    let mut organizer = LibraryOrganizer::new(
        fx.config(ClassificationMode::Ai),
        fx.tags.clone(),
        Some(classifier.clone()),
    )
    .unwrap();

    let report = organizer.run(&fx.source).await.unwrap();

    let resolved = report.results[0].resolved.as_ref().unwrap();
    assert_eq!(resolved.genre, "Rock");
    assert_eq!(resolved.genre_source, GenreSource::Mapping);
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_existing_destination_is_inherited_and_overwritten() {
    let fx = Fixture::new();
    fx.add_track("01.mp3", track("Song", "1", None));

    let existing = fx.library.join("Alice").join("Alice - Album - 01 - Song.mp3");
    std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
    std::fs::write(&existing, b"old copy").unwrap();
    fx.tags.insert(&existing, TrackMetadata {
        genre_raw: Some("Blues".to_string()),
        ..Default::default()
    });

    let classifier = Arc::new(CountingClassifier::answering("Jazz"));
    let mut organizer = LibraryOrganizer::new(
        fx.config(ClassificationMode::Ai),
        fx.tags.clone(),
        Some(classifier.clone()),
    )
    .unwrap();

    let report = organizer.run(&fx.source).await.unwrap();
    let result = &report.results[0];

    assert!(result.is_success());
    assert_eq!(result.genre_source(), Some(GenreSource::ExistingFile));
    assert_eq!(result.resolved.as_ref().unwrap().genre, "Blues");
    assert!(result.overwritten);
    assert!(result.logs.mentions("Overwriting existing file"));
    assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);

    let files: Vec<_> = std::fs::read_dir(existing.parent().unwrap())
        .unwrap()
        .collect();
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::read(&existing).unwrap(), b"01.mp3");
}

#[tokio::test]
async fn test_unreadable_file_does_not_stop_the_run() {
    let fx = Fixture::new();
    std::fs::write(fx.source.join("00-broken.mp3"), b"junk").unwrap();
    fx.add_track("01.mp3", track("Song", "1", Some("rock")));

    let config = fx.config(ClassificationMode::Mapping);
    let mut organizer = LibraryOrganizer::new(config, fx.tags.clone(), None).unwrap();

    let report = organizer.run(&fx.source).await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(!report.results[0].is_success());
    assert!(report.results[0].metadata_before.is_none());
    assert!(fx.source.join("00-broken.mp3").exists());
    assert!(report.results[1].is_success());
    assert_eq!(fx.tags.write_count(), 1);
}

#[tokio::test]
async fn test_mapping_mode_falls_back_to_unknown() {
    let fx = Fixture::new();
    fx.add_track("01.mp3", track("Song", "1", None));

    let config = fx.config(ClassificationMode::Mapping);
    let mut organizer = LibraryOrganizer::new(config, fx.tags.clone(), None).unwrap();

    let report = organizer.run(&fx.source).await.unwrap();
    let resolved = report.results[0].resolved.as_ref().unwrap();

    assert_eq!(resolved.genre, "Unknown");
    assert_eq!(resolved.genre_source, GenreSource::Unknown);
    assert!(report.results[0].is_success());
}

#[tokio::test]
async fn test_dry_run_reports_without_touching_files() {
    let fx = Fixture::new();
    let source_file = fx.add_track("01.mp3", track("Song", "1", Some("rock")));

    let mut config = fx.config(ClassificationMode::Mapping);
    config.dry_run = true;
    let mut organizer = LibraryOrganizer::new(config, fx.tags.clone(), None).unwrap();

    let report = organizer.run(&fx.source).await.unwrap();

    assert!(report.results[0].is_success());
    assert!(!report.results[0].moved);
    assert!(source_file.exists());
    assert!(!fx.library.exists());
    assert_eq!(fx.tags.write_count(), 0);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["status"], "success");
    assert_eq!(json["results"][0]["final_name"], "Alice - Album - 01 - Song.mp3");
}
