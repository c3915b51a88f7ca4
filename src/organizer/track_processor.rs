//! # Track Processor Module
//!
//! Worker per l'elaborazione di un singolo file audio.
//! Legge i tag, deriva artista/titolo/genere, riscrive i tag e sposta il file.
//!
//! ## Ordine dei passi:
//! 1. Lettura metadati (errore = report `error`, nessuna scrittura)
//! 2. Estrazione featuring
//! 3. Calcolo destinazione + risoluzione genere
//! 4. Scrittura tag
//! 5. Creazione directory
//! 6. Spostamento (sovrascrive in silenzio)
//!
//! I tag vengono scritti prima dello spostamento: se lo spostamento fallisce
//! il file resta al suo posto con i tag già aggiornati.
//!
//! In `WriteMode::TagsOnly` si fermano al passo 4; in `WriteMode::DryRun`
//! al passo 3, con il log di cosa sarebbe successo.

use crate::config::WriteMode;
use crate::error::Result;
use crate::featuring::{extract_featuring, MainArtistOrigin};
use crate::file_manager::FileManager;
use crate::genre::{GenreRequest, GenreResolver, UNKNOWN_GENRE};
use crate::organizer::path_builder::PathBuilder;
use crate::report::{ProcessReport, ResolvedFields};
use crate::sanitizer::sanitize_name;
use crate::tag_store::{TagStore, TagUpdate};
use std::path::Path;
use std::sync::Arc;
use tracing::error;

/// Per-file worker. Owns the genre resolver, and through it the session cache.
pub struct TrackProcessor {
    tag_store: Arc<dyn TagStore>,
    resolver: GenreResolver,
    path_builder: PathBuilder,
    write_mode: WriteMode,
}

impl TrackProcessor {
    pub fn new(
        tag_store: Arc<dyn TagStore>,
        resolver: GenreResolver,
        path_builder: PathBuilder,
        write_mode: WriteMode,
    ) -> Self {
        Self {
            tag_store,
            resolver,
            path_builder,
            write_mode,
        }
    }

    pub fn resolver(&self) -> &GenreResolver {
        &self.resolver
    }

    /// Processa un singolo file. Never fails: errors end up in the report.
    pub async fn process(&mut self, file_path: &Path) -> ProcessReport {
        let original_file = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());
        let mut report = ProcessReport::new(original_file);

        if let Err(e) = self.run_steps(file_path, &mut report).await {
            error!("Failed to process {}: {}", file_path.display(), e);
            report.logs.push(format!("Error: {}", e));
            report.fail(e);
        }

        report
    }

    async fn run_steps(&mut self, file_path: &Path, report: &mut ProcessReport) -> Result<()> {
        let metadata = self.tag_store.read(file_path)?;
        report.metadata_before = Some(metadata.clone());

        let raw_genre = metadata
            .genre_raw
            .clone()
            .unwrap_or_else(|| UNKNOWN_GENRE.to_string());
        report.logs.push(format!("Reading metadata for: {}", report.original_file));
        report.logs.push(format!("Old genre found: {}", raw_genre));
        report.logs.push(match metadata.date {
            Some(ref date) => format!("Date found: {}", date),
            None => "No date found".to_string(),
        });

        let featuring = extract_featuring(
            metadata.artist_raw.as_deref(),
            metadata.album_artist.as_deref(),
            metadata.title.as_deref(),
        );
        report.logs.push(match featuring.main_artist_origin {
            MainArtistOrigin::AlbumArtist => {
                format!("Main artist from albumartist: {}", featuring.main_artist)
            }
            MainArtistOrigin::FirstListedArtist => {
                format!("Main artist from first listed artist: {}", featuring.main_artist)
            }
            MainArtistOrigin::Fallback => "No artist found, using Unknown".to_string(),
        });
        if !featuring.featured_artists.is_empty() {
            if featuring.title_annotated() {
                report.logs.push(format!(
                    "Detected features: {}. Title updated.",
                    featuring.featured_artists.join(", ")
                ));
            } else {
                report.logs.push(format!(
                    "Features already in title: {}",
                    featuring.original_title
                ));
            }
        }

        let album = match metadata.album.as_deref().map(sanitize_name) {
            Some(album) if !album.is_empty() => album,
            _ => "Unknown".to_string(),
        };

        let destination = self.path_builder.destination_for(
            file_path,
            &featuring.main_artist,
            &album,
            metadata.track_number.as_deref(),
            &featuring.final_title,
        );

        let resolution = self
            .resolver
            .resolve(
                GenreRequest {
                    raw_genre: &raw_genre,
                    main_artist: &featuring.main_artist,
                    album: &album,
                    destination: &destination.path,
                },
                &mut report.logs,
            )
            .await;

        report.resolved = Some(ResolvedFields {
            main_artist: featuring.main_artist.clone(),
            featured_artists: featuring.featured_artists.clone(),
            final_title: featuring.final_title.clone(),
            album,
            genre: resolution.genre.clone(),
            genre_source: resolution.source,
        });

        let update = TagUpdate {
            artist: featuring.main_artist,
            title: featuring.final_title,
            genre: resolution.genre,
            date: metadata.date,
        };

        if self.write_mode == WriteMode::DryRun {
            report.logs.push(format!(
                "Dry run: would save tags with genre: {} (Source: {})",
                update.genre, resolution.source
            ));
            report
                .logs
                .push(format!("Dry run: would move to: {}", destination.path.display()));
            report.complete(destination.path, destination.file_name);
            return Ok(());
        }

        self.tag_store.write(file_path, &update)?;
        report.logs.push(format!(
            "Saved tags with genre: {} (Source: {}) and date: {}",
            update.genre,
            resolution.source,
            update.date.as_deref().unwrap_or("none")
        ));

        if self.write_mode == WriteMode::TagsOnly {
            report.logs.push("Tags only: file left in place");
            let name = report.original_file.clone();
            report.complete(file_path.to_path_buf(), name);
            return Ok(());
        }

        if FileManager::ensure_dir(&destination.directory).await? {
            report
                .logs
                .push(format!("Created directory: {}", destination.directory.display()));
        }

        let outcome = FileManager::move_file(file_path, &destination.path).await?;
        if outcome.overwritten {
            report
                .logs
                .push(format!("Overwriting existing file: {}", destination.file_name));
        }
        report.logs.push(format!("Moved to: {}", destination.path.display()));

        report.moved = true;
        report.overwritten = outcome.overwritten;
        report.complete(destination.path, destination.file_name);

        Ok(())
    }
}
