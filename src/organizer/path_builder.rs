//! # Path Builder Module
//!
//! Centralizza il calcolo del path canonico di destinazione.
//! Usato due volte per file: prima per lo stage 2 del resolver (controllo del
//! file esistente), poi per lo spostamento. Il genere non entra nel path,
//! quindi i due calcoli coincidono.

use crate::file_manager::FileManager;
use crate::sanitizer::sanitize_name;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fields that decide where a track lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathFields<'a> {
    pub main_artist: &'a str,
    pub album: &'a str,
    pub track_number: Option<&'a str>,
    pub final_title: &'a str,
    /// Extension with its leading dot (`.mp3`), or empty
    pub extension: &'a str,
}

/// Canonical destination of a track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub directory: PathBuf,
    pub file_name: String,
    pub path: PathBuf,
}

/// Calcola i path di destinazione sotto la radice della libreria
#[derive(Debug, Clone)]
pub struct PathBuilder {
    library_root: PathBuf,
}

impl PathBuilder {
    pub fn new(library_root: impl Into<PathBuf>) -> Self {
        Self {
            library_root: library_root.into(),
        }
    }

    /// `{root}/{artist}/{artist} - {album} - {NN} - {title}{ext}`
    pub fn destination(&self, fields: &PathFields<'_>) -> Destination {
        let artist = non_empty(sanitize_name(fields.main_artist));
        let album = non_empty(sanitize_name(fields.album));
        let title = non_empty(sanitize_name(fields.final_title));
        let track = format_track_number(fields.track_number);

        let directory = self.library_root.join(&artist);
        let file_name = format!(
            "{} - {} - {} - {}{}",
            artist, album, track, title, fields.extension
        );
        let path = directory.join(&file_name);

        debug!("Resolved destination: {}", path.display());

        Destination {
            directory,
            file_name,
            path,
        }
    }

    /// Destination for a source file, taking the extension from it
    pub fn destination_for(
        &self,
        source: &Path,
        main_artist: &str,
        album: &str,
        track_number: Option<&str>,
        final_title: &str,
    ) -> Destination {
        let extension = FileManager::dotted_extension(source);
        self.destination(&PathFields {
            main_artist,
            album,
            track_number,
            final_title,
            extension: &extension,
        })
    }
}

fn non_empty(name: String) -> String {
    if name.is_empty() {
        "Unknown".to_string()
    } else {
        name
    }
}

/// Track number as used in file names: the part before `/`, zero-padded to two.
///
/// Missing or blank values give `01`; non-numeric values are left-padded with `0`.
pub fn format_track_number(raw: Option<&str>) -> String {
    let number = raw
        .and_then(|r| r.split('/').next())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("1");

    match number.parse::<u32>() {
        Ok(n) => format!("{:02}", n),
        Err(_) => format!("{:0>2}", number),
    }
}
