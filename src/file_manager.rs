//! # File Management Module
//!
//! Questo modulo gestisce le operazioni sui file audio e la loro discovery.
//!
//! ## Responsabilità:
//! - Discovery piatta (non ricorsiva) dei file audio in una directory
//! - Filtro per estensione configurabile (case-insensitive)
//! - Creazione della directory di destinazione
//! - Spostamento con sovrascrittura silenziosa, con fallback copy+remove
//!   quando sorgente e destinazione sono su filesystem diversi
//!
//! ## Ordine:
//! I file vengono restituiti ordinati per nome, così l'ordine di elaborazione
//! (e quindi le scritture nella cache di sessione) è deterministico.
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_audio_files(Path::new("/downloads"), &["mp3".into()])?;
//! for file in files {
//!     // process file
//! }
//! ```

use crate::error::{OrganizeError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use walkdir::WalkDir;

/// Outcome of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    /// A different file occupied the destination and was replaced
    pub overwritten: bool,
}

/// Manages file operations and discovery
pub struct FileManager;

impl FileManager {
    /// Find the audio files directly inside `dir` (no recursion), sorted by name
    pub fn find_audio_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(OrganizeError::FileSystem(format!(
                "Source directory {} not found",
                dir.display()
            )));
        }

        let files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| Self::has_extension(path, extensions))
            .collect();

        Ok(files)
    }

    /// Check if a file has one of the given extensions
    pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
        match path.extension() {
            Some(ext) => {
                let ext_lower = ext.to_string_lossy().to_lowercase();
                extensions
                    .iter()
                    .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext_lower))
            }
            None => false,
        }
    }

    /// Lower-cased extension with its leading dot, or an empty string
    pub fn dotted_extension(path: &Path) -> String {
        path.extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }

    /// Create `dir` if needed. Returns `true` when it was created.
    pub async fn ensure_dir(dir: &Path) -> Result<bool> {
        if dir.is_dir() {
            return Ok(false);
        }
        fs::create_dir_all(dir).await.map_err(|e| {
            OrganizeError::FileSystem(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        Ok(true)
    }

    /// Move `source` to `destination`, replacing any file already there
    pub async fn move_file(source: &Path, destination: &Path) -> Result<MoveOutcome> {
        let overwritten = destination.exists() && !Self::same_file(source, destination);

        if let Err(rename_err) = fs::rename(source, destination).await {
            debug!(
                "Rename {} -> {} failed ({}), falling back to copy",
                source.display(),
                destination.display(),
                rename_err
            );
            fs::copy(source, destination).await.map_err(|e| {
                OrganizeError::FileSystem(format!(
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    e
                ))
            })?;
            fs::remove_file(source).await.map_err(|e| {
                OrganizeError::FileSystem(format!(
                    "Copied {} but could not remove the original: {}",
                    source.display(),
                    e
                ))
            })?;
        }

        Ok(MoveOutcome { overwritten })
    }

    fn same_file(a: &Path, b: &Path) -> bool {
        match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
