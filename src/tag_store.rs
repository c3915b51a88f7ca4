//! # Tag Store Module
//!
//! Questo modulo astrae la lettura/scrittura dei metadati incorporati nei file audio.
//!
//! ## Responsabilità:
//! - Definisce `TrackMetadata`, lo snapshot immutabile letto una volta per file
//! - Definisce `TagUpdate`, i campi risolti da riscrivere
//! - Definisce il trait `TagStore` usato dal processor e dallo stage 2 del resolver
//! - Implementa `LoftyTagStore` sopra `lofty` (ID3v2, Vorbis, MP4, APE)
//!
//! ## Date:
//! La data viene scritta come `RecordingDate` e, dove il formato ha un campo
//! anno separato (Vorbis `YEAR`, APE `Year`), anche come `Year` con lo stesso
//! valore. ID3v2 e MP4 non hanno un campo anno distinto: `TDRC` / `©day`
//! è già il campo anno, quindi lì resta solo `RecordingDate`.
//!
//! ## Tag mancante:
//! Se il file non ha il tag primario (es. MP3 con solo ID3v1) il nuovo tag
//! parte da una copia del tag esistente, così album e numero traccia non
//! vanno persi quando il nuovo tag diventa quello letto per primo.

use crate::error::{OrganizeError, Result};
use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::tag::{ItemKey, Tag, TagExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Metadata snapshot read from a file before any decision is taken
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub title: Option<String>,
    #[serde(rename = "artist")]
    pub artist_raw: Option<String>,
    pub album_artist: Option<String>,
    pub album: Option<String>,
    #[serde(rename = "genre")]
    pub genre_raw: Option<String>,
    pub date: Option<String>,
    pub track_number: Option<String>,
}

/// Resolved fields written back to the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUpdate {
    pub artist: String,
    pub title: String,
    pub genre: String,
    pub date: Option<String>,
}

/// Read/write access to a file's embedded tags
pub trait TagStore: Send + Sync {
    fn read(&self, path: &Path) -> Result<TrackMetadata>;

    fn write(&self, path: &Path, update: &TagUpdate) -> Result<()>;
}

/// [`TagStore`] backed by `lofty`
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyTagStore;

impl LoftyTagStore {
    pub fn new() -> Self {
        Self
    }

    fn text(tag: &Tag, key: ItemKey) -> Option<String> {
        tag.get_string(&key)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn extract(tag: &Tag) -> TrackMetadata {
        let date = Self::text(tag, ItemKey::OriginalReleaseDate)
            .or_else(|| Self::text(tag, ItemKey::RecordingDate))
            .or_else(|| Self::text(tag, ItemKey::Year));

        TrackMetadata {
            title: Self::text(tag, ItemKey::TrackTitle),
            artist_raw: Self::text(tag, ItemKey::TrackArtist),
            album_artist: Self::text(tag, ItemKey::AlbumArtist),
            album: Self::text(tag, ItemKey::AlbumTitle),
            genre_raw: Self::text(tag, ItemKey::Genre),
            date,
            track_number: Self::text(tag, ItemKey::TrackNumber),
        }
    }
}

impl TagStore for LoftyTagStore {
    fn read(&self, path: &Path) -> Result<TrackMetadata> {
        if !path.exists() {
            return Err(OrganizeError::TagRead(format!("file not found: {}", path.display())));
        }

        let tagged_file = lofty::read_from_path(path)
            .map_err(|e| OrganizeError::TagRead(format!("{}: {}", path.display(), e)))?;

        let metadata = match tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) {
            Some(tag) => Self::extract(tag),
            None => {
                debug!("No tags found in {}", path.display());
                TrackMetadata::default()
            }
        };

        Ok(metadata)
    }

    fn write(&self, path: &Path, update: &TagUpdate) -> Result<()> {
        let mut tagged_file = lofty::read_from_path(path)
            .map_err(|e| OrganizeError::TagWrite(format!("{}: {}", path.display(), e)))?;

        let tag_type = tagged_file.primary_tag_type();
        if tagged_file.tag(tag_type).is_none() {
            let seeded = match tagged_file.first_tag().cloned() {
                Some(mut existing) => {
                    debug!(
                        "Seeding {:?} tag from existing {:?} tag in {}",
                        tag_type,
                        existing.tag_type(),
                        path.display()
                    );
                    existing.re_map(tag_type);
                    existing
                }
                None => Tag::new(tag_type),
            };
            tagged_file.insert_tag(seeded);
        }
        let tag = tagged_file.tag_mut(tag_type).ok_or_else(|| {
            OrganizeError::TagWrite(format!(
                "{} does not support {:?} tags",
                path.display(),
                tag_type
            ))
        })?;

        tag.insert_text(ItemKey::TrackArtist, update.artist.clone());
        tag.insert_text(ItemKey::TrackTitle, update.title.clone());
        tag.insert_text(ItemKey::Genre, update.genre.clone());
        if let Some(ref date) = update.date {
            tag.insert_text(ItemKey::RecordingDate, date.clone());
            if !tag.insert_text(ItemKey::Year, date.clone()) {
                debug!("{:?} keeps the year in RecordingDate only", tag_type);
            }
        }

        tag.save_to_path(path, WriteOptions::default())
            .map_err(|e| OrganizeError::TagWrite(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }
}
