//! # Genre Strategies
//!
//! Gli stage della catena di fallback del genere, uno per tipo:
//! mapping, ereditarietà dal file di destinazione, cache di sessione,
//! classificazione remota. Ogni stage restituisce un risultato tipizzato;
//! è il resolver a decidere cosa farne.

use crate::error::Result;
use crate::genre::cache::SessionGenreCache;
use crate::genre::classifier::RemoteClassifier;
use crate::genre::mapper::{is_unknown_genre, GenreMapper};
use crate::report::{DecisionLog, GenreSource};
use crate::tag_store::TagStore;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Inputs available to every stage
pub struct GenreContext<'a> {
    pub raw_genre: &'a str,
    pub main_artist: &'a str,
    pub album: &'a str,
    /// Canonical destination of the track; the genre never changes it
    pub destination: &'a Path,
    pub cache: &'a SessionGenreCache,
}

/// Genre proposed by a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreMatch {
    pub genre: String,
    pub source: GenreSource,
}

impl GenreMatch {
    pub fn new(genre: impl Into<String>, source: GenreSource) -> Self {
        Self {
            genre: genre.into(),
            source,
        }
    }
}

/// One step of the fallback chain.
///
/// `Ok(None)` means the stage does not apply or had no answer; `Err` is a
/// recoverable failure the resolver logs before moving on.
#[async_trait]
pub trait GenreStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn try_resolve(
        &self,
        ctx: &GenreContext<'_>,
        log: &mut DecisionLog,
    ) -> Result<Option<GenreMatch>>;
}

/// Stage 1: user regex rules over the tag's own genre
pub struct MappingStrategy {
    mapper: GenreMapper,
}

impl MappingStrategy {
    pub fn new(mapper: GenreMapper) -> Self {
        Self { mapper }
    }
}

#[async_trait]
impl GenreStrategy for MappingStrategy {
    fn name(&self) -> &'static str {
        "mapping"
    }

    async fn try_resolve(
        &self,
        ctx: &GenreContext<'_>,
        log: &mut DecisionLog,
    ) -> Result<Option<GenreMatch>> {
        if is_unknown_genre(ctx.raw_genre) {
            return Ok(None);
        }

        let mapped = self.mapper.map(ctx.raw_genre);
        if is_unknown_genre(&mapped) {
            log.push(format!("Mapping turned {} into an unknown genre", ctx.raw_genre));
            return Ok(None);
        }

        if mapped != ctx.raw_genre {
            log.push(format!("Applied mapping: {} -> {}", ctx.raw_genre, mapped));
            Ok(Some(GenreMatch::new(mapped, GenreSource::Mapping)))
        } else {
            log.push(format!("Keeping original genre: {}", mapped));
            Ok(Some(GenreMatch::new(mapped, GenreSource::Original)))
        }
    }
}

/// Stage 2: inherit the genre of a file already sitting at the destination
pub struct ExistingFileStrategy {
    tag_store: Arc<dyn TagStore>,
}

impl ExistingFileStrategy {
    pub fn new(tag_store: Arc<dyn TagStore>) -> Self {
        Self { tag_store }
    }
}

#[async_trait]
impl GenreStrategy for ExistingFileStrategy {
    fn name(&self) -> &'static str {
        "existing file"
    }

    async fn try_resolve(
        &self,
        ctx: &GenreContext<'_>,
        log: &mut DecisionLog,
    ) -> Result<Option<GenreMatch>> {
        if !ctx.destination.is_file() {
            return Ok(None);
        }

        let existing = self.tag_store.read(ctx.destination)?;
        match existing.genre_raw.filter(|g| !is_unknown_genre(g)) {
            Some(genre) => {
                log.push(format!(
                    "Found existing file at destination. Inheriting genre: {}",
                    genre
                ));
                Ok(Some(GenreMatch::new(genre, GenreSource::ExistingFile)))
            }
            None => {
                log.push("Existing file at destination has no usable genre");
                Ok(None)
            }
        }
    }
}

/// Stage 3: genre resolved earlier in this run for the same artist and album
pub struct SessionCacheStrategy;

#[async_trait]
impl GenreStrategy for SessionCacheStrategy {
    fn name(&self) -> &'static str {
        "session cache"
    }

    async fn try_resolve(
        &self,
        ctx: &GenreContext<'_>,
        log: &mut DecisionLog,
    ) -> Result<Option<GenreMatch>> {
        Ok(ctx.cache.get(ctx.main_artist, ctx.album).map(|genre| {
            log.push(format!(
                "Detected previous detection for this album in cache: {}",
                genre
            ));
            GenreMatch::new(genre, GenreSource::SessionCache)
        }))
    }
}

/// Stage 4: ask the remote classifier
pub struct RemoteClassificationStrategy {
    classifier: Arc<dyn RemoteClassifier>,
}

impl RemoteClassificationStrategy {
    pub fn new(classifier: Arc<dyn RemoteClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl GenreStrategy for RemoteClassificationStrategy {
    fn name(&self) -> &'static str {
        "remote classification"
    }

    async fn try_resolve(
        &self,
        ctx: &GenreContext<'_>,
        log: &mut DecisionLog,
    ) -> Result<Option<GenreMatch>> {
        if !self.classifier.is_configured() {
            log.push("No classifier credential configured, skipping remote classification");
            return Ok(None);
        }

        log.push(format!(
            "No genre found. Querying classifier for {} - {}...",
            ctx.main_artist, ctx.album
        ));
        let genre = self.classifier.classify(ctx.main_artist, ctx.album).await?;

        if is_unknown_genre(&genre) {
            log.push("Classifier could not determine a genre.");
            return Ok(None);
        }

        log.push(format!("Classifier detected genre: {}", genre));
        Ok(Some(GenreMatch::new(genre, GenreSource::Ai)))
    }
}
