//! # Genre Resolver
//!
//! Orchestratore della catena di fallback del genere.
//!
//! ## Ordine degli stage:
//! 1. Mapping (o genere originale)
//! 2. Ereditarietà dal file già presente a destinazione
//! 3. Cache di sessione per (artista, album)
//! 4. Classificazione remota (solo in modalità `ai`)
//!
//! Il primo stage che produce un genere noto vince, gli altri non vengono
//! invocati. Un successo dello stage 4 viene memorizzato nella cache di
//! sessione. Nessun fallimento di stage è fatale per il file.

use crate::genre::cache::SessionGenreCache;
use crate::genre::classifier::RemoteClassifier;
use crate::genre::mapper::{is_unknown_genre, GenreMapper, UNKNOWN_GENRE};
use crate::genre::strategy::{
    ExistingFileStrategy, GenreContext, GenreMatch, GenreStrategy, MappingStrategy,
    RemoteClassificationStrategy, SessionCacheStrategy,
};
use crate::report::{DecisionLog, GenreSource};
use crate::tag_store::TagStore;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

/// Per-track inputs of a resolution
#[derive(Debug, Clone, Copy)]
pub struct GenreRequest<'a> {
    pub raw_genre: &'a str,
    pub main_artist: &'a str,
    pub album: &'a str,
    pub destination: &'a Path,
}

/// Final genre and the stage it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreResolution {
    pub genre: String,
    pub source: GenreSource,
}

/// Ordered fallback chain with the run's session cache
pub struct GenreResolver {
    strategies: Vec<Box<dyn GenreStrategy>>,
    cache: SessionGenreCache,
}

impl GenreResolver {
    pub fn new(strategies: Vec<Box<dyn GenreStrategy>>, cache: SessionGenreCache) -> Self {
        Self { strategies, cache }
    }

    /// The standard four-stage chain. Without a classifier the remote stage is left out.
    pub fn standard(
        mapper: GenreMapper,
        tag_store: Arc<dyn TagStore>,
        classifier: Option<Arc<dyn RemoteClassifier>>,
        cache: SessionGenreCache,
    ) -> Self {
        let mut strategies: Vec<Box<dyn GenreStrategy>> = vec![
            Box::new(MappingStrategy::new(mapper)),
            Box::new(ExistingFileStrategy::new(tag_store)),
            Box::new(SessionCacheStrategy),
        ];
        if let Some(classifier) = classifier {
            strategies.push(Box::new(RemoteClassificationStrategy::new(classifier)));
        }
        Self::new(strategies, cache)
    }

    pub fn cache(&self) -> &SessionGenreCache {
        &self.cache
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the chain for one track
    pub async fn resolve(
        &mut self,
        request: GenreRequest<'_>,
        log: &mut DecisionLog,
    ) -> GenreResolution {
        let found = self.first_known(request, log).await;

        match found {
            Some(GenreMatch { genre, source }) => {
                if source == GenreSource::Ai
                    && self.cache.insert(request.main_artist, request.album, &genre)
                {
                    log.push(format!(
                        "Cached genre {} for {} - {}",
                        genre, request.main_artist, request.album
                    ));
                }
                GenreResolution { genre, source }
            }
            None => {
                log.push("No genre could be determined, using Unknown");
                GenreResolution {
                    genre: UNKNOWN_GENRE.to_string(),
                    source: GenreSource::Unknown,
                }
            }
        }
    }

    async fn first_known(
        &self,
        request: GenreRequest<'_>,
        log: &mut DecisionLog,
    ) -> Option<GenreMatch> {
        let ctx = GenreContext {
            raw_genre: request.raw_genre,
            main_artist: request.main_artist,
            album: request.album,
            destination: request.destination,
            cache: &self.cache,
        };

        for strategy in &self.strategies {
            match strategy.try_resolve(&ctx, log).await {
                Ok(Some(found)) if !is_unknown_genre(&found.genre) => return Some(found),
                Ok(_) => {}
                Err(e) => {
                    warn!(stage = strategy.name(), "Genre stage failed: {}", e);
                    log.push(format!("Genre stage '{}' failed: {}", strategy.name(), e));
                }
            }
        }

        None
    }
}
