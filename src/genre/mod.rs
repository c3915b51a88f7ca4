//! # Genre Module
//!
//! Risoluzione del genere suddivisa in sottomoduli:
//! - `mapper`: regole regex→genere fornite dall'utente
//! - `cache`: cache di sessione per (artista, album)
//! - `classifier`: classificatore remoto via HTTP
//! - `strategy`: i singoli stage della catena di fallback
//! - `resolver`: orchestratore della catena

pub mod cache;
pub mod classifier;
pub mod mapper;
pub mod resolver;
pub mod strategy;

pub use cache::SessionGenreCache;
pub use classifier::{ChatCompletionClassifier, RemoteClassifier};
pub use mapper::{is_unknown_genre, GenreMapper, GenrePatternTable, UNKNOWN_GENRE};
pub use resolver::{GenreRequest, GenreResolution, GenreResolver};
pub use strategy::{GenreContext, GenreMatch, GenreStrategy};
