//! # Tag Organizer Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per i test di integrazione
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom del pipeline
//! - `sanitizer`: Normalizzazione dei nomi per il filesystem
//! - `featuring`: Artista principale e artisti ospiti
//! - `genre`: Mapping, cache di sessione, classificatore remoto e catena di fallback
//! - `tag_store`: Lettura/scrittura dei tag audio
//! - `file_manager`: Discovery dei file audio e spostamenti
//! - `organizer`: Orchestratore del run e worker per singolo file
//! - `progress`: Progress tracking e statistiche
//! - `report`: Report per file e per run
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use tag_organizer::{Config, LibraryOrganizer};
//!
//! let config = Config { library_path: "/music".into(), ..Default::default() };
//! let mut organizer = LibraryOrganizer::from_config(config)?;
//! let report = organizer.run(Path::new("/downloads")).await?;
//! report.emit();
//! ```

pub mod config;
pub mod error;
pub mod featuring;
pub mod file_manager;
pub mod genre;
pub mod organizer;
pub mod progress;
pub mod report;
pub mod sanitizer;
pub mod tag_store;

pub use config::{ClassificationMode, ClassifierSettings, Config};
pub use error::OrganizeError;
pub use genre::{GenrePatternTable, GenreResolver, RemoteClassifier, SessionGenreCache};
pub use organizer::{LibraryOrganizer, PathBuilder, TrackProcessor};
pub use report::{GenreSource, ProcessReport, RunReport};
pub use tag_store::{LoftyTagStore, TagStore, TagUpdate, TrackMetadata};
