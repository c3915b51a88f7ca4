//! # Organizer Module
//!
//! Pipeline di organizzazione suddivisa in sottomoduli:
//! - `library_organizer`: Orchestratore del run (batch sequenziale)
//! - `track_processor`: Worker per singoli file
//! - `path_builder`: Logica di calcolo path centralizzata

pub mod library_organizer;
pub mod path_builder;
pub mod track_processor;

pub use library_organizer::LibraryOrganizer;
pub use path_builder::{Destination, PathBuilder};
pub use track_processor::TrackProcessor;
