//! # Error Types Module
//!
//! Questo modulo definisce tutti i tipi di errore custom dell'organizer.
//!
//! ## Responsabilità:
//! - Definisce `OrganizeError` enum per categorizzare gli errori del pipeline
//! - Fornisce messaggi di errore descrittivi che finiscono nel report per file
//! - Integra con `thiserror` per automatic error conversion
//!
//! ## Categorie di errori:
//! - `TagRead` / `TagWrite`: lettura o scrittura dei tag falliti
//! - `ClassificationUnavailable`: classificatore remoto senza risposta utile
//! - `FileSystem`: creazione directory o spostamento fallito
//! - `Config`: tabella dei pattern o file di configurazione malformati
//! - `Io`: errori di I/O generici
//!
//! ## Politica di propagazione:
//! - Gli errori per file vengono convertiti in un report `status=error`
//! - `ClassificationUnavailable` e `Config` degradano a "Unknown" / nessun mapping
//!
//! ## Esempio:
//! ```rust,ignore
//! if !destination_dir.exists() {
//!     return Err(OrganizeError::FileSystem(format!("cannot create {}", dir.display())));
//! }
//! ```

/// Custom error types for tag organization
#[derive(thiserror::Error, Debug)]
pub enum OrganizeError {
    #[error("Tag read error: {0}")]
    TagRead(String),

    #[error("Tag write error: {0}")]
    TagWrite(String),

    #[error("Genre classification unavailable: {0}")]
    ClassificationUnavailable(String),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for the organizer components
pub type Result<T> = std::result::Result<T, OrganizeError>;
