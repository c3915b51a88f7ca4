//! # Genre Mapper
//!
//! Applica le regole regex→genere fornite dall'utente a un genere grezzo.
//!
//! ## Responsabilità:
//! - Parsing della tabella `{"genre_patterns": {...}}` preservando l'ordine
//! - Compilazione dei pattern una volta per run (pattern invalidi saltati)
//! - Ricerca (non full match) sul genere in minuscolo, primo match vince

use crate::error::{OrganizeError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Literal genre used when nothing better is known
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Whether a genre value carries no information (`""`, `unknown`, `none`).
pub fn is_unknown_genre(genre: &str) -> bool {
    matches!(
        genre.trim().to_lowercase().as_str(),
        "" | "unknown" | "none"
    )
}

/// Ordered regex → genre table. Insertion order is priority order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenrePatternTable {
    #[serde(default)]
    pub genre_patterns: Map<String, Value>,
}

impl GenrePatternTable {
    /// Parse the JSON mapping document `{"genre_patterns": {regex: genre}}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| OrganizeError::Config(format!("invalid genre mapping: {}", e)))
    }

    /// Build a table from `(pattern, genre)` pairs, keeping their order.
    pub fn from_pairs<I, P, G>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, G)>,
        P: Into<String>,
        G: Into<String>,
    {
        let genre_patterns = pairs
            .into_iter()
            .map(|(p, g)| (p.into(), Value::String(g.into())))
            .collect();
        Self { genre_patterns }
    }

    pub fn len(&self) -> usize {
        self.genre_patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genre_patterns.is_empty()
    }
}

/// Compiled mapper over a [`GenrePatternTable`]
#[derive(Debug, Clone, Default)]
pub struct GenreMapper {
    rules: Vec<(Regex, String)>,
}

impl GenreMapper {
    /// Compile every pattern; malformed regexes and non-string targets are skipped.
    pub fn new(table: &GenrePatternTable) -> Self {
        let mut rules = Vec::with_capacity(table.len());

        for (pattern, target) in &table.genre_patterns {
            let Some(genre) = target.as_str() else {
                warn!("Skipping genre pattern {:?}: target is not a string", pattern);
                continue;
            };
            match Regex::new(pattern) {
                Ok(regex) => rules.push((regex, genre.to_string())),
                Err(e) => warn!("Skipping malformed genre pattern {:?}: {}", pattern, e),
            }
        }

        Self { rules }
    }

    /// Number of usable rules after compilation
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Map a raw genre. Unknown input gives `"Unknown"`, no match gives the input back.
    pub fn map(&self, raw_genre: &str) -> String {
        if is_unknown_genre(raw_genre) {
            return UNKNOWN_GENRE.to_string();
        }

        let lowered = raw_genre.to_lowercase();
        self.rules
            .iter()
            .find(|(regex, _)| regex.is_match(&lowered))
            .map(|(_, genre)| genre.clone())
            .unwrap_or_else(|| raw_genre.to_string())
    }
}
