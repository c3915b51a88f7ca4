//! # Session Genre Cache
//!
//! Memoizzazione in memoria dei generi risolti, per coppia (artista, album).
//! Vive per un solo run: nessuna persistenza su disco.

use std::collections::HashMap;

/// Run-scoped `(main_artist, album) -> genre` map. Each key is written once.
#[derive(Debug, Default, Clone)]
pub struct SessionGenreCache {
    entries: HashMap<(String, String), String>,
}

impl SessionGenreCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, main_artist: &str, album: &str) -> Option<&str> {
        self.entries
            .get(&(main_artist.to_string(), album.to_string()))
            .map(String::as_str)
    }

    /// Store a genre for the key. Returns `false` when the key was already set;
    /// the first value is kept.
    pub fn insert(&mut self, main_artist: &str, album: &str, genre: &str) -> bool {
        let key = (main_artist.to_string(), album.to_string());
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, genre.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
