//! # Featuring Extractor
//!
//! Deriva l'artista principale e la lista deduplicata degli artisti ospiti
//! dal campo artista grezzo, e annota il titolo con `(feat. ...)`.
//!
//! ## Regole:
//! - Artista principale: album-artist se presente, altrimenti il primo
//!   token separato da virgola, altrimenti "Unknown"
//! - Candidati: split su `,` o `;`, sanitizzati, deduplicati in ordine
//! - Titolo: annotato solo se non contiene già "feat. "

use crate::sanitizer::sanitize_name;

/// Artist name used when no artist can be derived from the tags.
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Title used when the file carries no title tag.
pub const UNTITLED: &str = "Untitled";

/// Result of featuring extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeaturingInfo {
    pub main_artist: String,
    pub main_artist_origin: MainArtistOrigin,
    pub featured_artists: Vec<String>,
    /// Sanitized title before any annotation
    pub original_title: String,
    pub final_title: String,
}

impl FeaturingInfo {
    /// Whether a `(feat. ...)` suffix was appended
    pub fn title_annotated(&self) -> bool {
        self.final_title != self.original_title
    }
}

/// Where the main artist came from, for the decision log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainArtistOrigin {
    AlbumArtist,
    FirstListedArtist,
    Fallback,
}

/// Split a raw artist field on `,` or `;`, sanitize, drop empties and
/// deduplicate keeping the first occurrence.
pub fn split_artists(artist_raw: &str) -> Vec<String> {
    let mut artists: Vec<String> = Vec::new();
    for token in artist_raw.split([',', ';']) {
        let name = sanitize_name(token);
        if !name.is_empty() && !artists.contains(&name) {
            artists.push(name);
        }
    }
    artists
}

/// Pick the main artist, preferring the album artist.
pub fn main_artist(
    artist_raw: Option<&str>,
    album_artist: Option<&str>,
) -> (String, MainArtistOrigin) {
    if let Some(album_artist) = album_artist.map(sanitize_name).filter(|a| !a.is_empty()) {
        return (album_artist, MainArtistOrigin::AlbumArtist);
    }

    let first = artist_raw
        .into_iter()
        .flat_map(|raw| raw.split(','))
        .map(sanitize_name)
        .find(|a| !a.is_empty());

    match first {
        Some(artist) => (artist, MainArtistOrigin::FirstListedArtist),
        None => (UNKNOWN_ARTIST.to_string(), MainArtistOrigin::Fallback),
    }
}

/// Extract main artist, featured artists and the annotated title.
pub fn extract_featuring(
    artist_raw: Option<&str>,
    album_artist: Option<&str>,
    title: Option<&str>,
) -> FeaturingInfo {
    let (main_artist, main_artist_origin) = main_artist(artist_raw, album_artist);

    let featured_artists: Vec<String> = artist_raw
        .map(split_artists)
        .unwrap_or_default()
        .into_iter()
        .filter(|a| *a != main_artist)
        .collect();

    let original_title = match title.map(sanitize_name) {
        Some(t) if !t.is_empty() => t,
        _ => UNTITLED.to_string(),
    };

    let final_title = if !featured_artists.is_empty() && !has_featuring(&original_title) {
        format!("{} (feat. {})", original_title, featured_artists.join(", "))
    } else {
        original_title.clone()
    };

    FeaturingInfo {
        main_artist,
        main_artist_origin,
        featured_artists,
        original_title,
        final_title,
    }
}

/// Whether a title already carries a featuring annotation
pub fn has_featuring(title: &str) -> bool {
    title.to_lowercase().contains("feat. ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_and_featuring_annotation() {
        let info = extract_featuring(Some("Alice, Bob; Alice"), None, Some("Song"));
        assert_eq!(info.main_artist, "Alice");
        assert_eq!(info.featured_artists, vec!["Bob".to_string()]);
        assert_eq!(info.final_title, "Song (feat. Bob)");
        assert!(info.title_annotated());
    }

    #[test]
    fn test_album_artist_wins() {
        let info = extract_featuring(Some("Bob, Carol"), Some("Alice "), Some("Song"));
        assert_eq!(info.main_artist, "Alice");
        assert_eq!(info.featured_artists, vec!["Bob".to_string(), "Carol".to_string()]);
        assert_eq!(info.final_title, "Song (feat. Bob, Carol)");
    }

    #[test]
    fn test_existing_annotation_is_kept() {
        let info = extract_featuring(Some("Alice, Bob"), None, Some("Song (Feat. Bob)"));
        assert_eq!(info.featured_artists, vec!["Bob".to_string()]);
        assert_eq!(info.final_title, "Song (Feat. Bob)");
        assert!(!info.title_annotated());
    }

    #[test]
    fn test_single_artist_leaves_title_alone() {
        let info = extract_featuring(Some("Alice"), None, Some("Song."));
        assert_eq!(info.main_artist, "Alice");
        assert!(info.featured_artists.is_empty());
        assert_eq!(info.final_title, "Song");
    }

    #[test]
    fn test_main_artist_only_splits_on_comma() {
        let (artist, origin) = main_artist(Some("Alice; Bob"), None);
        assert_eq!(artist, "Alice; Bob");
        assert_eq!(origin, MainArtistOrigin::FirstListedArtist);
    }

    #[test]
    fn test_missing_artist_and_title() {
        let info = extract_featuring(None, None, None);
        assert_eq!(info.main_artist, UNKNOWN_ARTIST);
        assert_eq!(info.main_artist_origin, MainArtistOrigin::Fallback);
        assert!(info.featured_artists.is_empty());
        assert_eq!(info.final_title, UNTITLED);
    }

    #[test]
    fn test_blank_album_artist_falls_through() {
        let (artist, origin) = main_artist(Some(", Bob"), Some("  "));
        assert_eq!(artist, "Bob");
        assert_eq!(origin, MainArtistOrigin::FirstListedArtist);
    }
}
