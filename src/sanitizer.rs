//! # Name Sanitizer
//!
//! Normalizzazione pura delle stringhe per nomi sicuri sul filesystem.
//! Usata per artista, album e titolo prima di comporre path e tag.

/// Characters dropped from any name component.
const REMOVED_CHARS: [char; 4] = ['"', ':', '?', '¿'];

/// Produce a filesystem-safe version of a free-text name.
///
/// `/` becomes `, `, the characters `"`, `:`, `?` and `¿` are removed,
/// whitespace runs collapse to a single space and trailing periods are
/// stripped. Never fails; empty input yields an empty string.
///
/// The whitespace and trailing-period pass runs last so the result is
/// stable: `sanitize_name(&sanitize_name(x)) == sanitize_name(x)`.
pub fn sanitize_name(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    let replaced: String = name
        .replace('/', ", ")
        .chars()
        .filter(|c| !REMOVED_CHARS.contains(c))
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    collapsed
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_collapses_whitespace_and_trims() {
        assert_eq!(sanitize_name("  The   Beatles \t"), "The Beatles");
    }

    #[test]
    fn test_strips_trailing_periods() {
        assert_eq!(sanitize_name("Vol. 2..."), "Vol. 2");
        assert_eq!(sanitize_name("Mr."), "Mr");
    }

    #[test]
    fn test_replaces_slash() {
        assert_eq!(sanitize_name("AC/DC"), "AC, DC");
    }

    #[test]
    fn test_removes_forbidden_characters() {
        assert_eq!(sanitize_name("¿Qué: \"Pasa\"?"), "Qué Pasa");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize_name(""), "");
        assert_eq!(sanitize_name("   "), "");
        assert_eq!(sanitize_name("..."), "");
    }

    #[test]
    fn test_removal_does_not_leave_double_spaces() {
        assert_eq!(sanitize_name("Intro : Part 1"), "Intro Part 1");
        assert_eq!(sanitize_name("a/ b"), "a, b");
    }

    proptest! {
        #[test]
        fn test_sanitize_is_idempotent(input in ".*") {
            let once = sanitize_name(&input);
            prop_assert_eq!(sanitize_name(&once), once);
        }

        #[test]
        fn test_sanitized_names_are_path_safe(input in ".*") {
            let out = sanitize_name(&input);
            prop_assert!(!out.contains('/'));
            prop_assert!(!out.ends_with('.'));
            prop_assert!(!out.contains("  "));
        }
    }
}
