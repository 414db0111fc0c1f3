//! Fuzzy matching of free-text item names.
//!
//! Similarity is the normalized Levenshtein distance on lowercased names, so
//! identical names score 1.0 and names with nothing in common score 0.0.

/// Minimum ratio for two names to be considered the same item
pub const MATCH_THRESHOLD: f64 = 0.7;

/// Case-insensitive similarity ratio in `0.0..=1.0`
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Find the existing key most similar to `input`.
///
/// Returns `None` unless the best ratio reaches [`MATCH_THRESHOLD`]. When
/// several keys share the best ratio, the first one in iteration order wins.
pub fn best_match<'a, I>(input: &str, keys: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = input.trim().to_lowercase();
    let mut best: Option<(&'a str, f64)> = None;

    for key in keys {
        let score = similarity(&needle, key);
        if score < MATCH_THRESHOLD {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((key, score)),
        }
    }

    best.map(|(key, _)| key)
}
