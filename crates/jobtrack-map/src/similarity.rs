//! String similarity used for fuzzy header and field matching.

use std::collections::BTreeSet;

use rapidfuzz::distance::jaro_winkler;

/// Pluggable similarity measure; must be bounded in [0, 1] and symmetric.
pub type SimilarityFn = fn(&str, &str) -> f64;

/// Lowercases, turns punctuation and separators into spaces, and collapses
/// whitespace.
pub fn normalize_text(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of two strings in [0, 1].
///
/// Empty input on either side scores 0. Inputs equal after normalization (or
/// after dropping spaces, so "Applied Date" meets "applieddate") score 1.
/// Otherwise the larger of token-set Jaccard overlap and Jaro-Winkler on the
/// space-free forms.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize_text(a);
    let b = normalize_text(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    let a_compact: String = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b_compact: String = b.chars().filter(|c| !c.is_whitespace()).collect();
    if a_compact == b_compact {
        return 1.0;
    }

    // Jaro-Winkler is evaluated in a fixed argument order to stay symmetric.
    let (first, second) = if a_compact <= b_compact {
        (&a_compact, &b_compact)
    } else {
        (&b_compact, &a_compact)
    };
    let jaro = jaro_winkler::similarity(first.chars(), second.chars());

    token_jaccard(&a, &b).max(jaro).clamp(0.0, 1.0)
}

fn token_jaccard(a: &str, b: &str) -> f64 {
    let a: BTreeSet<&str> = a.split_whitespace().collect();
    let b: BTreeSet<&str> = b.split_whitespace().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}
