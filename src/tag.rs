//! Helpers for grammeme strings and composite labels.
//!
//! A grammeme string is a set of `Category=Value` pairs joined with `|`,
//! or `_` when the word carries no grammemes. A label combines a POS tag
//! with a normalized grammeme string as `POS#grammemes` and is the unit
//! the tagger classifies over.

use hashbrown::HashSet;

/// Grammatical categories excluded from labels.
///
/// These categories are unstable across annotation sources and are
/// dropped before any grammeme string enters a label.
pub const DROPPED_CATEGORIES: &[&str] = &["Animacy", "Aspect", "NumType"];

/// Normalizes a grammeme string.
///
/// Drops pairs of the categories in [`DROPPED_CATEGORIES`], sorts the
/// remaining pairs lexicographically, and rejoins them with `|`. An
/// empty result becomes `_`. The function is idempotent.
///
/// # Examples
///
/// ```
/// let norm = morfema::tag::normalize("Number=Sing|Case=Nom|Aspect=Imp");
/// assert_eq!(norm, "Case=Nom|Number=Sing");
/// ```
pub fn normalize(grammemes: &str) -> String {
    let mut pairs: Vec<&str> = grammemes
        .trim()
        .split('|')
        .filter(|pair| {
            let category = pair.split('=').next().unwrap_or(pair);
            !pair.is_empty() && !DROPPED_CATEGORIES.contains(&category)
        })
        .collect();
    if pairs.is_empty() {
        return "_".to_string();
    }
    pairs.sort_unstable();
    pairs.join("|")
}

/// Composes a label from a POS tag and a grammeme string.
///
/// The grammeme string is normalized, so composing from raw corpus or
/// analyzer tags and from already normalized ones yields the same label.
pub fn label(pos: &str, grammemes: &str) -> String {
    format!("{}#{}", pos, normalize(grammemes))
}

/// Splits a label into its POS tag and grammeme string.
///
/// Returns [`None`] if the separator is missing.
pub fn split_label(label: &str) -> Option<(&str, &str)> {
    label.split_once('#')
}

/// Returns the number of grammeme pairs two strings share.
///
/// `_` counts as an ordinary member, so two empty tags overlap in one
/// element.
pub fn overlap(a: &str, b: &str) -> usize {
    let set: HashSet<&str> = a.split('|').collect();
    b.split('|').filter(|pair| set.contains(pair)).count()
}
