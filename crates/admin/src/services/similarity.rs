//! Token-set fuzzy string similarity.
//!
//! Scores are integers in `0..=100`. Word order and repeated words do not
//! affect the score, and a name whose words are a subset of another's scores
//! 100 against it.

use std::collections::BTreeSet;

use rapidfuzz::distance::indel;

/// Token-set similarity of two strings.
///
/// Both strings are processed (lowercased, every non-alphanumeric character
/// replaced by a space, trimmed) and split into sorted token sets. The score
/// is the best Indel ratio among the shared tokens and each side's full
/// token string. Either side being empty after processing scores 0.
#[must_use]
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let a = process(a);
    let b = process(b);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let sect = join(tokens_a.intersection(&tokens_b).copied());
    let diff_ab = join(tokens_a.difference(&tokens_b).copied());
    let diff_ba = join(tokens_b.difference(&tokens_a).copied());

    let combined_ab = concat(&sect, &diff_ab);
    let combined_ba = concat(&sect, &diff_ba);

    ratio(&sect, &combined_ab)
        .max(ratio(&sect, &combined_ba))
        .max(ratio(&combined_ab, &combined_ba))
}

/// Normalized Indel similarity, rounded to an integer percentage.
///
/// An empty side scores 0.
#[must_use]
pub fn ratio(a: &str, b: &str) -> u8 {
    let total = a.chars().count() + b.chars().count();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let distance = indel::distance(a.chars(), b.chars());
    let score = (100 * total.saturating_sub(distance) + total / 2) / total;
    u8::try_from(score).unwrap_or(100)
}

fn process(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_lowercase().collect::<String>()
            } else {
                " ".to_string()
            }
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn join<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

fn concat(sect: &str, diff: &str) -> String {
    match (sect.is_empty(), diff.is_empty()) {
        (true, _) => diff.to_string(),
        (_, true) => sect.to_string(),
        _ => format!("{sect} {diff}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_and_reordered_names() {
        assert_eq!(token_set_ratio("Corner Cafe", "Corner Cafe"), 100);
        assert_eq!(token_set_ratio("Corner Cafe", "Cafe Corner"), 100);
        assert_eq!(token_set_ratio("corner  cafe!", "CAFE-corner"), 100);
    }

    #[test]
    fn test_subset_scores_full_marks() {
        assert_eq!(token_set_ratio("Corner Cafe", "The Corner Cafe Braamfontein"), 100);
    }

    #[test]
    fn test_single_edit_scores() {
        assert_eq!(token_set_ratio("store", "stork"), 80);
        assert_eq!(token_set_ratio("stores", "storks"), 83);
    }

    #[test]
    fn test_dissimilar_names_score_low() {
        assert!(token_set_ratio("Corner Cafe", "Hardware Depot") < 50);
    }

    #[test]
    fn test_empty_after_processing_scores_zero() {
        assert_eq!(token_set_ratio("", "Corner Cafe"), 0);
        assert_eq!(token_set_ratio("!!!", "Corner Cafe"), 0);
        assert_eq!(token_set_ratio("   ", "   "), 0);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("abc", "abc"), 100);
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("", "abc"), 0);
        // 5 insertions/deletions over 13 characters
        assert_eq!(ratio("kitten", "sitting"), 62);
    }

    #[test]
    fn test_reordered_diff_tokens() {
        // sect is empty, so only the combined strings are compared
        assert_eq!(token_set_ratio("Totally Different Name", "Corner Cafe"), 30);
    }
}
