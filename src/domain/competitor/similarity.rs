//! Title normalization and token-set similarity

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "of", "by", "to", "in", "on", "a", "an", "is", "at", "as", "not",
    "or", "but", "be", "are", "from", "set", "pack", "new",
];

const MIN_TOKEN_LEN: usize = 3;
const CONTAINMENT_BONUS: f64 = 0.2;
const SEARCH_TERM_TOKENS: usize = 3;

/// Lowercases, blanks out everything but ASCII letters, digits and
/// whitespace, collapses runs of whitespace and trims.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let blanked = NON_ALNUM.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&blanked, " ").trim().to_string()
}

/// Significant tokens of a title, in order, duplicates kept
pub fn title_tokens(title: &str) -> Vec<String> {
    normalize_title(title)
        .split(' ')
        .filter(|w| w.len() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Jaccard similarity of the two token sets, plus a bonus when one normalized
/// title contains the other. Always within [0, 1]; 0 when either side has no
/// significant tokens.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let tokens_a: HashSet<String> = title_tokens(a).into_iter().collect();
    let tokens_b: HashSet<String> = title_tokens(b).into_iter().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let intersection = tokens_a.intersection(&tokens_b).count();
    let union = tokens_a.union(&tokens_b).count().max(1);
    let jaccard = intersection as f64 / union as f64;

    let norm_a = normalize_title(a);
    let norm_b = normalize_title(b);
    let bonus = if norm_a.contains(&norm_b) || norm_b.contains(&norm_a) {
        CONTAINMENT_BONUS
    } else {
        0.0
    };

    (jaccard + bonus).min(1.0)
}

/// Short search phrase for a title: its first three significant tokens, else
/// its first three words, else empty.
pub fn pick_search_term(title: &str) -> String {
    let tokens = title_tokens(title);
    if !tokens.is_empty() {
        return tokens
            .into_iter()
            .take(SEARCH_TERM_TOKENS)
            .collect::<Vec<_>>()
            .join(" ");
    }

    normalize_title(title)
        .split(' ')
        .filter(|w| !w.is_empty())
        .take(SEARCH_TERM_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}
