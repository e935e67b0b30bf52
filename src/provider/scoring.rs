//! Relevance scoring of search hits

/// Similarity of `query` and `title` in `0.0..=1.0`
///
/// Case-insensitive exact matches score 1.0. Everything else is scored by
/// the share of adjacent letter pairs both strings have in common, counted
/// per word.
pub(crate) fn calculate_score(query: &str, title: &str) -> f32 {
    let query = query.trim().to_lowercase();
    let title = title.trim().to_lowercase();

    if query.is_empty() || title.is_empty() {
        return 0.0;
    }
    if query == title {
        return 1.0;
    }

    let query_pairs = word_letter_pairs(&query);
    let mut title_pairs = word_letter_pairs(&title);
    let union = query_pairs.len() + title_pairs.len();
    if union == 0 {
        return 0.0;
    }

    let mut intersection = 0;
    for pair in &query_pairs {
        if let Some(pos) = title_pairs.iter().position(|p| p == pair) {
            intersection += 1;
            title_pairs.swap_remove(pos);
        }
    }

    (2 * intersection) as f32 / union as f32
}

fn word_letter_pairs(text: &str) -> Vec<(char, char)> {
    text.split_whitespace()
        .flat_map(|word| {
            let chars: Vec<char> = word.chars().collect();
            chars
                .windows(2)
                .map(|w| (w[0], w[1]))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// True if both years are known (non-zero) and different
pub(crate) fn year_differs(searched: Option<i32>, found: Option<i32>) -> bool {
    match (searched, found) {
        (Some(a), Some(b)) => a != 0 && b != 0 && a != b,
        _ => false,
    }
}

/// Score penalty for a year mismatch: one hundredth per year apart
pub(crate) fn year_penalty(searched: Option<i32>, found: Option<i32>) -> f32 {
    match (searched, found) {
        (Some(a), Some(b)) if year_differs(searched, found) => (a - b).abs() as f32 / 100.0,
        _ => 0.0,
    }
}
