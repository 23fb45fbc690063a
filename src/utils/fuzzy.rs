// Fuzzy matching for job id suggestions

/// Calculate Levenshtein distance between two strings
/// Returns the minimum number of single-character edits (insertions, deletions, substitutions)
/// needed to transform one string into another
pub fn levenshtein_distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    if s1_chars.is_empty() {
        return s2_chars.len();
    }
    if s2_chars.is_empty() {
        return s1_chars.len();
    }

    // Single rolling row
    let mut prev: Vec<usize> = (0..=s2_chars.len()).collect();
    let mut curr = vec![0; s2_chars.len() + 1];

    for (i, a) in s1_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b) in s2_chars.iter().enumerate() {
            let cost = if a == b { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[s2_chars.len()]
}

/// Candidates within `max_distance` edits of `search` (case-insensitive), closest first.
/// Returns at most 5.
pub fn find_near_matches(search: &str, candidates: &[String], max_distance: usize) -> Vec<(String, usize)> {
    let search_lower = search.to_lowercase();
    let mut matches: Vec<(String, usize)> = candidates
        .iter()
        .filter_map(|candidate| {
            let distance = levenshtein_distance(&search_lower, &candidate.to_lowercase());
            (distance <= max_distance).then(|| (candidate.clone(), distance))
        })
        .collect();

    matches.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    matches.truncate(5);
    matches
}

/// Candidates ending with `suffix` (case-insensitive). Lets `788` stand for `GY545476788`.
pub fn suffix_matches<'a>(suffix: &str, candidates: &'a [String]) -> Vec<&'a String> {
    let suffix_lower = suffix.to_lowercase();
    candidates
        .iter()
        .filter(|c| c.to_lowercase().ends_with(&suffix_lower))
        .collect()
}
