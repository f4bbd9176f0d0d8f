//! Fuzzy matching of parameter names.
//!
//! When a model reports a missing key, the servicer compares it against the
//! keys that were actually supplied and suggests the closest one. Scores use
//! gestalt pattern matching: find the longest common block, recurse on what
//! lies left and right of it, and count matched characters `M`. The score is
//! `2 * M / (len(a) + len(b))`, in `[0, 1]`.

/// Similarity between two strings, 0 (nothing in common) to 1 (identical).
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_characters(&a, &b) as f64 / total as f64
}

/// The expected key most similar to `unknown_key`.
///
/// Ties go to the key seen first. `None` if there are no expected keys.
pub fn closest_match<I, S>(expected_keys: I, unknown_key: &str) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut best: Option<(f64, S)> = None;
    for key in expected_keys {
        let score = similarity(unknown_key, key.as_ref());
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, key));
        }
    }
    best.map(|(_, key)| key.as_ref().to_string())
}

/// Advisory tail for an error message about `unknown_key`.
///
/// Empty when there is nothing to suggest.
pub fn suggestion<I, S>(expected_keys: I, unknown_key: &str) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match closest_match(expected_keys, unknown_key) {
        Some(candidate) => format!("\nMaybe you meant: {} <-> {}?", candidate, unknown_key),
        None => String::new(),
    }
}

fn matched_characters(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matched_characters(&a[..i], &b[..j])
        + matched_characters(&a[i + size..], &b[j + size..])
}

/// Longest common contiguous block as `(start_in_a, start_in_b, len)`.
///
/// Among equally long blocks the one starting first in `a`, then in `b`, wins.
fn longest_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // run[j + 1] = length of the common block ending at a[i], b[j]
    let mut previous = vec![0usize; b.len() + 1];
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            current[j + 1] = if ca == cb { previous[j] + 1 } else { 0 };
            let len = current[j + 1];
            if len > best.2 {
                best = (i + 1 - len, j + 1 - len, len);
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}
