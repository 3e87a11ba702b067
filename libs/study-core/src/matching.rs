//! Smart grading of free-text answers.
//!
//! Both answers are normalized, then compared by Levenshtein distance.
//! Grading never fails: any two strings produce a similarity in [0, 1].

use serde::{Deserialize, Serialize};

/// Similarity at or above which an answer is accepted.
pub const DEFAULT_THRESHOLD: f64 = 0.85;

const ARTICLES: [&str; 3] = ["the", "a", "an"];
const PUNCTUATION: [char; 8] = ['.', ',', '!', '?', ';', ':', '\'', '"'];
const COPULAS: [&str; 7] = ["is", "are", "was", "were", "be", "been", "being"];

/// Result of grading a typed answer against the reference answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Similarity score between 0.0 and 1.0.
    pub similarity: f64,
    /// Whether the answer is considered correct.
    pub is_correct: bool,
    pub feedback: GradeFeedback,
    /// Normalized typed answer (for display).
    pub typed_normalized: String,
    /// Normalized reference answer (for display).
    pub correct_normalized: String,
}

/// Feedback tier shown to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeFeedback {
    Perfect,
    CloseMatch,
    Almost,
    Incorrect,
}

impl GradeFeedback {
    /// Tier for a similarity score.
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity >= 0.95 {
            Self::Perfect
        } else if similarity >= 0.85 {
            Self::CloseMatch
        } else if similarity >= 0.70 {
            Self::Almost
        } else {
            Self::Incorrect
        }
    }

    /// Message displayed under the answer.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Perfect => "Perfect!",
            Self::CloseMatch => "Correct! (accepted close match)",
            Self::Almost => "Almost! Check your answer.",
            Self::Incorrect => "Incorrect. Try again.",
        }
    }
}

/// Grade a typed answer against the reference answer.
pub fn grade_answer(typed: &str, correct: &str, threshold: f64) -> GradingResult {
    let typed_normalized = normalize_answer(typed);
    let correct_normalized = normalize_answer(correct);
    let similarity = normalized_similarity(&typed_normalized, &correct_normalized);

    GradingResult {
        similarity,
        is_correct: similarity >= threshold,
        feedback: GradeFeedback::from_similarity(similarity),
        typed_normalized,
        correct_normalized,
    }
}

/// Similarity of two answers after normalization.
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_similarity(&normalize_answer(a), &normalize_answer(b))
}

/// Whether `typed` is close enough to `correct`.
pub fn is_answer_correct(typed: &str, correct: &str, threshold: f64) -> bool {
    similarity(typed, correct) >= threshold
}

/// Normalize an answer before comparison.
///
/// Steps run in order, each on the output of the previous one: lowercase,
/// trim, drop one leading article, drop punctuation, collapse whitespace,
/// drop copulas that sit between two spaces. Hyphens are kept.
pub fn normalize_answer(answer: &str) -> String {
    let lowered = answer.to_lowercase();
    let trimmed = lowered.trim();
    let without_article = strip_leading_article(trimmed);
    let without_punctuation: String = without_article
        .chars()
        .filter(|c| !PUNCTUATION.contains(c))
        .collect();
    let collapsed = collapse_whitespace(&without_punctuation);
    remove_copulas(&collapsed)
}

fn strip_leading_article(s: &str) -> &str {
    for article in ARTICLES {
        if let Some(rest) = s.strip_prefix(article) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim_start();
            }
        }
    }
    s
}

/// Replace every run of whitespace with one space. Ends are not trimmed.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Drop copulas with a space on both sides.
///
/// Expects single-space separated input. A removed copula consumes the
/// space after it, so in "x is are y" only "is" goes.
fn remove_copulas(s: &str) -> String {
    let words: Vec<&str> = s.split(' ').collect();
    let last = words.len().saturating_sub(1);

    let mut kept = Vec::with_capacity(words.len());
    let mut space_consumed = false;
    for (i, word) in words.iter().enumerate() {
        let spaced = i > 0 && i < last && !space_consumed;
        if spaced && COPULAS.contains(word) {
            space_consumed = true;
            continue;
        }
        space_consumed = false;
        kept.push(*word);
    }
    kept.join(" ")
}

/// Calculate Levenshtein distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    // Use two rows instead of full matrix for memory efficiency
    let mut prev = (0..=n).collect::<Vec<_>>();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;

        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);

            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Calculate normalized similarity (0.0 to 1.0) of two already normalized strings.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein_distance(a, b);
    1.0 - (distance as f64 / max_len as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_levenshtein_distance() {
        assert_eq!(levenshtein_distance("", ""), 0);
        assert_eq!(levenshtein_distance("abc", "abc"), 0);
        assert_eq!(levenshtein_distance("abc", ""), 3);
        assert_eq!(levenshtein_distance("", "abc"), 3);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(levenshtein_distance("saturday", "sunday"), 3);
    }

    #[test]
    fn test_normalized_similarity() {
        assert_eq!(normalized_similarity("abc", "abc"), 1.0);
        assert_eq!(normalized_similarity("", ""), 1.0);
        assert_eq!(normalized_similarity("abc", ""), 0.0);
        assert!(normalized_similarity("kitten", "sitting") > 0.5);
        assert!(normalized_similarity("abc", "xyz") < 0.5);
    }

    #[test]
    fn test_normalize_steps() {
        assert_eq!(normalize_answer("  The Cat  "), "cat");
        assert_eq!(normalize_answer("An apple"), "apple");
        assert_eq!(normalize_answer("A    B"), "b");
        assert_eq!(normalize_answer("Hello, world!"), "hello world");
        assert_eq!(normalize_answer("it's \"quoted\""), "its quoted");
        assert_eq!(normalize_answer("tabs\tand\n\nnewlines"), "tabs and newlines");
    }

    #[test]
    fn test_article_needs_following_whitespace() {
        assert_eq!(normalize_answer("theory"), "theory");
        assert_eq!(normalize_answer("another"), "another");
        assert_eq!(normalize_answer("the"), "the");
    }

    #[test]
    fn test_only_one_leading_article_is_stripped() {
        assert_eq!(normalize_answer("the a cat"), "a cat");
    }

    #[test]
    fn test_copulas_removed_between_words() {
        assert_eq!(normalize_answer("Bitcoin is a protocol"), "bitcoin a protocol");
        assert_eq!(normalize_answer("they were being watched"), "they being watched");
        assert_eq!(normalize_answer("is it"), "is it");
        assert_eq!(normalize_answer("what it is"), "what it is");
    }

    #[test]
    fn test_punctuation_removal_can_leave_a_trailing_space() {
        assert_eq!(normalize_answer("cat ."), "cat ");
    }

    #[test]
    fn test_hyphens_are_kept() {
        assert_eq!(normalize_answer("proof-of-work"), "proof-of-work");
        assert_eq!(normalize_answer("The Proof of Work"), "proof of work");
    }

    #[test]
    fn test_proof_of_work_against_hyphenated_reference() {
        let result = grade_answer("The Proof of Work", "proof-of-work", DEFAULT_THRESHOLD);
        // two substitutions over thirteen characters
        assert!((result.similarity - (1.0 - 2.0 / 13.0)).abs() < 1e-12);
        assert!(!result.is_correct);
        assert_eq!(result.feedback, GradeFeedback::Almost);
    }

    #[test]
    fn test_similarity_identity_after_normalization() {
        assert_eq!(similarity("The Cat", "cat"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("   ", ""), 1.0);
    }

    #[test]
    fn test_similarity_is_symmetric() {
        let pairs = [
            ("power projection", "power protection"),
            ("The Proof of Work", "proof-of-work"),
            ("", "abc"),
            ("softwar", "soft war"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn test_threshold_is_configurable() {
        assert!(is_answer_correct("helo", "hello", 0.8));
        assert!(!is_answer_correct("helo", "hello", DEFAULT_THRESHOLD));
        assert!(!is_answer_correct("xyz", "hello", 0.5));
    }

    #[test]
    fn test_feedback_tiers() {
        assert_eq!(GradeFeedback::from_similarity(1.0), GradeFeedback::Perfect);
        assert_eq!(GradeFeedback::from_similarity(0.95), GradeFeedback::Perfect);
        assert_eq!(GradeFeedback::from_similarity(0.86), GradeFeedback::CloseMatch);
        assert_eq!(GradeFeedback::from_similarity(0.85), GradeFeedback::CloseMatch);
        assert_eq!(GradeFeedback::from_similarity(0.72), GradeFeedback::Almost);
        assert_eq!(GradeFeedback::from_similarity(0.70), GradeFeedback::Almost);
        assert_eq!(GradeFeedback::from_similarity(0.50), GradeFeedback::Incorrect);
        assert_eq!(
            GradeFeedback::CloseMatch.message(),
            "Correct! (accepted close match)"
        );
    }

    #[test]
    fn test_grade_answer_reports_normalized_forms() {
        let result = grade_answer(
            "The block size IS limited.",
            "block size limited",
            DEFAULT_THRESHOLD,
        );
        assert_eq!(result.typed_normalized, "block size limited");
        assert_eq!(result.correct_normalized, "block size limited");
        assert!(result.is_correct);
        assert_eq!(result.feedback, GradeFeedback::Perfect);
    }
}
