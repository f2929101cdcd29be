//! Lexical grounding diagnostic for generated answers.
//!
//! Only logs. An answer is never changed or rejected here.

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Share of answer content words below which a warning is logged.
pub const GROUNDING_WARN_THRESHOLD: f32 = 0.5;

/// Words shorter than this are ignored.
const MIN_CONTENT_WORD_CHARS: usize = 4;

fn content_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.unicode_words()
        .filter(|w| w.chars().count() >= MIN_CONTENT_WORD_CHARS)
        .map(str::to_lowercase)
}

/// Fraction of the answer's content words that also occur in the context.
///
/// An answer without content words scores 1.0.
pub fn grounding_score(answer: &str, context: &str) -> f32 {
    let context_words: HashSet<String> = content_words(context).collect();
    let answer_words: Vec<String> = content_words(answer).collect();

    if answer_words.is_empty() {
        return 1.0;
    }

    let grounded = answer_words
        .iter()
        .filter(|w| context_words.contains(*w))
        .count();

    grounded as f32 / answer_words.len() as f32
}

/// Log a warning when the answer looks weakly grounded in its context.
pub fn check(answer: &str, context: &str) -> f32 {
    let score = grounding_score(answer, context);

    if score < GROUNDING_WARN_THRESHOLD {
        tracing::warn!(
            "Answer may not be grounded in retrieved context (overlap {:.2} < {:.2})",
            score,
            GROUNDING_WARN_THRESHOLD
        );
    } else {
        tracing::debug!("Grounding overlap {:.2}", score);
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fully_grounded_answer() {
        let context = "Medicine delivery takes 24 to 48 hours after order confirmation.";
        let answer = "• Delivery takes 24 to 48 hours\n• After order confirmation";

        assert_eq!(grounding_score(answer, context), 1.0);
    }

    #[test]
    fn test_ungrounded_answer() {
        let context = "Visiting hours are 4pm to 7pm.";
        let answer = "Jupiter has dozens of moons orbiting";

        assert_eq!(grounding_score(answer, context), 0.0);
        assert!(check(answer, context) < GROUNDING_WARN_THRESHOLD);
    }

    #[test]
    fn test_case_and_punctuation_insensitive() {
        let score = grounding_score("DELIVERY, confirmation!", "delivery after confirmation");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_answer_without_content_words() {
        assert_eq!(grounding_score("- ok", "anything"), 1.0);
    }
}
