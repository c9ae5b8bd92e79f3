//! Lexical variant generation for symptom phrases.
//!
//! Users rarely type a symptom the way it is catalogued. A phrase such as
//! `đau đầu` also shows up as `bị đau đầu`, `cảm thấy đau đầu` or
//! `đầu đau`; these forms are generated here so the synonym table can match
//! them exactly.

use crate::normalize::normalize;

/// Marker word for "having" a symptom.
pub const OCCURRENCE_MARKER: &str = "bị";

/// Marker phrase for "feeling" a sensation.
pub const SENSATION_MARKER: &str = "cảm thấy";

/// The pain keyword, also the trigger for word-order inversion.
pub const PAIN_KEYWORD: &str = "đau";

/// Keywords that mark a phrase as a felt sensation.
///
/// Pain, fatigue, difficulty, nausea, dizziness, heat and cold.
pub const SENSATION_KEYWORDS: &[&str] = &[
    "đau",
    "mệt",
    "mệt mỏi",
    "khó",
    "buồn nôn",
    "chóng mặt",
    "nóng",
    "lạnh",
];

/// Produces the deterministic variant set of a phrase.
///
/// The normalized phrase itself always comes first; duplicates are dropped.
///
/// # Examples
///
/// ```
/// use symptom_engine::generate_variants;
///
/// let variants = generate_variants("Đau bụng");
/// assert_eq!(
///     variants,
///     vec!["đau bụng", "bị đau bụng", "cảm thấy đau bụng", "bụng đau"]
/// );
/// ```
pub fn generate_variants(phrase: &str) -> Vec<String> {
    let phrase = normalize(phrase);
    if phrase.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![phrase.clone()];

    if !starts_with_word(&phrase, OCCURRENCE_MARKER) {
        push_unique(&mut variants, format!("{OCCURRENCE_MARKER} {phrase}"));
    }

    if !starts_with_word(&phrase, SENSATION_MARKER)
        && SENSATION_KEYWORDS
            .iter()
            .any(|keyword| contains_word(&phrase, keyword))
    {
        push_unique(&mut variants, format!("{SENSATION_MARKER} {phrase}"));
    }

    if let Some(body_part) = phrase
        .strip_prefix(PAIN_KEYWORD)
        .and_then(|rest| rest.strip_prefix(' '))
    {
        push_unique(&mut variants, format!("{body_part} {PAIN_KEYWORD}"));
    }

    variants
}

fn push_unique(variants: &mut Vec<String>, variant: String) {
    if !variants.contains(&variant) {
        variants.push(variant);
    }
}

/// Word-boundary prefix test on a normalized phrase.
fn starts_with_word(phrase: &str, word: &str) -> bool {
    phrase == word
        || phrase
            .strip_prefix(word)
            .is_some_and(|rest| rest.starts_with(' '))
}

/// Word-boundary containment test on a normalized phrase.
fn contains_word(phrase: &str, word: &str) -> bool {
    format!(" {phrase} ").contains(&format!(" {word} "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_phrase_gets_occurrence_form_only() {
        assert_eq!(generate_variants("sốt"), vec!["sốt", "bị sốt"]);
    }

    #[test]
    fn test_sensation_keywords() {
        let variants = generate_variants("chóng mặt");
        assert!(variants.contains(&"cảm thấy chóng mặt".to_string()));

        let variants = generate_variants("khó thở");
        assert!(variants.contains(&"cảm thấy khó thở".to_string()));

        // "khó" must match as a whole word
        let variants = generate_variants("khóc nhiều");
        assert!(!variants.contains(&"cảm thấy khóc nhiều".to_string()));
    }

    #[test]
    fn test_pain_inversion_requires_body_part() {
        assert!(generate_variants("đau ngực").contains(&"ngực đau".to_string()));

        let bare = generate_variants("đau");
        assert_eq!(bare, vec!["đau", "bị đau", "cảm thấy đau"]);

        // "đau" must be a whole leading word
        assert!(!generate_variants("đauxyz").iter().any(|v| v.ends_with(" đau")));
    }

    #[test]
    fn test_marked_phrase_not_remarked() {
        let variants = generate_variants("bị ngứa");
        assert_eq!(variants, vec!["bị ngứa"]);
    }

    #[test]
    fn test_deterministic_and_empty() {
        assert_eq!(generate_variants("đau lưng"), generate_variants("đau lưng"));
        assert!(generate_variants("   ").is_empty());
    }
}
