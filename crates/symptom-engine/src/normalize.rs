//! Text normalization.
//!
//! Every phrase stored in a [`SynonymTable`](crate::SynonymTable) and every
//! phrase looked up in it goes through [`normalize`], so both sides agree on
//! case and spacing.

/// Lower-cases text, collapses runs of whitespace to one space and trims.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
///
/// # Examples
///
/// ```
/// use symptom_engine::normalize;
///
/// assert_eq!(normalize("  Đau   ĐẦU\t"), "đau đầu");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.extend(word.chars().flat_map(char::to_lowercase));
    }
    out
}

/// Replaces punctuation noise with spaces, then normalizes.
///
/// Hyphens and apostrophes inside words are kept.
pub fn strip_punctuation(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if is_noise(c) { ' ' } else { c })
        .collect();
    normalize(&cleaned)
}

fn is_noise(c: char) -> bool {
    match c {
        '-' | '\'' => false,
        '…' | '“' | '”' | '‘' | '’' | '«' | '»' => true,
        _ => c.is_ascii_punctuation(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_and_lowercases() {
        assert_eq!(normalize("Tôi  bị\n\nSỐT   cao "), "tôi bị sốt cao");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let samples = [
            "  Đau   ĐẦU\t",
            "HO KHAN, sốt",
            "İstanbul ẞ straße",
            "a\u{00a0}b  c",
            "",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(strip_punctuation("Đau đầu, sốt cao!!"), "đau đầu sốt cao");
        assert_eq!(strip_punctuation("“ho” khan…"), "ho khan");
        assert_eq!(strip_punctuation("x-quang"), "x-quang");
        assert_eq!(strip_punctuation("?!."), "");
    }
}
