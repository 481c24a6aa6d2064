//! Deterministic text normalization shared by lexical lookup and dedup keys.

use unicode_normalization::UnicodeNormalization;

/// Applies NFKC normalization, lowercases, replaces every non-alphanumeric
/// character with a single space, collapses runs of whitespace, and trims.
///
/// Pure and total: every `&str` input has a defined output, including the
/// empty string.
pub fn normalize(s: &str) -> String {
    let nfkc: String = s.nfkc().collect();
    let lowered = nfkc.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    let mut last_was_space = false;
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
            last_was_space = false;
        } else if !last_was_space {
            out.push(' ');
            last_was_space = true;
        }
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Lung Cancer", "lung cancer")]
    #[case("lung-carcinoma!!", "lung carcinoma")]
    #[case("  extra   spaces  ", "extra spaces")]
    #[case("", "")]
    #[case("café", "café")]
    fn normalizes_as_expected(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[test]
    fn is_idempotent() {
        let once = normalize("Non-Small Cell Lung Cancer (NSCLC)");
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }
}
