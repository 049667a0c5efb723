//! Text cleaning applied to user input before vectorization.
//!
//! Lowercases, strips URL-like tokens, ASCII punctuation and digits.

use once_cell::sync::Lazy;
use regex::Regex;

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"http\S+|www\S+|https\S+").expect("valid url pattern"));

static DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

/// Cleans free text for the vectorizer.
///
/// Never fails. The passes repeat until the text is stable, so removing
/// punctuation or digits cannot leave a fresh `http...`/`www...` token behind
/// and the function is idempotent.
pub fn clean_text(text: &str) -> String {
    let mut current = single_pass(text);
    loop {
        let next = single_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn single_pass(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_urls = URL_REGEX.replace_all(&lowered, "");
    let without_punct: String = without_urls
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    DIGIT_REGEX.replace_all(&without_punct, "").into_owned()
}
