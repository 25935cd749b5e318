// Whole-word search in captured command output
use regex::Regex;

/// True if `word` occurs in `text` bounded by non-word characters or the text edges.
///
/// Same boundary rule as `\b`, but also works for names that start or end
/// with punctuation such as `@scope/pkg`.
pub fn contains_word(text: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }

    let pattern = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(word));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(text),
        Err(_) => false,
    }
}
