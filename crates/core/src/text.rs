/// True when `needle` occurs in `haystack` with no letter or digit glued to
/// either end, so "dune" does not match inside "dunes".
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

#[cfg(test)]
mod tests {
    use super::contains_words;

    #[test]
    fn matches_only_at_word_boundaries() {
        assert!(contains_words("is dune in stock?", "dune"));
        assert!(contains_words("where are you?", "where are you"));
        assert!(!contains_words("sand dunes", "dune"));
        assert!(!contains_words("i recall it", "call"));
        assert!(!contains_words("anything", ""));
    }
}
