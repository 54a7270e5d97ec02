/// Words must be longer than this (in chars) to count towards partial matches
pub const MIN_SIGNIFICANT_WORD_LEN: usize = 3;

/// Lower-case and trim free text so casing and padding never cause misses
#[inline]
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whitespace tokens of an already normalized string
pub fn tokenize(normalized: &str) -> impl Iterator<Item = &str> {
    normalized.split_whitespace()
}

/// Tokens long enough to carry meaning on their own
///
/// Short fragments such as "of", "b12" or "t4" are dropped here; those are
/// covered by the synonym dictionary instead.
pub fn significant_words(normalized: &str) -> Vec<&str> {
    tokenize(normalized)
        .filter(|word| word.chars().count() > MIN_SIGNIFICANT_WORD_LEN)
        .collect()
}

/// Two-way substring test on normalized strings
///
/// An empty side never matches: `""` is a substring of everything and would
/// otherwise turn a blank field into a universal match.
#[inline]
pub fn contains_either(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}
