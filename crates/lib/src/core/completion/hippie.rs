use lazy_regex::{Lazy, Regex, lazy_regex};
use smol_str::SmolStr;
use squill_helpers::IndexSet;

static WORD: Lazy<Regex> = lazy_regex!(r"[A-Za-z_][A-Za-z0-9_$]*");

/// Distinct identifier-like words in the buffer that extend the typed
/// prefix, in order of first appearance. Dotted paths never match; the
/// word pattern stops at the separator.
pub(crate) fn document_words(text: &str, prefix: &str) -> Vec<SmolStr> {
    if prefix.is_empty() {
        return Vec::new();
    }
    let lower = prefix.to_lowercase();

    let mut words: IndexSet<SmolStr> = IndexSet::default();
    for found in WORD.find_iter(text) {
        let word = found.as_str();
        if word.len() >= prefix.len()
            && word.to_lowercase().starts_with(&lower)
            && !word.eq_ignore_ascii_case(prefix)
        {
            words.insert(SmolStr::new(word));
        }
    }
    words.into_iter().collect()
}
