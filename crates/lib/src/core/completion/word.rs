use smol_str::SmolStr;
use squill_lib_core::dialects::Dialect;
use squill_lib_core::document::Document;

/// Most previous tokens the detector will walk back over before giving up
/// on finding a keyword.
const MAX_PREV_WORDS: usize = 5;

/// Longest run of punctuation/whitespace the detector scans through.
const MAX_DELIMITER_SCAN: usize = 64;

/// What the engine knows about the text around the cursor: the identifier
/// fragment being typed, the nearest keyword to the left, the non-keyword
/// tokens in between, and the delimiter run touching the fragment.
#[derive(Debug, Clone, Default)]
pub struct WordDetector {
    word_part: String,
    prev_key_word: String,
    prev_words: Vec<String>,
    prev_delimiter: String,
    prev_key_word_offset: Option<usize>,
    next_word: String,
    start_offset: usize,
    end_offset: usize,
    separator: char,
}

impl WordDetector {
    pub fn detect(document: &dyn Document, offset: usize, dialect: &Dialect) -> Self {
        let separator = dialect.struct_separator();
        let quote_chars: Vec<char> = dialect
            .identifier_quote_pairs()
            .iter()
            .flat_map(|(open, close)| open.chars().chain(close.chars()))
            .collect();
        let is_word_char = |c: char| {
            c.is_alphanumeric() || c == '_' || c == '$' || c == separator || quote_chars.contains(&c)
        };

        let offset = offset.min(document.len());

        let mut start = offset;
        while let Some(c) = document.char_before(start) {
            if !is_word_char(c) {
                break;
            }
            start -= c.len_utf8();
        }
        let word_part = document.slice(start..offset).unwrap_or_default().to_string();

        let mut detector = WordDetector {
            word_part,
            start_offset: start,
            end_offset: offset,
            separator,
            ..Default::default()
        };

        // Walk left: delimiter run, then token, repeated until a keyword
        // or the window is exhausted.
        let mut pos = start;
        for round in 0..MAX_PREV_WORDS {
            let delimiter_end = pos;
            let mut scanned = 0;
            while let Some(c) = document.char_before(pos) {
                if is_word_char(c) || scanned >= MAX_DELIMITER_SCAN {
                    break;
                }
                pos -= c.len_utf8();
                scanned += 1;
            }
            if round == 0 {
                let run = document.slice(pos..delimiter_end).unwrap_or_default();
                detector.prev_delimiter = run.chars().filter(|c| !c.is_whitespace()).collect();
            }

            let word_end = pos;
            while let Some(c) = document.char_before(pos) {
                if !is_word_char(c) {
                    break;
                }
                pos -= c.len_utf8();
            }
            if pos == word_end {
                break;
            }
            let token = document.slice(pos..word_end).unwrap_or_default();
            if dialect.is_reserved_keyword(token) {
                detector.prev_key_word = token.to_uppercase();
                detector.prev_key_word_offset = Some(pos);
                break;
            }
            detector.prev_words.push(token.to_string());
        }

        // And right, for the word following the cursor.
        let mut npos = offset;
        let mut scanned = 0;
        while let Some(c) = document.char_at(npos) {
            if is_word_char(c) || scanned >= MAX_DELIMITER_SCAN {
                break;
            }
            npos += c.len_utf8();
            scanned += 1;
        }
        let next_start = npos;
        while let Some(c) = document.char_at(npos) {
            if !is_word_char(c) {
                break;
            }
            npos += c.len_utf8();
        }
        detector.next_word = document
            .slice(next_start..npos)
            .unwrap_or_default()
            .to_string();

        detector
    }

    pub fn word_part(&self) -> &str {
        &self.word_part
    }

    /// Uppercased; empty when no keyword was found in the window.
    pub fn prev_key_word(&self) -> &str {
        &self.prev_key_word
    }

    /// Most recent first.
    pub fn prev_words(&self) -> &[String] {
        &self.prev_words
    }

    /// Punctuation between the word part and the nearest previous token,
    /// whitespace removed.
    pub fn prev_delimiter(&self) -> &str {
        &self.prev_delimiter
    }

    pub fn prev_key_word_offset(&self) -> Option<usize> {
        self.prev_key_word_offset
    }

    pub fn next_word(&self) -> &str {
        &self.next_word
    }

    /// Absolute span the editor replaces with the proposal.
    pub fn replacement_span(&self) -> (usize, usize) {
        (self.start_offset, self.end_offset)
    }

    pub fn set_word_part(&mut self, word: impl Into<String>) {
        self.word_part = word.into();
    }

    /// Moves the replacement start when the classifier rewrites the prefix.
    pub fn shift_offset(&mut self, delta: isize) {
        self.start_offset = self.start_offset.saturating_add_signed(delta);
    }

    pub fn clear_prev_key_word(&mut self) {
        self.prev_key_word.clear();
        self.prev_key_word_offset = None;
        self.prev_words.clear();
    }

    pub fn contains_separator(&self, token: &str) -> bool {
        token.contains(self.separator)
    }

    pub fn separator(&self) -> char {
        self.separator
    }
}

/// Splits a dotted identifier into segments, leaving quoted segments intact
/// even when they contain the separator.
pub fn split_identifier(dialect: &Dialect, token: &str) -> Vec<SmolStr> {
    let separator = dialect.struct_separator();
    let closers: Vec<(char, char)> = dialect
        .identifier_quote_pairs()
        .iter()
        .filter_map(|(open, close)| Some((open.chars().next()?, close.chars().next()?)))
        .collect();

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut closing: Option<char> = None;

    for c in token.chars() {
        if let Some(close) = closing {
            current.push(c);
            if c == close {
                closing = None;
            }
            continue;
        }
        if c == separator {
            segments.push(SmolStr::new(&current));
            current.clear();
            continue;
        }
        if let Some(&(_, close)) = closers.iter().find(|(open, _)| *open == c) {
            closing = Some(close);
        }
        current.push(c);
    }
    segments.push(SmolStr::new(&current));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use squill_lib_dialects::ansi;

    fn detect(sql_with_cursor: &str) -> WordDetector {
        let offset = sql_with_cursor.find('|').expect("cursor marker");
        let sql = sql_with_cursor.replace('|', "");
        let dialect = ansi::dialect();
        WordDetector::detect(&sql, offset, &dialect)
    }

    #[test]
    fn detects_word_and_previous_keyword() {
        let w = detect("SELECT * FROM use|");
        assert_eq!(w.word_part(), "use");
        assert_eq!(w.prev_key_word(), "FROM");
        assert_eq!(w.prev_words(), &[] as &[String]);
        assert_eq!(w.replacement_span(), (14, 17));
    }

    #[test]
    fn collects_non_keyword_words_and_delimiter() {
        let w = detect("INSERT INTO users (|");
        assert_eq!(w.word_part(), "");
        assert_eq!(w.prev_key_word(), "INTO");
        assert_eq!(w.prev_words(), &["users".to_string()]);
        assert_eq!(w.prev_delimiter(), "(");
    }

    #[test]
    fn dotted_fragments_are_one_word() {
        let w = detect("SELECT u.na| FROM users u");
        assert_eq!(w.word_part(), "u.na");
        assert_eq!(w.prev_key_word(), "SELECT");
        assert_eq!(w.next_word(), "FROM");
    }

    #[test]
    fn word_part_is_a_suffix_of_the_document_at_the_cursor() {
        let sql = "SELECT * FROM public.users";
        let dialect = ansi::dialect();
        for offset in [3, 10, 14, 21, 26] {
            let w = WordDetector::detect(&sql, offset, &dialect);
            assert!(sql[..offset].ends_with(w.word_part()), "offset {offset}");
        }
    }

    #[test]
    fn star_lands_in_the_delimiter() {
        let w = detect("SELECT *| FROM users");
        assert_eq!(w.word_part(), "");
        assert_eq!(w.prev_delimiter(), "*");
        assert_eq!(w.next_word(), "FROM");
    }

    #[test]
    fn detector_snapshot() {
        let w = detect("UPDATE orders o SET o.amount = 1 WHERE o.|");
        expect![[r#"
            WordDetector {
                word_part: "o.",
                prev_key_word: "WHERE",
                prev_words: [],
                prev_delimiter: "",
                prev_key_word_offset: Some(
                    33,
                ),
                next_word: "",
                start_offset: 39,
                end_offset: 41,
                separator: '.',
            }
        "#]]
        .assert_debug_eq(&w);
    }

    #[test]
    fn split_identifier_respects_quotes() {
        let dialect = ansi::dialect();
        let segments = split_identifier(&dialect, "public.\"My.Table\".col");
        assert_eq!(segments, vec!["public", "\"My.Table\"", "col"]);

        let segments = split_identifier(&dialect, "users.");
        assert_eq!(segments, vec!["users", ""]);
    }
}
