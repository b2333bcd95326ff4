use std::ops::Range;
use std::str::Chars;

use crate::dialects::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    QuotedIdent,
    StringLit,
    Number,
    Symbol,
    Whitespace,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub range: Range<usize>,
}

impl Token<'_> {
    pub fn is_code(&self) -> bool {
        !matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }
}

const EOF: char = '\0';

struct Cursor<'a> {
    text: &'a str,
    chars: Chars<'a>,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor {
            text,
            chars: text.chars(),
        }
    }

    fn position(&self) -> usize {
        self.text.len() - self.chars.as_str().len()
    }

    fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF)
    }

    fn peek_second(&self) -> char {
        let mut chars = self.chars.clone();
        chars.next();
        chars.next().unwrap_or(EOF)
    }

    fn shift(&mut self) -> char {
        self.chars.next().unwrap_or(EOF)
    }

    fn shift_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek() != EOF && predicate(self.peek()) {
            self.shift();
        }
    }

    fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }
}

fn is_word_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_word_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Tokenizes a statement, tolerating anything: an unterminated string,
/// quoted identifier or block comment simply runs to the end of the input.
pub fn scan<'a>(text: &'a str, dialect: &Dialect) -> Vec<Token<'a>> {
    let mut cursor = Cursor::new(text);
    let mut tokens = Vec::new();

    while !cursor.is_eof() {
        let start = cursor.position();
        let kind = next_kind(&mut cursor, dialect);
        let range = start..cursor.position();
        tokens.push(Token {
            kind,
            text: &text[range.clone()],
            range,
        });
    }

    tokens
}

fn next_kind(cursor: &mut Cursor, dialect: &Dialect) -> TokenKind {
    let c = cursor.peek();

    if c.is_whitespace() {
        cursor.shift_while(char::is_whitespace);
        return TokenKind::Whitespace;
    }

    if c == '-' && cursor.peek_second() == '-' {
        cursor.shift_while(|c| c != '\n');
        return TokenKind::Comment;
    }

    if c == '/' && cursor.peek_second() == '*' {
        cursor.shift();
        cursor.shift();
        loop {
            if cursor.is_eof() {
                break;
            }
            if cursor.peek() == '*' && cursor.peek_second() == '/' {
                cursor.shift();
                cursor.shift();
                break;
            }
            cursor.shift();
        }
        return TokenKind::Comment;
    }

    if c == '\'' {
        shift_delimited(cursor, '\'');
        return TokenKind::StringLit;
    }

    for (open, close) in dialect.identifier_quote_pairs() {
        let (Some(open), Some(close)) = (open.chars().next(), close.chars().next()) else {
            continue;
        };
        if c == open {
            shift_delimited(cursor, close);
            return TokenKind::QuotedIdent;
        }
    }

    if c.is_ascii_digit() {
        cursor.shift_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
        return TokenKind::Number;
    }

    if is_word_start(c) {
        cursor.shift_while(is_word_part);
        return TokenKind::Word;
    }

    cursor.shift();
    TokenKind::Symbol
}

// A doubled closing delimiter is an escape, so `'it''s'` is one token.
fn shift_delimited(cursor: &mut Cursor, close: char) {
    cursor.shift();
    loop {
        if cursor.is_eof() {
            break;
        }
        if cursor.peek() == close {
            cursor.shift();
            if cursor.peek() == close {
                cursor.shift();
                continue;
            }
            break;
        }
        cursor.shift();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(sql: &str) -> Vec<TokenKind> {
        let dialect = Dialect::new();
        scan(sql, &dialect)
            .into_iter()
            .filter(|t| t.is_code())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn scans_a_simple_select() {
        use TokenKind::*;
        assert_eq!(
            kinds("select a.b, 10 from \"T\" where x = 'y'"),
            vec![
                Word, Word, Symbol, Word, Symbol, Number, Word, QuotedIdent, Word, Word, Symbol,
                StringLit
            ]
        );
    }

    #[test]
    fn escaped_quotes_stay_in_one_token() {
        let dialect = Dialect::new();
        let tokens = scan("'it''s' \"a\"\"b\"", &dialect);
        assert_eq!(tokens[0].text, "'it''s'");
        assert_eq!(tokens[2].text, "\"a\"\"b\"");
    }

    #[test]
    fn unterminated_string_runs_to_eof() {
        let dialect = Dialect::new();
        let tokens = scan("where x = 'oops", &dialect);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::StringLit);
        assert_eq!(last.text, "'oops");
    }

    #[test]
    fn comments_are_non_code() {
        assert_eq!(kinds("-- line\nselect /* block */ 1").len(), 2);
    }
}
