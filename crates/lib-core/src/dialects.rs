pub mod init;
pub mod syntax;

use ahash::{AHashMap, AHashSet};
use smol_str::SmolStr;

use crate::dialects::init::DialectKind;
use crate::dialects::syntax::{KeywordKind, LetterCase};

/// Everything the completion engine needs to know about a SQL dialect:
/// keyword inventories, identifier quoting, case folding and alias policy.
/// Concrete dialects are assembled by the `squill-lib-dialects` crate.
#[derive(Debug, Clone)]
pub struct Dialect {
    pub name: DialectKind,
    sets: AHashMap<&'static str, AHashSet<&'static str>>,
    struct_separator: char,
    catalog_separator: char,
    quote_pairs: Vec<(&'static str, &'static str)>,
    unquoted_case: LetterCase,
    supports_alias_in_select: bool,
    supports_alias_in_update: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            name: DialectKind::Ansi,
            sets: AHashMap::new(),
            struct_separator: '.',
            catalog_separator: '.',
            quote_pairs: vec![("\"", "\"")],
            unquoted_case: LetterCase::Mixed,
            supports_alias_in_select: true,
            supports_alias_in_update: false,
        }
    }
}

impl PartialEq for Dialect {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Dialect {
    pub fn new() -> Self {
        Dialect::default()
    }

    pub fn name(&self) -> DialectKind {
        self.name
    }

    pub fn sets(&self, label: &str) -> AHashSet<&'static str> {
        self.sets.get(label).cloned().unwrap_or_default()
    }

    pub fn sets_mut(&mut self, label: &'static str) -> &mut AHashSet<&'static str> {
        self.sets.entry(label).or_default()
    }

    pub fn update_keywords_set_from_multiline_string(
        &mut self,
        set_label: &'static str,
        values: &'static str,
    ) {
        let keywords = values.lines().map(str::trim).filter(|line| !line.is_empty());
        self.sets_mut(set_label).extend(keywords);
    }

    pub fn add_keyword_to_set(&mut self, set_label: &'static str, value: &'static str) {
        self.sets_mut(set_label).insert(value);
    }

    fn in_set(&self, label: &str, word: &str) -> bool {
        let upper = word.to_uppercase();
        self.sets
            .get(label)
            .is_some_and(|set| set.contains(upper.as_str()))
    }

    /// True for any word the dialect treats as a SQL keyword, reserved or not.
    pub fn is_keyword(&self, word: &str) -> bool {
        !word.is_empty()
            && (self.in_set("reserved_keywords", word)
                || self.in_set("unreserved_keywords", word)
                || self.in_set("functions", word)
                || self.in_set("type_keywords", word))
    }

    pub fn is_reserved_keyword(&self, word: &str) -> bool {
        self.in_set("reserved_keywords", word)
    }

    pub fn keyword_kind(&self, word: &str) -> Option<KeywordKind> {
        if word.is_empty() {
            return None;
        }
        if self.in_set("functions", word) {
            Some(KeywordKind::Function)
        } else if self.in_set("type_keywords", word) {
            Some(KeywordKind::Type)
        } else if self.in_set("reserved_keywords", word) {
            Some(KeywordKind::Keyword)
        } else if self.in_set("unreserved_keywords", word) {
            Some(KeywordKind::Other)
        } else {
            None
        }
    }

    /// Keywords the completion engine may propose, with their kinds.
    /// Type keywords are excluded; they never assist freestanding completion.
    pub fn completion_keywords(&self) -> impl Iterator<Item = (&'static str, KeywordKind)> + '_ {
        let reserved = self
            .sets
            .get("reserved_keywords")
            .into_iter()
            .flatten()
            .map(|&kw| (kw, KeywordKind::Keyword));
        let unreserved = self
            .sets
            .get("unreserved_keywords")
            .into_iter()
            .flatten()
            .map(|&kw| (kw, KeywordKind::Other));
        let functions = self
            .sets
            .get("functions")
            .into_iter()
            .flatten()
            .map(|&kw| (kw, KeywordKind::Function));
        reserved.chain(unreserved).chain(functions)
    }

    pub fn matched_keywords(&self, prefix: &str) -> Vec<&'static str> {
        let upper = prefix.to_uppercase();
        let mut matched: Vec<&'static str> = self
            .completion_keywords()
            .filter(|(kw, _)| kw.to_uppercase().starts_with(&upper))
            .map(|(kw, _)| kw)
            .collect();
        matched.sort_unstable();
        matched.dedup();
        matched
    }

    pub fn is_entity_query_word(&self, word: &str) -> bool {
        self.in_set("entity_query_words", word)
    }

    pub fn is_attribute_query_word(&self, word: &str) -> bool {
        self.in_set("attribute_query_words", word)
    }

    pub fn is_exec_query_word(&self, word: &str) -> bool {
        self.in_set("exec_query_words", word)
    }

    pub fn query_leads(&self) -> AHashSet<&'static str> {
        self.sets("query_leads")
    }

    pub fn dml_leads(&self) -> AHashSet<&'static str> {
        self.sets("dml_leads")
    }

    pub fn ddl_leads(&self) -> AHashSet<&'static str> {
        self.sets("ddl_leads")
    }

    pub fn execute_leads(&self) -> AHashSet<&'static str> {
        self.sets("execute_leads")
    }

    pub fn dml_keywords(&self) -> AHashSet<&'static str> {
        self.sets("dml_leads")
    }

    pub fn struct_separator(&self) -> char {
        self.struct_separator
    }

    pub fn set_struct_separator(&mut self, separator: char) {
        self.struct_separator = separator;
    }

    pub fn catalog_separator(&self) -> char {
        self.catalog_separator
    }

    pub fn set_catalog_separator(&mut self, separator: char) {
        self.catalog_separator = separator;
    }

    pub fn identifier_quote_pairs(&self) -> &[(&'static str, &'static str)] {
        &self.quote_pairs
    }

    pub fn set_identifier_quote_pairs(&mut self, pairs: Vec<(&'static str, &'static str)>) {
        assert!(!pairs.is_empty(), "a dialect must keep at least one quote pair");
        self.quote_pairs = pairs;
    }

    pub fn stores_unquoted_case(&self) -> LetterCase {
        self.unquoted_case
    }

    pub fn set_stores_unquoted_case(&mut self, case: LetterCase) {
        self.unquoted_case = case;
    }

    pub fn supports_alias_in_select(&self) -> bool {
        self.supports_alias_in_select
    }

    pub fn set_supports_alias_in_select(&mut self, value: bool) {
        self.supports_alias_in_select = value;
    }

    pub fn supports_alias_in_update(&self) -> bool {
        self.supports_alias_in_update
    }

    pub fn set_supports_alias_in_update(&mut self, value: bool) {
        self.supports_alias_in_update = value;
    }

    /// True when the token is wrapped in one of the dialect's quote pairs.
    pub fn is_quoted(&self, token: &str) -> bool {
        self.quote_pairs.iter().any(|(open, close)| {
            token.len() > open.len() + close.len()
                && token.starts_with(open)
                && token.ends_with(close)
        })
    }

    /// Wraps an identifier in the dialect's primary quote pair, doubling any
    /// embedded close quotes.
    pub fn quote(&self, ident: &str) -> String {
        let (open, close) = self.quote_pairs[0];
        let escaped = ident.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    /// Strips the outermost quote pair, undoing doubled close quotes.
    /// Unquoted input is returned unchanged.
    pub fn unquote(&self, token: &str) -> SmolStr {
        for (open, close) in &self.quote_pairs {
            if token.len() > open.len() + close.len()
                && token.starts_with(open)
                && token.ends_with(close)
            {
                let inner = &token[open.len()..token.len() - close.len()];
                return SmolStr::new(inner.replace(&format!("{close}{close}"), close));
            }
        }
        SmolStr::new(token)
    }

    /// Identifiers that cannot be written bare must be quoted on insertion.
    pub fn requires_quoting(&self, name: &str) -> bool {
        if name.is_empty() {
            return true;
        }
        let mut chars = name.chars();
        let first = chars.next().unwrap();
        if first.is_ascii_digit() {
            return true;
        }
        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            return true;
        }
        self.is_reserved_keyword(name)
    }

    /// Folds an unquoted identifier to the case the database stores it in.
    pub fn storage_fold(&self, name: &str) -> SmolStr {
        self.unquoted_case.apply(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dialect() -> Dialect {
        let mut d = Dialect::new();
        d.sets_mut("reserved_keywords").extend(["SELECT", "FROM"]);
        d.sets_mut("unreserved_keywords").insert("REPLACE");
        d.sets_mut("functions").insert("COUNT");
        d.sets_mut("type_keywords").insert("INTEGER");
        d
    }

    #[test]
    fn keyword_kinds() {
        let d = dialect();
        assert_eq!(d.keyword_kind("select"), Some(KeywordKind::Keyword));
        assert_eq!(d.keyword_kind("count"), Some(KeywordKind::Function));
        assert_eq!(d.keyword_kind("integer"), Some(KeywordKind::Type));
        assert_eq!(d.keyword_kind("replace"), Some(KeywordKind::Other));
        assert_eq!(d.keyword_kind("users"), None);
    }

    #[test]
    fn matched_keywords_is_prefix_based_and_skips_types() {
        let d = dialect();
        assert_eq!(d.matched_keywords("se"), vec!["SELECT"]);
        assert!(d.matched_keywords("int").is_empty());
    }

    #[test]
    fn quote_round_trip() {
        let d = Dialect::new();
        for raw in ["users", "odd name", "has\"quote"] {
            assert_eq!(d.unquote(&d.quote(raw)), raw);
        }
        assert_eq!(d.unquote("plain"), "plain");
    }

    #[test]
    fn requires_quoting_rules() {
        let d = dialect();
        assert!(d.requires_quoting("select"));
        assert!(d.requires_quoting("1st"));
        assert!(d.requires_quoting("odd name"));
        assert!(!d.requires_quoting("users"));
    }
}
