use std::fmt;
use std::sync::Arc;

use lazy_regex::{Lazy, Regex, lazy_regex};
use smol_str::SmolStr;
use squill_helpers::IndexMap;
use squill_lib_core::dialects::Dialect;
use squill_lib_core::scanner::{self, TokenKind};

use crate::core::config::CompletionConfig;

/// One table mentioned by the active statement, with its alias if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub table: SmolStr,
    pub alias: Option<SmolStr>,
}

/// Extraction of table references from the active statement. Both
/// implementations are best-effort: broken input yields whatever was
/// recognizable, never an error.
pub trait TableReferences: fmt::Debug {
    /// References whose table name or alias starts with `prefix`
    /// (case-insensitive). An empty prefix returns everything.
    fn references(&self, statement: &str, prefix: &str) -> Vec<TableRef>;

    /// Unfiltered `qualified table name → alias` map; tables without an
    /// alias map to an empty string.
    fn aliases(&self, statement: &str) -> IndexMap<SmolStr, SmolStr> {
        let mut map = IndexMap::default();
        for r in self.references(statement, "") {
            map.entry(r.table)
                .or_insert_with(|| r.alias.unwrap_or_default());
        }
        map
    }
}

pub(crate) fn reference_analyzer(
    dialect: Arc<Dialect>,
    config: &CompletionConfig,
) -> Box<dyn TableReferences> {
    if config.experimental_reference_analyzer {
        Box::new(StructuralRefs { dialect })
    } else {
        Box::new(PatternRefs { dialect })
    }
}

fn matches_prefix(r: &TableRef, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    let prefix = prefix.to_lowercase();
    let table = r.table.to_lowercase();
    let short = table.rsplit('.').next().unwrap_or_default();
    table.starts_with(&prefix)
        || short.starts_with(&prefix)
        || r.alias
            .as_ref()
            .is_some_and(|a| a.to_lowercase().starts_with(&prefix))
}

fn push_unique(out: &mut Vec<TableRef>, r: TableRef) {
    if !out.contains(&r) {
        out.push(r);
    }
}

/// Default implementation: a regex finds the clause keywords, a small
/// hand parser reads the comma-separated reference list after each.
pub struct PatternRefs {
    dialect: Arc<Dialect>,
}

impl fmt::Debug for PatternRefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PatternRefs")
    }
}

static CLAUSE: Lazy<Regex> = lazy_regex!(r"(?i)\b(?:from|join|update|into)\b");

impl PatternRefs {
    fn scan(&self, statement: &str) -> Vec<TableRef> {
        let mut out = Vec::new();
        for found in CLAUSE.find_iter(statement) {
            let tail = &statement[found.end()..];
            self.scan_reference_list(tail, &mut out);
        }
        out
    }

    fn scan_reference_list(&self, tail: &str, out: &mut Vec<TableRef>) {
        let tokens: Vec<_> = scanner::scan(tail, &self.dialect)
            .into_iter()
            .filter(|t| t.is_code())
            .collect();
        let mut i = 0;

        loop {
            // Dotted table name: word (sep word)*.
            let Some(first) = tokens.get(i) else { return };
            if !matches!(first.kind, TokenKind::Word | TokenKind::QuotedIdent)
                || self.dialect.is_reserved_keyword(first.text)
            {
                return;
            }
            let mut name = first.text.to_string();
            i += 1;
            while let (Some(sep), Some(part)) = (tokens.get(i), tokens.get(i + 1)) {
                let is_sep = sep.kind == TokenKind::Symbol
                    && sep.text.chars().next() == Some(self.dialect.catalog_separator());
                if is_sep && matches!(part.kind, TokenKind::Word | TokenKind::QuotedIdent) {
                    name.push(self.dialect.catalog_separator());
                    name.push_str(part.text);
                    i += 2;
                } else {
                    break;
                }
            }

            // Optional alias, with or without AS.
            let mut alias = None;
            if let Some(t) = tokens.get(i) {
                if t.kind == TokenKind::Word && t.text.eq_ignore_ascii_case("as") {
                    i += 1;
                }
            }
            if let Some(t) = tokens.get(i) {
                if t.kind == TokenKind::Word && !self.dialect.is_reserved_keyword(t.text) {
                    alias = Some(SmolStr::new(t.text));
                    i += 1;
                }
            }

            push_unique(
                out,
                TableRef {
                    table: SmolStr::new(&name),
                    alias,
                },
            );

            match tokens.get(i) {
                Some(t) if t.kind == TokenKind::Symbol && t.text == "," => i += 1,
                _ => return,
            }
        }
    }
}

impl TableReferences for PatternRefs {
    fn references(&self, statement: &str, prefix: &str) -> Vec<TableRef> {
        self.scan(statement)
            .into_iter()
            .filter(|r| matches_prefix(r, prefix))
            .collect()
    }
}

/// Opt-in implementation: a single token walk over the whole statement,
/// clause- and bracket-aware. Subqueries are treated as opaque.
pub struct StructuralRefs {
    dialect: Arc<Dialect>,
}

impl fmt::Debug for StructuralRefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StructuralRefs")
    }
}

impl StructuralRefs {
    fn scan(&self, statement: &str) -> Vec<TableRef> {
        let tokens: Vec<_> = scanner::scan(statement, &self.dialect)
            .into_iter()
            .filter(|t| t.is_code())
            .collect();

        let mut out = Vec::new();
        let mut depth = 0usize;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            match token.kind {
                TokenKind::Symbol if token.text == "(" => depth += 1,
                TokenKind::Symbol if token.text == ")" => depth = depth.saturating_sub(1),
                TokenKind::Word if depth == 0 => {
                    let upper = token.text.to_uppercase();
                    if matches!(upper.as_str(), "FROM" | "JOIN" | "UPDATE" | "INTO") {
                        i = self.read_reference_list(&tokens, i + 1, &mut out);
                        continue;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        out
    }

    /// Reads `name [AS] [alias] (, name [AS] [alias])*` starting at `start`;
    /// returns the index of the first token it did not consume.
    fn read_reference_list(
        &self,
        tokens: &[scanner::Token<'_>],
        start: usize,
        out: &mut Vec<TableRef>,
    ) -> usize {
        let mut i = start;
        loop {
            let Some(first) = tokens.get(i) else { return i };
            if !matches!(first.kind, TokenKind::Word | TokenKind::QuotedIdent)
                || self.dialect.is_reserved_keyword(first.text)
            {
                return i;
            }
            let mut name = first.text.to_string();
            i += 1;
            while let (Some(sep), Some(part)) = (tokens.get(i), tokens.get(i + 1)) {
                let is_sep = sep.kind == TokenKind::Symbol
                    && sep.text.chars().next() == Some(self.dialect.catalog_separator());
                if is_sep && matches!(part.kind, TokenKind::Word | TokenKind::QuotedIdent) {
                    name.push(self.dialect.catalog_separator());
                    name.push_str(part.text);
                    i += 2;
                } else {
                    break;
                }
            }

            let mut alias = None;
            if let Some(t) = tokens.get(i) {
                if t.kind == TokenKind::Word && t.text.eq_ignore_ascii_case("as") {
                    i += 1;
                }
            }
            if let Some(t) = tokens.get(i) {
                if t.kind == TokenKind::Word && !self.dialect.is_reserved_keyword(t.text) {
                    alias = Some(SmolStr::new(t.text));
                    i += 1;
                }
            }

            push_unique(
                out,
                TableRef {
                    table: SmolStr::new(&name),
                    alias,
                },
            );

            match tokens.get(i) {
                Some(t) if t.kind == TokenKind::Symbol && t.text == "," => i += 1,
                _ => return i,
            }
        }
    }
}

impl TableReferences for StructuralRefs {
    fn references(&self, statement: &str, prefix: &str) -> Vec<TableRef> {
        self.scan(statement)
            .into_iter()
            .filter(|r| matches_prefix(r, prefix))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use squill_lib_dialects::ansi;

    fn both() -> [Box<dyn TableReferences>; 2] {
        let dialect = Arc::new(ansi::dialect());
        [
            Box::new(PatternRefs {
                dialect: Arc::clone(&dialect),
            }),
            Box::new(StructuralRefs { dialect }),
        ]
    }

    fn r(table: &str, alias: Option<&str>) -> TableRef {
        TableRef {
            table: table.into(),
            alias: alias.map(SmolStr::new),
        }
    }

    #[test]
    fn both_analyzers_agree_on_well_formed_statements() {
        let sql = "SELECT * FROM public.users u JOIN orders AS o ON u.id = o.user_id";
        for refs in both() {
            assert_eq!(
                refs.references(sql, ""),
                vec![r("public.users", Some("u")), r("orders", Some("o"))],
                "{refs:?}"
            );
        }
    }

    #[test]
    fn comma_lists_and_missing_aliases() {
        let sql = "SELECT 1 FROM users u, orders WHERE u.id = 1";
        for refs in both() {
            assert_eq!(
                refs.references(sql, ""),
                vec![r("users", Some("u")), r("orders", None)],
                "{refs:?}"
            );
        }
    }

    #[test]
    fn prefix_filters_on_name_or_alias() {
        let sql = "SELECT * FROM users u JOIN orders o ON 1=1";
        for refs in both() {
            assert_eq!(refs.references(sql, "ord"), vec![r("orders", Some("o"))]);
            assert_eq!(refs.references(sql, "u"), vec![r("users", Some("u"))]);
        }
    }

    #[test]
    fn tolerates_partial_statements() {
        for refs in both() {
            assert_eq!(refs.references("SELECT * FROM ", ""), vec![]);
            assert_eq!(
                refs.references("SELECT * FROM users u JOIN ", ""),
                vec![r("users", Some("u"))]
            );
        }
    }

    #[test]
    fn update_and_insert_targets_are_found() {
        for refs in both() {
            assert_eq!(
                refs.references("UPDATE warehouse.stock SET qty = 0", ""),
                vec![r("warehouse.stock", None)]
            );
            assert_eq!(
                refs.references("INSERT INTO users (id) VALUES (1)", ""),
                vec![r("users", None)]
            );
        }
    }

    #[test]
    fn aliases_map_preserves_statement_order() {
        let dialect = Arc::new(ansi::dialect());
        let refs = PatternRefs { dialect };
        let map = refs.aliases("SELECT * FROM users u JOIN orders o ON 1=1");
        let entries: Vec<_> = map
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(entries, vec![("users", "u"), ("orders", "o")]);
    }

    #[test]
    fn structural_skips_subqueries() {
        let dialect = Arc::new(ansi::dialect());
        let refs = StructuralRefs { dialect };
        assert_eq!(
            refs.references("SELECT * FROM (SELECT * FROM inner_t) x JOIN outer_t o ON 1=1", ""),
            vec![r("outer_t", Some("o"))]
        );
    }
}
