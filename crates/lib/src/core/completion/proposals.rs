use ahash::{AHashMap, AHashSet};
use smol_str::SmolStr;
use squill_lib_core::dialects::syntax::KeywordKind;
use squill_lib_core::navigator;
use squill_lib_core::objects::{Attribute, DbNode};
use squill_lib_core::value::ValueHint;

use crate::core::completion::context::Classification;
use crate::core::completion::refs::TableReferences;
use crate::core::completion::request::CompletionContext;
use crate::core::completion::word::WordDetector;
use crate::core::config::{AliasMode, InsertCase};

/// Set on procedure proposals that are being called rather than declared.
pub const PARAM_EXEC: &str = "exec";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ProposalKind {
    Keyword,
    Function,
    Type,
    Literal,
    Other,
}

/// One completion proposal, ready for the editor to render and insert.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub display: SmolStr,
    pub replacement: String,
    /// Cursor position inside the replacement; `None` means its end.
    pub cursor_offset: Option<usize>,
    pub kind: ProposalKind,
    pub score: u32,
    pub object: Option<DbNode>,
    pub container: Option<DbNode>,
    pub fully_qualified: bool,
    pub single_object: bool,
    pub params: AHashMap<&'static str, bool>,
}

impl Proposal {
    pub fn literal(display: impl Into<SmolStr>, replacement: impl Into<String>) -> Self {
        Proposal {
            display: display.into(),
            replacement: replacement.into(),
            cursor_offset: None,
            kind: ProposalKind::Literal,
            score: 0,
            object: None,
            container: None,
            fully_qualified: false,
            single_object: false,
            params: AHashMap::new(),
        }
    }
}

/// Builds proposals from resolved objects, keywords and enumerated values,
/// applying quoting, case folding, qualification and alias injection.
pub(crate) struct ProposalFactory<'a> {
    pub(crate) context: &'a CompletionContext,
    pub(crate) word: &'a WordDetector,
    pub(crate) statement: &'a str,
    pub(crate) refs: &'a dyn TableReferences,
    pub(crate) classification: &'a Classification,
}

impl ProposalFactory<'_> {
    pub(crate) fn object_proposal(&self, node: DbNode, score: u32, single_object: bool) -> Proposal {
        let dialect = self.context.dialect();
        let config = &self.context.config;
        let name = node.name().to_string();

        // Unresolved references from outside the selected container get
        // qualified automatically, unless short names are forced.
        let auto_qualified = matches!(node, DbNode::Reference(_))
            && !self.under_selected_container(&node)
            && !self.word.contains_separator(self.word.word_part());
        let fully_qualified =
            config.use_fq_names || (auto_qualified && !config.use_short_names);

        let mut replacement = if fully_qualified {
            navigator::qualified_name(&node, dialect)
        } else if dialect.requires_quoting(&name) {
            dialect.quote(&name)
        } else {
            dialect.storage_fold(&name).to_string()
        };

        // WHERE/AND columns pick up the table alias from the statement.
        let keyword = self.word.prev_key_word();
        if (keyword == "WHERE" || keyword == "AND")
            && self.word.word_part().is_empty()
            && !fully_qualified
        {
            if let DbNode::Attribute(_) = &node {
                if let Some(qualifier) = self.column_qualifier(&node) {
                    replacement = format!("{qualifier}{}{replacement}", dialect.struct_separator());
                }
            }
        }

        let mut cursor_offset = None;
        let mut kind = ProposalKind::Other;
        let mut params = AHashMap::new();
        if matches!(node, DbNode::Procedure(_)) {
            kind = ProposalKind::Function;
            if self.classification.exec_param {
                replacement.push_str("()");
                cursor_offset = Some(replacement.len() - 1);
                params.insert(PARAM_EXEC, true);
            }
        }

        if matches!(keyword, "FROM" | "INTO" | "JOIN") && config.alias_mode != AliasMode::None {
            if let DbNode::Entity(_) = &node {
                if self.alias_permitted() {
                    if let Some(alias) = self.generate_alias(&name) {
                        match config.alias_mode {
                            AliasMode::Plain => replacement.push_str(&format!(" {alias}")),
                            AliasMode::Extended => replacement.push_str(&format!(" AS {alias}")),
                            AliasMode::None => {}
                        }
                    }
                }
            }
        }

        Proposal {
            display: SmolStr::new(&name),
            replacement,
            cursor_offset,
            kind,
            score,
            container: node.parent(),
            object: Some(node),
            fully_qualified,
            single_object,
            params,
        }
    }

    pub(crate) fn keyword_proposal(&self, keyword: &str, kind: KeywordKind, score: u32) -> Proposal {
        let config = &self.context.config;
        let mut text = self
            .context
            .syntax
            .keyword_case()
            .apply(keyword)
            .to_string();

        match config.insert_case {
            InsertCase::Upper => text = text.to_uppercase(),
            InsertCase::Lower => text = text.to_lowercase(),
            InsertCase::AsTyped => {
                let typed = self.word.word_part();
                if !typed.is_empty() && typed.chars().all(|c| !c.is_uppercase()) {
                    text = text.to_lowercase();
                }
            }
        }

        let mut cursor_offset = None;
        if kind == KeywordKind::Function {
            text.push_str("()");
            cursor_offset = Some(text.len() - 1);
        }

        Proposal {
            display: SmolStr::new(keyword),
            replacement: text,
            cursor_offset,
            kind: match kind {
                KeywordKind::Keyword => ProposalKind::Keyword,
                KeywordKind::Function => ProposalKind::Function,
                KeywordKind::Type => ProposalKind::Type,
                KeywordKind::Other => ProposalKind::Other,
            },
            score,
            object: None,
            container: None,
            fully_qualified: false,
            single_object: false,
            params: AHashMap::new(),
        }
    }

    pub(crate) fn value_proposal(
        &self,
        hint: &ValueHint,
        attribute: &dyn Attribute,
        in_string: bool,
    ) -> Proposal {
        let replacement = if in_string {
            hint.value.raw_text()
        } else {
            attribute.format_literal(&hint.value)
        };
        let display = match &hint.label {
            Some(label) => SmolStr::new(format!("{replacement} - {label}")),
            None => SmolStr::new(&replacement),
        };
        Proposal::literal(display, replacement)
    }

    /// Aliases come from the statement itself; proposing one replaces the
    /// fragment with exactly what the statement already calls the table.
    pub(crate) fn table_ref_proposal(&self, table: &str, alias: Option<&str>) -> Proposal {
        let text = alias.filter(|a| !a.is_empty()).unwrap_or(table);
        let mut proposal = Proposal::literal(SmolStr::new(text), text.to_string());
        proposal.kind = ProposalKind::Other;
        proposal
    }

    fn under_selected_container(&self, node: &DbNode) -> bool {
        let Some(selected) = self.context.exec_ctx.default_object() else {
            return true;
        };
        node.parent().is_some_and(|p| p.same_object(selected))
    }

    fn column_qualifier(&self, column: &DbNode) -> Option<String> {
        let entity = column.parent()?;
        let entity_name = entity.name();
        for r in self.refs.references(self.statement, "") {
            let short = r.table.rsplit('.').next().unwrap_or(&r.table);
            if short.eq_ignore_ascii_case(entity_name) {
                return Some(match &r.alias {
                    Some(alias) if !alias.is_empty() => alias.to_string(),
                    _ => entity_name.to_string(),
                });
            }
        }
        None
    }

    fn alias_permitted(&self) -> bool {
        let dialect = self.context.dialect();
        let lead = self
            .statement
            .trim_start()
            .split_whitespace()
            .next()
            .unwrap_or("");
        if lead.eq_ignore_ascii_case("UPDATE") {
            dialect.supports_alias_in_update()
        } else {
            dialect.supports_alias_in_select()
        }
    }

    /// Initials of the table name, then a numeric suffix until unique
    /// against statement aliases and keywords.
    fn generate_alias(&self, table_name: &str) -> Option<SmolStr> {
        let dialect = self.context.dialect();

        let mut used: AHashSet<String> = AHashSet::new();
        for r in self.refs.references(self.statement, "") {
            if let Some(alias) = &r.alias {
                used.insert(alias.to_lowercase());
            }
            used.insert(r.table.to_lowercase());
        }

        let mut initials = String::new();
        let mut prev = '_';
        for c in table_name.chars() {
            if c.is_alphabetic() && (initials.is_empty() || prev == '_' || c.is_uppercase()) {
                initials.extend(c.to_lowercase());
            }
            prev = c;
        }
        if initials.is_empty() {
            initials.extend(table_name.chars().take(1).flat_map(char::to_lowercase));
        }
        if initials.is_empty() {
            return None;
        }

        let mut candidate = initials.clone();
        let mut suffix = 2u32;
        while used.contains(&candidate) || dialect.is_keyword(&candidate) {
            candidate = format!("{initials}{suffix}");
            suffix += 1;
        }

        if candidate.eq_ignore_ascii_case(table_name) {
            return None;
        }
        Some(SmolStr::new(candidate))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use squill_lib_core::test_objects::sample_source;
    use squill_lib_dialects::postgres;

    use super::*;
    use crate::core::completion::refs::reference_analyzer;
    use crate::core::completion::request::SyntaxManager;
    use crate::core::completion::word::WordDetector;
    use crate::core::config::CompletionConfig;

    fn factory_fixture(
        sql_with_cursor: &str,
        config: CompletionConfig,
    ) -> (CompletionContext, WordDetector, Box<dyn TableReferences>, String) {
        let offset = sql_with_cursor.find('|').expect("cursor marker");
        let sql = sql_with_cursor.replace('|', "");
        let mut context =
            CompletionContext::new(SyntaxManager::new(postgres::dialect()), sample_source());
        context.config = config;
        let refs = reference_analyzer(context.syntax.dialect_arc(), &context.config);
        let word = WordDetector::detect(&sql as &str, offset, context.dialect());
        (context, word, refs, sql)
    }

    fn table_node() -> DbNode {
        sample_source().table("public", "orders").unwrap()
    }

    #[test]
    fn plain_alias_injection_after_from() {
        let config = CompletionConfig {
            alias_mode: crate::core::config::AliasMode::Plain,
            ..Default::default()
        };
        let (context, word, refs, sql) = factory_fixture("SELECT * FROM |", config);
        let factory = ProposalFactory {
            context: &context,
            word: &word,
            statement: &sql,
            refs: refs.as_ref(),
            classification: &Classification::default(),
        };
        let proposal = factory.object_proposal(table_node(), 0, true);
        assert_eq!(proposal.replacement, "orders o");
        assert_eq!(proposal.display, "orders");
    }

    #[test]
    fn extended_alias_uses_as_and_skips_collisions() {
        let config = CompletionConfig {
            alias_mode: crate::core::config::AliasMode::Extended,
            ..Default::default()
        };
        let (context, word, refs, sql) =
            factory_fixture("SELECT * FROM offers o JOIN |", config);
        let factory = ProposalFactory {
            context: &context,
            word: &word,
            statement: &sql,
            refs: refs.as_ref(),
            classification: &Classification::default(),
        };
        let proposal = factory.object_proposal(table_node(), 0, true);
        // "o" is taken by offers, so the generated alias gets a suffix.
        assert_eq!(proposal.replacement, "orders AS o2");
    }

    #[test]
    fn where_columns_are_qualified_by_alias() {
        let (context, word, refs, sql) =
            factory_fixture("SELECT * FROM users u WHERE |", CompletionConfig::default());
        let factory = ProposalFactory {
            context: &context,
            word: &word,
            statement: &sql,
            refs: refs.as_ref(),
            classification: &Classification::default(),
        };
        let source = sample_source();
        let users = source.table("public", "users").unwrap();
        let monitor = squill_lib_core::monitor::ProgressMonitor::live();
        let column = users
            .as_entity()
            .unwrap()
            .attribute(&monitor, "status")
            .unwrap()
            .unwrap();
        let proposal = factory.object_proposal(column, 0, true);
        assert_eq!(proposal.replacement, "u.status");
        assert_eq!(proposal.display, "status");
    }

    #[test]
    fn keyword_proposals_respect_insert_case() {
        let (context, word, refs, sql) =
            factory_fixture("sel|", CompletionConfig {
                insert_case: InsertCase::AsTyped,
                ..Default::default()
            });
        let factory = ProposalFactory {
            context: &context,
            word: &word,
            statement: &sql,
            refs: refs.as_ref(),
            classification: &Classification::default(),
        };
        let proposal = factory.keyword_proposal("SELECT", KeywordKind::Keyword, 1);
        assert_eq!(proposal.replacement, "select");

        let upper = factory.keyword_proposal("COUNT", KeywordKind::Function, 1);
        assert_eq!(upper.kind, ProposalKind::Function);
        assert!(upper.replacement.ends_with("()"));
        assert_eq!(upper.cursor_offset, Some(upper.replacement.len() - 1));
    }

    #[test]
    fn quoted_identifiers_bypass_case_folding() {
        let mut config = CompletionConfig::default();
        config.alias_mode = crate::core::config::AliasMode::None;
        let (context, word, refs, sql) = factory_fixture("SELECT * FROM |", config);
        let factory = ProposalFactory {
            context: &context,
            word: &word,
            statement: &sql,
            refs: refs.as_ref(),
            classification: &Classification::default(),
        };
        let table = squill_lib_core::test_objects::MemTable::new("Order Lines", vec![]);
        let node = DbNode::Entity(table as Arc<dyn squill_lib_core::objects::Entity>);
        let proposal = factory.object_proposal(node, 0, true);
        assert_eq!(proposal.replacement, "\"Order Lines\"");
    }

    #[test]
    fn procedures_get_call_parens_when_executing() {
        let (context, word, refs, sql) =
            factory_fixture("CALL |", CompletionConfig::default());
        let classification = Classification {
            exec_param: true,
            ..Default::default()
        };
        let factory = ProposalFactory {
            context: &context,
            word: &word,
            statement: &sql,
            refs: refs.as_ref(),
            classification: &classification,
        };
        let source = sample_source();
        let monitor = squill_lib_core::monitor::ProgressMonitor::live();
        let public = source.schema("public").unwrap();
        let proc = squill_lib_core::navigator::child(&public, &monitor, "sp_cleanup")
            .unwrap()
            .unwrap();
        let proposal = factory.object_proposal(proc, 0, true);
        assert_eq!(proposal.replacement, "sp_cleanup()");
        assert_eq!(proposal.cursor_offset, Some(proposal.replacement.len() - 1));
        assert_eq!(proposal.params.get(PARAM_EXEC), Some(&true));
    }
}
