use ahash::{AHashMap, AHashSet};
use smol_str::SmolStr;
use squill_lib_core::dialects::syntax::KeywordKind;
use squill_lib_core::document::Partition;

use crate::core::completion::analyzer::CompletionAnalyzer;
use crate::core::completion::hippie;
use crate::core::completion::proposals::Proposal;
use crate::core::completion::score::FuzzyScorer;

/// Runs the ordered post-filter pipeline over the raw proposal list:
/// dedupe, duplicate hiding, navigator filters, keyword assist, hippie.
pub(crate) fn post_filter(analyzer: &mut CompletionAnalyzer) {
    dedupe_by_display(&mut analyzer.proposals);
    hide_cross_container_duplicates(analyzer);
    apply_object_filters(analyzer);
    keyword_assist(analyzer);
    if analyzer.request.context.config.hippie_enabled {
        merge_hippie(analyzer);
    }
}

/// Stable, first wins.
fn dedupe_by_display(proposals: &mut Vec<Proposal>) {
    let mut seen: AHashSet<SmolStr> = AHashSet::new();
    proposals.retain(|p| seen.insert(p.display.clone()));
}

/// With an active container selected, an object name that resolves both
/// inside and outside it keeps only the inside variant.
fn hide_cross_container_duplicates(analyzer: &mut CompletionAnalyzer) {
    if !analyzer.request.context.config.hide_duplicates {
        return;
    }
    let Some(active) = analyzer.request.context.exec_ctx.default_object().cloned() else {
        return;
    };

    let mut in_active: AHashMap<String, bool> = AHashMap::new();
    for proposal in &analyzer.proposals {
        let Some(object) = &proposal.object else { continue };
        let name = object.name().to_lowercase();
        let belongs = proposal
            .container
            .as_ref()
            .is_some_and(|c| c.same_object(&active));
        *in_active.entry(name).or_default() |= belongs;
    }

    analyzer.proposals.retain(|proposal| {
        let Some(object) = &proposal.object else {
            return true;
        };
        let name = object.name().to_lowercase();
        if !in_active.get(&name).copied().unwrap_or(false) {
            return true;
        }
        proposal
            .container
            .as_ref()
            .is_some_and(|c| c.same_object(&active))
    });
}

/// Per-object-class glob filters supplied by the data source.
fn apply_object_filters(analyzer: &mut CompletionAnalyzer) {
    let data_source = &analyzer.request.context.data_source;
    analyzer.proposals.retain(|proposal| {
        let Some(object) = &proposal.object else {
            return true;
        };
        match data_source.object_filter(object.class()) {
            Some(filter) => filter.matches(object.name()),
            None => true,
        }
    });
}

fn allowed_keywords(analyzer: &CompletionAnalyzer) -> Option<AHashSet<&'static str>> {
    let dialect = analyzer.request.context.dialect();
    let keyword = analyzer.word.prev_key_word();
    let has_prev_words = !analyzer.word.prev_words().is_empty();

    match keyword {
        "SELECT" if has_prev_words => Some(AHashSet::from_iter(["FROM"])),
        "DELETE" => Some(AHashSet::from_iter(["FROM"])),
        "UPDATE" if has_prev_words => Some(AHashSet::from_iter(["SET"])),
        "" if !has_prev_words => {
            let mut leads = dialect.query_leads();
            leads.extend(dialect.dml_leads());
            leads.extend(dialect.ddl_leads());
            leads.extend(dialect.execute_leads());
            Some(leads)
        }
        _ => None,
    }
}

/// Keyword proposals run after object proposals and never inside strings.
fn keyword_assist(analyzer: &mut CompletionAnalyzer) {
    if analyzer.search_finished || analyzer.request.partition == Partition::String {
        return;
    }
    let config = &analyzer.request.context.config;
    let word = analyzer.word.word_part().to_string();
    let allowed = allowed_keywords(analyzer);
    if word.is_empty() && allowed.is_none() {
        return;
    }
    // A dotted fragment is an object path, never a keyword.
    if analyzer.word.contains_separator(&word) {
        return;
    }

    let dialect = analyzer.request.context.dialect();
    let mut scorer = FuzzyScorer::new();
    let mut candidates: Vec<(&'static str, KeywordKind, u32)> = Vec::new();
    for (keyword, kind) in dialect.completion_keywords() {
        if let Some(allowed) = &allowed {
            if !allowed.contains(keyword) {
                continue;
            }
        }
        if word.is_empty() {
            candidates.push((keyword, kind, 0));
        } else if config.simple_mode {
            if keyword.to_lowercase().starts_with(&word.to_lowercase()) {
                candidates.push((keyword, kind, 0));
            }
        } else {
            let score = scorer.score(&word, keyword);
            if score > 0 {
                candidates.push((keyword, kind, score));
            }
        }
    }

    if !word.is_empty() && !config.simple_mode {
        candidates.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(b.0)));
    } else {
        candidates.sort_by(|a, b| a.0.cmp(b.0));
    }

    let existing: AHashSet<SmolStr> =
        analyzer.proposals.iter().map(|p| p.display.clone()).collect();
    let additions: Vec<Proposal> = {
        let factory = analyzer.factory();
        candidates
            .into_iter()
            .filter(|(keyword, _, _)| !existing.contains(*keyword))
            .map(|(keyword, kind, score)| factory.keyword_proposal(keyword, kind, score))
            .collect()
    };
    analyzer.proposals.extend(additions);
}

/// In-document word completion, merged last and deduplicated against
/// everything already proposed.
fn merge_hippie(analyzer: &mut CompletionAnalyzer) {
    if analyzer.search_finished() || analyzer.request.partition == Partition::String {
        return;
    }
    let word = analyzer.word.word_part();
    if word.is_empty() || analyzer.word.contains_separator(word) {
        return;
    }
    let text = analyzer
        .request
        .document
        .slice(0..analyzer.request.offset)
        .unwrap_or_default();

    let existing: AHashSet<SmolStr> =
        analyzer.proposals.iter().map(|p| p.display.clone()).collect();
    let additions: Vec<Proposal> = hippie::document_words(text, word)
        .into_iter()
        .filter(|w| !existing.contains(w))
        .map(|w| Proposal::literal(w.clone(), w.to_string()))
        .collect();
    analyzer.proposals.extend(additions);
}

#[cfg(test)]
mod tests {
    use squill_lib_core::document::{Document, StatementSpan};
    use squill_lib_core::objects::{DbNode, ObjectClass, ObjectFilter};
    use squill_lib_core::test_objects::sample_source;
    use squill_lib_dialects::ansi;

    use super::*;
    use crate::core::completion::request::{CompletionContext, CompletionRequest, SyntaxManager};

    fn analyzer_over<'a>(
        sql: &'a &'a str,
        context: &'a CompletionContext,
    ) -> CompletionAnalyzer<'a> {
        let request = CompletionRequest {
            document: sql,
            offset: sql.len(),
            statement: Some(StatementSpan::new(0, *sql)),
            partition: Partition::Code,
            context,
        };
        CompletionAnalyzer::new(request)
    }

    fn object_proposal(node: DbNode, display: &str) -> Proposal {
        let mut proposal = Proposal::literal(SmolStr::new(display), node.name().to_string());
        proposal.container = node.parent();
        proposal.object = Some(node);
        proposal
    }

    #[test]
    fn duplicate_names_prefer_the_active_container() {
        let source = sample_source();
        let mut context =
            CompletionContext::new(SyntaxManager::new(ansi::dialect()), source.clone());
        context.config.hide_duplicates = true;
        context.exec_ctx.selected_schema = source.schema("public");

        let sql = "SELECT * FROM ";
        let mut analyzer = analyzer_over(&sql, &context);
        analyzer.proposals = vec![
            object_proposal(source.table("archive", "users").unwrap(), "users (archive)"),
            object_proposal(source.table("public", "users").unwrap(), "users"),
            object_proposal(source.table("public", "orders").unwrap(), "orders"),
        ];

        hide_cross_container_duplicates(&mut analyzer);

        let displays: Vec<_> = analyzer.proposals.iter().map(|p| p.display.as_str()).collect();
        assert_eq!(displays, vec!["users", "orders"]);
    }

    #[test]
    fn navigator_filters_drop_excluded_objects() {
        let source = sample_source();
        source.add_filter(
            ObjectClass::Table,
            ObjectFilter {
                include: vec![],
                exclude: vec!["prod*".into()],
            },
        );
        let context = CompletionContext::new(SyntaxManager::new(ansi::dialect()), source.clone());

        let sql = "SELECT * FROM ";
        let mut analyzer = analyzer_over(&sql, &context);
        analyzer.proposals = vec![
            object_proposal(source.table("public", "users").unwrap(), "users"),
            object_proposal(source.table("public", "products").unwrap(), "products"),
        ];

        apply_object_filters(&mut analyzer);

        let displays: Vec<_> = analyzer.proposals.iter().map(|p| p.display.as_str()).collect();
        assert_eq!(displays, vec!["users"]);
    }

    #[test]
    fn statement_start_allows_every_statement_lead() {
        let source = sample_source();
        let context = CompletionContext::new(SyntaxManager::new(ansi::dialect()), source);
        let sql = "SEL";
        let analyzer = analyzer_over(&sql, &context);

        let allowed = allowed_keywords(&analyzer).expect("restricted at statement start");
        for lead in ["SELECT", "INSERT", "CREATE", "CALL", "WITH"] {
            assert!(allowed.contains(lead), "{lead}");
        }
        assert!(!allowed.contains("FROM"));
    }

    #[test]
    fn select_expression_allows_only_from() {
        let source = sample_source();
        let context = CompletionContext::new(SyntaxManager::new(ansi::dialect()), source);
        let sql = "SELECT name ";
        let analyzer = analyzer_over(&sql, &context);

        let allowed = allowed_keywords(&analyzer).expect("restricted after expression");
        assert_eq!(allowed.len(), 1);
        assert!(allowed.contains("FROM"));
    }

    #[test]
    fn dedupe_keeps_the_first_of_each_display() {
        let mut proposals = vec![
            Proposal::literal("users", "users"),
            Proposal::literal("users", "public.users"),
            Proposal::literal("orders", "orders"),
        ];
        dedupe_by_display(&mut proposals);
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].replacement, "users");
    }
}
