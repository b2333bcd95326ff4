use squill_lib_core::document::Partition;

use crate::core::completion::request::CompletionRequest;
use crate::core::completion::word::WordDetector;

/// Which proposal sources the resolver consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum QueryType {
    Table,
    Column,
    Join,
    Exec,
}

/// Classifier output. `query_type = None` is the UNSET state: nothing but
/// default containers and keyword assist apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub query_type: Option<QueryType>,
    /// Emit nothing at all.
    pub suppress: bool,
    pub procedure_search: bool,
    /// False while declaring a routine rather than calling one.
    pub exec_param: bool,
}

const ROUTINE_LEADS: [&str; 2] = ["PROCEDURE", "FUNCTION"];

fn first_prev_is_routine_lead(word: &WordDetector) -> bool {
    word.prev_words()
        .first()
        .is_some_and(|w| ROUTINE_LEADS.iter().any(|lead| w.eq_ignore_ascii_case(lead)))
}

/// Decides the query type from the detector output and partition verdict.
/// May rewrite the detector's prefix (`*` handling); running it again on the
/// already-rewritten detector is a no-op.
pub(crate) fn classify(word: &mut WordDetector, request: &CompletionRequest) -> Classification {
    let dialect = request.context.dialect();

    // A keyword left of the active statement belongs to the previous one.
    if let (Some(statement), Some(kw_offset)) = (&request.statement, word.prev_key_word_offset()) {
        if statement.offset > kw_offset {
            word.clear_prev_key_word();
        }
    }

    if request.partition == Partition::String && word.prev_key_word() == "INTO" {
        return Classification {
            suppress: true,
            ..Default::default()
        };
    }

    let mut classification = Classification {
        exec_param: !first_prev_is_routine_lead(word),
        ..Default::default()
    };

    let keyword = word.prev_key_word().to_string();
    let delimiter = word.prev_delimiter().to_string();

    if !keyword.is_empty() && dialect.is_entity_query_word(&keyword) {
        classification.query_type = Some(QueryType::Table);
        if keyword == "DELETE" || keyword == "INSERT" {
            classification.query_type = None;
        }
        if keyword == "INTO" && !word.prev_words().is_empty() {
            match delimiter.as_str() {
                "(" | "," => classification.query_type = Some(QueryType::Column),
                "(*" | "{*" | "[*" if word.word_part().is_empty() => {
                    classification.query_type = Some(QueryType::Column);
                    word.set_word_part("*");
                    word.shift_offset(-1);
                }
                _ => {}
            }
        }
        if keyword == "JOIN" && word.prev_words().is_empty() {
            classification.query_type = Some(QueryType::Join);
        }
    } else if !keyword.is_empty() && dialect.is_attribute_query_word(&keyword) {
        classification.query_type = Some(QueryType::Column);
        if word.word_part().is_empty() && delimiter == "*" && !word.next_word().is_empty() {
            word.set_word_part("*");
            word.shift_offset(-1);
        }
    } else if !keyword.is_empty() && dialect.is_exec_query_word(&keyword) {
        classification.query_type = Some(QueryType::Exec);
    } else if keyword.is_empty() && first_prev_is_routine_lead(word) {
        classification.procedure_search = true;
    }

    classification
}

#[cfg(test)]
mod tests {
    use squill_lib_core::document::{Document, StatementSpan};
    use squill_lib_core::test_objects::sample_source;
    use squill_lib_dialects::ansi;

    use super::*;
    use crate::core::completion::request::{CompletionContext, SyntaxManager};

    fn classify_at(sql_with_cursor: &str, partition: Partition) -> (Classification, WordDetector) {
        let offset = sql_with_cursor.find('|').expect("cursor marker");
        let sql = sql_with_cursor.replace('|', "");
        let context = CompletionContext::new(SyntaxManager::new(ansi::dialect()), sample_source());
        let request = CompletionRequest {
            document: &sql as &dyn Document,
            offset,
            statement: Some(StatementSpan::new(0, sql.clone())),
            partition,
            context: &context,
        };
        let mut word = WordDetector::detect(request.document, offset, context.dialect());
        let classification = classify(&mut word, &request);
        (classification, word)
    }

    #[test]
    fn entity_keywords_select_table_mode() {
        let (c, _) = classify_at("SELECT * FROM |", Partition::Code);
        assert_eq!(c.query_type, Some(QueryType::Table));
    }

    #[test]
    fn delete_and_insert_stay_unset() {
        let (c, _) = classify_at("DELETE |", Partition::Code);
        assert_eq!(c.query_type, None);
        let (c, _) = classify_at("INSERT |", Partition::Code);
        assert_eq!(c.query_type, None);
    }

    #[test]
    fn into_with_open_paren_is_column_mode() {
        let (c, _) = classify_at("INSERT INTO users (|", Partition::Code);
        assert_eq!(c.query_type, Some(QueryType::Column));
        let (c, _) = classify_at("INSERT INTO users (id, |", Partition::Code);
        assert_eq!(c.query_type, Some(QueryType::Column));
    }

    #[test]
    fn into_star_rewrites_the_prefix() {
        let (c, w) = classify_at("INSERT INTO users (*|", Partition::Code);
        assert_eq!(c.query_type, Some(QueryType::Column));
        assert_eq!(w.word_part(), "*");
        // The replacement span moves back over the star.
        let cursor = "INSERT INTO users (*".len();
        assert_eq!(w.replacement_span(), (cursor - 1, cursor));
    }

    #[test]
    fn bare_join_is_join_mode() {
        let (c, _) = classify_at("SELECT * FROM users u JOIN |", Partition::Code);
        assert_eq!(c.query_type, Some(QueryType::Join));
    }

    #[test]
    fn attribute_keywords_select_column_mode() {
        for sql in [
            "SELECT |",
            "SELECT * FROM users WHERE |",
            "UPDATE users SET |",
            "SELECT a FROM t GROUP BY |",
        ] {
            let (c, _) = classify_at(sql, Partition::Code);
            assert_eq!(c.query_type, Some(QueryType::Column), "{sql}");
        }
    }

    #[test]
    fn exec_keywords_select_exec_mode() {
        let (c, _) = classify_at("CALL |", Partition::Code);
        assert_eq!(c.query_type, Some(QueryType::Exec));
        assert!(c.exec_param);
    }

    #[test]
    fn routine_declaration_disables_exec_param() {
        let (c, _) = classify_at("PROCEDURE sp_|", Partition::Code);
        assert_eq!(c.query_type, None);
        assert!(c.procedure_search);
        assert!(!c.exec_param);
    }

    #[test]
    fn string_partition_after_into_suppresses_everything() {
        let (c, _) = classify_at("COPY INTO '|", Partition::String);
        assert!(c.suppress);
    }

    #[test]
    fn select_star_before_next_word_rewrites_prefix() {
        let (c, w) = classify_at("SELECT *| FROM users", Partition::Code);
        assert_eq!(c.query_type, Some(QueryType::Column));
        assert_eq!(w.word_part(), "*");
    }

    #[test]
    fn keyword_outside_the_active_statement_is_dropped() {
        let offset = "SELECT 1 FROM t; |".len();
        let sql = "SELECT 1 FROM t; ";
        let context = CompletionContext::new(SyntaxManager::new(ansi::dialect()), sample_source());
        let request = CompletionRequest {
            document: &sql as &dyn Document,
            offset: offset - 1,
            statement: Some(StatementSpan::new(16, String::new())),
            partition: Partition::Code,
            context: &context,
        };
        let mut word = WordDetector::detect(request.document, request.offset, context.dialect());
        assert_eq!(word.prev_key_word(), "FROM");
        let c = classify(&mut word, &request);
        assert_eq!(word.prev_key_word(), "");
        assert_eq!(c.query_type, None);
    }

    #[test]
    fn classification_is_idempotent() {
        for sql in [
            "INSERT INTO users (*|",
            "SELECT *| FROM users",
            "SELECT * FROM users WHERE |",
        ] {
            let offset = sql.find('|').unwrap();
            let text = sql.replace('|', "");
            let context =
                CompletionContext::new(SyntaxManager::new(ansi::dialect()), sample_source());
            let request = CompletionRequest {
                document: &text as &dyn Document,
                offset,
                statement: Some(StatementSpan::new(0, text.clone())),
                partition: Partition::Code,
                context: &context,
            };
            let mut word = WordDetector::detect(request.document, offset, context.dialect());
            let first = classify(&mut word, &request);
            let word_after_first = word.clone();
            let second = classify(&mut word, &request);
            assert_eq!(first, second, "{sql}");
            assert_eq!(word.word_part(), word_after_first.word_part(), "{sql}");
            assert_eq!(
                word.replacement_span(),
                word_after_first.replacement_span(),
                "{sql}"
            );
        }
    }
}
