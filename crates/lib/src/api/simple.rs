//! Convenience entry points for hosts that have a plain string buffer
//! rather than an editor document model.

use squill_lib_core::dialects::Dialect;
use squill_lib_core::document::{Partition, StatementSpan};
use squill_lib_core::errors::CompletionError;
use squill_lib_core::monitor::ProgressMonitor;
use squill_lib_core::scanner::{self, TokenKind};

use crate::core::completion::analyzer::CompletionAnalyzer;
use crate::core::completion::proposals::Proposal;
use crate::core::completion::request::{CompletionContext, CompletionRequest};

/// Naive statement splitter: the span between the `;` terminators around
/// the offset. Editors with a real splitter should pass their own span.
pub fn active_statement(sql: &str, offset: usize, dialect: &Dialect) -> StatementSpan {
    let offset = offset.min(sql.len());
    let mut start = 0;
    let mut end = sql.len();

    for token in scanner::scan(sql, dialect) {
        if token.kind == TokenKind::Symbol && token.text == ";" {
            if token.range.end <= offset {
                start = token.range.end;
            } else {
                end = token.range.start;
                break;
            }
        }
    }

    StatementSpan::new(start, &sql[start..end])
}

/// Runs one completion pass over a string buffer.
pub fn complete(
    sql: &str,
    offset: usize,
    partition: Partition,
    context: &CompletionContext,
    monitor: &ProgressMonitor,
) -> Result<Vec<Proposal>, CompletionError> {
    if offset > sql.len() {
        return Err(CompletionError::Document(offset));
    }
    let statement = active_statement(sql, offset, context.dialect());
    let request = CompletionRequest {
        document: &sql,
        offset,
        statement: Some(statement),
        partition,
        context,
    };
    let mut analyzer = CompletionAnalyzer::new(request);
    analyzer.run(monitor)?;
    Ok(analyzer.into_proposals())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use squill_lib_dialects::ansi;

    #[test]
    fn active_statement_picks_the_span_around_the_offset() {
        let dialect = ansi::dialect();
        let sql = "SELECT 1; SELECT * FROM users; SELECT 2";

        let first = active_statement(sql, 3, &dialect);
        assert_eq!(first.offset, 0);
        assert_eq!(first.text, "SELECT 1");

        let second = active_statement(sql, 15, &dialect);
        assert_eq!(second.offset, 9);
        assert_eq!(second.text, " SELECT * FROM users");

        let third = active_statement(sql, sql.len(), &dialect);
        assert_eq!(third.text, " SELECT 2");
    }

    #[test]
    fn semicolons_inside_strings_do_not_split() {
        let dialect = ansi::dialect();
        let sql = "SELECT ';' FROM t";
        let span = active_statement(sql, sql.len(), &dialect);
        assert_eq!(span.text, sql);
    }

    #[test]
    fn offsets_past_the_buffer_are_rejected() {
        use squill_lib_core::test_objects::sample_source;

        use crate::core::completion::request::SyntaxManager;

        let context = CompletionContext::new(SyntaxManager::new(ansi::dialect()), sample_source());
        let monitor = ProgressMonitor::live();
        let err = complete("SELECT 1", 100, Partition::Code, &context, &monitor).unwrap_err();
        assert!(matches!(err, CompletionError::Document(100)));
    }
}
