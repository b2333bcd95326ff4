use std::sync::Arc;

use squill_lib_core::dialects::Dialect;
use squill_lib_core::dialects::init::DialectKind;
use squill_lib_core::dialects::syntax::LetterCase;
use squill_lib_core::document::{Document, Partition, StatementSpan};
use squill_lib_core::objects::{DataSource, ExecutionContext};
use squill_lib_dialects::{ansi, kind_to_dialect};

use crate::core::config::CompletionConfig;

/// Dialect handle plus editor-level syntax policy.
#[derive(Debug, Clone)]
pub struct SyntaxManager {
    dialect: Arc<Dialect>,
    keyword_case: LetterCase,
}

impl SyntaxManager {
    pub fn new(dialect: Dialect) -> Self {
        SyntaxManager {
            dialect: Arc::new(dialect),
            keyword_case: LetterCase::Upper,
        }
    }

    pub fn with_keyword_case(dialect: Dialect, keyword_case: LetterCase) -> Self {
        SyntaxManager {
            dialect: Arc::new(dialect),
            keyword_case,
        }
    }

    /// Resolves the dialect by kind; unknown kinds fall back to ansi.
    pub fn for_kind(kind: DialectKind) -> Self {
        let dialect = kind_to_dialect(&kind).unwrap_or_else(ansi::dialect);
        SyntaxManager::new(dialect)
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn dialect_arc(&self) -> Arc<Dialect> {
        Arc::clone(&self.dialect)
    }

    pub fn struct_separator(&self) -> char {
        self.dialect.struct_separator()
    }

    pub fn keyword_case(&self) -> LetterCase {
        self.keyword_case
    }
}

/// Everything ambient to one completion invocation: syntax, the connected
/// source, the session's selected objects, and preference values.
pub struct CompletionContext {
    pub syntax: SyntaxManager,
    pub data_source: Arc<dyn DataSource>,
    pub exec_ctx: ExecutionContext,
    pub config: CompletionConfig,
}

impl CompletionContext {
    pub fn new(syntax: SyntaxManager, data_source: Arc<dyn DataSource>) -> Self {
        CompletionContext {
            syntax,
            data_source,
            exec_ctx: ExecutionContext::default(),
            config: CompletionConfig::default(),
        }
    }

    pub fn dialect(&self) -> &Dialect {
        self.syntax.dialect()
    }
}

/// The immutable input of one analyzer run.
pub struct CompletionRequest<'a> {
    pub document: &'a dyn Document,
    pub offset: usize,
    pub statement: Option<StatementSpan>,
    pub partition: Partition,
    pub context: &'a CompletionContext,
}

impl<'a> CompletionRequest<'a> {
    pub fn statement_text(&self) -> &str {
        self.statement.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }
}
