use squill_lib_core::document::Partition;
use squill_lib_core::errors::CompletionError;
use squill_lib_core::monitor::ProgressMonitor;

use crate::core::completion::context::{Classification, QueryType, classify};
use crate::core::completion::filter::post_filter;
use crate::core::completion::proposals::{Proposal, ProposalFactory};
use crate::core::completion::refs::{TableReferences, reference_analyzer};
use crate::core::completion::request::CompletionRequest;
use crate::core::completion::word::WordDetector;

/// One-shot completion engine: classify the cursor context, resolve
/// candidates against the catalog, build proposals, post-filter. The
/// instance is single-use; after [`run`](Self::run) the proposal list is
/// read-only.
pub struct CompletionAnalyzer<'a> {
    pub(crate) request: CompletionRequest<'a>,
    pub(crate) word: WordDetector,
    pub(crate) refs: Box<dyn TableReferences>,
    pub(crate) classification: Classification,
    pub(crate) proposals: Vec<Proposal>,
    pub(crate) search_finished: bool,
    ran: bool,
}

impl<'a> CompletionAnalyzer<'a> {
    pub fn new(request: CompletionRequest<'a>) -> Self {
        let word = WordDetector::detect(
            request.document,
            request.offset,
            request.context.dialect(),
        );
        let refs = reference_analyzer(
            request.context.syntax.dialect_arc(),
            &request.context.config,
        );
        CompletionAnalyzer {
            request,
            word,
            refs,
            classification: Classification::default(),
            proposals: Vec::new(),
            search_finished: false,
            ran: false,
        }
    }

    pub fn run(&mut self, monitor: &ProgressMonitor) -> Result<(), CompletionError> {
        debug_assert!(!self.ran, "completion analyzer instances are single-use");
        if self.ran {
            return Ok(());
        }
        self.ran = true;

        self.classification = classify(&mut self.word, &self.request);
        tracing::trace!(classification = ?self.classification, word = self.word.word_part(), "classified request");
        if self.classification.suppress {
            self.search_finished = true;
            return Ok(());
        }

        monitor.check_canceled()?;
        let meta = if self.request.context.data_source.extra_metadata_read() {
            monitor.clone()
        } else {
            monitor.cache_only_view()
        };

        let resolved = if self.request.partition == Partition::String {
            self.resolve_string_partition(monitor, &meta)
        } else if self.word.word_part().is_empty() {
            self.resolve_empty_prefix(monitor, &meta)
        } else {
            self.resolve_prefix(monitor, &meta)
        };
        if let Err(err) = resolved {
            // Partial lists are worthless to the caller on cancel.
            self.proposals.clear();
            return Err(err);
        }

        if self.request.partition != Partition::String && self.should_search_procedures() {
            self.resolve_procedures(monitor)?;
        }

        post_filter(self);
        Ok(())
    }

    fn should_search_procedures(&self) -> bool {
        if self.search_finished {
            return false;
        }
        self.classification.procedure_search
            || self.classification.query_type == Some(QueryType::Exec)
            || (self.classification.query_type == Some(QueryType::Column)
                && self.request.context.config.search_procedures)
    }

    pub fn proposals(&self) -> &[Proposal] {
        &self.proposals
    }

    pub fn into_proposals(self) -> Vec<Proposal> {
        self.proposals
    }

    /// True when the engine decided nothing should be proposed at all,
    /// e.g. the cursor sits on an alias the editor must not replace.
    pub fn search_finished(&self) -> bool {
        self.search_finished
    }

    pub fn word(&self) -> &WordDetector {
        &self.word
    }

    pub(crate) fn factory(&self) -> ProposalFactory<'_> {
        ProposalFactory {
            context: self.request.context,
            word: &self.word,
            statement: self.request.statement_text(),
            refs: self.refs.as_ref(),
            classification: &self.classification,
        }
    }
}
