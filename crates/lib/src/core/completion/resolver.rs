use std::sync::Arc;

use itertools::Itertools;
use smol_str::SmolStr;
use squill_lib_core::dialects::Dialect;
use squill_lib_core::document::Partition;
use squill_lib_core::errors::CompletionError;
use squill_lib_core::monitor::ProgressMonitor;
use squill_lib_core::navigator;
use squill_lib_core::objects::{DbNode, ObjectClass, ObjectSearchParams};

use crate::core::completion::analyzer::CompletionAnalyzer;
use crate::core::completion::context::QueryType;
use crate::core::completion::mask::object_name_mask;
use crate::core::completion::proposals::{Proposal, ProposalKind};
use crate::core::completion::refs::TableRef;
use crate::core::completion::score::FuzzyScorer;
use crate::core::completion::word::split_identifier;

pub(crate) const MAX_ATTRIBUTE_VALUE_PROPOSALS: usize = 50;
const MAX_PROCEDURE_SEARCH_RESULTS: usize = 100;
const MAX_ASSISTANT_FALLBACK_RESULTS: usize = 2;

/// A table mentioned by the active statement, resolved (or not) against
/// the catalog.
type RootTable = (TableRef, Option<DbNode>);

impl CompletionAnalyzer<'_> {
    fn dialect_arc(&self) -> Arc<Dialect> {
        self.request.context.syntax.dialect_arc()
    }

    // ---- empty prefix (§ empty/literal/numeric/quoted) ----

    pub(crate) fn resolve_empty_prefix(
        &mut self,
        monitor: &ProgressMonitor,
        meta: &ProgressMonitor,
    ) -> Result<(), CompletionError> {
        let config = self.request.context.config.clone();
        let statement = self.request.statement_text().to_string();
        let query = self.classification.query_type;

        let mut root_tables: Vec<RootTable> = Vec::new();

        let has_container = self.request.context.data_source.container().is_some();
        match query {
            Some(QueryType::Column) if has_container => {
                monitor.check_canceled()?;
                let references = self.refs.references(&statement, "");

                // Alias proposals from the statement go in front of
                // everything else. Not in an INTO column list, where the
                // target table itself is no candidate.
                if self.word.prev_key_word() != "INTO" {
                    let ref_proposals: Vec<Proposal> = {
                        let factory = self.factory();
                        references
                            .iter()
                            .map(|r| factory.table_ref_proposal(&r.table, r.alias.as_deref()))
                            .collect()
                    };
                    self.proposals.extend(ref_proposals);
                }

                for r in references {
                    let node = self.resolve_table_node(&r.table, meta);
                    root_tables.push((r, node));
                }

                if self.word.prev_key_word() == "ON" && root_tables.len() > 1 {
                    self.join_condition_proposals(&root_tables, meta);
                }

                if config.show_values && self.at_value_position() {
                    self.value_proposals(&root_tables, monitor, meta)?;
                }
            }
            _ => {
                self.default_container_proposals(meta)?;
            }
        }

        if self.request.partition != Partition::String {
            if !root_tables.is_empty() {
                for (_, node) in &root_tables {
                    let Some(node) = node.clone() else { continue };
                    meta.check_canceled()?;
                    let columns = self.children_proposals(&node, None, None, meta);
                    self.proposals.extend(columns);
                }
            } else if query == Some(QueryType::Column)
                && self.request.context.exec_ctx.default_object().is_none()
            {
                if let Some(root) = self.request.context.data_source.container() {
                    let children = self.children_proposals(&root, None, None, meta);
                    self.proposals.extend(children);
                }
            }
        }

        if query == Some(QueryType::Join) && !self.proposals.is_empty() {
            self.restrict_to_join_candidates(meta)?;
        }

        Ok(())
    }

    /// Inside a string literal only value proposals may surface.
    pub(crate) fn resolve_string_partition(
        &mut self,
        monitor: &ProgressMonitor,
        meta: &ProgressMonitor,
    ) -> Result<(), CompletionError> {
        if self.classification.query_type != Some(QueryType::Column) {
            return Ok(());
        }
        if !self.request.context.config.show_values || !self.at_value_position() {
            return Ok(());
        }

        let statement = self.request.statement_text().to_string();
        let root_tables: Vec<RootTable> = self
            .refs
            .references(&statement, "")
            .into_iter()
            .map(|r| {
                let node = self.resolve_table_node(&r.table, meta);
                (r, node)
            })
            .collect();
        self.value_proposals(&root_tables, monitor, meta)
    }

    fn default_container_proposals(
        &mut self,
        meta: &ProgressMonitor,
    ) -> Result<(), CompletionError> {
        let mut containers = self.request.context.exec_ctx.selected_objects();
        containers.extend(self.request.context.data_source.container());

        for container in containers {
            meta.check_canceled()?;
            let children = self.children_proposals(&container, None, None, meta);
            if !children.is_empty() {
                self.proposals.extend(children);
                return Ok(());
            }
        }
        Ok(())
    }

    // ---- non-empty prefix ----

    pub(crate) fn resolve_prefix(
        &mut self,
        monitor: &ProgressMonitor,
        meta: &ProgressMonitor,
    ) -> Result<(), CompletionError> {
        if self.classification.query_type == Some(QueryType::Column) {
            return self.resolve_column_prefix(meta);
        }

        let word = self.word.word_part().to_string();
        let produced = self.dotted_descent(&word, meta)?;
        if produced {
            return Ok(());
        }

        if !self.word.contains_separator(&word) {
            let statement = self.request.statement_text().to_string();
            let matching = self.refs.references(&statement, &word);
            let ref_proposals: Vec<Proposal> = {
                let factory = self.factory();
                matching
                    .iter()
                    .map(|r| factory.table_ref_proposal(&r.table, r.alias.as_deref()))
                    .collect()
            };
            self.proposals.extend(ref_proposals);

            if self.proposals.is_empty() && !self.request.context.config.simple_mode {
                self.assistant_fallback(monitor)?;
            }
        }
        Ok(())
    }

    fn resolve_column_prefix(&mut self, meta: &ProgressMonitor) -> Result<(), CompletionError> {
        let dialect = self.dialect_arc();
        let separator = dialect.struct_separator();
        let word = self.word.word_part().to_string();
        let statement = self.request.statement_text().to_string();

        if word == "*" {
            return self.expand_star(&statement, separator, meta);
        }

        if word.contains(separator) {
            let parts = split_identifier(&dialect, &word);
            let head = parts[0].to_string();

            if let Some(table) = self.alias_to_table(&head, &statement) {
                if let Some(mut node) = self.resolve_table_node(&table, meta) {
                    // Walk any intermediate segments, keep the last as mask.
                    let trailing = word.ends_with(separator);
                    let middle = &parts[1..parts.len() - 1];
                    let mask = match parts.last() {
                        Some(last) if !trailing && !last.is_empty() => Some(last.to_string()),
                        _ => None,
                    };
                    let mut lost = false;
                    for part in middle {
                        let target = fold_segment(&dialect, part);
                        match navigator::child(&node, meta, &target) {
                            Ok(Some(next)) => node = next,
                            Ok(None) => {
                                lost = true;
                                break;
                            }
                            Err(err) => {
                                tracing::debug!(error = %err, "column path lookup failed");
                                lost = true;
                                break;
                            }
                        }
                    }
                    if !lost {
                        let prefix_len = word.len() - mask.as_deref().map_or(0, str::len);
                        let dotted_prefix = word[..prefix_len].to_string();
                        let proposals = self.children_proposals(
                            &node,
                            mask.as_deref(),
                            Some(&dotted_prefix),
                            meta,
                        );
                        if !proposals.is_empty() {
                            self.proposals.extend(proposals);
                            return Ok(());
                        }
                    }
                }
            }

            self.dotted_descent(&word, meta)?;
            return Ok(());
        }

        // The cursor is on an alias itself; the editor must not replace it.
        let references = self.refs.references(&statement, "");
        if references
            .iter()
            .any(|r| r.alias.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(&word)))
        {
            self.proposals.clear();
            self.search_finished = true;
            return Ok(());
        }

        let matching = self.refs.references(&statement, &word);
        let ref_proposals: Vec<Proposal> = {
            let factory = self.factory();
            matching
                .iter()
                .map(|r| factory.table_ref_proposal(&r.table, r.alias.as_deref()))
                .collect()
        };
        self.proposals.extend(ref_proposals);

        for r in references {
            meta.check_canceled()?;
            let Some(node) = self.resolve_table_node(&r.table, meta) else {
                continue;
            };
            let columns = self.children_proposals(&node, Some(&word), None, meta);
            self.proposals.extend(columns);
        }
        Ok(())
    }

    /// `*` as the (rewritten) prefix expands to the full column list.
    fn expand_star(
        &mut self,
        statement: &str,
        separator: char,
        meta: &ProgressMonitor,
    ) -> Result<(), CompletionError> {
        let prev0 = self.word.prev_words().first().cloned();
        if self.word.prev_key_word() != "INTO" {
            if let Some(prev0) = prev0.filter(|p| p.contains(separator)) {
                let alias = prev0
                    .split(separator)
                    .next()
                    .unwrap_or_default()
                    .to_string();
                if let Some(table) = self.alias_to_table(&alias, statement) {
                    if let Some(node) = self.resolve_table_node(&table, meta) {
                        let prefix = format!("{alias}{separator}");
                        let proposals =
                            self.children_proposals(&node, Some("*"), Some(&prefix), meta);
                        self.proposals.extend(proposals);
                        return Ok(());
                    }
                }
            }
        }

        for r in self.refs.references(statement, "") {
            meta.check_canceled()?;
            let Some(node) = self.resolve_table_node(&r.table, meta) else {
                continue;
            };
            let proposals = self.children_proposals(&node, Some("*"), None, meta);
            self.proposals.extend(proposals);
        }
        Ok(())
    }

    // ---- dotted-path descent ----

    /// Splits the prefix on the struct separator and walks containers from
    /// the root, falling back to each selected object for the first step.
    /// Returns whether any proposals were produced.
    fn dotted_descent(
        &mut self,
        word: &str,
        meta: &ProgressMonitor,
    ) -> Result<bool, CompletionError> {
        let dialect = self.dialect_arc();
        let separator = dialect.struct_separator();
        let trailing = word.ends_with(separator);

        let mut parts = split_identifier(&dialect, word);
        if trailing {
            parts.pop();
        }
        let (walk, mask): (&[SmolStr], Option<&str>) = if trailing {
            (&parts[..], None)
        } else {
            match parts.split_last() {
                Some((last, init)) => (init, Some(last.as_str())),
                None => (&parts[..], None),
            }
        };

        let mut starts: Vec<DbNode> = Vec::new();
        starts.extend(self.request.context.data_source.container());
        starts.extend(self.request.context.exec_ctx.selected_objects());

        for start in starts {
            meta.check_canceled()?;
            let mut node = Some(start);
            let mut depth = 0usize;
            for part in walk {
                let target = fold_segment(&dialect, part);
                let next = match &node {
                    Some(n) => navigator::child(n, meta, &target).unwrap_or_else(|err| {
                        tracing::debug!(error = %err, segment = %target, "descent step failed");
                        None
                    }),
                    None => None,
                };
                match next {
                    Some(n) => {
                        node = Some(n);
                        depth += 1;
                    }
                    None => {
                        node = None;
                        break;
                    }
                }
            }
            let Some(node) = node else {
                if depth > 0 {
                    // Resolved partway and then lost the trail; bail rather
                    // than guess.
                    return Ok(false);
                }
                continue;
            };

            let dotted_prefix = match mask {
                None => (trailing && !word.is_empty()).then(|| word.to_string()),
                Some(m) => {
                    let prefix = &word[..word.len() - m.len()];
                    (!prefix.is_empty()).then(|| prefix.to_string())
                }
            };
            let proposals =
                self.children_proposals(&node, mask, dotted_prefix.as_deref(), meta);
            if !proposals.is_empty() {
                self.proposals.extend(proposals);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn assistant_fallback(&mut self, monitor: &ProgressMonitor) -> Result<(), CompletionError> {
        monitor.check_canceled()?;
        let dialect = self.dialect_arc();
        let word = self.word.word_part().to_string();

        let found = {
            let Some(assistant) = self.request.context.data_source.structure_assistant() else {
                return Ok(());
            };
            let params = ObjectSearchParams {
                types: assistant.auto_complete_object_types(),
                mask: object_name_mask(&word, &dialect, true),
                parent: None,
                case_sensitive: false,
                global_search: true,
                max_results: MAX_ASSISTANT_FALLBACK_RESULTS,
            };
            match assistant.find_objects_by_mask(monitor, &params) {
                Ok(found) => found,
                Err(err) => {
                    tracing::debug!(error = %err, "assistant fallback failed");
                    return Ok(());
                }
            }
        };

        let proposals: Vec<Proposal> = {
            let factory = self.factory();
            found
                .into_iter()
                .map(|node| factory.object_proposal(node, 0, true))
                .collect()
        };
        self.proposals.extend(proposals);
        Ok(())
    }

    // ---- procedures ----

    pub(crate) fn resolve_procedures(
        &mut self,
        monitor: &ProgressMonitor,
    ) -> Result<(), CompletionError> {
        monitor.check_canceled()?;
        let dialect = self.dialect_arc();
        let config = self.request.context.config.clone();
        let word = self.word.word_part().to_string();

        let selected = self.request.context.exec_ctx.default_object().cloned();
        let mut container = selected.clone();
        if self.word.contains_separator(&word) {
            let parts = split_identifier(&dialect, &word);
            let selected_named_in_prefix = selected
                .as_ref()
                .is_some_and(|s| parts.iter().any(|p| p.eq_ignore_ascii_case(s.name())));
            if !selected_named_in_prefix {
                // A fully-qualified prefix names a sibling container.
                if let Some(root) = self.request.context.data_source.container() {
                    let head = fold_segment(&dialect, &parts[0]);
                    match navigator::child(&root, monitor, &head) {
                        Ok(Some(sibling)) => container = Some(sibling),
                        Ok(None) => {}
                        Err(err) => {
                            tracing::debug!(error = %err, "procedure container lookup failed")
                        }
                    }
                }
            }
        }

        let found = {
            let Some(assistant) = self.request.context.data_source.structure_assistant() else {
                return Ok(());
            };
            let params = ObjectSearchParams {
                types: vec![ObjectClass::Procedure],
                mask: object_name_mask(&word, &dialect, config.search_inside_names),
                parent: container,
                case_sensitive: false,
                global_search: config.search_globally,
                max_results: MAX_PROCEDURE_SEARCH_RESULTS,
            };
            match assistant.find_objects_by_mask(monitor, &params) {
                Ok(found) => found,
                Err(err) => {
                    tracing::debug!(error = %err, "procedure search failed");
                    return Ok(());
                }
            }
        };

        let proposals: Vec<Proposal> = {
            let factory = self.factory();
            found
                .into_iter()
                .map(|node| factory.object_proposal(node, 0, true))
                .collect()
        };
        self.proposals.extend(proposals);
        Ok(())
    }

    // ---- values ----

    fn at_value_position(&self) -> bool {
        let keyword = self.word.prev_key_word();
        let triggers = self.request.context.dialect().sets("value_trigger_words");
        let keyword_fits = matches!(keyword, "SET" | "WHERE" | "AND" | "OR" | "ON")
            || triggers.contains(keyword);
        if !keyword_fits {
            return false;
        }
        if self.request.partition == Partition::String || triggers.contains(keyword) {
            return true;
        }
        let delimiter = self.word.prev_delimiter();
        !delimiter.is_empty() && !delimiter.ends_with(')')
    }

    fn value_proposals(
        &mut self,
        root_tables: &[RootTable],
        monitor: &ProgressMonitor,
        meta: &ProgressMonitor,
    ) -> Result<(), CompletionError> {
        let Some(raw) = self.word.prev_words().first() else {
            return Ok(());
        };
        let dialect = self.dialect_arc();
        let column_name = {
            let last = split_identifier(&dialect, raw)
                .last()
                .cloned()
                .unwrap_or_default();
            dialect.unquote(&last)
        };
        if column_name.is_empty() {
            return Ok(());
        }

        let in_string = self.request.partition == Partition::String;
        let typed = self.word.word_part().to_lowercase();

        for (_, node) in root_tables {
            monitor.check_canceled()?;
            let Some(node) = node else { continue };
            let Some(entity) = node.as_entity() else { continue };
            let attribute = match entity.attribute(meta, &column_name) {
                Ok(Some(DbNode::Attribute(attribute))) => attribute,
                Ok(_) => continue,
                Err(err) => {
                    tracing::debug!(error = %err, "attribute lookup failed");
                    continue;
                }
            };

            // The session is scoped to this block; it is released on every
            // path out, including errors.
            let collected: Vec<Proposal> = {
                let mut session =
                    match self.request.context.data_source.open_session(monitor) {
                        Ok(Some(session)) => session,
                        Ok(None) => return Ok(()),
                        Err(err) => {
                            tracing::debug!(error = %err, "value session unavailable");
                            return Ok(());
                        }
                    };
                let hints = if let Some(dictionary) = attribute.dictionary() {
                    session.dictionary_entries(&dictionary, MAX_ATTRIBUTE_VALUE_PROPOSALS)
                } else if attribute.is_enumerable() {
                    session.attribute_values(attribute.as_ref(), MAX_ATTRIBUTE_VALUE_PROPOSALS)
                } else {
                    Ok(Vec::new())
                };
                match hints {
                    Ok(hints) => {
                        let factory = self.factory();
                        hints
                            .iter()
                            .map(|hint| {
                                factory.value_proposal(hint, attribute.as_ref(), in_string)
                            })
                            .filter(|p| {
                                typed.is_empty()
                                    || p.replacement.to_lowercase().starts_with(&typed)
                            })
                            .collect()
                    }
                    Err(err) => {
                        tracing::debug!(error = %err, "value enumeration failed");
                        Vec::new()
                    }
                }
            };

            if !collected.is_empty() {
                self.proposals.extend(collected);
                return Ok(());
            }
        }
        Ok(())
    }

    // ---- joins ----

    fn join_condition_proposals(&mut self, root_tables: &[RootTable], meta: &ProgressMonitor) {
        let Some((left_ref, Some(left_node))) = root_tables.first() else {
            return;
        };
        let left_name = display_name(left_ref);

        let mut conditions: Vec<Proposal> = Vec::new();
        for (r, node) in &root_tables[1..] {
            let Some(node) = node else { continue };
            let Some(entity) = node.as_entity() else { continue };
            let own_name = display_name(r);

            let associations = match entity.associations(meta) {
                Ok(associations) => associations,
                Err(err) => {
                    tracing::debug!(error = %err, "association read failed");
                    continue;
                }
            };
            for association in associations {
                if !association.ref_entity.same_object(left_node) {
                    continue;
                }
                for (own, referenced) in &association.columns {
                    let text = format!("{own_name}.{own} = {left_name}.{referenced}");
                    let mut proposal = Proposal::literal(SmolStr::new(&text), text.clone());
                    proposal.kind = ProposalKind::Other;
                    conditions.push(proposal);
                }
            }

            // The left table may own the association instead.
            if let Some(left_entity) = left_node.as_entity() {
                let associations = match left_entity.associations(meta) {
                    Ok(associations) => associations,
                    Err(err) => {
                        tracing::debug!(error = %err, "association read failed");
                        continue;
                    }
                };
                for association in associations {
                    if !association.ref_entity.same_object(node) {
                        continue;
                    }
                    for (own, referenced) in &association.columns {
                        let text = format!("{left_name}.{own} = {own_name}.{referenced}");
                        let mut proposal = Proposal::literal(SmolStr::new(&text), text.clone());
                        proposal.kind = ProposalKind::Other;
                        conditions.push(proposal);
                    }
                }
            }
        }
        self.proposals.extend(conditions);
    }

    /// After JOIN, keep only tables with a foreign-key path to or from the
    /// leftmost table, and complete them with ` ON`.
    fn restrict_to_join_candidates(
        &mut self,
        meta: &ProgressMonitor,
    ) -> Result<(), CompletionError> {
        let statement = self.request.statement_text().to_string();
        let references = self.refs.references(&statement, "");
        let Some(left_ref) = references.first() else {
            return Ok(());
        };
        let Some(left_node) = self.resolve_table_node(&left_ref.table, meta) else {
            return Ok(());
        };
        let left_targets: Vec<DbNode> = left_node
            .as_entity()
            .and_then(|e| e.associations(meta).ok())
            .map(|assocs| assocs.into_iter().map(|a| a.ref_entity).collect())
            .unwrap_or_default();

        meta.check_canceled()?;

        let mut compatible: Vec<Proposal> = Vec::new();
        for proposal in &self.proposals {
            let Some(object) = &proposal.object else { continue };
            let Some(entity) = object.as_entity() else { continue };

            let references_left = entity
                .associations(meta)
                .ok()
                .is_some_and(|assocs| {
                    assocs.iter().any(|a| a.ref_entity.same_object(&left_node))
                });
            let referenced_by_left = left_targets.iter().any(|t| t.same_object(object));

            if references_left || referenced_by_left {
                let mut proposal = proposal.clone();
                proposal.replacement.push_str(" ON");
                compatible.push(proposal);
            }
        }

        if !compatible.is_empty() {
            self.proposals = compatible;
        }
        Ok(())
    }

    // ---- shared lookups ----

    /// Resolves a possibly-qualified table name from the statement text to
    /// a catalog node, trying the selected objects before the root.
    fn resolve_table_node(&self, name: &str, meta: &ProgressMonitor) -> Option<DbNode> {
        let dialect = self.dialect_arc();
        let parts = split_identifier(&dialect, name);

        let mut starts: Vec<DbNode> = self.request.context.exec_ctx.selected_objects();
        starts.extend(self.request.context.data_source.container());

        for start in starts {
            let mut node = Some(start);
            for part in &parts {
                let target = fold_segment(&dialect, part);
                node = match node {
                    Some(n) => navigator::child(&n, meta, &target).unwrap_or_else(|err| {
                        tracing::debug!(error = %err, table = name, "table lookup failed");
                        None
                    }),
                    None => None,
                };
                if node.is_none() {
                    break;
                }
            }
            if let Some(found) = node {
                match navigator::resolve_synonym(found, meta) {
                    Ok(Some(resolved)) => return Some(resolved),
                    Ok(None) => {}
                    Err(err) => {
                        tracing::debug!(error = %err, table = name, "synonym resolution failed")
                    }
                }
            }
        }
        None
    }

    fn alias_to_table(&self, alias: &str, statement: &str) -> Option<SmolStr> {
        let references = self.refs.references(statement, "");
        references
            .iter()
            .find(|r| {
                r.alias
                    .as_deref()
                    .is_some_and(|a| a.eq_ignore_ascii_case(alias))
            })
            .or_else(|| {
                references.iter().find(|r| {
                    let short = r.table.rsplit('.').next().unwrap_or(&r.table);
                    short.eq_ignore_ascii_case(alias) || r.table.eq_ignore_ascii_case(alias)
                })
            })
            .map(|r| r.table.clone())
    }

    // ---- child enumeration ----

    /// Enumerates a container's (or entity's) visible children and turns
    /// the matching ones into proposals. `start_part` of `*` expands to a
    /// single all-columns proposal.
    pub(crate) fn children_proposals(
        &self,
        parent: &DbNode,
        start_part: Option<&str>,
        dotted_prefix: Option<&str>,
        meta: &ProgressMonitor,
    ) -> Vec<Proposal> {
        let config = &self.request.context.config;

        let parent = match navigator::resolve_synonym(parent.clone(), meta) {
            Ok(Some(parent)) => parent,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::debug!(error = %err, "synonym resolution failed");
                return Vec::new();
            }
        };
        let children = match navigator::children(&parent, meta) {
            Ok(children) => children,
            Err(err) => {
                tracing::debug!(error = %err, parent = parent.name(), "child enumeration failed");
                return Vec::new();
            }
        };
        if children.is_empty() {
            return Vec::new();
        }

        if start_part == Some("*") && !config.simple_mode {
            let joined = children
                .iter()
                .map(|c| match dotted_prefix {
                    Some(prefix) => format!("{prefix}{}", c.name()),
                    None => c.name().to_string(),
                })
                .join(", ");
            let mut proposal = Proposal::literal(SmolStr::new(&joined), joined.clone());
            proposal.kind = ProposalKind::Other;
            return vec![proposal];
        }

        let mask = start_part.unwrap_or("");
        let mut scored: Vec<(DbNode, u32)> = Vec::new();
        if mask.is_empty() {
            scored.extend(children.into_iter().map(|c| (c, 0)));
        } else if !config.search_inside_names || config.simple_mode {
            let lower = mask.to_lowercase();
            scored.extend(
                children
                    .into_iter()
                    .filter(|c| c.name().to_lowercase().starts_with(&lower))
                    .map(|c| (c, 0)),
            );
        } else {
            let mut scorer = FuzzyScorer::new();
            for child in children {
                let score = scorer.score(mask, child.name());
                if score > 0 {
                    scored.push((child, score));
                }
            }
        }

        let has_scores = scored.iter().any(|(_, score)| *score > 0);
        if has_scores {
            scored.sort_by(|a, b| b.1.cmp(&a.1));
        } else if config.sort_alphabetically {
            scored.sort_by(|a, b| match (&a.0, &b.0) {
                (DbNode::Attribute(x), DbNode::Attribute(y)) => x.ordinal().cmp(&y.ordinal()),
                _ => a.0.name().to_lowercase().cmp(&b.0.name().to_lowercase()),
            });
        }

        let factory = self.factory();
        scored
            .into_iter()
            .map(|(node, score)| {
                let mut proposal = factory.object_proposal(node, score, true);
                if let Some(prefix) = dotted_prefix {
                    if !proposal.fully_qualified {
                        proposal.replacement = format!("{prefix}{}", proposal.replacement);
                    }
                }
                proposal
            })
            .collect()
    }
}

fn fold_segment(dialect: &Dialect, segment: &str) -> SmolStr {
    if dialect.is_quoted(segment) {
        dialect.unquote(segment)
    } else {
        dialect.storage_fold(segment)
    }
}

fn display_name(r: &TableRef) -> String {
    match &r.alias {
        Some(alias) if !alias.is_empty() => alias.to_string(),
        _ => r
            .table
            .rsplit('.')
            .next()
            .unwrap_or(&r.table)
            .to_string(),
    }
}
