//! In-memory catalog objects used by tests across the workspace.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use smol_str::SmolStr;

use crate::errors::CatalogError;
use crate::monitor::ProgressMonitor;
use crate::objects::{
    Association, Attribute, Container, DataSource, DbNode, DbObject, Entity, ObjectClass,
    ObjectFilter, ObjectSearchParams, Procedure, RefObject, StructureAssistant, SynonymObject,
    ValueSession, mask_match,
};
use crate::value::{ScalarValue, ValueHint};

#[derive(Debug)]
pub struct MemColumn {
    name: SmolStr,
    ordinal: usize,
    type_name: SmolStr,
    values: Vec<ValueHint>,
    dictionary: OnceLock<DbNode>,
    parent: OnceLock<DbNode>,
    hidden: bool,
}

impl MemColumn {
    pub fn new(name: &str, ordinal: usize, type_name: &str) -> Arc<Self> {
        Arc::new(MemColumn {
            name: name.into(),
            ordinal,
            type_name: type_name.into(),
            values: Vec::new(),
            dictionary: OnceLock::new(),
            parent: OnceLock::new(),
            hidden: false,
        })
    }

    pub fn enumerable(name: &str, ordinal: usize, type_name: &str, values: &[&str]) -> Arc<Self> {
        Arc::new(MemColumn {
            name: name.into(),
            ordinal,
            type_name: type_name.into(),
            values: values
                .iter()
                .map(|v| ValueHint::plain(ScalarValue::Text((*v).into())))
                .collect(),
            dictionary: OnceLock::new(),
            parent: OnceLock::new(),
            hidden: false,
        })
    }

    pub fn hidden(name: &str, ordinal: usize, type_name: &str) -> Arc<Self> {
        Arc::new(MemColumn {
            name: name.into(),
            ordinal,
            type_name: type_name.into(),
            values: Vec::new(),
            dictionary: OnceLock::new(),
            parent: OnceLock::new(),
            hidden: true,
        })
    }

    pub fn set_dictionary(&self, dictionary: DbNode) {
        let _ = self.dictionary.set(dictionary);
    }
}

impl DbObject for MemColumn {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<DbNode> {
        self.parent.get().cloned()
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }
}

impl Attribute for MemColumn {
    fn ordinal(&self) -> usize {
        self.ordinal
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn is_enumerable(&self) -> bool {
        !self.values.is_empty()
    }

    fn dictionary(&self) -> Option<DbNode> {
        self.dictionary.get().cloned()
    }
}

#[derive(Debug)]
pub struct MemTable {
    name: SmolStr,
    columns: Vec<Arc<MemColumn>>,
    associations: RwLock<Vec<Association>>,
    dictionary_rows: Vec<ValueHint>,
    parent: OnceLock<DbNode>,
}

impl MemTable {
    pub fn new(name: &str, columns: Vec<Arc<MemColumn>>) -> Arc<Self> {
        Arc::new(MemTable {
            name: name.into(),
            columns,
            associations: RwLock::new(Vec::new()),
            dictionary_rows: Vec::new(),
            parent: OnceLock::new(),
        })
    }

    pub fn dictionary(name: &str, columns: Vec<Arc<MemColumn>>, rows: Vec<ValueHint>) -> Arc<Self> {
        Arc::new(MemTable {
            name: name.into(),
            columns,
            associations: RwLock::new(Vec::new()),
            dictionary_rows: rows,
            parent: OnceLock::new(),
        })
    }

    pub fn column(&self, name: &str) -> Option<&Arc<MemColumn>> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

impl DbObject for MemTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<DbNode> {
        self.parent.get().cloned()
    }
}

impl Entity for MemTable {
    fn attributes(&self, _monitor: &ProgressMonitor) -> Result<Vec<DbNode>, CatalogError> {
        Ok(self
            .columns
            .iter()
            .map(|c| DbNode::Attribute(Arc::clone(c) as Arc<dyn Attribute>))
            .collect())
    }

    fn associations(&self, _monitor: &ProgressMonitor) -> Result<Vec<Association>, CatalogError> {
        Ok(self.associations.read().unwrap().clone())
    }
}

#[derive(Debug)]
pub struct MemProcedure {
    name: SmolStr,
    parent: OnceLock<DbNode>,
}

impl MemProcedure {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(MemProcedure {
            name: name.into(),
            parent: OnceLock::new(),
        })
    }
}

impl DbObject for MemProcedure {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<DbNode> {
        self.parent.get().cloned()
    }
}

impl Procedure for MemProcedure {}

#[derive(Debug)]
pub struct MemSynonym {
    name: SmolStr,
    target: OnceLock<DbNode>,
    parent: OnceLock<DbNode>,
}

impl MemSynonym {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(MemSynonym {
            name: name.into(),
            target: OnceLock::new(),
            parent: OnceLock::new(),
        })
    }

    pub fn set_target(&self, target: DbNode) {
        let _ = self.target.set(target);
    }
}

impl DbObject for MemSynonym {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<DbNode> {
        self.parent.get().cloned()
    }
}

impl SynonymObject for MemSynonym {
    fn resolve(&self, _monitor: &ProgressMonitor) -> Result<Option<DbNode>, CatalogError> {
        Ok(self.target.get().cloned())
    }
}

/// An unresolved handle, as a driver would hand back from a global search.
#[derive(Debug)]
pub struct MemReference {
    name: SmolStr,
    class: ObjectClass,
    parent: OnceLock<DbNode>,
}

impl MemReference {
    pub fn new(name: &str, class: ObjectClass) -> Arc<Self> {
        Arc::new(MemReference {
            name: name.into(),
            class,
            parent: OnceLock::new(),
        })
    }
}

impl DbObject for MemReference {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<DbNode> {
        self.parent.get().cloned()
    }
}

impl RefObject for MemReference {
    fn class(&self) -> ObjectClass {
        self.class
    }
}

#[derive(Debug)]
pub struct MemSchema {
    name: SmolStr,
    tables: Vec<Arc<MemTable>>,
    procedures: Vec<Arc<MemProcedure>>,
    synonyms: Vec<Arc<MemSynonym>>,
    parent: OnceLock<DbNode>,
}

impl MemSchema {
    pub fn new(name: &str, tables: Vec<Arc<MemTable>>) -> Arc<Self> {
        Arc::new(MemSchema {
            name: name.into(),
            tables,
            procedures: Vec::new(),
            synonyms: Vec::new(),
            parent: OnceLock::new(),
        })
    }

    pub fn with_routines(
        name: &str,
        tables: Vec<Arc<MemTable>>,
        procedures: Vec<Arc<MemProcedure>>,
        synonyms: Vec<Arc<MemSynonym>>,
    ) -> Arc<Self> {
        Arc::new(MemSchema {
            name: name.into(),
            tables,
            procedures,
            synonyms,
            parent: OnceLock::new(),
        })
    }

    pub fn table(&self, name: &str) -> Option<&Arc<MemTable>> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

impl DbObject for MemSchema {
    fn name(&self) -> &str {
        &self.name
    }

    fn parent(&self) -> Option<DbNode> {
        self.parent.get().cloned()
    }
}

impl Container for MemSchema {
    fn children(&self, _monitor: &ProgressMonitor) -> Result<Vec<DbNode>, CatalogError> {
        let mut children: Vec<DbNode> = self
            .tables
            .iter()
            .map(|t| DbNode::Entity(Arc::clone(t) as Arc<dyn Entity>))
            .collect();
        children.extend(
            self.synonyms
                .iter()
                .map(|s| DbNode::Synonym(Arc::clone(s) as Arc<dyn SynonymObject>)),
        );
        children.extend(
            self.procedures
                .iter()
                .map(|p| DbNode::Procedure(Arc::clone(p) as Arc<dyn Procedure>)),
        );
        Ok(children)
    }
}

#[derive(Debug)]
pub struct MemRoot {
    schemas: Vec<Arc<MemSchema>>,
}

impl DbObject for MemRoot {
    fn name(&self) -> &str {
        ""
    }
}

impl Container for MemRoot {
    fn children(&self, _monitor: &ProgressMonitor) -> Result<Vec<DbNode>, CatalogError> {
        Ok(self
            .schemas
            .iter()
            .map(|s| DbNode::Container(Arc::clone(s) as Arc<dyn Container>))
            .collect())
    }

    fn container_class(&self) -> ObjectClass {
        ObjectClass::Catalog
    }
}

pub struct MemAssistant {
    root: Arc<MemRoot>,
}

impl std::fmt::Debug for MemAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MemAssistant")
    }
}

impl StructureAssistant for MemAssistant {
    fn find_objects_by_mask(
        &self,
        monitor: &ProgressMonitor,
        params: &ObjectSearchParams,
    ) -> Result<Vec<DbNode>, CatalogError> {
        monitor
            .check_canceled()
            .map_err(|_| CatalogError::new("canceled"))?;

        let mut found = Vec::new();
        for schema in &self.root.schemas {
            if let Some(parent) = &params.parent {
                if !parent.name().is_empty() && !parent.name().eq_ignore_ascii_case(&schema.name) {
                    continue;
                }
            }
            let schema_node = DbNode::Container(Arc::clone(schema) as Arc<dyn Container>);
            for child in Container::children(schema.as_ref(), monitor)? {
                if found.len() >= params.max_results {
                    return Ok(found);
                }
                if params.types.contains(&child.class())
                    && mask_match(&params.mask, child.name(), params.case_sensitive)
                {
                    found.push(child.clone());
                }
            }
            if params.types.contains(&ObjectClass::Schema)
                && mask_match(&params.mask, &schema.name, params.case_sensitive)
                && found.len() < params.max_results
            {
                found.push(schema_node);
            }
        }
        Ok(found)
    }
}

#[derive(Debug)]
pub struct MemDataSource {
    root: Arc<MemRoot>,
    assistant: MemAssistant,
    extra_metadata: bool,
    filters: RwLock<Vec<(ObjectClass, ObjectFilter)>>,
    live_sessions: Arc<AtomicUsize>,
}

impl MemDataSource {
    pub fn new(schemas: Vec<Arc<MemSchema>>) -> Arc<Self> {
        Self::with_metadata_reads(schemas, true)
    }

    pub fn with_metadata_reads(schemas: Vec<Arc<MemSchema>>, extra_metadata: bool) -> Arc<Self> {
        let root = Arc::new(MemRoot { schemas });
        let source = Arc::new(MemDataSource {
            root: Arc::clone(&root),
            assistant: MemAssistant {
                root: Arc::clone(&root),
            },
            extra_metadata,
            filters: RwLock::new(Vec::new()),
            live_sessions: Arc::new(AtomicUsize::new(0)),
        });

        let root_node = DbNode::Container(Arc::clone(&root) as Arc<dyn Container>);
        for schema in &root.schemas {
            let _ = schema.parent.set(root_node.clone());
            let schema_node = DbNode::Container(Arc::clone(schema) as Arc<dyn Container>);
            for table in &schema.tables {
                let _ = table.parent.set(schema_node.clone());
                let table_node = DbNode::Entity(Arc::clone(table) as Arc<dyn Entity>);
                for column in &table.columns {
                    let _ = column.parent.set(table_node.clone());
                }
            }
            for procedure in &schema.procedures {
                let _ = procedure.parent.set(schema_node.clone());
            }
            for synonym in &schema.synonyms {
                let _ = synonym.parent.set(schema_node.clone());
            }
        }

        source
    }

    pub fn schema(&self, name: &str) -> Option<DbNode> {
        self.root
            .schemas
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .map(|s| DbNode::Container(Arc::clone(s) as Arc<dyn Container>))
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<DbNode> {
        self.root
            .schemas
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(schema))?
            .table(name)
            .map(|t| DbNode::Entity(Arc::clone(t) as Arc<dyn Entity>))
    }

    pub fn add_filter(&self, class: ObjectClass, filter: ObjectFilter) {
        self.filters.write().unwrap().push((class, filter));
    }

    /// Sessions currently open; zero once every enumeration has released.
    pub fn open_session_count(&self) -> usize {
        self.live_sessions.load(Ordering::Relaxed)
    }
}

impl DataSource for MemDataSource {
    fn container(&self) -> Option<DbNode> {
        Some(DbNode::Container(
            Arc::clone(&self.root) as Arc<dyn Container>
        ))
    }

    fn extra_metadata_read(&self) -> bool {
        self.extra_metadata
    }

    fn structure_assistant(&self) -> Option<&dyn StructureAssistant> {
        Some(&self.assistant)
    }

    fn object_filter(&self, class: ObjectClass) -> Option<ObjectFilter> {
        self.filters
            .read()
            .unwrap()
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, f)| f.clone())
    }

    fn open_session(
        &self,
        _monitor: &ProgressMonitor,
    ) -> Result<Option<Box<dyn ValueSession + '_>>, CatalogError> {
        self.live_sessions.fetch_add(1, Ordering::Relaxed);
        Ok(Some(Box::new(MemSession {
            root: Arc::clone(&self.root),
            counter: Arc::clone(&self.live_sessions),
        })))
    }
}

pub struct MemSession {
    root: Arc<MemRoot>,
    counter: Arc<AtomicUsize>,
}

impl MemSession {
    fn find_column(&self, attribute: &dyn Attribute) -> Option<Arc<MemColumn>> {
        let table_node = attribute.parent()?;
        let schema_name = table_node.parent().map(|s| SmolStr::new(s.name()))?;
        let schema = self
            .root
            .schemas
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(&schema_name))?;
        let table = schema.table(table_node.name())?;
        table.column(attribute.name()).map(Arc::clone)
    }
}

impl ValueSession for MemSession {
    fn attribute_values(
        &mut self,
        attribute: &dyn Attribute,
        max: usize,
    ) -> Result<Vec<ValueHint>, CatalogError> {
        let column = self
            .find_column(attribute)
            .ok_or_else(|| CatalogError::new(format!("unknown column {}", attribute.name())))?;
        Ok(column.values.iter().take(max).cloned().collect())
    }

    fn dictionary_entries(
        &mut self,
        dictionary: &DbNode,
        max: usize,
    ) -> Result<Vec<ValueHint>, CatalogError> {
        for schema in &self.root.schemas {
            if let Some(table) = schema.table(dictionary.name()) {
                return Ok(table.dictionary_rows.iter().take(max).cloned().collect());
            }
        }
        Err(CatalogError::new(format!(
            "unknown dictionary {}",
            dictionary.name()
        )))
    }
}

impl Drop for MemSession {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Adds a foreign-key association `from.columns → to.columns`.
pub fn link(from: &Arc<MemTable>, to: &Arc<MemTable>, columns: &[(&str, &str)]) {
    let association = Association {
        name: SmolStr::new(format!("fk_{}_{}", from.name, to.name)),
        ref_entity: DbNode::Entity(Arc::clone(to) as Arc<dyn Entity>),
        columns: columns
            .iter()
            .map(|(a, b)| (SmolStr::new(*a), SmolStr::new(*b)))
            .collect(),
    };
    from.associations.write().unwrap().push(association);
}

/// The catalog most tests run against: `public.users`, `public.orders`
/// (FK to users), `public.products`, a synonym, a procedure, and an
/// `archive.users` twin for duplicate-hiding tests.
pub fn sample_source() -> Arc<MemDataSource> {
    let users = MemTable::new(
        "users",
        vec![
            MemColumn::new("id", 0, "integer"),
            MemColumn::new("name", 1, "varchar"),
            MemColumn::enumerable("status", 2, "varchar", &["active", "inactive"]),
            MemColumn::new("email", 3, "varchar"),
            MemColumn::hidden("row_version", 4, "integer"),
        ],
    );
    let orders = MemTable::new(
        "orders",
        vec![
            MemColumn::new("id", 0, "integer"),
            MemColumn::new("user_id", 1, "integer"),
            MemColumn::new("amount", 2, "numeric"),
            MemColumn::new("created_at", 3, "timestamp"),
        ],
    );
    let products = MemTable::new(
        "products",
        vec![
            MemColumn::new("id", 0, "integer"),
            MemColumn::new("title", 1, "varchar"),
        ],
    );
    link(&orders, &users, &[("user_id", "id")]);

    let all_users = MemSynonym::new("all_users");
    let cleanup = MemProcedure::new("sp_cleanup");
    let public = MemSchema::with_routines(
        "public",
        vec![Arc::clone(&users), orders, products],
        vec![cleanup],
        vec![Arc::clone(&all_users)],
    );

    let archive_users = MemTable::new(
        "users",
        vec![
            MemColumn::new("id", 0, "integer"),
            MemColumn::new("archived_at", 1, "timestamp"),
        ],
    );
    let archive = MemSchema::new("archive", vec![archive_users]);

    let source = MemDataSource::new(vec![public, archive]);
    all_users.set_target(DbNode::Entity(users as Arc<dyn Entity>));
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator;

    #[test]
    fn sample_source_navigates() {
        let source = sample_source();
        let monitor = ProgressMonitor::live();
        let root = source.container().unwrap();

        let schemas = navigator::children(&root, &monitor).unwrap();
        assert_eq!(schemas.len(), 2);

        let public = navigator::child(&root, &monitor, "public").unwrap().unwrap();
        let users = navigator::child(&public, &monitor, "users").unwrap().unwrap();
        assert_eq!(users.class(), ObjectClass::Table);

        let columns = navigator::children(&users, &monitor).unwrap();
        assert_eq!(columns.len(), 4);
    }

    #[test]
    fn synonym_resolves_to_target() {
        let source = sample_source();
        let monitor = ProgressMonitor::live();
        let public = source.schema("public").unwrap();

        let synonym = navigator::child(&public, &monitor, "all_users")
            .unwrap()
            .unwrap();
        let resolved = navigator::resolve_synonym(synonym, &monitor).unwrap().unwrap();
        assert_eq!(resolved.name(), "users");
    }

    #[test]
    fn sessions_release_on_drop() {
        let source = sample_source();
        let monitor = ProgressMonitor::live();
        {
            let _session = source.open_session(&monitor).unwrap().unwrap();
            assert_eq!(source.open_session_count(), 1);
        }
        assert_eq!(source.open_session_count(), 0);
    }

    #[test]
    fn qualified_names_skip_the_root() {
        let source = sample_source();
        let users = source.table("public", "users").unwrap();
        let dialect = crate::dialects::Dialect::new();
        assert_eq!(navigator::qualified_name(&users, &dialect), "public.users");
    }
}
