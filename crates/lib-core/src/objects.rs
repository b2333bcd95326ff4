use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::errors::CatalogError;
use crate::monitor::ProgressMonitor;
use crate::value::{ScalarValue, ValueHint};

/// Coarse classification of a catalog object, used for structure-assistant
/// searches and per-class navigator filters.
#[derive(
    Debug,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Hash,
    strum_macros::IntoStaticStr,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum ObjectClass {
    Catalog,
    Schema,
    Table,
    View,
    Column,
    Procedure,
    Synonym,
    Unknown,
}

/// Base contract of every node in the catalog tree.
pub trait DbObject: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn parent(&self) -> Option<DbNode> {
        None
    }

    fn is_hidden(&self) -> bool {
        false
    }

    /// Virtual containers are flattened away during navigation; their
    /// children surface as children of the enclosing container.
    fn is_virtual(&self) -> bool {
        false
    }
}

/// A node with navigable children: data source root, catalog, schema.
pub trait Container: DbObject {
    fn children(&self, monitor: &ProgressMonitor) -> Result<Vec<DbNode>, CatalogError>;

    fn child(
        &self,
        monitor: &ProgressMonitor,
        name: &str,
    ) -> Result<Option<DbNode>, CatalogError> {
        let children = self.children(monitor)?;
        Ok(children
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name)))
    }

    /// Asks the driver to prime its metadata cache for this subtree.
    fn cache_structure(&self, _monitor: &ProgressMonitor) -> Result<(), CatalogError> {
        Ok(())
    }

    fn container_class(&self) -> ObjectClass {
        ObjectClass::Schema
    }
}

/// A table-like node with attributes and foreign-key associations.
pub trait Entity: DbObject {
    fn attributes(&self, monitor: &ProgressMonitor) -> Result<Vec<DbNode>, CatalogError>;

    fn attribute(
        &self,
        monitor: &ProgressMonitor,
        name: &str,
    ) -> Result<Option<DbNode>, CatalogError> {
        let attributes = self.attributes(monitor)?;
        Ok(attributes
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(name)))
    }

    fn associations(&self, _monitor: &ProgressMonitor) -> Result<Vec<Association>, CatalogError> {
        Ok(Vec::new())
    }

    fn entity_class(&self) -> ObjectClass {
        ObjectClass::Table
    }
}

/// A typed column. May be enumerable (few distinct values) or carry a
/// dictionary reference resolving values to labels.
pub trait Attribute: DbObject {
    fn ordinal(&self) -> usize {
        0
    }

    fn type_name(&self) -> &str {
        ""
    }

    fn is_enumerable(&self) -> bool {
        false
    }

    fn dictionary(&self) -> Option<DbNode> {
        None
    }

    /// The column's value handler: renders an enumerated value as a SQL
    /// literal suitable for this column's type.
    fn format_literal(&self, value: &ScalarValue) -> String {
        value.to_sql_literal()
    }
}

pub trait Procedure: DbObject {}

/// A synonym or alias object pointing at another catalog node.
pub trait SynonymObject: DbObject {
    fn resolve(&self, monitor: &ProgressMonitor) -> Result<Option<DbNode>, CatalogError>;
}

/// An unresolved handle: the driver knows the name and class but has not
/// materialized the object.
pub trait RefObject: DbObject {
    fn class(&self) -> ObjectClass;
}

/// Tagged variant over the catalog capability traits. The resolver
/// dispatches on the variant; no downcasting anywhere.
#[derive(Clone)]
pub enum DbNode {
    Container(Arc<dyn Container>),
    Entity(Arc<dyn Entity>),
    Attribute(Arc<dyn Attribute>),
    Procedure(Arc<dyn Procedure>),
    Synonym(Arc<dyn SynonymObject>),
    Reference(Arc<dyn RefObject>),
}

impl DbNode {
    pub fn object(&self) -> &dyn DbObject {
        match self {
            DbNode::Container(o) => o.as_ref(),
            DbNode::Entity(o) => o.as_ref(),
            DbNode::Attribute(o) => o.as_ref(),
            DbNode::Procedure(o) => o.as_ref(),
            DbNode::Synonym(o) => o.as_ref(),
            DbNode::Reference(o) => o.as_ref(),
        }
    }

    pub fn name(&self) -> &str {
        self.object().name()
    }

    pub fn parent(&self) -> Option<DbNode> {
        self.object().parent()
    }

    pub fn is_hidden(&self) -> bool {
        self.object().is_hidden()
    }

    pub fn is_virtual(&self) -> bool {
        self.object().is_virtual()
    }

    pub fn class(&self) -> ObjectClass {
        match self {
            DbNode::Container(o) => o.container_class(),
            DbNode::Entity(o) => o.entity_class(),
            DbNode::Attribute(_) => ObjectClass::Column,
            DbNode::Procedure(_) => ObjectClass::Procedure,
            DbNode::Synonym(_) => ObjectClass::Synonym,
            DbNode::Reference(o) => o.class(),
        }
    }

    pub fn as_container(&self) -> Option<&Arc<dyn Container>> {
        match self {
            DbNode::Container(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Arc<dyn Entity>> {
        match self {
            DbNode::Entity(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_attribute(&self) -> Option<&Arc<dyn Attribute>> {
        match self {
            DbNode::Attribute(o) => Some(o),
            _ => None,
        }
    }

    /// Identity for deduplication purposes: same class, same name chain.
    pub fn same_object(&self, other: &DbNode) -> bool {
        if self.class() != other.class() || !self.name().eq_ignore_ascii_case(other.name()) {
            return false;
        }
        match (self.parent(), other.parent()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.same_object(&b),
            _ => false,
        }
    }
}

impl fmt::Debug for DbNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.class(), self.name())
    }
}

/// A foreign-key association from the owning entity to `ref_entity`.
#[derive(Debug, Clone)]
pub struct Association {
    pub name: SmolStr,
    pub ref_entity: DbNode,
    /// Pairs of (owning attribute, referenced attribute).
    pub columns: Vec<(SmolStr, SmolStr)>,
}

/// Glob include/exclude filter attached to a navigator node class.
#[derive(Debug, Clone, Default)]
pub struct ObjectFilter {
    pub include: Vec<SmolStr>,
    pub exclude: Vec<SmolStr>,
}

impl ObjectFilter {
    pub fn matches(&self, name: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| glob_match(p, name)) {
            return false;
        }
        !self.exclude.iter().any(|p| glob_match(p, name))
    }
}

/// Case-insensitive glob match supporting `*` and `?`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    fn matches(p: &[char], t: &[char]) -> bool {
        match p.first() {
            None => t.is_empty(),
            Some('*') => (0..=t.len()).any(|skip| matches(&p[1..], &t[skip..])),
            Some('?') => !t.is_empty() && matches(&p[1..], &t[1..]),
            Some(&c) => t.first() == Some(&c) && matches(&p[1..], &t[1..]),
        }
    }
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let t: Vec<char> = text.to_lowercase().chars().collect();
    matches(&p, &t)
}

/// SQL-LIKE-style mask match (`%` wildcard), used by structure assistants.
pub fn mask_match(mask: &str, name: &str, case_sensitive: bool) -> bool {
    let pattern = mask.replace('%', "*");
    if case_sensitive {
        let p: Vec<char> = pattern.chars().collect();
        let t: Vec<char> = name.chars().collect();
        fn matches(p: &[char], t: &[char]) -> bool {
            match p.first() {
                None => t.is_empty(),
                Some('*') => (0..=t.len()).any(|skip| matches(&p[1..], &t[skip..])),
                Some(&c) => t.first() == Some(&c) && matches(&p[1..], &t[1..]),
            }
        }
        matches(&p, &t)
    } else {
        glob_match(&pattern, name)
    }
}

/// Parameters for a structure-assistant search.
#[derive(Debug, Clone)]
pub struct ObjectSearchParams {
    pub types: Vec<ObjectClass>,
    pub mask: String,
    pub parent: Option<DbNode>,
    pub case_sensitive: bool,
    pub global_search: bool,
    pub max_results: usize,
}

/// Driver capability: search the catalog by mask without knowing the schema.
pub trait StructureAssistant: Send + Sync {
    fn find_objects_by_mask(
        &self,
        monitor: &ProgressMonitor,
        params: &ObjectSearchParams,
    ) -> Result<Vec<DbNode>, CatalogError>;

    fn auto_complete_object_types(&self) -> Vec<ObjectClass> {
        vec![
            ObjectClass::Table,
            ObjectClass::View,
            ObjectClass::Procedure,
        ]
    }
}

/// A scoped database session for value enumeration. Dropping it releases
/// the underlying resource on every exit path.
pub trait ValueSession {
    fn attribute_values(
        &mut self,
        attribute: &dyn Attribute,
        max: usize,
    ) -> Result<Vec<ValueHint>, CatalogError>;

    fn dictionary_entries(
        &mut self,
        dictionary: &DbNode,
        max: usize,
    ) -> Result<Vec<ValueHint>, CatalogError>;
}

/// The connected data source as the engine sees it.
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Root of the object tree, if the source is hierarchical.
    fn container(&self) -> Option<DbNode>;

    /// When disabled, child enumeration must not trigger database reads.
    fn extra_metadata_read(&self) -> bool {
        true
    }

    fn structure_assistant(&self) -> Option<&dyn StructureAssistant> {
        None
    }

    fn object_filter(&self, _class: ObjectClass) -> Option<ObjectFilter> {
        None
    }

    fn open_session(
        &self,
        _monitor: &ProgressMonitor,
    ) -> Result<Option<Box<dyn ValueSession + '_>>, CatalogError> {
        Ok(None)
    }
}

/// The session's selected default objects.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub selected_catalog: Option<DbNode>,
    pub selected_schema: Option<DbNode>,
}

impl ExecutionContext {
    /// Most specific first: schema, then catalog.
    pub fn selected_objects(&self) -> Vec<DbNode> {
        self.selected_schema
            .iter()
            .chain(self.selected_catalog.iter())
            .cloned()
            .collect()
    }

    pub fn default_object(&self) -> Option<&DbNode> {
        self.selected_schema
            .as_ref()
            .or(self.selected_catalog.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_filter_includes_and_excludes() {
        let filter = ObjectFilter {
            include: vec!["pg_*".into(), "sys?".into()],
            exclude: vec!["pg_temp*".into()],
        };
        assert!(filter.matches("pg_class"));
        assert!(filter.matches("SYS1"));
        assert!(!filter.matches("pg_temp_1"));
        assert!(!filter.matches("users"));
    }

    #[test]
    fn mask_match_follows_like_semantics() {
        assert!(mask_match("us%", "USERS", false));
        assert!(!mask_match("us%", "USERS", true));
        assert!(mask_match("%", "anything", true));
        assert!(!mask_match("us%", "orders", false));
    }
}
