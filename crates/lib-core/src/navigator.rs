//! Navigation over the external catalog tree: synonym resolution, hidden
//! child skipping, virtual container flattening and qualified names.

use itertools::Itertools;

use crate::dialects::Dialect;
use crate::errors::CatalogError;
use crate::monitor::ProgressMonitor;
use crate::objects::DbNode;

const MAX_SYNONYM_HOPS: usize = 8;

/// Follows a synonym chain to its target. Non-synonym nodes come back
/// unchanged; a dangling synonym yields `None`.
pub fn resolve_synonym(
    node: DbNode,
    monitor: &ProgressMonitor,
) -> Result<Option<DbNode>, CatalogError> {
    let mut current = node;
    for _ in 0..MAX_SYNONYM_HOPS {
        match current {
            DbNode::Synonym(synonym) => match synonym.resolve(monitor)? {
                Some(target) => current = target,
                None => return Ok(None),
            },
            other => return Ok(Some(other)),
        }
    }
    log::debug!("synonym chain exceeded {MAX_SYNONYM_HOPS} hops");
    Ok(None)
}

/// Visible children of a node: container children or entity attributes,
/// with hidden children skipped and virtual containers flattened in place.
pub fn children(node: &DbNode, monitor: &ProgressMonitor) -> Result<Vec<DbNode>, CatalogError> {
    let raw = match node {
        DbNode::Container(container) => {
            if !monitor.is_cache_only() {
                container.cache_structure(monitor)?;
            }
            container.children(monitor)?
        }
        DbNode::Entity(entity) => entity.attributes(monitor)?,
        DbNode::Synonym(_) => match resolve_synonym(node.clone(), monitor)? {
            Some(target) => return children(&target, monitor),
            None => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };

    let mut visible = Vec::with_capacity(raw.len());
    for child in raw {
        if child.is_hidden() {
            continue;
        }
        if child.is_virtual() {
            visible.extend(children(&child, monitor)?);
        } else {
            visible.push(child);
        }
    }
    Ok(visible)
}

/// Looks up one child by name, driver lookup first, then a case-insensitive
/// scan over the flattened children.
pub fn child(
    node: &DbNode,
    monitor: &ProgressMonitor,
    name: &str,
) -> Result<Option<DbNode>, CatalogError> {
    match node {
        DbNode::Container(container) => {
            if let Some(found) = container.child(monitor, name)? {
                return Ok(Some(found));
            }
        }
        DbNode::Entity(entity) => {
            if let Some(found) = entity.attribute(monitor, name)? {
                return Ok(Some(found));
            }
        }
        DbNode::Synonym(_) => {
            return match resolve_synonym(node.clone(), monitor)? {
                Some(target) => child(&target, monitor, name),
                None => Ok(None),
            };
        }
        _ => return Ok(None),
    }

    let children = children(node, monitor)?;
    Ok(children
        .into_iter()
        .find(|c| c.name().eq_ignore_ascii_case(name)))
}

/// Dotted name from the catalog root down to the node, quoting segments the
/// dialect cannot write bare. Virtual and unnamed ancestors are skipped.
pub fn qualified_name(node: &DbNode, dialect: &Dialect) -> String {
    let mut segments = Vec::new();
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if !n.is_virtual() && !n.name().is_empty() {
            segments.push(segment(n.name(), dialect));
        }
        current = n.parent();
    }
    segments.reverse();
    segments
        .into_iter()
        .join(&dialect.catalog_separator().to_string())
}

fn segment(name: &str, dialect: &Dialect) -> String {
    if dialect.requires_quoting(name) {
        dialect.quote(name)
    } else {
        name.to_string()
    }
}
