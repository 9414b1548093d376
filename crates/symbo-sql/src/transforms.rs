//! Common query rewrites and read-only extraction helpers.
//!
//! Rewrites take the [`Tree`] plus a [`Collection`] of target statements and
//! return the paths they touched, so they compose with the rest of the
//! navigator:
//!
//! ```
//! use symbo_sql::builder::*;
//! use symbo_sql::generator::Generator;
//! use symbo_sql::transforms::{add_where, set_limit};
//! use symbo_sql::traversal::Tree;
//!
//! let mut tree = Tree::new(select([col("a")]).from("t").build());
//! let root = tree.collection();
//! add_where(&mut tree, &root, col("a").gt(lit(1)).into_inner()).unwrap();
//! set_limit(&mut tree, &root, 10, None).unwrap();
//! assert_eq!(
//!     Generator::sql(tree.root()).unwrap(),
//!     "SELECT a FROM t WHERE a > 1 LIMIT 10"
//! );
//! ```

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::builder::{self, Expr};
use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::expressions::*;
use crate::traversal::{introduces_scope, NodePath, NodeWalk, Tree};

/// Apply `edit` to every target, deepest first, so an edit never detaches a
/// target still waiting its turn. Results come back in collection order.
fn edit_each<F>(tree: &mut Tree, targets: &Collection, mut edit: F) -> Result<Collection>
where
    F: FnMut(&mut Tree, &NodePath) -> Result<NodePath>,
{
    let mut pending = Vec::with_capacity(targets.len());
    for (i, path) in targets.paths().iter().enumerate() {
        pending.push((i, path.rebased(tree)?));
    }
    pending.sort_by(|a, b| b.1.route().cmp(a.1.route()));

    let mut done = vec![None; pending.len()];
    for (i, path) in pending {
        done[i] = Some(edit(tree, &path)?);
    }
    Ok(Collection::new(done.into_iter().flatten().collect()))
}

fn expect_kind(tree: &Tree, path: &NodePath, kinds: &[NodeKind], operation: &str) -> Result<()> {
    let kind = path.kind(tree)?;
    if kinds.contains(&kind) {
        return Ok(());
    }
    let expected: Vec<&str> = kinds.iter().map(|k| k.name()).collect();
    Err(Error::structural_edit(
        path,
        format!("{operation} expects {}, found {kind}", expected.join(" or ")),
    ))
}

// ---------------------------------------------------------------------------
// WHERE / LIMIT
// ---------------------------------------------------------------------------

/// AND `condition` onto the WHERE clause of every target SELECT, UPDATE or
/// DELETE, creating the clause when it is missing.
///
/// Returns the paths of the resulting WHERE conditions.
#[instrument(level = "debug", skip_all, fields(targets = targets.len()))]
pub fn add_where(tree: &mut Tree, targets: &Collection, condition: Node) -> Result<Collection> {
    edit_each(tree, targets, |tree, path| {
        expect_kind(
            tree,
            path,
            &[NodeKind::Select, NodeKind::Update, NodeKind::Delete],
            "add_where",
        )?;
        let combined = match path.attribute(tree, "where_clause")? {
            Some(existing) => Node::from(BinaryOp::new(
                existing.node(tree)?.clone(),
                BinaryOperator::And,
                condition.clone(),
            )),
            None => condition.clone(),
        };
        path.set_attribute(tree, "where_clause", combined)
    })
}

/// Set (or overwrite) `LIMIT count [OFFSET offset]` on every target SELECT
/// or set operation.
#[instrument(level = "debug", skip_all, fields(targets = targets.len(), count))]
pub fn set_limit(
    tree: &mut Tree,
    targets: &Collection,
    count: u32,
    offset: Option<u32>,
) -> Result<Collection> {
    let limit = Node::from(LimitClause {
        count: Box::new(Node::from(IntegerLiteral::new(i64::from(count)))),
        offset: offset.map(|o| Box::new(Node::from(IntegerLiteral::new(i64::from(o))))),
    });
    edit_each(tree, targets, |tree, path| {
        expect_kind(
            tree,
            path,
            &[NodeKind::Select, NodeKind::SetOperation],
            "set_limit",
        )?;
        path.set_attribute(tree, "limit", limit.clone())
    })
}

// ---------------------------------------------------------------------------
// CTEs
// ---------------------------------------------------------------------------

/// Make `name AS (query)` the first CTE of every target SELECT, so the
/// existing CTEs and the body can all refer to it.
///
/// A SELECT that already defines a CTE called `name` (compared
/// case-insensitively) is a validation error.
#[instrument(level = "debug", skip(tree, targets, query), fields(targets = targets.len()))]
pub fn inject_cte(
    tree: &mut Tree,
    targets: &Collection,
    name: &str,
    query: Node,
) -> Result<Collection> {
    let cte = builder::cte(name, query)?.into_inner();
    edit_each(tree, targets, |tree, path| {
        expect_kind(tree, path, &[NodeKind::Select], "inject_cte")?;
        let Some(with) = path.attribute(tree, "with")? else {
            let with = path.set_attribute(
                tree,
                "with",
                Node::from(WithClause {
                    recursive: false,
                    ctes: vec![cte.clone()],
                }),
            )?;
            return first_cte(tree, &with);
        };

        let (recursive, taken) = match with.node(tree)? {
            Node::WithClause(w) => (
                w.recursive,
                w.ctes
                    .iter()
                    .any(|c| c.name().is_some_and(|n| n.eq_ignore_ascii_case(name))),
            ),
            other => {
                return Err(Error::structural_edit(
                    &with,
                    format!("expected a WITH clause, found {}", other.kind()),
                ))
            }
        };
        if taken {
            return Err(Error::validation(
                "inject_cte",
                name,
                "a CTE with this name already exists",
            ));
        }
        match with.index(tree, "ctes", 0)? {
            Some(first) => first.insert_before(tree, cte.clone()),
            None => {
                let with = with.replace(
                    tree,
                    Node::from(WithClause {
                        recursive,
                        ctes: vec![cte.clone()],
                    }),
                )?;
                first_cte(tree, &with)
            }
        }
    })
}

fn first_cte(tree: &Tree, with: &NodePath) -> Result<NodePath> {
    with.index(tree, "ctes", 0)?
        .ok_or_else(|| Error::structural_edit(with, "WITH clause has no CTE"))
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Point every reference to the table `from` (dotted path, exact match) at
/// `to` instead. Returns the replaced table names.
#[instrument(level = "debug", skip(tree))]
pub fn rename_table(tree: &mut Tree, from: &str, to: &str) -> Result<Collection> {
    let replacement = builder::table_name(to)?.into_inner();
    let matches = tree.collection().find_where(tree, NodeKind::TableName, |r| {
        r.node
            .as_table_name()
            .is_some_and(|t| t.parts().join(".") == from)
    })?;
    debug!(matches = matches.len(), "renaming table references");
    matches.replace_with(tree, replacement)
}

/// Every table name in the tree as a dotted path, first occurrence order,
/// without duplicates.
pub fn extract_table_references(node: &Node) -> Vec<String> {
    let mut seen = HashSet::new();
    node.dfs()
        .filter_map(Node::as_table_name)
        .map(|t| t.parts().join("."))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// `left = right OR (left IS NULL AND right IS NULL)`
///
/// ```
/// use symbo_sql::builder::col;
/// use symbo_sql::transforms::null_safe_eq;
///
/// assert_eq!(
///     null_safe_eq(col("a"), col("b")).to_sql().unwrap(),
///     "a = b OR a IS NULL AND b IS NULL"
/// );
/// ```
pub fn null_safe_eq(left: Expr, right: Expr) -> Expr {
    let both_null = left.clone().is_null().and(right.clone().is_null());
    left.eq(right).or(both_null)
}

/// Prefix every bare column in the select lists of the target SELECTs with
/// `alias`. Already qualified columns, `*` qualifiers and anything inside a
/// nested query are left alone.
///
/// Returns the new qualified column references.
#[instrument(level = "debug", skip(tree, targets), fields(targets = targets.len()))]
pub fn qualify_columns(tree: &mut Tree, targets: &Collection, alias: &str) -> Result<Collection> {
    if alias.is_empty() {
        return Err(Error::validation("qualify_columns", alias, "alias must not be empty"));
    }
    let bare = bare_columns(tree, targets)?;
    debug!(columns = bare.len(), "qualifying columns");
    bare.replace_with_fn(tree, |r, _| {
        Node::from(ColumnRef {
            parts: vec![Node::from(Identifier::new(alias)), r.node.clone()],
        })
    })
}

fn bare_columns(tree: &Tree, targets: &Collection) -> Result<Collection> {
    let mut found = Vec::new();
    for target in targets {
        expect_kind(tree, target, &[NodeKind::Select], "qualify_columns")?;
        let mut i = 0;
        while let Some(item) = target.index(tree, "select_list", i)? {
            let item_depth = item.depth();
            let columns = Collection::new(vec![item]).find_where(tree, NodeKind::Identifier, |r| {
                is_bare_column(tree, r.path, item_depth)
            })?;
            found.extend(columns);
            i += 1;
        }
    }
    Ok(Collection::new(found))
}

fn is_bare_column(tree: &Tree, path: &NodePath, item_depth: usize) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    if matches!(
        parent.kind(tree),
        Ok(NodeKind::ColumnRef) | Ok(NodeKind::Star) | Err(_)
    ) {
        return false;
    }
    !path
        .ancestors()
        .iter()
        .filter(|a| a.depth() > item_depth)
        .any(|a| a.kind(tree).map(introduces_scope).unwrap_or(false))
}
