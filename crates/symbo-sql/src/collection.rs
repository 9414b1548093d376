//! Declarative queries and batched edits over sets of [`NodePath`]s.
//!
//! A [`Collection`] is just an ordered list of paths. Every method takes the
//! [`Tree`] explicitly: `&Tree` for queries, `&mut Tree` for edits.
//!
//! ```
//! use symbo_sql::builder::*;
//! use symbo_sql::expressions::NodeKind;
//! use symbo_sql::traversal::Tree;
//!
//! let query = select([col("x"), col("y")])
//!     .from("t")
//!     .where_(col("x").gt(lit(1)))
//!     .build();
//! let mut tree = Tree::new(query);
//!
//! let found = tree
//!     .collection()
//!     .find_where(&tree, NodeKind::Identifier, |r| r.node.name() == Some("x"))
//!     .unwrap();
//! assert_eq!(found.len(), 2);
//!
//! found.replace_with(&mut tree, col("z").into_inner()).unwrap();
//! assert_eq!(
//!     symbo_sql::generator::Generator::sql(tree.root()).unwrap(),
//!     "SELECT z, y FROM t WHERE z > 1"
//! );
//! ```
//!
//! # Batched edits
//!
//! `insert_before`, `insert_after` and `remove` apply their edits in reverse
//! positional order, so an edit at one position never moves another target
//! of the same batch. Descendants are edited before their ancestors for the
//! same reason. Paths that have been detached by an earlier edit make the
//! batch fail with [`Error::StructuralEdit`](crate::error::Error::StructuralEdit).
//!
//! `replace_with` and `replace_with_fn` run in collection order and check
//! the whole batch first: a path at or under an earlier path of the same
//! batch fails it before anything is replaced.
//!
//! Every method is a no-op on an empty collection.

use crate::error::{Error, Result};
use crate::expressions::{Node, NodeKind};
use crate::traversal::{is_prefix, NodePath, Tree};
use std::collections::HashSet;
use std::ops::Range;
use tracing::{debug, instrument};

/// A path and the node it currently addresses, as handed to predicates.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub path: &'a NodePath,
    pub node: &'a Node,
}

impl NodeRef<'_> {
    pub fn kind(&self) -> NodeKind {
        self.node.kind()
    }
}

/// An ordered set of paths produced by a query. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    paths: Vec<NodePath>,
}

impl From<Vec<NodePath>> for Collection {
    fn from(paths: Vec<NodePath>) -> Self {
        Collection { paths }
    }
}

impl IntoIterator for Collection {
    type Item = NodePath;
    type IntoIter = std::vec::IntoIter<NodePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a NodePath;
    type IntoIter = std::slice::Iter<'a, NodePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl Collection {
    pub fn new(paths: Vec<NodePath>) -> Self {
        Collection { paths }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Every node of `kind` at or below each path, in depth-first pre-order.
    pub fn find(&self, tree: &Tree, kind: NodeKind) -> Result<Collection> {
        self.find_any(tree, |r| r.kind() == kind)
    }

    /// Like [`find`](Self::find), keeping only matches accepted by `predicate`.
    pub fn find_where<F>(&self, tree: &Tree, kind: NodeKind, mut predicate: F) -> Result<Collection>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        self.find_any(tree, |r| r.kind() == kind && predicate(r))
    }

    /// Every node at or below each path accepted by `predicate`.
    pub fn find_any<F>(&self, tree: &Tree, mut predicate: F) -> Result<Collection>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        let mut found = Vec::new();
        for path in &self.paths {
            for candidate in path.descendants(tree)? {
                let node = candidate.node(tree)?;
                if predicate(NodeRef {
                    path: &candidate,
                    node,
                }) {
                    found.push(candidate);
                }
            }
        }
        Ok(Collection::new(found))
    }

    pub fn filter<F>(&self, tree: &Tree, mut predicate: F) -> Result<Collection>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        let mut kept = Vec::new();
        for path in &self.paths {
            let node = path.node(tree)?;
            if predicate(NodeRef { path, node }) {
                kept.push(path.clone());
            }
        }
        Ok(Collection::new(kept))
    }

    pub fn filter_kind(&self, tree: &Tree, kind: NodeKind) -> Result<Collection> {
        self.filter(tree, |r| r.kind() == kind)
    }

    /// For each path, the nearest strict ancestor of `kind`. Paths without
    /// one contribute nothing.
    pub fn closest(&self, tree: &Tree, kind: NodeKind) -> Result<Collection> {
        self.closest_where(tree, kind, |_| true)
    }

    pub fn closest_where<F>(&self, tree: &Tree, kind: NodeKind, mut predicate: F) -> Result<Collection>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        let mut found = Vec::new();
        for path in &self.paths {
            for ancestor in path.rebased(tree)?.ancestors() {
                let node = ancestor.node(tree)?;
                if node.kind() == kind
                    && predicate(NodeRef {
                        path: &ancestor,
                        node,
                    })
                {
                    found.push(ancestor);
                    break;
                }
            }
        }
        Ok(Collection::new(found))
    }

    /// Parents of each path, first occurrence only. The root has none.
    pub fn parent(&self, tree: &Tree) -> Result<Collection> {
        let mut seen = HashSet::new();
        let mut parents = Vec::new();
        for path in &self.paths {
            if let Some(parent) = path.rebased(tree)?.parent() {
                if seen.insert(parent.route().to_vec()) {
                    parents.push(parent);
                }
            }
        }
        Ok(Collection::new(parents))
    }

    pub fn children(&self, tree: &Tree) -> Result<Collection> {
        let mut children = Vec::new();
        for path in &self.paths {
            children.extend(path.children(tree)?);
        }
        Ok(Collection::new(children))
    }

    // -----------------------------------------------------------------------
    // Iteration
    // -----------------------------------------------------------------------

    pub fn for_each<F>(&self, tree: &Tree, mut callback: F) -> Result<()>
    where
        F: FnMut(NodeRef<'_>, usize),
    {
        self.try_for_each(tree, |r, i| {
            callback(r, i);
            Ok(())
        })
    }

    /// Like [`for_each`](Self::for_each), stopping at the first error.
    pub fn try_for_each<F>(&self, tree: &Tree, mut callback: F) -> Result<()>
    where
        F: FnMut(NodeRef<'_>, usize) -> Result<()>,
    {
        for (i, path) in self.paths.iter().enumerate() {
            let node = path.node(tree)?;
            callback(NodeRef { path, node }, i)?;
        }
        Ok(())
    }

    pub fn map<T, F>(&self, tree: &Tree, mut callback: F) -> Result<Vec<T>>
    where
        F: FnMut(NodeRef<'_>, usize) -> T,
    {
        let mut out = Vec::with_capacity(self.paths.len());
        self.for_each(tree, |r, i| out.push(callback(r, i)))?;
        Ok(out)
    }

    /// True if any path satisfies `predicate`; stops at the first hit.
    pub fn some<F>(&self, tree: &Tree, mut predicate: F) -> Result<bool>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        for path in &self.paths {
            let node = path.node(tree)?;
            if predicate(NodeRef { path, node }) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True if every path satisfies `predicate`; stops at the first miss.
    pub fn every<F>(&self, tree: &Tree, mut predicate: F) -> Result<bool>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        for path in &self.paths {
            let node = path.node(tree)?;
            if !predicate(NodeRef { path, node }) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn has_kind(&self, tree: &Tree, kind: NodeKind) -> Result<bool> {
        self.some(tree, |r| r.kind() == kind)
    }

    /// Distinct kinds in the collection, sorted.
    pub fn kinds(&self, tree: &Tree) -> Result<Vec<NodeKind>> {
        let mut kinds = self.map(tree, |r, _| r.kind())?;
        kinds.sort();
        kinds.dedup();
        Ok(kinds)
    }

    // -----------------------------------------------------------------------
    // Edits
    // -----------------------------------------------------------------------

    /// Replace every node with a copy of `node`, in collection order.
    pub fn replace_with(&self, tree: &mut Tree, node: Node) -> Result<Collection> {
        self.replace_with_fn(tree, |_, _| node.clone())
    }

    /// Replace every node with `factory(current, index)`, in collection order.
    #[instrument(level = "debug", skip_all, fields(count = self.paths.len()))]
    pub fn replace_with_fn<F>(&self, tree: &mut Tree, mut factory: F) -> Result<Collection>
    where
        F: FnMut(NodeRef<'_>, usize) -> Node,
    {
        let current = self
            .paths
            .iter()
            .map(|path| path.rebased(tree))
            .collect::<Result<Vec<_>>>()?;
        check_replace_order(&current)?;

        let mut replaced = Vec::with_capacity(current.len());
        for (i, path) in current.iter().enumerate() {
            let replacement = {
                let node = path.node(tree)?;
                factory(NodeRef { path, node }, i)
            };
            replaced.push(path.replace(tree, replacement)?);
        }
        Ok(Collection::new(replaced))
    }

    /// Insert a copy of `node` before every path.
    pub fn insert_before(&self, tree: &mut Tree, node: Node) -> Result<Collection> {
        self.insert_with(tree, |_, _| node.clone(), false)
    }

    /// Insert a copy of `node` after every path.
    pub fn insert_after(&self, tree: &mut Tree, node: Node) -> Result<Collection> {
        self.insert_with(tree, |_, _| node.clone(), true)
    }

    /// Insert `factory(path, index)` before every path.
    pub fn insert_before_with<F>(&self, tree: &mut Tree, factory: F) -> Result<Collection>
    where
        F: FnMut(NodeRef<'_>, usize) -> Node,
    {
        self.insert_with(tree, factory, false)
    }

    /// Insert `factory(path, index)` after every path.
    pub fn insert_after_with<F>(&self, tree: &mut Tree, factory: F) -> Result<Collection>
    where
        F: FnMut(NodeRef<'_>, usize) -> Node,
    {
        self.insert_with(tree, factory, true)
    }

    #[instrument(level = "debug", skip_all, fields(count = self.paths.len(), after = after))]
    fn insert_with<F>(&self, tree: &mut Tree, mut factory: F, after: bool) -> Result<Collection>
    where
        F: FnMut(NodeRef<'_>, usize) -> Node,
    {
        // Build every node against the unmodified tree first.
        let mut pending = Vec::with_capacity(self.paths.len());
        for (i, path) in self.paths.iter().enumerate() {
            let current = path.rebased(tree)?;
            let node = {
                let existing = current.node(tree)?;
                factory(
                    NodeRef {
                        path,
                        node: existing,
                    },
                    i,
                )
            };
            pending.push((i, current, node));
        }
        pending.sort_by(|a, b| b.1.route().cmp(a.1.route()));

        let mut inserted = vec![None; pending.len()];
        for (i, path, node) in pending {
            let new_path = if after {
                path.insert_after(tree, node)?
            } else {
                path.insert_before(tree, node)?
            };
            inserted[i] = Some(new_path);
        }
        debug!(inserted = inserted.len(), "batch insert applied");
        Ok(Collection::new(inserted.into_iter().flatten().collect()))
    }

    /// Detach every node, returning them in collection order.
    #[instrument(level = "debug", skip_all, fields(count = self.paths.len()))]
    pub fn remove(&self, tree: &mut Tree) -> Result<Vec<Node>> {
        let mut pending = Vec::with_capacity(self.paths.len());
        for (i, path) in self.paths.iter().enumerate() {
            pending.push((i, path.rebased(tree)?));
        }
        pending.sort_by(|a, b| b.1.route().cmp(a.1.route()));

        let mut removed = vec![None; pending.len()];
        for (i, path) in pending {
            removed[i] = Some(path.remove_self(tree)?);
        }
        debug!(removed = removed.len(), "batch remove applied");
        Ok(removed.into_iter().flatten().collect())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn first(&self) -> Option<&NodePath> {
        self.paths.first()
    }

    pub fn last(&self) -> Option<&NodePath> {
        self.paths.last()
    }

    pub fn at(&self, index: usize) -> Option<&NodePath> {
        self.paths.get(index)
    }

    pub fn paths(&self) -> &[NodePath] {
        &self.paths
    }

    pub fn nodes<'t>(&self, tree: &'t Tree) -> Result<Vec<&'t Node>> {
        self.paths.iter().map(|p| p.node(tree)).collect()
    }

    /// Drop repeated paths, keeping first occurrences.
    pub fn unique(&self) -> Collection {
        let mut seen = HashSet::new();
        Collection::new(
            self.paths
                .iter()
                .filter(|p| seen.insert((*p).clone()))
                .cloned()
                .collect(),
        )
    }

    pub fn reverse(&self) -> Collection {
        Collection::new(self.paths.iter().rev().cloned().collect())
    }

    /// Sub-collection over `range`, clamped to the collection's bounds.
    pub fn slice(&self, range: Range<usize>) -> Collection {
        let end = range.end.min(self.paths.len());
        let start = range.start.min(end);
        Collection::new(self.paths[start..end].to_vec())
    }
}

/// Fail if any path sits at or under a path that comes earlier in the batch,
/// since replacing the earlier one would detach it.
fn check_replace_order(paths: &[NodePath]) -> Result<()> {
    let mut order: Vec<usize> = (0..paths.len()).collect();
    order.sort_by(|&a, &b| paths[a].route().cmp(paths[b].route()).then(a.cmp(&b)));

    // Routes sharing a prefix sort together, so the open ancestors of each
    // route form a stack. Each entry carries the smallest batch index on it.
    let mut open: Vec<(usize, usize)> = Vec::new();
    for i in order {
        let route = paths[i].route();
        while let Some(&(top, _)) = open.last() {
            if is_prefix(paths[top].route(), route) {
                break;
            }
            open.pop();
        }
        if let Some(&(top, earliest)) = open.last() {
            if earliest < i {
                return Err(Error::structural_edit(
                    &paths[i],
                    format!(
                        "an earlier replacement in the same batch at {} would detach it",
                        paths[top]
                    ),
                ));
            }
        }
        let earliest = open.last().map_or(i, |&(_, e)| e.min(i));
        open.push((i, earliest));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::*;
    use crate::traversal::NodeWalk;

    fn ident(name: &str) -> Node {
        Node::from(Identifier::new(name))
    }

    fn item(name: &str) -> Node {
        Node::from(SelectItem::new(ident(name)))
    }

    /// SELECT c0, c1, c2, c3, c4, c5 FROM t
    fn six_items() -> Tree {
        let mut select = Select::new();
        for i in 0..6 {
            select.select_list.push(item(&format!("c{i}")));
        }
        select.from = Some(Box::new(Node::from(FromClause {
            sources: vec![Node::from(TableRef::new(TableName::new("t")))],
        })));
        Tree::new(Node::from(select))
    }

    fn item_names(tree: &Tree) -> Vec<String> {
        tree.root()
            .as_select()
            .unwrap()
            .select_list
            .iter()
            .map(|n| match n {
                Node::SelectItem(i) => i.expr.name().unwrap_or("?").to_string(),
                _ => "?".to_string(),
            })
            .collect()
    }

    fn items_at(tree: &Tree, positions: &[usize]) -> Collection {
        Collection::new(
            positions
                .iter()
                .map(|i| {
                    tree.root_path()
                        .index(tree, "select_list", *i)
                        .unwrap()
                        .unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn test_find_includes_start_and_counts() {
        let tree = six_items();
        let all = tree.collection().find(&tree, NodeKind::Identifier).unwrap();
        assert_eq!(all.len(), 6);
        let selects = tree.collection().find(&tree, NodeKind::Select).unwrap();
        assert_eq!(selects.len(), 1);
        assert!(selects.first().unwrap().is_root());
    }

    #[test]
    fn test_find_where_and_filter() {
        let tree = six_items();
        let found = tree
            .collection()
            .find_where(&tree, NodeKind::Identifier, |r| r.node.name() == Some("c3"))
            .unwrap();
        assert_eq!(found.len(), 1);

        let items = tree.collection().find(&tree, NodeKind::SelectItem).unwrap();
        let evens = items
            .filter(&tree, |r| {
                r.path.step().and_then(|s| s.index).unwrap_or(1) % 2 == 0
            })
            .unwrap();
        assert_eq!(evens.len(), 3);
        assert!(evens
            .every(&tree, |r| r.kind() == NodeKind::SelectItem)
            .unwrap());
        assert!(!evens.some(&tree, |r| r.kind() == NodeKind::Select).unwrap());
    }

    #[test]
    fn test_closest_and_parent() {
        let tree = six_items();
        let idents = tree.collection().find(&tree, NodeKind::Identifier).unwrap();
        let closest = idents.closest(&tree, NodeKind::Select).unwrap();
        assert_eq!(closest.len(), 6);
        assert_eq!(closest.unique().len(), 1);

        let parents = idents.parent(&tree).unwrap();
        assert_eq!(parents.len(), 6);
        assert_eq!(parents.parent(&tree).unwrap().len(), 1);
        assert!(tree.collection().parent(&tree).unwrap().is_empty());
    }

    #[test]
    fn test_children_and_kinds() {
        let tree = six_items();
        let children = tree.collection().children(&tree).unwrap();
        assert_eq!(children.len(), 7);
        assert_eq!(
            children.kinds(&tree).unwrap(),
            vec![NodeKind::SelectItem, NodeKind::FromClause]
        );
        assert!(children.has_kind(&tree, NodeKind::FromClause).unwrap());
    }

    #[test]
    fn test_map_and_for_each_order() {
        let tree = six_items();
        let idents = tree.collection().find(&tree, NodeKind::Identifier).unwrap();
        let names = idents
            .map(&tree, |r, i| format!("{i}:{}", r.node.name().unwrap()))
            .unwrap();
        assert_eq!(names[0], "0:c0");
        assert_eq!(names[5], "5:c5");

        let mut seen = 0;
        idents.for_each(&tree, |_, _| seen += 1).unwrap();
        assert_eq!(seen, 6);
    }

    #[test]
    fn test_reverse_order_insert_before() {
        let mut tree = six_items();
        let targets = items_at(&tree, &[0, 2, 4]);
        let inserted = targets.insert_before(&mut tree, item("x")).unwrap();
        assert_eq!(inserted.len(), 3);
        assert_eq!(
            item_names(&tree),
            vec!["x", "c0", "c1", "x", "c2", "c3", "x", "c4", "c5"]
        );
    }

    #[test]
    fn test_reverse_order_insert_after() {
        let mut tree = six_items();
        let targets = items_at(&tree, &[4, 0]);
        targets.insert_after(&mut tree, item("x")).unwrap();
        assert_eq!(
            item_names(&tree),
            vec!["c0", "x", "c1", "c2", "c3", "c4", "x", "c5"]
        );
    }

    #[test]
    fn test_insert_with_factory_uses_index() {
        let mut tree = six_items();
        let targets = items_at(&tree, &[1, 3]);
        targets
            .insert_after_with(&mut tree, |_, i| item(&format!("n{i}")))
            .unwrap();
        assert_eq!(
            item_names(&tree),
            vec!["c0", "c1", "n0", "c2", "c3", "n1", "c4", "c5"]
        );
    }

    #[test]
    fn test_remove_many() {
        let mut tree = six_items();
        let removed = items_at(&tree, &[1, 3, 5]).remove(&mut tree).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0].child_nodes()[0].name(), Some("c1"));
        assert_eq!(item_names(&tree), vec!["c0", "c2", "c4"]);
    }

    #[test]
    fn test_remove_twice_fails_loudly() {
        let mut tree = six_items();
        let targets = items_at(&tree, &[2]);
        targets.remove(&mut tree).unwrap();
        let err = targets.remove(&mut tree).unwrap_err();
        assert!(err.is_structural_edit());
    }

    #[test]
    fn test_replace_with_fn() {
        let mut tree = six_items();
        let idents = tree.collection().find(&tree, NodeKind::Identifier).unwrap();
        idents
            .replace_with_fn(&mut tree, |r, i| {
                ident(&format!("{}_{}", r.node.name().unwrap(), i))
            })
            .unwrap();
        assert_eq!(item_names(&tree)[2], "c2_2");
        assert_eq!(tree.root().count(|n| n.kind() == NodeKind::Identifier), 6);
    }

    #[test]
    fn test_nested_replace_is_all_or_nothing() {
        use crate::builder::{col, select};
        use crate::generator::Generator;

        // SELECT a + b + c FROM t
        let query = select([col("a").add(col("b")).add(col("c"))]).from("t").build();
        let mut tree = Tree::new(query);
        let sums = tree.collection().find(&tree, NodeKind::BinaryOp).unwrap();
        assert_eq!(sums.len(), 2);

        let err = sums.replace_with(&mut tree, ident("z")).unwrap_err();
        assert!(err.is_structural_edit());
        assert_eq!(tree.epoch(), 0);
        assert_eq!(Generator::sql(tree.root()).unwrap(), "SELECT a + b + c FROM t");

        // the same paths, innermost first, apply cleanly
        sums.reverse().replace_with(&mut tree, ident("z")).unwrap();
        assert_eq!(Generator::sql(tree.root()).unwrap(), "SELECT z FROM t");
    }

    #[test]
    fn test_duplicate_replace_target_fails_up_front() {
        let mut tree = six_items();
        let twice = Collection::from(vec![
            items_at(&tree, &[1]).paths()[0].clone(),
            items_at(&tree, &[4]).paths()[0].clone(),
            items_at(&tree, &[1]).paths()[0].clone(),
        ]);
        assert!(twice.replace_with(&mut tree, item("x")).is_err());
        assert_eq!(item_names(&tree), vec!["c0", "c1", "c2", "c3", "c4", "c5"]);
    }

    #[test]
    fn test_empty_collection_is_noop() {
        let mut tree = six_items();
        let empty = Collection::default();
        assert!(empty.find(&tree, NodeKind::Select).unwrap().is_empty());
        assert!(empty.remove(&mut tree).unwrap().is_empty());
        assert!(empty.insert_after(&mut tree, item("x")).unwrap().is_empty());
        assert!(empty.every(&tree, |_| false).unwrap());
        assert!(!empty.some(&tree, |_| true).unwrap());
        assert_eq!(tree.epoch(), 0);
    }

    #[test]
    #[should_panic(expected = "predicate failed")]
    fn test_predicate_panic_propagates() {
        let tree = six_items();
        let _ = tree
            .collection()
            .find_any(&tree, |_| panic!("predicate failed"));
    }

    #[test]
    fn test_accessors() {
        let tree = six_items();
        let items = tree.collection().find(&tree, NodeKind::SelectItem).unwrap();
        assert_eq!(items.slice(1..3).len(), 2);
        assert_eq!(items.slice(4..99).len(), 2);
        assert_eq!(items.reverse().first(), items.last());
        assert_eq!(items.at(2), items.paths().get(2));
        assert_eq!(items.nodes(&tree).unwrap().len(), 6);
    }
}
