//! Tree traversal and path-aware navigation.
//!
//! Rust's ownership model does not allow parent pointers inside the tree, so
//! parent information lives outside it:
//!
//! - [`Tree`] owns the root [`Node`] plus a journal of structural edits.
//! - [`NodePath`] is a route from the root (slot name and optional list index
//!   per step). Its parent is the route minus the last step; nothing points
//!   back up the tree.
//!
//! # Edits and stale paths
//!
//! Every structural edit is appended to the tree's journal. A [`NodePath`]
//! records the journal position it was computed at, and before it is used it
//! is *rebased* over the edits that happened since:
//!
//! - an insert before it in the same list shifts its index up,
//! - a removal before it in the same list shifts its index down,
//! - a replace or removal of the node itself, or of any ancestor, detaches the
//!   path and every further use fails with [`Error::StructuralEdit`].
//!
//! This is what lets [`Collection`](crate::collection::Collection) compute all
//! positions up front and still apply a batch of edits safely.
//!
//! # Iteration
//!
//! [`DfsIter`] walks a subtree in pre-order without building paths, and is
//! exposed through [`NodeWalk`].

use crate::collection::Collection;
use crate::error::{Error, Result};
use crate::expressions::{Children, Node, NodeKind, SlotMut, SlotRef};
use crate::scope::{build_scope, Binding, Scope};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, instrument, trace};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

/// One hop from a parent to a child: the slot name, plus the position when
/// the slot is an ordered list.
///
/// Steps order by slot name, then index, which is enough to sort the routes
/// of a shared list into positional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Step {
    pub slot: &'static str,
    pub index: Option<usize>,
}

impl Step {
    pub fn attr(slot: &'static str) -> Self {
        Step { slot, index: None }
    }

    pub fn item(slot: &'static str, index: usize) -> Self {
        Step {
            slot,
            index: Some(index),
        }
    }

    fn same_slot(&self, other: &Step) -> bool {
        self.slot == other.slot
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(i) => write!(f, "{}[{}]", self.slot, i),
            None => f.write_str(self.slot),
        }
    }
}

/// A route from the root to a node
pub type Route = Vec<Step>;

fn route_to_string(route: &[Step]) -> String {
    if route.is_empty() {
        return "<root>".to_string();
    }
    route
        .iter()
        .map(Step::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn descend<'a>(node: &'a Node, route: &[Step]) -> Option<&'a Node> {
    let Some((step, rest)) = route.split_first() else {
        return Some(node);
    };
    let (_, slot) = node.slots().into_iter().find(|(name, _)| *name == step.slot)?;
    let child = match (slot, step.index) {
        (SlotRef::One(n), None) => n,
        (SlotRef::Optional(n), None) => n?,
        (SlotRef::Many(list), Some(i)) => list.get(i)?,
        _ => return None,
    };
    descend(child, rest)
}

fn descend_mut<'a>(node: &'a mut Node, route: &[Step]) -> Option<&'a mut Node> {
    let Some((step, rest)) = route.split_first() else {
        return Some(node);
    };
    let child = match (node.slot_mut(step.slot)?, step.index) {
        (SlotMut::One(n), None) => n,
        (SlotMut::Optional(n), None) => n.as_deref_mut()?,
        (SlotMut::Many(list), Some(i)) => list.get_mut(i)?,
        _ => return None,
    };
    descend_mut(child, rest)
}

/// Routes of the direct children of `node`, in slot order.
pub(crate) fn child_routes(node: &Node, route: &[Step]) -> Vec<Route> {
    let mut out = Vec::new();
    for (name, slot) in node.slots() {
        match slot {
            SlotRef::One(_) | SlotRef::Optional(Some(_)) => {
                let mut child = route.to_vec();
                child.push(Step::attr(name));
                out.push(child);
            }
            SlotRef::Optional(None) => {}
            SlotRef::Many(list) => {
                for i in 0..list.len() {
                    let mut child = route.to_vec();
                    child.push(Step::item(name, i));
                    out.push(child);
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Edit journal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum Edit {
    /// The node at `route` was swapped for another node.
    Replaced(Route),
    /// The node at `route` was taken out of an optional slot.
    Cleared(Route),
    /// The node at `route` was removed from a list; later siblings shift down.
    Removed(Route),
    /// A node was inserted at `route`; it and later siblings shift up.
    Inserted(Route),
}

/// True if `prefix` names `route` itself or one of its ancestors.
pub(crate) fn is_prefix(prefix: &[Step], route: &[Step]) -> bool {
    prefix.len() <= route.len() && route[..prefix.len()] == *prefix
}

/// If `route` passes through the list slot addressed by `at`, return the
/// depth of that step in `route`.
fn shares_list(at: &[Step], route: &[Step]) -> Option<usize> {
    let depth = at.len().checked_sub(1)?;
    if route.len() <= depth || route[..depth] != at[..depth] {
        return None;
    }
    route[depth].same_slot(&at[depth]).then_some(depth)
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// An owned syntax tree together with the bookkeeping that keeps
/// [`NodePath`]s valid across edits.
#[derive(Debug)]
pub struct Tree {
    id: u64,
    root: Node,
    journal: Vec<Edit>,
    scopes: Mutex<HashMap<Route, Arc<Scope>>>,
}

impl Clone for Tree {
    /// The clone is a new tree: paths from the original do not apply to it.
    fn clone(&self) -> Self {
        Tree::new(self.root.clone())
    }
}

impl From<Node> for Tree {
    fn from(root: Node) -> Self {
        Tree::new(root)
    }
}

impl Tree {
    pub fn new(root: Node) -> Self {
        Tree {
            id: NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed),
            root,
            journal: Vec::new(),
            scopes: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Number of structural edits applied so far.
    pub fn epoch(&self) -> usize {
        self.journal.len()
    }

    pub fn root_path(&self) -> NodePath {
        NodePath {
            tree_id: self.id,
            route: Vec::new(),
            epoch: self.epoch(),
        }
    }

    /// A collection holding only the root path.
    pub fn collection(&self) -> Collection {
        Collection::new(vec![self.root_path()])
    }

    /// The node at `route`, if there is one.
    pub fn get(&self, route: &[Step]) -> Option<&Node> {
        descend(&self.root, route)
    }

    /// Every path in the tree in depth-first pre-order.
    pub fn paths(&self) -> Vec<NodePath> {
        self.root_path().descendants(self).unwrap_or_default()
    }

    pub(crate) fn path_at(&self, route: Route) -> NodePath {
        NodePath {
            tree_id: self.id,
            route,
            epoch: self.epoch(),
        }
    }

    fn record(&mut self, edit: Edit) {
        trace!(?edit, epoch = self.journal.len(), "journal edit");
        self.journal.push(edit);
        self.scopes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    /// Bring `path` up to date with the journal.
    fn rebase(&self, path: &NodePath) -> Result<Route> {
        if path.tree_id != self.id {
            return Err(Error::structural_edit(
                path,
                "path belongs to a different tree",
            ));
        }
        if path.epoch > self.journal.len() {
            return Err(Error::structural_edit(path, "path is newer than the tree"));
        }

        let mut route = path.route.clone();
        for edit in &self.journal[path.epoch..] {
            match edit {
                Edit::Replaced(at) | Edit::Cleared(at) => {
                    if is_prefix(at, &route) {
                        return Err(Error::structural_edit(
                            path,
                            format!("node was detached by an edit at {}", route_to_string(at)),
                        ));
                    }
                }
                Edit::Removed(at) => {
                    if is_prefix(at, &route) {
                        return Err(Error::structural_edit(
                            path,
                            format!("node was removed by an edit at {}", route_to_string(at)),
                        ));
                    }
                    if let Some(depth) = shares_list(at, &route) {
                        if let (Some(ours), Some(removed)) = (route[depth].index, at[depth].index)
                        {
                            if ours > removed {
                                route[depth].index = Some(ours - 1);
                            }
                        }
                    }
                }
                Edit::Inserted(at) => {
                    if let Some(depth) = shares_list(at, &route) {
                        if let (Some(ours), Some(inserted)) = (route[depth].index, at[depth].index)
                        {
                            if ours >= inserted {
                                route[depth].index = Some(ours + 1);
                            }
                        }
                    }
                }
            }
        }
        Ok(route)
    }

    /// Rebase `path` and check that it still addresses a node.
    fn locate(&self, path: &NodePath) -> Result<Route> {
        let route = self.rebase(path)?;
        if self.get(&route).is_none() {
            return Err(Error::structural_edit(path, "no node at this path"));
        }
        Ok(route)
    }

    fn scope_at(&self, route: &[Step], parent: Option<Arc<Scope>>) -> Arc<Scope> {
        let mut cache = self
            .scopes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(scope) = cache.get(route) {
            return Arc::clone(scope);
        }
        let scope = Arc::new(build_scope(self, route, parent));
        cache.insert(route.to_vec(), Arc::clone(&scope));
        scope
    }
}

/// Kinds whose node opens a new name scope
pub fn introduces_scope(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Select
            | NodeKind::Cte
            | NodeKind::Subquery
            | NodeKind::ArraySubquery
            | NodeKind::Exists
            | NodeKind::SubqueryTable
            | NodeKind::TableFunction
            | NodeKind::Script
            | NodeKind::Block
    )
}

// ---------------------------------------------------------------------------
// NodePath
// ---------------------------------------------------------------------------

/// A non-owning handle to one position in a [`Tree`].
///
/// Paths are cheap values. Reads and edits take the tree explicitly and
/// rebase the path first, so a path survives unrelated edits but fails
/// loudly once its node is gone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    tree_id: u64,
    route: Route,
    epoch: usize,
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&route_to_string(&self.route))
    }
}

impl NodePath {
    pub fn route(&self) -> &[Step] {
        &self.route
    }

    pub fn is_root(&self) -> bool {
        self.route.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.route.len()
    }

    /// The last step, or `None` at the root.
    pub fn step(&self) -> Option<Step> {
        self.route.last().copied()
    }

    /// True if both paths belong to the same tree.
    pub fn same_tree(&self, other: &NodePath) -> bool {
        self.tree_id == other.tree_id
    }

    fn with_route(&self, route: Route, epoch: usize) -> NodePath {
        NodePath {
            tree_id: self.tree_id,
            route,
            epoch,
        }
    }

    /// This path brought up to date with `tree`.
    pub fn rebased(&self, tree: &Tree) -> Result<NodePath> {
        let route = tree.locate(self)?;
        Ok(self.with_route(route, tree.epoch()))
    }

    pub fn parent(&self) -> Option<NodePath> {
        let (_, prefix) = self.route.split_last()?;
        Some(self.with_route(prefix.to_vec(), self.epoch))
    }

    /// Every ancestor, nearest first.
    pub fn ancestors(&self) -> Vec<NodePath> {
        (0..self.route.len())
            .rev()
            .map(|len| self.with_route(self.route[..len].to_vec(), self.epoch))
            .collect()
    }

    pub fn node<'t>(&self, tree: &'t Tree) -> Result<&'t Node> {
        let route = tree.rebase(self)?;
        tree.get(&route)
            .ok_or_else(|| Error::structural_edit(self, "no node at this path"))
    }

    pub fn kind(&self, tree: &Tree) -> Result<NodeKind> {
        Ok(self.node(tree)?.kind())
    }

    /// Path to the child in the single-valued slot `name`; `None` when the
    /// slot is empty.
    pub fn attribute(&self, tree: &Tree, name: &str) -> Result<Option<NodePath>> {
        let route = tree.locate(self)?;
        let node = tree
            .get(&route)
            .ok_or_else(|| Error::structural_edit(self, "no node at this path"))?;
        let (slot_name, slot) = node
            .slots()
            .into_iter()
            .find(|(slot_name, _)| *slot_name == name)
            .ok_or_else(|| {
                Error::structural_edit(self, format!("{} has no slot {name:?}", node.kind()))
            })?;
        match slot {
            SlotRef::One(_) | SlotRef::Optional(Some(_)) => {
                let mut child = route;
                child.push(Step::attr(slot_name));
                Ok(Some(tree.path_at(child)))
            }
            SlotRef::Optional(None) => Ok(None),
            SlotRef::Many(_) => Err(Error::structural_edit(
                self,
                format!("slot {name:?} is a list; use index()"),
            )),
        }
    }

    /// Path to element `i` of the list slot `name`; `None` when out of range.
    pub fn index(&self, tree: &Tree, name: &str, i: usize) -> Result<Option<NodePath>> {
        let route = tree.locate(self)?;
        let node = tree
            .get(&route)
            .ok_or_else(|| Error::structural_edit(self, "no node at this path"))?;
        let (slot_name, slot) = node
            .slots()
            .into_iter()
            .find(|(slot_name, _)| *slot_name == name)
            .ok_or_else(|| {
                Error::structural_edit(self, format!("{} has no slot {name:?}", node.kind()))
            })?;
        match slot {
            SlotRef::Many(list) if i < list.len() => {
                let mut child = route;
                child.push(Step::item(slot_name, i));
                Ok(Some(tree.path_at(child)))
            }
            SlotRef::Many(_) => Ok(None),
            _ => Err(Error::structural_edit(
                self,
                format!("slot {name:?} is not a list"),
            )),
        }
    }

    /// Direct children in slot order.
    pub fn children(&self, tree: &Tree) -> Result<Vec<NodePath>> {
        let route = tree.locate(self)?;
        let node = self.node(tree)?;
        Ok(child_routes(node, &route)
            .into_iter()
            .map(|r| tree.path_at(r))
            .collect())
    }

    /// This path and everything below it, in depth-first pre-order.
    pub fn descendants(&self, tree: &Tree) -> Result<Vec<NodePath>> {
        let route = tree.locate(self)?;
        let mut out = Vec::new();
        let mut stack = vec![route];
        while let Some(route) = stack.pop() {
            if let Some(node) = tree.get(&route) {
                let mut children = child_routes(node, &route);
                children.reverse();
                stack.extend(children);
            }
            out.push(tree.path_at(route));
        }
        Ok(out)
    }

    /// Nearest strict ancestor of the given kind.
    pub fn find_ancestor(&self, tree: &Tree, kind: NodeKind) -> Result<Option<NodePath>> {
        let current = self.rebased(tree)?;
        for ancestor in current.ancestors() {
            if ancestor.node(tree)?.kind() == kind {
                return Ok(Some(ancestor));
            }
        }
        Ok(None)
    }

    /// The other elements of the list this path sits in. Empty when the path
    /// is not a list element.
    pub fn siblings(&self, tree: &Tree) -> Result<Vec<NodePath>> {
        let current = self.rebased(tree)?;
        let (Some(step), Some(parent)) = (current.step(), current.parent()) else {
            return Ok(Vec::new());
        };
        let Some(own) = step.index else {
            return Ok(Vec::new());
        };
        let len = list_len(tree, &parent, step.slot)?;
        Ok((0..len)
            .filter(|i| *i != own)
            .map(|i| {
                let mut route = parent.route.clone();
                route.push(Step::item(step.slot, i));
                tree.path_at(route)
            })
            .collect())
    }

    /// True for the first element of a list and for single-valued slots.
    pub fn is_first_child(&self, tree: &Tree) -> Result<bool> {
        let current = self.rebased(tree)?;
        Ok(match current.step() {
            None => false,
            Some(step) => step.index.map_or(true, |i| i == 0),
        })
    }

    /// True for the last element of a list and for single-valued slots.
    pub fn is_last_child(&self, tree: &Tree) -> Result<bool> {
        let current = self.rebased(tree)?;
        let (Some(step), Some(parent)) = (current.step(), current.parent()) else {
            return Ok(false);
        };
        match step.index {
            None => Ok(true),
            Some(i) => Ok(i + 1 == list_len(tree, &parent, step.slot)?),
        }
    }

    // -- structural edits ---------------------------------------------------

    /// Swap the node at this path for `node`, returning a path to it.
    ///
    /// `node` is moved into the tree, so it cannot be attached anywhere else.
    #[instrument(level = "debug", skip(self, tree, node), fields(path = %self))]
    pub fn replace(&self, tree: &mut Tree, node: Node) -> Result<NodePath> {
        let route = tree.locate(self)?;
        let target = descend_mut(&mut tree.root, &route)
            .ok_or_else(|| Error::structural_edit(self, "no node at this path"))?;
        let old = std::mem::replace(target, node);
        debug!(old = %old.kind(), "replaced node");
        tree.record(Edit::Replaced(route.clone()));
        Ok(tree.path_at(route))
    }

    /// Detach this node and return it.
    ///
    /// List elements close the gap and optional slots become empty; a slot
    /// that must always hold a node refuses.
    #[instrument(level = "debug", skip(self, tree), fields(path = %self))]
    pub fn remove_self(&self, tree: &mut Tree) -> Result<Node> {
        let route = tree.locate(self)?;
        let Some((step, parent_route)) = route.split_last() else {
            return Err(Error::structural_edit(self, "cannot remove the root"));
        };
        let parent = descend_mut(&mut tree.root, parent_route)
            .ok_or_else(|| Error::structural_edit(self, "no parent at this path"))?;
        let (removed, edit) = match (parent.slot_mut(step.slot), step.index) {
            (Some(SlotMut::Many(list)), Some(i)) if i < list.len() => {
                (list.remove(i), Edit::Removed(route.clone()))
            }
            (Some(SlotMut::Optional(slot)), None) => match slot.take() {
                Some(node) => (*node, Edit::Cleared(route.clone())),
                None => return Err(Error::structural_edit(self, "optional slot is empty")),
            },
            (Some(SlotMut::One(_)), _) => {
                return Err(Error::structural_edit(
                    self,
                    format!("slot {:?} requires a node; use replace()", step.slot),
                ))
            }
            _ => return Err(Error::structural_edit(self, "no node at this path")),
        };
        debug!(removed = %removed.kind(), "removed node");
        tree.record(edit);
        Ok(removed)
    }

    /// Put `node` into this node's single-valued slot `name`, filling it when
    /// it is an empty optional slot. Anything below the old occupant detaches.
    #[instrument(level = "debug", skip(self, tree, node), fields(path = %self))]
    pub fn set_attribute(&self, tree: &mut Tree, name: &str, node: Node) -> Result<NodePath> {
        let route = tree.locate(self)?;
        let target = descend_mut(&mut tree.root, &route)
            .ok_or_else(|| Error::structural_edit(self, "no node at this path"))?;
        let Some(slot_name) = target
            .slots()
            .into_iter()
            .map(|(slot_name, _)| slot_name)
            .find(|slot_name| *slot_name == name)
        else {
            return Err(Error::structural_edit(
                self,
                format!("{} has no slot {name:?}", target.kind()),
            ));
        };
        match target.slot_mut(slot_name) {
            Some(SlotMut::One(child)) => *child = node,
            Some(SlotMut::Optional(child)) => *child = Some(Box::new(node)),
            _ => {
                return Err(Error::structural_edit(
                    self,
                    format!("slot {name:?} is a list; use insert_before() or insert_after()"),
                ))
            }
        }

        let mut child = route;
        child.push(Step::attr(slot_name));
        debug!(slot = slot_name, "set attribute");
        tree.record(Edit::Replaced(child.clone()));
        Ok(tree.path_at(child))
    }

    /// Insert `node` into this path's list, just before it.
    pub fn insert_before(&self, tree: &mut Tree, node: Node) -> Result<NodePath> {
        self.insert(tree, node, 0)
    }

    /// Insert `node` into this path's list, just after it.
    pub fn insert_after(&self, tree: &mut Tree, node: Node) -> Result<NodePath> {
        self.insert(tree, node, 1)
    }

    #[instrument(level = "debug", skip(self, tree, node), fields(path = %self))]
    fn insert(&self, tree: &mut Tree, node: Node, offset: usize) -> Result<NodePath> {
        let route = tree.locate(self)?;
        let Some((step, parent_route)) = route.split_last() else {
            return Err(Error::structural_edit(self, "cannot insert next to the root"));
        };
        let Some(index) = step.index else {
            return Err(Error::structural_edit(
                self,
                format!("slot {:?} is not a list", step.slot),
            ));
        };
        let parent = descend_mut(&mut tree.root, parent_route)
            .ok_or_else(|| Error::structural_edit(self, "no parent at this path"))?;
        let Some(SlotMut::Many(list)) = parent.slot_mut(step.slot) else {
            return Err(Error::structural_edit(
                self,
                format!("slot {:?} is not a list", step.slot),
            ));
        };
        let at = index + offset;
        debug!(kind = %node.kind(), at, "inserting node");
        list.insert(at, node);

        let mut inserted = parent_route.to_vec();
        inserted.push(Step::item(step.slot, at));
        tree.record(Edit::Inserted(inserted.clone()));
        Ok(tree.path_at(inserted))
    }

    // -- scopes ---------------------------------------------------------------

    /// The innermost scope enclosing this node. A scope-introducing node
    /// opens its own scope. The chain is cached on the tree until the next
    /// edit.
    pub fn scope(&self, tree: &Tree) -> Result<Arc<Scope>> {
        let route = tree.locate(self)?;
        let mut scope = tree.scope_at(&[], None);
        for len in 1..=route.len() {
            let prefix = &route[..len];
            let opens = tree
                .get(prefix)
                .map(|node| introduces_scope(node.kind()))
                .unwrap_or(false);
            if opens {
                scope = tree.scope_at(prefix, Some(scope));
            }
        }
        Ok(scope)
    }

    /// Resolve `name` through the enclosing scopes; `None` when unbound.
    pub fn resolve(&self, tree: &Tree, name: &str) -> Result<Option<Binding>> {
        Ok(self.scope(tree)?.lookup(name).cloned())
    }
}

fn list_len(tree: &Tree, parent: &NodePath, slot: &str) -> Result<usize> {
    let node = parent.node(tree)?;
    node.slots()
        .into_iter()
        .find_map(|(name, s)| match s {
            SlotRef::Many(list) if name == slot => Some(list.len()),
            _ => None,
        })
        .ok_or_else(|| Error::structural_edit(parent, format!("no list slot {slot:?}")))
}

// ---------------------------------------------------------------------------
// Iteration
// ---------------------------------------------------------------------------

/// Pre-order depth-first iterator over a subtree.
pub struct DfsIter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> DfsIter<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for DfsIter<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let mut children = node.child_nodes();
        children.reverse();
        self.stack.extend(children);
        Some(node)
    }
}

/// Read-only walking helpers for any node.
pub trait NodeWalk {
    fn dfs(&self) -> DfsIter<'_>;

    fn find<F>(&self, predicate: F) -> Option<&Node>
    where
        F: Fn(&Node) -> bool;

    fn find_all<F>(&self, predicate: F) -> Vec<&Node>
    where
        F: Fn(&Node) -> bool;

    fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Node) -> bool;

    fn contains_kind(&self, kind: NodeKind) -> bool;

    /// Depth of the deepest node, counting the root as 0.
    fn tree_depth(&self) -> usize;
}

impl NodeWalk for Node {
    fn dfs(&self) -> DfsIter<'_> {
        DfsIter::new(self)
    }

    fn find<F>(&self, predicate: F) -> Option<&Node>
    where
        F: Fn(&Node) -> bool,
    {
        self.dfs().find(|n| predicate(n))
    }

    fn find_all<F>(&self, predicate: F) -> Vec<&Node>
    where
        F: Fn(&Node) -> bool,
    {
        self.dfs().filter(|n| predicate(n)).collect()
    }

    fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Node) -> bool,
    {
        self.dfs().filter(|n| predicate(n)).count()
    }

    fn contains_kind(&self, kind: NodeKind) -> bool {
        self.dfs().any(|n| n.kind() == kind)
    }

    fn tree_depth(&self) -> usize {
        self.child_nodes()
            .into_iter()
            .map(|child| child.tree_depth() + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Build a predicate matching one node kind.
#[macro_export]
macro_rules! is_kind {
    ($kind:ident) => {
        |node: &$crate::expressions::Node| node.kind() == $crate::expressions::NodeKind::$kind
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::*;

    fn ident(name: &str) -> Node {
        Node::from(Identifier::new(name))
    }

    /// SELECT a, b, c FROM t WHERE a = 1
    fn sample() -> Tree {
        let mut select = Select::new();
        for name in ["a", "b", "c"] {
            select
                .select_list
                .push(Node::from(SelectItem::new(ident(name))));
        }
        select.from = Some(Box::new(Node::from(FromClause {
            sources: vec![Node::from(TableRef::new(TableName::new("t")))],
        })));
        select.where_clause = Some(Box::new(Node::from(BinaryOp::new(
            ident("a"),
            BinaryOperator::Eq,
            Node::from(IntegerLiteral::new(1)),
        ))));
        Tree::new(Node::from(select))
    }

    fn item(tree: &Tree, i: usize) -> NodePath {
        tree.root_path()
            .index(tree, "select_list", i)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_dfs_preorder() {
        let tree = sample();
        let kinds: Vec<_> = tree.root().dfs().map(|n| n.kind()).take(3).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Select, NodeKind::SelectItem, NodeKind::Identifier]
        );
        assert_eq!(tree.root().count(is_kind!(Identifier)), 4);
        assert!(tree.root().contains_kind(NodeKind::TableName));
        assert_eq!(tree.paths().len(), tree.root().dfs().count());
    }

    #[test]
    fn test_tree_depth() {
        let tree = sample();
        // Select -> FromClause -> TableRef -> TableName
        assert_eq!(tree.root().tree_depth(), 3);
        assert_eq!(ident("x").tree_depth(), 0);
    }

    #[test]
    fn test_navigation() {
        let tree = sample();
        let root = tree.root_path();
        let from = root.attribute(&tree, "from").unwrap().unwrap();
        let source = from.index(&tree, "sources", 0).unwrap().unwrap();
        assert_eq!(source.to_string(), "from.sources[0]");
        assert_eq!(source.depth(), 2);
        assert_eq!(source.parent(), Some(from.clone()));
        assert_eq!(source.ancestors(), vec![from, root.clone()]);
        assert!(root.attribute(&tree, "having").unwrap().is_none());
        assert!(root.attribute(&tree, "select_list").is_err());
        assert!(root.attribute(&tree, "bogus").is_err());
        assert!(root.index(&tree, "select_list", 9).unwrap().is_none());
    }

    #[test]
    fn test_siblings_and_position() {
        let tree = sample();
        let middle = item(&tree, 1);
        assert_eq!(middle.siblings(&tree).unwrap().len(), 2);
        assert!(!middle.is_first_child(&tree).unwrap());
        assert!(!middle.is_last_child(&tree).unwrap());
        assert!(item(&tree, 0).is_first_child(&tree).unwrap());
        assert!(item(&tree, 2).is_last_child(&tree).unwrap());
        assert!(!tree.root_path().is_first_child(&tree).unwrap());
    }

    #[test]
    fn test_find_ancestor() {
        let tree = sample();
        let ident_path = item(&tree, 0)
            .attribute(&tree, "expr")
            .unwrap()
            .unwrap();
        let select = ident_path
            .find_ancestor(&tree, NodeKind::Select)
            .unwrap()
            .unwrap();
        assert!(select.is_root());
        assert!(ident_path
            .find_ancestor(&tree, NodeKind::Join)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_replace_returns_fresh_path() {
        let mut tree = sample();
        let target = item(&tree, 0).attribute(&tree, "expr").unwrap().unwrap();
        let new_path = target.replace(&mut tree, ident("z")).unwrap();
        assert_eq!(new_path.node(&tree).unwrap().name(), Some("z"));
        // the old path addressed the node that was swapped out
        assert!(target.node(&tree).is_err());
        assert!(target.replace(&mut tree, ident("w")).is_err());
    }

    #[test]
    fn test_insert_shifts_later_siblings() {
        let mut tree = sample();
        let first = item(&tree, 0);
        let last = item(&tree, 2);
        first
            .insert_before(&mut tree, Node::from(SelectItem::new(ident("x"))))
            .unwrap();
        let rebased = last.rebased(&tree).unwrap();
        assert_eq!(rebased.step(), Some(Step::item("select_list", 3)));
        assert_eq!(
            first.rebased(&tree).unwrap().step(),
            Some(Step::item("select_list", 1))
        );
    }

    #[test]
    fn test_remove_self_closes_gap() {
        let mut tree = sample();
        let first = item(&tree, 0);
        let last = item(&tree, 2);
        let removed = first.remove_self(&mut tree).unwrap();
        assert_eq!(removed.kind(), NodeKind::SelectItem);
        assert_eq!(
            last.rebased(&tree).unwrap().step(),
            Some(Step::item("select_list", 1))
        );
        let err = first.remove_self(&mut tree).unwrap_err();
        assert!(err.is_structural_edit());
    }

    #[test]
    fn test_remove_optional_and_required_slots() {
        let mut tree = sample();
        let where_path = tree
            .root_path()
            .attribute(&tree, "where_clause")
            .unwrap()
            .unwrap();
        let left = where_path.attribute(&tree, "left").unwrap().unwrap();
        assert!(left.remove_self(&mut tree).unwrap_err().is_structural_edit());
        where_path.remove_self(&mut tree).unwrap();
        assert!(tree.root().as_select().unwrap().where_clause.is_none());
        // descendants of a removed node are detached too
        assert!(left.node(&tree).is_err());
    }

    #[test]
    fn test_set_attribute_fills_and_replaces() {
        let mut tree = sample();
        let root = tree.root_path();
        let old_where = root.attribute(&tree, "where_clause").unwrap().unwrap();
        let old_left = old_where.attribute(&tree, "left").unwrap().unwrap();

        let qualify = root.set_attribute(&mut tree, "qualify", ident("q")).unwrap();
        assert_eq!(qualify.node(&tree).unwrap().name(), Some("q"));
        // filling an empty slot leaves unrelated paths valid
        assert_eq!(old_left.node(&tree).unwrap().name(), Some("a"));

        root.set_attribute(&mut tree, "where_clause", ident("w")).unwrap();
        assert!(old_left.node(&tree).is_err());
        assert_eq!(
            tree.root().as_select().unwrap().where_clause.as_deref().and_then(Node::name),
            Some("w")
        );

        assert!(root
            .set_attribute(&mut tree, "select_list", ident("x"))
            .unwrap_err()
            .is_structural_edit());
        assert!(root
            .set_attribute(&mut tree, "nope", ident("x"))
            .unwrap_err()
            .is_structural_edit());
    }

    #[test]
    fn test_insert_requires_list_slot() {
        let mut tree = sample();
        let where_path = tree
            .root_path()
            .attribute(&tree, "where_clause")
            .unwrap()
            .unwrap();
        let err = where_path
            .insert_after(&mut tree, ident("x"))
            .unwrap_err();
        assert!(err.is_structural_edit());
    }

    #[test]
    fn test_foreign_path_rejected() {
        let mut tree = sample();
        let other = sample();
        let foreign = other.root_path();
        assert!(foreign.node(&tree).is_err());
        assert!(foreign.replace(&mut tree, ident("x")).is_err());
    }
}
