//! Shared fixtures for the integration tests

#![allow(dead_code)]

use symbo_sql::builder::*;
use symbo_sql::expressions::SelectItem;
use symbo_sql::{generate, Children, Collection, Node, NodeKind, NodePath, NodeWalk, Tree};

/// `SELECT c0, c1, c2, c3, c4, c5 FROM t`
pub fn six_items() -> Tree {
    let names: Vec<String> = (0..6).map(|i| format!("c{i}")).collect();
    let query = select(names.iter().map(|n| col(n))).from("t").build();
    Tree::new(query)
}

/// A bare select-list item.
pub fn item(name: &str) -> Node {
    Node::from(SelectItem::new(col(name).into_inner()))
}

/// Names of the root SELECT's projections, in order.
pub fn item_names(tree: &Tree) -> Vec<String> {
    let select = tree.root().as_select().expect("root is a SELECT");
    select
        .select_list
        .iter()
        .map(|item| {
            item.child_nodes()
                .first()
                .and_then(|n| n.name())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// Paths to the root SELECT's projections at `positions`.
pub fn items_at(tree: &Tree, positions: &[usize]) -> Collection {
    let paths: Vec<NodePath> = positions
        .iter()
        .map(|&i| {
            tree.root_path()
                .index(tree, "select_list", i)
                .expect("select_list is a list slot")
                .expect("position is in range")
        })
        .collect();
    Collection::from(paths)
}

/// `SELECT x, x + 1 AS bumped FROM t WHERE x > 0`: three references to `x`.
pub fn three_x() -> Tree {
    let query = select([col("x"), col("x").add(lit(1)).alias("bumped")])
        .from("t")
        .where_(col("x").gt(lit(0)))
        .build();
    Tree::new(query)
}

/// Count identifiers named `name`.
pub fn count_identifiers(node: &Node, name: &str) -> usize {
    node.count(|n| n.kind() == NodeKind::Identifier && n.name() == Some(name))
}

/// Compact SQL for a tree, panicking on serialization errors.
pub fn sql(node: &Node) -> String {
    generate(node).expect("tree serializes")
}

/// Every node in the tree is reachable exactly once.
pub fn assert_single_parent(tree: &Tree) {
    let mut seen = std::collections::HashSet::new();
    for node in tree.root().dfs() {
        assert!(
            seen.insert(node as *const Node),
            "node reachable twice: {:?}",
            node.kind()
        );
    }
    assert_eq!(seen.len(), tree.paths().len());
}
