//! Name resolution through nested scopes

use symbo_sql::builder::*;
use symbo_sql::{BindingKind, NodeKind, NodePath, ScopeType, Step, Tree};

/// WITH recent AS (SELECT id FROM orders)
/// SELECT r.id, r.id * 2 AS doubled FROM recent AS r
/// WHERE EXISTS (SELECT 1 FROM users AS r WHERE r.id = 5)
/// WINDOW w AS (ORDER BY r.id)
fn nested() -> Tree {
    let recent = select([col("id")]).from("orders").build();
    let inner = select([lit(1)])
        .from_source(table("users").aliased("r"))
        .where_(col("r.id").eq(lit(5)))
        .build();
    let query = select([col("r.id"), col("r.id").mul(lit(2)).alias("doubled")])
        .with(with_([cte("recent", recent).unwrap()], false).unwrap())
        .from_source(table("recent").aliased("r"))
        .where_(exists(inner))
        .window("w", window().order_by(["r.id"]))
        .build();
    Tree::new(query)
}

fn first_column_ref(tree: &Tree) -> NodePath {
    tree.collection()
        .find(tree, NodeKind::ColumnRef)
        .unwrap()
        .first()
        .cloned()
        .unwrap()
}

fn inner_column_ref(tree: &Tree) -> NodePath {
    tree.collection()
        .find(tree, NodeKind::Exists)
        .unwrap()
        .find(tree, NodeKind::ColumnRef)
        .unwrap()
        .first()
        .cloned()
        .unwrap()
}

#[test]
fn test_outer_names() {
    let tree = nested();
    let at = first_column_ref(&tree);

    let recent = at.resolve(&tree, "recent").unwrap().unwrap();
    assert_eq!(recent.kind, BindingKind::Cte);
    assert_eq!(
        recent.route,
        vec![Step::attr("with"), Step::item("ctes", 0)]
    );

    let r = at.resolve(&tree, "R").unwrap().unwrap();
    assert_eq!(r.kind, BindingKind::Table);
    assert_eq!(r.route, vec![Step::attr("from"), Step::item("sources", 0)]);

    assert_eq!(
        at.resolve(&tree, "doubled").unwrap().unwrap().kind,
        BindingKind::ColumnAlias
    );
    assert_eq!(at.resolve(&tree, "w").unwrap().unwrap().kind, BindingKind::Window);
    assert!(at.resolve(&tree, "users").unwrap().is_none());
}

#[test]
fn test_inner_alias_shadows_outer() {
    let tree = nested();
    let at = inner_column_ref(&tree);

    let r = at.resolve(&tree, "r").unwrap().unwrap();
    assert_eq!(r.kind, BindingKind::Table);
    assert_eq!(r.route.first(), Some(&Step::attr("where_clause")));

    // names from the enclosing query stay visible
    assert_eq!(
        at.resolve(&tree, "recent").unwrap().unwrap().kind,
        BindingKind::Cte
    );
}

#[test]
fn test_scope_chain_shape() {
    let tree = nested();
    let scope = inner_column_ref(&tree).scope(&tree).unwrap();
    assert_eq!(scope.scope_type(), ScopeType::Query);
    assert_eq!(scope.depth(), 2);

    let exists = scope.parent().unwrap();
    assert_eq!(exists.scope_type(), ScopeType::Subquery);
    assert!(exists.bindings().is_empty());

    let root = exists.parent().unwrap();
    assert!(root.is_global());
    assert_eq!(root.bindings().len(), 4);
}

#[test]
fn test_resolution_follows_edits() {
    let mut tree = nested();
    let source = tree
        .root_path()
        .attribute(&tree, "from")
        .unwrap()
        .unwrap()
        .index(&tree, "sources", 0)
        .unwrap()
        .unwrap();
    let at = first_column_ref(&tree);
    assert!(at.resolve(&tree, "r").unwrap().is_some());

    source
        .replace(&mut tree, table("orders").aliased("o").into_inner())
        .unwrap();

    assert!(at.resolve(&tree, "r").unwrap().is_none());
    assert_eq!(at.resolve(&tree, "o").unwrap().unwrap().kind, BindingKind::Table);
}

#[test]
fn test_script_variables() {
    let body = script([
        declare(&["total"], Some(data_type("INT64").unwrap()), None).unwrap(),
        set_variable(&["total"], col("total").add(lit(1))).unwrap(),
    ])
    .unwrap();
    let tree = Tree::new(body);
    let use_site = tree
        .collection()
        .find_where(&tree, NodeKind::Identifier, |r| r.node.name() == Some("total"))
        .unwrap()
        .last()
        .cloned()
        .unwrap();

    let binding = use_site.resolve(&tree, "total").unwrap().unwrap();
    assert_eq!(binding.kind, BindingKind::Variable);
    assert_eq!(binding.route, vec![Step::item("statements", 0)]);
}
