//! End-to-end Collection scenarios
//!
//! Query, replace, insert and remove over whole trees, checking both the
//! resulting structure and its printed form.

mod common;

use common::*;
use symbo_sql::builder::*;
use symbo_sql::{Children, Collection, NodeKind, NodeWalk, Tree};

// ============================================================================
// Replace
// ============================================================================

mod replace {
    use super::*;

    #[test]
    fn test_replace_every_x_with_y() {
        let mut tree = three_x();
        assert_eq!(count_identifiers(tree.root(), "x"), 3);

        let replaced = tree
            .collection()
            .find_where(&tree, NodeKind::Identifier, |r| r.node.name() == Some("x"))
            .unwrap()
            .replace_with_fn(&mut tree, |_, _| col("y").into_inner())
            .unwrap();

        assert_eq!(replaced.len(), 3);
        assert_eq!(count_identifiers(tree.root(), "x"), 0);
        assert_eq!(count_identifiers(tree.root(), "y"), 3);
        assert_eq!(
            sql(tree.root()),
            "SELECT y, y + 1 AS bumped FROM t WHERE y > 0"
        );
        assert_single_parent(&tree);
    }

    #[test]
    fn test_replacement_paths_address_new_nodes() {
        let mut tree = three_x();
        let replaced = tree
            .collection()
            .find_where(&tree, NodeKind::Identifier, |r| r.node.name() == Some("x"))
            .unwrap()
            .replace_with(&mut tree, col("y").into_inner())
            .unwrap();
        assert!(replaced
            .every(&tree, |r| r.node.name() == Some("y"))
            .unwrap());
    }

    #[test]
    fn test_replace_inside_nested_query() {
        let inner = select([col("x")]).from("u").where_(col("x").eq(lit(2))).build();
        let query = select([star()])
            .from("t")
            .where_(col("x").in_query(inner))
            .build();
        let mut tree = Tree::new(query);

        tree.collection()
            .find_where(&tree, NodeKind::Identifier, |r| r.node.name() == Some("x"))
            .unwrap()
            .replace_with(&mut tree, col("z").into_inner())
            .unwrap();

        assert_eq!(
            sql(tree.root()),
            "SELECT * FROM t WHERE z IN (SELECT z FROM u WHERE z = 2)"
        );
    }

    #[test]
    fn test_descendant_before_ancestor_in_one_batch() {
        let mut tree = three_x();
        let where_clause = tree
            .root_path()
            .attribute(&tree, "where_clause")
            .unwrap()
            .unwrap();
        let left = where_clause.attribute(&tree, "left").unwrap().unwrap();

        let replaced = Collection::from(vec![left, where_clause])
            .replace_with_fn(&mut tree, |r, _| match r.kind() {
                NodeKind::Identifier => col("inner").into_inner(),
                _ => col("flag").into_inner(),
            })
            .unwrap();

        assert_eq!(replaced.len(), 2);
        assert_eq!(sql(tree.root()), "SELECT x, x + 1 AS bumped FROM t WHERE flag");
    }

    #[test]
    fn test_ancestor_first_rejects_whole_batch() {
        let mut tree = three_x();
        let where_clause = tree
            .root_path()
            .attribute(&tree, "where_clause")
            .unwrap()
            .unwrap();
        let left = where_clause.attribute(&tree, "left").unwrap().unwrap();

        let err = Collection::from(vec![where_clause, left])
            .replace_with(&mut tree, col("flag").into_inner())
            .unwrap_err();
        assert!(err.is_structural_edit());
        // nothing was replaced
        assert_eq!(tree.epoch(), 0);
        assert_eq!(sql(tree.root()), "SELECT x, x + 1 AS bumped FROM t WHERE x > 0");
    }

    #[test]
    fn test_nested_arithmetic_found_together() {
        let mut tree = Tree::new(select([col("a").add(col("b")).add(col("c"))]).from("t").build());
        let sums = tree.collection().find(&tree, NodeKind::BinaryOp).unwrap();

        assert!(sums
            .replace_with(&mut tree, col("z").into_inner())
            .unwrap_err()
            .is_structural_edit());
        assert_eq!(sql(tree.root()), "SELECT a + b + c FROM t");
    }
}

// ============================================================================
// Insert
// ============================================================================

mod insert {
    use super::*;

    #[test]
    fn test_reverse_order_insert_before_even_positions() {
        let mut tree = six_items();
        let targets = items_at(&tree, &[0, 2, 4]);

        let inserted = targets.insert_before(&mut tree, item("x")).unwrap();

        assert_eq!(inserted.len(), 3);
        assert_eq!(
            item_names(&tree),
            vec!["x", "c0", "c1", "x", "c2", "c3", "x", "c4", "c5"]
        );
        assert_single_parent(&tree);
    }

    #[test]
    fn test_each_original_is_preceded_by_one_copy() {
        let mut tree = six_items();
        items_at(&tree, &[0, 2, 4])
            .insert_before(&mut tree, item("x"))
            .unwrap();

        let names = item_names(&tree);
        for target in ["c0", "c2", "c4"] {
            let at = names.iter().position(|n| n == target).unwrap();
            assert_eq!(names[at - 1], "x");
        }
        let originals: Vec<_> = names.iter().filter(|n| n.as_str() != "x").collect();
        assert_eq!(originals, vec!["c0", "c1", "c2", "c3", "c4", "c5"]);
    }

    #[test]
    fn test_insert_after_given_out_of_order() {
        let mut tree = six_items();
        items_at(&tree, &[4, 0, 2])
            .insert_after(&mut tree, item("x"))
            .unwrap();
        assert_eq!(
            item_names(&tree),
            vec!["c0", "x", "c1", "c2", "x", "c3", "c4", "x", "c5"]
        );
    }

    #[test]
    fn test_inserted_paths_follow_collection_order() {
        let mut tree = six_items();
        let inserted = items_at(&tree, &[1, 3])
            .insert_before_with(&mut tree, |r, i| {
                let source = r.node.child_nodes()[0].name().unwrap_or_default().to_string();
                item(&format!("before_{source}_{i}"))
            })
            .unwrap();

        let names = inserted
            .map(&tree, |r, _| r.node.child_nodes()[0].name().unwrap().to_string())
            .unwrap();
        assert_eq!(names, vec!["before_c1_0", "before_c3_1"]);
        assert_eq!(sql(tree.root()), "SELECT c0, before_c1_0, c1, c2, before_c3_1, c3, c4, c5 FROM t");
    }

    #[test]
    fn test_insert_into_single_slot_fails() {
        let mut tree = three_x();
        let where_clause = tree
            .collection()
            .find(&tree, NodeKind::BinaryOp)
            .unwrap()
            .filter(&tree, |r| r.path.step().map(|s| s.slot) == Some("where_clause"))
            .unwrap();
        assert_eq!(where_clause.len(), 1);

        let err = where_clause
            .insert_after(&mut tree, col("y").into_inner())
            .unwrap_err();
        assert!(err.is_structural_edit());
    }
}

// ============================================================================
// Remove
// ============================================================================

mod remove {
    use super::*;

    #[test]
    fn test_remove_odd_positions() {
        let mut tree = six_items();
        let removed = items_at(&tree, &[1, 3, 5]).remove(&mut tree).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(item_names(&tree), vec!["c0", "c2", "c4"]);
        assert_eq!(sql(tree.root()), "SELECT c0, c2, c4 FROM t");
    }

    #[test]
    fn test_stale_path_is_rebased_after_earlier_removal() {
        let mut tree = six_items();
        let c4 = items_at(&tree, &[4]);
        items_at(&tree, &[0, 1]).remove(&mut tree).unwrap();

        let names = c4
            .map(&tree, |r, _| r.node.child_nodes()[0].name().unwrap().to_string())
            .unwrap();
        assert_eq!(names, vec!["c4"]);
    }

    #[test]
    fn test_removed_node_cannot_be_edited_again() {
        let mut tree = six_items();
        let target = items_at(&tree, &[2]);
        target.remove(&mut tree).unwrap();

        assert!(target.remove(&mut tree).unwrap_err().is_structural_edit());
        assert!(target
            .replace_with(&mut tree, item("z"))
            .unwrap_err()
            .is_structural_edit());
        assert_eq!(item_names(&tree).len(), 5);
    }

    #[test]
    fn test_remove_optional_clause() {
        let mut tree = three_x();
        tree.root_path()
            .attribute(&tree, "where_clause")
            .unwrap()
            .map(|p| Collection::from(vec![p]))
            .unwrap()
            .remove(&mut tree)
            .unwrap();
        assert_eq!(sql(tree.root()), "SELECT x, x + 1 AS bumped FROM t");
    }
}

// ============================================================================
// Find
// ============================================================================

mod find {
    use super::*;

    #[test]
    fn test_find_counts_every_binary_op() {
        // a + 1, a = 1, b > 2, AND, c < 3, OR
        let query = select([col("a").add(lit(1))])
            .from("t")
            .where_(
                col("a")
                    .eq(lit(1))
                    .and(col("b").gt(lit(2)))
                    .or(col("c").lt(lit(3))),
            )
            .build();
        let tree = Tree::new(query);

        let expected = tree.root().count(|n| n.kind() == NodeKind::BinaryOp);
        assert_eq!(expected, 6);
        let found = tree.collection().find(&tree, NodeKind::BinaryOp).unwrap();
        assert_eq!(found.len(), expected);
    }

    #[test]
    fn test_find_from_subtree() {
        let tree = three_x();
        let where_only = Collection::from(vec![tree
            .root_path()
            .attribute(&tree, "where_clause")
            .unwrap()
            .unwrap()]);
        let idents = where_only.find(&tree, NodeKind::Identifier).unwrap();
        assert_eq!(idents.len(), 1);
    }

    #[test]
    fn test_closest_select_of_nested_identifiers() {
        let inner = select([col("id")]).from("u").build();
        let query = select([col("id")])
            .from("t")
            .where_(col("id").in_query(inner))
            .build();
        let tree = Tree::new(query);

        let selects = tree
            .collection()
            .find(&tree, NodeKind::Identifier)
            .unwrap()
            .closest(&tree, NodeKind::Select)
            .unwrap()
            .unique();
        assert_eq!(selects.len(), 2);
        assert!(selects.first().unwrap().is_root());
    }

    #[test]
    fn test_empty_collection_edits_are_noops() {
        let mut tree = three_x();
        let before = sql(tree.root());
        let none = tree
            .collection()
            .find(&tree, NodeKind::Merge)
            .unwrap();
        assert!(none.is_empty());

        none.replace_with(&mut tree, col("y").into_inner()).unwrap();
        none.insert_before(&mut tree, col("y").into_inner()).unwrap();
        assert!(none.remove(&mut tree).unwrap().is_empty());

        assert_eq!(sql(tree.root()), before);
        assert_eq!(tree.epoch(), 0);
    }
}

// ============================================================================
// Mixed edits
// ============================================================================

mod mixed {
    use super::*;

    #[test]
    fn test_edit_sequence_keeps_single_parent() {
        let mut tree = six_items();
        items_at(&tree, &[0, 3]).insert_after(&mut tree, item("n")).unwrap();
        items_at(&tree, &[2]).remove(&mut tree).unwrap();
        tree.collection()
            .find_where(&tree, NodeKind::Identifier, |r| r.node.name() == Some("c5"))
            .unwrap()
            .replace_with(&mut tree, col("last").into_inner())
            .unwrap();

        assert_single_parent(&tree);
        assert_eq!(
            item_names(&tree),
            vec!["c0", "n", "c2", "c3", "n", "c4", "last"]
        );
    }

    #[test]
    fn test_concurrent_readers_share_one_tree() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tree>();
        assert_send_sync::<Collection>();

        let tree = three_x();
        let counts: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(|| {
                        let found = tree.collection().find(&tree, NodeKind::Identifier).unwrap();
                        let at = found.first().cloned().unwrap();
                        assert!(at.resolve(&tree, "t").unwrap().is_some());
                        found.len()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(counts, vec![3; 4]);
    }
}
