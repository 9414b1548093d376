//! Basic usage examples for symbo-sql.
//!
//! Run with: cargo run --example basic_usage -p symbo-sql

use symbo_sql::builder::{
    col, count_star, delete, func, insert_into, lit, named_parameter, rollup, select, star,
    update, Expr,
};
use symbo_sql::expressions::SelectItem;
use symbo_sql::{
    add_where, extract_table_references, generate, generate_pretty, rename_table, serialize,
    Collection, GeneratorConfig, KeywordCase, Node, NodeKind, Tree,
};

fn main() -> symbo_sql::Result<()> {
    builder_api()?;
    pretty_printing()?;
    navigation()?;
    rewriting()?;
    validation();
    Ok(())
}

/// Build SQL programmatically using the fluent builder API.
fn builder_api() -> symbo_sql::Result<()> {
    println!("=== Builder API ===\n");

    let query = select([col("id"), col("name"), col("email")])
        .from("users")
        .where_(col("age").gt(lit(18)).and(col("active").eq(lit(true))))
        .order_by(["name"])
        .limit(10)
        .build();
    println!("Select:  {}", generate(&query)?);

    let query = select([col("u.name"), col("o.total")])
        .from_source(symbo_sql::builder::table("users").aliased("u"))
        .join("orders", col("u.id").eq(col("o.user_id")))
        .where_(col("o.total").gt(named_parameter("min_total")?))
        .build();
    println!("Join:    {}", generate(&query)?);

    let query = select([col("region"), col("product"), count_star()])
        .from("sales")
        .group_by([rollup(["region", "product"])?])
        .build();
    println!("Rollup:  {}", generate(&query)?);

    let query = insert_into("users")
        .columns(&["name", "email"])
        .values([lit("Alice"), lit("alice@example.com")])
        .build()?;
    println!("Insert:  {}", generate(&query)?);

    let query = update("users")
        .set("name", lit("Bob"))
        .set("updated_at", func("CURRENT_TIMESTAMP", Vec::<Expr>::new()))
        .where_(col("id").eq(lit(1)))
        .build()?;
    println!("Update:  {}", generate(&query)?);

    let query = delete("users")
        .where_(col("id").eq(lit(1)).or(col("name").is_null()))
        .build()?;
    println!("Delete:  {}\n", generate(&query)?);
    Ok(())
}

/// The same tree in both layouts, plus lower-case keywords.
fn pretty_printing() -> symbo_sql::Result<()> {
    println!("=== Pretty printing ===\n");

    let query = select([col("dept"), func("AVG", [col("salary")]).alias("avg_salary")])
        .from("employees")
        .where_(col("active").eq(lit(true)))
        .group_by(["dept"])
        .build();
    println!("{}\n", generate_pretty(&query)?);

    let config = GeneratorConfig {
        keyword_case: KeywordCase::Lower,
        ..GeneratorConfig::pretty()
    };
    println!("{}\n", serialize(&query, &config)?);
    Ok(())
}

/// Find nodes and rewrite them through a Collection.
fn navigation() -> symbo_sql::Result<()> {
    println!("=== Navigation ===\n");

    let query = select([col("x"), col("x").add(lit(1)).alias("next")])
        .from("t")
        .where_(col("x").gt(lit(0)))
        .build();
    let mut tree = Tree::new(query);

    let found = tree
        .collection()
        .find_where(&tree, NodeKind::Identifier, |r| r.node.name() == Some("x"))?;
    println!("Found {} references to x", found.len());

    found.replace_with(&mut tree, col("y").into_inner())?;
    println!("Rewritten: {}", generate(tree.root())?);

    let items = tree.collection().find(&tree, NodeKind::SelectItem)?;
    let first = Collection::from(items.first().cloned().into_iter().collect::<Vec<_>>());
    first.insert_before(&mut tree, Node::from(SelectItem::new(col("id").into_inner())))?;
    println!("Inserted:  {}\n", generate(tree.root())?);
    Ok(())
}

/// Convenience rewrites built on the Collection.
fn rewriting() -> symbo_sql::Result<()> {
    println!("=== Rewriting ===\n");

    let query = select([star()])
        .from("ds.orders")
        .where_(col("status").eq(lit("open")))
        .build();
    let mut tree = Tree::new(query);

    let selects = tree.collection().find(&tree, NodeKind::Select)?;
    add_where(&mut tree, &selects, col("deleted").eq(lit(false)).into_inner())?;
    rename_table(&mut tree, "ds.orders", "ds.orders_v2")?;

    println!("Rewritten: {}", generate(tree.root())?);
    println!("Tables:    {:?}\n", extract_table_references(tree.root()));
    Ok(())
}

/// Invalid input is rejected before a node exists.
fn validation() {
    println!("=== Validation ===\n");

    for name in ["since", "1abc"] {
        match named_parameter(name) {
            Ok(param) => println!("@{name}: ok ({})", param.to_sql().unwrap_or_default()),
            Err(err) => println!("@{name}: {err}"),
        }
    }
}
