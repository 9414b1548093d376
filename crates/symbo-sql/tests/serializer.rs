//! Serializer integration tests
//!
//! Whole statements built through the public builder API and printed in
//! both modes.

mod common;

use common::*;
use symbo_sql::builder::*;
use symbo_sql::{
    generate, generate_pretty, serialize, Generator, GeneratorConfig, KeywordCase, Mode, Node,
};

/// Orders per user from a CTE, grouped, filtered and paged.
fn report() -> Node {
    let recent = select([col("user_id"), col("amount")])
        .from("orders")
        .where_(col("amount").gt(lit(0)))
        .build();
    select([
        col("users.name"),
        func("SUM", [col("recent.amount")]).alias("total"),
    ])
    .with(with_([cte("recent", recent).unwrap()], false).unwrap())
    .from("recent")
    .join("users", col("users.id").eq(col("recent.user_id")))
    .group_by(["users.name"])
    .having(func("SUM", [col("recent.amount")]).gt(lit(100)))
    .order_by([col("total").desc()])
    .limit(10)
    .offset(5)
    .build()
}

// ============================================================================
// End-to-end
// ============================================================================

mod end_to_end {
    use super::*;

    #[test]
    fn test_simple_select_compact() {
        let query = select([col("id"), col("name")])
            .from("t")
            .where_(eq(col("id"), lit(1)))
            .build();
        assert_eq!(sql(&query), "SELECT id, name FROM t WHERE id = 1");
    }

    #[test]
    fn test_rollup_is_not_flattened() {
        let query = select([col("a"), col("b"), count_star()])
            .from("t")
            .group_by([rollup([col("a"), col("b")]).unwrap()])
            .build();
        let text = sql(&query);
        assert!(text.ends_with("GROUP BY ROLLUP(a, b)"), "{text}");
        assert!(!text.contains("GROUP BY a, b"));
    }

    #[test]
    fn test_report_compact() {
        assert_eq!(
            generate(&report()).unwrap(),
            "WITH recent AS (SELECT user_id, amount FROM orders WHERE amount > 0) \
             SELECT users.name, SUM(recent.amount) AS total \
             FROM recent JOIN users ON users.id = recent.user_id \
             GROUP BY users.name HAVING SUM(recent.amount) > 100 \
             ORDER BY total DESC LIMIT 10 OFFSET 5"
        );
    }

    #[test]
    fn test_report_pretty() {
        let expected = "\
WITH recent AS (
  SELECT
    user_id,
    amount
  FROM orders
  WHERE amount > 0
)
SELECT
  users.name,
  SUM(recent.amount) AS total
FROM recent
JOIN users ON users.id = recent.user_id
GROUP BY users.name
HAVING SUM(recent.amount) > 100
ORDER BY total DESC
LIMIT 10 OFFSET 5";
        assert_eq!(generate_pretty(&report()).unwrap(), expected);
    }

    #[test]
    fn test_expr_to_sql() {
        assert_eq!(
            col("price").mul(col("qty")).add(lit(1)).to_sql().unwrap(),
            "price * qty + 1"
        );
    }
}

// ============================================================================
// Repeatability
// ============================================================================

mod repeatability {
    use super::*;

    #[test]
    fn test_same_text_twice_in_both_modes() {
        let query = report();
        for config in [GeneratorConfig::compact(), GeneratorConfig::pretty()] {
            let first = serialize(&query, &config).unwrap();
            let second = serialize(&query, &config).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_reused_generator_starts_clean() {
        let mut generator = Generator::new();
        let a = generator.generate(&select([col("a")]).from("t").build()).unwrap();
        let b = generator.generate(&select([col("b")]).from("u").build()).unwrap();
        assert_eq!(a, "SELECT a FROM t");
        assert_eq!(b, "SELECT b FROM u");
    }

    #[test]
    fn test_modes_differ_only_in_whitespace() {
        let query = report();
        let squash = |s: String| s.split_whitespace().collect::<Vec<_>>().join(" ");
        let compact = squash(generate(&query).unwrap());
        let pretty = squash(generate_pretty(&query).unwrap())
            .replace("( ", "(")
            .replace(" )", ")");
        assert_eq!(compact, pretty);
    }
}

// ============================================================================
// Configuration
// ============================================================================

mod configuration {
    use super::*;

    #[test]
    fn test_custom_indent() {
        let config = GeneratorConfig {
            mode: Mode::Pretty,
            indent: "    ".to_string(),
            ..Default::default()
        };
        let query = select([col("id"), col("name")]).from("t").build();
        assert_eq!(
            serialize(&query, &config).unwrap(),
            "SELECT\n    id,\n    name\nFROM t"
        );
    }

    #[test]
    fn test_lower_case_pretty() {
        let config = GeneratorConfig {
            keyword_case: KeywordCase::Lower,
            ..GeneratorConfig::pretty()
        };
        let query = select([col("a")]).from("t").where_(col("a").is_not_null()).build();
        assert_eq!(
            serialize(&query, &config).unwrap(),
            "select\n  a\nfrom t\nwhere a is not null"
        );
    }

    #[test]
    fn test_reserved_words_always_quoted() {
        let query = select([col("from"), col("t.group")]).from("select").build();
        assert_eq!(sql(&query), "SELECT `from`, t.`group` FROM `select`");
    }

    #[test]
    fn test_default_config_is_compact_upper() {
        let config = GeneratorConfig::default();
        assert_eq!(config.mode, Mode::Compact);
        assert_eq!(config.keyword_case, KeywordCase::Upper);
        assert_eq!(config.indent, "  ");
        assert!(!config.quote_all_identifiers);
    }
}

// ============================================================================
// Statements
// ============================================================================

mod statements {
    use super::*;

    #[test]
    fn test_delete_with_subquery_filter() {
        let stale = select([col("id")])
            .from("sessions")
            .where_(col("expired").eq(lit(true)))
            .build();
        let stmt = delete("sessions_archive")
            .where_(col("id").in_query(stale))
            .build()
            .unwrap();
        assert_eq!(
            sql(&stmt),
            "DELETE FROM sessions_archive WHERE id IN (SELECT id FROM sessions WHERE expired = TRUE)"
        );
    }

    #[test]
    fn test_insert_from_query() {
        let source = select([col("a"), col("b")]).from("staging").build();
        let stmt = insert_into("ds.target")
            .columns(&["a", "b"])
            .query(source)
            .build()
            .unwrap();
        assert_eq!(
            sql(&stmt),
            "INSERT INTO ds.target (a, b) SELECT a, b FROM staging"
        );
    }

    #[test]
    fn test_script_pretty() {
        let body = script([
            declare(&["total"], Some(data_type("INT64").unwrap()), Some(lit(0))).unwrap(),
            set_variable(&["total"], col("total").add(lit(1))).unwrap(),
        ])
        .unwrap();
        assert_eq!(
            generate_pretty(&body).unwrap(),
            "DECLARE total INT64 DEFAULT 0;\nSET total = total + 1;"
        );
    }
}
