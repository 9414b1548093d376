//! Symbo SQL - a typed BigQuery syntax tree you can build, navigate, edit and
//! print.
//!
//! There is no parser: trees come from the [`builder`] API (or from JSON, since
//! every node is serde-serializable), are inspected with [`visitor`] and
//! [`traversal`], edited in place through [`traversal::NodePath`] and
//! [`collection::Collection`], and turned back into SQL by [`generator`].
//!
//! # Architecture
//!
//! 1. **Expressions** - the closed [`Node`] taxonomy and its child slots
//! 2. **Builder** - validated constructors producing well-formed nodes
//! 3. **Traversal** - [`Tree`] ownership, path-aware navigation and scopes
//! 4. **Collection** - declarative queries and batched edits over paths
//! 5. **Generator** - compact or pretty SQL text
//!
//! ```
//! use symbo_sql::builder::*;
//! use symbo_sql::{generate, NodeKind, Tree};
//!
//! let query = select([col("id"), col("name")])
//!     .from("users")
//!     .where_(col("id").eq(lit(1)))
//!     .build();
//! let mut tree = Tree::new(query);
//!
//! tree.collection()
//!     .find_where(&tree, NodeKind::Identifier, |r| r.node.name() == Some("name"))
//!     .unwrap()
//!     .replace_with(&mut tree, col("full_name").into_inner())
//!     .unwrap();
//!
//! assert_eq!(
//!     generate(tree.root()).unwrap(),
//!     "SELECT id, full_name FROM users WHERE id = 1"
//! );
//! ```

pub mod builder;
pub mod collection;
pub mod error;
pub mod expressions;
pub mod generator;
pub mod scope;
pub mod transforms;
pub mod traversal;
pub mod visitor;

pub use builder::Expr;
pub use collection::{Collection, NodeRef};
pub use error::{Error, Result};
pub use expressions::{Children, Family, Node, NodeKind, Precedence};
pub use generator::{serialize, Generator, GeneratorConfig, KeywordCase, Mode};
pub use scope::{Binding, BindingKind, Scope, ScopeType};
pub use transforms::{
    add_where, extract_table_references, inject_cte, null_safe_eq, qualify_columns,
    rename_table, set_limit,
};
pub use traversal::{introduces_scope, DfsIter, NodePath, NodeWalk, Step, Tree};
pub use visitor::{walk_children, Visitor};

/// Generate compact SQL from a tree.
///
/// # Arguments
/// * `node` - The root of the tree to print
///
/// # Returns
/// The SQL text, or a serialization error when the tree breaks a rule the
/// printed form depends on (e.g. an empty select list)
pub fn generate(node: &Node) -> Result<String> {
    Generator::sql(node)
}

/// Generate pretty-printed SQL from a tree.
pub fn generate_pretty(node: &Node) -> Result<String> {
    Generator::pretty_sql(node)
}
