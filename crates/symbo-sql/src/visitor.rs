//! Per-variant dispatch over [`Node`].
//!
//! [`Visitor`] has one method per variant, each defaulting to
//! [`Visitor::generic_visit`]. Implementors override only the variants they
//! care about. [`Node::accept`] is a single exhaustive `match`, so a variant
//! added to the taxonomy without a visitor method is a compile error.
//!
//! ```
//! use symbo_sql::builder::*;
//! use symbo_sql::expressions::{Children, Identifier, NodeKind};
//! use symbo_sql::visitor::{walk_children, Visitor};
//!
//! #[derive(Default)]
//! struct Names(Vec<String>);
//!
//! impl Visitor for Names {
//!     type Output = ();
//!
//!     fn generic_visit(&mut self, _kind: NodeKind, node: &dyn Children) {
//!         walk_children(self, node);
//!     }
//!
//!     fn visit_identifier(&mut self, node: &Identifier) {
//!         self.0.push(node.name.clone());
//!     }
//! }
//!
//! let tree = col("a").add(col("b")).into_inner();
//! let mut names = Names::default();
//! tree.accept(&mut names);
//! assert_eq!(names.0, vec!["a", "b"]);
//! ```

use crate::expressions::*;

macro_rules! define_visitor {
    ($($family:ident { $($variant:ident => $visit:ident),* $(,)? })*) => {
        /// Double-dispatch visitor over every node variant.
        pub trait Visitor {
            type Output;

            /// Fallback for every variant without an override.
            fn generic_visit(&mut self, kind: NodeKind, node: &dyn Children) -> Self::Output;

            $($(
                #[doc = concat!("Visit a [`", stringify!($variant), "`] node.")]
                fn $visit(&mut self, node: &$variant) -> Self::Output {
                    self.generic_visit(NodeKind::$variant, node)
                }
            )*)*
        }

        impl Node {
            /// Dispatch to the visitor method for this variant.
            pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
                match self {
                    $($(Node::$variant(inner) => visitor.$visit(inner),)*)*
                }
            }
        }
    };
}

node_variants!(define_visitor);

/// Visit every child of `node` in slot order, discarding the outputs.
pub fn walk_children<V: Visitor + ?Sized>(visitor: &mut V, node: &dyn Children) {
    for child in node.child_nodes() {
        child.accept(visitor);
    }
}
