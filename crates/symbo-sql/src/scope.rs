//! Name scopes
//!
//! A [`Scope`] maps names introduced at one query boundary (CTE names, table
//! aliases, UNNEST aliases, select-list aliases, named windows, script
//! variables) to the node that introduced them, with a link to the enclosing
//! scope. Lookup walks innermost to outermost, so inner names shadow outer
//! ones.
//!
//! Scopes are not stored on nodes. [`NodePath::scope`](crate::traversal::NodePath::scope)
//! builds the chain on demand and caches it on the tree until the next edit.

use crate::expressions::{Children, Node, NodeKind};
use crate::traversal::{Route, Step, Tree};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "bindings")]
use ts_rs::TS;

/// What kind of boundary opened a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub enum ScopeType {
    /// The tree root
    Root,
    /// A SELECT block
    Query,
    /// A common table expression body
    Cte,
    /// A scalar, ARRAY or EXISTS subquery
    Subquery,
    /// A subquery in FROM
    DerivedTable,
    /// A table-valued function call
    TableFunction,
    /// A script or BEGIN ... END block
    Script,
}

impl ScopeType {
    fn of(kind: NodeKind) -> ScopeType {
        match kind {
            NodeKind::Select => ScopeType::Query,
            NodeKind::Cte => ScopeType::Cte,
            NodeKind::Subquery | NodeKind::ArraySubquery | NodeKind::Exists => ScopeType::Subquery,
            NodeKind::SubqueryTable => ScopeType::DerivedTable,
            NodeKind::TableFunction => ScopeType::TableFunction,
            NodeKind::Script | NodeKind::Block => ScopeType::Script,
            _ => ScopeType::Root,
        }
    }
}

/// What a name is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub enum BindingKind {
    Cte,
    Table,
    Subquery,
    Unnest,
    Offset,
    TableFunction,
    ColumnAlias,
    Window,
    Variable,
}

/// A name and the node that introduced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub kind: BindingKind,
    /// Route of the declaring node from the tree root
    pub route: Route,
}

#[derive(Debug, Clone)]
pub struct Scope {
    scope_type: ScopeType,
    parent: Option<Arc<Scope>>,
    bindings: Vec<Binding>,
}

impl Scope {
    pub fn new(scope_type: ScopeType, parent: Option<Arc<Scope>>) -> Self {
        Scope {
            scope_type,
            parent,
            bindings: Vec::new(),
        }
    }

    pub fn scope_type(&self) -> ScopeType {
        self.scope_type
    }

    pub fn parent(&self) -> Option<&Arc<Scope>> {
        self.parent.as_ref()
    }

    /// Bind `name` in this scope. Names compare case-insensitively and a
    /// second declaration replaces the first.
    pub fn declare(&mut self, name: impl Into<String>, kind: BindingKind, route: Route) {
        let name = name.into();
        let binding = Binding { name, kind, route };
        match self
            .bindings
            .iter_mut()
            .find(|b| b.name.eq_ignore_ascii_case(&binding.name))
        {
            Some(existing) => *existing = binding,
            None => self.bindings.push(binding),
        }
    }

    pub fn lookup_local(&self, name: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Look `name` up here, then in each enclosing scope.
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.lookup_local(name)
            .or_else(|| self.parent.as_deref().and_then(|p| p.lookup(name)))
    }

    /// Bindings declared in this scope, in declaration order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of enclosing scopes.
    pub fn depth(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| p.depth() + 1)
    }
}

fn push(route: &[Step], step: Step) -> Route {
    let mut out = route.to_vec();
    out.push(step);
    out
}

/// Build the scope opened by the node at `route`.
///
/// Only the bindings declared directly at that boundary are collected; the
/// enclosing chain comes in through `parent`.
pub(crate) fn build_scope(tree: &Tree, route: &[Step], parent: Option<Arc<Scope>>) -> Scope {
    let Some(node) = tree.get(route) else {
        return Scope::new(ScopeType::Root, parent);
    };
    let scope_type = if route.is_empty() {
        ScopeType::Root
    } else {
        ScopeType::of(node.kind())
    };
    let mut scope = Scope::new(scope_type, parent);

    match node {
        Node::Select(select) => {
            if let Some(Node::WithClause(with)) = select.with.as_deref() {
                let with_route = push(route, Step::attr("with"));
                for (i, cte) in with.ctes.iter().enumerate() {
                    if let Node::Cte(cte) = cte {
                        scope.declare(
                            cte.name.clone(),
                            BindingKind::Cte,
                            push(&with_route, Step::item("ctes", i)),
                        );
                    }
                }
            }
            if let Some(Node::FromClause(from)) = select.from.as_deref() {
                let from_route = push(route, Step::attr("from"));
                for (i, source) in from.sources.iter().enumerate() {
                    declare_source(
                        &mut scope,
                        source,
                        push(&from_route, Step::item("sources", i)),
                    );
                }
            }
            for (i, item) in select.select_list.iter().enumerate() {
                if let Node::SelectItem(item) = item {
                    if let Some(alias) = &item.alias {
                        scope.declare(
                            alias.clone(),
                            BindingKind::ColumnAlias,
                            push(route, Step::item("select_list", i)),
                        );
                    }
                }
            }
            for (i, window) in select.windows.iter().enumerate() {
                if let Node::NamedWindow(window) = window {
                    scope.declare(
                        window.name.clone(),
                        BindingKind::Window,
                        push(route, Step::item("windows", i)),
                    );
                }
            }
        }
        // A CTE can refer to itself when the WITH is recursive.
        Node::Cte(cte) => scope.declare(cte.name.clone(), BindingKind::Cte, route.to_vec()),
        Node::Script(script) => declare_variables(&mut scope, &script.statements, route, "statements"),
        Node::Block(block) => declare_variables(&mut scope, &block.body, route, "body"),
        _ => {}
    }
    scope
}

fn declare_source(scope: &mut Scope, source: &Node, route: Route) {
    match source {
        Node::TableRef(table) => {
            let name = table
                .alias
                .clone()
                .or_else(|| table.table.as_table_name().map(|t| t.table.clone()));
            if let Some(name) = name {
                scope.declare(name, BindingKind::Table, route);
            }
        }
        Node::SubqueryTable(sub) => {
            if let Some(alias) = &sub.alias {
                scope.declare(alias.clone(), BindingKind::Subquery, route);
            }
        }
        Node::Unnest(unnest) => {
            if let Some(alias) = &unnest.alias {
                scope.declare(alias.clone(), BindingKind::Unnest, route.clone());
            }
            if let Some(alias) = &unnest.offset_alias {
                scope.declare(alias.clone(), BindingKind::Offset, route);
            }
        }
        Node::TableFunction(func) => {
            let name = func.alias.clone().unwrap_or_else(|| func.name.clone());
            scope.declare(name, BindingKind::TableFunction, route);
        }
        Node::MlFunction(ml) => {
            if let Some(alias) = &ml.alias {
                scope.declare(alias.clone(), BindingKind::TableFunction, route);
            }
        }
        Node::Pivot(pivot) => match &pivot.alias {
            Some(alias) => scope.declare(alias.clone(), BindingKind::Subquery, route),
            None => declare_source(scope, &pivot.source, push(&route, Step::attr("source"))),
        },
        Node::Unpivot(unpivot) => match &unpivot.alias {
            Some(alias) => scope.declare(alias.clone(), BindingKind::Subquery, route),
            None => declare_source(scope, &unpivot.source, push(&route, Step::attr("source"))),
        },
        Node::Join(join) => {
            declare_source(scope, &join.left, push(&route, Step::attr("left")));
            declare_source(scope, &join.right, push(&route, Step::attr("right")));
        }
        other => {
            // Anything else in FROM is opaque to scoping; recurse so nested
            // sources still bind.
            for (name, slot) in other.slots() {
                if let crate::expressions::SlotRef::One(child) = slot {
                    if child.kind() == NodeKind::TableRef {
                        declare_source(scope, child, push(&route, Step::attr(name)));
                    }
                }
            }
        }
    }
}

fn declare_variables(scope: &mut Scope, statements: &[Node], route: &[Step], slot: &'static str) {
    for (i, statement) in statements.iter().enumerate() {
        if let Node::Declare(declare) = statement {
            for name in &declare.names {
                scope.declare(
                    name.clone(),
                    BindingKind::Variable,
                    push(route, Step::item(slot, i)),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expressions::*;
    use crate::traversal::NodeWalk;

    fn table(name: &str, alias: Option<&str>) -> Node {
        let mut t = TableRef::new(TableName::new(name));
        t.alias = alias.map(str::to_string);
        Node::from(t)
    }

    fn select_from(sources: Vec<Node>) -> Select {
        let mut select = Select::new();
        select
            .select_list
            .push(Node::from(SelectItem::new(Node::from(Star::default()))));
        select.from = Some(Box::new(Node::from(FromClause { sources })));
        select
    }

    #[test]
    fn test_declare_and_shadow() {
        let outer = {
            let mut s = Scope::new(ScopeType::Root, None);
            s.declare("t", BindingKind::Table, vec![]);
            s.declare("x", BindingKind::Variable, vec![]);
            Arc::new(s)
        };
        let mut inner = Scope::new(ScopeType::Query, Some(outer));
        inner.declare("T", BindingKind::Cte, vec![]);

        assert_eq!(inner.lookup("t").unwrap().kind, BindingKind::Cte);
        assert_eq!(inner.lookup("x").unwrap().kind, BindingKind::Variable);
        assert!(inner.lookup_local("x").is_none());
        assert!(inner.lookup("missing").is_none());
        assert_eq!(inner.depth(), 1);
        assert!(!inner.is_global());
    }

    #[test]
    fn test_redeclare_keeps_latest() {
        let mut scope = Scope::new(ScopeType::Root, None);
        scope.declare("a", BindingKind::Table, vec![]);
        scope.declare("A", BindingKind::ColumnAlias, vec![]);
        assert_eq!(scope.bindings().len(), 1);
        assert_eq!(scope.lookup("a").unwrap().kind, BindingKind::ColumnAlias);
    }

    #[test]
    fn test_select_bindings() {
        let mut select = select_from(vec![Node::from(Join {
            kind: JoinKind::Left,
            left: Box::new(table("orders", Some("o"))),
            right: Box::new(Node::from(Unnest {
                array: Box::new(Node::from(Identifier::new("items"))),
                alias: Some("item".into()),
                with_offset: true,
                offset_alias: Some("pos".into()),
            })),
            on: None,
            using: vec![],
        })]);
        select.select_list[0] = Node::from(SelectItem {
            expr: Box::new(Node::from(Identifier::new("id"))),
            alias: Some("order_id".into()),
        });
        let tree = Tree::new(Node::from(select));
        let scope = tree.root_path().scope(&tree).unwrap();

        assert!(scope.is_global());
        assert_eq!(scope.lookup("o").unwrap().kind, BindingKind::Table);
        assert_eq!(scope.lookup("item").unwrap().kind, BindingKind::Unnest);
        assert_eq!(scope.lookup("pos").unwrap().kind, BindingKind::Offset);
        assert_eq!(
            scope.lookup("order_id").unwrap().kind,
            BindingKind::ColumnAlias
        );
        let o = scope.lookup("o").unwrap();
        assert_eq!(tree.get(&o.route).unwrap().kind(), NodeKind::TableRef);
    }

    #[test]
    fn test_subquery_sees_outer_names() {
        let inner = select_from(vec![table("inner_t", None)]);
        let mut outer = select_from(vec![table("outer_t", Some("ot"))]);
        outer.where_clause = Some(Box::new(Node::from(Exists {
            query: Box::new(Node::from(inner)),
        })));
        let tree = Tree::new(Node::from(outer));

        let inner_table = tree
            .paths()
            .into_iter()
            .find(|p| {
                p.node(&tree)
                    .map(|n| n.name() == Some("inner_t"))
                    .unwrap_or(false)
            })
            .unwrap();
        let scope = inner_table.scope(&tree).unwrap();
        assert_eq!(scope.depth(), 2);
        assert!(scope.lookup_local("inner_t").is_some());
        assert!(scope.lookup("ot").is_some());
        assert_eq!(
            inner_table.resolve(&tree, "ot").unwrap().unwrap().kind,
            BindingKind::Table
        );
        assert!(inner_table.resolve(&tree, "nope").unwrap().is_none());
    }

    #[test]
    fn test_cte_bindings_and_cache_reset() {
        let mut select = select_from(vec![table("recent", None)]);
        select.with = Some(Box::new(Node::from(WithClause {
            recursive: false,
            ctes: vec![Node::from(Cte {
                name: "recent".into(),
                query: Box::new(Node::from(select_from(vec![table("events", None)]))),
            })],
        })));
        let mut tree = Tree::new(Node::from(select));
        let root = tree.root_path();
        assert_eq!(
            root.resolve(&tree, "recent").unwrap().unwrap().kind,
            BindingKind::Table
        );

        // the FROM source shadows the CTE of the same name in one scope;
        // removing it lets the CTE binding through on the next lookup
        let from = root.attribute(&tree, "from").unwrap().unwrap();
        from.remove_self(&mut tree).unwrap();
        let root = tree.root_path();
        assert_eq!(
            root.resolve(&tree, "recent").unwrap().unwrap().kind,
            BindingKind::Cte
        );
        assert!(tree.root().contains_kind(NodeKind::Cte));
    }

    #[test]
    fn test_script_variables() {
        let script = Script {
            statements: vec![
                Node::from(Declare {
                    names: vec!["a".into(), "b".into()],
                    data_type: Some(Box::new(Node::from(SimpleType {
                        name: TypeName::Int64,
                        params: vec![],
                    }))),
                    default: None,
                }),
                Node::from(select_from(vec![table("t", None)])),
            ],
        };
        let tree = Tree::new(Node::from(script));
        let select = tree
            .root_path()
            .index(&tree, "statements", 1)
            .unwrap()
            .unwrap();
        let scope = select.scope(&tree).unwrap();
        assert_eq!(scope.scope_type(), ScopeType::Query);
        assert_eq!(scope.lookup("b").unwrap().kind, BindingKind::Variable);
    }
}
