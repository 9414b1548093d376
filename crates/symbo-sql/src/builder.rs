//! Validating builder API
//!
//! Builds [`Node`] trees programmatically. Every constructor either returns a
//! well-formed node or fails with a single [`Error::Validation`] naming the
//! offending field, the value and the rule it broke. Nothing partially built
//! escapes.
//!
//! # Design
//!
//! - **Expression helpers** ([`col`], [`lit`], [`star`], [`null`], [`func`],
//!   [`cast`], [`eq`], ...) create leaf-level [`Expr`] values. They cannot
//!   fail.
//! - **Validated constructors** ([`named_parameter`], [`group_by_position`],
//!   [`rollup`], [`json`], [`interval_range`], [`date`], [`numeric`], ...)
//!   check domain rules and return [`Result<Expr>`](crate::error::Result).
//! - **Statement starters** ([`select`], [`insert_into`], [`update`],
//!   [`delete`], [`merge`], [`create_table`], [`alter_table`], ...) return
//!   fluent builder structs. Builders whose statement has cross-field rules
//!   check them in `build()`.
//! - **[`Expr`]** wraps a [`Node`] and exposes operator methods (`.eq()`,
//!   `.gt()`, `.and()`, `.like()`, ...).
//! - **[`IntoExpr`]** and **[`IntoLiteral`]** coerce `&str`, integers and
//!   `bool` wherever an expression or literal is expected.
//!
//! # Examples
//!
//! ```
//! use symbo_sql::builder::*;
//!
//! // SELECT id, name FROM t WHERE id = 1
//! let query = select([col("id"), col("name")])
//!     .from("t")
//!     .where_(eq(col("id"), lit(1)))
//!     .build();
//! assert_eq!(
//!     symbo_sql::generator::Generator::sql(&query).unwrap(),
//!     "SELECT id, name FROM t WHERE id = 1"
//! );
//! ```
//!
//! ```
//! use symbo_sql::builder::*;
//!
//! assert!(group_by_position(0).is_err());
//! assert!(rollup(Vec::<Expr>::new()).is_err());
//! assert!(named_parameter("1abc").is_err());
//! assert!(named_parameter("_ok1").is_ok());
//! ```

use crate::error::{Error, Result};
use crate::expressions::*;
use crate::generator::Generator;

// ---------------------------------------------------------------------------
// Shared checks
// ---------------------------------------------------------------------------

/// Letter or underscore first, then letters, digits or underscores.
fn is_safe_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !(first == '_' || first.is_ascii_alphabetic()) {
        return false;
    }

    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn require_name(field: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::validation(field, name, "must not be empty"));
    }
    Ok(())
}

fn require_non_empty<T>(field: &str, items: &[T], rule: &str) -> Result<()> {
    if items.is_empty() {
        return Err(Error::validation(field, "[]", rule));
    }
    Ok(())
}

/// Reject empty or duplicate names; duplicates compare case-insensitively.
fn require_unique<'a>(field: &str, names: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let mut seen: Vec<String> = Vec::new();
    for name in names {
        require_name(field, name)?;
        let lower = name.to_ascii_lowercase();
        if seen.contains(&lower) {
            return Err(Error::validation(field, name, "names must be unique"));
        }
        seen.push(lower);
    }
    Ok(())
}

/// Split a dotted table path. Anything before the last two parts is the
/// project, since project ids may themselves contain dots.
fn split_table_name(name: &str) -> TableName {
    let parts: Vec<&str> = name.split('.').collect();
    match parts.len() {
        0 | 1 => TableName::new(name),
        2 => TableName {
            project: None,
            dataset: Some(parts[0].to_string()),
            table: parts[1].to_string(),
        },
        n => TableName {
            project: Some(parts[..n - 2].join(".")),
            dataset: Some(parts[n - 2].to_string()),
            table: parts[n - 1].to_string(),
        },
    }
}

fn checked_table_name(field: &str, name: &str) -> Result<TableName> {
    if name.split('.').any(|part| part.trim().is_empty()) {
        return Err(Error::validation(field, name, "table name parts must not be empty"));
    }
    Ok(split_table_name(name))
}

fn int(value: i64) -> Node {
    Node::from(IntegerLiteral::new(value))
}

fn nodes<I, E>(items: I) -> Vec<Node>
where
    I: IntoIterator<Item = E>,
    E: IntoExpr,
{
    items.into_iter().map(|e| e.into_expr().0).collect()
}

fn select_item(node: Node) -> Node {
    match node {
        Node::SelectItem(_) => node,
        other => Node::from(SelectItem::new(other)),
    }
}

fn order_item(node: Node) -> Node {
    match node {
        Node::OrderByItem(_) => node,
        other => Node::from(OrderByItem {
            expr: Box::new(other),
            direction: None,
            nulls: None,
        }),
    }
}

fn and_together(existing: Option<Box<Node>>, condition: Node) -> Option<Box<Node>> {
    Some(Box::new(match existing {
        Some(prev) => Node::from(BinaryOp::new(*prev, BinaryOperator::And, condition)),
        None => condition,
    }))
}

fn assignments<'a>(items: impl IntoIterator<Item = (&'a str, Expr)>) -> Vec<Node> {
    items
        .into_iter()
        .map(|(target, value)| {
            Node::from(SetClause {
                target: Box::new(col(target).0),
                value: Box::new(value.0),
            })
        })
        .collect()
}

fn options_entries(options: &Node) -> Option<&[Node]> {
    match options {
        Node::OptionsClause(clause) => Some(&clause.entries),
        _ => None,
    }
}

fn require_options(field: &str, options: &Expr) -> Result<()> {
    if options_entries(&options.0).is_none() {
        return Err(Error::validation(field, options.0.kind(), "expected an OPTIONS list"));
    }
    Ok(())
}

/// Require the named OPTIONS entries to be present.
fn require_option_names(field: &str, options: &Expr, required: &[&str]) -> Result<()> {
    let entries = options_entries(&options.0)
        .ok_or_else(|| Error::validation(field, options.0.kind(), "expected an OPTIONS list"))?;
    for name in required {
        let present = entries
            .iter()
            .any(|e| e.name().is_some_and(|n| n.eq_ignore_ascii_case(name)));
        if !present {
            return Err(Error::validation(
                field,
                name,
                "required option is missing",
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Expr
// ---------------------------------------------------------------------------

/// A thin wrapper around [`Node`] with fluent operator methods.
///
/// ```
/// use symbo_sql::builder::*;
///
/// let condition = col("age").gte(lit(18)).and(col("active").eq(boolean(true)));
/// assert_eq!(condition.to_sql().unwrap(), "age >= 18 AND active = TRUE");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Expr(pub Node);

impl From<Expr> for Node {
    fn from(expr: Expr) -> Node {
        expr.0
    }
}

impl Expr {
    /// Consume this wrapper and return the inner [`Node`].
    pub fn into_inner(self) -> Node {
        self.0
    }

    /// Render with the compact printer.
    pub fn to_sql(&self) -> Result<String> {
        Generator::sql(&self.0)
    }

    fn binary(self, op: BinaryOperator, other: Expr) -> Expr {
        Expr(Node::from(BinaryOp::new(self.0, op, other.0)))
    }

    // -- Comparison operators --

    pub fn eq(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::Eq, other)
    }

    pub fn neq(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::NotEq, other)
    }

    pub fn lt(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::Lt, other)
    }

    pub fn lte(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::LtEq, other)
    }

    pub fn gt(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::Gt, other)
    }

    pub fn gte(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::GtEq, other)
    }

    /// `self IS NOT DISTINCT FROM other`, the NULL-safe equality.
    pub fn is_not_distinct_from(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::IsNotDistinctFrom, other)
    }

    pub fn is_distinct_from(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::IsDistinctFrom, other)
    }

    // -- Logical operators --

    pub fn and(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::And, other)
    }

    pub fn or(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::Or, other)
    }

    pub fn not(self) -> Expr {
        unary_op(UnaryOperator::Not, self)
    }

    // -- Arithmetic operators --

    pub fn add(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::Plus, other)
    }

    pub fn sub(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::Minus, other)
    }

    pub fn mul(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::Multiply, other)
    }

    pub fn div(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::Divide, other)
    }

    /// `self || other`
    pub fn concat(self, other: Expr) -> Expr {
        self.binary(BinaryOperator::Concat, other)
    }

    pub fn neg(self) -> Expr {
        unary_op(UnaryOperator::Minus, self)
    }

    // -- Predicates --

    fn is_test(self, test: IsKind, negated: bool) -> Expr {
        Expr(Node::from(IsTest {
            expr: Box::new(self.0),
            negated,
            test,
        }))
    }

    pub fn is_null(self) -> Expr {
        self.is_test(IsKind::Null, false)
    }

    pub fn is_not_null(self) -> Expr {
        self.is_test(IsKind::Null, true)
    }

    pub fn is_true(self) -> Expr {
        self.is_test(IsKind::True, false)
    }

    pub fn is_false(self) -> Expr {
        self.is_test(IsKind::False, false)
    }

    /// `self IN (values)`. An empty list is rejected.
    pub fn in_list(self, values: impl IntoIterator<Item = Expr>) -> Result<Expr> {
        self.in_values(values, false)
    }

    pub fn not_in(self, values: impl IntoIterator<Item = Expr>) -> Result<Expr> {
        self.in_values(values, true)
    }

    fn in_values(self, values: impl IntoIterator<Item = Expr>, negated: bool) -> Result<Expr> {
        let list = nodes(values);
        require_non_empty("in_list", &list, "IN needs at least one value")?;
        Ok(Expr(Node::from(In {
            expr: Box::new(self.0),
            negated,
            list,
            query: None,
            unnest: None,
        })))
    }

    /// `self IN (query)`
    pub fn in_query(self, query: impl Into<Node>) -> Expr {
        Expr(Node::from(In {
            expr: Box::new(self.0),
            negated: false,
            list: Vec::new(),
            query: Some(Box::new(query.into())),
            unnest: None,
        }))
    }

    /// `self IN UNNEST(array)`
    pub fn in_unnest(self, array: Expr) -> Expr {
        Expr(Node::from(In {
            expr: Box::new(self.0),
            negated: false,
            list: Vec::new(),
            query: None,
            unnest: Some(Box::new(array.0)),
        }))
    }

    pub fn between(self, low: Expr, high: Expr) -> Expr {
        Expr(Node::from(Between {
            expr: Box::new(self.0),
            negated: false,
            low: Box::new(low.0),
            high: Box::new(high.0),
        }))
    }

    pub fn like(self, pattern: Expr) -> Expr {
        Expr(Node::from(Like {
            expr: Box::new(self.0),
            negated: false,
            pattern: Box::new(pattern.0),
        }))
    }

    pub fn not_like(self, pattern: Expr) -> Expr {
        Expr(Node::from(Like {
            expr: Box::new(self.0),
            negated: true,
            pattern: Box::new(pattern.0),
        }))
    }

    // -- Access --

    /// `self.field`
    pub fn field(self, name: &str) -> Expr {
        Expr(Node::from(FieldAccess {
            expr: Box::new(self.0),
            field: name.to_string(),
        }))
    }

    /// `self[index]` with the given subscript flavour.
    pub fn at(self, index: Expr, mode: SubscriptMode) -> Expr {
        Expr(Node::from(ArrayAccess {
            array: Box::new(self.0),
            index: Box::new(index.0),
            mode,
        }))
    }

    /// `self[OFFSET(index)]`
    pub fn offset(self, index: i64) -> Expr {
        self.at(lit(index), SubscriptMode::Offset)
    }

    /// `self[SAFE_OFFSET(index)]`
    pub fn safe_offset(self, index: i64) -> Expr {
        self.at(lit(index), SubscriptMode::SafeOffset)
    }

    // -- Wrappers --

    /// `self AS name`, as a select-list item or STRUCT field.
    pub fn alias(self, name: &str) -> Expr {
        let expr = match self.0 {
            Node::SelectItem(item) => item.expr,
            other => Box::new(other),
        };
        Expr(Node::from(SelectItem {
            expr,
            alias: Some(name.to_string()),
        }))
    }

    /// Alias a FROM source (table, UNNEST, subquery, table function, PIVOT
    /// or UNPIVOT). Anything else becomes an aliased select item.
    pub fn aliased(self, name: &str) -> Expr {
        let alias = Some(name.to_string());
        match self.0 {
            Node::TableRef(mut source) => {
                source.alias = alias;
                Expr(Node::TableRef(source))
            }
            Node::Unnest(mut source) => {
                source.alias = alias;
                Expr(Node::Unnest(source))
            }
            Node::SubqueryTable(mut source) => {
                source.alias = alias;
                Expr(Node::SubqueryTable(source))
            }
            Node::TableFunction(mut source) => {
                source.alias = alias;
                Expr(Node::TableFunction(source))
            }
            Node::MlFunction(mut source) => {
                source.alias = alias;
                Expr(Node::MlFunction(source))
            }
            Node::Pivot(mut source) => {
                source.alias = alias;
                Expr(Node::Pivot(source))
            }
            Node::Unpivot(mut source) => {
                source.alias = alias;
                Expr(Node::Unpivot(source))
            }
            other => Expr(other).alias(name),
        }
    }

    /// `table FOR SYSTEM_TIME AS OF timestamp`; only valid on a table reference.
    pub fn for_system_time_as_of(self, timestamp: Expr) -> Result<Expr> {
        match self.0 {
            Node::TableRef(mut table) => {
                table.system_time = Some(Box::new(timestamp.0));
                Ok(Expr(Node::TableRef(table)))
            }
            other => Err(Error::validation(
                "system_time",
                other.kind(),
                "only table references support FOR SYSTEM_TIME AS OF",
            )),
        }
    }

    /// Attach a sample built by [`tablesample`] to a table reference.
    pub fn with_sample(self, sample: Expr) -> Result<Expr> {
        if !sample.0.is(NodeKind::TableSample) {
            return Err(Error::validation("tablesample", sample.0.kind(), "expected TABLESAMPLE"));
        }
        match self.0 {
            Node::TableRef(mut table) => {
                table.sample = Some(Box::new(sample.0));
                Ok(Expr(Node::TableRef(table)))
            }
            other => Err(Error::validation(
                "tablesample",
                other.kind(),
                "only table references can be sampled",
            )),
        }
    }

    pub fn cast(self, to: Expr) -> Expr {
        cast(self, to)
    }

    pub fn asc(self) -> Expr {
        self.ordered(|item| item.direction = Some(SortDirection::Asc))
    }

    pub fn desc(self) -> Expr {
        self.ordered(|item| item.direction = Some(SortDirection::Desc))
    }

    pub fn nulls_first(self) -> Expr {
        self.ordered(|item| item.nulls = Some(NullsOrder::First))
    }

    pub fn nulls_last(self) -> Expr {
        self.ordered(|item| item.nulls = Some(NullsOrder::Last))
    }

    fn ordered(self, apply: impl FnOnce(&mut OrderByItem)) -> Expr {
        match order_item(self.0) {
            Node::OrderByItem(mut item) => {
                apply(&mut item);
                Expr(Node::OrderByItem(item))
            }
            other => Expr(other),
        }
    }

    fn update_call(
        self,
        field: &str,
        apply: impl FnOnce(&mut FunctionCall),
    ) -> Result<Expr> {
        match self.0 {
            Node::FunctionCall(mut call) => {
                apply(&mut call);
                Ok(Expr(Node::FunctionCall(call)))
            }
            other => Err(Error::validation(field, other.kind(), "expected a function call")),
        }
    }

    /// `f(x IGNORE NULLS)`
    pub fn ignore_nulls(self) -> Result<Expr> {
        self.update_call("ignore_nulls", |call| {
            call.null_handling = Some(NullHandling::IgnoreNulls)
        })
    }

    /// `f(x RESPECT NULLS)`
    pub fn respect_nulls(self) -> Result<Expr> {
        self.update_call("respect_nulls", |call| {
            call.null_handling = Some(NullHandling::RespectNulls)
        })
    }

    /// `ARRAY_AGG(x ORDER BY ... LIMIT n)`
    pub fn within_order<I, E>(self, order_by: I, limit: Option<u32>) -> Result<Expr>
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        let order: Vec<Node> = nodes(order_by).into_iter().map(order_item).collect();
        self.update_call("aggregate_order_by", |call| {
            call.order_by = order;
            call.limit = limit.map(|n| Box::new(int(i64::from(n))));
        })
    }

    /// `self OVER (window)`
    pub fn over(self, window: WindowBuilder) -> Expr {
        Expr(Node::from(WindowFunction {
            function: Box::new(self.0),
            window: Box::new(window.build()),
        }))
    }

    /// `self OVER name`, referring to a WINDOW clause entry.
    pub fn over_named(self, name: &str) -> Expr {
        let spec = WindowSpec {
            base: Some(name.to_string()),
            ..WindowSpec::default()
        };
        Expr(Node::from(WindowFunction {
            function: Box::new(self.0),
            window: Box::new(Node::from(spec)),
        }))
    }
}

// ---------------------------------------------------------------------------
// Conversion traits
// ---------------------------------------------------------------------------

/// Anything usable where an expression is expected.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for Node {
    fn into_expr(self) -> Expr {
        Expr(self)
    }
}

impl IntoExpr for &str {
    /// Column reference via [`col()`].
    fn into_expr(self) -> Expr {
        col(self)
    }
}

impl IntoExpr for String {
    fn into_expr(self) -> Expr {
        col(&self)
    }
}

/// Rust values that map onto a SQL literal.
///
/// There is no `f64` impl: a float can be non-finite, so use [`float`].
pub trait IntoLiteral {
    fn into_literal(self) -> Expr;
}

impl IntoLiteral for &str {
    fn into_literal(self) -> Expr {
        Expr(Node::from(StringLiteral::new(self)))
    }
}

impl IntoLiteral for String {
    fn into_literal(self) -> Expr {
        Expr(Node::from(StringLiteral::new(self)))
    }
}

impl IntoLiteral for i64 {
    fn into_literal(self) -> Expr {
        Expr(int(self))
    }
}

impl IntoLiteral for i32 {
    fn into_literal(self) -> Expr {
        Expr(int(i64::from(self)))
    }
}

impl IntoLiteral for u32 {
    fn into_literal(self) -> Expr {
        Expr(int(i64::from(self)))
    }
}

impl IntoLiteral for bool {
    fn into_literal(self) -> Expr {
        boolean(self)
    }
}

// ---------------------------------------------------------------------------
// Expression helpers
// ---------------------------------------------------------------------------

/// Column reference. Dotted names become a qualified [`ColumnRef`], anything
/// else a bare [`Identifier`].
///
/// ```
/// use symbo_sql::builder::col;
///
/// assert_eq!(col("name").to_sql().unwrap(), "name");
/// assert_eq!(col("u.name").to_sql().unwrap(), "u.name");
/// ```
pub fn col(name: &str) -> Expr {
    if name.contains('.') {
        Expr(Node::from(ColumnRef {
            parts: name
                .split('.')
                .map(|part| Node::from(Identifier::new(part)))
                .collect(),
        }))
    } else {
        Expr(Node::from(Identifier::new(name)))
    }
}

/// An identifier that is always printed with backticks.
pub fn quoted(name: &str) -> Expr {
    Expr(Node::from(Identifier::quoted(name)))
}

pub fn lit<V: IntoLiteral>(value: V) -> Expr {
    value.into_literal()
}

pub fn star() -> Expr {
    Expr(Node::from(Star::default()))
}

/// `qualifier.*`
pub fn star_of(qualifier: &str) -> Expr {
    Expr(Node::from(Star {
        qualifier: Some(Box::new(col(qualifier).0)),
        ..Star::default()
    }))
}

/// `* EXCEPT (columns)`
pub fn star_except<I, E>(columns: I) -> Result<Expr>
where
    I: IntoIterator<Item = E>,
    E: IntoExpr,
{
    let except = nodes(columns);
    require_non_empty("star_except", &except, "EXCEPT needs at least one column")?;
    Ok(Expr(Node::from(Star {
        except,
        ..Star::default()
    })))
}

/// `* REPLACE (expr AS column, ...)`; every replacement needs an alias.
pub fn star_replace(replacements: impl IntoIterator<Item = Expr>) -> Result<Expr> {
    let replace = nodes(replacements);
    require_non_empty("star_replace", &replace, "REPLACE needs at least one column")?;
    if let Some(bare) = replace
        .iter()
        .find(|n| !matches!(n, Node::SelectItem(item) if item.alias.is_some()))
    {
        return Err(Error::validation(
            "star_replace",
            bare.kind(),
            "each replacement must be aliased",
        ));
    }
    Ok(Expr(Node::from(Star {
        replace,
        ..Star::default()
    })))
}

pub fn null() -> Expr {
    Expr(Node::from(NullLiteral))
}

pub fn boolean(value: bool) -> Expr {
    Expr(Node::from(BooleanLiteral { value }))
}

/// The `DEFAULT` keyword, for INSERT rows and UPDATE assignments.
pub fn default_value() -> Expr {
    Expr(Node::from(DefaultValue))
}

pub fn eq(left: Expr, right: Expr) -> Expr {
    left.eq(right)
}

pub fn and(left: Expr, right: Expr) -> Expr {
    left.and(right)
}

pub fn or(left: Expr, right: Expr) -> Expr {
    left.or(right)
}

pub fn not(expr: Expr) -> Expr {
    expr.not()
}

pub fn binary_op(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    left.binary(op, right)
}

pub fn unary_op(op: UnaryOperator, operand: Expr) -> Expr {
    Expr(Node::from(UnaryOp {
        op,
        operand: Box::new(operand.0),
    }))
}

/// Function call.
///
/// ```
/// use symbo_sql::builder::{func, col, star};
///
/// assert_eq!(func("UPPER", [col("name")]).to_sql().unwrap(), "UPPER(name)");
/// assert_eq!(func("COUNT", [star()]).to_sql().unwrap(), "COUNT(*)");
/// ```
pub fn func(name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr(Node::from(FunctionCall::new(name, nodes(args))))
}

/// Aggregate call with `DISTINCT`.
pub fn func_distinct(name: &str, args: impl IntoIterator<Item = Expr>) -> Expr {
    let mut call = FunctionCall::new(name, nodes(args));
    call.distinct = true;
    Expr(Node::from(call))
}

pub fn count_star() -> Expr {
    func("COUNT", [star()])
}

pub fn cast(expr: Expr, to: Expr) -> Expr {
    Expr(Node::from(Cast {
        expr: Box::new(expr.0),
        target: Box::new(to.0),
        safe: false,
        format: None,
    }))
}

pub fn safe_cast(expr: Expr, to: Expr) -> Expr {
    Expr(Node::from(Cast {
        expr: Box::new(expr.0),
        target: Box::new(to.0),
        safe: true,
        format: None,
    }))
}

/// `CAST(expr AS type FORMAT 'pattern')`
pub fn cast_format(expr: Expr, to: Expr, format: &str) -> Result<Expr> {
    require_name("cast_format", format)?;
    Ok(Expr(Node::from(Cast {
        expr: Box::new(expr.0),
        target: Box::new(to.0),
        safe: false,
        format: Some(Box::new(lit(format).0)),
    })))
}

/// `EXTRACT(part FROM expr)`; `part` must be a plain name such as `YEAR`.
pub fn extract(part: &str, expr: Expr) -> Result<Expr> {
    extract_part(part, expr, None)
}

/// `EXTRACT(part FROM expr AT TIME ZONE zone)`
pub fn extract_at_time_zone(part: &str, expr: Expr, zone: Expr) -> Result<Expr> {
    extract_part(part, expr, Some(zone))
}

fn extract_part(part: &str, expr: Expr, zone: Option<Expr>) -> Result<Expr> {
    if !is_safe_identifier_name(part) {
        return Err(Error::validation("extract_part", part, "must be a date part name"));
    }
    Ok(Expr(Node::from(Extract {
        part: part.to_ascii_uppercase(),
        expr: Box::new(expr.0),
        time_zone: zone.map(|z| Box::new(z.0)),
    })))
}

/// `@name`
pub fn named_parameter(name: &str) -> Result<Expr> {
    if !is_safe_identifier_name(name) {
        return Err(Error::validation(
            "named_parameter",
            name,
            "must start with a letter or underscore and contain only letters, digits or underscores",
        ));
    }
    Ok(Expr(Node::from(NamedParameter {
        name: name.to_string(),
    })))
}

/// `?`; `position` is the 1-based order of the placeholder.
pub fn positional_parameter(position: u32) -> Result<Expr> {
    if position == 0 {
        return Err(Error::validation("positional_parameter", position, "must be >= 1"));
    }
    Ok(Expr(Node::from(PositionalParameter { position })))
}

/// `name => value`
pub fn named_argument(name: &str, value: Expr) -> Result<Expr> {
    if !is_safe_identifier_name(name) {
        return Err(Error::validation("named_argument", name, "must be a plain name"));
    }
    Ok(Expr(Node::from(NamedArgument {
        name: name.to_string(),
        value: Box::new(value.0),
    })))
}

pub fn exists(query: impl Into<Node>) -> Expr {
    Expr(Node::from(Exists {
        query: Box::new(query.into()),
    }))
}

/// Scalar subquery, `(SELECT ...)`.
pub fn subquery(query: impl Into<Node>) -> Expr {
    Expr(Node::from(Subquery {
        query: Box::new(query.into()),
    }))
}

/// `ARRAY(SELECT ...)`
pub fn array_subquery(query: impl Into<Node>) -> Expr {
    Expr(Node::from(ArraySubquery {
        query: Box::new(query.into()),
    }))
}

// ---------------------------------------------------------------------------
// CASE
// ---------------------------------------------------------------------------

/// Searched CASE: `CASE WHEN cond THEN result ... END`.
///
/// ```
/// use symbo_sql::builder::*;
///
/// let expr = case()
///     .when(col("x").gt(lit(0)), lit("positive"))
///     .else_(lit("non-positive"))
///     .build()
///     .unwrap();
/// assert_eq!(
///     expr.to_sql().unwrap(),
///     "CASE WHEN x > 0 THEN 'positive' ELSE 'non-positive' END"
/// );
/// ```
pub fn case() -> CaseBuilder {
    CaseBuilder {
        operand: None,
        whens: Vec::new(),
        else_: None,
    }
}

/// Simple CASE: `CASE operand WHEN value THEN result ... END`.
pub fn case_of(operand: Expr) -> CaseBuilder {
    CaseBuilder {
        operand: Some(operand.0),
        whens: Vec::new(),
        else_: None,
    }
}

#[derive(Debug, Clone)]
pub struct CaseBuilder {
    operand: Option<Node>,
    whens: Vec<Node>,
    else_: Option<Node>,
}

impl CaseBuilder {
    pub fn when(mut self, condition: Expr, result: Expr) -> Self {
        self.whens.push(Node::from(WhenClause {
            condition: Box::new(condition.0),
            result: Box::new(result.0),
        }));
        self
    }

    pub fn else_(mut self, result: Expr) -> Self {
        self.else_ = Some(result.0);
        self
    }

    /// Fails when no WHEN branch was added.
    pub fn build(self) -> Result<Expr> {
        require_non_empty("case", &self.whens, "CASE needs at least one WHEN")?;
        Ok(Expr(Node::from(Case {
            operand: self.operand.map(Box::new),
            whens: self.whens,
            else_result: self.else_.map(Box::new),
        })))
    }
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// A FLOAT64 literal; NaN and infinities are rejected.
pub fn float(value: f64) -> Result<Expr> {
    if !value.is_finite() {
        return Err(Error::validation("float", value, "must be finite"));
    }
    Ok(Expr(Node::from(FloatLiteral { value })))
}

/// An INT64 literal from text, decimal or `0x` hexadecimal.
///
/// ```
/// use symbo_sql::builder::integer;
///
/// assert_eq!(integer("0xFF").unwrap().to_sql().unwrap(), "0xFF");
/// assert!(integer("9223372036854775808").is_err());
/// ```
pub fn integer(text: &str) -> Result<Expr> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let hex_digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"));
    let parsed = match hex_digits {
        Some(hex) if !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()) => {
            i128::from_str_radix(hex, 16).ok()
        }
        Some(_) => None,
        None if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            digits.parse::<i128>().ok()
        }
        None => None,
    };
    let value = parsed
        .map(|v| if negative { -v } else { v })
        .and_then(|v| i64::try_from(v).ok())
        .ok_or_else(|| Error::validation("integer", text, "must be an INT64 value"))?;
    Ok(Expr(Node::from(IntegerLiteral {
        value,
        hex: hex_digits.is_some(),
    })))
}

/// `r'...'`. The text is printed verbatim, so it cannot contain a quote.
pub fn raw_string(value: &str) -> Result<Expr> {
    raw_string_quoted(value, QuoteStyle::Single)
}

/// Raw string with an explicit delimiter, e.g. `r"""..."""`.
pub fn raw_string_quoted(value: &str, quote: QuoteStyle) -> Result<Expr> {
    let delimiter = quote.delimiter();
    if value.contains(delimiter) || value.ends_with(&delimiter[..1]) || value.ends_with('\\') {
        return Err(Error::validation(
            "raw_string",
            value,
            format!("raw strings cannot contain their own {delimiter} delimiter"),
        ));
    }
    Ok(Expr(Node::from(StringLiteral {
        value: value.to_string(),
        quote,
        raw: true,
    })))
}

/// `B'...'`
pub fn bytes(value: &str) -> Expr {
    Expr(Node::from(BytesLiteral {
        value: value.to_string(),
        quote: QuoteStyle::Single,
        raw: false,
    }))
}

fn check_decimal(field: &str, text: &str, max_int: usize, max_frac: usize) -> Result<String> {
    let trimmed = text.trim();
    let unsigned = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !digits_only(int_part)
        || !digits_only(frac_part)
    {
        return Err(Error::validation(field, text, "must be a decimal number"));
    }
    if int_part.trim_start_matches('0').len() > max_int {
        return Err(Error::validation(
            field,
            text,
            format!("at most {max_int} integer digits"),
        ));
    }
    if frac_part.len() > max_frac {
        return Err(Error::validation(
            field,
            text,
            format!("at most {max_frac} fractional digits"),
        ));
    }
    Ok(trimmed.to_string())
}

/// `NUMERIC '...'`: up to 29 integer and 9 fractional digits.
pub fn numeric(text: &str) -> Result<Expr> {
    let value = check_decimal("numeric", text, 29, 9)?;
    Ok(Expr(Node::from(NumericLiteral { value })))
}

/// `BIGNUMERIC '...'`: up to 38 integer and 38 fractional digits.
pub fn bignumeric(text: &str) -> Result<Expr> {
    let value = check_decimal("bignumeric", text, 38, 38)?;
    Ok(Expr(Node::from(BigNumericLiteral { value })))
}

fn parse_fixed(text: &str, width: usize, min: u32, max: u32) -> Option<u32> {
    if text.len() != width || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: u32 = text.parse().ok()?;
    (min..=max).contains(&value).then_some(value)
}

fn is_leap_year(year: u32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// `YYYY-MM-DD` naming a real calendar day.
fn valid_date(text: &str) -> bool {
    let parts: Vec<&str> = text.split('-').collect();
    let [y, m, d] = parts.as_slice() else {
        return false;
    };
    let (Some(year), Some(month)) = (parse_fixed(y, 4, 1, 9999), parse_fixed(m, 2, 1, 12)) else {
        return false;
    };
    let days = match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    };
    parse_fixed(d, 2, 1, days).is_some()
}

/// `HH:MM:SS[.ffffff]`
fn valid_time(text: &str) -> bool {
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };
    if let Some(fraction) = fraction {
        if fraction.is_empty() || fraction.len() > 6 || !fraction.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }
    let parts: Vec<&str> = clock.split(':').collect();
    let [h, m, s] = parts.as_slice() else {
        return false;
    };
    parse_fixed(h, 2, 0, 23).is_some()
        && parse_fixed(m, 2, 0, 59).is_some()
        && parse_fixed(s, 2, 0, 59).is_some()
}

/// `date[( |T)time]`
fn valid_datetime(text: &str) -> bool {
    if text.len() == 10 {
        return valid_date(text);
    }
    match (text.get(..10), text.get(10..11), text.get(11..)) {
        (Some(date), Some(sep), Some(time)) => {
            (sep == " " || sep == "T") && valid_date(date) && valid_time(time)
        }
        _ => false,
    }
}

fn valid_utc_offset(offset: &str) -> bool {
    let (hours, minutes) = offset.split_once(':').unwrap_or((offset, "00"));
    let hours_ok = (1..=2).contains(&hours.len())
        && hours.chars().all(|c| c.is_ascii_digit())
        && hours.parse::<u32>().is_ok_and(|h| h <= 14);
    hours_ok && parse_fixed(minutes, 2, 0, 59).is_some()
}

/// Drop a trailing `Z` or `+HH[:MM]` / `-HH[:MM]` from a datetime.
fn strip_utc_offset(datetime: &str) -> &str {
    if datetime.len() <= 10 {
        return datetime;
    }
    if let Some(rest) = datetime.strip_suffix('Z') {
        return rest;
    }
    let Some(time) = datetime.get(11..) else {
        return datetime;
    };
    match time.rfind(|c| c == '+' || c == '-') {
        Some(at) if valid_utc_offset(&time[at + 1..]) => &datetime[..11 + at],
        _ => datetime,
    }
}

fn valid_zone_name(zone: &str) -> bool {
    zone.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '+' | '-' | ':'))
}

/// Split TIMESTAMP text into the datetime part and an optional zone name.
fn split_timestamp(text: &str) -> Option<(String, Option<String>)> {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    let zone = match tokens.last() {
        Some(last) if tokens.len() > 1 && last.starts_with(|c: char| c.is_ascii_alphabetic()) => {
            tokens.pop()
        }
        _ => None,
    };
    let datetime = tokens.join(" ");
    if !valid_datetime(strip_utc_offset(&datetime)) {
        return None;
    }
    if zone.is_some_and(|z| !valid_zone_name(z)) {
        return None;
    }
    Some((datetime, zone.map(str::to_string)))
}

/// `DATE 'YYYY-MM-DD'`
pub fn date(text: &str) -> Result<Expr> {
    if !valid_date(text) {
        return Err(Error::validation("date", text, "must be a valid YYYY-MM-DD date"));
    }
    Ok(Expr(Node::from(DateLiteral {
        value: text.to_string(),
    })))
}

/// `TIME 'HH:MM:SS[.ffffff]'`
pub fn time(text: &str) -> Result<Expr> {
    if !valid_time(text) {
        return Err(Error::validation("time", text, "must be HH:MM:SS[.ffffff]"));
    }
    Ok(Expr(Node::from(TimeLiteral {
        value: text.to_string(),
    })))
}

/// `DATETIME 'YYYY-MM-DD[ HH:MM:SS[.ffffff]]'`
pub fn datetime(text: &str) -> Result<Expr> {
    if !valid_datetime(text) {
        return Err(Error::validation("datetime", text, "must be a date and time"));
    }
    Ok(Expr(Node::from(DatetimeLiteral {
        value: text.to_string(),
    })))
}

/// `TIMESTAMP '...'`, with an optional UTC offset or trailing zone name.
///
/// ```
/// use symbo_sql::builder::timestamp;
///
/// let ts = timestamp("2024-01-01 10:00:00 America/Los_Angeles").unwrap();
/// assert_eq!(
///     ts.to_sql().unwrap(),
///     "TIMESTAMP '2024-01-01 10:00:00 America/Los_Angeles'"
/// );
/// assert!(timestamp("2024-02-30 10:00:00").is_err());
/// ```
pub fn timestamp(text: &str) -> Result<Expr> {
    let (value, time_zone) = split_timestamp(text).ok_or_else(|| {
        Error::validation("timestamp", text, "must be a datetime with an optional time zone")
    })?;
    Ok(Expr(Node::from(TimestampLiteral { value, time_zone })))
}

/// `INTERVAL value unit`
pub fn interval(value: i64, unit: IntervalUnit) -> Expr {
    Expr(Node::from(IntervalLiteral {
        value: Box::new(int(value)),
        unit,
        end_unit: None,
    }))
}

/// `INTERVAL 'text' start TO end`; `start` must be coarser than `end`.
///
/// ```
/// use symbo_sql::builder::interval_range;
/// use symbo_sql::expressions::IntervalUnit;
///
/// assert!(interval_range("1-2", IntervalUnit::Year, IntervalUnit::Month).is_ok());
/// assert!(interval_range("1-2", IntervalUnit::Month, IntervalUnit::Year).is_err());
/// ```
pub fn interval_range(text: &str, start: IntervalUnit, end: IntervalUnit) -> Result<Expr> {
    if !start.is_coarser_than(end) {
        return Err(Error::validation(
            "interval_range",
            format!("{} TO {}", start.as_str(), end.as_str()),
            "the starting unit must be coarser than the ending unit",
        ));
    }
    require_name("interval_range", text)?;
    Ok(Expr(Node::from(IntervalLiteral {
        value: Box::new(lit(text).0),
        unit: start,
        end_unit: Some(end),
    })))
}

/// `[e1, e2, ...]`
pub fn array(elements: impl IntoIterator<Item = Expr>) -> Expr {
    Expr(Node::from(ArrayLiteral {
        element_type: None,
        elements: nodes(elements),
    }))
}

/// `ARRAY<type>[e1, e2, ...]`
pub fn typed_array(element_type: Expr, elements: impl IntoIterator<Item = Expr>) -> Expr {
    Expr(Node::from(ArrayLiteral {
        element_type: Some(Box::new(element_type.0)),
        elements: nodes(elements),
    }))
}

fn struct_entries(fields: impl IntoIterator<Item = Expr>) -> Vec<Node> {
    fields
        .into_iter()
        .map(|field| match field.0 {
            Node::SelectItem(item) => Node::from(StructEntry {
                value: item.expr,
                name: item.alias,
            }),
            Node::StructEntry(entry) => Node::StructEntry(entry),
            other => Node::from(StructEntry {
                value: Box::new(other),
                name: None,
            }),
        })
        .collect()
}

/// `STRUCT(v1 AS a, v2, ...)`; name fields with [`Expr::alias`].
///
/// ```
/// use symbo_sql::builder::*;
///
/// let s = struct_([lit(1).alias("a"), lit("x")]);
/// assert_eq!(s.to_sql().unwrap(), "STRUCT(1 AS a, 'x')");
/// ```
pub fn struct_(fields: impl IntoIterator<Item = Expr>) -> Expr {
    Expr(Node::from(StructLiteral {
        struct_type: None,
        fields: struct_entries(fields),
    }))
}

/// `STRUCT<type>(...)`
pub fn typed_struct(struct_type: Expr, fields: impl IntoIterator<Item = Expr>) -> Expr {
    Expr(Node::from(StructLiteral {
        struct_type: Some(Box::new(struct_type.0)),
        fields: struct_entries(fields),
    }))
}

const MICROS_PER_DAY: i128 = 86_400_000_000;

/// Days since 1970-01-01 in the proleptic Gregorian calendar.
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let doy = (153 * ((month + 9) % 12) + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn date_micros(date: &str) -> Option<i128> {
    let mut parts = date.split('-').map(|p| p.parse::<i64>().ok());
    let (y, m, d) = (parts.next()??, parts.next()??, parts.next()??);
    Some(i128::from(days_from_civil(y, m, d)) * MICROS_PER_DAY)
}

fn time_micros(time: &str) -> Option<i128> {
    let (clock, fraction) = time.split_once('.').unwrap_or((time, ""));
    let mut seconds = 0i128;
    for part in clock.split(':') {
        seconds = seconds * 60 + part.parse::<i128>().ok()?;
    }
    let micros = format!("{fraction:0<6}").parse::<i128>().ok()?;
    Some(seconds * 1_000_000 + micros)
}

/// A missing time is midnight; `T` and space separate alike.
fn datetime_micros(text: &str) -> Option<i128> {
    let day = date_micros(text.get(..10)?)?;
    match text.get(11..) {
        Some(time) if !time.is_empty() => Some(day + time_micros(time)?),
        _ => Some(day),
    }
}

/// `Z`, `+HH[:MM]` or `-HH[:MM]`
fn offset_micros(suffix: &str) -> Option<i128> {
    if suffix.is_empty() || suffix == "Z" {
        return Some(0);
    }
    let sign = match suffix.get(..1)? {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let rest = suffix.get(1..)?;
    let (hours, minutes) = rest.split_once(':').unwrap_or((rest, "00"));
    let minutes = hours.parse::<i128>().ok()? * 60 + minutes.parse::<i128>().ok()?;
    Some(sign * minutes * 60_000_000)
}

/// Position of a validated range bound on a common timeline, in microseconds.
/// TIMESTAMP bounds are normalised to UTC; a named zone other than UTC has
/// no fixed offset and yields `None`.
fn bound_instant(element: TypeName, text: &str) -> Option<i128> {
    match element {
        TypeName::Date => date_micros(text),
        TypeName::Datetime => datetime_micros(text),
        TypeName::Timestamp => {
            let (datetime, zone) = split_timestamp(text)?;
            if zone.is_some_and(|z| !z.eq_ignore_ascii_case("UTC")) {
                return None;
            }
            let local = strip_utc_offset(&datetime);
            let offset = offset_micros(&datetime[local.len()..])?;
            Some(datetime_micros(local)? - offset)
        }
        _ => None,
    }
}

/// `RANGE<type> '[lower, upper)'`; `None` bounds are unbounded.
pub fn range(element: TypeName, lower: Option<&str>, upper: Option<&str>) -> Result<Expr> {
    let check: fn(&str) -> bool = match element {
        TypeName::Date => valid_date,
        TypeName::Datetime => valid_datetime,
        TypeName::Timestamp => |t: &str| split_timestamp(t).is_some(),
        other => {
            return Err(Error::validation(
                "range",
                other.as_str(),
                "element type must be DATE, DATETIME or TIMESTAMP",
            ))
        }
    };
    for bound in [lower, upper].into_iter().flatten() {
        if !check(bound) {
            return Err(Error::validation(
                "range",
                bound,
                format!("not a valid {} bound", element.as_str()),
            ));
        }
    }
    if let (Some(lo), Some(hi)) = (lower, upper) {
        // A named zone other than UTC leaves the order to the engine.
        let ordered = match (bound_instant(element, lo), bound_instant(element, hi)) {
            (Some(lo_at), Some(hi_at)) => lo_at < hi_at,
            _ => true,
        };
        if !ordered {
            return Err(Error::validation(
                "range",
                format!("[{lo}, {hi})"),
                "lower bound must be before upper bound",
            ));
        }
    }
    Ok(Expr(Node::from(RangeLiteral {
        element_type: Box::new(Node::from(SimpleType {
            name: element,
            params: Vec::new(),
        })),
        lower: lower.map(str::to_string),
        upper: upper.map(str::to_string),
    })))
}

/// `JSON '...'`; the text must parse as JSON.
pub fn json(text: &str) -> Result<Expr> {
    serde_json::from_str::<serde_json::Value>(text)
        .map_err(|e| Error::validation("json", text, format!("not valid JSON: {e}")))?;
    Ok(Expr(Node::from(JsonLiteral {
        value: text.to_string(),
    })))
}

const WKT_TAGS: &[&str] = &[
    "GEOMETRYCOLLECTION",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "MULTIPOINT",
    "LINESTRING",
    "POLYGON",
    "POINT",
];

/// A geography from well-known text, e.g. `POINT(1 2)`.
pub fn geography(wkt: &str) -> Result<Expr> {
    let text = wkt.trim();
    let upper = text.to_ascii_uppercase();
    let body = WKT_TAGS
        .iter()
        .find(|tag| upper.starts_with(**tag))
        .map(|tag| upper[tag.len()..].trim_start());
    let mut depth: i32 = 0;
    let balanced = upper.chars().all(|c| {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
        depth >= 0
    }) && depth == 0;
    match body {
        Some(rest) if balanced && (rest.starts_with('(') || rest == "EMPTY") => {
            Ok(Expr(Node::from(GeographyLiteral {
                wkt: text.to_string(),
            })))
        }
        _ => Err(Error::validation("geography", wkt, "must be WKT geometry text")),
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A scalar type by name, e.g. `data_type("INT64")`.
pub fn data_type(name: &str) -> Result<Expr> {
    sized_type(name, &[])
}

/// A parameterized scalar type, e.g. `sized_type("NUMERIC", &[10, 2])`.
pub fn sized_type(name: &str, params: &[u32]) -> Result<Expr> {
    let type_name = TypeName::from_name(name)
        .ok_or_else(|| Error::validation("data_type", name, "unknown type name"))?;
    let bad = |rule: &str| {
        Error::validation(
            "type_parameters",
            format!("{}{:?}", type_name.as_str(), params),
            rule,
        )
    };
    match (type_name, params) {
        (_, []) => {}
        (TypeName::String | TypeName::Bytes, [len]) => {
            if *len == 0 {
                return Err(bad("length must be positive"));
            }
        }
        (TypeName::Numeric, [precision, rest @ ..]) if rest.len() <= 1 => {
            let scale = rest.first().copied().unwrap_or(0);
            if !(1..=38).contains(precision) || scale > 9 || scale > *precision {
                return Err(bad("NUMERIC takes precision 1..=38 and scale 0..=9"));
            }
        }
        (TypeName::BigNumeric, [precision, rest @ ..]) if rest.len() <= 1 => {
            let scale = rest.first().copied().unwrap_or(0);
            if !(1..=76).contains(precision) || scale > 38 || scale > *precision {
                return Err(bad("BIGNUMERIC takes precision 1..=76 and scale 0..=38"));
            }
        }
        _ => return Err(bad("this type takes no such parameters")),
    }
    Ok(Expr(Node::from(SimpleType {
        name: type_name,
        params: params.to_vec(),
    })))
}

pub fn array_of(element: Expr) -> Expr {
    Expr(Node::from(ArrayType {
        element: Box::new(element.0),
    }))
}

/// `STRUCT<name type, ...>`; unnamed fields pass `None`.
pub fn struct_of<'a>(fields: impl IntoIterator<Item = (Option<&'a str>, Expr)>) -> Result<Expr> {
    let fields: Vec<(Option<&str>, Expr)> = fields.into_iter().collect();
    require_non_empty("struct_type", &fields, "STRUCT needs at least one field")?;
    require_unique("struct_type", fields.iter().filter_map(|(name, _)| *name))?;
    Ok(Expr(Node::from(StructType {
        fields: fields
            .into_iter()
            .map(|(name, ty)| {
                Node::from(StructTypeField {
                    name: name.map(str::to_string),
                    field_type: Box::new(ty.0),
                })
            })
            .collect(),
    })))
}

pub fn range_of(element: TypeName) -> Result<Expr> {
    if !matches!(element, TypeName::Date | TypeName::Datetime | TypeName::Timestamp) {
        return Err(Error::validation(
            "range_type",
            element.as_str(),
            "element type must be DATE, DATETIME or TIMESTAMP",
        ));
    }
    Ok(Expr(Node::from(RangeType {
        element: Box::new(Node::from(SimpleType {
            name: element,
            params: Vec::new(),
        })),
    })))
}

// ---------------------------------------------------------------------------
// FROM sources
// ---------------------------------------------------------------------------

/// Table reference from a dotted path: `t`, `dataset.t` or `project.dataset.t`.
///
/// Parts are not checked; use [`table_ref`] for a validated reference.
pub fn table(name: &str) -> Expr {
    Expr(Node::from(TableRef::new(split_table_name(name))))
}

/// Validated table reference; no part of the path may be empty.
pub fn table_ref(name: &str) -> Result<Expr> {
    Ok(Expr(Node::from(TableRef::new(checked_table_name("table", name)?))))
}

/// A bare table/object name, as used by DDL statements.
pub fn table_name(name: &str) -> Result<Expr> {
    Ok(Expr(Node::from(checked_table_name("table_name", name)?)))
}

/// `UNNEST(array)`
pub fn unnest(array: Expr) -> Expr {
    Expr(Node::from(Unnest {
        array: Box::new(array.0),
        alias: None,
        with_offset: false,
        offset_alias: None,
    }))
}

/// `UNNEST(array) AS alias WITH OFFSET [AS offset_alias]`
pub fn unnest_with_offset(array: Expr, alias: &str, offset_alias: Option<&str>) -> Result<Expr> {
    require_name("unnest_alias", alias)?;
    Ok(Expr(Node::from(Unnest {
        array: Box::new(array.0),
        alias: Some(alias.to_string()),
        with_offset: true,
        offset_alias: offset_alias.map(str::to_string),
    })))
}

/// `(query) AS alias` in a FROM clause.
pub fn subquery_table(query: impl Into<Node>, alias: Option<&str>) -> Expr {
    Expr(Node::from(SubqueryTable {
        query: Box::new(query.into()),
        alias: alias.map(str::to_string),
    }))
}

/// A table-valued function call in a FROM clause.
pub fn table_function(name: &str, args: impl IntoIterator<Item = Expr>) -> Result<Expr> {
    require_name("table_function", name)?;
    Ok(Expr(Node::from(TableFunction {
        name: name.to_string(),
        args: nodes(args),
        alias: None,
    })))
}

/// `ML.PREDICT(MODEL name, TABLE t | (query), STRUCT(...))` and friends.
///
/// `settings`, when given, must be a STRUCT literal.
pub fn ml_function(
    function: MlFunctionKind,
    model: &str,
    input: Option<Node>,
    settings: Option<Expr>,
) -> Result<Expr> {
    let model = checked_table_name("model", model)?;
    if let Some(settings) = &settings {
        if !settings.0.is(NodeKind::StructLiteral) {
            return Err(Error::validation(
                "ml_settings",
                settings.0.kind(),
                "settings must be a STRUCT literal",
            ));
        }
    }
    Ok(Expr(Node::from(MlFunction {
        function,
        model: Box::new(Node::from(model)),
        input: input.map(Box::new),
        settings: settings.map(|s| Box::new(s.0)),
        alias: None,
    })))
}

/// `TABLESAMPLE SYSTEM (n PERCENT)` or `(n ROWS)`; exactly one must be given.
pub fn tablesample(percent: Option<f64>, rows: Option<u64>) -> Result<Expr> {
    let size = match (percent, rows) {
        (Some(p), None) => {
            if !(0.0..=100.0).contains(&p) {
                return Err(Error::validation("tablesample", p, "percent must be within 0..=100"));
            }
            SampleSize::Percent(p)
        }
        (None, Some(n)) => SampleSize::Rows(n),
        _ => {
            return Err(Error::validation(
                "tablesample",
                format!("percent={percent:?}, rows={rows:?}"),
                "exactly one of percent or rows is required",
            ))
        }
    };
    Ok(Expr(Node::from(TableSample { size })))
}

/// `source PIVOT (aggregates FOR pivot_column IN (values))`
pub fn pivot(
    source: Expr,
    aggregates: impl IntoIterator<Item = Expr>,
    pivot_column: Expr,
    values: impl IntoIterator<Item = Expr>,
) -> Result<Expr> {
    let aggregates = nodes(aggregates);
    let values = nodes(values);
    require_non_empty("pivot_aggregates", &aggregates, "PIVOT needs at least one aggregate")?;
    require_non_empty("pivot_values", &values, "PIVOT needs at least one value")?;
    Ok(Expr(Node::from(Pivot {
        source: Box::new(source.0),
        aggregates,
        pivot_column: Box::new(pivot_column.0),
        values,
        alias: None,
    })))
}

/// `source UNPIVOT [INCLUDE NULLS] (value_column FOR name_column IN (columns))`
pub fn unpivot(
    source: Expr,
    value_column: &str,
    name_column: &str,
    columns: impl IntoIterator<Item = Expr>,
    include_nulls: bool,
) -> Result<Expr> {
    require_name("unpivot_value_column", value_column)?;
    require_name("unpivot_name_column", name_column)?;
    let columns = nodes(columns);
    require_non_empty("unpivot_columns", &columns, "UNPIVOT needs at least one column")?;
    Ok(Expr(Node::from(Unpivot {
        source: Box::new(source.0),
        include_nulls,
        value_column: value_column.to_string(),
        name_column: name_column.to_string(),
        columns,
        alias: None,
    })))
}

// ---------------------------------------------------------------------------
// Grouping, WITH, OPTIONS
// ---------------------------------------------------------------------------

/// `GROUP BY n`, a 1-based select-list position.
pub fn group_by_position(position: i64) -> Result<Expr> {
    if position < 1 {
        return Err(Error::validation("group_by_position", position, "must be >= 1"));
    }
    Ok(Expr(int(position)))
}

/// `ROLLUP(a, b, ...)`
pub fn rollup<I, E>(exprs: I) -> Result<Expr>
where
    I: IntoIterator<Item = E>,
    E: IntoExpr,
{
    let exprs = nodes(exprs);
    require_non_empty("rollup", &exprs, "ROLLUP requires at least one expression")?;
    Ok(Expr(Node::from(Rollup { exprs })))
}

/// `CUBE(a, b, ...)`
pub fn cube<I, E>(exprs: I) -> Result<Expr>
where
    I: IntoIterator<Item = E>,
    E: IntoExpr,
{
    let exprs = nodes(exprs);
    require_non_empty("cube", &exprs, "CUBE requires at least one expression")?;
    Ok(Expr(Node::from(Cube { exprs })))
}

/// `GROUPING SETS ((a, b), (a), ())`; an empty inner set is the grand total.
pub fn grouping_sets(sets: impl IntoIterator<Item = Vec<Expr>>) -> Result<Expr> {
    let sets: Vec<Node> = sets
        .into_iter()
        .map(|set| Node::from(GroupingSet { exprs: nodes(set) }))
        .collect();
    require_non_empty("grouping_sets", &sets, "GROUPING SETS requires at least one set")?;
    Ok(Expr(Node::from(GroupingSets { sets })))
}

/// `name AS (query)`
pub fn cte(name: &str, query: impl Into<Node>) -> Result<Expr> {
    require_name("cte", name)?;
    Ok(Expr(Node::from(Cte {
        name: name.to_string(),
        query: Box::new(query.into()),
    })))
}

/// `WITH [RECURSIVE] cte, ...`; needs at least one CTE with unique names.
pub fn with_(ctes: impl IntoIterator<Item = Expr>, recursive: bool) -> Result<Expr> {
    let ctes = nodes(ctes);
    require_non_empty("with", &ctes, "WITH needs at least one CTE")?;
    if let Some(other) = ctes.iter().find(|n| !n.is(NodeKind::Cte)) {
        return Err(Error::validation("with", other.kind(), "expected a CTE"));
    }
    require_unique("with", ctes.iter().filter_map(Node::name))?;
    Ok(Expr(Node::from(WithClause { recursive, ctes })))
}

/// `OPTIONS(name = value, ...)`; names are plain and unique, order is kept.
///
/// ```
/// use symbo_sql::builder::*;
///
/// let opts = options([("description", lit("daily")), ("labels", array([lit("x")]))]).unwrap();
/// assert_eq!(opts.to_sql().unwrap(), "OPTIONS(description = 'daily', labels = ['x'])");
/// assert!(options([("a", lit(1)), ("A", lit(2))]).is_err());
/// ```
pub fn options<'a>(entries: impl IntoIterator<Item = (&'a str, Expr)>) -> Result<Expr> {
    let entries: Vec<(&str, Expr)> = entries.into_iter().collect();
    for (name, _) in &entries {
        if !is_safe_identifier_name(name) {
            return Err(Error::validation("options", name, "option names must be plain names"));
        }
    }
    require_unique("options", entries.iter().map(|(name, _)| *name))?;
    Ok(Expr(Node::from(OptionsClause {
        entries: entries
            .into_iter()
            .map(|(name, value)| {
                Node::from(OptionEntry {
                    name: name.to_string(),
                    value: Box::new(value.0),
                })
            })
            .collect(),
    })))
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// Start an inline window specification for [`Expr::over`].
pub fn window() -> WindowBuilder {
    WindowBuilder {
        spec: WindowSpec::default(),
    }
}

#[derive(Debug, Clone)]
pub struct WindowBuilder {
    spec: WindowSpec,
}

impl WindowBuilder {
    /// Extend a named window: `OVER (name ORDER BY ...)`.
    pub fn base(mut self, name: &str) -> Self {
        self.spec.base = Some(name.to_string());
        self
    }

    pub fn partition_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        self.spec.partition_by.extend(nodes(exprs));
        self
    }

    pub fn order_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        self.spec
            .order_by
            .extend(nodes(exprs).into_iter().map(order_item));
        self
    }

    /// Attach a frame built by [`window_frame`].
    pub fn frame(mut self, frame: Expr) -> Self {
        self.spec.frame = Some(Box::new(frame.0));
        self
    }

    pub fn build(self) -> Node {
        Node::from(self.spec)
    }
}

fn bound(kind: BoundKind, offset: Option<u32>) -> Expr {
    Expr(Node::from(WindowBound {
        kind,
        offset: offset.map(|n| Box::new(int(i64::from(n)))),
    }))
}

pub fn unbounded_preceding() -> Expr {
    bound(BoundKind::UnboundedPreceding, None)
}

pub fn preceding(offset: u32) -> Expr {
    bound(BoundKind::Preceding, Some(offset))
}

pub fn current_row() -> Expr {
    bound(BoundKind::CurrentRow, None)
}

pub fn following(offset: u32) -> Expr {
    bound(BoundKind::Following, Some(offset))
}

pub fn unbounded_following() -> Expr {
    bound(BoundKind::UnboundedFollowing, None)
}

fn bound_parts(bound: &Expr) -> Result<(BoundKind, Option<i64>)> {
    match &bound.0 {
        Node::WindowBound(b) => {
            let offset = match b.offset.as_deref() {
                Some(Node::IntegerLiteral(n)) => Some(n.value),
                _ => None,
            };
            Ok((b.kind, offset))
        }
        other => Err(Error::validation("window_frame", other.kind(), "expected a frame bound")),
    }
}

/// `ROWS|RANGE start` or `ROWS|RANGE BETWEEN start AND end`.
///
/// The start may not come after the end. Without an end the start must be
/// a preceding bound or `CURRENT ROW`.
///
/// ```
/// use symbo_sql::builder::*;
/// use symbo_sql::expressions::FrameUnit;
///
/// assert!(window_frame(FrameUnit::Rows, preceding(2), Some(current_row())).is_ok());
/// assert!(window_frame(FrameUnit::Rows, following(1), Some(preceding(1))).is_err());
/// assert!(window_frame(FrameUnit::Rows, preceding(1), Some(preceding(3))).is_err());
/// ```
pub fn window_frame(unit: FrameUnit, start: Expr, end: Option<Expr>) -> Result<Expr> {
    let (start_kind, start_offset) = bound_parts(&start)?;
    let invalid = |rule: &str| Error::validation("window_frame", format!("{start_kind:?}"), rule);
    if start_kind == BoundKind::UnboundedFollowing {
        return Err(invalid("a frame cannot start at UNBOUNDED FOLLOWING"));
    }
    match &end {
        None => {
            if start_kind.ordinal() > BoundKind::CurrentRow.ordinal() {
                return Err(invalid("a frame without an end must start at or before CURRENT ROW"));
            }
        }
        Some(end) => {
            let (end_kind, end_offset) = bound_parts(end)?;
            if end_kind == BoundKind::UnboundedPreceding {
                return Err(invalid("a frame cannot end at UNBOUNDED PRECEDING"));
            }
            let ordered = match (start_kind, end_kind, start_offset, end_offset) {
                (BoundKind::Preceding, BoundKind::Preceding, Some(s), Some(e)) => s >= e,
                (BoundKind::Following, BoundKind::Following, Some(s), Some(e)) => s <= e,
                _ => start_kind.ordinal() <= end_kind.ordinal(),
            };
            if !ordered {
                return Err(invalid("the frame start must not come after its end"));
            }
        }
    }
    Ok(Expr(Node::from(WindowFrame {
        unit,
        start: Box::new(start.0),
        end: end.map(|e| Box::new(e.0)),
    })))
}

// ---------------------------------------------------------------------------
// SELECT
// ---------------------------------------------------------------------------

/// Start a `SELECT` with the given projections.
///
/// Aggregate the remaining clauses fluently; see [`SelectBuilder`].
pub fn select<I, E>(items: I) -> SelectBuilder
where
    I: IntoIterator<Item = E>,
    E: IntoExpr,
{
    let mut select = Select::new();
    select.select_list = nodes(items).into_iter().map(select_item).collect();
    SelectBuilder {
        select,
        sources: Vec::new(),
        offset: None,
    }
}

/// `SELECT DISTINCT ...`
pub fn select_distinct<I, E>(items: I) -> SelectBuilder
where
    I: IntoIterator<Item = E>,
    E: IntoExpr,
{
    select(items).distinct()
}

/// Fluent SELECT builder.
///
/// ```
/// use symbo_sql::builder::*;
///
/// let sql = select([col("dept"), count_star().alias("n")])
///     .from("emp")
///     .group_by([rollup(["dept"]).unwrap()])
///     .order_by([col("n").desc()])
///     .limit(10)
///     .to_sql()
///     .unwrap();
/// assert_eq!(
///     sql,
///     "SELECT dept, COUNT(*) AS n FROM emp GROUP BY ROLLUP(dept) ORDER BY n DESC LIMIT 10"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    select: Select,
    sources: Vec<Node>,
    offset: Option<Node>,
}

impl SelectBuilder {
    /// Add a table to FROM; a second call adds a comma-separated source.
    pub fn from(mut self, table_name: &str) -> Self {
        self.sources.push(table(table_name).0);
        self
    }

    /// Add any FROM source: a table, UNNEST, subquery, PIVOT, ...
    pub fn from_source(mut self, source: Expr) -> Self {
        self.sources.push(source.0);
        self
    }

    fn push_join(mut self, kind: JoinKind, right: Node, on: Option<Node>, using: Vec<String>) -> Self {
        let joined = match self.sources.pop() {
            Some(left) => Node::from(Join {
                kind,
                left: Box::new(left),
                right: Box::new(right),
                on: on.map(Box::new),
                using,
            }),
            None => right,
        };
        self.sources.push(joined);
        self
    }

    /// `JOIN table ON condition`
    pub fn join(self, table_name: &str, on: Expr) -> Self {
        self.push_join(JoinKind::Inner, table(table_name).0, Some(on.0), Vec::new())
    }

    /// `LEFT JOIN table ON condition`
    pub fn left_join(self, table_name: &str, on: Expr) -> Self {
        self.push_join(JoinKind::Left, table(table_name).0, Some(on.0), Vec::new())
    }

    /// `RIGHT JOIN table ON condition`
    pub fn right_join(self, table_name: &str, on: Expr) -> Self {
        self.push_join(JoinKind::Right, table(table_name).0, Some(on.0), Vec::new())
    }

    /// `FULL JOIN table ON condition`
    pub fn full_join(self, table_name: &str, on: Expr) -> Self {
        self.push_join(JoinKind::Full, table(table_name).0, Some(on.0), Vec::new())
    }

    /// `CROSS JOIN source`
    pub fn cross_join(self, source: Expr) -> Self {
        self.push_join(JoinKind::Cross, source.0, None, Vec::new())
    }

    /// `JOIN table USING (columns)`
    pub fn join_using(self, table_name: &str, columns: &[&str]) -> Self {
        let using = columns.iter().map(|c| c.to_string()).collect();
        self.push_join(JoinKind::Inner, table(table_name).0, None, using)
    }

    /// Join an arbitrary source with an optional ON condition.
    pub fn join_source(self, kind: JoinKind, source: Expr, on: Option<Expr>) -> Self {
        self.push_join(kind, source.0, on.map(|e| e.0), Vec::new())
    }

    /// WHERE; repeated calls are AND-ed together.
    pub fn where_(mut self, condition: Expr) -> Self {
        self.select.where_clause = and_together(self.select.where_clause.take(), condition.0);
        self
    }

    pub fn group_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        let items = nodes(exprs);
        match self.select.group_by.as_deref_mut() {
            Some(Node::GroupByClause(group)) => group.items.extend(items),
            _ => {
                self.select.group_by = Some(Box::new(Node::from(GroupByClause {
                    all: false,
                    items,
                })))
            }
        }
        self
    }

    /// `GROUP BY ALL`
    pub fn group_by_all(mut self) -> Self {
        self.select.group_by = Some(Box::new(Node::from(GroupByClause {
            all: true,
            items: Vec::new(),
        })));
        self
    }

    /// HAVING; repeated calls are AND-ed together.
    pub fn having(mut self, condition: Expr) -> Self {
        self.select.having = and_together(self.select.having.take(), condition.0);
        self
    }

    /// QUALIFY; repeated calls are AND-ed together.
    pub fn qualify(mut self, condition: Expr) -> Self {
        self.select.qualify = and_together(self.select.qualify.take(), condition.0);
        self
    }

    /// `WINDOW name AS (spec)`
    pub fn window(mut self, name: &str, spec: WindowBuilder) -> Self {
        self.select.windows.push(Node::from(NamedWindow {
            name: name.to_string(),
            spec: Box::new(spec.build()),
        }));
        self
    }

    pub fn order_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        self.select
            .order_by
            .extend(nodes(exprs).into_iter().map(order_item));
        self
    }

    pub fn limit(mut self, count: u32) -> Self {
        self.select.limit = Some(Box::new(Node::from(LimitClause {
            count: Box::new(int(i64::from(count))),
            offset: None,
        })));
        self
    }

    /// `OFFSET n`; printed only together with [`limit`](Self::limit).
    pub fn offset(mut self, count: u32) -> Self {
        self.offset = Some(int(i64::from(count)));
        self
    }

    pub fn distinct(mut self) -> Self {
        self.select.distinct = true;
        self
    }

    /// Attach a WITH clause built by [`with_`].
    pub fn with(mut self, with_clause: Expr) -> Self {
        self.select.with = Some(Box::new(with_clause.0));
        self
    }

    pub fn union_all(self, other: impl Into<Node>) -> SetOpBuilder {
        SetOpBuilder::new(SetOperator::Union, SetQuantifier::All, self.build(), other.into())
    }

    pub fn union_distinct(self, other: impl Into<Node>) -> SetOpBuilder {
        SetOpBuilder::new(SetOperator::Union, SetQuantifier::Distinct, self.build(), other.into())
    }

    pub fn intersect_distinct(self, other: impl Into<Node>) -> SetOpBuilder {
        SetOpBuilder::new(SetOperator::Intersect, SetQuantifier::Distinct, self.build(), other.into())
    }

    pub fn except_distinct(self, other: impl Into<Node>) -> SetOpBuilder {
        SetOpBuilder::new(SetOperator::Except, SetQuantifier::Distinct, self.build(), other.into())
    }

    pub fn build(mut self) -> Node {
        if !self.sources.is_empty() {
            self.select.from = Some(Box::new(Node::from(FromClause {
                sources: self.sources,
            })));
        }
        if let (Some(Node::LimitClause(limit)), Some(offset)) =
            (self.select.limit.as_deref_mut(), self.offset)
        {
            limit.offset = Some(Box::new(offset));
        }
        Node::from(self.select)
    }

    pub fn to_sql(&self) -> Result<String> {
        Generator::sql(&self.clone().build())
    }
}

impl From<SelectBuilder> for Node {
    fn from(builder: SelectBuilder) -> Node {
        builder.build()
    }
}

// ---------------------------------------------------------------------------
// Set operations
// ---------------------------------------------------------------------------

/// Builder for UNION / INTERSECT / EXCEPT with trailing ORDER BY and LIMIT.
#[derive(Debug, Clone)]
pub struct SetOpBuilder {
    operation: SetOperation,
    offset: Option<Node>,
}

impl SetOpBuilder {
    fn new(op: SetOperator, quantifier: SetQuantifier, left: Node, right: Node) -> Self {
        SetOpBuilder {
            operation: SetOperation {
                op,
                quantifier,
                left: Box::new(left),
                right: Box::new(right),
                order_by: Vec::new(),
                limit: None,
            },
            offset: None,
        }
    }

    pub fn union_all(self, other: impl Into<Node>) -> SetOpBuilder {
        SetOpBuilder::new(SetOperator::Union, SetQuantifier::All, self.build(), other.into())
    }

    pub fn union_distinct(self, other: impl Into<Node>) -> SetOpBuilder {
        SetOpBuilder::new(SetOperator::Union, SetQuantifier::Distinct, self.build(), other.into())
    }

    pub fn intersect_distinct(self, other: impl Into<Node>) -> SetOpBuilder {
        SetOpBuilder::new(SetOperator::Intersect, SetQuantifier::Distinct, self.build(), other.into())
    }

    pub fn except_distinct(self, other: impl Into<Node>) -> SetOpBuilder {
        SetOpBuilder::new(SetOperator::Except, SetQuantifier::Distinct, self.build(), other.into())
    }

    pub fn order_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        self.operation
            .order_by
            .extend(nodes(exprs).into_iter().map(order_item));
        self
    }

    pub fn limit(mut self, count: u32) -> Self {
        self.operation.limit = Some(Box::new(Node::from(LimitClause {
            count: Box::new(int(i64::from(count))),
            offset: None,
        })));
        self
    }

    pub fn offset(mut self, count: u32) -> Self {
        self.offset = Some(int(i64::from(count)));
        self
    }

    pub fn build(mut self) -> Node {
        if let (Some(Node::LimitClause(limit)), Some(offset)) =
            (self.operation.limit.as_deref_mut(), self.offset)
        {
            limit.offset = Some(Box::new(offset));
        }
        Node::from(self.operation)
    }

    pub fn to_sql(&self) -> Result<String> {
        Generator::sql(&self.clone().build())
    }
}

impl From<SetOpBuilder> for Node {
    fn from(builder: SetOpBuilder) -> Node {
        builder.build()
    }
}

// ---------------------------------------------------------------------------
// DML
// ---------------------------------------------------------------------------

/// `INSERT INTO table [(columns)] VALUES ... | query`
pub fn insert_into(table_name: &str) -> InsertBuilder {
    InsertBuilder {
        table: table_name.to_string(),
        columns: Vec::new(),
        rows: Vec::new(),
        query: None,
    }
}

#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
    rows: Vec<Vec<Node>>,
    query: Option<Node>,
}

impl InsertBuilder {
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Append one `VALUES` row.
    pub fn values(mut self, row: impl IntoIterator<Item = Expr>) -> Self {
        self.rows.push(nodes(row));
        self
    }

    /// Insert the result of a query instead of literal rows.
    pub fn query(mut self, query: impl Into<Node>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Checks that exactly one of rows or query is present and that every
    /// row has the column count.
    pub fn build(self) -> Result<Node> {
        let table = checked_table_name("insert_table", &self.table)?;
        if !self.columns.is_empty() {
            require_unique("insert_columns", self.columns.iter().map(String::as_str))?;
        }
        match (self.rows.is_empty(), &self.query) {
            (true, None) => {
                return Err(Error::validation(
                    "insert",
                    &self.table,
                    "INSERT needs VALUES rows or a query",
                ))
            }
            (false, Some(_)) => {
                return Err(Error::validation(
                    "insert",
                    &self.table,
                    "INSERT takes VALUES rows or a query, not both",
                ))
            }
            _ => {}
        }
        let width = if self.columns.is_empty() {
            self.rows.first().map_or(0, Vec::len)
        } else {
            self.columns.len()
        };
        for row in &self.rows {
            if row.is_empty() || row.len() != width {
                return Err(Error::validation(
                    "insert_values",
                    row.len(),
                    format!("every row must have {width} values"),
                ));
            }
        }
        Ok(Node::from(Insert {
            table: Box::new(Node::from(table)),
            columns: self.columns,
            rows: self
                .rows
                .into_iter()
                .map(|values| Node::from(ValuesRow { values }))
                .collect(),
            query: self.query.map(Box::new),
        }))
    }
}

/// `UPDATE table SET ... [FROM ...] WHERE ...`
pub fn update(table_name: &str) -> UpdateBuilder {
    UpdateBuilder {
        table: table(table_name).0,
        assignments: Vec::new(),
        from: Vec::new(),
        where_clause: None,
    }
}

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: Node,
    assignments: Vec<Node>,
    from: Vec<Node>,
    where_clause: Option<Box<Node>>,
}

impl UpdateBuilder {
    /// Alias the target table.
    pub fn alias(mut self, alias: &str) -> Self {
        self.table = Expr(self.table).aliased(alias).0;
        self
    }

    pub fn set(mut self, column: &str, value: Expr) -> Self {
        self.assignments.extend(assignments([(column, value)]));
        self
    }

    pub fn from(mut self, source: Expr) -> Self {
        self.from.push(source.0);
        self
    }

    pub fn where_(mut self, condition: Expr) -> Self {
        self.where_clause = and_together(self.where_clause.take(), condition.0);
        self
    }

    /// Requires at least one assignment and a WHERE clause.
    pub fn build(self) -> Result<Node> {
        require_non_empty("update_set", &self.assignments, "UPDATE needs at least one assignment")?;
        if self.where_clause.is_none() {
            return Err(Error::validation("update_where", "none", "UPDATE requires a WHERE clause"));
        }
        Ok(Node::from(Update {
            table: Box::new(self.table),
            assignments: self.assignments,
            from: (!self.from.is_empty())
                .then(|| Box::new(Node::from(FromClause { sources: self.from }))),
            where_clause: self.where_clause,
        }))
    }
}

/// `DELETE FROM table WHERE ...`
pub fn delete(table_name: &str) -> DeleteBuilder {
    DeleteBuilder {
        table: table(table_name).0,
        where_clause: None,
    }
}

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: Node,
    where_clause: Option<Box<Node>>,
}

impl DeleteBuilder {
    pub fn alias(mut self, alias: &str) -> Self {
        self.table = Expr(self.table).aliased(alias).0;
        self
    }

    pub fn where_(mut self, condition: Expr) -> Self {
        self.where_clause = and_together(self.where_clause.take(), condition.0);
        self
    }

    /// Requires a WHERE clause; use `WHERE TRUE` to delete every row.
    pub fn build(self) -> Result<Node> {
        if self.where_clause.is_none() {
            return Err(Error::validation("delete_where", "none", "DELETE requires a WHERE clause"));
        }
        Ok(Node::from(Delete {
            table: Box::new(self.table),
            where_clause: self.where_clause,
        }))
    }
}

/// `MERGE target USING source ON condition WHEN ...`
///
/// ```
/// use symbo_sql::builder::*;
///
/// let stmt = merge(table("inventory").aliased("T"), table("new_arrivals").aliased("S"), col("T.product").eq(col("S.product")))
///     .when_matched_update(None, [("quantity", col("T.quantity").add(col("S.quantity")))])
///     .when_not_matched_insert(None, &["product", "quantity"], [col("product"), col("quantity")])
///     .build()
///     .unwrap();
/// assert!(symbo_sql::generator::Generator::sql(&stmt).unwrap().starts_with("MERGE inventory AS T"));
/// ```
pub fn merge(target: Expr, source: Expr, on: Expr) -> MergeBuilder {
    MergeBuilder {
        target: target.0,
        source: source.0,
        on: on.0,
        clauses: Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct MergeBuilder {
    target: Node,
    source: Node,
    on: Node,
    clauses: Vec<Node>,
}

impl MergeBuilder {
    fn when(mut self, matched: MergeMatch, condition: Option<Expr>, action: Node) -> Self {
        self.clauses.push(Node::from(MergeWhen {
            matched,
            condition: condition.map(|c| Box::new(c.0)),
            action: Box::new(action),
        }));
        self
    }

    pub fn when_matched_update<'a>(
        self,
        condition: Option<Expr>,
        set: impl IntoIterator<Item = (&'a str, Expr)>,
    ) -> Self {
        let action = Node::from(MergeUpdate {
            assignments: assignments(set),
        });
        self.when(MergeMatch::Matched, condition, action)
    }

    pub fn when_matched_delete(self, condition: Option<Expr>) -> Self {
        self.when(MergeMatch::Matched, condition, Node::from(MergeDelete))
    }

    pub fn when_not_matched_insert(
        self,
        condition: Option<Expr>,
        columns: &[&str],
        values: impl IntoIterator<Item = Expr>,
    ) -> Self {
        let action = Node::from(MergeInsert {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values: nodes(values),
            row: false,
        });
        self.when(MergeMatch::NotMatchedByTarget, condition, action)
    }

    /// `WHEN NOT MATCHED THEN INSERT ROW`
    pub fn when_not_matched_insert_row(self, condition: Option<Expr>) -> Self {
        let action = Node::from(MergeInsert {
            columns: Vec::new(),
            values: Vec::new(),
            row: true,
        });
        self.when(MergeMatch::NotMatchedByTarget, condition, action)
    }

    pub fn when_not_matched_by_source_update<'a>(
        self,
        condition: Option<Expr>,
        set: impl IntoIterator<Item = (&'a str, Expr)>,
    ) -> Self {
        let action = Node::from(MergeUpdate {
            assignments: assignments(set),
        });
        self.when(MergeMatch::NotMatchedBySource, condition, action)
    }

    pub fn when_not_matched_by_source_delete(self, condition: Option<Expr>) -> Self {
        self.when(MergeMatch::NotMatchedBySource, condition, Node::from(MergeDelete))
    }

    /// Requires at least one WHEN clause; INSERT column and value counts
    /// must agree and UPDATE needs at least one assignment.
    pub fn build(self) -> Result<Node> {
        require_non_empty("merge", &self.clauses, "MERGE needs at least one WHEN clause")?;
        for clause in &self.clauses {
            let Node::MergeWhen(when) = clause else {
                continue;
            };
            match when.action.as_ref() {
                Node::MergeInsert(insert) if !insert.row => {
                    if insert.values.is_empty() {
                        return Err(Error::validation(
                            "merge_insert",
                            "[]",
                            "INSERT needs at least one value",
                        ));
                    }
                    if !insert.columns.is_empty() && insert.columns.len() != insert.values.len() {
                        return Err(Error::validation(
                            "merge_insert",
                            format!("{} columns, {} values", insert.columns.len(), insert.values.len()),
                            "column and value counts must match",
                        ));
                    }
                }
                Node::MergeUpdate(update) => {
                    require_non_empty(
                        "merge_update",
                        &update.assignments,
                        "UPDATE needs at least one assignment",
                    )?;
                }
                _ => {}
            }
        }
        Ok(Node::from(Merge {
            target: Box::new(self.target),
            source: Box::new(self.source),
            on: Box::new(self.on),
            clauses: self.clauses,
        }))
    }
}

/// `TRUNCATE TABLE name`
pub fn truncate(table_name: &str) -> Result<Node> {
    Ok(Node::from(Truncate {
        table: Box::new(Node::from(checked_table_name("truncate", table_name)?)),
    }))
}

// ---------------------------------------------------------------------------
// DDL
// ---------------------------------------------------------------------------

/// A column definition for CREATE TABLE and ALTER TABLE ADD COLUMN.
pub fn column(name: &str, data_type: Expr) -> ColumnBuilder {
    ColumnBuilder {
        column: ColumnDefinition {
            name: name.to_string(),
            data_type: Box::new(data_type.0),
            not_null: false,
            default: None,
            options: None,
        },
    }
}

#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    column: ColumnDefinition,
}

impl ColumnBuilder {
    pub fn not_null(mut self) -> Self {
        self.column.not_null = true;
        self
    }

    pub fn default(mut self, value: Expr) -> Self {
        self.column.default = Some(Box::new(value.0));
        self
    }

    pub fn options(mut self, options: Expr) -> Self {
        self.column.options = Some(Box::new(options.0));
        self
    }

    fn name(&self) -> &str {
        &self.column.name
    }

    fn build(self) -> Node {
        Node::from(self.column)
    }
}

fn column_nodes(field: &str, columns: Vec<ColumnBuilder>) -> Result<Vec<Node>> {
    require_unique(field, columns.iter().map(ColumnBuilder::name))?;
    Ok(columns.into_iter().map(ColumnBuilder::build).collect())
}

/// `CREATE [OR REPLACE] [TEMP] TABLE [IF NOT EXISTS] name ...`
pub fn create_table(name: &str) -> CreateTableBuilder {
    CreateTableBuilder {
        name: name.to_string(),
        or_replace: false,
        temporary: false,
        if_not_exists: false,
        columns: Vec::new(),
        partition_by: None,
        cluster_by: Vec::new(),
        options: None,
        query: None,
    }
}

#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    name: String,
    or_replace: bool,
    temporary: bool,
    if_not_exists: bool,
    columns: Vec<ColumnBuilder>,
    partition_by: Option<Node>,
    cluster_by: Vec<Node>,
    options: Option<Expr>,
    query: Option<Node>,
}

impl CreateTableBuilder {
    pub fn or_replace(mut self) -> Self {
        self.or_replace = true;
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn column(mut self, column: ColumnBuilder) -> Self {
        self.columns.push(column);
        self
    }

    pub fn partition_by(mut self, expr: Expr) -> Self {
        self.partition_by = Some(expr.0);
        self
    }

    pub fn cluster_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: IntoExpr,
    {
        self.cluster_by.extend(nodes(exprs));
        self
    }

    /// Table options built by [`options`].
    pub fn options(mut self, options: Expr) -> Self {
        self.options = Some(options);
        self
    }

    /// `AS query`
    pub fn as_query(mut self, query: impl Into<Node>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Requires at least one column or an AS query; column names must be
    /// unique.
    pub fn build(self) -> Result<Node> {
        let name = checked_table_name("create_table", &self.name)?;
        if self.columns.is_empty() && self.query.is_none() {
            return Err(Error::validation(
                "create_table",
                &self.name,
                "CREATE TABLE needs at least one column or an AS query",
            ));
        }
        if let Some(options) = &self.options {
            require_options("create_table_options", options)?;
        }
        Ok(Node::from(CreateTable {
            or_replace: self.or_replace,
            temporary: self.temporary,
            if_not_exists: self.if_not_exists,
            name: Box::new(Node::from(name)),
            columns: column_nodes("create_table_columns", self.columns)?,
            partition_by: self.partition_by.map(Box::new),
            cluster_by: self.cluster_by,
            options: self.options.map(|o| Box::new(o.0)),
            query: self.query.map(Box::new),
        }))
    }

    /// Build `CREATE EXTERNAL TABLE` instead. OPTIONS must name `format`
    /// and `uris`; TEMP, PARTITION BY, CLUSTER BY and AS are rejected.
    pub fn build_external(self) -> Result<Node> {
        let name = checked_table_name("create_external_table", &self.name)?;
        if self.temporary
            || self.partition_by.is_some()
            || !self.cluster_by.is_empty()
            || self.query.is_some()
        {
            return Err(Error::validation(
                "create_external_table",
                &self.name,
                "external tables take only columns and OPTIONS",
            ));
        }
        let options = self.options.ok_or_else(|| {
            Error::validation("create_external_table", &self.name, "OPTIONS are required")
        })?;
        require_option_names("create_external_table_options", &options, &["format", "uris"])?;
        Ok(Node::from(CreateExternalTable {
            or_replace: self.or_replace,
            if_not_exists: self.if_not_exists,
            name: Box::new(Node::from(name)),
            columns: column_nodes("create_external_table_columns", self.columns)?,
            options: Box::new(options.0),
        }))
    }
}

/// `CREATE [OR REPLACE] [MATERIALIZED] VIEW name AS query`
pub fn create_view(name: &str, query: impl Into<Node>) -> CreateViewBuilder {
    CreateViewBuilder {
        name: name.to_string(),
        or_replace: false,
        materialized: false,
        if_not_exists: false,
        options: None,
        query: query.into(),
    }
}

#[derive(Debug, Clone)]
pub struct CreateViewBuilder {
    name: String,
    or_replace: bool,
    materialized: bool,
    if_not_exists: bool,
    options: Option<Expr>,
    query: Node,
}

impl CreateViewBuilder {
    pub fn or_replace(mut self) -> Self {
        self.or_replace = true;
        self
    }

    pub fn materialized(mut self) -> Self {
        self.materialized = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn options(mut self, options: Expr) -> Self {
        self.options = Some(options);
        self
    }

    pub fn build(self) -> Result<Node> {
        let name = checked_table_name("create_view", &self.name)?;
        if let Some(options) = &self.options {
            require_options("create_view_options", options)?;
        }
        if !self.query.is_query() {
            return Err(Error::validation(
                "create_view",
                self.query.kind(),
                "a view needs a query",
            ));
        }
        Ok(Node::from(CreateView {
            or_replace: self.or_replace,
            materialized: self.materialized,
            if_not_exists: self.if_not_exists,
            name: Box::new(Node::from(name)),
            options: self.options.map(|o| Box::new(o.0)),
            query: Box::new(self.query),
        }))
    }
}

/// `CREATE [TEMP] FUNCTION name(params) [RETURNS type] AS (expr)` or a
/// JavaScript UDF.
///
/// ```
/// use symbo_sql::builder::*;
///
/// let udf = create_function("add_one")
///     .param("x", data_type("INT64").unwrap())
///     .returns(data_type("INT64").unwrap())
///     .body_sql(col("x").add(lit(1)))
///     .build()
///     .unwrap();
/// assert_eq!(
///     symbo_sql::generator::Generator::sql(&udf).unwrap(),
///     "CREATE FUNCTION add_one(x INT64) RETURNS INT64 AS (x + 1)"
/// );
/// ```
pub fn create_function(name: &str) -> CreateFunctionBuilder {
    CreateFunctionBuilder {
        name: name.to_string(),
        or_replace: false,
        temporary: false,
        if_not_exists: false,
        params: Vec::new(),
        returns: None,
        language: None,
        body: None,
    }
}

#[derive(Debug, Clone)]
pub struct CreateFunctionBuilder {
    name: String,
    or_replace: bool,
    temporary: bool,
    if_not_exists: bool,
    params: Vec<(String, Node)>,
    returns: Option<Node>,
    language: Option<String>,
    body: Option<Node>,
}

impl CreateFunctionBuilder {
    pub fn or_replace(mut self) -> Self {
        self.or_replace = true;
        self
    }

    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn param(mut self, name: &str, data_type: Expr) -> Self {
        self.params.push((name.to_string(), data_type.0));
        self
    }

    pub fn returns(mut self, data_type: Expr) -> Self {
        self.returns = Some(data_type.0);
        self
    }

    /// SQL expression body, `AS (expr)`.
    pub fn body_sql(mut self, body: Expr) -> Self {
        self.language = None;
        self.body = Some(body.0);
        self
    }

    /// JavaScript body, `LANGUAGE js AS r"""code"""`.
    pub fn body_js(mut self, code: &str) -> Self {
        self.language = Some("js".to_string());
        self.body = Some(Node::from(StringLiteral {
            value: code.to_string(),
            quote: QuoteStyle::TripleDouble,
            raw: false,
        }));
        self
    }

    /// Requires a body; JavaScript functions also need RETURNS.
    pub fn build(self) -> Result<Node> {
        let name = checked_table_name("create_function", &self.name)?;
        require_unique("function_params", self.params.iter().map(|(n, _)| n.as_str()))?;
        let body = self.body.ok_or_else(|| {
            Error::validation("create_function", &self.name, "a function needs a body")
        })?;
        if self.language.is_some() && self.returns.is_none() {
            return Err(Error::validation(
                "create_function",
                &self.name,
                "JavaScript functions must declare RETURNS",
            ));
        }
        Ok(Node::from(CreateFunction {
            or_replace: self.or_replace,
            temporary: self.temporary,
            if_not_exists: self.if_not_exists,
            name: Box::new(Node::from(name)),
            params: self
                .params
                .into_iter()
                .map(|(name, data_type)| {
                    Node::from(FunctionParameter {
                        name,
                        data_type: Box::new(data_type),
                    })
                })
                .collect(),
            returns: self.returns.map(Box::new),
            language: self.language,
            body: Box::new(body),
        }))
    }
}

/// `CREATE [OR REPLACE] MODEL name [TRANSFORM(...)] OPTIONS(...) [AS query]`
pub fn create_model(name: &str) -> CreateModelBuilder {
    CreateModelBuilder {
        name: name.to_string(),
        or_replace: false,
        if_not_exists: false,
        transform: Vec::new(),
        options: None,
        query: None,
    }
}

#[derive(Debug, Clone)]
pub struct CreateModelBuilder {
    name: String,
    or_replace: bool,
    if_not_exists: bool,
    transform: Vec<Node>,
    options: Option<Expr>,
    query: Option<Node>,
}

impl CreateModelBuilder {
    pub fn or_replace(mut self) -> Self {
        self.or_replace = true;
        self
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// `TRANSFORM(expr AS name, ...)`
    pub fn transform(mut self, items: impl IntoIterator<Item = Expr>) -> Self {
        self.transform
            .extend(nodes(items).into_iter().map(select_item));
        self
    }

    pub fn options(mut self, options: Expr) -> Self {
        self.options = Some(options);
        self
    }

    pub fn as_query(mut self, query: impl Into<Node>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Requires OPTIONS; TRANSFORM is only allowed with a training query.
    pub fn build(self) -> Result<Node> {
        let name = checked_table_name("create_model", &self.name)?;
        let options = self.options.ok_or_else(|| {
            Error::validation("create_model", &self.name, "a model needs OPTIONS")
        })?;
        require_options("create_model_options", &options)?;
        if !self.transform.is_empty() && self.query.is_none() {
            return Err(Error::validation(
                "create_model",
                &self.name,
                "TRANSFORM requires an AS query",
            ));
        }
        Ok(Node::from(CreateModel {
            or_replace: self.or_replace,
            if_not_exists: self.if_not_exists,
            name: Box::new(Node::from(name)),
            transform: self.transform,
            options: Some(Box::new(options.0)),
            query: self.query.map(Box::new),
        }))
    }
}

/// `CREATE SCHEMA [IF NOT EXISTS] name [OPTIONS(...)]`
pub fn create_schema(name: &str, if_not_exists: bool, options: Option<Expr>) -> Result<Node> {
    let name = checked_table_name("create_schema", name)?;
    if let Some(options) = &options {
        require_options("create_schema_options", options)?;
    }
    Ok(Node::from(CreateSchema {
        if_not_exists,
        name: Box::new(Node::from(name)),
        options: options.map(|o| Box::new(o.0)),
    }))
}

/// `ALTER TABLE [IF EXISTS] name action, ...`
pub fn alter_table(name: &str) -> AlterTableBuilder {
    AlterTableBuilder {
        name: name.to_string(),
        if_exists: false,
        actions: Vec::new(),
        pending: Ok(()),
    }
}

#[derive(Debug, Clone)]
pub struct AlterTableBuilder {
    name: String,
    if_exists: bool,
    actions: Vec<Node>,
    pending: Result<()>,
}

impl AlterTableBuilder {
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    fn check(&mut self, field: &str, name: &str) {
        if self.pending.is_ok() {
            self.pending = require_name(field, name);
        }
    }

    pub fn add_column(mut self, column: ColumnBuilder, if_not_exists: bool) -> Self {
        self.check("add_column", column.name());
        self.actions.push(Node::from(AddColumn {
            if_not_exists,
            column: Box::new(column.build()),
        }));
        self
    }

    pub fn drop_column(mut self, name: &str, if_exists: bool) -> Self {
        self.check("drop_column", name);
        self.actions.push(Node::from(DropColumn {
            if_exists,
            name: name.to_string(),
        }));
        self
    }

    pub fn rename_column(mut self, from: &str, to: &str, if_exists: bool) -> Self {
        self.check("rename_column", from);
        self.check("rename_column", to);
        self.actions.push(Node::from(RenameColumn {
            if_exists,
            from: from.to_string(),
            to: to.to_string(),
        }));
        self
    }

    pub fn rename_to(mut self, name: &str) -> Self {
        match checked_table_name("rename_to", name) {
            Ok(to) => self.actions.push(Node::from(RenameTable {
                to: Box::new(Node::from(to)),
            })),
            Err(e) if self.pending.is_ok() => self.pending = Err(e),
            Err(_) => {}
        }
        self
    }

    pub fn set_options(mut self, options: Expr) -> Self {
        if self.pending.is_ok() {
            self.pending = require_options("set_options", &options);
        }
        self.actions.push(Node::from(SetTableOptions {
            options: Box::new(options.0),
        }));
        self
    }

    /// Reports the first invalid action; requires at least one action.
    pub fn build(self) -> Result<Node> {
        self.pending?;
        let name = checked_table_name("alter_table", &self.name)?;
        require_non_empty("alter_table", &self.actions, "ALTER TABLE needs at least one action")?;
        Ok(Node::from(AlterTable {
            if_exists: self.if_exists,
            name: Box::new(Node::from(name)),
            actions: self.actions,
        }))
    }
}

/// `DROP <kind> [IF EXISTS] name [CASCADE]`
pub fn drop_(object: ObjectKind, name: &str) -> DropBuilder {
    DropBuilder {
        object,
        name: name.to_string(),
        if_exists: false,
        cascade: false,
    }
}

#[derive(Debug, Clone)]
pub struct DropBuilder {
    object: ObjectKind,
    name: String,
    if_exists: bool,
    cascade: bool,
}

impl DropBuilder {
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    /// Only valid for `DROP SCHEMA`.
    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }

    pub fn build(self) -> Result<Node> {
        if self.cascade && self.object != ObjectKind::Schema {
            return Err(Error::validation(
                "drop_cascade",
                self.object.as_str(),
                "CASCADE is only allowed for schemas",
            ));
        }
        Ok(Node::from(DropStatement {
            object: self.object,
            if_exists: self.if_exists,
            name: Box::new(Node::from(checked_table_name("drop", &self.name)?)),
            cascade: self.cascade,
        }))
    }
}

/// `EXPORT DATA OPTIONS(uri = ..., format = ...) AS query`
pub fn export_data(options: Expr, query: impl Into<Node>) -> Result<Node> {
    require_option_names("export_data_options", &options, &["uri", "format"])?;
    Ok(Node::from(ExportData {
        options: Box::new(options.0),
        query: Box::new(query.into()),
    }))
}

/// `LOAD DATA {INTO|OVERWRITE} table FROM FILES(format = ..., uris = ...)`
pub fn load_data(table_name: &str, files: Expr, overwrite: bool) -> Result<Node> {
    let table = checked_table_name("load_data", table_name)?;
    require_option_names("load_data_files", &files, &["format", "uris"])?;
    Ok(Node::from(LoadData {
        overwrite,
        table: Box::new(Node::from(table)),
        columns: Vec::new(),
        files: Box::new(files.0),
    }))
}

// ---------------------------------------------------------------------------
// Scripting
// ---------------------------------------------------------------------------

/// `DECLARE names [type] [DEFAULT value]`; needs a type or a default.
pub fn declare(names: &[&str], data_type: Option<Expr>, default: Option<Expr>) -> Result<Node> {
    require_non_empty("declare", names, "DECLARE needs at least one name")?;
    require_unique("declare", names.iter().copied())?;
    if data_type.is_none() && default.is_none() {
        return Err(Error::validation(
            "declare",
            names.join(", "),
            "DECLARE needs a type or a default value",
        ));
    }
    Ok(Node::from(Declare {
        names: names.iter().map(|n| n.to_string()).collect(),
        data_type: data_type.map(|t| Box::new(t.0)),
        default: default.map(|d| Box::new(d.0)),
    }))
}

/// `SET name = value` or `SET (a, b) = (SELECT ...)`
pub fn set_variable(names: &[&str], value: Expr) -> Result<Node> {
    require_non_empty("set_variable", names, "SET needs at least one name")?;
    require_unique("set_variable", names.iter().copied())?;
    Ok(Node::from(SetVariable {
        names: names.iter().map(|n| n.to_string()).collect(),
        value: Box::new(value.0),
    }))
}

/// `IF cond THEN ... [ELSEIF ...] [ELSE ...] END IF`
pub fn if_(condition: Expr, then_body: impl IntoIterator<Item = Node>) -> IfBuilder {
    IfBuilder {
        condition: condition.0,
        then_body: then_body.into_iter().collect(),
        else_ifs: Vec::new(),
        else_body: Vec::new(),
    }
}

#[derive(Debug, Clone)]
pub struct IfBuilder {
    condition: Node,
    then_body: Vec<Node>,
    else_ifs: Vec<(Node, Vec<Node>)>,
    else_body: Vec<Node>,
}

impl IfBuilder {
    pub fn else_if(mut self, condition: Expr, body: impl IntoIterator<Item = Node>) -> Self {
        self.else_ifs.push((condition.0, body.into_iter().collect()));
        self
    }

    pub fn else_(mut self, body: impl IntoIterator<Item = Node>) -> Self {
        self.else_body = body.into_iter().collect();
        self
    }

    /// Every THEN branch needs at least one statement.
    pub fn build(self) -> Result<Node> {
        require_non_empty("if", &self.then_body, "IF needs at least one statement")?;
        for (_, body) in &self.else_ifs {
            require_non_empty("elseif", body, "ELSEIF needs at least one statement")?;
        }
        Ok(Node::from(If {
            condition: Box::new(self.condition),
            then_body: self.then_body,
            else_ifs: self
                .else_ifs
                .into_iter()
                .map(|(condition, body)| {
                    Node::from(ElseIf {
                        condition: Box::new(condition),
                        body,
                    })
                })
                .collect(),
            else_body: self.else_body,
        }))
    }
}

/// `[label:] WHILE cond DO ... END WHILE`
pub fn while_(label: Option<&str>, condition: Expr, body: impl IntoIterator<Item = Node>) -> Result<Node> {
    let body: Vec<Node> = body.into_iter().collect();
    require_non_empty("while", &body, "WHILE needs at least one statement")?;
    if let Some(label) = label {
        require_name("while_label", label)?;
    }
    Ok(Node::from(While {
        label: label.map(str::to_string),
        condition: Box::new(condition.0),
        body,
    }))
}

/// `FOR variable IN (query) DO ... END FOR`
pub fn for_in(variable: &str, query: impl Into<Node>, body: impl IntoIterator<Item = Node>) -> Result<Node> {
    require_name("for_variable", variable)?;
    let body: Vec<Node> = body.into_iter().collect();
    require_non_empty("for", &body, "FOR needs at least one statement")?;
    Ok(Node::from(ForIn {
        variable: variable.to_string(),
        query: Box::new(query.into()),
        body,
    }))
}

/// `[label:] BEGIN ... END`
pub fn block(label: Option<&str>, body: impl IntoIterator<Item = Node>) -> Node {
    Node::from(Block {
        label: label.map(str::to_string),
        body: body.into_iter().collect(),
    })
}

/// `BREAK [label]`
pub fn break_(label: Option<&str>) -> Node {
    Node::from(Break {
        label: label.map(str::to_string),
    })
}

/// `CONTINUE [label]`
pub fn continue_(label: Option<&str>) -> Node {
    Node::from(Continue {
        label: label.map(str::to_string),
    })
}

/// `CALL procedure(args)`
pub fn call(procedure: &str, args: impl IntoIterator<Item = Expr>) -> Result<Node> {
    Ok(Node::from(Call {
        procedure: Box::new(Node::from(checked_table_name("call", procedure)?)),
        args: nodes(args),
    }))
}

/// `ASSERT cond [AS 'message']`
pub fn assert_(condition: Expr, message: Option<&str>) -> Node {
    Node::from(Assert {
        condition: Box::new(condition.0),
        message: message.map(str::to_string),
    })
}

/// A multi-statement script.
pub fn script(statements: impl IntoIterator<Item = Node>) -> Result<Node> {
    let statements: Vec<Node> = statements.into_iter().collect();
    require_non_empty("script", &statements, "a script needs at least one statement")?;
    Ok(Node::from(Script { statements }))
}
