//! SQL syntax tree for BigQuery-style SQL.
//!
//! This module defines every node type that can appear in a tree built by the
//! [`builder`](crate::builder) functions or produced by an external parser.
//!
//! # Architecture
//!
//! The central type is [`Node`], a tagged enum with one variant per SQL
//! construct. Each variant boxes a payload struct that carries the
//! construct's attributes and its child slots. A child slot is one of:
//!
//! | Cardinality | Rust type | Example |
//! |---|---|---|
//! | exactly one | `Box<Node>` | `BinaryOp.left` |
//! | optional | `Option<Box<Node>>` | `Select.where_clause` |
//! | ordered many | `Vec<Node>` | `Select.select_list` |
//!
//! A child is owned by exactly one parent. Attaching a node anywhere takes it
//! by value, so the same instance can never sit in two slots; `Clone` gives a
//! distinct copy.
//!
//! # Families
//!
//! Every variant belongs to one [`Family`]:
//!
//! | Family | Examples |
//! |---|---|
//! | **Literal** | `StringLiteral`, `IntervalLiteral`, `ArrayLiteral`, `RangeLiteral` |
//! | **Expression** | `Identifier`, `BinaryOp`, `FunctionCall`, `Case`, `In` |
//! | **TypeExpression** | `SimpleType`, `ArrayType`, `StructType` |
//! | **Clause** | `SelectItem`, `Join`, `GroupByClause`, `MergeWhen`, `OptionsClause` |
//! | **Statement** | `Select`, `Merge`, `CreateTable`, `AlterTable`, `Script` |
//!
//! The variant list lives in [`node_variants!`]; the [`Node`] enum, the
//! [`NodeKind`] mirror and the [`Visitor`](crate::visitor::Visitor) trait are
//! all generated from it, so they cannot drift apart.

use serde::{Deserialize, Serialize};
#[cfg(feature = "bindings")]
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Child slots
// ---------------------------------------------------------------------------

/// Cardinality of a child slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    One,
    Optional,
    Many,
}

/// Borrowed view of one child slot
#[derive(Debug, Clone, Copy)]
pub enum SlotRef<'a> {
    One(&'a Node),
    Optional(Option<&'a Node>),
    Many(&'a [Node]),
}

impl<'a> SlotRef<'a> {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            SlotRef::One(_) => Cardinality::One,
            SlotRef::Optional(_) => Cardinality::Optional,
            SlotRef::Many(_) => Cardinality::Many,
        }
    }

    /// The nodes currently held by the slot, in order.
    pub fn nodes(&self) -> Vec<&'a Node> {
        match *self {
            SlotRef::One(node) => vec![node],
            SlotRef::Optional(node) => node.into_iter().collect(),
            SlotRef::Many(nodes) => nodes.iter().collect(),
        }
    }
}

/// Mutable access to one child slot
#[derive(Debug)]
pub enum SlotMut<'a> {
    One(&'a mut Node),
    Optional(&'a mut Option<Box<Node>>),
    Many(&'a mut Vec<Node>),
}

impl SlotMut<'_> {
    pub fn cardinality(&self) -> Cardinality {
        match self {
            SlotMut::One(_) => Cardinality::One,
            SlotMut::Optional(_) => Cardinality::Optional,
            SlotMut::Many(_) => Cardinality::Many,
        }
    }
}

/// Uniform access to the child slots of a node payload.
///
/// Slots are reported in declaration order, which is also the order used by
/// depth-first traversal and by the printer.
pub trait Children {
    /// Every child slot with its field name.
    fn slots(&self) -> Vec<(&'static str, SlotRef<'_>)>;

    /// Mutable access to the slot called `name`, if the payload has one.
    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>>;

    /// All direct children, flattened across slots.
    fn child_nodes(&self) -> Vec<&Node> {
        self.slots()
            .into_iter()
            .flat_map(|(_, slot)| slot.nodes())
            .collect()
    }
}

macro_rules! slot_ref {
    (one, $e:expr) => {
        SlotRef::One(&$e)
    };
    (opt, $e:expr) => {
        SlotRef::Optional($e.as_deref())
    };
    (many, $e:expr) => {
        SlotRef::Many(&$e)
    };
}

macro_rules! slot_mut {
    (one, $e:expr) => {
        SlotMut::One(&mut $e)
    };
    (opt, $e:expr) => {
        SlotMut::Optional(&mut $e)
    };
    (many, $e:expr) => {
        SlotMut::Many(&mut $e)
    };
}

/// Implement [`Children`] for payload structs from a `field: cardinality` list.
macro_rules! slots {
    ($($ty:ident { $($field:ident: $card:ident),* $(,)? })*) => {
        $(
            impl Children for $ty {
                fn slots(&self) -> Vec<(&'static str, SlotRef<'_>)> {
                    vec![$((stringify!($field), slot_ref!($card, self.$field))),*]
                }

                #[allow(unused_variables)]
                fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
                    match name {
                        $(stringify!($field) => Some(slot_mut!($card, self.$field)),)*
                        _ => None,
                    }
                }
            }
        )*
    };
}

// ---------------------------------------------------------------------------
// Variant list
// ---------------------------------------------------------------------------

/// Invoke `$callback!` with the complete variant list, grouped by family.
///
/// Each entry is `Variant => visitor_method`. Adding a construct means adding
/// one line here plus its payload struct; every exhaustive `match` over
/// [`Node`] then fails to compile until it handles the new variant.
macro_rules! node_variants {
    ($callback:ident) => {
        $callback! {
            Literal {
                StringLiteral => visit_string_literal,
                BytesLiteral => visit_bytes_literal,
                IntegerLiteral => visit_integer_literal,
                FloatLiteral => visit_float_literal,
                NumericLiteral => visit_numeric_literal,
                BigNumericLiteral => visit_big_numeric_literal,
                BooleanLiteral => visit_boolean_literal,
                NullLiteral => visit_null_literal,
                DateLiteral => visit_date_literal,
                TimeLiteral => visit_time_literal,
                DatetimeLiteral => visit_datetime_literal,
                TimestampLiteral => visit_timestamp_literal,
                IntervalLiteral => visit_interval_literal,
                ArrayLiteral => visit_array_literal,
                StructLiteral => visit_struct_literal,
                RangeLiteral => visit_range_literal,
                JsonLiteral => visit_json_literal,
                GeographyLiteral => visit_geography_literal,
            }
            Expression {
                Identifier => visit_identifier,
                ColumnRef => visit_column_ref,
                TableName => visit_table_name,
                Star => visit_star,
                BinaryOp => visit_binary_op,
                UnaryOp => visit_unary_op,
                FunctionCall => visit_function_call,
                WindowFunction => visit_window_function,
                Cast => visit_cast,
                Extract => visit_extract,
                Case => visit_case,
                ArrayAccess => visit_array_access,
                FieldAccess => visit_field_access,
                In => visit_in,
                Between => visit_between,
                Like => visit_like,
                IsTest => visit_is_test,
                Exists => visit_exists,
                Subquery => visit_subquery,
                ArraySubquery => visit_array_subquery,
                NamedParameter => visit_named_parameter,
                PositionalParameter => visit_positional_parameter,
                NamedArgument => visit_named_argument,
                DefaultValue => visit_default_value,
            }
            TypeExpression {
                SimpleType => visit_simple_type,
                ArrayType => visit_array_type,
                StructType => visit_struct_type,
                StructTypeField => visit_struct_type_field,
                RangeType => visit_range_type,
            }
            Clause {
                SelectItem => visit_select_item,
                WithClause => visit_with_clause,
                Cte => visit_cte,
                FromClause => visit_from_clause,
                TableRef => visit_table_ref,
                Join => visit_join,
                Unnest => visit_unnest,
                TableFunction => visit_table_function,
                SubqueryTable => visit_subquery_table,
                MlFunction => visit_ml_function,
                TableSample => visit_table_sample,
                Pivot => visit_pivot,
                Unpivot => visit_unpivot,
                GroupByClause => visit_group_by_clause,
                Rollup => visit_rollup,
                Cube => visit_cube,
                GroupingSets => visit_grouping_sets,
                GroupingSet => visit_grouping_set,
                OrderByItem => visit_order_by_item,
                LimitClause => visit_limit_clause,
                WindowSpec => visit_window_spec,
                WindowFrame => visit_window_frame,
                WindowBound => visit_window_bound,
                NamedWindow => visit_named_window,
                WhenClause => visit_when_clause,
                StructEntry => visit_struct_entry,
                SetClause => visit_set_clause,
                ValuesRow => visit_values_row,
                MergeWhen => visit_merge_when,
                MergeUpdate => visit_merge_update,
                MergeInsert => visit_merge_insert,
                MergeDelete => visit_merge_delete,
                ColumnDefinition => visit_column_definition,
                OptionsClause => visit_options_clause,
                OptionEntry => visit_option_entry,
                FunctionParameter => visit_function_parameter,
                AddColumn => visit_add_column,
                DropColumn => visit_drop_column,
                RenameColumn => visit_rename_column,
                RenameTable => visit_rename_table,
                SetTableOptions => visit_set_table_options,
                ElseIf => visit_else_if,
            }
            Statement {
                Select => visit_select,
                SetOperation => visit_set_operation,
                Insert => visit_insert,
                Update => visit_update,
                Delete => visit_delete,
                Merge => visit_merge,
                Truncate => visit_truncate,
                CreateTable => visit_create_table,
                CreateExternalTable => visit_create_external_table,
                CreateView => visit_create_view,
                CreateFunction => visit_create_function,
                CreateModel => visit_create_model,
                CreateSchema => visit_create_schema,
                AlterTable => visit_alter_table,
                DropStatement => visit_drop_statement,
                ExportData => visit_export_data,
                LoadData => visit_load_data,
                Declare => visit_declare,
                SetVariable => visit_set_variable,
                If => visit_if,
                While => visit_while,
                ForIn => visit_for_in,
                Block => visit_block,
                Break => visit_break,
                Continue => visit_continue,
                Call => visit_call,
                Assert => visit_assert,
                Script => visit_script,
            }
        }
    };
}
pub(crate) use node_variants;

/// The five node families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Literal,
    Expression,
    TypeExpression,
    Clause,
    Statement,
}

macro_rules! define_node_enum {
    ($($family:ident { $($variant:ident => $visit:ident),* $(,)? })*) => {
        /// Any node of the tree.
        ///
        /// Variants box their payload so `size_of::<Node>()` stays at two words.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[cfg_attr(feature = "bindings", derive(TS))]
        #[serde(rename_all = "snake_case")]
        pub enum Node {
            $($($variant(Box<$variant>),)*)*
        }

        /// Fieldless mirror of [`Node`], used to select variants in queries.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "bindings", derive(TS))]
        pub enum NodeKind {
            $($($variant,)*)*
        }

        impl NodeKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [NodeKind] = &[$($(NodeKind::$variant,)*)*];

            pub fn family(self) -> Family {
                match self {
                    $($(NodeKind::$variant => Family::$family,)*)*
                }
            }

            pub fn name(self) -> &'static str {
                match self {
                    $($(NodeKind::$variant => stringify!($variant),)*)*
                }
            }
        }

        impl Node {
            pub fn kind(&self) -> NodeKind {
                match self {
                    $($(Node::$variant(_) => NodeKind::$variant,)*)*
                }
            }
        }

        impl Children for Node {
            fn slots(&self) -> Vec<(&'static str, SlotRef<'_>)> {
                match self {
                    $($(Node::$variant(inner) => inner.slots(),)*)*
                }
            }

            fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
                match self {
                    $($(Node::$variant(inner) => inner.slot_mut(name),)*)*
                }
            }
        }

        $($(
            impl From<$variant> for Node {
                fn from(value: $variant) -> Self {
                    Node::$variant(Box::new(value))
                }
            }
        )*)*
    };
}

node_variants!(define_node_enum);

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Node {
    pub fn family(&self) -> Family {
        self.kind().family()
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind() == kind
    }

    /// The name carried by name-like nodes (identifiers, parameters, CTEs,
    /// functions, table names and aliases on table sources).
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Identifier(n) => Some(&n.name),
            Node::TableName(n) => Some(&n.table),
            Node::NamedParameter(n) => Some(&n.name),
            Node::NamedArgument(n) => Some(&n.name),
            Node::FunctionCall(n) => Some(&n.name),
            Node::TableFunction(n) => Some(&n.name),
            Node::Cte(n) => Some(&n.name),
            Node::NamedWindow(n) => Some(&n.name),
            Node::ColumnDefinition(n) => Some(&n.name),
            Node::OptionEntry(n) => Some(&n.name),
            Node::FunctionParameter(n) => Some(&n.name),
            Node::StructTypeField(n) => n.name.as_deref(),
            Node::SelectItem(n) => n.alias.as_deref(),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Node::Identifier(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_select(&self) -> Option<&Select> {
        match self {
            Node::Select(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_select_mut(&mut self) -> Option<&mut Select> {
        match self {
            Node::Select(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_table_name(&self) -> Option<&TableName> {
        match self {
            Node::TableName(n) => Some(n),
            _ => None,
        }
    }

    /// True for nodes that can stand where a query is expected.
    pub fn is_query(&self) -> bool {
        matches!(self, Node::Select(_) | Node::SetOperation(_))
    }
}

// ---------------------------------------------------------------------------
// Attribute enums
// ---------------------------------------------------------------------------

/// Delimiter of a string or bytes literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    #[default]
    Single,
    Double,
    TripleSingle,
    TripleDouble,
}

impl QuoteStyle {
    pub fn delimiter(self) -> &'static str {
        match self {
            QuoteStyle::Single => "'",
            QuoteStyle::Double => "\"",
            QuoteStyle::TripleSingle => "'''",
            QuoteStyle::TripleDouble => "\"\"\"",
        }
    }
}

/// Date/time part used by INTERVAL literals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
}

impl IntervalUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            IntervalUnit::Year => "YEAR",
            IntervalUnit::Quarter => "QUARTER",
            IntervalUnit::Month => "MONTH",
            IntervalUnit::Week => "WEEK",
            IntervalUnit::Day => "DAY",
            IntervalUnit::Hour => "HOUR",
            IntervalUnit::Minute => "MINUTE",
            IntervalUnit::Second => "SECOND",
            IntervalUnit::Millisecond => "MILLISECOND",
            IntervalUnit::Microsecond => "MICROSECOND",
        }
    }

    /// Coarseness rank; larger is coarser.
    pub fn rank(self) -> u8 {
        match self {
            IntervalUnit::Year => 9,
            IntervalUnit::Quarter => 8,
            IntervalUnit::Month => 7,
            IntervalUnit::Week => 6,
            IntervalUnit::Day => 5,
            IntervalUnit::Hour => 4,
            IntervalUnit::Minute => 3,
            IntervalUnit::Second => 2,
            IntervalUnit::Millisecond => 1,
            IntervalUnit::Microsecond => 0,
        }
    }

    pub fn is_coarser_than(self, other: IntervalUnit) -> bool {
        self.rank() > other.rank()
    }
}

/// Binary operators, ordered loosely by family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Multiply,
    Divide,
    Concat,
    Plus,
    Minus,
    ShiftLeft,
    ShiftRight,
    BitAnd,
    BitXor,
    BitOr,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    IsDistinctFrom,
    IsNotDistinctFrom,
    And,
    Or,
}

/// Binding power shared by binary, unary and predicate forms.
///
/// Higher binds tighter. Comparisons and the IN/BETWEEN/LIKE/IS predicates
/// share [`Precedence::COMPARISON`] and do not associate.
pub struct Precedence;

impl Precedence {
    pub const OR: u8 = 1;
    pub const AND: u8 = 2;
    pub const NOT: u8 = 3;
    pub const COMPARISON: u8 = 4;
    pub const BIT_OR: u8 = 5;
    pub const BIT_XOR: u8 = 6;
    pub const BIT_AND: u8 = 7;
    pub const SHIFT: u8 = 8;
    pub const ADDITIVE: u8 = 9;
    pub const MULTIPLICATIVE: u8 = 10;
    pub const UNARY: u8 = 11;
    pub const POSTFIX: u8 = 12;
    pub const ATOM: u8 = 13;
}

impl BinaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Concat => "||",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::ShiftLeft => "<<",
            BinaryOperator::ShiftRight => ">>",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitXor => "^",
            BinaryOperator::BitOr => "|",
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::IsDistinctFrom => "IS DISTINCT FROM",
            BinaryOperator::IsNotDistinctFrom => "IS NOT DISTINCT FROM",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Concat => {
                Precedence::MULTIPLICATIVE
            }
            BinaryOperator::Plus | BinaryOperator::Minus => Precedence::ADDITIVE,
            BinaryOperator::ShiftLeft | BinaryOperator::ShiftRight => Precedence::SHIFT,
            BinaryOperator::BitAnd => Precedence::BIT_AND,
            BinaryOperator::BitXor => Precedence::BIT_XOR,
            BinaryOperator::BitOr => Precedence::BIT_OR,
            BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq
            | BinaryOperator::IsDistinctFrom
            | BinaryOperator::IsNotDistinctFrom => Precedence::COMPARISON,
            BinaryOperator::And => Precedence::AND,
            BinaryOperator::Or => Precedence::OR,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == Precedence::COMPARISON
    }

    /// Operators spelled with keywords rather than symbols.
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            BinaryOperator::And
                | BinaryOperator::Or
                | BinaryOperator::IsDistinctFrom
                | BinaryOperator::IsNotDistinctFrom
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
    BitNot,
}

impl UnaryOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Not => "NOT",
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::BitNot => "~",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            UnaryOperator::Not => Precedence::NOT,
            _ => Precedence::UNARY,
        }
    }
}

/// Array subscript flavour: `a[i]`, `a[OFFSET(i)]`, `a[SAFE_ORDINAL(i)]`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum SubscriptMode {
    #[default]
    Plain,
    Offset,
    Ordinal,
    SafeOffset,
    SafeOrdinal,
}

impl SubscriptMode {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            SubscriptMode::Plain => None,
            SubscriptMode::Offset => Some("OFFSET"),
            SubscriptMode::Ordinal => Some("ORDINAL"),
            SubscriptMode::SafeOffset => Some("SAFE_OFFSET"),
            SubscriptMode::SafeOrdinal => Some("SAFE_ORDINAL"),
        }
    }
}

/// Right-hand side of `IS [NOT] ...`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum IsKind {
    Null,
    True,
    False,
    Unknown,
}

impl IsKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IsKind::Null => "NULL",
            IsKind::True => "TRUE",
            IsKind::False => "FALSE",
            IsKind::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum NullHandling {
    IgnoreNulls,
    RespectNulls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum SetOperator {
    Union,
    Intersect,
    Except,
}

impl SetOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            SetOperator::Union => "UNION",
            SetOperator::Intersect => "INTERSECT",
            SetOperator::Except => "EXCEPT",
        }
    }
}

/// BigQuery requires the quantifier to be spelled out on every set operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum SetQuantifier {
    All,
    Distinct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum FrameUnit {
    Rows,
    Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    UnboundedPreceding,
    Preceding,
    CurrentRow,
    Following,
    UnboundedFollowing,
}

impl BoundKind {
    /// Position along the frame axis; a frame start may not come after its end.
    pub fn ordinal(self) -> u8 {
        match self {
            BoundKind::UnboundedPreceding => 0,
            BoundKind::Preceding => 1,
            BoundKind::CurrentRow => 2,
            BoundKind::Following => 3,
            BoundKind::UnboundedFollowing => 4,
        }
    }

    pub fn takes_offset(self) -> bool {
        matches!(self, BoundKind::Preceding | BoundKind::Following)
    }
}

/// Which rows a MERGE WHEN clause applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum MergeMatch {
    Matched,
    NotMatchedByTarget,
    NotMatchedBySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum SampleSize {
    Percent(f64),
    Rows(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum MlFunctionKind {
    Predict,
    Evaluate,
    ExplainPredict,
    Forecast,
    FeatureInfo,
    Weights,
}

impl MlFunctionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MlFunctionKind::Predict => "ML.PREDICT",
            MlFunctionKind::Evaluate => "ML.EVALUATE",
            MlFunctionKind::ExplainPredict => "ML.EXPLAIN_PREDICT",
            MlFunctionKind::Forecast => "ML.FORECAST",
            MlFunctionKind::FeatureInfo => "ML.FEATURE_INFO",
            MlFunctionKind::Weights => "ML.WEIGHTS",
        }
    }
}

/// Object kinds accepted by DROP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Table,
    ExternalTable,
    View,
    MaterializedView,
    Function,
    Procedure,
    Model,
    Schema,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Table => "TABLE",
            ObjectKind::ExternalTable => "EXTERNAL TABLE",
            ObjectKind::View => "VIEW",
            ObjectKind::MaterializedView => "MATERIALIZED VIEW",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Procedure => "PROCEDURE",
            ObjectKind::Model => "MODEL",
            ObjectKind::Schema => "SCHEMA",
        }
    }
}

/// Scalar type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum TypeName {
    Int64,
    Float64,
    Numeric,
    BigNumeric,
    Bool,
    String,
    Bytes,
    Date,
    Time,
    Datetime,
    Timestamp,
    Interval,
    Json,
    Geography,
}

impl TypeName {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeName::Int64 => "INT64",
            TypeName::Float64 => "FLOAT64",
            TypeName::Numeric => "NUMERIC",
            TypeName::BigNumeric => "BIGNUMERIC",
            TypeName::Bool => "BOOL",
            TypeName::String => "STRING",
            TypeName::Bytes => "BYTES",
            TypeName::Date => "DATE",
            TypeName::Time => "TIME",
            TypeName::Datetime => "DATETIME",
            TypeName::Timestamp => "TIMESTAMP",
            TypeName::Interval => "INTERVAL",
            TypeName::Json => "JSON",
            TypeName::Geography => "GEOGRAPHY",
        }
    }

    /// Parse a type name, accepting the common BigQuery aliases.
    pub fn from_name(name: &str) -> Option<TypeName> {
        let upper = name.trim().to_ascii_uppercase();
        Some(match upper.as_str() {
            "INT64" | "INT" | "INTEGER" | "BIGINT" | "SMALLINT" | "TINYINT" | "BYTEINT" => {
                TypeName::Int64
            }
            "FLOAT64" | "FLOAT" => TypeName::Float64,
            "NUMERIC" | "DECIMAL" => TypeName::Numeric,
            "BIGNUMERIC" | "BIGDECIMAL" => TypeName::BigNumeric,
            "BOOL" | "BOOLEAN" => TypeName::Bool,
            "STRING" => TypeName::String,
            "BYTES" => TypeName::Bytes,
            "DATE" => TypeName::Date,
            "TIME" => TypeName::Time,
            "DATETIME" => TypeName::Datetime,
            "TIMESTAMP" => TypeName::Timestamp,
            "INTERVAL" => TypeName::Interval,
            "JSON" => TypeName::Json,
            "GEOGRAPHY" => TypeName::Geography,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// A string literal such as `'abc'`, `"abc"`, `'''abc'''` or `r'\d+'`.
///
/// `value` holds the decoded text; the printer re-escapes it unless `raw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct StringLiteral {
    pub value: String,
    pub quote: QuoteStyle,
    pub raw: bool,
}

impl StringLiteral {
    pub fn new(value: impl Into<String>) -> Self {
        StringLiteral {
            value: value.into(),
            quote: QuoteStyle::Single,
            raw: false,
        }
    }
}

/// A bytes literal, `B'abc'`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct BytesLiteral {
    pub value: String,
    pub quote: QuoteStyle,
    pub raw: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct IntegerLiteral {
    pub value: i64,
    /// Print as `0x..`
    pub hex: bool,
}

impl IntegerLiteral {
    pub fn new(value: i64) -> Self {
        IntegerLiteral { value, hex: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct FloatLiteral {
    pub value: f64,
}

/// `NUMERIC '1.25'`; the text is kept verbatim to avoid precision loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct NumericLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct BigNumericLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct BooleanLiteral {
    pub value: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct NullLiteral;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct DateLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct TimeLiteral {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct DatetimeLiteral {
    pub value: String,
}

/// `TIMESTAMP '2024-01-01 10:00:00 America/Los_Angeles'`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct TimestampLiteral {
    pub value: String,
    pub time_zone: Option<String>,
}

/// `INTERVAL 5 DAY` or `INTERVAL '1-2' YEAR TO MONTH`.
///
/// `value` is usually an integer or string literal but may be any expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct IntervalLiteral {
    pub value: Box<Node>,
    pub unit: IntervalUnit,
    pub end_unit: Option<IntervalUnit>,
}

/// `[1, 2, 3]` or `ARRAY<INT64>[1, 2, 3]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ArrayLiteral {
    pub element_type: Option<Box<Node>>,
    pub elements: Vec<Node>,
}

/// `STRUCT(1 AS a, 'x' AS b)`; each field is a [`StructEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct StructLiteral {
    pub struct_type: Option<Box<Node>>,
    pub fields: Vec<Node>,
}

/// `RANGE<DATE> '[2024-01-01, UNBOUNDED)'`. A missing bound is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct RangeLiteral {
    pub element_type: Box<Node>,
    pub lower: Option<String>,
    pub upper: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct JsonLiteral {
    pub value: String,
}

/// A geography value given as well-known text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct GeographyLiteral {
    pub wkt: String,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// A bare name. `quoted` forces backticks even when not required.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Identifier {
    pub name: String,
    pub quoted: bool,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Identifier {
            name: name.into(),
            quoted: false,
        }
    }

    pub fn quoted(name: impl Into<String>) -> Self {
        Identifier {
            name: name.into(),
            quoted: true,
        }
    }
}

/// A qualified column path such as `t.col` or `t.struct_col.field`.
///
/// Unqualified columns are plain [`Identifier`] nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ColumnRef {
    pub parts: Vec<Node>,
}

/// `project.dataset.table`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct TableName {
    pub project: Option<String>,
    pub dataset: Option<String>,
    pub table: String,
}

impl TableName {
    pub fn new(table: impl Into<String>) -> Self {
        TableName {
            project: None,
            dataset: None,
            table: table.into(),
        }
    }

    /// The dotted parts, outermost first.
    pub fn parts(&self) -> Vec<&str> {
        self.project
            .iter()
            .chain(self.dataset.iter())
            .map(String::as_str)
            .chain(std::iter::once(self.table.as_str()))
            .collect()
    }
}

/// `*`, `t.*`, `* EXCEPT (a) REPLACE (b + 1 AS b)`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Star {
    pub qualifier: Option<Box<Node>>,
    pub except: Vec<Node>,
    pub replace: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct BinaryOp {
    pub op: BinaryOperator,
    pub left: Box<Node>,
    pub right: Box<Node>,
}

impl BinaryOp {
    pub fn new(left: Node, op: BinaryOperator, right: Node) -> Self {
        BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct UnaryOp {
    pub op: UnaryOperator,
    pub operand: Box<Node>,
}

/// A scalar or aggregate function call.
///
/// Aggregate modifiers (`DISTINCT`, `IGNORE NULLS`, `ORDER BY`, `LIMIT`) are
/// printed inside the parentheses in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Node>,
    pub distinct: bool,
    pub null_handling: Option<NullHandling>,
    pub order_by: Vec<Node>,
    pub limit: Option<Box<Node>>,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, args: Vec<Node>) -> Self {
        FunctionCall {
            name: name.into(),
            args,
            distinct: false,
            null_handling: None,
            order_by: Vec::new(),
            limit: None,
        }
    }
}

/// `function OVER (window)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct WindowFunction {
    pub function: Box<Node>,
    pub window: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Cast {
    pub expr: Box<Node>,
    pub target: Box<Node>,
    /// `SAFE_CAST`
    pub safe: bool,
    pub format: Option<Box<Node>>,
}

/// `EXTRACT(part FROM expr [AT TIME ZONE tz])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Extract {
    pub part: String,
    pub expr: Box<Node>,
    pub time_zone: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Case {
    pub operand: Option<Box<Node>>,
    pub whens: Vec<Node>,
    pub else_result: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ArrayAccess {
    pub array: Box<Node>,
    pub index: Box<Node>,
    pub mode: SubscriptMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct FieldAccess {
    pub expr: Box<Node>,
    pub field: String,
}

/// `expr [NOT] IN (...)`. Exactly one of `list`, `query`, `unnest` is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct In {
    pub expr: Box<Node>,
    pub negated: bool,
    pub list: Vec<Node>,
    pub query: Option<Box<Node>>,
    pub unnest: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Between {
    pub expr: Box<Node>,
    pub negated: bool,
    pub low: Box<Node>,
    pub high: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Like {
    pub expr: Box<Node>,
    pub negated: bool,
    pub pattern: Box<Node>,
}

/// `expr IS [NOT] NULL|TRUE|FALSE|UNKNOWN`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct IsTest {
    pub expr: Box<Node>,
    pub negated: bool,
    pub test: IsKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Exists {
    pub query: Box<Node>,
}

/// A scalar subquery, `(SELECT ...)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Subquery {
    pub query: Box<Node>,
}

/// `ARRAY(SELECT ...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ArraySubquery {
    pub query: Box<Node>,
}

/// `@name`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct NamedParameter {
    pub name: String,
}

/// `?`; `position` is the 1-based order among positional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct PositionalParameter {
    pub position: u32,
}

/// `name => value` inside a function argument list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct NamedArgument {
    pub name: String,
    pub value: Box<Node>,
}

/// The `DEFAULT` keyword in INSERT values or UPDATE assignments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct DefaultValue;

// ---------------------------------------------------------------------------
// Type expressions
// ---------------------------------------------------------------------------

/// A scalar type with optional parameters, e.g. `STRING(10)`, `NUMERIC(10, 2)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct SimpleType {
    pub name: TypeName,
    pub params: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ArrayType {
    pub element: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct StructType {
    pub fields: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct StructTypeField {
    pub name: Option<String>,
    pub field_type: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct RangeType {
    pub element: Box<Node>,
}

// ---------------------------------------------------------------------------
// Clauses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct SelectItem {
    pub expr: Box<Node>,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expr: Node) -> Self {
        SelectItem {
            expr: Box::new(expr),
            alias: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct WithClause {
    pub recursive: bool,
    pub ctes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Cte {
    pub name: String,
    pub query: Box<Node>,
}

/// FROM with comma-separated sources; explicit joins nest as [`Join`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct FromClause {
    pub sources: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct TableRef {
    pub table: Box<Node>,
    pub alias: Option<String>,
    /// `FOR SYSTEM_TIME AS OF expr`
    pub system_time: Option<Box<Node>>,
    pub sample: Option<Box<Node>>,
}

impl TableRef {
    pub fn new(table: TableName) -> Self {
        TableRef {
            table: Box::new(Node::from(table)),
            alias: None,
            system_time: None,
            sample: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Join {
    pub kind: JoinKind,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub on: Option<Box<Node>>,
    pub using: Vec<String>,
}

/// `UNNEST(array) AS alias WITH OFFSET AS pos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Unnest {
    pub array: Box<Node>,
    pub alias: Option<String>,
    pub with_offset: bool,
    pub offset_alias: Option<String>,
}

/// A table-valued function call in FROM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct TableFunction {
    pub name: String,
    pub args: Vec<Node>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct SubqueryTable {
    pub query: Box<Node>,
    pub alias: Option<String>,
}

/// `ML.PREDICT(MODEL m, TABLE t, STRUCT(0.5 AS threshold))`.
///
/// `input` is either a [`TableName`] (printed as `TABLE name`) or a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct MlFunction {
    pub function: MlFunctionKind,
    pub model: Box<Node>,
    pub input: Option<Box<Node>>,
    pub settings: Option<Box<Node>>,
    pub alias: Option<String>,
}

/// `TABLESAMPLE SYSTEM (10 PERCENT)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct TableSample {
    pub size: SampleSize,
}

/// `source PIVOT(agg FOR column IN (values)) AS alias`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Pivot {
    pub source: Box<Node>,
    pub aggregates: Vec<Node>,
    pub pivot_column: Box<Node>,
    pub values: Vec<Node>,
    pub alias: Option<String>,
}

/// `source UNPIVOT [INCLUDE NULLS] (value FOR name IN (columns)) AS alias`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Unpivot {
    pub source: Box<Node>,
    pub include_nulls: bool,
    pub value_column: String,
    pub name_column: String,
    pub columns: Vec<Node>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct GroupByClause {
    /// `GROUP BY ALL`
    pub all: bool,
    pub items: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Rollup {
    pub exprs: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Cube {
    pub exprs: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct GroupingSets {
    pub sets: Vec<Node>,
}

/// One set inside GROUPING SETS; may be empty, printed as `()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct GroupingSet {
    pub exprs: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct OrderByItem {
    pub expr: Box<Node>,
    pub direction: Option<SortDirection>,
    pub nulls: Option<NullsOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct LimitClause {
    pub count: Box<Node>,
    pub offset: Option<Box<Node>>,
}

/// Window specification; `base` names a window from the WINDOW clause.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct WindowSpec {
    pub base: Option<String>,
    pub partition_by: Vec<Node>,
    pub order_by: Vec<Node>,
    pub frame: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct WindowFrame {
    pub unit: FrameUnit,
    pub start: Box<Node>,
    pub end: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct WindowBound {
    pub kind: BoundKind,
    pub offset: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct NamedWindow {
    pub name: String,
    pub spec: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct WhenClause {
    pub condition: Box<Node>,
    pub result: Box<Node>,
}

/// One field of a STRUCT literal, `value [AS name]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct StructEntry {
    pub value: Box<Node>,
    pub name: Option<String>,
}

/// `target = value` in UPDATE and MERGE
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct SetClause {
    pub target: Box<Node>,
    pub value: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ValuesRow {
    pub values: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct MergeWhen {
    pub matched: MergeMatch,
    pub condition: Option<Box<Node>>,
    pub action: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct MergeUpdate {
    pub assignments: Vec<Node>,
}

/// `INSERT (cols) VALUES (vals)` or `INSERT ROW`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct MergeInsert {
    pub columns: Vec<String>,
    pub values: Vec<Node>,
    pub row: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct MergeDelete;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: Box<Node>,
    pub not_null: bool,
    pub default: Option<Box<Node>>,
    pub options: Option<Box<Node>>,
}

/// `OPTIONS(name = value, ...)`; entries keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct OptionsClause {
    pub entries: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct OptionEntry {
    pub name: String,
    pub value: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct FunctionParameter {
    pub name: String,
    pub data_type: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct AddColumn {
    pub if_not_exists: bool,
    pub column: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct DropColumn {
    pub if_exists: bool,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct RenameColumn {
    pub if_exists: bool,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct RenameTable {
    pub to: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct SetTableOptions {
    pub options: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ElseIf {
    pub condition: Box<Node>,
    pub body: Vec<Node>,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A SELECT query block.
///
/// Clause slots are optional; the printer requires a non-empty `select_list`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Select {
    pub with: Option<Box<Node>>,
    pub distinct: bool,
    pub select_list: Vec<Node>,
    pub from: Option<Box<Node>>,
    pub where_clause: Option<Box<Node>>,
    pub group_by: Option<Box<Node>>,
    pub having: Option<Box<Node>>,
    pub qualify: Option<Box<Node>>,
    pub windows: Vec<Node>,
    pub order_by: Vec<Node>,
    pub limit: Option<Box<Node>>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct SetOperation {
    pub op: SetOperator,
    pub quantifier: SetQuantifier,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub order_by: Vec<Node>,
    pub limit: Option<Box<Node>>,
}

/// `INSERT INTO t (cols) VALUES ...` or `INSERT INTO t (cols) query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Insert {
    pub table: Box<Node>,
    pub columns: Vec<String>,
    pub rows: Vec<Node>,
    pub query: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Update {
    pub table: Box<Node>,
    pub assignments: Vec<Node>,
    pub from: Option<Box<Node>>,
    pub where_clause: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Delete {
    pub table: Box<Node>,
    pub where_clause: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Merge {
    pub target: Box<Node>,
    pub source: Box<Node>,
    pub on: Box<Node>,
    pub clauses: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Truncate {
    pub table: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct CreateTable {
    pub or_replace: bool,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub name: Box<Node>,
    pub columns: Vec<Node>,
    pub partition_by: Option<Box<Node>>,
    pub cluster_by: Vec<Node>,
    pub options: Option<Box<Node>>,
    pub query: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct CreateExternalTable {
    pub or_replace: bool,
    pub if_not_exists: bool,
    pub name: Box<Node>,
    pub columns: Vec<Node>,
    pub options: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct CreateView {
    pub or_replace: bool,
    pub materialized: bool,
    pub if_not_exists: bool,
    pub name: Box<Node>,
    pub options: Option<Box<Node>>,
    pub query: Box<Node>,
}

/// A SQL UDF (`AS (expr)`) or a JavaScript UDF (`LANGUAGE js AS '...'`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct CreateFunction {
    pub or_replace: bool,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub name: Box<Node>,
    pub params: Vec<Node>,
    pub returns: Option<Box<Node>>,
    pub language: Option<String>,
    pub body: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct CreateModel {
    pub or_replace: bool,
    pub if_not_exists: bool,
    pub name: Box<Node>,
    pub transform: Vec<Node>,
    pub options: Option<Box<Node>>,
    pub query: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct CreateSchema {
    pub if_not_exists: bool,
    pub name: Box<Node>,
    pub options: Option<Box<Node>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct AlterTable {
    pub if_exists: bool,
    pub name: Box<Node>,
    pub actions: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct DropStatement {
    pub object: ObjectKind,
    pub if_exists: bool,
    pub name: Box<Node>,
    pub cascade: bool,
}

/// `EXPORT DATA OPTIONS(...) AS query`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ExportData {
    pub options: Box<Node>,
    pub query: Box<Node>,
}

/// `LOAD DATA [OVERWRITE|INTO] t [(cols)] FROM FILES(...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct LoadData {
    pub overwrite: bool,
    pub table: Box<Node>,
    pub columns: Vec<Node>,
    pub files: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Declare {
    pub names: Vec<String>,
    pub data_type: Option<Box<Node>>,
    pub default: Option<Box<Node>>,
}

/// `SET x = value` or `SET (a, b) = value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct SetVariable {
    pub names: Vec<String>,
    pub value: Box<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct If {
    pub condition: Box<Node>,
    pub then_body: Vec<Node>,
    pub else_ifs: Vec<Node>,
    pub else_body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct While {
    pub label: Option<String>,
    pub condition: Box<Node>,
    pub body: Vec<Node>,
}

/// `FOR variable IN (query) DO ... END FOR`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct ForIn {
    pub variable: String,
    pub query: Box<Node>,
    pub body: Vec<Node>,
}

/// `BEGIN ... END`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Block {
    pub label: Option<String>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Break {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Continue {
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Call {
    pub procedure: Box<Node>,
    pub args: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Assert {
    pub condition: Box<Node>,
    pub message: Option<String>,
}

/// A sequence of statements separated by `;`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
pub struct Script {
    pub statements: Vec<Node>,
}

// ---------------------------------------------------------------------------
// Slot tables
// ---------------------------------------------------------------------------

slots! {
    StringLiteral {}
    BytesLiteral {}
    IntegerLiteral {}
    FloatLiteral {}
    NumericLiteral {}
    BigNumericLiteral {}
    BooleanLiteral {}
    NullLiteral {}
    DateLiteral {}
    TimeLiteral {}
    DatetimeLiteral {}
    TimestampLiteral {}
    IntervalLiteral { value: one }
    ArrayLiteral { element_type: opt, elements: many }
    StructLiteral { struct_type: opt, fields: many }
    RangeLiteral { element_type: one }
    JsonLiteral {}
    GeographyLiteral {}

    Identifier {}
    ColumnRef { parts: many }
    TableName {}
    Star { qualifier: opt, except: many, replace: many }
    BinaryOp { left: one, right: one }
    UnaryOp { operand: one }
    FunctionCall { args: many, order_by: many, limit: opt }
    WindowFunction { function: one, window: one }
    Cast { expr: one, target: one, format: opt }
    Extract { expr: one, time_zone: opt }
    Case { operand: opt, whens: many, else_result: opt }
    ArrayAccess { array: one, index: one }
    FieldAccess { expr: one }
    In { expr: one, list: many, query: opt, unnest: opt }
    Between { expr: one, low: one, high: one }
    Like { expr: one, pattern: one }
    IsTest { expr: one }
    Exists { query: one }
    Subquery { query: one }
    ArraySubquery { query: one }
    NamedParameter {}
    PositionalParameter {}
    NamedArgument { value: one }
    DefaultValue {}

    SimpleType {}
    ArrayType { element: one }
    StructType { fields: many }
    StructTypeField { field_type: one }
    RangeType { element: one }

    SelectItem { expr: one }
    WithClause { ctes: many }
    Cte { query: one }
    FromClause { sources: many }
    TableRef { table: one, system_time: opt, sample: opt }
    Join { left: one, right: one, on: opt }
    Unnest { array: one }
    TableFunction { args: many }
    SubqueryTable { query: one }
    MlFunction { model: one, input: opt, settings: opt }
    TableSample {}
    Pivot { source: one, aggregates: many, pivot_column: one, values: many }
    Unpivot { source: one, columns: many }
    GroupByClause { items: many }
    Rollup { exprs: many }
    Cube { exprs: many }
    GroupingSets { sets: many }
    GroupingSet { exprs: many }
    OrderByItem { expr: one }
    LimitClause { count: one, offset: opt }
    WindowSpec { partition_by: many, order_by: many, frame: opt }
    WindowFrame { start: one, end: opt }
    WindowBound { offset: opt }
    NamedWindow { spec: one }
    WhenClause { condition: one, result: one }
    StructEntry { value: one }
    SetClause { target: one, value: one }
    ValuesRow { values: many }
    MergeWhen { condition: opt, action: one }
    MergeUpdate { assignments: many }
    MergeInsert { values: many }
    MergeDelete {}
    ColumnDefinition { data_type: one, default: opt, options: opt }
    OptionsClause { entries: many }
    OptionEntry { value: one }
    FunctionParameter { data_type: one }
    AddColumn { column: one }
    DropColumn {}
    RenameColumn {}
    RenameTable { to: one }
    SetTableOptions { options: one }
    ElseIf { condition: one, body: many }

    Select {
        with: opt,
        select_list: many,
        from: opt,
        where_clause: opt,
        group_by: opt,
        having: opt,
        qualify: opt,
        windows: many,
        order_by: many,
        limit: opt,
    }
    SetOperation { left: one, right: one, order_by: many, limit: opt }
    Insert { table: one, rows: many, query: opt }
    Update { table: one, assignments: many, from: opt, where_clause: opt }
    Delete { table: one, where_clause: opt }
    Merge { target: one, source: one, on: one, clauses: many }
    Truncate { table: one }
    CreateTable {
        name: one,
        columns: many,
        partition_by: opt,
        cluster_by: many,
        options: opt,
        query: opt,
    }
    CreateExternalTable { name: one, columns: many, options: one }
    CreateView { name: one, options: opt, query: one }
    CreateFunction { name: one, params: many, returns: opt, body: one }
    CreateModel { name: one, transform: many, options: opt, query: opt }
    CreateSchema { name: one, options: opt }
    AlterTable { name: one, actions: many }
    DropStatement { name: one }
    ExportData { options: one, query: one }
    LoadData { table: one, columns: many, files: one }
    Declare { data_type: opt, default: opt }
    SetVariable { value: one }
    If { condition: one, then_body: many, else_ifs: many, else_body: many }
    While { condition: one, body: many }
    ForIn { query: one, body: many }
    Block { body: many }
    Break {}
    Continue {}
    Call { procedure: one, args: many }
    Assert { condition: one }
    Script { statements: many }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Node {
        Node::from(Identifier::new(name))
    }

    #[test]
    fn test_kind_and_family() {
        let node = ident("x");
        assert_eq!(node.kind(), NodeKind::Identifier);
        assert_eq!(node.family(), Family::Expression);
        assert_eq!(NodeKind::Select.family(), Family::Statement);
        assert_eq!(NodeKind::Rollup.family(), Family::Clause);
        assert_eq!(NodeKind::RangeType.family(), Family::TypeExpression);
        assert_eq!(NodeKind::JsonLiteral.family(), Family::Literal);
    }

    #[test]
    fn test_every_kind_has_a_family_and_name() {
        assert!(NodeKind::ALL.len() > 100);
        for kind in NodeKind::ALL {
            assert!(!kind.name().is_empty());
            let _ = kind.family();
        }
    }

    #[test]
    fn test_slots_in_declaration_order() {
        let node = Node::from(BinaryOp::new(ident("a"), BinaryOperator::Plus, ident("b")));
        let names: Vec<_> = node.slots().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["left", "right"]);
        assert_eq!(node.child_nodes().len(), 2);
    }

    #[test]
    fn test_optional_and_many_slots() {
        let mut select = Select::new();
        select.select_list.push(Node::from(SelectItem::new(ident("a"))));
        let node = Node::from(select);

        let slots = node.slots();
        let (_, where_slot) = slots
            .iter()
            .find(|(name, _)| *name == "where_clause")
            .copied()
            .unwrap();
        assert_eq!(where_slot.cardinality(), Cardinality::Optional);
        assert!(where_slot.nodes().is_empty());

        let (_, list_slot) = slots
            .iter()
            .find(|(name, _)| *name == "select_list")
            .copied()
            .unwrap();
        assert_eq!(list_slot.cardinality(), Cardinality::Many);
        assert_eq!(list_slot.nodes().len(), 1);
    }

    #[test]
    fn test_slot_mut_replaces_in_place() {
        let mut node = Node::from(BinaryOp::new(ident("a"), BinaryOperator::Eq, ident("b")));
        match node.slot_mut("right") {
            Some(SlotMut::One(child)) => *child = ident("c"),
            other => panic!("unexpected slot {:?}", other),
        }
        assert!(node.slot_mut("missing").is_none());
        let Node::BinaryOp(op) = &node else {
            panic!("expected BinaryOp");
        };
        assert_eq!(op.right.name(), Some("c"));
    }

    #[test]
    fn test_interval_unit_ordering() {
        assert!(IntervalUnit::Year.is_coarser_than(IntervalUnit::Month));
        assert!(IntervalUnit::Day.is_coarser_than(IntervalUnit::Second));
        assert!(!IntervalUnit::Hour.is_coarser_than(IntervalUnit::Hour));
        assert!(!IntervalUnit::Minute.is_coarser_than(IntervalUnit::Day));
    }

    #[test]
    fn test_operator_precedence() {
        assert!(BinaryOperator::Multiply.precedence() > BinaryOperator::Plus.precedence());
        assert!(BinaryOperator::Plus.precedence() > BinaryOperator::Eq.precedence());
        assert!(BinaryOperator::Eq.precedence() > BinaryOperator::And.precedence());
        assert!(BinaryOperator::And.precedence() > BinaryOperator::Or.precedence());
        assert!(BinaryOperator::GtEq.is_comparison());
        assert_eq!(UnaryOperator::Not.precedence(), Precedence::NOT);
    }

    #[test]
    fn test_table_name_parts() {
        let name = TableName {
            project: Some("p".into()),
            dataset: Some("d".into()),
            table: "t".into(),
        };
        assert_eq!(name.parts(), vec!["p", "d", "t"]);
        assert_eq!(TableName::new("t").parts(), vec!["t"]);
    }

    #[test]
    fn test_type_name_aliases() {
        assert_eq!(TypeName::from_name("integer"), Some(TypeName::Int64));
        assert_eq!(TypeName::from_name("DECIMAL"), Some(TypeName::Numeric));
        assert_eq!(TypeName::from_name("varchar"), None);
    }

    #[test]
    fn test_json_interchange() {
        let node = Node::from(BinaryOp::new(
            ident("id"),
            BinaryOperator::Eq,
            Node::from(IntegerLiteral::new(1)),
        ));
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("binary_op"));
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
