//! SQL generator
//!
//! Turns a [`Node`] tree back into BigQuery SQL text.
//!
//! Output is driven by a [`GeneratorConfig`]:
//!
//! - [`Mode::Compact`] puts everything on one line with single spaces.
//! - [`Mode::Pretty`] starts each clause on its own line and indents nested
//!   queries and select lists by one [`indent`](GeneratorConfig::indent) per
//!   level.
//!
//! Parentheses are only added where the tree shape would otherwise be lost:
//! a child binding looser than its parent, an equal-precedence right operand,
//! or either side of a comparison.
//!
//! ```
//! use symbo_sql::builder::*;
//! use symbo_sql::generator::Generator;
//!
//! let expr = col("a").add(col("b")).mul(col("c"));
//! assert_eq!(Generator::sql(&expr.into_inner()).unwrap(), "(a + b) * c");
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
#[cfg(feature = "bindings")]
use ts_rs::TS;

use crate::error::{Error, Result};
use crate::expressions::*;

/// Layout of the generated text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Compact,
    Pretty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum KeywordCase {
    #[default]
    Upper,
    Lower,
}

/// Generator settings.
///
/// Every field has a default, so a partial JSON object is a valid config:
///
/// ```
/// use symbo_sql::generator::{GeneratorConfig, Mode};
///
/// let config: GeneratorConfig = serde_json::from_str(r#"{"mode": "pretty"}"#).unwrap();
/// assert_eq!(config.mode, Mode::Pretty);
/// assert_eq!(config.indent, "  ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "bindings", derive(TS))]
#[serde(default)]
pub struct GeneratorConfig {
    pub mode: Mode,
    /// One level of indentation in pretty mode.
    pub indent: String,
    pub keyword_case: KeywordCase,
    /// Backtick every identifier, not just the ones that need it.
    pub quote_all_identifiers: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            mode: Mode::Compact,
            indent: "  ".to_string(),
            keyword_case: KeywordCase::Upper,
            quote_all_identifiers: false,
        }
    }
}

impl GeneratorConfig {
    pub fn pretty() -> Self {
        GeneratorConfig {
            mode: Mode::Pretty,
            ..Default::default()
        }
    }

    pub fn compact() -> Self {
        GeneratorConfig::default()
    }
}

/// BigQuery reserved keywords; identifiers spelled like one are backticked.
static RESERVED_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "ALL", "AND", "ANY", "ARRAY", "AS", "ASC", "ASSERT_ROWS_MODIFIED", "AT", "BETWEEN",
        "BY", "CASE", "CAST", "COLLATE", "CONTAINS", "CREATE", "CROSS", "CUBE", "CURRENT",
        "DEFAULT", "DEFINE", "DESC", "DISTINCT", "ELSE", "END", "ENUM", "ESCAPE", "EXCEPT",
        "EXCLUDE", "EXISTS", "EXTRACT", "FALSE", "FETCH", "FOLLOWING", "FOR", "FROM", "FULL",
        "GROUP", "GROUPING", "GROUPS", "HASH", "HAVING", "IF", "IGNORE", "IN", "INNER",
        "INTERSECT", "INTERVAL", "INTO", "IS", "JOIN", "LATERAL", "LEFT", "LIKE", "LIMIT",
        "LOOKUP", "MERGE", "NATURAL", "NEW", "NO", "NOT", "NULL", "NULLS", "OF", "ON", "OR",
        "ORDER", "OUTER", "OVER", "PARTITION", "PRECEDING", "PROTO", "QUALIFY", "RANGE",
        "RECURSIVE", "RESPECT", "RIGHT", "ROLLUP", "ROWS", "SELECT", "SET", "SOME", "STRUCT",
        "TABLESAMPLE", "THEN", "TO", "TREAT", "TRUE", "UNBOUNDED", "UNION", "UNNEST", "USING",
        "WHEN", "WHERE", "WINDOW", "WITH", "WITHIN",
    ]
    .into_iter()
    .collect()
});

pub fn is_reserved_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS.contains(word.to_ascii_uppercase().as_str())
}

fn needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    !(first == '_' || first.is_ascii_alphabetic())
        || !chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        || is_reserved_keyword(name)
}

/// Binding power of an expression node as seen by its parent.
fn precedence(node: &Node) -> u8 {
    match node {
        Node::BinaryOp(op) => op.op.precedence(),
        Node::UnaryOp(op) => op.op.precedence(),
        Node::In(_) | Node::Between(_) | Node::Like(_) | Node::IsTest(_) => Precedence::COMPARISON,
        Node::ArrayAccess(_) | Node::FieldAccess(_) => Precedence::POSTFIX,
        Node::IntegerLiteral(n) if n.value < 0 => Precedence::UNARY,
        Node::FloatLiteral(n) if n.value.is_sign_negative() => Precedence::UNARY,
        _ => Precedence::ATOM,
    }
}

/// Serialize `node` with the given settings.
pub fn serialize(node: &Node, config: &GeneratorConfig) -> Result<String> {
    Generator::with_config(config.clone()).generate(node)
}

/// Stateful SQL writer; reusable across calls to [`generate`](Self::generate).
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GeneratorConfig,
    output: String,
    level: usize,
}

impl Generator {
    pub fn new() -> Self {
        Self::with_config(GeneratorConfig::default())
    }

    pub fn with_config(config: GeneratorConfig) -> Self {
        Generator {
            config,
            output: String::new(),
            level: 0,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Compact SQL with default settings.
    pub fn sql(node: &Node) -> Result<String> {
        Generator::new().generate(node)
    }

    /// Pretty-printed SQL with default indentation.
    pub fn pretty_sql(node: &Node) -> Result<String> {
        Generator::with_config(GeneratorConfig::pretty()).generate(node)
    }

    #[instrument(level = "debug", skip_all, fields(kind = %node.kind(), mode = ?self.config.mode))]
    pub fn generate(&mut self, node: &Node) -> Result<String> {
        self.output.clear();
        self.level = 0;
        self.node(node)?;
        debug!(len = self.output.len(), "generated sql");
        Ok(std::mem::take(&mut self.output))
    }

    // -- Low-level writers --

    fn push(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn keyword(&mut self, keyword: &str) {
        match self.config.keyword_case {
            KeywordCase::Upper => self.output.push_str(keyword),
            KeywordCase::Lower => self.output.push_str(&keyword.to_ascii_lowercase()),
        }
    }

    fn is_pretty(&self) -> bool {
        self.config.mode == Mode::Pretty
    }

    fn newline(&mut self) {
        self.output.push('\n');
        for _ in 0..self.level {
            self.output.push_str(&self.config.indent);
        }
    }

    /// Clause separator: a line break in pretty mode, a space otherwise.
    fn sep(&mut self) {
        if self.is_pretty() {
            self.newline();
        } else {
            self.output.push(' ');
        }
    }

    fn indented<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.level += 1;
        let result = f(self);
        self.level -= 1;
        result
    }

    fn list(&mut self, nodes: &[Node]) -> Result<()> {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.node(node)?;
        }
        Ok(())
    }

    /// A list following a keyword: inline in compact mode, one item per
    /// indented line in pretty mode.
    fn items(&mut self, nodes: &[Node]) -> Result<()> {
        if !self.is_pretty() {
            self.push(" ");
            return self.list(nodes);
        }
        self.indented(|g| {
            for (i, node) in nodes.iter().enumerate() {
                if i > 0 {
                    g.push(",");
                }
                g.newline();
                g.node(node)?;
            }
            Ok(())
        })
    }

    /// A parenthesized list, e.g. column definitions.
    fn paren_items(&mut self, nodes: &[Node]) -> Result<()> {
        self.push("(");
        if self.is_pretty() {
            self.items(nodes)?;
            self.newline();
        } else {
            self.list(nodes)?;
        }
        self.push(")");
        Ok(())
    }

    fn ident(&mut self, name: &str, quoted: bool) {
        if quoted || self.config.quote_all_identifiers || needs_quoting(name) {
            self.output.push('`');
            for c in name.chars() {
                if c == '`' || c == '\\' {
                    self.output.push('\\');
                }
                self.output.push(c);
            }
            self.output.push('`');
        } else {
            self.output.push_str(name);
        }
    }

    fn ident_list(&mut self, names: &[String]) {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(name, false);
        }
    }

    fn alias(&mut self, alias: Option<&str>) {
        if let Some(alias) = alias {
            self.push(" ");
            self.keyword("AS");
            self.push(" ");
            self.ident(alias, false);
        }
    }

    fn quoted_text(&mut self, value: &str, quote: QuoteStyle, raw: bool) {
        let delimiter = quote.delimiter();
        let quote_char = if delimiter.starts_with('"') { '"' } else { '\'' };
        let triple = delimiter.len() == 3;
        self.output.push_str(delimiter);
        if raw {
            self.output.push_str(value);
        } else {
            for c in value.chars() {
                match c {
                    '\\' => self.output.push_str("\\\\"),
                    c if c == quote_char => {
                        self.output.push('\\');
                        self.output.push(c);
                    }
                    '\n' if !triple => self.output.push_str("\\n"),
                    '\r' if !triple => self.output.push_str("\\r"),
                    '\t' if !triple => self.output.push_str("\\t"),
                    c => self.output.push(c),
                }
            }
        }
        self.output.push_str(delimiter);
    }

    fn string(&mut self, value: &str) {
        self.quoted_text(value, QuoteStyle::Single, false);
    }

    /// `KEYWORD 'text'`, the shape of every typed literal.
    fn typed_literal(&mut self, keyword: &str, value: &str) {
        self.keyword(keyword);
        self.push(" ");
        self.string(value);
    }

    fn require(&self, nodes: &[Node], kind: NodeKind, what: &str) -> Result<()> {
        if nodes.is_empty() {
            return Err(Error::serialization(
                kind.name(),
                format!("{what} must not be empty"),
            ));
        }
        Ok(())
    }

    // -- Expressions --

    /// Write a child expression, parenthesized when its binding power would
    /// otherwise regroup it under `parent`.
    fn operand(&mut self, child: &Node, parent: u8, right: bool) -> Result<()> {
        let child_prec = precedence(child);
        let wrap = child_prec < parent
            || (child_prec == parent && (right || parent == Precedence::COMPARISON));
        if wrap {
            self.push("(");
            self.node(child)?;
            self.push(")");
            Ok(())
        } else {
            self.node(child)
        }
    }

    /// A nested query in parentheses, indented one level in pretty mode.
    fn subquery(&mut self, query: &Node) -> Result<()> {
        self.push("(");
        if self.is_pretty() {
            self.indented(|g| {
                g.newline();
                g.node(query)
            })?;
            self.newline();
        } else {
            self.node(query)?;
        }
        self.push(")");
        Ok(())
    }

    fn binary_op(&mut self, op: &BinaryOp) -> Result<()> {
        let prec = op.op.precedence();
        self.operand(&op.left, prec, false)?;
        self.push(" ");
        if op.op.is_keyword() {
            self.keyword(op.op.as_str());
        } else {
            self.push(op.op.as_str());
        }
        self.push(" ");
        self.operand(&op.right, prec, true)
    }

    fn unary_op(&mut self, op: &UnaryOp) -> Result<()> {
        if op.op == UnaryOperator::Not {
            self.keyword("NOT");
            self.push(" ");
        } else {
            self.push(op.op.as_str());
        }
        self.operand(&op.operand, op.op.precedence(), true)
    }

    fn function_call(&mut self, call: &FunctionCall) -> Result<()> {
        self.push(&call.name);
        self.push("(");
        if call.distinct {
            self.keyword("DISTINCT");
            self.push(" ");
        }
        self.list(&call.args)?;
        match call.null_handling {
            Some(NullHandling::IgnoreNulls) => {
                self.push(" ");
                self.keyword("IGNORE NULLS");
            }
            Some(NullHandling::RespectNulls) => {
                self.push(" ");
                self.keyword("RESPECT NULLS");
            }
            None => {}
        }
        if !call.order_by.is_empty() {
            self.push(" ");
            self.keyword("ORDER BY");
            self.push(" ");
            self.list(&call.order_by)?;
        }
        if let Some(limit) = &call.limit {
            self.push(" ");
            self.keyword("LIMIT");
            self.push(" ");
            self.node(limit)?;
        }
        self.push(")");
        Ok(())
    }

    fn window_function(&mut self, wf: &WindowFunction) -> Result<()> {
        self.node(&wf.function)?;
        self.push(" ");
        self.keyword("OVER");
        self.push(" ");
        match wf.window.as_ref() {
            Node::WindowSpec(spec)
                if spec.partition_by.is_empty() && spec.order_by.is_empty() && spec.frame.is_none() =>
            {
                match &spec.base {
                    Some(base) => self.ident(base, false),
                    None => self.push("()"),
                }
            }
            Node::WindowSpec(spec) => {
                self.push("(");
                self.window_spec(spec)?;
                self.push(")");
            }
            other => {
                return Err(Error::serialization(
                    "WindowFunction",
                    format!("expected a window specification, found {}", other.kind()),
                ))
            }
        }
        Ok(())
    }

    fn window_spec(&mut self, spec: &WindowSpec) -> Result<()> {
        let mut need_space = false;
        if let Some(base) = &spec.base {
            self.ident(base, false);
            need_space = true;
        }
        if !spec.partition_by.is_empty() {
            if need_space {
                self.push(" ");
            }
            self.keyword("PARTITION BY");
            self.push(" ");
            self.list(&spec.partition_by)?;
            need_space = true;
        }
        if !spec.order_by.is_empty() {
            if need_space {
                self.push(" ");
            }
            self.keyword("ORDER BY");
            self.push(" ");
            self.list(&spec.order_by)?;
            need_space = true;
        }
        if let Some(frame) = &spec.frame {
            if need_space {
                self.push(" ");
            }
            self.node(frame)?;
        }
        Ok(())
    }

    fn window_bound(&mut self, bound: &WindowBound) -> Result<()> {
        let (keyword, offset) = match bound.kind {
            BoundKind::UnboundedPreceding => ("UNBOUNDED PRECEDING", false),
            BoundKind::Preceding => ("PRECEDING", true),
            BoundKind::CurrentRow => ("CURRENT ROW", false),
            BoundKind::Following => ("FOLLOWING", true),
            BoundKind::UnboundedFollowing => ("UNBOUNDED FOLLOWING", false),
        };
        if offset {
            let value = bound.offset.as_ref().ok_or_else(|| {
                Error::serialization("WindowBound", format!("{keyword} needs an offset"))
            })?;
            self.node(value)?;
            self.push(" ");
        }
        self.keyword(keyword);
        Ok(())
    }

    fn in_predicate(&mut self, pred: &In) -> Result<()> {
        self.operand(&pred.expr, Precedence::COMPARISON, false)?;
        self.push(" ");
        if pred.negated {
            self.keyword("NOT");
            self.push(" ");
        }
        self.keyword("IN");
        self.push(" ");
        if let Some(query) = &pred.query {
            self.subquery(query)
        } else if let Some(array) = &pred.unnest {
            self.keyword("UNNEST");
            self.push("(");
            self.node(array)?;
            self.push(")");
            Ok(())
        } else {
            self.require(&pred.list, NodeKind::In, "IN list")?;
            self.push("(");
            self.list(&pred.list)?;
            self.push(")");
            Ok(())
        }
    }

    fn negatable(&mut self, negated: bool, keyword: &str) {
        self.push(" ");
        if negated {
            self.keyword("NOT");
            self.push(" ");
        }
        self.keyword(keyword);
        self.push(" ");
    }

    fn case(&mut self, case: &Case) -> Result<()> {
        self.require(&case.whens, NodeKind::Case, "CASE WHEN list")?;
        self.keyword("CASE");
        if let Some(operand) = &case.operand {
            self.push(" ");
            self.node(operand)?;
        }
        for when in &case.whens {
            self.push(" ");
            self.node(when)?;
        }
        if let Some(result) = &case.else_result {
            self.push(" ");
            self.keyword("ELSE");
            self.push(" ");
            self.node(result)?;
        }
        self.push(" ");
        self.keyword("END");
        Ok(())
    }

    fn star(&mut self, star: &Star) -> Result<()> {
        if let Some(qualifier) = &star.qualifier {
            self.node(qualifier)?;
            self.push(".");
        }
        self.push("*");
        if !star.except.is_empty() {
            self.push(" ");
            self.keyword("EXCEPT");
            self.push(" (");
            self.list(&star.except)?;
            self.push(")");
        }
        if !star.replace.is_empty() {
            self.push(" ");
            self.keyword("REPLACE");
            self.push(" (");
            self.list(&star.replace)?;
            self.push(")");
        }
        Ok(())
    }

    // -- Literals --

    fn integer(&mut self, n: &IntegerLiteral) {
        let text = match (n.hex, n.value < 0) {
            (true, false) => format!("0x{:X}", n.value),
            (true, true) => format!("-0x{:X}", n.value.unsigned_abs()),
            (false, _) => n.value.to_string(),
        };
        self.push(&text);
    }

    fn float(&mut self, n: &FloatLiteral) -> Result<()> {
        if !n.value.is_finite() {
            return Err(Error::serialization(
                "FloatLiteral",
                format!("{} has no SQL literal form", n.value),
            ));
        }
        // Debug formatting always keeps a decimal point or exponent.
        self.push(&format!("{:?}", n.value));
        Ok(())
    }

    fn timestamp(&mut self, ts: &TimestampLiteral) {
        let text = match &ts.time_zone {
            Some(zone) => format!("{} {}", ts.value, zone),
            None => ts.value.clone(),
        };
        self.typed_literal("TIMESTAMP", &text);
    }

    fn interval(&mut self, interval: &IntervalLiteral) -> Result<()> {
        self.keyword("INTERVAL");
        self.push(" ");
        self.node(&interval.value)?;
        self.push(" ");
        self.keyword(interval.unit.as_str());
        if let Some(end) = interval.end_unit {
            self.push(" ");
            self.keyword("TO");
            self.push(" ");
            self.keyword(end.as_str());
        }
        Ok(())
    }

    fn struct_literal(&mut self, s: &StructLiteral) -> Result<()> {
        match &s.struct_type {
            Some(ty) => self.node(ty)?,
            None => self.keyword("STRUCT"),
        }
        self.push("(");
        self.list(&s.fields)?;
        self.push(")");
        Ok(())
    }

    fn range_literal(&mut self, range: &RangeLiteral) -> Result<()> {
        self.keyword("RANGE");
        self.push("<");
        self.node(&range.element_type)?;
        self.push("> ");
        let text = format!(
            "[{}, {})",
            range.lower.as_deref().unwrap_or("UNBOUNDED"),
            range.upper.as_deref().unwrap_or("UNBOUNDED"),
        );
        self.string(&text);
        Ok(())
    }

    // -- FROM sources --

    fn table_name(&mut self, name: &TableName) {
        for (i, part) in name.parts().into_iter().enumerate() {
            if i > 0 {
                self.push(".");
            }
            self.ident(part, false);
        }
    }

    fn table_ref(&mut self, table: &TableRef) -> Result<()> {
        self.node(&table.table)?;
        self.alias(table.alias.as_deref());
        if let Some(ts) = &table.system_time {
            self.push(" ");
            self.keyword("FOR SYSTEM_TIME AS OF");
            self.push(" ");
            self.node(ts)?;
        }
        if let Some(sample) = &table.sample {
            self.push(" ");
            self.node(sample)?;
        }
        Ok(())
    }

    fn join(&mut self, join: &Join) -> Result<()> {
        self.node(&join.left)?;
        self.sep();
        self.keyword(join.kind.as_str());
        self.push(" ");
        if join.right.is(NodeKind::Join) {
            self.push("(");
            self.node(&join.right)?;
            self.push(")");
        } else {
            self.node(&join.right)?;
        }
        if let Some(on) = &join.on {
            self.push(" ");
            self.keyword("ON");
            self.push(" ");
            self.node(on)?;
        } else if !join.using.is_empty() {
            self.push(" ");
            self.keyword("USING");
            self.push(" (");
            self.ident_list(&join.using);
            self.push(")");
        }
        Ok(())
    }

    fn unnest(&mut self, unnest: &Unnest) -> Result<()> {
        self.keyword("UNNEST");
        self.push("(");
        self.node(&unnest.array)?;
        self.push(")");
        self.alias(unnest.alias.as_deref());
        if unnest.with_offset {
            self.push(" ");
            self.keyword("WITH OFFSET");
            self.alias(unnest.offset_alias.as_deref());
        }
        Ok(())
    }

    fn ml_function(&mut self, ml: &MlFunction) -> Result<()> {
        self.push(ml.function.as_str());
        self.push("(");
        self.keyword("MODEL");
        self.push(" ");
        self.node(&ml.model)?;
        if let Some(input) = &ml.input {
            self.push(", ");
            match input.as_ref() {
                Node::TableName(_) | Node::TableRef(_) => {
                    self.keyword("TABLE");
                    self.push(" ");
                    self.node(input)?;
                }
                query if query.is_query() => self.subquery(query)?,
                other => self.node(other)?,
            }
        }
        if let Some(settings) = &ml.settings {
            self.push(", ");
            self.node(settings)?;
        }
        self.push(")");
        self.alias(ml.alias.as_deref());
        Ok(())
    }

    fn table_sample(&mut self, sample: &TableSample) {
        self.keyword("TABLESAMPLE SYSTEM");
        let (amount, unit) = match sample.size {
            SampleSize::Percent(p) => (p.to_string(), "PERCENT"),
            SampleSize::Rows(n) => (n.to_string(), "ROWS"),
        };
        self.push(" (");
        self.push(&amount);
        self.push(" ");
        self.keyword(unit);
        self.push(")");
    }

    fn pivot(&mut self, pivot: &Pivot) -> Result<()> {
        self.require(&pivot.aggregates, NodeKind::Pivot, "PIVOT aggregate list")?;
        self.require(&pivot.values, NodeKind::Pivot, "PIVOT value list")?;
        self.node(&pivot.source)?;
        self.push(" ");
        self.keyword("PIVOT");
        self.push("(");
        self.list(&pivot.aggregates)?;
        self.push(" ");
        self.keyword("FOR");
        self.push(" ");
        self.node(&pivot.pivot_column)?;
        self.push(" ");
        self.keyword("IN");
        self.push(" (");
        self.list(&pivot.values)?;
        self.push("))");
        self.alias(pivot.alias.as_deref());
        Ok(())
    }

    fn unpivot(&mut self, unpivot: &Unpivot) -> Result<()> {
        self.require(&unpivot.columns, NodeKind::Unpivot, "UNPIVOT column list")?;
        self.node(&unpivot.source)?;
        self.push(" ");
        self.keyword("UNPIVOT");
        if unpivot.include_nulls {
            self.push(" ");
            self.keyword("INCLUDE NULLS");
        }
        self.push("(");
        self.ident(&unpivot.value_column, false);
        self.push(" ");
        self.keyword("FOR");
        self.push(" ");
        self.ident(&unpivot.name_column, false);
        self.push(" ");
        self.keyword("IN");
        self.push(" (");
        self.list(&unpivot.columns)?;
        self.push("))");
        self.alias(unpivot.alias.as_deref());
        Ok(())
    }

    // -- Query statements --

    fn clause(&mut self, keyword: &str, node: &Node) -> Result<()> {
        self.sep();
        self.keyword(keyword);
        self.push(" ");
        self.node(node)
    }

    fn order_and_limit(&mut self, order_by: &[Node], limit: Option<&Node>) -> Result<()> {
        if !order_by.is_empty() {
            self.sep();
            self.keyword("ORDER BY");
            self.push(" ");
            self.list(order_by)?;
        }
        if let Some(limit) = limit {
            self.sep();
            self.node(limit)?;
        }
        Ok(())
    }

    fn select(&mut self, select: &Select) -> Result<()> {
        self.require(&select.select_list, NodeKind::Select, "select list")?;
        if let Some(with) = &select.with {
            self.node(with)?;
            self.sep();
        }
        self.keyword("SELECT");
        if select.distinct {
            self.push(" ");
            self.keyword("DISTINCT");
        }
        self.items(&select.select_list)?;
        if let Some(from) = &select.from {
            self.sep();
            self.node(from)?;
        }
        if let Some(condition) = &select.where_clause {
            self.clause("WHERE", condition)?;
        }
        if let Some(group_by) = &select.group_by {
            self.sep();
            self.node(group_by)?;
        }
        if let Some(condition) = &select.having {
            self.clause("HAVING", condition)?;
        }
        if let Some(condition) = &select.qualify {
            self.clause("QUALIFY", condition)?;
        }
        if !select.windows.is_empty() {
            self.sep();
            self.keyword("WINDOW");
            self.push(" ");
            self.list(&select.windows)?;
        }
        self.order_and_limit(&select.order_by, select.limit.as_deref())
    }

    fn set_operand(&mut self, node: &Node, parent: &SetOperation, right: bool) -> Result<()> {
        let wrap = match node {
            Node::SetOperation(child) => {
                right
                    || child.op != parent.op
                    || child.quantifier != parent.quantifier
                    || !child.order_by.is_empty()
                    || child.limit.is_some()
            }
            Node::Select(select) => !select.order_by.is_empty() || select.limit.is_some(),
            _ => false,
        };
        if wrap {
            self.subquery(node)
        } else {
            self.node(node)
        }
    }

    fn set_operation(&mut self, op: &SetOperation) -> Result<()> {
        self.set_operand(&op.left, op, false)?;
        self.sep();
        self.keyword(op.op.as_str());
        self.push(" ");
        self.keyword(match op.quantifier {
            SetQuantifier::All => "ALL",
            SetQuantifier::Distinct => "DISTINCT",
        });
        self.sep();
        self.set_operand(&op.right, op, true)?;
        self.order_and_limit(&op.order_by, op.limit.as_deref())
    }

    fn group_by(&mut self, group: &GroupByClause) -> Result<()> {
        self.keyword("GROUP BY");
        self.push(" ");
        if group.all {
            self.keyword("ALL");
            return Ok(());
        }
        self.require(&group.items, NodeKind::GroupByClause, "GROUP BY list")?;
        self.list(&group.items)
    }

    fn grouping(&mut self, keyword: &str, kind: NodeKind, exprs: &[Node]) -> Result<()> {
        self.require(exprs, kind, keyword)?;
        self.keyword(keyword);
        self.push("(");
        self.list(exprs)?;
        self.push(")");
        Ok(())
    }

    // -- DML --

    fn insert(&mut self, insert: &Insert) -> Result<()> {
        self.keyword("INSERT INTO");
        self.push(" ");
        self.node(&insert.table)?;
        if !insert.columns.is_empty() {
            self.push(" (");
            self.ident_list(&insert.columns);
            self.push(")");
        }
        match (&insert.query, insert.rows.is_empty()) {
            (Some(query), true) => {
                self.sep();
                self.node(query)
            }
            (None, false) => {
                self.sep();
                self.keyword("VALUES");
                self.push(" ");
                self.list(&insert.rows)
            }
            (Some(_), false) => Err(Error::serialization(
                "Insert",
                "INSERT cannot have both VALUES rows and a query",
            )),
            (None, true) => Err(Error::serialization("Insert", "INSERT needs VALUES rows or a query")),
        }
    }

    fn update(&mut self, update: &Update) -> Result<()> {
        self.require(&update.assignments, NodeKind::Update, "SET list")?;
        let condition = update
            .where_clause
            .as_ref()
            .ok_or_else(|| Error::serialization("Update", "UPDATE requires a WHERE clause"))?;
        self.keyword("UPDATE");
        self.push(" ");
        self.node(&update.table)?;
        self.sep();
        self.keyword("SET");
        self.push(" ");
        self.list(&update.assignments)?;
        if let Some(from) = &update.from {
            self.sep();
            self.node(from)?;
        }
        self.clause("WHERE", condition)
    }

    fn delete(&mut self, delete: &Delete) -> Result<()> {
        let condition = delete
            .where_clause
            .as_ref()
            .ok_or_else(|| Error::serialization("Delete", "DELETE requires a WHERE clause"))?;
        self.keyword("DELETE FROM");
        self.push(" ");
        self.node(&delete.table)?;
        self.clause("WHERE", condition)
    }

    fn merge(&mut self, merge: &Merge) -> Result<()> {
        self.require(&merge.clauses, NodeKind::Merge, "WHEN clause list")?;
        self.keyword("MERGE");
        self.push(" ");
        self.node(&merge.target)?;
        self.sep();
        self.keyword("USING");
        self.push(" ");
        self.node(&merge.source)?;
        self.sep();
        self.keyword("ON");
        self.push(" ");
        self.node(&merge.on)?;
        for clause in &merge.clauses {
            self.sep();
            self.node(clause)?;
        }
        Ok(())
    }

    fn merge_when(&mut self, when: &MergeWhen) -> Result<()> {
        self.keyword(match when.matched {
            MergeMatch::Matched => "WHEN MATCHED",
            MergeMatch::NotMatchedByTarget => "WHEN NOT MATCHED",
            MergeMatch::NotMatchedBySource => "WHEN NOT MATCHED BY SOURCE",
        });
        if let Some(condition) = &when.condition {
            self.push(" ");
            self.keyword("AND");
            self.push(" ");
            self.node(condition)?;
        }
        self.push(" ");
        self.keyword("THEN");
        self.push(" ");
        self.node(&when.action)
    }

    fn merge_insert(&mut self, insert: &MergeInsert) -> Result<()> {
        self.keyword("INSERT");
        if insert.row {
            self.push(" ");
            self.keyword("ROW");
            return Ok(());
        }
        self.require(&insert.values, NodeKind::MergeInsert, "INSERT value list")?;
        if !insert.columns.is_empty() {
            self.push(" (");
            self.ident_list(&insert.columns);
            self.push(")");
        }
        self.push(" ");
        self.keyword("VALUES");
        self.push(" (");
        self.list(&insert.values)?;
        self.push(")");
        Ok(())
    }

    // -- DDL --

    fn create_prefix(&mut self, or_replace: bool, temporary: bool, object: &str, if_not_exists: bool) {
        self.keyword("CREATE");
        if or_replace {
            self.push(" ");
            self.keyword("OR REPLACE");
        }
        if temporary {
            self.push(" ");
            self.keyword("TEMP");
        }
        self.push(" ");
        self.keyword(object);
        if if_not_exists {
            self.push(" ");
            self.keyword("IF NOT EXISTS");
        }
        self.push(" ");
    }

    fn optional_clause(&mut self, node: Option<&Node>) -> Result<()> {
        if let Some(node) = node {
            self.sep();
            self.node(node)?;
        }
        Ok(())
    }

    fn as_query(&mut self, query: Option<&Node>) -> Result<()> {
        if let Some(query) = query {
            self.sep();
            self.keyword("AS");
            self.push(" ");
            self.node(query)?;
        }
        Ok(())
    }

    fn create_table(&mut self, create: &CreateTable) -> Result<()> {
        if create.columns.is_empty() && create.query.is_none() {
            return Err(Error::serialization(
                "CreateTable",
                "CREATE TABLE needs columns or an AS query",
            ));
        }
        self.create_prefix(create.or_replace, create.temporary, "TABLE", create.if_not_exists);
        self.node(&create.name)?;
        if !create.columns.is_empty() {
            self.push(" ");
            self.paren_items(&create.columns)?;
        }
        if let Some(partition) = &create.partition_by {
            self.clause("PARTITION BY", partition)?;
        }
        if !create.cluster_by.is_empty() {
            self.sep();
            self.keyword("CLUSTER BY");
            self.push(" ");
            self.list(&create.cluster_by)?;
        }
        self.optional_clause(create.options.as_deref())?;
        self.as_query(create.query.as_deref())
    }

    fn create_function(&mut self, create: &CreateFunction) -> Result<()> {
        self.create_prefix(create.or_replace, create.temporary, "FUNCTION", create.if_not_exists);
        self.node(&create.name)?;
        self.push("(");
        self.list(&create.params)?;
        self.push(")");
        if let Some(returns) = &create.returns {
            self.push(" ");
            self.keyword("RETURNS");
            self.push(" ");
            self.node(returns)?;
        }
        if let Some(language) = &create.language {
            self.push(" ");
            self.keyword("LANGUAGE");
            self.push(" ");
            self.ident(language, false);
        }
        self.push(" ");
        self.keyword("AS");
        self.push(" ");
        if create.language.is_some() {
            self.node(&create.body)
        } else {
            self.push("(");
            self.node(&create.body)?;
            self.push(")");
            Ok(())
        }
    }

    fn create_model(&mut self, create: &CreateModel) -> Result<()> {
        self.create_prefix(create.or_replace, false, "MODEL", create.if_not_exists);
        self.node(&create.name)?;
        if !create.transform.is_empty() {
            self.sep();
            self.keyword("TRANSFORM");
            self.push("(");
            self.list(&create.transform)?;
            self.push(")");
        }
        self.optional_clause(create.options.as_deref())?;
        self.as_query(create.query.as_deref())
    }

    fn alter_table(&mut self, alter: &AlterTable) -> Result<()> {
        self.require(&alter.actions, NodeKind::AlterTable, "ALTER TABLE action list")?;
        self.keyword("ALTER TABLE");
        if alter.if_exists {
            self.push(" ");
            self.keyword("IF EXISTS");
        }
        self.push(" ");
        self.node(&alter.name)?;
        self.items(&alter.actions)
    }

    fn column_definition(&mut self, column: &ColumnDefinition) -> Result<()> {
        self.ident(&column.name, false);
        self.push(" ");
        self.node(&column.data_type)?;
        if column.not_null {
            self.push(" ");
            self.keyword("NOT NULL");
        }
        if let Some(default) = &column.default {
            self.push(" ");
            self.keyword("DEFAULT");
            self.push(" ");
            self.node(default)?;
        }
        if let Some(options) = &column.options {
            self.push(" ");
            self.node(options)?;
        }
        Ok(())
    }

    fn load_data(&mut self, load: &LoadData) -> Result<()> {
        let Node::OptionsClause(files) = load.files.as_ref() else {
            return Err(Error::serialization(
                "LoadData",
                format!("FROM FILES expects an option list, found {}", load.files.kind()),
            ));
        };
        self.keyword("LOAD DATA");
        self.push(" ");
        self.keyword(if load.overwrite { "OVERWRITE" } else { "INTO" });
        self.push(" ");
        self.node(&load.table)?;
        if !load.columns.is_empty() {
            self.push(" ");
            self.paren_items(&load.columns)?;
        }
        self.sep();
        self.keyword("FROM FILES");
        self.push("(");
        self.list(&files.entries)?;
        self.push(")");
        Ok(())
    }

    // -- Scripting --

    /// Statements of a scripting body, each terminated by `;`. Leaves the
    /// cursor on a fresh line (or after a space) for the closing keyword.
    fn body(&mut self, statements: &[Node]) -> Result<()> {
        self.indented(|g| {
            for statement in statements {
                g.sep();
                g.node(statement)?;
                g.push(";");
            }
            Ok(())
        })?;
        self.sep();
        Ok(())
    }

    fn label(&mut self, label: Option<&str>) {
        if let Some(label) = label {
            self.ident(label, false);
            self.push(": ");
        }
    }

    fn if_statement(&mut self, stmt: &If) -> Result<()> {
        self.require(&stmt.then_body, NodeKind::If, "IF body")?;
        self.keyword("IF");
        self.push(" ");
        self.node(&stmt.condition)?;
        self.push(" ");
        self.keyword("THEN");
        self.body(&stmt.then_body)?;
        for else_if in &stmt.else_ifs {
            self.node(else_if)?;
        }
        if !stmt.else_body.is_empty() {
            self.keyword("ELSE");
            self.body(&stmt.else_body)?;
        }
        self.keyword("END IF");
        Ok(())
    }

    fn declare(&mut self, declare: &Declare) -> Result<()> {
        if declare.names.is_empty() {
            return Err(Error::serialization("Declare", "DECLARE needs at least one name"));
        }
        self.keyword("DECLARE");
        self.push(" ");
        self.ident_list(&declare.names);
        if let Some(data_type) = &declare.data_type {
            self.push(" ");
            self.node(data_type)?;
        }
        if let Some(default) = &declare.default {
            self.push(" ");
            self.keyword("DEFAULT");
            self.push(" ");
            self.node(default)?;
        }
        Ok(())
    }

    fn set_variable(&mut self, set: &SetVariable) -> Result<()> {
        self.keyword("SET");
        self.push(" ");
        match set.names.as_slice() {
            [] => return Err(Error::serialization("SetVariable", "SET needs at least one name")),
            [name] => self.ident(name, false),
            names => {
                self.push("(");
                self.ident_list(names);
                self.push(")");
            }
        }
        self.push(" = ");
        self.node(&set.value)
    }

    fn script(&mut self, script: &Script) -> Result<()> {
        self.require(&script.statements, NodeKind::Script, "script")?;
        for (i, statement) in script.statements.iter().enumerate() {
            if i > 0 {
                self.sep();
            }
            self.node(statement)?;
            self.push(";");
        }
        Ok(())
    }

    fn keyword_label(&mut self, keyword: &str, label: Option<&str>) {
        self.keyword(keyword);
        if let Some(label) = label {
            self.push(" ");
            self.ident(label, false);
        }
    }

    // -- Dispatch --

    fn node(&mut self, node: &Node) -> Result<()> {
        match node {
            // Literals
            Node::StringLiteral(s) => self.quoted_text(&s.value, s.quote, s.raw),
            Node::BytesLiteral(b) => {
                self.push(if b.raw { "rb" } else { "b" });
                self.quoted_text(&b.value, b.quote, b.raw);
            }
            Node::IntegerLiteral(n) => self.integer(n),
            Node::FloatLiteral(n) => self.float(n)?,
            Node::NumericLiteral(n) => self.typed_literal("NUMERIC", &n.value),
            Node::BigNumericLiteral(n) => self.typed_literal("BIGNUMERIC", &n.value),
            Node::BooleanLiteral(b) => self.keyword(if b.value { "TRUE" } else { "FALSE" }),
            Node::NullLiteral(_) => self.keyword("NULL"),
            Node::DateLiteral(d) => self.typed_literal("DATE", &d.value),
            Node::TimeLiteral(t) => self.typed_literal("TIME", &t.value),
            Node::DatetimeLiteral(d) => self.typed_literal("DATETIME", &d.value),
            Node::TimestampLiteral(ts) => self.timestamp(ts),
            Node::IntervalLiteral(i) => self.interval(i)?,
            Node::ArrayLiteral(a) => {
                if let Some(ty) = &a.element_type {
                    self.keyword("ARRAY");
                    self.push("<");
                    self.node(ty)?;
                    self.push(">");
                }
                self.push("[");
                self.list(&a.elements)?;
                self.push("]");
            }
            Node::StructLiteral(s) => self.struct_literal(s)?,
            Node::RangeLiteral(r) => self.range_literal(r)?,
            Node::JsonLiteral(j) => self.typed_literal("JSON", &j.value),
            Node::GeographyLiteral(g) => {
                self.push("ST_GEOGFROMTEXT(");
                self.string(&g.wkt);
                self.push(")");
            }

            // Expressions
            Node::Identifier(id) => self.ident(&id.name, id.quoted),
            Node::ColumnRef(c) => {
                if c.parts.len() < 2 {
                    return Err(Error::serialization(
                        "ColumnRef",
                        "a qualified column needs at least two parts",
                    ));
                }
                for (i, part) in c.parts.iter().enumerate() {
                    if i > 0 {
                        self.push(".");
                    }
                    self.node(part)?;
                }
            }
            Node::TableName(t) => self.table_name(t),
            Node::Star(s) => self.star(s)?,
            Node::BinaryOp(op) => self.binary_op(op)?,
            Node::UnaryOp(op) => self.unary_op(op)?,
            Node::FunctionCall(call) => self.function_call(call)?,
            Node::WindowFunction(wf) => self.window_function(wf)?,
            Node::Cast(cast) => {
                self.keyword(if cast.safe { "SAFE_CAST" } else { "CAST" });
                self.push("(");
                self.node(&cast.expr)?;
                self.push(" ");
                self.keyword("AS");
                self.push(" ");
                self.node(&cast.target)?;
                if let Some(format) = &cast.format {
                    self.push(" ");
                    self.keyword("FORMAT");
                    self.push(" ");
                    self.node(format)?;
                }
                self.push(")");
            }
            Node::Extract(e) => {
                self.keyword("EXTRACT");
                self.push("(");
                self.keyword(&e.part);
                self.push(" ");
                self.keyword("FROM");
                self.push(" ");
                self.node(&e.expr)?;
                if let Some(zone) = &e.time_zone {
                    self.push(" ");
                    self.keyword("AT TIME ZONE");
                    self.push(" ");
                    self.node(zone)?;
                }
                self.push(")");
            }
            Node::Case(case) => self.case(case)?,
            Node::ArrayAccess(a) => {
                self.operand(&a.array, Precedence::POSTFIX, false)?;
                self.push("[");
                match a.mode.keyword() {
                    Some(keyword) => {
                        self.keyword(keyword);
                        self.push("(");
                        self.node(&a.index)?;
                        self.push(")");
                    }
                    None => self.node(&a.index)?,
                }
                self.push("]");
            }
            Node::FieldAccess(f) => {
                self.operand(&f.expr, Precedence::POSTFIX, false)?;
                self.push(".");
                self.ident(&f.field, false);
            }
            Node::In(pred) => self.in_predicate(pred)?,
            Node::Between(b) => {
                self.operand(&b.expr, Precedence::COMPARISON, false)?;
                self.negatable(b.negated, "BETWEEN");
                self.operand(&b.low, Precedence::COMPARISON, true)?;
                self.push(" ");
                self.keyword("AND");
                self.push(" ");
                self.operand(&b.high, Precedence::COMPARISON, true)?;
            }
            Node::Like(l) => {
                self.operand(&l.expr, Precedence::COMPARISON, false)?;
                self.negatable(l.negated, "LIKE");
                self.operand(&l.pattern, Precedence::COMPARISON, true)?;
            }
            Node::IsTest(t) => {
                self.operand(&t.expr, Precedence::COMPARISON, false)?;
                self.push(" ");
                self.keyword("IS");
                if t.negated {
                    self.push(" ");
                    self.keyword("NOT");
                }
                self.push(" ");
                self.keyword(t.test.as_str());
            }
            Node::Exists(e) => {
                self.keyword("EXISTS");
                self.push(" ");
                self.subquery(&e.query)?;
            }
            Node::Subquery(s) => self.subquery(&s.query)?,
            Node::ArraySubquery(s) => {
                self.keyword("ARRAY");
                self.subquery(&s.query)?;
            }
            Node::NamedParameter(p) => {
                self.push("@");
                self.push(&p.name);
            }
            Node::PositionalParameter(_) => self.push("?"),
            Node::NamedArgument(arg) => {
                self.ident(&arg.name, false);
                self.push(" => ");
                self.node(&arg.value)?;
            }
            Node::DefaultValue(_) => self.keyword("DEFAULT"),

            // Types
            Node::SimpleType(t) => {
                self.keyword(t.name.as_str());
                if !t.params.is_empty() {
                    let params: Vec<String> = t.params.iter().map(u32::to_string).collect();
                    self.push("(");
                    self.push(&params.join(", "));
                    self.push(")");
                }
            }
            Node::ArrayType(t) => {
                self.keyword("ARRAY");
                self.push("<");
                self.node(&t.element)?;
                self.push(">");
            }
            Node::StructType(t) => {
                self.require(&t.fields, NodeKind::StructType, "STRUCT field list")?;
                self.keyword("STRUCT");
                self.push("<");
                self.list(&t.fields)?;
                self.push(">");
            }
            Node::StructTypeField(f) => {
                if let Some(name) = &f.name {
                    self.ident(name, false);
                    self.push(" ");
                }
                self.node(&f.field_type)?;
            }
            Node::RangeType(t) => {
                self.keyword("RANGE");
                self.push("<");
                self.node(&t.element)?;
                self.push(">");
            }

            // Clauses
            Node::SelectItem(item) => {
                self.node(&item.expr)?;
                self.alias(item.alias.as_deref());
            }
            Node::WithClause(with) => {
                self.require(&with.ctes, NodeKind::WithClause, "WITH list")?;
                self.keyword("WITH");
                if with.recursive {
                    self.push(" ");
                    self.keyword("RECURSIVE");
                }
                self.push(" ");
                self.list(&with.ctes)?;
            }
            Node::Cte(cte) => {
                self.ident(&cte.name, false);
                self.push(" ");
                self.keyword("AS");
                self.push(" ");
                self.subquery(&cte.query)?;
            }
            Node::FromClause(from) => {
                self.require(&from.sources, NodeKind::FromClause, "FROM list")?;
                self.keyword("FROM");
                self.push(" ");
                self.list(&from.sources)?;
            }
            Node::TableRef(t) => self.table_ref(t)?,
            Node::Join(j) => self.join(j)?,
            Node::Unnest(u) => self.unnest(u)?,
            Node::TableFunction(f) => {
                self.push(&f.name);
                self.push("(");
                self.list(&f.args)?;
                self.push(")");
                self.alias(f.alias.as_deref());
            }
            Node::SubqueryTable(s) => {
                self.subquery(&s.query)?;
                self.alias(s.alias.as_deref());
            }
            Node::MlFunction(ml) => self.ml_function(ml)?,
            Node::TableSample(s) => self.table_sample(s),
            Node::Pivot(p) => self.pivot(p)?,
            Node::Unpivot(u) => self.unpivot(u)?,
            Node::GroupByClause(g) => self.group_by(g)?,
            Node::Rollup(r) => self.grouping("ROLLUP", NodeKind::Rollup, &r.exprs)?,
            Node::Cube(c) => self.grouping("CUBE", NodeKind::Cube, &c.exprs)?,
            Node::GroupingSets(g) => self.grouping("GROUPING SETS", NodeKind::GroupingSets, &g.sets)?,
            Node::GroupingSet(g) => {
                self.push("(");
                self.list(&g.exprs)?;
                self.push(")");
            }
            Node::OrderByItem(item) => {
                self.node(&item.expr)?;
                match item.direction {
                    Some(SortDirection::Asc) => {
                        self.push(" ");
                        self.keyword("ASC");
                    }
                    Some(SortDirection::Desc) => {
                        self.push(" ");
                        self.keyword("DESC");
                    }
                    None => {}
                }
                match item.nulls {
                    Some(NullsOrder::First) => {
                        self.push(" ");
                        self.keyword("NULLS FIRST");
                    }
                    Some(NullsOrder::Last) => {
                        self.push(" ");
                        self.keyword("NULLS LAST");
                    }
                    None => {}
                }
            }
            Node::LimitClause(limit) => {
                self.keyword("LIMIT");
                self.push(" ");
                self.node(&limit.count)?;
                if let Some(offset) = &limit.offset {
                    self.push(" ");
                    self.keyword("OFFSET");
                    self.push(" ");
                    self.node(offset)?;
                }
            }
            Node::WindowSpec(spec) => self.window_spec(spec)?,
            Node::WindowFrame(frame) => {
                self.keyword(match frame.unit {
                    FrameUnit::Rows => "ROWS",
                    FrameUnit::Range => "RANGE",
                });
                self.push(" ");
                match &frame.end {
                    Some(end) => {
                        self.keyword("BETWEEN");
                        self.push(" ");
                        self.node(&frame.start)?;
                        self.push(" ");
                        self.keyword("AND");
                        self.push(" ");
                        self.node(end)?;
                    }
                    None => self.node(&frame.start)?,
                }
            }
            Node::WindowBound(b) => self.window_bound(b)?,
            Node::NamedWindow(w) => {
                self.ident(&w.name, false);
                self.push(" ");
                self.keyword("AS");
                self.push(" (");
                self.node(&w.spec)?;
                self.push(")");
            }
            Node::WhenClause(w) => {
                self.keyword("WHEN");
                self.push(" ");
                self.node(&w.condition)?;
                self.push(" ");
                self.keyword("THEN");
                self.push(" ");
                self.node(&w.result)?;
            }
            Node::StructEntry(e) => {
                self.node(&e.value)?;
                self.alias(e.name.as_deref());
            }
            Node::SetClause(s) => {
                self.node(&s.target)?;
                self.push(" = ");
                self.node(&s.value)?;
            }
            Node::ValuesRow(row) => {
                self.require(&row.values, NodeKind::ValuesRow, "VALUES row")?;
                self.push("(");
                self.list(&row.values)?;
                self.push(")");
            }
            Node::MergeWhen(w) => self.merge_when(w)?,
            Node::MergeUpdate(u) => {
                self.require(&u.assignments, NodeKind::MergeUpdate, "SET list")?;
                self.keyword("UPDATE SET");
                self.push(" ");
                self.list(&u.assignments)?;
            }
            Node::MergeInsert(i) => self.merge_insert(i)?,
            Node::MergeDelete(_) => self.keyword("DELETE"),
            Node::ColumnDefinition(c) => self.column_definition(c)?,
            Node::OptionsClause(o) => {
                self.keyword("OPTIONS");
                self.push("(");
                self.list(&o.entries)?;
                self.push(")");
            }
            Node::OptionEntry(e) => {
                self.ident(&e.name, false);
                self.push(" = ");
                self.node(&e.value)?;
            }
            Node::FunctionParameter(p) => {
                self.ident(&p.name, false);
                self.push(" ");
                self.node(&p.data_type)?;
            }
            Node::AddColumn(a) => {
                self.keyword("ADD COLUMN");
                if a.if_not_exists {
                    self.push(" ");
                    self.keyword("IF NOT EXISTS");
                }
                self.push(" ");
                self.node(&a.column)?;
            }
            Node::DropColumn(d) => {
                self.keyword("DROP COLUMN");
                if d.if_exists {
                    self.push(" ");
                    self.keyword("IF EXISTS");
                }
                self.push(" ");
                self.ident(&d.name, false);
            }
            Node::RenameColumn(r) => {
                self.keyword("RENAME COLUMN");
                if r.if_exists {
                    self.push(" ");
                    self.keyword("IF EXISTS");
                }
                self.push(" ");
                self.ident(&r.from, false);
                self.push(" ");
                self.keyword("TO");
                self.push(" ");
                self.ident(&r.to, false);
            }
            Node::RenameTable(r) => {
                self.keyword("RENAME TO");
                self.push(" ");
                self.node(&r.to)?;
            }
            Node::SetTableOptions(s) => {
                self.keyword("SET");
                self.push(" ");
                self.node(&s.options)?;
            }
            Node::ElseIf(e) => {
                self.require(&e.body, NodeKind::ElseIf, "ELSEIF body")?;
                self.keyword("ELSEIF");
                self.push(" ");
                self.node(&e.condition)?;
                self.push(" ");
                self.keyword("THEN");
                self.body(&e.body)?;
            }

            // Statements
            Node::Select(s) => self.select(s)?,
            Node::SetOperation(op) => self.set_operation(op)?,
            Node::Insert(i) => self.insert(i)?,
            Node::Update(u) => self.update(u)?,
            Node::Delete(d) => self.delete(d)?,
            Node::Merge(m) => self.merge(m)?,
            Node::Truncate(t) => {
                self.keyword("TRUNCATE TABLE");
                self.push(" ");
                self.node(&t.table)?;
            }
            Node::CreateTable(c) => self.create_table(c)?,
            Node::CreateExternalTable(c) => {
                self.create_prefix(c.or_replace, false, "EXTERNAL TABLE", c.if_not_exists);
                self.node(&c.name)?;
                if !c.columns.is_empty() {
                    self.push(" ");
                    self.paren_items(&c.columns)?;
                }
                self.sep();
                self.node(&c.options)?;
            }
            Node::CreateView(c) => {
                let object = if c.materialized { "MATERIALIZED VIEW" } else { "VIEW" };
                self.create_prefix(c.or_replace, false, object, c.if_not_exists);
                self.node(&c.name)?;
                self.optional_clause(c.options.as_deref())?;
                self.as_query(Some(c.query.as_ref()))?;
            }
            Node::CreateFunction(c) => self.create_function(c)?,
            Node::CreateModel(c) => self.create_model(c)?,
            Node::CreateSchema(c) => {
                self.create_prefix(false, false, "SCHEMA", c.if_not_exists);
                self.node(&c.name)?;
                self.optional_clause(c.options.as_deref())?;
            }
            Node::AlterTable(a) => self.alter_table(a)?,
            Node::DropStatement(d) => {
                self.keyword("DROP");
                self.push(" ");
                self.keyword(d.object.as_str());
                if d.if_exists {
                    self.push(" ");
                    self.keyword("IF EXISTS");
                }
                self.push(" ");
                self.node(&d.name)?;
                if d.cascade {
                    self.push(" ");
                    self.keyword("CASCADE");
                }
            }
            Node::ExportData(e) => {
                self.keyword("EXPORT DATA");
                self.push(" ");
                self.node(&e.options)?;
                self.as_query(Some(e.query.as_ref()))?;
            }
            Node::LoadData(l) => self.load_data(l)?,
            Node::Declare(d) => self.declare(d)?,
            Node::SetVariable(s) => self.set_variable(s)?,
            Node::If(stmt) => self.if_statement(stmt)?,
            Node::While(w) => {
                self.label(w.label.as_deref());
                self.keyword("WHILE");
                self.push(" ");
                self.node(&w.condition)?;
                self.push(" ");
                self.keyword("DO");
                self.body(&w.body)?;
                self.keyword("END WHILE");
            }
            Node::ForIn(f) => {
                self.keyword("FOR");
                self.push(" ");
                self.ident(&f.variable, false);
                self.push(" ");
                self.keyword("IN");
                self.push(" ");
                self.subquery(&f.query)?;
                self.push(" ");
                self.keyword("DO");
                self.body(&f.body)?;
                self.keyword("END FOR");
            }
            Node::Block(b) => {
                self.label(b.label.as_deref());
                self.keyword("BEGIN");
                self.body(&b.body)?;
                self.keyword("END");
            }
            Node::Break(b) => self.keyword_label("BREAK", b.label.as_deref()),
            Node::Continue(c) => self.keyword_label("CONTINUE", c.label.as_deref()),
            Node::Call(c) => {
                self.keyword("CALL");
                self.push(" ");
                self.node(&c.procedure)?;
                self.push("(");
                self.list(&c.args)?;
                self.push(")");
            }
            Node::Assert(a) => {
                self.keyword("ASSERT");
                self.push(" ");
                self.node(&a.condition)?;
                if let Some(message) = &a.message {
                    self.push(" ");
                    self.keyword("AS");
                    self.push(" ");
                    self.string(message);
                }
            }
            Node::Script(s) => self.script(s)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::*;

    fn sql(expr: Expr) -> String {
        Generator::sql(&expr.into_inner()).unwrap()
    }

    #[test]
    fn test_select_compact() {
        let query = select([col("id"), col("name")])
            .from("t")
            .where_(eq(col("id"), lit(1)))
            .build();
        assert_eq!(Generator::sql(&query).unwrap(), "SELECT id, name FROM t WHERE id = 1");
    }

    #[test]
    fn test_select_pretty() {
        let query = select([col("id"), col("name")])
            .from("t")
            .where_(eq(col("id"), lit(1)))
            .build();
        assert_eq!(
            Generator::pretty_sql(&query).unwrap(),
            "SELECT\n  id,\n  name\nFROM t\nWHERE id = 1"
        );
    }

    #[test]
    fn test_pretty_subquery_indents() {
        let inner = select([col("id")]).from("u").build();
        let query = select([star()])
            .from("t")
            .where_(col("id").in_query(inner))
            .build();
        assert_eq!(
            Generator::pretty_sql(&query).unwrap(),
            "SELECT\n  *\nFROM t\nWHERE id IN (\n  SELECT\n    id\n  FROM u\n)"
        );
    }

    #[test]
    fn test_rollup_is_kept() {
        let query = select([col("a"), col("b"), count_star()])
            .from("t")
            .group_by([rollup(["a", "b"]).unwrap()])
            .build();
        assert_eq!(
            Generator::sql(&query).unwrap(),
            "SELECT a, b, COUNT(*) FROM t GROUP BY ROLLUP(a, b)"
        );
    }

    #[test]
    fn test_precedence_parentheses() {
        assert_eq!(sql(col("a").add(col("b")).mul(col("c"))), "(a + b) * c");
        assert_eq!(sql(col("a").mul(col("b").add(col("c")))), "a * (b + c)");
        assert_eq!(sql(col("a").sub(col("b")).sub(col("c"))), "a - b - c");
        assert_eq!(sql(col("a").sub(col("b").sub(col("c")))), "a - (b - c)");
        assert_eq!(
            sql(col("a").or(col("b")).and(col("c"))),
            "(a OR b) AND c"
        );
        assert_eq!(
            sql(col("a").and(col("b")).or(col("c"))),
            "a AND b OR c"
        );
        assert_eq!(sql(col("a").eq(col("b")).eq(col("c"))), "(a = b) = c");
        assert_eq!(sql(not(col("a").and(col("b")))), "NOT (a AND b)");
        assert_eq!(sql(not(col("a").eq(lit(1)))), "NOT a = 1");
        assert_eq!(sql(lit(-5).neg()), "-(-5)");
        assert_eq!(sql(col("a").add(col("b")).field("x")), "(a + b).x");
    }

    #[test]
    fn test_predicates() {
        assert_eq!(sql(col("x").is_not_null()), "x IS NOT NULL");
        assert_eq!(sql(col("x").between(lit(1), lit(10))), "x BETWEEN 1 AND 10");
        assert_eq!(sql(col("n").not_like(lit("a%"))), "n NOT LIKE 'a%'");
        assert_eq!(
            sql(col("x").not_in([lit(1), lit(2)]).unwrap()),
            "x NOT IN (1, 2)"
        );
        assert_eq!(sql(col("x").in_unnest(col("arr"))), "x IN UNNEST(arr)");
        assert_eq!(
            sql(col("a").is_not_distinct_from(col("b"))),
            "a IS NOT DISTINCT FROM b"
        );
    }

    #[test]
    fn test_identifier_quoting() {
        assert_eq!(sql(col("select")), "`select`");
        assert_eq!(sql(col("my col")), "`my col`");
        assert_eq!(sql(col("1st")), "`1st`");
        assert_eq!(sql(quoted("plain")), "`plain`");
        assert_eq!(sql(col("a`b")), "`a\\`b`");
        assert_eq!(sql(col("t.order")), "t.`order`");
        assert_eq!(sql(table("my-project.sales.orders")), "`my-project`.sales.orders");
    }

    #[test]
    fn test_literals() {
        assert_eq!(sql(lit("it's")), "'it\\'s'");
        assert_eq!(sql(lit("a\nb")), "'a\\nb'");
        assert_eq!(sql(raw_string(r"\d+").unwrap()), r"r'\d+'");
        assert_eq!(sql(bytes("abc")), "b'abc'");
        assert_eq!(sql(integer("0xff").unwrap()), "0xFF");
        assert_eq!(sql(integer("-0x10").unwrap()), "-0x10");
        assert_eq!(sql(float(1.0).unwrap()), "1.0");
        assert_eq!(sql(numeric("12.50").unwrap()), "NUMERIC '12.50'");
        assert_eq!(sql(date("2024-01-31").unwrap()), "DATE '2024-01-31'");
        assert_eq!(
            sql(timestamp("2024-01-01 10:00:00 America/Los_Angeles").unwrap()),
            "TIMESTAMP '2024-01-01 10:00:00 America/Los_Angeles'"
        );
        assert_eq!(sql(interval(3, IntervalUnit::Day)), "INTERVAL 3 DAY");
        assert_eq!(
            sql(interval_range("1-2", IntervalUnit::Year, IntervalUnit::Month).unwrap()),
            "INTERVAL '1-2' YEAR TO MONTH"
        );
        assert_eq!(
            sql(range(TypeName::Date, Some("2024-01-01"), None).unwrap()),
            "RANGE<DATE> '[2024-01-01, UNBOUNDED)'"
        );
        assert_eq!(sql(json(r#"{"a":1}"#).unwrap()), r#"JSON '{"a":1}'"#);
        assert_eq!(sql(struct_([lit(1).alias("a"), lit("x")])), "STRUCT(1 AS a, 'x')");
        assert_eq!(
            sql(typed_array(data_type("INT64").unwrap(), [lit(1), lit(2)])),
            "ARRAY<INT64>[1, 2]"
        );
        assert_eq!(sql(null()), "NULL");
        assert_eq!(sql(named_parameter("since").unwrap()), "@since");
    }

    #[test]
    fn test_functions_and_windows() {
        assert_eq!(sql(func("UPPER", [col("name")])), "UPPER(name)");
        assert_eq!(sql(count_star()), "COUNT(*)");
        assert_eq!(sql(func_distinct("COUNT", [col("id")])), "COUNT(DISTINCT id)");
        let ranked = func("ROW_NUMBER", Vec::<Expr>::new())
            .over(window().partition_by(["dept"]).order_by([col("salary").desc()]));
        assert_eq!(
            sql(ranked),
            "ROW_NUMBER() OVER (PARTITION BY dept ORDER BY salary DESC)"
        );
        let frame = window_frame(FrameUnit::Rows, preceding(2), Some(current_row())).unwrap();
        let moving = func("AVG", [col("x")]).over(window().order_by(["ts"]).frame(frame));
        assert_eq!(
            sql(moving),
            "AVG(x) OVER (ORDER BY ts ROWS BETWEEN 2 PRECEDING AND CURRENT ROW)"
        );
        assert_eq!(sql(func("SUM", [col("x")]).over_named("w")), "SUM(x) OVER w");
        let agg = func("ARRAY_AGG", [col("x")])
            .ignore_nulls()
            .unwrap()
            .within_order([col("x").desc()], Some(3))
            .unwrap();
        assert_eq!(sql(agg), "ARRAY_AGG(x IGNORE NULLS ORDER BY x DESC LIMIT 3)");
    }

    #[test]
    fn test_case_and_cast() {
        let expr = case()
            .when(col("x").gt(lit(0)), lit("positive"))
            .else_(lit("non-positive"))
            .build()
            .unwrap();
        assert_eq!(sql(expr), "CASE WHEN x > 0 THEN 'positive' ELSE 'non-positive' END");
        assert_eq!(
            sql(safe_cast(col("x"), data_type("INT64").unwrap())),
            "SAFE_CAST(x AS INT64)"
        );
        assert_eq!(
            sql(extract("year", col("d")).unwrap()),
            "EXTRACT(YEAR FROM d)"
        );
        assert_eq!(sql(col("arr").safe_offset(0)), "arr[SAFE_OFFSET(0)]");
    }

    #[test]
    fn test_joins_and_sources() {
        let query = select([col("u.name"), col("o.total")])
            .from_source(table("users").aliased("u"))
            .left_join("orders", col("u.id").eq(col("o.user_id")))
            .build();
        assert_eq!(
            Generator::sql(&query).unwrap(),
            "SELECT u.name, o.total FROM users AS u LEFT JOIN orders ON u.id = o.user_id"
        );

        let flattened = select([col("x"), col("i")])
            .from_source(unnest_with_offset(array([lit(1), lit(2)]), "x", Some("i")).unwrap())
            .build();
        assert_eq!(
            Generator::sql(&flattened).unwrap(),
            "SELECT x, i FROM UNNEST([1, 2]) AS x WITH OFFSET AS i"
        );

        let sampled = table("t").with_sample(tablesample(Some(10.0), None).unwrap()).unwrap();
        assert_eq!(sql(sampled), "t TABLESAMPLE SYSTEM (10 PERCENT)");
    }

    #[test]
    fn test_set_operations() {
        let a = select([col("x")]).from("a");
        let b = select([col("x")]).from("b");
        let c = select([col("x")]).from("c");
        let node = a.union_all(b).union_all(c).order_by(["x"]).limit(5).build();
        assert_eq!(
            Generator::sql(&node).unwrap(),
            "SELECT x FROM a UNION ALL SELECT x FROM b UNION ALL SELECT x FROM c ORDER BY x LIMIT 5"
        );

        let left = select([col("x")]).from("a");
        let right = select([col("x")]).from("b").union_distinct(select([col("x")]).from("c"));
        let nested = left.union_all(right).build();
        assert_eq!(
            Generator::sql(&nested).unwrap(),
            "SELECT x FROM a UNION ALL (SELECT x FROM b UNION DISTINCT SELECT x FROM c)"
        );
    }

    #[test]
    fn test_dml() {
        let insert = insert_into("t")
            .columns(&["a", "b"])
            .values([lit(1), lit("x")])
            .values([lit(2), default_value()])
            .build()
            .unwrap();
        assert_eq!(
            Generator::sql(&insert).unwrap(),
            "INSERT INTO t (a, b) VALUES (1, 'x'), (2, DEFAULT)"
        );

        let update = update("t")
            .set("a", col("a").add(lit(1)))
            .where_(col("id").eq(lit(7)))
            .build()
            .unwrap();
        assert_eq!(
            Generator::sql(&update).unwrap(),
            "UPDATE t SET a = a + 1 WHERE id = 7"
        );

        let stmt = merge(
            table("inventory").aliased("T"),
            table("new_arrivals").aliased("S"),
            col("T.product").eq(col("S.product")),
        )
        .when_matched_update(None, [("quantity", col("T.quantity").add(col("S.quantity")))])
        .when_not_matched_insert(None, &["product", "quantity"], [col("product"), col("quantity")])
        .when_not_matched_by_source_delete(None)
        .build()
        .unwrap();
        assert_eq!(
            Generator::sql(&stmt).unwrap(),
            "MERGE inventory AS T USING new_arrivals AS S ON T.product = S.product \
             WHEN MATCHED THEN UPDATE SET quantity = T.quantity + S.quantity \
             WHEN NOT MATCHED THEN INSERT (product, quantity) VALUES (product, quantity) \
             WHEN NOT MATCHED BY SOURCE THEN DELETE"
        );
    }

    #[test]
    fn test_ddl() {
        let create = create_table("ds.events")
            .column(column("id", data_type("INT64").unwrap()).not_null())
            .column(column("ts", data_type("TIMESTAMP").unwrap()))
            .partition_by(func("DATE", [col("ts")]))
            .options(options([("description", lit("events"))]).unwrap())
            .build()
            .unwrap();
        assert_eq!(
            Generator::sql(&create).unwrap(),
            "CREATE TABLE ds.events (id INT64 NOT NULL, ts TIMESTAMP) \
             PARTITION BY DATE(ts) OPTIONS(description = 'events')"
        );
        assert_eq!(
            Generator::pretty_sql(&create).unwrap(),
            "CREATE TABLE ds.events (\n  id INT64 NOT NULL,\n  ts TIMESTAMP\n)\n\
             PARTITION BY DATE(ts)\nOPTIONS(description = 'events')"
        );

        let alter = alter_table("t")
            .add_column(column("c", data_type("STRING").unwrap()), true)
            .drop_column("d", false)
            .build()
            .unwrap();
        assert_eq!(
            Generator::sql(&alter).unwrap(),
            "ALTER TABLE t ADD COLUMN IF NOT EXISTS c STRING, DROP COLUMN d"
        );

        let drop = drop_(ObjectKind::Schema, "old").if_exists().cascade().build().unwrap();
        assert_eq!(Generator::sql(&drop).unwrap(), "DROP SCHEMA IF EXISTS old CASCADE");
    }

    #[test]
    fn test_scripting() {
        let body = script([
            declare(&["n"], Some(data_type("INT64").unwrap()), Some(lit(0))).unwrap(),
            while_(None, col("n").lt(lit(3)), [set_variable(&["n"], col("n").add(lit(1))).unwrap()])
                .unwrap(),
        ])
        .unwrap();
        assert_eq!(
            Generator::sql(&body).unwrap(),
            "DECLARE n INT64 DEFAULT 0; WHILE n < 3 DO SET n = n + 1; END WHILE;"
        );
        assert_eq!(
            Generator::pretty_sql(&body).unwrap(),
            "DECLARE n INT64 DEFAULT 0;\nWHILE n < 3 DO\n  SET n = n + 1;\nEND WHILE;"
        );
    }

    #[test]
    fn test_keyword_case_lower() {
        let config = GeneratorConfig {
            keyword_case: KeywordCase::Lower,
            ..Default::default()
        };
        let query = select([col("a")]).from("t").where_(col("a").is_null()).build();
        assert_eq!(
            serialize(&query, &config).unwrap(),
            "select a from t where a is null"
        );
    }

    #[test]
    fn test_quote_all_identifiers() {
        let config = GeneratorConfig {
            quote_all_identifiers: true,
            ..Default::default()
        };
        let query = select([col("a")]).from("t").build();
        assert_eq!(serialize(&query, &config).unwrap(), "SELECT `a` FROM `t`");
    }

    #[test]
    fn test_serialization_preconditions() {
        let empty = Node::from(Select::new());
        let err = Generator::sql(&empty).unwrap_err();
        assert!(err.is_serialization());

        let lonely = Node::from(ColumnRef {
            parts: vec![Node::from(Identifier::new("a"))],
        });
        assert!(Generator::sql(&lonely).unwrap_err().is_serialization());

        let unguarded = Node::from(Delete {
            table: Box::new(table("t").into_inner()),
            where_clause: None,
        });
        assert!(Generator::sql(&unguarded).unwrap_err().is_serialization());

        let nan = Node::from(FloatLiteral { value: f64::NAN });
        assert!(Generator::sql(&nan).unwrap_err().is_serialization());
    }

    #[test]
    fn test_generation_is_repeatable() {
        let query = select([col("a")])
            .from("t")
            .where_(col("a").gt(lit(1)))
            .order_by([col("a").desc().nulls_last()])
            .build();
        let mut generator = Generator::with_config(GeneratorConfig::pretty());
        let first = generator.generate(&query).unwrap();
        let second = generator.generate(&query).unwrap();
        assert_eq!(first, second);
        assert!(first.ends_with("ORDER BY a DESC NULLS LAST"));
    }
}
