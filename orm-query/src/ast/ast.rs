// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! AST node definitions for parsed ORM queries
//!
//! The parser produces a [`Query`] whose clauses hold [`Expression`] trees.
//! Operands are stored as expression lists: a scalar operand is a list with a
//! single element, a tuple operand is a list with several.
//!
//! Every node is owned by exactly one parent, so an optimizer holding
//! `&mut Query` may rewrite any node in place.

use serde::{Deserialize, Serialize};

/// Ordered sequence of expressions (SELECT items, operands, arguments)
pub type ExpressionList = Vec<Expression>;

/// Optional expression list (absent WHERE, absent SELECT, ...)
pub type NullableExpressionList = Option<ExpressionList>;

/// ORDER BY items: expression tuple plus the ascending flag
pub type OrderExpressionList = Vec<(ExpressionList, bool)>;

/// Tuple of literal values, as used by IN, BETWEEN and transform mappings
pub type LiteralTuple = Vec<LiteralValue>;

/// Constant value appearing in a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LiteralValue {
    Null,
    Int64(i64),
    Uint64(u64),
    Double(f64),
    Boolean(bool),
    String(String),
}

/// Column reference, optionally qualified by a table alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub column_name: String,
    pub table_name: Option<String>,
}

impl Reference {
    /// Reference to `column` of the table aliased `table`
    pub fn new(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            column_name: column.into(),
            table_name: Some(table.into()),
        }
    }

    /// Unqualified reference, e.g. a SELECT alias name
    pub fn unqualified(column: impl Into<String>) -> Self {
        Self {
            column_name: column.into(),
            table_name: None,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    // Arithmetical operations.
    Plus,
    Minus,
    Multiply,
    Divide,
    // Integral operations.
    Modulo,
    LeftShift,
    RightShift,
    BitOr,
    BitAnd,
    // Logical operations.
    And,
    Or,
    // Relational operations.
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    // String operations.
    Concatenate,
}

impl BinaryOp {
    /// AND / OR
    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Comparison operators
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::LessOrEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterOrEqual
        )
    }
}

/// A named sub-expression: `expr AS name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasExpression {
    pub expression: Box<Expression>,
    pub name: String,
}

/// A function call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionExpression {
    pub function_name: String,
    pub arguments: ExpressionList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryOpExpression {
    pub opcode: UnaryOp,
    pub operand: ExpressionList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryOpExpression {
    pub opcode: BinaryOp,
    pub lhs: ExpressionList,
    pub rhs: ExpressionList,
}

/// Set membership test: `expr IN (values...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InExpression {
    pub expr: ExpressionList,
    pub values: Vec<LiteralTuple>,
}

/// Range test: `expr BETWEEN (lower AND upper, ...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetweenExpression {
    pub expr: ExpressionList,
    pub ranges: Vec<(LiteralTuple, LiteralTuple)>,
}

/// Value mapping with a fallback: `transform(expr, from, to, default)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformExpression {
    pub expr: ExpressionList,
    pub from: Vec<LiteralTuple>,
    pub to: Vec<LiteralTuple>,
    pub default_expr: NullableExpressionList,
}

/// Expression tree node
///
/// The set of variants is closed; every traversal matches on all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal(LiteralValue),
    Reference(Reference),
    Alias(AliasExpression),
    Function(FunctionExpression),
    UnaryOp(UnaryOpExpression),
    BinaryOp(BinaryOpExpression),
    In(InExpression),
    Between(BetweenExpression),
    Transform(TransformExpression),
}

impl Expression {
    pub fn literal(value: LiteralValue) -> Self {
        Expression::Literal(value)
    }

    /// Qualified column reference `[table.column]`
    pub fn reference(table: &str, column: &str) -> Self {
        Expression::Reference(Reference::new(column, table))
    }

    /// Unqualified column reference `[column]`
    pub fn unqualified(column: &str) -> Self {
        Expression::Reference(Reference::unqualified(column))
    }

    pub fn alias(expression: Expression, name: &str) -> Self {
        Expression::Alias(AliasExpression {
            expression: Box::new(expression),
            name: name.to_string(),
        })
    }

    pub fn function(name: &str, arguments: ExpressionList) -> Self {
        Expression::Function(FunctionExpression {
            function_name: name.to_string(),
            arguments,
        })
    }

    pub fn unary(opcode: UnaryOp, operand: Expression) -> Self {
        Expression::UnaryOp(UnaryOpExpression {
            opcode,
            operand: vec![operand],
        })
    }

    pub fn binary(opcode: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::BinaryOp(BinaryOpExpression {
            opcode,
            lhs: vec![lhs],
            rhs: vec![rhs],
        })
    }

    /// `expr IN (v1, v2, ...)` with scalar candidates
    pub fn in_list(expr: Expression, values: Vec<LiteralValue>) -> Self {
        Expression::In(InExpression {
            expr: vec![expr],
            values: values.into_iter().map(|value| vec![value]).collect(),
        })
    }

    /// `expr BETWEEN lower AND upper`
    pub fn between(expr: Expression, lower: LiteralValue, upper: LiteralValue) -> Self {
        Expression::Between(BetweenExpression {
            expr: vec![expr],
            ranges: vec![(vec![lower], vec![upper])],
        })
    }

    pub fn transform(
        expr: Expression,
        from: Vec<LiteralTuple>,
        to: Vec<LiteralTuple>,
        default_expr: Option<Expression>,
    ) -> Self {
        Expression::Transform(TransformExpression {
            expr: vec![expr],
            from,
            to,
            default_expr: default_expr.map(|expr| vec![expr]),
        })
    }

    /// Returns the column reference if this node is a bare reference
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Expression::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}

/// Table being read, with its alias in the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub path: String,
    pub alias: Option<String>,
}

impl TableDescriptor {
    pub fn new(path: &str, alias: Option<&str>) -> Self {
        Self {
            path: path.to_string(),
            alias: alias.map(str::to_string),
        }
    }
}

/// A JOIN clause
///
/// `lhs[i] = rhs[i]` is the i-th equality key pair; `lhs` refers to the
/// already joined tables and `rhs` to the joined one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub table: TableDescriptor,
    pub is_left: bool,
    /// `USING` columns
    pub fields: Vec<Reference>,
    pub lhs: ExpressionList,
    pub rhs: ExpressionList,
    /// Extra `AND ...` condition of the ON clause
    pub predicate: NullableExpressionList,
}

impl Join {
    /// Inner equi-join on the given key pairs
    pub fn inner(table: TableDescriptor, lhs: ExpressionList, rhs: ExpressionList) -> Self {
        Self {
            table,
            is_left: false,
            fields: Vec::new(),
            lhs,
            rhs,
            predicate: None,
        }
    }

    /// Left outer equi-join on the given key pairs
    pub fn left(table: TableDescriptor, lhs: ExpressionList, rhs: ExpressionList) -> Self {
        Self {
            is_left: true,
            ..Self::inner(table, lhs, rhs)
        }
    }
}

/// How GROUP BY totals are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TotalsMode {
    #[default]
    None,
    BeforeHaving,
    AfterHaving,
}

/// GROUP BY key list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBy {
    pub exprs: ExpressionList,
    pub totals_mode: TotalsMode,
}

/// A parsed SELECT query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub table: TableDescriptor,
    pub joins: Vec<Join>,
    /// `None` stands for `SELECT *`
    pub select_exprs: NullableExpressionList,
    pub where_predicate: NullableExpressionList,
    pub group_exprs: Option<GroupBy>,
    pub having_predicate: NullableExpressionList,
    pub order_expressions: OrderExpressionList,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

impl Query {
    /// `SELECT * FROM table`
    pub fn new(table: TableDescriptor) -> Self {
        Self {
            table,
            joins: Vec::new(),
            select_exprs: None,
            where_predicate: None,
            group_exprs: None,
            having_predicate: None,
            order_expressions: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    pub fn with_join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn with_select(mut self, exprs: ExpressionList) -> Self {
        self.select_exprs = Some(exprs);
        self
    }

    pub fn with_where(mut self, predicate: Expression) -> Self {
        self.where_predicate = Some(vec![predicate]);
        self
    }

    pub fn with_having(mut self, predicate: Expression) -> Self {
        self.having_predicate = Some(vec![predicate]);
        self
    }

    pub fn with_group_by(mut self, exprs: ExpressionList) -> Self {
        self.group_exprs = Some(GroupBy {
            exprs,
            totals_mode: TotalsMode::None,
        });
        self
    }

    pub fn with_order_by(mut self, expr: Expression, ascending: bool) -> Self {
        self.order_expressions.push((vec![expr], ascending));
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}
