// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Text rendering of queries and expressions
//!
//! Output follows the ORM query language surface closely enough to be read
//! back by a human; it is used for log lines and test diagnostics.

use std::fmt::{self, Display, Formatter, Write};

use super::ast::{
    BinaryOp, Expression, ExpressionList, Join, LiteralTuple, LiteralValue, Query, Reference,
    TotalsMode, UnaryOp,
};

impl Display for LiteralValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Null => write!(f, "null"),
            LiteralValue::Int64(value) => write!(f, "{}", value),
            LiteralValue::Uint64(value) => write!(f, "{}u", value),
            LiteralValue::Double(value) => write!(f, "{:?}", value),
            LiteralValue::Boolean(value) => write!(f, "{}", value),
            LiteralValue::String(value) => {
                f.write_char('"')?;
                for ch in value.chars() {
                    if ch == '"' || ch == '\\' {
                        f.write_char('\\')?;
                    }
                    f.write_char(ch)?;
                }
                f.write_char('"')
            }
        }
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.table_name {
            Some(table) => write!(f, "[{}.{}]", table, self.column_name),
            None => write!(f, "[{}]", self.column_name),
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::Not => "NOT ",
            UnaryOp::BitNot => "~",
        };
        f.write_str(symbol)
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::Concatenate => "||",
        };
        f.write_str(symbol)
    }
}

fn write_separated<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Tuples of one element render bare, longer ones in parentheses.
fn write_tuple<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    if items.len() == 1 {
        write!(f, "{}", items[0])
    } else {
        f.write_char('(')?;
        write_separated(f, items)?;
        f.write_char(')')
    }
}

fn write_operand(f: &mut Formatter<'_>, operand: &ExpressionList) -> fmt::Result {
    match operand.as_slice() {
        [expr @ Expression::BinaryOp(_)] => write!(f, "({})", expr),
        _ => write_tuple(f, operand),
    }
}

fn write_literal_tuples(f: &mut Formatter<'_>, tuples: &[LiteralTuple]) -> fmt::Result {
    f.write_char('(')?;
    for (index, tuple) in tuples.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write_tuple(f, tuple)?;
    }
    f.write_char(')')
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Reference(reference) => write!(f, "{}", reference),
            Expression::Alias(alias) => write!(f, "{} AS {}", alias.expression, alias.name),
            Expression::Function(function) => {
                write!(f, "{}(", function.function_name)?;
                write_separated(f, &function.arguments)?;
                f.write_char(')')
            }
            Expression::UnaryOp(unary) => {
                write!(f, "{}", unary.opcode)?;
                write_operand(f, &unary.operand)
            }
            Expression::BinaryOp(binary) => {
                write_operand(f, &binary.lhs)?;
                write!(f, " {} ", binary.opcode)?;
                write_operand(f, &binary.rhs)
            }
            Expression::In(in_expr) => {
                write_operand(f, &in_expr.expr)?;
                f.write_str(" IN ")?;
                write_literal_tuples(f, &in_expr.values)
            }
            Expression::Between(between) => {
                write_operand(f, &between.expr)?;
                f.write_str(" BETWEEN (")?;
                for (index, (lower, upper)) in between.ranges.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write_tuple(f, lower)?;
                    f.write_str(" AND ")?;
                    write_tuple(f, upper)?;
                }
                f.write_char(')')
            }
            Expression::Transform(transform) => {
                f.write_str("transform(")?;
                write_tuple(f, &transform.expr)?;
                f.write_str(", ")?;
                write_literal_tuples(f, &transform.from)?;
                f.write_str(", ")?;
                write_literal_tuples(f, &transform.to)?;
                if let Some(default_expr) = &transform.default_expr {
                    f.write_str(", ")?;
                    write_tuple(f, default_expr)?;
                }
                f.write_char(')')
            }
        }
    }
}

impl Display for Join {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_left {
            f.write_str(" LEFT")?;
        }
        write!(f, " JOIN [{}]", self.table.path)?;
        if let Some(alias) = &self.table.alias {
            write!(f, " AS {}", alias)?;
        }
        if !self.fields.is_empty() {
            f.write_str(" USING ")?;
            write_separated(f, &self.fields)?;
        } else {
            f.write_str(" ON ")?;
            write_tuple(f, &self.lhs)?;
            f.write_str(" = ")?;
            write_tuple(f, &self.rhs)?;
        }
        if let Some(predicate) = &self.predicate {
            f.write_str(" AND ")?;
            write_tuple(f, predicate)?;
        }
        Ok(())
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        match &self.select_exprs {
            Some(exprs) => write_separated(f, exprs)?,
            None => f.write_char('*')?,
        }
        write!(f, " FROM [{}]", self.table.path)?;
        if let Some(alias) = &self.table.alias {
            write!(f, " AS {}", alias)?;
        }
        for join in &self.joins {
            write!(f, "{}", join)?;
        }
        if let Some(predicate) = &self.where_predicate {
            f.write_str(" WHERE ")?;
            write_tuple(f, predicate)?;
        }
        if let Some(group_by) = &self.group_exprs {
            f.write_str(" GROUP BY ")?;
            write_separated(f, &group_by.exprs)?;
            match group_by.totals_mode {
                TotalsMode::None => {}
                TotalsMode::BeforeHaving => f.write_str(" WITH TOTALS")?,
                TotalsMode::AfterHaving => {}
            }
        }
        if let Some(predicate) = &self.having_predicate {
            f.write_str(" HAVING ")?;
            write_tuple(f, predicate)?;
        }
        if let Some(TotalsMode::AfterHaving) = self.group_exprs.as_ref().map(|g| g.totals_mode) {
            f.write_str(" WITH TOTALS")?;
        }
        if !self.order_expressions.is_empty() {
            f.write_str(" ORDER BY ")?;
            for (index, (exprs, ascending)) in self.order_expressions.iter().enumerate() {
                if index > 0 {
                    f.write_str(", ")?;
                }
                write_tuple(f, exprs)?;
                if !ascending {
                    f.write_str(" DESC")?;
                }
            }
        }
        if let Some(offset) = self.offset {
            write!(f, " OFFSET {}", offset)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        Ok(())
    }
}
