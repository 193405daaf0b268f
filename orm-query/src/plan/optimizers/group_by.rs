// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! GROUP BY over a unique key prefix
//!
//! Decides whether a filter pins a key prefix column to a single value, in
//! which case grouping by that column is redundant. Only the filter shape is
//! inspected.

use crate::ast::{BinaryOp, Expression, ExpressionList, UnaryOp};

/// Number of distinct prefix values a filter admits.
///
/// `Some(0)` means the column is constrained to a range that cannot be
/// enumerated, `Some(n)` means at most `n` discrete values, `None` means the
/// expression says nothing about the column.
pub type PrefixRanges = Option<usize>;

/// Infers how many distinct values of a key prefix a filter admits
#[derive(Debug)]
pub struct GroupByOptimizer<'a> {
    prefix_references: &'a [String],
    table_name: Option<&'a str>,
}

impl<'a> GroupByOptimizer<'a> {
    pub fn new(prefix_references: &'a [String], table_name: Option<&'a str>) -> Self {
        Self {
            prefix_references,
            table_name,
        }
    }

    /// True iff `filter` pins the prefix column to exactly one value
    pub fn run(&self, filter: &Expression) -> bool {
        // Composite prefix references are not supported yet.
        if self.prefix_references.len() != 1 {
            log::debug!(
                "Group by prefix inference skipped: {} prefix columns",
                self.prefix_references.len()
            );
            return false;
        }
        let ranges = self.infer_prefix_ranges(filter);
        log::trace!(
            "Filter {} admits {:?} values of prefix {}",
            filter,
            ranges,
            self.prefix_references[0]
        );
        ranges == Some(1)
    }

    pub fn infer_prefix_ranges(&self, expr: &Expression) -> PrefixRanges {
        match expr {
            Expression::BinaryOp(binary) if binary.opcode.is_logical() => {
                assert_eq!(binary.lhs.len(), 1, "logical operand must be a single expression");
                assert_eq!(binary.rhs.len(), 1, "logical operand must be a single expression");
                let left = self.infer_prefix_ranges(&binary.lhs[0]);
                let right = self.infer_prefix_ranges(&binary.rhs[0]);
                if binary.opcode == BinaryOp::Or {
                    union_ranges(left, right)
                } else {
                    intersect_ranges(left, right)
                }
            }
            Expression::BinaryOp(binary) if binary.opcode.is_relational() => {
                if self.is_target_reference(&binary.lhs) || self.is_target_reference(&binary.rhs) {
                    // 1 for equality, 0 for the other comparisons.
                    Some(usize::from(binary.opcode == BinaryOp::Equal))
                } else {
                    None
                }
            }
            Expression::In(in_expr) if self.is_target_reference(&in_expr.expr) => {
                Some(in_expr.values.len())
            }
            Expression::Between(between) if self.is_target_reference(&between.expr) => Some(0),
            Expression::UnaryOp(unary) if unary.opcode == UnaryOp::Not => {
                match unary.operand.as_slice() {
                    [operand] => self.infer_prefix_ranges(operand).map(|_| 0),
                    _ => None,
                }
            }
            Expression::Literal(_)
            | Expression::Reference(_)
            | Expression::Alias(_)
            | Expression::Function(_)
            | Expression::UnaryOp(_)
            | Expression::BinaryOp(_)
            | Expression::In(_)
            | Expression::Between(_)
            | Expression::Transform(_) => None,
        }
    }

    /// Only the first prefix column is ever a target; an empty prefix has none.
    fn is_target_reference(&self, exprs: &ExpressionList) -> bool {
        let Some(prefix) = self.prefix_references.first() else {
            return false;
        };
        match exprs.as_slice() {
            [Expression::Reference(reference)] => {
                &reference.column_name == prefix
                    && reference.table_name.as_deref() == self.table_name
            }
            _ => false,
        }
    }
}

/// OR of two filters: the candidate sets add up.
fn union_ranges(left: PrefixRanges, right: PrefixRanges) -> PrefixRanges {
    match (left, right) {
        (None, other) | (other, None) => other,
        (Some(0), Some(_)) | (Some(_), Some(0)) => Some(0),
        (Some(left), Some(right)) => Some(left.saturating_add(right)),
    }
}

/// AND of two filters: the tighter discrete bound wins.
fn intersect_ranges(left: PrefixRanges, right: PrefixRanges) -> PrefixRanges {
    match (left, right) {
        (None, other) | (other, None) => other,
        (Some(0), other) | (other, Some(0)) => other,
        (Some(left), Some(right)) => Some(left.min(right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::LiteralValue;

    fn optimizer(prefix: &[String]) -> GroupByOptimizer<'_> {
        GroupByOptimizer::new(prefix, Some("p"))
    }

    fn eq(column: &str, value: i64) -> Expression {
        Expression::binary(
            BinaryOp::Equal,
            Expression::reference("p", column),
            Expression::literal(LiteralValue::Int64(value)),
        )
    }

    #[test]
    fn test_combine_unknown_with_known() {
        assert_eq!(union_ranges(None, Some(3)), Some(3));
        assert_eq!(union_ranges(Some(2), None), Some(2));
        assert_eq!(intersect_ranges(None, Some(0)), Some(0));
        assert_eq!(intersect_ranges(None, None), None);
    }

    #[test]
    fn test_treat_unbounded_side_per_combinator() {
        assert_eq!(union_ranges(Some(0), Some(4)), Some(0));
        assert_eq!(intersect_ranges(Some(0), Some(4)), Some(4));
        assert_eq!(intersect_ranges(Some(3), Some(0)), Some(3));
        assert_eq!(intersect_ranges(Some(0), Some(0)), Some(0));
        assert_eq!(intersect_ranges(Some(3), Some(2)), Some(2));
        assert_eq!(union_ranges(Some(3), Some(2)), Some(5));
    }

    #[test]
    fn test_count_in_candidates() {
        let prefix = vec!["id".to_string()];
        let expr = Expression::in_list(
            Expression::reference("p", "id"),
            vec![LiteralValue::Int64(1), LiteralValue::Int64(2)],
        );

        assert_eq!(optimizer(&prefix).infer_prefix_ranges(&expr), Some(2));
    }

    #[test]
    fn test_match_reversed_comparison() {
        let prefix = vec!["id".to_string()];
        let expr = Expression::binary(
            BinaryOp::Equal,
            Expression::literal(LiteralValue::Int64(1)),
            Expression::reference("p", "id"),
        );

        assert!(optimizer(&prefix).run(&expr));
    }

    #[test]
    fn test_ignore_column_of_other_table() {
        let prefix = vec!["id".to_string()];
        let expr = Expression::binary(
            BinaryOp::Equal,
            Expression::reference("n", "id"),
            Expression::literal(LiteralValue::Int64(1)),
        );

        assert_eq!(optimizer(&prefix).infer_prefix_ranges(&expr), None);
    }

    #[test]
    fn test_ignore_tuple_comparison() {
        let prefix = vec!["id".to_string()];
        let expr = Expression::BinaryOp(crate::ast::BinaryOpExpression {
            opcode: BinaryOp::Equal,
            lhs: vec![Expression::reference("p", "id"), Expression::reference("p", "name")],
            rhs: vec![
                Expression::literal(LiteralValue::Int64(1)),
                Expression::literal(LiteralValue::String("a".to_string())),
            ],
        });

        assert_eq!(optimizer(&prefix).infer_prefix_ranges(&expr), None);
    }

    #[test]
    fn test_reject_composite_prefix() {
        let prefix = vec!["id".to_string(), "name".to_string()];

        assert!(!optimizer(&prefix).run(&eq("id", 1)));
        assert!(!optimizer(&[]).run(&eq("id", 1)));
    }

    #[test]
    fn test_empty_prefix_gives_no_information() {
        let expr = Expression::binary(BinaryOp::And, eq("id", 1), eq("name", 2));

        assert_eq!(optimizer(&[]).infer_prefix_ranges(&eq("id", 1)), None);
        assert_eq!(optimizer(&[]).infer_prefix_ranges(&expr), None);
    }
}
