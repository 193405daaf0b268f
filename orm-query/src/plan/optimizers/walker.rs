// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shared expression traversal for the rewrite passes
//!
//! [`ExpressionRewriter`] has one method per node kind for each of the two
//! questions a pass asks:
//! - `rewrite_*`: rewrite the node in place, return whether anything changed
//! - `is_*_allowed`: may the pass rewrite this subtree at all
//!
//! The provided methods recurse structurally. A pass overrides only the node
//! kinds it cares about and delegates everything else back to the defaults.
//!
//! Rewriting visits every child even after one reported a change, so
//! independent rewrites in sibling subtrees all happen. Permission checks stop
//! at the first disallowed child.

use crate::ast::{
    AliasExpression, BetweenExpression, BinaryOpExpression, Expression, ExpressionList,
    FunctionExpression, InExpression, NullableExpressionList, OrderExpressionList, Query,
    Reference, TransformExpression, UnaryOpExpression,
};

/// Accumulates the "changed" flags of a full traversal
#[derive(Debug, Default)]
pub(crate) struct RewriteCollector {
    rewritten_anything: bool,
}

impl RewriteCollector {
    pub(crate) fn collect(&mut self, rewritten: bool) {
        self.rewritten_anything |= rewritten;
    }

    pub(crate) fn rewritten_anything(self) -> bool {
        self.rewritten_anything
    }
}

/// Overridable traversal over the expression kinds of a [`Query`]
pub trait ExpressionRewriter {
    /// Rewrite the clauses of `query` in a fixed order: GROUP BY keys,
    /// SELECT, WHERE, HAVING, ORDER BY.
    fn rewrite_query(&mut self, query: &mut Query) -> bool {
        let mut collector = RewriteCollector::default();
        if let Some(group_by) = &mut query.group_exprs {
            collector.collect(self.rewrite_expression_list(&mut group_by.exprs));
        }

        collector.collect(self.rewrite_nullable_list(&mut query.select_exprs));
        collector.collect(self.rewrite_nullable_list(&mut query.where_predicate));
        collector.collect(self.rewrite_nullable_list(&mut query.having_predicate));
        collector.collect(self.rewrite_order_list(&mut query.order_expressions));
        collector.rewritten_anything()
    }

    fn rewrite_expression(&mut self, expr: &mut Expression) -> bool {
        match expr {
            Expression::Literal(_) => false,
            Expression::Reference(reference) => self.rewrite_reference(reference),
            Expression::Alias(alias) => self.rewrite_alias(alias),
            Expression::Function(function) => self.rewrite_function(function),
            Expression::UnaryOp(unary) => self.rewrite_unary_op(unary),
            Expression::BinaryOp(binary) => self.rewrite_binary_op(binary),
            Expression::In(in_expr) => self.rewrite_in(in_expr),
            Expression::Between(between) => self.rewrite_between(between),
            Expression::Transform(transform) => self.rewrite_transform(transform),
        }
    }

    fn rewrite_expression_list(&mut self, list: &mut ExpressionList) -> bool {
        let mut collector = RewriteCollector::default();
        for expr in list.iter_mut() {
            collector.collect(self.rewrite_expression(expr));
        }
        collector.rewritten_anything()
    }

    fn rewrite_nullable_list(&mut self, list: &mut NullableExpressionList) -> bool {
        match list {
            Some(list) => self.rewrite_expression_list(list),
            None => false,
        }
    }

    fn rewrite_order_list(&mut self, list: &mut OrderExpressionList) -> bool {
        let mut collector = RewriteCollector::default();
        for (exprs, _) in list.iter_mut() {
            collector.collect(self.rewrite_expression_list(exprs));
        }
        collector.rewritten_anything()
    }

    fn rewrite_reference(&mut self, _reference: &mut Reference) -> bool {
        false
    }

    fn rewrite_alias(&mut self, alias: &mut AliasExpression) -> bool {
        self.rewrite_expression(&mut alias.expression)
    }

    fn rewrite_function(&mut self, function: &mut FunctionExpression) -> bool {
        self.rewrite_expression_list(&mut function.arguments)
    }

    fn rewrite_unary_op(&mut self, unary: &mut UnaryOpExpression) -> bool {
        self.rewrite_expression_list(&mut unary.operand)
    }

    fn rewrite_binary_op(&mut self, binary: &mut BinaryOpExpression) -> bool {
        let mut collector = RewriteCollector::default();
        collector.collect(self.rewrite_expression_list(&mut binary.lhs));
        collector.collect(self.rewrite_expression_list(&mut binary.rhs));
        collector.rewritten_anything()
    }

    /// Only the tested expression; the candidate values are literals.
    fn rewrite_in(&mut self, in_expr: &mut InExpression) -> bool {
        self.rewrite_expression_list(&mut in_expr.expr)
    }

    fn rewrite_between(&mut self, between: &mut BetweenExpression) -> bool {
        self.rewrite_expression_list(&mut between.expr)
    }

    fn rewrite_transform(&mut self, transform: &mut TransformExpression) -> bool {
        let mut collector = RewriteCollector::default();
        collector.collect(self.rewrite_expression_list(&mut transform.expr));
        collector.collect(self.rewrite_nullable_list(&mut transform.default_expr));
        collector.rewritten_anything()
    }

    fn is_rewrite_allowed(&self, expr: &Expression) -> bool {
        match expr {
            Expression::Literal(_) => true,
            Expression::Reference(reference) => self.is_reference_allowed(reference),
            Expression::Alias(alias) => self.is_rewrite_allowed(&alias.expression),
            Expression::Function(function) => self.is_function_allowed(function),
            Expression::UnaryOp(unary) => self.is_list_allowed(&unary.operand),
            Expression::BinaryOp(binary) => {
                self.is_list_allowed(&binary.lhs) && self.is_list_allowed(&binary.rhs)
            }
            Expression::In(in_expr) => self.is_list_allowed(&in_expr.expr),
            Expression::Between(between) => self.is_list_allowed(&between.expr),
            Expression::Transform(transform) => {
                self.is_list_allowed(&transform.expr)
                    && self.is_nullable_list_allowed(&transform.default_expr)
            }
        }
    }

    fn is_list_allowed(&self, list: &ExpressionList) -> bool {
        list.iter().all(|expr| self.is_rewrite_allowed(expr))
    }

    fn is_nullable_list_allowed(&self, list: &NullableExpressionList) -> bool {
        list.as_ref().map_or(true, |list| self.is_list_allowed(list))
    }

    fn is_order_list_allowed(&self, list: &OrderExpressionList) -> bool {
        list.iter().all(|(exprs, _)| self.is_list_allowed(exprs))
    }

    fn is_reference_allowed(&self, _reference: &Reference) -> bool {
        true
    }

    fn is_function_allowed(&self, function: &FunctionExpression) -> bool {
        self.is_list_allowed(&function.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, LiteralValue, TableDescriptor, UnaryOp};

    /// Renames every reference to column `from` and forbids column `banned`.
    struct RenameColumn {
        from: &'static str,
        to: &'static str,
        banned: &'static str,
        visited: usize,
    }

    impl ExpressionRewriter for RenameColumn {
        fn rewrite_reference(&mut self, reference: &mut Reference) -> bool {
            self.visited += 1;
            if reference.column_name == self.from {
                reference.column_name = self.to.to_string();
                return true;
            }
            false
        }

        fn is_reference_allowed(&self, reference: &Reference) -> bool {
            reference.column_name != self.banned
        }
    }

    fn rename(from: &'static str, to: &'static str) -> RenameColumn {
        RenameColumn {
            from,
            to,
            banned: "secret",
            visited: 0,
        }
    }

    fn int(value: i64) -> Expression {
        Expression::literal(LiteralValue::Int64(value))
    }

    #[test]
    fn test_visit_every_element_after_a_change() {
        let mut list = vec![
            Expression::reference("t", "a"),
            Expression::reference("t", "b"),
            Expression::reference("t", "a"),
        ];
        let mut rewriter = rename("a", "c");

        assert!(rewriter.rewrite_expression_list(&mut list));
        assert_eq!(rewriter.visited, 3);
        assert_eq!(
            list,
            vec![
                Expression::reference("t", "c"),
                Expression::reference("t", "b"),
                Expression::reference("t", "c"),
            ]
        );
    }

    #[test]
    fn test_descend_into_every_node_kind() {
        let mut expr = Expression::binary(
            BinaryOp::Or,
            Expression::unary(
                UnaryOp::Not,
                Expression::between(
                    Expression::reference("t", "a"),
                    LiteralValue::Int64(1),
                    LiteralValue::Int64(2),
                ),
            ),
            Expression::transform(
                Expression::alias(
                    Expression::function("f", vec![Expression::reference("t", "a")]),
                    "x",
                ),
                vec![vec![LiteralValue::Int64(1)]],
                vec![vec![LiteralValue::Int64(2)]],
                Some(Expression::reference("t", "a")),
            ),
        );
        let mut rewriter = rename("a", "b");

        assert!(rewriter.rewrite_expression(&mut expr));
        assert_eq!(rewriter.visited, 3);
        assert!(!expr.to_string().contains("[t.a]"));
    }

    #[test]
    fn test_in_rewrites_target_and_keeps_candidates() {
        let candidates = vec![LiteralValue::String("a".to_string()), LiteralValue::Int64(1)];
        let mut expr = Expression::in_list(Expression::reference("t", "a"), candidates.clone());
        let mut rewriter = rename("a", "b");

        assert!(rewriter.rewrite_expression(&mut expr));
        assert_eq!(rewriter.visited, 1);
        assert_eq!(expr, Expression::in_list(Expression::reference("t", "b"), candidates));
    }

    #[test]
    fn test_report_no_change_for_literals() {
        let mut expr = int(42);
        let mut rewriter = rename("a", "b");

        assert!(!rewriter.rewrite_expression(&mut expr));
        assert_eq!(expr, int(42));
    }

    #[test]
    fn test_reject_subtree_with_disallowed_reference() {
        let rewriter = rename("a", "b");
        let allowed = Expression::function("f", vec![Expression::reference("t", "a"), int(1)]);
        let disallowed = Expression::transform(
            Expression::reference("t", "a"),
            vec![],
            vec![],
            Some(Expression::function("g", vec![Expression::reference("t", "secret")])),
        );

        assert!(rewriter.is_rewrite_allowed(&allowed));
        assert!(!rewriter.is_rewrite_allowed(&disallowed));
        assert!(rewriter.is_nullable_list_allowed(&None));
        assert!(!rewriter.is_order_list_allowed(&vec![(vec![disallowed], true)]));
    }

    #[test]
    fn test_rewrite_query_clauses() {
        let mut query = Query::new(TableDescriptor::new("//t", Some("t")))
            .with_select(vec![Expression::reference("t", "a")])
            .with_where(Expression::binary(
                BinaryOp::Equal,
                Expression::reference("t", "a"),
                int(1),
            ))
            .with_group_by(vec![Expression::reference("t", "a")])
            .with_having(Expression::reference("t", "b"))
            .with_order_by(Expression::reference("t", "a"), true);
        let mut rewriter = rename("a", "z");

        assert!(rewriter.rewrite_query(&mut query));
        assert_eq!(rewriter.visited, 5);
        assert!(!query.to_string().contains("[t.a]"));

        let mut rewriter = rename("a", "z");
        assert!(!rewriter.rewrite_query(&mut query));
    }
}
