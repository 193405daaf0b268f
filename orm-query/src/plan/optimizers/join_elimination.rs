// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Join elimination
//!
//! Removes the single inner equi-join of a query when every column read from
//! the joined table is one of its key columns. Such a join only relabels rows
//! of the primary table, so each `[joined.key]` can be replaced by the primary
//! table column it is equated with and the JOIN clause dropped.
//!
//! Eligibility is decided from the tree shape alone; anything the pass cannot
//! prove safe leaves the query untouched.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::ast::{Expression, Query, Reference};
use crate::plan::optimizers::walker::ExpressionRewriter;

/// Rewrites references to the joined table into primary table references
#[derive(Debug)]
pub struct JoinEliminator {
    primary_alias: Option<String>,
    /// Joined table key -> primary table key, plus SELECT alias self-mappings
    columns_mapping: HashMap<Reference, Reference>,
}

impl JoinEliminator {
    pub fn new(query: &Query) -> Self {
        Self {
            primary_alias: query.table.alias.clone(),
            columns_mapping: HashMap::new(),
        }
    }

    /// Eliminate the join if possible; returns whether the query changed
    pub fn run(mut self, query: &mut Query) -> bool {
        if !self.can_optimize(query) {
            return false;
        }

        self.rewrite_query(query);
        let removed = std::mem::take(&mut query.joins);
        log::debug!(
            "Eliminated join with [{}] on {} key column(s)",
            removed[0].table.path,
            removed[0].rhs.len()
        );
        true
    }

    fn can_optimize(&mut self, query: &Query) -> bool {
        if query.joins.len() != 1 {
            log::debug!("Join elimination skipped: {} joins present", query.joins.len());
            return false;
        }
        let join = &query.joins[0];
        if join.is_left {
            log::debug!("Join elimination skipped: left join");
            return false;
        }
        if join.predicate.is_some() || !join.fields.is_empty() {
            log::debug!("Join elimination skipped: join has a predicate or USING fields");
            return false;
        }
        assert_eq!(
            join.lhs.len(),
            join.rhs.len(),
            "join key lists must have equal length"
        );

        for (lhs, rhs) in join.lhs.iter().zip(&join.rhs) {
            // TODO: allow transformed primary table keys on the left side.
            let (Some(lhs), Some(rhs)) = (lhs.as_reference(), rhs.as_reference()) else {
                log::debug!("Join elimination skipped: computed join key {} = {}", lhs, rhs);
                return false;
            };
            if !self.register_mapping(rhs.clone(), lhs.clone()) {
                log::debug!("Join elimination skipped: key {} is joined twice", rhs);
                return false;
            }
        }

        if let Some(group_by) = &query.group_exprs {
            if !self.is_list_allowed(&group_by.exprs) {
                log::debug!("Join elimination skipped: GROUP BY reads joined columns");
                return false;
            }
        }

        for expr in query.select_exprs.iter().flatten() {
            if !self.is_rewrite_allowed(expr) {
                log::debug!("Join elimination skipped: SELECT item {} reads joined columns", expr);
                return false;
            }
            if let Expression::Alias(alias) = expr {
                // WHERE, HAVING and ORDER BY may refer to the alias by name.
                let reference = Reference::unqualified(alias.name.as_str());
                if !self.register_mapping(reference.clone(), reference) {
                    log::debug!("Join elimination skipped: alias {} is ambiguous", alias.name);
                    return false;
                }
            }
        }

        let allowed = self.is_nullable_list_allowed(&query.where_predicate)
            && self.is_nullable_list_allowed(&query.having_predicate)
            && self.is_order_list_allowed(&query.order_expressions);
        if !allowed {
            log::debug!("Join elimination skipped: filter or ordering reads joined columns");
        }
        allowed
    }

    /// Returns false if `from` is already mapped.
    fn register_mapping(&mut self, from: Reference, to: Reference) -> bool {
        match self.columns_mapping.entry(from) {
            Entry::Vacant(entry) => {
                entry.insert(to);
                true
            }
            Entry::Occupied(_) => false,
        }
    }
}

impl ExpressionRewriter for JoinEliminator {
    fn rewrite_reference(&mut self, reference: &mut Reference) -> bool {
        if reference.table_name == self.primary_alias {
            return false;
        }
        match self.columns_mapping.get(reference) {
            Some(mapped) => {
                *reference = mapped.clone();
                true
            }
            None => panic!(
                "reference {} passed the join elimination check but has no mapping",
                reference
            ),
        }
    }

    fn is_reference_allowed(&self, reference: &Reference) -> bool {
        reference.table_name == self.primary_alias || self.columns_mapping.contains_key(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOp, Join, LiteralValue, TableDescriptor};

    fn pods_with_nodes() -> Query {
        Query::new(TableDescriptor::new("//db/pods", Some("p"))).with_join(Join::inner(
            TableDescriptor::new("//db/nodes", Some("n")),
            vec![Expression::reference("p", "node_id")],
            vec![Expression::reference("n", "id")],
        ))
    }

    #[test]
    fn test_replace_joined_key_with_primary_key() {
        let mut query = pods_with_nodes()
            .with_select(vec![Expression::reference("n", "id")])
            .with_where(Expression::binary(
                BinaryOp::Equal,
                Expression::reference("n", "id"),
                Expression::literal(LiteralValue::String("node-1".to_string())),
            ));

        assert!(JoinEliminator::new(&query).run(&mut query));
        assert!(query.joins.is_empty());
        assert_eq!(query.select_exprs, Some(vec![Expression::reference("p", "node_id")]));
        assert_eq!(
            query.where_predicate,
            Some(vec![Expression::binary(
                BinaryOp::Equal,
                Expression::reference("p", "node_id"),
                Expression::literal(LiteralValue::String("node-1".to_string())),
            )])
        );
    }

    #[test]
    fn test_skip_non_key_column_of_joined_table() {
        let mut query = pods_with_nodes().with_select(vec![Expression::reference("n", "cpu")]);
        let original = query.clone();

        assert!(!JoinEliminator::new(&query).run(&mut query));
        assert_eq!(query, original);
    }

    #[test]
    fn test_allow_primary_table_columns() {
        let query = pods_with_nodes();
        let eliminator = JoinEliminator::new(&query);

        assert!(eliminator.is_reference_allowed(&Reference::new("anything", "p")));
        assert!(!eliminator.is_reference_allowed(&Reference::new("id", "n")));
    }

    #[test]
    #[should_panic(expected = "equal length")]
    fn test_panic_on_mismatched_key_lists() {
        let mut query = pods_with_nodes();
        query.joins[0].rhs.push(Expression::reference("n", "zone"));

        JoinEliminator::new(&query).run(&mut query);
    }
}
