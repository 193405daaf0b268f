// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Expression rewrite passes
//!
//! - walker: shared traversal every structural pass builds on
//! - join_elimination: drops a join whose joined columns are all keys
//! - group_by: detects a filter pinning the key prefix to one value
//! - redundant_cast: folds `string(try_get_string(...))`
//!
//! Each entry point either rewrites the query in place and returns `true`, or
//! leaves it untouched and returns `false`.

pub mod group_by;
pub mod join_elimination;
pub mod redundant_cast;
pub mod walker;

pub use group_by::GroupByOptimizer;
pub use join_elimination::JoinEliminator;
pub use redundant_cast::RedundantCastOptimizer;
pub use walker::ExpressionRewriter;

use crate::ast::{Expression, Query};

/// Remove the only join of `query` if it merely relabels primary table keys
pub fn try_optimize_join(query: &mut Query) -> bool {
    JoinEliminator::new(query).run(query)
}

/// Whether `filter_expression` pins the single prefix column of the table
/// aliased `table_name` to exactly one value
pub fn try_optimize_group_by_with_unique_prefix(
    filter_expression: &Expression,
    prefix_references: &[String],
    table_name: Option<&str>,
) -> bool {
    GroupByOptimizer::new(prefix_references, table_name).run(filter_expression)
}

/// Collapse `string(try_get_string(...))` calls everywhere in `query`
pub fn try_optimize_redundant_cast(query: &mut Query) -> bool {
    RedundantCastOptimizer::default().run(query)
}
