// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! # orm-query
//!
//! Structural rewrite passes for parsed ORM queries.
//!
//! The parser hands over a [`Query`](ast::Query); the passes rewrite it in
//! place before planning. Every pass proves from the tree shape alone that
//! the rewrite keeps query results unchanged, and otherwise does nothing:
//!
//! - [`try_optimize_join`]: remove a join that only relabels primary keys
//! - [`try_optimize_group_by_with_unique_prefix`]: detect a filter that pins
//!   the key prefix to one value
//! - [`try_optimize_redundant_cast`]: fold `string(try_get_string(...))`
//!
//! [`QueryOptimizer`](plan::QueryOptimizer) runs the passes selected by an
//! [`OptimizerConfig`](config::OptimizerConfig).

pub mod ast;
pub mod config;
pub mod error;
pub mod plan;

pub use config::OptimizerConfig;
pub use error::{OptimizerError, Result};
pub use plan::optimizers::{
    try_optimize_group_by_with_unique_prefix, try_optimize_join, try_optimize_redundant_cast,
};
pub use plan::{OptimizationLevel, OptimizationReport, QueryOptimizer};
