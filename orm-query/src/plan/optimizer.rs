// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query optimizer
//!
//! Runs the enabled rewrite passes over a parsed query before it is handed to
//! the planner.

use serde::{Deserialize, Serialize};

use crate::ast::Query;
use crate::config::OptimizerConfig;
use crate::error::Result;
use crate::plan::optimizers::{GroupByOptimizer, JoinEliminator, RedundantCastOptimizer};

/// Optimization levels for query rewriting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OptimizationLevel {
    None, // Queries are planned exactly as parsed
    #[default]
    Basic, // Structural rewrites that never change results
}

/// Which passes fired on a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizationReport {
    pub join_eliminated: bool,
    pub casts_collapsed: bool,
}

impl OptimizationReport {
    pub fn optimized_anything(&self) -> bool {
        self.join_eliminated || self.casts_collapsed
    }
}

/// Applies the configured passes to queries
#[derive(Debug, Clone, Default)]
pub struct QueryOptimizer {
    config: OptimizerConfig,
}

impl QueryOptimizer {
    /// Create an optimizer; fails if the configuration is inconsistent
    pub fn new(config: OptimizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Rewrite `query` in place
    pub fn optimize(&self, query: &mut Query) -> OptimizationReport {
        let mut report = OptimizationReport::default();
        if self.config.optimization_level == OptimizationLevel::None {
            return report;
        }

        if self.config.enable_join_elimination {
            report.join_eliminated = JoinEliminator::new(query).run(query);
        }
        if self.config.enable_redundant_cast {
            let mut optimizer = RedundantCastOptimizer::new(
                &self.config.cast_function_name,
                &self.config.try_get_string_function_name,
            );
            report.casts_collapsed = optimizer.run(query);
        }

        if report.optimized_anything() {
            log::debug!("Optimized query: {}", query);
        }
        report
    }

    /// Whether the WHERE clause of `query` pins the single key prefix column
    /// of its primary table, making a GROUP BY on it redundant
    pub fn group_by_has_unique_prefix(&self, query: &Query, prefix_references: &[String]) -> bool {
        if self.config.optimization_level == OptimizationLevel::None
            || !self.config.enable_group_by_unique_prefix
        {
            return false;
        }
        match query.where_predicate.as_deref() {
            Some([filter]) => {
                GroupByOptimizer::new(prefix_references, query.table.alias.as_deref()).run(filter)
            }
            _ => false,
        }
    }
}
