// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query optimization for parsed ORM queries
//!
//! The rewrite passes live in `optimizers`; `optimizer` chains the enabled
//! ones according to an [`OptimizerConfig`](crate::config::OptimizerConfig).

pub mod optimizer;
pub mod optimizers;

pub use optimizer::{OptimizationLevel, OptimizationReport, QueryOptimizer};
