// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for the optimizer surface
//!
//! Passes themselves never fail: a query they cannot prove safe to rewrite
//! is left as is. Errors only come from loading and validating configuration.

use thiserror::Error;

/// Result type alias for optimizer configuration operations
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Optimizer errors
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("Invalid optimizer configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
