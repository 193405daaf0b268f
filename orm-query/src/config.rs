// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Optimizer configuration
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a
//! valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OptimizerError, Result};
use crate::plan::optimizer::OptimizationLevel;
use crate::plan::optimizers::redundant_cast::{STRING_CAST_FUNCTION, TRY_GET_STRING_FUNCTION};

/// Which rewrite passes run and how they are parameterized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    pub optimization_level: OptimizationLevel,
    pub enable_join_elimination: bool,
    pub enable_redundant_cast: bool,
    pub enable_group_by_unique_prefix: bool,
    /// Function whose single `try_get_string` argument makes it redundant
    pub cast_function_name: String,
    pub try_get_string_function_name: String,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            optimization_level: OptimizationLevel::Basic,
            enable_join_elimination: true,
            enable_redundant_cast: true,
            enable_group_by_unique_prefix: true,
            cast_function_name: STRING_CAST_FUNCTION.to_string(),
            try_get_string_function_name: TRY_GET_STRING_FUNCTION.to_string(),
        }
    }
}

impl OptimizerConfig {
    /// Configuration that runs no pass at all
    pub fn disabled() -> Self {
        Self {
            optimization_level: OptimizationLevel::None,
            ..Default::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: OptimizerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loading optimizer configuration from {}", path.display());
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cast_function_name.is_empty() || self.try_get_string_function_name.is_empty() {
            return Err(OptimizerError::InvalidConfig(
                "function names must not be empty".to_string(),
            ));
        }
        if self.cast_function_name == self.try_get_string_function_name {
            return Err(OptimizerError::InvalidConfig(format!(
                "cast function and inner function are both '{}'",
                self.cast_function_name
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_missing_fields_with_defaults() {
        let config =
            OptimizerConfig::from_json_str(r#"{"enable_join_elimination": false}"#).unwrap();

        assert!(!config.enable_join_elimination);
        assert!(config.enable_redundant_cast);
        assert_eq!(config.optimization_level, OptimizationLevel::Basic);
        assert_eq!(config.cast_function_name, "string");
    }

    #[test]
    fn test_reject_identical_function_names() {
        let result = OptimizerConfig::from_json_str(
            r#"{"cast_function_name": "f", "try_get_string_function_name": "f"}"#,
        );

        assert!(matches!(result, Err(OptimizerError::InvalidConfig(_))));
    }

    #[test]
    fn test_report_malformed_json() {
        let result = OptimizerConfig::from_json_str("{not json");

        assert!(matches!(result, Err(OptimizerError::Serialization(_))));
    }
}
