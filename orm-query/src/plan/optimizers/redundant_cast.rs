// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Redundant string cast collapsing
//!
//! `try_get_string(...)` already yields a string, so wrapping it into the
//! string cast function is a no-op: `string(try_get_string(x, "/p"))` becomes
//! `try_get_string(x, "/p")`.

use crate::ast::{Expression, FunctionExpression, Query};
use crate::plan::optimizers::walker::ExpressionRewriter;

/// Name of the string cast function
pub const STRING_CAST_FUNCTION: &str = "string";

/// Name of the YSON string extraction function
pub const TRY_GET_STRING_FUNCTION: &str = "try_get_string";

/// Collapses `cast(try_get_string(...))` into `try_get_string(...)`
#[derive(Debug, Clone)]
pub struct RedundantCastOptimizer {
    cast_function: String,
    inner_function: String,
}

impl Default for RedundantCastOptimizer {
    fn default() -> Self {
        Self::new(STRING_CAST_FUNCTION, TRY_GET_STRING_FUNCTION)
    }
}

impl RedundantCastOptimizer {
    pub fn new(cast_function: &str, inner_function: &str) -> Self {
        Self {
            cast_function: cast_function.to_string(),
            inner_function: inner_function.to_string(),
        }
    }

    pub fn run(&mut self, query: &mut Query) -> bool {
        let optimized = self.rewrite_query(query);
        if optimized {
            log::debug!("Collapsed redundant {}() casts", self.cast_function);
        }
        optimized
    }
}

impl ExpressionRewriter for RedundantCastOptimizer {
    /// Arguments of other calls are not descended into.
    fn rewrite_function(&mut self, function: &mut FunctionExpression) -> bool {
        if function.function_name != self.cast_function {
            return false;
        }
        let collapsible = matches!(
            function.arguments.as_slice(),
            [Expression::Function(inner)] if inner.function_name == self.inner_function
        );
        if !collapsible {
            return false;
        }
        if let Some(Expression::Function(inner)) = function.arguments.pop() {
            log::trace!(
                "Collapsing {}({}(...))",
                function.function_name,
                inner.function_name
            );
            *function = inner;
        }
        true
    }
}
