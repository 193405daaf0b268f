// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! AST subsystem: query and expression tree nodes plus their text rendering

#[allow(clippy::module_inception)]
pub mod ast;
pub mod pretty_printer;

pub use ast::*;
