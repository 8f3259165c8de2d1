//! phpsema-core: AST traversal for PHP semantic analysis
//!
//! This crate provides:
//! - `Visitor`: Trait for traversing PHP syntax trees produced by `mago-syntax`
//! - `visit()`: Helper to run a visitor over a parsed program
//! - Span/position utilities shared by analysis passes

pub mod location;
pub mod visitor;

pub use location::{line_col, line_of, span_text};
pub use visitor::{visit, Visitor};
