//! Symbol data model
//!
//! Immutable, AST-decoupled descriptors of declared classes, methods and
//! functions, plus the per-run project registry they are collected into.

pub mod class_data;
pub mod function_data;
pub mod project;
pub mod qualified_name;

pub use class_data::{ClassKind, ClassSymbolData, MethodSymbolData, SourceLocation, Visibility};
pub use function_data::{FunctionSymbolData, Parameter};
pub use project::ProjectSymbolData;
pub use qualified_name::QualifiedName;
