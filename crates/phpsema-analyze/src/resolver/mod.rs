//! Cross-file symbol resolution
//!
//! Extraction produces immutable symbol data per file; the graph resolves
//! that data into queryable class symbols with three-valued hierarchy
//! answers; the index wraps the graph in lazy and eager query frontends.

pub mod extractor;
pub mod graph;
pub mod index;

pub use extractor::{FileSymbols, SymbolExtractor};
pub use graph::{ClassSymbol, FunctionSymbol, MethodSymbol, SymbolGraph, Trilean};
pub use index::ClassSymbolIndex;
