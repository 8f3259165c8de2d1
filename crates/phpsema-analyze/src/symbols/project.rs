//! Project-wide symbol registry
//!
//! A per-analysis-run directory of symbol data collected from all files.
//! Populated during the sequential collect phase, read-only afterwards,
//! discarded at end of run. Classes follow last-registration-wins; functions
//! keep every declaration because PHP allows conditionally defined duplicates.

use std::collections::HashMap;

use super::class_data::{ClassKind, ClassSymbolData};
use super::function_data::FunctionSymbolData;

/// Registry of all classes and functions known to the current run
#[derive(Debug, Clone, Default)]
pub struct ProjectSymbolData {
    /// Classes by lowercase qualified name, last registration wins
    classes: HashMap<String, ClassSymbolData>,
    /// Functions by lowercase qualified name, all declarations retained
    functions: HashMap<String, Vec<FunctionSymbolData>>,
}

impl ProjectSymbolData {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with well-known platform classes
    ///
    /// The seed keeps hierarchy queries answerable when project code extends
    /// platform exceptions that are never declared in any analyzed file.
    pub fn with_builtins() -> Self {
        let mut project = Self::new();
        project.register_builtins();
        project
    }

    /// Register a class declaration; a later registration for the same
    /// qualified name replaces the earlier one
    pub fn register_class(&mut self, data: ClassSymbolData) {
        self.classes.insert(data.qualified_name.key().to_string(), data);
    }

    /// Register a function declaration; duplicates are retained in order
    pub fn register_function(&mut self, data: FunctionSymbolData) {
        self.functions
            .entry(data.qualified_name.key().to_string())
            .or_default()
            .push(data);
    }

    /// Look up a class by qualified name (case-insensitive)
    pub fn lookup_class(&self, name: &str) -> Option<&ClassSymbolData> {
        let name = name.strip_prefix('\\').unwrap_or(name);
        self.classes.get(&name.to_lowercase())
    }

    /// Look up every declaration of a function (case-insensitive)
    pub fn lookup_functions(&self, name: &str) -> &[FunctionSymbolData] {
        let name = name.strip_prefix('\\').unwrap_or(name);
        self.functions
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn class_exists(&self, name: &str) -> bool {
        self.lookup_class(name).is_some()
    }

    pub fn function_exists(&self, name: &str) -> bool {
        !self.lookup_functions(name).is_empty()
    }

    /// Iterate all registered classes
    pub fn classes(&self) -> impl Iterator<Item = &ClassSymbolData> {
        self.classes.values()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.values().map(Vec::len).sum()
    }

    /// Merge symbols collected from another (per-file or per-partition)
    /// registry into this one
    pub fn merge(&mut self, other: ProjectSymbolData) {
        self.classes.extend(other.classes);
        for (key, mut declarations) in other.functions {
            self.functions.entry(key).or_default().append(&mut declarations);
        }
    }

    /// Seed the registry with platform classes and their real hierarchy
    fn register_builtins(&mut self) {
        // (name, kind, parent, interfaces)
        let builtins: &[(&str, ClassKind, Option<&str>, &[&str])] = &[
            ("Throwable", ClassKind::Interface, None, &["Stringable"]),
            ("Stringable", ClassKind::Interface, None, &[]),
            ("Traversable", ClassKind::Interface, None, &[]),
            ("Iterator", ClassKind::Interface, None, &["Traversable"]),
            ("IteratorAggregate", ClassKind::Interface, None, &["Traversable"]),
            ("Countable", ClassKind::Interface, None, &[]),
            ("ArrayAccess", ClassKind::Interface, None, &[]),
            ("JsonSerializable", ClassKind::Interface, None, &[]),
            ("UnitEnum", ClassKind::Interface, None, &[]),
            ("BackedEnum", ClassKind::Interface, None, &["UnitEnum"]),
            ("stdClass", ClassKind::Normal, None, &[]),
            ("Closure", ClassKind::Normal, None, &[]),
            ("Generator", ClassKind::Normal, None, &["Iterator"]),
            ("Exception", ClassKind::Normal, None, &["Throwable"]),
            ("Error", ClassKind::Normal, None, &["Throwable"]),
            ("TypeError", ClassKind::Normal, Some("Error"), &[]),
            ("ValueError", ClassKind::Normal, Some("Error"), &[]),
            ("ArithmeticError", ClassKind::Normal, Some("Error"), &[]),
            ("DivisionByZeroError", ClassKind::Normal, Some("ArithmeticError"), &[]),
            ("ArgumentCountError", ClassKind::Normal, Some("TypeError"), &[]),
            ("ErrorException", ClassKind::Normal, Some("Exception"), &[]),
            ("RuntimeException", ClassKind::Normal, Some("Exception"), &[]),
            ("LogicException", ClassKind::Normal, Some("Exception"), &[]),
            ("InvalidArgumentException", ClassKind::Normal, Some("LogicException"), &[]),
            ("DomainException", ClassKind::Normal, Some("LogicException"), &[]),
            ("LengthException", ClassKind::Normal, Some("LogicException"), &[]),
            ("OutOfRangeException", ClassKind::Normal, Some("LogicException"), &[]),
            ("OutOfBoundsException", ClassKind::Normal, Some("RuntimeException"), &[]),
            ("RangeException", ClassKind::Normal, Some("RuntimeException"), &[]),
            ("OverflowException", ClassKind::Normal, Some("RuntimeException"), &[]),
            ("UnderflowException", ClassKind::Normal, Some("RuntimeException"), &[]),
            ("UnexpectedValueException", ClassKind::Normal, Some("RuntimeException"), &[]),
            ("BadFunctionCallException", ClassKind::Normal, Some("LogicException"), &[]),
            ("BadMethodCallException", ClassKind::Normal, Some("BadFunctionCallException"), &[]),
        ];

        for (name, kind, parent, interfaces) in builtins {
            let mut data = ClassSymbolData::internal(*name).with_kind(*kind);
            if let Some(parent) = parent {
                data = data.with_super_class(*parent);
            }
            for interface in *interfaces {
                data = data.with_interface(*interface);
            }
            self.register_class(data);
        }
    }
}
