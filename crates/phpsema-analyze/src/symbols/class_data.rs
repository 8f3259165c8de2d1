//! Class and method symbol data
//!
//! Immutable records produced once per file by the extraction pass. They never
//! reference syntax-tree nodes, so a whole project's worth of them stays cheap
//! to keep around for cross-file queries.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::function_data::Parameter;
use super::qualified_name::QualifiedName;

/// Kind of a class-like declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassKind {
    Normal,
    Abstract,
    Interface,
}

/// Method/property visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// Position of a declaration in its source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourceLocation {
    pub fn new(
        file: impl Into<PathBuf>,
        start_line: usize,
        start_column: usize,
        end_line: usize,
        end_column: usize,
    ) -> Self {
        Self {
            file: file.into(),
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Location for seeded platform symbols that have no source file
    pub fn internal() -> Self {
        Self::new("<internal>", 0, 0, 0, 0)
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Immutable descriptor of a class-like declaration
#[derive(Debug, Clone, Serialize)]
pub struct ClassSymbolData {
    pub location: SourceLocation,
    pub qualified_name: QualifiedName,
    pub super_class: Option<QualifiedName>,
    /// Implemented (or, for interfaces, extended) interfaces in declaration order
    pub interfaces: Vec<QualifiedName>,
    pub kind: ClassKind,
    /// Methods declared directly on this class, in declaration order
    pub methods: Vec<MethodSymbolData>,
}

impl ClassSymbolData {
    pub fn new(qualified_name: impl Into<QualifiedName>, location: SourceLocation) -> Self {
        Self {
            location,
            qualified_name: qualified_name.into(),
            super_class: None,
            interfaces: Vec::new(),
            kind: ClassKind::Normal,
            methods: Vec::new(),
        }
    }

    /// Descriptor for a seeded platform class
    pub fn internal(qualified_name: impl Into<QualifiedName>) -> Self {
        Self::new(qualified_name, SourceLocation::internal())
    }

    pub fn with_kind(mut self, kind: ClassKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_super_class(mut self, name: impl Into<QualifiedName>) -> Self {
        self.super_class = Some(name.into());
        self
    }

    pub fn with_interface(mut self, name: impl Into<QualifiedName>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    pub fn with_method(mut self, method: MethodSymbolData) -> Self {
        self.methods.push(method);
        self
    }

    /// Look up a directly declared method (case-insensitive)
    pub fn get_method(&self, name: &str) -> Option<&MethodSymbolData> {
        self.methods
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.get_method(name).is_some()
    }
}

/// Immutable descriptor of a method declaration
#[derive(Debug, Clone, Serialize)]
pub struct MethodSymbolData {
    pub location: SourceLocation,
    /// `Class::method`
    pub qualified_name: QualifiedName,
    /// Method name as declared
    pub name: String,
    /// Qualified name of the class declaring this method
    pub class_name: QualifiedName,
    pub visibility: Visibility,
    pub parameters: Vec<Parameter>,
    /// Whether the body contains a value-returning `return`
    pub has_return: bool,
}

impl MethodSymbolData {
    pub fn new(
        class_name: impl Into<QualifiedName>,
        name: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        let class_name = class_name.into();
        let name = name.into();
        let qualified_name = class_name.member(&name);
        Self {
            location,
            qualified_name,
            name,
            class_name,
            visibility: Visibility::Public,
            parameters: Vec::new(),
            has_return: false,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return(mut self, has_return: bool) -> Self {
        self.has_return = has_return;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_lookup_case_insensitive() {
        let class = ClassSymbolData::internal("Foo")
            .with_method(MethodSymbolData::new("Foo", "getName", SourceLocation::internal()));

        assert!(class.has_method("getName"));
        assert!(class.has_method("getname"));
        assert!(class.has_method("GETNAME"));
        assert!(!class.has_method("setName"));
    }

    #[test]
    fn test_method_qualified_name() {
        let method = MethodSymbolData::new("App\\Foo", "bar", SourceLocation::internal());
        assert_eq!(method.qualified_name.as_str(), "App\\Foo::bar");
        assert_eq!(method.class_name.as_str(), "App\\Foo");
    }

    #[test]
    fn test_builder_preserves_order() {
        let class = ClassSymbolData::internal("C")
            .with_interface("A")
            .with_interface("B");
        let names: Vec<_> = class.interfaces.iter().map(|i| i.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
