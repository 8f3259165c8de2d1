//! Function symbol data
//!
//! Immutable records of free function declarations, shared with methods
//! through the `Parameter` type.

use serde::Serialize;

use super::class_data::SourceLocation;
use super::qualified_name::QualifiedName;

/// A declared parameter of a function or method
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    /// Parameter name (without the `$`)
    pub name: String,
    /// Declared type hint, as written
    pub type_hint: Option<String>,
    pub has_default: bool,
    pub by_reference: bool,
    pub is_variadic: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
            has_default: false,
            by_reference: false,
            is_variadic: false,
        }
    }

    pub fn with_type_hint(mut self, hint: impl Into<String>) -> Self {
        self.type_hint = Some(hint.into());
        self
    }

    pub fn with_default(mut self, has_default: bool) -> Self {
        self.has_default = has_default;
        self
    }

    pub fn with_reference(mut self, by_reference: bool) -> Self {
        self.by_reference = by_reference;
        self
    }

    pub fn with_variadic(mut self, is_variadic: bool) -> Self {
        self.is_variadic = is_variadic;
        self
    }
}

/// Immutable descriptor of a function declaration
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSymbolData {
    pub location: SourceLocation,
    pub qualified_name: QualifiedName,
    /// Short name as declared
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// Whether the body contains a value-returning `return`
    pub has_return: bool,
}

impl FunctionSymbolData {
    pub fn new(qualified_name: impl Into<QualifiedName>, location: SourceLocation) -> Self {
        let qualified_name = qualified_name.into();
        let name = qualified_name.short_name().to_string();
        Self {
            location,
            qualified_name,
            name,
            parameters: Vec::new(),
            has_return: false,
        }
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return(mut self, has_return: bool) -> Self {
        self.has_return = has_return;
        self
    }

    /// Minimum required argument count
    pub fn required_args(&self) -> usize {
        self.parameters
            .iter()
            .take_while(|p| !p.has_default && !p.is_variadic)
            .count()
    }

    /// Maximum argument count (None if variadic)
    pub fn max_args(&self) -> Option<usize> {
        if self.parameters.iter().any(|p| p.is_variadic) {
            None
        } else {
            Some(self.parameters.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_name_from_qualified() {
        let func = FunctionSymbolData::new("App\\Helpers\\format_date", SourceLocation::internal());
        assert_eq!(func.name, "format_date");
        assert_eq!(func.qualified_name.as_str(), "App\\Helpers\\format_date");
    }

    #[test]
    fn test_arg_counts() {
        let func = FunctionSymbolData::new("f", SourceLocation::internal())
            .with_parameter(Parameter::new("a"))
            .with_parameter(Parameter::new("b").with_default(true))
            .with_parameter(Parameter::new("c").with_variadic(true));

        assert_eq!(func.required_args(), 1);
        assert_eq!(func.max_args(), None);
    }

    #[test]
    fn test_fixed_arg_counts() {
        let func = FunctionSymbolData::new("f", SourceLocation::internal())
            .with_parameter(Parameter::new("a"))
            .with_parameter(Parameter::new("b"));

        assert_eq!(func.required_args(), 2);
        assert_eq!(func.max_args(), Some(2));
    }
}
