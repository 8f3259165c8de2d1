//! Symbol extraction pass
//!
//! Walks one file's syntax tree and produces immutable symbol data: class-like
//! declarations with their hierarchy references and methods, plus free
//! functions. Names are qualified against the file's namespace and `use`
//! aliases at extraction time, so nothing downstream ever sees a relative
//! name.
//!
//! Traits are not extracted; trait composition is out of scope and a trait
//! name in `use` position inside a class body is simply ignored. Enums are
//! recorded as normal classes.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use mago_span::{HasSpan, Span};
use mago_syntax::ast::*;
use phpsema_core::{line_col, span_text, Visitor};

use crate::symbols::{
    ClassKind, ClassSymbolData, FunctionSymbolData, MethodSymbolData, Parameter, SourceLocation,
    Visibility,
};

/// Symbols extracted from a single file
#[derive(Debug, Default)]
pub struct FileSymbols {
    pub path: PathBuf,
    pub classes: Vec<ClassSymbolData>,
    pub functions: Vec<FunctionSymbolData>,
    /// `use` aliases in effect (alias -> fully qualified name)
    pub aliases: HashMap<String, String>,
}

/// Extracts symbol data from a PHP syntax tree
pub struct SymbolExtractor<'s> {
    source: &'s str,
    file: PathBuf,
    current_namespace: Option<String>,
    current_aliases: HashMap<String, String>,
    symbols: FileSymbols,
}

impl<'s> SymbolExtractor<'s> {
    pub fn new(source: &'s str, file: &Path) -> Self {
        let symbols = FileSymbols {
            path: file.to_path_buf(),
            ..FileSymbols::default()
        };
        Self {
            source,
            file: file.to_path_buf(),
            current_namespace: None,
            current_aliases: HashMap::new(),
            symbols,
        }
    }

    /// Extract all symbols from a parsed program
    pub fn extract(mut self, program: &Program<'_>) -> FileSymbols {
        self.visit_program(program, self.source);
        self.symbols.aliases = self.current_aliases;
        self.symbols
    }

    fn span_text(&self, span: &Span) -> &str {
        span_text(self.source, span)
    }

    fn location(&self, span: &Span) -> SourceLocation {
        let (start_line, start_column) = line_col(self.source, span.start.offset as usize);
        let (end_line, end_column) = line_col(self.source, span.end.offset as usize);
        SourceLocation::new(&self.file, start_line, start_column, end_line, end_column)
    }

    /// Qualify a name against the active aliases and namespace
    ///
    /// A leading `\` means the name is already fully qualified. Otherwise the
    /// first segment is checked against the `use` aliases (case-insensitive),
    /// and finally the current namespace is prepended.
    fn qualify_name(&self, name: &str) -> String {
        if let Some(stripped) = name.strip_prefix('\\') {
            return stripped.to_string();
        }

        let first_segment = name.split('\\').next().unwrap_or(name);
        let first_lower = first_segment.to_lowercase();
        for (alias, fqn) in &self.current_aliases {
            if alias.to_lowercase() == first_lower {
                return if name.contains('\\') {
                    format!("{}{}", fqn, &name[first_segment.len()..])
                } else {
                    fqn.clone()
                };
            }
        }

        match &self.current_namespace {
            Some(ns) => format!("{}\\{}", ns, name),
            None => name.to_string(),
        }
    }

    fn extract_visibility(&self, modifiers: &Sequence<'_, Modifier<'_>>) -> Visibility {
        if modifiers.contains_private() {
            Visibility::Private
        } else if modifiers.contains_protected() {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }

    fn extract_parameters(&self, parameter_list: &FunctionLikeParameterList<'_>) -> Vec<Parameter> {
        parameter_list
            .parameters
            .iter()
            .map(|param| {
                let name = self.span_text(&param.variable.span).trim_start_matches('$');
                let mut parameter = Parameter::new(name)
                    .with_default(param.default_value.is_some())
                    .with_reference(param.ampersand.is_some())
                    .with_variadic(param.ellipsis.is_some());
                if let Some(hint) = &param.hint {
                    parameter = parameter.with_type_hint(self.span_text(&hint.span()));
                }
                parameter
            })
            .collect()
    }

    /// Extract method declarations from class-like members
    fn extract_methods(
        &self,
        members: &Sequence<'_, ClassLikeMember<'_>>,
        class: &mut ClassSymbolData,
    ) {
        for member in members.iter() {
            if let ClassLikeMember::Method(method) = member {
                let name = self.span_text(&method.name.span);
                let mut data =
                    MethodSymbolData::new(class.qualified_name.clone(), name, self.location(&method.span()))
                        .with_visibility(self.extract_visibility(&method.modifiers));
                for parameter in self.extract_parameters(&method.parameter_list) {
                    data = data.with_parameter(parameter);
                }
                if let MethodBody::Concrete(block) = &method.body {
                    data = data.with_return(body_has_return(&block.statements, self.source));
                }
                class.methods.push(data);
            }
        }
    }

    /// Parse a `use` statement's source text into alias entries
    ///
    /// Covers plain imports, `as` renames, and grouped imports like
    /// `use Foo\{Bar, Baz as Qux};`. Function and const imports share the
    /// same shape and land in the same alias map.
    fn extract_aliases_from_use_text(&mut self, use_text: &str) {
        let text = use_text
            .trim_start_matches("use")
            .trim_start()
            .trim_start_matches("function")
            .trim_start_matches("const")
            .trim()
            .trim_end_matches(';')
            .trim();

        if let (Some(brace_start), Some(brace_end)) = (text.find('{'), text.find('}')) {
            let prefix = text[..brace_start].trim().trim_end_matches('\\');
            for item in text[brace_start + 1..brace_end].split(',') {
                let item = item.trim();
                if item.is_empty() {
                    continue;
                }
                let full = |name: &str| {
                    if prefix.is_empty() {
                        name.to_string()
                    } else {
                        format!("{}\\{}", prefix, name)
                    }
                };
                if let Some(as_pos) = item.to_lowercase().find(" as ") {
                    let name = item[..as_pos].trim();
                    let alias = item[as_pos + 4..].trim();
                    self.current_aliases.insert(alias.to_string(), full(name));
                } else {
                    let alias = item.rsplit('\\').next().unwrap_or(item);
                    self.current_aliases.insert(alias.to_string(), full(item));
                }
            }
            return;
        }

        if let Some(as_pos) = text.to_lowercase().find(" as ") {
            let full_name = text[..as_pos].trim().to_string();
            let alias = text[as_pos + 4..].trim().to_string();
            self.current_aliases.insert(alias, full_name);
        } else {
            let alias = text.rsplit('\\').next().unwrap_or(text);
            self.current_aliases.insert(alias.to_string(), text.to_string());
        }
    }
}

impl<'a, 's> Visitor<'a> for SymbolExtractor<'s> {
    fn visit_statement(&mut self, stmt: &Statement<'a>, _source: &str) -> bool {
        match stmt {
            Statement::Namespace(ns) => {
                let ns_text = self.span_text(&ns.span());
                if let Some(keyword_pos) = ns_text.find("namespace") {
                    let after_keyword = &ns_text[keyword_pos + 9..];
                    let name_end = after_keyword
                        .find(|c: char| c == '{' || c == ';')
                        .unwrap_or(after_keyword.len());
                    let name = after_keyword[..name_end].trim();
                    if !name.is_empty() {
                        self.current_namespace = Some(name.to_string());
                    }
                }
                true
            }
            Statement::Use(use_stmt) => {
                let use_text = self.span_text(&use_stmt.span()).to_string();
                self.extract_aliases_from_use_text(&use_text);
                true
            }
            Statement::Function(func) => {
                let span = func.name.span;
                let full_name = self.qualify_name(self.span_text(&span));

                let mut data = FunctionSymbolData::new(full_name, self.location(&func.span()))
                    .with_return(body_has_return(&func.body.statements, self.source));
                for parameter in self.extract_parameters(&func.parameter_list) {
                    data = data.with_parameter(parameter);
                }
                self.symbols.functions.push(data);
                true
            }
            Statement::Class(class) => {
                let name = self.span_text(&class.name.span);
                let full_name = self.qualify_name(name);

                let kind = if class.modifiers.contains_abstract() {
                    ClassKind::Abstract
                } else {
                    ClassKind::Normal
                };
                let mut data = ClassSymbolData::new(full_name, self.location(&class.span()))
                    .with_kind(kind);

                // classes extend at most one parent
                if let Some(extends) = &class.extends {
                    if let Some(parent) = extends.types.first() {
                        let parent_text = self.span_text(&parent.span());
                        data = data.with_super_class(self.qualify_name(parent_text));
                    }
                }
                if let Some(implements) = &class.implements {
                    for interface in implements.types.iter() {
                        let interface_text = self.span_text(&interface.span());
                        data = data.with_interface(self.qualify_name(interface_text));
                    }
                }

                self.extract_methods(&class.members, &mut data);
                self.symbols.classes.push(data);
                true
            }
            Statement::Interface(interface) => {
                let name = self.span_text(&interface.name.span);
                let full_name = self.qualify_name(name);

                let mut data = ClassSymbolData::new(full_name, self.location(&interface.span()))
                    .with_kind(ClassKind::Interface);

                // interfaces may extend several others; those land in the
                // interface list, never in the super-class slot
                if let Some(extends) = &interface.extends {
                    for parent in extends.types.iter() {
                        let parent_text = self.span_text(&parent.span());
                        data = data.with_interface(self.qualify_name(parent_text));
                    }
                }

                self.extract_methods(&interface.members, &mut data);
                self.symbols.classes.push(data);
                true
            }
            Statement::Enum(enum_def) => {
                let name = self.span_text(&enum_def.name.span);
                let full_name = self.qualify_name(name);

                let mut data = ClassSymbolData::new(full_name, self.location(&enum_def.span()));
                if let Some(implements) = &enum_def.implements {
                    for interface in implements.types.iter() {
                        let interface_text = self.span_text(&interface.span());
                        data = data.with_interface(self.qualify_name(interface_text));
                    }
                }

                self.extract_methods(&enum_def.members, &mut data);
                self.symbols.classes.push(data);
                true
            }
            _ => true,
        }
    }
}

/// Whether a body contains a value-returning `return` of its own
///
/// Control-flow bodies are searched; nested function-likes are not, since a
/// `return` inside a closure belongs to the closure.
fn body_has_return(statements: &Sequence<'_, Statement<'_>>, source: &str) -> bool {
    let mut scanner = ReturnScanner { found: false };
    for stmt in statements.iter() {
        scanner.traverse_statement(stmt, source);
    }
    scanner.found
}

struct ReturnScanner {
    found: bool,
}

impl<'a> Visitor<'a> for ReturnScanner {
    fn visit_statement(&mut self, stmt: &Statement<'a>, _source: &str) -> bool {
        match stmt {
            Statement::Return(ret) => {
                if ret.value.is_some() {
                    self.found = true;
                }
                true
            }
            Statement::Function(_)
            | Statement::Class(_)
            | Statement::Interface(_)
            | Statement::Trait(_)
            | Statement::Enum(_) => false,
            _ => !self.found,
        }
    }

    fn visit_expression(&mut self, expr: &Expression<'a>, _source: &str) -> bool {
        !matches!(expr, Expression::Closure(_) | Expression::ArrowFunction(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mago_database::file::FileId;

    fn extract(source: &str) -> FileSymbols {
        let arena = Box::leak(Box::new(bumpalo::Bump::new()));
        let file_id = FileId::new("test.php");
        let (program, _) = mago_syntax::parser::parse_file_content(arena, file_id, source);
        SymbolExtractor::new(source, Path::new("test.php")).extract(&program)
    }

    #[test]
    fn test_extract_class_with_namespace() {
        let source = r#"<?php
namespace App\Models;

class User {
}
"#;
        let symbols = extract(source);
        assert_eq!(symbols.classes.len(), 1);
        assert_eq!(symbols.classes[0].qualified_name.as_str(), "App\\Models\\User");
        assert_eq!(symbols.classes[0].kind, ClassKind::Normal);
        assert_eq!(symbols.classes[0].location.start_line, 4);
    }

    #[test]
    fn test_extract_abstract_class() {
        let source = r#"<?php
abstract class Shape {
}
"#;
        let symbols = extract(source);
        assert_eq!(symbols.classes[0].kind, ClassKind::Abstract);
    }

    #[test]
    fn test_extract_hierarchy_references() {
        let source = r#"<?php
namespace App;

use Psr\Log\LoggerInterface;

class Service extends BaseService implements LoggerInterface, \Countable {
}
"#;
        let symbols = extract(source);
        let class = &symbols.classes[0];
        assert_eq!(
            class.super_class.as_ref().unwrap().as_str(),
            "App\\BaseService"
        );
        let interfaces: Vec<_> = class.interfaces.iter().map(|i| i.as_str()).collect();
        assert_eq!(interfaces, vec!["Psr\\Log\\LoggerInterface", "Countable"]);
    }

    #[test]
    fn test_extract_interface_extends() {
        let source = r#"<?php
interface Collection extends Countable, Traversable {
}
"#;
        let symbols = extract(source);
        let interface = &symbols.classes[0];
        assert_eq!(interface.kind, ClassKind::Interface);
        assert!(interface.super_class.is_none());
        assert_eq!(interface.interfaces.len(), 2);
    }

    #[test]
    fn test_extract_methods() {
        let source = r#"<?php
class User {
    public function getName(): string {
        return $this->name;
    }

    private function reset($force = false) {
        $this->name = '';
    }
}
"#;
        let symbols = extract(source);
        let class = &symbols.classes[0];
        assert_eq!(class.methods.len(), 2);

        let get_name = class.get_method("getName").unwrap();
        assert_eq!(get_name.visibility, Visibility::Public);
        assert!(get_name.has_return);
        assert_eq!(get_name.qualified_name.as_str(), "User::getName");

        let reset = class.get_method("reset").unwrap();
        assert_eq!(reset.visibility, Visibility::Private);
        assert!(!reset.has_return);
        assert_eq!(reset.parameters.len(), 1);
        assert_eq!(reset.parameters[0].name, "force");
        assert!(reset.parameters[0].has_default);
    }

    #[test]
    fn test_return_inside_closure_does_not_count() {
        let source = r#"<?php
function run($items) {
    array_map(function ($item) {
        return $item * 2;
    }, $items);
}
"#;
        let symbols = extract(source);
        assert!(!symbols.functions[0].has_return);
    }

    #[test]
    fn test_return_inside_branch_counts() {
        let source = r#"<?php
function pick($flag) {
    if ($flag) {
        return 1;
    }
}
"#;
        let symbols = extract(source);
        assert!(symbols.functions[0].has_return);
    }

    #[test]
    fn test_use_alias_qualifies_extends() {
        let source = r#"<?php
namespace App;

use Vendor\Base as VendorBase;

class Thing extends VendorBase {
}
"#;
        let symbols = extract(source);
        assert_eq!(
            symbols.classes[0].super_class.as_ref().unwrap().as_str(),
            "Vendor\\Base"
        );
    }

    #[test]
    fn test_grouped_use_aliases() {
        let source = r#"<?php
namespace App;

use Vendor\{One, Two as Second};

class A extends One {}
class B extends Second {}
"#;
        let symbols = extract(source);
        assert_eq!(
            symbols.classes[0].super_class.as_ref().unwrap().as_str(),
            "Vendor\\One"
        );
        assert_eq!(
            symbols.classes[1].super_class.as_ref().unwrap().as_str(),
            "Vendor\\Two"
        );
    }

    #[test]
    fn test_traits_skipped_enums_recorded() {
        let source = r#"<?php
trait Greets {
    public function hello() {}
}

enum Suit implements HasColor {
    case Hearts;
    public function color(): string {
        return 'red';
    }
}
"#;
        let symbols = extract(source);
        assert_eq!(symbols.classes.len(), 1);
        let suit = &symbols.classes[0];
        assert_eq!(suit.qualified_name.as_str(), "Suit");
        assert_eq!(suit.kind, ClassKind::Normal);
        assert!(suit.has_method("color"));
        assert!(suit.interfaces.iter().any(|i| i.matches("HasColor")));
    }

    #[test]
    fn test_extract_function_with_parameters() {
        let source = r#"<?php
namespace App\Util;

function format(string $value, int ...$extras): string {
    return trim($value);
}
"#;
        let symbols = extract(source);
        let func = &symbols.functions[0];
        assert_eq!(func.qualified_name.as_str(), "App\\Util\\format");
        assert_eq!(func.name, "format");
        assert!(func.has_return);
        assert_eq!(func.parameters.len(), 2);
        assert_eq!(func.parameters[0].type_hint.as_deref(), Some("string"));
        assert!(func.parameters[1].is_variadic);
    }
}
