//! Class symbol index
//!
//! Thin query frontends over the resolution graph. `of_file` scopes queries to
//! one file's declarations with the project registry as fallback and resolves
//! on demand; `of_project` resolves the whole registry up front. Both answer
//! any given query identically, so callers pick purely on access pattern:
//! per-file passes use the lazy form, whole-project reporting the eager one.

use crate::resolver::extractor::FileSymbols;
use crate::resolver::graph::{ClassSymbol, FunctionSymbol, SymbolGraph};
use crate::symbols::{ProjectSymbolData, QualifiedName};

pub struct ClassSymbolIndex<'p> {
    graph: SymbolGraph<'p>,
    /// Qualified names of locally declared classes, in declaration order
    declared: Vec<QualifiedName>,
}

impl<'p> ClassSymbolIndex<'p> {
    /// Index one file's declarations over the project registry, resolving
    /// hierarchy edges on first query
    pub fn of_file(file: &'p FileSymbols, project: &'p ProjectSymbolData) -> Self {
        Self {
            graph: SymbolGraph::new(file.classes.iter(), project),
            declared: file.classes.iter().map(|c| c.qualified_name.clone()).collect(),
        }
    }

    /// Index the whole registry, resolving every hierarchy edge up front
    pub fn of_project(project: &'p ProjectSymbolData) -> Self {
        let mut declared: Vec<QualifiedName> =
            project.classes().map(|c| c.qualified_name.clone()).collect();
        declared.sort_by(|a, b| a.key().cmp(b.key()));
        Self {
            graph: SymbolGraph::build(project.classes(), project),
            declared,
        }
    }

    /// Resolve a class by name; never fails, a miss yields an unknown sentinel
    pub fn get(&self, name: &str) -> ClassSymbol<'_, 'p> {
        self.graph.class_symbol(name)
    }

    /// Resolve a function by name
    pub fn get_function(&self, name: &str) -> FunctionSymbol<'p> {
        self.graph.function_symbol(name)
    }

    /// Resolved symbols for the indexed declarations, in index order
    pub fn declared_classes(&self) -> Vec<ClassSymbol<'_, 'p>> {
        self.declared
            .iter()
            .map(|name| self.graph.class_symbol(name.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::extractor::SymbolExtractor;
    use crate::resolver::graph::Trilean;
    use crate::symbols::ClassKind;
    use mago_database::file::FileId;
    use std::path::Path;

    fn extract(name: &str, source: &str) -> FileSymbols {
        let arena = Box::leak(Box::new(bumpalo::Bump::new()));
        let file_id = FileId::new("test.php");
        let (program, _) = mago_syntax::parser::parse_file_content(arena, file_id, source);
        SymbolExtractor::new(source, Path::new(name)).extract(&program)
    }

    fn registry(files: &[&FileSymbols]) -> ProjectSymbolData {
        let mut project = ProjectSymbolData::with_builtins();
        for file in files {
            for class in &file.classes {
                project.register_class(class.clone());
            }
            for function in &file.functions {
                project.register_function(function.clone());
            }
        }
        project
    }

    #[test]
    fn test_cross_file_hierarchy() {
        let base = extract(
            "base.php",
            r#"<?php
namespace App;

abstract class Repository implements \Countable {
}
"#,
        );
        let user = extract(
            "user.php",
            r#"<?php
namespace App;

class UserRepository extends Repository {
}
"#,
        );
        let project = registry(&[&base, &user]);
        let index = ClassSymbolIndex::of_file(&user, &project);

        let repo = index.get("App\\UserRepository");
        assert_eq!(repo.is_or_subclass_of("App\\Repository"), Trilean::True);
        assert_eq!(repo.is_sub_type_of(&["Countable"]), Trilean::True);
        assert!(repo.super_class().unwrap().is(ClassKind::Abstract));
    }

    #[test]
    fn test_lazy_and_eager_agree() {
        let file = extract(
            "app.php",
            r#"<?php
namespace App;

interface Renderer {
}

class HtmlRenderer implements Renderer {
}

class CachedRenderer extends HtmlRenderer {
}

class Orphan extends Missing {
}
"#,
        );
        let project = registry(&[&file]);

        let lazy = ClassSymbolIndex::of_file(&file, &project);
        let eager = ClassSymbolIndex::of_project(&project);

        for name in [
            "App\\HtmlRenderer",
            "App\\CachedRenderer",
            "App\\Orphan",
            "App\\NotDeclared",
        ] {
            for target in ["App\\Renderer", "App\\HtmlRenderer", "Elsewhere"] {
                assert_eq!(
                    lazy.get(name).is_or_subclass_of(target),
                    eager.get(name).is_or_subclass_of(target),
                    "is_or_subclass_of({name}, {target})"
                );
                assert_eq!(
                    lazy.get(name).is_sub_type_of(&[target]),
                    eager.get(name).is_sub_type_of(&[target]),
                    "is_sub_type_of({name}, {target})"
                );
            }
            assert_eq!(
                lazy.get(name).all_super_types().len(),
                eager.get(name).all_super_types().len(),
                "closure size of {name}"
            );
        }
    }

    #[test]
    fn test_unknown_parent_degrades_queries() {
        let file = extract(
            "orphan.php",
            r#"<?php
class Orphan extends \Vendor\Missing {
}
"#,
        );
        let project = registry(&[&file]);
        let index = ClassSymbolIndex::of_file(&file, &project);

        let orphan = index.get("Orphan");
        assert_eq!(orphan.is_or_subclass_of("Anything"), Trilean::Unknown);
        assert_eq!(orphan.is_or_subclass_of("Orphan"), Trilean::True);
        let parent = orphan.super_class().unwrap();
        assert!(parent.is_unknown());
        assert_eq!(parent.qualified_name().as_str(), "Vendor\\Missing");
    }

    #[test]
    fn test_declared_classes_in_order() {
        let file = extract(
            "two.php",
            r#"<?php
class First {}
class Second {}
"#,
        );
        let project = registry(&[&file]);
        let index = ClassSymbolIndex::of_file(&file, &project);

        let names: Vec<_> = index
            .declared_classes()
            .iter()
            .map(|c| c.qualified_name().as_str().to_string())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_function_lookup_through_index() {
        let file = extract(
            "fns.php",
            r#"<?php
namespace App;

function helper(int $x): int {
    return $x + 1;
}
"#,
        );
        let project = registry(&[&file]);
        let index = ClassSymbolIndex::of_file(&file, &project);

        let helper = index.get_function("App\\helper");
        assert!(!helper.is_unknown());
        assert_eq!(helper.parameters().len(), 1);
        assert!(index.get_function("App\\gone").is_unknown());
    }
}
