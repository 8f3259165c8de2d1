//! phpsema-analyze: cross-file symbol resolution and cognitive complexity for PHP
//!
//! This crate provides the semantic core of a PHP analysis pipeline:
//!
//! - Per-file symbol extraction into immutable, AST-decoupled data
//! - A project-wide symbol registry with seeded platform classes
//! - Three-valued hierarchy queries over a cycle-safe class graph
//! - Cognitive complexity scoring for function-like units and whole files
//!
//! # Example
//!
//! ```no_run
//! use phpsema_analyze::{Analyzer, ClassSymbolIndex, Trilean};
//! use std::path::Path;
//!
//! let analyzer = Analyzer::with_defaults();
//! let analysis = analyzer.analyze_paths(&[Path::new("src/")]).unwrap();
//!
//! let index = ClassSymbolIndex::of_project(&analysis.project);
//! let user = index.get("App\\Models\\User");
//! assert_eq!(user.is_sub_type_of(&["JsonSerializable"]), Trilean::True);
//!
//! for file in &analysis.files {
//!     println!("{}: complexity {}", file.path.display(), file.complexity.total);
//! }
//! ```

pub mod complexity;
pub mod config;
pub mod logging;
pub mod resolver;
pub mod symbols;

use std::fs;
use std::path::{Path, PathBuf};

use mago_database::file::FileId;
use rayon::prelude::*;
use walkdir::WalkDir;

use complexity::{program_complexity, unit_complexities};
use config::AnalyzerConfig;
use resolver::SymbolExtractor;

pub use complexity::{CognitiveComplexity, ComplexityComponent, FunctionLike};
pub use resolver::{
    ClassSymbol, ClassSymbolIndex, FileSymbols, FunctionSymbol, MethodSymbol, Trilean,
};
pub use symbols::{
    ClassKind, ClassSymbolData, FunctionSymbolData, ProjectSymbolData, QualifiedName, Visibility,
};

/// Per-file analysis output: extracted symbols plus complexity scores
#[derive(Debug)]
pub struct FileAnalysis {
    pub path: PathBuf,
    pub symbols: FileSymbols,
    /// Whole-file score (script region plus every non-nested unit)
    pub complexity: CognitiveComplexity,
    /// Named scores for top-level functions and methods
    pub units: Vec<(String, CognitiveComplexity)>,
    /// First parse error, if the file was malformed (analysis still runs on
    /// the recovered tree)
    pub parse_error: Option<String>,
}

/// Whole-project analysis output
///
/// `project` is the frozen registry; query it through `ClassSymbolIndex`.
#[derive(Debug)]
pub struct ProjectAnalysis {
    pub project: ProjectSymbolData,
    pub files: Vec<FileAnalysis>,
}

impl ProjectAnalysis {
    /// Eager index over the whole frozen registry
    pub fn index(&self) -> ClassSymbolIndex<'_> {
        ClassSymbolIndex::of_project(&self.project)
    }

    /// Lazy index scoped to one analyzed file
    pub fn file_index<'p>(&'p self, file: &'p FileAnalysis) -> ClassSymbolIndex<'p> {
        ClassSymbolIndex::of_file(&file.symbols, &self.project)
    }

    pub fn total_complexity(&self) -> u32 {
        self.files.iter().map(|f| f.complexity.total).sum()
    }
}

/// Errors that can occur while driving an analysis run
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("No paths configured for analysis")]
    NoPathsConfigured,

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

/// Main analyzer: discovers files, collects symbols, scores complexity
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    /// Create a new analyzer with the given configuration
    pub fn new(config: AnalyzerConfig) -> Self {
        if let Some(log_file) = &config.log_file {
            if let Err(e) = logging::init_logger(Some(log_file)) {
                eprintln!("Warning: could not open log file: {}", e);
            }
        }
        Self { config }
    }

    /// Create analyzer with default configuration
    pub fn with_defaults() -> Self {
        Self::new(AnalyzerConfig::default())
    }

    /// Get the current configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a single file from disk
    pub fn analyze_file(&self, path: &Path) -> Result<FileAnalysis, AnalyzeError> {
        let source = fs::read_to_string(path)?;
        Ok(self.analyze_source(path, &source))
    }

    /// Analyze source code with a given path
    ///
    /// Parsing is error-tolerant: a malformed file still yields symbols and
    /// scores for whatever the parser recovered, with the error recorded.
    pub fn analyze_source(&self, path: &Path, source: &str) -> FileAnalysis {
        let arena = bumpalo::Bump::new();
        let file_id = FileId::new(path.to_string_lossy().as_ref());
        let (program, parse_error) =
            mago_syntax::parser::parse_file_content(&arena, file_id, source);

        let symbols = SymbolExtractor::new(source, path).extract(&program);
        let complexity = program_complexity(&program, source);
        let units = unit_complexities(&program, source);

        FileAnalysis {
            path: path.to_path_buf(),
            symbols,
            complexity,
            units,
            parse_error: parse_error.map(|e| e.to_string()),
        }
    }

    /// Analyze multiple paths (files or directories)
    ///
    /// Files are analyzed in parallel; the collected symbols are then merged
    /// sequentially into one registry, after which the registry is frozen.
    pub fn analyze_paths(&self, paths: &[&Path]) -> Result<ProjectAnalysis, AnalyzeError> {
        let files = self.discover_files(paths);
        logging::log_collect_start(files.len());

        let mut analyses: Vec<FileAnalysis> = files
            .par_iter()
            .filter_map(|file| match self.analyze_file(file) {
                Ok(analysis) => Some(analysis),
                Err(e) => {
                    logging::log_file_error(file, &e.to_string());
                    eprintln!("Warning: {}: {}", file.display(), e);
                    None
                }
            })
            .collect();
        analyses.sort_by(|a, b| a.path.cmp(&b.path));

        let mut project = if self.config.seed_builtins {
            ProjectSymbolData::with_builtins()
        } else {
            ProjectSymbolData::new()
        };
        for analysis in &analyses {
            for class in &analysis.symbols.classes {
                project.register_class(class.clone());
            }
            for function in &analysis.symbols.functions {
                project.register_function(function.clone());
            }
        }
        logging::log_collect_complete(project.class_count(), project.function_count());

        let result = ProjectAnalysis {
            project,
            files: analyses,
        };
        logging::log_analysis_complete(result.files.len(), result.total_complexity());
        Ok(result)
    }

    /// Analyze paths specified in the configuration
    pub fn analyze_configured_paths(&self) -> Result<ProjectAnalysis, AnalyzeError> {
        let paths: Vec<_> = self.config.paths.iter().map(|p| p.as_path()).collect();
        if paths.is_empty() {
            return Err(AnalyzeError::NoPathsConfigured);
        }
        self.analyze_paths(&paths)
    }

    fn discover_files(&self, paths: &[&Path]) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for path in paths {
            if path.is_file() {
                files.push(path.to_path_buf());
            } else if path.is_dir() {
                for entry in WalkDir::new(path)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    let entry_path = entry.path();
                    if entry_path.is_file()
                        && self.config.matches_extension(entry_path)
                        && !self.config.is_excluded(entry_path)
                    {
                        files.push(entry_path.to_path_buf());
                    }
                }
            }
        }
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_simple_source() {
        let analyzer = Analyzer::with_defaults();
        let source = "<?php\necho 'hello';\n";
        let analysis = analyzer.analyze_source(Path::new("test.php"), source);

        assert!(analysis.parse_error.is_none());
        assert!(analysis.symbols.classes.is_empty());
        assert_eq!(analysis.complexity.total, 0);
    }

    #[test]
    fn test_analyze_source_scores_units() {
        let analyzer = Analyzer::with_defaults();
        let source = r#"<?php
class Order {
    public function total(array $lines): int {
        $sum = 0;
        foreach ($lines as $line) {
            if ($line->qty > 0) {
                $sum += $line->price;
            }
        }
        return $sum;
    }
}
"#;
        let analysis = analyzer.analyze_source(Path::new("order.php"), source);

        assert_eq!(analysis.symbols.classes.len(), 1);
        // foreach 1 + nested if 2
        assert_eq!(analysis.complexity.total, 3);
        assert_eq!(analysis.units.len(), 1);
        assert_eq!(analysis.units[0].0, "Order::total");
        assert_eq!(analysis.units[0].1.total, 3);
    }

    #[test]
    fn test_analyze_paths_cross_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("base.php"),
            "<?php\nnamespace App;\nabstract class Repo implements \\Countable {}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("user.php"),
            "<?php\nnamespace App;\nclass UserRepo extends Repo {}\n",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "not php").unwrap();

        let analyzer = Analyzer::with_defaults();
        let analysis = analyzer.analyze_paths(&[dir.path()]).unwrap();

        assert_eq!(analysis.files.len(), 2);
        assert!(analysis.project.class_exists("App\\UserRepo"));

        let index = analysis.index();
        let repo = index.get("App\\UserRepo");
        assert_eq!(repo.is_or_subclass_of("App\\Repo"), Trilean::True);
        assert_eq!(repo.is_sub_type_of(&["Countable"]), Trilean::True);
    }

    #[test]
    fn test_file_index_matches_project_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.php"),
            "<?php\nclass A {}\nclass B extends A {}\n",
        )
        .unwrap();

        let analyzer = Analyzer::with_defaults();
        let analysis = analyzer.analyze_paths(&[dir.path()]).unwrap();

        let eager = analysis.index();
        let lazy = analysis.file_index(&analysis.files[0]);
        assert_eq!(
            eager.get("B").is_or_subclass_of("A"),
            lazy.get("B").is_or_subclass_of("A")
        );
    }

    #[test]
    fn test_no_paths_configured() {
        let analyzer = Analyzer::with_defaults();
        let result = analyzer.analyze_configured_paths();
        assert!(matches!(result, Err(AnalyzeError::NoPathsConfigured)));
    }

    #[test]
    fn test_parse_error_recorded_not_fatal() {
        let analyzer = Analyzer::with_defaults();
        let source = "<?php\nclass Broken {\n";
        let analysis = analyzer.analyze_source(Path::new("broken.php"), source);
        assert!(analysis.parse_error.is_some());
    }

    #[test]
    fn test_builtins_toggle() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.php"), "<?php\nclass A {}\n").unwrap();

        let mut config = AnalyzerConfig::default();
        config.seed_builtins = false;
        let analyzer = Analyzer::new(config);
        let analysis = analyzer.analyze_paths(&[dir.path()]).unwrap();

        assert!(!analysis.project.class_exists("Exception"));
        assert!(analysis.project.class_exists("A"));
    }
}
