//! Per-type analysis contexts.

use crate::model::{Compilation, MemberSymbol, Namespace, ProgramModel, TypeSymbol};
use crate::rule::Rule;
use crate::suppression;
use crate::types::{Location, TypeAnalysisResult, Violation};
use std::path::{Path, PathBuf};

/// One named type as seen by one rule.
///
/// Built fresh before each per-type rule run and never cached across rules.
/// Holds only shared borrows of the program model, so contexts can be
/// evaluated in parallel.
#[derive(Debug, Clone)]
pub struct TypeContext<'a> {
    /// The type symbol.
    pub symbol: &'a TypeSymbol,
    /// The compilation owning the type.
    pub compilation: &'a Compilation,
    /// Project name.
    pub project: &'a str,
    /// File path relative to the analysis root.
    pub relative_path: PathBuf,
    /// Declaration line (1-indexed).
    pub line: usize,
    /// Analysis root directory.
    pub root: &'a Path,
}

impl<'a> TypeContext<'a> {
    /// Creates a context for one type of one project.
    #[must_use]
    pub fn new(
        symbol: &'a TypeSymbol,
        compilation: &'a Compilation,
        project: &'a str,
        root: &'a Path,
    ) -> Self {
        let relative_path = symbol
            .file
            .strip_prefix(root)
            .map_or_else(|_| symbol.file.clone(), Path::to_path_buf);

        Self {
            symbol,
            compilation,
            project,
            relative_path,
            line: symbol.line,
            root,
        }
    }

    /// Builds contexts for every type of a project, in declaration order.
    #[must_use]
    pub fn for_project(
        project: &'a str,
        compilation: &'a Compilation,
        root: &'a Path,
    ) -> Vec<Self> {
        compilation
            .types
            .iter()
            .map(|symbol| Self::new(symbol, compilation, project, root))
            .collect()
    }

    /// The root-relative directory containing the type's file.
    #[must_use]
    pub fn folder(&self) -> &Path {
        self.relative_path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// The type's containing namespace.
    #[must_use]
    pub fn namespace(&self) -> &'a Namespace {
        &self.symbol.namespace
    }

    /// Source text of the type's file, if the provider supplied it.
    #[must_use]
    pub fn source(&self) -> Option<&'a str> {
        self.compilation.source(&self.symbol.file)
    }

    /// Whether `line` of the type's file is suppressed for `code`.
    ///
    /// Files without source text are never suppressed.
    #[must_use]
    pub fn is_suppressed(&self, code: &str, line: usize) -> bool {
        self.is_suppressed_in(&self.symbol.file, code, line)
    }

    /// Whether `line` of `file` is suppressed for `code`.
    #[must_use]
    pub fn is_suppressed_in(&self, file: &Path, code: &str, line: usize) -> bool {
        self.compilation
            .source(file)
            .is_some_and(|source| suppression::is_suppressed(source, code, line))
    }

    /// The file holding a member's body.
    #[must_use]
    pub fn member_file(&self, member: &'a MemberSymbol) -> &'a Path {
        member.file.as_deref().unwrap_or(self.symbol.file.as_path())
    }

    /// Builds a violation for `rule` at `line` of the type's file.
    #[must_use]
    pub fn violation<R: Rule + ?Sized>(
        &self,
        rule: &R,
        line: usize,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Violation {
        self.violation_in(&self.symbol.file, rule, line, message, hint)
    }

    /// Builds a violation for `rule` at `line` of `file`.
    #[must_use]
    pub fn violation_in<R: Rule + ?Sized>(
        &self,
        file: &Path,
        rule: &R,
        line: usize,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Violation {
        let mut location = Location::at_line(self.relative(file), line);
        if let Some(source) = self.compilation.source(file) {
            location = location.spanning_line(source);
        }
        Violation::new(
            rule.code(),
            rule.name(),
            rule.default_severity(),
            location,
            message,
        )
        .with_adr(rule.adr_path())
        .in_project(self.project)
        .with_hint(hint)
    }

    fn relative(&self, file: &Path) -> PathBuf {
        file.strip_prefix(self.root)
            .map_or_else(|_| file.to_path_buf(), Path::to_path_buf)
    }

    /// A passing outcome for this type.
    #[must_use]
    pub fn passed(&self) -> TypeAnalysisResult {
        TypeAnalysisResult::passed(
            &self.symbol.name,
            self.symbol.full_name(),
            self.relative_path.clone(),
            self.line,
        )
    }
}

/// Builds contexts for every type in every project of a model.
#[must_use]
pub fn type_contexts(model: &ProgramModel) -> Vec<TypeContext<'_>> {
    model
        .projects
        .iter()
        .flat_map(|(name, compilation)| TypeContext::for_project(name, compilation, &model.root))
        .collect()
}
