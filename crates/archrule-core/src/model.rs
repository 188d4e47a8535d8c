//! Program model consumed by the engine.
//!
//! The engine never parses source code itself. A provider (such as
//! [`crate::RustModelProvider`]) or the host builds a [`ProgramModel`]:
//! one [`Compilation`] per project, each exposing its named types with
//! symbol metadata and the raw source text of every file.
//!
//! All types here are plain data. The model is treated as immutable for the
//! duration of an analysis run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// The complete input of an analysis run.
#[derive(Debug, Clone, Default)]
pub struct ProgramModel {
    /// Root directory used to compute root-relative file paths.
    pub root: PathBuf,
    /// Project name → compiled unit. Sorted for deterministic iteration.
    pub projects: BTreeMap<String, Compilation>,
}

impl ProgramModel {
    /// Creates an empty model rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            projects: BTreeMap::new(),
        }
    }

    /// Adds a project, keyed by its project name.
    #[must_use]
    pub fn with_project(mut self, compilation: Compilation) -> Self {
        self.insert(compilation);
        self
    }

    /// Inserts or replaces a project.
    pub fn insert(&mut self, compilation: Compilation) {
        self.projects
            .insert(compilation.project_name.clone(), compilation);
    }

    /// Looks up a project by name.
    #[must_use]
    pub fn project(&self, name: &str) -> Option<&Compilation> {
        self.projects.get(name)
    }

    /// Total number of named types across all projects.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.projects.values().map(|c| c.types.len()).sum()
    }

    /// Iterates every type in every project, in project order.
    pub fn all_types(&self) -> impl Iterator<Item = (&Compilation, &TypeSymbol)> {
        self.projects
            .values()
            .flat_map(|c| c.types.iter().map(move |t| (c, t)))
    }
}

/// One compiled project: its symbol table and source text.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// Project name as known to the host (e.g. crate or project file name).
    pub project_name: String,
    /// Declared assembly/crate name; its first segment is the root namespace.
    pub assembly_name: String,
    /// Named types declared in this project.
    pub types: Vec<TypeSymbol>,
    /// Source text keyed by the same paths the symbols report.
    pub sources: BTreeMap<PathBuf, String>,
}

impl Compilation {
    /// Creates an empty compilation whose assembly name equals the project name.
    #[must_use]
    pub fn new(project_name: impl Into<String>) -> Self {
        let project_name = project_name.into();
        Self {
            assembly_name: project_name.clone(),
            project_name,
            types: Vec::new(),
            sources: BTreeMap::new(),
        }
    }

    /// Overrides the assembly name.
    #[must_use]
    pub fn with_assembly_name(mut self, name: impl Into<String>) -> Self {
        self.assembly_name = name.into();
        self
    }

    /// Adds a type symbol.
    #[must_use]
    pub fn with_type(mut self, symbol: TypeSymbol) -> Self {
        self.types.push(symbol);
        self
    }

    /// Adds the source text of one file.
    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.sources.insert(path.into(), text.into());
        self
    }

    /// First `.`/`::` delimited segment of the assembly name.
    #[must_use]
    pub fn root_namespace(&self) -> &str {
        first_segment(&self.assembly_name)
    }

    /// Source text of a file, if the provider supplied it.
    #[must_use]
    pub fn source(&self, path: &Path) -> Option<&str> {
        self.sources.get(path).map(String::as_str)
    }

    /// Finds the first type with the given simple name.
    #[must_use]
    pub fn type_named(&self, name: &str) -> Option<&TypeSymbol> {
        self.types.iter().find(|t| t.name == name)
    }

    /// Whether the project name carries `category` as one of its
    /// `.`, `::`, `-` or `_` delimited segments (case-insensitive).
    ///
    /// `Shop.Persistence` and `shop-persistence` both belong to `persistence`.
    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.project_name
            .split(|c: char| matches!(c, '.' | ':' | '-' | '_'))
            .any(|segment| segment.eq_ignore_ascii_case(category))
    }
}

fn first_segment(name: &str) -> &str {
    let end = name
        .find(|c: char| c == '.' || c == ':')
        .unwrap_or(name.len());
    &name[..end]
}

/// Structural kind of a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// Reference type with implementation inheritance.
    Class,
    /// Value type (Rust `struct`/`union`).
    Struct,
    /// Enumeration.
    Enum,
    /// Interface or Rust trait.
    Interface,
    /// Record type.
    Record,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Interface => "interface",
            Self::Record => "record",
        };
        f.write_str(s)
    }
}

/// A namespace or module path.
///
/// Accepts both `.` and `::` separators and keeps the one it was written
/// with, so hints can be rendered in the codebase's own notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Namespace {
    segments: Vec<String>,
    separator: &'static str,
}

impl Namespace {
    /// Parses a namespace string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let separator = if raw.contains("::") { "::" } else { "." };
        let segments = raw
            .split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Self {
            segments,
            separator,
        }
    }

    /// Builds a `::` separated namespace from segments.
    #[must_use]
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            separator: "::",
        }
    }

    /// The individual segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The separator used for display.
    #[must_use]
    pub fn separator(&self) -> &'static str {
        if self.separator.is_empty() {
            "."
        } else {
            self.separator
        }
    }

    /// Whether the namespace has no segments (global namespace).
    #[must_use]
    pub fn is_global(&self) -> bool {
        self.segments.is_empty()
    }

    /// Case-insensitive check of the last segment.
    #[must_use]
    pub fn ends_with_segment(&self, segment: &str) -> bool {
        self.segments
            .last()
            .is_some_and(|s| s.eq_ignore_ascii_case(segment))
    }

    /// Case-insensitive check for a full segment anywhere in the path.
    #[must_use]
    pub fn contains_segment(&self, segment: &str) -> bool {
        self.segments.iter().any(|s| s.eq_ignore_ascii_case(segment))
    }

    /// Returns this namespace extended by one segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Self {
            segments,
            separator: self.separator(),
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(self.separator()))
    }
}

/// A named type with its symbol metadata.
#[derive(Debug, Clone)]
pub struct TypeSymbol {
    /// Simple name (e.g. `IFoo`).
    pub name: String,
    /// Containing namespace.
    pub namespace: Namespace,
    /// Structural kind.
    pub kind: TypeKind,
    /// Base types and implemented interfaces, fully qualified when known.
    pub base_types: Vec<String>,
    /// File the type is declared in, as reported by the provider.
    pub file: PathBuf,
    /// Declaration line (1-indexed).
    pub line: usize,
    /// Members with bodies.
    pub members: Vec<MemberSymbol>,
}

impl TypeSymbol {
    /// Creates a type symbol with no bases and no members.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: TypeKind,
        namespace: &str,
        file: impl Into<PathBuf>,
        line: usize,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: Namespace::parse(namespace),
            kind,
            base_types: Vec::new(),
            file: file.into(),
            line,
            members: Vec::new(),
        }
    }

    /// Adds a base type.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_types.push(base.into());
        self
    }

    /// Adds a member.
    #[must_use]
    pub fn with_member(mut self, member: MemberSymbol) -> Self {
        self.members.push(member);
        self
    }

    /// Namespace-qualified name.
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_global() {
            self.name.clone()
        } else {
            format!("{}{}{}", self.namespace, self.namespace.separator(), self.name)
        }
    }

    /// Whether any base type matches `base` by full name or by last segment.
    ///
    /// Generic arguments on the recorded base (`Mapper<Order>`) are ignored.
    #[must_use]
    pub fn inherits_from(&self, base: &str) -> bool {
        self.base_types.iter().any(|b| {
            let b = strip_generics(b);
            b == base || last_path_segment(b) == base
        })
    }

    /// First member with the given name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberSymbol> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Drops a trailing generic argument list (`Foo<Bar>` → `Foo`).
#[must_use]
pub fn strip_generics(name: &str) -> &str {
    name.find('<').map_or(name, |i| &name[..i])
}

/// Last `.`/`::` delimited segment of a qualified name.
#[must_use]
pub fn last_path_segment(name: &str) -> &str {
    name.rsplit(|c: char| c == '.' || c == ':')
        .next()
        .unwrap_or(name)
}

/// Kind of a type member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// Method or associated function.
    Method,
    /// Constructor.
    Constructor,
    /// Property or accessor.
    Property,
}

/// A member with a syntax body.
#[derive(Debug, Clone)]
pub struct MemberSymbol {
    /// Member name.
    pub name: String,
    /// Member kind.
    pub kind: MemberKind,
    /// Declaration line (1-indexed).
    pub line: usize,
    /// Every call in the member body, nested calls included, in source order.
    pub calls: Vec<CallSite>,
    /// File holding the member body when it is not the type's own file,
    /// as with an `impl` block in another module.
    pub file: Option<PathBuf>,
}

impl MemberSymbol {
    /// Creates a method member.
    #[must_use]
    pub fn method(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            line,
            calls: Vec::new(),
            file: None,
        }
    }

    /// Records the file holding the member body.
    #[must_use]
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Adds a call site.
    #[must_use]
    pub fn with_call(mut self, call: CallSite) -> Self {
        self.calls.push(call);
        self
    }

    /// Number of calls to a method with the given name.
    #[must_use]
    pub fn count_calls(&self, method: &str) -> usize {
        self.calls.iter().filter(|c| c.method == method).count()
    }

    /// Whether the body calls a method with the given name.
    #[must_use]
    pub fn calls_method(&self, method: &str) -> bool {
        self.calls.iter().any(|c| c.method == method)
    }
}

/// One invocation expression.
#[derive(Debug, Clone)]
pub struct CallSite {
    /// Invoked method name.
    pub method: String,
    /// Qualified path of the type or module that declares the method, if resolved.
    pub target: Option<String>,
    /// Line of the invocation (1-indexed).
    pub line: usize,
    /// Arguments, in order.
    pub arguments: Vec<Argument>,
}

impl CallSite {
    /// Creates a call without a resolved target.
    #[must_use]
    pub fn new(method: impl Into<String>, line: usize) -> Self {
        Self {
            method: method.into(),
            target: None,
            line,
            arguments: Vec::new(),
        }
    }

    /// Sets the resolved target.
    #[must_use]
    pub fn on(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Adds an argument.
    #[must_use]
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Whether the resolved target lives under the given root namespace.
    #[must_use]
    pub fn targets_namespace(&self, root: &str) -> bool {
        self.target.as_deref().is_some_and(|t| {
            let t = t.trim_start_matches("::");
            t == root
                || t.strip_prefix(root)
                    .is_some_and(|rest| rest.starts_with('.') || rest.starts_with("::"))
        })
    }
}

/// A call argument.
#[derive(Debug, Clone)]
pub enum Argument {
    /// Anonymous function or closure.
    Closure(ClosureSyntax),
    /// Any other expression.
    Value,
}

/// An anonymous function passed as an argument.
#[derive(Debug, Clone, Default)]
pub struct ClosureSyntax {
    /// Line of the closure's start position (1-indexed).
    pub line: usize,
    /// Qualifiers written on the closure (`static`, `async`, `move`, ...).
    pub modifiers: Vec<String>,
}

impl ClosureSyntax {
    /// Creates a closure with the given modifiers.
    #[must_use]
    pub fn new(line: usize, modifiers: &[&str]) -> Self {
        Self {
            line,
            modifiers: modifiers.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    /// Whether the closure carries the given qualifier.
    #[must_use]
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}
