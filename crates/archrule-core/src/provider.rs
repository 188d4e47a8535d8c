//! Builds a [`ProgramModel`] from a Rust workspace.
//!
//! Every Cargo package below the root becomes one [`Compilation`]. Module
//! paths act as namespaces, traits are the interface kind, and implemented
//! traits or supertraits form the base-type list.

use crate::config::AnalyzerConfig;
use crate::model::{
    Argument, CallSite, ClosureSyntax, Compilation, MemberKind, MemberSymbol, Namespace,
    ProgramModel, TypeKind, TypeSymbol,
};
use crate::utils::{is_test_only, path_segments};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use syn::spanned::Spanned;
use syn::visit::Visit;
use syn::{Expr, ImplItem, Item, TraitItem, Type, TypeParamBound, UseTree};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while loading a program model.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// A source file is not valid Rust.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A `Cargo.toml` could not be parsed.
    #[error("Invalid manifest {path}: {message}")]
    Manifest {
        /// Manifest path.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An exclude pattern is not a valid glob.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

/// Loads Rust workspaces into the program model.
#[derive(Debug, Clone)]
pub struct RustModelProvider {
    exclude: Vec<glob::Pattern>,
    respect_gitignore: bool,
    fail_on_parse_error: bool,
}

impl Default for RustModelProvider {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            respect_gitignore: true,
            fail_on_parse_error: false,
        }
    }
}

impl RustModelProvider {
    /// Creates a provider with no exclusions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider from analyzer settings.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is not a valid glob.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, ProviderError> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            exclude,
            respect_gitignore: config.respect_gitignore,
            fail_on_parse_error: config.fail_on_parse_error,
        })
    }

    /// Adds an exclude glob, matched against root-relative paths.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is not a valid glob.
    pub fn exclude(mut self, pattern: &str) -> Result<Self, ProviderError> {
        self.exclude.push(glob::Pattern::new(pattern)?);
        Ok(self)
    }

    /// Makes unparseable source files abort loading.
    #[must_use]
    pub fn fail_on_parse_error(mut self, fail: bool) -> Self {
        self.fail_on_parse_error = fail;
        self
    }

    /// Loads every package below `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if traversal fails, a manifest is invalid, or a
    /// source file cannot be parsed while `fail_on_parse_error` is set.
    pub fn load(&self, root: &Path) -> Result<ProgramModel, ProviderError> {
        let mut model = ProgramModel::new(root);

        for package in self.discover_packages(root)? {
            let compilation = self.load_package(root, &package)?;
            debug!(
                "Loaded package {} with {} type(s)",
                package.name,
                compilation.types.len()
            );
            model.insert(compilation);
        }

        info!(
            "Loaded {} project(s), {} type(s) from {}",
            model.projects.len(),
            model.type_count(),
            root.display()
        );
        Ok(model)
    }

    fn walker(&self, dir: &Path) -> ignore::Walk {
        ignore::WalkBuilder::new(dir)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .build()
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.exclude
            .iter()
            .any(|p| p.matches_path(relative) || p.matches_path(path))
    }

    fn discover_packages(&self, root: &Path) -> Result<Vec<Package>, ProviderError> {
        let mut packages = Vec::new();

        for entry in self.walker(root) {
            let entry = entry?;
            let path = entry.path();
            if path.file_name().map_or(true, |n| n != "Cargo.toml") {
                continue;
            }
            if self.is_excluded(root, path) {
                debug!("Excluding manifest: {}", path.display());
                continue;
            }

            let text = read(path)?;
            let manifest: toml::Value =
                toml::from_str(&text).map_err(|e| ProviderError::Manifest {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;

            // Virtual workspace manifests carry no [package] table.
            let Some(name) = manifest
                .get("package")
                .and_then(|p| p.get("name"))
                .and_then(toml::Value::as_str)
            else {
                continue;
            };

            let dir = path.parent().unwrap_or(root).to_path_buf();
            packages.push(Package {
                name: name.to_string(),
                dir,
            });
        }

        packages.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(packages)
    }

    fn load_package(&self, root: &Path, package: &Package) -> Result<Compilation, ProviderError> {
        let crate_name = package.name.replace('-', "_");
        let mut compilation = Compilation::new(&package.name).with_assembly_name(&crate_name);
        let src = package.dir.join("src");
        if !src.is_dir() {
            debug!("Package {} has no src directory", package.name);
            return Ok(compilation);
        }

        let mut files = Vec::new();
        for entry in self.walker(&src) {
            let entry = entry?;
            let path = entry.path();
            if path.extension().map_or(true, |e| e != "rs") || !path.is_file() {
                continue;
            }
            if self.is_excluded(root, path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();

        let mut builder = CrateBuilder::new(&crate_name);
        for path in files {
            let text = read(&path)?;
            let module = module_path_for(&src, &path);
            match parse_file_into(&mut builder, &path, &text, module) {
                Ok(()) => {
                    compilation.sources.insert(path, text);
                }
                Err(message) => {
                    warn!("Failed to parse {}: {}", path.display(), message);
                    if self.fail_on_parse_error {
                        return Err(ProviderError::Parse { path, message });
                    }
                }
            }
        }

        compilation.types = builder.finish();
        Ok(compilation)
    }
}

struct Package {
    name: String,
    dir: PathBuf,
}

fn read(path: &Path) -> Result<String, ProviderError> {
    std::fs::read_to_string(path).map_err(|source| ProviderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Module path of a source file relative to the crate's `src` directory.
///
/// `lib.rs`, `main.rs` and `mod.rs` stand for their directory.
fn module_path_for(src: &Path, file: &Path) -> Vec<String> {
    let relative = file.strip_prefix(src).unwrap_or(file);
    let mut segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if let Some(last) = segments.pop() {
        let stem = last.trim_end_matches(".rs");
        let collapses = matches!(stem, "mod")
            || (segments.is_empty() && matches!(stem, "lib" | "main"));
        if !collapses {
            segments.push(stem.to_string());
        }
    }
    segments
}

/// Parses one file's items into the crate being built.
///
/// Returns the parser message on failure.
pub(crate) fn parse_file_into(
    builder: &mut CrateBuilder,
    path: &Path,
    text: &str,
    module: Vec<String>,
) -> Result<(), String> {
    let file = syn::parse_file(text).map_err(|e| e.to_string())?;
    builder.collect_module(path, &file.items, module);
    Ok(())
}

/// Accumulates the types of one crate across its files.
pub(crate) struct CrateBuilder {
    crate_name: String,
    types: Vec<TypeSymbol>,
    impls: Vec<PendingImpl>,
    test_modules: Vec<Vec<String>>,
}

/// An `impl` block waiting for its type to be declared.
struct PendingImpl {
    type_path: Vec<String>,
    base: Option<String>,
    file: PathBuf,
    members: Vec<MemberSymbol>,
}

impl CrateBuilder {
    pub(crate) fn new(crate_name: &str) -> Self {
        Self {
            crate_name: crate_name.to_string(),
            types: Vec::new(),
            impls: Vec::new(),
            test_modules: Vec::new(),
        }
    }

    fn collect_module(&mut self, file: &Path, items: &[Item], module: Vec<String>) {
        // Names a bare path head may refer to inside this module.
        let locals: HashSet<String> = items
            .iter()
            .filter_map(|item| match item {
                Item::Mod(m) => Some(m.ident.to_string()),
                Item::Struct(s) => Some(s.ident.to_string()),
                Item::Enum(e) => Some(e.ident.to_string()),
                Item::Union(u) => Some(u.ident.to_string()),
                Item::Trait(t) => Some(t.ident.to_string()),
                Item::Type(t) => Some(t.ident.to_string()),
                _ => None,
            })
            .collect();

        let crate_name = self.crate_name.clone();
        let no_imports = HashMap::new();
        let mut imports = HashMap::new();
        let bare = Resolver {
            crate_name: &crate_name,
            module: &module,
            imports: &no_imports,
            locals: &locals,
            self_type: None,
        };
        for item in items {
            if let Item::Use(u) = item {
                collect_use(&bare, &u.tree, &mut Vec::new(), &mut imports);
            }
        }

        let resolver = Resolver {
            crate_name: &crate_name,
            module: &module,
            imports: &imports,
            locals: &locals,
            self_type: None,
        };
        let namespace = resolver.module_path();

        for item in items {
            match item {
                Item::Struct(s) => {
                    self.push_type(&s.ident, TypeKind::Struct, &namespace, file);
                }
                Item::Union(u) => {
                    self.push_type(&u.ident, TypeKind::Struct, &namespace, file);
                }
                Item::Enum(e) => {
                    self.push_type(&e.ident, TypeKind::Enum, &namespace, file);
                }
                Item::Trait(t) => {
                    let mut symbol = type_symbol(&t.ident, TypeKind::Interface, &namespace, file);
                    for bound in &t.supertraits {
                        if let TypeParamBound::Trait(b) = bound {
                            symbol.base_types.push(resolver.resolve_path(&b.path).join("::"));
                        }
                    }
                    let self_path: Vec<String> = namespace
                        .iter()
                        .cloned()
                        .chain(std::iter::once(t.ident.to_string()))
                        .collect();
                    let scoped = resolver.with_self(&self_path);
                    for trait_item in &t.items {
                        if let TraitItem::Fn(f) = trait_item {
                            if let Some(body) = &f.default {
                                symbol.members.push(member(&scoped, &f.sig, body));
                            }
                        }
                    }
                    self.types.push(symbol);
                }
                Item::Impl(imp) => {
                    if is_test_only(&imp.attrs) {
                        continue;
                    }
                    let Type::Path(self_ty) = &*imp.self_ty else {
                        continue;
                    };
                    let type_path = resolver.resolve_path(&self_ty.path);
                    let base = imp
                        .trait_
                        .as_ref()
                        .map(|(_, path, _)| resolver.resolve_path(path).join("::"));
                    let scoped = resolver.with_self(&type_path);
                    let members = imp
                        .items
                        .iter()
                        .filter_map(|i| match i {
                            ImplItem::Fn(f) if !is_test_only(&f.attrs) => {
                                Some(member(&scoped, &f.sig, &f.block))
                            }
                            _ => None,
                        })
                        .collect();
                    self.impls.push(PendingImpl {
                        type_path,
                        base,
                        file: file.to_path_buf(),
                        members,
                    });
                }
                Item::Mod(m) => {
                    let mut child = module.clone();
                    child.push(m.ident.to_string());
                    if is_test_only(&m.attrs) {
                        self.test_modules.push(child);
                        continue;
                    }
                    if let Some((_, items)) = &m.content {
                        self.collect_module(file, items, child);
                    }
                }
                _ => {}
            }
        }
    }

    fn push_type(&mut self, ident: &syn::Ident, kind: TypeKind, namespace: &[String], file: &Path) {
        self.types.push(type_symbol(ident, kind, namespace, file));
    }

    /// Drops test-only modules and attaches `impl` blocks to their types.
    pub(crate) fn finish(self) -> Vec<TypeSymbol> {
        let Self {
            crate_name,
            types,
            impls,
            test_modules,
        } = self;
        let is_test = |segments: &[String]| {
            test_modules.iter().any(|test| {
                segments.len() > test.len()
                    && segments[0] == crate_name
                    && segments[1..].starts_with(test)
            })
        };

        let mut types: Vec<TypeSymbol> = types
            .into_iter()
            .filter(|t| !is_test(t.namespace.segments()))
            .collect();

        for imp in impls {
            let full = imp.type_path.join("::");
            let simple = imp.type_path.last().cloned().unwrap_or_default();
            let index = types.iter().position(|t| t.full_name() == full).or_else(|| {
                let mut named = types.iter().enumerate().filter(|(_, t)| t.name == simple);
                match (named.next(), named.next()) {
                    (Some((i, _)), None) => Some(i),
                    _ => None,
                }
            });
            let Some(index) = index else {
                debug!("impl for external type {full} ignored");
                continue;
            };
            let symbol = &mut types[index];
            if let Some(base) = imp.base {
                if !symbol.base_types.contains(&base) {
                    symbol.base_types.push(base);
                }
            }
            let elsewhere = (imp.file != symbol.file).then_some(imp.file);
            symbol.members.extend(imp.members.into_iter().map(|mut m| {
                m.file.clone_from(&elsewhere);
                m
            }));
        }

        types
    }
}

fn type_symbol(
    ident: &syn::Ident,
    kind: TypeKind,
    namespace: &[String],
    file: &Path,
) -> TypeSymbol {
    let mut symbol = TypeSymbol::new(ident.to_string(), kind, "", file, line_of(ident.span()));
    symbol.namespace = Namespace::from_segments(namespace.iter().cloned());
    symbol
}

fn line_of(span: proc_macro2::Span) -> usize {
    span.start().line
}

fn member(resolver: &Resolver<'_>, sig: &syn::Signature, body: &syn::Block) -> MemberSymbol {
    let mut symbol = MemberSymbol::method(sig.ident.to_string(), line_of(sig.ident.span()));
    if sig.ident == "new" && sig.receiver().is_none() {
        symbol.kind = MemberKind::Constructor;
    }

    let mut collector = CallCollector {
        resolver,
        calls: Vec::new(),
    };
    collector.visit_block(body);
    collector
        .calls
        .sort_by_key(|(line, column, _)| (*line, *column));
    symbol.calls = collector.calls.into_iter().map(|(_, _, c)| c).collect();
    symbol
}

/// Name resolution scope of one module.
struct Resolver<'a> {
    crate_name: &'a str,
    module: &'a [String],
    imports: &'a HashMap<String, Vec<String>>,
    locals: &'a HashSet<String>,
    self_type: Option<&'a [String]>,
}

impl<'a> Resolver<'a> {
    fn with_self(&self, self_type: &'a [String]) -> Resolver<'a> {
        Resolver {
            crate_name: self.crate_name,
            module: self.module,
            imports: self.imports,
            locals: self.locals,
            self_type: Some(self_type),
        }
    }

    fn module_path(&self) -> Vec<String> {
        std::iter::once(self.crate_name.to_string())
            .chain(self.module.iter().cloned())
            .collect()
    }

    fn resolve_path(&self, path: &syn::Path) -> Vec<String> {
        self.resolve(&path_segments(path))
    }

    /// Resolves a path written in this module to a crate-qualified path.
    ///
    /// Heads that are neither imported nor declared in the module are kept
    /// as written (external crates, prelude items).
    fn resolve(&self, segments: &[String]) -> Vec<String> {
        let Some(first) = segments.first() else {
            return self.module_path();
        };
        let mut rest = &segments[1..];

        let mut path = match first.as_str() {
            "crate" => vec![self.crate_name.to_string()],
            "self" => self.module_path(),
            "super" => {
                let mut path = self.module_path();
                path.pop();
                while rest.first().is_some_and(|s| s == "super") {
                    path.pop();
                    rest = &rest[1..];
                }
                if path.is_empty() {
                    path.push(self.crate_name.to_string());
                }
                path
            }
            "Self" => match self.self_type {
                Some(t) => t.to_vec(),
                None => return segments.to_vec(),
            },
            head => {
                if let Some(import) = self.imports.get(head) {
                    import.clone()
                } else if self.locals.contains(head) {
                    let mut path = self.module_path();
                    path.push(head.to_string());
                    path
                } else {
                    vec![head.to_string()]
                }
            }
        };
        path.extend(rest.iter().cloned());
        path
    }
}

fn collect_use(
    resolver: &Resolver<'_>,
    tree: &UseTree,
    prefix: &mut Vec<String>,
    imports: &mut HashMap<String, Vec<String>>,
) {
    match tree {
        UseTree::Path(p) => {
            prefix.push(p.ident.to_string());
            collect_use(resolver, &p.tree, prefix, imports);
            prefix.pop();
        }
        UseTree::Name(n) => {
            if n.ident == "self" {
                if let Some(alias) = prefix.last().cloned() {
                    imports.insert(alias, resolver.resolve(prefix));
                }
            } else {
                let mut full = prefix.clone();
                full.push(n.ident.to_string());
                imports.insert(n.ident.to_string(), resolver.resolve(&full));
            }
        }
        UseTree::Rename(r) => {
            let mut full = prefix.clone();
            full.push(r.ident.to_string());
            imports.insert(r.rename.to_string(), resolver.resolve(&full));
        }
        UseTree::Group(g) => {
            for item in &g.items {
                collect_use(resolver, item, prefix, imports);
            }
        }
        UseTree::Glob(_) => {}
    }
}

/// Collects every call in a body, nested calls included.
struct CallCollector<'a> {
    resolver: &'a Resolver<'a>,
    calls: Vec<(usize, usize, CallSite)>,
}

impl CallCollector<'_> {
    fn push<'e>(
        &mut self,
        method: &syn::Ident,
        target: Option<String>,
        args: impl IntoIterator<Item = &'e Expr>,
    ) {
        let start = method.span().start();
        let mut call = CallSite::new(method.to_string(), start.line);
        call.target = target;
        call.arguments = args.into_iter().map(argument).collect();
        self.calls.push((start.line, start.column, call));
    }
}

impl<'ast> Visit<'ast> for CallCollector<'_> {
    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let Expr::Path(func) = &*node.func {
            let segments: Vec<String> = func
                .path
                .segments
                .iter()
                .map(|s| s.ident.to_string())
                .collect();
            if let (Some(last), Some((_, prefix))) =
                (func.path.segments.last(), segments.split_last())
            {
                let target = if prefix.is_empty() {
                    match self.resolver.imports.get(&segments[0]) {
                        Some(import) => import[..import.len().saturating_sub(1)].to_vec(),
                        None => self.resolver.module_path(),
                    }
                } else {
                    self.resolver.resolve(prefix)
                };
                self.push(&last.ident, Some(target.join("::")), &node.args);
            }
        }
        syn::visit::visit_expr_call(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast syn::ExprMethodCall) {
        let on_self = matches!(&*node.receiver, Expr::Path(p) if p.path.is_ident("self"));
        let target = if on_self {
            self.resolver.self_type.map(|t| t.join("::"))
        } else {
            None
        };
        self.push(&node.method, target, &node.args);
        syn::visit::visit_expr_method_call(self, node);
    }

    // Items nested in bodies belong to their own scope.
    fn visit_item(&mut self, _node: &'ast Item) {}
}

fn argument(expr: &Expr) -> Argument {
    match expr {
        Expr::Closure(closure) => {
            let mut modifiers: Vec<&str> = Vec::new();
            if closure.constness.is_some() {
                modifiers.push("const");
            }
            if closure.movability.is_some() {
                modifiers.push("static");
            }
            if closure.asyncness.is_some() {
                modifiers.push("async");
            }
            if closure.capture.is_some() {
                modifiers.push("move");
            }
            Argument::Closure(ClosureSyntax::new(
                line_of(closure.span()),
                &modifiers,
            ))
        }
        _ => Argument::Value,
    }
}
