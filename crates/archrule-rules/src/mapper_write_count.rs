//! Rule correlating a mapper's write calls with its field mappings.
//!
//! # Rationale
//!
//! A data mapper declares its fields in one method and serializes them in
//! another. Each mapped field needs exactly one write, on top of a fixed
//! number of header writes. Drift between the two methods silently corrupts
//! persisted data.
//!
//! # Detection
//!
//! For each type deriving from the mapper base in projects of the configured
//! category: the write method must call the write primitive exactly
//! `baseline + N` times, where `N` is the number of marker calls in the
//! configure method. A call to the escape hatch in the configure method
//! makes static counting meaningless, so the type passes.
//!
//! # Configuration
//!
//! - `base`: Mapper base type (default: `DataMapper`)
//! - `category`: Project category (default: `persistence`)
//! - `write_method` / `primitive`: Writer method and the call it counts
//!   (default: `write` / `write_value`)
//! - `configure_method` / `marker`: Mapping method and the call it counts
//!   (default: `configure` / `map`)
//! - `escape`: Escape-hatch call (default: `auto_map`)
//! - `baseline`: Fixed number of writes (default: 13)

use archrule_core::{
    rule_result, CodebaseRule, Compilation, ProgramModel, Rule, RuleAnalysisResult, RuleConfig,
    Severity, TypeAnalysisResult, TypeContext, TypeKind,
};
use rayon::prelude::*;
use tracing::debug;

/// Rule code for mapper-write-count.
pub const CODE: &str = "AR101";

/// Rule name for mapper-write-count.
pub const NAME: &str = "mapper-write-count";

/// Requires a mapper's write count to match its mapped fields.
#[derive(Debug, Clone)]
pub struct MapperWriteCount {
    base: String,
    category: String,
    write_method: String,
    primitive: String,
    configure_method: String,
    marker: String,
    escape: String,
    baseline: usize,
    severity: Severity,
}

impl Default for MapperWriteCount {
    fn default() -> Self {
        Self::new()
    }
}

impl MapperWriteCount {
    /// Creates a new rule with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: "DataMapper".to_string(),
            category: "persistence".to_string(),
            write_method: "write".to_string(),
            primitive: "write_value".to_string(),
            configure_method: "configure".to_string(),
            marker: "map".to_string(),
            escape: "auto_map".to_string(),
            baseline: 13,
            severity: Severity::Error,
        }
    }

    /// Sets the mapper base type.
    #[must_use]
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Sets the project category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the write method and the primitive counted in it.
    #[must_use]
    pub fn write_method(mut self, method: impl Into<String>, primitive: impl Into<String>) -> Self {
        self.write_method = method.into();
        self.primitive = primitive.into();
        self
    }

    /// Sets the configure method and the marker counted in it.
    #[must_use]
    pub fn configure_method(
        mut self,
        method: impl Into<String>,
        marker: impl Into<String>,
    ) -> Self {
        self.configure_method = method.into();
        self.marker = marker.into();
        self
    }

    /// Sets the escape-hatch call.
    #[must_use]
    pub fn escape(mut self, escape: impl Into<String>) -> Self {
        self.escape = escape.into();
        self
    }

    /// Sets the fixed number of writes.
    #[must_use]
    pub fn baseline(mut self, baseline: usize) -> Self {
        self.baseline = baseline;
        self
    }

    /// Sets the severity level.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Applies rule options from configuration.
    #[must_use]
    pub fn with_config(mut self, config: &RuleConfig) -> Self {
        let read = |key: &str, current: &str| config.get_str(key, current).to_string();
        self.base = read("base", &self.base);
        self.category = read("category", &self.category);
        self.write_method = read("write_method", &self.write_method);
        self.primitive = read("primitive", &self.primitive);
        self.configure_method = read("configure_method", &self.configure_method);
        self.marker = read("marker", &self.marker);
        self.escape = read("escape", &self.escape);
        let baseline = i64::try_from(self.baseline).unwrap_or(i64::MAX);
        self.baseline =
            usize::try_from(config.get_int("baseline", baseline)).unwrap_or(self.baseline);
        self
    }

    fn analyze_project(
        &self,
        model: &ProgramModel,
        project: &str,
        compilation: &Compilation,
    ) -> RuleAnalysisResult {
        let mut result = rule_result(self, project);
        result.types = compilation
            .types
            .iter()
            .filter(|t| t.kind != TypeKind::Interface && t.inherits_from(&self.base))
            .map(|symbol| {
                let ctx = TypeContext::new(symbol, compilation, project, &model.root);
                self.check_mapper(&ctx)
            })
            .collect();
        result
    }

    fn check_mapper(&self, ctx: &TypeContext) -> TypeAnalysisResult {
        let symbol = ctx.symbol;
        let (Some(write), Some(configure)) = (
            symbol.member(&self.write_method),
            symbol.member(&self.configure_method),
        ) else {
            let missing = if symbol.member(&self.write_method).is_none() {
                &self.write_method
            } else {
                &self.configure_method
            };
            return ctx
                .passed()
                .faulted(format!("method `{missing}` not found on `{}`", symbol.name));
        };

        if configure.calls_method(&self.escape) {
            debug!("{} uses {}; write count not checked", symbol.full_name(), self.escape);
            return ctx.passed();
        }

        let mapped = configure.count_calls(&self.marker);
        let expected = self.baseline + mapped;
        let actual = write.count_calls(&self.primitive);
        let file = ctx.member_file(write);
        if actual == expected || ctx.is_suppressed_in(file, CODE, write.line) {
            return ctx.passed();
        }

        let violation = ctx.violation_in(
            file,
            self,
            write.line,
            format!(
                "`{}.{}` calls `{}` {actual} time(s), expected {expected} ({} baseline + {mapped} `{}` call(s) in `{}`)",
                symbol.name,
                self.write_method,
                self.primitive,
                self.baseline,
                self.marker,
                self.configure_method,
            ),
            format!(
                "Write every field mapped in `{}` exactly once, or call `{}` there",
                self.configure_method, self.escape
            ),
        );
        ctx.passed().failed(violation)
    }
}

impl Rule for MapperWriteCount {
    fn name(&self) -> &'static str {
        NAME
    }

    fn code(&self) -> &'static str {
        CODE
    }

    fn category(&self) -> &'static str {
        "serialization"
    }

    fn description(&self) -> &'static str {
        "Mapper write calls must match the fields mapped in configure"
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }
}

impl CodebaseRule for MapperWriteCount {
    fn analyze(&self, model: &ProgramModel) -> Vec<RuleAnalysisResult> {
        let projects: Vec<(&String, &Compilation)> = model
            .projects
            .iter()
            .filter(|(_, c)| c.has_category(&self.category))
            .collect();

        if projects.is_empty() {
            debug!("No `{}` projects; {NAME} does not apply", self.category);
            return Vec::new();
        }

        projects
            .par_iter()
            .map(|(project, compilation)| self.analyze_project(model, project, compilation))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::codebase_outcomes;
    use archrule_core::{CallSite, MemberSymbol, TypeStatus, TypeSymbol};

    const FILE: &str = "/repo/Persistence/OrderMapper.rs";

    fn calls(member: MemberSymbol, method: &str, count: usize, first_line: usize) -> MemberSymbol {
        (0..count).fold(member, |m, i| m.with_call(CallSite::new(method, first_line + i)))
    }

    fn mapper(writes: usize, maps: usize, auto_map: bool) -> TypeSymbol {
        let mut configure = calls(MemberSymbol::method("configure", 3), "map", maps, 4);
        if auto_map {
            configure = configure.with_call(CallSite::new("auto_map", 9));
        }
        let write = calls(MemberSymbol::method("write", 20), "write_value", writes, 21);
        TypeSymbol::new("OrderMapper", TypeKind::Class, "Shop.Persistence", FILE, 1)
            .with_base("Shop.Persistence.DataMapper<Order>")
            .with_member(configure)
            .with_member(write)
    }

    fn model(symbol: TypeSymbol) -> ProgramModel {
        ProgramModel::new("/repo")
            .with_project(
                Compilation::new("Shop.Persistence")
                    .with_type(symbol)
                    .with_type(TypeSymbol::new(
                        "Row",
                        TypeKind::Class,
                        "Shop.Persistence",
                        FILE,
                        50,
                    ))
                    .with_source(FILE, "\n".repeat(60)),
            )
            .with_project(Compilation::new("Shop.Domain").with_type(mapper(0, 0, false)))
    }

    #[test]
    fn count_mismatch_fails() {
        let outcomes = codebase_outcomes(&MapperWriteCount::new(), &model(mapper(13, 2, false)));
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, TypeStatus::Failed);

        let v = outcomes[0].violation.as_ref().expect("violation");
        assert_eq!(v.location.line, 20);
        assert_eq!(v.project, "Shop.Persistence");
        insta::assert_snapshot!(v.message, @"`OrderMapper.write` calls `write_value` 13 time(s), expected 15 (13 baseline + 2 `map` call(s) in `configure`)");
    }

    #[test]
    fn auto_map_always_passes() {
        for writes in [0, 13, 15, 40] {
            let outcomes =
                codebase_outcomes(&MapperWriteCount::new(), &model(mapper(writes, 2, true)));
            assert_eq!(outcomes[0].status, TypeStatus::Passed, "writes = {writes}");
        }
    }

    #[test]
    fn matching_count_passes() {
        let outcomes = codebase_outcomes(&MapperWriteCount::new(), &model(mapper(15, 2, false)));
        assert_eq!(outcomes[0].status, TypeStatus::Passed);
        assert!(outcomes[0].violation.is_none());
    }

    #[test]
    fn one_result_per_category_project() {
        let results = MapperWriteCount::new().analyze(&model(mapper(15, 2, false)));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].project, "Shop.Persistence");
        assert_eq!(results[0].code, CODE);
        assert_eq!(results[0].types.len(), 1);
    }

    #[test]
    fn missing_method_faults() {
        let symbol = TypeSymbol::new("BrokenMapper", TypeKind::Class, "Shop.Persistence", FILE, 1)
            .with_base("DataMapper")
            .with_member(MemberSymbol::method("configure", 2));
        let outcomes = codebase_outcomes(&MapperWriteCount::new(), &model(symbol));
        assert_eq!(outcomes[0].status, TypeStatus::Faulted);
        assert_eq!(
            outcomes[0].fault.as_deref(),
            Some("method `write` not found on `BrokenMapper`")
        );
    }

    #[test]
    fn absent_category_does_not_apply() {
        let model = ProgramModel::new("/repo")
            .with_project(Compilation::new("Shop.Domain").with_type(mapper(0, 1, false)));
        assert!(MapperWriteCount::new().analyze(&model).is_empty());
    }

    #[test]
    fn suppressed_write_method_passes() {
        let mut source = "\n".repeat(60);
        source.insert_str(18, "// AR101 disable once : legacy header");
        let model = ProgramModel::new("/repo").with_project(
            Compilation::new("Shop.Persistence")
                .with_type(mapper(13, 2, false))
                .with_source(FILE, source),
        );
        let outcomes = codebase_outcomes(&MapperWriteCount::new(), &model);
        assert_eq!(outcomes[0].status, TypeStatus::Passed);
    }

    #[test]
    fn write_method_in_another_file_is_located_there() {
        const WRITE_FILE: &str = "/repo/Persistence/order_mapper/write.rs";
        let write =
            calls(MemberSymbol::method("write", 3), "write_value", 13, 4).in_file(WRITE_FILE);
        let symbol = TypeSymbol::new("OrderMapper", TypeKind::Class, "Shop.Persistence", FILE, 1)
            .with_base("DataMapper")
            .with_member(calls(MemberSymbol::method("configure", 3), "map", 2, 4))
            .with_member(write);
        let with_source = |write_source: &str| {
            ProgramModel::new("/repo").with_project(
                Compilation::new("Shop.Persistence")
                    .with_type(symbol.clone())
                    .with_source(FILE, "\n".repeat(20))
                    .with_source(WRITE_FILE, write_source),
            )
        };

        let blank = "\n".repeat(20);
        let outcomes = codebase_outcomes(&MapperWriteCount::new(), &with_source(&blank));
        let v = outcomes[0].violation.as_ref().expect("violation");
        assert_eq!(
            v.location.file,
            std::path::PathBuf::from("Persistence/order_mapper/write.rs")
        );
        assert_eq!(v.location.line, 3);

        let suppressed = "impl OrderMapper {\n    // AR101 disable once\n    fn write() {}\n}\n";
        let outcomes = codebase_outcomes(&MapperWriteCount::new(), &with_source(suppressed));
        assert_eq!(outcomes[0].status, TypeStatus::Passed);
    }

    #[test]
    fn options_from_config() {
        let config = archrule_core::Config::parse(
            "[rules.mapper-write-count]\nbaseline = 11\nmarker = \"field\"\n",
        )
        .expect("config");
        let rule = MapperWriteCount::new().with_config(&config.rule(NAME));
        let symbol = TypeSymbol::new("OrderMapper", TypeKind::Class, "Shop.Persistence", FILE, 1)
            .with_base("DataMapper")
            .with_member(calls(MemberSymbol::method("configure", 3), "field", 2, 4))
            .with_member(calls(MemberSymbol::method("write", 20), "write_value", 13, 21));
        let outcomes = codebase_outcomes(&rule, &model(symbol));
        assert_eq!(outcomes[0].status, TypeStatus::Passed);
    }
}
