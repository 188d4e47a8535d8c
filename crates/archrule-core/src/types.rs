//! Result model: violations, per-type outcomes, and per-rule aggregates.

use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for rule violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail a run.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl Severity {
    /// Parses a lowercase severity name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "info" => Some(Self::Info),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the analysis root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    pub offset: usize,
    /// Length of the span in bytes.
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Creates a location pointing at the start of a line.
    #[must_use]
    pub fn at_line(file: PathBuf, line: usize) -> Self {
        Self::new(file, line, 1)
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }

    /// Fills in offset and length so the span covers the whole line in `source`.
    #[must_use]
    pub fn spanning_line(self, source: &str) -> Self {
        let mut offset = 0;
        for (i, raw) in source.split_inclusive('\n').enumerate() {
            if i + 1 == self.line {
                let text = raw.trim_end_matches(['\n', '\r']);
                return self.with_span(offset, text.len());
            }
            offset += raw.len();
        }
        self
    }
}

/// A single failed invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule code (e.g., "AR001"), also used by suppression comments.
    pub code: String,
    /// Rule name (e.g., "interfaces-in-interfaces-folder").
    pub rule: String,
    /// Severity of this violation.
    pub severity: Severity,
    /// Path of the design decision document behind the rule.
    pub adr_path: String,
    /// Project the offending type belongs to.
    pub project: String,
    /// Primary location of the violation.
    pub location: Location,
    /// Human-readable message.
    pub message: String,
    /// Actionable hint for fixing the violation.
    pub hint: String,
}

impl Violation {
    /// Creates a new violation without ADR path or project.
    ///
    /// Rules normally go through [`crate::TypeContext::violation`], which
    /// fills those in from the rule and the context.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        location: Location,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            rule: rule.into(),
            severity,
            adr_path: String::new(),
            project: String::new(),
            location,
            message: message.into(),
            hint: String::new(),
        }
    }

    /// Sets the ADR path.
    #[must_use]
    pub fn with_adr(mut self, adr_path: impl Into<String>) -> Self {
        self.adr_path = adr_path.into();
        self
    }

    /// Sets the project name.
    #[must_use]
    pub fn in_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Sets the hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = hint.into();
        self
    }

    /// Formats the violation for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}:{} [{}]\n",
            self.code,
            self.rule,
            self.location.file.display(),
            self.location.line,
            self.project,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        if !self.hint.is_empty() {
            let _ = writeln!(output, "  = help: {}", self.hint);
        }
        if !self.adr_path.is_empty() {
            let _ = writeln!(output, "  = see: {}", self.adr_path);
        }
        output
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}: {} [{}] {}",
            self.location.file.display(),
            self.location.line,
            self.severity,
            self.code,
            self.message
        )?;
        if !self.adr_path.is_empty() {
            write!(f, " (see: {})", self.adr_path)?;
        }
        Ok(())
    }
}

/// Converts a Violation to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct ViolationDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Violation> for ViolationDiagnostic {
    fn from(v: &Violation) -> Self {
        Self {
            message: format!("[{}] {}", v.code, v.message),
            help: (!v.hint.is_empty()).then(|| v.hint.clone()),
            span: SourceSpan::from((v.location.offset, v.location.length)),
            label_message: v.rule.clone(),
        }
    }
}

/// Outcome of one type under one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeStatus {
    /// The type satisfies the invariant (or the rule does not apply).
    Passed,
    /// The type violates the invariant.
    Failed,
    /// The rule could not evaluate the type.
    Faulted,
}

/// Pass/fail outcome for one type under one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAnalysisResult {
    /// Simple type name.
    pub type_name: String,
    /// Namespace-qualified type name.
    pub full_name: String,
    /// Root-relative file path.
    pub file: PathBuf,
    /// Declaration line.
    pub line: usize,
    /// Outcome.
    pub status: TypeStatus,
    /// The violation, present iff `status` is `Failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violation: Option<Violation>,
    /// Fault message, present iff `status` is `Faulted`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl TypeAnalysisResult {
    /// A passing outcome.
    #[must_use]
    pub fn passed(type_name: &str, full_name: String, file: PathBuf, line: usize) -> Self {
        Self {
            type_name: type_name.to_string(),
            full_name,
            file,
            line,
            status: TypeStatus::Passed,
            violation: None,
            fault: None,
        }
    }

    /// Turns this outcome into a failure carrying `violation`.
    #[must_use]
    pub fn failed(mut self, violation: Violation) -> Self {
        self.status = TypeStatus::Failed;
        self.violation = Some(violation);
        self
    }

    /// Turns this outcome into an evaluator fault.
    #[must_use]
    pub fn faulted(mut self, message: impl Into<String>) -> Self {
        self.status = TypeStatus::Faulted;
        self.fault = Some(message.into());
        self
    }
}

/// Aggregate outcome for one rule over one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAnalysisResult {
    /// Rule category.
    pub category: String,
    /// Rule name.
    pub rule: String,
    /// Rule code.
    pub code: String,
    /// Rule description.
    pub description: String,
    /// Effective severity.
    pub severity: Severity,
    /// Path of the design decision document.
    pub adr_path: String,
    /// Project name.
    pub project: String,
    /// One entry per examined type, in compilation order.
    pub types: Vec<TypeAnalysisResult>,
}

impl RuleAnalysisResult {
    /// Violations recorded in this result.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.types.iter().filter_map(|t| t.violation.as_ref())
    }

    /// Outcomes with `Failed` status.
    pub fn failed(&self) -> impl Iterator<Item = &TypeAnalysisResult> {
        self.types
            .iter()
            .filter(|t| t.status == TypeStatus::Failed)
    }

    /// Outcomes with `Faulted` status.
    pub fn faulted(&self) -> impl Iterator<Item = &TypeAnalysisResult> {
        self.types
            .iter()
            .filter(|t| t.status == TypeStatus::Faulted)
    }

    /// Whether every examined type passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.types.iter().all(|t| t.status == TypeStatus::Passed)
    }
}

/// Result of running every registered rule over a program model.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Per (rule, project) results, in registry then project order.
    pub results: Vec<RuleAnalysisResult>,
    /// Number of types in the analyzed model.
    pub types_checked: usize,
}

impl AnalysisReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All violations, in report order.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.results.iter().flat_map(RuleAnalysisResult::violations)
    }

    /// All faulted outcomes, paired with the rule name.
    pub fn faults(&self) -> impl Iterator<Item = (&str, &TypeAnalysisResult)> {
        self.results
            .iter()
            .flat_map(|r| r.faulted().map(move |t| (r.rule.as_str(), t)))
    }

    /// Whether any evaluator fault was recorded.
    #[must_use]
    pub fn has_faults(&self) -> bool {
        self.faults().next().is_some()
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.has_violations_at(Severity::Error)
    }

    /// Checks if any violations meet or exceed the given severity threshold.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations().any(|v| v.severity >= severity)
    }

    /// Counts violations by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for v in self.violations() {
            match v.severity {
                Severity::Error => counts.0 += 1,
                Severity::Warning => counts.1 += 1,
                Severity::Info => counts.2 += 1,
            }
        }
        counts
    }

    /// Adds the results of another report.
    pub fn extend(&mut self, other: Self) {
        self.results.extend(other.results);
        self.types_checked += other.types_checked;
    }

    /// Prints a summary report to stdout.
    pub fn print_report(&self) {
        let (errors, warnings, infos) = self.count_by_severity();

        for violation in self.violations() {
            println!("{}", violation.format());
        }

        println!(
            "\nFound {errors} error(s), {warnings} warning(s), {infos} info(s) in {} type(s)",
            self.types_checked
        );
    }

    /// Formats violations and faults as a test failure report.
    ///
    /// Produces a human-readable multi-line report suitable for `panic!()`
    /// messages in `cargo test` integration. Message and hint are surfaced
    /// verbatim.
    #[must_use]
    pub fn format_test_report(&self, fail_on: Severity) -> String {
        use std::fmt::Write;

        let failing: Vec<&Violation> = self
            .violations()
            .filter(|v| v.severity >= fail_on)
            .collect();
        let faults: Vec<(&str, &TypeAnalysisResult)> = self.faults().collect();

        let mut report = String::new();
        let _ = writeln!(
            report,
            "\n=== archrule: {} violation(s) ===\n",
            failing.len()
        );

        for v in &failing {
            let _ = writeln!(
                report,
                "{} [{}] in {} at {}:{}",
                v.rule,
                v.code,
                v.project,
                v.location.file.display(),
                v.location.line,
            );
            let _ = writeln!(report, "  {}: {}", v.severity, v.message);
            if !v.hint.is_empty() {
                let _ = writeln!(report, "  = help: {}", v.hint);
            }
            if !v.adr_path.is_empty() {
                let _ = writeln!(report, "  = see: {}", v.adr_path);
            }
            let _ = writeln!(report);
        }

        for (rule, outcome) in &faults {
            let _ = writeln!(
                report,
                "{rule} could not evaluate {} at {}:{}: {}",
                outcome.full_name,
                outcome.file.display(),
                outcome.line,
                outcome.fault.as_deref().unwrap_or("unknown fault"),
            );
        }
        if !faults.is_empty() {
            let _ = writeln!(report);
        }

        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            report,
            "Total: {errors} error(s), {warnings} warning(s), {infos} info(s), {} fault(s) in {} type(s)",
            faults.len(),
            self.types_checked
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity) -> Violation {
        Violation::new(
            "AR001",
            "interfaces-in-interfaces-folder",
            severity,
            Location::at_line(PathBuf::from("Widgets/IFoo.rs"), 3),
            "Interface IFoo is not in an Interfaces folder",
        )
        .in_project("App")
    }

    fn report_with(violations: Vec<Violation>) -> AnalysisReport {
        let types = violations
            .into_iter()
            .map(|v| {
                TypeAnalysisResult::passed("IFoo", "App.IFoo".into(), v.location.file.clone(), 3)
                    .failed(v)
            })
            .collect();
        AnalysisReport {
            results: vec![RuleAnalysisResult {
                category: "structure".into(),
                rule: "interfaces-in-interfaces-folder".into(),
                code: "AR001".into(),
                description: String::new(),
                severity: Severity::Error,
                adr_path: String::new(),
                project: "App".into(),
                types,
            }],
            types_checked: 5,
        }
    }

    #[test]
    fn violation_format_includes_adr_and_hint() {
        let v = make_violation(Severity::Error)
            .with_adr("docs/adrs/structure/AR001-interfaces.md")
            .with_hint("Move it");
        let formatted = v.format();
        assert!(formatted.contains("= see: docs/adrs/structure/AR001-interfaces.md"));
        assert!(formatted.contains("= help: Move it"));
    }

    #[test]
    fn violation_format_omits_empty_adr() {
        let formatted = make_violation(Severity::Error).format();
        assert!(!formatted.contains("see:"));
        assert!(!formatted.contains("help:"));
    }

    #[test]
    fn violation_display_is_single_line() {
        let v = make_violation(Severity::Warning).with_adr("ADR.md");
        insta::assert_snapshot!(
            v.to_string(),
            @"Widgets/IFoo.rs:3: warning [AR001] Interface IFoo is not in an Interfaces folder (see: ADR.md)"
        );
    }

    #[test]
    fn spanning_line_computes_offset() {
        let loc = Location::at_line(PathBuf::from("a.rs"), 2).spanning_line("ab\ncdef\n");
        assert_eq!((loc.offset, loc.length), (3, 4));
    }

    #[test]
    fn spanning_line_counts_crlf_endings() {
        let source = "ab\r\ncdef\r\ngh";
        let loc = Location::at_line(PathBuf::from("a.rs"), 3).spanning_line(source);
        assert_eq!((loc.offset, loc.length), (12, 2));
        assert_eq!(&source[loc.offset..loc.offset + loc.length], "gh");
    }

    #[test]
    fn has_violations_at_threshold() {
        let report = report_with(vec![make_violation(Severity::Warning)]);
        assert!(!report.has_violations_at(Severity::Error));
        assert!(report.has_violations_at(Severity::Warning));
        assert!(!report.has_errors());
    }

    #[test]
    fn format_test_report_filters_by_severity() {
        let report = report_with(vec![
            make_violation(Severity::Warning),
            make_violation(Severity::Error).with_hint("Move IFoo to Widgets/Interfaces/"),
        ]);

        let text = report.format_test_report(Severity::Error);
        assert!(text.contains("1 violation(s)"));
        assert!(text.contains("1 error(s), 1 warning(s)"));
        assert!(text.contains("= help: Move IFoo to Widgets/Interfaces/"));
    }

    #[test]
    fn format_test_report_lists_faults() {
        let mut report = report_with(vec![]);
        report.results[0].types.push(
            TypeAnalysisResult::passed("OrderMapper", "App.OrderMapper".into(), "m.rs".into(), 9)
                .faulted("method `Write` not found"),
        );
        assert!(report.has_faults());
        let text = report.format_test_report(Severity::Error);
        assert!(text.contains("could not evaluate App.OrderMapper"));
        assert!(text.contains("1 fault(s)"));
    }
}
