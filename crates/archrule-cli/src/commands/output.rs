//! Shared output formatting for analysis reports.

use anyhow::Result;
use archrule_core::suppression::{directives, SuppressionKind};
use archrule_core::{AnalysisReport, ProgramModel, Severity, Violation, ViolationDiagnostic};
use miette::NamedSource;
use std::fmt::Write;

use crate::OutputFormat;

/// Renders a report in the specified format.
pub fn render(
    report: &AnalysisReport,
    model: &ProgramModel,
    format: OutputFormat,
) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => render_text(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)? + "\n",
        OutputFormat::Compact => render_compact(report),
        OutputFormat::Pretty => render_pretty(report, model),
    })
}

fn render_text(report: &AnalysisReport) -> String {
    let (errors, warnings, infos) = report.count_by_severity();
    let mut out = String::new();

    for violation in report.violations() {
        let severity_indicator = match violation.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        let _ = writeln!(
            out,
            "{} {} in {} at {}:{}",
            violation.code,
            violation.rule,
            violation.project,
            violation.location.file.display(),
            violation.location.line,
        );
        let _ = writeln!(out, "  {}: {}", severity_indicator, violation.message);
        if !violation.hint.is_empty() {
            let _ = writeln!(out, "  = help: {}", violation.hint);
        }
        if !violation.adr_path.is_empty() {
            let _ = writeln!(out, "  = see: {}", violation.adr_path);
        }
        let _ = writeln!(out);
    }

    let faults: Vec<_> = report.faults().collect();
    for (rule, outcome) in &faults {
        let _ = writeln!(
            out,
            "\x1b[35mfault\x1b[0m {rule} on {}: {}",
            outcome.full_name,
            outcome.fault.as_deref().unwrap_or_default()
        );
    }
    if !faults.is_empty() {
        let _ = writeln!(out);
    }

    let summary_color = if errors > 0 || !faults.is_empty() {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    let _ = writeln!(
        out,
        "{summary_color}Found {errors} error(s), {warnings} warning(s), {infos} info(s), {} fault(s) in {} type(s)\x1b[0m",
        faults.len(),
        report.types_checked
    );
    out
}

fn render_compact(report: &AnalysisReport) -> String {
    let mut out = String::new();
    for violation in report.violations() {
        let _ = writeln!(
            out,
            "{}:{}:{}: {} [{}] {}",
            violation.location.file.display(),
            violation.location.line,
            violation.location.column,
            violation.severity,
            violation.code,
            violation.message,
        );
    }
    for (rule, outcome) in report.faults() {
        let _ = writeln!(
            out,
            "{}:{}: fault [{rule}] {}",
            outcome.file.display(),
            outcome.line,
            outcome.fault.as_deref().unwrap_or_default(),
        );
    }
    out
}

fn render_pretty(report: &AnalysisReport, model: &ProgramModel) -> String {
    let mut out = String::new();
    for violation in report.violations() {
        let diagnostic = miette::Report::new(ViolationDiagnostic::from(violation));
        let diagnostic = match source_of(model, violation) {
            Some(source) => diagnostic.with_source_code(NamedSource::new(
                violation.location.file.display().to_string(),
                source.to_string(),
            )),
            None => diagnostic,
        };
        let _ = writeln!(out, "{diagnostic:?}");
    }
    out + &render_text_summary(report)
}

fn render_text_summary(report: &AnalysisReport) -> String {
    let (errors, warnings, infos) = report.count_by_severity();
    format!(
        "Found {errors} error(s), {warnings} warning(s), {infos} info(s), {} fault(s) in {} type(s)\n",
        report.faults().count(),
        report.types_checked
    )
}

fn source_of<'m>(model: &'m ProgramModel, violation: &Violation) -> Option<&'m str> {
    let path = model.root.join(&violation.location.file);
    model
        .projects
        .get(&violation.project)
        .and_then(|c| c.sources.get(&path))
        .map(String::as_str)
}

/// Lists every suppression directive for `codes` across the model's sources.
pub fn render_suppressions(model: &ProgramModel, codes: &[&str]) -> String {
    let mut out = String::new();
    let mut count = 0;

    for compilation in model.projects.values() {
        for (path, source) in &compilation.sources {
            let relative = path.strip_prefix(&model.root).unwrap_or(path);
            for code in codes {
                for directive in directives(source, code) {
                    count += 1;
                    let kind = match directive.kind {
                        SuppressionKind::DisableOnce => "disable once",
                        SuppressionKind::Disable => "disable",
                        SuppressionKind::Restore => "restore",
                    };
                    let _ = write!(
                        out,
                        "{}:{}: {code} {kind}",
                        relative.display(),
                        directive.line
                    );
                    match directive.reason {
                        Some(reason) => {
                            let _ = writeln!(out, " ({reason})");
                        }
                        None => {
                            let _ = writeln!(out);
                        }
                    }
                }
            }
        }
    }

    let _ = writeln!(out, "{count} suppression(s)");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use archrule_core::{Compilation, Location, RuleAnalysisResult, TypeAnalysisResult};

    fn model() -> ProgramModel {
        ProgramModel::new("/repo").with_project(
            Compilation::new("shop-core").with_source(
                "/repo/src/lib.rs",
                "// AR003 disable once: startup only\nrun(|| {});\n// AR001 disable\npub trait A {}\n// AR001 restore\n",
            ),
        )
    }

    fn report() -> AnalysisReport {
        let violation = Violation::new(
            "AR001",
            "interfaces-in-interfaces-folder",
            Severity::Error,
            Location::at_line("src/lib.rs".into(), 4),
            "Interface `A` in `src` is outside any `Interfaces` folder or namespace",
        )
        .in_project("shop-core");
        let outcome =
            TypeAnalysisResult::passed("A", "shop_core::A".to_string(), "src/lib.rs".into(), 4)
                .failed(violation);
        let faulted =
            TypeAnalysisResult::passed("B", "shop_core::B".to_string(), "src/lib.rs".into(), 9)
                .faulted("method `write` not found on `B`");
        AnalysisReport {
            results: vec![RuleAnalysisResult {
                category: "structure".to_string(),
                rule: "interfaces-in-interfaces-folder".to_string(),
                code: "AR001".to_string(),
                description: String::new(),
                severity: Severity::Error,
                adr_path: String::new(),
                project: "shop-core".to_string(),
                types: vec![outcome, faulted],
            }],
            types_checked: 2,
        }
    }

    #[test]
    fn compact_lists_violations_then_faults() {
        let out = render(&report(), &model(), OutputFormat::Compact).expect("render");
        insta::assert_snapshot!(out, @r"
        src/lib.rs:4:1: error [AR001] Interface `A` in `src` is outside any `Interfaces` folder or namespace
        src/lib.rs:9: fault [interfaces-in-interfaces-folder] method `write` not found on `B`
        ");
    }

    #[test]
    fn json_is_the_serialized_report() {
        let out = render(&report(), &model(), OutputFormat::Json).expect("render");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value["types_checked"], 2);
        assert_eq!(value["results"][0]["types"][1]["status"], "faulted");
    }

    #[test]
    fn pretty_ends_with_summary() {
        let out = render(&report(), &model(), OutputFormat::Pretty).expect("render");
        assert!(out.contains("[AR001] Interface `A`"));
        assert!(out.ends_with("Found 1 error(s), 0 warning(s), 0 info(s), 1 fault(s) in 2 type(s)\n"));
    }

    #[test]
    fn suppressions_are_listed_per_code() {
        let out = render_suppressions(&model(), &["AR001", "AR003"]);
        insta::assert_snapshot!(out, @r"
        src/lib.rs:3: AR001 disable
        src/lib.rs:5: AR001 restore
        src/lib.rs:1: AR003 disable once (startup only)
        3 suppression(s)
        ");
    }
}
