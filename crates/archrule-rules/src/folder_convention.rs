//! Rule requiring selected types to live in a designated folder or namespace.
//!
//! # Rationale
//!
//! Grouping contracts (interfaces, validators) under a well-known folder
//! keeps them discoverable and keeps implementation folders free of them.
//!
//! # Detection
//!
//! A selected type passes when its root-relative folder **or** its namespace
//! contains the designated segment (case-insensitive). Either signal is
//! enough because some layouts do not mirror folders to namespaces.
//!
//! # Configuration
//!
//! - `segment`: Required folder/namespace segment

use crate::filter::TypeFilter;
use archrule_core::{
    EvaluatorFault, Rule, RuleConfig, Severity, TypeContext, TypeKind, TypeRule, Violation,
};
use std::path::{Component, Path};

/// Rule code for interfaces-in-interfaces-folder.
pub const INTERFACES_CODE: &str = "AR001";

/// Rule name for interfaces-in-interfaces-folder.
pub const INTERFACES_NAME: &str = "interfaces-in-interfaces-folder";

/// Rule code for validators-in-validation-folder.
pub const VALIDATORS_CODE: &str = "AR002";

/// Rule name for validators-in-validation-folder.
pub const VALIDATORS_NAME: &str = "validators-in-validation-folder";

/// Requires selected types to sit under a folder or namespace segment.
#[derive(Debug, Clone)]
pub struct FolderConvention {
    name: &'static str,
    code: &'static str,
    category: &'static str,
    description: &'static str,
    filter: TypeFilter,
    segment: String,
    severity: Severity,
}

impl FolderConvention {
    /// Creates a convention for types selected by `filter`.
    #[must_use]
    pub fn new(
        name: &'static str,
        code: &'static str,
        filter: TypeFilter,
        segment: impl Into<String>,
    ) -> Self {
        Self {
            name,
            code,
            category: "structure",
            description: "",
            filter,
            segment: segment.into(),
            severity: Severity::Error,
        }
    }

    /// Interfaces must live under `Interfaces` (AR001).
    #[must_use]
    pub fn interfaces() -> Self {
        Self::new(
            INTERFACES_NAME,
            INTERFACES_CODE,
            TypeFilter::Kind(TypeKind::Interface),
            "Interfaces",
        )
        .description("Interfaces must be declared in an Interfaces folder or namespace")
    }

    /// Validators must live under `Validation` (AR002).
    #[must_use]
    pub fn validators() -> Self {
        Self::new(
            VALIDATORS_NAME,
            VALIDATORS_CODE,
            TypeFilter::InheritsFrom("Validator".to_string()),
            "Validation",
        )
        .description("Validators must be declared in a Validation folder or namespace")
    }

    /// Sets the category.
    #[must_use]
    pub fn category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Sets the required segment.
    #[must_use]
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = segment.into();
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
    pub fn with_config(self, config: &RuleConfig) -> Self {
        let segment = config.get_str("segment", &self.segment).to_string();
        self.segment(segment)
    }

    fn folder_matches(&self, folder: &Path) -> bool {
        folder.components().any(|c| match c {
            Component::Normal(part) => part
                .to_str()
                .is_some_and(|p| p.eq_ignore_ascii_case(&self.segment)),
            _ => false,
        })
    }
}

impl Rule for FolderConvention {
    fn name(&self) -> &'static str {
        self.name
    }

    fn code(&self) -> &'static str {
        self.code
    }

    fn category(&self) -> &'static str {
        self.category
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn default_severity(&self) -> Severity {
        self.severity
    }
}

impl TypeRule for FolderConvention {
    fn analyze_type(&self, ctx: &TypeContext) -> Result<Option<Violation>, EvaluatorFault> {
        if !self.filter.matches(ctx.symbol) {
            return Ok(None);
        }

        let folder = ctx.folder();
        if self.folder_matches(folder) || ctx.namespace().contains_segment(&self.segment) {
            return Ok(None);
        }

        let name = &ctx.symbol.name;
        let file_name = ctx
            .relative_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let suggested = folder.join(&self.segment).join(file_name);
        let namespace = ctx.namespace().child(&self.segment);

        Ok(Some(ctx.violation(
            self,
            ctx.line,
            format!(
                "{} `{name}` in `{}` is outside any `{}` folder or namespace",
                self.filter.label(),
                ctx.relative_path.display(),
                self.segment,
            ),
            format!(
                "Move `{name}` to an `{}/` subfolder (e.g. `{}`) with namespace `{namespace}`",
                self.segment,
                suggested.display(),
            ),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{type_outcomes, type_violations};
    use archrule_core::{Compilation, ProgramModel, TypeStatus, TypeSymbol};

    fn model_with(symbol: TypeSymbol) -> ProgramModel {
        ProgramModel::new("/repo").with_project(Compilation::new("App").with_type(symbol))
    }

    #[test]
    fn interface_in_folder_and_namespace_passes() {
        let model = model_with(TypeSymbol::new(
            "IFoo",
            TypeKind::Interface,
            "App.Widgets.Interfaces",
            "/repo/Widgets/Interfaces/IFoo.rs",
            5,
        ));
        let outcomes = type_outcomes(&FolderConvention::interfaces(), &model);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, TypeStatus::Passed);
    }

    #[test]
    fn interface_outside_folder_is_reported() {
        let model = model_with(TypeSymbol::new(
            "IFoo",
            TypeKind::Interface,
            "App.Widgets",
            "/repo/Widgets/IFoo.rs",
            5,
        ));
        let violations = type_violations(&FolderConvention::interfaces(), &model);
        assert_eq!(violations.len(), 1);

        let v = &violations[0];
        assert_eq!(v.code, "AR001");
        assert_eq!(v.location.line, 5);
        assert_eq!(v.project, "App");
        assert_eq!(
            v.adr_path,
            "docs/adrs/structure/AR001-interfaces-in-interfaces-folder.md"
        );
        insta::assert_snapshot!(v.message, @"Interface `IFoo` in `Widgets/IFoo.rs` is outside any `Interfaces` folder or namespace");
        insta::assert_snapshot!(v.hint, @"Move `IFoo` to an `Interfaces/` subfolder (e.g. `Widgets/Interfaces/IFoo.rs`) with namespace `App.Widgets.Interfaces`");
    }

    #[test]
    fn either_signal_is_enough() {
        let by_namespace = model_with(TypeSymbol::new(
            "IFoo",
            TypeKind::Interface,
            "App.Interfaces",
            "/repo/Widgets/IFoo.rs",
            1,
        ));
        assert!(type_violations(&FolderConvention::interfaces(), &by_namespace).is_empty());

        let by_folder = model_with(TypeSymbol::new(
            "IFoo",
            TypeKind::Interface,
            "App.Widgets",
            "/repo/interfaces/widgets/IFoo.rs",
            1,
        ));
        assert!(type_violations(&FolderConvention::interfaces(), &by_folder).is_empty());
    }

    #[test]
    fn partial_segment_does_not_count() {
        let model = model_with(TypeSymbol::new(
            "IFoo",
            TypeKind::Interface,
            "App.MyInterfaces",
            "/repo/MyInterfaces/IFoo.rs",
            1,
        ));
        assert_eq!(type_violations(&FolderConvention::interfaces(), &model).len(), 1);
    }

    #[test]
    fn non_interfaces_are_ignored() {
        let model = model_with(TypeSymbol::new(
            "Foo",
            TypeKind::Class,
            "App.Widgets",
            "/repo/Widgets/Foo.rs",
            1,
        ));
        let outcomes = type_outcomes(&FolderConvention::interfaces(), &model);
        assert_eq!(outcomes[0].status, TypeStatus::Passed);
        assert!(outcomes[0].violation.is_none());
    }

    #[test]
    fn validators_follow_base_type() {
        let misplaced = TypeSymbol::new(
            "OrderValidator",
            TypeKind::Class,
            "App.Orders",
            "/repo/Orders/OrderValidator.rs",
            3,
        )
        .with_base("App.Validation.Validator");
        let violations = type_violations(&FolderConvention::validators(), &model_with(misplaced));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code, "AR002");
        assert!(violations[0].message.starts_with("Validator `OrderValidator`"));
    }

    #[test]
    fn segment_is_configurable() {
        let config = archrule_core::Config::parse(
            "[rules.interfaces-in-interfaces-folder]\nsegment = \"ports\"\n",
        )
        .expect("config");
        let rule = FolderConvention::interfaces()
            .with_config(&config.rule(INTERFACES_NAME));
        let model = model_with(TypeSymbol::new(
            "Clock",
            TypeKind::Interface,
            "shop::ports",
            "/repo/src/ports.rs",
            1,
        ));
        assert!(type_violations(&rule, &model).is_empty());
    }

    #[test]
    fn suppressed_line_passes() {
        let source = "use crate::Widget;\n// AR001 disable once : legacy\npub trait IFoo {}\n";
        let model = ProgramModel::new("/repo").with_project(
            Compilation::new("App")
                .with_type(TypeSymbol::new(
                    "IFoo",
                    TypeKind::Interface,
                    "App.Widgets",
                    "/repo/Widgets/IFoo.rs",
                    3,
                ))
                .with_source("/repo/Widgets/IFoo.rs", source),
        );
        assert!(type_violations(&FolderConvention::interfaces(), &model).is_empty());

        let unsuppressed = source.replace("// AR001 disable once : legacy", "// legacy");
        let model = ProgramModel::new("/repo").with_project(
            Compilation::new("App")
                .with_type(TypeSymbol::new(
                    "IFoo",
                    TypeKind::Interface,
                    "App.Widgets",
                    "/repo/Widgets/IFoo.rs",
                    3,
                ))
                .with_source("/repo/Widgets/IFoo.rs", unsuppressed),
        );
        assert_eq!(type_violations(&FolderConvention::interfaces(), &model).len(), 1);
    }
}
