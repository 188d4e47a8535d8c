//! Structural predicates deciding which types a rule applies to.

use archrule_core::{TypeKind, TypeSymbol};

/// Selects the types a convention applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeFilter {
    /// Types of the given kind.
    Kind(TypeKind),
    /// Types with the given base type, matched by full name or last segment.
    InheritsFrom(String),
}

impl TypeFilter {
    /// Whether the filter selects `symbol`.
    #[must_use]
    pub fn matches(&self, symbol: &TypeSymbol) -> bool {
        match self {
            Self::Kind(kind) => symbol.kind == *kind,
            Self::InheritsFrom(base) => symbol.inherits_from(base),
        }
    }

    /// Short label used in messages ("Interface", "Validator").
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Kind(kind) => {
                let name = kind.to_string();
                let mut chars = name.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            }
            Self::InheritsFrom(base) => base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_kind_or_base() {
        let iface = TypeSymbol::new("IFoo", TypeKind::Interface, "App", "IFoo.rs", 1);
        let validator = TypeSymbol::new("OrderValidator", TypeKind::Class, "App", "V.rs", 1)
            .with_base("App.Validation.Validator<Order>");

        assert!(TypeFilter::Kind(TypeKind::Interface).matches(&iface));
        assert!(!TypeFilter::Kind(TypeKind::Interface).matches(&validator));
        assert!(TypeFilter::InheritsFrom("Validator".into()).matches(&validator));
        assert!(!TypeFilter::InheritsFrom("Validator".into()).matches(&iface));
    }

    #[test]
    fn labels() {
        assert_eq!(TypeFilter::Kind(TypeKind::Interface).label(), "Interface");
        assert_eq!(TypeFilter::Kind(TypeKind::Enum).label(), "Enum");
        assert_eq!(TypeFilter::InheritsFrom("Validator".into()).label(), "Validator");
    }
}
