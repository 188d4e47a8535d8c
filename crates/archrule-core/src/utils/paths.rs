//! Path utilities for qualified names.

use glob::{MatchOptions, Pattern};
use syn::Path;

/// Identifiers of a syn path, without generic arguments.
///
/// `Vec::<u8>::new` yields `["Vec", "new"]`.
#[must_use]
pub fn path_segments(path: &Path) -> Vec<String> {
    path.segments
        .iter()
        .map(|seg| seg.ident.to_string())
        .collect()
}

/// Splits a qualified name on `::` or `.`.
#[must_use]
pub fn split_qualified(name: &str) -> Vec<&str> {
    if name.contains("::") {
        name.split("::").filter(|s| !s.is_empty()).collect()
    } else {
        name.split('.').filter(|s| !s.is_empty()).collect()
    }
}

/// Checks if a qualified name matches a pattern, segment by segment.
///
/// Both sides may use `::` or `.` separators. Literal segments compare
/// case-insensitively. Supports wildcards:
/// - `*` matches any single segment
/// - `**` matches any number of segments
/// - `*` or `?` inside a segment globs within it (`*_persistence`)
///
/// # Examples
///
/// ```ignore
/// assert!(path_matches("App.Persistence.Orders", "**::Persistence::**"));
/// assert!(path_matches("std::fs::read", "std::**"));
/// assert!(!path_matches("std::fs::read", "tokio::*"));
/// assert!(path_matches("shop_api::routes", "*_api::**"));
/// ```
#[must_use]
pub fn path_matches(path: &str, pattern: &str) -> bool {
    let path_parts = split_qualified(path);
    let pattern_parts = split_qualified(pattern);

    match_parts(&path_parts, &pattern_parts)
}

fn match_parts(path: &[&str], pattern: &[&str]) -> bool {
    if pattern.is_empty() {
        return path.is_empty();
    }

    let (first_pattern, rest_pattern) = (pattern[0], &pattern[1..]);

    match first_pattern {
        "**" => {
            // Try matching zero or more segments
            for i in 0..=path.len() {
                if match_parts(&path[i..], rest_pattern) {
                    return true;
                }
            }
            false
        }
        "*" => {
            if path.is_empty() {
                false
            } else {
                match_parts(&path[1..], rest_pattern)
            }
        }
        literal => {
            if path.is_empty() || !segment_matches(path[0], literal) {
                false
            } else {
                match_parts(&path[1..], rest_pattern)
            }
        }
    }
}

fn segment_matches(segment: &str, pattern: &str) -> bool {
    if !pattern.contains(['*', '?']) {
        return segment.eq_ignore_ascii_case(pattern);
    }
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    Pattern::new(pattern).is_ok_and(|p| p.matches_with(segment, options))
}
