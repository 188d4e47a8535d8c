//! Comment-based suppression directives.
//!
//! Two forms are recognised, keyed by the rule *code*:
//!
//! ```text
//! // AR003 disable once : hot path, allocation measured
//! registry.register(|x| x + offset);
//!
//! // AR003 disable : generated bindings
//! ...
//! // AR003 restore
//! ```
//!
//! Scanning is plain text over source lines and does not depend on the
//! program model. Every query rescans from the start of the file because
//! block state is sequential.

/// Kind of a suppression directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionKind {
    /// Suppresses the line immediately following the directive.
    DisableOnce,
    /// Opens a suppressed region.
    Disable,
    /// Closes a suppressed region.
    Restore,
}

/// A parsed suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionDirective {
    /// Directive kind.
    pub kind: SuppressionKind,
    /// Rule code the directive applies to.
    pub code: String,
    /// Text after `:`, if any.
    pub reason: Option<String>,
    /// Line of the directive (1-indexed). Zero when parsed from a bare string.
    pub line: usize,
}

/// Parses a directive for `code` from one line of text.
///
/// The code must appear as a whole token and the keyword as a whole word,
/// so `AR0011 disable` and `AR001 disabled` are not directives for `AR001`.
#[must_use]
pub fn parse_directive(text: &str, code: &str) -> Option<SuppressionDirective> {
    if code.is_empty() {
        return None;
    }

    let mut search_from = 0;
    while let Some(found) = text[search_from..].find(code) {
        let start = search_from + found;
        let end = start + code.len();
        search_from = end;

        let boundary_before = text[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_token_char(c));
        if !boundary_before {
            continue;
        }

        let rest = &text[end..];
        if rest.chars().next().is_some_and(is_token_char) {
            continue;
        }

        if let Some((kind, tail)) = parse_keyword(rest.trim_start()) {
            return Some(SuppressionDirective {
                kind,
                code: code.to_string(),
                reason: parse_reason(tail),
                line: 0,
            });
        }
    }

    None
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn strip_word<'a>(text: &'a str, word: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(word)?;
    if rest.chars().next().is_some_and(is_token_char) {
        None
    } else {
        Some(rest)
    }
}

fn parse_keyword(text: &str) -> Option<(SuppressionKind, &str)> {
    if let Some(rest) = strip_word(text, "disable") {
        return Some(match strip_word(rest.trim_start(), "once") {
            Some(tail) => (SuppressionKind::DisableOnce, tail),
            None => (SuppressionKind::Disable, rest),
        });
    }
    strip_word(text, "restore").map(|rest| (SuppressionKind::Restore, rest))
}

fn parse_reason(tail: &str) -> Option<String> {
    let reason = tail.trim_start().strip_prefix(':')?;
    let reason = reason.trim().trim_end_matches("*/").trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

/// Lists every directive for `code` in `source`, with line numbers.
#[must_use]
pub fn directives(source: &str, code: &str) -> Vec<SuppressionDirective> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, text)| {
            parse_directive(text, code).map(|mut d| {
                d.line = i + 1;
                d
            })
        })
        .collect()
}

/// Whether the line immediately before `line` carries `<code> disable once`.
#[must_use]
pub fn is_disabled_once(source: &str, code: &str, line: usize) -> bool {
    if line < 2 {
        return false;
    }
    source
        .lines()
        .nth(line - 2)
        .and_then(|text| parse_directive(text, code))
        .is_some_and(|d| d.kind == SuppressionKind::DisableOnce)
}

/// Whether `line` falls inside a `disable` … `restore` region for `code`.
///
/// Scans from the first line through `line` inclusive, toggling on each
/// block directive, and returns the final state.
#[must_use]
pub fn is_in_disabled_block(source: &str, code: &str, line: usize) -> bool {
    let mut disabled = false;
    for text in source.lines().take(line) {
        match parse_directive(text, code).map(|d| d.kind) {
            Some(SuppressionKind::Disable) => disabled = true,
            Some(SuppressionKind::Restore) => disabled = false,
            Some(SuppressionKind::DisableOnce) | None => {}
        }
    }
    disabled
}

/// Whether `line` is suppressed for `code` by either directive form.
#[must_use]
pub fn is_suppressed(source: &str, code: &str, line: usize) -> bool {
    if line == 0 || line > source.lines().count() {
        return false;
    }
    is_disabled_once(source, code, line) || is_in_disabled_block(source, code, line)
}
