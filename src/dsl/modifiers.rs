//! Attribute modifier interpreter.
//!
//! An attribute line looks like `price float.range(0,).nn`. Everything after
//! the type token is a chain of dotted markers, some of which take a bracketed
//! argument:
//!
//! | Marker              | Effect                                   |
//! |---------------------|------------------------------------------|
//! | `.nn`               | not null                                 |
//! | `.unique`           | unique                                   |
//! | `.fk`               | foreign key to the entity named by type  |
//! | `.max(N)` `.len(N)` | string length cap                        |
//! | `.range(a,b)`       | inclusive numeric bounds, either optional|
//! | `.default(v)`       | literal default, emitted verbatim        |
//!
//! The scanner never fails. A marker whose argument cannot be parsed is
//! treated as absent and reported as a [`ModifierIssue`].

use serde::Serialize;

use super::catalog::AttributeSpec;

/// Constraints derived from an attribute's modifier text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstraintSet {
    pub not_null: bool,
    pub unique: bool,
    pub foreign_key: bool,
    pub max_length: Option<u32>,
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    pub default_value: Option<String>,
}

impl ConstraintSet {
    /// Whether either range bound is set.
    pub fn has_range(&self) -> bool {
        self.range_min.is_some() || self.range_max.is_some()
    }
}

/// A modifier that was dropped because its text could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierIssue {
    /// The marker as written, e.g. `.max(` or `.range(a,b)`
    pub marker: String,
    /// Why it was dropped
    pub reason: String,
}

impl ModifierIssue {
    fn new(marker: impl Into<String>, reason: impl Into<String>) -> Self {
        ModifierIssue {
            marker: marker.into(),
            reason: reason.into(),
        }
    }
}

/// Parse the constraints of a full attribute line (`name type.mods...`).
///
/// Dropped markers are logged as warnings; use [`scan_modifiers`] to collect
/// them instead.
pub fn parse_modifiers(raw_attribute_line: &str) -> ConstraintSet {
    let attribute = AttributeSpec::split(raw_attribute_line);
    let (constraints, issues) = scan_modifiers(&attribute.modifiers);
    for issue in &issues {
        tracing::warn!(
            attribute = %attribute.var_name,
            marker = %issue.marker,
            "{}",
            issue.reason
        );
    }
    constraints
}

/// Scan modifier text (the part after the type token) into constraints.
pub fn scan_modifiers(text: &str) -> (ConstraintSet, Vec<ModifierIssue>) {
    let mut constraints = ConstraintSet::default();
    let mut issues = Vec::new();
    let mut rest = text;

    while let Some(dot) = rest.find('.') {
        let stray = rest[..dot].trim();
        if !stray.is_empty() {
            issues.push(ModifierIssue::new(
                stray,
                format!("unexpected text `{stray}` between modifiers"),
            ));
        }

        let after = &rest[dot + 1..];
        let name_len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        let name = &after[..name_len];
        let tail = &after[name_len..];

        if tail.starts_with('(') {
            match bracketed_argument(tail) {
                Some((argument, consumed)) => {
                    apply_marker(&mut constraints, &mut issues, name, Some(argument));
                    rest = &tail[consumed..];
                }
                None => {
                    issues.push(ModifierIssue::new(
                        format!(".{name}("),
                        format!("unmatched parenthesis in `.{name}(`; modifier ignored"),
                    ));
                    // Keep scanning inside the broken argument so that
                    // `.max(.nn` still yields `not_null`.
                    rest = &tail[1..];
                }
            }
        } else {
            apply_marker(&mut constraints, &mut issues, name, None);
            rest = tail;
        }
    }

    let trailing = rest.trim();
    if !trailing.is_empty() {
        issues.push(ModifierIssue::new(
            trailing,
            format!("unexpected text `{trailing}` after modifiers"),
        ));
    }

    (constraints, issues)
}

/// Return the argument between the leading `(` of `text` and its matching
/// `)`, plus the number of bytes consumed including both parentheses.
///
/// Parentheses inside single or double quotes do not count.
fn bracketed_argument(text: &str) -> Option<(&str, usize)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some((&text[1..idx], idx + 1));
                }
            }
            _ => {}
        }
    }
    None
}

fn apply_marker(
    constraints: &mut ConstraintSet,
    issues: &mut Vec<ModifierIssue>,
    name: &str,
    argument: Option<&str>,
) {
    let written = match argument {
        Some(arg) => format!(".{name}({arg})"),
        None => format!(".{name}"),
    };

    match (name, argument) {
        ("nn", None) => constraints.not_null = true,
        ("unique", None) => constraints.unique = true,
        ("fk", None) => constraints.foreign_key = true,
        ("nn" | "unique" | "fk", Some(_)) => issues.push(ModifierIssue::new(
            &written,
            format!("`.{name}` takes no argument; modifier ignored"),
        )),
        ("max" | "len", Some(arg)) => match arg.trim().parse::<u32>() {
            Ok(n) => constraints.max_length = Some(n),
            Err(_) => issues.push(ModifierIssue::new(
                &written,
                format!("length `{}` is not a non-negative integer; modifier ignored", arg.trim()),
            )),
        },
        ("range", Some(arg)) => match parse_range(arg) {
            Ok((min, max)) => {
                constraints.range_min = min;
                constraints.range_max = max;
            }
            Err(reason) => issues.push(ModifierIssue::new(&written, reason)),
        },
        ("default", Some(arg)) => {
            let literal = arg.trim();
            if literal.is_empty() {
                issues.push(ModifierIssue::new(
                    &written,
                    "empty default value; modifier ignored",
                ));
            } else {
                constraints.default_value = Some(literal.to_string());
            }
        }
        ("max" | "len" | "range" | "default", None) => issues.push(ModifierIssue::new(
            &written,
            format!("`.{name}` requires an argument; modifier ignored"),
        )),
        ("", _) => issues.push(ModifierIssue::new(&written, "empty modifier name; ignored")),
        (other, _) => issues.push(ModifierIssue::new(
            &written,
            format!("unknown modifier `.{other}`; ignored"),
        )),
    }
}

type RangeBounds = (Option<f64>, Option<f64>);

fn parse_range(argument: &str) -> Result<RangeBounds, String> {
    let parts: Vec<&str> = argument.split(',').map(str::trim).collect();
    let (min, max) = match parts.as_slice() {
        [single] => {
            if single.is_empty() {
                return Err("empty range; modifier ignored".to_string());
            }
            let value = parse_bound(single)?;
            (Some(value), Some(value))
        }
        [lo, hi] => {
            let min = if lo.is_empty() { None } else { Some(parse_bound(lo)?) };
            let max = if hi.is_empty() { None } else { Some(parse_bound(hi)?) };
            (min, max)
        }
        _ => {
            return Err(format!(
                "range `{argument}` has more than two bounds; modifier ignored"
            ))
        }
    };

    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(format!(
                "range minimum {lo} exceeds maximum {hi}; modifier ignored"
            ));
        }
    }
    Ok((min, max))
}

fn parse_bound(text: &str) -> Result<f64, String> {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("range bound `{text}` is not a number; modifier ignored")),
    }
}
