//! Removal filters.
//!
//! Packages delete inherited objects with directives such as
//! `buildingsToRemove: ["*Granary*"]`. Matching a directive string against an
//! object goes through [`FilterMatcher`], so a host with a full filter grammar
//! can replace [`StandardFilter`].

use crate::objects::RulesetObject;

/// An object a removal filter can be evaluated against.
pub trait FilterTarget: RulesetObject {
    /// Category words the object answers to besides its own name, e.g.
    /// `"Wonder"` for a wonder or its unit type for a unit.
    fn keywords(&self) -> Vec<&str> {
        Vec::new()
    }

    fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords().contains(&keyword)
    }
}

/// Predicate over an object given a filter string.
pub trait FilterMatcher: Send + Sync {
    fn matches(&self, filter: &str, target: &dyn FilterTarget) -> bool;
}

/// The built-in filter grammar.
///
/// | filter           | matches                                       |
/// |------------------|-----------------------------------------------|
/// | `All`            | everything                                    |
/// | `Granary`        | the object named `Granary`                    |
/// | `*Granary*`      | names matching the pattern, `*` is any run    |
/// | `Wonder`         | objects whose keywords contain `Wonder`       |
/// | `Hidden`         | objects carrying the `<Hidden>` unique        |
/// | `{A} {B}`        | objects matching both `A` and `B`             |
/// | `non-[A]`        | objects not matching `A`                      |
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFilter;

impl FilterMatcher for StandardFilter {
    fn matches(&self, filter: &str, target: &dyn FilterTarget) -> bool {
        let filter = filter.trim();
        if let Some(inner) = filter
            .strip_prefix("non-[")
            .and_then(|rest| rest.strip_suffix(']'))
        {
            return !self.matches(inner, target);
        }
        if let Some(parts) = split_all_of(filter) {
            return parts.iter().all(|part| self.matches(part, target));
        }
        matches_single(filter, target)
    }
}

fn matches_single(filter: &str, target: &dyn FilterTarget) -> bool {
    if filter.is_empty() {
        return false;
    }
    if filter == "All" || filter == target.name() {
        return true;
    }
    if filter.contains('*') && glob_match(filter, target.name()) {
        return true;
    }
    target.has_keyword(filter) || target.tags().contains(&filter)
}

/// `{A} {B}` -> `["A", "B"]`
fn split_all_of(filter: &str) -> Option<Vec<&str>> {
    let inner = filter.strip_prefix('{')?.strip_suffix('}')?;
    let parts: Vec<&str> = inner.split("} {").map(str::trim).collect();
    if parts.iter().any(|p| p.contains('{') || p.contains('}')) {
        return None;
    }
    Some(parts)
}

/// Matches `text` against a pattern where `*` stands for any run of characters.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pieces: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match pieces.split_first() {
        Some(split) => split,
        None => return text.is_empty(),
    };
    let Some(mut remaining) = text.strip_prefix(first) else {
        return false;
    };
    let Some((last, middle)) = rest.split_last() else {
        return remaining.is_empty();
    };
    for piece in middle {
        match remaining.find(piece) {
            Some(at) => remaining = &remaining[at + piece.len()..],
            None => return false,
        }
    }
    remaining.len() >= last.len() && remaining.ends_with(last)
}
