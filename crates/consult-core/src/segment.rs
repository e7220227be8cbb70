//! Splitting a transcript body into visits.
//!
//! A visit boundary is a line that, once trimmed, matches one of
//! [`BOUNDARY_RULES`]. Boundary lines themselves belong to no visit.

use std::str::Lines;

/// A named predicate over a trimmed, non-empty line.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryRule {
    pub name: &'static str,
    pub matches: fn(&str) -> bool,
}

pub const BOUNDARY_RULES: &[BoundaryRule] = &[
    BoundaryRule {
        name: "full_width_parenthetical",
        matches: full_width_parenthetical,
    },
    BoundaryRule {
        name: "parenthetical",
        matches: parenthetical,
    },
    BoundaryRule {
        name: "out",
        matches: out_marker,
    },
    BoundaryRule {
        name: "left_room",
        matches: left_room_marker,
    },
];

fn full_width_parenthetical(line: &str) -> bool {
    line.chars().count() >= 2 && line.starts_with('（') && line.ends_with('）')
}

fn parenthetical(line: &str) -> bool {
    line.len() >= 2 && line.starts_with('(') && line.ends_with(')')
}

fn out_marker(line: &str) -> bool {
    line == "OUT"
}

fn left_room_marker(line: &str) -> bool {
    line == "出去"
}

/// Name of the rule `line` matches, if it is a boundary.
pub fn boundary_rule(line: &str) -> Option<&'static str> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    BOUNDARY_RULES
        .iter()
        .find(|rule| (rule.matches)(trimmed))
        .map(|rule| rule.name)
}

pub fn is_boundary(line: &str) -> bool {
    boundary_rule(line).is_some()
}

/// Lazily yields the trimmed, non-empty visit chunks of `body`.
///
/// The iterator is `Clone`, so a caller can walk the same body twice.
pub fn segment_visits(body: &str) -> VisitSegments<'_> {
    VisitSegments {
        lines: body.lines(),
    }
}

#[derive(Debug, Clone)]
pub struct VisitSegments<'a> {
    lines: Lines<'a>,
}

impl Iterator for VisitSegments<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut current: Vec<&str> = Vec::new();
        loop {
            match self.lines.next() {
                Some(line) if is_boundary(line) => {
                    if let Some(chunk) = close_chunk(&current) {
                        return Some(chunk);
                    }
                    current.clear();
                }
                Some(line) => current.push(line),
                None => return close_chunk(&current),
            }
        }
    }
}

fn close_chunk(lines: &[&str]) -> Option<String> {
    let joined = lines.join("\n");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
