//! Speaker turns from a visit chunk.
//!
//! A line starting with a bracketed tag (`【医生】` or `[患者]`, optionally
//! followed by `：`) opens a new turn. Following untagged lines continue it.
//! The tag is resolved to a [`Role`] through [`ROLE_TABLE`]; anything in the
//! tag beyond the matched term is kept as a speaker note.

use std::sync::LazyLock;

use consult_model::{Role, Turn};
use regex::Regex;

static SPEAKER_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:【([^】]+)】|\[([^\]]+)\])\s*[:：]?\s*(.*)$").expect("valid speaker tag")
});

const NOTE_TRIM: &[char] = &[':', '：', '-', '_', '·', ',', '，', '/', '、'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagPattern {
    /// Tag contains the term, ASCII case ignored.
    Contains(&'static str),
    /// Tag starts with the term, ASCII case ignored.
    Prefix(&'static str),
    /// Tag starts with the letter, ASCII case ignored.
    Initial(char),
}

#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    pub pattern: TagPattern,
    pub role: Role,
}

const fn contains(term: &'static str, role: Role) -> TagRule {
    TagRule {
        pattern: TagPattern::Contains(term),
        role,
    }
}

const fn prefix(term: &'static str, role: Role) -> TagRule {
    TagRule {
        pattern: TagPattern::Prefix(term),
        role,
    }
}

const fn initial(letter: char, role: Role) -> TagRule {
    TagRule {
        pattern: TagPattern::Initial(letter),
        role,
    }
}

/// Ordered tag rules, first match wins.
///
/// Caregiver terms come first so `患者家属` resolves to caregiver, and the
/// single-letter rules come last.
pub const ROLE_TABLE: &[TagRule] = &[
    contains("患者家属", Role::Caregiver),
    contains("病人家属", Role::Caregiver),
    contains("家属", Role::Caregiver),
    contains("家长", Role::Caregiver),
    contains("监护人", Role::Caregiver),
    contains("陪诊", Role::Caregiver),
    contains("陪同", Role::Caregiver),
    contains("父母", Role::Caregiver),
    contains("爸爸", Role::Caregiver),
    contains("妈妈", Role::Caregiver),
    contains("父亲", Role::Caregiver),
    contains("母亲", Role::Caregiver),
    contains("妻子", Role::Caregiver),
    contains("丈夫", Role::Caregiver),
    contains("爷爷", Role::Caregiver),
    contains("奶奶", Role::Caregiver),
    contains("外公", Role::Caregiver),
    contains("外婆", Role::Caregiver),
    contains("caregiver", Role::Caregiver),
    contains("family", Role::Caregiver),
    contains("parent", Role::Caregiver),
    contains("mother", Role::Caregiver),
    contains("father", Role::Caregiver),
    contains("医生", Role::Doctor),
    contains("医师", Role::Doctor),
    contains("大夫", Role::Doctor),
    contains("doctor", Role::Doctor),
    prefix("dr.", Role::Doctor),
    prefix("dr ", Role::Doctor),
    contains("病人", Role::Patient),
    contains("患者", Role::Patient),
    contains("病患", Role::Patient),
    contains("patient", Role::Patient),
    initial('D', Role::Doctor),
    initial('P', Role::Patient),
];

/// Role and note resolved from the text inside a speaker tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerTag {
    pub role: Role,
    pub note: Option<String>,
}

/// Resolves raw tag content (without brackets).
///
/// A parenthetical inside the tag, as in `P（妈妈）`, is the note. Otherwise
/// the note is whatever remains once the matched term is removed. Tags no
/// rule recognises map to [`Role::Other`] with the whole tag as the note.
pub fn resolve_speaker_tag(raw: &str) -> SpeakerTag {
    let raw = raw.trim();
    let folded = raw.to_ascii_lowercase();
    let parenthetical = parenthetical_note(raw);

    for rule in ROLE_TABLE {
        let residual = match rule.pattern {
            TagPattern::Contains(term) => folded
                .find(term)
                .map(|pos| format!("{}{}", &raw[..pos], &raw[pos + term.len()..])),
            TagPattern::Prefix(term) => folded
                .starts_with(term)
                .then(|| raw[term.len()..].to_string()),
            TagPattern::Initial(letter) => raw
                .chars()
                .next()
                .filter(|first| first.eq_ignore_ascii_case(&letter))
                .map(|first| raw[first.len_utf8()..].to_string()),
        };
        if let Some(residual) = residual {
            let note = parenthetical.or_else(|| clean_note(&residual));
            return SpeakerTag {
                role: rule.role,
                note,
            };
        }
    }

    SpeakerTag {
        role: Role::Other,
        note: clean_note(raw),
    }
}

fn parenthetical_note(raw: &str) -> Option<String> {
    let open = raw.find(['（', '('])?;
    let after = &raw[open..];
    let inner_start = open + after.chars().next()?.len_utf8();
    let close = raw[inner_start..].find(['）', ')'])?;
    clean_note(&raw[inner_start..inner_start + close])
}

fn clean_note(value: &str) -> Option<String> {
    let trimmed = value
        .trim_matches(|ch: char| ch.is_whitespace() || NOTE_TRIM.contains(&ch) || "()（）".contains(ch));
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug)]
struct OpenTurn<'a> {
    role: Role,
    note: Option<String>,
    lines: Vec<&'a str>,
}

impl OpenTurn<'_> {
    fn close(self, turns: &mut Vec<Turn>) {
        let text = self.lines.join("\n");
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        turns.push(Turn {
            role: self.role,
            text: text.to_string(),
            speaker_note: self.note,
        });
    }
}

/// Splits a visit chunk into turns, dropping turns with no text.
///
/// Lines before the first tag form a turn with role [`Role::Other`].
pub fn normalize_turns(chunk: &str) -> Vec<Turn> {
    let mut turns = Vec::new();
    let mut open: Option<OpenTurn<'_>> = None;

    for line in chunk.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(caps) = SPEAKER_TAG.captures(trimmed) {
            if let Some(previous) = open.take() {
                previous.close(&mut turns);
            }
            let raw = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            let tag = resolve_speaker_tag(raw);
            let first = caps.get(3).map_or("", |m| m.as_str()).trim();
            open = Some(OpenTurn {
                role: tag.role,
                note: tag.note,
                lines: if first.is_empty() { Vec::new() } else { vec![first] },
            });
            continue;
        }
        match open.as_mut() {
            Some(turn) => turn.lines.push(trimmed),
            None => {
                open = Some(OpenTurn {
                    role: Role::Other,
                    note: None,
                    lines: vec![trimmed],
                });
            }
        }
    }
    if let Some(last) = open {
        last.close(&mut turns);
    }
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(raw: &str) -> (Role, Option<String>) {
        let resolved = resolve_speaker_tag(raw);
        (resolved.role, resolved.note)
    }

    fn note(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn plain_role_terms() {
        assert_eq!(tag("医生"), (Role::Doctor, None));
        assert_eq!(tag("病人"), (Role::Patient, None));
        assert_eq!(tag("患者"), (Role::Patient, None));
        assert_eq!(tag("家属"), (Role::Caregiver, None));
        assert_eq!(tag("Doctor"), (Role::Doctor, None));
    }

    #[test]
    fn caregiver_wins_over_patient() {
        assert_eq!(tag("患者家属"), (Role::Caregiver, None));
        assert_eq!(tag("患者妈妈"), (Role::Caregiver, note("患者")));
    }

    #[test]
    fn single_letter_tags() {
        assert_eq!(tag("D"), (Role::Doctor, None));
        assert_eq!(tag("P"), (Role::Patient, None));
        assert_eq!(tag("D2"), (Role::Doctor, note("2")));
    }

    #[test]
    fn parenthetical_note_takes_precedence() {
        assert_eq!(tag("P（妈妈）"), (Role::Caregiver, note("妈妈")));
        assert_eq!(tag("医生(主任)"), (Role::Doctor, note("主任")));
    }

    #[test]
    fn residual_becomes_note() {
        assert_eq!(tag("王医生"), (Role::Doctor, note("王")));
        assert_eq!(tag("家长-爸爸"), (Role::Caregiver, note("爸爸")));
    }

    #[test]
    fn unknown_tag_is_other() {
        assert_eq!(tag("护士"), (Role::Other, note("护士")));
    }

    #[test]
    fn names_containing_dr_are_not_doctors() {
        assert_eq!(tag("Sandra"), (Role::Other, note("Sandra")));
        assert_eq!(tag("Andrew"), (Role::Other, note("Andrew")));
        assert_eq!(tag("Audrey"), (Role::Other, note("Audrey")));
    }

    #[test]
    fn dr_title_prefix() {
        assert_eq!(tag("Dr. Wang"), (Role::Doctor, note("Wang")));
        assert_eq!(tag("dr Li"), (Role::Doctor, note("Li")));
    }

    #[test]
    fn turns_with_continuations() {
        let chunk = "【医生】最近睡眠怎么样？\n【病人】不好。\n经常半夜醒\n[家属]：他压力大";
        let turns = normalize_turns(chunk);
        assert_eq!(
            turns,
            vec![
                Turn::new(Role::Doctor, "最近睡眠怎么样？"),
                Turn::new(Role::Patient, "不好。\n经常半夜醒"),
                Turn::new(Role::Caregiver, "他压力大"),
            ]
        );
    }

    #[test]
    fn leading_untagged_lines_are_other() {
        let turns = normalize_turns("开场白\n第二行\n【医生】你好");
        assert_eq!(turns[0], Turn::new(Role::Other, "开场白\n第二行"));
        assert_eq!(turns[1].role, Role::Doctor);
    }

    #[test]
    fn tag_alone_on_its_line() {
        let turns = normalize_turns("【医生】\n你好\n【病人】\n【医生】再见");
        assert_eq!(
            turns,
            vec![
                Turn::new(Role::Doctor, "你好"),
                Turn::new(Role::Doctor, "再见"),
            ]
        );
    }

    #[test]
    fn speaker_note_is_carried() {
        let turns = normalize_turns("【P（妈妈）】孩子最近不爱说话");
        assert_eq!(turns[0].role, Role::Caregiver);
        assert_eq!(turns[0].speaker_note.as_deref(), Some("妈妈"));
    }
}
