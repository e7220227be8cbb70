//! Transcript header detection and keyword extraction.
//!
//! A transcript may open with metadata lines (`关键词：…`, `场景：…`, a date)
//! before the dialogue starts. The header ends at the first line that is none
//! of those; everything after it is dialogue body. A keyword marker that sits
//! below some other preamble (a title line, say) still counts as long as it
//! comes before the first speaker tag or visit boundary; it and the lines
//! above it move into the header.

use std::sync::LazyLock;

use regex::Regex;

use crate::segment::is_boundary;

/// Line prefixes that mark a metadata line.
const META_PREFIXES: &[&str] = &["关键词", "关键字", "文字记录", "文本记录", "对话记录", "场景"];

/// Prefixes whose value may sit on the following line when left empty.
const KEYWORD_PREFIXES: &[&str] = &["关键词", "关键字"];

const KEYWORD_SEPARATORS: &[char] = &['、', '，', ',', '；', ';'];

static DATE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:日期[:：]?\s*)?\d{4}\s*[-/.年]\s*\d{1,2}\s*[-/.月]\s*\d{1,2}\s*日?(?:\s+\d{1,2}[:：]\d{2}(?:[:：]\d{2})?)?$")
        .expect("valid date line pattern")
});

static KEYWORD_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"关键[词字]\s*[:：]\s*(.*)$").expect("valid keyword marker"));

static LEADING_SPEAKER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:【[^】]+】|\[[^\]]+\])").expect("valid speaker tag"));

/// A transcript split into header lines and dialogue body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSections<'a> {
    pub header: Vec<&'a str>,
    pub body: Vec<&'a str>,
}

impl TranscriptSections<'_> {
    pub fn body_text(&self) -> String {
        self.body.join("\n")
    }
}

/// Splits `text` at the end of its metadata header.
///
/// A metadata line whose value starts with a speaker tag (`文字记录：【医生】…`)
/// ends the header, and the value becomes the first body line.
pub fn split_sections(text: &str) -> TranscriptSections<'_> {
    let lines: Vec<&str> = text.lines().collect();
    let mut header = Vec::new();
    let mut body_start = lines.len();
    let mut carried: Option<&str> = None;
    let mut expect_keyword_value = false;

    for (idx, line) in lines.iter().copied().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if expect_keyword_value && !LEADING_SPEAKER_TAG.is_match(trimmed) {
            expect_keyword_value = false;
            header.push(line);
            continue;
        }
        expect_keyword_value = false;

        if let Some((prefix, value)) = strip_meta_prefix(trimmed) {
            if LEADING_SPEAKER_TAG.is_match(value) {
                carried = Some(value);
                body_start = idx + 1;
                break;
            }
            expect_keyword_value = value.is_empty() && KEYWORD_PREFIXES.contains(&prefix);
            header.push(line);
            continue;
        }
        if DATE_LINE.is_match(trimmed) {
            header.push(line);
            continue;
        }
        body_start = idx;
        break;
    }

    if carried.is_none()
        && !header.iter().any(|line| KEYWORD_MARKER.is_match(line))
        && let Some(end) = late_keyword_block(&lines, body_start)
    {
        header.extend(
            lines[body_start..end]
                .iter()
                .copied()
                .filter(|line| !line.trim().is_empty()),
        );
        body_start = end;
    }

    let mut body: Vec<&str> = carried.into_iter().collect();
    body.extend_from_slice(&lines[body_start.min(lines.len())..]);
    TranscriptSections { header, body }
}

/// End (exclusive) of the preamble that closes with a keyword marker line, or
/// its value line when the marker is empty. Stops looking at the first speaker
/// tag or visit boundary.
fn late_keyword_block(lines: &[&str], start: usize) -> Option<usize> {
    let mut marker_at = None;
    for (idx, line) in lines.iter().enumerate().skip(start) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if LEADING_SPEAKER_TAG.is_match(trimmed) || is_boundary(trimmed) {
            break;
        }
        if let Some(caps) = KEYWORD_MARKER.captures(trimmed) {
            if !caps.get(1).map_or("", |m| m.as_str()).trim().is_empty() {
                return Some(idx + 1);
            }
            marker_at = Some(idx);
            break;
        }
    }

    let marker_at = marker_at?;
    let value_line = lines
        .iter()
        .enumerate()
        .skip(marker_at + 1)
        .find(|(_, line)| !line.trim().is_empty())
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !LEADING_SPEAKER_TAG.is_match(trimmed) && !is_boundary(trimmed)
        });
    Some(value_line.map_or(marker_at + 1, |(idx, _)| idx + 1))
}

fn strip_meta_prefix(line: &str) -> Option<(&'static str, &str)> {
    META_PREFIXES.iter().find_map(|prefix| {
        let rest = line.strip_prefix(prefix)?;
        let rest = rest.trim_start();
        let value = rest
            .strip_prefix(':')
            .or_else(|| rest.strip_prefix('：'))
            .unwrap_or(rest);
        Some((*prefix, value.trim()))
    })
}

/// Extracts keywords from header lines.
///
/// Looks for a `关键词：` marker; when nothing follows it, the next non-empty
/// header line is used. Keywords are trimmed and deduplicated in order.
pub fn extract_keywords(header: &[&str]) -> Vec<String> {
    let mut lines = header.iter().map(|line| line.trim()).filter(|line| !line.is_empty());
    let mut value = None;
    while let Some(line) = lines.next() {
        if let Some(caps) = KEYWORD_MARKER.captures(line) {
            let inline = caps.get(1).map_or("", |m| m.as_str()).trim();
            value = if inline.is_empty() {
                lines.next()
            } else {
                Some(inline)
            };
            break;
        }
    }

    let mut keywords: Vec<String> = Vec::new();
    for raw in value.unwrap_or("").split(KEYWORD_SEPARATORS) {
        let keyword = raw.trim().trim_end_matches(['。', '.']).trim();
        if !keyword.is_empty() && !keywords.iter().any(|existing| existing == keyword) {
            keywords.push(keyword.to_string());
        }
    }
    keywords
}
