//! Pure line-array operations behind text-edit application.
//!
//! Content is split into lines that remember their own terminator, edits
//! are folded over the line array from the bottom of the document upward,
//! and the result is joined back. Nothing here touches the filesystem.

use crate::schema::{Position, Range, TextEdit};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("line {line} is out of range (document has {line_count} lines)")]
    LineOutOfRange { line: u32, line_count: usize },

    #[error("range {0} starts after it ends")]
    InvalidRange(Range),
}

/// Line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// The terminator most lines of `text` use. Ties and text without any
    /// line break count as LF.
    pub fn detect(text: &str) -> Self {
        let crlf = text.matches("\r\n").count();
        let lf = text.matches('\n').count() - crlf;
        if crlf > lf {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// One line of a document and the terminator that followed it.
///
/// Only the last line of a document has no terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub ending: Option<LineEnding>,
}

impl Line {
    pub fn new(text: impl Into<String>, ending: Option<LineEnding>) -> Self {
        Self {
            text: text.into(),
            ending,
        }
    }

    fn ending_str(&self) -> &'static str {
        self.ending.map_or("", LineEnding::as_str)
    }
}

/// Split on `\n`, keeping each line's terminator.
///
/// A trailing line break yields a final empty line, so `join_lines` restores
/// the input exactly, mixed endings included. A lone `\r` is line content.
pub fn split_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find('\n') {
        let line = &rest[..idx];
        lines.push(match line.strip_suffix('\r') {
            Some(body) => Line::new(body, Some(LineEnding::CrLf)),
            None => Line::new(line, Some(LineEnding::Lf)),
        });
        rest = &rest[idx + 1..];
    }
    lines.push(Line::new(rest, None));
    lines
}

pub fn join_lines(lines: &[Line]) -> String {
    let mut text = String::with_capacity(lines.iter().map(|l| l.text.len() + 2).sum());
    for line in lines {
        text.push_str(&line.text);
        text.push_str(line.ending_str());
    }
    text
}

/// Map a UTF-16 column to a byte offset within `line`.
///
/// Columns past the end clamp to the line length. A column that lands
/// inside a surrogate pair snaps back to the start of that character.
pub fn utf16_to_byte(line: &str, character: u32) -> usize {
    let target = character as usize;
    let mut units = 0;
    for (idx, ch) in line.char_indices() {
        if units >= target {
            return idx;
        }
        units += ch.len_utf16();
        if units > target {
            return idx;
        }
    }
    line.len()
}

/// Edits in the order they must be applied: bottommost, rightmost first.
///
/// Among edits starting at the same position the one reaching further is
/// applied first, so a replacement never eats text inserted at its start.
/// Remaining ties go to the edit given later, so that several insertions at
/// one point end up in input order.
pub fn sort_for_application(edits: &[TextEdit]) -> Vec<&TextEdit> {
    let mut order: Vec<usize> = (0..edits.len()).collect();
    order.sort_by(|&a, &b| {
        edits[b]
            .range
            .start
            .cmp(&edits[a].range.start)
            .then(edits[b].range.end.cmp(&edits[a].range.end))
            .then(b.cmp(&a))
    });
    order.into_iter().map(|idx| &edits[idx]).collect()
}

/// Find the first pair of overlapping edits, as indices into `edits`.
///
/// Two edits overlap when they share a non-empty span, or when an insertion
/// falls strictly inside another edit. Touching edits and repeated
/// insertions at one point are fine.
pub fn find_overlap(edits: &[TextEdit]) -> Option<(usize, usize)> {
    let mut order: Vec<usize> = (0..edits.len()).collect();
    order.sort_by_key(|&idx| (edits[idx].range.start, edits[idx].range.end));

    let mut furthest: Option<(Position, usize)> = None;
    for idx in order {
        let range = edits[idx].range;
        if let Some((end, owner)) = furthest {
            if range.start < end {
                return Some((owner, idx));
            }
        }
        if furthest.map_or(true, |(end, _)| range.end > end) {
            furthest = Some((range.end, idx));
        }
    }
    None
}

fn check_range(range: Range, line_count: usize) -> Result<(), LineError> {
    if range.start > range.end {
        return Err(LineError::InvalidRange(range));
    }
    if range.end.line as usize >= line_count {
        return Err(LineError::LineOutOfRange {
            line: range.end.line,
            line_count,
        });
    }
    Ok(())
}

/// Apply one edit to a line array and return the new array.
///
/// A same-line edit without line breaks rewrites the line text in place;
/// anything else rebuilds `prefix + new_text + suffix`, re-splits it, and
/// splices it over `start.line..=end.line`, which may change the line count.
/// The last spliced line keeps the end line's terminator. Breaks coming
/// from `new_text` take the start line's terminator, or `fallback` when the
/// start line is the last one.
pub fn apply_edit(
    mut lines: Vec<Line>,
    edit: &TextEdit,
    fallback: LineEnding,
) -> Result<Vec<Line>, LineError> {
    let Range { start, end } = edit.range;
    check_range(edit.range, lines.len())?;

    let start_line = start.line as usize;
    let end_line = end.line as usize;
    let prefix_end = utf16_to_byte(&lines[start_line].text, start.character);
    let suffix_start = utf16_to_byte(&lines[end_line].text, end.character);

    if start_line == end_line && !edit.new_text.contains('\n') {
        // Both columns clamp against the same line, so this stays ordered.
        let suffix_start = suffix_start.max(prefix_end);
        lines[start_line]
            .text
            .replace_range(prefix_end..suffix_start, &edit.new_text);
        return Ok(lines);
    }

    let inserted = lines[start_line].ending.unwrap_or(fallback);
    let trailing = lines[end_line].ending;

    let prefix = &lines[start_line].text[..prefix_end];
    let suffix = &lines[end_line].text[suffix_start..];
    let mut combined = String::with_capacity(prefix.len() + edit.new_text.len() + suffix.len());
    combined.push_str(prefix);
    combined.push_str(&edit.new_text);
    combined.push_str(suffix);

    let mut replacement = split_lines(&combined);
    let last = replacement.len() - 1;
    for (idx, line) in replacement.iter_mut().enumerate() {
        line.ending = if idx == last { trailing } else { Some(inserted) };
    }
    lines.splice(start_line..=end_line, replacement);
    Ok(lines)
}

/// Apply a batch of edits to `text`, bottom to top.
///
/// Edit coordinates all refer to the original text. Overlaps are not
/// checked here; see [`find_overlap`].
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, LineError> {
    let fallback = LineEnding::detect(text);
    let lines = sort_for_application(edits)
        .into_iter()
        .try_fold(split_lines(text), |lines, edit| {
            apply_edit(lines, edit, fallback)
        })?;
    Ok(join_lines(&lines))
}

/// The text currently covered by `range`, line terminators included.
pub fn text_in_range(lines: &[Line], range: Range) -> Result<String, LineError> {
    check_range(range, lines.len())?;

    let start_line = range.start.line as usize;
    let end_line = range.end.line as usize;
    let from = utf16_to_byte(&lines[start_line].text, range.start.character);
    let to = utf16_to_byte(&lines[end_line].text, range.end.character);

    if start_line == end_line {
        return Ok(lines[start_line].text[from..to.max(from)].to_owned());
    }

    let mut text = lines[start_line].text[from..].to_owned();
    text.push_str(lines[start_line].ending_str());
    for line in &lines[start_line + 1..end_line] {
        text.push_str(&line.text);
        text.push_str(line.ending_str());
    }
    text.push_str(&lines[end_line].text[..to]);
    Ok(text)
}

/// Where the end of `text` lands when it is inserted at `start`.
pub fn end_after_insert(start: Position, text: &str) -> Position {
    let mut pieces = text.split('\n');
    let first = pieces.next().unwrap_or_default();
    match pieces.last() {
        None => Position::new(start.line, start.character + utf16_len(first)),
        Some(last) => {
            let breaks = text.matches('\n').count() as u32;
            Position::new(start.line + breaks, utf16_len(last))
        }
    }
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}
