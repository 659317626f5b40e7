//! Flows the render instructions into terminal lines, remembering which verse
//! every cell belongs to so mouse clicks can be resolved.

use parallels_core::render::chapter_title;
use parallels_core::{Marker, RenderOp, VerseRef};
use ratatui::text::Span;

const MIN_WIDTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Heading,
    VerseNumber,
    Text,
}

/// The verse a segment was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseSlot {
    /// Index of the verse instruction.
    pub op: usize,
    pub reference: VerseRef,
    pub parallel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub kind: SegmentKind,
    pub verse: Option<VerseSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocLine {
    pub segments: Vec<Segment>,
    /// Set on chapter heading lines.
    pub chapter: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct DocLayout {
    pub lines: Vec<DocLine>,
    pub width: u16,
}

fn width_of(text: &str) -> usize {
    Span::raw(text).width()
}

/// Verse numbers are drawn as superscript digits.
pub fn superscript(n: u32) -> String {
    n.to_string()
        .chars()
        .map(|c| match c {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            _ => '⁹',
        })
        .collect()
}

struct Flow {
    width: usize,
    lines: Vec<DocLine>,
    current: DocLine,
    used: usize,
}

impl Flow {
    fn break_line(&mut self) {
        if !self.current.segments.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
        self.used = 0;
    }

    fn blank(&mut self) {
        self.break_line();
        self.lines.push(DocLine::default());
    }

    fn push_word(&mut self, word: &str, kind: SegmentKind, slot: VerseSlot) {
        let mut word_width = width_of(word);

        let fits = self.used + 1 + word_width <= self.width;
        // Words longer than a whole line start where they are and get split.
        let split_here = word_width > self.width && self.used + 2 <= self.width;
        if self.used > 0 && !fits && !split_here {
            self.break_line();
        }
        if self.used > 0 {
            // The gap belongs to the preceding word's verse.
            if let Some(last) = self.current.segments.last_mut() {
                last.text.push(' ');
            }
            self.used += 1;
        }

        let mut rest = word;
        while word_width > self.width - self.used {
            // Hard split words longer than the line.
            let mut taken = 0;
            let mut split = 0;
            for (i, c) in rest.char_indices() {
                let w = width_of(c.encode_utf8(&mut [0; 4]));
                if taken + w > self.width - self.used {
                    break;
                }
                taken += w;
                split = i + c.len_utf8();
            }
            if split == 0 {
                self.break_line();
                continue;
            }
            self.push_segment(&rest[..split], kind, slot, taken);
            self.break_line();
            rest = &rest[split..];
            word_width = width_of(rest);
        }
        if !rest.is_empty() {
            self.push_segment(rest, kind, slot, word_width);
        }
    }

    fn push_segment(&mut self, text: &str, kind: SegmentKind, slot: VerseSlot, width: usize) {
        self.current.segments.push(Segment {
            text: text.to_string(),
            kind,
            verse: Some(slot),
        });
        self.used += width;
    }
}

impl DocLayout {
    pub fn build(ops: &[RenderOp], width: u16) -> Self {
        let mut flow = Flow {
            width: (width as usize).max(MIN_WIDTH),
            lines: Vec::new(),
            current: DocLine::default(),
            used: 0,
        };

        for (idx, op) in ops.iter().enumerate() {
            match op {
                RenderOp::ChapterHeading { chapter } => {
                    flow.break_line();
                    if !flow.lines.is_empty() {
                        flow.lines.push(DocLine::default());
                    }
                    flow.lines.push(DocLine {
                        segments: vec![Segment {
                            text: chapter_title(*chapter),
                            kind: SegmentKind::Heading,
                            verse: None,
                        }],
                        chapter: Some(*chapter),
                    });
                    flow.blank();
                }
                RenderOp::Verse {
                    reference,
                    text,
                    marker,
                } => {
                    let slot = VerseSlot {
                        op: idx,
                        reference: *reference,
                        parallel: matches!(marker, Marker::Parallel(_)),
                    };
                    flow.push_word(&superscript(reference.verse), SegmentKind::VerseNumber, slot);
                    for word in text.split_whitespace() {
                        flow.push_word(word, SegmentKind::Text, slot);
                    }
                }
            }
        }
        flow.break_line();

        Self {
            lines: flow.lines,
            width,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Verse under a cell, if any.
    pub fn hit(&self, line: usize, column: u16) -> Option<VerseSlot> {
        let line = self.lines.get(line)?;
        let column = column as usize;
        let mut start = 0;
        for segment in &line.segments {
            let end = start + width_of(&segment.text);
            if column >= start && column < end {
                return segment.verse;
            }
            start = end;
        }
        None
    }

    /// First line showing the given instruction.
    pub fn line_of(&self, op: usize) -> Option<usize> {
        self.lines.iter().position(|line| {
            line.segments
                .iter()
                .any(|s| s.verse.is_some_and(|v| v.op == op))
        })
    }

    /// First verse instruction visible at or after `line`.
    pub fn op_at_or_after(&self, line: usize) -> Option<usize> {
        self.lines
            .iter()
            .skip(line)
            .flat_map(|l| l.segments.iter())
            .find_map(|s| s.verse.map(|v| v.op))
    }

    pub fn heading_lines(&self) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.chapter.is_some())
            .map(|(i, _)| i)
            .collect()
    }
}
