//! Presentation-agnostic render instructions.
//!
//! The document is turned into a flat list of [`RenderOp`]s exactly once per
//! load. Presentation layers (terminal, HTML) consume the list append-only.

use crate::parallels::ParallelMapping;
use crate::passage::{Document, VerseRef};

/// Visual marker of a verse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Plain,
    /// The verse has parallels; carries the key to look them up with.
    Parallel(VerseRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    ChapterHeading { chapter: u32 },
    Verse {
        reference: VerseRef,
        text: String,
        marker: Marker,
    },
}

impl RenderOp {
    pub fn parallel_ref(&self) -> Option<VerseRef> {
        match self {
            RenderOp::Verse {
                marker: Marker::Parallel(r),
                ..
            } => Some(*r),
            _ => None,
        }
    }
}

pub fn chapter_title(chapter: u32) -> String {
    format!("Chapter {}", chapter)
}

/// Emit one heading per chapter run followed by its verses, with the parallel
/// status of each verse decided here and never again.
pub fn render_document(doc: &Document, mapping: &ParallelMapping) -> Vec<RenderOp> {
    let mut ops = Vec::with_capacity(doc.chapters.len() + doc.verse_count());

    for chapter in &doc.chapters {
        ops.push(RenderOp::ChapterHeading {
            chapter: chapter.number,
        });
        for verse in &chapter.verses {
            let marker = if mapping.has_parallel(verse.reference) {
                Marker::Parallel(verse.reference)
            } else {
                Marker::Plain
            };
            ops.push(RenderOp::Verse {
                reference: verse.reference,
                text: verse.text.clone(),
                marker,
            });
        }
    }

    ops
}
