use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Address of a verse: chapter and verse, both starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerseRef {
    pub chapter: u32,
    pub verse: u32,
}

impl VerseRef {
    /// Returns `None` unless both numbers are positive.
    pub fn new(chapter: u32, verse: u32) -> Option<Self> {
        if chapter == 0 || verse == 0 {
            return None;
        }
        Some(Self { chapter, verse })
    }

    /// Machine-readable key carried by rendered verses, e.g. `"3:1"`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVerseRef(pub String);

impl fmt::Display for InvalidVerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid verse reference {:?}", self.0)
    }
}

impl std::error::Error for InvalidVerseRef {}

impl FromStr for VerseRef {
    type Err = InvalidVerseRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidVerseRef(s.to_string());
        let (chapter, verse) = s.split_once(':').ok_or_else(invalid)?;
        let chapter = parse_number(chapter).ok_or_else(invalid)?;
        let verse = parse_number(verse).ok_or_else(invalid)?;
        VerseRef::new(chapter, verse).ok_or_else(invalid)
    }
}

/// Parse a decimal key such as `"3"` or `"03"`. Signs and whitespace are rejected.
pub(crate) fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub reference: VerseRef,
    pub text: String,
}

/// A run of consecutive verses sharing a chapter number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub number: u32,
    pub verses: Vec<Verse>,
}

/// The parsed source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub chapters: Vec<Chapter>,
    /// Non-blank blocks that were not verse records.
    pub skipped_blocks: usize,
}

impl Document {
    pub fn verses(&self) -> impl Iterator<Item = &Verse> {
        self.chapters.iter().flat_map(|c| c.verses.iter())
    }

    pub fn verse_count(&self) -> usize {
        self.chapters.iter().map(|c| c.verses.len()).sum()
    }
}

fn block_separator() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid block separator pattern"))
}

fn verse_record() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"Luke (\d+):(\d+):\s*([\s\S]+)").expect("valid verse record pattern")
    })
}

/// Parse one block into a verse, or `None` if it is not a verse record.
pub fn parse_block(block: &str) -> Option<Verse> {
    let caps = verse_record().captures(block)?;
    let chapter = parse_number(&caps[1])?;
    let verse = parse_number(&caps[2])?;
    let reference = VerseRef::new(chapter, verse)?;
    Some(Verse {
        reference,
        text: caps[3].trim().to_string(),
    })
}

/// Split the source text into blank-line separated blocks and group the verse
/// records into chapters in source order. Anything else is dropped.
pub fn parse_document(source: &str) -> Document {
    let normalized;
    let source = if source.contains('\r') {
        normalized = source.replace("\r\n", "\n");
        normalized.as_str()
    } else {
        source
    };

    let mut doc = Document::default();

    for block in block_separator().split(source) {
        if block.trim().is_empty() {
            continue;
        }
        let Some(verse) = parse_block(block) else {
            doc.skipped_blocks += 1;
            tracing::debug!(block = %block.trim(), "skipping block that is not a verse record");
            continue;
        };

        match doc.chapters.last_mut() {
            Some(chapter) if chapter.number == verse.reference.chapter => {
                chapter.verses.push(verse);
            }
            _ => doc.chapters.push(Chapter {
                number: verse.reference.chapter,
                verses: vec![verse],
            }),
        }
    }

    tracing::info!(
        chapters = doc.chapters.len(),
        verses = doc.verse_count(),
        skipped = doc.skipped_blocks,
        "parsed source text"
    );

    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_block_exact_values() {
        let verse = parse_block("Luke 3:1: In the fifteenth year of the reign of Tiberius Caesar").unwrap();
        assert_eq!(verse.reference, VerseRef { chapter: 3, verse: 1 });
        assert_eq!(verse.text, "In the fifteenth year of the reign of Tiberius Caesar");
    }

    #[test]
    fn test_parse_block_multiline_text() {
        let verse = parse_block("Luke 1:3: It seemed good to me also,\nhaving had perfect understanding  \n").unwrap();
        assert_eq!(verse.text, "It seemed good to me also,\nhaving had perfect understanding");
    }

    #[test]
    fn test_parse_block_rejects_malformed() {
        assert!(parse_block("THE GOSPEL ACCORDING TO LUKE").is_none());
        assert!(parse_block("Luke 3: missing verse").is_none());
        assert!(parse_block("Luke 0:1: zero chapter").is_none());
        assert!(parse_block("Luke 1:0: zero verse").is_none());
        assert!(parse_block("Luke 99999999999:1: overflow").is_none());
    }

    #[test]
    fn test_parse_document_groups_chapter_runs() {
        let text = "Luke 1:1: a\n\nLuke 1:2: b\n\n\nLuke 2:1: c\n  \nLuke 1:5: d\n";
        let doc = parse_document(text);

        let numbers: Vec<u32> = doc.chapters.iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![1, 2, 1]);
        assert_eq!(doc.chapters[0].verses.len(), 2);
        assert_eq!(doc.verse_count(), 4);
    }

    #[test]
    fn test_parse_document_counts_skipped_blocks() {
        let text = "Preface text\n\nLuke 1:1: a\n\nnot a verse\n\n\n\nLuke 1:2: b";
        let doc = parse_document(text);
        assert_eq!(doc.verse_count(), 2);
        assert_eq!(doc.skipped_blocks, 2);
    }

    #[test]
    fn test_parse_document_crlf() {
        let doc = parse_document("Luke 1:1: a\r\n\r\nLuke 1:2: b\r\n");
        assert_eq!(doc.verse_count(), 2);
        assert_eq!(doc.chapters[0].verses[1].text, "b");
    }

    #[test]
    fn test_parse_document_keeps_empty_verse_text() {
        let doc = parse_document("Luke 1:1: \n\nLuke 1:2: b");
        assert_eq!(doc.verse_count(), 2);
        assert_eq!(doc.skipped_blocks, 0);

        let first = &doc.chapters[0].verses[0];
        assert_eq!(first.reference, VerseRef { chapter: 1, verse: 1 });
        assert_eq!(first.text, "");
    }

    #[test]
    fn test_verse_ref_key_roundtrip() {
        let r: VerseRef = "03:07".parse().unwrap();
        assert_eq!(r.key(), "3:7");
        assert!("3".parse::<VerseRef>().is_err());
        assert!("3:x".parse::<VerseRef>().is_err());
        assert!("0:1".parse::<VerseRef>().is_err());
        assert!("+3:1".parse::<VerseRef>().is_err());
    }
}
