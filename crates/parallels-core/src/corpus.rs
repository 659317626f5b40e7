//! Builds the parallels mapping file from the Josephus text and the table of
//! Luke/Josephus correspondences.

use crate::error::BuildError;
use crate::parallels::ParallelEntry;
use crate::passage::{parse_number, VerseRef};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;

pub const MISSING_TEXT: &str = "Text for this reference was not found.";

const ROMAN_BOOKS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// Which of Josephus' works a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Work {
    Wars,
    Antiquities,
}

impl Work {
    pub fn as_str(&self) -> &'static str {
        match self {
            Work::Wars => "Wars",
            Work::Antiquities => "Antiquities",
        }
    }

    /// Numeric source ids belong to the Wars; anything else to the Antiquities.
    pub fn from_source_id(id: &str) -> Self {
        if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
            Work::Wars
        } else {
            Work::Antiquities
        }
    }
}

/// One deduplicated reference from the correspondence table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JosephusRef {
    pub work: Work,
    /// Dotted location, e.g. "2.9.2".
    pub location: String,
}

impl JosephusRef {
    pub fn label(&self) -> String {
        format!("{} {}", self.work.as_str(), self.location)
    }

    /// Key into the Wars text, e.g. "II.9.2". Only Wars references in books
    /// 1 through 7 have one.
    pub fn text_key(&self) -> Option<String> {
        if self.work != Work::Wars {
            return None;
        }
        let parts: Vec<&str> = self.location.split('.').collect();
        let [book, chapter, paragraph] = parts.as_slice() else {
            return None;
        };
        let book = parse_number(book)?;
        let roman = ROMAN_BOOKS.get(usize::try_from(book).ok()?.checked_sub(1)?)?;
        Some(format!("{}.{}.{}", roman, chapter, paragraph))
    }
}

fn section_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\n([IVXPA-Z0-9]+\.[0-9]+\.[0-9]+)\n").expect("valid section marker pattern")
    })
}

/// Split the Josephus text on section marker lines ("I.1.2", "P.1.1") and map
/// each marker to its following text with newlines folded into spaces.
pub fn parse_josephus(content: &str) -> HashMap<String, String> {
    let mut sections = HashMap::new();
    let mut pending: Option<(String, usize)> = None;

    for caps in section_marker().captures_iter(content) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        if let Some((marker, start)) = pending.take() {
            sections.insert(marker, fold(&content[start..whole.start]));
        }
        pending = Some((caps[1].trim().to_string(), whole.end));
    }
    if let Some((marker, start)) = pending {
        sections.insert(marker, fold(&content[start..]));
    }

    sections
}

fn fold(text: &str) -> String {
    text.trim().replace('\n', " ")
}

/// Correspondences grouped by Luke verse, in first-seen order per verse.
#[derive(Debug, Clone, Default)]
pub struct Correspondences {
    pub verses: BTreeMap<VerseRef, Vec<JosephusRef>>,
    pub skipped_lines: usize,
}

/// Parse the whitespace separated table. The first line is a header. Columns
/// used: source id, Josephus location, and (fifth) the Luke `chapter:verse`.
pub fn parse_correspondences(csv: &str, origin: &str) -> Result<Correspondences, BuildError> {
    let mut lines = csv.lines();
    if lines.next().is_none() {
        return Err(BuildError::EmptyCsv(origin.to_string()));
    }

    let mut table = Correspondences::default();
    for line in lines {
        let cleaned = line.trim().replace('"', "");
        if cleaned.is_empty() {
            continue;
        }
        let fields: Vec<&str> = cleaned.split_whitespace().collect();
        let [source_id, location, _, _, luke, ..] = fields.as_slice() else {
            table.skipped_lines += 1;
            continue;
        };
        let Ok(reference) = luke.parse::<VerseRef>() else {
            tracing::debug!(line = %line, "skipping row with an unreadable Luke reference");
            table.skipped_lines += 1;
            continue;
        };

        let entry = JosephusRef {
            work: Work::from_source_id(source_id),
            location: location.to_string(),
        };
        let refs = table.verses.entry(reference).or_default();
        if !refs.contains(&entry) {
            refs.push(entry);
        }
    }

    Ok(table)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub references: usize,
    pub emitted: usize,
    pub missing_text: usize,
    pub skipped_lines: usize,
}

/// Mapping in file order: chapters, then verses, numerically.
pub type BuiltMapping = BTreeMap<u32, BTreeMap<u32, Vec<ParallelEntry>>>;

/// Join the correspondences with the Wars text. References without a Wars
/// text key are left out; keys missing from the text get a placeholder.
pub fn combine(
    table: &Correspondences,
    sections: &HashMap<String, String>,
) -> (BuiltMapping, BuildStats) {
    let mut mapping = BuiltMapping::new();
    let mut stats = BuildStats {
        skipped_lines: table.skipped_lines,
        ..BuildStats::default()
    };

    for (verse, refs) in &table.verses {
        for josephus in refs {
            stats.references += 1;
            let Some(key) = josephus.text_key() else {
                continue;
            };
            let text = match sections.get(&key) {
                Some(text) => text.clone(),
                None => {
                    stats.missing_text += 1;
                    MISSING_TEXT.to_string()
                }
            };
            mapping
                .entry(verse.chapter)
                .or_default()
                .entry(verse.verse)
                .or_default()
                .push(ParallelEntry {
                    reference: josephus.label(),
                    text,
                });
            stats.emitted += 1;
        }
    }

    (mapping, stats)
}

pub fn build_mapping(josephus: &str, csv: &str, csv_origin: &str) -> Result<(BuiltMapping, BuildStats), BuildError> {
    let sections = parse_josephus(josephus);
    let table = parse_correspondences(csv, csv_origin)?;
    Ok(combine(&table, &sections))
}

async fn read(path: &Path) -> Result<String, BuildError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| BuildError::Io {
            path: path.display().to_string(),
            source,
        })
}

/// Read both inputs and write the mapping as pretty JSON.
pub async fn build_file(josephus: &Path, csv: &Path, out: &Path) -> Result<BuildStats, BuildError> {
    let (josephus_text, csv_text) = tokio::try_join!(read(josephus), read(csv))?;
    let (mapping, stats) = build_mapping(&josephus_text, &csv_text, &csv.display().to_string())?;

    let json = serde_json::to_string_pretty(&mapping)?;
    tokio::fs::write(out, json)
        .await
        .map_err(|source| BuildError::Io {
            path: out.display().to_string(),
            source,
        })?;

    tracing::info!(
        out = %out.display(),
        references = stats.references,
        emitted = stats.emitted,
        missing_text = stats.missing_text,
        skipped_lines = stats.skipped_lines,
        "wrote parallels mapping"
    );
    Ok(stats)
}
