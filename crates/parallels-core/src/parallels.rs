use crate::passage::{parse_number, VerseRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A passage from the secondary corpus shown beside a verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelEntry {
    /// Display label, e.g. "Wars 2.9.1".
    #[serde(rename = "ref")]
    pub reference: String,
    pub text: String,
}

/// Wire shape of the mapping file: chapter key -> verse key -> entries.
pub type RawMapping = BTreeMap<String, BTreeMap<String, Vec<ParallelEntry>>>;

/// Lookup from verse to its parallel passages. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelMapping {
    entries: HashMap<VerseRef, Vec<ParallelEntry>>,
}

impl ParallelMapping {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let raw: RawMapping = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw))
    }

    /// Convert string keys to typed verse references. Keys that are not
    /// positive integers can never match a parsed verse and are dropped.
    pub fn from_raw(raw: RawMapping) -> Self {
        let mut entries: HashMap<VerseRef, Vec<ParallelEntry>> = HashMap::new();

        for (chapter_key, verses) in raw {
            let Some(chapter) = parse_number(&chapter_key) else {
                tracing::warn!(key = %chapter_key, "ignoring mapping chapter with a non-numeric key");
                continue;
            };
            for (verse_key, list) in verses {
                let reference = parse_number(&verse_key).and_then(|v| VerseRef::new(chapter, v));
                let Some(reference) = reference else {
                    tracing::warn!(chapter = %chapter_key, key = %verse_key, "ignoring mapping verse with an invalid key");
                    continue;
                };
                // "3" and "03" name the same verse; keep both lists in key order.
                entries.entry(reference).or_default().extend(list);
            }
        }

        Self { entries }
    }

    /// Entries for a verse, in mapping order. Empty when there are none.
    pub fn lookup(&self, reference: VerseRef) -> &[ParallelEntry] {
        self.entries
            .get(&reference)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_parallel(&self, reference: VerseRef) -> bool {
        !self.lookup(reference).is_empty()
    }

    /// Number of verses with at least one entry.
    pub fn verse_count(&self) -> usize {
        self.entries.values().filter(|e| !e.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.verse_count() == 0
    }

    /// Back to the wire shape, chapters and verses in numeric order.
    pub fn to_raw(&self) -> BTreeMap<u32, BTreeMap<u32, Vec<ParallelEntry>>> {
        let mut raw: BTreeMap<u32, BTreeMap<u32, Vec<ParallelEntry>>> = BTreeMap::new();
        for (reference, list) in &self.entries {
            raw.entry(reference.chapter)
                .or_default()
                .insert(reference.verse, list.clone());
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "3": {"1": [{"ref": "Antiquities 18.2.1", "text": "Tiberius"}]},
        "13": {
            "1": [
                {"ref": "Wars 2.9.2", "text": "Pilate"},
                {"ref": "Wars 2.9.4", "text": "Corban"}
            ],
            "4": []
        }
    }"#;

    fn r(chapter: u32, verse: u32) -> VerseRef {
        VerseRef::new(chapter, verse).unwrap()
    }

    #[test]
    fn test_lookup_preserves_order() {
        let mapping = ParallelMapping::from_json(SAMPLE).unwrap();
        let refs: Vec<&str> = mapping
            .lookup(r(13, 1))
            .iter()
            .map(|e| e.reference.as_str())
            .collect();
        assert_eq!(refs, vec!["Wars 2.9.2", "Wars 2.9.4"]);
    }

    #[test]
    fn test_has_parallel_requires_non_empty_entry() {
        let mapping = ParallelMapping::from_json(SAMPLE).unwrap();
        assert!(mapping.has_parallel(r(3, 1)));
        assert!(!mapping.has_parallel(r(13, 4)));
        assert!(!mapping.has_parallel(r(3, 2)));
        assert!(!mapping.has_parallel(r(4, 1)));
        assert_eq!(mapping.verse_count(), 2);
    }

    #[test]
    fn test_leading_zero_keys_resolve() {
        let mapping = ParallelMapping::from_json(r#"{"03": {"01": [{"ref": "x", "text": "y"}]}}"#).unwrap();
        assert!(mapping.has_parallel(r(3, 1)));
    }

    #[test]
    fn test_invalid_keys_are_ignored() {
        let mapping = ParallelMapping::from_json(
            r#"{"intro": {"1": [{"ref": "x", "text": "y"}]}, "2": {"0": [{"ref": "x", "text": "y"}], "-1": []}}"#,
        )
        .unwrap();
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_rejects_wrong_shape() {
        assert!(ParallelMapping::from_json(r#"{"3": ["not", "an", "object"]}"#).is_err());
        assert!(ParallelMapping::from_json(r#"{"3": {"1": [{"ref": "missing text"}]}}"#).is_err());
    }

    #[test]
    fn test_to_raw_numeric_order() {
        let mapping = ParallelMapping::from_json(SAMPLE).unwrap();
        let chapters: Vec<u32> = mapping.to_raw().keys().copied().collect();
        assert_eq!(chapters, vec![3, 13]);
    }
}
