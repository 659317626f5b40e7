//! Side panel state and the click interactions that drive it.

use crate::parallels::{ParallelEntry, ParallelMapping};
use crate::passage::VerseRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Hidden,
    Visible,
}

/// What a click landed on, as determined by the presentation layer's hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Inside a verse carrying the parallel marker.
    ParallelVerse(VerseRef),
    /// Main content outside any parallel verse.
    Content,
    /// The panel's close control.
    CloseButton,
    /// The panel body; clicks there change nothing.
    Panel,
}

/// Result of dispatching one click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened(VerseRef),
    /// Visible panel switched to another verse.
    Replaced(VerseRef),
    Closed,
    Unchanged,
}

/// Owns the mapping and the panel for one session.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    mapping: ParallelMapping,
    state: PanelState,
    active: Option<VerseRef>,
    entries: Vec<ParallelEntry>,
}

impl Controller {
    pub fn new(mapping: ParallelMapping) -> Self {
        Self {
            mapping,
            ..Self::default()
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state == PanelState::Visible
    }

    /// Entries currently shown, in mapping order.
    pub fn entries(&self) -> &[ParallelEntry] {
        &self.entries
    }

    /// Verse whose entries the panel holds.
    pub fn active(&self) -> Option<VerseRef> {
        self.active
    }

    /// Dispatch a click. Each click produces at most one transition.
    pub fn click(&mut self, target: ClickTarget) -> Transition {
        match target {
            ClickTarget::ParallelVerse(reference) => self.open(reference),
            ClickTarget::CloseButton => self.close(),
            ClickTarget::Content => self.dismiss(),
            ClickTarget::Panel => Transition::Unchanged,
        }
    }

    /// Show the parallels of `reference`, replacing whatever was shown. A
    /// verse without entries leaves the panel untouched.
    pub fn open(&mut self, reference: VerseRef) -> Transition {
        let found = self.mapping.lookup(reference);
        if found.is_empty() {
            tracing::debug!(%reference, "no parallels at click time");
            return Transition::Unchanged;
        }

        self.entries.clear();
        self.entries.extend_from_slice(found);
        self.active = Some(reference);

        let was_visible = self.is_visible();
        self.state = PanelState::Visible;
        tracing::debug!(%reference, entries = self.entries.len(), "showing parallels");

        if was_visible {
            Transition::Replaced(reference)
        } else {
            Transition::Opened(reference)
        }
    }

    /// Hide the panel regardless of its current state.
    pub fn close(&mut self) -> Transition {
        let was_visible = self.is_visible();
        self.state = PanelState::Hidden;
        if was_visible {
            Transition::Closed
        } else {
            Transition::Unchanged
        }
    }

    /// Tap outside a parallel verse: hides a visible panel, otherwise nothing.
    pub fn dismiss(&mut self) -> Transition {
        if self.is_visible() {
            self.close()
        } else {
            Transition::Unchanged
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(chapter: u32, verse: u32) -> VerseRef {
        VerseRef::new(chapter, verse).unwrap()
    }

    fn controller() -> Controller {
        let mapping = ParallelMapping::from_json(
            r#"{
                "3": {"1": [{"ref": "Antiquities 18.2.1", "text": "Tiberius"}]},
                "13": {"1": [
                    {"ref": "Wars 2.9.2", "text": "Pilate"},
                    {"ref": "Wars 2.9.4", "text": "Corban"}
                ]}
            }"#,
        )
        .unwrap();
        Controller::new(mapping)
    }

    fn labels(c: &Controller) -> Vec<&str> {
        c.entries().iter().map(|e| e.reference.as_str()).collect()
    }

    #[test]
    fn test_initially_hidden() {
        let c = controller();
        assert_eq!(c.state(), PanelState::Hidden);
        assert!(c.entries().is_empty());
    }

    #[test]
    fn test_click_parallel_opens_with_entries() {
        let mut c = controller();
        assert_eq!(c.click(ClickTarget::ParallelVerse(r(3, 1))), Transition::Opened(r(3, 1)));
        assert!(c.is_visible());
        assert_eq!(labels(&c), vec!["Antiquities 18.2.1"]);
    }

    #[test]
    fn test_second_click_replaces_content() {
        let mut c = controller();
        c.click(ClickTarget::ParallelVerse(r(13, 1)));
        assert_eq!(c.click(ClickTarget::ParallelVerse(r(3, 1))), Transition::Replaced(r(3, 1)));
        assert_eq!(labels(&c), vec!["Antiquities 18.2.1"]);
        assert_eq!(c.active(), Some(r(3, 1)));
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut c = controller();
        assert_eq!(c.click(ClickTarget::CloseButton), Transition::Unchanged);
        assert_eq!(c.state(), PanelState::Hidden);

        c.click(ClickTarget::ParallelVerse(r(3, 1)));
        assert_eq!(c.click(ClickTarget::CloseButton), Transition::Closed);
        assert_eq!(c.click(ClickTarget::CloseButton), Transition::Unchanged);
        assert_eq!(c.state(), PanelState::Hidden);
    }

    #[test]
    fn test_outside_click_dismisses_only_when_visible() {
        let mut c = controller();
        assert_eq!(c.click(ClickTarget::Content), Transition::Unchanged);
        assert_eq!(c.state(), PanelState::Hidden);

        c.click(ClickTarget::ParallelVerse(r(13, 1)));
        assert_eq!(c.click(ClickTarget::Content), Transition::Closed);
        assert_eq!(c.state(), PanelState::Hidden);
    }

    #[test]
    fn test_missing_lookup_is_noop() {
        let mut c = controller();
        c.click(ClickTarget::ParallelVerse(r(13, 1)));
        assert_eq!(c.click(ClickTarget::ParallelVerse(r(9, 9))), Transition::Unchanged);
        assert!(c.is_visible());
        assert_eq!(labels(&c), vec!["Wars 2.9.2", "Wars 2.9.4"]);

        let mut hidden = controller();
        hidden.click(ClickTarget::ParallelVerse(r(9, 9)));
        assert_eq!(hidden.state(), PanelState::Hidden);
    }

    #[test]
    fn test_panel_click_changes_nothing() {
        let mut c = controller();
        c.click(ClickTarget::ParallelVerse(r(3, 1)));
        assert_eq!(c.click(ClickTarget::Panel), Transition::Unchanged);
        assert!(c.is_visible());
    }
}
