use crate::layout::{DocLayout, VerseSlot};
use parallels_core::{
    parse_document, render_document, ClickTarget, Controller, LoadError, Loaded, RenderOp,
    Transition, LOAD_FAILURE_MESSAGE,
};
use ratatui::layout::Rect;

/// What the document area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Reading,
    /// Loading failed; only the message is shown.
    Failed(String),
}

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,

    // Document
    pub ops: Vec<RenderOp>,
    pub verse_count: usize,
    pub parallel_count: usize,
    pub layout: DocLayout,
    pub controller: Controller,

    // Content state
    pub content_scroll: usize,
    pub content_height: usize,
    /// Parallel verse selected from the keyboard (instruction index).
    pub focused: Option<usize>,

    // Panel state
    pub panel_scroll: u16,
    pub panel_width_percent: u16,

    // Areas for mouse hit-testing (updated during render)
    /// Document pane including its border and scrollbar column.
    pub document_area: Option<Rect>,
    pub content_area: Option<Rect>,
    pub panel_area: Option<Rect>,
    pub close_area: Option<Rect>,
}

pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

impl App {
    fn empty(screen: Screen, controller: Controller, panel_width_percent: u16) -> Self {
        Self {
            should_quit: false,
            screen,

            ops: Vec::new(),
            verse_count: 0,
            parallel_count: 0,
            layout: DocLayout::default(),
            controller,

            content_scroll: 0,
            content_height: 0,
            focused: None,

            panel_scroll: 0,
            panel_width_percent,

            document_area: None,
            content_area: None,
            panel_area: None,
            close_area: None,
        }
    }

    /// Build the reader from the load result. The document is parsed and
    /// rendered here, once.
    pub fn new(loaded: Result<Loaded, LoadError>, panel_width_percent: u16) -> Self {
        let Loaded { text, mapping } = match loaded {
            Ok(loaded) => loaded,
            Err(_) => {
                return Self::empty(
                    Screen::Failed(LOAD_FAILURE_MESSAGE.to_string()),
                    Controller::default(),
                    panel_width_percent,
                )
            }
        };

        let doc = parse_document(&text);
        let ops = render_document(&doc, &mapping);

        let mut app = Self::empty(Screen::Reading, Controller::new(mapping), panel_width_percent);
        app.verse_count = doc.verse_count();
        app.parallel_count = ops.iter().filter(|op| op.parallel_ref().is_some()).count();
        app.ops = ops;
        app
    }

    /// Reflow the document for a new width, keeping the verse at the top of
    /// the view in place.
    pub fn ensure_layout(&mut self, width: u16) {
        let stale = self.layout.is_empty() && !self.ops.is_empty();
        if width == self.layout.width && !stale {
            return;
        }
        let anchor = self.layout.op_at_or_after(self.content_scroll);
        self.layout = DocLayout::build(&self.ops, width);
        self.content_scroll = anchor
            .and_then(|op| self.layout.line_of(op))
            .unwrap_or(0);
        self.clamp_scroll();
    }

    fn max_scroll(&self) -> usize {
        self.layout.len().saturating_sub(self.content_height)
    }

    fn clamp_scroll(&mut self) {
        self.content_scroll = self.content_scroll.min(self.max_scroll());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.content_scroll = self.content_scroll.saturating_add(lines);
        self.clamp_scroll();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.content_scroll = self.content_scroll.saturating_sub(lines);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.content_height / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.content_height / 2).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.content_scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.content_scroll = self.max_scroll();
    }

    pub fn panel_scroll_down(&mut self) {
        self.panel_scroll = self.panel_scroll.saturating_add(1);
    }

    pub fn panel_scroll_up(&mut self) {
        self.panel_scroll = self.panel_scroll.saturating_sub(1);
    }

    /// Jump to the next chapter heading below the top of the view.
    pub fn next_chapter(&mut self) {
        let top = self.content_scroll;
        if let Some(line) = self.layout.heading_lines().into_iter().find(|&l| l > top) {
            self.content_scroll = line;
            self.clamp_scroll();
        }
    }

    pub fn prev_chapter(&mut self) {
        let top = self.content_scroll;
        if let Some(line) = self.layout.heading_lines().into_iter().rev().find(|&l| l < top) {
            self.content_scroll = line;
        }
    }

    /// Chapter whose heading is at or above the top of the view.
    pub fn current_chapter(&self) -> Option<u32> {
        let top = self.content_scroll;
        self.layout
            .lines
            .iter()
            .take(top + 1)
            .rev()
            .find_map(|l| l.chapter)
            .or_else(|| self.layout.lines.iter().find_map(|l| l.chapter))
    }

    fn parallel_ops(&self) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.ops
            .iter()
            .enumerate()
            .filter(|(_, op)| op.parallel_ref().is_some())
            .map(|(i, _)| i)
    }

    /// Move keyboard focus to the next parallel verse, starting from the top
    /// of the view when nothing is focused.
    pub fn focus_next_parallel(&mut self) {
        let next = match self.focused {
            Some(current) => self.parallel_ops().find(|&i| i > current),
            None => {
                let top = self
                    .layout
                    .op_at_or_after(self.content_scroll)
                    .unwrap_or(0);
                self.parallel_ops().find(|&i| i >= top)
            }
        };
        if let Some(op) = next.or_else(|| self.parallel_ops().next()) {
            self.focus_op(op);
        }
    }

    pub fn focus_prev_parallel(&mut self) {
        let prev = match self.focused {
            Some(current) => self.parallel_ops().rev().find(|&i| i < current),
            None => None,
        };
        if let Some(op) = prev.or_else(|| self.parallel_ops().next_back()) {
            self.focus_op(op);
        }
    }

    fn focus_op(&mut self, op: usize) {
        self.focused = Some(op);
        if let Some(line) = self.layout.line_of(op) {
            if line < self.content_scroll {
                self.content_scroll = line;
            } else if self.content_height > 0 && line >= self.content_scroll + self.content_height {
                self.content_scroll = line.saturating_sub(self.content_height / 2);
                self.clamp_scroll();
            }
        }
    }

    /// Open the panel for the focused verse.
    pub fn open_focused(&mut self) -> Transition {
        match self.focused.and_then(|op| self.ops.get(op)).and_then(RenderOp::parallel_ref) {
            Some(reference) => self.dispatch(ClickTarget::ParallelVerse(reference)),
            None => Transition::Unchanged,
        }
    }

    pub fn close_panel(&mut self) -> Transition {
        self.dispatch(ClickTarget::CloseButton)
    }

    /// Resolve a mouse click at screen coordinates into a click target.
    pub fn hit_test(&self, x: u16, y: u16) -> Option<ClickTarget> {
        if self.controller.is_visible() {
            if self.close_area.is_some_and(|r| point_in_rect(x, y, r)) {
                return Some(ClickTarget::CloseButton);
            }
            if self.panel_area.is_some_and(|r| point_in_rect(x, y, r)) {
                return Some(ClickTarget::Panel);
            }
        }

        let area = match self.content_area {
            Some(area) if point_in_rect(x, y, area) => area,
            // Border and scrollbar still belong to the document.
            _ => {
                return self
                    .document_area
                    .filter(|&r| point_in_rect(x, y, r))
                    .map(|_| ClickTarget::Content);
            }
        };
        let line = self.content_scroll + (y - area.y) as usize;
        match self.layout.hit(line, x - area.x) {
            Some(VerseSlot {
                parallel: true,
                reference,
                ..
            }) => Some(ClickTarget::ParallelVerse(reference)),
            _ => Some(ClickTarget::Content),
        }
    }

    pub fn click(&mut self, x: u16, y: u16) -> Transition {
        match self.hit_test(x, y) {
            Some(target) => self.dispatch(target),
            None => Transition::Unchanged,
        }
    }

    fn dispatch(&mut self, target: ClickTarget) -> Transition {
        if let ClickTarget::ParallelVerse(reference) = target {
            // Keep keyboard focus on what was clicked.
            if let Some(op) = self.ops.iter().position(|op| op.parallel_ref() == Some(reference)) {
                self.focused = Some(op);
            }
        }
        let transition = self.controller.click(target);
        if matches!(transition, Transition::Opened(_) | Transition::Replaced(_)) {
            self.panel_scroll = 0;
        }
        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallels_core::{ParallelMapping, PanelState, SourceError, VerseRef};

    const TEXT: &str = "Luke 3:1: In the fifteenth year\n\nLuke 3:2: Annas and Caiaphas\n\nLuke 4:1: And Jesus\n\nLuke 4:2: Being forty days";

    fn app() -> App {
        let mapping = ParallelMapping::from_json(
            r#"{
                "3": {"1": [{"ref": "Antiquities 18.2.1", "text": "Tiberius"}]},
                "4": {"2": [{"ref": "Wars 1.1.1", "text": "a"}, {"ref": "Wars 1.1.2", "text": "b"}]}
            }"#,
        )
        .unwrap();
        let mut app = App::new(
            Ok(Loaded {
                text: TEXT.to_string(),
                mapping,
            }),
            40,
        );
        app.content_area = Some(Rect::new(0, 1, 60, 20));
        app.content_height = 20;
        app.ensure_layout(60);
        app
    }

    fn r(chapter: u32, verse: u32) -> VerseRef {
        VerseRef::new(chapter, verse).unwrap()
    }

    #[test]
    fn test_new_renders_once() {
        let app = app();
        assert_eq!(app.screen, Screen::Reading);
        assert_eq!(app.verse_count, 4);
        assert_eq!(app.parallel_count, 2);
        assert_eq!(app.controller.state(), PanelState::Hidden);
    }

    #[test]
    fn test_failed_load_shows_message_only() {
        let err = LoadError {
            failures: vec![SourceError::Status {
                url: "https://example.org/luke.txt".into(),
                status: 404,
            }],
        };
        let app = App::new(Err(err), 40);
        assert_eq!(app.screen, Screen::Failed(LOAD_FAILURE_MESSAGE.to_string()));
        assert!(app.ops.is_empty());
    }

    #[test]
    fn test_click_parallel_then_outside() {
        let mut app = app();
        // Line 2 of the layout is the first verse line, drawn at row 1 + 2.
        assert_eq!(app.hit_test(0, 3), Some(ClickTarget::ParallelVerse(r(3, 1))));
        assert_eq!(app.click(0, 3), Transition::Opened(r(3, 1)));
        assert_eq!(app.controller.entries()[0].reference, "Antiquities 18.2.1");

        // Heading row is content but not a verse.
        assert_eq!(app.click(0, 1), Transition::Closed);
        assert_eq!(app.click(0, 1), Transition::Unchanged);
        assert!(!app.controller.is_visible());
    }

    #[test]
    fn test_click_outside_any_area_is_ignored() {
        let mut app = app();
        app.click(0, 3);
        assert_eq!(app.click(0, 0), Transition::Unchanged);
        assert!(app.controller.is_visible());
    }

    #[test]
    fn test_click_on_document_border_dismisses() {
        let mut app = app();
        app.document_area = Some(Rect::new(0, 0, 62, 22));
        app.click(0, 3);

        // Scrollbar column, right of the text area.
        assert_eq!(app.hit_test(60, 5), Some(ClickTarget::Content));
        assert_eq!(app.click(61, 5), Transition::Closed);

        app.click(0, 3);
        assert_eq!(app.click(0, 0), Transition::Closed);
        assert_eq!(app.click(70, 5), Transition::Unchanged);
    }

    #[test]
    fn test_close_area_and_panel_body() {
        let mut app = app();
        app.click(0, 3);
        app.panel_area = Some(Rect::new(60, 1, 40, 20));
        app.close_area = Some(Rect::new(95, 1, 3, 1));

        assert_eq!(app.click(70, 10), Transition::Unchanged);
        assert!(app.controller.is_visible());
        assert_eq!(app.click(96, 1), Transition::Closed);
        assert_eq!(app.close_panel(), Transition::Unchanged);
    }

    #[test]
    fn test_keyboard_focus_cycles_parallels() {
        let mut app = app();
        app.focus_next_parallel();
        assert_eq!(app.open_focused(), Transition::Opened(r(3, 1)));

        app.focus_next_parallel();
        assert_eq!(app.open_focused(), Transition::Replaced(r(4, 2)));
        assert_eq!(app.controller.entries().len(), 2);

        // Wraps around.
        app.focus_next_parallel();
        assert_eq!(app.ops[app.focused.unwrap()].parallel_ref(), Some(r(3, 1)));
        app.focus_prev_parallel();
        assert_eq!(app.ops[app.focused.unwrap()].parallel_ref(), Some(r(4, 2)));
    }

    #[test]
    fn test_chapter_jumps() {
        let mut app = app();
        app.content_height = 2;
        assert_eq!(app.current_chapter(), Some(3));
        app.next_chapter();
        assert_eq!(app.current_chapter(), Some(4));
        app.prev_chapter();
        assert_eq!(app.content_scroll, 0);
    }

    #[test]
    fn test_reflow_keeps_top_verse() {
        let mut app = app();
        app.content_height = 1;
        app.next_chapter();
        let top = app.layout.op_at_or_after(app.content_scroll);
        app.ensure_layout(20);
        assert_eq!(app.layout.op_at_or_after(app.content_scroll), top);
    }

    #[test]
    fn test_scroll_past_u16_lines() {
        let text = (1..=25_000)
            .map(|c| format!("Luke {}:1: a", c))
            .collect::<Vec<_>>()
            .join("\n\n");
        let mut app = App::new(
            Ok(Loaded {
                text,
                mapping: ParallelMapping::default(),
            }),
            40,
        );
        app.content_height = 20;
        app.ensure_layout(60);

        // Heading, verse and a blank line between each.
        assert_eq!(app.layout.len(), 99_999);
        assert!(app.layout.len() > u16::MAX as usize);

        app.scroll_to_bottom();
        assert_eq!(app.content_scroll, 99_999 - 20);
        assert_eq!(app.current_chapter(), Some(24_995));

        app.scroll_down(1000);
        assert_eq!(app.content_scroll, 99_999 - 20);

        // Chapter N heading sits on line 4 * (N - 1).
        app.prev_chapter();
        assert_eq!(app.content_scroll, 4 * 24_994);
        app.prev_chapter();
        assert_eq!(app.content_scroll, 4 * 24_993);
        assert_eq!(app.current_chapter(), Some(24_994));

        app.scroll_to_top();
        app.scroll_down(70_000);
        assert_eq!(app.content_scroll, 70_000);
    }
}
