use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use crate::app::{App, Screen};
use crate::layout::{DocLine, SegmentKind};

const CLOSE_LABEL: &str = "[x]";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen.clone() {
        Screen::Failed(message) => render_failure(app, frame, body_area, &message),
        Screen::Reading => render_reading(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let counts = match app.screen {
        Screen::Reading => format!(
            " {} verses, {} with parallels",
            app.verse_count, app.parallel_count
        ),
        Screen::Failed(_) => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" Luke with Josephus ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(counts, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = Style::default().bg(Color::Blue).fg(Color::White);
    let mode_text = if app.controller.is_visible() { " PARALLELS " } else { " READ " };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match app.screen {
        Screen::Failed(_) => vec![],
        Screen::Reading => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" [/] ", key_style),
            Span::styled(" chapter ", label_style),
            Span::styled(" Tab ", key_style),
            Span::styled(" next parallel ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" open ", label_style),
        ],
    };
    if app.controller.is_visible() {
        hints.extend(vec![
            Span::styled(" J/K ", key_style),
            Span::styled(" scroll panel ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ]);
    }
    hints.extend(vec![
        Span::styled(" q ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_failure(app: &mut App, frame: &mut Frame, area: Rect, message: &str) {
    app.document_area = None;
    app.content_area = None;
    app.panel_area = None;
    app.close_area = None;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Luke ");
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(paragraph, area);
}

fn render_reading(app: &mut App, frame: &mut Frame, area: Rect) {
    if app.controller.is_visible() {
        // Side panel open: the document gives up part of the width.
        let [content_area, panel_area] = Layout::horizontal([
            Constraint::Percentage(100 - app.panel_width_percent),
            Constraint::Percentage(app.panel_width_percent),
        ])
        .areas(area);
        render_content(app, frame, content_area);
        render_panel(app, frame, panel_area);
    } else {
        app.panel_area = None;
        app.close_area = None;
        render_content(app, frame, area);
    }
}

fn verse_style(app: &App, kind: SegmentKind, op: Option<usize>, parallel: bool) -> Style {
    let is_active = parallel
        && app.controller.is_visible()
        && op.and_then(|i| app.ops.get(i)).and_then(|o| o.parallel_ref()) == app.controller.active();
    let is_focused = op.is_some() && op == app.focused;

    let base = match kind {
        SegmentKind::Heading => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        SegmentKind::VerseNumber => Style::default().fg(Color::Yellow),
        SegmentKind::Text => Style::default(),
    };

    let base = if is_active {
        base.bg(Color::Yellow).fg(Color::Black)
    } else if parallel {
        base.bg(Color::Rgb(60, 50, 0)).add_modifier(Modifier::UNDERLINED)
    } else {
        base
    };

    if is_focused {
        base.add_modifier(Modifier::REVERSED)
    } else {
        base
    }
}

fn styled_line(app: &App, line: &DocLine) -> Line<'static> {
    let spans: Vec<Span<'static>> = line
        .segments
        .iter()
        .map(|segment| {
            let op = segment.verse.map(|v| v.op);
            let parallel = segment.verse.is_some_and(|v| v.parallel);
            Span::styled(segment.text.clone(), verse_style(app, segment.kind, op, parallel))
        })
        .collect();
    Line::from(spans)
}

fn render_content(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = match app.current_chapter() {
        Some(chapter) => format!(" Luke {} ", chapter),
        None => " Luke ".to_string(),
    };
    let border_color = if app.controller.is_visible() { Color::DarkGray } else { Color::Cyan };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // One column is kept for the scrollbar.
    let inner = block.inner(area);
    let text_area = Rect {
        width: inner.width.saturating_sub(1),
        ..inner
    };
    app.document_area = Some(area);
    app.content_area = Some(text_area);
    app.content_height = text_area.height as usize;
    app.ensure_layout(text_area.width);

    if app.ops.is_empty() {
        let placeholder = Paragraph::new("No verses found in the source text")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let start = app.content_scroll;
    let end = (start + text_area.height as usize).min(app.layout.len());
    let lines: Vec<Line> = app.layout.lines[start.min(end)..end]
        .iter()
        .map(|line| styled_line(app, line))
        .collect();

    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(lines), text_area);

    let total = app.layout.len();
    if total > text_area.height as usize {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state = ScrollbarState::new(total).position(app.content_scroll);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let title = match app.controller.active() {
        Some(reference) => format!(" Josephus: Luke {} ", reference),
        None => " Josephus ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title);

    let inner = block.inner(area);
    app.panel_area = Some(area);

    let mut lines: Vec<Line> = Vec::new();
    for entry in app.controller.entries() {
        lines.push(Line::from(Span::styled(
            entry.reference.clone(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(entry.text.clone()));
        lines.push(Line::default());
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.panel_scroll, 0));
    frame.render_widget(paragraph, area);

    // Close control sits on the top border, right-aligned.
    let close_width = CLOSE_LABEL.len() as u16;
    if area.width > close_width + 2 {
        let close_area = Rect::new(area.x + area.width - close_width - 1, area.y, close_width, 1);
        app.close_area = Some(close_area);
        frame.render_widget(
            Paragraph::new(CLOSE_LABEL).style(Style::default().fg(Color::Red).bold()),
            close_area,
        );
    } else {
        app.close_area = None;
    }
}
