use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use crate::app::{point_in_rect, App, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        // Layout follows the new size on the next draw.
        AppEvent::Resize(_, _) => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    if key.code == KeyCode::Char('q') {
        app.should_quit = true;
        return;
    }
    if matches!(app.screen, Screen::Failed(_)) {
        return;
    }

    match key.code {
        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_down(app.content_height.max(1)),
        KeyCode::PageUp => app.scroll_up(app.content_height.max(1)),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),

        // Chapters
        KeyCode::Char(']') => app.next_chapter(),
        KeyCode::Char('[') => app.prev_chapter(),

        // Parallel verses
        KeyCode::Tab | KeyCode::Char('n') => app.focus_next_parallel(),
        KeyCode::BackTab | KeyCode::Char('p') => app.focus_prev_parallel(),
        KeyCode::Enter => {
            app.open_focused();
        }

        // Panel
        KeyCode::Esc | KeyCode::Char('x') => {
            app.close_panel();
        }
        KeyCode::Char('J') => app.panel_scroll_down(),
        KeyCode::Char('K') => app.panel_scroll_up(),

        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    if matches!(app.screen, Screen::Failed(_)) {
        return;
    }

    // Determine which area the mouse is in (position-based scrolling)
    let in_panel = app.controller.is_visible()
        && app.panel_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let transition = app.click(x, y);
            tracing::trace!(x, y, ?transition, "click");
        }
        MouseEventKind::ScrollDown => {
            if in_panel {
                app.panel_scroll_down();
            } else {
                app.scroll_down(3);
            }
        }
        MouseEventKind::ScrollUp => {
            if in_panel {
                app.panel_scroll_up();
            } else {
                app.scroll_up(3);
            }
        }
        _ => {}
    }
}
