//! Keyboard input dispatch: help overlay → global keys → page-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, Page};

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        KeyCode::Char('1') => {
            app.show_page(Page::Observatory);
            return;
        }
        KeyCode::Char('2') => {
            app.show_page(Page::Scanner);
            return;
        }
        KeyCode::Tab => {
            let page = if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.page.prev()
            } else {
                app.page.next()
            };
            app.show_page(page);
            return;
        }
        KeyCode::BackTab => {
            app.show_page(app.page.prev());
            return;
        }
        KeyCode::Char('r') => {
            app.retry();
            return;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
            return;
        }
        _ => {}
    }

    match app.page {
        Page::Observatory => {
            if key.code == KeyCode::Enter {
                app.show_page(Page::Scanner);
            }
        }
        Page::Scanner => handle_scanner_key(app, key),
    }
}

fn handle_scanner_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.cursor = app.tickers.len().saturating_sub(1);
        }
        KeyCode::Char('c') => {
            app.toggle_chart_style();
            app.set_status(format!(
                "Chart style: {}",
                app.chart_style.price_axis_title()
            ));
        }
        _ => {}
    }
}
