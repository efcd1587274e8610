//! Bottom status bar: page hints, last status message, build and snapshot info.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let info = snapshot_info(app);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(info.chars().count() as u16 + 1),
        ])
        .split(area);

    let mut spans: Vec<Span> = vec![
        Span::styled(" 1:Observatory 2:Scanner ?:Help q:Quit", theme::muted()),
        Span::raw(" | "),
    ];
    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);
    f.render_widget(
        Paragraph::new(Span::styled(info, theme::muted())).right_aligned(),
        chunks[1],
    );
}

/// `vX.Y.Z | source | #fingerprint`, or `offline` while degraded.
fn snapshot_info(app: &AppState) -> String {
    let snapshot = match &app.fingerprint {
        Some(hash) => format!("#{hash}"),
        None => "offline".to_string(),
    };
    format!(
        "v{} | {} | {} ",
        env!("CARGO_PKG_VERSION"),
        app.service.source_name(),
        snapshot
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::{app_with, sample_app};
    use crate::ui::test_support::render_text;
    use vmr_core::data::StaticSource;

    #[test]
    fn shows_version_and_fingerprint() {
        let app = sample_app();
        let text = render_text(&app, 120, 20);
        let last_line = text.lines().last().unwrap();
        assert!(last_line.contains(&format!("v{}", env!("CARGO_PKG_VERSION"))));
        assert!(last_line.contains(&format!("#{}", app.fingerprint.as_deref().unwrap())));
        assert!(last_line.contains("static"));
    }

    #[test]
    fn degraded_shows_offline_and_error() {
        let app = app_with(StaticSource::unreachable("token rejected"));
        let text = render_text(&app, 140, 20);
        let last_line = text.lines().last().unwrap();
        assert!(last_line.contains("offline"));
        assert!(last_line.contains("token rejected"));
    }
}
