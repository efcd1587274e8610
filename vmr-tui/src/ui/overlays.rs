//! Modal overlays drawn over the page.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use super::centered_rect;
use crate::theme;

const KEYS: [(&str, &str); 9] = [
    ("1 / 2", "Observatory / Stock Scanner"),
    ("Tab / Shift+Tab", "Cycle pages"),
    ("Enter", "Open the scanner from the home page"),
    ("j / k", "Next / previous ticker"),
    ("g / G", "First / last ticker"),
    ("c", "Toggle line / candlestick chart"),
    ("r", "Retry after a failed load"),
    ("?", "This help"),
    ("q", "Quit"),
];

pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    let mut lines = vec![
        Line::from(Span::styled("Keyboard", theme::accent_bold())),
        Line::from(""),
    ];
    for (keys, desc) in KEYS {
        lines.push(Line::from(vec![
            Span::styled(format!("  {keys:>16}  "), theme::accent()),
            Span::styled(desc, theme::muted()),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("  Press any key to close", theme::muted())));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(" Help ");
    f.render_widget(Paragraph::new(lines).block(block), popup);
}
