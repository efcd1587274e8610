//! Dark "observatory" theme tokens.
//!
//! Terminal counterparts of the dashboard colours: teal accent on a
//! near-black surface, orange for warnings and down volume.

use ratatui::style::{Color, Modifier, Style};

use vmr_core::chart::Rgba;

pub const BACKGROUND: Color = Color::Rgb(14, 17, 23);
pub const ACCENT: Color = Color::Rgb(0, 212, 170);
pub const POSITIVE: Color = Color::Rgb(0, 230, 118);
pub const NEGATIVE: Color = Color::Rgb(255, 82, 82);
pub const WARNING: Color = Color::Rgb(255, 107, 53);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(120, 130, 150);
pub const TEXT: Color = Color::White;

/// Theme handed to buffer-drawing widgets.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub muted: Color,
    pub text: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::observatory()
    }
}

impl Theme {
    pub fn observatory() -> Self {
        Self {
            background: BACKGROUND,
            accent: ACCENT,
            positive: POSITIVE,
            negative: NEGATIVE,
            warning: WARNING,
            muted: MUTED,
            text: TEXT,
        }
    }

    /// Colour for a win-rate percentage (0..=100).
    pub fn win_rate_color(&self, pct: f64) -> Color {
        match pct {
            w if w >= 70.0 => self.positive,
            w if w >= 50.0 => self.accent,
            _ => self.warning,
        }
    }
}

/// Terminal colour for a chart colour. Alpha is dropped; the terminal has no blending.
pub fn terminal_color(c: Rgba) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn positive() -> Style {
    Style::default().fg(POSITIVE)
}

pub fn text() -> Style {
    Style::default().fg(TEXT)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    }
}

pub fn panel_title(active: bool) -> Style {
    panel_border(active).add_modifier(Modifier::BOLD)
}
