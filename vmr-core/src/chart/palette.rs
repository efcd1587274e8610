//! Colours for chart specs.

use serde::{Serialize, Serializer};

use crate::domain::SignalKind;

/// 8-bit RGB plus alpha in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS form: `#rrggbb` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.css())
    }
}

/// Marker colours for one signal kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalColors {
    /// Vertical line.
    pub line: Rgba,
    /// Legend swatch.
    pub legend: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Palette {
    pub volume_up: Rgba,
    pub volume_down: Rgba,
    /// Opacity applied to the whole volume trace.
    pub volume_opacity: f32,
    pub price_line: Rgba,
    pub candle_up: Rgba,
    pub candle_down: Rgba,
    pub first_signal: SignalColors,
    pub following_signal: SignalColors,
    pub generic_signal: SignalColors,
}

const YELLOW: SignalColors = SignalColors {
    line: Rgba::rgba(255, 255, 0, 0.85),
    legend: Rgba::rgb(255, 255, 0),
};

const BLUE: SignalColors = SignalColors {
    line: Rgba::rgba(66, 133, 244, 0.6),
    legend: Rgba::rgb(66, 133, 244),
};

const MATERIAL_BLUE: SignalColors = SignalColors {
    line: Rgba::rgba(33, 150, 243, 0.8),
    legend: Rgba::rgb(33, 150, 243),
};

impl Palette {
    /// Stock Scanner page: teal line, teal/orange volume.
    pub fn scanner() -> Self {
        Self {
            volume_up: Rgba::rgba(0, 212, 170, 0.3),
            volume_down: Rgba::rgba(255, 107, 53, 0.3),
            volume_opacity: 0.5,
            price_line: Rgba::rgb(0, 212, 170),
            candle_up: Rgba::rgb(0, 212, 170),
            candle_down: Rgba::rgb(255, 107, 53),
            first_signal: YELLOW,
            following_signal: BLUE,
            generic_signal: MATERIAL_BLUE,
        }
    }

    /// Legacy chart page: green/red candles.
    pub fn classic() -> Self {
        Self {
            volume_up: Rgba::rgba(0, 230, 118, 0.4),
            volume_down: Rgba::rgba(255, 82, 82, 0.4),
            volume_opacity: 1.0,
            price_line: Rgba::rgb(0, 230, 118),
            candle_up: Rgba::rgb(0, 230, 118),
            candle_down: Rgba::rgb(255, 82, 82),
            first_signal: YELLOW,
            following_signal: BLUE,
            generic_signal: MATERIAL_BLUE,
        }
    }

    pub fn signal(&self, kind: SignalKind) -> SignalColors {
        match kind {
            SignalKind::First => self.first_signal,
            SignalKind::Following => self.following_signal,
            SignalKind::Generic => self.generic_signal,
        }
    }
}
