//! Audio level meter mapping

/// Pixel width of a full-scale bar.
pub const VOLUME_BAR_SCALE: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LevelColor {
    #[default]
    Green,
    Yellow,
    Red,
}

impl LevelColor {
    pub fn from_level(level: f64) -> Self {
        let level = clamp_level(level);
        if level < 0.5 {
            LevelColor::Green
        } else if level < 0.75 {
            LevelColor::Yellow
        } else {
            LevelColor::Red
        }
    }

    pub fn css(&self) -> &'static str {
        match self {
            LevelColor::Green => "green",
            LevelColor::Yellow => "yellow",
            LevelColor::Red => "red",
        }
    }
}

/// SDK levels are nominally in `[0, 1]`; NaN reads as silence.
pub fn clamp_level(level: f64) -> f64 {
    if level.is_nan() {
        0.0
    } else {
        level.clamp(0.0, 1.0)
    }
}

pub fn bar_width(level: f64) -> u32 {
    (clamp_level(level) * VOLUME_BAR_SCALE).floor() as u32
}

/// What one volume bar should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeterReading {
    pub width_px: u32,
    pub color: LevelColor,
}

impl MeterReading {
    pub fn from_level(level: f64) -> Self {
        Self {
            width_px: bar_width(level),
            color: LevelColor::from_level(level),
        }
    }

    pub fn style(&self) -> String {
        format!("width: {}px; background: {};", self.width_px, self.color.css())
    }
}
