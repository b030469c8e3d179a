/// Stepped zoom control for the preview
use std::fmt;

pub const SCALE_MIN: u32 = 25;
pub const SCALE_MAX: u32 = 100;
pub const SCALE_STEP: u32 = 25;
pub const DEFAULT_SCALE: u32 = 100;

/// A scale percentage with the zoom factor the preview should use
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleReading {
    pub percent: u32,
    /// `percent / 100`
    pub zoom: f32,
}

impl ScaleReading {
    fn new(percent: u32) -> Self {
        Self {
            percent,
            zoom: percent as f32 / 100.0,
        }
    }
}

impl fmt::Display for ScaleReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleControl {
    percent: u32,
}

impl Default for ScaleControl {
    fn default() -> Self {
        Self {
            percent: DEFAULT_SCALE,
        }
    }
}

impl ScaleControl {
    pub fn increase(&mut self) -> ScaleReading {
        self.percent = (self.percent + SCALE_STEP).min(SCALE_MAX);
        self.reading()
    }

    pub fn decrease(&mut self) -> ScaleReading {
        self.percent = self.percent.saturating_sub(SCALE_STEP).max(SCALE_MIN);
        self.reading()
    }

    pub fn reset(&mut self) -> ScaleReading {
        self.percent = DEFAULT_SCALE;
        self.reading()
    }

    pub fn reading(&self) -> ScaleReading {
        ScaleReading::new(self.percent)
    }

    pub fn can_increase(&self) -> bool {
        self.percent < SCALE_MAX
    }

    pub fn can_decrease(&self) -> bool {
        self.percent > SCALE_MIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_clamps_at_max() {
        let mut scale = ScaleControl::default();
        assert_eq!(scale.increase().percent, 100);
        assert!(!scale.can_increase());
    }

    #[test]
    fn test_decrease_clamps_at_min() {
        let mut scale = ScaleControl::default();
        for _ in 0..10 {
            scale.decrease();
        }
        assert_eq!(scale.reading().percent, 25);
        assert_eq!(scale.reading().zoom, 0.25);
    }

    #[test]
    fn test_four_steps_up_from_min() {
        let mut scale = ScaleControl::default();
        for _ in 0..3 {
            scale.decrease();
        }
        assert_eq!(scale.reading().percent, 25);

        let mut last = scale.reading();
        for _ in 0..4 {
            last = scale.increase();
        }
        assert_eq!(last.percent, 100);
        assert_eq!(last.zoom, 1.0);
    }

    #[test]
    fn test_reset_always_returns_default() {
        let mut scale = ScaleControl::default();
        scale.decrease();
        scale.decrease();
        assert_eq!(scale.reset(), ScaleReading { percent: 100, zoom: 1.0 });
        assert_eq!(scale.reset().to_string(), "100%");
    }

    #[test]
    fn test_readout() {
        let mut scale = ScaleControl::default();
        assert_eq!(scale.decrease().to_string(), "75%");
    }
}
