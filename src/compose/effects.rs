/// Effect engine: which filter is active and at what intensity
///
/// The engine never touches pixels itself. It hands back a
/// [`Rendering`] description that the preview renderer applies.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Named visual filters offered by the composer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[default]
    None,
    Chrome,
    Sepia,
    Marvin,
    Phobos,
    Heat,
}

impl Effect {
    pub const ALL: [Effect; 6] = [
        Effect::None,
        Effect::Chrome,
        Effect::Sepia,
        Effect::Marvin,
        Effect::Phobos,
        Effect::Heat,
    ];

    /// Identifier sent to the server
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::None => "none",
            Effect::Chrome => "chrome",
            Effect::Sepia => "sepia",
            Effect::Marvin => "marvin",
            Effect::Phobos => "phobos",
            Effect::Heat => "heat",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Effect::None => "Original",
            Effect::Chrome => "Chrome",
            Effect::Sepia => "Sepia",
            Effect::Marvin => "Marvin",
            Effect::Phobos => "Phobos",
            Effect::Heat => "Heat",
        }
    }

    /// Intensity range, or `None` for the unfiltered original
    pub fn range(&self) -> Option<IntensityRange> {
        let (min, max, step) = match self {
            Effect::None => return None,
            Effect::Chrome | Effect::Sepia => (0.0, 1.0, 0.1),
            Effect::Marvin => (0.0, 100.0, 1.0),
            Effect::Phobos => (0.0, 3.0, 0.1),
            Effect::Heat => (1.0, 3.0, 0.1),
        };
        Some(IntensityRange { min, max, step })
    }

    /// Describe how this effect renders at the given intensity
    pub fn render(&self, value: f64) -> Rendering {
        match self {
            Effect::None => Rendering::None,
            Effect::Chrome => Rendering::Grayscale(value),
            Effect::Sepia => Rendering::Sepia(value),
            Effect::Marvin => Rendering::Invert(value),
            Effect::Phobos => Rendering::Blur(value),
            Effect::Heat => Rendering::Brightness(value),
        }
    }
}

/// Bounds and granularity of an effect's intensity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl IntensityRange {
    /// Clamp into the range and snap onto the step grid
    pub fn snap(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.max;
        }
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        let snapped = (self.min + steps * self.step).min(self.max);
        round_to(snapped, self.decimals())
    }

    /// Number of decimals the step needs (0.1 -> 1, 1 -> 0)
    fn decimals(&self) -> i32 {
        let mut decimals = 0;
        let mut step = self.step;
        while (step - step.round()).abs() > 1e-9 && decimals < 6 {
            step *= 10.0;
            decimals += 1;
        }
        decimals
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// CSS-filter-equivalent description of the preview rendering
///
/// Displays in CSS notation, e.g. `blur(1.5px)` or `invert(50%)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rendering {
    None,
    Grayscale(f64),
    Sepia(f64),
    /// Percentage, 0-100
    Invert(f64),
    /// Radius in pixels
    Blur(f64),
    Brightness(f64),
}

impl fmt::Display for Rendering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendering::None => write!(f, "none"),
            Rendering::Grayscale(v) => write!(f, "grayscale({v})"),
            Rendering::Sepia(v) => write!(f, "sepia({v})"),
            Rendering::Invert(v) => write!(f, "invert({v}%)"),
            Rendering::Blur(v) => write!(f, "blur({v}px)"),
            Rendering::Brightness(v) => write!(f, "brightness({v})"),
        }
    }
}

/// Whether the intensity slider could be set up
///
/// Chosen once when the engine is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Capability {
    #[default]
    Full,
    /// No slider: filters apply at full strength and the control stays hidden
    Degraded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectEngine {
    current: Effect,
    intensity: f64,
    capability: Capability,
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new(Capability::Full)
    }
}

impl EffectEngine {
    pub fn new(capability: Capability) -> Self {
        Self {
            current: Effect::None,
            intensity: 0.0,
            capability,
        }
    }

    /// Switch filters; intensity restarts at the new effect's maximum
    ///
    /// Returns the range the intensity control should re-bind to.
    pub fn select_effect(&mut self, effect: Effect) -> Option<IntensityRange> {
        self.current = effect;
        let range = effect.range();
        self.intensity = range.map_or(0.0, |range| range.max);
        range
    }

    /// Move the intensity and return the resulting rendering
    ///
    /// Ignored when no effect is selected or the slider is unavailable.
    pub fn set_intensity(&mut self, value: f64) -> Rendering {
        if self.capability == Capability::Full {
            if let Some(range) = self.current.range() {
                self.intensity = range.snap(value);
            }
        }
        self.rendering()
    }

    pub fn reset(&mut self) {
        self.select_effect(Effect::None);
    }

    pub fn rendering(&self) -> Rendering {
        self.current.render(self.intensity)
    }

    pub fn effect(&self) -> Effect {
        self.current
    }

    /// Current intensity, absent while no effect is selected
    pub fn intensity(&self) -> Option<f64> {
        (self.current != Effect::None).then_some(self.intensity)
    }

    /// Range currently bound to the slider
    pub fn range(&self) -> Option<IntensityRange> {
        self.current.range()
    }

    pub fn intensity_visible(&self) -> bool {
        self.capability == Capability::Full && self.current != Effect::None
    }

    /// Intensity as submitted in the `effect-level` field
    pub fn level_text(&self) -> String {
        self.intensity().map(|v| v.to_string()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_none() {
        let engine = EffectEngine::default();
        assert_eq!(engine.effect(), Effect::None);
        assert_eq!(engine.rendering(), Rendering::None);
        assert!(!engine.intensity_visible());
        assert_eq!(engine.level_text(), "");
    }

    #[test]
    fn test_phobos_renders_pixels() {
        let mut engine = EffectEngine::default();
        engine.select_effect(Effect::Phobos);
        assert_eq!(engine.set_intensity(1.5).to_string(), "blur(1.5px)");
    }

    #[test]
    fn test_marvin_renders_percent() {
        let mut engine = EffectEngine::default();
        engine.select_effect(Effect::Marvin);
        assert_eq!(engine.set_intensity(50.0).to_string(), "invert(50%)");
    }

    #[test]
    fn test_unitless_renderings() {
        let mut engine = EffectEngine::default();
        engine.select_effect(Effect::Chrome);
        assert_eq!(engine.set_intensity(0.7).to_string(), "grayscale(0.7)");
        engine.select_effect(Effect::Sepia);
        assert_eq!(engine.rendering().to_string(), "sepia(1)");
        engine.select_effect(Effect::Heat);
        assert_eq!(engine.set_intensity(2.3).to_string(), "brightness(2.3)");
    }

    #[test]
    fn test_switch_resets_to_new_maximum() {
        let mut engine = EffectEngine::default();
        engine.select_effect(Effect::Chrome);
        engine.set_intensity(0.7);
        assert_eq!(engine.intensity(), Some(0.7));

        let range = engine.select_effect(Effect::Sepia).unwrap();
        assert_eq!(range, IntensityRange { min: 0.0, max: 1.0, step: 0.1 });
        assert_eq!(engine.intensity(), Some(1.0));
    }

    #[test]
    fn test_intensity_is_clamped_and_snapped() {
        let mut engine = EffectEngine::default();
        engine.select_effect(Effect::Heat);
        assert_eq!(engine.set_intensity(0.2), Rendering::Brightness(1.0));
        assert_eq!(engine.set_intensity(9.0), Rendering::Brightness(3.0));
        assert_eq!(engine.set_intensity(1.26), Rendering::Brightness(1.3));

        engine.select_effect(Effect::Marvin);
        assert_eq!(engine.set_intensity(33.4), Rendering::Invert(33.0));
        assert_eq!(engine.set_intensity(f64::NAN), Rendering::Invert(100.0));
    }

    #[test]
    fn test_snap_has_no_float_noise() {
        let range = Effect::Chrome.range().unwrap();
        for tenth in 0..=10 {
            let value = range.snap(tenth as f64 * 0.1);
            assert!(value.to_string().len() <= 3, "{value}");
        }
    }

    #[test]
    fn test_set_intensity_without_effect() {
        let mut engine = EffectEngine::default();
        assert_eq!(engine.set_intensity(0.5), Rendering::None);
        assert_eq!(engine.intensity(), None);
    }

    #[test]
    fn test_reset_hides_control() {
        let mut engine = EffectEngine::default();
        engine.select_effect(Effect::Marvin);
        assert!(engine.intensity_visible());
        engine.reset();
        assert!(!engine.intensity_visible());
        assert_eq!(engine.rendering(), Rendering::None);
    }

    #[test]
    fn test_degraded_keeps_control_hidden() {
        let mut engine = EffectEngine::new(Capability::Degraded);
        engine.select_effect(Effect::Phobos);
        assert!(!engine.intensity_visible());
        assert_eq!(engine.set_intensity(0.5), Rendering::Blur(3.0));
        assert_eq!(engine.level_text(), "3");
    }
}
