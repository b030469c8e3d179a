/// Preview edit parameters for an upload
///
/// This struct snapshots the adjustments made in the composer.
/// It derives the `scale`, `effect` and `effect-level` fields of the
/// transmission payload; the preview pixels themselves are never sent.
use serde::{Deserialize, Serialize};

use crate::compose::effects::{Effect, EffectEngine};
use crate::compose::scale::{ScaleControl, DEFAULT_SCALE};

/// All edit parameters for one composition
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct EditParams {
    /// Zoom percentage (25, 50, 75 or 100)
    pub scale: u32,

    /// Active filter
    pub effect: Effect,

    /// Filter intensity within the effect's own range
    /// - `None` when no filter is applied
    pub intensity: Option<f64>,
}

impl Default for EditParams {
    /// Create default edit parameters (full size, no filter)
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            effect: Effect::None,
            intensity: None,
        }
    }
}

impl EditParams {
    /// Capture the current state of the scale control and effect engine
    pub fn capture(scale: &ScaleControl, effects: &EffectEngine) -> Self {
        Self {
            scale: scale.reading().percent,
            effect: effects.effect(),
            intensity: effects.intensity(),
        }
    }

    /// Convert to JSON string for logging
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Check if this represents an unedited upload (all values at default)
    pub fn is_unedited(&self) -> bool {
        *self == Self::default()
    }

    /// `scale` payload field, e.g. "75%"
    pub fn scale_text(&self) -> String {
        format!("{}%", self.scale)
    }

    /// `effect-level` payload field; empty when no filter is applied
    pub fn effect_level_text(&self) -> String {
        self.intensity.map(|v| v.to_string()).unwrap_or_default()
    }
}
