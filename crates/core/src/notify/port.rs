use crate::notify::entity::{Cue, IndicatorColor, Lamp, LampColor, ViewModel};
use crate::portfolio::entity::TrackingMode;

/// # Summary
/// Sound output.
///
/// # Invariants
/// - Fire-and-forget: the dispatcher never waits on or inspects a result.
/// - Implementations must be `Send` and `Sync`; they are shared with the
///   control surface for diagnostics.
pub trait AudibleChannel: Send + Sync {
    /// # Summary
    /// Plays a volume-shaped cue.
    ///
    /// # Arguments
    /// * `cue` - motif identity and the tone train to emit. Never empty; muted
    ///   playback is filtered out before this call.
    fn play(&self, cue: &Cue);
}

/// # Summary
/// Per-mode alert indicators and the two RGB status lamps.
///
/// # Invariants
/// - Called only when the commanded state differs from the last one.
pub trait IndicatorChannel: Send + Sync {
    /// # Summary
    /// Sets one mode's indicator.
    ///
    /// # Arguments
    /// * `mode` - which indicator pair.
    /// * `color` - lit color, `None` for dark.
    /// * `blinking` - whether the indicator follows the shared blink cadence.
    fn set_state(&self, mode: TrackingMode, color: Option<IndicatorColor>, blinking: bool);

    /// Shared blink cadence; every blinking indicator is lit when `lit` is set.
    fn blink_phase(&self, lit: bool);

    fn set_lamp(&self, lamp: Lamp, color: LampColor);
}

/// Display output.
pub trait VisualChannel: Send + Sync {
    fn render(&self, view: &ViewModel);

    /// Backlight level in percent, 0 for off.
    fn set_backlight(&self, level: u8);
}
