//! Output channels that turn every command into a `tracing` event, for hosts
//! without a buzzer, LEDs or a panel.

use folio_core::notify::entity::{Cue, IndicatorColor, Lamp, LampColor, ViewModel};
use folio_core::notify::port::{AudibleChannel, IndicatorChannel, VisualChannel};
use folio_core::portfolio::entity::TrackingMode;
use tracing::{debug, info, trace};

pub struct LogAudible;

impl AudibleChannel for LogAudible {
    fn play(&self, cue: &Cue) {
        info!(
            target: "folio::output",
            motif = ?cue.motif,
            volume = cue.volume,
            tones = cue.tones.len(),
            total_ms = cue.total_ms(),
            "Buzzer"
        );
    }
}

pub struct LogIndicator;

impl IndicatorChannel for LogIndicator {
    fn set_state(&self, mode: TrackingMode, color: Option<IndicatorColor>, blinking: bool) {
        info!(target: "folio::output", %mode, ?color, blinking, "Indicator");
    }

    fn blink_phase(&self, lit: bool) {
        trace!(target: "folio::output", lit, "Blink");
    }

    fn set_lamp(&self, lamp: Lamp, color: LampColor) {
        debug!(target: "folio::output", ?lamp, ?color, "Status lamp");
    }
}

pub struct LogVisual;

impl VisualChannel for LogVisual {
    fn render(&self, view: &ViewModel) {
        match view {
            ViewModel::Dashboard(d) => debug!(
                target: "folio::output",
                link = %d.connectivity,
                entry = ?d.entry.as_ref().map(|l| &l.pnl_percent),
                exit = ?d.exit.as_ref().map(|l| &l.pnl_percent),
                "Display: dashboard"
            ),
            ViewModel::Alert(a) => info!(
                target: "folio::output",
                symbol = %a.symbol,
                price = %a.price,
                severe = a.severe,
                remaining = a.remaining_secs,
                "Display: {} - {}",
                a.title,
                a.message
            ),
            ViewModel::ConnectionLost { lost_secs } => {
                info!(target: "folio::output", lost_secs, "Display: connection lost")
            }
            ViewModel::Message { title, body } => {
                info!(target: "folio::output", "Display: {} - {}", title, body)
            }
        }
    }

    fn set_backlight(&self, level: u8) {
        debug!(target: "folio::output", level, "Backlight");
    }
}
