use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::link::entity::ConnectivityState;
use crate::portfolio::entity::TrackingMode;

/// # Summary
/// Named audible pattern.
///
/// # Invariants
/// - The mapping from motif to notes is fixed; volume shaping happens later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Motif {
    EntryLong { severe: bool },
    EntryShort { severe: bool },
    ExitProfit,
    ExitLoss,
    Reset,
    Success,
    Error,
    ConnectionLost,
    Startup,
    VolumeFeedback { volume: u8 },
}

/// One note of a motif: frequency, audible length, then silence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub freq_hz: u32,
    pub duration_ms: u32,
    pub rest_ms: u32,
}

const fn note(freq_hz: u32, duration_ms: u32, rest_ms: u32) -> Note {
    Note {
        freq_hz,
        duration_ms,
        rest_ms,
    }
}

impl Motif {
    /// Every fixed motif, in self-test order.
    pub const SELF_TEST: [Motif; 11] = [
        Motif::Startup,
        Motif::EntryLong { severe: false },
        Motif::EntryLong { severe: true },
        Motif::EntryShort { severe: false },
        Motif::EntryShort { severe: true },
        Motif::ExitProfit,
        Motif::ExitLoss,
        Motif::Reset,
        Motif::Success,
        Motif::Error,
        Motif::ConnectionLost,
    ];

    /// Unshaped note sequence.
    pub fn notes(&self) -> Vec<Note> {
        match self {
            Motif::EntryLong { severe: false } => vec![note(523, 300, 350)],
            Motif::EntryLong { severe: true } => vec![note(440, 200, 250), note(349, 250, 300)],
            Motif::EntryShort { severe: false } => vec![note(659, 250, 300)],
            Motif::EntryShort { severe: true } => vec![note(784, 100, 120); 3],
            Motif::ExitProfit => vec![note(1047, 200, 250), note(1319, 250, 300)],
            Motif::ExitLoss => vec![note(349, 300, 350)],
            Motif::Reset => vec![note(262, 100, 120), note(294, 100, 120), note(330, 150, 200)],
            Motif::Success => vec![note(523, 150, 200), note(659, 200, 250)],
            Motif::Error => vec![note(349, 200, 250), note(294, 250, 300)],
            Motif::ConnectionLost => vec![note(392, 300, 350); 4],
            Motif::Startup => vec![note(600, 100, 150), note(800, 150, 200), note(1000, 200, 250)],
            Motif::VolumeFeedback { volume } => {
                let v = u32::from((*volume).min(100));
                let duration = 50 + v * 150 / 100;
                vec![note(300 + v * 12, duration, duration + 50)]
            }
        }
    }
}

/// A single tone or pause handed to the audible channel after volume shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Tone {
    pub freq_hz: u32,
    pub duration_ms: u32,
    /// Silence after the tone.
    pub pause_ms: u32,
}

/// # Summary
/// Playback request: the motif identity plus the volume-shaped tone train.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Cue {
    pub motif: Motif,
    pub volume: u8,
    pub tones: Vec<Tone>,
}

impl Cue {
    pub fn total_ms(&self) -> u32 {
        self.tones.iter().map(|t| t.duration_ms + t.pause_ms).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum IndicatorColor {
    Green,
    Red,
}

/// RGB status lamps besides the per-mode indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Lamp {
    Link,
    Portfolio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum LampColor {
    Off,
    Red,
    Yellow,
    Green,
    BrightGreen,
    Blue,
}

/// Per-mode line on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ModeLine {
    pub mode: TrackingMode,
    pub positions: usize,
    pub pnl_percent: String,
    pub alerted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardView {
    pub connectivity: ConnectivityState,
    pub entry: Option<ModeLine>,
    pub exit: Option<ModeLine>,
    pub volume: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AlertView {
    pub title: String,
    pub symbol: String,
    pub price: String,
    pub message: String,
    pub severe: bool,
    pub remaining_secs: i64,
}

/// # Summary
/// Everything the visual channel can be asked to draw.
///
/// # Invariants
/// - Exactly one view is current; the dispatcher only calls `render` when it
///   differs from the last rendered one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum ViewModel {
    Dashboard(DashboardView),
    Alert(AlertView),
    ConnectionLost { lost_secs: i64 },
    Message { title: String, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severe_short_is_triple_beep() {
        let notes = Motif::EntryShort { severe: true }.notes();
        assert_eq!(notes.len(), 3);
        assert!(notes.iter().all(|n| n.freq_hz == 784));
    }

    #[test]
    fn test_self_test_covers_every_fixed_motif() {
        // Exhaustive so a new variant has to be placed here.
        let fixed = |m: &Motif| match m {
            Motif::EntryLong { .. }
            | Motif::EntryShort { .. }
            | Motif::ExitProfit
            | Motif::ExitLoss
            | Motif::Reset
            | Motif::Success
            | Motif::Error
            | Motif::ConnectionLost
            | Motif::Startup => true,
            Motif::VolumeFeedback { .. } => false,
        };
        let all = [
            Motif::EntryLong { severe: false },
            Motif::EntryLong { severe: true },
            Motif::EntryShort { severe: false },
            Motif::EntryShort { severe: true },
            Motif::ExitProfit,
            Motif::ExitLoss,
            Motif::Reset,
            Motif::Success,
            Motif::Error,
            Motif::ConnectionLost,
            Motif::Startup,
        ];
        assert!(all.iter().all(fixed));
        for motif in all {
            assert!(Motif::SELF_TEST.contains(&motif), "{motif:?} missing from self test");
        }
        assert_eq!(Motif::SELF_TEST.len(), all.len());
        assert!(Motif::SELF_TEST.iter().all(fixed));
    }

    #[test]
    fn test_volume_feedback_scales() {
        let quiet = Motif::VolumeFeedback { volume: 0 }.notes()[0];
        let loud = Motif::VolumeFeedback { volume: 100 }.notes()[0];
        assert_eq!((quiet.freq_hz, quiet.duration_ms), (300, 50));
        assert_eq!((loud.freq_hz, loud.duration_ms), (1500, 200));
    }
}
