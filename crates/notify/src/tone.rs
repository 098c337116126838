use folio_core::alert::entity::Direction;
use folio_core::notify::entity::{Cue, Motif, Tone};
use folio_core::portfolio::entity::TrackingMode;
use folio_core::settings::entity::BuzzerSettings;

/// Below this volume a note becomes a train of short pulses.
pub const PULSE_BELOW: u8 = 30;
/// From this volume upward the note plays at full length.
pub const FULL_FROM: u8 = 70;
const PULSE_SLOT_MS: u32 = 30;
const PULSE_ON_MS: u32 = 20;

/// # Summary
/// Motif for an alert, total over every `(mode, direction, severity)`.
pub fn select_motif(mode: TrackingMode, direction: Direction, severe: bool) -> Motif {
    match (mode, direction.is_favourable()) {
        (TrackingMode::Entry, true) => Motif::EntryLong { severe },
        (TrackingMode::Entry, false) => Motif::EntryShort { severe },
        (TrackingMode::Exit, true) => Motif::ExitProfit,
        (TrackingMode::Exit, false) => Motif::ExitLoss,
    }
}

/// # Summary
/// Applies the buzzer settings to a motif.
///
/// # Logic
/// 1. Disabled buzzer or volume 0: nothing plays.
/// 2. Each note's audible length scales to `volume x duration / 100`.
/// 3. Volume below 30 splits that length into 20 ms pulses every 30 ms;
///    30 to 69 plays one shortened tone; 70 and above plays the full note.
/// 4. `VolumeFeedback` already encodes the volume and is not shaped again.
///
/// # Returns
/// `None` when nothing would be audible.
pub fn shape(motif: Motif, buzzer: &BuzzerSettings) -> Option<Cue> {
    let volume = buzzer.volume.min(100);
    if !buzzer.enabled || volume == 0 {
        return None;
    }

    let mut tones = Vec::new();
    for note in motif.notes() {
        if matches!(motif, Motif::VolumeFeedback { .. }) || volume >= FULL_FROM {
            tones.push(Tone {
                freq_hz: note.freq_hz,
                duration_ms: note.duration_ms,
                pause_ms: note.rest_ms,
            });
            continue;
        }

        let actual = u32::from(volume) * note.duration_ms / 100;
        if actual == 0 {
            continue;
        }
        if volume < PULSE_BELOW {
            let pulses = actual / PULSE_SLOT_MS;
            for i in 0..pulses {
                let last = i + 1 == pulses;
                tones.push(Tone {
                    freq_hz: note.freq_hz,
                    duration_ms: PULSE_ON_MS,
                    pause_ms: if last {
                        note.rest_ms
                    } else {
                        PULSE_SLOT_MS - PULSE_ON_MS
                    },
                });
            }
        } else {
            tones.push(Tone {
                freq_hz: note.freq_hz,
                duration_ms: actual,
                pause_ms: note.rest_ms,
            });
        }
    }

    if tones.is_empty() {
        return None;
    }
    Some(Cue { motif, volume, tones })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buzzer(volume: u8) -> BuzzerSettings {
        BuzzerSettings { enabled: true, volume }
    }

    #[test]
    fn test_motif_selection_is_total() {
        use Direction::*;
        for mode in [TrackingMode::Entry, TrackingMode::Exit] {
            for dir in [Long, Short, Profit, Loss] {
                for severe in [false, true] {
                    let _ = select_motif(mode, dir, severe);
                }
            }
        }
        assert_eq!(
            select_motif(TrackingMode::Entry, Short, true),
            Motif::EntryShort { severe: true }
        );
        assert_eq!(select_motif(TrackingMode::Exit, Profit, true), Motif::ExitProfit);
        assert_eq!(select_motif(TrackingMode::Exit, Loss, false), Motif::ExitLoss);
    }

    #[test]
    fn test_muted_plays_nothing() {
        assert!(shape(Motif::Startup, &buzzer(0)).is_none());
        assert!(shape(Motif::VolumeFeedback { volume: 0 }, &buzzer(0)).is_none());
        let disabled = BuzzerSettings {
            enabled: false,
            volume: 80,
        };
        assert!(shape(Motif::Success, &disabled).is_none());
    }

    #[test]
    fn test_low_volume_pulses() {
        // 20% of 300 ms = 60 ms -> two 20 ms pulses.
        let cue = shape(Motif::ExitLoss, &buzzer(20)).unwrap();
        assert_eq!(cue.tones.len(), 2);
        assert!(cue.tones.iter().all(|t| t.duration_ms == 20));
        assert_eq!(cue.tones[0].pause_ms, 10);
        assert_eq!(cue.tones[1].pause_ms, 350);
    }

    #[test]
    fn test_mid_volume_shortens() {
        let cue = shape(Motif::ExitLoss, &buzzer(50)).unwrap();
        assert_eq!(cue.tones.len(), 1);
        assert_eq!(cue.tones[0].duration_ms, 150);
    }

    #[test]
    fn test_high_volume_full_length() {
        let cue = shape(Motif::ExitLoss, &buzzer(70)).unwrap();
        assert_eq!(cue.tones[0].duration_ms, 300);
    }

    #[test]
    fn test_very_low_volume_can_be_silent() {
        // 1% of 100 ms = 1 ms, no full pulse fits.
        assert!(shape(Motif::Reset, &buzzer(1)).is_none());
    }
}
