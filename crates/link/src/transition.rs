use chrono::{DateTime, Utc};
use folio_core::link::entity::{ConnectivityState, LinkEvent};
use folio_core::link::error::LinkError;

/// # Summary
/// Internal phase of the state machine; carries the data each state needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkPhase {
    Disconnected,
    Connecting {
        ssid: String,
        since: DateTime<Utc>,
    },
    Connected {
        ssid: String,
    },
    AccessPointOnly,
    AccessPointPlusStation {
        ssid: String,
        station_up: bool,
    },
}

impl LinkPhase {
    pub fn state(&self) -> ConnectivityState {
        match self {
            LinkPhase::Disconnected => ConnectivityState::Disconnected,
            LinkPhase::Connecting { .. } => ConnectivityState::Connecting,
            LinkPhase::Connected { .. } => ConnectivityState::Connected,
            LinkPhase::AccessPointOnly => ConnectivityState::AccessPointOnly,
            LinkPhase::AccessPointPlusStation { .. } => ConnectivityState::AccessPointPlusStation,
        }
    }

    /// Station link usable for data traffic.
    pub fn is_online(&self) -> bool {
        matches!(
            self,
            LinkPhase::Connected { .. } | LinkPhase::AccessPointPlusStation { station_up: true, .. }
        )
    }

    pub fn is_ap_active(&self) -> bool {
        matches!(
            self,
            LinkPhase::AccessPointOnly | LinkPhase::AccessPointPlusStation { .. }
        )
    }
}

/// Observation fed into the transition table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkInput {
    /// Start (or restart) an association attempt on a profile.
    Attempt { ssid: String },
    /// The station reports an association.
    Joined { signal_dbm: Option<i32> },
    /// The association budget ran out.
    Expired,
    /// A previously up station link is down.
    Dropped,
    /// No auto-connect profile is available; fall back to the access point.
    FallBack,
    /// External configuration change; restart from `Disconnected`.
    Reevaluate,
}

impl std::fmt::Display for LinkInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkInput::Attempt { ssid } => write!(f, "attempt({ssid})"),
            LinkInput::Joined { .. } => f.write_str("joined"),
            LinkInput::Expired => f.write_str("expired"),
            LinkInput::Dropped => f.write_str("dropped"),
            LinkInput::FallBack => f.write_str("fallback"),
            LinkInput::Reevaluate => f.write_str("reevaluate"),
        }
    }
}

/// Radio or store command the manager must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    BeginAssociation { ssid: String },
    StartAccessPoint { keep_station: bool },
    StopAccessPoint,
    RecordAssociation { ssid: String, signal_dbm: Option<i32> },
    CountLoss,
}

/// Result of one accepted transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub next: LinkPhase,
    pub effects: Vec<Effect>,
    pub event: Option<LinkEvent>,
}

/// # Summary
/// The complete transition table.
///
/// # Logic
/// | from | input | to |
/// |------|-------|----|
/// | Disconnected | Attempt | Connecting |
/// | Disconnected | FallBack | AccessPointOnly (only with AP fallback) |
/// | Connecting | Joined | AccessPointPlusStation with AP fallback, else Connected |
/// | Connecting | Expired | AccessPointOnly with AP fallback, else Disconnected |
/// | Connected | Dropped | Disconnected |
/// | AccessPointPlusStation (up) | Dropped | same, station marked down |
/// | AccessPointPlusStation (down) | Joined | same, station marked up and annotated |
/// | AccessPointPlusStation (down) | Attempt | same, retry on the profile |
/// | any | Reevaluate | Disconnected |
///
/// # Arguments
/// * `phase` - current phase.
/// * `input` - observation.
/// * `ap_fallback` - whether the access point is desired.
/// * `now` - evaluation time.
///
/// # Returns
/// The step to apply, or `IllegalTransition` for any pair not in the table.
pub fn transition(
    phase: &LinkPhase,
    input: LinkInput,
    ap_fallback: bool,
    now: DateTime<Utc>,
) -> Result<Step, LinkError> {
    let step = match (phase, input) {
        (_, LinkInput::Reevaluate) => Step {
            next: LinkPhase::Disconnected,
            effects: if phase.is_ap_active() {
                vec![Effect::StopAccessPoint]
            } else {
                Vec::new()
            },
            event: None,
        },
        (LinkPhase::Disconnected, LinkInput::Attempt { ssid }) => Step {
            next: LinkPhase::Connecting {
                ssid: ssid.clone(),
                since: now,
            },
            effects: vec![Effect::BeginAssociation { ssid: ssid.clone() }],
            event: Some(LinkEvent::AttemptStarted { ssid }),
        },
        (LinkPhase::Disconnected, LinkInput::FallBack) if ap_fallback => Step {
            next: LinkPhase::AccessPointOnly,
            effects: vec![Effect::StartAccessPoint { keep_station: false }],
            event: Some(LinkEvent::AccessPointStarted),
        },
        (LinkPhase::Connecting { ssid, .. }, LinkInput::Joined { signal_dbm }) => {
            let record = Effect::RecordAssociation {
                ssid: ssid.clone(),
                signal_dbm,
            };
            let (next, radio) = if ap_fallback {
                (
                    LinkPhase::AccessPointPlusStation {
                        ssid: ssid.clone(),
                        station_up: true,
                    },
                    Effect::StartAccessPoint { keep_station: true },
                )
            } else {
                (LinkPhase::Connected { ssid: ssid.clone() }, Effect::StopAccessPoint)
            };
            Step {
                next,
                effects: vec![record, radio],
                event: Some(LinkEvent::Associated {
                    ssid: ssid.clone(),
                    at: now,
                }),
            }
        }
        (LinkPhase::Connecting { .. }, LinkInput::Expired) => {
            if ap_fallback {
                Step {
                    next: LinkPhase::AccessPointOnly,
                    effects: vec![Effect::StartAccessPoint { keep_station: false }],
                    event: Some(LinkEvent::AttemptTimedOut { fallback_to_ap: true }),
                }
            } else {
                Step {
                    next: LinkPhase::Disconnected,
                    effects: Vec::new(),
                    event: Some(LinkEvent::AttemptTimedOut { fallback_to_ap: false }),
                }
            }
        }
        (LinkPhase::Connected { .. }, LinkInput::Dropped) => Step {
            next: LinkPhase::Disconnected,
            effects: vec![Effect::CountLoss],
            event: None,
        },
        (LinkPhase::AccessPointPlusStation { ssid, station_up: true }, LinkInput::Dropped) => Step {
            next: LinkPhase::AccessPointPlusStation {
                ssid: ssid.clone(),
                station_up: false,
            },
            effects: vec![Effect::CountLoss],
            event: None,
        },
        (LinkPhase::AccessPointPlusStation { ssid, station_up: false }, LinkInput::Joined { signal_dbm }) => Step {
            next: LinkPhase::AccessPointPlusStation {
                ssid: ssid.clone(),
                station_up: true,
            },
            effects: vec![Effect::RecordAssociation {
                ssid: ssid.clone(),
                signal_dbm,
            }],
            event: Some(LinkEvent::StationRestored { at: now }),
        },
        (LinkPhase::AccessPointPlusStation { station_up: false, .. }, LinkInput::Attempt { ssid }) => Step {
            next: LinkPhase::AccessPointPlusStation {
                ssid: ssid.clone(),
                station_up: false,
            },
            effects: vec![Effect::BeginAssociation { ssid: ssid.clone() }],
            event: Some(LinkEvent::AttemptStarted { ssid }),
        },
        (from, input) => {
            return Err(LinkError::IllegalTransition {
                from: from.state().to_string(),
                input: input.to_string(),
            });
        }
    };
    Ok(step)
}
