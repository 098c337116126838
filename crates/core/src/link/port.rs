use crate::link::entity::StationStatus;
use crate::settings::entity::NetworkProfile;

/// # Summary
/// Station and access-point radio, driven only by the connectivity manager.
///
/// # Invariants
/// - No method blocks beyond the radio's own bounded command latency; an
///   association attempt is started here and observed through `station_status`.
pub trait Radio: Send {
    /// Drops any station link and starts joining `profile`.
    fn begin_association(&mut self, profile: &NetworkProfile);

    /// Current station link.
    fn station_status(&self) -> StationStatus;

    /// Starts the local access point, alongside the station when
    /// `keep_station` is set.
    ///
    /// # Returns
    /// Whether the access point is up.
    fn start_access_point(&mut self, keep_station: bool) -> bool;

    /// Stops the local access point if it is running.
    fn stop_access_point(&mut self);
}
