use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Weight of the previous average in the smoothed response time.
const SMOOTHING: f64 = 0.9;

/// # Summary
/// Running counters over snapshot fetches.
///
/// # Invariants
/// - `avg_response_ms` is `None` until the first sample, then an exponential
///   average (0.9 old, 0.1 new) over every attempt, failed ones included.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct FetchStats {
    pub success_count: u64,
    pub error_count: u64,
    pub avg_response_ms: Option<f64>,
    pub last_error: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl FetchStats {
    pub fn record_success(&mut self, elapsed_ms: u64, at: DateTime<Utc>) {
        self.success_count += 1;
        self.sample(elapsed_ms, at);
    }

    pub fn record_error(&mut self, reason: impl Into<String>, elapsed_ms: u64, at: DateTime<Utc>) {
        self.error_count += 1;
        self.last_error = Some(reason.into());
        self.sample(elapsed_ms, at);
    }

    fn sample(&mut self, elapsed_ms: u64, at: DateTime<Utc>) {
        let sample = u32::try_from(elapsed_ms).map(f64::from).unwrap_or(f64::from(u32::MAX));
        self.avg_response_ms = Some(match self.avg_response_ms {
            None => sample,
            Some(avg) => avg * SMOOTHING + sample * (1.0 - SMOOTHING),
        });
        self.last_attempt_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_seeds_average() {
        let now = Utc::now();
        let mut stats = FetchStats::default();
        stats.record_success(200, now);
        assert_eq!(stats.avg_response_ms, Some(200.0));

        stats.record_error("timeout", 1200, now);
        let avg = stats.avg_response_ms.unwrap();
        assert!((avg - 300.0).abs() < 1e-9);
        assert_eq!(stats.success_count, 1);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.last_error.as_deref(), Some("timeout"));
    }
}
