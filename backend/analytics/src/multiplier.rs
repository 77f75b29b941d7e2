//! Display-count multiplier.
//!
//! The backend serves an actual count and a precomputed display count. The
//! ratio between them is applied to other live numbers (readers now) so that
//! everything on a page scales the same way.

use tracing::warn;

use readerstats_core::{ContentId, CountSource, ViewCounts};
use readerstats_logging::{StatsEvent, StatsEventLogger};

/// Presentation multiplier derived from one `(actual, display)` snapshot.
///
/// Always `>= 1.0` and finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMultiplier(f64);

impl DisplayMultiplier {
    /// No inflation.
    pub const NEUTRAL: Self = Self(1.0);

    pub fn from_counts(actual: u64, display: u64) -> Self {
        if actual == 0 {
            return Self::NEUTRAL;
        }
        let ratio = display as f64 / actual as f64;
        if ratio.is_finite() && ratio > 1.0 {
            Self(ratio)
        } else {
            Self::NEUTRAL
        }
    }

    pub fn factor(self) -> f64 {
        self.0
    }

    /// Scale a live count. Zero and one are shown literally.
    pub fn scale_live_count(self, live: u64) -> u64 {
        match live {
            0 => 0,
            1 => 1,
            n => (n as f64 * self.0).round() as u64,
        }
    }
}

impl Default for DisplayMultiplier {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl From<ViewCounts> for DisplayMultiplier {
    fn from(counts: ViewCounts) -> Self {
        Self::from_counts(counts.actual_count, counts.display_count)
    }
}

/// Counts for one page after applying fallbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCounts {
    pub counts: ViewCounts,
    pub multiplier: DisplayMultiplier,
    /// True when the fetch failed and neutral values were substituted.
    pub degraded: bool,
}

impl ResolvedCounts {
    pub fn neutral() -> Self {
        Self {
            counts: ViewCounts::default(),
            multiplier: DisplayMultiplier::NEUTRAL,
            degraded: true,
        }
    }

    /// The count to show. Never below the actual count.
    pub fn display_count(&self) -> u64 {
        self.counts.display_count.max(self.counts.actual_count)
    }

    pub fn scale_live_count(&self, live: u64) -> u64 {
        self.multiplier.scale_live_count(live)
    }
}

/// Fetch counts for `content_id`, degrading to zero counts and a neutral
/// multiplier when the source is unavailable.
pub async fn resolve_counts(source: &dyn CountSource, content_id: &ContentId) -> ResolvedCounts {
    match source.fetch_counts(content_id).await {
        Ok(counts) => ResolvedCounts {
            counts,
            multiplier: counts.into(),
            degraded: false,
        },
        Err(e) => {
            warn!(%content_id, error = %e, "View counts unavailable; using neutral values");
            StatsEventLogger::log_event(
                content_id.as_str(),
                StatsEvent::CountFallback {
                    reason: e.to_string(),
                },
            );
            ResolvedCounts::neutral()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use readerstats_core::{StatsError, StatsResult};

    struct FixedSource(Option<ViewCounts>);

    #[async_trait]
    impl CountSource for FixedSource {
        async fn fetch_counts(&self, _content_id: &ContentId) -> StatsResult<ViewCounts> {
            self.0
                .ok_or_else(|| StatsError::Unavailable("503 Service Unavailable".into()))
        }
    }

    #[test]
    fn test_ratio_and_scaling() {
        let m = DisplayMultiplier::from_counts(10, 25);
        assert_eq!(m.factor(), 2.5);
        assert_eq!(m.scale_live_count(4), 10);
        assert_eq!(m.scale_live_count(3), 8);
    }

    #[test]
    fn test_zero_actual_is_neutral() {
        assert_eq!(DisplayMultiplier::from_counts(0, 40), DisplayMultiplier::NEUTRAL);
        assert_eq!(DisplayMultiplier::from_counts(0, 0), DisplayMultiplier::NEUTRAL);
    }

    #[test]
    fn test_never_reduces() {
        assert_eq!(DisplayMultiplier::from_counts(10, 5), DisplayMultiplier::NEUTRAL);
        assert_eq!(DisplayMultiplier::from_counts(10, 10).scale_live_count(7), 7);
    }

    #[test]
    fn test_zero_and_one_are_literal() {
        for m in [1.0, 1.4, 2.5, 17.0] {
            let mult = DisplayMultiplier(m);
            assert_eq!(mult.scale_live_count(0), 0);
            assert_eq!(mult.scale_live_count(1), 1);
        }
    }

    #[test]
    fn test_monotonic_from_two() {
        for (actual, display) in [(10, 25), (3, 4), (7, 7), (1, 100)] {
            let m = DisplayMultiplier::from_counts(actual, display);
            let mut prev = m.scale_live_count(1);
            for live in 2..200 {
                let scaled = m.scale_live_count(live);
                assert!(scaled >= prev, "{actual}/{display}: live {live}");
                assert!(scaled >= live);
                prev = scaled;
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_counts_success() {
        let source = FixedSource(Some(ViewCounts {
            actual_count: 10,
            display_count: 25,
        }));
        let resolved = resolve_counts(&source, &"abc".into()).await;
        assert!(!resolved.degraded);
        assert_eq!(resolved.display_count(), 25);
        assert_eq!(resolved.scale_live_count(4), 10);
    }

    #[tokio::test]
    async fn test_resolve_counts_falls_back() {
        let resolved = resolve_counts(&FixedSource(None), &"abc".into()).await;
        assert!(resolved.degraded);
        assert_eq!(resolved.display_count(), 0);
        assert_eq!(resolved.multiplier, DisplayMultiplier::NEUTRAL);
        assert_eq!(resolved.scale_live_count(4), 4);
    }

    #[test]
    fn test_display_count_never_below_actual() {
        let resolved = ResolvedCounts {
            counts: ViewCounts {
                actual_count: 12,
                display_count: 3,
            },
            multiplier: DisplayMultiplier::from_counts(12, 3),
            degraded: false,
        };
        assert_eq!(resolved.display_count(), 12);
    }
}
