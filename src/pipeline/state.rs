//! Application state
//!
//! Holds the latest inputs and the analysis published from them. Inputs can
//! be replaced independently; [`AnalyticsState::recompute`] rebuilds the whole
//! bundle and replaces the published one in a single step, so readers holding
//! an [`Arc<ChainAnalysis>`] always see one consistent snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::{ChainAnalysis, ChainAnalyzer};
use crate::config::AnalyticsConfig;
use crate::core::{AnalyticsResult, ChainSnapshot};
use crate::volatility::CloseSeries;

#[derive(Debug, Default)]
pub struct AnalyticsState {
    analyzer: ChainAnalyzer,
    snapshot: Option<ChainSnapshot>,
    closes: CloseSeries,
    volatility_index: Option<f64>,
    published: Option<Arc<ChainAnalysis>>,
}

impl AnalyticsState {
    pub fn new(config: AnalyticsConfig) -> AnalyticsResult<Self> {
        Ok(Self::with_analyzer(ChainAnalyzer::new(config)?))
    }

    pub fn with_analyzer(analyzer: ChainAnalyzer) -> Self {
        Self {
            analyzer,
            snapshot: None,
            closes: CloseSeries::default(),
            volatility_index: None,
            published: None,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        self.analyzer.config()
    }

    /// Swap in a new configuration. The published analysis is kept until the
    /// next recompute.
    pub fn set_config(&mut self, config: AnalyticsConfig) -> AnalyticsResult<()> {
        self.analyzer = ChainAnalyzer::new(config)?;
        Ok(())
    }

    pub fn snapshot(&self) -> Option<&ChainSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn closes(&self) -> &CloseSeries {
        &self.closes
    }

    pub fn update_snapshot(&mut self, snapshot: ChainSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn update_closes(&mut self, closes: CloseSeries) {
        self.closes = closes;
    }

    pub fn set_volatility_index(&mut self, value: Option<f64>) {
        self.volatility_index = value;
    }

    /// Latest published analysis
    pub fn latest(&self) -> Option<Arc<ChainAnalysis>> {
        self.published.clone()
    }

    /// Recompute from the current inputs and publish the result.
    ///
    /// Returns `None` (keeping the previous bundle) when no snapshot has been
    /// loaded yet.
    pub fn recompute(&mut self, now: DateTime<Utc>) -> Option<Arc<ChainAnalysis>> {
        let snapshot = self.snapshot.as_ref()?;
        let analysis = Arc::new(
            self.analyzer
                .analyze(snapshot, &self.closes, self.volatility_index, now),
        );
        self.published = Some(Arc::clone(&analysis));
        debug!(strikes = analysis.rows.len(), "published chain analysis");
        Some(analysis)
    }

    /// Replace snapshot and closes, then recompute
    pub fn refresh(
        &mut self,
        snapshot: ChainSnapshot,
        closes: CloseSeries,
        now: DateTime<Utc>,
    ) -> Arc<ChainAnalysis> {
        let analysis = Arc::new(self.analyzer.analyze(&snapshot, &closes, self.volatility_index, now));
        self.snapshot = Some(snapshot);
        self.closes = closes;
        self.published = Some(Arc::clone(&analysis));
        analysis
    }

    /// Drop all inputs and the published analysis
    pub fn clear(&mut self) {
        self.snapshot = None;
        self.closes = CloseSeries::default();
        self.volatility_index = None;
        self.published = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Expiry, Quote, StrikeRow, Underlying};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 4, 0, 0).unwrap()
    }

    fn snapshot(spot: f64) -> ChainSnapshot {
        let rows = vec![
            StrikeRow::new(95.0, Some(Quote::new(6.8, 100, 10)), Some(Quote::new(1.2, 400, 10))),
            StrikeRow::new(100.0, Some(Quote::new(3.5, 300, 10)), Some(Quote::new(3.0, 300, 10))),
            StrikeRow::new(105.0, Some(Quote::new(1.4, 500, 10)), Some(Quote::new(6.2, 100, 10))),
        ];
        ChainSnapshot::new(
            Underlying::new("TEST", spot),
            Expiry::from_datetime(now() + chrono::Duration::days(10)),
            rows,
        )
        .unwrap()
    }

    #[test]
    fn test_recompute_requires_snapshot() {
        let mut state = AnalyticsState::default();
        assert!(state.recompute(now()).is_none());
        assert!(state.latest().is_none());
    }

    #[test]
    fn test_published_bundle_is_stable() {
        let mut state = AnalyticsState::default();
        state.update_snapshot(snapshot(100.0));
        let first = state.recompute(now()).unwrap();
        assert_eq!(first.spot(), 100.0);

        let second = state.refresh(snapshot(104.0), CloseSeries::default(), now());
        assert_eq!(first.spot(), 100.0);
        assert_eq!(second.spot(), 104.0);
        assert!(Arc::ptr_eq(&state.latest().unwrap(), &second));
    }

    #[test]
    fn test_volatility_index_applied() {
        let mut state = AnalyticsState::default();
        state.update_snapshot(snapshot(100.0));
        state.set_volatility_index(Some(25.0));
        let analysis = state.recompute(now()).unwrap();
        assert_eq!(analysis.market.volatility_index, 25.0);
    }

    #[test]
    fn test_config_swap_and_clear() {
        let mut state = AnalyticsState::new(AnalyticsConfig::aggressive()).unwrap();
        assert_eq!(state.config().signals.threshold_pct, 5.0);

        let mut bad = AnalyticsConfig::default();
        bad.pricing.days_per_year = 0.0;
        assert!(state.set_config(bad).is_err());
        assert_eq!(state.config().signals.threshold_pct, 5.0);

        state.update_snapshot(snapshot(100.0));
        state.recompute(now());
        state.clear();
        assert!(state.latest().is_none());
        assert!(state.snapshot().is_none());
    }
}
