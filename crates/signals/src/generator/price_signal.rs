//! Price signal engine.
//!
//! Derives BUY/SELL/HOLD from the latest change percent of a symbol.
//! Volume change is computed for reporting and never affects the action.

use fintech_monitor_core::{MonitorError, PriceAction, PriceSignal};
use fintech_monitor_data::PriceObservation;

/// Observations needed before a signal can be derived.
pub const MIN_OBSERVATIONS: usize = 2;

/// Strength given to a HOLD when the move is below the threshold.
pub const HOLD_STRENGTH: f64 = 0.3;

#[derive(Debug, Clone, Copy)]
pub struct PriceSignalEngine {
    threshold: f64,
}

impl Default for PriceSignalEngine {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl PriceSignalEngine {
    /// # Arguments
    /// * `threshold` - Absolute percent move above which the signal is directional
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Derives a signal from newest-first observations.
    ///
    /// # Errors
    /// Returns [`MonitorError::InsufficientData`] with fewer than two observations.
    pub fn try_evaluate(
        &self,
        symbol: &str,
        observations: &[PriceObservation],
    ) -> Result<PriceSignal, MonitorError> {
        let (latest, previous) = match observations {
            [latest, previous, ..] => (latest, previous),
            _ => {
                return Err(MonitorError::insufficient_data(
                    symbol,
                    MIN_OBSERVATIONS,
                    observations.len(),
                ))
            }
        };

        let delta = latest.change_percent;
        let (action, strength, reason) = if delta.abs() > self.threshold {
            if delta > 0.0 {
                (
                    PriceAction::Buy,
                    (delta.abs() / 10.0).min(1.0),
                    format!("Strong upward movement: +{delta:.2}%"),
                )
            } else {
                (
                    PriceAction::Sell,
                    (delta.abs() / 10.0).min(1.0),
                    format!("Strong downward movement: {delta:.2}%"),
                )
            }
        } else {
            (
                PriceAction::Hold,
                HOLD_STRENGTH,
                format!("Price stable at {delta:+.2}%"),
            )
        };

        Ok(PriceSignal {
            symbol: symbol.to_string(),
            action,
            strength,
            price_change: Some(delta),
            volume_change: volume_change_percent(latest.volume, previous.volume),
            latest_price: Some(latest.price),
            reason,
        })
    }

    /// Like [`Self::try_evaluate`], resolving insufficient data to HOLD with zero strength.
    #[must_use]
    pub fn evaluate(&self, symbol: &str, observations: &[PriceObservation]) -> PriceSignal {
        self.try_evaluate(symbol, observations)
            .unwrap_or_else(|_| PriceSignal::insufficient(symbol))
    }
}

/// Percent change from `previous` to `latest`, 0 when `previous` is 0.
#[must_use]
pub fn volume_change_percent(latest: i64, previous: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    (latest - previous) as f64 / previous as f64 * 100.0
}
