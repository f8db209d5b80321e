//! Debt forecasting.
//!
//! The coach consumes forecasts through the [`Forecaster`] trait so the
//! projection model can be swapped without touching the recommendation
//! pipeline. The default [`TrendForecaster`] fits a least-squares line to
//! the recent daily debt series and extrapolates it forward.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::coach::context::DebtForecast;

/// Projection model over a chronological daily debt series (hours per day,
/// oldest first).
pub trait Forecaster {
    /// Predicted debt for the next day, in seconds, or `None` when the
    /// series is too short to project from.
    fn predict(&self, daily_debt_hours: &[f64]) -> Option<f64>;

    /// Per-day projections for the `days` days after `from`, in minutes.
    ///
    /// Models that only produce a point estimate can rely on this default
    /// and report no per-day outlook.
    fn forecast_days(
        &self,
        from: NaiveDate,
        days: u32,
        daily_debt_hours: &[f64],
    ) -> Vec<DebtForecast> {
        let _ = (from, days, daily_debt_hours);
        Vec::new()
    }
}

/// Forecaster that always declines to predict.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullForecaster;

impl Forecaster for NullForecaster {
    fn predict(&self, _daily_debt_hours: &[f64]) -> Option<f64> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Minimum series length before a projection is attempted.
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_points: default_min_points(),
        }
    }
}

/// Linear-trend forecaster.
///
/// Fits `debt = slope * day_index + intercept` by ordinary least squares
/// over the observed series and evaluates the line at future indices.
/// Projections are clamped at zero; debt cannot go negative.
#[derive(Debug, Clone, Default)]
pub struct TrendForecaster {
    config: ForecastConfig,
}

impl TrendForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Least-squares `(slope, intercept)` over `(index, value)` points.
    fn fit(&self, values: &[f64]) -> Option<(f64, f64)> {
        let n = values.len();
        if n < self.config.min_points.max(2) {
            return None;
        }
        let n_f = n as f64;
        let mean_x = (n_f - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n_f;
        let mut sxx = 0.0;
        let mut sxy = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxx += dx * dx;
            sxy += dx * (y - mean_y);
        }
        let slope = sxy / sxx;
        Some((slope, mean_y - slope * mean_x))
    }

    /// Line value at `index`, clamped at zero.
    fn value_at(slope: f64, intercept: f64, index: f64) -> f64 {
        (slope * index + intercept).max(0.0)
    }
}

impl Forecaster for TrendForecaster {
    fn predict(&self, daily_debt_hours: &[f64]) -> Option<f64> {
        let (slope, intercept) = self.fit(daily_debt_hours)?;
        let next_index = daily_debt_hours.len() as f64;
        Some(Self::value_at(slope, intercept, next_index) * 3600.0)
    }

    fn forecast_days(
        &self,
        from: NaiveDate,
        days: u32,
        daily_debt_hours: &[f64],
    ) -> Vec<DebtForecast> {
        let Some((slope, intercept)) = self.fit(daily_debt_hours) else {
            return Vec::new();
        };
        let last_index = daily_debt_hours.len() as f64 - 1.0;
        (1..=days)
            .map(|ahead| DebtForecast {
                day: from + Days::new(u64::from(ahead)),
                debt_minutes: Self::value_at(slope, intercept, last_index + f64::from(ahead))
                    * 60.0,
            })
            .collect()
    }
}

fn default_min_points() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    #[test]
    fn test_short_series_declines() {
        let f = TrendForecaster::new();
        assert_eq!(f.predict(&[]), None);
        assert_eq!(f.predict(&[1.0, 2.0]), None);
        assert!(f.forecast_days(day(1), 3, &[1.0, 2.0]).is_empty());
    }

    #[test]
    fn test_flat_series_predicts_same_level() {
        let f = TrendForecaster::new();
        let predicted = f.predict(&[2.0, 2.0, 2.0]).unwrap();
        assert!((predicted - 7200.0).abs() < EPS);
    }

    #[test]
    fn test_rising_series_extrapolates() {
        let f = TrendForecaster::new();
        // Perfect line through 1, 2, 3 continues at 4 hours
        let predicted = f.predict(&[1.0, 2.0, 3.0]).unwrap();
        assert!((predicted - 4.0 * 3600.0).abs() < 1e-6);
    }

    #[test]
    fn test_falling_series_clamps_at_zero() {
        let f = TrendForecaster::new();
        let predicted = f.predict(&[3.0, 2.0, 1.0, 0.0]).unwrap();
        assert!((predicted - 0.0).abs() < EPS);
    }

    #[test]
    fn test_forecast_days_walks_the_line() {
        let f = TrendForecaster::new();
        let forecasts = f.forecast_days(day(10), 2, &[1.0, 2.0, 3.0]);
        assert_eq!(forecasts.len(), 2);
        assert_eq!(forecasts[0].day, day(11));
        assert!((forecasts[0].debt_minutes - 240.0).abs() < 1e-6);
        assert_eq!(forecasts[1].day, day(12));
        assert!((forecasts[1].debt_minutes - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_min_points_is_configurable() {
        let f = TrendForecaster::with_config(ForecastConfig { min_points: 5 });
        assert_eq!(f.predict(&[1.0, 2.0, 3.0, 4.0]), None);
        assert!(f.predict(&[1.0, 2.0, 3.0, 4.0, 5.0]).is_some());
    }

    #[test]
    fn test_null_forecaster() {
        let f = NullForecaster;
        assert_eq!(f.predict(&[5.0, 5.0, 5.0, 5.0]), None);
        assert!(f.forecast_days(day(1), 3, &[5.0; 4]).is_empty());
    }

    #[test]
    fn test_trait_object_dispatch() {
        let f: Box<dyn Forecaster> = Box::new(TrendForecaster::new());
        assert!(f.predict(&[1.0, 1.5, 2.0]).is_some());
    }
}
