//! Linear trend forecasting per grid cell and cause.
//!
//! For each cause series of a cell, independently:
//! 1. find the peak calendar month
//! 2. regress acreage on `(year, |month - peak|)` over every historical month
//! 3. evaluate the model for every month of the horizon, clamping at zero
//!
//! Months where all three clamped predictions are zero are not emitted.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::aggregate::CellTimeSeries;
use crate::domain::{Cause, PredictionRecord};
use crate::error::DataError;
use crate::forecast::{months_from_peak, peak_month};
use crate::grid::{GridCell, TimeIndex};
use crate::math::{LinearModel, fit_linear};

/// The fitted trend for one (cell, cause) series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CauseTrend {
    pub cause: Cause,
    pub peak_month: u32,
    pub model: LinearModel<2>,
}

impl CauseTrend {
    /// Clamped prediction for a calendar month.
    pub fn predict(&self, year: i32, month: u32) -> f64 {
        let y = self
            .model
            .predict(&[f64::from(year), months_from_peak(month, self.peak_month)]);
        // Also folds -0.0 and NaN into 0.0.
        if y > 0.0 { y } else { 0.0 }
    }
}

/// Forecast for one cell: the three trends plus the projected dense series.
#[derive(Debug, Clone)]
pub struct CellForecast {
    pub cell: GridCell,
    pub trends: [CauseTrend; 3],
    /// Projected acreage over the horizon (same layout as the history series).
    pub projected: CellTimeSeries,
}

impl CellForecast {
    /// Non-empty horizon months as flat rows, in time order.
    pub fn records(&self) -> Result<Vec<PredictionRecord>, DataError> {
        let mut out = Vec::new();
        for offset in 0..self.projected.len() {
            let row = self.projected.row(self.cell, offset)?;
            if !row.is_empty() {
                out.push(row);
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forecaster {
    history: TimeIndex,
    horizon: TimeIndex,
}

impl Forecaster {
    pub fn new(history: TimeIndex, horizon: TimeIndex) -> Self {
        Self { history, horizon }
    }

    /// Fit the trend for one history-aligned series.
    pub fn fit_trend(&self, cell: GridCell, cause: Cause, series: &[f64]) -> Result<CauseTrend, DataError> {
        let fit_error = || DataError::Fit {
            latitude: cell.latitude(),
            longitude: cell.longitude(),
            cause,
        };
        if series.len() != self.history.len() {
            return Err(fit_error());
        }

        let peak = peak_month(series);
        let features: Vec<[f64; 2]> = self
            .history
            .months()
            .map(|ym| [f64::from(ym.year), months_from_peak(ym.month, peak)])
            .collect();

        let model = fit_linear(&features, series).ok_or_else(fit_error)?;
        Ok(CauseTrend {
            cause,
            peak_month: peak,
            model,
        })
    }

    /// Fit and project all three causes of a cell.
    pub fn forecast_cell(&self, cell: GridCell, series: &CellTimeSeries) -> Result<CellForecast, DataError> {
        let aligned;
        let series = if series.index() == self.history {
            series
        } else {
            aligned = series.reindex(self.history)?;
            &aligned
        };

        let trends = [
            self.fit_trend(cell, Cause::Natural, series.series(Cause::Natural))?,
            self.fit_trend(cell, Cause::Human, series.series(Cause::Human))?,
            self.fit_trend(cell, Cause::Unknown, series.series(Cause::Unknown))?,
        ];

        let mut projected = CellTimeSeries::new(self.horizon);
        for (offset, ym) in self.horizon.months().enumerate() {
            for trend in &trends {
                projected.add_at(trend.cause, offset, trend.predict(ym.year, ym.month));
            }
        }

        Ok(CellForecast {
            cell,
            trends,
            projected,
        })
    }

    /// Forecast every cell and flatten to prediction rows.
    ///
    /// Cells are independent, so they are fitted in parallel. Output is ordered
    /// by cell, then year, then month.
    pub fn forecast(&self, cells: &BTreeMap<GridCell, CellTimeSeries>) -> Result<Vec<PredictionRecord>, DataError> {
        let cells: Vec<(&GridCell, &CellTimeSeries)> = cells.iter().collect();
        let per_cell: Vec<Vec<PredictionRecord>> = cells
            .par_iter()
            .map(|(cell, series)| self.forecast_cell(**cell, series)?.records())
            .collect::<Result<_, _>>()?;

        Ok(per_cell.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn history() -> TimeIndex {
        TimeIndex::new(2010, 2014).unwrap()
    }

    fn horizon() -> TimeIndex {
        TimeIndex::new(2015, 2017).unwrap()
    }

    fn cell() -> GridCell {
        GridCell::new(34.0, -118.5)
    }

    #[test]
    fn constant_history_projects_flat() {
        let mut series = CellTimeSeries::new(history());
        for ym in history().months() {
            series.add(Cause::Natural, ym.year, ym.month, 10.0).unwrap();
        }

        let forecaster = Forecaster::new(history(), horizon());
        let forecast = forecaster.forecast_cell(cell(), &series).unwrap();

        let natural = forecast.trends[0];
        assert!(natural.model.coefficients[0].abs() < 1e-9);
        assert!((natural.model.intercept - 10.0).abs() < 1e-9);

        let records = forecast.records().unwrap();
        assert_eq!(records.len(), horizon().len());
        for r in &records {
            assert!((r.natural_acres_burned - 10.0).abs() < 1e-9);
            assert_eq!(r.human_acres_burned, 0.0);
            assert_eq!(r.unknown_acres_burned, 0.0);
        }
        assert_eq!((records[0].year, records[0].month), (2015, 1));
        assert_eq!((records[35].year, records[35].month), (2017, 12));
    }

    #[test]
    fn zero_history_emits_nothing() {
        let series = CellTimeSeries::new(history());
        let forecaster = Forecaster::new(history(), horizon());
        let forecast = forecaster.forecast_cell(cell(), &series).unwrap();
        for trend in &forecast.trends {
            assert_eq!(trend.model.intercept, 0.0);
            assert_eq!(trend.model.coefficients, [0.0, 0.0]);
        }
        assert!(forecast.records().unwrap().is_empty());
    }

    #[test]
    fn declining_trend_is_clamped_at_zero() {
        let mut series = CellTimeSeries::new(history());
        for ym in history().months() {
            let acres = f64::from(2014 - ym.year) * 100.0;
            series.add(Cause::Human, ym.year, ym.month, acres).unwrap();
        }

        let forecaster = Forecaster::new(history(), horizon());
        let forecast = forecaster.forecast_cell(cell(), &series).unwrap();
        assert!(forecast.trends[1].model.coefficients[0] < 0.0);
        assert!(forecast.projected.series(Cause::Human).iter().all(|v| *v == 0.0));
        assert!(forecast.records().unwrap().is_empty());
    }

    #[test]
    fn seasonal_peak_drives_projection_shape() {
        let mut series = CellTimeSeries::new(history());
        for ym in history().months() {
            let acres = 120.0 - 10.0 * months_from_peak(ym.month, 8);
            series.add(Cause::Natural, ym.year, ym.month, acres).unwrap();
        }

        let forecaster = Forecaster::new(history(), horizon());
        let forecast = forecaster.forecast_cell(cell(), &series).unwrap();
        assert_eq!(forecast.trends[0].peak_month, 8);

        let aug = forecast.projected.get(Cause::Natural, 2016, 8).unwrap();
        let jan = forecast.projected.get(Cause::Natural, 2016, 1).unwrap();
        assert!((aug - 120.0).abs() < 1e-6, "aug={aug}");
        assert!((jan - 50.0).abs() < 1e-6, "jan={jan}");
    }

    #[test]
    fn causes_are_fitted_independently() {
        let mut series = CellTimeSeries::new(history());
        for ym in history().months() {
            series.add(Cause::Natural, ym.year, ym.month, if ym.month == 7 { 30.0 } else { 1.0 }).unwrap();
            series.add(Cause::Unknown, ym.year, ym.month, if ym.month == 2 { 9.0 } else { 0.5 }).unwrap();
        }
        let forecast = Forecaster::new(history(), horizon()).forecast_cell(cell(), &series).unwrap();
        assert_eq!(forecast.trends[0].peak_month, 7);
        assert_eq!(forecast.trends[2].peak_month, 2);
        // Human history is empty, so its projection stays at zero.
        assert_eq!(forecast.projected.total(Cause::Human), 0.0);
    }

    #[test]
    fn only_observed_cells_are_forecast() {
        let mut cells = BTreeMap::new();
        let mut series = CellTimeSeries::new(history());
        series.add(Cause::Natural, 2012, 7, 100.0).unwrap();
        cells.insert(cell(), series);

        let records = Forecaster::new(history(), horizon()).forecast(&cells).unwrap();
        assert!(!records.is_empty());
        assert!(records.iter().all(|r| r.latitude == 34.0 && r.longitude == -118.5));
    }

    #[test]
    fn random_histories_never_produce_negative_or_empty_rows() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut cells = BTreeMap::new();
        for i in 0..40_i32 {
            let mut series = CellTimeSeries::new(history());
            for _ in 0..rng.gen_range(0..30) {
                let year = rng.gen_range(2010..=2014);
                let month = rng.gen_range(1..=12);
                let cause = Cause::ALL[rng.gen_range(0..3)];
                series.add(cause, year, month, rng.gen_range(0.0..500.0)).unwrap();
            }
            cells.insert(GridCell::new(f64::from(i) * 0.5, -100.0), series);
        }

        let forecaster = Forecaster::new(history(), horizon());
        let records = forecaster.forecast(&cells).unwrap();
        for r in &records {
            assert!(r.natural_acres_burned >= 0.0);
            assert!(r.human_acres_burned >= 0.0);
            assert!(r.unknown_acres_burned >= 0.0);
            assert!(!r.is_empty());
            assert!(horizon().contains(r.year, r.month));
        }

        let mut sorted = records.clone();
        sorted.sort_by(|a, b| {
            a.latitude
                .total_cmp(&b.latitude)
                .then(a.year.cmp(&b.year))
                .then(a.month.cmp(&b.month))
        });
        assert_eq!(records, sorted);
    }

    #[test]
    fn misaligned_series_is_reindexed() {
        let mut series = CellTimeSeries::new(TimeIndex::new(2011, 2013).unwrap());
        for ym in TimeIndex::new(2011, 2013).unwrap().months() {
            series.add(Cause::Natural, ym.year, ym.month, 4.0).unwrap();
        }
        let forecast = Forecaster::new(history(), horizon()).forecast_cell(cell(), &series).unwrap();
        assert_eq!(forecast.trends[0].peak_month, 1);
        assert!(forecast.projected.total(Cause::Natural) > 0.0);
    }
}
