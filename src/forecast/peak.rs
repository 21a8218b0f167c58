//! Peak fire month detection.

use crate::grid::MONTHS_PER_YEAR;

/// Sum a January-aligned monthly series into 12 calendar-month buckets.
pub fn monthly_totals(series: &[f64]) -> [f64; MONTHS_PER_YEAR] {
    let mut totals = [0.0; MONTHS_PER_YEAR];
    for (offset, acres) in series.iter().enumerate() {
        totals[offset % MONTHS_PER_YEAR] += acres;
    }
    totals
}

/// The calendar month (1–12) with the largest summed acreage.
///
/// Ties go to the earliest month, so an all-zero series peaks in January.
pub fn peak_month(series: &[f64]) -> u32 {
    let totals = monthly_totals(series);
    let mut best = 0;
    for (month, total) in totals.iter().enumerate().skip(1) {
        if *total > totals[best] {
            best = month;
        }
    }
    best as u32 + 1
}

/// Seasonality feature: distance in months from the peak month.
pub fn months_from_peak(month: u32, peak: u32) -> f64 {
    f64::from(month.abs_diff(peak))
}
