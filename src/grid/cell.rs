//! Grid cells and the keyer that produces them.
//!
//! A cell is identified by its south-west corner: each coordinate is rounded
//! toward negative infinity onto a multiple of the grid resolution, so
//! `-118.25` lands in `-118.5` and `34.05` in `34.0`.
//!
//! Corners are always derived as `index * resolution` from an integral index.
//! A value within `SNAP_TOLERANCE` of a grid line is treated as lying on it, so
//! keying a corner that was written out and read back (e.g. `-100.30000000000001`
//! at 0.1°) returns the same cell even when the resolution is not a binary fraction.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::error::DataError;

/// Default cell edge in degrees.
pub const HALF_DEGREE: f64 = 0.5;

/// Relative distance (in cells) under which a value snaps onto a grid line.
const SNAP_TOLERANCE: f64 = 1e-9;

/// A grid cell key (rounded-down latitude/longitude corner).
///
/// Equality, hashing and ordering are by bit pattern after `-0.0` is folded
/// into `0.0`, so the type is usable as a `HashMap`/`BTreeMap` key.
#[derive(Debug, Clone, Copy)]
pub struct GridCell {
    latitude: f64,
    longitude: f64,
}

impl GridCell {
    /// Build a cell key from already-bucketed coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        // `x + 0.0` turns -0.0 into +0.0 and leaves everything else unchanged.
        Self {
            latitude: latitude + 0.0,
            longitude: longitude + 0.0,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl PartialEq for GridCell {
    fn eq(&self, other: &Self) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits() && self.longitude.to_bits() == other.longitude.to_bits()
    }
}

impl Eq for GridCell {}

impl Hash for GridCell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.latitude.to_bits().hash(state);
        self.longitude.to_bits().hash(state);
    }
}

impl PartialOrd for GridCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GridCell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.latitude
            .total_cmp(&other.latitude)
            .then_with(|| self.longitude.total_cmp(&other.longitude))
    }
}

impl std::fmt::Display for GridCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2})", self.latitude, self.longitude)
    }
}

/// Rounds raw coordinates onto the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridKeyer {
    resolution: f64,
}

impl Default for GridKeyer {
    fn default() -> Self {
        Self {
            resolution: HALF_DEGREE,
        }
    }
}

impl GridKeyer {
    pub fn new(resolution: f64) -> Result<Self, DataError> {
        if !(resolution.is_finite() && resolution > 0.0) {
            return Err(DataError::InvalidRange(format!(
                "grid resolution must be finite and > 0, got {resolution}"
            )));
        }
        Ok(Self { resolution })
    }

    /// Integral cell index of a coordinate (as `f64`, so huge inputs cannot wrap).
    pub fn index(&self, coordinate: f64) -> f64 {
        let q = coordinate / self.resolution;
        let nearest = q.round();
        if (q - nearest).abs() <= SNAP_TOLERANCE * nearest.abs().max(1.0) {
            nearest
        } else {
            q.floor()
        }
    }

    /// Round a single coordinate down to the nearest grid boundary.
    pub fn bucket(&self, coordinate: f64) -> f64 {
        self.index(coordinate) * self.resolution
    }

    /// Key a coordinate pair. No bounds checking is applied.
    pub fn key(&self, latitude: f64, longitude: f64) -> GridCell {
        GridCell::new(self.bucket(latitude), self.bucket(longitude))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn rounds_down_toward_negative_infinity() {
        let keyer = GridKeyer::default();
        let cell = keyer.key(34.05, -118.25);
        assert_eq!(cell, GridCell::new(34.0, -118.5));
        assert_eq!(keyer.bucket(-0.1), -0.5);
        assert_eq!(keyer.bucket(0.49), 0.0);
        assert_eq!(keyer.bucket(0.5), 0.5);
    }

    #[test]
    fn same_cell_coordinates_collide() {
        let keyer = GridKeyer::default();
        let mut cells = HashSet::new();
        for (lat, lon) in [(40.01, -120.99), (40.49, -120.51), (40.25, -120.75)] {
            cells.insert(keyer.key(lat, lon));
        }
        assert_eq!(cells.len(), 1);
        assert!(cells.contains(&GridCell::new(40.0, -121.0)));
    }

    #[test]
    fn negative_zero_is_the_same_key() {
        let keyer = GridKeyer::default();
        // floor(-0.0 / 0.5) * 0.5 is -0.0
        let a = keyer.key(-0.0, 10.2);
        let b = keyer.key(0.2, 10.2);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn bucketing_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(7);
        for resolution in [0.5, 0.25, 0.1, 0.2, 0.3, 0.05] {
            let keyer = GridKeyer::new(resolution).unwrap();
            for _ in 0..1_000 {
                let lat = rng.gen_range(-90.0..90.0);
                let lon = rng.gen_range(-180.0..180.0);
                let cell = keyer.key(lat, lon);
                assert_eq!(keyer.key(cell.latitude(), cell.longitude()), cell, "r={resolution} cell={cell:?}");
                assert!(cell.latitude() <= lat + 1e-9 && lat < cell.latitude() + resolution);
                assert!(cell.longitude() <= lon + 1e-9 && lon < cell.longitude() + resolution);
            }
        }
    }

    #[test]
    fn every_tenth_degree_corner_keys_to_itself() {
        let keyer = GridKeyer::new(0.1).unwrap();
        for i in -1800..1800 {
            // Midpoint of cell `i`, as a raw coordinate.
            let raw = (f64::from(i) + 0.5) / 10.0;
            let corner = keyer.bucket(raw);
            assert_eq!(keyer.bucket(corner).to_bits(), corner.to_bits(), "raw={raw} corner={corner}");
            assert_eq!(keyer.index(corner), f64::from(i), "raw={raw}");
        }
        // Written by an earlier run as `-100.30000000000001`.
        assert_eq!(keyer.key(34.05, -100.25), keyer.key(34.0, -100.30000000000001));
    }

    #[test]
    fn huge_coordinates_bucket_to_infinity() {
        let keyer = GridKeyer::default();
        assert!(keyer.bucket(f64::MAX).is_infinite());
    }

    #[test]
    fn out_of_range_coordinates_still_key() {
        let keyer = GridKeyer::default();
        assert_eq!(keyer.key(95.3, 200.7), GridCell::new(95.0, 200.5));
    }

    #[test]
    fn rejects_non_positive_resolution() {
        assert!(GridKeyer::new(0.0).is_err());
        assert!(GridKeyer::new(-0.5).is_err());
        assert!(GridKeyer::new(f64::NAN).is_err());
        assert_eq!(GridKeyer::new(0.25).unwrap().key(1.3, 1.3), GridCell::new(1.25, 1.25));
    }

    #[test]
    fn cells_order_by_latitude_then_longitude() {
        let mut cells = vec![
            GridCell::new(35.0, -118.0),
            GridCell::new(34.0, -117.0),
            GridCell::new(34.0, -118.5),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                GridCell::new(34.0, -118.5),
                GridCell::new(34.0, -117.0),
                GridCell::new(35.0, -118.0),
            ]
        );
    }
}
