//! Deterministic synthetic data with drifting periodic signals.
//!
//! The generator produces three related columns (`Sin`, `Cos`, `Tan`) whose
//! amplitudes and frequencies change at two fixed boundaries. It is meant to
//! stand in for a live data source when exercising a forecaster.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::dto::{DataPoint, GeneratorError};

/// Symmetric bound applied to the tangent column.
pub const TAN_CLAMP: f64 = 3.0;

/// Amplitude and frequency tuple shared by every row of one segment.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SegmentParams {
    pub sin_amp: f64,
    pub sin_freq: f64,
    pub cos_amp: f64,
    pub cos_freq: f64,
    pub tan_amp: f64,
    pub tan_freq: f64,
}

/// Parameters for the three consecutive segments, in order.
pub const DRIFT_SEGMENTS: [SegmentParams; 3] = [
    SegmentParams {
        sin_amp: 1.0,
        sin_freq: 0.020,
        cos_amp: 0.6,
        cos_freq: 0.030,
        tan_amp: 0.2,
        tan_freq: 0.006,
    },
    SegmentParams {
        sin_amp: 1.8,
        sin_freq: 0.045,
        cos_amp: 0.3,
        cos_freq: 0.015,
        tan_amp: 0.35,
        tan_freq: 0.012,
    },
    SegmentParams {
        sin_amp: 0.8,
        sin_freq: 0.010,
        cos_amp: 1.2,
        cos_freq: 0.050,
        tan_amp: 0.5,
        tan_freq: 0.004,
    },
];

impl SegmentParams {
    fn sin_at(&self, index: usize) -> f64 {
        self.sin_amp * (2.0 * PI * self.sin_freq * index as f64).sin()
    }

    fn cos_at(&self, index: usize) -> f64 {
        self.cos_amp * (2.0 * PI * self.cos_freq * index as f64).cos()
    }

    fn raw_tan_at(&self, index: usize) -> f64 {
        self.tan_amp * (2.0 * PI * self.tan_freq * index as f64).tan()
    }
}

/// One generated row.
///
/// Serialized with the column names used throughout the service examples
/// (`Sequence`, `Sin`, `Cos`, `Tan`).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SignalRow {
    pub sequence: usize,
    pub sin: f64,
    pub cos: f64,
    pub tan: f64,
}

impl SignalRow {
    /// Convert the row into a feature map suitable for feeding a forecaster.
    pub fn to_data_point(&self) -> DataPoint {
        DataPoint::from([
            ("Sequence".to_string(), self.sequence as f64),
            ("Sin".to_string(), self.sin),
            ("Cos".to_string(), self.cos),
            ("Tan".to_string(), self.tan),
        ])
    }
}

/// Generator inputs. Defaults mirror the reference dataset: 600 rows, no
/// noise, seed 42.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    pub rows: usize,
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: 600,
            noise_std: 0.0,
            seed: 42,
        }
    }
}

impl GeneratorConfig {
    pub fn generate(&self) -> Result<SyntheticDataset, GeneratorError> {
        generate_sin_cos_tan_with_drifts(self.rows, self.noise_std, self.seed)
    }
}

/// Ordered rows produced by [`generate_sin_cos_tan_with_drifts`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SyntheticDataset {
    rows: Vec<SignalRow>,
}

impl SyntheticDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SignalRow] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalRow> {
        self.rows.iter()
    }

    pub fn sequence(&self) -> Vec<usize> {
        self.rows.iter().map(|row| row.sequence).collect()
    }

    pub fn sin(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.sin).collect()
    }

    pub fn cos(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.cos).collect()
    }

    pub fn tan(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.tan).collect()
    }

    /// Segment index (0, 1 or 2) that row `index` falls into for this
    /// dataset's length.
    pub fn segment_of(&self, index: usize) -> usize {
        SegmentBounds::for_rows(self.rows.len()).segment_of(index)
    }

    pub fn to_data_points(&self) -> Vec<DataPoint> {
        self.rows.iter().map(SignalRow::to_data_point).collect()
    }
}

impl IntoIterator for SyntheticDataset {
    type Item = SignalRow;
    type IntoIter = std::vec::IntoIter<SignalRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

#[derive(Clone, Copy, Debug)]
struct SegmentBounds {
    first_end: usize,
    second_end: usize,
}

impl SegmentBounds {
    fn for_rows(rows: usize) -> Self {
        Self {
            first_end: rows / 3,
            second_end: 2 * rows / 3,
        }
    }

    fn segment_of(&self, index: usize) -> usize {
        if index < self.first_end {
            0
        } else if index < self.second_end {
            1
        } else {
            2
        }
    }
}

/// Generate `rows` samples of the drifting sin/cos/tan signals.
///
/// Rows are split into segments `[0, n/3)`, `[n/3, 2n/3)` and `[2n/3, n)`,
/// each using the matching entry of [`DRIFT_SEGMENTS`]. The tangent column is
/// clamped to `[-TAN_CLAMP, TAN_CLAMP]`.
///
/// With `noise_std > 0.0`, Gaussian noise from a generator seeded with `seed`
/// is added to every column (before the tangent clamp). With `noise_std ==
/// 0.0` no random draws are made and the output does not depend on `seed`.
///
/// ```
/// use driftmind_sdk::generate_sin_cos_tan_with_drifts;
///
/// let dataset = generate_sin_cos_tan_with_drifts(9, 0.0, 42)?;
/// assert_eq!(dataset.len(), 9);
/// assert_eq!(dataset.segment_of(3), 1);
/// # Ok::<(), driftmind_sdk::GeneratorError>(())
/// ```
pub fn generate_sin_cos_tan_with_drifts(
    rows: usize,
    noise_std: f64,
    seed: u64,
) -> Result<SyntheticDataset, GeneratorError> {
    if !noise_std.is_finite() || noise_std < 0.0 {
        return Err(GeneratorError::InvalidNoise(noise_std));
    }

    let mut noise = if noise_std > 0.0 {
        let distribution =
            Normal::new(0.0, noise_std).map_err(|_| GeneratorError::InvalidNoise(noise_std))?;
        Some((StdRng::seed_from_u64(seed), distribution))
    } else {
        None
    };

    let bounds = SegmentBounds::for_rows(rows);
    let mut generated = Vec::with_capacity(rows);
    for index in 0..rows {
        let params = &DRIFT_SEGMENTS[bounds.segment_of(index)];
        let mut sin = params.sin_at(index);
        let mut cos = params.cos_at(index);
        let mut tan = params.raw_tan_at(index);

        if let Some((rng, distribution)) = noise.as_mut() {
            sin += rng.sample(*distribution);
            cos += rng.sample(*distribution);
            tan += rng.sample(*distribution);
        }

        generated.push(SignalRow {
            sequence: index,
            sin,
            cos,
            tan: tan.clamp(-TAN_CLAMP, TAN_CLAMP),
        });
    }

    Ok(SyntheticDataset { rows: generated })
}
