//! Median-relative decibel normalization.
//!
//! Dividing by the grid's own median power before log-compression makes the
//! rendered contrast independent of overall loudness: quiet and loud clips
//! both land with their median at 0 dB.

use log::debug;

use crate::error::{PipelineError, Result};
use crate::types::{NormalizedSurface, PowerSpectrum};

/// Power ratios are clamped here before the log, so zero-power bins map to
/// a finite -120 dB instead of -inf.
const RATIO_FLOOR: f64 = 1e-12;

/// Rescale a power spectrum to decibels relative to its median power.
///
/// An entirely silent grid is `DegenerateSpectrum`; a zero median over a
/// non-silent grid (more than half the bins empty) falls back to the
/// smallest positive power as the reference.
pub fn normalize(spectrum: &PowerSpectrum) -> Result<NormalizedSurface> {
    if spectrum.power.is_empty() || spectrum.power.iter().all(|&p| p <= 0.0) {
        return Err(PipelineError::DegenerateSpectrum);
    }

    let mut reference = median(&spectrum.power);
    if reference <= 0.0 {
        reference = spectrum
            .power
            .iter()
            .copied()
            .filter(|&p| p > 0.0)
            .fold(f64::INFINITY, f64::min);
        debug!("zero median power, falling back to reference {reference:e}");
    }

    let db: Vec<f64> = spectrum
        .power
        .iter()
        .map(|&p| 10.0 * (p / reference).max(RATIO_FLOOR).log10())
        .collect();

    Ok(NormalizedSurface {
        db,
        times: spectrum.times.clone(),
        freqs: spectrum.freqs.clone(),
    })
}

/// Median of a slice; even lengths average the two middle values.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum_from(power: Vec<f64>, n_bins: usize) -> PowerSpectrum {
        let n_frames = power.len() / n_bins;
        PowerSpectrum {
            power,
            times: (0..n_frames).map(|i| i as f64 * 0.1).collect(),
            freqs: (0..n_bins).map(|k| k as f64 * 100.0).collect(),
            sample_rate: 8000,
        }
    }

    #[test]
    fn test_median_is_zero_db() {
        // Odd count, so the median is an actual grid element and maps to
        // exactly 0 dB.
        let power = vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0, 256.0];
        let spec = spectrum_from(power, 3);
        let surface = normalize(&spec).unwrap();

        assert_eq!(surface.db.len(), spec.power.len());
        let med = median(&surface.db);
        assert!(med.abs() < 1e-9, "median {med} dB, expected ~0");
    }

    #[test]
    fn test_all_zero_grid_is_degenerate() {
        let spec = spectrum_from(vec![0.0; 8], 4);
        assert_eq!(normalize(&spec), Err(PipelineError::DegenerateSpectrum));
    }

    #[test]
    fn test_zero_bins_stay_finite() {
        let spec = spectrum_from(vec![0.0, 0.0, 1.0, 4.0], 2);
        let surface = normalize(&spec).unwrap();
        assert!(surface.db.iter().all(|v| v.is_finite()));
        // Zero-power bins sit at the ratio floor.
        assert_eq!(surface.db[0], surface.db[1]);
        assert!(surface.db[0] < -100.0);
    }

    #[test]
    fn test_mostly_silent_grid_uses_positive_reference() {
        // Median is zero but the grid is not silent.
        let spec = spectrum_from(vec![0.0, 0.0, 0.0, 2.0], 2);
        let surface = normalize(&spec).unwrap();
        assert!(surface.db.iter().all(|v| v.is_finite()));
        // The surviving bin is at or above the reference.
        assert!(surface.db[3] >= 0.0);
    }

    #[test]
    fn test_loudness_invariance() {
        // Scaling all power by a constant must not change the surface.
        let base = vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0];
        let scaled: Vec<f64> = base.iter().map(|p| p * 1000.0).collect();

        let a = normalize(&spectrum_from(base, 3)).unwrap();
        let b = normalize(&spectrum_from(scaled, 3)).unwrap();
        for (x, y) in a.db.iter().zip(b.db.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), 2.5);
    }
}
