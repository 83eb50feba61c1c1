//! Renderable surface mesh: axes, dB grid, and display styling.
//!
//! Pure data assembly; no decoding or transform logic. The descriptor
//! serializes straight to the JSON shape a surface-plot renderer consumes.

use serde::{Deserialize, Serialize};

use crate::types::NormalizedSurface;

/// Display configuration for the rendered surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceStyle {
    pub color_scheme: String,
    pub time_label: String,
    pub freq_label: String,
    pub amp_label: String,
    /// Camera aspect ratios (time : frequency : amplitude).
    pub aspect_ratio: [f64; 3],
    /// Render the time axis right-to-left. On by default to match the
    /// original display orientation.
    pub reverse_time: bool,
}

impl Default for SurfaceStyle {
    fn default() -> Self {
        Self {
            color_scheme: "Jet".to_string(),
            time_label: "time (s)".to_string(),
            freq_label: "frequency (Hz)".to_string(),
            amp_label: "amplitude (db)".to_string(),
            aspect_ratio: [1.5, 1.0, 1.0],
            reverse_time: true,
        }
    }
}

/// The renderable triple: time axis, frequency axis, dB grid, plus styling.
///
/// The grid is bin-major (`values_db[bin][frame]`) so each row pairs with
/// one frequency and each column with one timestamp, the layout surface
/// renderers index by.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshDescriptor {
    /// Frame-center timestamps in seconds, ascending. Orientation is a
    /// rendering hint (`style.reverse_time`), not a physical reversal.
    pub times: Vec<f64>,
    /// Bin frequencies in Hz, ascending.
    pub freqs: Vec<f64>,
    /// Decibel values, `values_db.len() == freqs.len()`, each row
    /// `times.len()` long.
    pub values_db: Vec<Vec<f64>>,
    pub style: SurfaceStyle,
}

impl MeshDescriptor {
    /// JSON form for handoff to a JS rendering surface.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Assemble a normalized surface into a mesh descriptor, transposing the
/// frame-major grid into bin-major rows.
pub fn build_mesh(surface: &NormalizedSurface, style: &SurfaceStyle) -> MeshDescriptor {
    let n_frames = surface.n_frames();
    let n_bins = surface.n_bins();

    let values_db: Vec<Vec<f64>> = (0..n_bins)
        .map(|bin| (0..n_frames).map(|frame| surface.value(frame, bin)).collect())
        .collect();

    MeshDescriptor {
        times: surface.times.clone(),
        freqs: surface.freqs.clone(),
        values_db,
        style: style.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_surface() -> NormalizedSurface {
        // 3 frames x 2 bins, frame-major.
        NormalizedSurface {
            db: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
            times: vec![0.1, 0.2, 0.3],
            freqs: vec![0.0, 100.0],
        }
    }

    #[test]
    fn test_mesh_shape_and_transpose() {
        let mesh = build_mesh(&test_surface(), &SurfaceStyle::default());

        assert_eq!(mesh.times.len(), 3);
        assert_eq!(mesh.freqs.len(), 2);
        assert_eq!(mesh.values_db.len(), 2);
        assert!(mesh.values_db.iter().all(|row| row.len() == 3));

        // Row 0 = bin 0 across frames; row 1 = bin 1.
        assert_eq!(mesh.values_db[0], vec![0.0, 2.0, 4.0]);
        assert_eq!(mesh.values_db[1], vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_default_style() {
        let style = SurfaceStyle::default();
        assert_eq!(style.color_scheme, "Jet");
        assert_eq!(style.aspect_ratio, [1.5, 1.0, 1.0]);
        assert!(style.reverse_time);
    }

    #[test]
    fn test_json_roundtrip() {
        let mesh = build_mesh(&test_surface(), &SurfaceStyle::default());
        let json = mesh.to_json().unwrap();
        assert!(json.contains("\"times\""));
        assert!(json.contains("\"Jet\""));

        let back: MeshDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mesh);
    }
}
