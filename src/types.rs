/// Decoded mono audio, the canonical form every later stage works on.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleBuffer {
    /// Mono PCM samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz. Always > 0 for a successfully decoded buffer.
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Short-time power spectrum: a frame-major grid of |X|² values plus the
/// time and frequency axes that index it.
///
/// Invariant: `power.len() == times.len() * freqs.len()`, and both axes are
/// strictly increasing.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerSpectrum {
    /// Row-major grid, `power[frame * n_bins + bin]`, non-negative.
    pub power: Vec<f64>,
    /// Frame-center timestamps in seconds, one per frame.
    pub times: Vec<f64>,
    /// Bin frequencies in Hz, from 0 up to Nyquist.
    pub freqs: Vec<f64>,
    /// Sample rate of the source buffer.
    pub sample_rate: u32,
}

impl PowerSpectrum {
    pub fn n_frames(&self) -> usize {
        self.times.len()
    }

    pub fn n_bins(&self) -> usize {
        self.freqs.len()
    }

    /// Power at (frame, bin).
    pub fn value(&self, frame: usize, bin: usize) -> f64 {
        self.power[frame * self.n_bins() + bin]
    }
}

/// A power spectrum rescaled to decibels relative to its own median power.
///
/// Same shape as the `PowerSpectrum` it came from; every value is finite and
/// the median value is ≈0 dB by construction.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedSurface {
    /// Row-major grid, `db[frame * n_bins + bin]`, decibels.
    pub db: Vec<f64>,
    pub times: Vec<f64>,
    pub freqs: Vec<f64>,
}

impl NormalizedSurface {
    pub fn n_frames(&self) -> usize {
        self.times.len()
    }

    pub fn n_bins(&self) -> usize {
        self.freqs.len()
    }

    pub fn value(&self, frame: usize, bin: usize) -> f64 {
        self.db[frame * self.n_bins() + bin]
    }
}
