//! Short-time power spectrum (STFT) over a decoded sample buffer.

use std::cell::RefCell;
use std::collections::HashMap;

use log::debug;
use realfft::RealFftPlanner;

use crate::error::{PipelineError, Result};
use crate::types::{PowerSpectrum, SampleBuffer};

/// Default analysis window, matching the classic 256-point spectrogram.
pub const DEFAULT_WINDOW_SIZE: usize = 256;

thread_local! {
    static FFT_PLANNER: RefCell<RealFftPlanner<f32>> = RefCell::new(RealFftPlanner::new());
    static HANN_CACHE: RefCell<HashMap<usize, Vec<f32>>> = RefCell::new(HashMap::new());
}

fn hann_window(size: usize) -> Vec<f32> {
    HANN_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .entry(size)
            .or_insert_with(|| {
                (0..size)
                    .map(|i| {
                        0.5 * (1.0
                            - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
                    })
                    .collect()
            })
            .clone()
    })
}

/// Compute a power spectrum over overlapping Hann-tapered windows.
///
/// Each frame covers `window_size` samples and the window advances by
/// `hop_size` (half a window for the standard 50% overlap). Power is the
/// squared FFT magnitude; the time axis holds window-center timestamps and
/// the frequency axis runs from 0 Hz up to Nyquist in `window_size / 2 + 1`
/// bins.
pub fn compute_power_spectrum(
    buffer: &SampleBuffer,
    window_size: usize,
    hop_size: usize,
) -> Result<PowerSpectrum> {
    if buffer.samples.len() < window_size {
        return Err(PipelineError::InsufficientSamples {
            needed: window_size,
            got: buffer.samples.len(),
        });
    }
    let hop_size = hop_size.max(1);
    let n_bins = window_size / 2 + 1;

    let fft = FFT_PLANNER.with(|p| p.borrow_mut().plan_fft_forward(window_size));
    let window = hann_window(window_size);

    // Pre-allocate FFT buffers once and reuse across frames
    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();

    let mut power = Vec::new();
    let mut times = Vec::new();

    let mut pos = 0;
    while pos + window_size <= buffer.samples.len() {
        for (inp, (&s, &w)) in input
            .iter_mut()
            .zip(buffer.samples[pos..pos + window_size].iter().zip(window.iter()))
        {
            *inp = s * w;
        }

        // Buffer lengths come from the same plan, so this cannot fail.
        fft.process(&mut input, &mut spectrum).expect("FFT failed");

        power.extend(spectrum.iter().map(|c| c.norm_sqr() as f64));
        times.push((pos + window_size / 2) as f64 / buffer.sample_rate as f64);

        pos += hop_size;
    }

    let freqs: Vec<f64> = (0..n_bins)
        .map(|k| k as f64 * buffer.sample_rate as f64 / window_size as f64)
        .collect();

    debug!(
        "spectrogram: {} frames x {} bins (window {}, hop {})",
        times.len(),
        n_bins,
        window_size,
        hop_size
    );

    Ok(PowerSpectrum {
        power,
        times,
        freqs,
        sample_rate: buffer.sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_buffer(freq: f64, sample_rate: u32, num_samples: usize) -> SampleBuffer {
        let samples: Vec<f32> = (0..num_samples)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * std::f64::consts::PI * freq * t).sin() as f32
            })
            .collect();
        SampleBuffer {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn test_grid_dimensions_and_axes() {
        let buffer = sine_buffer(1000.0, 44100, 4096);
        let spec = compute_power_spectrum(&buffer, 1024, 512).unwrap();

        let expected_frames = (4096 - 1024) / 512 + 1;
        assert_eq!(spec.n_frames(), expected_frames);
        assert_eq!(spec.n_bins(), 1024 / 2 + 1);
        assert_eq!(spec.power.len(), spec.n_frames() * spec.n_bins());
        assert_eq!(spec.sample_rate, 44100);

        assert!(spec.times.windows(2).all(|w| w[1] > w[0]));
        assert!(spec.freqs.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(spec.freqs[0], 0.0);
        assert_eq!(*spec.freqs.last().unwrap(), 44100.0 / 2.0);
        assert!(spec.power.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn test_peak_bin_matches_tone() {
        let sample_rate = 44100u32;
        let freq = 1000.0f64;
        let buffer = sine_buffer(freq, sample_rate, 4096);

        let spec = compute_power_spectrum(&buffer, 1024, 512).unwrap();
        let freq_resolution = sample_rate as f64 / 1024.0;

        // Skip the first frame (edge effects).
        let frame = 1;
        let peak_bin = (0..spec.n_bins())
            .max_by(|&a, &b| spec.value(frame, a).partial_cmp(&spec.value(frame, b)).unwrap())
            .unwrap();
        let peak_freq = spec.freqs[peak_bin];
        assert!(
            (peak_freq - freq).abs() < freq_resolution * 2.0,
            "Peak at {peak_freq} Hz, expected ~{freq} Hz"
        );
    }

    #[test]
    fn test_short_buffer_is_insufficient() {
        let buffer = sine_buffer(440.0, 8000, 100);
        assert!(matches!(
            compute_power_spectrum(&buffer, 256, 128),
            Err(PipelineError::InsufficientSamples {
                needed: 256,
                got: 100
            })
        ));
    }

    #[test]
    fn test_exactly_one_window_yields_one_frame() {
        let buffer = sine_buffer(440.0, 8000, 256);
        let spec = compute_power_spectrum(&buffer, 256, 128).unwrap();
        assert_eq!(spec.n_frames(), 1);
    }

    #[test]
    fn test_identical_inputs_are_bit_identical() {
        let buffer = sine_buffer(440.0, 8000, 4000);
        let a = compute_power_spectrum(&buffer, 256, 128).unwrap();
        let b = compute_power_spectrum(&buffer, 256, 128).unwrap();
        assert_eq!(a, b);
    }
}
