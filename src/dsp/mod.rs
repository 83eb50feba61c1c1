pub mod normalize;
pub mod spectrogram;

pub use normalize::normalize;
pub use spectrogram::compute_power_spectrum;
