//! Audio decoding, spectrogram, and 3D surface mesh core for interactive
//! audio visualization.
//!
//! The one-shot pipeline turns an uploaded clip into a renderable
//! time–frequency–amplitude mesh:
//!
//! `data URI -> media -> audio::decode -> dsp::spectrogram -> dsp::normalize -> mesh`
//!
//! [`pipeline::Session`] wires those stages together per user, retains the
//! decoded upload for playback, and maps surface clicks back into bounded
//! playback ranges ([`playback`]). Rendering and transport are left to the
//! host; this crate only produces the data they consume.

pub mod audio;
pub mod dsp;
pub mod error;
pub mod media;
pub mod mesh;
pub mod pipeline;
pub mod playback;
pub mod types;

pub use error::{PipelineError, Result};
pub use mesh::{MeshDescriptor, SurfaceStyle};
pub use pipeline::{run_pipeline, PipelineConfig, PipelineOutput, Session};
pub use playback::PlaybackCue;
pub use types::{NormalizedSurface, PowerSpectrum, SampleBuffer};
