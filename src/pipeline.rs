//! Upload orchestration: decode → spectrogram → normalize → mesh, plus the
//! session state that survives between uploads.
//!
//! `run_pipeline` is pure; `Session` adds the stateful parts — the
//! request-scoped buffer store, the last committed mesh, and a supersede
//! protocol so a slow upload can never clobber a newer one.

use log::{info, warn};

use crate::audio::store::{BufferId, BufferStore};
use crate::audio::decode;
use crate::dsp::{compute_power_spectrum, normalize};
use crate::dsp::spectrogram::DEFAULT_WINDOW_SIZE;
use crate::error::{PipelineError, Result};
use crate::media;
use crate::mesh::{build_mesh, MeshDescriptor, SurfaceStyle};
use crate::playback::PlaybackCue;

/// Extension hint used when the media type cannot be resolved; an empty
/// hint sends the bytes to the probing decoder.
const FALLBACK_EXT: &str = "";

/// Tunable parameters for one session's pipelines.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// STFT window size; also the frequency resolution.
    pub window_size: usize,
    /// Window advance per frame. `None` means half the window (50% overlap).
    pub hop_size: Option<usize>,
    pub style: SurfaceStyle,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            hop_size: None,
            style: SurfaceStyle::default(),
        }
    }
}

impl PipelineConfig {
    fn hop(&self) -> usize {
        self.hop_size.unwrap_or(self.window_size / 2).max(1)
    }
}

/// Result of one pipeline run, ready to commit into a session.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub mesh: MeshDescriptor,
    pub duration_secs: f64,
}

/// Decode bytes and build the renderable mesh. Pure: no session state is
/// read or written, so concurrent runs cannot interfere.
pub fn run_pipeline(bytes: &[u8], ext_hint: &str, config: &PipelineConfig) -> Result<PipelineOutput> {
    let buffer = decode(bytes, ext_hint)?;
    let spectrum = compute_power_spectrum(&buffer, config.window_size, config.hop())?;
    let surface = normalize(&spectrum)?;
    let mesh = build_mesh(&surface, &config.style);

    info!(
        "pipeline: {:.2}s of audio -> {} x {} mesh",
        buffer.duration_secs(),
        mesh.times.len(),
        mesh.freqs.len()
    );
    Ok(PipelineOutput {
        mesh,
        duration_secs: buffer.duration_secs(),
    })
}

/// Ticket for one upload attempt. Committing a stale ticket (one issued
/// before a newer `begin_upload`) is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket {
    generation: u64,
}

struct Committed {
    buffer_id: BufferId,
    mesh: MeshDescriptor,
    duration_secs: f64,
}

/// One user's upload/click state.
///
/// Holds the buffer store and the last successfully committed upload. A
/// failed upload changes nothing: the previous mesh and playback source
/// stay as they were.
pub struct Session {
    store: BufferStore,
    config: PipelineConfig,
    generation: u64,
    committed: Option<Committed>,
}

impl Session {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            store: BufferStore::new(),
            config,
            generation: 0,
            committed: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &BufferStore {
        &self.store
    }

    /// Start an upload attempt. Issuing a new ticket supersedes every
    /// earlier one; superseded results are dropped at commit, not queued.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.generation += 1;
        UploadTicket {
            generation: self.generation,
        }
    }

    /// Apply a finished pipeline run. Returns false (and stores nothing)
    /// when the ticket has been superseded by a newer `begin_upload`.
    pub fn commit(&mut self, ticket: UploadTicket, bytes: Vec<u8>, output: PipelineOutput) -> bool {
        if ticket.generation != self.generation {
            warn!(
                "dropping superseded upload (generation {} < {})",
                ticket.generation, self.generation
            );
            return false;
        }
        let buffer_id = self.store.insert(bytes, output.duration_secs);
        self.committed = Some(Committed {
            buffer_id,
            mesh: output.mesh,
            duration_secs: output.duration_secs,
        });
        true
    }

    /// Synchronous upload: parse the data URI, resolve its extension, run
    /// the pipeline, and commit. Any error leaves the session unchanged.
    pub fn upload(&mut self, contents: &str) -> Result<&MeshDescriptor> {
        let ticket = self.begin_upload();

        let (media_type, bytes) = media::parse_data_uri(contents)?;
        let ext = match media::subtype_extension(&media_type) {
            Ok(ext) => ext,
            Err(PipelineError::UnrecognizedMediaType(s)) => {
                warn!("unrecognized media type {:?}, probing format", s);
                FALLBACK_EXT.to_string()
            }
            Err(e) => return Err(e),
        };

        let output = run_pipeline(&bytes, &ext, &self.config)?;
        self.commit(ticket, bytes, output);
        Ok(self.mesh().expect("commit of a live ticket always stores a mesh"))
    }

    /// The last committed mesh, if any upload has succeeded.
    pub fn mesh(&self) -> Option<&MeshDescriptor> {
        self.committed.as_ref().map(|c| &c.mesh)
    }

    /// Id of the buffer the playback surface should source from.
    pub fn buffer_id(&self) -> Option<&BufferId> {
        self.committed.as_ref().map(|c| &c.buffer_id)
    }

    /// Map a surface click (or its absence) to a playback cue. Only the
    /// time component of a click matters.
    pub fn cue_for_click(&self, clicked_time: Option<f64>) -> PlaybackCue {
        match (clicked_time, &self.committed) {
            (Some(time), Some(c)) => PlaybackCue::from_click(time, c.duration_secs),
            _ => PlaybackCue::idle(),
        }
    }

    /// URI for the playback surface, including the cue's range fragment.
    /// None until an upload has been committed.
    pub fn playback_uri(&self, cue: &PlaybackCue) -> Option<String> {
        self.committed
            .as_ref()
            .map(|c| self.store.playback_uri(&c.buffer_id, cue))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}
