//! Container decoding: encoded bytes in, mono f32 `SampleBuffer` out.
//!
//! WAV goes through hound and FLAC through claxon; everything else is probed
//! by symphonia (MP3, Ogg Vorbis, AAC/M4A, ALAC). Multi-channel input is
//! down-mixed to mono by channel averaging so spectral energy from the whole
//! stereo field survives, and the original sample rate is preserved.

use std::io::Cursor;

use log::{debug, info};
use symphonia::core::audio::SampleBuffer as SymphoniaBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{PipelineError, Result};
use crate::types::SampleBuffer;

/// Decode encoded audio bytes into a mono sample buffer.
///
/// `ext_hint` selects the decoder: `"wav"` and `"flac"` use their dedicated
/// decoders, anything else (including an empty hint) is handed to the
/// symphonia probe.
pub fn decode(bytes: &[u8], ext_hint: &str) -> Result<SampleBuffer> {
    let buffer = match ext_hint {
        "wav" => decode_wav(bytes)?,
        "flac" => decode_flac(bytes)?,
        "" => decode_sniffed(bytes)?,
        other => decode_symphonia(bytes, other)?,
    };

    if buffer.samples.is_empty() {
        return Err(PipelineError::CorruptStream(
            "stream decoded to zero samples".to_string(),
        ));
    }

    info!(
        "decoded {} ({} samples @ {} Hz, {:.2}s)",
        if ext_hint.is_empty() { "audio" } else { ext_hint },
        buffer.samples.len(),
        buffer.sample_rate,
        buffer.duration_secs()
    );
    Ok(buffer)
}

/// No usable extension hint: sniff the container magic before falling back
/// to the symphonia probe.
fn decode_sniffed(bytes: &[u8]) -> Result<SampleBuffer> {
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
        decode_wav(bytes)
    } else if bytes.starts_with(b"fLaC") {
        decode_flac(bytes)
    } else {
        decode_symphonia(bytes, "")
    }
}

/// Average interleaved frames down to one channel.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn decode_wav(bytes: &[u8]) -> Result<SampleBuffer> {
    let map_err = |e: hound::Error| match e {
        hound::Error::Unsupported => {
            PipelineError::UnsupportedFormat("unsupported WAV encoding".to_string())
        }
        other => PipelineError::CorruptStream(format!("WAV: {}", other)),
    };

    let mut reader = hound::WavReader::new(Cursor::new(bytes)).map_err(map_err)?;
    let spec = reader.spec();
    debug!(
        "WAV: {} ch, {} Hz, {} bit {:?}",
        spec.channels, spec.sample_rate, spec.bits_per_sample, spec.sample_format
    );

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(map_err)?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(map_err)?
        }
    };

    Ok(SampleBuffer {
        samples: downmix(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

fn decode_flac(bytes: &[u8]) -> Result<SampleBuffer> {
    let map_err = |e: claxon::Error| match e {
        claxon::Error::Unsupported(what) => {
            PipelineError::UnsupportedFormat(format!("unsupported FLAC feature: {}", what))
        }
        other => PipelineError::CorruptStream(format!("FLAC: {}", other)),
    };

    let mut reader = claxon::FlacReader::new(Cursor::new(bytes)).map_err(map_err)?;
    let info = reader.streaminfo();
    debug!(
        "FLAC: {} ch, {} Hz, {} bit",
        info.channels, info.sample_rate, info.bits_per_sample
    );

    let scale = (1i64 << (info.bits_per_sample - 1)) as f32;
    let interleaved: Vec<f32> = reader
        .samples()
        .map(|s| s.map(|v| v as f32 / scale))
        .collect::<std::result::Result<_, _>>()
        .map_err(map_err)?;

    Ok(SampleBuffer {
        samples: downmix(&interleaved, info.channels as usize),
        sample_rate: info.sample_rate,
    })
}

fn decode_symphonia(bytes: &[u8], ext_hint: &str) -> Result<SampleBuffer> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

    let mut hint = Hint::new();
    if !ext_hint.is_empty() {
        hint.with_extension(ext_hint);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| match e {
            SymphoniaError::Unsupported(what) => {
                PipelineError::UnsupportedFormat(format!("no reader for container: {}", what))
            }
            other => PipelineError::CorruptStream(format!("probe: {}", other)),
        })?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PipelineError::UnsupportedFormat("no audio track found".to_string()))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| PipelineError::CorruptStream("missing sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| match e {
            SymphoniaError::Unsupported(what) => {
                PipelineError::UnsupportedFormat(format!("no decoder for codec: {}", what))
            }
            other => PipelineError::CorruptStream(format!("decoder: {}", other)),
        })?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            // Normal end of stream.
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(PipelineError::CorruptStream(format!("packet read: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| PipelineError::CorruptStream(format!("decode: {}", e)))?;

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let mut buf = SymphoniaBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend(downmix(buf.samples(), channels));
    }

    Ok(SampleBuffer {
        samples,
        sample_rate,
    })
}
