//! Upload transport: media-type resolution and data-URI payload extraction.

use base64::{engine::general_purpose, Engine as _};

use crate::error::{PipelineError, Result};

/// Derive a file-extension token from a media type like `"audio/mpeg"`.
///
/// The subtype is used directly, except `"mpeg"` which normalizes to `"mp3"`
/// (the extension decoders expect). A string without a `/`-delimited subtype
/// is `UnrecognizedMediaType`; callers treat that as non-fatal and fall back
/// to a default hint.
pub fn subtype_extension(media_type: &str) -> Result<String> {
    let subtype = match media_type.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() => subtype,
        _ => return Err(PipelineError::UnrecognizedMediaType(media_type.to_string())),
    };
    Ok(match subtype {
        "mpeg" => "mp3".to_string(),
        other => other.to_string(),
    })
}

/// Split a `data:<media-type>;base64,<payload>` URI into its media type and
/// decoded payload bytes.
pub fn parse_data_uri(contents: &str) -> Result<(String, Vec<u8>)> {
    let rest = contents
        .strip_prefix("data:")
        .ok_or_else(|| PipelineError::InvalidPayload("missing data: scheme".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PipelineError::InvalidPayload("missing payload separator".to_string()))?;

    let media_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| PipelineError::InvalidPayload("payload is not base64".to_string()))?;

    let bytes = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| PipelineError::InvalidPayload(format!("base64 decode: {}", e)))?;

    Ok((media_type.to_string(), bytes))
}
