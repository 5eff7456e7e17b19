//! Byte-level manifest decoding

use log::{debug, info, warn};
use std::fs;
use std::path::Path;

use super::model::SymbolManifest;
use crate::domain::ImportError;

const UTF16_LE_MARKER: [u8; 2] = [0xFF, 0xFE];
const UTF16_BE_MARKER: [u8; 2] = [0xFE, 0xFF];

/// Decode raw manifest bytes into text
///
/// Only the encoding is handled here; leading marker characters that
/// survive decoding (a UTF-8 BOM, a BE marker) are left for
/// [`strip_to_object`].
///
/// # Errors
/// Returns [`ImportError::Encoding`] if the bytes are not valid in the
/// detected encoding.
pub fn decode_text(bytes: &[u8]) -> Result<String, ImportError> {
    if let Some(rest) = bytes.strip_prefix(&UTF16_LE_MARKER) {
        debug!("manifest encoding: UTF-16LE (marked)");
        return decode_utf16(rest, u16::from_le_bytes);
    }

    if bytes.contains(&0) {
        if bytes.starts_with(&UTF16_BE_MARKER) {
            debug!("manifest encoding: UTF-16BE");
            return decode_utf16(bytes, u16::from_be_bytes);
        }
        debug!("manifest encoding: UTF-16LE (unmarked)");
        return decode_utf16(bytes, u16::from_le_bytes);
    }

    debug!("manifest encoding: UTF-8");
    String::from_utf8(bytes.to_vec()).map_err(|e| ImportError::Encoding(format!("UTF-8: {e}")))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, ImportError> {
    if bytes.len() % 2 != 0 {
        return Err(ImportError::Encoding(format!(
            "UTF-16: odd byte count ({})",
            bytes.len()
        )));
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]])).collect();
    String::from_utf16(&units).map_err(|e| ImportError::Encoding(format!("UTF-16: {e}")))
}

/// Drop everything before the first `{`
///
/// # Errors
/// Returns [`ImportError::NoJsonObject`] if the text has no `{` at all.
pub fn strip_to_object(text: &str) -> Result<&str, ImportError> {
    text.find('{').map(|start| &text[start..]).ok_or(ImportError::NoJsonObject)
}

/// Decode and parse manifest bytes
///
/// # Errors
/// Returns a decode-class [`ImportError`] for bad encodings, missing JSON
/// objects, or documents that do not match the manifest shape.
pub fn parse_manifest(bytes: &[u8]) -> Result<SymbolManifest, ImportError> {
    let text = decode_text(bytes)?;
    let json = strip_to_object(&text)?;
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a manifest file
///
/// # Errors
/// Returns [`ImportError::ManifestRead`] if the file cannot be read, or any
/// error from [`parse_manifest`].
pub fn load_manifest(path: &Path) -> Result<SymbolManifest, ImportError> {
    let bytes = fs::read(path)
        .map_err(|source| ImportError::ManifestRead { path: path.to_path_buf(), source })?;
    let manifest = parse_manifest(&bytes)?;
    if manifest.is_empty() {
        warn!("{} lists no functions", path.display());
    }
    info!(
        "Loaded {} functions ({} user, {} std) from {}",
        manifest.len(),
        manifest.user_functions.len(),
        manifest.std_functions.len(),
        path.display()
    );
    Ok(manifest)
}
