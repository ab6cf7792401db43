use anyhow::{Result, Context, anyhow};
use std::fs;
use std::path::Path;
use log::debug;

use crate::ass_codec;
use crate::errors::LoadError;
use crate::subtitle_document::Document;

// @module: File utilities and the encoding-resolving subtitle loader

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Read a file's raw bytes
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file, creating parent directories as needed
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }
}

/// Text encodings attempted when loading a subtitle file, in order.
/// Mirrors the usual authoring tools: UTF-8, then UTF-16 with a BOM,
/// then bare little-endian UTF-16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8, tolerating (and stripping) a leading BOM
    Utf8,
    /// UTF-16 with BOM sniffing; defaults to little-endian without a BOM
    Utf16,
    /// Little-endian UTF-16 decoded without BOM interpretation
    Utf16Le,
}

/// The attempt ladder used by `load_document`
pub const ENCODING_ATTEMPTS: [TextEncoding; 3] =
    [TextEncoding::Utf8, TextEncoding::Utf16, TextEncoding::Utf16Le];

impl TextEncoding {
    // @returns: Human-readable encoding label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16 => "utf-16",
            Self::Utf16Le => "utf-16-le",
        }
    }

    /// Strictly decode raw bytes with this encoding.
    /// Invalid sequences fail the attempt; nothing is lossy-replaced.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self {
            Self::Utf8 => {
                let text = std::str::from_utf8(bytes).context("Invalid UTF-8")?;
                Ok(text.trim_start_matches('\u{feff}').to_string())
            }
            Self::Utf16 => {
                // BOM signatures per the Unicode standard: FF FE = LE, FE FF = BE.
                // Without a BOM the payload is treated as little-endian.
                if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
                    decode_utf16_units(rest, u16::from_be_bytes)
                } else if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
                    decode_utf16_units(rest, u16::from_le_bytes)
                } else {
                    decode_utf16_units(bytes, u16::from_le_bytes)
                }
            }
            Self::Utf16Le => {
                let text = decode_utf16_units(bytes, u16::from_le_bytes)?;
                Ok(text.trim_start_matches('\u{feff}').to_string())
            }
        }
    }
}

fn decode_utf16_units(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(anyhow!("Truncated UTF-16 input: odd byte count"));
    }

    let units = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .context("Invalid UTF-16")
}

/// Load and parse a subtitle file, trying each supported text encoding until
/// one both decodes and parses.
///
/// Fails with `LoadError::InvalidFile` when the path is not an existing
/// regular file, and with `LoadError::UnreadableEncoding` (carrying the last
/// attempt's error) when no encoding produces a parseable document.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();

    if !FileManager::file_exists(path) {
        return Err(LoadError::InvalidFile(path.to_path_buf()).into());
    }

    let bytes = FileManager::read_bytes(path)?;

    let mut last_error: Option<anyhow::Error> = None;
    for encoding in ENCODING_ATTEMPTS {
        let attempt = encoding
            .decode(&bytes)
            .and_then(|text| ass_codec::parse(&text).map_err(Into::into));

        match attempt {
            Ok(doc) => {
                debug!("Loaded {:?} as {}", path, encoding.label());
                return Ok(doc);
            }
            Err(e) => {
                debug!("Attempt {} failed for {:?}: {}", encoding.label(), path, e);
                last_error = Some(e);
            }
        }
    }

    Err(LoadError::UnreadableEncoding {
        path: path.to_path_buf(),
        // The ladder is non-empty, so at least one attempt recorded an error
        last_error: last_error.unwrap_or_else(|| anyhow!("no encodings attempted")),
    }
    .into())
}

/// Load a path as `load_document` does, but from a caller-supplied byte
/// buffer. Used by tests to exercise the encoding ladder without touching disk.
pub fn parse_bytes(bytes: &[u8]) -> Result<Document> {
    let mut last_error: Option<anyhow::Error> = None;
    for encoding in ENCODING_ATTEMPTS {
        match encoding
            .decode(bytes)
            .and_then(|text| ass_codec::parse(&text).map_err(Into::into))
        {
            Ok(doc) => return Ok(doc),
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or_else(|| anyhow!("no encodings attempted")))
}
