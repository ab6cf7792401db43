/*!
 * Tests for file loading and encoding resolution
 */

use std::fs;
use anyhow::Result;
use submerge::errors::LoadError;
use submerge::file_utils::{load_document, FileManager};
use crate::common;

/// Encode a string as UTF-16LE bytes, optionally with a BOM
fn utf16le_bytes(text: &str, with_bom: bool) -> Vec<u8> {
    let mut out = Vec::new();
    if with_bom {
        out.extend_from_slice(&[0xFF, 0xFE]);
    }
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(&temp_dir.path().to_path_buf(), "exists.ass", "x")?;

    assert!(FileManager::file_exists(&test_file));
    Ok(())
}

/// Test that file_exists returns false for non-existent files and directories
#[test]
fn test_file_exists_withNonFilePaths_shouldReturnFalse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(!FileManager::file_exists("non_existent_file.ass"));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

/// Test loading a plain UTF-8 subtitle file
#[test]
fn test_load_document_withUtf8File_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(&temp_dir.path().to_path_buf(), "plain.ass")?;

    let doc = load_document(&path)?;
    assert_eq!(doc.styles.len(), 2);
    assert_eq!(doc.events.len(), 3);
    Ok(())
}

/// Test loading a UTF-16LE file with a BOM
#[test]
fn test_load_document_withUtf16LeBomFile_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::build_ass(
        Some((640, 480)),
        &[("Default", 100.0)],
        &[("Default", "0:00:01.00", "0:00:02.00", "UTF-16 content")],
    );
    let path = temp_dir.path().join("utf16.ass");
    fs::write(&path, utf16le_bytes(&content, true))?;

    let doc = load_document(&path)?;
    assert_eq!(doc.events.len(), 1);
    assert_eq!(doc.events[0].text(), Some("UTF-16 content"));
    Ok(())
}

/// Test loading a UTF-16LE file without a BOM
#[test]
fn test_load_document_withBareUtf16LeFile_shouldParse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = common::build_ass(None, &[("Default", 100.0)], &[]);
    let path = temp_dir.path().join("utf16-bare.ass");
    fs::write(&path, utf16le_bytes(&content, false))?;

    let doc = load_document(&path)?;
    assert_eq!(doc.styles.len(), 1);
    Ok(())
}

/// Test that a missing path reports InvalidFile before any decoding
#[test]
fn test_load_document_withMissingFile_shouldReportInvalidFile() {
    let err = load_document("definitely/not/here.ass").unwrap_err();
    let load_err = err.downcast_ref::<LoadError>().expect("expected a LoadError");
    assert!(matches!(load_err, LoadError::InvalidFile(_)));
    assert!(err.to_string().starts_with("Invalid file:"));
}

/// Test that a directory path reports InvalidFile
#[test]
fn test_load_document_withDirectoryPath_shouldReportInvalidFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let err = load_document(temp_dir.path()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::InvalidFile(_))
    ));
    Ok(())
}

/// Test that undecodable content reports the last attempted encoding's error
#[test]
fn test_load_document_withGarbageContent_shouldReportUnreadableEncoding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("garbage.ass");
    fs::write(&path, [0xC0, 0xFF, 0xEE, 0x00, 0x00])?;

    let err = load_document(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::UnreadableEncoding { .. })
    ));
    assert!(err.to_string().contains("Cannot find a suitable encoding"));
    Ok(())
}

/// Test that valid text which is not an ASS document also exhausts the ladder
#[test]
fn test_load_document_withNonAssText_shouldReportUnreadableEncoding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "notass.srt",
        "1\n00:00:01,000 --> 00:00:04,000\nplain srt\n",
    )?;

    let err = load_document(&path).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LoadError>(),
        Some(LoadError::UnreadableEncoding { .. })
    ));
    Ok(())
}

/// Test write_to_file round trip through FileManager
#[test]
fn test_write_to_file_withNestedPath_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("nested/dir/out.ass");

    FileManager::write_to_file(&path, "[Script Info]\nTitle: out\n")?;
    assert!(FileManager::file_exists(&path));
    assert_eq!(FileManager::read_bytes(&path)?, b"[Script Info]\nTitle: out\n");
    Ok(())
}
