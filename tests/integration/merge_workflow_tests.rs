/*!
 * Integration tests for the end-to-end merge workflow
 */

use std::path::PathBuf;
use anyhow::Result;
use submerge::app_config::Config;
use submerge::app_controller::Controller;
use submerge::ass_codec::parse;
use crate::common;

/// Merge two documents with colliding style names and differing resolutions,
/// then verify the output document's invariants
#[test]
fn test_merge_workflow_withTwoFiles_shouldProduceMergedSortedDocument() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let episode = common::build_ass(
        Some((640, 480)),
        &[("Default", 100.0)],
        &[
            ("Default", "0:00:10.00", "0:00:12.00", "second line"),
            ("Default", "0:00:01.00", "0:00:03.00", "first line"),
        ],
    );
    let signs = common::build_ass(
        Some((1280, 720)),
        &[("Default", 100.0)],
        &[("Default", "0:00:05.00", "0:00:06.00", "a sign")],
    );

    let episode_path = common::create_test_file(&dir, "episode.ass", &episode)?;
    let signs_path = common::create_test_file(&dir, "signs.ass", &signs)?;

    let controller = Controller::new_for_test()?;
    let output = controller.run(&[episode_path, signs_path])?;
    let merged = parse(&output)?;

    // Namespacing kept both Default styles, distinct
    let names: Vec<&str> = merged.styles.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["0.Default", "1.Default"]);

    // The smaller canvas was rescaled to the larger one
    assert_eq!(merged.play_res_x(), Some(1280.0));
    assert_eq!(merged.play_res_y(), Some(720.0));
    assert_eq!(merged.styles[0].scale_x, 150.0);
    assert_eq!(merged.styles[1].scale_x, 100.0);

    // Events are time-ordered across both sources
    let texts: Vec<&str> = merged.events.iter().filter_map(|e| e.text()).collect();
    assert_eq!(texts, vec!["first line", "a sign", "second line"]);
    let refs: Vec<&str> = merged.events.iter().map(|e| e.style.as_str()).collect();
    assert_eq!(refs, vec!["0.Default", "1.Default", "0.Default"]);

    Ok(())
}

/// Exclusion applies per document, against original (pre-namespace) names
#[test]
fn test_merge_workflow_withExcludePattern_shouldDropMatchingStylesInEveryFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let a = common::build_ass(
        None,
        &[("Default", 100.0), ("Karaoke", 100.0)],
        &[
            ("Default", "0:00:01.00", "0:00:02.00", "keep a"),
            ("Karaoke", "0:00:03.00", "0:00:04.00", "drop a"),
        ],
    );
    let b = common::build_ass(
        None,
        &[("karaoke", 100.0), ("Signs", 100.0)],
        &[
            ("karaoke", "0:00:05.00", "0:00:06.00", "drop b"),
            ("Signs", "0:00:07.00", "0:00:08.00", "keep b"),
        ],
    );

    let a_path = common::create_test_file(&dir, "a.ass", &a)?;
    let b_path = common::create_test_file(&dir, "b.ass", &b)?;

    let config = Config {
        exclude: Some("karaoke".to_string()),
        ..Config::default()
    };
    let controller = Controller::with_config(config)?;
    let output = controller.run(&[a_path, b_path])?;
    let merged = parse(&output)?;

    let names: Vec<&str> = merged.styles.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["0.Default", "1.Signs"]);
    let texts: Vec<&str> = merged.events.iter().filter_map(|e| e.text()).collect();
    assert_eq!(texts, vec!["keep a", "keep b"]);

    Ok(())
}

/// A single bad input aborts the whole run with no partial output
#[test]
fn test_merge_workflow_withOneMissingFile_shouldAbortEntireRun() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let good = common::create_test_subtitle(&dir, "good.ass")?;
    let missing = PathBuf::from("no/such/file.ass");

    let controller = Controller::new_for_test()?;
    let err = controller.run(&[good, missing]).unwrap_err();
    assert!(err.to_string().contains("Invalid file"));

    Ok(())
}

/// An invalid exclude pattern fails at controller construction,
/// before any file would be opened
#[test]
fn test_merge_workflow_withInvalidPattern_shouldFailBeforeLoading() {
    let config = Config {
        exclude: Some("*bad".to_string()),
        ..Config::default()
    };
    let err = Controller::with_config(config).unwrap_err();
    assert!(err.to_string().contains("Invalid exclude pattern"));
}

/// Merging a document with itself still yields unique style names
#[test]
fn test_merge_workflow_withSameFileTwice_shouldStillIsolateNamespaces() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let path = common::create_test_subtitle(&dir, "episode.ass")?;

    let controller = Controller::new_for_test()?;
    let output = controller.run(&[path.clone(), path])?;
    let merged = parse(&output)?;

    assert_eq!(merged.styles.len(), 4);
    let mut names: Vec<&str> = merged.styles.iter().map(|s| s.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 4);
    assert_eq!(merged.events.len(), 6);

    Ok(())
}

/// Running with an empty file list is rejected
#[test]
fn test_merge_workflow_withNoFiles_shouldFail() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert!(controller.run(&[]).is_err());
    Ok(())
}

/// A resolution-less document merges untouched alongside declared ones
#[test]
fn test_merge_workflow_withResolutionlessBase_shouldKeepBaseUntouched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();

    let base = common::build_ass(
        None,
        &[("Default", 100.0)],
        &[("Default", "0:00:01.00", "0:00:02.00", "no resolution")],
    );
    let other = common::build_ass(
        Some((1920, 1080)),
        &[("Signs", 100.0)],
        &[("Signs", "0:00:03.00", "0:00:04.00", "full hd")],
    );

    let base_path = common::create_test_file(&dir, "base.ass", &base)?;
    let other_path = common::create_test_file(&dir, "other.ass", &other)?;

    let controller = Controller::new_for_test()?;
    let output = controller.run(&[base_path, other_path])?;
    let merged = parse(&output)?;

    // The base declared no resolution, so the merged document declares none
    assert_eq!(merged.play_res_y(), None);
    // And nobody's scales moved
    assert!(merged.styles.iter().all(|s| s.scale_x == 100.0));

    Ok(())
}
