use std::collections::HashSet;
use anyhow::{Result, anyhow};
use log::debug;
use regex::Regex;

use crate::subtitle_document::Document;

// @module: The merge pipeline stages: style exclusion, namespace isolation,
// resolution normalization, structural merge and temporal re-sort

/// Remove every style whose name matches the pattern, and every event whose
/// style reference named a removed style.
///
/// The pattern is expected to be compiled case-insensitive and anchored at
/// both ends (see `app_config::compile_exclude`). Survivor order is preserved
/// and matching zero styles is not an error. Runs before namespacing so the
/// pattern addresses original style names.
pub fn exclude_styles(doc: &mut Document, pattern: &Regex) {
    let removed: HashSet<String> = doc
        .styles
        .iter()
        .filter(|s| pattern.is_match(&s.name))
        .map(|s| s.name.clone())
        .collect();

    if removed.is_empty() {
        return;
    }

    doc.styles.retain(|s| !removed.contains(&s.name));
    doc.events.retain(|e| !removed.contains(&e.style));

    debug!("Excluded {} style(s): {:?}", removed.len(), removed);
}

/// Prefix every style name and every event's style reference with the given
/// discriminator, making the document safe to merge without name collisions.
///
/// The discriminator must be unique among the documents being merged; the
/// caller passes each document's position in the input list. Renaming covers
/// 100% of styles and events so references stay valid.
pub fn isolate_namespace(doc: &mut Document, discriminator: &str) {
    for style in &mut doc.styles {
        style.name = format!("{}.{}", discriminator, style.name);
    }
    for event in &mut doc.events {
        event.style = format!("{}.{}", discriminator, event.style);
    }
}

/// Rescale documents authored against a smaller canvas so all documents share
/// one coordinate scale.
///
/// The anchor is the document with the numerically largest PlayResY (its
/// paired PlayResX comes along). Documents without a declared resolution are
/// left untouched, as are documents already at the target height; only
/// strictly smaller canvases get their styles' ScaleX/ScaleY multiplied and
/// their resolution rewritten. The target must be fully resolved across all
/// documents before any document is rescaled.
pub fn normalize_resolutions(docs: &mut [Document]) {
    let mut target: Option<(f64, f64)> = None;
    for doc in docs.iter() {
        let (Some(x), Some(y)) = (doc.play_res_x(), doc.play_res_y()) else {
            continue;
        };
        // A zero dimension counts as undeclared, same as a missing one
        if x <= 0.0 || y <= 0.0 {
            continue;
        }
        if target.is_none_or(|(_, best_y)| y > best_y) {
            target = Some((x, y));
        }
    }

    let Some((target_x, target_y)) = target else {
        return;
    };

    for doc in docs.iter_mut() {
        let (Some(x), Some(y)) = (doc.play_res_x(), doc.play_res_y()) else {
            continue;
        };
        if x <= 0.0 || y <= 0.0 || y == target_y {
            continue;
        }

        let scale = target_y / y;
        for style in &mut doc.styles {
            style.scale_x *= scale;
            style.scale_y *= scale;
        }
        doc.set_play_res(target_x, target_y);

        debug!("Rescaled document from PlayResY {} by factor {}", y, scale);
    }
}

/// Merge the documents into one: the first is the base, every subsequent
/// document's styles and events are moved onto the end of the base's lists,
/// preserving intra-document and inter-document order. Styles are not
/// deduplicated; namespacing already made their names distinct.
pub fn merge_documents(docs: Vec<Document>) -> Result<Document> {
    let mut iter = docs.into_iter();
    let mut base = iter.next().ok_or_else(|| anyhow!("No documents to merge"))?;

    for doc in iter {
        base.styles.extend(doc.styles);
        base.events.extend(doc.events);
    }

    Ok(base)
}

/// Re-order the merged event list by ascending start time. The sort is
/// stable: events with equal start keep the relative order they entered with.
pub fn sort_events(doc: &mut Document) {
    doc.events.sort_by_key(|e| e.start);
}
