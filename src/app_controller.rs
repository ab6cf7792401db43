use anyhow::{Result, bail};
use log::{info, debug};
use regex::Regex;
use std::path::PathBuf;

use crate::app_config::Config;
use crate::ass_codec;
use crate::file_utils;
use crate::merge_pipeline;
use crate::subtitle_document::Document;

// @module: Application controller driving the merge pipeline

/// Main application controller for subtitle merging
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Compiled exclusion pattern, if one was configured
    exclude: Option<Regex>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration.
    // Compiles the exclusion pattern up front so an invalid pattern aborts
    // before any input file is opened.
    pub fn with_config(config: Config) -> Result<Self> {
        let exclude = config.compiled_exclude()?;
        Ok(Self { config, exclude })
    }

    /// Whether an exclusion pattern is active for this run
    pub fn has_exclude(&self) -> bool {
        self.exclude.is_some()
    }

    /// The configuration this controller was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the merge workflow over the given input files and return the
    /// serialized merged document.
    ///
    /// Stages run strictly in order, each over all documents before the next
    /// begins: load, filter, namespace, normalize resolutions, merge, sort.
    pub fn run(&self, files: &[PathBuf]) -> Result<String> {
        if files.is_empty() {
            bail!("At least one input file is required");
        }

        info!("Merging {} subtitle file(s)", files.len());

        let mut docs: Vec<Document> = Vec::with_capacity(files.len());
        for path in files {
            let doc = file_utils::load_document(path)?;
            debug!("{}: {} styles, {} events", path.display(), doc.styles.len(), doc.events.len());
            docs.push(doc);
        }

        if let Some(pattern) = &self.exclude {
            for doc in &mut docs {
                merge_pipeline::exclude_styles(doc, pattern);
            }
        }

        // The discriminator is the document's position in the input list;
        // sequential indexes are pairwise distinct for any number of inputs
        for (index, doc) in docs.iter_mut().enumerate() {
            merge_pipeline::isolate_namespace(doc, &index.to_string());
        }

        merge_pipeline::normalize_resolutions(&mut docs);

        let mut merged = merge_pipeline::merge_documents(docs)?;
        merge_pipeline::sort_events(&mut merged);

        info!(
            "Merged document: {} styles, {} events",
            merged.styles.len(),
            merged.events.len()
        );

        Ok(ass_codec::serialize(&merged))
    }
}
