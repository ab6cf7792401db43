/*!
 * # submerge - ASS subtitle document merger
 *
 * A Rust library for merging Advanced SubStation Alpha (ASS) subtitle
 * documents into a single time-ordered document.
 *
 * ## Features
 *
 * - Merge any number of .ass documents, first document as the base
 * - Namespace isolation so style names never collide across sources
 * - Optional style exclusion via a case-insensitive full-match pattern
 * - Resolution normalization: styles authored against a smaller canvas are
 *   rescaled to the tallest declared canvas
 * - Stable re-sort of the merged events by start time
 * - Encoding-resolving loader (UTF-8, UTF-16 with BOM, UTF-16LE)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management and the exclusion pattern compiler
 * - `subtitle_document`: The in-memory document model (documents, styles,
 *   events, timestamps)
 * - `ass_codec`: Parsing raw ASS text into the model and serializing it back
 * - `merge_pipeline`: The merge stages (filter, namespace, normalize
 *   resolutions, merge, sort)
 * - `file_utils`: File system operations and the encoding-resolving loader
 * - `app_controller`: Main application controller wiring the stages together
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod ass_codec;
pub mod errors;
pub mod file_utils;
pub mod merge_pipeline;
pub mod subtitle_document;

// Re-export main types for easier usage
pub use app_config::{compile_exclude, Config, LogLevel};
pub use app_controller::Controller;
pub use errors::{AppError, CodecError, LoadError};
pub use subtitle_document::{Document, Event, Style, Timestamp};
