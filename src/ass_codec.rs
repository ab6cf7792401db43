use regex::Regex;
use once_cell::sync::Lazy;
use log::{warn, debug};

use crate::errors::CodecError;
use crate::subtitle_document::{
    format_ass_number, Document, Event, RawSection, ScriptInfoLine, Style, Timestamp,
    DEFAULT_EVENTS_FORMAT, DEFAULT_STYLES_FORMAT,
};

// @module: ASS text codec: parse raw subtitle text into the document model
// and serialize the model back to text

// @const: Section header line, e.g. "[Script Info]"
static SECTION_HEADER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([^\]]+)\]\s*$").unwrap()
});

/// Event kinds recognized in the [Events] section
const EVENT_KINDS: [&str; 6] = ["Dialogue", "Comment", "Picture", "Sound", "Movie", "Command"];

// @enum: Which section the parser is currently inside
#[derive(Clone, Copy)]
enum Section {
    /// Before the first section header
    Preamble,
    ScriptInfo,
    Styles,
    Events,
    /// Index into Document::extra_sections
    Other(usize),
}

/// Parse ASS subtitle text into a `Document`.
///
/// The parser is line-based: it walks sections, interprets `[Script Info]`,
/// the styles section and `[Events]`, and carries every other section through
/// verbatim. Unrecognized lines inside known sections are skipped with a
/// warning rather than failing the whole file.
pub fn parse(content: &str) -> Result<Document, CodecError> {
    let mut doc = Document {
        info: Vec::new(),
        styles_section_title: "V4+ Styles".to_string(),
        styles_format: Vec::new(),
        styles: Vec::new(),
        events_format: Vec::new(),
        events: Vec::new(),
        extra_sections: Vec::new(),
    };

    let mut section = Section::Preamble;

    for (idx, raw_line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let mut line = raw_line.trim_end_matches('\r');
        if line_no == 1 {
            line = line.trim_start_matches('\u{feff}');
        }

        if let Some(caps) = SECTION_HEADER_REGEX.captures(line.trim_start()) {
            let title = caps[1].to_string();
            section = if title.eq_ignore_ascii_case("Script Info") {
                Section::ScriptInfo
            } else if title.eq_ignore_ascii_case("V4+ Styles")
                || title.eq_ignore_ascii_case("V4 Styles")
            {
                doc.styles_section_title = title;
                Section::Styles
            } else if title.eq_ignore_ascii_case("Events") {
                Section::Events
            } else {
                doc.extra_sections.push(RawSection {
                    title,
                    lines: Vec::new(),
                });
                Section::Other(doc.extra_sections.len() - 1)
            };
            continue;
        }

        match section {
            Section::Preamble => {
                if !line.trim().is_empty() {
                    return Err(CodecError::ExpectedSectionHeader {
                        line: line_no,
                        content: line.trim().to_string(),
                    });
                }
            }
            Section::ScriptInfo => parse_info_line(&mut doc, line),
            Section::Styles => parse_style_line(&mut doc, line, line_no)?,
            Section::Events => parse_event_line(&mut doc, line, line_no)?,
            Section::Other(i) => doc.extra_sections[i].lines.push(line.to_string()),
        }
    }

    // Drop trailing blank padding inside opaque sections; the serializer
    // manages inter-section spacing itself
    for raw in &mut doc.extra_sections {
        while raw.lines.last().is_some_and(|l| l.trim().is_empty()) {
            raw.lines.pop();
        }
    }

    debug!(
        "Parsed document: {} styles, {} events, {} opaque section(s)",
        doc.styles.len(),
        doc.events.len(),
        doc.extra_sections.len()
    );

    Ok(doc)
}

// @parses: One [Script Info] line into a comment or key/value pair
fn parse_info_line(doc: &mut Document, line: &str) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }

    if trimmed.starts_with(';') || trimmed.starts_with("!:") {
        doc.info.push(ScriptInfoLine::Comment(trimmed.to_string()));
        return;
    }

    match trimmed.split_once(':') {
        Some((key, value)) => doc.info.push(ScriptInfoLine::Pair {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        }),
        None => warn!("Skipping malformed Script Info line: {}", trimmed),
    }
}

// @parses: One styles-section line (Format or Style)
fn parse_style_line(doc: &mut Document, line: &str, line_no: usize) -> Result<(), CodecError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    if let Some(rest) = strip_entry_prefix(trimmed, "Format") {
        doc.styles_format = split_format(rest);
        return Ok(());
    }

    if let Some(rest) = strip_entry_prefix(trimmed, "Style") {
        if doc.styles_format.is_empty() {
            return Err(CodecError::MissingFormat {
                line: line_no,
                entry: "Style".to_string(),
            });
        }

        let values: Vec<&str> = rest
            .splitn(doc.styles_format.len(), ',')
            .map(|v| v.trim())
            .collect();

        let mut style = Style::new("");
        let mut has_name = false;

        for (field, value) in doc.styles_format.iter().zip(values.iter()) {
            if field.eq_ignore_ascii_case("Name") {
                style.name = value.to_string();
                has_name = true;
            } else if field.eq_ignore_ascii_case("ScaleX") {
                style.scale_x = parse_number(value, field, line_no)?;
            } else if field.eq_ignore_ascii_case("ScaleY") {
                style.scale_y = parse_number(value, field, line_no)?;
            } else {
                style.fields.push((field.clone(), value.to_string()));
            }
        }

        if !has_name {
            return Err(CodecError::MissingNameField { line: line_no });
        }

        doc.styles.push(style);
        return Ok(());
    }

    warn!("Skipping unrecognized styles line {}: {}", line_no, trimmed);
    Ok(())
}

// @parses: One [Events] line (Format or a timed event)
fn parse_event_line(doc: &mut Document, line: &str, line_no: usize) -> Result<(), CodecError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(());
    }

    if let Some(rest) = strip_entry_prefix(trimmed, "Format") {
        doc.events_format = split_format(rest);
        return Ok(());
    }

    for kind in EVENT_KINDS {
        let Some(rest) = strip_entry_prefix(trimmed, kind) else {
            continue;
        };

        if doc.events_format.is_empty() {
            return Err(CodecError::MissingFormat {
                line: line_no,
                entry: kind.to_string(),
            });
        }

        let values: Vec<&str> = rest.splitn(doc.events_format.len(), ',').collect();

        let mut event = Event {
            kind: kind.to_string(),
            style: String::new(),
            start: Timestamp::from_cs(0),
            end: Timestamp::from_cs(0),
            fields: Vec::new(),
        };

        for (i, (field, value)) in doc.events_format.iter().zip(values.iter()).enumerate() {
            // The last format field (Text) swallows embedded commas and keeps
            // its leading whitespace; every other field is a fixed-width slot
            let is_last = i + 1 == doc.events_format.len();
            let value = if is_last { *value } else { value.trim() };

            if field.eq_ignore_ascii_case("Style") {
                event.style = value.to_string();
            } else if field.eq_ignore_ascii_case("Start") {
                event.start = parse_timestamp(value, line_no)?;
            } else if field.eq_ignore_ascii_case("End") {
                event.end = parse_timestamp(value, line_no)?;
            } else {
                event.fields.push((field.clone(), value.to_string()));
            }
        }

        doc.events.push(event);
        return Ok(());
    }

    warn!("Skipping unrecognized events line {}: {}", line_no, trimmed);
    Ok(())
}

/// Strip `"<prefix>:"` (case-insensitive) from an entry line, returning the
/// remainder with leading whitespace removed
fn strip_entry_prefix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let (head, rest) = line.split_once(':')?;
    if head.trim().eq_ignore_ascii_case(prefix) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn split_format(rest: &str) -> Vec<String> {
    rest.split(',').map(|f| f.trim().to_string()).collect()
}

fn parse_number(value: &str, field: &str, line_no: usize) -> Result<f64, CodecError> {
    value.trim().parse().map_err(|_| CodecError::InvalidNumber {
        line: line_no,
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_timestamp(value: &str, line_no: usize) -> Result<Timestamp, CodecError> {
    Timestamp::parse(value).map_err(|_| CodecError::InvalidTimestamp {
        line: line_no,
        value: value.to_string(),
    })
}

/// Serialize a `Document` back to ASS text.
///
/// Styles and events are written under the document's own section title and
/// Format orderings; values are looked up by field name, so entries that came
/// from a document with a different Format line still serialize under the
/// base ordering. Fields an entry never carried serialize as empty.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    for line in &doc.info {
        match line {
            ScriptInfoLine::Comment(text) => {
                out.push_str(text);
                out.push('\n');
            }
            ScriptInfoLine::Pair { key, value } => {
                out.push_str(key);
                out.push_str(": ");
                out.push_str(value);
                out.push('\n');
            }
        }
    }

    let styles_format = effective_format(&doc.styles_format, &DEFAULT_STYLES_FORMAT);
    out.push('\n');
    out.push('[');
    out.push_str(&doc.styles_section_title);
    out.push_str("]\n");
    out.push_str("Format: ");
    out.push_str(&styles_format.join(", "));
    out.push('\n');
    for style in &doc.styles {
        let values: Vec<String> = styles_format
            .iter()
            .map(|field| {
                if field.eq_ignore_ascii_case("Name") {
                    style.name.clone()
                } else if field.eq_ignore_ascii_case("ScaleX") {
                    format_ass_number(style.scale_x)
                } else if field.eq_ignore_ascii_case("ScaleY") {
                    format_ass_number(style.scale_y)
                } else {
                    style.field(field).unwrap_or_default().to_string()
                }
            })
            .collect();
        out.push_str("Style: ");
        out.push_str(&values.join(","));
        out.push('\n');
    }

    let events_format = effective_format(&doc.events_format, &DEFAULT_EVENTS_FORMAT);
    out.push('\n');
    out.push_str("[Events]\n");
    out.push_str("Format: ");
    out.push_str(&events_format.join(", "));
    out.push('\n');
    for event in &doc.events {
        let values: Vec<String> = events_format
            .iter()
            .map(|field| {
                if field.eq_ignore_ascii_case("Style") {
                    event.style.clone()
                } else if field.eq_ignore_ascii_case("Start") {
                    event.start.to_string()
                } else if field.eq_ignore_ascii_case("End") {
                    event.end.to_string()
                } else {
                    event.field(field).unwrap_or_default().to_string()
                }
            })
            .collect();
        out.push_str(&event.kind);
        out.push_str(": ");
        out.push_str(&values.join(","));
        out.push('\n');
    }

    for raw in &doc.extra_sections {
        out.push('\n');
        out.push('[');
        out.push_str(&raw.title);
        out.push_str("]\n");
        for line in &raw.lines {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

fn effective_format(format: &[String], default: &[&str]) -> Vec<String> {
    if format.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        format.to_vec()
    }
}
