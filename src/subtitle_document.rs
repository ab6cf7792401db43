use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};

// @module: In-memory ASS document model

// @const: ASS timestamp regex (H:MM:SS.CC, centisecond precision)
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})\.(\d{2})$").unwrap()
});

/// Default field ordering of a [V4+ Styles] Format line, as written by Aegisub
pub const DEFAULT_STYLES_FORMAT: [&str; 23] = [
    "Name", "Fontname", "Fontsize", "PrimaryColour", "SecondaryColour",
    "OutlineColour", "BackColour", "Bold", "Italic", "Underline", "StrikeOut",
    "ScaleX", "ScaleY", "Spacing", "Angle", "BorderStyle", "Outline", "Shadow",
    "Alignment", "MarginL", "MarginR", "MarginV", "Encoding",
];

/// Default field ordering of an [Events] Format line
pub const DEFAULT_EVENTS_FORMAT: [&str; 10] = [
    "Layer", "Start", "End", "Style", "Name", "MarginL", "MarginR", "MarginV",
    "Effect", "Text",
];

// @struct: Event timestamp with centisecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    // @field: Total centiseconds since 0:00:00.00
    cs: u64,
}

impl Timestamp {
    /// Build a timestamp from a centisecond count
    pub fn from_cs(cs: u64) -> Self {
        Timestamp { cs }
    }

    /// Total centiseconds since the start of the script
    pub fn total_cs(&self) -> u64 {
        self.cs
    }

    /// Parse an ASS timestamp in H:MM:SS.CC form
    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        let caps = TIMESTAMP_REGEX
            .captures(trimmed)
            .ok_or_else(|| anyhow!("Invalid timestamp format: {}", value))?;

        let hours: u64 = caps[1].parse().context("Failed to parse hours")?;
        let minutes: u64 = caps[2].parse().context("Failed to parse minutes")?;
        let seconds: u64 = caps[3].parse().context("Failed to parse seconds")?;
        let centis: u64 = caps[4].parse().context("Failed to parse centiseconds")?;

        if minutes >= 60 || seconds >= 60 {
            return Err(anyhow!("Invalid time components in timestamp: {}", value));
        }

        Ok(Timestamp {
            cs: hours * 360_000 + minutes * 6_000 + seconds * 100 + centis,
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let hours = self.cs / 360_000;
        let minutes = (self.cs % 360_000) / 6_000;
        let seconds = (self.cs % 6_000) / 100;
        let centis = self.cs % 100;
        write!(f, "{}:{:02}:{:02}.{:02}", hours, minutes, seconds, centis)
    }
}

// @struct: Named visual preset referenced by events
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    // @field: Style name, unique within its owning document at load time
    pub name: String,

    // @field: Horizontal scale percentage (100 = unscaled)
    pub scale_x: f64,

    // @field: Vertical scale percentage (100 = unscaled)
    pub scale_y: f64,

    // @field: Remaining style attributes as (format-field, raw value) pairs,
    // carried through unmodified and never inspected
    pub fields: Vec<(String, String)>,
}

impl Style {
    /// Create a style with unscaled dimensions and no extra attributes
    pub fn new<S: Into<String>>(name: S) -> Self {
        Style {
            name: name.into(),
            scale_x: 100.0,
            scale_y: 100.0,
            fields: Vec::new(),
        }
    }

    /// Look up an opaque attribute by its Format field name
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Set an opaque attribute, replacing an existing one of the same name
    pub fn set_field<S: Into<String>>(&mut self, key: &str, value: S) {
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
            slot.1 = value.into();
        } else {
            self.fields.push((key.to_string(), value.into()));
        }
    }
}

// @struct: Single timed subtitle line
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    // @field: Event kind as written in the source (Dialogue, Comment, ...)
    pub kind: String,

    // @field: Reference to a Style name within the same document
    pub style: String,

    // @field: Start timestamp
    pub start: Timestamp,

    // @field: End timestamp
    pub end: Timestamp,

    // @field: Remaining event attributes (layer, margins, effect, text) as
    // (format-field, raw value) pairs, carried through unmodified
    pub fields: Vec<(String, String)>,
}

impl Event {
    /// Create a dialogue event with the given style, times and text
    pub fn dialogue<S: Into<String>, T: Into<String>>(
        style: S,
        start_cs: u64,
        end_cs: u64,
        text: T,
    ) -> Self {
        Event {
            kind: "Dialogue".to_string(),
            style: style.into(),
            start: Timestamp::from_cs(start_cs),
            end: Timestamp::from_cs(end_cs),
            fields: vec![("Text".to_string(), text.into())],
        }
    }

    /// Look up an opaque attribute by its Format field name
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// The event text payload, if present
    pub fn text(&self) -> Option<&str> {
        self.field("Text")
    }
}

// @enum: One line of the [Script Info] section, in source order
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptInfoLine {
    /// A `;` comment line, stored verbatim
    Comment(String),
    /// A `Key: Value` pair
    Pair {
        /// Info key, e.g. Title or PlayResX
        key: String,
        /// Raw value text
        value: String,
    },
}

// @struct: Unrecognized section carried through the merge verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    // @field: Section title without brackets, e.g. "Fonts"
    pub title: String,

    // @field: Section body lines, verbatim
    pub lines: Vec<String>,
}

/// A parsed ASS subtitle document: script metadata, style definitions and
/// timed events, plus any sections this tool does not interpret.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Script Info lines in source order, including comments
    pub info: Vec<ScriptInfoLine>,

    /// Styles section title as found in the source ("V4+ Styles" or "V4 Styles")
    pub styles_section_title: String,

    /// Field ordering of the styles Format line
    pub styles_format: Vec<String>,

    /// Style definitions in source order
    pub styles: Vec<Style>,

    /// Field ordering of the events Format line
    pub events_format: Vec<String>,

    /// Events in source order
    pub events: Vec<Event>,

    /// Sections other than Script Info, styles and Events, passed through as-is
    pub extra_sections: Vec<RawSection>,
}

impl Document {
    /// Create an empty document with the standard V4+ format lines
    pub fn new() -> Self {
        Document {
            info: Vec::new(),
            styles_section_title: "V4+ Styles".to_string(),
            styles_format: DEFAULT_STYLES_FORMAT.iter().map(|s| s.to_string()).collect(),
            styles: Vec::new(),
            events_format: DEFAULT_EVENTS_FORMAT.iter().map(|s| s.to_string()).collect(),
            events: Vec::new(),
            extra_sections: Vec::new(),
        }
    }

    /// Look up a Script Info value by key, case-insensitively
    pub fn info_value(&self, key: &str) -> Option<&str> {
        self.info.iter().find_map(|line| match line {
            ScriptInfoLine::Pair { key: k, value } if k.eq_ignore_ascii_case(key) => {
                Some(value.as_str())
            }
            _ => None,
        })
    }

    /// Set a Script Info value, replacing the first existing pair with that key
    /// or appending a new one
    pub fn set_info<S: Into<String>>(&mut self, key: &str, value: S) {
        let value = value.into();
        let existing = self.info.iter_mut().find_map(|line| match line {
            ScriptInfoLine::Pair { key: k, value: v } if k.eq_ignore_ascii_case(key) => Some(v),
            _ => None,
        });
        match existing {
            Some(v) => *v = value,
            None => self.info.push(ScriptInfoLine::Pair {
                key: key.to_string(),
                value,
            }),
        }
    }

    /// The declared horizontal canvas resolution, if any.
    /// Values are compared numerically, never textually.
    pub fn play_res_x(&self) -> Option<f64> {
        self.info_value("PlayResX").and_then(|v| v.trim().parse().ok())
    }

    /// The declared vertical canvas resolution, if any
    pub fn play_res_y(&self) -> Option<f64> {
        self.info_value("PlayResY").and_then(|v| v.trim().parse().ok())
    }

    /// Declare the canvas resolution, overwriting any previous declaration
    pub fn set_play_res(&mut self, x: f64, y: f64) {
        self.set_info("PlayResX", format_ass_number(x));
        self.set_info("PlayResY", format_ass_number(y));
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "ASS Document")?;
        writeln!(f, "Resolution: {:?}x{:?}", self.play_res_x(), self.play_res_y())?;
        writeln!(f, "Styles: {}", self.styles.len())?;
        writeln!(f, "Events: {}", self.events.len())?;
        Ok(())
    }
}

/// Format a numeric value the way ASS files write them: integral values
/// without a fractional part, everything else in shortest decimal form
pub fn format_ass_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
