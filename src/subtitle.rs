use std::fmt;
use std::fmt::Write as FmtWrite;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use anyhow::{Result, Context};

use crate::errors::TimecodeError;
use crate::segment::TimedSegment;
use crate::timecode::format_timecode;

// @module: Subtitle cues and SRT serialization

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    // @field: Display position, starting at 1
    pub index: usize,

    // @field: Start timecode
    pub start: String,

    // @field: End timecode
    pub end: String,

    // @field: Cue text, possibly multi-line
    pub text: String,
}

impl SubtitleCue {
    /// Creates a new subtitle cue - used by tests and external consumers
    #[allow(dead_code)]
    pub fn new(index: usize, start: impl Into<String>, end: impl Into<String>, text: impl Into<String>) -> Self {
        SubtitleCue {
            index,
            start: start.into(),
            end: end.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.start, self.end)?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Derive display-ordered cues from a segment sequence
///
/// The cue index is assigned by position, not carried from the recognizer.
pub fn cues_from_segments(segments: &[TimedSegment]) -> Result<Vec<SubtitleCue>, TimecodeError> {
    let mut cues = Vec::with_capacity(segments.len());

    for (i, segment) in segments.iter().enumerate() {
        cues.push(SubtitleCue {
            index: i + 1,
            start: format_timecode(segment.start)?,
            end: format_timecode(segment.end)?,
            text: segment.text.clone(),
        });
    }

    Ok(cues)
}

/// Render cues as SRT text
///
/// Each block is the display index, the timing line, the text verbatim (no
/// re-wrapping), then one blank separator line. Numbering always runs 1..N
/// by position regardless of the cues' own index values, and an empty cue
/// sequence renders to an empty file.
pub fn render_srt(cues: &[SubtitleCue]) -> String {
    let mut out = String::new();

    for (i, cue) in cues.iter().enumerate() {
        let _ = writeln!(out, "{}", i + 1);
        let _ = writeln!(out, "{} --> {}", cue.start, cue.end);
        let _ = writeln!(out, "{}", cue.text);
        let _ = writeln!(out);
    }

    out
}

/// Write rendered SRT content to a file, creating parent directories as needed
pub fn write_srt<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

    Ok(())
}
