/*!
 * Error types for the subvox application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when formatting time offsets as subtitle timecodes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimecodeError {
    /// A negative (or non-finite) seconds offset cannot be rendered
    #[error("invalid timestamp: {0} is not a non-negative finite offset")]
    Negative(f64),
}

/// Errors raised by the segment validation gate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    /// A segment whose end does not lie strictly after its start
    #[error("malformed segment at index {index}: start {start}s, end {end}s (duration must be positive)")]
    NonPositiveDuration {
        /// Zero-based position of the offending segment
        index: usize,
        /// Segment start in seconds
        start: f64,
        /// Segment end in seconds
        end: f64,
    },

    /// Overlap rejected under strict validation
    #[error("overlapping segments at index {index}: previous ends at {previous_end}s, next starts at {next_start}s")]
    Overlap {
        /// Zero-based position of the later segment
        index: usize,
        /// End of the earlier segment in seconds
        previous_end: f64,
        /// Start of the later segment in seconds
        next_start: f64,
    },
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The translator returned a different number of strings than it was given
    #[error("translation count mismatch: sent {expected} texts, received {actual}")]
    CountMismatch {
        /// Number of source texts submitted
        expected: usize,
        /// Number of translated texts returned
        actual: usize,
    },

    /// The provider response could not be mapped back onto the batch
    #[error("failed to parse translation response: {0}")]
    MarkerParse(String),

    /// Opaque failure from the translation provider
    #[error("translation provider error: {0}")]
    Provider(String),
}

/// Errors raised by the speech recognition engine
#[derive(Error, Debug)]
pub enum RecognizerError {
    /// The model file could not be loaded
    #[error("failed to load recognition model from {path:?}: {reason}")]
    ModelLoad {
        /// Path to the model file
        path: PathBuf,
        /// Underlying loader message
        reason: String,
    },

    /// The audio file could not be read or had an unusable format
    #[error("unusable audio input {path:?}: {reason}")]
    Audio {
        /// Path to the audio file
        path: PathBuf,
        /// Underlying decoder message
        reason: String,
    },

    /// Inference itself failed
    #[error("recognition failed: {0}")]
    Inference(String),
}

/// Per-job failure, tagged by the pipeline stage it occurred in
#[derive(Error, Debug)]
pub enum JobError {
    /// Audio extraction collaborator failed
    #[error("audio extraction failed: {0}")]
    Extraction(String),

    /// Speech recognition failed
    #[error("transcription failed: {0}")]
    Transcription(#[from] RecognizerError),

    /// Translation or reinsertion failed
    #[error("translation failed: {0}")]
    Translation(#[from] TranslationError),

    /// Segment validation or subtitle serialization failed
    #[error("subtitle generation failed: {0}")]
    Subtitle(String),

    /// Video muxing collaborator failed
    #[error("muxing failed: {0}")]
    Mux(String),

    /// The whole job exceeded the caller-level deadline
    #[error("job timed out after {0}s")]
    Timeout(u64),
}

impl JobError {
    /// Stable stage label used in batch reports
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Extraction(_) => "extract",
            Self::Transcription(_) => "transcribe",
            Self::Translation(_) => "translate",
            Self::Subtitle(_) => "serialize",
            Self::Mux(_) => "mux",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl From<SegmentError> for JobError {
    fn from(error: SegmentError) -> Self {
        Self::Subtitle(error.to_string())
    }
}

impl From<TimecodeError> for JobError {
    fn from(error: TimecodeError) -> Self {
        Self::Subtitle(error.to_string())
    }
}
