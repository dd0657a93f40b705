use crate::errors::{SegmentError, TranslationError};

// @module: Timed speech segments and their invariants

/// One span of recognized (or translated) speech
#[derive(Debug, Clone, PartialEq)]
pub struct TimedSegment {
    // @field: Start offset in seconds
    pub start: f64,

    // @field: End offset in seconds
    pub end: f64,

    // @field: Recognized or translated text
    pub text: String,
}

impl TimedSegment {
    /// Creates a new timed segment
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        TimedSegment {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Ordered segment sequence produced by one transcription run
///
/// Insertion order is authoritative display order; the sequence is never
/// reordered by this pipeline.
#[derive(Debug, Clone)]
pub struct Transcript {
    /// Segments in display order
    pub segments: Vec<TimedSegment>,

    /// Detected source language tag (ISO 639-1 where the recognizer knows it)
    pub language: String,
}

impl Transcript {
    /// Create a transcript from recognizer output
    pub fn new(segments: Vec<TimedSegment>, language: impl Into<String>) -> Self {
        Transcript {
            segments,
            language: language.into(),
        }
    }

    /// Validate the segment sequence without transforming it
    ///
    /// Every segment must have a strictly positive duration. Empty text is
    /// legal and later renders as a blank cue. Overlap between consecutive
    /// segments is tolerated unless `strict_overlaps` is set; speech segments
    /// legitimately overlap in natural conversation.
    pub fn validate(&self, strict_overlaps: bool) -> Result<(), SegmentError> {
        for (index, segment) in self.segments.iter().enumerate() {
            if !(segment.end > segment.start) {
                return Err(SegmentError::NonPositiveDuration {
                    index,
                    start: segment.start,
                    end: segment.end,
                });
            }
        }

        if strict_overlaps {
            for index in 1..self.segments.len() {
                let previous_end = self.segments[index - 1].end;
                let next_start = self.segments[index].start;
                if previous_end > next_start {
                    return Err(SegmentError::Overlap {
                        index,
                        previous_end,
                        next_start,
                    });
                }
            }
        }

        Ok(())
    }

    /// All segment texts in display order, as submitted to the translator
    pub fn texts(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.text.clone()).collect()
    }

    /// Re-zip a translated text list onto this transcript by position
    ///
    /// The translated list must be exactly as long as the segment sequence;
    /// positional correspondence is the only binding between source and
    /// translated text, so the length check is what keeps a reordering or
    /// filtering translator from silently corrupting the subtitles. Timing
    /// is copied unchanged from the source segments.
    pub fn with_translated_texts(
        &self,
        translated: Vec<String>,
        target_language: &str,
    ) -> Result<Transcript, TranslationError> {
        if translated.len() != self.segments.len() {
            return Err(TranslationError::CountMismatch {
                expected: self.segments.len(),
                actual: translated.len(),
            });
        }

        let segments = self
            .segments
            .iter()
            .zip(translated)
            .map(|(segment, text)| TimedSegment {
                start: segment.start,
                end: segment.end,
                text,
            })
            .collect();

        Ok(Transcript {
            segments,
            language: target_language.to_string(),
        })
    }
}
