/*!
 * Model adapters for speech recognition and translation.
 *
 * This module contains the collaborator contracts consumed by the pipeline
 * and their concrete implementations:
 * - `whisper`: local whisper.cpp speech recognition via whisper-rs
 * - `translate`: HTTP LLM translation client
 * - `mock`: scripted implementations for the test suite
 */

use std::path::Path;
use async_trait::async_trait;

use crate::errors::{RecognizerError, TranslationError};
use crate::segment::Transcript;

/// Speech recognition collaborator
///
/// Implementations own their model resources; a single instance is expected
/// to be shared read-only across jobs behind an `Arc`, with invocation
/// serialized internally when the underlying model is not safe for
/// concurrent calls.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe a mono 16 kHz WAV file into timed segments plus the
    /// detected source language tag
    async fn transcribe(&self, audio_path: &Path) -> Result<Transcript, RecognizerError>;
}

/// Translation collaborator
///
/// Takes the ordered source texts of one transcript and returns translated
/// texts of the same length and order; positional correspondence is the
/// contract, checked again by the reinsertion step.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate an ordered batch of texts
    async fn translate(
        &self,
        source_language: &str,
        target_language: &str,
        texts: Vec<String>,
    ) -> Result<Vec<String>, TranslationError>;
}

pub mod whisper;
pub mod translate;
pub mod mock;
